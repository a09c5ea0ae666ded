use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::engine::DocumentEngine;
use crate::geometry::{DocumentPoint, DocumentRect, PixelSize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub bounds: DocumentRect,
    pub target_page: Option<usize>,
    pub uri: Option<String>,
}

impl Link {
    pub fn to_page(bounds: DocumentRect, page: usize) -> Self {
        Self {
            bounds,
            target_page: Some(page),
            uri: None,
        }
    }

    pub fn to_uri(bounds: DocumentRect, uri: impl Into<String>) -> Self {
        Self {
            bounds,
            target_page: None,
            uri: Some(uri.into()),
        }
    }
}

/// First link in list order whose bounds contain `point`.
pub fn hit_test(links: &[Link], point: DocumentPoint) -> Option<&Link> {
    links
        .iter()
        .find(|link| link.bounds.contains(point.x, point.y))
}

/// Handed to the host before a link is followed. Setting `handled`
/// suppresses navigation and launching.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkClickEvent {
    pub link: Link,
    pub handled: bool,
}

impl LinkClickEvent {
    pub fn new(link: Link) -> Self {
        Self {
            link,
            handled: false,
        }
    }
}

/// Per-page link lists, refetched when a page is shown at a new size.
#[derive(Debug, Default)]
pub(crate) struct PageLinks {
    pages: HashMap<usize, (PixelSize, Rc<[Link]>)>,
}

impl PageLinks {
    pub(crate) fn get<E: DocumentEngine>(
        &mut self,
        engine: &E,
        page: usize,
        view_size: PixelSize,
    ) -> Rc<[Link]> {
        if let Some((size, links)) = self.pages.get(&page) {
            if *size == view_size {
                return Rc::clone(links);
            }
        }
        let links: Rc<[Link]> = engine.links(page, view_size).into();
        self.pages.insert(page, (view_size, Rc::clone(&links)));
        links
    }

    pub(crate) fn clear(&mut self) {
        self.pages.clear();
    }
}
