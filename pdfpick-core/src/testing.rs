//! In-memory engine used by the unit tests.
//!
//! Every page is 100x100 units. Characters sit on a grid of 10x10 cells, ten
//! per row, and document space equals page-local space.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::engine::{DocumentEngine, TextSpan, Tolerance, WordSpan};
use crate::geometry::{DocumentPoint, DocumentRect, PagePoint, PageSize, PixelSize};
use crate::links::Link;

pub const CELL: f32 = 10.0;
pub const COLUMNS: usize = 10;

pub struct FakeEngine {
    pages: Vec<Vec<char>>,
    links: HashMap<usize, Vec<Link>>,
    pub index_lookups: Cell<usize>,
    pub transforms: Cell<usize>,
    pub link_queries: RefCell<Vec<(usize, PixelSize)>>,
}

impl FakeEngine {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|page| page.chars().collect()).collect(),
            links: HashMap::new(),
            index_lookups: Cell::new(0),
            transforms: Cell::new(0),
            link_queries: RefCell::new(Vec::new()),
        }
    }

    pub fn with_links(mut self, page: usize, links: Vec<Link>) -> Self {
        self.links.insert(page, links);
        self
    }

    fn cell_index(&self, point: DocumentPoint) -> Option<usize> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = (point.x / CELL) as usize;
        let row = (point.y / CELL) as usize;
        if column >= COLUMNS {
            return None;
        }
        let index = row * COLUMNS + column;
        (index < self.character_count(point.page)).then_some(index)
    }
}

/// View-space centre of character `index` when a page is shown at 100x100
/// pixels (one pixel per unit).
pub fn char_center(index: usize) -> (f32, f32) {
    let column = (index % COLUMNS) as f32;
    let row = (index / COLUMNS) as f32;
    (column * CELL + CELL / 2.0, row * CELL + CELL / 2.0)
}

impl DocumentEngine for FakeEngine {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Option<PageSize> {
        (page < self.pages.len()).then(|| PageSize::new(100.0, 100.0))
    }

    fn character_count(&self, page: usize) -> usize {
        self.pages.get(page).map(Vec::len).unwrap_or(0)
    }

    fn character_index_at(&self, point: DocumentPoint, _tolerance: Tolerance) -> Option<usize> {
        self.index_lookups.set(self.index_lookups.get() + 1);
        self.cell_index(point)
    }

    fn word_at(&self, point: DocumentPoint, _tolerance: Tolerance) -> Option<WordSpan> {
        let index = self.cell_index(point)?;
        let chars = &self.pages[point.page];
        if chars[index].is_whitespace() {
            return None;
        }
        let mut start = index;
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let mut end = index;
        while end < chars.len() && !chars[end].is_whitespace() {
            end += 1;
        }
        Some(WordSpan {
            offset: start,
            length: end - start,
        })
    }

    fn text(&self, span: TextSpan) -> String {
        self.pages
            .get(span.page)
            .map(|chars| chars.iter().skip(span.offset).take(span.length).collect())
            .unwrap_or_default()
    }

    fn text_rects(&self, span: TextSpan) -> Vec<DocumentRect> {
        let count = self.character_count(span.page);
        let end = (span.offset + span.length).min(count);
        let mut rects: Vec<(usize, DocumentRect)> = Vec::new();
        for index in span.offset..end {
            let row = index / COLUMNS;
            let column = (index % COLUMNS) as f32;
            let top = row as f32 * CELL;
            let rect = DocumentRect::new(column * CELL, top, column * CELL + CELL, top + CELL);
            match rects.last_mut() {
                Some((last_row, last)) if *last_row == row => *last = last.union(&rect),
                _ => rects.push((row, rect)),
            }
        }
        rects.into_iter().map(|(_, rect)| rect).collect()
    }

    fn point_to_document(&self, page: usize, point: PagePoint) -> Option<(f32, f32)> {
        self.transforms.set(self.transforms.get() + 1);
        (page < self.pages.len()).then_some((point.x, point.y))
    }

    fn point_from_document(&self, page: usize, x: f32, y: f32) -> Option<PagePoint> {
        (page < self.pages.len()).then_some(PagePoint::new(x, y))
    }

    fn links(&self, page: usize, viewport: PixelSize) -> Vec<Link> {
        self.link_queries.borrow_mut().push((page, viewport));
        self.links.get(&page).cloned().unwrap_or_default()
    }
}
