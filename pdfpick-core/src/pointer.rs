use std::rc::Rc;

use tracing::trace;

use crate::engine::{DocumentEngine, Tolerance};
use crate::geometry::{DocumentPoint, PixelPoint, PixelSize};
use crate::mapper::CoordinateMapper;

/// What the pointer is over. Derived data; the engine stays authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    pub page: usize,
    pub pixel_location: PixelPoint,
    pub document_location: Option<DocumentPoint>,
    pub character_index: Option<usize>,
}

/// Single-slot memo of the last pointer lookup, keyed by page and pixel
/// location. Move and cursor queries repeat the same coordinates many times
/// in a row, and each miss costs a transform plus a character search.
#[derive(Debug, Default)]
pub struct PointerCache {
    slot: Option<Rc<PointerState>>,
}

impl PointerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<E: DocumentEngine>(
        &mut self,
        mapper: &CoordinateMapper,
        engine: Option<&E>,
        page: usize,
        view_size: PixelSize,
        location: PixelPoint,
        tolerance: Tolerance,
    ) -> Rc<PointerState> {
        if let Some(cached) = &self.slot {
            if cached.page == page && cached.pixel_location == location {
                return Rc::clone(cached);
            }
        }

        trace!(page, x = location.x, y = location.y, "pointer cache miss");
        let document_location = mapper.to_document_space(engine, page, view_size, location);
        let character_index = match (engine, document_location) {
            (Some(engine), Some(point)) => engine.character_index_at(point, tolerance),
            _ => None,
        };

        let state = Rc::new(PointerState {
            page,
            pixel_location: location,
            document_location,
            character_index,
        });
        self.slot = Some(Rc::clone(&state));
        state
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;

    const VIEW: PixelSize = PixelSize {
        width: 100,
        height: 100,
    };

    fn resolve(
        cache: &mut PointerCache,
        engine: &FakeEngine,
        page: usize,
        x: f32,
        y: f32,
    ) -> Rc<PointerState> {
        cache.resolve(
            &CoordinateMapper::default(),
            Some(engine),
            page,
            VIEW,
            PixelPoint::new(x, y),
            Tolerance::default(),
        )
    }

    #[test]
    fn identical_requests_share_the_cached_state() {
        let engine = FakeEngine::new(&["hello world", "again"]);
        let mut cache = PointerCache::new();

        let first = resolve(&mut cache, &engine, 0, 15.0, 5.0);
        let second = resolve(&mut cache, &engine, 0, 15.0, 5.0);

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.character_index, Some(1));
        assert_eq!(engine.index_lookups.get(), 1);
        assert_eq!(engine.transforms.get(), 1);
    }

    #[test]
    fn changing_page_or_location_recomputes() {
        let engine = FakeEngine::new(&["hello world", "again"]);
        let mut cache = PointerCache::new();

        let first = resolve(&mut cache, &engine, 0, 15.0, 5.0);
        let moved = resolve(&mut cache, &engine, 0, 25.0, 5.0);
        assert!(!Rc::ptr_eq(&first, &moved));
        assert_eq!(moved.character_index, Some(2));

        let other_page = resolve(&mut cache, &engine, 1, 25.0, 5.0);
        assert!(!Rc::ptr_eq(&moved, &other_page));
        assert_eq!(other_page.page, 1);
        assert_eq!(engine.index_lookups.get(), 3);
    }

    #[test]
    fn invalid_locations_are_cached_without_character_lookup() {
        let engine = FakeEngine::new(&["hello"]);
        let mut cache = PointerCache::new();

        let state = resolve(&mut cache, &engine, 5, 15.0, 5.0);
        assert!(state.document_location.is_none());
        assert!(state.character_index.is_none());
        assert_eq!(engine.index_lookups.get(), 0);

        let again = resolve(&mut cache, &engine, 5, 15.0, 5.0);
        assert!(Rc::ptr_eq(&state, &again));
    }

    #[test]
    fn invalidate_forces_a_fresh_lookup() {
        let engine = FakeEngine::new(&["hello"]);
        let mut cache = PointerCache::new();

        let first = resolve(&mut cache, &engine, 0, 5.0, 5.0);
        cache.invalidate();
        let second = resolve(&mut cache, &engine, 0, 5.0, 5.0);
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }
}
