use serde::{Deserialize, Serialize};

use crate::geometry::{DocumentPoint, DocumentRect, PagePoint, PageSize, PixelSize};
use crate::links::Link;

/// A run of characters on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub page: usize,
    pub offset: usize,
    pub length: usize,
}

impl TextSpan {
    pub fn new(page: usize, offset: usize, length: usize) -> Self {
        Self {
            page,
            offset,
            length,
        }
    }
}

/// A word reported by the engine, relative to its page's character stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub offset: usize,
    pub length: usize,
}

/// Hit tolerance in document units around a pointer location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub x: f32,
    pub y: f32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { x: 4.0, y: 4.0 }
    }
}

/// The external document engine. Every call is read-only, synchronous and
/// cheap enough to be repeated on the next input event.
///
/// Implementations are expected to clamp spans that run past the end of a
/// page: the textual selection convention deliberately asks for one
/// character more than a page holds on non-final pages.
pub trait DocumentEngine {
    fn page_count(&self) -> usize;

    fn page_size(&self, page: usize) -> Option<PageSize>;

    fn character_count(&self, page: usize) -> usize;

    fn character_index_at(&self, point: DocumentPoint, tolerance: Tolerance) -> Option<usize>;

    fn word_at(&self, point: DocumentPoint, tolerance: Tolerance) -> Option<WordSpan>;

    fn text(&self, span: TextSpan) -> String;

    fn text_rects(&self, span: TextSpan) -> Vec<DocumentRect>;

    /// Converts a page-local point (top-left origin, page units) into the
    /// engine's document space.
    fn point_to_document(&self, page: usize, point: PagePoint) -> Option<(f32, f32)>;

    /// Inverse of [`DocumentEngine::point_to_document`].
    fn point_from_document(&self, page: usize, x: f32, y: f32) -> Option<PagePoint>;

    fn links(&self, page: usize, viewport: PixelSize) -> Vec<Link>;
}
