//! Conversion between view pixels and document space.
//!
//! The mapper only adapts view pixels into page-local units; the final step
//! into document space is always the engine's own transform.

use serde::{Deserialize, Serialize};

use crate::engine::DocumentEngine;
use crate::geometry::{DocumentPoint, DocumentRect, PagePoint, PixelPoint, PixelRect, PixelSize};

/// Clockwise rotation of the displayed page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /// Maps view fractions (0..1 over the displayed image) to page fractions.
    fn view_to_page(self, fx: f32, fy: f32) -> (f32, f32) {
        match self {
            Rotation::None => (fx, fy),
            Rotation::Rotate90 => (fy, 1.0 - fx),
            Rotation::Rotate180 => (1.0 - fx, 1.0 - fy),
            Rotation::Rotate270 => (1.0 - fy, fx),
        }
    }

    fn page_to_view(self, nx: f32, ny: f32) -> (f32, f32) {
        match self {
            Rotation::None => (nx, ny),
            Rotation::Rotate90 => (1.0 - ny, nx),
            Rotation::Rotate180 => (1.0 - nx, 1.0 - ny),
            Rotation::Rotate270 => (ny, 1.0 - nx),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateMapper {
    rotation: Rotation,
}

impl CoordinateMapper {
    pub fn new(rotation: Rotation) -> Self {
        Self { rotation }
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Resolves a pointer location on the image of `page` (rendered at
    /// `view_size`) into document space. `None` means "ignore the event": no
    /// document, a page outside the document, or a degenerate view.
    pub fn to_document_space<E: DocumentEngine>(
        &self,
        engine: Option<&E>,
        page: usize,
        view_size: PixelSize,
        location: PixelPoint,
    ) -> Option<DocumentPoint> {
        let engine = engine?;
        if page >= engine.page_count() || view_size.is_empty() {
            return None;
        }
        let page_size = engine.page_size(page)?;

        let fx = location.x / view_size.width as f32;
        let fy = location.y / view_size.height as f32;
        let (nx, ny) = self.rotation.view_to_page(fx, fy);
        // The engine expects whole page units.
        let local = PagePoint::new(
            (nx * page_size.width).trunc(),
            (ny * page_size.height).trunc(),
        );

        let (x, y) = engine.point_to_document(page, local)?;
        Some(DocumentPoint::new(page, x, y))
    }

    /// Projects a document-space rectangle onto the image of `page`.
    pub fn rect_to_viewport<E: DocumentEngine>(
        &self,
        engine: Option<&E>,
        page: usize,
        view_size: PixelSize,
        rect: DocumentRect,
    ) -> Option<PixelRect> {
        let engine = engine?;
        if page >= engine.page_count() || view_size.is_empty() {
            return None;
        }
        let page_size = engine.page_size(page)?;
        if page_size.width <= 0.0 || page_size.height <= 0.0 {
            return None;
        }

        let a = engine.point_from_document(page, rect.left, rect.top)?;
        let b = engine.point_from_document(page, rect.right, rect.bottom)?;

        let to_view = |point: PagePoint| {
            let (fx, fy) = self
                .rotation
                .page_to_view(point.x / page_size.width, point.y / page_size.height);
            (
                fx * view_size.width as f32,
                fy * view_size.height as f32,
            )
        };
        let (ax, ay) = to_view(a);
        let (bx, by) = to_view(b);

        Some(PixelRect {
            left: ax.min(bx),
            top: ay.min(by),
            right: ax.max(bx),
            bottom: ay.max(by),
        })
    }
}
