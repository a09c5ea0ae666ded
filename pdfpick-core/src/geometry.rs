use serde::{Deserialize, Serialize};

/// A pointer location in view pixels, relative to the top-left corner of the
/// rendered page image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Size of a rendered page image (or of the whole viewport) in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Page dimensions in document units (PDF points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// A point on a page in page-local units with a top-left origin, i.e. the
/// coordinates the engine's `point_to_document` transform consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

impl PagePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point in document space, bound to the page it was resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentPoint {
    pub page: usize,
    pub x: f32,
    pub y: f32,
}

impl DocumentPoint {
    pub fn new(page: usize, x: f32, y: f32) -> Self {
        Self { page, x, y }
    }
}

/// Axis-aligned rectangle in document space. Engines disagree about whether
/// `top` is numerically above `bottom`, so containment is orientation-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl DocumentRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (min_x, max_x) = min_max(self.left, self.right);
        let (min_y, max_y) = min_max(self.top, self.bottom);
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }

    pub fn union(&self, other: &DocumentRect) -> DocumentRect {
        let (min_x, max_x) = min_max(self.left, self.right);
        let (other_min_x, other_max_x) = min_max(other.left, other.right);
        let (min_y, max_y) = min_max(self.top, self.bottom);
        let (other_min_y, other_max_y) = min_max(other.top, other.bottom);
        let low = min_y.min(other_min_y);
        let high = max_y.max(other_max_y);
        // Keep whichever vertical orientation `self` uses.
        let (top, bottom) = if self.top >= self.bottom {
            (high, low)
        } else {
            (low, high)
        };
        DocumentRect {
            left: min_x.min(other_min_x),
            top,
            right: max_x.max(other_max_x),
            bottom,
        }
    }
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
