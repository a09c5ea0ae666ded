//! Zoom state, displayed page sizes and continuous page layout.

use serde::{Deserialize, Serialize};

use crate::config::ZoomConfig;
use crate::geometry::{PageSize, PixelPoint, PixelSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomMode {
    #[default]
    FitHeight,
    FitWidth,
    /// Explicit zoom factor over the page's natural size.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    SinglePage,
    /// Two pages side by side.
    Book,
    Continuous,
}

impl DisplayMode {
    fn page_step(self) -> usize {
        match self {
            DisplayMode::Book => 2,
            _ => 1,
        }
    }
}

/// Width reserved for the vertical scrollbar in fit-width mode.
pub const SCROLLBAR_WIDTH: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    zoom: f64,
    mode: ZoomMode,
    limits: ZoomConfig,
}

impl ZoomState {
    /// `limits` must pass [`ZoomConfig::validate`].
    pub fn new(limits: ZoomConfig) -> Self {
        Self {
            zoom: 1.0_f64.clamp(limits.min, limits.max),
            mode: ZoomMode::default(),
            limits,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * self.limits.factor)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / self.limits.factor)
    }

    /// Clamps to the configured limits and switches to [`ZoomMode::Custom`].
    /// Returns whether the zoom factor changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let zoom = zoom.clamp(self.limits.min, self.limits.max);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        self.mode = ZoomMode::Custom;
        true
    }

    pub fn set_mode(&mut self, mode: ZoomMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Size at which `page` is rendered inside `container`.
    pub fn display_size(
        &self,
        page: PageSize,
        container: PixelSize,
        display: DisplayMode,
    ) -> PixelSize {
        let ratio = f64::from(page.aspect_ratio());
        match self.mode {
            ZoomMode::FitHeight => {
                let height = f64::from(container.height);
                PixelSize::new((ratio * height) as u32, container.height)
            }
            ZoomMode::FitWidth => {
                let mut width = f64::from(container.width.saturating_sub(SCROLLBAR_WIDTH));
                if display == DisplayMode::Book {
                    width /= 2.0;
                }
                let height = if ratio > 0.0 { width / ratio } else { width };
                PixelSize::new(width as u32, height as u32)
            }
            ZoomMode::Custom => PixelSize::new(
                (f64::from(page.width) * self.zoom) as u32,
                (f64::from(page.height) * self.zoom) as u32,
            ),
        }
    }
}

/// A page image placed in the scrollable content area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub page: usize,
    pub origin: PixelPoint,
    pub size: PixelSize,
}

/// Where a viewport point landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageHit {
    pub page: usize,
    /// Relative to the page image's top-left corner.
    pub location: PixelPoint,
    pub view_size: PixelSize,
}

#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    frames: Vec<PageFrame>,
    content_height: f32,
}

impl PageLayout {
    /// Stacks pages top to bottom with `gap` pixels around each, centred in
    /// `container_width`.
    pub fn continuous(sizes: &[PixelSize], container_width: u32, gap: u32) -> Self {
        let gap = gap as f32;
        let mut y = gap;
        let frames = sizes
            .iter()
            .enumerate()
            .map(|(page, size)| {
                let x = ((container_width as f32 - size.width as f32) / 2.0).max(gap);
                let frame = PageFrame {
                    page,
                    origin: PixelPoint::new(x, y),
                    size: *size,
                };
                y += size.height as f32 + gap;
                frame
            })
            .collect();
        Self {
            frames,
            content_height: y,
        }
    }

    pub fn frames(&self) -> &[PageFrame] {
        &self.frames
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Resolves a point in the viewport, scrolled by `scroll`, to the page
    /// beneath it. Points in the gaps between pages resolve to `None`.
    pub fn locate(&self, point: PixelPoint, scroll: PixelPoint) -> Option<PageHit> {
        let x = point.x + scroll.x;
        let y = point.y + scroll.y;
        self.frames.iter().find_map(|frame| {
            let local_x = x - frame.origin.x;
            let local_y = y - frame.origin.y;
            let inside = local_x >= 0.0
                && local_y >= 0.0
                && local_x < frame.size.width as f32
                && local_y < frame.size.height as f32;
            inside.then(|| PageHit {
                page: frame.page,
                location: PixelPoint::new(local_x, local_y),
                view_size: frame.size,
            })
        })
    }
}

pub fn next_page(current: usize, page_count: usize, display: DisplayMode) -> usize {
    let step = display.page_step();
    (current + step).min(page_count.saturating_sub(step))
}

pub fn previous_page(current: usize, page_count: usize, display: DisplayMode) -> usize {
    let step = display.page_step();
    current
        .saturating_sub(step)
        .min(page_count.saturating_sub(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped_and_switches_to_custom() {
        let mut zoom = ZoomState::new(ZoomConfig::default());
        assert_eq!(zoom.mode(), ZoomMode::FitHeight);

        assert!(zoom.zoom_in());
        assert!((zoom.zoom() - 1.2).abs() < 1e-9);
        assert_eq!(zoom.mode(), ZoomMode::Custom);

        assert!(zoom.set_zoom(100.0));
        assert_eq!(zoom.zoom(), 5.0);
        assert!(!zoom.zoom_in());

        assert!(zoom.set_zoom(0.0));
        assert_eq!(zoom.zoom(), 0.1);
    }

    #[test]
    fn set_mode_reports_changes() {
        let mut zoom = ZoomState::new(ZoomConfig::default());
        assert!(!zoom.set_mode(ZoomMode::FitHeight));
        assert!(zoom.set_mode(ZoomMode::FitWidth));
    }

    #[test]
    fn display_size_per_zoom_mode() {
        let page = PageSize::new(600.0, 800.0);
        let container = PixelSize::new(1050, 1000);
        let mut zoom = ZoomState::new(ZoomConfig::default());

        assert_eq!(
            zoom.display_size(page, container, DisplayMode::SinglePage),
            PixelSize::new(750, 1000)
        );

        zoom.set_mode(ZoomMode::FitWidth);
        assert_eq!(
            zoom.display_size(page, container, DisplayMode::SinglePage),
            PixelSize::new(1000, 1333)
        );
        assert_eq!(
            zoom.display_size(page, container, DisplayMode::Book),
            PixelSize::new(500, 666)
        );

        zoom.set_zoom(0.5);
        assert_eq!(
            zoom.display_size(page, container, DisplayMode::SinglePage),
            PixelSize::new(300, 400)
        );
    }

    #[test]
    fn locate_accounts_for_scroll_and_gaps() {
        let sizes = [PixelSize::new(200, 300), PixelSize::new(200, 300)];
        let layout = PageLayout::continuous(&sizes, 400, 10);
        assert_eq!(layout.content_height(), 630.0);

        let hit = layout
            .locate(PixelPoint::new(150.0, 20.0), PixelPoint::default())
            .unwrap();
        assert_eq!(hit.page, 0);
        assert_eq!(hit.location, PixelPoint::new(50.0, 10.0));
        assert_eq!(hit.view_size, PixelSize::new(200, 300));

        // Gap between the pages.
        assert!(layout
            .locate(PixelPoint::new(150.0, 315.0), PixelPoint::default())
            .is_none());

        let hit = layout
            .locate(PixelPoint::new(150.0, 20.0), PixelPoint::new(0.0, 320.0))
            .unwrap();
        assert_eq!(hit.page, 1);
        assert_eq!(hit.location, PixelPoint::new(50.0, 20.0));

        assert!(layout
            .locate(PixelPoint::new(20.0, 20.0), PixelPoint::default())
            .is_none());
    }

    #[test]
    fn page_navigation_is_bounded() {
        assert_eq!(next_page(0, 5, DisplayMode::SinglePage), 1);
        assert_eq!(next_page(4, 5, DisplayMode::SinglePage), 4);
        assert_eq!(next_page(2, 5, DisplayMode::Book), 3);
        assert_eq!(previous_page(0, 5, DisplayMode::SinglePage), 0);
        assert_eq!(previous_page(3, 5, DisplayMode::Book), 1);
        assert_eq!(next_page(0, 0, DisplayMode::SinglePage), 0);
    }
}
