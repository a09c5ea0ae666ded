//! Scripted input for `pdfpick replay`.
//!
//! A script is JSON lines, one event per line:
//!
//! ```text
//! {"event": "down", "page": 0, "x": 120.0, "y": 88.5}
//! {"event": "move", "page": 0, "x": 240.0, "y": 88.5, "modifiers": {"shift": true}}
//! {"event": "key", "key": {"char": "c"}, "modifiers": {"control": true}}
//! {"event": "zoom", "zoom": 1.5}
//! {"event": "next_page"}
//! {"event": "up", "x": 150.0, "y": 40.0}
//! ```
//!
//! With a `page`, pointer coordinates are pixels on that page's image: the
//! page's natural size scaled by the current zoom and turned by the
//! configured rotation. Without one they are viewport pixels over a
//! continuous column of pages, offset by the current scroll position.

use std::io::Write;

use anyhow::{Context, Result};
use pdfpick_core::layout::{next_page, previous_page};
use pdfpick_core::{
    CursorShape, DisplayMode, DocumentEngine, InteractionMode, Key, Modifiers, PageLayout,
    PixelPoint, PixelSize, PointerInput, Rotation, SelectionController, SelectionRange,
    ViewerHost, ZoomConfig, ZoomMode, ZoomState,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{CliHost, HostCall};

/// Gap around every page in the continuous layout.
const PAGE_GAP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PointerEvent {
    /// Page-image coordinates when set, viewport coordinates otherwise.
    #[serde(default)]
    pub page: Option<usize>,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Down(PointerEvent),
    Move(PointerEvent),
    Up(PointerEvent),
    DoubleClick(PointerEvent),
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    SelectAll,
    SelectPage {
        page: usize,
    },
    Clear,
    Copy,
    Zoom {
        zoom: f64,
    },
    ZoomIn,
    ZoomOut,
    Rotate {
        rotation: Rotation,
    },
    /// Absolute scroll offset of the viewport.
    Scroll {
        x: f32,
        y: f32,
    },
    NextPage,
    PreviousPage,
}

/// Parses a script, skipping blank lines. Events carry their 1-based line.
pub fn parse_script(script: &str) -> Result<Vec<(usize, ScriptEvent)>> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let event = serde_json::from_str(line)
                .with_context(|| format!("invalid event on script line {}", index + 1))?;
            Ok((index + 1, event))
        })
        .collect()
}

/// State after one event, printed as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub line: usize,
    pub consumed: bool,
    pub page: usize,
    pub mode: InteractionMode,
    pub cursor: CursorShape,
    pub selection: Option<SelectionRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<HostCall>,
}

pub struct Replayer<E> {
    controller: SelectionController<E>,
    zoom: ZoomState,
    page: usize,
    scroll: PixelPoint,
}

impl<E: DocumentEngine> Replayer<E> {
    pub fn new(controller: SelectionController<E>, zoom: ZoomConfig) -> Self {
        let mut zoom = ZoomState::new(zoom);
        zoom.set_mode(ZoomMode::Custom);
        Self {
            controller,
            zoom,
            page: 0,
            scroll: PixelPoint::default(),
        }
    }

    pub fn controller(&self) -> &SelectionController<E> {
        &self.controller
    }

    fn page_count(&self) -> usize {
        self.controller
            .document()
            .map_or(0, |document| document.page_count())
    }

    /// Size of the image `page` is shown at; empty for unknown pages.
    pub fn view_size(&self, page: usize) -> PixelSize {
        let Some(size) = self
            .controller
            .document()
            .and_then(|document| document.page_size(page))
        else {
            return PixelSize::default();
        };
        let view = self
            .zoom
            .display_size(size, PixelSize::default(), DisplayMode::SinglePage);
        match self.controller.config().rotation {
            Rotation::Rotate90 | Rotation::Rotate270 => PixelSize::new(view.height, view.width),
            Rotation::None | Rotation::Rotate180 => view,
        }
    }

    /// Every page stacked at its current view size, centred in a column just
    /// wide enough for the widest one.
    pub fn layout(&self) -> PageLayout {
        let sizes: Vec<PixelSize> = (0..self.page_count())
            .map(|page| self.view_size(page))
            .collect();
        let widest = sizes.iter().map(|size| size.width).max().unwrap_or(0);
        PageLayout::continuous(&sizes, widest + 2 * PAGE_GAP, PAGE_GAP)
    }

    fn input(&self, event: &PointerEvent) -> PointerInput {
        let location = PixelPoint::new(event.x, event.y);
        let input = match event.page {
            Some(page) => PointerInput::new(page, self.view_size(page), location),
            None => match self.layout().locate(location, self.scroll) {
                Some(hit) => PointerInput::new(hit.page, hit.view_size, hit.location),
                // Between pages; an empty view resolves to nothing.
                None => PointerInput::new(self.page, PixelSize::default(), location),
            },
        };
        input.with_modifiers(event.modifiers)
    }

    /// Makes `page` current and scrolls its top into view.
    fn go_to(&mut self, page: usize) -> bool {
        if page == self.page {
            return false;
        }
        self.page = page;
        if let Some(frame) = self.layout().frames().get(page) {
            self.scroll = PixelPoint::new(0.0, frame.origin.y - PAGE_GAP as f32);
        }
        debug!(page, scroll = self.scroll.y, "page changed");
        true
    }

    /// Feeds one event through the controller. Returns whether it was
    /// consumed.
    pub fn apply<H: ViewerHost>(&mut self, host: &mut H, event: &ScriptEvent) -> Result<bool> {
        let consumed = match event {
            ScriptEvent::Down(pointer) => {
                let input = self.input(pointer);
                self.controller.pointer_down(host, input)
            }
            ScriptEvent::Move(pointer) => {
                let input = self.input(pointer);
                self.controller.pointer_move(host, input)?
            }
            ScriptEvent::Up(pointer) => {
                let input = self.input(pointer);
                self.controller.pointer_up(host, input)
            }
            ScriptEvent::DoubleClick(pointer) => {
                let input = self.input(pointer);
                self.controller.double_click(host, input)
            }
            ScriptEvent::Key { key, modifiers } => self.controller.key_down(host, *key, *modifiers),
            ScriptEvent::SelectAll => self.controller.select_all(),
            ScriptEvent::SelectPage { page } => self.controller.select_page(*page),
            ScriptEvent::Clear => {
                self.controller.clear_selection();
                true
            }
            ScriptEvent::Copy => self.controller.copy_selection(host),
            ScriptEvent::Zoom { zoom } => {
                let changed = self.zoom.set_zoom(*zoom);
                self.zoom_changed(changed)
            }
            ScriptEvent::ZoomIn => {
                let changed = self.zoom.zoom_in();
                self.zoom_changed(changed)
            }
            ScriptEvent::ZoomOut => {
                let changed = self.zoom.zoom_out();
                self.zoom_changed(changed)
            }
            ScriptEvent::Rotate { rotation } => {
                self.controller.set_rotation(*rotation);
                true
            }
            ScriptEvent::Scroll { x, y } => {
                self.scroll = PixelPoint::new(*x, *y);
                true
            }
            ScriptEvent::NextPage => {
                let page = next_page(self.page, self.page_count(), DisplayMode::SinglePage);
                self.go_to(page)
            }
            ScriptEvent::PreviousPage => {
                let page = previous_page(self.page, self.page_count(), DisplayMode::SinglePage);
                self.go_to(page)
            }
        };
        Ok(consumed)
    }

    fn zoom_changed(&mut self, changed: bool) -> bool {
        self.controller.invalidate_pointer_cache();
        debug!(zoom = self.zoom.zoom(), changed, "zoom");
        changed
    }

    fn record(&self, line: usize, consumed: bool, host: Vec<HostCall>) -> EventRecord {
        EventRecord {
            line,
            consumed,
            page: self.page,
            mode: self.controller.mode(),
            cursor: self.controller.cursor(),
            selection: self.controller.selection(),
            host,
        }
    }
}

/// Replays `script`, writing one [`EventRecord`] per event to `out`.
pub fn run<E, W>(replayer: &mut Replayer<E>, host: &mut CliHost, script: &str, mut out: W) -> Result<()>
where
    E: DocumentEngine,
    W: Write,
{
    for (line, event) in parse_script(script)? {
        let consumed = replayer
            .apply(host, &event)
            .with_context(|| format!("failed to replay script line {line}"))?;
        let record = replayer.record(line, consumed, host.take_calls());
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
