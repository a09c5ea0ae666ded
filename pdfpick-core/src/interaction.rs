//! Pointer and keyboard handling for text selection and links.
//!
//! ```text
//! Idle -> SelectingChar      (press on a character)
//! Idle -> DragPending        (press inside the current selection)
//! Idle -> SelectingWord      (double click on a word)
//! DragPending -> Dragging    (move past the drag threshold)
//! Dragging -> Idle           (drag handed to the host)
//! Any -> Idle                (release, or press outside text)
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::{CursorMode, ViewerConfig};
use crate::engine::{DocumentEngine, WordSpan};
use crate::error::{HostError, InteractionError};
use crate::geometry::{DocumentPoint, PixelPoint, PixelRect, PixelSize};
use crate::links::{hit_test, Link, LinkClickEvent, PageLinks};
use crate::mapper::{CoordinateMapper, Rotation};
use crate::pointer::{PointerCache, PointerState};
use crate::selection::{Granularity, SelectionRange, TextPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Idle,
    SelectingChar,
    SelectingWord,
    DragPending,
    /// Only held while the selected text is handed to the host.
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorShape {
    #[default]
    Default,
    TextCaret,
    LinkPointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
        alt: false,
    };
    pub const CONTROL: Modifiers = Modifiers {
        shift: false,
        control: true,
        alt: false,
    };

    fn is_control_only(&self) -> bool {
        self.control && !self.shift && !self.alt
    }

    fn is_shift_only(&self) -> bool {
        self.shift && !self.control && !self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Insert,
    Other,
}

/// A pointer event on one page image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub page: usize,
    pub view_size: PixelSize,
    pub location: PixelPoint,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(page: usize, view_size: PixelSize, location: PixelPoint) -> Self {
        Self {
            page,
            view_size,
            location,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Everything outside the core that a gesture can reach: pointer capture,
/// clipboard, drag and drop, navigation and process launch.
pub trait ViewerHost {
    fn capture_pointer(&mut self) {}

    fn release_pointer(&mut self) {}

    /// The selection changed and highlights need repainting.
    fn selection_changed(&mut self) {}

    fn set_clipboard_text(&mut self, text: &str) -> Result<(), HostError>;

    /// Starts a drag of `text`. The controller does not wait for the outcome.
    fn begin_drag(&mut self, text: &str);

    /// Runs before the default link behaviour; set `handled` to suppress it.
    fn on_link_click(&mut self, _event: &mut LinkClickEvent) {}

    fn go_to_page(&mut self, page: usize);

    fn open_uri(&mut self, uri: &str) -> Result<(), HostError>;
}

/// Per-gesture bookkeeping, from press to release.
#[derive(Debug, Clone, Copy, Default)]
struct Gesture {
    press: Option<PixelPoint>,
    selection_changed: bool,
    dragged: bool,
}

/// Selection and link interaction for one open document view.
pub struct SelectionController<E> {
    document: Option<E>,
    config: ViewerConfig,
    mapper: CoordinateMapper,
    selection: Option<SelectionRange>,
    anchor: Option<SelectionRange>,
    mode: InteractionMode,
    pointer: PointerCache,
    links: PageLinks,
    cursor: CursorShape,
    gesture: Gesture,
}

impl<E: DocumentEngine> SelectionController<E> {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            document: None,
            mapper: CoordinateMapper::new(config.rotation),
            config,
            selection: None,
            anchor: None,
            mode: InteractionMode::Idle,
            pointer: PointerCache::new(),
            links: PageLinks::default(),
            cursor: CursorShape::Default,
            gesture: Gesture::default(),
        }
    }

    pub fn with_document(config: ViewerConfig, document: E) -> Self {
        let mut controller = Self::new(config);
        controller.load_document(document);
        controller
    }

    pub fn load_document(&mut self, document: E) -> Option<E> {
        let previous = self.close_document();
        self.document = Some(document);
        previous
    }

    pub fn close_document(&mut self) -> Option<E> {
        self.reset();
        self.links.clear();
        self.cursor = CursorShape::Default;
        self.document.take()
    }

    pub fn document(&self) -> Option<&E> {
        self.document.as_ref()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.config.cursor_mode = mode;
    }

    pub fn set_follow_links(&mut self, follow: bool) {
        self.config.follow_links = follow;
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.config.rotation = rotation;
        self.mapper.set_rotation(rotation);
        self.pointer.invalidate();
    }

    /// Drops the cached pointer lookup. Hosts call this after zooming or
    /// re-laying out pages, since the cache is keyed on page and location
    /// only.
    pub fn invalidate_pointer_cache(&mut self) {
        self.pointer.invalidate();
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn anchor(&self) -> Option<SelectionRange> {
        self.anchor
    }

    /// The current selection in reading order, if it covers anything.
    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection
            .filter(|selection| !selection.is_empty())
            .map(|selection| selection.normalized())
    }

    /// The raw working range, in gesture order.
    pub fn raw_selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    pub fn is_text_selected(&self) -> bool {
        self.selection().is_some()
    }

    pub fn selected_text(&self) -> Option<String> {
        let document = self.document.as_ref()?;
        let selection = self.selection()?;
        Some(selection.extract_text(document))
    }

    pub fn select_all(&mut self) -> bool {
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        let page_count = document.page_count();
        if page_count == 0 {
            return false;
        }
        let last = page_count - 1;
        let start = TextPosition::new(0, 0);
        self.selection = Some(match document.character_count(last).checked_sub(1) {
            Some(index) => SelectionRange::new(start, TextPosition::new(last, index)),
            None => SelectionRange::anchored(start),
        });
        true
    }

    pub fn select_page(&mut self, page: usize) -> bool {
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        if page >= document.page_count() {
            return false;
        }
        let start = TextPosition::new(page, 0);
        self.selection = Some(match document.character_count(page).checked_sub(1) {
            Some(index) => SelectionRange::new(start, TextPosition::new(page, index)),
            None => SelectionRange::anchored(start),
        });
        true
    }

    /// Explicit deselect. Also abandons any gesture in progress.
    pub fn clear_selection(&mut self) {
        self.reset();
    }

    /// Copies the selected text. Returns whether anything was handed to the
    /// clipboard; clipboard failures are logged and otherwise ignored.
    pub fn copy_selection<H: ViewerHost>(&self, host: &mut H) -> bool {
        let Some(text) = self.selected_text().filter(|text| !text.is_empty()) else {
            return false;
        };
        if let Err(err) = host.set_clipboard_text(&text) {
            warn!(%err, "failed to copy selection");
        }
        true
    }

    /// Highlight rectangles for `page` rendered at `view_size`.
    pub fn highlight_rects(&self, page: usize, view_size: PixelSize) -> Vec<PixelRect> {
        let (Some(document), Some(selection)) = (self.document.as_ref(), self.selection()) else {
            return Vec::new();
        };
        let Some(span) = selection.highlight_span(document, page) else {
            return Vec::new();
        };
        document
            .text_rects(span)
            .into_iter()
            .filter_map(|rect| {
                self.mapper
                    .rect_to_viewport(Some(document), page, view_size, rect)
            })
            .collect()
    }

    pub fn pointer_down<H: ViewerHost>(&mut self, host: &mut H, input: PointerInput) -> bool {
        if self.config.cursor_mode == CursorMode::Pan {
            return false;
        }
        let state = self.resolve(&input);
        let Some(point) = state.document_location else {
            return false;
        };

        let Some(index) = state.character_index else {
            debug!(page = point.page, "press outside text, clearing selection");
            let had_selection = self.selection.is_some();
            self.reset();
            host.release_pointer();
            if had_selection {
                host.selection_changed();
            }
            return true;
        };

        self.gesture = Gesture {
            press: Some(input.location),
            ..Gesture::default()
        };
        let position = TextPosition::new(point.page, index);
        let inside_selection = self
            .selection
            .is_some_and(|selection| selection.contains(position.page, position.index));

        if inside_selection {
            self.transition(InteractionMode::DragPending);
        } else if let Some(anchor) = self.anchor.filter(|_| input.modifiers.is_shift_only()) {
            let live = SelectionRange::point(position);
            self.selection = Some(SelectionRange::merge(&anchor, &live, Granularity::Character));
            self.gesture.selection_changed = true;
            host.selection_changed();
            self.transition(InteractionMode::SelectingChar);
        } else {
            let anchor = SelectionRange::anchored(position);
            self.anchor = Some(anchor);
            self.selection = Some(anchor);
            host.selection_changed();
            self.transition(InteractionMode::SelectingChar);
        }

        host.capture_pointer();
        true
    }

    pub fn double_click<H: ViewerHost>(&mut self, host: &mut H, input: PointerInput) -> bool {
        if self.config.cursor_mode == CursorMode::Pan {
            return false;
        }
        let state = self.resolve(&input);
        let Some(point) = state.document_location else {
            return false;
        };
        let Some(word) = self.word_at(point) else {
            return false;
        };

        let range = SelectionRange::word(point.page, word);
        self.anchor = Some(range);
        self.selection = Some(range);
        self.gesture = Gesture {
            press: Some(input.location),
            selection_changed: true,
            dragged: false,
        };
        self.transition(InteractionMode::SelectingWord);
        host.capture_pointer();
        host.selection_changed();
        true
    }

    pub fn pointer_move<H: ViewerHost>(
        &mut self,
        host: &mut H,
        input: PointerInput,
    ) -> Result<bool, InteractionError> {
        if self.config.cursor_mode == CursorMode::Pan {
            return Ok(false);
        }

        if self.mode == InteractionMode::DragPending && self.drag_threshold_met(input.location) {
            self.start_drag(host);
            return Ok(true);
        }

        let state = self.resolve(&input);
        let Some(point) = state.document_location else {
            self.cursor = CursorShape::Default;
            return Ok(false);
        };

        if self.link_at(&input, point).is_some() {
            self.cursor = CursorShape::LinkPointer;
            return Ok(true);
        }

        let Some(index) = state.character_index else {
            self.cursor = CursorShape::Default;
            return Ok(true);
        };
        self.cursor = CursorShape::TextCaret;

        match self.mode {
            InteractionMode::SelectingChar => {
                let anchor = self.anchor.ok_or(InteractionError::MissingAnchor)?;
                let live = SelectionRange::point(TextPosition::new(point.page, index));
                self.update_selection(
                    host,
                    SelectionRange::merge(&anchor, &live, Granularity::Character),
                );
            }
            InteractionMode::SelectingWord => {
                let anchor = self.anchor.ok_or(InteractionError::MissingAnchor)?;
                if let Some(word) = self.word_at(point) {
                    let live = SelectionRange::word(point.page, word);
                    self.update_selection(
                        host,
                        SelectionRange::merge(&anchor, &live, Granularity::Word),
                    );
                }
            }
            InteractionMode::Idle | InteractionMode::DragPending | InteractionMode::Dragging => {}
        }
        Ok(true)
    }

    pub fn pointer_up<H: ViewerHost>(&mut self, host: &mut H, input: PointerInput) -> bool {
        if self.config.cursor_mode == CursorMode::Pan {
            return false;
        }

        let was_active = self.mode != InteractionMode::Idle;
        let gesture = std::mem::take(&mut self.gesture);
        self.transition(InteractionMode::Idle);
        host.release_pointer();
        if let Some(selection) = self.selection.as_mut() {
            let before = *selection;
            selection.normalize();
            if *selection != before {
                host.selection_changed();
            }
        }

        if !self.config.follow_links || gesture.selection_changed || gesture.dragged {
            return was_active;
        }

        let state = self.resolve(&input);
        let link = state
            .document_location
            .and_then(|point| self.link_at(&input, point));
        match link {
            Some(link) => {
                self.activate_link(host, link);
                true
            }
            None => was_active,
        }
    }

    pub fn key_down<H: ViewerHost>(&mut self, host: &mut H, key: Key, modifiers: Modifiers) -> bool {
        if !modifiers.is_control_only() {
            return false;
        }
        match key {
            Key::Char('a') | Key::Char('A') => {
                if self.select_all() {
                    host.selection_changed();
                }
                true
            }
            Key::Char('c') | Key::Char('C') | Key::Insert => {
                self.copy_selection(host);
                true
            }
            _ => false,
        }
    }

    fn activate_link<H: ViewerHost>(&self, host: &mut H, link: Link) {
        let mut event = LinkClickEvent::new(link);
        host.on_link_click(&mut event);
        if event.handled {
            debug!("link click handled by host");
            return;
        }

        if let Some(page) = event.link.target_page {
            host.go_to_page(page);
        } else if let Some(uri) = event.link.uri.as_deref().filter(|uri| !uri.is_empty()) {
            if let Err(err) = host.open_uri(uri) {
                warn!(%err, "failed to open link");
            }
        }
    }

    fn start_drag<H: ViewerHost>(&mut self, host: &mut H) {
        self.transition(InteractionMode::Dragging);
        self.gesture.dragged = true;
        if let Some(text) = self.selected_text() {
            host.begin_drag(&text);
        }
        host.release_pointer();
        self.transition(InteractionMode::Idle);
    }

    fn drag_threshold_met(&self, location: PixelPoint) -> bool {
        match self.gesture.press {
            Some(press) => press.distance(location) >= self.config.drag_threshold,
            None => true,
        }
    }

    fn update_selection<H: ViewerHost>(&mut self, host: &mut H, selection: SelectionRange) {
        if self.selection != Some(selection) {
            self.selection = Some(selection);
            self.gesture.selection_changed = true;
            host.selection_changed();
        }
    }

    fn resolve(&mut self, input: &PointerInput) -> Rc<PointerState> {
        self.pointer.resolve(
            &self.mapper,
            self.document.as_ref(),
            input.page,
            input.view_size,
            input.location,
            self.config.tolerance,
        )
    }

    fn word_at(&self, point: DocumentPoint) -> Option<WordSpan> {
        self.document
            .as_ref()?
            .word_at(point, self.config.tolerance)
    }

    fn link_at(&mut self, input: &PointerInput, point: DocumentPoint) -> Option<Link> {
        let document = self.document.as_ref()?;
        let links = self.links.get(document, input.page, input.view_size);
        hit_test(&links, point).cloned()
    }

    fn transition(&mut self, next: InteractionMode) {
        if self.mode != next {
            trace!(from = ?self.mode, to = ?next, "interaction mode");
            self.mode = next;
        }
    }

    /// Clears selection, anchor, mode and pointer cache together.
    fn reset(&mut self) {
        self.selection = None;
        self.anchor = None;
        self.mode = InteractionMode::Idle;
        self.pointer.invalidate();
        self.gesture = Gesture::default();
    }
}
