//! Text selection ranges spanning one or more pages.
//!
//! A [`SelectionRange`] keeps its endpoints in input order: `start` is where
//! the gesture began and `end` follows the pointer, so `end` may precede
//! `start`. Readers normalize; writers never do, except when a gesture ends.

use serde::{Deserialize, Serialize};

use crate::engine::{DocumentEngine, TextSpan, WordSpan};

/// A character position in reading order: page first, then index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TextPosition {
    pub page: usize,
    pub index: usize,
}

impl TextPosition {
    pub fn new(page: usize, index: usize) -> Self {
        Self { page, index }
    }
}

/// Extension unit while dragging out a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Character,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: TextPosition,
    /// `None` while a gesture has an anchor but no extent yet.
    pub end: Option<TextPosition>,
}

impl SelectionRange {
    /// Anchor only: selection started, nothing covered yet.
    pub fn anchored(start: TextPosition) -> Self {
        Self { start, end: None }
    }

    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// A single character.
    pub fn point(position: TextPosition) -> Self {
        Self::new(position, position)
    }

    /// The span of `word` on `page`. The end index is `offset + length`,
    /// the same inclusive reading every other end index gets.
    pub fn word(page: usize, word: WordSpan) -> Self {
        Self::new(
            TextPosition::new(page, word.offset),
            TextPosition::new(page, word.offset + word.length),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.end.is_none()
    }

    pub fn normalized(&self) -> Self {
        match self.end {
            Some(end) if end < self.start => Self {
                start: end,
                end: Some(self.start),
            },
            _ => *self,
        }
    }

    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Combines the gesture anchor with the range under the pointer. Start
    /// stays at the anchor; the result is not normalized.
    pub fn merge(anchor: &SelectionRange, live: &SelectionRange, granularity: Granularity) -> Self {
        let end = match granularity {
            Granularity::Character => live.start,
            Granularity::Word => live.end.unwrap_or(live.start),
        };
        Self::new(anchor.start, end)
    }

    pub fn contains(&self, page: usize, index: usize) -> bool {
        let normalized = self.normalized();
        let Some(end) = normalized.end else {
            return false;
        };
        let position = TextPosition::new(page, index);
        normalized.start <= position && position <= end
    }

    /// Span read for text extraction on `page`. The last page reads through
    /// the end character inclusively: `end - start + 1`.
    pub fn text_span<E: DocumentEngine>(&self, engine: &E, page: usize) -> Option<TextSpan> {
        let normalized = self.normalized();
        let end = normalized.end?;
        if page < normalized.start.page || page > end.page {
            return None;
        }
        let start = if page == normalized.start.page {
            normalized.start.index
        } else {
            0
        };
        let stop = if page == end.page {
            end.index
        } else {
            engine.character_count(page)
        };
        Some(TextSpan::new(
            page,
            start,
            (stop + 1).saturating_sub(start),
        ))
    }

    /// Span used for highlight geometry on `page`. The last page ends at the
    /// exclusive boundary `end + 1`, giving `end + 1 - start`.
    pub fn highlight_span<E: DocumentEngine>(&self, engine: &E, page: usize) -> Option<TextSpan> {
        let normalized = self.normalized();
        let end = normalized.end?;
        if page < normalized.start.page || page > end.page {
            return None;
        }
        let start = if page == normalized.start.page {
            normalized.start.index
        } else {
            0
        };
        let stop = if page == end.page {
            end.index + 1
        } else {
            engine.character_count(page)
        };
        Some(TextSpan::new(page, start, stop.saturating_sub(start)))
    }

    /// Text covered by the range, pages joined with `\n`. Empty ranges yield
    /// an empty string.
    pub fn extract_text<E: DocumentEngine>(&self, engine: &E) -> String {
        let normalized = self.normalized();
        let Some(end) = normalized.end else {
            return String::new();
        };

        let mut text = String::new();
        for page in normalized.start.page..=end.page {
            if page != normalized.start.page {
                text.push('\n');
            }
            if let Some(span) = normalized.text_span(engine, page) {
                text.push_str(&engine.text(span));
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;

    fn range(start_page: usize, start: usize, end_page: usize, end: usize) -> SelectionRange {
        SelectionRange::new(
            TextPosition::new(start_page, start),
            TextPosition::new(end_page, end),
        )
    }

    #[test]
    fn empty_when_end_is_missing() {
        let anchored = SelectionRange::anchored(TextPosition::new(0, 3));
        assert!(anchored.is_empty());
        assert!(!range(0, 3, 0, 3).is_empty());
        assert!(!anchored.contains(0, 3));
    }

    #[test]
    fn normalize_is_idempotent_and_keeps_endpoints() {
        let samples = [
            range(0, 0, 0, 0),
            range(0, 9, 0, 2),
            range(3, 1, 1, 7),
            range(1, 7, 3, 1),
            range(2, 5, 2, 5),
            SelectionRange::anchored(TextPosition::new(4, 4)),
        ];
        for sample in samples {
            let once = sample.normalized();
            assert_eq!(once.normalized(), once);

            let mut before = vec![Some(sample.start), sample.end];
            let mut after = vec![Some(once.start), once.end];
            before.sort();
            after.sort();
            assert_eq!(before, after);

            if let Some(end) = once.end {
                assert!(once.start <= end);
            }
        }
    }

    #[test]
    fn contains_follows_reading_order() {
        let selection = range(2, 3, 0, 5);
        for index in [0, 5, 100] {
            assert!(selection.contains(1, index));
        }
        assert!(!selection.contains(0, 4));
        assert!(selection.contains(0, 5));
        assert!(!selection.contains(2, 4));
        assert!(selection.contains(2, 3));
        assert!(!selection.contains(3, 0));
    }

    #[test]
    fn merge_keeps_anchor_as_start() {
        let anchor = SelectionRange::anchored(TextPosition::new(1, 5));
        let live = SelectionRange::point(TextPosition::new(1, 2));
        let merged = SelectionRange::merge(&anchor, &live, Granularity::Character);
        assert_eq!(merged, range(1, 5, 1, 2));
        assert_eq!(merged.normalized(), range(1, 2, 1, 5));
    }

    #[test]
    fn word_merge_extends_to_end_of_word() {
        let anchor = SelectionRange::word(0, WordSpan { offset: 0, length: 5 });
        let live = SelectionRange::word(2, WordSpan { offset: 6, length: 4 });
        let merged = SelectionRange::merge(&anchor, &live, Granularity::Word);
        assert_eq!(merged, range(0, 0, 2, 10));
    }

    #[test]
    fn extract_text_reads_end_inclusively() {
        let engine = FakeEngine::new(&["abcdefghij"]);
        assert_eq!(range(0, 2, 0, 5).extract_text(&engine), "cdef");
        assert_eq!(range(0, 5, 0, 2).extract_text(&engine), "cdef");
    }

    #[test]
    fn extract_text_joins_pages_with_newlines() {
        let engine = FakeEngine::new(&["first page", "middle", "last page"]);
        let text = range(0, 6, 2, 3).extract_text(&engine);
        assert_eq!(text, "page\nmiddle\nlast");
    }

    #[test]
    fn extract_text_of_empty_range_is_empty() {
        let engine = FakeEngine::new(&["abc"]);
        let anchored = SelectionRange::anchored(TextPosition::new(0, 1));
        assert_eq!(anchored.extract_text(&engine), "");
    }

    #[test]
    fn textual_and_visual_spans_use_different_boundaries() {
        let engine = FakeEngine::new(&["abcdefghij", "klmnopqrst"]);
        let selection = range(0, 7, 1, 4);

        assert_eq!(selection.text_span(&engine, 0), Some(TextSpan::new(0, 7, 4)));
        assert_eq!(
            selection.highlight_span(&engine, 0),
            Some(TextSpan::new(0, 7, 3))
        );
        assert_eq!(selection.text_span(&engine, 1), Some(TextSpan::new(1, 0, 5)));
        assert_eq!(
            selection.highlight_span(&engine, 1),
            Some(TextSpan::new(1, 0, 5))
        );
        assert_eq!(selection.text_span(&engine, 2), None);
    }
}
