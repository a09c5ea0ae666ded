//! Character geometry of one page, extracted once and queried per pointer
//! event.

use std::cmp::Ordering;

use pdfpick_core::{DocumentRect, Tolerance, WordSpan};

#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    pub ch: char,
    /// `None` for characters the engine generated without a glyph box, such
    /// as inferred spaces and line breaks.
    pub bounds: Option<DocumentRect>,
}

#[derive(Debug, Clone, Default)]
pub struct PageText {
    chars: Vec<TextChar>,
}

impl PageText {
    pub fn new(chars: Vec<TextChar>) -> Self {
        Self { chars }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The character whose box, grown by `tolerance` on every side, contains
    /// the point. Overlapping hits go to the nearest box.
    pub fn char_index_at(&self, x: f32, y: f32, tolerance: Tolerance) -> Option<usize> {
        self.chars
            .iter()
            .enumerate()
            .filter_map(|(index, ch)| {
                let bounds = ch.bounds?;
                let (dx, dy) = outside_distance(&bounds, x, y);
                (dx <= tolerance.x && dy <= tolerance.y).then_some((index, dx * dx + dy * dy))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(index, _)| index)
    }

    pub fn word_at(&self, x: f32, y: f32, tolerance: Tolerance) -> Option<WordSpan> {
        let index = self.char_index_at(x, y, tolerance)?;
        if !is_word_char(self.chars[index].ch) {
            return None;
        }

        let mut start = index;
        while start > 0 && is_word_char(self.chars[start - 1].ch) {
            start -= 1;
        }
        let mut end = index + 1;
        while end < self.chars.len() && is_word_char(self.chars[end].ch) {
            end += 1;
        }
        Some(WordSpan {
            offset: start,
            length: end - start,
        })
    }

    /// Characters `offset..offset + length`, clamped to the page.
    pub fn text(&self, offset: usize, length: usize) -> String {
        self.chars
            .iter()
            .skip(offset)
            .take(length)
            .map(|ch| ch.ch)
            .collect()
    }

    /// One rectangle per run of boxed characters sharing a line.
    pub fn rects(&self, offset: usize, length: usize) -> Vec<DocumentRect> {
        let mut rects: Vec<DocumentRect> = Vec::new();
        for bounds in self
            .chars
            .iter()
            .skip(offset)
            .take(length)
            .filter_map(|ch| ch.bounds)
        {
            match rects.last_mut() {
                Some(last) if same_line(last, &bounds) => *last = last.union(&bounds),
                _ => rects.push(bounds),
            }
        }
        rects
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '-'
}

fn span(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}

/// Horizontal and vertical distance from the point to the box; zero inside.
fn outside_distance(rect: &DocumentRect, x: f32, y: f32) -> (f32, f32) {
    let (left, right) = span(rect.left, rect.right);
    let (low, high) = span(rect.top, rect.bottom);
    let dx = (left - x).max(x - right).max(0.0);
    let dy = (low - y).max(y - high).max(0.0);
    (dx, dy)
}

/// The new box's vertical centre falls within the line collected so far.
fn same_line(line: &DocumentRect, next: &DocumentRect) -> bool {
    let (low, high) = span(line.top, line.bottom);
    let centre = (next.top + next.bottom) / 2.0;
    centre >= low && centre <= high
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays `lines` out in PDF space: 10-unit cells, first line at the top.
    fn page(lines: &[&str]) -> PageText {
        let mut chars = Vec::new();
        for (row, line) in lines.iter().enumerate() {
            if row > 0 {
                chars.push(TextChar {
                    ch: '\n',
                    bounds: None,
                });
            }
            let top = 700.0 - row as f32 * 20.0;
            for (column, ch) in line.chars().enumerate() {
                let left = column as f32 * 10.0;
                chars.push(TextChar {
                    ch,
                    bounds: Some(DocumentRect::new(left, top, left + 10.0, top - 10.0)),
                });
            }
        }
        PageText::new(chars)
    }

    #[test]
    fn char_hits_respect_tolerance() {
        let text = page(&["abc"]);
        let tolerance = Tolerance::default();

        assert_eq!(text.char_index_at(15.0, 695.0, tolerance), Some(1));
        assert_eq!(text.char_index_at(33.0, 695.0, tolerance), Some(2));
        assert_eq!(text.char_index_at(35.0, 695.0, tolerance), None);
        assert_eq!(text.char_index_at(15.0, 703.0, tolerance), Some(1));
        assert_eq!(text.char_index_at(15.0, 720.0, tolerance), None);
        assert_eq!(
            text.char_index_at(35.0, 695.0, Tolerance { x: 6.0, y: 0.0 }),
            Some(2)
        );
    }

    #[test]
    fn overlapping_hits_pick_the_nearest_box() {
        let text = page(&["ab"]);
        // Inside the tolerance of both characters, but within 'b'.
        assert_eq!(text.char_index_at(11.0, 695.0, Tolerance::default()), Some(1));
        assert_eq!(text.char_index_at(9.0, 695.0, Tolerance::default()), Some(0));
    }

    #[test]
    fn unboxed_characters_are_never_hit() {
        let text = page(&["ab", "cd"]);
        assert_eq!(text.len(), 5);
        assert_eq!(text.char_index_at(5.0, 675.0, Tolerance::default()), Some(3));
    }

    #[test]
    fn words_expand_over_word_characters() {
        let text = page(&["don't stop-gap now"]);
        let tolerance = Tolerance::default();

        assert_eq!(
            text.word_at(25.0, 695.0, tolerance),
            Some(WordSpan {
                offset: 0,
                length: 5
            })
        );
        assert_eq!(
            text.word_at(85.0, 695.0, tolerance),
            Some(WordSpan {
                offset: 6,
                length: 8
            })
        );
        // On the space between words.
        assert_eq!(text.word_at(55.0, 695.0, tolerance), None);
    }

    #[test]
    fn text_is_clamped_to_the_page() {
        let text = page(&["hello"]);
        assert_eq!(text.text(1, 3), "ell");
        assert_eq!(text.text(3, 10), "lo");
        assert_eq!(text.text(9, 2), "");
    }

    #[test]
    fn rects_merge_per_line() {
        let text = page(&["abc", "de"]);
        let rects = text.rects(1, 5);
        assert_eq!(
            rects,
            vec![
                DocumentRect::new(10.0, 700.0, 30.0, 690.0),
                DocumentRect::new(0.0, 680.0, 20.0, 670.0),
            ]
        );
        assert!(text.rects(3, 1).is_empty());
    }
}
