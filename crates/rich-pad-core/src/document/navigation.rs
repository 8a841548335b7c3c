//! Boundary queries and caret arithmetic.
//!
//! Every function takes a caret by value and returns a new one. A caret that
//! does not resolve is returned unchanged.

use super::Document;
use crate::caret::CaretPosition;

impl Document {
    // ── Boundaries ─────────────────────────────────────────────────────

    pub fn is_start_of_document(&self, caret: CaretPosition) -> bool {
        caret.paragraph == 0 && caret.element == 0 && caret.offset == 0
    }

    pub fn is_end_of_document(&self, caret: CaretPosition) -> bool {
        caret == self.end_of_document()
    }

    pub fn is_start_of_paragraph(&self, caret: CaretPosition) -> bool {
        caret.element == 0 && caret.offset == 0
    }

    pub fn is_end_of_paragraph(&self, caret: CaretPosition) -> bool {
        self.end_of_paragraph(caret.paragraph) == Some(caret)
    }

    pub fn is_start_of_element(&self, caret: CaretPosition) -> bool {
        caret.offset == 0
    }

    pub fn is_end_of_element(&self, caret: CaretPosition) -> bool {
        self.element_at(caret).is_some_and(|e| e.len() == caret.offset)
    }

    /// True when the char just before the caret is a space.
    pub fn is_word_start(&self, caret: CaretPosition) -> bool {
        caret.offset > 0
            && self
                .element_at(caret)
                .and_then(|e| e.char_at(caret.offset - 1))
                == Some(' ')
    }

    // ── Positions ──────────────────────────────────────────────────────

    pub fn start_of_document(&self) -> CaretPosition {
        CaretPosition::default()
    }

    pub fn end_of_document(&self) -> CaretPosition {
        self.paragraphs
            .len()
            .checked_sub(1)
            .and_then(|last| self.end_of_paragraph(last))
            .unwrap_or_default()
    }

    pub fn start_of_paragraph(&self, paragraph: usize) -> CaretPosition {
        CaretPosition::new(paragraph, 0, 0)
    }

    pub fn end_of_paragraph(&self, paragraph: usize) -> Option<CaretPosition> {
        let p = self.paragraphs.get(paragraph)?;
        let last = p.elements.len().checked_sub(1)?;
        Some(CaretPosition::new(paragraph, last, p.elements[last].len()))
    }

    pub fn start_of_element(&self, paragraph: usize, element: usize) -> CaretPosition {
        CaretPosition::new(paragraph, element, 0)
    }

    pub fn end_of_element(&self, paragraph: usize, element: usize) -> Option<CaretPosition> {
        let len = self.element(paragraph, element)?.len();
        Some(CaretPosition::new(paragraph, element, len))
    }

    pub fn move_to_element_start(&self, caret: CaretPosition) -> CaretPosition {
        caret.with_offset(0).with_before_split(false)
    }

    pub fn move_to_paragraph_start(&self, caret: CaretPosition) -> CaretPosition {
        self.start_of_paragraph(caret.paragraph)
    }

    /// End of the caret's paragraph, flagged to stay on the last visual line.
    pub fn move_to_paragraph_end(&self, caret: CaretPosition) -> CaretPosition {
        self.end_of_paragraph(caret.paragraph)
            .map(|c| c.with_before_split(true))
            .unwrap_or(caret)
    }

    // ── Stepping ───────────────────────────────────────────────────────

    /// One step right.
    ///
    /// Leaving an element lands on offset 1 of the next element when
    /// `unit_spacing` is set (the end of one element and the start of the
    /// next are the same visual spot), else on offset 0. Leaving a paragraph
    /// lands on the start of the next one. No-op at the end of the document.
    pub fn move_right(&self, caret: CaretPosition, unit_spacing: bool) -> CaretPosition {
        let Some(paragraph) = self.paragraph_at(caret) else {
            return caret;
        };
        let Some(element) = paragraph.element(caret.element) else {
            return caret;
        };
        if element.has_offset(caret.offset + 1) {
            caret.move_offset(1).with_before_split(false)
        } else if caret.element + 1 < paragraph.len() {
            let next = caret.next_element();
            let len = paragraph.elements[next.element].len();
            next.with_offset(usize::from(unit_spacing).min(len))
        } else if caret.paragraph + 1 < self.paragraphs.len() {
            caret.next_paragraph()
        } else {
            caret
        }
    }

    /// One step left; the mirror of [`Document::move_right`].
    ///
    /// Leaving a paragraph lands on the end of the previous one.
    pub fn move_left(&self, caret: CaretPosition, unit_spacing: bool) -> CaretPosition {
        if !self.is_valid(caret) {
            return caret;
        }
        if caret.offset > 0 {
            caret.move_offset(-1).with_before_split(false)
        } else if caret.element > 0 {
            let element = caret.element - 1;
            let len = self
                .element(caret.paragraph, element)
                .map_or(0, |e| e.len());
            let offset = len.saturating_sub(usize::from(unit_spacing));
            CaretPosition::new(caret.paragraph, element, offset)
        } else if caret.paragraph > 0 {
            self.end_of_paragraph(caret.paragraph - 1).unwrap_or(caret)
        } else {
            caret
        }
    }

    /// Steps left until a word start, a paragraph start or the document start.
    pub fn move_word_left(&self, caret: CaretPosition) -> CaretPosition {
        let mut current = caret;
        while !self.is_start_of_document(current) {
            let next = self.move_left(current, false);
            if next == current {
                break;
            }
            current = next;
            if self.is_word_start(current) || self.is_start_of_paragraph(current) {
                break;
            }
        }
        current
    }

    /// Steps right until a word start, a paragraph start or the document end.
    pub fn move_word_right(&self, caret: CaretPosition) -> CaretPosition {
        let mut current = caret;
        while !self.is_end_of_document(current) {
            let next = self.move_right(current, false);
            if next == current {
                break;
            }
            current = next;
            if self.is_word_start(current) || self.is_start_of_paragraph(current) {
                break;
            }
        }
        current
    }

    // ── Paragraph-linear offsets ───────────────────────────────────────

    /// Offset of the caret counted from the start of its paragraph.
    ///
    /// Splitting or merging runs preserves linear offsets, so they survive
    /// restyling while element indices do not.
    pub fn linear_offset(&self, caret: CaretPosition) -> Option<usize> {
        let paragraph = self.paragraph_at(caret)?;
        let before: usize = paragraph
            .elements
            .get(..caret.element)?
            .iter()
            .map(|e| e.len())
            .sum();
        paragraph
            .element(caret.element)?
            .has_offset(caret.offset)
            .then_some(before + caret.offset)
    }

    /// Inverse of [`Document::linear_offset`].
    ///
    /// At an element boundary, `prefer_next` picks the start of the following
    /// element over the end of the preceding one.
    pub fn caret_at_linear(
        &self,
        paragraph: usize,
        linear: usize,
        prefer_next: bool,
    ) -> Option<CaretPosition> {
        let p = self.paragraphs.get(paragraph)?;
        let mut remaining = linear;
        for (index, element) in p.elements.iter().enumerate() {
            let len = element.len();
            let is_last = index + 1 == p.elements.len();
            if remaining < len || (remaining == len && (!prefer_next || is_last)) {
                return Some(CaretPosition::new(paragraph, index, remaining));
            }
            remaining -= len;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::caret::CaretPosition;
    use crate::document::Document;
    use crate::element::{ImageData, Paragraph, RichTextElement};

    fn c(p: usize, e: usize, o: usize) -> CaretPosition {
        CaretPosition::new(p, e, o)
    }

    /// "ab[img]cd" / "" / "one two"
    fn doc() -> Document {
        Document::new(vec![
            Paragraph::new(vec![
                RichTextElement::run("ab"),
                RichTextElement::image(ImageData::new(vec![1u8])),
                RichTextElement::run("cd"),
            ]),
            Paragraph::empty(),
            Paragraph::from_text("one two"),
        ])
    }

    // ── Boundaries ─────────────────────────────────────────────────────

    #[test]
    fn test_boundaries() {
        let doc = doc();
        assert!(doc.is_start_of_document(c(0, 0, 0)));
        assert!(!doc.is_start_of_document(c(0, 0, 1)));
        assert_eq!(doc.end_of_document(), c(2, 0, 7));
        assert!(doc.is_end_of_document(c(2, 0, 7)));
        assert!(doc.is_start_of_paragraph(c(1, 0, 0)));
        assert!(doc.is_end_of_paragraph(c(1, 0, 0)));
        assert!(doc.is_start_of_element(c(0, 2, 0)));
        assert!(doc.is_end_of_element(c(0, 1, 1)));
        assert!(doc.is_word_start(c(2, 0, 4)));
        assert!(!doc.is_word_start(c(2, 0, 3)));
    }

    #[test]
    fn test_positions() {
        let doc = doc();
        assert_eq!(doc.end_of_paragraph(0), Some(c(0, 2, 2)));
        assert_eq!(doc.end_of_paragraph(9), None);
        assert_eq!(doc.end_of_element(0, 1), Some(c(0, 1, 1)));
        let end = doc.move_to_paragraph_end(c(0, 0, 1));
        assert_eq!(end, c(0, 2, 2));
        assert!(end.before_split);
        assert_eq!(doc.move_to_paragraph_start(c(0, 2, 1)), c(0, 0, 0));
        assert_eq!(doc.move_to_element_start(c(0, 2, 1)), c(0, 2, 0));
    }

    // ── Stepping ───────────────────────────────────────────────────────

    #[test]
    fn test_move_right_across_elements() {
        let doc = doc();
        assert_eq!(doc.move_right(c(0, 0, 1), true), c(0, 0, 2));
        assert_eq!(doc.move_right(c(0, 0, 2), true), c(0, 1, 1));
        assert_eq!(doc.move_right(c(0, 0, 2), false), c(0, 1, 0));
        assert_eq!(doc.move_right(c(0, 2, 2), true), c(1, 0, 0));
        assert_eq!(doc.move_right(c(1, 0, 0), true), c(2, 0, 0));
        assert_eq!(doc.move_right(c(2, 0, 7), true), c(2, 0, 7));
    }

    #[test]
    fn test_move_left_across_elements() {
        let doc = doc();
        assert_eq!(doc.move_left(c(0, 2, 0), true), c(0, 1, 0));
        assert_eq!(doc.move_left(c(0, 2, 0), false), c(0, 1, 1));
        assert_eq!(doc.move_left(c(2, 0, 0), true), c(1, 0, 0));
        assert_eq!(doc.move_left(c(1, 0, 0), true), c(0, 2, 2));
        assert_eq!(doc.move_left(c(0, 0, 0), true), c(0, 0, 0));
    }

    #[test]
    fn test_invalid_caret_is_unchanged() {
        let doc = doc();
        assert_eq!(doc.move_left(c(7, 0, 0), false), c(7, 0, 0));
        assert_eq!(doc.move_right(c(0, 9, 0), false), c(0, 9, 0));
    }

    #[test]
    fn test_left_right_round_trip_without_unit_spacing() {
        let doc = doc();
        let mut caret = doc.start_of_document();
        while !doc.is_end_of_document(caret) {
            let right = doc.move_right(caret, false);
            assert_eq!(doc.move_left(right, false), caret, "from {caret:?}");
            assert_eq!(doc.move_right(doc.move_left(right, false), false), right);
            caret = right;
        }
    }

    #[test]
    fn test_word_moves() {
        let doc = doc();
        assert_eq!(doc.move_word_right(c(2, 0, 0)), c(2, 0, 4));
        assert_eq!(doc.move_word_right(c(2, 0, 4)), c(2, 0, 7));
        assert_eq!(doc.move_word_left(c(2, 0, 7)), c(2, 0, 4));
        assert_eq!(doc.move_word_left(c(2, 0, 4)), c(2, 0, 0));
        assert_eq!(doc.move_word_left(c(2, 0, 0)), c(1, 0, 0));
        assert_eq!(doc.move_word_right(c(0, 2, 1)), c(1, 0, 0));
        assert_eq!(doc.move_word_left(c(0, 0, 0)), c(0, 0, 0));
    }

    // ── Linear offsets ─────────────────────────────────────────────────

    #[test]
    fn test_linear_offsets() {
        let doc = doc();
        assert_eq!(doc.linear_offset(c(0, 2, 1)), Some(4));
        assert_eq!(doc.linear_offset(c(0, 2, 3)), None);
        assert_eq!(doc.caret_at_linear(0, 4, false), Some(c(0, 2, 1)));
        assert_eq!(doc.caret_at_linear(0, 2, false), Some(c(0, 0, 2)));
        assert_eq!(doc.caret_at_linear(0, 2, true), Some(c(0, 1, 0)));
        assert_eq!(doc.caret_at_linear(0, 5, true), Some(c(0, 2, 2)));
        assert_eq!(doc.caret_at_linear(0, 6, true), None);
        assert_eq!(doc.caret_at_linear(1, 0, true), Some(c(1, 0, 0)));
    }
}
