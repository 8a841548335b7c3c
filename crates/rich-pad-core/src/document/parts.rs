//! Decomposition of a caret span into removable or restylable parts.

use super::Document;
use crate::caret::CaretPosition;
use crate::element::{Paragraph, RichTextElement};

/// One piece of a decomposed span, addressed by current indices.
///
/// Parts are derived on demand and must not be kept across an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Chars `start..end` of a run.
    CharacterRange {
        paragraph: usize,
        element: usize,
        start: usize,
        end: usize,
        text: String,
    },
    /// A whole element.
    ElementRef {
        paragraph: usize,
        element: usize,
        value: RichTextElement,
    },
    /// A whole paragraph.
    ParagraphRef { paragraph: usize, value: Paragraph },
}

impl Part {
    pub fn paragraph(&self) -> usize {
        match self {
            Part::CharacterRange { paragraph, .. }
            | Part::ElementRef { paragraph, .. }
            | Part::ParagraphRef { paragraph, .. } => *paragraph,
        }
    }

    /// First caret position covered by the part.
    pub fn caret_start(&self) -> CaretPosition {
        match self {
            Part::CharacterRange {
                paragraph,
                element,
                start,
                ..
            } => CaretPosition::new(*paragraph, *element, *start),
            Part::ElementRef {
                paragraph, element, ..
            } => CaretPosition::new(*paragraph, *element, 0),
            Part::ParagraphRef { paragraph, .. } => CaretPosition::new(*paragraph, 0, 0),
        }
    }
}

impl Document {
    /// Decomposes `[start, end)` into the coarsest parts that cover it.
    ///
    /// Inside one paragraph only element-level parts are produced. Across
    /// paragraphs the first and last paragraphs are promoted to whole
    /// `ParagraphRef`s when the span covers them entirely, and every
    /// paragraph in between is a `ParagraphRef`. Parts come in document
    /// order; consumers that remove them must walk the list in reverse.
    /// Unresolvable carets yield no parts.
    pub fn iterate_parts(&self, start: CaretPosition, end: CaretPosition) -> Vec<Part> {
        let mut parts = Vec::new();
        if !self.is_valid(start) || !self.is_valid(end) || end < start {
            return parts;
        }
        if start.paragraph == end.paragraph {
            self.paragraph_parts(start.paragraph, Some(start), Some(end), false, &mut parts);
        } else {
            self.paragraph_parts(start.paragraph, Some(start), None, true, &mut parts);
            for index in start.paragraph + 1..end.paragraph {
                parts.push(Part::ParagraphRef {
                    paragraph: index,
                    value: self.paragraphs[index].clone(),
                });
            }
            self.paragraph_parts(end.paragraph, None, Some(end), true, &mut parts);
        }
        parts
    }

    fn paragraph_parts(
        &self,
        paragraph: usize,
        start: Option<CaretPosition>,
        end: Option<CaretPosition>,
        promote: bool,
        parts: &mut Vec<Part>,
    ) {
        let Some(p) = self.paragraphs.get(paragraph) else {
            return;
        };
        let first = self.start_of_paragraph(paragraph);
        let Some(last) = self.end_of_paragraph(paragraph) else {
            return;
        };
        let start = start.unwrap_or(first);
        let end = end.unwrap_or(last);

        if promote && start == first && end == last {
            parts.push(Part::ParagraphRef {
                paragraph,
                value: p.clone(),
            });
        } else if start.element == end.element {
            self.element_parts(paragraph, start.element, Some(start.offset), Some(end.offset), parts);
        } else {
            self.element_parts(paragraph, start.element, Some(start.offset), None, parts);
            for index in start.element + 1..end.element {
                parts.push(Part::ElementRef {
                    paragraph,
                    element: index,
                    value: p.elements[index].clone(),
                });
            }
            self.element_parts(paragraph, end.element, None, Some(end.offset), parts);
        }
    }

    fn element_parts(
        &self,
        paragraph: usize,
        element: usize,
        start: Option<usize>,
        end: Option<usize>,
        parts: &mut Vec<Part>,
    ) {
        let Some(value) = self.element(paragraph, element) else {
            return;
        };
        let len = value.len();
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(len);
        if start >= end {
            return;
        }
        if start == 0 && end == len {
            parts.push(Part::ElementRef {
                paragraph,
                element,
                value: value.clone(),
            });
        } else if let Some(text) = value.slice(start, end) {
            parts.push(Part::CharacterRange {
                paragraph,
                element,
                start,
                end,
                text: text.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ImageData;

    fn c(p: usize, e: usize, o: usize) -> CaretPosition {
        CaretPosition::new(p, e, o)
    }

    fn doc() -> Document {
        Document::new(vec![
            Paragraph::new(vec![
                RichTextElement::run("Hello"),
                RichTextElement::image(ImageData::new(vec![7u8])),
                RichTextElement::run("World"),
            ]),
            Paragraph::from_text("middle"),
            Paragraph::from_text("last line"),
        ])
    }

    fn kinds(parts: &[Part]) -> Vec<&'static str> {
        parts
            .iter()
            .map(|p| match p {
                Part::CharacterRange { .. } => "chars",
                Part::ElementRef { .. } => "element",
                Part::ParagraphRef { .. } => "paragraph",
            })
            .collect()
    }

    // ── Single paragraph ───────────────────────────────────────────────

    #[test]
    fn test_range_inside_one_element() {
        let doc = doc();
        let parts = doc.iterate_parts(c(0, 0, 1), c(0, 0, 4));
        assert_eq!(
            parts,
            vec![Part::CharacterRange {
                paragraph: 0,
                element: 0,
                start: 1,
                end: 4,
                text: "ell".into()
            }]
        );
    }

    #[test]
    fn test_whole_element_is_promoted() {
        let doc = doc();
        let parts = doc.iterate_parts(c(0, 0, 0), c(0, 0, 5));
        assert_eq!(kinds(&parts), vec!["element"]);
    }

    #[test]
    fn test_span_across_elements() {
        let doc = doc();
        let parts = doc.iterate_parts(c(0, 0, 3), c(0, 2, 2));
        assert_eq!(kinds(&parts), vec!["chars", "element", "chars"]);
        assert_eq!(parts[1].caret_start(), c(0, 1, 0));
        assert!(matches!(&parts[2], Part::CharacterRange { text, .. } if text == "Wo"));
    }

    #[test]
    fn test_whole_single_paragraph_is_not_promoted() {
        let doc = doc();
        let parts = doc.iterate_parts(c(0, 0, 0), c(0, 2, 5));
        assert_eq!(kinds(&parts), vec!["element", "element", "element"]);
    }

    #[test]
    fn test_zero_length_element_spans_are_skipped() {
        let doc = doc();
        let parts = doc.iterate_parts(c(0, 0, 5), c(0, 2, 0));
        assert_eq!(kinds(&parts), vec!["element"]);
        assert!(doc.iterate_parts(c(0, 0, 2), c(0, 0, 2)).is_empty());
    }

    // ── Multiple paragraphs ────────────────────────────────────────────

    #[test]
    fn test_multi_paragraph_partial_ends() {
        let doc = doc();
        let parts = doc.iterate_parts(c(0, 2, 1), c(2, 0, 4));
        assert_eq!(kinds(&parts), vec!["chars", "paragraph", "chars"]);
        assert_eq!(parts[1].paragraph(), 1);
        assert!(matches!(&parts[2], Part::CharacterRange { text, .. } if text == "last"));
    }

    #[test]
    fn test_multi_paragraph_whole_document() {
        let doc = doc();
        let parts = doc.iterate_parts(doc.start_of_document(), doc.end_of_document());
        assert_eq!(kinds(&parts), vec!["paragraph", "paragraph", "paragraph"]);
    }

    #[test]
    fn test_invalid_or_reversed_span_yields_nothing() {
        let doc = doc();
        assert!(doc.iterate_parts(c(0, 0, 0), c(9, 0, 0)).is_empty());
        assert!(doc.iterate_parts(c(1, 0, 2), c(0, 0, 0)).is_empty());
    }
}
