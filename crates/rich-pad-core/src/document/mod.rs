//! Document model: paragraphs, caret and selection.
//!
//! A `Document` owns an ordered list of paragraphs plus the current caret
//! and selection. Paragraph and element indices are only meaningful until
//! the next structural edit. Caret arithmetic lives in the `navigation`
//! submodule and selection decomposition in `parts`.

mod navigation;
mod parts;

pub use parts::Part;

use crate::caret::{CaretPosition, Selection};
use crate::element::{Paragraph, RichTextElement};
use crate::events::{CaretChange, DocumentEvents, SelectionChange};

pub struct Document {
    paragraphs: Vec<Paragraph>,
    caret: Option<CaretPosition>,
    selection: Option<Selection>,
    /// Change channels. Paragraph changes are published by transactions.
    pub events: DocumentEvents,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("paragraphs", &self.paragraphs.len())
            .field("caret", &self.caret)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    /// Creates a document. An empty list becomes one empty paragraph.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        let mut paragraphs = paragraphs;
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph::empty());
        }
        for paragraph in &mut paragraphs {
            paragraph.ensure_not_empty();
        }
        Self {
            paragraphs,
            caret: None,
            selection: None,
            events: DocumentEvents::default(),
        }
    }

    /// One unstyled paragraph per line of `text`.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split('\n').map(Paragraph::from_text).collect())
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_at(&self, caret: CaretPosition) -> Option<&Paragraph> {
        self.paragraphs.get(caret.paragraph)
    }

    pub fn element_at(&self, caret: CaretPosition) -> Option<&RichTextElement> {
        self.element(caret.paragraph, caret.element)
    }

    pub fn element(&self, paragraph: usize, element: usize) -> Option<&RichTextElement> {
        self.paragraphs.get(paragraph)?.elements.get(element)
    }

    /// The char right after the caret, if the caret is inside a run.
    pub fn char_at(&self, caret: CaretPosition) -> Option<char> {
        self.element_at(caret)?.char_at(caret.offset)
    }

    /// True if the caret resolves to an existing element and offset.
    pub fn is_valid(&self, caret: CaretPosition) -> bool {
        self.element_at(caret)
            .is_some_and(|e| e.has_offset(caret.offset))
    }

    pub fn caret(&self) -> Option<CaretPosition> {
        self.caret
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn current_element(&self) -> Option<&RichTextElement> {
        self.element_at(self.caret?)
    }

    pub fn current_paragraph(&self) -> Option<&Paragraph> {
        self.paragraph_at(self.caret?)
    }

    /// Text of every paragraph joined with `\n`; images become U+FFFC.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ── Caret and selection ────────────────────────────────────────────

    /// Sets the caret, publishing a `CaretChange` if it differs.
    ///
    /// A change of only `before_split` is stored but not published.
    pub fn set_caret(&mut self, caret: Option<CaretPosition>) {
        let old = self.caret;
        self.caret = caret;
        if old != caret {
            self.events.caret_changed.publish(&CaretChange { old, new: caret });
        }
    }

    /// Sets the selection, publishing a `SelectionChange` if it differs.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        let old = self.selection;
        if old == selection {
            return;
        }
        self.selection = selection;
        self.events.selection_changed.publish(&SelectionChange {
            old,
            new: selection,
        });
    }

    // ── Raw mutation (used by edit actions) ────────────────────────────

    pub(crate) fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(index)
    }

    pub(crate) fn insert_paragraph(&mut self, index: usize, paragraph: Paragraph) {
        self.paragraphs.insert(index, paragraph);
    }

    pub(crate) fn remove_paragraph(&mut self, index: usize) -> Paragraph {
        self.paragraphs.remove(index)
    }
}
