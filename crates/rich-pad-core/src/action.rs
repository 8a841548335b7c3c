//! Invertible primitive edit actions.
//!
//! Every action comes in a pair with its inverse (`InsertCharacters` and
//! `RemoveCharacters`, `MergeParagraphWithNext` and `SplitParagraph`, ...).
//! [`EditAction::apply`] performs the action; undo is
//! `action.inverse().apply(doc)`, so each direction has one implementation.

use anyhow::{bail, Context, Result};

use crate::caret::{CaretPosition, Selection};
use crate::document::{Document, Part};
use crate::element::{byte_index, Paragraph, RichTextElement};
use crate::events::ParagraphChange;
use crate::style::TextStyle;

#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    InsertCharacters {
        at: CaretPosition,
        text: String,
    },
    RemoveCharacters {
        at: CaretPosition,
        text: String,
    },
    InsertElement {
        paragraph: usize,
        index: usize,
        element: RichTextElement,
    },
    RemoveElement {
        paragraph: usize,
        index: usize,
        element: RichTextElement,
    },
    InsertParagraph {
        index: usize,
        paragraph: Paragraph,
    },
    RemoveParagraph {
        index: usize,
        paragraph: Paragraph,
    },
    /// Appends paragraph `paragraph + 1` to `paragraph`, which had
    /// `element` elements before the merge.
    MergeParagraphWithNext {
        paragraph: usize,
        element: usize,
    },
    /// Moves elements `element..` of `paragraph` into a new next paragraph.
    SplitParagraph {
        paragraph: usize,
        element: usize,
    },
    /// Appends run `element + 1` to run `element`, which had `offset` chars.
    MergeElementWithNext {
        paragraph: usize,
        element: usize,
        offset: usize,
    },
    /// Moves chars `offset..` of a run into a new run with the same style.
    SplitElement {
        paragraph: usize,
        element: usize,
        offset: usize,
    },
    MoveCaret {
        old: Option<CaretPosition>,
        new: Option<CaretPosition>,
    },
    ChangeSelection {
        old: Option<Selection>,
        new: Option<Selection>,
    },
    SetElementStyle {
        paragraph: usize,
        element: usize,
        old: Option<TextStyle>,
        new: Option<TextStyle>,
    },
}

impl EditAction {
    /// The action that undoes this one.
    pub fn inverse(&self) -> EditAction {
        use EditAction::*;
        match self.clone() {
            InsertCharacters { at, text } => RemoveCharacters { at, text },
            RemoveCharacters { at, text } => InsertCharacters { at, text },
            InsertElement {
                paragraph,
                index,
                element,
            } => RemoveElement {
                paragraph,
                index,
                element,
            },
            RemoveElement {
                paragraph,
                index,
                element,
            } => InsertElement {
                paragraph,
                index,
                element,
            },
            InsertParagraph { index, paragraph } => RemoveParagraph { index, paragraph },
            RemoveParagraph { index, paragraph } => InsertParagraph { index, paragraph },
            MergeParagraphWithNext { paragraph, element } => SplitParagraph { paragraph, element },
            SplitParagraph { paragraph, element } => MergeParagraphWithNext { paragraph, element },
            MergeElementWithNext {
                paragraph,
                element,
                offset,
            } => SplitElement {
                paragraph,
                element,
                offset,
            },
            SplitElement {
                paragraph,
                element,
                offset,
            } => MergeElementWithNext {
                paragraph,
                element,
                offset,
            },
            MoveCaret { old, new } => MoveCaret { old: new, new: old },
            ChangeSelection { old, new } => ChangeSelection { old: new, new: old },
            SetElementStyle {
                paragraph,
                element,
                old,
                new,
            } => SetElementStyle {
                paragraph,
                element,
                old: new,
                new: old,
            },
        }
    }

    /// Applies the action and returns the paragraph changes it produced.
    ///
    /// Fails without touching the document when the action's address does
    /// not resolve or the content it expects to remove is not there.
    pub fn apply(&self, doc: &mut Document) -> Result<Vec<ParagraphChange>> {
        use EditAction::*;
        match self {
            InsertCharacters { at, text } => {
                let run = run_text_mut(doc, at.paragraph, at.element)?;
                let byte = byte_index(run, at.offset)
                    .with_context(|| format!("offset {} outside run at {at:?}", at.offset))?;
                run.insert_str(byte, text);
                Ok(vec![ParagraphChange::modified(at.paragraph)])
            }
            RemoveCharacters { at, text } => {
                let run = run_text_mut(doc, at.paragraph, at.element)?;
                let from = byte_index(run, at.offset)
                    .with_context(|| format!("offset {} outside run at {at:?}", at.offset))?;
                let to = from + text.len();
                if run.get(from..to) != Some(text.as_str()) {
                    bail!("run at {at:?} does not contain {text:?}");
                }
                run.replace_range(from..to, "");
                Ok(vec![ParagraphChange::modified(at.paragraph)])
            }
            InsertElement {
                paragraph,
                index,
                element,
            } => {
                let p = paragraph_mut(doc, *paragraph)?;
                if *index > p.elements.len() {
                    bail!("element index {index} out of range in paragraph {paragraph}");
                }
                p.elements.insert(*index, element.clone());
                Ok(vec![ParagraphChange::modified(*paragraph)])
            }
            RemoveElement {
                paragraph,
                index,
                element,
            } => {
                let p = paragraph_mut(doc, *paragraph)?;
                if p.elements.get(*index) != Some(element) {
                    bail!("element {index} of paragraph {paragraph} does not match");
                }
                p.elements.remove(*index);
                Ok(vec![ParagraphChange::modified(*paragraph)])
            }
            InsertParagraph { index, paragraph } => {
                if *index > doc.paragraph_count() {
                    bail!("paragraph index {index} out of range");
                }
                doc.insert_paragraph(*index, paragraph.clone());
                Ok(vec![ParagraphChange::inserted(*index)])
            }
            RemoveParagraph { index, paragraph } => {
                if doc.paragraph(*index) != Some(paragraph) {
                    bail!("paragraph {index} does not match");
                }
                doc.remove_paragraph(*index);
                Ok(vec![ParagraphChange::removed(*index)])
            }
            MergeParagraphWithNext { paragraph, element } => {
                let next = *paragraph + 1;
                if next >= doc.paragraph_count() {
                    bail!("paragraph {paragraph} has no next paragraph to merge");
                }
                if paragraph_mut(doc, *paragraph)?.elements.len() != *element {
                    bail!("paragraph {paragraph} does not have {element} elements");
                }
                let moved = doc.remove_paragraph(next);
                paragraph_mut(doc, *paragraph)?.elements.extend(moved.elements);
                Ok(vec![
                    ParagraphChange::modified(*paragraph),
                    ParagraphChange::removed(next),
                ])
            }
            SplitParagraph { paragraph, element } => {
                let p = paragraph_mut(doc, *paragraph)?;
                if *element == 0 || *element >= p.elements.len() {
                    bail!("cannot split paragraph {paragraph} at element {element}");
                }
                let tail = p.elements.split_off(*element);
                let style = p.style.clone();
                doc.insert_paragraph(
                    *paragraph + 1,
                    Paragraph {
                        elements: tail,
                        style,
                    },
                );
                Ok(vec![
                    ParagraphChange::modified(*paragraph),
                    ParagraphChange::inserted(*paragraph + 1),
                ])
            }
            MergeElementWithNext {
                paragraph,
                element,
                offset,
            } => {
                let p = paragraph_mut(doc, *paragraph)?;
                let (Some(RichTextElement::Run { text, style }), Some(next)) =
                    (p.elements.get(*element), p.elements.get(*element + 1))
                else {
                    bail!("no run pair at element {element} of paragraph {paragraph}");
                };
                let Some(next_text) = next.text() else {
                    bail!("element {} of paragraph {paragraph} is not a run", element + 1);
                };
                if text.chars().count() != *offset || next.style() != style.as_ref() {
                    bail!("runs at element {element} of paragraph {paragraph} cannot merge");
                }
                let merged = format!("{text}{next_text}");
                p.elements.remove(*element + 1);
                if let Some(RichTextElement::Run { text, .. }) = p.elements.get_mut(*element) {
                    *text = merged;
                }
                Ok(vec![ParagraphChange::modified(*paragraph)])
            }
            SplitElement {
                paragraph,
                element,
                offset,
            } => {
                let p = paragraph_mut(doc, *paragraph)?;
                let Some(RichTextElement::Run { text, style }) = p.elements.get_mut(*element)
                else {
                    bail!("element {element} of paragraph {paragraph} is not a run");
                };
                let byte = byte_index(text, *offset)
                    .with_context(|| format!("offset {offset} outside run {element}"))?;
                let tail = RichTextElement::Run {
                    text: text.split_off(byte),
                    style: style.clone(),
                };
                p.elements.insert(*element + 1, tail);
                Ok(vec![ParagraphChange::modified(*paragraph)])
            }
            MoveCaret { new, .. } => {
                doc.set_caret(*new);
                Ok(Vec::new())
            }
            ChangeSelection { new, .. } => {
                doc.set_selection(*new);
                Ok(Vec::new())
            }
            SetElementStyle {
                paragraph,
                element,
                old,
                new,
            } => {
                let p = paragraph_mut(doc, *paragraph)?;
                let Some(target) = p.elements.get_mut(*element) else {
                    bail!("element {element} of paragraph {paragraph} does not exist");
                };
                if target.style() != old.as_ref() {
                    bail!("element {element} of paragraph {paragraph} has an unexpected style");
                }
                target.set_style(new.clone());
                Ok(vec![ParagraphChange::modified(*paragraph)])
            }
        }
    }
}

impl Part {
    /// The action that removes this part from the document.
    pub fn removal(&self) -> EditAction {
        match self {
            Part::CharacterRange { text, .. } => EditAction::RemoveCharacters {
                at: self.caret_start(),
                text: text.clone(),
            },
            Part::ElementRef {
                paragraph,
                element,
                value,
            } => EditAction::RemoveElement {
                paragraph: *paragraph,
                index: *element,
                element: value.clone(),
            },
            Part::ParagraphRef { paragraph, value } => EditAction::RemoveParagraph {
                index: *paragraph,
                paragraph: value.clone(),
            },
        }
    }
}

fn paragraph_mut(doc: &mut Document, index: usize) -> Result<&mut Paragraph> {
    doc.paragraph_mut(index)
        .with_context(|| format!("paragraph {index} does not exist"))
}

fn run_text_mut(doc: &mut Document, paragraph: usize, element: usize) -> Result<&mut String> {
    match paragraph_mut(doc, paragraph)?.elements.get_mut(element) {
        Some(RichTextElement::Run { text, .. }) => Ok(text),
        Some(RichTextElement::Image { .. }) => {
            bail!("element {element} of paragraph {paragraph} is an image")
        }
        None => bail!("element {element} of paragraph {paragraph} does not exist"),
    }
}
