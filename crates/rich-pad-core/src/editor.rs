//! Editing commands over a document with undo/redo.
//!
//! `Editor` turns user-level commands (typing, Backspace, Delete, Return,
//! restyling) into groups of primitive [`EditAction`]s. Each command runs in
//! one [`Transaction`] and is recorded as one undo group. Caret navigation is
//! applied directly and never recorded.

use anyhow::{Context, Result};

use crate::action::EditAction;
use crate::caret::{CaretPosition, Selection};
use crate::document::{Document, Part};
use crate::element::{Paragraph, RichTextElement};
use crate::events::DocumentEvents;
use crate::history::{EditHistory, HistoryConfig};
use crate::style::{effective, FontSlant, FontWeight, TextStyle};
use crate::transaction::{replay_redo, replay_undo, ChangeListener, Transaction};

/// Document-level caret motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    ParagraphStart,
    ParagraphEnd,
    DocumentStart,
    DocumentEnd,
}

pub struct Editor {
    document: Document,
    history: EditHistory,
    /// Fixed end of a keyboard selection while it is being extended.
    selection_anchor: Option<CaretPosition>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Wraps a document. A document without a caret gets one at its start.
    pub fn new(document: Document, config: HistoryConfig) -> Self {
        let mut document = document;
        if document.caret().is_none() {
            let start = document.start_of_document();
            document.set_caret(Some(start));
        }
        Self {
            document,
            history: EditHistory::new(config),
            selection_anchor: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Change channels of the underlying document.
    pub fn events_mut(&mut self) -> &mut DocumentEvents {
        &mut self.document.events
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn caret(&self) -> Option<CaretPosition> {
        self.document.caret()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.document.selection()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Runs `build` in a transaction and records what it applied.
    ///
    /// Typing commands may merge into the previous undo group; all other
    /// commands stand alone.
    fn edit(
        &mut self,
        listener: &mut dyn ChangeListener,
        typing: bool,
        build: impl FnOnce(&mut Transaction<'_>) -> Result<()>,
    ) -> Result<()> {
        if !typing {
            self.history.force_group_break();
        }
        let mut tx = Transaction::begin(&mut self.document, listener);
        build(&mut tx)?;
        let group = tx.commit();
        self.history.record(group);
        if !typing {
            self.history.force_group_break();
        }
        self.selection_anchor = None;
        Ok(())
    }

    // ── Text commands ──────────────────────────────────────────────────

    /// Inserts text at the caret, replacing the selection.
    ///
    /// Each `\n` splits the paragraph like [`Editor::newline`].
    pub fn insert_text(&mut self, listener: &mut dyn ChangeListener, text: &str) -> Result<()> {
        let text = text.replace("\r\n", "\n");
        if text.is_empty() {
            return Ok(());
        }
        let typing = self.document.selection().is_none() && !text.contains('\n');
        self.edit(listener, typing, |tx| insert_text(tx, &text))
    }

    pub fn backspace(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        let typing = self.document.selection().is_none();
        self.edit(listener, typing, |tx| {
            if !remove_selection(tx)? {
                let actions = backspace_actions(tx.document());
                tx.apply_all(actions)?;
            }
            Ok(())
        })
    }

    pub fn delete(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        let typing = self.document.selection().is_none();
        self.edit(listener, typing, |tx| {
            if !remove_selection(tx)? {
                let actions = delete_actions(tx.document());
                tx.apply_all(actions)?;
            }
            Ok(())
        })
    }

    /// Splits the paragraph at the caret (Return).
    pub fn newline(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        self.edit(listener, false, |tx| {
            remove_selection(tx)?;
            let actions = return_actions(tx.document());
            tx.apply_all(actions)
        })
    }

    /// Deletes the selected content, if any.
    pub fn remove_selection(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        self.edit(listener, false, |tx| remove_selection(tx).map(|_| ()))
    }

    // ── Styling ────────────────────────────────────────────────────────

    /// Maps the style of every selected char through `f`.
    ///
    /// Runs partially covered by the selection are split so only the
    /// selected chars change. Without a selection this does nothing.
    pub fn apply_style(
        &mut self,
        listener: &mut dyn ChangeListener,
        f: impl Fn(&TextStyle) -> TextStyle,
    ) -> Result<()> {
        let Some(selection) = self.document.selection().filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        self.edit(listener, false, |tx| restyle(tx, selection, &f))
    }

    /// Effective style of the first selected char, or at the caret.
    pub fn style_at_selection(&self) -> TextStyle {
        let doc = &self.document;
        let anchor = doc
            .selection()
            .map(|s| s.start)
            .or_else(|| doc.caret())
            .and_then(|c| {
                let linear = doc.linear_offset(c)?;
                doc.caret_at_linear(c.paragraph, linear, true)
            });
        effective(anchor.and_then(|c| doc.element_at(c)).and_then(|e| e.style()))
    }

    pub fn toggle_bold(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        let weight = if self.style_at_selection().is_bold() {
            FontWeight::Normal
        } else {
            FontWeight::Bold
        };
        self.apply_style(listener, |s| s.clone().with_weight(weight))
    }

    pub fn toggle_italic(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        let slant = if self.style_at_selection().is_italic() {
            FontSlant::Normal
        } else {
            FontSlant::Italic
        };
        self.apply_style(listener, |s| s.clone().with_slant(slant))
    }

    pub fn toggle_underline(&mut self, listener: &mut dyn ChangeListener) -> Result<()> {
        let underline = !self.style_at_selection().underline;
        self.apply_style(listener, |s| s.clone().with_underline(underline))
    }

    pub fn set_point_size(&mut self, listener: &mut dyn ChangeListener, size: u16) -> Result<()> {
        self.apply_style(listener, |s| s.clone().with_point_size(size))
    }

    // ── History ────────────────────────────────────────────────────────

    /// Undoes the last group. Returns false when there is nothing to undo.
    pub fn undo(&mut self, listener: &mut dyn ChangeListener) -> Result<bool> {
        let Some(group) = self.history.undo() else {
            return Ok(false);
        };
        self.history.pause_recording();
        let result = replay_undo(&mut self.document, listener, &group);
        self.history.resume_recording();
        self.selection_anchor = None;
        if result.is_err() {
            self.history.restore_undo();
        }
        result.context("undo failed").map(|()| true)
    }

    /// Redoes the last undone group. Returns false when there is nothing to redo.
    pub fn redo(&mut self, listener: &mut dyn ChangeListener) -> Result<bool> {
        let Some(group) = self.history.redo() else {
            return Ok(false);
        };
        self.history.pause_recording();
        let result = replay_redo(&mut self.document, listener, &group);
        self.history.resume_recording();
        self.selection_anchor = None;
        if result.is_err() {
            self.history.restore_redo();
        }
        result.context("redo failed").map(|()| true)
    }

    // ── Navigation ─────────────────────────────────────────────────────

    pub fn move_caret(&mut self, motion: Motion, extend: bool) {
        let Some(caret) = self.document.caret() else {
            return;
        };
        let doc = &self.document;
        let target = match motion {
            Motion::Left => doc.move_left(caret, true),
            Motion::Right => doc.move_right(caret, true),
            Motion::WordLeft => doc.move_word_left(caret),
            Motion::WordRight => doc.move_word_right(caret),
            Motion::ParagraphStart => doc.move_to_paragraph_start(caret),
            Motion::ParagraphEnd => doc.move_to_paragraph_end(caret),
            Motion::DocumentStart => doc.start_of_document(),
            Motion::DocumentEnd => doc.end_of_document().with_before_split(true),
        };
        self.move_caret_to(target, extend);
    }

    /// Moves the caret to `target`, extending the selection when `extend`.
    ///
    /// Unresolvable targets are ignored.
    pub fn move_caret_to(&mut self, target: CaretPosition, extend: bool) {
        if !self.document.is_valid(target) {
            return;
        }
        self.history.force_group_break();
        if extend {
            let anchor = self
                .selection_anchor
                .or_else(|| self.implied_anchor())
                .unwrap_or(target);
            self.selection_anchor = Some(anchor);
            self.document.set_caret(Some(target));
            let selection = Selection::new(anchor, target);
            self.document
                .set_selection((!selection.is_empty()).then_some(selection));
        } else {
            self.selection_anchor = None;
            self.document.set_caret(Some(target));
            self.document.set_selection(None);
        }
    }

    /// The selection end opposite the caret, or the caret itself.
    fn implied_anchor(&self) -> Option<CaretPosition> {
        let caret = self.document.caret()?;
        Some(match self.document.selection() {
            Some(sel) if sel.start == caret => sel.end,
            Some(sel) => sel.start,
            None => caret,
        })
    }

    pub fn select_all(&mut self) {
        let start = self.document.start_of_document();
        let end = self.document.end_of_document();
        self.history.force_group_break();
        self.selection_anchor = Some(start);
        self.document.set_caret(Some(end));
        let selection = Selection::new(start, end);
        self.document
            .set_selection((!selection.is_empty()).then_some(selection));
    }
}

// ── Policies ───────────────────────────────────────────────────────────

fn move_caret(old: CaretPosition, new: CaretPosition) -> EditAction {
    EditAction::MoveCaret {
        old: Some(old),
        new: Some(new),
    }
}

/// The caret, if it resolves.
fn valid_caret(doc: &Document) -> Option<CaretPosition> {
    doc.caret().filter(|c| doc.is_valid(*c))
}

/// Removes the selection. Returns whether there was one.
fn remove_selection(tx: &mut Transaction<'_>) -> Result<bool> {
    let Some(selection) = tx.document().selection() else {
        return Ok(false);
    };
    let (actions, join) = selection_removal_actions(tx.document(), selection);
    tx.apply_all(actions)?;
    if join {
        let first = selection.start.paragraph;
        let count = tx.document().paragraph(first).map_or(0, Paragraph::len);
        tx.apply(EditAction::MergeParagraphWithNext {
            paragraph: first,
            element: count,
        })?;
    }
    Ok(true)
}

/// Caret move, selection clear, then every part's removal in reverse.
///
/// Removing a whole multi-paragraph document inserts a fresh empty
/// paragraph; removing every element of one paragraph re-inserts an empty
/// run so the paragraph keeps an element. The returned flag is set when the
/// first and last paragraphs both keep content and must be joined once the
/// removals have been applied.
fn selection_removal_actions(doc: &Document, selection: Selection) -> (Vec<EditAction>, bool) {
    let Selection { start, end } = selection;
    let parts = doc.iterate_parts(start, end);

    let empties_paragraph = start.paragraph == end.paragraph
        && !parts.is_empty()
        && parts.iter().all(|p| matches!(p, Part::ElementRef { .. }))
        && doc
            .paragraph(start.paragraph)
            .is_some_and(|p| p.len() == parts.len());
    let whole_document = start.paragraph != end.paragraph
        && doc.is_start_of_document(start)
        && doc.is_end_of_document(end);
    let removes_paragraph = |part: Option<&Part>, index: usize| {
        matches!(part, Some(Part::ParagraphRef { paragraph, .. }) if *paragraph == index)
    };
    let join = start.paragraph != end.paragraph
        && !removes_paragraph(parts.first(), start.paragraph)
        && !removes_paragraph(parts.last(), end.paragraph);

    let new_caret = if !empties_paragraph
        && !doc.is_start_of_document(start)
        && doc.is_start_of_element(start)
    {
        doc.move_left(start, false)
    } else {
        start
    };

    let mut actions = vec![
        EditAction::MoveCaret {
            old: doc.caret(),
            new: Some(new_caret),
        },
        EditAction::ChangeSelection {
            old: Some(selection),
            new: None,
        },
    ];
    actions.extend(parts.iter().rev().map(Part::removal));

    let first_style = doc
        .element(start.paragraph, 0)
        .and_then(|e| e.style())
        .cloned();
    if whole_document {
        actions.push(EditAction::InsertParagraph {
            index: 0,
            paragraph: Paragraph::new(vec![RichTextElement::empty_run(first_style)]),
        });
    } else if empties_paragraph {
        actions.push(EditAction::InsertElement {
            paragraph: start.paragraph,
            index: 0,
            element: RichTextElement::empty_run(first_style),
        });
    }
    (actions, join)
}

fn backspace_actions(doc: &Document) -> Vec<EditAction> {
    let Some(caret) = valid_caret(doc) else {
        return Vec::new();
    };
    if doc.is_start_of_document(caret) {
        return Vec::new();
    }
    if doc.is_start_of_paragraph(caret) {
        return join_paragraphs(doc, caret, caret.paragraph - 1);
    }
    let (p, e) = (caret.paragraph, caret.element);

    if caret.offset == 0 {
        let Some(prev) = doc.element(p, e - 1) else {
            return Vec::new();
        };
        if prev.len() <= 1 {
            return vec![
                move_caret(caret, CaretPosition::new(p, e - 1, 0)),
                EditAction::RemoveElement {
                    paragraph: p,
                    index: e - 1,
                    element: prev.clone(),
                },
            ];
        }
        let target = CaretPosition::new(p, e - 1, prev.len() - 1);
        return remove_char_actions(doc, caret, target);
    }

    if doc.element_at(caret).is_some_and(|el| el.len() == 1) {
        return remove_unit_element(doc, caret, CaretPosition::new(p, e, 0));
    }
    remove_char_actions(doc, caret, caret.move_offset(-1))
}

fn delete_actions(doc: &Document) -> Vec<EditAction> {
    let Some(caret) = valid_caret(doc) else {
        return Vec::new();
    };
    if doc.is_end_of_document(caret) {
        return Vec::new();
    }
    let (Some(paragraph), Some(element)) = (doc.paragraph_at(caret), doc.element_at(caret)) else {
        return Vec::new();
    };

    if caret.offset < element.len() {
        return delete_unit_at(doc, caret, caret);
    }
    if caret.element + 1 < paragraph.len() {
        let next = caret.next_element();
        let mut actions = vec![move_caret(caret, next)];
        actions.extend(delete_unit_at(doc, next, next));
        return actions;
    }
    join_paragraphs(doc, caret, caret.paragraph)
}

/// Deletes the unit right after `at`; `caret` is where the caret is now.
fn delete_unit_at(doc: &Document, caret: CaretPosition, at: CaretPosition) -> Vec<EditAction> {
    match doc.element_at(at) {
        Some(element) if element.len() == 1 => remove_unit_element(doc, caret, at),
        Some(_) => remove_char_actions(doc, caret, at),
        None => Vec::new(),
    }
}

/// Moves the caret to `target` and removes the char right after it.
fn remove_char_actions(doc: &Document, caret: CaretPosition, target: CaretPosition) -> Vec<EditAction> {
    let Some(ch) = doc.char_at(target) else {
        return Vec::new();
    };
    vec![
        move_caret(caret, target),
        EditAction::RemoveCharacters {
            at: target,
            text: ch.to_string(),
        },
    ]
}

/// Removes a length-1 element (an image or a one-char run) at `at`.
///
/// An element with siblings is removed outright. A sole run is emptied and
/// a sole image is replaced by an empty run.
fn remove_unit_element(doc: &Document, caret: CaretPosition, at: CaretPosition) -> Vec<EditAction> {
    let (p, e) = (at.paragraph, at.element);
    let (Some(paragraph), Some(element)) = (doc.paragraph(p), doc.element(p, e)) else {
        return Vec::new();
    };
    let remove = EditAction::RemoveElement {
        paragraph: p,
        index: e,
        element: element.clone(),
    };
    if paragraph.len() > 1 {
        let landing = if e > 0 {
            doc.end_of_element(p, e - 1)
                .unwrap_or(CaretPosition::new(p, 0, 0))
        } else {
            CaretPosition::new(p, 0, 0)
        };
        return vec![move_caret(caret, landing), remove];
    }
    let start = CaretPosition::new(p, 0, 0);
    match element {
        RichTextElement::Run { text, .. } => vec![
            move_caret(caret, start),
            EditAction::RemoveCharacters {
                at: start,
                text: text.clone(),
            },
        ],
        RichTextElement::Image { style, .. } => vec![
            move_caret(caret, start),
            remove,
            EditAction::InsertElement {
                paragraph: p,
                index: 0,
                element: RichTextElement::empty_run(style.clone()),
            },
        ],
    }
}

/// Joins paragraph `first` with the one after it.
///
/// When either side is an empty paragraph it is removed instead, so no
/// empty run ends up beside content. The caret lands at the join.
fn join_paragraphs(doc: &Document, caret: CaretPosition, first: usize) -> Vec<EditAction> {
    let second = first + 1;
    let (Some(a), Some(b)) = (doc.paragraph(first), doc.paragraph(second)) else {
        return Vec::new();
    };
    if b.is_empty() {
        let landing = doc
            .end_of_paragraph(first)
            .unwrap_or(CaretPosition::new(first, 0, 0));
        return vec![
            move_caret(caret, landing),
            EditAction::RemoveParagraph {
                index: second,
                paragraph: b.clone(),
            },
        ];
    }
    if a.is_empty() {
        return vec![
            move_caret(caret, CaretPosition::new(first, 0, 0)),
            EditAction::RemoveParagraph {
                index: first,
                paragraph: a.clone(),
            },
        ];
    }
    // The end of `first` is still valid after the merge and keeps typing in
    // its last element.
    let landing = doc
        .end_of_paragraph(first)
        .unwrap_or(CaretPosition::new(first, 0, 0));
    vec![
        EditAction::MergeParagraphWithNext {
            paragraph: first,
            element: a.len(),
        },
        move_caret(caret, landing),
    ]
}

/// Return: split the paragraph at the caret.
///
/// The split always happens at an element boundary; the current run is
/// split first when the caret is inside it or at an outer edge of the
/// paragraph, so both halves keep at least one element.
fn return_actions(doc: &Document) -> Vec<EditAction> {
    let Some(caret) = valid_caret(doc) else {
        return Vec::new();
    };
    let (Some(paragraph), Some(element)) = (doc.paragraph_at(caret), doc.element_at(caret)) else {
        return Vec::new();
    };
    let (p, e, offset) = (caret.paragraph, caret.element, caret.offset);
    let count = paragraph.len();
    let len = element.len();

    let mut actions = vec![EditAction::MoveCaret {
        old: Some(caret),
        new: None,
    }];
    let split_at = match element {
        RichTextElement::Run { .. } => {
            let inside = offset > 0 && offset < len;
            let outer = (offset == 0 && e == 0) || (offset == len && e + 1 == count);
            if inside || outer {
                actions.push(EditAction::SplitElement {
                    paragraph: p,
                    element: e,
                    offset,
                });
                e + 1
            } else if offset == 0 {
                e
            } else {
                e + 1
            }
        }
        RichTextElement::Image { style, .. } => {
            let boundary = e + offset;
            if boundary == 0 || boundary == count {
                actions.push(EditAction::InsertElement {
                    paragraph: p,
                    index: boundary,
                    element: RichTextElement::empty_run(style.clone()),
                });
            }
            boundary.max(1)
        }
    };
    actions.push(EditAction::SplitParagraph {
        paragraph: p,
        element: split_at,
    });
    actions.push(EditAction::MoveCaret {
        old: None,
        new: Some(caret.next_paragraph()),
    });
    actions
}

fn insert_text(tx: &mut Transaction<'_>, text: &str) -> Result<()> {
    remove_selection(tx)?;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let actions = return_actions(tx.document());
            tx.apply_all(actions)?;
        }
        if !line.is_empty() {
            let actions = insert_segment_actions(tx.document(), line);
            tx.apply_all(actions)?;
        }
    }
    Ok(())
}

/// Inserts `text` (no newlines) at the caret.
///
/// On an image, the text becomes a new run before or after it.
fn insert_segment_actions(doc: &Document, text: &str) -> Vec<EditAction> {
    let Some(caret) = valid_caret(doc) else {
        return Vec::new();
    };
    let count = text.chars().count();
    match doc.element_at(caret) {
        Some(RichTextElement::Run { .. }) => vec![
            EditAction::InsertCharacters {
                at: caret,
                text: text.to_string(),
            },
            move_caret(caret, caret.move_offset(count as isize).with_before_split(false)),
        ],
        Some(RichTextElement::Image { style, .. }) => {
            let index = caret.element + caret.offset;
            vec![
                EditAction::InsertElement {
                    paragraph: caret.paragraph,
                    index,
                    element: RichTextElement::Run {
                        text: text.to_string(),
                        style: style.clone(),
                    },
                },
                move_caret(caret, CaretPosition::new(caret.paragraph, index, count)),
            ]
        }
        None => Vec::new(),
    }
}

fn restyle(
    tx: &mut Transaction<'_>,
    selection: Selection,
    f: &dyn Fn(&TextStyle) -> TextStyle,
) -> Result<()> {
    let doc = tx.document();
    let (Some(start_linear), Some(end_linear)) = (
        doc.linear_offset(selection.start),
        doc.linear_offset(selection.end),
    ) else {
        return Ok(());
    };
    let caret_at_end = doc.caret() == Some(selection.end);

    let mut actions = Vec::new();
    for part in doc.iterate_parts(selection.start, selection.end).iter().rev() {
        match part {
            Part::CharacterRange {
                paragraph,
                element,
                start,
                end,
                ..
            } => {
                let Some(value) = doc.element(*paragraph, *element) else {
                    continue;
                };
                let old = value.style().cloned();
                let new = f(&effective(old.as_ref()));
                if new == effective(old.as_ref()) {
                    continue;
                }
                let mut target = *element;
                if *end < value.len() {
                    actions.push(EditAction::SplitElement {
                        paragraph: *paragraph,
                        element: *element,
                        offset: *end,
                    });
                }
                if *start > 0 {
                    actions.push(EditAction::SplitElement {
                        paragraph: *paragraph,
                        element: *element,
                        offset: *start,
                    });
                    target += 1;
                }
                actions.push(EditAction::SetElementStyle {
                    paragraph: *paragraph,
                    element: target,
                    old,
                    new: Some(new),
                });
            }
            Part::ElementRef {
                paragraph,
                element,
                value,
            } => actions.extend(set_style_action(*paragraph, *element, value, f)),
            Part::ParagraphRef { paragraph, value } => {
                for (index, element) in value.elements.iter().enumerate().rev() {
                    actions.extend(set_style_action(*paragraph, index, element, f));
                }
            }
        }
    }
    tx.apply_all(actions)?;

    // Splits shift element indices; re-resolve the selection from linear offsets.
    let doc = tx.document();
    let new_start = doc
        .caret_at_linear(selection.start.paragraph, start_linear, true)
        .context("selection start no longer resolves")?;
    let new_end = doc
        .caret_at_linear(selection.end.paragraph, end_linear, false)
        .context("selection end no longer resolves")?;
    let new_selection = Selection::new(new_start, new_end);
    let new_caret = if caret_at_end { new_end } else { new_start };
    let old_caret = doc.caret();

    if new_selection != selection {
        tx.apply(EditAction::ChangeSelection {
            old: Some(selection),
            new: Some(new_selection),
        })?;
    }
    if old_caret != Some(new_caret) {
        tx.apply(EditAction::MoveCaret {
            old: old_caret,
            new: Some(new_caret),
        })?;
    }
    Ok(())
}

fn set_style_action(
    paragraph: usize,
    element: usize,
    value: &RichTextElement,
    f: &dyn Fn(&TextStyle) -> TextStyle,
) -> Option<EditAction> {
    let old = value.style().cloned();
    let new = f(&effective(old.as_ref()));
    (new != effective(old.as_ref())).then_some(EditAction::SetElementStyle {
        paragraph,
        element,
        old,
        new: Some(new),
    })
}
