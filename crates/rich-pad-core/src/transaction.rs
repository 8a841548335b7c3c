//! Applying groups of actions with change notification and rollback.

use anyhow::Result;

use crate::action::EditAction;
use crate::document::Document;
use crate::events::ParagraphChange;

/// Receives the paragraph changes of each action as soon as it is applied.
pub trait ChangeListener {
    fn paragraphs_changed(&mut self, document: &Document, changes: &[ParagraphChange]);
}

/// Ignores all changes.
impl ChangeListener for () {
    fn paragraphs_changed(&mut self, _document: &Document, _changes: &[ParagraphChange]) {}
}

/// Collects every change, in order.
impl ChangeListener for Vec<ParagraphChange> {
    fn paragraphs_changed(&mut self, _document: &Document, changes: &[ParagraphChange]) {
        self.extend_from_slice(changes);
    }
}

/// An in-progress group of actions.
///
/// Each action runs to completion, including its notifications, before the
/// next one starts, so later actions may depend on indices produced by
/// earlier ones. If an action fails, or the transaction is dropped without
/// [`Transaction::commit`], every applied action is undone in reverse.
pub struct Transaction<'a> {
    document: &'a mut Document,
    listener: &'a mut dyn ChangeListener,
    applied: Vec<EditAction>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub fn begin(document: &'a mut Document, listener: &'a mut dyn ChangeListener) -> Self {
        Self {
            document,
            listener,
            applied: Vec::new(),
            committed: false,
        }
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// Applies one action. On failure the whole transaction is rolled back.
    pub fn apply(&mut self, action: EditAction) -> Result<()> {
        match run_action(self.document, self.listener, &action) {
            Ok(()) => {
                self.applied.push(action);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Edit action {action:?} failed: {e}");
                self.rollback();
                Err(e)
            }
        }
    }

    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = EditAction>) -> Result<()> {
        for action in actions {
            self.apply(action)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Finishes the transaction and returns the applied group.
    pub fn commit(mut self) -> Vec<EditAction> {
        self.committed = true;
        std::mem::take(&mut self.applied)
    }

    /// Undoes every applied action, newest first.
    pub fn rollback(&mut self) {
        if !self.applied.is_empty() {
            tracing::error!("Rolling back {} applied action(s)", self.applied.len());
        }
        while let Some(action) = self.applied.pop() {
            if let Err(e) = run_action(self.document, self.listener, &action.inverse()) {
                tracing::error!("Rollback of {action:?} failed: {e}");
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

fn run_action(
    document: &mut Document,
    listener: &mut dyn ChangeListener,
    action: &EditAction,
) -> Result<()> {
    let changes = action.apply(document)?;
    for change in &changes {
        document.events.paragraph_changed.publish(change);
    }
    if !changes.is_empty() {
        listener.paragraphs_changed(document, &changes);
    }
    Ok(())
}

/// Undoes a recorded group: the inverse of each action, last to first.
pub fn replay_undo(
    document: &mut Document,
    listener: &mut dyn ChangeListener,
    group: &[EditAction],
) -> Result<()> {
    let mut tx = Transaction::begin(document, listener);
    tx.apply_all(group.iter().rev().map(EditAction::inverse))?;
    tx.commit();
    Ok(())
}

/// Re-applies a recorded group in its original order.
pub fn replay_redo(
    document: &mut Document,
    listener: &mut dyn ChangeListener,
    group: &[EditAction],
) -> Result<()> {
    let mut tx = Transaction::begin(document, listener);
    tx.apply_all(group.iter().cloned())?;
    tx.commit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret::CaretPosition;
    use crate::element::Paragraph;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn insert(p: usize, o: usize, text: &str) -> EditAction {
        EditAction::InsertCharacters {
            at: CaretPosition::new(p, 0, o),
            text: text.into(),
        }
    }

    #[test]
    fn test_listener_sees_each_action_in_order() {
        let mut doc = Document::from_text("ab\ncd");
        let mut changes: Vec<ParagraphChange> = Vec::new();
        let mut tx = Transaction::begin(&mut doc, &mut changes);
        tx.apply(insert(1, 0, "x")).unwrap();
        tx.apply(EditAction::MergeParagraphWithNext {
            paragraph: 0,
            element: 1,
        })
        .unwrap();
        let group = tx.commit();

        assert_eq!(group.len(), 2);
        assert_eq!(
            changes,
            vec![
                ParagraphChange::modified(1),
                ParagraphChange::modified(0),
                ParagraphChange::removed(1)
            ]
        );
    }

    #[test]
    fn test_changes_are_published_on_document_channel() {
        let mut doc = Document::from_text("ab");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        doc.events
            .paragraph_changed
            .subscribe(move |c: &ParagraphChange| log.borrow_mut().push(*c));

        let mut listener = ();
        let mut tx = Transaction::begin(&mut doc, &mut listener);
        tx.apply(insert(0, 2, "c")).unwrap();
        tx.commit();
        assert_eq!(*seen.borrow(), vec![ParagraphChange::modified(0)]);
    }

    #[test]
    fn test_failed_action_rolls_back_group() {
        let mut doc = Document::from_text("ab");
        let mut listener = ();
        {
            let mut tx = Transaction::begin(&mut doc, &mut listener);
            tx.apply(insert(0, 0, "1")).unwrap();
            tx.apply(insert(0, 0, "2")).unwrap();
            let result = tx.apply(insert(4, 0, "boom"));
            assert!(result.is_err());
            assert!(tx.is_empty());
        }
        assert_eq!(doc.plain_text(), "ab");
    }

    #[test]
    fn test_uncommitted_transaction_rolls_back_on_drop() {
        let mut doc = Document::from_text("ab");
        let mut listener = ();
        {
            let mut tx = Transaction::begin(&mut doc, &mut listener);
            tx.apply(EditAction::InsertParagraph {
                index: 1,
                paragraph: Paragraph::from_text("new"),
            })
            .unwrap();
            assert_eq!(tx.len(), 1);
        }
        assert_eq!(doc.plain_text(), "ab");
    }

    #[test]
    fn test_replay_undo_then_redo() {
        let mut doc = Document::from_text("ab");
        let mut listener = ();
        let group = {
            let mut tx = Transaction::begin(&mut doc, &mut listener);
            tx.apply(insert(0, 2, "c")).unwrap();
            tx.apply(insert(0, 3, "d")).unwrap();
            tx.commit()
        };
        assert_eq!(doc.plain_text(), "abcd");

        replay_undo(&mut doc, &mut listener, &group).unwrap();
        assert_eq!(doc.plain_text(), "ab");
        replay_redo(&mut doc, &mut listener, &group).unwrap();
        assert_eq!(doc.plain_text(), "abcd");
    }

    #[test]
    fn test_failed_replay_leaves_document_untouched() {
        let mut doc = Document::from_text("ab");
        let mut listener = ();
        let stale = vec![insert(0, 0, "x"), insert(0, 9, "y")];
        assert!(replay_redo(&mut doc, &mut listener, &stale).is_err());
        assert_eq!(doc.plain_text(), "ab");
    }
}
