//! Synchronous publish/subscribe channels for document changes.
//!
//! Each event kind has its own [`EventChannel`]. Publishing calls every
//! subscriber in subscription order on the calling thread before returning.

use crate::caret::{CaretPosition, Selection};

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<E> = Box<dyn FnMut(&E)>;

pub struct EventChannel<E> {
    subscribers: Vec<(SubscriptionId, Subscriber<E>)>,
    next_id: u64,
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> std::fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E> EventChannel<E> {
    pub fn subscribe(&mut self, subscriber: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: &E) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Modified,
    Inserted,
    Removed,
}

/// A structural change to one paragraph, by index at the time of the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParagraphChange {
    pub kind: ChangeKind,
    pub paragraph: usize,
}

impl ParagraphChange {
    pub fn modified(paragraph: usize) -> Self {
        Self {
            kind: ChangeKind::Modified,
            paragraph,
        }
    }

    pub fn inserted(paragraph: usize) -> Self {
        Self {
            kind: ChangeKind::Inserted,
            paragraph,
        }
    }

    pub fn removed(paragraph: usize) -> Self {
        Self {
            kind: ChangeKind::Removed,
            paragraph,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretChange {
    pub old: Option<CaretPosition>,
    pub new: Option<CaretPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub old: Option<Selection>,
    pub new: Option<Selection>,
}

/// The channels a document publishes on.
#[derive(Debug, Default)]
pub struct DocumentEvents {
    pub paragraph_changed: EventChannel<ParagraphChange>,
    pub caret_changed: EventChannel<CaretChange>,
    pub selection_changed: EventChannel<SelectionChange>,
}
