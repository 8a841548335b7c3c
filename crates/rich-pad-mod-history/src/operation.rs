//! Undo groups.

/// A group of actions that form a single undo step.
///
/// Actions are stored in the order they were applied. Undo walks them in
/// reverse, redo walks them forward.
#[derive(Debug, Clone, PartialEq)]
pub struct EditGroup<A> {
    /// Actions in this group, in chronological order.
    pub actions: Vec<A>,
    /// Monotonic sequence number assigned by the `UndoManager`.
    pub seq: u64,
}

impl<A> EditGroup<A> {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_len() {
        let group = EditGroup {
            actions: vec!["a", "b"],
            seq: 3,
        };
        assert_eq!(group.len(), 2);
        assert!(!group.is_empty());
    }

    #[test]
    fn test_empty_group() {
        let group: EditGroup<u8> = EditGroup {
            actions: Vec::new(),
            seq: 0,
        };
        assert!(group.is_empty());
    }
}
