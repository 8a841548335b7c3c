/// Grouped undo/redo stacks.
///
/// Groups are recorded after they have been applied. Undo hands the newest
/// group back to the caller (who replays it in reverse) and moves it onto the
/// redo stack; redo hands it back again for forward replay.
use std::time::{Duration, Instant};

use crate::config::HistoryConfig;
use crate::operation::EditGroup;

/// Manages undo/redo history for a single document.
pub struct UndoManager<A> {
    /// Undo stack, ordered by seq ascending (oldest first).
    undo_stack: Vec<EditGroup<A>>,
    /// Redo stack, with the most recently undone group on top.
    redo_stack: Vec<EditGroup<A>>,
    /// Next sequence number to assign to new groups.
    next_seq: u64,
    /// Whether recording is active (set to false during undo/redo replay).
    recording: bool,
    /// Timestamp of the last recorded group, used for merging.
    last_edit_time: Option<Instant>,
    config: HistoryConfig,
}

impl<A> std::fmt::Debug for UndoManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo_len", &self.undo_stack.len())
            .field("redo_len", &self.redo_stack.len())
            .field("next_seq", &self.next_seq)
            .field("recording", &self.recording)
            .finish()
    }
}

impl<A: Clone> Default for UndoManager<A> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<A: Clone> UndoManager<A> {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_seq: 0,
            recording: true,
            last_edit_time: None,
            config,
        }
    }

    /// Records a group of already-applied actions.
    ///
    /// Merges into the previous group if within the grouping timeout and no
    /// group break was forced. Clears the redo stack. Empty groups are ignored.
    pub fn record(&mut self, actions: Vec<A>) {
        if !self.recording || actions.is_empty() {
            return;
        }

        let now = Instant::now();
        let timeout = Duration::from_millis(self.config.group_timeout_ms);
        self.redo_stack.clear();

        if let (Some(last_group), Some(last_time)) = (self.undo_stack.last_mut(), self.last_edit_time)
        {
            if now.duration_since(last_time) < timeout {
                last_group.actions.extend(actions);
                self.last_edit_time = Some(now);
                return;
            }
        }

        self.undo_stack.push(EditGroup {
            actions,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.last_edit_time = Some(now);

        if self.undo_stack.len() > self.config.max_history_depth {
            let excess = self.undo_stack.len() - self.config.max_history_depth;
            self.undo_stack.drain(..excess);
            tracing::debug!("Evicted {excess} undo group(s) past the history depth");
        }
    }

    /// Forces a group break so the next record starts a new undo group.
    pub fn force_group_break(&mut self) {
        self.last_edit_time = None;
    }

    /// Undoes the most recent group.
    ///
    /// Returns the actions in the order they were applied; the caller
    /// inverts them last-to-first. Returns `None` if there's nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<A>> {
        let group = self.undo_stack.pop()?;
        let actions = group.actions.clone();
        self.redo_stack.push(group);
        self.last_edit_time = None;
        Some(actions)
    }

    /// Redoes the most recently undone group.
    ///
    /// Returns the actions that should be applied in forward order.
    /// Returns `None` if there's nothing to redo.
    pub fn redo(&mut self) -> Option<Vec<A>> {
        let group = self.redo_stack.pop()?;
        let actions = group.actions.clone();
        self.undo_stack.push(group);
        self.last_edit_time = None;
        Some(actions)
    }

    /// Puts a group that failed to undo back on the undo stack.
    pub fn restore_undo(&mut self) {
        if let Some(group) = self.redo_stack.pop() {
            self.undo_stack.push(group);
        }
    }

    /// Puts a group that failed to redo back on the redo stack.
    pub fn restore_redo(&mut self) {
        if let Some(group) = self.undo_stack.pop() {
            self.redo_stack.push(group);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Temporarily disables recording (used during undo/redo replay).
    pub fn pause_recording(&mut self) {
        self.recording = false;
    }

    /// Re-enables recording after a pause.
    pub fn resume_recording(&mut self) {
        self.recording = true;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.next_seq = 0;
        self.last_edit_time = None;
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_grouping() -> HistoryConfig {
        HistoryConfig {
            max_history_depth: 100,
            group_timeout_ms: 0,
        }
    }

    fn long_grouping() -> HistoryConfig {
        HistoryConfig {
            max_history_depth: 100,
            group_timeout_ms: 60_000,
        }
    }

    // ── Basic undo/redo ────────────────────────────────────────────────

    #[test]
    fn test_undo_redo_basic() {
        let mut mgr = UndoManager::new(no_grouping());
        mgr.record(vec!["a"]);
        mgr.record(vec!["b1", "b2"]);

        assert!(mgr.can_undo());
        assert_eq!(mgr.undo(), Some(vec!["b1", "b2"]));

        assert!(mgr.can_redo());
        assert_eq!(mgr.redo(), Some(vec!["b1", "b2"]));
        assert!(!mgr.can_redo());
    }

    #[test]
    fn test_empty_history() {
        let mut mgr: UndoManager<u32> = UndoManager::new(no_grouping());
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
        assert!(mgr.undo().is_none());
        assert!(mgr.redo().is_none());
    }

    #[test]
    fn test_empty_group_is_ignored() {
        let mut mgr: UndoManager<u32> = UndoManager::new(no_grouping());
        mgr.record(Vec::new());
        assert!(!mgr.can_undo());
    }

    #[test]
    fn test_redo_cleared_on_new_edit() {
        let mut mgr = UndoManager::new(no_grouping());
        mgr.record(vec![1]);
        mgr.record(vec![2]);
        mgr.undo();
        assert!(mgr.can_redo());

        mgr.record(vec![3]);
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo(), Some(vec![3]));
        assert_eq!(mgr.undo(), Some(vec![1]));
    }

    #[test]
    fn test_undo_all_then_redo_all() {
        let mut mgr = UndoManager::new(no_grouping());
        for i in 0..5 {
            mgr.record(vec![i]);
        }
        let undone: Vec<_> = std::iter::from_fn(|| mgr.undo()).collect();
        assert_eq!(undone, vec![vec![4], vec![3], vec![2], vec![1], vec![0]]);

        let redone: Vec<_> = std::iter::from_fn(|| mgr.redo()).collect();
        assert_eq!(redone, vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
        assert_eq!(mgr.undo_len(), 5);
        assert_eq!(mgr.redo_len(), 0);
    }

    // ── Grouping ───────────────────────────────────────────────────────

    #[test]
    fn test_groups_merge_within_timeout() {
        let mut mgr = UndoManager::new(long_grouping());
        mgr.record(vec!['h']);
        mgr.record(vec!['i']);
        assert_eq!(mgr.undo_len(), 1);
        assert_eq!(mgr.undo(), Some(vec!['h', 'i']));
    }

    #[test]
    fn test_force_group_break_separates_groups() {
        let mut mgr = UndoManager::new(long_grouping());
        mgr.record(vec!['h']);
        mgr.force_group_break();
        mgr.record(vec!['i']);
        assert_eq!(mgr.undo_len(), 2);
    }

    #[test]
    fn test_undo_breaks_grouping() {
        let mut mgr = UndoManager::new(long_grouping());
        mgr.record(vec![1]);
        mgr.record(vec![2]);
        mgr.undo();
        mgr.record(vec![3]);
        assert_eq!(mgr.undo(), Some(vec![3]));
    }

    // ── Recording control ──────────────────────────────────────────────

    #[test]
    fn test_pause_recording() {
        let mut mgr = UndoManager::new(no_grouping());
        mgr.pause_recording();
        assert!(!mgr.is_recording());
        mgr.record(vec![1]);
        assert!(!mgr.can_undo());

        mgr.resume_recording();
        mgr.record(vec![2]);
        assert_eq!(mgr.undo_len(), 1);
    }

    #[test]
    fn test_restore_after_failed_replay() {
        let mut mgr = UndoManager::new(no_grouping());
        mgr.record(vec![1]);
        mgr.undo();
        mgr.restore_undo();
        assert_eq!(mgr.undo_len(), 1);
        assert_eq!(mgr.redo_len(), 0);

        mgr.undo();
        mgr.redo();
        mgr.restore_redo();
        assert_eq!(mgr.undo_len(), 0);
        assert_eq!(mgr.redo_len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut mgr = UndoManager::new(no_grouping());
        mgr.record(vec![1]);
        mgr.record(vec![2]);
        mgr.undo();
        mgr.clear();
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
    }

    // ── Depth limit ────────────────────────────────────────────────────

    #[test]
    fn test_max_depth_enforced() {
        let mut mgr = UndoManager::new(HistoryConfig {
            max_history_depth: 3,
            group_timeout_ms: 0,
        });
        for i in 0..10 {
            mgr.record(vec![i]);
        }
        assert_eq!(mgr.undo_len(), 3);
        assert_eq!(mgr.undo(), Some(vec![9]));
        assert_eq!(mgr.undo(), Some(vec![8]));
        assert_eq!(mgr.undo(), Some(vec![7]));
        assert!(mgr.undo().is_none());
    }

    #[test]
    fn test_debug_output_is_compact() {
        let mut mgr = UndoManager::new(no_grouping());
        mgr.record(vec![1]);
        let text = format!("{mgr:?}");
        assert!(text.contains("undo_len: 1"));
    }
}
