// Re-exports from rich-pad-mod-history, specialized to edit actions.
pub use rich_pad_mod_history::{HistoryConfig, UndoManager};

use crate::action::EditAction;

/// Undo/redo stacks of recorded action groups.
pub type EditHistory = UndoManager<EditAction>;
