/// Grouped undo/redo history.
///
/// Provides an `UndoManager` that records groups of invertible actions,
/// merges rapid consecutive edits into one undo step, and keeps undone
/// groups on a redo stack until a new edit invalidates them.
pub mod config;
pub mod manager;
pub mod operation;

pub use config::HistoryConfig;
pub use manager::UndoManager;
pub use operation::EditGroup;
