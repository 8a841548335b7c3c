//! Document model and editing core for the rich-pad text widget.
//!
//! A [`document::Document`] is a list of paragraphs of styled runs and
//! images. Every mutation is an invertible [`action::EditAction`] applied
//! through a [`transaction::Transaction`]; the [`editor::Editor`] builds the
//! composite commands (typing, Backspace, Delete, Return, restyling) and
//! keeps the undo history.
pub mod action;
pub mod caret;
pub mod document;
pub mod editor;
pub mod element;
pub mod events;
pub mod history;
pub mod style;
pub mod transaction;

pub use action::EditAction;
pub use caret::{CaretPosition, Selection};
pub use document::{Document, Part};
pub use editor::{Editor, Motion};
pub use element::{ImageData, Paragraph, RichTextElement};
pub use events::{ChangeKind, ParagraphChange};
pub use style::TextStyle;
pub use transaction::{ChangeListener, Transaction};
