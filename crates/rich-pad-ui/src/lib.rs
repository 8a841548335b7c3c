//! Presentation layer of rich-pad.
//!
//! Measurement, line wrapping and paragraph layout turn document content
//! into positioned fragments. The [`scroller::RowScroller`] keeps a small
//! window of laid-out rows around the viewport and estimates everything
//! else. [`controller::EditorController`] ties the editing core to that
//! view, and the `editor` and `app` modules put it on screen with egui.

pub mod app;
pub mod controller;
pub mod editor;
pub mod fonts;
pub mod layout;
pub mod measure;
pub mod rows;
pub mod scroller;
pub mod surface;
pub mod wrap;

pub use app::{App, StartupArgs};
pub use controller::{EditorController, VisualMotion};
pub use editor::{EditorTheme, EditorWidget};
pub use fonts::{FontCatalog, FontEvent};
pub use measure::{EguiMeasurer, MeasureCache, MonospaceMeasurer, TextMeasurer};
