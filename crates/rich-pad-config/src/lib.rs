pub mod color;
pub mod config;
pub mod theme;

pub use color::HexColor;
pub use config::{EditorConfig, HistorySettings};
pub use theme::EditorColors;
