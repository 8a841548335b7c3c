mod input;
mod painter;
mod scrollbar;
mod theme;
mod widget;

pub use painter::{EguiSurface, TextureCache};
pub use theme::EditorTheme;
pub use widget::{EditorViewState, EditorWidget};
