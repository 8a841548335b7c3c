//! Editor theme: config colors resolved to egui colors.

use egui::Color32;
use rich_pad_config::{EditorColors, HexColor};

use crate::surface::Palette;

/// Converts a `HexColor` to egui `Color32`.
pub(crate) fn hex_to_color32(c: HexColor) -> Color32 {
    Color32::from_rgba_premultiplied(c.r, c.g, c.b, c.a)
}

/// Colors used by the editor widget.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorTheme {
    pub bg_color: Color32,
    pub text_color: Color32,
    pub caret_color: Color32,
    pub selection_bg: Color32,
    pub selection_text: Color32,
    pub scrollbar_track_color: Color32,
    pub scrollbar_thumb_idle: Color32,
    pub scrollbar_thumb_hover: Color32,
    pub scrollbar_thumb_active: Color32,
}

impl Default for EditorTheme {
    fn default() -> Self {
        Self::from_config(&EditorColors::default())
    }
}

impl EditorTheme {
    pub fn from_config(colors: &EditorColors) -> Self {
        let thumb = hex_to_color32(colors.scrollbar_thumb);
        let toward = contrast_target(hex_to_color32(colors.background));
        Self {
            bg_color: hex_to_color32(colors.background),
            text_color: hex_to_color32(colors.text),
            caret_color: hex_to_color32(colors.caret),
            selection_bg: hex_to_color32(colors.selection_background),
            selection_text: hex_to_color32(colors.selection_text),
            scrollbar_track_color: hex_to_color32(colors.scrollbar_track),
            scrollbar_thumb_idle: thumb,
            scrollbar_thumb_hover: thumb.lerp_to_gamma(toward, 0.2),
            scrollbar_thumb_active: thumb.lerp_to_gamma(toward, 0.4),
        }
    }

    pub fn dark() -> Self {
        Self::from_config(&EditorColors::dark())
    }

    pub fn light() -> Self {
        Self::from_config(&EditorColors::light())
    }

    /// The colors rows are painted with.
    pub fn palette(&self) -> Palette {
        Palette {
            background: self.bg_color,
            text: self.text_color,
            caret: self.caret_color,
            selection_background: self.selection_bg,
            selection_text: self.selection_text,
        }
    }

    pub fn is_dark(&self) -> bool {
        luminance(self.bg_color) < 128
    }
}

fn luminance(c: Color32) -> u32 {
    (u32::from(c.r()) * 299 + u32::from(c.g()) * 587 + u32::from(c.b()) * 114) / 1000
}

/// Thumb highlights move away from the background.
fn contrast_target(background: Color32) -> Color32 {
    if luminance(background) < 128 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
