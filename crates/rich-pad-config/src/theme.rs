/// Palette presets for the rich-text view.
use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Colors used when painting rows, the caret, the selection and the scrollbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorColors {
    pub background: HexColor,
    pub text: HexColor,
    pub caret: HexColor,
    pub selection_background: HexColor,
    pub selection_text: HexColor,
    pub scrollbar_track: HexColor,
    pub scrollbar_thumb: HexColor,
}

impl Default for EditorColors {
    fn default() -> Self {
        Self::light()
    }
}

impl EditorColors {
    /// Black text on white, the classic rich-text look.
    pub fn light() -> Self {
        Self {
            background: HexColor::rgb(255, 255, 255),
            text: HexColor::rgb(0, 0, 0),
            caret: HexColor::rgb(0, 0, 0),
            selection_background: HexColor::rgb(51, 153, 255),
            selection_text: HexColor::rgb(255, 255, 255),
            scrollbar_track: HexColor::rgb(240, 240, 240),
            scrollbar_thumb: HexColor::rgb(190, 190, 190),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: HexColor::rgb(30, 30, 30),
            text: HexColor::rgb(212, 212, 212),
            caret: HexColor::rgb(255, 255, 255),
            selection_background: HexColor::rgb(38, 79, 120),
            selection_text: HexColor::rgb(255, 255, 255),
            scrollbar_track: HexColor::rgb(35, 35, 35),
            scrollbar_thumb: HexColor::rgb(90, 90, 90),
        }
    }
}
