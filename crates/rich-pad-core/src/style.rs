/// Character styles attached to runs, images and paragraphs.
use serde::{Deserialize, Serialize};

/// Default point size for unstyled text.
pub const DEFAULT_POINT_SIZE: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontSlant {
    #[default]
    Normal,
    Slant,
    Italic,
}

/// Generic font family, used when no face name is set or the face is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Default,
    Decorative,
    Roman,
    Script,
    Swiss,
    Modern,
}

/// Visual style of a run of text.
///
/// Hashable so measurement results can be cached per `(text, style)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub point_size: u16,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub underline: bool,
    pub family: FontFamily,
    /// Concrete font face, e.g. `"DejaVu Sans"`.
    pub face_name: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            point_size: DEFAULT_POINT_SIZE,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            underline: false,
            family: FontFamily::Default,
            face_name: None,
        }
    }
}

impl TextStyle {
    pub fn with_point_size(mut self, point_size: u16) -> Self {
        self.point_size = point_size.max(1);
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_slant(mut self, slant: FontSlant) -> Self {
        self.slant = slant;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_face(mut self, family: FontFamily, face_name: Option<String>) -> Self {
        self.family = family;
        self.face_name = face_name;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    /// Slanted and italic faces both count as italic.
    pub fn is_italic(&self) -> bool {
        self.slant != FontSlant::Normal
    }

    pub fn is_monospace(&self) -> bool {
        self.family == FontFamily::Modern
    }
}

/// Resolves an optional element style against the default style.
pub fn effective(style: Option<&TextStyle>) -> TextStyle {
    style.cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_style() {
        let style = TextStyle::default();
        assert_eq!(style.point_size, 12);
        assert!(!style.is_bold());
        assert!(!style.is_italic());
        assert!(!style.underline);
        assert_eq!(style.face_name, None);
    }

    #[test]
    fn test_builders() {
        let style = TextStyle::default()
            .with_weight(FontWeight::Bold)
            .with_slant(FontSlant::Slant)
            .with_point_size(0);
        assert!(style.is_bold());
        assert!(style.is_italic());
        assert_eq!(style.point_size, 1);
    }

    #[test]
    fn test_styles_are_hash_keys() {
        let mut set = HashSet::new();
        set.insert(TextStyle::default());
        set.insert(TextStyle::default().with_underline(true));
        set.insert(TextStyle::default());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_effective_falls_back_to_default() {
        assert_eq!(effective(None), TextStyle::default());
        let bold = TextStyle::default().with_weight(FontWeight::Bold);
        assert_eq!(effective(Some(&bold)), bold);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let style: TextStyle = serde_json::from_str(r#"{"weight": "Bold"}"#).unwrap();
        assert!(style.is_bold());
        assert_eq!(style.point_size, DEFAULT_POINT_SIZE);
        assert_eq!(style.family, FontFamily::Default);
    }
}
