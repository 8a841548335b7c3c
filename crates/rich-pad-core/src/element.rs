//! Rich text elements and paragraphs.
//!
//! A paragraph is an ordered list of elements. Text runs are addressed by
//! char offset; an image always has length 1.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::style::TextStyle;

/// Encoded image bytes (PNG, JPEG, ...), shared between clones.
#[derive(Clone)]
pub struct ImageData(Arc<[u8]>);

impl ImageData {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable content hash, used to key decoded textures and sizes.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for ImageData {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for ImageData {}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImageData({} bytes)", self.0.len())
    }
}

/// Placeholder char used when an image is flattened to text.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// An atomic styled content unit inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichTextElement {
    Run {
        text: String,
        style: Option<TextStyle>,
    },
    Image {
        data: ImageData,
        style: Option<TextStyle>,
    },
}

impl RichTextElement {
    pub fn run(text: impl Into<String>) -> Self {
        Self::Run {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled_run(text: impl Into<String>, style: TextStyle) -> Self {
        Self::Run {
            text: text.into(),
            style: Some(style),
        }
    }

    pub fn image(data: ImageData) -> Self {
        Self::Image { data, style: None }
    }

    /// An empty run carrying `style`, used to keep paragraphs non-empty.
    pub fn empty_run(style: Option<TextStyle>) -> Self {
        Self::Run {
            text: String::new(),
            style,
        }
    }

    /// Caret-addressable length: char count for runs, 1 for images.
    pub fn len(&self) -> usize {
        match self {
            Self::Run { text, .. } => text.chars().count(),
            Self::Image { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_offset(&self, offset: usize) -> bool {
        offset <= self.len()
    }

    pub fn is_run(&self) -> bool {
        matches!(self, Self::Run { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Run { text, .. } => Some(text),
            Self::Image { .. } => None,
        }
    }

    pub fn style(&self) -> Option<&TextStyle> {
        match self {
            Self::Run { style, .. } | Self::Image { style, .. } => style.as_ref(),
        }
    }

    pub fn set_style(&mut self, new_style: Option<TextStyle>) {
        match self {
            Self::Run { style, .. } | Self::Image { style, .. } => *style = new_style,
        }
    }

    /// Char at `offset`, for runs only.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text().and_then(|t| t.chars().nth(offset))
    }

    /// Chars `start..end` of a run.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        let text = self.text()?;
        let from = byte_index(text, start)?;
        let to = byte_index(text, end)?;
        text.get(from..to)
    }
}

/// Byte index of char `offset` in `text`; `text.len()` for the end offset.
pub fn byte_index(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(offset)
}

/// An ordered sequence of elements plus an optional paragraph style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub elements: Vec<RichTextElement>,
    pub style: Option<TextStyle>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl Paragraph {
    /// Creates a paragraph; an empty element list becomes one empty run.
    pub fn new(elements: Vec<RichTextElement>) -> Self {
        let mut paragraph = Self {
            elements,
            style: None,
        };
        paragraph.ensure_not_empty();
        paragraph
    }

    /// A paragraph holding a single empty run.
    pub fn empty() -> Self {
        Self {
            elements: vec![RichTextElement::empty_run(None)],
            style: None,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![RichTextElement::run(text)])
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the paragraph is a single empty run.
    pub fn is_empty(&self) -> bool {
        match self.elements.as_slice() {
            [] => true,
            [only] => only.is_empty(),
            _ => false,
        }
    }

    pub fn element(&self, index: usize) -> Option<&RichTextElement> {
        self.elements.get(index)
    }

    /// Sum of element lengths.
    pub fn char_len(&self) -> usize {
        self.elements.iter().map(RichTextElement::len).sum()
    }

    /// Flattened text, with images as U+FFFC.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                RichTextElement::Run { text, .. } => out.push_str(text),
                RichTextElement::Image { .. } => out.push(OBJECT_REPLACEMENT),
            }
        }
        out
    }

    pub(crate) fn ensure_not_empty(&mut self) {
        if self.elements.is_empty() {
            self.elements.push(RichTextElement::empty_run(self.style.clone()));
        }
    }
}
