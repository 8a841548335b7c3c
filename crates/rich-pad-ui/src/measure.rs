//! Text and image measurement.
//!
//! Layout never talks to a font engine directly. It goes through a
//! [`TextMeasurer`], which is deterministic for a given `(text, style)` pair
//! so results can be cached by [`MeasureCache`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use egui::text::LayoutJob;
use egui::{vec2, FontFamily, FontId, TextFormat, Vec2};
use rich_pad_core::element::ImageData;
use rich_pad_core::style::{TextStyle, DEFAULT_POINT_SIZE};

/// Size used for images whose bytes cannot be decoded.
pub const PLACEHOLDER_IMAGE_SIZE: Vec2 = vec2(24.0, 24.0);

/// Entries kept per cache table before it is flushed.
const MAX_CACHE_ENTRIES: usize = 16_384;

pub trait TextMeasurer {
    /// Width and height of `text` rendered on one line.
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2;

    /// Cumulative width after each char: entry `i` is the width of the
    /// first `i + 1` chars.
    fn partial_widths(&self, text: &str, style: &TextStyle) -> Vec<f32>;

    /// Pixel size of an encoded image.
    fn image_size(&self, image: &ImageData) -> Vec2 {
        decode_image_size(image)
    }
}

/// Reads the dimensions of an encoded image without decoding its pixels.
pub fn decode_image_size(image: &ImageData) -> Vec2 {
    let reader = image::ImageReader::new(Cursor::new(image.bytes()));
    let dimensions = reader
        .with_guessed_format()
        .map_err(image::ImageError::from)
        .and_then(|r| r.into_dimensions());
    match dimensions {
        Ok((w, h)) => vec2(w as f32, h as f32),
        Err(e) => {
            tracing::warn!("Failed to read image size ({} bytes): {e}", image.len());
            PLACEHOLDER_IMAGE_SIZE
        }
    }
}

/// Scale factor of a style relative to the default point size.
fn point_scale(style: &TextStyle) -> f32 {
    f32::from(style.point_size.max(1)) / f32::from(DEFAULT_POINT_SIZE)
}

// ── Monospace ──────────────────────────────────────────────────────────

/// A fixed-pitch measurer: every char is `char_width` wide at the default
/// point size, scaled linearly with the style's point size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl MonospaceMeasurer {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2 {
        let scale = point_scale(style);
        vec2(
            text.chars().count() as f32 * self.char_width * scale,
            self.line_height * scale,
        )
    }

    fn partial_widths(&self, text: &str, style: &TextStyle) -> Vec<f32> {
        let w = self.char_width * point_scale(style);
        (1..=text.chars().count()).map(|n| n as f32 * w).collect()
    }
}

// ── egui ───────────────────────────────────────────────────────────────

/// Measures with the fonts of a live egui context.
pub struct EguiMeasurer {
    ctx: egui::Context,
    zoom: f32,
}

impl EguiMeasurer {
    pub fn new(ctx: egui::Context, zoom: f32) -> Self {
        Self { ctx, zoom }
    }

    fn job(&self, text: &str, style: &TextStyle) -> LayoutJob {
        let mut job = LayoutJob::default();
        job.append(text, 0.0, text_format(style, self.zoom, egui::Color32::WHITE));
        job
    }
}

/// Maps a text style onto an egui font id.
pub fn font_id(style: &TextStyle, zoom: f32) -> FontId {
    let size = f32::from(style.point_size.max(1)) * zoom;
    if style.is_monospace() {
        FontId::new(size, FontFamily::Monospace)
    } else {
        FontId::new(size, FontFamily::Proportional)
    }
}

/// egui text format for a style. Bold has no separate face in the default
/// fonts; painters emulate it.
pub fn text_format(style: &TextStyle, zoom: f32, color: egui::Color32) -> TextFormat {
    TextFormat {
        font_id: font_id(style, zoom),
        color,
        italics: style.is_italic(),
        underline: if style.underline {
            egui::Stroke::new(1.0, color)
        } else {
            egui::Stroke::NONE
        },
        ..Default::default()
    }
}

impl TextMeasurer for EguiMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2 {
        let galley = self.ctx.fonts_mut(|f| f.layout_job(self.job(text, style)));
        galley.rect.size()
    }

    fn partial_widths(&self, text: &str, style: &TextStyle) -> Vec<f32> {
        let galley = self.ctx.fonts_mut(|f| f.layout_job(self.job(text, style)));
        let mut widths = Vec::with_capacity(text.len());
        let mut total = 0.0;
        for row in &galley.rows {
            for glyph in &row.glyphs {
                total += glyph.advance_width;
                widths.push(total);
            }
        }
        // Chars without a glyph still need an entry.
        let chars = text.chars().count();
        widths.resize(chars, total);
        widths
    }
}

// ── Cache ──────────────────────────────────────────────────────────────

type TextKey = (String, TextStyle);

/// Memoizes another measurer per `(text, style)` and per image content.
pub struct MeasureCache {
    inner: Box<dyn TextMeasurer>,
    extents: RefCell<HashMap<TextKey, Vec2>>,
    widths: RefCell<HashMap<TextKey, Vec<f32>>>,
    images: RefCell<HashMap<u64, Vec2>>,
}

impl std::fmt::Debug for MeasureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureCache")
            .field("extents", &self.extents.borrow().len())
            .field("widths", &self.widths.borrow().len())
            .field("images", &self.images.borrow().len())
            .finish_non_exhaustive()
    }
}

impl MeasureCache {
    pub fn new(inner: impl TextMeasurer + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            extents: RefCell::default(),
            widths: RefCell::default(),
            images: RefCell::default(),
        }
    }

    /// Swaps the underlying measurer and drops every cached result.
    pub fn replace(&mut self, inner: impl TextMeasurer + 'static) {
        self.inner = Box::new(inner);
        self.clear();
    }

    pub fn clear(&self) {
        self.extents.borrow_mut().clear();
        self.widths.borrow_mut().clear();
        self.images.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.extents.borrow().len() + self.widths.borrow().len() + self.images.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cached<K: std::hash::Hash + Eq, V: Clone>(
    table: &RefCell<HashMap<K, V>>,
    key: K,
    compute: impl FnOnce() -> V,
) -> V {
    if let Some(v) = table.borrow().get(&key) {
        return v.clone();
    }
    let value = compute();
    let mut table = table.borrow_mut();
    if table.len() >= MAX_CACHE_ENTRIES {
        tracing::debug!("Measurement cache full, flushing {} entries", table.len());
        table.clear();
    }
    table.insert(key, value.clone());
    value
}

impl TextMeasurer for MeasureCache {
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2 {
        cached(&self.extents, (text.to_string(), style.clone()), || {
            self.inner.measure(text, style)
        })
    }

    fn partial_widths(&self, text: &str, style: &TextStyle) -> Vec<f32> {
        cached(&self.widths, (text.to_string(), style.clone()), || {
            self.inner.partial_widths(text, style)
        })
    }

    fn image_size(&self, image: &ImageData) -> Vec2 {
        cached(&self.images, image.content_hash(), || self.inner.image_size(image))
    }
}
