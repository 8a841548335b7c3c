//! Paint surface over an egui painter.

use std::collections::HashMap;

use egui::{text::LayoutJob, Color32, Pos2, Rect, Stroke, TextureHandle, Vec2};
use rich_pad_core::element::ImageData;
use rich_pad_core::style::TextStyle;

use crate::measure::text_format;
use crate::surface::{DisplayList, PaintSurface};

/// Horizontal offset of the second pass that emulates bold text.
const FAUX_BOLD_OFFSET: f32 = 0.6;

/// Textures for image elements, keyed by content hash. Images that fail to
/// decode are remembered as `None` so they are not decoded every frame.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<u64, Option<TextureHandle>>,
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("len", &self.textures.len())
            .finish()
    }
}

impl TextureCache {
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }

    fn texture(&mut self, ctx: &egui::Context, image: &ImageData) -> Option<&TextureHandle> {
        let key = image.content_hash();
        self.textures
            .entry(key)
            .or_insert_with(|| load_texture(ctx, key, image))
            .as_ref()
    }
}

fn load_texture(ctx: &egui::Context, key: u64, image: &ImageData) -> Option<TextureHandle> {
    match image::load_from_memory(image.bytes()) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
            Some(ctx.load_texture(
                format!("rich-pad-image-{key:016x}"),
                color_image,
                egui::TextureOptions::LINEAR,
            ))
        }
        Err(e) => {
            tracing::warn!("Failed to decode image ({} bytes): {e}", image.len());
            None
        }
    }
}

/// Draws in viewport coordinates onto an egui painter whose area starts at
/// `origin`.
pub struct EguiSurface<'a> {
    painter: egui::Painter,
    base_clip: Rect,
    origin: Vec2,
    zoom: f32,
    textures: &'a mut TextureCache,
}

impl<'a> EguiSurface<'a> {
    pub fn new(
        painter: &egui::Painter,
        origin: Pos2,
        zoom: f32,
        textures: &'a mut TextureCache,
    ) -> Self {
        Self {
            painter: painter.clone(),
            base_clip: painter.clip_rect(),
            origin: origin.to_vec2(),
            zoom,
            textures,
        }
    }

    fn to_screen(&self, rect: Rect) -> Rect {
        rect.translate(self.origin)
    }
}

impl PaintSurface for EguiSurface<'_> {
    fn draw_text(&mut self, pos: Pos2, text: &str, style: &TextStyle, color: Color32) {
        if text.is_empty() {
            return;
        }
        let mut job = LayoutJob::default();
        job.append(text, 0.0, text_format(style, self.zoom, color));
        let galley = self.painter.layout_job(job);
        let pos = pos + self.origin;
        if style.is_bold() {
            self.painter
                .galley(pos + Vec2::new(FAUX_BOLD_OFFSET, 0.0), galley.clone(), color);
        }
        self.painter.galley(pos, galley, color);
    }

    fn draw_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(self.to_screen(rect), 0.0, color);
    }

    fn draw_image(&mut self, rect: Rect, image: &ImageData) {
        let rect = self.to_screen(rect);
        let ctx = self.painter.ctx().clone();
        match self.textures.texture(&ctx, image) {
            Some(texture) => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                self.painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
            None => {
                self.painter.rect_stroke(
                    rect,
                    0.0,
                    Stroke::new(1.0, Color32::GRAY),
                    egui::StrokeKind::Inside,
                );
                self.painter.line_segment(
                    [rect.left_top(), rect.right_bottom()],
                    Stroke::new(1.0, Color32::GRAY),
                );
            }
        }
    }

    fn clip(&mut self, rect: Option<Rect>) {
        let clip = match rect {
            Some(rect) => self.to_screen(rect).intersect(self.base_clip),
            None => self.base_clip,
        };
        self.painter.set_clip_rect(clip);
    }

    fn blit(&mut self, rect: Rect, source: &DisplayList) {
        source.replay(self, rect);
    }
}
