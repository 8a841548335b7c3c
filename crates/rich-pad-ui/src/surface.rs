//! Paint surfaces and the recorded off-screen buffer.

use egui::{Color32, Pos2, Rect, Vec2};
use rich_pad_core::element::ImageData;
use rich_pad_core::style::TextStyle;

/// Colors rows are painted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color32,
    pub text: Color32,
    pub caret: Color32,
    pub selection_background: Color32,
    pub selection_text: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color32::WHITE,
            text: Color32::from_rgb(30, 30, 30),
            caret: Color32::BLACK,
            selection_background: Color32::from_rgb(51, 153, 255),
            selection_text: Color32::WHITE,
        }
    }
}

/// Something rows can be drawn onto.
pub trait PaintSurface {
    fn draw_text(&mut self, pos: Pos2, text: &str, style: &TextStyle, color: Color32);
    fn draw_rect(&mut self, rect: Rect, color: Color32);
    fn draw_image(&mut self, rect: Rect, image: &ImageData);
    /// Restricts subsequent drawing to `rect`, or lifts the restriction.
    fn clip(&mut self, rect: Option<Rect>);
    /// Copies the part of `source` inside `rect` onto this surface.
    fn blit(&mut self, rect: Rect, source: &DisplayList);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Text {
        pos: Pos2,
        text: String,
        style: TextStyle,
        color: Color32,
    },
    Rect {
        rect: Rect,
        color: Color32,
    },
    Image {
        rect: Rect,
        image: ImageData,
    },
}

impl PaintOp {
    fn translate(&mut self, delta: Vec2) {
        match self {
            PaintOp::Text { pos, .. } => *pos += delta,
            PaintOp::Rect { rect, .. } | PaintOp::Image { rect, .. } => *rect = rect.translate(delta),
        }
    }

    fn replay(&self, surface: &mut dyn PaintSurface) {
        match self {
            PaintOp::Text {
                pos,
                text,
                style,
                color,
            } => surface.draw_text(*pos, text, style, *color),
            PaintOp::Rect { rect, color } => surface.draw_rect(*rect, *color),
            PaintOp::Image { rect, image } => surface.draw_image(*rect, image),
        }
    }
}

/// A drawing operation together with the clip it was recorded under.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedOp {
    pub op: PaintOp,
    pub clip: Rect,
}

/// A retained list of drawing operations.
///
/// Used as the scroller's back buffer: regions are cleared and re-recorded
/// when rows change, the whole list is shifted when scrolling, and it is
/// replayed onto the visible surface.
#[derive(Debug, Clone)]
pub struct DisplayList {
    bounds: Rect,
    clip: Rect,
    ops: Vec<RecordedOp>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

impl DisplayList {
    /// An empty list covering `bounds`; operations outside are discarded.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            clip: bounds,
            ops: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drops everything and adopts new bounds.
    pub fn reset(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.clip = bounds;
        self.ops.clear();
    }

    /// Forgets what was drawn inside `rect`.
    ///
    /// Operations entirely inside are removed; operations whose clip spans
    /// the full width of `rect` and sticks out above or below have their
    /// clip trimmed. Anything else is left for later drawing to cover.
    pub fn clear_rect(&mut self, rect: Rect) {
        self.ops.retain_mut(|recorded| {
            let clip = &mut recorded.clip;
            if rect.contains_rect(*clip) {
                return false;
            }
            let spans_width = rect.min.x <= clip.min.x && rect.max.x >= clip.max.x;
            if spans_width && rect.intersects(*clip) {
                if rect.min.y <= clip.min.y {
                    clip.min.y = rect.max.y;
                } else if rect.max.y >= clip.max.y {
                    clip.max.y = rect.min.y;
                }
            }
            clip.is_positive()
        });
    }

    /// Shifts every operation by `delta`, dropping what leaves the bounds.
    pub fn translate(&mut self, delta: Vec2) {
        let bounds = self.bounds;
        self.ops.retain_mut(|recorded| {
            recorded.op.translate(delta);
            recorded.clip = recorded.clip.translate(delta).intersect(bounds);
            recorded.clip.is_positive()
        });
    }

    /// Replays the operations that touch `area` onto `surface`.
    pub fn replay(&self, surface: &mut dyn PaintSurface, area: Rect) {
        for recorded in &self.ops {
            let clip = recorded.clip.intersect(area);
            if !clip.is_positive() {
                continue;
            }
            surface.clip(Some(clip));
            recorded.op.replay(surface);
        }
        surface.clip(None);
    }

    fn record(&mut self, op: PaintOp) {
        if self.clip.is_positive() {
            self.ops.push(RecordedOp {
                op,
                clip: self.clip,
            });
        }
    }
}

impl PaintSurface for DisplayList {
    fn draw_text(&mut self, pos: Pos2, text: &str, style: &TextStyle, color: Color32) {
        self.record(PaintOp::Text {
            pos,
            text: text.to_string(),
            style: style.clone(),
            color,
        });
    }

    fn draw_rect(&mut self, rect: Rect, color: Color32) {
        if rect.intersects(self.clip) {
            self.record(PaintOp::Rect { rect, color });
        }
    }

    fn draw_image(&mut self, rect: Rect, image: &ImageData) {
        if rect.intersects(self.clip) {
            self.record(PaintOp::Image {
                rect,
                image: image.clone(),
            });
        }
    }

    fn clip(&mut self, rect: Option<Rect>) {
        self.clip = rect.map_or(self.bounds, |r| r.intersect(self.bounds));
    }

    fn blit(&mut self, rect: Rect, source: &DisplayList) {
        let saved = self.clip;
        for recorded in &source.ops {
            let clip = recorded.clip.intersect(rect).intersect(self.bounds);
            if clip.is_positive() {
                self.ops.push(RecordedOp {
                    op: recorded.op.clone(),
                    clip,
                });
            }
        }
        self.clip = saved;
    }
}
