//! Positioned pieces of a laid-out paragraph.

use std::ops::Range;

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use rich_pad_core::element::ImageData;
use rich_pad_core::style::TextStyle;

use crate::surface::{PaintSurface, Palette};

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentContent {
    Text {
        text: String,
        style: TextStyle,
        /// Cumulative width at every char boundary, starting with 0.
        extents: Vec<f32>,
    },
    Image {
        image: ImageData,
        margin: f32,
    },
}

/// One piece of an element placed on one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Index of the owning element in the paragraph.
    pub element: usize,
    /// Char offsets covered within that element.
    pub range: Range<usize>,
    /// Position relative to the paragraph's top-left corner.
    pub rect: Rect,
    pub content: FragmentContent,
    /// Selected local offsets, if any part is highlighted.
    pub selected: Option<Range<usize>>,
}

impl Fragment {
    pub fn text(
        element: usize,
        range: Range<usize>,
        origin: Pos2,
        size: Vec2,
        text: String,
        style: TextStyle,
        widths: Vec<f32>,
    ) -> Self {
        let mut extents = Vec::with_capacity(widths.len() + 1);
        extents.push(0.0);
        extents.extend(widths);
        Self {
            element,
            range,
            rect: Rect::from_min_size(origin, size),
            content: FragmentContent::Text {
                text,
                style,
                extents,
            },
            selected: None,
        }
    }

    pub fn image(element: usize, origin: Pos2, size: Vec2, image: ImageData, margin: f32) -> Self {
        Self {
            element,
            range: 0..1,
            rect: Rect::from_min_size(origin, size),
            content: FragmentContent::Image { image, margin },
            selected: None,
        }
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.range.start <= offset && offset <= self.range.end
    }

    /// Horizontal position of a local caret offset, relative to the fragment.
    pub fn caret_x(&self, local: usize) -> f32 {
        match &self.content {
            FragmentContent::Text { extents, .. } => extents
                .get(local)
                .or(extents.last())
                .copied()
                .unwrap_or(0.0),
            FragmentContent::Image { .. } => {
                if local == 0 {
                    0.0
                } else {
                    self.rect.width()
                }
            }
        }
    }

    /// Local offset nearest to `x` (relative to the fragment) and whether
    /// it is the fragment's end.
    pub fn hit_test(&self, x: f32) -> (usize, bool) {
        match &self.content {
            FragmentContent::Text { extents, .. } => {
                let chars = extents.len().saturating_sub(1);
                if chars == 0 {
                    return (0, true);
                }
                let mut offset = chars;
                for i in 0..chars {
                    let (left, right) = (extents[i], extents[i + 1]);
                    if x < right {
                        let middle = left + (right - left) / 2.0;
                        offset = if x < middle { i } else { i + 1 };
                        break;
                    }
                }
                (offset, offset == chars)
            }
            FragmentContent::Image { margin, .. } => {
                let offset = usize::from(x > self.rect.width() / 2.0 + margin);
                (offset, true)
            }
        }
    }

    /// Paints the fragment with its top-left at `origin + rect.min`.
    pub fn paint(&self, surface: &mut dyn PaintSurface, origin: Pos2, palette: &Palette) {
        let rect = self.rect.translate(origin.to_vec2());
        match &self.content {
            FragmentContent::Text {
                text,
                style,
                extents,
            } => {
                surface.draw_text(rect.min, text, style, palette.text);
                let Some(selected) = &self.selected else {
                    return;
                };
                let (start, end) = (selected.start, selected.end.min(extents.len() - 1));
                if start >= end {
                    return;
                }
                let left = rect.min.x + extents[start];
                let highlight = Rect::from_min_max(
                    pos2(left, rect.min.y),
                    pos2(rect.min.x + extents[end], rect.max.y),
                );
                surface.draw_rect(highlight, palette.selection_background);
                let piece: String = text.chars().skip(start).take(end - start).collect();
                surface.draw_text(pos2(left, rect.min.y), &piece, style, palette.selection_text);
            }
            FragmentContent::Image { image, margin } => {
                if self.selected.is_some() {
                    surface.draw_rect(rect, palette.selection_background);
                }
                surface.draw_image(rect.shrink(*margin), image);
            }
        }
    }

    /// Caret rectangle at a local offset, relative to the paragraph.
    pub fn caret_rect(&self, local: usize, caret_width: f32) -> Rect {
        Rect::from_min_size(
            pos2(self.rect.min.x + self.caret_x(local), self.rect.min.y),
            vec2(caret_width, self.rect.height()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_fragment(text: &str) -> Fragment {
        let widths = (1..=text.chars().count()).map(|n| n as f32 * 10.0).collect();
        Fragment::text(
            0,
            0..text.chars().count(),
            pos2(5.0, 0.0),
            vec2(text.chars().count() as f32 * 10.0, 20.0),
            text.to_string(),
            TextStyle::default(),
            widths,
        )
    }

    #[test]
    fn test_hit_test_midpoint_rule() {
        let f = text_fragment("abcd");
        assert_eq!(f.hit_test(0.0), (0, false));
        assert_eq!(f.hit_test(4.9), (0, false));
        assert_eq!(f.hit_test(5.0), (1, false));
        assert_eq!(f.hit_test(26.0), (3, false));
        assert_eq!(f.hit_test(36.0), (4, true));
        assert_eq!(f.hit_test(500.0), (4, true));
    }

    #[test]
    fn test_empty_fragment_hits_start() {
        assert_eq!(text_fragment("").hit_test(12.0), (0, true));
    }

    #[test]
    fn test_image_hit_uses_margin() {
        let f = Fragment::image(
            1,
            Pos2::ZERO,
            vec2(40.0, 40.0),
            ImageData::new(vec![0u8]),
            10.0,
        );
        assert_eq!(f.hit_test(25.0), (0, true));
        assert_eq!(f.hit_test(31.0), (1, true));
    }

    #[test]
    fn test_caret_x() {
        let f = text_fragment("abc");
        assert_eq!(f.caret_x(0), 0.0);
        assert_eq!(f.caret_x(2), 20.0);
        assert_eq!(f.caret_rect(3, 2.0), Rect::from_min_size(pos2(35.0, 0.0), vec2(2.0, 20.0)));
    }
}
