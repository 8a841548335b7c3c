//! Scrollbar rendering and interaction for the editor widget.
//!
//! Row heights below the visible window are only estimated, so the thumb
//! is positioned from the scroller's running estimate of the total height
//! and dragging it performs an absolute scroll.

use egui::{Pos2, Rect, Response, Vec2};

use super::widget::{EditorWidget, SCROLLBAR_MIN_THUMB, SCROLLBAR_WIDTH};

/// Computes scroll position from a pointer coordinate along the track.
fn scroll_ratio_from_pointer(
    pointer_val: f32,
    track_start: f32,
    thumb_size: f32,
    thumb_travel: f32,
) -> f32 {
    let relative = pointer_val - track_start - thumb_size * 0.5;
    (relative / thumb_travel.max(1.0)).clamp(0.0, 1.0)
}

/// Thumb geometry for a track, or `None` when everything fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Thumb {
    pub rect: Rect,
    pub travel: f32,
    pub max_scroll: f32,
}

pub(crate) fn thumb_geometry(track: Rect, content_height: f32, position: f32) -> Option<Thumb> {
    let viewport_height = track.height();
    if content_height <= viewport_height || viewport_height <= 0.0 {
        return None;
    }
    let thumb_height =
        (viewport_height * (viewport_height / content_height)).max(SCROLLBAR_MIN_THUMB);
    let max_scroll = content_height - viewport_height;
    let travel = (viewport_height - thumb_height).max(0.0);
    let ratio = (position / max_scroll).clamp(0.0, 1.0);
    let rect = Rect::from_min_size(
        Pos2::new(track.min.x + 2.0, track.min.y + ratio * travel),
        Vec2::new(SCROLLBAR_WIDTH - 4.0, thumb_height),
    );
    Some(Thumb {
        rect,
        travel,
        max_scroll,
    })
}

impl EditorWidget<'_> {
    /// Renders the vertical scrollbar and handles drag and click-to-jump.
    pub(crate) fn render_vertical_scrollbar(
        &mut self,
        painter: &egui::Painter,
        response: &Response,
        track_rect: Rect,
        pointer_pos: Option<Pos2>,
    ) {
        painter.rect_filled(track_rect, 0.0, self.theme.scrollbar_track_color);

        let content_height = self.controller.estimated_height();
        let Some(thumb) = thumb_geometry(track_rect, content_height, self.controller.current_pos())
        else {
            return;
        };

        let is_dragging = self.state.scrollbar_drag;
        let color = if is_dragging {
            self.theme.scrollbar_thumb_active
        } else if pointer_pos.is_some_and(|p| thumb.rect.contains(p)) {
            self.theme.scrollbar_thumb_hover
        } else {
            self.theme.scrollbar_thumb_idle
        };
        painter.rect_filled(thumb.rect, 3.0, color);

        let jump = (is_dragging && response.dragged())
            || (response.clicked()
                && response
                    .interact_pointer_pos()
                    .is_some_and(|p| track_rect.contains(p)));
        if !jump {
            return;
        }
        if let Some(pos) = response.interact_pointer_pos() {
            let ratio =
                scroll_ratio_from_pointer(pos.y, track_rect.min.y, thumb.rect.height(), thumb.travel);
            self.controller.scroll_to(ratio * thumb.max_scroll);
        }
    }
}
