//! Core editor widget: layout, rendering, scrolling, and mouse interaction.
//!
//! The `EditorWidget` is rebuilt every frame around the long-lived
//! [`EditorController`] and [`EditorViewState`]. Input is processed before
//! painting so the caret and rows never lag a frame behind.

use std::time::Duration;

use egui::{Pos2, Rect, Response, Sense, Ui};

use super::painter::{EguiSurface, TextureCache};
use super::theme::EditorTheme;
use crate::controller::EditorController;
use crate::measure::EguiMeasurer;

/// Scrollbar track width in logical pixels.
pub(crate) const SCROLLBAR_WIDTH: f32 = 14.0;
/// Minimum scrollbar thumb size in logical pixels.
pub(crate) const SCROLLBAR_MIN_THUMB: f32 = 20.0;

/// Widget state that outlives a frame but does not belong in the
/// controller.
#[derive(Debug, Default)]
pub struct EditorViewState {
    pub(crate) textures: TextureCache,
    pub(crate) scrollbar_drag: bool,
    /// Zoom the controller's measurer was built for; 0 forces a rebuild.
    pub(crate) measured_zoom: f32,
}

impl EditorViewState {
    /// State for a controller whose measurer already matches `zoom`.
    pub fn with_zoom(zoom: f32) -> Self {
        Self {
            measured_zoom: zoom,
            ..Self::default()
        }
    }

    /// Images decoded so far, including ones that failed to decode.
    pub fn textures_loaded(&self) -> usize {
        self.textures.len()
    }
}

/// The custom editor widget that renders the controller's document.
pub struct EditorWidget<'a> {
    pub controller: &'a mut EditorController,
    pub state: &'a mut EditorViewState,
    pub theme: &'a EditorTheme,
    pub zoom_level: f32,
    /// When true, the editor won't steal focus or process keyboard input.
    pub dialog_open: bool,
    /// Zoom factor from Ctrl+scroll (1.0 = no change). Read by the app after `show()`.
    pub zoom_request: f32,
}

impl<'a> EditorWidget<'a> {
    pub fn new(
        controller: &'a mut EditorController,
        state: &'a mut EditorViewState,
        theme: &'a EditorTheme,
        zoom_level: f32,
    ) -> Self {
        Self {
            controller,
            state,
            theme,
            zoom_level,
            dialog_open: false,
            zoom_request: 1.0,
        }
    }

    /// Shows the editor widget and returns a response.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let rect = response.rect;

        if (self.state.measured_zoom - self.zoom_level).abs() > f32::EPSILON {
            tracing::debug!("Rebuilding measurer for zoom {:.2}", self.zoom_level);
            self.controller
                .set_measurer(EguiMeasurer::new(ui.ctx().clone(), self.zoom_level));
            self.state.textures.clear();
            self.state.measured_zoom = self.zoom_level;
        }

        let text_area =
            Rect::from_min_max(rect.min, Pos2::new(rect.max.x - SCROLLBAR_WIDTH, rect.max.y));
        let track_rect = Rect::from_min_max(Pos2::new(text_area.max.x, rect.min.y), rect.max);
        self.controller.resize(text_area.size());

        let now = ui.input(|i| i.time);
        self.controller.tick(now);

        if response.hovered() {
            // Ctrl+scroll → zoom (egui converts Ctrl+scroll into zoom_delta,
            // removing it from smooth_scroll_delta)
            let zoom_delta = ui.input(|i| i.zoom_delta());
            if zoom_delta != 1.0 {
                self.zoom_request = zoom_delta;
            }
            let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
            if scroll_delta.y != 0.0 {
                self.controller.scroll_by(-scroll_delta.y);
            }
        }

        // ── Process ALL input BEFORE rendering ──────────────────
        let pointer_pos = ui.input(|i| i.pointer.interact_pos());
        if response.drag_started() {
            self.state.scrollbar_drag = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos())
                .is_some_and(|p| track_rect.contains(p));
        }
        // A text selection drag keeps going when the pointer crosses the track.
        let pointer_on_scrollbar = self.state.scrollbar_drag
            || (!self.controller.is_dragging()
                && response
                    .interact_pointer_pos()
                    .is_some_and(|p| track_rect.contains(p)));

        if !pointer_on_scrollbar {
            self.handle_mouse(ui, &response, text_area);
        }
        if response.clicked() || response.drag_started() {
            response.request_focus();
        }

        // Auto-focus the editor so it's ready for typing, but skip when a
        // dialog is open so it doesn't steal focus from dialog fields.
        if !self.dialog_open && !response.has_focus() && !response.lost_focus() {
            response.request_focus();
        }

        // The EventFilter tells egui NOT to consume Tab or arrow keys for
        // focus navigation.
        if !self.dialog_open && response.has_focus() {
            ui.memory_mut(|mem| {
                mem.set_focus_lock_filter(
                    response.id,
                    egui::EventFilter {
                        tab: true,
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        escape: false,
                    },
                );
            });
            self.handle_keyboard_input(ui);
        }

        // ── Render with up-to-date state ────────────────────────
        self.controller.set_palette(self.theme.palette());
        painter.rect_filled(rect, 0.0, self.theme.bg_color);
        {
            let clipped = painter.with_clip_rect(text_area);
            let mut surface = EguiSurface::new(
                &clipped,
                text_area.min,
                self.zoom_level,
                &mut self.state.textures,
            );
            self.controller.paint(&mut surface);
        }
        self.render_vertical_scrollbar(&painter, &response, track_rect, pointer_pos);

        if response.drag_stopped() {
            self.state.scrollbar_drag = false;
        }

        let blink = Duration::from_millis(self.controller.config().caret_blink_ms);
        ui.ctx().request_repaint_after(blink);

        response
    }

    /// Click, shift+click and drag selection. Positions are passed to the
    /// controller relative to the text area.
    fn handle_mouse(&mut self, ui: &Ui, response: &Response, text_area: Rect) {
        let to_local = |pos: Pos2| (pos - text_area.min).to_pos2();
        let shift = ui.input(|i| i.modifiers.shift);

        if response.drag_started() {
            // The drag is reported once the pointer has moved; anchor the
            // selection where the button went down.
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(origin) = origin {
                self.controller.press(to_local(origin), shift);
            }
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.controller.press(to_local(pos), shift);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.controller.drag(to_local(pos));
            }
        }
        if response.clicked() || response.drag_stopped() {
            self.controller.release();
        }
    }
}
