//! Global keyboard shortcut handling.
//!
//! Editing keys belong to the editor widget; the app only handles zoom.

use eframe::egui;

use super::{App, MIN_ZOOM_LEVEL};

/// Zoom change per Ctrl+Plus / Ctrl+Minus.
const ZOOM_STEP: f32 = 0.1;

impl App {
    /// Handles global keyboard shortcuts.
    pub(crate) fn handle_global_shortcuts(&mut self, ctx: &egui::Context) {
        let (ctrl, keys) = ctx.input(|i| {
            let ctrl = i.modifiers.ctrl || i.modifiers.command;
            let keys: Vec<egui::Key> = i
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect();
            (ctrl, keys)
        });

        for key in keys {
            self.handle_zoom_shortcut(key, ctrl);
        }
    }

    /// Zoom shortcuts (Ctrl+Plus, Ctrl+Minus, Ctrl+0).
    /// Returns `true` if the key was consumed.
    fn handle_zoom_shortcut(&mut self, key: egui::Key, ctrl: bool) -> bool {
        if !ctrl {
            return false;
        }
        match key {
            egui::Key::Plus | egui::Key::Equals => {
                self.zoom_level = (self.zoom_level + ZOOM_STEP).min(self.max_zoom_level);
            }
            egui::Key::Minus => {
                self.zoom_level = (self.zoom_level - ZOOM_STEP).max(MIN_ZOOM_LEVEL);
            }
            egui::Key::Num0 => self.zoom_level = 1.0,
            _ => return false,
        }
        tracing::debug!("Zoom set to {:.0}%", self.zoom_level * 100.0);
        true
    }
}
