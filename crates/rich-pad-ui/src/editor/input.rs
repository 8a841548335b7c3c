//! Keyboard input handling for the editor widget.
//!
//! Processes key events (text insertion, caret movement, editing and
//! styling commands) and maps them to controller operations.

use egui::{Key, Modifiers, Ui};
use rich_pad_core::editor::Motion;

use super::widget::EditorWidget;
use crate::controller::VisualMotion;

/// Logs a failed command; the document is left as the failed transaction
/// rolled it back.
fn report<T>(name: &str, result: anyhow::Result<T>) {
    if let Err(e) = result {
        tracing::warn!("{name} failed: {e:#}");
    }
}

impl EditorWidget<'_> {
    /// Handles all keyboard input for the editor widget.
    pub(crate) fn handle_keyboard_input(&mut self, ui: &mut Ui) {
        let events: Vec<egui::Event> = ui.input(|i| i.events.clone());

        for event in &events {
            match event {
                egui::Event::Text(text) => {
                    // Ctrl/Alt combos are shortcuts; their text events must
                    // not reach the document.
                    if !ui.input(|i| i.modifiers.ctrl || i.modifiers.command || i.modifiers.alt) {
                        report("Insert", self.controller.insert_text(text));
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    self.handle_key(*key, *modifiers);
                }
                _ => {}
            }
        }
    }

    /// Handles a single key press.
    fn handle_key(&mut self, key: Key, modifiers: Modifiers) {
        let shift = modifiers.shift;
        let ctrl = modifiers.ctrl || modifiers.command;
        if modifiers.alt {
            return;
        }

        // Try each handler group; return early once one matches.
        if self.handle_navigation_key(key, ctrl, shift) {
            return;
        }
        if self.handle_editing_key(key, ctrl) {
            return;
        }
        if ctrl {
            self.handle_command_key(key, shift);
        }
    }

    /// Handles navigation keys (arrows, Home, End, PageUp, PageDown).
    /// Shift extends the selection. Returns `true` if the key was consumed.
    fn handle_navigation_key(&mut self, key: Key, ctrl: bool, shift: bool) -> bool {
        let logical = match key {
            Key::ArrowLeft if ctrl => Some(Motion::WordLeft),
            Key::ArrowRight if ctrl => Some(Motion::WordRight),
            Key::ArrowLeft => Some(Motion::Left),
            Key::ArrowRight => Some(Motion::Right),
            Key::Home if ctrl => Some(Motion::DocumentStart),
            Key::End if ctrl => Some(Motion::DocumentEnd),
            _ => None,
        };
        if let Some(motion) = logical {
            self.controller.move_caret(motion, shift);
            return true;
        }
        let visual = match key {
            Key::ArrowUp => VisualMotion::LineUp,
            Key::ArrowDown => VisualMotion::LineDown,
            Key::Home => VisualMotion::LineStart,
            Key::End => VisualMotion::LineEnd,
            Key::PageUp => VisualMotion::PageUp,
            Key::PageDown => VisualMotion::PageDown,
            _ => return false,
        };
        self.controller.move_visual(visual, shift);
        true
    }

    /// Handles editing keys (Enter, Backspace, Delete).
    /// Returns `true` if the key was consumed.
    fn handle_editing_key(&mut self, key: Key, ctrl: bool) -> bool {
        match key {
            Key::Enter => report("Newline", self.controller.newline()),
            Key::Backspace if ctrl => {
                self.controller.move_caret(Motion::WordLeft, true);
                report("Backspace", self.controller.backspace());
            }
            Key::Backspace => report("Backspace", self.controller.backspace()),
            Key::Delete if ctrl => {
                self.controller.move_caret(Motion::WordRight, true);
                report("Delete", self.controller.delete());
            }
            Key::Delete => report("Delete", self.controller.delete()),
            _ => return false,
        }
        true
    }

    /// Handles Ctrl shortcuts: undo/redo, select all, and styling.
    fn handle_command_key(&mut self, key: Key, shift: bool) {
        match key {
            Key::Z if shift => report("Redo", self.controller.redo()),
            Key::Z => report("Undo", self.controller.undo()),
            Key::Y => report("Redo", self.controller.redo()),
            Key::A => self.controller.select_all(),
            Key::B => report("Bold", self.controller.toggle_bold()),
            Key::I => report("Italic", self.controller.toggle_italic()),
            Key::U => report("Underline", self.controller.toggle_underline()),
            _ => {}
        }
    }
}
