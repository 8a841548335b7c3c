//! Status bar rendering for the editor application.
//!
//! Shows the caret position, selection state, paragraph count, font catalog
//! progress and zoom level.

use eframe::egui;
use egui::{Color32, RichText};

use super::App;

/// Caret position label; paragraphs and elements are shown 1-based.
pub(crate) fn caret_label(paragraph: usize, element: usize, offset: usize) -> String {
    format!("Par {}, Elem {}, Off {offset}", paragraph + 1, element + 1)
}

impl App {
    /// Renders the status bar at the bottom of the application window.
    pub(crate) fn show_status_bar(&mut self, ui: &mut egui::Ui) {
        let caret = self.controller.caret();
        let has_selection = self.controller.selection().is_some_and(|s| !s.is_empty());
        let paragraph_count = self.controller.document().paragraph_count();
        let fonts = self
            .fonts
            .as_ref()
            .map(|f| (f.len(), f.is_done()));

        ui.horizontal(|ui| {
            let position = caret
                .map(|c| caret_label(c.paragraph, c.element, c.offset))
                .unwrap_or_else(|| "No caret".to_string());
            ui.add(egui::Label::new(position).selectable(false));
            if has_selection {
                ui.separator();
                ui.add(egui::Label::new("Selection").selectable(false));
            }
            ui.separator();
            ui.add(egui::Label::new(format!("{paragraph_count} paragraphs")).selectable(false));
            ui.separator();
            ui.add(
                egui::Label::new(format!("Zoom: {:.0}%", self.zoom_level * 100.0))
                    .selectable(false),
            );

            if let Some((count, done)) = fonts {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = if done {
                        format!("{count} font families")
                    } else {
                        format!("Scanning fonts... {count}")
                    };
                    ui.add(
                        egui::Label::new(RichText::new(text).color(Color32::GRAY))
                            .selectable(false),
                    );
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_label_is_one_based() {
        assert_eq!(caret_label(0, 0, 0), "Par 1, Elem 1, Off 0");
        assert_eq!(caret_label(9, 2, 14), "Par 10, Elem 3, Off 14");
    }
}
