//! Top-level application tying together the editor view, status bar and
//! font catalog.

mod sample;
mod shortcuts;
mod status_bar;

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use rich_pad_config::EditorConfig;

use crate::controller::EditorController;
use crate::editor::{EditorTheme, EditorViewState, EditorWidget};
use crate::fonts::FontCatalog;
use crate::measure::EguiMeasurer;

pub use sample::{sample_document, sample_image};

/// Paragraphs in the generated document when none is requested.
pub const DEFAULT_PARAGRAPHS: usize = 2000;
/// Upper bound of keyboard and Ctrl+scroll zoom.
pub const MAX_ZOOM_LEVEL: f32 = 4.0;
pub const MIN_ZOOM_LEVEL: f32 = 0.5;

/// Arguments passed from the command line to the application.
#[derive(Debug, Clone)]
pub struct StartupArgs {
    /// Size of the generated sample document.
    pub paragraphs: usize,
    /// Config file to load, created with defaults when missing. `None`
    /// uses the built-in defaults and never touches the disk.
    pub config_path: Option<PathBuf>,
    /// Directories scanned for installed font families.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for StartupArgs {
    fn default() -> Self {
        Self {
            paragraphs: DEFAULT_PARAGRAPHS,
            config_path: None,
            font_dirs: Vec::new(),
        }
    }
}

/// The main application state.
pub struct App {
    pub controller: EditorController,
    pub view_state: EditorViewState,
    pub theme: EditorTheme,
    pub zoom_level: f32,
    pub max_zoom_level: f32,
    pub fonts: Option<FontCatalog>,
}

impl App {
    /// Creates a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, args: StartupArgs) -> Self {
        // Disable egui's built-in keyboard zoom so Ctrl+/- only affects the editor text
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);

        let config = match &args.config_path {
            Some(path) => EditorConfig::load_or_create(path),
            None => EditorConfig::default(),
        };
        let theme = EditorTheme::from_config(&config.colors);
        cc.egui_ctx.set_visuals(if theme.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let document = sample_document(args.paragraphs);
        tracing::info!(
            "Generated sample document with {} paragraphs",
            document.paragraph_count()
        );

        let zoom_level = config.zoom;
        let measurer = EguiMeasurer::new(cc.egui_ctx.clone(), zoom_level);
        let mut controller = EditorController::new(document, config, measurer);
        controller.set_palette(theme.palette());

        let fonts = match FontCatalog::spawn(args.font_dirs) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!("Font catalog unavailable: {e:#}");
                None
            }
        };

        Self {
            controller,
            view_state: EditorViewState::with_zoom(zoom_level),
            theme,
            zoom_level,
            max_zoom_level: MAX_ZOOM_LEVEL,
            fonts,
        }
    }

    /// Pulls newly discovered font families from the worker.
    fn poll_fonts(&mut self, ctx: &egui::Context) {
        let Some(fonts) = &mut self.fonts else {
            return;
        };
        let added = fonts.drain();
        if added > 0 {
            tracing::debug!("Font catalog: {added} new families, {} total", fonts.len());
        }
        if !fonts.is_done() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl eframe::App for App {
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Prevent egui's built-in Ctrl+scroll zoom — we handle zoom ourselves
        ctx.set_zoom_factor(1.0);

        self.poll_fonts(ctx);
        self.handle_global_shortcuts(ctx);

        let extreme_bg = ctx.style().visuals.extreme_bg_color;
        egui::TopBottomPanel::bottom("status_bar")
            .max_height(24.0)
            .frame(
                egui::Frame::new()
                    .fill(extreme_bg)
                    .inner_margin(egui::Margin::symmetric(8, 3)),
            )
            .show(ctx, |ui| {
                self.show_status_bar(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(self.theme.bg_color))
            .show(ctx, |ui| {
                let mut editor = EditorWidget::new(
                    &mut self.controller,
                    &mut self.view_state,
                    &self.theme,
                    self.zoom_level,
                );
                editor.show(ui);

                // Apply Ctrl+scroll zoom from the editor widget
                if editor.zoom_request != 1.0 {
                    self.zoom_level = (self.zoom_level * editor.zoom_request)
                        .clamp(MIN_ZOOM_LEVEL, self.max_zoom_level);
                }
            });
    }
}
