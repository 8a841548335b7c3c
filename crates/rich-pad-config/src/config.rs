/// Editor configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::theme::EditorColors;

const CONFIG_FILE_NAME: &str = "rich-pad.json";

/// Undo history limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Oldest groups are evicted past this many undo steps.
    pub max_history_depth: usize,
    /// Edits recorded within this window merge into one undo step.
    pub group_timeout_ms: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_history_depth: 10_000,
            group_timeout_ms: 500,
        }
    }
}

/// Top-level configuration for the rich-text view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Horizontal padding between the viewport edge and the rows.
    pub margin: f32,
    /// Pixels scrolled per wheel notch or arrow on the scrollbar.
    pub line_scroll_px: f32,
    /// Absolute scrolls closer than this are performed as relative scrolls.
    pub scroll_jump_threshold_px: f32,
    /// Unbroken tokens longer than this are hard-wrapped.
    pub wrap_token_chars: usize,
    /// Rows sampled when (re)seeding the row height estimate.
    pub estimate_sample_rows: usize,
    pub caret_width: f32,
    pub caret_blink_ms: u64,
    /// Padding around images inside their fragment.
    pub image_margin: f32,
    /// Multiplier from style point size to pixels.
    pub zoom: f32,
    pub colors: EditorColors,
    pub history: HistorySettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            margin: 8.0,
            line_scroll_px: 16.0,
            scroll_jump_threshold_px: 1000.0,
            wrap_token_chars: 30,
            estimate_sample_rows: 50,
            caret_width: 2.0,
            caret_blink_ms: 500,
            image_margin: 10.0,
            zoom: 1.0,
            colors: EditorColors::default(),
            history: HistorySettings::default(),
        }
    }
}

impl EditorConfig {
    /// Returns the config file path: the user config directory + `rich-pad/rich-pad.json`.
    ///
    /// Falls back to the working directory when no config directory is known.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rich-pad").join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EditorConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Keep the broken file around so the user can fix it.
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.margin = clamp_finite(self.margin, 0.0, 64.0, 8.0);
        self.line_scroll_px = clamp_finite(self.line_scroll_px, 1.0, 256.0, 16.0);
        self.scroll_jump_threshold_px =
            clamp_finite(self.scroll_jump_threshold_px, 100.0, f32::MAX, 1000.0);
        self.wrap_token_chars = self.wrap_token_chars.clamp(4, 256);
        self.estimate_sample_rows = self.estimate_sample_rows.clamp(1, 1000);
        self.caret_width = clamp_finite(self.caret_width, 1.0, 8.0, 2.0);
        self.caret_blink_ms = self.caret_blink_ms.clamp(100, 5000);
        self.image_margin = clamp_finite(self.image_margin, 0.0, 64.0, 10.0);
        self.zoom = clamp_finite(self.zoom, 0.5, 4.0, 1.0);
        self.history.max_history_depth = self.history.max_history_depth.max(1);
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
