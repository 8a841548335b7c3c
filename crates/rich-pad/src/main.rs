#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rich_pad_config::EditorConfig;

/// Rich-text editing demo over a large generated document.
#[derive(Parser, Debug)]
#[command(name = "rich-pad", version, about)]
struct Cli {
    /// Number of paragraphs in the generated document.
    #[arg(long, default_value_t = rich_pad_ui::app::DEFAULT_PARAGRAPHS)]
    paragraphs: usize,

    /// Config file to use instead of the per-user one.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting rich-pad");

    let startup_args = rich_pad_ui::StartupArgs {
        paragraphs: cli.paragraphs,
        config_path: Some(cli.config.unwrap_or_else(EditorConfig::config_path)),
        font_dirs: rich_pad_ui::fonts::default_font_dirs(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "rich-pad",
        native_options,
        Box::new(move |cc| Ok(Box::new(rich_pad_ui::App::new(cc, startup_args)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
