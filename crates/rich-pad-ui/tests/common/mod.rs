use egui_kittest::Harness;
use rich_pad_ui::{App, StartupArgs};

/// Creates a standard test harness with the app at 1024x768 over a
/// generated document of `paragraphs` paragraphs.
pub fn create_harness_with(paragraphs: usize) -> Harness<'static, App> {
    create_harness_from(StartupArgs {
        paragraphs,
        ..StartupArgs::default()
    })
}

/// Creates a standard test harness with the app at 1024x768.
pub fn create_harness() -> Harness<'static, App> {
    create_harness_with(200)
}

pub fn create_harness_from(args: StartupArgs) -> Harness<'static, App> {
    Harness::builder()
        .with_size(egui::Vec2::new(1024.0, 768.0))
        .build_eframe(move |cc| App::new(cc, args))
}
