/// Integration tests for the rich-pad App using egui_kittest.
///
/// These tests exercise the full `eframe::App::update` loop through AccessKit queries.
mod common;

use std::time::Duration;

use egui::{Key, Modifiers};
use egui_kittest::kittest::Queryable;
use rich_pad_config::EditorConfig;
use rich_pad_ui::StartupArgs;

use common::{create_harness, create_harness_from, create_harness_with};

fn ctrl() -> Modifiers {
    Modifiers {
        ctrl: true,
        ..Default::default()
    }
}

// ── A. App Initialization ──────────────────────────────────────────────────

#[test]
fn test_app_initial_state() {
    let harness = create_harness();
    let app = harness.state();
    assert_eq!(app.controller.document().paragraph_count(), 200);
    assert!((app.zoom_level - 1.0).abs() < f32::EPSILON);
    assert!(app.controller.caret().is_some());
}

#[test]
fn test_zoom_keyboard_disabled() {
    let harness = create_harness();
    // Verify that egui's built-in keyboard zoom is disabled
    let zoom_with_keyboard = harness.ctx.options(|o| o.zoom_with_keyboard);
    assert!(!zoom_with_keyboard);
}

#[test]
fn test_first_frame_lays_out_only_visible_rows() {
    let mut harness = create_harness_with(2000);
    harness.run();
    let displayed = harness.state().controller.scroller().displayed_ids();
    assert_eq!(displayed.first(), Some(&0));
    assert!(displayed.len() < 100, "{} rows laid out", displayed.len());
}

// ── B. Status Bar ──────────────────────────────────────────────────────────

#[test]
fn test_status_bar_shows_position() {
    let harness = create_harness();
    harness.get_by_label("Par 1, Elem 1, Off 0");
}

#[test]
fn test_status_bar_shows_paragraph_count() {
    let harness = create_harness_with(42);
    harness.get_by_label("42 paragraphs");
}

#[test]
fn test_status_bar_shows_zoom() {
    let harness = create_harness();
    harness.get_by_label("Zoom: 100%");
}

#[test]
fn test_status_bar_tracks_caret() {
    let mut harness = create_harness();
    harness.run();
    harness.key_press(Key::ArrowRight);
    harness.run();
    harness.key_press(Key::ArrowRight);
    harness.run();
    harness.get_by_label("Par 1, Elem 1, Off 2");
}

#[test]
fn test_status_bar_reports_font_scan() {
    let mut harness = create_harness();
    assert!(harness
        .state_mut()
        .fonts
        .as_mut()
        .unwrap()
        .wait(Duration::from_secs(10)));
    harness.run();
    harness.get_by_label("0 font families");
}

// ── C. Zoom ────────────────────────────────────────────────────────────────

#[test]
fn test_zoom_in_changes_zoom_level() {
    let mut harness = create_harness();
    harness.key_press_modifiers(ctrl(), Key::Plus);
    harness.run();

    let app = harness.state();
    assert!((app.zoom_level - 1.1).abs() < 0.01);
}

#[test]
fn test_zoom_out_changes_zoom_level() {
    let mut harness = create_harness();
    harness.key_press_modifiers(ctrl(), Key::Minus);
    harness.run();

    let app = harness.state();
    assert!((app.zoom_level - 0.9).abs() < 0.01);
}

#[test]
fn test_zoom_reset() {
    let mut harness = create_harness();
    harness.key_press_modifiers(ctrl(), Key::Plus);
    harness.run();
    harness.key_press_modifiers(ctrl(), Key::Plus);
    harness.run();
    assert!((harness.state().zoom_level - 1.2).abs() < 0.01);
    harness.key_press_modifiers(ctrl(), Key::Num0);
    harness.run();
    assert!((harness.state().zoom_level - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_zoom_max_limit() {
    let mut harness = create_harness_with(20);
    for _ in 0..40 {
        harness.key_press_modifiers(ctrl(), Key::Plus);
        harness.run();
    }
    assert!((harness.state().zoom_level - 4.0).abs() < 0.01);
}

#[test]
fn test_zoom_min_limit() {
    let mut harness = create_harness_with(20);
    for _ in 0..20 {
        harness.key_press_modifiers(ctrl(), Key::Minus);
        harness.run();
    }
    assert!((harness.state().zoom_level - 0.5).abs() < 0.01);
}

#[test]
fn test_zoom_relayouts_rows() {
    let mut harness = create_harness_with(20);
    harness.run();
    let before = row_height(&harness, 1);
    harness.state_mut().zoom_level = 2.0;
    harness.run();
    let after = row_height(&harness, 1);
    assert!(after > before * 1.5, "{before} -> {after}");
}

fn row_height(harness: &egui_kittest::Harness<'_, rich_pad_ui::App>, id: usize) -> f32 {
    use rich_pad_ui::scroller::Row;
    harness
        .state()
        .controller
        .scroller()
        .row(id)
        .map(|r| r.height())
        .unwrap_or_default()
}

// ── D. Configuration ───────────────────────────────────────────────────────

#[test]
fn test_missing_config_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("rich-pad.json");
    let harness = create_harness_from(StartupArgs {
        paragraphs: 10,
        config_path: Some(path.clone()),
        ..StartupArgs::default()
    });
    assert!(path.exists());
    assert!((harness.state().zoom_level - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_config_zoom_and_colors_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rich-pad.json");
    let config = EditorConfig {
        zoom: 1.5,
        colors: rich_pad_config::EditorColors::dark(),
        ..EditorConfig::default()
    };
    config.save(&path).unwrap();

    let harness = create_harness_from(StartupArgs {
        paragraphs: 10,
        config_path: Some(path),
        ..StartupArgs::default()
    });
    let app = harness.state();
    assert!((app.zoom_level - 1.5).abs() < f32::EPSILON);
    assert!(app.theme.is_dark());
}

// ── E. Mouse ───────────────────────────────────────────────────────────────

fn click_at(harness: &mut egui_kittest::Harness<'_, rich_pad_ui::App>, pos: egui::Pos2) {
    harness.event(egui::Event::PointerMoved(pos));
    harness.event(egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed: true,
        modifiers: Modifiers::NONE,
    });
    harness.event(egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed: false,
        modifiers: Modifiers::NONE,
    });
    harness.run();
}

#[test]
fn test_click_places_caret_in_clicked_paragraph() {
    let mut harness = create_harness_with(50);
    harness.run();
    // The editor fills the central panel, whose origin is the window's.
    let rect = harness.state().controller.scroller().row_rect(2).unwrap();
    click_at(&mut harness, rect.center());

    let caret = harness.state().controller.caret().unwrap();
    assert_eq!(caret.paragraph, 2);
    assert!(harness.state().controller.selection().is_none());
}

#[test]
fn test_click_on_scrollbar_jumps_view() {
    let mut harness = create_harness_with(2000);
    harness.run();
    let caret_before = harness.state().controller.caret();
    // Lower part of the track, right edge of the window.
    click_at(&mut harness, egui::pos2(1018.0, 600.0));

    let app = harness.state();
    assert!(app.controller.current_pos() > 1000.0);
    assert_eq!(app.controller.caret(), caret_before);
}
