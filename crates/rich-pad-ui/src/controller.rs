//! Glue between the editing core and the scrolled view.
//!
//! [`EditorController`] owns the [`Editor`], the [`RowScroller`] and the
//! measurer. Every editing command runs with a listener that forwards the
//! paragraph changes to the scroller as they happen, so the displayed
//! window is re-laid out before the next primitive action runs. After a
//! command the caret and selection decorations are refreshed and the caret
//! is scrolled into view.

use anyhow::Result;
use egui::{pos2, Pos2, Rect, Vec2};
use rich_pad_config::EditorConfig;
use rich_pad_core::caret::{CaretPosition, Selection};
use rich_pad_core::document::Document;
use rich_pad_core::editor::{Editor, Motion};
use rich_pad_core::events::{ChangeKind, ParagraphChange};
use rich_pad_core::history::HistoryConfig;
use rich_pad_core::transaction::ChangeListener;

use crate::layout::HitResult;
use crate::measure::{MeasureCache, TextMeasurer};
use crate::rows::{LayoutSettings, ParagraphRow, ParagraphRowModel};
use crate::scroller::{
    reindex_after_insert, reindex_after_remove, RowModel, RowScroller, ScrollerConfig,
};
use crate::surface::{PaintSurface, Palette};

/// Distance beyond the caret rect probed by vertical moves.
const LINE_PROBE_PX: f32 = 2.0;
/// Caret stays solid this long after activity.
const BLINK_HOLD_SECS: f64 = 0.5;

/// Builds the row model over the controller's fields without borrowing
/// the scroller beyond its width.
macro_rules! row_model {
    ($self:ident) => {
        ParagraphRowModel {
            document: $self.editor.document(),
            measurer: &$self.measurer,
            settings: $self.layout,
            max_width: $self.scroller.content_width(),
            caret_visible: $self.caret_visible,
        }
    };
}

/// Forwards change notifications to the scroller.
struct ScrollerSync<'a> {
    scroller: &'a mut RowScroller<usize, ParagraphRow>,
    measurer: &'a MeasureCache,
    settings: LayoutSettings,
    caret_visible: bool,
}

impl ChangeListener for ScrollerSync<'_> {
    fn paragraphs_changed(&mut self, document: &Document, changes: &[ParagraphChange]) {
        let model = ParagraphRowModel {
            document,
            measurer: self.measurer,
            settings: self.settings,
            max_width: self.scroller.content_width(),
            caret_visible: self.caret_visible,
        };
        for change in changes {
            let p = change.paragraph;
            match change.kind {
                ChangeKind::Inserted => {
                    self.scroller.on_inserted(&model, p, &reindex_after_insert(p));
                }
                ChangeKind::Removed => {
                    self.scroller.on_removed(&model, p, &reindex_after_remove(p));
                }
                ChangeKind::Modified => self.scroller.on_modified(&model, p),
            }
        }
    }
}

/// Vertical caret motions that need layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualMotion {
    LineUp,
    LineDown,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
}

pub struct EditorController {
    editor: Editor,
    scroller: RowScroller<usize, ParagraphRow>,
    measurer: MeasureCache,
    config: EditorConfig,
    layout: LayoutSettings,
    caret_visible: bool,
    /// Seconds, as reported by the UI clock.
    clock: f64,
    last_activity: f64,
    /// Horizontal position kept across consecutive vertical moves.
    preferred_x: Option<f32>,
    dragging: bool,
}

impl std::fmt::Debug for EditorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("editor", &self.editor)
            .field("viewport", &self.scroller.viewport())
            .field("displayed", &self.scroller.displayed_ids())
            .finish_non_exhaustive()
    }
}

impl EditorController {
    pub fn new(document: Document, config: EditorConfig, measurer: impl TextMeasurer + 'static) -> Self {
        let editor = Editor::new(document, HistoryConfig::from(&config.history));
        Self {
            editor,
            scroller: RowScroller::new(ScrollerConfig::from(&config)),
            measurer: MeasureCache::new(measurer),
            layout: LayoutSettings::from(&config),
            config,
            caret_visible: true,
            clock: 0.0,
            last_activity: 0.0,
            preferred_x: None,
            dragging: false,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn scroller(&self) -> &RowScroller<usize, ParagraphRow> {
        &self.scroller
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn caret(&self) -> Option<CaretPosition> {
        self.editor.caret()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.editor.selection()
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    pub fn estimated_height(&self) -> f32 {
        self.scroller.estimated_height(&row_model!(self))
    }

    pub fn current_pos(&self) -> f32 {
        self.scroller.current_pos()
    }

    // ── View setup ─────────────────────────────────────────────────────

    /// Lays out for a new viewport size. Sizes within half a pixel of the
    /// current one are ignored.
    pub fn resize(&mut self, size: Vec2) {
        if (size - self.scroller.viewport()).abs().max_elem() < 0.5 {
            return;
        }
        tracing::debug!("Viewport resized to {}x{}", size.x, size.y);
        self.relayout(size);
    }

    fn relayout(&mut self, size: Vec2) {
        self.scroller.set_fixed_row(self.caret().map(|c| c.paragraph));
        self.scroller.resize(&ParagraphRowModel {
            document: self.editor.document(),
            measurer: &self.measurer,
            settings: self.layout,
            max_width: (size.x - 2.0 * self.config.margin).max(1.0),
            caret_visible: self.caret_visible,
        }, size);
    }

    /// Swaps the measurer, e.g. after a zoom change, and lays everything
    /// out again.
    pub fn set_measurer(&mut self, measurer: impl TextMeasurer + 'static) {
        self.measurer.replace(measurer);
        self.relayout(self.scroller.viewport());
    }

    /// Applies a new configuration. Colors are handled by the caller
    /// through [`EditorController::set_palette`].
    pub fn set_config(&mut self, config: EditorConfig) {
        self.layout = LayoutSettings::from(&config);
        self.scroller.set_config(ScrollerConfig::from(&config));
        self.config = config;
        self.relayout(self.scroller.viewport());
    }

    /// Repaints with new colors. Unchanged colors are a no-op.
    pub fn set_palette(&mut self, palette: Palette) {
        if *self.scroller.palette() == palette {
            return;
        }
        self.scroller.set_palette(palette);
    }

    /// Draws the visible rows onto `surface`.
    pub fn paint(&mut self, surface: &mut dyn PaintSurface) {
        self.scroller.present_all(surface);
    }

    // ── Caret blink ────────────────────────────────────────────────────

    /// Advances the clock; returns whether the caret visibility flipped.
    pub fn tick(&mut self, now: f64) -> bool {
        self.clock = now;
        let period = (self.config.caret_blink_ms.max(1) as f64) / 1000.0;
        let visible = now - self.last_activity < BLINK_HOLD_SECS
            || ((now / period) as u64).is_multiple_of(2);
        if visible == self.caret_visible {
            return false;
        }
        self.caret_visible = visible;
        self.sync_decorations();
        true
    }

    fn touch(&mut self) {
        self.last_activity = self.clock;
        if !self.caret_visible {
            self.caret_visible = true;
        }
    }

    // ── Editing ────────────────────────────────────────────────────────

    /// Runs one editing command with change forwarding, then refreshes the
    /// view around the caret.
    fn command<T>(
        &mut self,
        run: impl FnOnce(&mut Editor, &mut dyn ChangeListener) -> Result<T>,
    ) -> Result<T> {
        self.scroller.set_fixed_row(self.caret().map(|c| c.paragraph));
        let mut sync = ScrollerSync {
            scroller: &mut self.scroller,
            measurer: &self.measurer,
            settings: self.layout,
            caret_visible: self.caret_visible,
        };
        let result = run(&mut self.editor, &mut sync);
        self.preferred_x = None;
        self.after_change();
        result
    }

    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        self.command(|editor, sync| editor.insert_text(sync, text))
    }

    pub fn backspace(&mut self) -> Result<()> {
        self.command(|editor, sync| editor.backspace(sync))
    }

    pub fn delete(&mut self) -> Result<()> {
        self.command(|editor, sync| editor.delete(sync))
    }

    pub fn newline(&mut self) -> Result<()> {
        self.command(|editor, sync| editor.newline(sync))
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.command(|editor, sync| editor.undo(sync))
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.command(|editor, sync| editor.redo(sync))
    }

    pub fn toggle_bold(&mut self) -> Result<()> {
        self.command(|editor, sync| editor.toggle_bold(sync))
    }

    pub fn toggle_italic(&mut self) -> Result<()> {
        self.command(|editor, sync| editor.toggle_italic(sync))
    }

    pub fn toggle_underline(&mut self) -> Result<()> {
        self.command(|editor, sync| editor.toggle_underline(sync))
    }

    pub fn set_point_size(&mut self, size: u16) -> Result<()> {
        self.command(|editor, sync| editor.set_point_size(sync, size))
    }

    // ── Navigation ─────────────────────────────────────────────────────

    pub fn move_caret(&mut self, motion: Motion, extend: bool) {
        self.editor.move_caret(motion, extend);
        self.preferred_x = None;
        self.after_change();
    }

    pub fn select_all(&mut self) {
        self.editor.select_all();
        self.after_change();
    }

    fn move_to(&mut self, target: CaretPosition, extend: bool) {
        self.editor.move_caret_to(target, extend);
        self.after_change();
    }

    pub fn move_visual(&mut self, motion: VisualMotion, extend: bool) {
        match motion {
            VisualMotion::LineUp => self.move_line(-1.0, extend),
            VisualMotion::LineDown => self.move_line(1.0, extend),
            VisualMotion::LineStart | VisualMotion::LineEnd => {
                self.preferred_x = None;
                self.move_within_line(motion == VisualMotion::LineEnd, extend);
            }
            VisualMotion::PageUp => self.move_page(-1.0, extend),
            VisualMotion::PageDown => self.move_page(1.0, extend),
        }
    }

    /// Caret rect relative to its row, laying the row out if it is not
    /// displayed.
    fn caret_row_rect(&self, caret: CaretPosition) -> Option<Rect> {
        let find = |row: &ParagraphRow| {
            row.layout()
                .caret_rect(caret.element, caret.offset, caret.before_split)
        };
        match self.scroller.row(caret.paragraph) {
            Some(row) => find(row),
            None => row_model!(self).get(caret.paragraph).and_then(|row| find(&row)),
        }
    }

    /// Caret rect in viewport coordinates, margins included.
    fn caret_view_rect(&self) -> Option<Rect> {
        let caret = self.caret()?;
        let y = self.scroller.layout_y(caret.paragraph)?;
        let rect = self.caret_row_rect(caret)?;
        Some(rect.translate(egui::vec2(self.config.margin, y)))
    }

    fn reveal_caret(&mut self) {
        let Some(caret) = self.caret() else {
            return;
        };
        let Some(rect) = self.caret_row_rect(caret) else {
            return;
        };
        let model = row_model!(self);
        self.scroller.scroll_into_view(&model, caret.paragraph, rect);
    }

    fn move_line(&mut self, direction: f32, extend: bool) {
        self.reveal_caret();
        let Some(rect) = self.caret_view_rect() else {
            return;
        };
        let x = *self.preferred_x.get_or_insert(rect.min.x);
        let mut y = if direction < 0.0 {
            rect.min.y - LINE_PROBE_PX
        } else {
            rect.max.y + LINE_PROBE_PX
        };
        let height = self.scroller.viewport().y;
        if y < 0.0 || y >= height {
            let model = row_model!(self);
            let needed = if y < 0.0 { y } else { y - height + 1.0 };
            y -= self.scroller.scroll(&model, needed, true);
        }
        if let Some((paragraph, hit)) = self.scroller.hit_test(pos2(x, y)) {
            self.move_to(caret_at(paragraph, hit), extend);
        }
    }

    fn move_within_line(&mut self, to_end: bool, extend: bool) {
        let Some(caret) = self.caret() else {
            return;
        };
        let bounds = self.scroller.row(caret.paragraph).and_then(|row| {
            row.layout()
                .line_bounds(caret.element, caret.offset, caret.before_split)
        });
        let Some(bounds) = bounds else {
            return;
        };
        let hit = if to_end { bounds.end } else { bounds.start };
        self.move_to(caret_at(caret.paragraph, hit), extend);
    }

    fn move_page(&mut self, direction: f32, extend: bool) {
        self.reveal_caret();
        let Some(rect) = self.caret_view_rect() else {
            return;
        };
        let model = row_model!(self);
        let page = self.scroller.viewport().y;
        self.scroller.scroll(&model, direction * page, true);
        let y = rect.center().y.clamp(0.0, (page - 1.0).max(0.0));
        if let Some((paragraph, hit)) = self.hit_clamped(pos2(rect.min.x, y)) {
            self.move_to(caret_at(paragraph, hit), extend);
        }
    }

    /// Hit test that treats points above or below the rows as being on the
    /// first or last displayed row.
    fn hit_clamped(&self, pos: Pos2) -> Option<(usize, HitResult)> {
        if let Some(hit) = self.scroller.hit_test(pos) {
            return Some(hit);
        }
        let mut rows = self.scroller.displayed_rows();
        let first = rows.next()?;
        let last = self.scroller.displayed_rows().last()?;
        let y = if pos.y < first.y {
            first.y + 1.0
        } else {
            last.bottom() - 1.0
        };
        self.scroller.hit_test(pos2(pos.x, y))
    }

    // ── Mouse ──────────────────────────────────────────────────────────

    /// Pointer pressed at `pos` (viewport coordinates).
    pub fn press(&mut self, pos: Pos2, extend: bool) {
        self.dragging = true;
        self.preferred_x = None;
        if let Some((paragraph, hit)) = self.hit_clamped(pos) {
            self.move_to(caret_at(paragraph, hit), extend);
        }
    }

    /// Pointer dragged to `pos`; scrolls a line when outside the viewport.
    pub fn drag(&mut self, pos: Pos2) {
        if !self.dragging {
            return;
        }
        let height = self.scroller.viewport().y;
        if pos.y < 0.0 || pos.y > height {
            let model = row_model!(self);
            let step = self.config.line_scroll_px;
            self.scroller.scroll(&model, if pos.y < 0.0 { -step } else { step }, true);
        }
        let pos = pos2(pos.x, pos.y.clamp(0.0, (height - 1.0).max(0.0)));
        if let Some((paragraph, hit)) = self.hit_clamped(pos) {
            self.move_to(caret_at(paragraph, hit), true);
        }
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // ── Scrolling ──────────────────────────────────────────────────────

    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        let model = row_model!(self);
        self.scroller.scroll(&model, delta, true)
    }

    pub fn scroll_lines(&mut self, lines: f32) -> f32 {
        let model = row_model!(self);
        self.scroller.scroll_lines(&model, lines)
    }

    pub fn scroll_to(&mut self, absolute_px: f32) {
        let model = row_model!(self);
        self.scroller.scroll_to(&model, absolute_px);
    }

    // ── Decorations ────────────────────────────────────────────────────

    fn after_change(&mut self) {
        self.touch();
        self.sync_decorations();
        self.reveal_caret();
        self.scroller.set_fixed_row(self.caret().map(|c| c.paragraph));
    }

    /// Re-applies caret and selection to every displayed row, repainting
    /// only rows whose decoration changed.
    fn sync_decorations(&mut self) {
        let model = row_model!(self);
        let mut changed = Vec::new();
        for id in self.scroller.displayed_ids() {
            let decoration = model.decoration(id);
            if self
                .scroller
                .row_mut(id)
                .is_some_and(|row| row.decorate(decoration))
            {
                changed.push(id);
            }
        }
        for id in changed {
            self.scroller.repaint_row(id);
        }
    }
}

fn caret_at(paragraph: usize, hit: HitResult) -> CaretPosition {
    CaretPosition::new(paragraph, hit.element, hit.offset).with_before_split(hit.before_split)
}
