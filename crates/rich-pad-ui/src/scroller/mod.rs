//! Virtualized, pixel-accurate scrolling over a lazy row model.
//!
//! Only the rows intersecting the viewport are materialized. They live in a
//! deque together with the y of their top edge relative to the viewport.
//! The total extent of the model is never computed; it is estimated from
//! the average height of rows seen so far times the model's approximate
//! row count, and corrected whenever real rows are laid out.

mod estimate;
pub mod model;

pub use estimate::HeightEstimate;
pub use model::{reindex_after_insert, reindex_after_remove, Reindex, Row, RowModel};

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use rich_pad_config::EditorConfig;

use crate::surface::{DisplayList, PaintSurface, Palette};

const EPS: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollerConfig {
    /// Horizontal padding on both sides of every row.
    pub margin: f32,
    pub line_scroll_px: f32,
    /// Absolute scrolls closer than this are done as relative scrolls.
    pub jump_threshold_px: f32,
    pub sample_rows: usize,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ScrollerConfig {
    fn from(config: &EditorConfig) -> Self {
        Self {
            margin: config.margin,
            line_scroll_px: config.line_scroll_px,
            jump_threshold_px: config.scroll_jump_threshold_px,
            sample_rows: config.estimate_sample_rows,
        }
    }
}

/// A materialized row and the y of its top edge in the viewport.
#[derive(Debug, Clone)]
pub struct DisplayedRow<Id, R> {
    pub id: Id,
    pub row: R,
    pub y: f32,
}

impl<Id, R: Row> DisplayedRow<Id, R> {
    pub fn bottom(&self) -> f32 {
        self.y + self.row.height()
    }
}

#[derive(Debug)]
pub struct RowScroller<Id, R> {
    config: ScrollerConfig,
    viewport: Vec2,
    displayed: VecDeque<DisplayedRow<Id, R>>,
    fixed_row: Option<Id>,
    estimate: HeightEstimate<Id>,
    current_pos: f32,
    back: DisplayList,
    damage: Option<Rect>,
    palette: Palette,
}

impl<Id, R> RowScroller<Id, R>
where
    Id: Copy + Eq + Ord + Hash + std::fmt::Debug,
    R: Row,
{
    pub fn new(config: ScrollerConfig) -> Self {
        Self {
            config,
            viewport: Vec2::ZERO,
            displayed: VecDeque::new(),
            fixed_row: None,
            estimate: HeightEstimate::default(),
            current_pos: 0.0,
            back: DisplayList::default(),
            damage: None,
            palette: Palette::default(),
        }
    }

    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ScrollerConfig) {
        self.config = config;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn viewport_rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.viewport)
    }

    /// Width available to a row's content.
    pub fn content_width(&self) -> f32 {
        (self.viewport.x - 2.0 * self.config.margin).max(1.0)
    }

    pub fn current_pos(&self) -> f32 {
        self.current_pos
    }

    /// Estimated pixel height of the whole model.
    pub fn estimated_height(&self, model: &impl RowModel<Id = Id, Row = R>) -> f32 {
        match self.estimate.average() {
            Some(average) => average * model.approximate_count() as f32,
            None => self.displayed.iter().map(|d| d.row.height()).sum(),
        }
    }

    pub fn estimate(&self) -> &HeightEstimate<Id> {
        &self.estimate
    }

    // ── Window access ──────────────────────────────────────────────────

    pub fn set_fixed_row(&mut self, id: Option<Id>) {
        self.fixed_row = id;
    }

    pub fn fixed_row(&self) -> Option<Id> {
        self.fixed_row
    }

    fn position(&self, id: Id) -> Option<usize> {
        self.displayed.iter().position(|d| d.id == id)
    }

    pub fn is_displayed(&self, id: Id) -> bool {
        self.position(id).is_some()
    }

    /// Top edge of a displayed row in the viewport.
    pub fn layout_y(&self, id: Id) -> Option<f32> {
        self.displayed.iter().find(|d| d.id == id).map(|d| d.y)
    }

    pub fn row(&self, id: Id) -> Option<&R> {
        self.displayed.iter().find(|d| d.id == id).map(|d| &d.row)
    }

    /// Mutable access for decorations. Callers repaint with
    /// [`RowScroller::repaint_row`]; the row's height must not change.
    pub fn row_mut(&mut self, id: Id) -> Option<&mut R> {
        self.displayed
            .iter_mut()
            .find(|d| d.id == id)
            .map(|d| &mut d.row)
    }

    pub fn displayed_ids(&self) -> Vec<Id> {
        self.displayed.iter().map(|d| d.id).collect()
    }

    pub fn displayed_rows(&self) -> impl Iterator<Item = &DisplayedRow<Id, R>> {
        self.displayed.iter()
    }

    /// Viewport rect of a displayed row, margins included.
    pub fn row_rect(&self, id: Id) -> Option<Rect> {
        let d = self.displayed.iter().find(|d| d.id == id)?;
        Some(Rect::from_min_max(
            pos2(0.0, d.y),
            pos2(self.viewport.x, d.bottom()),
        ))
    }

    /// Resolves a viewport point to a row and the row's own hit result.
    pub fn hit_test(&self, pos: Pos2) -> Option<(Id, R::Hit)> {
        let x = pos.x - self.config.margin;
        self.displayed
            .iter()
            .find(|d| d.y <= pos.y && pos.y <= d.bottom())
            .and_then(|d| d.row.hit_test(pos2(x, pos.y - d.y)).map(|hit| (d.id, hit)))
    }

    // ── Window maintenance ─────────────────────────────────────────────

    /// Fetches a row, preferring an already materialized one, and records
    /// its height for the estimate.
    fn materialize<M>(&mut self, model: &M, cache: &mut HashMap<Id, R>, id: Id) -> Option<R>
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let row = cache.remove(&id).or_else(|| model.get(id))?;
        self.estimate.add(id, row.height());
        Some(row)
    }

    fn shift(&mut self, dy: f32) {
        for d in &mut self.displayed {
            d.y += dy;
        }
    }

    /// Pulls rows in until the viewport is covered or the model runs out,
    /// then drops rows entirely outside it.
    fn fill<M>(&mut self, model: &M, cache: &mut HashMap<Id, R>)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let height = self.viewport.y;
        while let Some(last) = self.displayed.back() {
            let (id, bottom) = (last.id, last.bottom());
            if bottom >= height - EPS {
                break;
            }
            let Some(next) = model.next_pos(id) else {
                break;
            };
            let Some(row) = self.materialize(model, cache, next) else {
                break;
            };
            self.displayed.push_back(DisplayedRow {
                id: next,
                row,
                y: bottom,
            });
        }
        while let Some(first) = self.displayed.front() {
            let (id, top) = (first.id, first.y);
            if top <= EPS {
                break;
            }
            let Some(prev) = model.prev_pos(id) else {
                break;
            };
            let Some(row) = self.materialize(model, cache, prev) else {
                break;
            };
            let y = top - row.height();
            self.displayed.push_front(DisplayedRow { id: prev, row, y });
        }
        while self.displayed.len() > 1
            && self.displayed.front().is_some_and(|d| d.bottom() <= EPS)
        {
            self.displayed.pop_front();
        }
        while self.displayed.len() > 1
            && self.displayed.back().is_some_and(|d| d.y >= height - EPS)
        {
            self.displayed.pop_back();
        }
    }

    /// Keeps the last row of the model from leaving a gap below it and the
    /// first row from leaving a gap above it; the top wins when the model
    /// is shorter than the viewport. Returns the vertical shift applied.
    fn clamp<M>(&mut self, model: &M, cache: &mut HashMap<Id, R>) -> f32
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let mut applied = 0.0;
        if let Some(last) = self.displayed.back() {
            let gap = self.viewport.y - last.bottom();
            if gap > EPS && model.next_pos(last.id).is_none() {
                self.shift(gap);
                applied += gap;
                self.fill(model, cache);
            }
        }
        if let Some(first) = self.displayed.front() {
            if first.y > EPS && model.prev_pos(first.id).is_none() {
                let dy = -first.y;
                self.shift(dy);
                applied += dy;
                self.fill(model, cache);
            }
        }
        applied
    }

    /// Takes the displayed rows out of the window, renamed by `reindex`.
    fn take_rows(&mut self, reindex: Reindex<'_, Id>) -> HashMap<Id, R> {
        self.displayed
            .drain(..)
            .filter_map(|d| reindex(d.id).map(|id| (id, d.row)))
            .collect()
    }

    /// Rebuilds the window around `id` placed at `y`, reusing rows from
    /// `cache`. Falls back to the first row if `id` does not resolve.
    fn reseed<M>(&mut self, model: &M, cache: &mut HashMap<Id, R>, id: Id, y: f32) -> bool
    where
        M: RowModel<Id = Id, Row = R>,
    {
        self.displayed.clear();
        let seeded = match self.materialize(model, cache, id) {
            Some(row) => Some((id, row, y)),
            None => model.first_pos().and_then(|first| {
                tracing::debug!("Row {id:?} is gone, re-seeding at the first row");
                self.materialize(model, cache, first).map(|row| (first, row, 0.0))
            }),
        };
        let Some((id, row, y)) = seeded else {
            return false;
        };
        self.displayed.push_back(DisplayedRow { id, row, y });
        self.fill(model, cache);
        self.clamp(model, cache);
        true
    }

    /// The row that must keep its y across a change, and that y.
    fn anchor(&self) -> Option<(Id, f32)> {
        self.fixed_row
            .and_then(|id| self.layout_y(id).map(|y| (id, y)))
            .or_else(|| self.displayed.front().map(|d| (d.id, d.y)))
    }

    fn position_from_window(&mut self, model: &impl RowModel<Id = Id, Row = R>) {
        if let (Some(first), Some(average)) = (self.displayed.front(), self.estimate.average()) {
            let index = model.approximate_index(first.id) as f32;
            self.current_pos = (index * average - first.y).max(0.0);
        }
    }

    // ── Scrolling ──────────────────────────────────────────────────────

    /// Discards the window and lays out again with row `id` at `start_px`
    /// (may be negative).
    pub fn scroll_to_layout<M>(&mut self, model: &M, id: Id, start_px: f32) -> bool
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let mut cache = self.take_rows(&|id| Some(id));
        let seeded = self.reseed(model, &mut cache, id, start_px);
        self.position_from_window(model);
        self.paint_all();
        seeded
    }

    /// Scrolls by `delta` pixels (positive moves the content up) and
    /// returns the distance actually moved. When `bounded`, the model's
    /// first row never leaves a gap above it and its last row never leaves
    /// a gap below it.
    pub fn scroll<M>(&mut self, model: &M, delta: f32, bounded: bool) -> f32
    where
        M: RowModel<Id = Id, Row = R>,
    {
        if delta.abs() < EPS || self.displayed.is_empty() {
            return 0.0;
        }
        let mut cache = HashMap::new();
        self.shift(-delta);
        self.fill(model, &mut cache);
        let correction = if bounded {
            self.clamp(model, &mut cache)
        } else {
            0.0
        };
        let moved = delta - correction;
        if moved.abs() < EPS {
            return 0.0;
        }

        let max = self.estimated_height(model).max(0.0);
        self.current_pos = (self.current_pos + moved).clamp(0.0, max);

        let height = self.viewport.y;
        if moved.abs() < height {
            self.back.translate(vec2(0.0, -moved));
            let strip = if moved > 0.0 {
                Rect::from_min_max(pos2(0.0, height - moved), pos2(self.viewport.x, height))
            } else {
                Rect::from_min_max(Pos2::ZERO, pos2(self.viewport.x, -moved))
            };
            self.paint_rect(strip);
            self.damage = Some(self.viewport_rect());
        } else {
            self.paint_all();
        }
        moved
    }

    /// Scrolls by whole lines.
    pub fn scroll_lines<M>(&mut self, model: &M, lines: f32) -> f32
    where
        M: RowModel<Id = Id, Row = R>,
    {
        self.scroll(model, lines * self.config.line_scroll_px, true)
    }

    /// Scrolls to an absolute position on the estimated extent.
    ///
    /// Nearby targets scroll exactly; distant ones re-seed the window at an
    /// approximate row, which the next layout corrects.
    pub fn scroll_to<M>(&mut self, model: &M, absolute_px: f32)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let absolute_px = absolute_px.max(0.0);
        if (absolute_px - self.current_pos).abs() < self.config.jump_threshold_px {
            self.scroll(model, absolute_px - self.current_pos, true);
            return;
        }
        tracing::debug!(
            "Jumping from {} to {absolute_px} of ~{}px",
            self.current_pos,
            self.estimated_height(model)
        );

        let mut cache = self.take_rows(&|id| Some(id));
        let estimated = self.estimated_height(model);
        if absolute_px + self.viewport.y >= estimated {
            if let Some(last) = model.last_pos() {
                let height = self
                    .materialize(model, &mut cache, last)
                    .map_or(0.0, |row| {
                        let h = row.height();
                        cache.insert(last, row);
                        h
                    });
                self.reseed(model, &mut cache, last, self.viewport.y - height);
            }
        } else {
            let average = self.estimate.average().unwrap_or(1.0).max(1.0);
            let index = (absolute_px / average) as usize;
            let hidden = absolute_px % average;
            if let Some(id) = model.approximate_pos(index) {
                self.reseed(model, &mut cache, id, -hidden);
            }
        }
        self.current_pos = absolute_px.min(estimated.max(0.0));
        self.paint_all();
    }

    /// Scrolls the least distance that brings `rect` (relative to row
    /// `id`) into the viewport.
    pub fn scroll_into_view<M>(&mut self, model: &M, id: Id, rect: Rect)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let (Some(first), Some(last)) = (self.displayed.front(), self.displayed.back()) else {
            self.scroll_to_layout(model, id, -rect.min.y);
            return;
        };
        let (first, last) = (first.id, last.id);
        if id > last {
            self.scroll_to_layout(model, id, self.viewport.y - rect.max.y);
        } else if id < first {
            self.scroll_to_layout(model, id, -rect.min.y);
        } else if let Some(y) = self.layout_y(id) {
            let top = y + rect.min.y;
            let bottom = y + rect.max.y;
            if top < 0.0 {
                self.scroll(model, top, true);
            } else if bottom > self.viewport.y {
                self.scroll(model, bottom - self.viewport.y, true);
            }
        }
    }

    /// Samples rows spread evenly over the model to seed the estimate.
    pub fn reset_estimate<M>(&mut self, model: &M)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        self.estimate.clear();
        let count = model.approximate_count();
        let samples = self.config.sample_rows.min(count);
        for k in 0..samples {
            let index = k * count / samples;
            let Some(id) = model.approximate_pos(index) else {
                continue;
            };
            if let Some(row) = model.get(id) {
                self.estimate.add(id, row.height());
            }
        }
    }

    /// Adopts a new viewport size. Rows are laid out again since their
    /// width may have changed; the first displayed row keeps its y.
    pub fn resize<M>(&mut self, model: &M, size: Vec2)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let anchor = self
            .displayed
            .front()
            .map(|d| (d.id, d.y))
            .or_else(|| model.first_pos().map(|id| (id, 0.0)));
        self.viewport = size;
        self.back.reset(self.viewport_rect());
        self.displayed.clear();
        self.reset_estimate(model);
        if let Some((id, y)) = anchor {
            self.reseed(model, &mut HashMap::new(), id, y);
        }
        self.position_from_window(model);
        self.paint_all();
    }

    // ── Change notifications ───────────────────────────────────────────

    /// A row was inserted at `pos`; `reindex` renames ids stored before it.
    pub fn on_inserted<M>(&mut self, model: &M, pos: Id, reindex: Reindex<'_, Id>)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let anchor = self.anchor();
        self.fixed_row = self.fixed_row.and_then(reindex);
        self.estimate.reindex(reindex);
        let mut cache = self.take_rows(reindex);

        let Some(row) = model.get(pos) else {
            tracing::debug!("Inserted row {pos:?} does not resolve");
            if let Some((id, y)) = anchor.and_then(|(id, y)| reindex(id).map(|id| (id, y))) {
                self.reseed(model, &mut cache, id, y);
            } else if let Some(first) = model.first_pos() {
                self.reseed(model, &mut cache, first, 0.0);
            }
            self.paint_all();
            return;
        };
        let height = row.height();
        self.estimate.add(pos, height);
        cache.insert(pos, row);

        let (id, y) = match anchor {
            Some((id, y)) => {
                if pos <= id {
                    self.current_pos += height;
                }
                (reindex(id).unwrap_or(pos), y)
            }
            None => (pos, 0.0),
        };
        self.reseed(model, &mut cache, id, y);
        self.paint_all();
    }

    /// The row at `pos` was removed; `reindex` maps it to `None`.
    pub fn on_removed<M>(&mut self, model: &M, pos: Id, reindex: Reindex<'_, Id>)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let anchor = self.anchor();
        let old_height = self
            .row(pos)
            .map(|r| r.height())
            .or_else(|| self.estimate.get(pos))
            .unwrap_or(0.0);
        self.estimate.remove(pos);
        self.estimate.reindex(reindex);
        self.fixed_row = self.fixed_row.and_then(reindex);
        let mut cache = self.take_rows(reindex);

        let target = match anchor {
            Some((id, y)) => {
                if pos < id {
                    self.current_pos = (self.current_pos - old_height).max(0.0);
                }
                match reindex(id) {
                    Some(id) => Some((id, y)),
                    // The anchor itself went away: its successor takes the slot.
                    None if cache.contains_key(&pos) || model.get(pos).is_some() => Some((pos, y)),
                    None => model.last_pos().map(|last| (last, y)),
                }
            }
            None => model.first_pos().map(|id| (id, 0.0)),
        };
        if let Some((id, y)) = target {
            self.reseed(model, &mut cache, id, y);
        }
        self.paint_all();
    }

    /// The content of row `pos` changed.
    pub fn on_modified<M>(&mut self, model: &M, pos: Id)
    where
        M: RowModel<Id = Id, Row = R>,
    {
        let Some(index) = self.position(pos) else {
            // Refreshed the next time it is materialized.
            self.estimate.remove(pos);
            return;
        };
        let Some(row) = model.get(pos) else {
            tracing::debug!("Modified row {pos:?} does not resolve");
            return;
        };
        let new_height = row.height();
        self.estimate.add(pos, new_height);
        let old_height = std::mem::replace(&mut self.displayed[index].row, row).height();

        if (new_height - old_height).abs() < EPS {
            self.repaint_row(pos);
            return;
        }
        let Some((id, y)) = self.anchor() else {
            return;
        };
        let mut cache = self.take_rows(&|id| Some(id));
        self.reseed(model, &mut cache, id, y);
        self.paint_all();
    }

    // ── Painting ───────────────────────────────────────────────────────

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.paint_all();
    }

    /// Redraws `rect` of the back buffer from the displayed rows.
    pub fn paint_rect(&mut self, rect: Rect) {
        let rect = rect.intersect(self.viewport_rect());
        if !rect.is_positive() {
            return;
        }
        let back = &mut self.back;
        back.clear_rect(rect);
        back.clip(Some(rect));
        back.draw_rect(rect, self.palette.background);
        for d in &self.displayed {
            let row_rect = Rect::from_min_max(pos2(0.0, d.y), pos2(self.viewport.x, d.bottom()))
                .intersect(rect);
            if !row_rect.is_positive() {
                continue;
            }
            back.clip(Some(row_rect));
            d.row.paint(&mut *back, pos2(self.config.margin, d.y), &self.palette);
        }
        back.clip(None);
        self.damage = Some(self.damage.map_or(rect, |d| d.union(rect)));
    }

    pub fn paint_all(&mut self) {
        self.paint_rect(self.viewport_rect());
    }

    pub fn repaint_row(&mut self, id: Id) {
        if let Some(rect) = self.row_rect(id) {
            self.paint_rect(rect);
        }
    }

    pub fn damage(&self) -> Option<Rect> {
        self.damage
    }

    pub fn back_buffer(&self) -> &DisplayList {
        &self.back
    }

    /// Copies the damaged part of the back buffer onto `surface`.
    pub fn present(&mut self, surface: &mut dyn PaintSurface) {
        if let Some(damage) = self.damage.take() {
            surface.blit(damage, &self.back);
        }
    }

    /// Copies the whole back buffer onto `surface`.
    pub fn present_all(&mut self, surface: &mut dyn PaintSurface) {
        self.damage = None;
        surface.blit(self.viewport_rect(), &self.back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PaintOp;
    use egui::Color32;
    use rich_pad_core::style::TextStyle;

    #[derive(Debug, Clone, PartialEq)]
    struct Block {
        label: String,
        height: f32,
    }

    impl Row for Block {
        type Hit = Pos2;

        fn height(&self) -> f32 {
            self.height
        }

        fn paint(&self, surface: &mut dyn PaintSurface, origin: Pos2, _palette: &Palette) {
            surface.draw_text(origin, &self.label, &TextStyle::default(), Color32::BLACK);
        }

        fn hit_test(&self, pos: Pos2) -> Option<Pos2> {
            Some(pos)
        }
    }

    struct Blocks {
        rows: Vec<Block>,
    }

    impl Blocks {
        fn uniform(count: usize, height: f32) -> Self {
            Self::from_heights(&vec![height; count])
        }

        fn from_heights(heights: &[f32]) -> Self {
            Self {
                rows: heights
                    .iter()
                    .enumerate()
                    .map(|(i, &height)| Block {
                        label: format!("row {i}"),
                        height,
                    })
                    .collect(),
            }
        }
    }

    impl RowModel for Blocks {
        type Id = usize;
        type Row = Block;

        fn get(&self, id: usize) -> Option<Block> {
            self.rows.get(id).cloned()
        }

        fn first_pos(&self) -> Option<usize> {
            (!self.rows.is_empty()).then_some(0)
        }

        fn next_pos(&self, id: usize) -> Option<usize> {
            (id + 1 < self.rows.len()).then_some(id + 1)
        }

        fn prev_pos(&self, id: usize) -> Option<usize> {
            id.checked_sub(1)
        }

        fn last_pos(&self) -> Option<usize> {
            self.rows.len().checked_sub(1)
        }

        fn approximate_count(&self) -> usize {
            self.rows.len()
        }

        fn approximate_pos(&self, index: usize) -> Option<usize> {
            self.last_pos().map(|last| index.min(last))
        }

        fn approximate_index(&self, id: usize) -> usize {
            id
        }
    }

    fn scroller(model: &Blocks, height: f32) -> RowScroller<usize, Block> {
        let mut s = RowScroller::new(ScrollerConfig {
            margin: 8.0,
            line_scroll_px: 16.0,
            jump_threshold_px: 1000.0,
            sample_rows: 50,
        });
        s.resize(model, vec2(200.0, height));
        s
    }

    /// Rows are contiguous in model order, do not overlap and cover the
    /// viewport.
    fn assert_window(s: &RowScroller<usize, Block>) {
        let rows: Vec<_> = s.displayed_rows().collect();
        assert!(!rows.is_empty());
        for pair in rows.windows(2) {
            assert_eq!(pair[1].id, pair[0].id + 1);
            assert!((pair[1].y - pair[0].bottom()).abs() < 0.01);
        }
        assert!(rows[0].y <= 0.01, "gap above: {}", rows[0].y);
        let bottom = rows[rows.len() - 1].bottom();
        assert!(bottom >= s.viewport().y - 0.01, "gap below: {bottom}");
        assert!(rows[0].bottom() > 0.0);
        assert!(rows[rows.len() - 1].y < s.viewport().y);
    }

    // ── Layout ─────────────────────────────────────────────────────────

    #[test]
    fn test_initial_window_covers_viewport() {
        let model = Blocks::uniform(100, 20.0);
        let s = scroller(&model, 100.0);
        assert_eq!(s.displayed_ids(), vec![0, 1, 2, 3, 4]);
        assert_window(&s);
    }

    #[test]
    fn test_scroll_to_layout_places_row() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        assert!(s.scroll_to_layout(&model, 50, -5.0));
        assert_eq!(s.layout_y(50), Some(-5.0));
        assert_eq!(s.displayed_ids(), (50..=55).collect::<Vec<_>>());
        assert_window(&s);
    }

    #[test]
    fn test_scroll_to_layout_near_top_is_clamped() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll_to_layout(&model, 1, 50.0);
        assert_eq!(s.layout_y(0), Some(0.0));
        assert_window(&s);
    }

    #[test]
    fn test_short_model_stays_at_top() {
        let model = Blocks::uniform(2, 20.0);
        let mut s = scroller(&model, 100.0);
        assert_eq!(s.scroll(&model, 30.0, true), 0.0);
        assert_eq!(s.layout_y(0), Some(0.0));
        assert_eq!(s.displayed_ids(), vec![0, 1]);
    }

    // ── Relative scrolling ─────────────────────────────────────────────

    #[test]
    fn test_scroll_down_and_back() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        assert_eq!(s.scroll(&model, 30.0, true), 30.0);
        assert_eq!(s.layout_y(1), Some(-10.0));
        assert_eq!(s.current_pos(), 30.0);
        assert_window(&s);

        assert_eq!(s.scroll(&model, -30.0, true), -30.0);
        assert_eq!(s.layout_y(0), Some(0.0));
        assert_eq!(s.current_pos(), 0.0);
    }

    #[test]
    fn test_bounded_scroll_stops_at_edges() {
        let model = Blocks::uniform(10, 20.0);
        let mut s = scroller(&model, 100.0);
        assert_eq!(s.scroll(&model, -50.0, true), 0.0);
        // 200px of content in a 100px viewport.
        assert_eq!(s.scroll(&model, 500.0, true), 100.0);
        assert_eq!(s.displayed_ids(), vec![5, 6, 7, 8, 9]);
        assert_eq!(s.layout_y(9), Some(80.0));
        assert_window(&s);
    }

    #[test]
    fn test_unbounded_scroll_moves_full_distance() {
        let model = Blocks::uniform(10, 20.0);
        let mut s = scroller(&model, 100.0);
        assert_eq!(s.scroll(&model, -30.0, false), -30.0);
        assert_eq!(s.layout_y(0), Some(30.0));
    }

    #[test]
    fn test_arbitrary_scrolls_keep_window_consistent() {
        let heights: Vec<f32> = (0..500).map(|i| 10.0 + (i * 37 % 90) as f32).collect();
        let model = Blocks::from_heights(&heights);
        let mut s = scroller(&model, 300.0);
        let deltas = [
            17.0, 250.0, -3.0, 999.0, -640.0, 1.5, 4000.0, -12.25, 300.0, -5000.0, 77.0,
            20000.0, 123.0, -456.0,
        ];
        for delta in deltas {
            s.scroll(&model, delta, true);
            assert_window(&s);
        }
    }

    #[test]
    fn test_line_scroll_uses_configured_step() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        assert_eq!(s.scroll_lines(&model, 3.0), 48.0);
    }

    // ── Absolute scrolling ─────────────────────────────────────────────

    #[test]
    fn test_scroll_to_nearby_is_exact() {
        let model = Blocks::uniform(1000, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll_to(&model, 450.0);
        assert_eq!(s.layout_y(22), Some(-10.0));
        assert_eq!(s.current_pos(), 450.0);
    }

    #[test]
    fn test_scroll_to_far_uses_estimate() {
        let model = Blocks::uniform(1000, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll_to(&model, 10_010.0);
        assert_eq!(s.layout_y(500), Some(-10.0));
        assert_eq!(s.current_pos(), 10_010.0);
        assert_window(&s);
    }

    #[test]
    fn test_scroll_to_bottom_seeds_last_row() {
        let model = Blocks::uniform(1000, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll_to(&model, 19_990.0);
        assert_eq!(s.layout_y(999), Some(80.0));
        assert_window(&s);
    }

    #[test]
    fn test_estimated_height() {
        let model = Blocks::uniform(300, 20.0);
        let s = scroller(&model, 100.0);
        assert_eq!(s.estimated_height(&model), 6000.0);
    }

    // ── Scroll into view ───────────────────────────────────────────────

    #[test]
    fn test_scroll_into_view_below() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        let caret = Rect::from_min_size(pos2(0.0, 0.0), vec2(2.0, 20.0));
        s.scroll_into_view(&model, 4, caret.translate(vec2(0.0, 5.0)));
        assert_eq!(s.layout_y(4), Some(75.0));

        s.scroll_into_view(&model, 40, caret);
        assert_eq!(s.layout_y(40), Some(80.0));
        assert_window(&s);
    }

    #[test]
    fn test_scroll_into_view_above() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll_to_layout(&model, 50, -5.0);
        let caret = Rect::from_min_size(pos2(0.0, 0.0), vec2(2.0, 20.0));
        s.scroll_into_view(&model, 50, caret);
        assert_eq!(s.layout_y(50), Some(0.0));
        s.scroll_into_view(&model, 10, caret);
        assert_eq!(s.layout_y(10), Some(0.0));
    }

    #[test]
    fn test_visible_rect_does_not_scroll() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        let caret = Rect::from_min_size(pos2(0.0, 0.0), vec2(2.0, 20.0));
        s.scroll_into_view(&model, 2, caret);
        assert_eq!(s.layout_y(0), Some(0.0));
    }

    // ── Hit testing ────────────────────────────────────────────────────

    #[test]
    fn test_hit_test_subtracts_margin() {
        let model = Blocks::uniform(100, 20.0);
        let s = scroller(&model, 100.0);
        assert_eq!(s.hit_test(pos2(18.0, 45.0)), Some((2, pos2(10.0, 5.0))));
        assert_eq!(s.hit_test(pos2(18.0, 500.0)), None);
    }

    // ── Change notifications ───────────────────────────────────────────

    #[test]
    fn test_insert_above_keeps_fixed_row_in_place() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll(&model, 60.0, true);
        s.set_fixed_row(Some(5));
        assert_eq!(s.layout_y(5), Some(40.0));
        let pos_before = s.current_pos();

        model.rows.insert(
            2,
            Block {
                label: "new".into(),
                height: 35.0,
            },
        );
        s.on_inserted(&model, 2, &reindex_after_insert(2));

        assert_eq!(s.fixed_row(), Some(6));
        assert_eq!(s.layout_y(6), Some(40.0));
        assert_eq!(s.current_pos(), pos_before + 35.0);
        assert_window(&s);
    }

    #[test]
    fn test_insert_in_window_keeps_first_row() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        model.rows.insert(
            2,
            Block {
                label: "new".into(),
                height: 30.0,
            },
        );
        s.on_inserted(&model, 2, &reindex_after_insert(2));
        assert_eq!(s.layout_y(0), Some(0.0));
        assert_eq!(s.layout_y(2), Some(40.0));
        assert_eq!(s.layout_y(3), Some(70.0));
        assert_eq!(s.current_pos(), 0.0);
        assert_window(&s);
    }

    #[test]
    fn test_unresolved_insert_keeps_window() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll(&model, 60.0, true);
        let ids = s.displayed_ids();
        let y = s.layout_y(ids[0]);
        s.present_all(&mut DisplayList::default());

        s.on_inserted(&model, 500, &reindex_after_insert(500));

        assert_eq!(s.displayed_ids(), ids);
        assert_eq!(s.layout_y(ids[0]), y);
        assert!(s.damage().is_some());
        assert_window(&s);
    }

    #[test]
    fn test_remove_above_keeps_fixed_row_in_place() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll(&model, 60.0, true);
        s.set_fixed_row(Some(5));
        model.rows.remove(1);
        s.on_removed(&model, 1, &reindex_after_remove(1));
        assert_eq!(s.fixed_row(), Some(4));
        assert_eq!(s.layout_y(4), Some(40.0));
        assert_eq!(s.current_pos(), 40.0);
        assert_window(&s);
    }

    #[test]
    fn test_removing_the_anchor_promotes_its_successor() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll(&model, 60.0, true);
        model.rows.remove(3);
        s.on_removed(&model, 3, &reindex_after_remove(3));
        assert_eq!(s.layout_y(3), Some(0.0));
        assert_eq!(s.row(3).map(|r| r.label.as_str()), Some("row 4"));
        assert_window(&s);
    }

    #[test]
    fn test_modify_same_height_only_repaints_row() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        let mut sink = DisplayList::new(Rect::from_min_size(Pos2::ZERO, vec2(200.0, 100.0)));
        s.present_all(&mut sink);

        model.rows[2].label = "changed".into();
        s.on_modified(&model, 2);
        assert_eq!(
            s.damage(),
            Some(Rect::from_min_max(pos2(0.0, 40.0), pos2(200.0, 60.0)))
        );
        let texts: Vec<_> = s
            .back_buffer()
            .ops()
            .iter()
            .filter_map(|r| match &r.op {
                PaintOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"changed".to_string()));
        assert!(!texts.contains(&"row 2".to_string()));
    }

    #[test]
    fn test_modify_taller_reflows_window() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        model.rows[1].height = 50.0;
        s.on_modified(&model, 1);
        assert_eq!(s.layout_y(2), Some(70.0));
        assert_eq!(s.displayed_ids(), vec![0, 1, 2, 3]);
        assert_window(&s);
    }

    #[test]
    fn test_modify_outside_window_is_ignored() {
        let mut model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        model.rows[60].height = 90.0;
        s.on_modified(&model, 60);
        assert_eq!(s.displayed_ids(), vec![0, 1, 2, 3, 4]);
    }

    // ── Painting ───────────────────────────────────────────────────────

    #[test]
    fn test_present_blits_damage_once() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        let mut sink = DisplayList::new(Rect::from_min_size(Pos2::ZERO, vec2(200.0, 100.0)));
        s.present(&mut sink);
        assert!(!sink.is_empty());
        assert_eq!(s.damage(), None);

        let before = sink.len();
        s.present(&mut sink);
        assert_eq!(sink.len(), before);
    }

    #[test]
    fn test_scroll_shifts_back_buffer() {
        let model = Blocks::uniform(100, 20.0);
        let mut s = scroller(&model, 100.0);
        s.scroll(&model, 20.0, true);
        let row1 = s.back_buffer().ops().iter().find_map(|r| match &r.op {
            PaintOp::Text { text, pos, .. } if text == "row 1" => Some(*pos),
            _ => None,
        });
        assert_eq!(row1, Some(pos2(8.0, 0.0)));
        let row5 = s.back_buffer().ops().iter().any(|r| {
            matches!(&r.op, PaintOp::Text { text, .. } if text == "row 5")
        });
        assert!(row5);
    }
}
