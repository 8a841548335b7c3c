//! Paragraph layout: wrapping a paragraph's elements into positioned
//! fragments, and the geometric queries the editor needs on them.
//!
//! Coordinates are relative to the paragraph's top-left corner.

mod fragment;

pub use fragment::{Fragment, FragmentContent};

use std::ops::Range;

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use rich_pad_core::element::{Paragraph, RichTextElement};
use rich_pad_core::style::{self, TextStyle};

use crate::measure::TextMeasurer;
use crate::surface::{PaintSurface, Palette};
use crate::wrap::{wrap_text, DEFAULT_TOKEN_CHARS};

/// Measurement and sizing inputs shared by every paragraph layout.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub image_margin: f32,
    pub caret_width: f32,
    pub token_chars: usize,
}

impl std::fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("image_margin", &self.image_margin)
            .field("caret_width", &self.caret_width)
            .field("token_chars", &self.token_chars)
            .finish_non_exhaustive()
    }
}

impl<'a> LayoutContext<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            measurer,
            image_margin: 10.0,
            caret_width: 2.0,
            token_chars: DEFAULT_TOKEN_CHARS,
        }
    }
}

/// A caret-like address inside one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    pub element: usize,
    pub offset: usize,
    pub before_split: bool,
}

impl HitResult {
    pub fn new(element: usize, offset: usize, before_split: bool) -> Self {
        Self {
            element,
            offset,
            before_split,
        }
    }
}

/// First and last caret positions of a visual line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBounds {
    pub start: HitResult,
    pub end: HitResult,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    top: f32,
    height: f32,
    fragments: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CaretMark {
    fragment: usize,
    local: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphLayout {
    max_width: f32,
    caret_width: f32,
    fragments: Vec<Fragment>,
    lines: Vec<Line>,
    caret: Option<CaretMark>,
    caret_visible: bool,
}

/// Line-filling state while building.
struct Builder {
    max_width: f32,
    insert_x: f32,
    line_top: f32,
    line_height: f32,
    line_start: usize,
    fragments: Vec<Fragment>,
    lines: Vec<Line>,
}

impl Builder {
    fn remaining(&self) -> f32 {
        self.max_width - self.insert_x
    }

    fn next_line(&mut self) {
        self.lines.push(Line {
            top: self.line_top,
            height: self.line_height,
            fragments: self.line_start..self.fragments.len(),
        });
        self.line_top += self.line_height;
        self.line_height = 0.0;
        self.insert_x = 0.0;
        self.line_start = self.fragments.len();
    }

    /// Position for a fragment of `size`, moving to a new line if it does
    /// not fit on a line that already holds something.
    fn place(&mut self, size: Vec2) -> Pos2 {
        let line_empty = self.line_start == self.fragments.len();
        if self.insert_x + size.x > self.max_width && !line_empty {
            self.next_line();
        }
        let origin = pos2(self.insert_x, self.line_top);
        self.insert_x += size.x;
        self.line_height = self.line_height.max(size.y);
        origin
    }

    fn finish(mut self) -> (Vec<Fragment>, Vec<Line>) {
        if self.line_start < self.fragments.len() || self.lines.is_empty() {
            self.next_line();
        }
        (self.fragments, self.lines)
    }
}

impl ParagraphLayout {
    /// Lays out `paragraph` into lines at most `max_width` wide.
    pub fn build(paragraph: &Paragraph, max_width: f32, ctx: &LayoutContext<'_>) -> Self {
        let mut b = Builder {
            max_width: max_width.max(1.0),
            insert_x: 0.0,
            line_top: 0.0,
            line_height: 0.0,
            line_start: 0,
            fragments: Vec::new(),
            lines: Vec::new(),
        };

        for (index, element) in paragraph.elements.iter().enumerate() {
            match element {
                RichTextElement::Run { text, style: own } => {
                    let style = style::effective(own.as_ref().or(paragraph.style.as_ref()));
                    append_run(&mut b, index, text, &style, ctx);
                }
                RichTextElement::Image { data, .. } => {
                    let size = ctx.measurer.image_size(data) + Vec2::splat(2.0 * ctx.image_margin);
                    let origin = b.place(size);
                    b.fragments
                        .push(Fragment::image(index, origin, size, data.clone(), ctx.image_margin));
                }
            }
        }

        if b.fragments.is_empty() {
            // No elements at all: keep the paragraph addressable.
            let style = style::effective(paragraph.style.as_ref());
            append_empty(&mut b, 0, &style, ctx);
        }

        let (fragments, lines) = b.finish();
        Self {
            max_width,
            caret_width: ctx.caret_width,
            fragments,
            lines,
            caret: None,
            caret_visible: true,
        }
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn height(&self) -> f32 {
        self.lines.last().map_or(0.0, |l| l.top + l.height)
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.max_width, self.height())
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Fragments on visual line `line`.
    pub fn line_fragments(&self, line: usize) -> &[Fragment] {
        self.lines
            .get(line)
            .map_or(&[], |l| &self.fragments[l.fragments.clone()])
    }

    fn line_of(&self, fragment: usize) -> Option<&Line> {
        self.lines.iter().find(|l| l.fragments.contains(&fragment))
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Resolves a point to a caret address.
    ///
    /// A point inside a fragment resolves within it. Otherwise the last
    /// fragment whose vertical span contains `pos.y` is used, so clicks in
    /// the empty area after a line land at its end.
    pub fn hit_test(&self, pos: Pos2) -> Option<HitResult> {
        let hit = |f: &Fragment| {
            let (local, before_split) = f.hit_test(pos.x - f.rect.min.x);
            HitResult::new(f.element, f.range.start + local, before_split)
        };
        if let Some(f) = self.fragments.iter().find(|f| f.rect.contains(pos)) {
            return Some(hit(f));
        }
        self.fragments
            .iter()
            .rev()
            .find(|f| f.rect.min.y <= pos.y && pos.y <= f.rect.max.y)
            .map(hit)
    }

    /// Index of the fragment showing `offset` of `element`.
    ///
    /// At a wrap point two fragments claim the offset; `before_split`
    /// picks the one that ends there.
    pub fn fragment_for(&self, element: usize, offset: usize, before_split: bool) -> Option<usize> {
        let mut ending = None;
        let mut other = None;
        for (index, f) in self.fragments.iter().enumerate() {
            if f.element != element || !f.contains_offset(offset) {
                continue;
            }
            if offset == f.range.end {
                ending.get_or_insert(index);
            } else {
                other.get_or_insert(index);
            }
        }
        match (ending, other) {
            (Some(e), Some(o)) => Some(if before_split { e } else { o }),
            (e, o) => e.or(o),
        }
    }

    pub fn caret_rect(&self, element: usize, offset: usize, before_split: bool) -> Option<Rect> {
        let index = self.fragment_for(element, offset, before_split)?;
        let f = &self.fragments[index];
        Some(f.caret_rect(offset - f.range.start, self.caret_width))
    }

    /// Start and end of the visual line the caret is on.
    pub fn line_bounds(&self, element: usize, offset: usize, before_split: bool) -> Option<LineBounds> {
        let index = self.fragment_for(element, offset, before_split)?;
        let line = self.line_of(index)?;
        let first = self.fragments.get(line.fragments.start)?;
        let last = self.fragments.get(line.fragments.end.checked_sub(1)?)?;
        Some(LineBounds {
            start: HitResult::new(first.element, first.range.start, false),
            end: HitResult::new(last.element, last.range.end, true),
        })
    }

    // ── Decorations ────────────────────────────────────────────────────

    /// Highlights everything from `start` to `end`, each given as
    /// `(element, offset)`; `None` leaves that side open.
    pub fn set_selected(&mut self, start: Option<(usize, usize)>, end: Option<(usize, usize)>) {
        for f in &mut self.fragments {
            let from = match start {
                Some((e, _)) if f.element < e => None,
                Some((e, o)) if f.element == e => Some(o.max(f.range.start)),
                _ => Some(f.range.start),
            };
            let to = match end {
                Some((e, _)) if f.element > e => None,
                Some((e, o)) if f.element == e => Some(o.min(f.range.end)),
                _ => Some(f.range.end),
            };
            f.selected = match (from, to) {
                (Some(a), Some(b)) if a < b => Some(a - f.range.start..b - f.range.start),
                _ => None,
            };
        }
    }

    pub fn clear_selection(&mut self) {
        for f in &mut self.fragments {
            f.selected = None;
        }
    }

    pub fn has_selection(&self) -> bool {
        self.fragments.iter().any(|f| f.selected.is_some())
    }

    /// Places the caret, or removes it with `None`. Returns `false` if the
    /// address does not resolve; the caret is then removed.
    pub fn set_caret(&mut self, caret: Option<HitResult>) -> bool {
        self.caret = caret.and_then(|c| {
            let fragment = self.fragment_for(c.element, c.offset, c.before_split)?;
            let local = c.offset - self.fragments[fragment].range.start;
            Some(CaretMark { fragment, local })
        });
        caret.is_none() || self.caret.is_some()
    }

    pub fn set_caret_visible(&mut self, visible: bool) {
        self.caret_visible = visible;
    }

    pub fn has_caret(&self) -> bool {
        self.caret.is_some()
    }

    /// Caret rectangle of the placed caret.
    pub fn current_caret_rect(&self) -> Option<Rect> {
        let mark = self.caret?;
        let f = self.fragments.get(mark.fragment)?;
        Some(f.caret_rect(mark.local, self.caret_width))
    }

    pub fn paint(&self, surface: &mut dyn PaintSurface, origin: Pos2, palette: &Palette) {
        for f in &self.fragments {
            f.paint(surface, origin, palette);
        }
        if self.caret_visible {
            if let Some(rect) = self.current_caret_rect() {
                surface.draw_rect(rect.translate(origin.to_vec2()), palette.caret);
            }
        }
    }
}

fn append_run(b: &mut Builder, index: usize, text: &str, style: &TextStyle, ctx: &LayoutContext<'_>) {
    if text.is_empty() {
        append_empty(b, index, style, ctx);
        return;
    }
    let mut offset = 0;
    let pieces = wrap_text(
        text,
        style,
        ctx.measurer,
        b.max_width,
        b.remaining(),
        ctx.token_chars,
    );
    for (i, piece) in pieces.enumerate() {
        // Later pieces were fitted to a whole line.
        if i > 0 && b.line_start < b.fragments.len() {
            b.next_line();
        }
        let len = piece.chars().count();
        let size = ctx.measurer.measure(piece, style);
        let widths = ctx.measurer.partial_widths(piece, style);
        let origin = b.place(size);
        b.fragments.push(Fragment::text(
            index,
            offset..offset + len,
            origin,
            size,
            piece.to_string(),
            style.clone(),
            widths,
        ));
        offset += len;
    }
}

/// A zero-width fragment as tall as a line of `style`.
fn append_empty(b: &mut Builder, index: usize, style: &TextStyle, ctx: &LayoutContext<'_>) {
    let height = ctx.measurer.measure("a", style).y;
    let origin = b.place(vec2(0.0, height));
    b.fragments.push(Fragment::text(
        index,
        0..0,
        origin,
        vec2(0.0, height),
        String::new(),
        style.clone(),
        Vec::new(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MonospaceMeasurer;
    use rich_pad_core::element::ImageData;
    use rich_pad_core::style::FontWeight;
    use std::io::Cursor;

    /// 10px wide, 20px tall chars.
    const M: MonospaceMeasurer = MonospaceMeasurer {
        char_width: 10.0,
        line_height: 20.0,
    };

    fn ctx() -> LayoutContext<'static> {
        LayoutContext {
            measurer: &M,
            image_margin: 5.0,
            caret_width: 2.0,
            token_chars: 30,
        }
    }

    fn png(w: u32, h: u32) -> ImageData {
        let img = image::RgbaImage::new(w, h);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        ImageData::new(bytes)
    }

    fn layout(p: &Paragraph, width: f32) -> ParagraphLayout {
        ParagraphLayout::build(p, width, &ctx())
    }

    fn pieces(l: &ParagraphLayout) -> Vec<(usize, Range<usize>, f32, f32)> {
        l.fragments()
            .iter()
            .map(|f| (f.element, f.range.clone(), f.rect.min.x, f.rect.min.y))
            .collect()
    }

    // ── Building ───────────────────────────────────────────────────────

    #[test]
    fn test_single_line() {
        let l = layout(&Paragraph::from_text("hello"), 200.0);
        assert_eq!(pieces(&l), vec![(0, 0..5, 0.0, 0.0)]);
        assert_eq!(l.height(), 20.0);
        assert_eq!(l.line_count(), 1);
    }

    #[test]
    fn test_run_wraps_onto_lines() {
        let l = layout(&Paragraph::from_text("aaa bbb ccc"), 65.0);
        assert_eq!(
            pieces(&l),
            vec![(0, 0..4, 0.0, 0.0), (0, 4..8, 0.0, 20.0), (0, 8..11, 0.0, 40.0)]
        );
        assert_eq!(l.height(), 60.0);
    }

    #[test]
    fn test_second_run_continues_on_partial_line() {
        let p = Paragraph::new(vec![
            RichTextElement::run("ab "),
            RichTextElement::styled_run("cd ef", TextStyle::default().with_weight(FontWeight::Bold)),
        ]);
        let l = layout(&p, 65.0);
        assert_eq!(
            pieces(&l),
            vec![(0, 0..3, 0.0, 0.0), (1, 0..3, 30.0, 0.0), (1, 3..5, 0.0, 20.0)]
        );
    }

    #[test]
    fn test_image_moves_to_next_line_when_it_does_not_fit() {
        let p = Paragraph::new(vec![
            RichTextElement::run("abcdef"),
            RichTextElement::image(png(30, 30)),
        ]);
        let l = layout(&p, 80.0);
        // Image fragment is 30 + 2 * 5 = 40 wide and tall.
        assert_eq!(pieces(&l), vec![(0, 0..6, 0.0, 0.0), (1, 0..1, 0.0, 20.0)]);
        assert_eq!(l.height(), 60.0);
    }

    #[test]
    fn test_line_height_is_tallest_fragment() {
        let p = Paragraph::new(vec![
            RichTextElement::run("ab"),
            RichTextElement::image(png(10, 50)),
            RichTextElement::run("c"),
        ]);
        let l = layout(&p, 500.0);
        assert_eq!(l.line_count(), 1);
        assert_eq!(l.height(), 60.0);
    }

    #[test]
    fn test_empty_paragraph_has_line_height() {
        let l = layout(&Paragraph::empty(), 100.0);
        assert_eq!(pieces(&l), vec![(0, 0..0, 0.0, 0.0)]);
        assert_eq!(l.height(), 20.0);
        assert_eq!(l.fragments()[0].rect.width(), 0.0);
    }

    #[test]
    fn test_elementless_paragraph_still_lays_out() {
        let p = Paragraph {
            elements: Vec::new(),
            style: None,
        };
        assert_eq!(layout(&p, 100.0).height(), 20.0);
    }

    // ── Hit testing ────────────────────────────────────────────────────

    #[test]
    fn test_hit_test_inside_fragment() {
        let l = layout(&Paragraph::from_text("aaa bbb ccc"), 65.0);
        assert_eq!(l.hit_test(pos2(12.0, 25.0)), Some(HitResult::new(0, 5, false)));
    }

    #[test]
    fn test_hit_test_past_line_end_lands_at_line_end() {
        let l = layout(&Paragraph::from_text("aaa bbb ccc"), 65.0);
        assert_eq!(l.hit_test(pos2(70.0, 45.0)), Some(HitResult::new(0, 11, true)));
        assert_eq!(l.hit_test(pos2(70.0, 5.0)), Some(HitResult::new(0, 4, true)));
    }

    #[test]
    fn test_hit_test_below_paragraph_is_none() {
        let l = layout(&Paragraph::from_text("abc"), 75.0);
        assert_eq!(l.hit_test(pos2(5.0, 90.0)), None);
    }

    #[test]
    fn test_hit_test_image_halves() {
        let p = Paragraph::new(vec![RichTextElement::image(png(30, 30))]);
        let l = layout(&p, 100.0);
        assert_eq!(l.hit_test(pos2(10.0, 10.0)), Some(HitResult::new(0, 0, true)));
        assert_eq!(l.hit_test(pos2(35.0, 10.0)), Some(HitResult::new(0, 1, true)));
    }

    // ── Carets ─────────────────────────────────────────────────────────

    #[test]
    fn test_before_split_picks_fragment_at_wrap_point() {
        let l = layout(&Paragraph::from_text("aaa bbb ccc"), 65.0);
        let end_of_first = l.caret_rect(0, 4, true).unwrap();
        let start_of_second = l.caret_rect(0, 4, false).unwrap();
        assert_eq!(end_of_first.min, pos2(40.0, 0.0));
        assert_eq!(start_of_second.min, pos2(0.0, 20.0));
        assert_eq!(end_of_first.size(), vec2(2.0, 20.0));
    }

    #[test]
    fn test_caret_rect_unknown_address_is_none() {
        let l = layout(&Paragraph::from_text("abc"), 75.0);
        assert_eq!(l.caret_rect(3, 0, false), None);
        assert_eq!(l.caret_rect(0, 9, false), None);
    }

    #[test]
    fn test_line_bounds_cover_visual_line() {
        let p = Paragraph::new(vec![
            RichTextElement::run("ab "),
            RichTextElement::styled_run("cd ef", TextStyle::default().with_point_size(12)),
        ]);
        let l = layout(&p, 65.0);
        let bounds = l.line_bounds(0, 1, false).unwrap();
        assert_eq!(bounds.start, HitResult::new(0, 0, false));
        assert_eq!(bounds.end, HitResult::new(1, 3, true));
        let second = l.line_bounds(1, 4, false).unwrap();
        assert_eq!(second.start, HitResult::new(1, 3, false));
        assert_eq!(second.end, HitResult::new(1, 5, true));
    }

    #[test]
    fn test_set_caret_on_unknown_address_clears_it() {
        let mut l = layout(&Paragraph::from_text("abc"), 75.0);
        assert!(l.set_caret(Some(HitResult::new(0, 2, false))));
        assert!(l.has_caret());
        assert!(!l.set_caret(Some(HitResult::new(4, 0, false))));
        assert!(!l.has_caret());
    }

    // ── Selection ──────────────────────────────────────────────────────

    #[test]
    fn test_selection_partial_first_and_last() {
        let mut l = layout(&Paragraph::from_text("aaa bbb ccc"), 65.0);
        l.set_selected(Some((0, 2)), Some((0, 9)));
        let sel: Vec<_> = l.fragments().iter().map(|f| f.selected.clone()).collect();
        assert_eq!(sel, vec![Some(2..4), Some(0..4), Some(0..1)]);
    }

    #[test]
    fn test_open_ended_selection() {
        let p = Paragraph::new(vec![
            RichTextElement::run("ab"),
            RichTextElement::image(png(4, 4)),
            RichTextElement::run("cd"),
        ]);
        let mut l = layout(&p, 500.0);
        l.set_selected(Some((0, 1)), None);
        let sel: Vec<_> = l.fragments().iter().map(|f| f.selected.clone()).collect();
        assert_eq!(sel, vec![Some(1..2), Some(0..1), Some(0..2)]);

        l.set_selected(None, Some((1, 0)));
        let sel: Vec<_> = l.fragments().iter().map(|f| f.selected.clone()).collect();
        assert_eq!(sel, vec![Some(0..2), None, None]);

        l.clear_selection();
        assert!(!l.has_selection());
    }

    // ── Painting ───────────────────────────────────────────────────────

    #[test]
    fn test_paint_draws_selection_and_caret() {
        use crate::surface::{DisplayList, PaintOp};

        let mut l = layout(&Paragraph::from_text("abcd"), 200.0);
        l.set_selected(Some((0, 1)), Some((0, 3)));
        l.set_caret(Some(HitResult::new(0, 3, false)));
        let mut list = DisplayList::new(Rect::from_min_size(Pos2::ZERO, vec2(300.0, 100.0)));
        l.paint(&mut list, pos2(8.0, 10.0), &Palette::default());

        let ops: Vec<&PaintOp> = list.ops().iter().map(|r| &r.op).collect();
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[1], PaintOp::Rect { rect, .. }
            if *rect == Rect::from_min_max(pos2(18.0, 10.0), pos2(38.0, 30.0))));
        assert!(matches!(ops[2], PaintOp::Text { text, .. } if text == "bc"));
        assert!(matches!(ops[3], PaintOp::Rect { rect, .. } if rect.min == pos2(38.0, 10.0)));

        l.set_caret_visible(false);
        let mut list = DisplayList::new(Rect::from_min_size(Pos2::ZERO, vec2(300.0, 100.0)));
        l.paint(&mut list, pos2(8.0, 10.0), &Palette::default());
        assert_eq!(list.len(), 3);
    }
}
