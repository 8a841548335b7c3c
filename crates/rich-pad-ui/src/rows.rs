//! The document seen as a scroller row model: one row per paragraph.

use egui::Pos2;
use rich_pad_config::EditorConfig;
use rich_pad_core::document::Document;

use crate::layout::{HitResult, LayoutContext, ParagraphLayout};
use crate::measure::TextMeasurer;
use crate::scroller::{Row, RowModel};
use crate::surface::{PaintSurface, Palette};
use crate::wrap::DEFAULT_TOKEN_CHARS;

/// Layout inputs that come from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub image_margin: f32,
    pub caret_width: f32,
    pub token_chars: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            image_margin: 10.0,
            caret_width: 2.0,
            token_chars: DEFAULT_TOKEN_CHARS,
        }
    }
}

impl From<&EditorConfig> for LayoutSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            image_margin: config.image_margin,
            caret_width: config.caret_width,
            token_chars: config.wrap_token_chars,
        }
    }
}

impl LayoutSettings {
    pub fn context<'a>(&self, measurer: &'a dyn TextMeasurer) -> LayoutContext<'a> {
        LayoutContext {
            measurer,
            image_margin: self.image_margin,
            caret_width: self.caret_width,
            token_chars: self.token_chars,
        }
    }
}

type Bound = Option<(usize, usize)>;

/// Caret and selection state drawn over one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decoration {
    pub caret: Option<HitResult>,
    /// Selected span within the paragraph; open ends extend past it.
    pub selection: Option<(Bound, Bound)>,
    pub caret_visible: bool,
}

impl Decoration {
    /// What `document`'s caret and selection look like on `paragraph`.
    pub fn for_paragraph(document: &Document, paragraph: usize, caret_visible: bool) -> Self {
        let caret = document
            .caret()
            .filter(|c| c.paragraph == paragraph)
            .map(|c| HitResult::new(c.element, c.offset, c.before_split));
        let selection = document
            .selection()
            .filter(|s| !s.is_empty() && s.contains_paragraph(paragraph))
            .map(|s| {
                let start = (s.start.paragraph == paragraph).then_some((s.start.element, s.start.offset));
                let end = (s.end.paragraph == paragraph).then_some((s.end.element, s.end.offset));
                (start, end)
            });
        Self {
            caret,
            selection,
            caret_visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphRow {
    layout: ParagraphLayout,
    decoration: Decoration,
}

impl ParagraphRow {
    pub fn new(layout: ParagraphLayout) -> Self {
        let mut row = Self {
            layout,
            decoration: Decoration::default(),
        };
        row.layout.set_caret_visible(false);
        row
    }

    pub fn layout(&self) -> &ParagraphLayout {
        &self.layout
    }

    pub fn decoration(&self) -> Decoration {
        self.decoration
    }

    /// Applies a decoration; returns whether anything changed.
    pub fn decorate(&mut self, decoration: Decoration) -> bool {
        if decoration == self.decoration {
            return false;
        }
        if decoration.selection != self.decoration.selection {
            match decoration.selection {
                Some((start, end)) => self.layout.set_selected(start, end),
                None => self.layout.clear_selection(),
            }
        }
        if decoration.caret != self.decoration.caret && !self.layout.set_caret(decoration.caret) {
            tracing::debug!("Caret {:?} does not resolve in its paragraph", decoration.caret);
        }
        self.layout.set_caret_visible(decoration.caret_visible);
        self.decoration = decoration;
        true
    }
}

impl Row for ParagraphRow {
    type Hit = HitResult;

    fn height(&self) -> f32 {
        self.layout.height()
    }

    fn paint(&self, surface: &mut dyn PaintSurface, origin: Pos2, palette: &Palette) {
        self.layout.paint(surface, origin, palette);
    }

    fn hit_test(&self, pos: Pos2) -> Option<HitResult> {
        self.layout.hit_test(pos)
    }
}

/// Lays paragraphs out on demand at a fixed width.
#[derive(Clone, Copy)]
pub struct ParagraphRowModel<'a> {
    pub document: &'a Document,
    pub measurer: &'a dyn TextMeasurer,
    pub settings: LayoutSettings,
    pub max_width: f32,
    pub caret_visible: bool,
}

impl<'a> ParagraphRowModel<'a> {
    pub fn new(document: &'a Document, measurer: &'a dyn TextMeasurer, max_width: f32) -> Self {
        Self {
            document,
            measurer,
            settings: LayoutSettings::default(),
            max_width,
            caret_visible: true,
        }
    }

    pub fn with_settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_caret_visible(mut self, visible: bool) -> Self {
        self.caret_visible = visible;
        self
    }

    pub fn decoration(&self, paragraph: usize) -> Decoration {
        Decoration::for_paragraph(self.document, paragraph, self.caret_visible)
    }
}

impl RowModel for ParagraphRowModel<'_> {
    type Id = usize;
    type Row = ParagraphRow;

    fn get(&self, id: usize) -> Option<ParagraphRow> {
        let paragraph = self.document.paragraph(id)?;
        let ctx = self.settings.context(self.measurer);
        let mut row = ParagraphRow::new(ParagraphLayout::build(paragraph, self.max_width, &ctx));
        row.decorate(self.decoration(id));
        Some(row)
    }

    fn first_pos(&self) -> Option<usize> {
        (self.document.paragraph_count() > 0).then_some(0)
    }

    fn next_pos(&self, id: usize) -> Option<usize> {
        (id + 1 < self.document.paragraph_count()).then_some(id + 1)
    }

    fn prev_pos(&self, id: usize) -> Option<usize> {
        id.checked_sub(1)
            .filter(|&prev| prev < self.document.paragraph_count())
    }

    fn last_pos(&self) -> Option<usize> {
        self.document.paragraph_count().checked_sub(1)
    }

    fn approximate_count(&self) -> usize {
        self.document.paragraph_count()
    }

    fn approximate_pos(&self, index: usize) -> Option<usize> {
        self.last_pos().map(|last| index.min(last))
    }

    fn approximate_index(&self, id: usize) -> usize {
        id
    }
}
