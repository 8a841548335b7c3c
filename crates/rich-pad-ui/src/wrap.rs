//! Greedy word wrapping of a single run.

use rich_pad_core::style::TextStyle;

use crate::measure::TextMeasurer;

/// Default hard-break length for an unbroken token.
pub const DEFAULT_TOKEN_CHARS: usize = 30;

/// Splits `text` into line-sized pieces.
///
/// The first piece is fitted into `first_width` (the space left on a line
/// that already holds earlier content), every following piece into
/// `max_width`. Joining the pieces gives back `text` exactly.
pub fn wrap_text<'a>(
    text: &'a str,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
    max_width: f32,
    first_width: f32,
    token_chars: usize,
) -> WrapFragments<'a> {
    let mut extents = Vec::with_capacity(text.len() + 1);
    extents.push(0.0);
    extents.extend(measurer.partial_widths(text, style));

    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    // A measurer that under-reports chars must not break indexing.
    let last = extents.last().copied().unwrap_or(0.0);
    extents.resize(bounds.len(), last);

    WrapFragments {
        text,
        bounds,
        extents,
        pos: 0,
        budget: first_width,
        max_width,
        token_chars: token_chars.max(1),
    }
}

/// Iterator over the wrapped pieces of a run. Cloning it restarts from the
/// current position.
#[derive(Debug, Clone)]
pub struct WrapFragments<'a> {
    text: &'a str,
    /// Byte offset of every char boundary, including the end.
    bounds: Vec<usize>,
    /// Cumulative width at every char boundary.
    extents: Vec<f32>,
    pos: usize,
    budget: f32,
    max_width: f32,
    token_chars: usize,
}

impl WrapFragments<'_> {
    fn char_count(&self) -> usize {
        self.bounds.len() - 1
    }

    fn is_space(&self, index: usize) -> bool {
        self.text[self.bounds[index]..self.bounds[index + 1]] == *" "
    }

    /// Next break candidate strictly after `from`: just past a space, or
    /// after `token_chars` chars of one token, or the end of text.
    fn next_candidate(&self, from: usize) -> usize {
        let end = self.char_count();
        let mut token = 0;
        let mut i = from;
        while i < end {
            let space = self.is_space(i);
            i += 1;
            if space {
                return i;
            }
            token += 1;
            if token >= self.token_chars {
                return i;
            }
        }
        end
    }

    /// End of the piece starting at `start` within `budget`.
    fn fit(&self, start: usize, budget: f32) -> usize {
        let end = self.char_count();
        let start_width = self.extents[start];
        let fits = |pos: usize| self.extents[pos] - start_width < budget;

        let mut prev = self.next_candidate(start);
        let mut next = prev;
        while next < end && fits(next) {
            prev = next;
            next = self.next_candidate(next);
        }
        if next == end && fits(next) {
            return end;
        }
        prev
    }
}

impl<'a> Iterator for WrapFragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.pos >= self.char_count() {
            return None;
        }
        let start = self.pos;
        let end = self.fit(start, self.budget);
        self.pos = end;
        self.budget = self.max_width;
        Some(&self.text[self.bounds[start]..self.bounds[end]])
    }
}
