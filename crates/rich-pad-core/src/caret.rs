//! Caret addressing and selections.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A hierarchical caret address: paragraph, element, char offset.
///
/// `before_split` only disambiguates which visual line a wrap-point offset
/// belongs to; it is ignored by equality, ordering and hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaretPosition {
    pub paragraph: usize,
    pub element: usize,
    pub offset: usize,
    pub before_split: bool,
}

impl CaretPosition {
    pub fn new(paragraph: usize, element: usize, offset: usize) -> Self {
        Self {
            paragraph,
            element,
            offset,
            before_split: false,
        }
    }

    pub fn with_before_split(mut self, before_split: bool) -> Self {
        self.before_split = before_split;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Shifts the offset, saturating at zero.
    pub fn move_offset(self, delta: isize) -> Self {
        self.with_offset(self.offset.saturating_add_signed(delta))
    }

    /// Start of the following element.
    pub fn next_element(self) -> Self {
        Self::new(self.paragraph, self.element + 1, 0)
    }

    /// Start of the following paragraph.
    pub fn next_paragraph(self) -> Self {
        Self::new(self.paragraph + 1, 0, 0)
    }

    fn key(&self) -> (usize, usize, usize) {
        (self.paragraph, self.element, self.offset)
    }
}

impl PartialEq for CaretPosition {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CaretPosition {}

impl PartialOrd for CaretPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CaretPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for CaretPosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A normalized caret range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub start: CaretPosition,
    pub end: CaretPosition,
}

impl Selection {
    /// Creates a selection, sorting the two ends.
    pub fn new(a: CaretPosition, b: CaretPosition) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains_paragraph(&self, paragraph: usize) -> bool {
        (self.start.paragraph..=self.end.paragraph).contains(&paragraph)
    }

    /// Paragraph indices touched by this selection.
    pub fn paragraphs(&self) -> std::ops::RangeInclusive<usize> {
        self.start.paragraph..=self.end.paragraph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = CaretPosition::new(0, 5, 9);
        let b = CaretPosition::new(1, 0, 0);
        let c = CaretPosition::new(1, 0, 1);
        let d = CaretPosition::new(1, 1, 0);
        assert!(a < b && b < c && c < d);
    }

    #[test]
    fn test_before_split_ignored_by_eq_and_hash() {
        use std::collections::HashSet;
        let a = CaretPosition::new(2, 1, 3);
        let b = a.with_before_split(true);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_helpers() {
        let c = CaretPosition::new(3, 2, 4).with_before_split(true);
        assert_eq!(c.move_offset(2).offset, 6);
        assert_eq!(c.move_offset(-10).offset, 0);
        assert_eq!(c.next_element(), CaretPosition::new(3, 3, 0));
        assert!(!c.next_element().before_split);
        assert_eq!(c.next_paragraph(), CaretPosition::new(4, 0, 0));
        assert_eq!(c.with_offset(1), CaretPosition::new(3, 2, 1));
    }

    #[test]
    fn test_selection_normalizes() {
        let a = CaretPosition::new(4, 0, 0);
        let b = CaretPosition::new(1, 2, 3);
        let sel = Selection::new(a, b);
        assert_eq!(sel.start, b);
        assert_eq!(sel.end, a);
        assert!(sel.contains_paragraph(1));
        assert!(sel.contains_paragraph(3));
        assert!(!sel.contains_paragraph(5));
        assert!(!sel.is_empty());
        assert!(Selection::new(a, a).is_empty());
    }
}
