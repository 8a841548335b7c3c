//! Contracts between the scroller and what it scrolls.

use std::fmt::Debug;
use std::hash::Hash;

use egui::Pos2;

use crate::surface::{PaintSurface, Palette};

/// One materialized row.
pub trait Row {
    type Hit;

    fn height(&self) -> f32;

    /// Paints the row with its top-left corner at `origin`.
    fn paint(&self, surface: &mut dyn PaintSurface, origin: Pos2, palette: &Palette);

    /// Resolves a point relative to the row's top-left corner.
    fn hit_test(&self, pos: Pos2) -> Option<Self::Hit>;
}

/// A lazy, restartable sequence of rows.
///
/// Only [`RowModel::get`] materializes anything; navigation is by id.
/// The approximate functions map between ids and a numeric position and
/// are only used to seed scrolling.
pub trait RowModel {
    type Id: Copy + Eq + Ord + Hash + Debug;
    type Row: Row;

    fn get(&self, id: Self::Id) -> Option<Self::Row>;
    fn first_pos(&self) -> Option<Self::Id>;
    fn next_pos(&self, id: Self::Id) -> Option<Self::Id>;
    fn prev_pos(&self, id: Self::Id) -> Option<Self::Id>;
    fn last_pos(&self) -> Option<Self::Id>;
    fn approximate_count(&self) -> usize;
    /// Id near numeric position `index`, clamped into the model.
    fn approximate_pos(&self, index: usize) -> Option<Self::Id>;
    /// Numeric position of `id`.
    fn approximate_index(&self, id: Self::Id) -> usize;
}

/// Maps stored ids across a structural change. `None` means the row is gone.
pub type Reindex<'a, Id> = &'a dyn Fn(Id) -> Option<Id>;

/// Reindexing for a row inserted at `inserted`.
pub fn reindex_after_insert(inserted: usize) -> impl Fn(usize) -> Option<usize> {
    move |id| Some(if inserted <= id { id + 1 } else { id })
}

/// Reindexing for the row removed from `removed`.
pub fn reindex_after_remove(removed: usize) -> impl Fn(usize) -> Option<usize> {
    move |id| match id.cmp(&removed) {
        std::cmp::Ordering::Less => Some(id),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(id - 1),
    }
}
