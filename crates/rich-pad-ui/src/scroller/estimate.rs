use std::collections::HashMap;
use std::hash::Hash;

/// Running average of the heights of every row materialized so far.
#[derive(Debug, Clone)]
pub struct HeightEstimate<Id> {
    heights: HashMap<Id, f32>,
    sum: f32,
}

impl<Id> Default for HeightEstimate<Id> {
    fn default() -> Self {
        Self {
            heights: HashMap::new(),
            sum: 0.0,
        }
    }
}

impl<Id: Copy + Eq + Hash> HeightEstimate<Id> {
    /// Records the height of `id`, replacing an earlier record.
    pub fn add(&mut self, id: Id, height: f32) {
        if let Some(old) = self.heights.insert(id, height) {
            self.sum -= old;
        }
        self.sum += height;
    }

    pub fn remove(&mut self, id: Id) -> Option<f32> {
        let old = self.heights.remove(&id)?;
        self.sum -= old;
        Some(old)
    }

    pub fn get(&self, id: Id) -> Option<f32> {
        self.heights.get(&id).copied()
    }

    /// Renames every recorded id; ids mapped to `None` are forgotten.
    pub fn reindex(&mut self, reindex: &dyn Fn(Id) -> Option<Id>) {
        let old = std::mem::take(&mut self.heights);
        self.sum = 0.0;
        for (id, height) in old {
            if let Some(id) = reindex(id) {
                self.add(id, height);
            }
        }
    }

    pub fn average(&self) -> Option<f32> {
        if self.heights.is_empty() {
            None
        } else {
            Some(self.sum / self.heights.len() as f32)
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn clear(&mut self) {
        self.heights.clear();
        self.sum = 0.0;
    }
}
