//! Layer: a named group of points sharing one depth value.

use serde::{Deserialize, Serialize};
use super::PointId;

/// Name of the layer every fresh registry starts with.
pub const DEFAULT_LAYER: &str = "Layer 0";

/// A layer references points by ID; it does not own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// Coordinate along the sketch plane's depth axis.
    pub depth: f64,
    /// Members in insertion order, no duplicates.
    pub point_refs: Vec<PointId>,
}

impl Layer {
    pub fn new(name: impl Into<String>, depth: f64) -> Self {
        Self {
            name: name.into(),
            depth,
            point_refs: Vec::new(),
        }
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.point_refs.contains(&id)
    }

    /// Append `id` unless already a member. Returns true if it was added.
    pub fn insert(&mut self, id: PointId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.point_refs.push(id);
        true
    }

    pub fn remove(&mut self, id: PointId) -> bool {
        let before = self.point_refs.len();
        self.point_refs.retain(|p| *p != id);
        self.point_refs.len() != before
    }
}
