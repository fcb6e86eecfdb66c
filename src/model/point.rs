//! Point in the mesh sketch.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Opaque point identifier. Live IDs are unique; freed IDs are recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId(pub u32);

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 3D coordinate owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(id: PointId, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }

    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn set_position(&mut self, p: DVec3) {
        self.x = p.x;
        self.y = p.y;
        self.z = p.z;
    }
}
