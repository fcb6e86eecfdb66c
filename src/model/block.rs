//! Hexahedral block definitions.
//!
//! Vertex convention: indices 0-3 are the bottom face, 4-7 the top face,
//! both counter-clockwise seen from outside; vertical edges are
//! 0-4, 1-5, 2-6, 3-7.

use std::fmt;

use serde::{Deserialize, Serialize};
use super::PointId;

/// Number of vertex references in a complete hex block.
pub const HEX_VERTEX_COUNT: usize = 8;

/// Blocks falling below this many distinct references are dropped.
pub const MIN_BLOCK_POINTS: usize = 4;

/// Number of different points in `refs`.
pub fn distinct_point_count(refs: &[PointId]) -> usize {
    let mut ids = refs.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

/// Opaque block identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cell counts along the block's local x, y, z axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divisions {
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl Divisions {
    pub fn new(nx: u32, ny: u32, nz: u32) -> Self {
        Self { nx, ny, nz }
    }

    pub fn cells(&self) -> u64 {
        u64::from(self.nx) * u64::from(self.ny) * u64::from(self.nz)
    }
}

impl Default for Divisions {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Grading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradingKind {
    #[serde(rename = "simpleGrading")]
    Simple,
    #[serde(rename = "edgeGrading")]
    Edge,
}

impl GradingKind {
    pub fn keyword(self) -> &'static str {
        match self {
            GradingKind::Simple => "simpleGrading",
            GradingKind::Edge => "edgeGrading",
        }
    }
}

/// Expansion ratios per local axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grading {
    pub kind: GradingKind,
    pub ratios: [f64; 3],
}

impl Grading {
    pub fn simple(gx: f64, gy: f64, gz: f64) -> Self {
        Self { kind: GradingKind::Simple, ratios: [gx, gy, gz] }
    }

    pub fn edge(gx: f64, gy: f64, gz: f64) -> Self {
        Self { kind: GradingKind::Edge, ratios: [gx, gy, gz] }
    }
}

impl Default for Grading {
    fn default() -> Self {
        Self::simple(1.0, 1.0, 1.0)
    }
}

/// A hex block referencing its vertices by point ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexBlock {
    pub id: BlockId,
    pub point_refs: Vec<PointId>,
    pub divisions: Divisions,
    pub grading: Grading,
}

impl HexBlock {
    pub fn new(id: BlockId, point_refs: Vec<PointId>) -> Self {
        Self {
            id,
            point_refs,
            divisions: Divisions::default(),
            grading: Grading::default(),
        }
    }

    pub fn with_divisions(mut self, divisions: Divisions) -> Self {
        self.divisions = divisions;
        self
    }

    pub fn with_grading(mut self, grading: Grading) -> Self {
        self.grading = grading;
        self
    }

    /// True when the block has exactly eight vertex references.
    pub fn is_complete(&self) -> bool {
        self.point_refs.len() == HEX_VERTEX_COUNT
    }

    /// Enough distinct vertices left to stay a block.
    pub fn has_min_points(&self) -> bool {
        distinct_point_count(&self.point_refs) >= MIN_BLOCK_POINTS
    }

    /// The eight refs as a fixed array, if complete.
    pub fn vertices(&self) -> Option<[PointId; HEX_VERTEX_COUNT]> {
        self.point_refs.as_slice().try_into().ok()
    }
}
