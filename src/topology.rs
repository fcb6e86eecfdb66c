//! # Face Topology
//!
//! Derives the six quad faces of every complete hex block and classifies
//! each as *internal* (shared with another block, hidden) or *boundary*
//! (exposed, can be assigned to a patch).
//!
//! Two blocks sharing a face produce two records with the same vertex set
//! but possibly different winding, so adjacency is tested on a canonical
//! key (the sorted point IDs) and counted in one hash pass.

use std::fmt;

use hashbrown::HashMap;
use tracing::warn;

use crate::model::{BlockId, HexBlock, PointId};

/// Sorted point IDs of a face, independent of winding.
pub type FaceKey = [PointId; 4];

/// The six sides of a hex block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaceSide {
    Bottom,
    Top,
    Front,
    Back,
    Left,
    Right,
}

impl FaceSide {
    pub const ALL: [FaceSide; 6] = [
        FaceSide::Bottom,
        FaceSide::Top,
        FaceSide::Front,
        FaceSide::Back,
        FaceSide::Left,
        FaceSide::Right,
    ];

    /// Local vertex indices, wound outward.
    pub fn local_indices(self) -> [usize; 4] {
        match self {
            FaceSide::Bottom => [0, 3, 2, 1],
            FaceSide::Top => [4, 5, 6, 7],
            FaceSide::Front => [0, 1, 5, 4],
            FaceSide::Back => [2, 3, 7, 6],
            FaceSide::Left => [0, 4, 7, 3],
            FaceSide::Right => [1, 2, 6, 5],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceSide::Bottom => "bottom",
            FaceSide::Top => "top",
            FaceSide::Front => "front",
            FaceSide::Back => "back",
            FaceSide::Left => "left",
            FaceSide::Right => "right",
        }
    }
}

impl fmt::Display for FaceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical adjacency key for four point IDs.
pub fn face_key(ids: [PointId; 4]) -> FaceKey {
    let mut key = ids;
    key.sort_unstable();
    key
}

/// One derived face of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFace {
    pub block: BlockId,
    pub side: FaceSide,
    /// Global point IDs in the side's winding order.
    pub point_ids: [PointId; 4],
    pub key: FaceKey,
    /// Shared with at least one other face.
    pub internal: bool,
}

impl BlockFace {
    pub fn is_boundary(&self) -> bool {
        !self.internal
    }
}

/// Faces of all blocks with their visibility, in ascending block order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceTopology {
    faces: Vec<BlockFace>,
    /// Position in `faces` of each block side.
    by_side: HashMap<(BlockId, FaceSide), usize>,
    overlapping: Vec<(FaceKey, usize)>,
}

impl FaceTopology {
    /// Classify the faces of `blocks`. Blocks without exactly eight
    /// references contribute nothing.
    pub fn compute<'a>(blocks: impl IntoIterator<Item = &'a HexBlock>) -> Self {
        let mut faces = Vec::new();
        for block in blocks {
            let Some(verts) = block.vertices() else { continue };
            for side in FaceSide::ALL {
                let point_ids = side.local_indices().map(|i| verts[i]);
                faces.push(BlockFace {
                    block: block.id,
                    side,
                    point_ids,
                    key: face_key(point_ids),
                    internal: false,
                });
            }
        }

        let mut counts: HashMap<FaceKey, usize> = HashMap::with_capacity(faces.len());
        for face in &faces {
            *counts.entry(face.key).or_insert(0) += 1;
        }

        for face in &mut faces {
            face.internal = counts[&face.key] >= 2;
        }

        let mut overlapping: Vec<(FaceKey, usize)> = counts
            .into_iter()
            .filter(|&(_, n)| n >= 3)
            .collect();
        overlapping.sort_unstable();
        for (key, n) in &overlapping {
            warn!(?key, blocks = n, "face shared by more than two blocks; mesh overlaps");
        }

        let by_side = faces
            .iter()
            .enumerate()
            .map(|(i, f)| ((f.block, f.side), i))
            .collect();

        Self { faces, by_side, overlapping }
    }

    pub fn faces(&self) -> &[BlockFace] {
        &self.faces
    }

    pub fn boundary_faces(&self) -> impl Iterator<Item = &BlockFace> {
        self.faces.iter().filter(|f| f.is_boundary())
    }

    pub fn internal_faces(&self) -> impl Iterator<Item = &BlockFace> {
        self.faces.iter().filter(|f| f.internal)
    }

    pub fn boundary_count(&self) -> usize {
        self.boundary_faces().count()
    }

    pub fn face(&self, block: BlockId, side: FaceSide) -> Option<&BlockFace> {
        self.by_side.get(&(block, side)).map(|&i| &self.faces[i])
    }

    /// Keys shared by three or more faces, with their counts.
    pub fn overlapping_keys(&self) -> &[(FaceKey, usize)] {
        &self.overlapping
    }
}
