//! Structural checks on hex blocks.
//!
//! Issues are warnings: the caller decides whether to export anyway.

use std::fmt;

use tracing::{info, warn};

use crate::model::{BlockId, PointId, HEX_VERTEX_COUNT};
use crate::registry::MeshRegistry;
use crate::topology::FaceKey;

/// A problem found in the block set.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Block does not have exactly eight vertex references.
    WrongVertexCount {
        block: BlockId,
        count: usize,
    },
    /// Some bottom vertex lies above some top vertex along the depth axis.
    BottomAboveTop {
        block: BlockId,
    },
    /// A vertex reference does not resolve to a live point.
    UnresolvedReference {
        block: BlockId,
        point: PointId,
    },
    /// The same point appears more than once in a block.
    DuplicateVertices {
        block: BlockId,
    },
    /// A face shared by three or more blocks.
    OverlappingFace {
        key: FaceKey,
        blocks: usize,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongVertexCount { block, count } => {
                write!(f, "Block {block}: has {count} point refs, expected {HEX_VERTEX_COUNT}")
            }
            Self::BottomAboveTop { block } => {
                write!(f, "Block {block}: bottom face lies above top face")
            }
            Self::UnresolvedReference { block, point } => {
                write!(f, "Block {block}: references missing point {point}")
            }
            Self::DuplicateVertices { block } => {
                write!(f, "Block {block}: has duplicate vertex references")
            }
            Self::OverlappingFace { key, blocks } => {
                write!(
                    f,
                    "Face ({} {} {} {}) is shared by {blocks} blocks",
                    key[0], key[1], key[2], key[3]
                )
            }
        }
    }
}

/// Check every hex block. Never fails; an empty list means no issues.
pub fn validate_hex_blocks(reg: &MeshRegistry) -> Vec<ValidationIssue> {
    let axis = reg.specs().sketch_plane.depth_axis();
    let mut issues = Vec::new();

    for block in reg.hex_blocks() {
        let Some(refs) = block.vertices() else {
            issues.push(ValidationIssue::WrongVertexCount {
                block: block.id,
                count: block.point_refs.len(),
            });
            continue;
        };

        let mut sorted = refs;
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            issues.push(ValidationIssue::DuplicateVertices { block: block.id });
        }

        if let Some(missing) = refs.iter().find(|id| !reg.contains_point(**id)) {
            issues.push(ValidationIssue::UnresolvedReference { block: block.id, point: *missing });
            continue;
        }

        let depths: Option<Vec<f64>> = refs
            .iter()
            .map(|id| reg.point_position(*id).map(|p| p[axis]))
            .collect();
        if let Some(d) = depths {
            let bottom_max = d[..4].iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let top_min = d[4..].iter().copied().fold(f64::INFINITY, f64::min);
            if bottom_max > top_min {
                issues.push(ValidationIssue::BottomAboveTop { block: block.id });
            }
        }
    }

    for &(key, blocks) in reg.faces().overlapping_keys() {
        issues.push(ValidationIssue::OverlappingFace { key, blocks });
    }

    if issues.is_empty() {
        info!(blocks = reg.summary().blocks, "hex block validation passed");
    } else {
        warn!("hex block validation found {} issue(s)", issues.len());
    }
    issues
}

impl MeshRegistry {
    /// See [`validate_hex_blocks`].
    pub fn validate_hex_blocks(&self) -> Vec<ValidationIssue> {
        validate_hex_blocks(self)
    }

    /// Validation issues as human-readable lines.
    pub fn validation_messages(&self) -> Vec<String> {
        validate_hex_blocks(self).iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(reg: &mut MeshRegistry, z0: f64, z1: f64) -> Vec<PointId> {
        let mut ids = Vec::new();
        for z in [z0, z1] {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                ids.push(reg.add_point(x, y, Some(z), None));
            }
        }
        ids
    }

    #[test]
    fn test_valid_block_has_no_issues() {
        let mut reg = MeshRegistry::new();
        let ids = cube(&mut reg, 0.0, 1.0);
        reg.add_hex_block(&ids).unwrap();
        assert!(reg.validate_hex_blocks().is_empty());
    }

    #[test]
    fn test_inverted_block() {
        let mut reg = MeshRegistry::new();
        let ids = cube(&mut reg, 1.0, 0.0);
        let b = reg.add_hex_block(&ids).unwrap();
        assert_eq!(reg.validate_hex_blocks(), vec![ValidationIssue::BottomAboveTop { block: b }]);
    }

    #[test]
    fn test_wrong_count_and_duplicates() {
        let mut reg = MeshRegistry::new();
        let ids = cube(&mut reg, 0.0, 1.0);
        let short = reg.add_hex_block(&ids[..6]).unwrap();
        let mut dup = ids.clone();
        dup[7] = dup[4];
        let doubled = reg.add_hex_block(&dup).unwrap();

        let msgs = reg.validation_messages();
        assert!(msgs.contains(&format!("Block {short}: has 6 point refs, expected 8")));
        assert!(msgs.contains(&format!("Block {doubled}: has duplicate vertex references")));
    }
}
