//! Boundary patches.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use super::PointId;

/// Boundary-condition type. Known blockMesh types get their own variant;
/// any other string is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatchType {
    Patch,
    Wall,
    SymmetryPlane,
    Symmetry,
    Empty,
    Wedge,
    Cyclic,
    CyclicAmi,
    Custom(String),
}

impl PatchType {
    /// Every known type, in menu order.
    pub const KNOWN: [PatchType; 8] = [
        PatchType::Patch,
        PatchType::Wall,
        PatchType::SymmetryPlane,
        PatchType::Symmetry,
        PatchType::Empty,
        PatchType::Wedge,
        PatchType::Cyclic,
        PatchType::CyclicAmi,
    ];

    pub fn keyword(&self) -> &str {
        match self {
            PatchType::Patch => "patch",
            PatchType::Wall => "wall",
            PatchType::SymmetryPlane => "symmetryPlane",
            PatchType::Symmetry => "symmetry",
            PatchType::Empty => "empty",
            PatchType::Wedge => "wedge",
            PatchType::Cyclic => "cyclic",
            PatchType::CyclicAmi => "cyclicAMI",
            PatchType::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PatchType::Custom(_))
    }
}

impl From<&str> for PatchType {
    fn from(s: &str) -> Self {
        let s = s.trim();
        PatchType::KNOWN
            .into_iter()
            .find(|t| t.keyword() == s)
            .unwrap_or_else(|| PatchType::Custom(s.to_string()))
    }
}

impl From<String> for PatchType {
    fn from(s: String) -> Self {
        PatchType::from(s.as_str())
    }
}

impl From<PatchType> for String {
    fn from(t: PatchType) -> Self {
        t.keyword().to_string()
    }
}

impl Default for PatchType {
    fn default() -> Self {
        PatchType::Patch
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Orientation of a patch's faces. Persisted as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum NormalDirection {
    #[default]
    Outward,
    Inward,
}

impl From<i64> for NormalDirection {
    fn from(v: i64) -> Self {
        if v < 0 { NormalDirection::Inward } else { NormalDirection::Outward }
    }
}

impl From<NormalDirection> for i64 {
    fn from(n: NormalDirection) -> Self {
        match n {
            NormalDirection::Outward => 1,
            NormalDirection::Inward => -1,
        }
    }
}

/// One quad of a patch, as point IDs in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PatchFace {
    pub point_ids: SmallVec<[PointId; 4]>,
}

impl PatchFace {
    pub fn new(ids: impl IntoIterator<Item = PointId>) -> Self {
        Self { point_ids: ids.into_iter().collect() }
    }

    pub fn is_quad(&self) -> bool {
        self.point_ids.len() == 4
    }

    pub fn reverse(&mut self) {
        self.point_ids.reverse();
    }
}

/// A named boundary surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    pub patch_type: PatchType,
    pub faces: Vec<PatchFace>,
    pub normal: NormalDirection,
}

impl Patch {
    pub fn new(name: impl Into<String>, patch_type: PatchType) -> Self {
        Self {
            name: name.into(),
            patch_type,
            faces: Vec::new(),
            normal: NormalDirection::Outward,
        }
    }
}
