//! Edge: a typed curve between two endpoints.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use super::PointId;

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Curve type. Keywords match the blockMesh `edges` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "arc")]
    Arc,
    #[serde(rename = "spline")]
    Spline,
    #[serde(rename = "polyLine")]
    PolyLine,
}

impl EdgeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            EdgeKind::Line => "line",
            EdgeKind::Arc => "arc",
            EdgeKind::Spline => "spline",
            EdgeKind::PolyLine => "polyLine",
        }
    }

    /// Whether `n` intermediate points form a valid definition of this kind.
    pub fn accepts_intermediates(self, n: usize) -> bool {
        match self {
            EdgeKind::Line => n == 0,
            EdgeKind::Arc => n == 1,
            EdgeKind::Spline | EdgeKind::PolyLine => true,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(EdgeKind::Line),
            "arc" => Ok(EdgeKind::Arc),
            "spline" => Ok(EdgeKind::Spline),
            "polyline" => Ok(EdgeKind::PolyLine),
            other => Err(format!("unknown edge type '{other}'")),
        }
    }
}

/// An edge endpoint: either a registry point or a free coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EndpointRef {
    #[serde(rename = "id")]
    Point(PointId),
    #[serde(rename = "at")]
    Literal([f64; 3]),
}

impl EndpointRef {
    pub fn literal(p: DVec3) -> Self {
        EndpointRef::Literal([p.x, p.y, p.z])
    }

    pub fn point_id(&self) -> Option<PointId> {
        match self {
            EndpointRef::Point(id) => Some(*id),
            EndpointRef::Literal(_) => None,
        }
    }
}

impl From<PointId> for EndpointRef {
    fn from(id: PointId) -> Self {
        EndpointRef::Point(id)
    }
}

impl From<DVec3> for EndpointRef {
    fn from(p: DVec3) -> Self {
        EndpointRef::literal(p)
    }
}

/// A curve definition. Intermediates are ordered start → end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub start: EndpointRef,
    pub end: EndpointRef,
    pub intermediate: Vec<EndpointRef>,
}

impl Edge {
    /// All endpoint refs in definition order: start, intermediates, end.
    pub fn control_refs(&self) -> impl Iterator<Item = &EndpointRef> {
        std::iter::once(&self.start)
            .chain(self.intermediate.iter())
            .chain(std::iter::once(&self.end))
    }

    pub fn references(&self, id: PointId) -> bool {
        self.control_refs().any(|r| r.point_id() == Some(id))
    }
}
