//! Connection: an undirected visualization link between two points.

use serde::{Deserialize, Serialize};
use super::PointId;

/// Opaque connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnId(pub u32);

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical pair: `a <= b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnId,
    pub a: PointId,
    pub b: PointId,
}

impl Connection {
    pub fn new(id: ConnId, p: PointId, q: PointId) -> Self {
        let (a, b) = canonical_pair(p, q);
        Self { id, a, b }
    }

    pub fn touches(&self, id: PointId) -> bool {
        self.a == id || self.b == id
    }
}

/// Order a pair smaller-ID first.
pub fn canonical_pair(p: PointId, q: PointId) -> (PointId, PointId) {
    if p <= q { (p, q) } else { (q, p) }
}
