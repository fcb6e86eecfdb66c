//! # Mesh Model
//!
//! Clean DTOs for the block-mesh sketch: points, layers, connections,
//! curved edges, hex blocks, patches and project settings.
//!
//! Design rule: entities refer to each other only by ID. Nothing here
//! holds another entity by value or by reference; the registry resolves.
//! This module is pure data with no I/O and no state.

pub mod point;
pub mod layer;
pub mod connection;
pub mod edge;
pub mod block;
pub mod patch;
pub mod specs;

pub use point::{Point, PointId};
pub use layer::{Layer, DEFAULT_LAYER};
pub use connection::{canonical_pair, ConnId, Connection};
pub use edge::{Edge, EdgeId, EdgeKind, EndpointRef};
pub use block::{
    BlockId, Divisions, Grading, GradingKind, HexBlock,
    distinct_point_count, HEX_VERTEX_COUNT, MIN_BLOCK_POINTS,
};
pub use patch::{NormalDirection, Patch, PatchFace, PatchType};
pub use specs::{ProjectSpecs, SketchPlane, UnitSystem};
