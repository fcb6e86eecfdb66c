//! # blockmesh-rs: Block-Structured Hex Mesh Registry
//!
//! Build a block-structured volumetric mesh out of points, layers, curved
//! edges, hexahedral blocks and boundary patches, then export it as an
//! OpenFOAM `blockMeshDict`.
//!
//! ## Design Principles
//!
//! 1. **IDs, not pointers**: entities reference each other by typed ID;
//!    the [`MeshRegistry`] resolves and cascades deletions
//! 2. **Clean DTOs**: `Point`, `HexBlock`, `Patch`, ... are plain data
//! 3. **Pure kernels**: curve sampling and face topology are functions of
//!    their inputs
//! 4. **Deterministic export**: the same registry always renders the same
//!    bytes
//!
//! ## Quick Start
//!
//! ```rust
//! use blockmesh_rs::{ExportOptions, MeshRegistry, NormalDirection, FaceSide};
//!
//! let mut mesh = MeshRegistry::new();
//! let mut ids = Vec::new();
//! for z in [0.0, 1.0] {
//!     for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
//!         ids.push(mesh.add_point(x, y, Some(z), None));
//!     }
//! }
//! let block = mesh.add_hex_block(&ids).unwrap();
//! mesh.add_patch("walls", "wall", Vec::new(), NormalDirection::Outward);
//! assert!(mesh.assign_face("walls", block, FaceSide::Bottom));
//!
//! let dict = mesh.render_block_mesh_dict(&ExportOptions::default());
//! assert!(dict.contains("hex (0 1 2 3 4 5 6 7) (1 1 1) simpleGrading (1.0 1.0 1.0)"));
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod geometry;
pub mod registry;
pub mod topology;
pub mod validate;
pub mod export;
pub mod document;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Point, PointId, Layer, Connection, ConnId, Edge, EdgeId, EdgeKind, EndpointRef,
    HexBlock, BlockId, Divisions, Grading, GradingKind,
    Patch, PatchFace, PatchType, NormalDirection,
    ProjectSpecs, SketchPlane, UnitSystem,
};

// ============================================================================
// Re-exports: Registry, topology, export
// ============================================================================

pub use registry::{MeshRegistry, MeshSummary};
pub use topology::{BlockFace, FaceSide, FaceTopology};
pub use validate::ValidationIssue;
pub use export::{export_block_mesh_dict, render_block_mesh_dict, ExportOptions};
pub use document::{export_to_document, load_from_document, LoadReport};

impl MeshRegistry {
    /// See [`render_block_mesh_dict`].
    pub fn render_block_mesh_dict(&self, opts: &ExportOptions) -> String {
        export::render_block_mesh_dict(self, opts)
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Thread-safe handle around one registry.
///
/// Every mutation takes the single write lock, so a cascading delete is
/// never observed half-done. Exports run on a snapshot cloned under the
/// read lock and do not hold it while rendering.
#[derive(Debug, Clone, Default)]
pub struct SharedMesh {
    inner: Arc<RwLock<MeshRegistry>>,
}

impl SharedMesh {
    pub fn new(registry: MeshRegistry) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)) }
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut MeshRegistry) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&MeshRegistry) -> R) -> R {
        f(&self.inner.read())
    }

    /// Clone the current state.
    pub fn snapshot(&self) -> MeshRegistry {
        self.inner.read().clone()
    }

    /// Export the current state to `writer`.
    pub fn export(&self, opts: &ExportOptions, writer: &mut dyn std::io::Write) -> Result<()> {
        let snapshot = self.snapshot();
        export_block_mesh_dict(&snapshot, opts, writer)
    }

    /// Persist the current state as a project document.
    pub fn to_document(&self) -> serde_json::Value {
        self.read(export_to_document)
    }
}

impl From<MeshRegistry> for SharedMesh {
    fn from(registry: MeshRegistry) -> Self {
        Self::new(registry)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Document error in section '{section}': {message}")]
    Document { section: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
