//! # Entity Registry
//!
//! The single owner of every mesh entity. All cross-references are IDs
//! resolved here at read time; nothing holds another entity directly.
//!
//! ## Contract
//!
//! - `add_*` operations validate every referenced ID first and return a
//!   sentinel (`None` / `false`) instead of failing. No partial state is
//!   left behind on rejection.
//! - Deleting a point cascades through layers, connections, edges, hex
//!   blocks and patches, so no entity is ever left pointing at a dead ID.
//! - Point IDs are recycled smallest-first; every other kind mints
//!   monotonically.
//! - Iteration is always in ascending ID (or name) order.

mod ids;
mod blocks;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use glam::DVec3;
use tracing::debug;

use crate::geometry;
use crate::model::*;
use crate::topology::FaceTopology;

pub use ids::{IdCounter, IdPool, MAX_RESTORED_ID};

// ============================================================================
// Summary
// ============================================================================

/// Entity totals, for status displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshSummary {
    pub points: usize,
    pub layers: usize,
    pub connections: usize,
    pub edges: usize,
    pub blocks: usize,
    pub patches: usize,
    /// Σ nx·ny·nz over all blocks.
    pub cells: u64,
}

// ============================================================================
// MeshRegistry
// ============================================================================

/// In-memory store of the whole mesh sketch.
#[derive(Debug, Clone)]
pub struct MeshRegistry {
    points: BTreeMap<PointId, Point>,
    point_ids: IdPool,
    layers: BTreeMap<String, Layer>,
    current_layer: Option<String>,
    connections: BTreeMap<ConnId, Connection>,
    conn_ids: IdCounter,
    edges: BTreeMap<EdgeId, Edge>,
    edge_ids: IdCounter,
    blocks: BTreeMap<BlockId, HexBlock>,
    block_ids: IdCounter,
    patches: BTreeMap<String, Patch>,
    specs: ProjectSpecs,
    /// Derived faces; reset on every change to the block set.
    faces: OnceLock<Arc<FaceTopology>>,
}

impl MeshRegistry {
    /// Empty registry with the default layer selected.
    pub fn new() -> Self {
        Self::with_specs(ProjectSpecs::default())
    }

    pub fn with_specs(specs: ProjectSpecs) -> Self {
        let mut reg = Self {
            points: BTreeMap::new(),
            point_ids: IdPool::new(),
            layers: BTreeMap::new(),
            current_layer: None,
            connections: BTreeMap::new(),
            conn_ids: IdCounter::new(),
            edges: BTreeMap::new(),
            edge_ids: IdCounter::new(),
            blocks: BTreeMap::new(),
            block_ids: IdCounter::new(),
            patches: BTreeMap::new(),
            specs,
            faces: OnceLock::new(),
        };
        reg.init_default_layer();
        reg
    }

    fn init_default_layer(&mut self) {
        self.add_layer(DEFAULT_LAYER, 0.0);
        self.current_layer = Some(DEFAULT_LAYER.to_string());
    }

    /// Drop all geometry and reset every counter. Specs are kept.
    pub fn clear(&mut self) {
        *self = Self::with_specs(std::mem::take(&mut self.specs));
    }

    // ========================================================================
    // Specs
    // ========================================================================

    pub fn specs(&self) -> &ProjectSpecs {
        &self.specs
    }

    pub fn specs_mut(&mut self) -> &mut ProjectSpecs {
        &mut self.specs
    }

    /// Multiplier for the exported `scale` entry.
    pub fn scale_value(&self) -> f64 {
        self.specs.scale_value()
    }

    fn depth_axis(&self) -> usize {
        self.specs.sketch_plane.depth_axis()
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Create a point.
    ///
    /// With `z` omitted the depth comes from `layer`, or from the current
    /// layer when no layer is named; the point then also joins that
    /// layer. A named layer always gains the point as a member.
    pub fn add_point(&mut self, x: f64, y: f64, z: Option<f64>, layer: Option<&str>) -> PointId {
        let layer = match (z, layer) {
            (_, Some(name)) => Some(name.to_string()),
            (None, None) => self.current_layer.clone(),
            (Some(_), None) => None,
        };
        let z = z.unwrap_or_else(|| {
            layer.as_deref().map_or(0.0, |name| self.layer_depth(name).unwrap_or(0.0))
        });

        let id = PointId(self.point_ids.allocate());
        self.points.insert(id, Point::new(id, x, y, z));

        if let Some(l) = layer.and_then(|name| self.layers.get_mut(&name)) {
            l.insert(id);
        }
        id
    }

    /// Create a point from in-plane sketch coordinates `(u, v)` on a
    /// layer. The depth coordinate is the layer's depth along the sketch
    /// plane's normal axis. Returns `None` for an unknown layer.
    pub fn add_sketch_point(&mut self, u: f64, v: f64, layer: &str) -> Option<PointId> {
        let depth = self.layer_depth(layer)?;
        let p = match self.specs.sketch_plane {
            SketchPlane::XY => DVec3::new(u, v, depth),
            SketchPlane::YZ => DVec3::new(depth, u, v),
            SketchPlane::ZX => DVec3::new(v, depth, u),
        };
        Some(self.add_point(p.x, p.y, Some(p.z), Some(layer)))
    }

    /// Delete a point and every reference to it.
    pub fn remove_point(&mut self, id: PointId) -> bool {
        if self.points.remove(&id).is_none() {
            return false;
        }

        for layer in self.layers.values_mut() {
            layer.remove(id);
        }

        let conns_before = self.connections.len();
        self.connections.retain(|_, c| !c.touches(id));

        let edges_before = self.edges.len();
        self.edges.retain(|_, e| !e.references(id));

        let mut blocks_touched = false;
        self.blocks.retain(|_, block| {
            if !block.point_refs.contains(&id) {
                return true;
            }
            blocks_touched = true;
            block.point_refs.retain(|p| *p != id);
            block.has_min_points()
        });
        if blocks_touched {
            self.invalidate_faces();
        }

        for patch in self.patches.values_mut() {
            for face in &mut patch.faces {
                face.point_ids.retain(|p| *p != id);
            }
            patch.faces.retain(|f| !f.point_ids.is_empty());
        }

        self.point_ids.release(id.0);
        debug!(
            point = %id,
            connections = conns_before - self.connections.len(),
            edges = edges_before - self.edges.len(),
            "point removed"
        );
        true
    }

    pub fn get_point(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn point_position(&self, id: PointId) -> Option<DVec3> {
        self.points.get(&id).map(Point::position)
    }

    pub fn contains_point(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    /// Overwrite the given coordinates. Returns false for an unknown ID.
    pub fn update_point(&mut self, id: PointId, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> bool {
        let Some(p) = self.points.get_mut(&id) else { return false };
        if let Some(x) = x { p.x = x; }
        if let Some(y) = y { p.y = y; }
        if let Some(z) = z { p.z = z; }
        true
    }

    /// Live points in ascending ID order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.values()
    }

    /// Recycled point IDs, in reissue order.
    pub fn recycled_point_ids(&self) -> Vec<PointId> {
        self.point_ids.recycled().map(PointId).collect()
    }

    /// Dense 0-based index for every live point, in ascending ID order.
    /// Exported blocks and patches refer to vertices through this map.
    pub fn get_point_index_map(&self) -> BTreeMap<PointId, usize> {
        self.points.keys().enumerate().map(|(i, id)| (*id, i)).collect()
    }

    fn set_depth(&mut self, id: PointId, depth: f64) {
        let axis = self.depth_axis();
        if let Some(p) = self.points.get_mut(&id) {
            let mut pos = p.position();
            pos[axis] = depth;
            p.set_position(pos);
        }
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Create a layer, replacing any layer of the same name.
    pub fn add_layer(&mut self, name: &str, depth: f64) -> &Layer {
        self.layers.insert(name.to_string(), Layer::new(name, depth));
        &self.layers[name]
    }

    /// Delete a layer. Its points survive.
    pub fn remove_layer(&mut self, name: &str) -> bool {
        if self.layers.remove(name).is_none() {
            return false;
        }
        if self.current_layer.as_deref() == Some(name) {
            self.current_layer = self.layers.keys().next().cloned();
        }
        true
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn layer_depth(&self, name: &str) -> Option<f64> {
        self.layers.get(name).map(|l| l.depth)
    }

    /// Change a layer's depth and move every member point with it.
    pub fn set_layer_depth(&mut self, name: &str, depth: f64) -> bool {
        let Some(layer) = self.layers.get_mut(name) else { return false };
        layer.depth = depth;
        let members = layer.point_refs.clone();
        for id in members {
            self.set_depth(id, depth);
        }
        true
    }

    /// Add an existing point to a layer, snapping it to the layer depth.
    pub fn add_point_to_layer(&mut self, id: PointId, name: &str) -> bool {
        if !self.points.contains_key(&id) {
            return false;
        }
        let Some(layer) = self.layers.get_mut(name) else { return false };
        if layer.insert(id) {
            let depth = layer.depth;
            self.set_depth(id, depth);
        }
        true
    }

    pub fn remove_point_from_layer(&mut self, id: PointId, name: &str) -> bool {
        self.layers.get_mut(name).is_some_and(|l| l.remove(id))
    }

    pub fn current_layer(&self) -> Option<&str> {
        self.current_layer.as_deref()
    }

    pub fn set_current_layer(&mut self, name: &str) -> bool {
        if !self.layers.contains_key(name) {
            return false;
        }
        self.current_layer = Some(name.to_string());
        true
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Link two points. Order does not matter; an existing link between
    /// the same pair is returned as-is.
    pub fn add_connection(&mut self, a: PointId, b: PointId) -> Option<ConnId> {
        if !self.points.contains_key(&a) || !self.points.contains_key(&b) {
            return None;
        }
        let (a, b) = canonical_pair(a, b);
        if let Some(existing) = self.connections.values().find(|c| c.a == a && c.b == b) {
            return Some(existing.id);
        }
        let id = ConnId(self.conn_ids.mint());
        self.connections.insert(id, Connection::new(id, a, b));
        Some(id)
    }

    pub fn remove_connection(&mut self, id: ConnId) -> bool {
        self.connections.remove(&id).is_some()
    }

    pub fn connection(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Define a curve. Rejected when a referenced point is unknown, a
    /// literal is not finite, or the intermediate count does not suit
    /// the kind (line: none, arc: exactly one).
    pub fn add_edge(
        &mut self,
        kind: EdgeKind,
        start: EndpointRef,
        end: EndpointRef,
        intermediate: Vec<EndpointRef>,
    ) -> Option<EdgeId> {
        if !kind.accepts_intermediates(intermediate.len()) {
            return None;
        }
        let valid = |r: &EndpointRef| match r {
            EndpointRef::Point(id) => self.points.contains_key(id),
            EndpointRef::Literal(c) => c.iter().all(|v| v.is_finite()),
        };
        if !valid(&start) || !valid(&end) || !intermediate.iter().all(valid) {
            return None;
        }

        let id = EdgeId(self.edge_ids.mint());
        self.edges.insert(id, Edge { id, kind, start, end, intermediate });
        Some(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.edges.remove(&id).is_some()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Coordinates of an endpoint, if it resolves.
    pub fn resolve(&self, r: &EndpointRef) -> Option<DVec3> {
        match r {
            EndpointRef::Point(id) => self.point_position(*id),
            EndpointRef::Literal([x, y, z]) => Some(DVec3::new(*x, *y, *z)),
        }
    }

    /// Sample an edge for display. `segments` is per arc, or per span
    /// for splines; lines and polylines ignore it.
    pub fn sample_edge(&self, id: EdgeId, segments: usize) -> Option<Vec<DVec3>> {
        let edge = self.edges.get(&id)?;
        let controls: Vec<DVec3> = edge
            .control_refs()
            .map(|r| self.resolve(r))
            .collect::<Option<_>>()?;
        let (first, last) = (controls[0], controls[controls.len() - 1]);

        let pts = match edge.kind {
            EdgeKind::Line => geometry::line_points(first, last),
            EdgeKind::Arc => geometry::arc_points(first, controls[1], last, segments),
            EdgeKind::Spline => geometry::catmull_rom_spline(&controls, segments),
            EdgeKind::PolyLine => geometry::polyline_points(&controls),
        };
        Some(pts)
    }

    // ========================================================================
    // Summary
    // ========================================================================

    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            points: self.points.len(),
            layers: self.layers.len(),
            connections: self.connections.len(),
            edges: self.edges.len(),
            blocks: self.blocks.len(),
            patches: self.patches.len(),
            cells: self.blocks.values().map(|b| b.divisions.cells()).sum(),
        }
    }

    // ========================================================================
    // Restore (document load)
    // ========================================================================

    /// Start an empty registry for loading; no default layer.
    pub(crate) fn empty_for_restore(specs: ProjectSpecs) -> Self {
        let mut reg = Self::with_specs(specs);
        reg.layers.clear();
        reg.current_layer = None;
        reg
    }

    pub(crate) fn restore_point(&mut self, point: Point) {
        self.points.insert(point.id, point);
    }

    pub(crate) fn restore_layer(&mut self, layer: Layer) {
        self.layers.insert(layer.name.clone(), layer);
    }

    pub(crate) fn restore_connection(&mut self, conn: Connection) {
        self.conn_ids.observe(conn.id.0);
        self.connections.insert(conn.id, conn);
    }

    pub(crate) fn restore_edge(&mut self, edge: Edge) {
        self.edge_ids.observe(edge.id.0);
        self.edges.insert(edge.id, edge);
    }

    pub(crate) fn restore_block(&mut self, block: HexBlock) {
        self.block_ids.observe(block.id.0);
        self.blocks.insert(block.id, block);
        self.invalidate_faces();
    }

    pub(crate) fn restore_patch(&mut self, patch: Patch) {
        self.patches.insert(patch.name.clone(), patch);
    }

    /// Rebuild the point ID pool and pick a current layer.
    pub(crate) fn finish_restore(&mut self) {
        self.point_ids = IdPool::from_live(self.points.keys().map(|id| id.0));
        if self.layers.is_empty() {
            self.init_default_layer();
        } else {
            self.current_layer = self.layers.keys().next().cloned();
        }
    }
}

impl Default for MeshRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
