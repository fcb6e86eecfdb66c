//! Project document: the registry as a JSON object.
//!
//! ```text
//! {
//!   "Points":      { "Point 1": { "X": 0.0, "Y": 0.0, "Z": 0.0 }, ... },
//!   "Layers":      { "Layer 0": { "Depth": 0.0, "Points (Ref)": [1, 2] } },
//!   "Connections": { "Connection 1": { "Point 1": 1, "Point 2": 2 } },
//!   "Edges":       { "Edge 1": { "type": "arc", "Points": [{"id": 1}, {"id": 2}, {"at": [x, y, z]}] } },
//!   "Hexes":       { "Hex 1": { "Points": [1, ..., 8], "Divisions": [1, 1, 1], "Grading": {...} } },
//!   "Patches":     { "inlet": { "type": "patch", "Points": [[1, 2, 6, 5]], "Normal": 1 } },
//!   "Specs":       { "sketch_plane": "XY", "unit_system": "m", "unit_sci_exponent": "0" }
//! }
//! ```
//!
//! Edge `Points` are ordered start, end, intermediates. Reference lists
//! also load from their older string forms (see [`legacy`]).
//!
//! Loading is tolerant per entity: a malformed point, edge, block or
//! patch is skipped, logged, and listed in [`LoadReport::skipped`]. Only
//! a non-object root or a section that is not an object fails the load.

pub mod legacy;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::model::*;
use crate::registry::{MeshRegistry, MAX_RESTORED_ID};
use crate::{Error, Result};
use legacy::{FaceList, IdList, IdValue, RefList};

pub const POINTS: &str = "Points";
pub const LAYERS: &str = "Layers";
pub const CONNECTIONS: &str = "Connections";
pub const EDGES: &str = "Edges";
pub const HEXES: &str = "Hexes";
pub const PATCHES: &str = "Patches";
pub const SPECS: &str = "Specs";

/// What a load had to leave out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// One line per skipped entity: `"<section>/<key>: <reason>"`.
    pub skipped: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, section: &str, key: &str, reason: impl std::fmt::Display) {
        warn!(section, key, %reason, "document entity skipped");
        self.skipped.push(format!("{section}/{key}: {reason}"));
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Deserialize)]
struct PointRecord {
    #[serde(rename = "X", default)]
    x: f64,
    #[serde(rename = "Y", default)]
    y: f64,
    #[serde(rename = "Z", default)]
    z: f64,
}

#[derive(Debug, Deserialize)]
struct LayerRecord {
    #[serde(rename = "Points (Ref)", default)]
    points: IdList,
    #[serde(rename = "Depth")]
    depth: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConnectionRecord {
    #[serde(rename = "Point 1")]
    a: IdValue,
    #[serde(rename = "Point 2")]
    b: IdValue,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    #[serde(rename = "type", default = "default_edge_type")]
    kind: String,
    #[serde(rename = "Points")]
    points: RefList,
}

fn default_edge_type() -> String {
    EdgeKind::Line.keyword().to_string()
}

#[derive(Debug, Deserialize)]
struct HexRecord {
    #[serde(rename = "Points", default)]
    points: IdList,
    #[serde(rename = "Divisions")]
    divisions: Option<[u32; 3]>,
    #[serde(rename = "Grading")]
    grading: Option<Grading>,
}

#[derive(Debug, Deserialize)]
struct PatchRecord {
    #[serde(rename = "type", default)]
    patch_type: PatchType,
    #[serde(rename = "Points", default)]
    faces: FaceList,
    #[serde(rename = "Normal", default)]
    normal: NormalDirection,
}

// ============================================================================
// Export
// ============================================================================

/// Serialize the registry. Maps are key-sorted, so the same registry
/// always produces the same document.
pub fn export_to_document(reg: &MeshRegistry) -> Value {
    let points: Map<String, Value> = reg
        .points()
        .map(|p| (format!("Point {}", p.id), json!({ "X": p.x, "Y": p.y, "Z": p.z })))
        .collect();

    let layers: Map<String, Value> = reg
        .layers()
        .map(|l| {
            let refs: Vec<u32> = l.point_refs.iter().map(|id| id.0).collect();
            (l.name.clone(), json!({ "Depth": l.depth, "Points (Ref)": refs }))
        })
        .collect();

    let connections: Map<String, Value> = reg
        .connections()
        .map(|c| (format!("Connection {}", c.id), json!({ "Point 1": c.a.0, "Point 2": c.b.0 })))
        .collect();

    let edges: Map<String, Value> = reg
        .edges()
        .map(|e| {
            let refs: Vec<EndpointRef> = std::iter::once(e.start)
                .chain(std::iter::once(e.end))
                .chain(e.intermediate.iter().copied())
                .collect();
            (format!("Edge {}", e.id), json!({ "type": e.kind.keyword(), "Points": refs }))
        })
        .collect();

    let hexes: Map<String, Value> = reg
        .hex_blocks()
        .map(|b| {
            let refs: Vec<u32> = b.point_refs.iter().map(|id| id.0).collect();
            let d = b.divisions;
            (
                format!("Hex {}", b.id),
                json!({ "Points": refs, "Divisions": [d.nx, d.ny, d.nz], "Grading": b.grading }),
            )
        })
        .collect();

    let patches: Map<String, Value> = reg
        .patches()
        .map(|p| {
            let faces: Vec<Vec<u32>> = p
                .faces
                .iter()
                .map(|f| f.point_ids.iter().map(|id| id.0).collect())
                .collect();
            (
                p.name.clone(),
                json!({ "type": p.patch_type.keyword(), "Points": faces, "Normal": i64::from(p.normal) }),
            )
        })
        .collect();

    json!({
        POINTS: points,
        LAYERS: layers,
        CONNECTIONS: connections,
        EDGES: edges,
        HEXES: hexes,
        PATCHES: patches,
        SPECS: reg.specs(),
    })
}

/// [`export_to_document`] as pretty-printed JSON.
pub fn to_json_string(reg: &MeshRegistry) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_to_document(reg))?)
}

// ============================================================================
// Load
// ============================================================================

/// Rebuild a registry from a document.
///
/// ID counters resume after the highest loaded ID and the point pool
/// offers the gaps below it. References to points that did not load are
/// dropped; entities left invalid by that are skipped.
pub fn load_from_document(doc: &Value) -> Result<(MeshRegistry, LoadReport)> {
    let root = doc.as_object().ok_or_else(|| Error::Document {
        section: "<root>".to_string(),
        message: format!("expected an object, found {}", kind_of(doc)),
    })?;

    let points = section(root, POINTS)?;
    let layers = section(root, LAYERS)?;
    let connections = section(root, CONNECTIONS)?;
    let edges = section(root, EDGES)?;
    let hexes = section(root, HEXES)?;
    let patches = section(root, PATCHES)?;
    let specs_section = section(root, SPECS)?;

    let mut report = LoadReport::default();

    let specs = match specs_section {
        Some(map) => match ProjectSpecs::deserialize(Value::Object(map.clone())) {
            Ok(specs) => specs,
            Err(e) => {
                report.skip(SPECS, SPECS, e);
                ProjectSpecs::default()
            }
        },
        None => ProjectSpecs::default(),
    };
    let axis = specs.sketch_plane.depth_axis();
    let mut reg = MeshRegistry::empty_for_restore(specs);

    for (key, value) in entries(points) {
        let Some(id) = keyed_id(POINTS, "Point", key, &mut report) else { continue };
        let Some(rec) = decode::<PointRecord>(POINTS, key, value, &mut report) else { continue };
        if ![rec.x, rec.y, rec.z].iter().all(|v| v.is_finite()) {
            report.skip(POINTS, key, "non-finite coordinate");
            continue;
        }
        reg.restore_point(Point::new(PointId(id), rec.x, rec.y, rec.z));
    }

    for (key, value) in entries(layers) {
        let Some(rec) = decode::<LayerRecord>(LAYERS, key, value, &mut report) else { continue };
        let refs = match rec.points.into_ids() {
            Ok(refs) => refs,
            Err(e) => {
                report.skip(LAYERS, key, e);
                continue;
            }
        };
        let members = live_refs(&reg, LAYERS, key, refs);
        let depth = rec
            .depth
            .filter(|d| d.is_finite())
            .or_else(|| members.first().and_then(|id| reg.point_position(*id)).map(|p| p[axis]))
            .unwrap_or(0.0);
        let mut layer = Layer::new(key, depth);
        for id in members {
            layer.insert(id);
        }
        reg.restore_layer(layer);
    }

    for (key, value) in entries(connections) {
        let Some(id) = keyed_id(CONNECTIONS, "Connection", key, &mut report) else { continue };
        let Some(rec) = decode::<ConnectionRecord>(CONNECTIONS, key, value, &mut report) else { continue };
        let (a, b) = match (rec.a.into_id(), rec.b.into_id()) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                report.skip(CONNECTIONS, key, e);
                continue;
            }
        };
        if !reg.contains_point(a) || !reg.contains_point(b) {
            report.skip(CONNECTIONS, key, "references a missing point");
            continue;
        }
        let conn = Connection::new(ConnId(id), a, b);
        if reg.connections().any(|c| c.a == conn.a && c.b == conn.b) {
            report.skip(CONNECTIONS, key, "duplicate of an earlier connection");
            continue;
        }
        reg.restore_connection(conn);
    }

    for (key, value) in entries(edges) {
        let Some(id) = keyed_id(EDGES, "Edge", key, &mut report) else { continue };
        let Some(rec) = decode::<EdgeRecord>(EDGES, key, value, &mut report) else { continue };
        match build_edge(&reg, EdgeId(id), &rec.kind, rec.points) {
            Ok(edge) => reg.restore_edge(edge),
            Err(e) => report.skip(EDGES, key, e),
        }
    }

    for (key, value) in entries(hexes) {
        let Some(id) = keyed_id(HEXES, "Hex", key, &mut report) else { continue };
        let Some(rec) = decode::<HexRecord>(HEXES, key, value, &mut report) else { continue };
        let refs = match rec.points.into_ids() {
            Ok(refs) => live_refs(&reg, HEXES, key, refs),
            Err(e) => {
                report.skip(HEXES, key, e);
                continue;
            }
        };
        let distinct = distinct_point_count(&refs);
        if distinct < MIN_BLOCK_POINTS {
            report.skip(HEXES, key, format!("only {distinct} distinct resolvable vertices"));
            continue;
        }
        let [nx, ny, nz] = rec.divisions.unwrap_or([1, 1, 1]);
        let block = HexBlock::new(BlockId(id), refs)
            .with_divisions(Divisions::new(nx, ny, nz))
            .with_grading(rec.grading.unwrap_or_default());
        reg.restore_block(block);
    }

    for (key, value) in entries(patches) {
        let Some(rec) = decode::<PatchRecord>(PATCHES, key, value, &mut report) else { continue };
        let mut patch = Patch::new(key, rec.patch_type);
        patch.normal = rec.normal;
        for (n, face) in rec.faces.into_faces().into_iter().enumerate() {
            match face {
                Ok(ids) if ids.iter().all(|id| reg.contains_point(*id)) => {
                    patch.faces.push(PatchFace::new(ids));
                }
                Ok(_) => report.skip(PATCHES, &format!("{key}[{n}]"), "face references a missing point"),
                Err(e) => report.skip(PATCHES, &format!("{key}[{n}]"), e),
            }
        }
        reg.restore_patch(patch);
    }

    reg.finish_restore();
    let summary = reg.summary();
    info!(
        points = summary.points,
        blocks = summary.blocks,
        patches = summary.patches,
        skipped = report.skipped.len(),
        "document loaded"
    );
    Ok((reg, report))
}

/// Parse JSON text and [`load_from_document`].
pub fn from_json_str(s: &str) -> Result<(MeshRegistry, LoadReport)> {
    let doc: Value = serde_json::from_str(s)?;
    load_from_document(&doc)
}

impl MeshRegistry {
    /// See [`export_to_document`].
    pub fn to_document(&self) -> Value {
        export_to_document(self)
    }

    /// See [`load_from_document`].
    pub fn load_document(doc: &Value) -> Result<(Self, LoadReport)> {
        load_from_document(doc)
    }
}

fn build_edge(reg: &MeshRegistry, id: EdgeId, kind: &str, points: RefList) -> std::result::Result<Edge, String> {
    let kind: EdgeKind = kind.parse()?;
    let mut refs = points.into_refs()?.into_iter();
    let (Some(start), Some(end)) = (refs.next(), refs.next()) else {
        return Err("needs a start and an end".to_string());
    };
    let intermediate: Vec<EndpointRef> = refs.collect();
    if !kind.accepts_intermediates(intermediate.len()) {
        return Err(format!("{kind} cannot take {} intermediate point(s)", intermediate.len()));
    }
    let edge = Edge { id, kind, start, end, intermediate };
    for r in edge.control_refs() {
        match r {
            EndpointRef::Point(p) if !reg.contains_point(*p) => {
                return Err(format!("references missing point {p}"));
            }
            EndpointRef::Literal(c) if !c.iter().all(|v| v.is_finite()) => {
                return Err("non-finite literal".to_string());
            }
            _ => {}
        }
    }
    Ok(edge)
}

fn section<'a>(root: &'a Map<String, Value>, name: &str) -> Result<Option<&'a Map<String, Value>>> {
    match root.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(Error::Document {
            section: name.to_string(),
            message: format!("expected an object, found {}", kind_of(other)),
        }),
    }
}

fn entries(section: Option<&Map<String, Value>>) -> impl Iterator<Item = (&str, &Value)> {
    section.into_iter().flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
}

fn decode<T: DeserializeOwned>(section: &str, key: &str, value: &Value, report: &mut LoadReport) -> Option<T> {
    match T::deserialize(value) {
        Ok(rec) => Some(rec),
        Err(e) => {
            report.skip(section, key, e);
            None
        }
    }
}

/// ID embedded in a composite key such as `"Point 12"`. Zero is not a
/// valid ID, and neither is anything above [`MAX_RESTORED_ID`].
fn keyed_id(section: &str, prefix: &str, key: &str, report: &mut LoadReport) -> Option<u32> {
    let Some(id) = key
        .strip_prefix(prefix)
        .and_then(|rest| rest.trim().parse::<u32>().ok())
        .filter(|id| *id > 0)
    else {
        report.skip(section, key, format!("key is not of the form '{prefix} <id>'"));
        return None;
    };
    if id > MAX_RESTORED_ID {
        report.skip(section, key, format!("id exceeds the limit of {MAX_RESTORED_ID}"));
        return None;
    }
    Some(id)
}

fn live_refs(reg: &MeshRegistry, section: &str, key: &str, refs: Vec<PointId>) -> Vec<PointId> {
    let before = refs.len();
    let live: Vec<PointId> = refs.into_iter().filter(|id| reg.contains_point(*id)).collect();
    if live.len() != before {
        debug!(section, key, dropped = before - live.len(), "references to missing points dropped");
    }
    live
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
