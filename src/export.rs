//! blockMeshDict export: serialize the registry as an OpenFOAM
//! dictionary.
//!
//! ```text
//! MeshRegistry → render_block_mesh_dict() → scale / vertices / blocks /
//!   edges / boundary / mergePatchPairs → blockMesh
//! ```
//!
//! Blocks and patches never emit raw point IDs: every reference goes
//! through [`MeshRegistry::get_point_index_map`], the dense 0-based index
//! of the vertex in the `vertices` list. Output is a pure function of
//! registry state and is byte-for-byte stable.

use std::collections::BTreeMap;
use std::io::Write;

use glam::DVec3;
use tracing::{debug, warn};

use crate::model::*;
use crate::registry::MeshRegistry;
use crate::Result;

const BANNER: [&str; 7] = [
    r"/*--------------------------------*- C++ -*----------------------------------*\",
    r"| =========                 |                                                 |",
    r"| \\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox           |",
    r"|  \\    /   O peration     | Version:  v2012                                 |",
    r"|   \\  /    A nd           | Website:  www.openfoam.com                      |",
    r"|    \\/     M anipulation  |                                                 |",
    r"\*---------------------------------------------------------------------------*/",
];

const RULE: &str = "// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //";
const FOOTER: &str = "// ************************************************************************* //";

/// Exporter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Write the banner and `FoamFile` header.
    pub header: bool,
    /// Lower arc/spline/polyLine edges into the `edges` section. Off by
    /// default: the section is then written empty.
    pub lower_edges: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { header: true, lower_edges: false }
    }
}

/// Write the dictionary for `reg` to `writer`.
pub fn export_block_mesh_dict(
    reg: &MeshRegistry,
    opts: &ExportOptions,
    writer: &mut dyn Write,
) -> Result<()> {
    writer.write_all(render_block_mesh_dict(reg, opts).as_bytes())?;
    Ok(())
}

/// Render the dictionary for `reg` as a string.
pub fn render_block_mesh_dict(reg: &MeshRegistry, opts: &ExportOptions) -> String {
    let index = reg.get_point_index_map();
    let mut lines: Vec<String> = Vec::new();

    if opts.header {
        lines.extend(BANNER.iter().map(|s| s.to_string()));
        lines.extend(
            [
                "FoamFile",
                "{",
                "    version     2.0;",
                "    format      ascii;",
                "    class       dictionary;",
                "    object      blockMeshDict;",
                "}",
                RULE,
                "",
            ]
            .map(String::from),
        );
    }

    lines.push(format!("scale   {};", format_scalar(reg.scale_value())));
    lines.push(String::new());

    // Vertices
    open_list(&mut lines, "vertices");
    for (i, p) in reg.points().enumerate() {
        lines.push(format!("    {}  // point {} (id {})", format_vector(p.position()), i, p.id));
    }
    close_list(&mut lines);

    // Blocks
    open_list(&mut lines, "blocks");
    for (n, block) in reg.hex_blocks().enumerate() {
        match block_line(block, &index) {
            Some(line) => {
                lines.push(format!("    // Block {n}"));
                lines.push(line);
            }
            None => debug!(block = %block.id, refs = block.point_refs.len(), "block skipped"),
        }
    }
    close_list(&mut lines);

    // Edges
    open_list(&mut lines, "edges");
    if opts.lower_edges {
        for edge in reg.edges() {
            if let Some(line) = edge_line(reg, edge, &index) {
                lines.push(line);
            }
        }
    }
    close_list(&mut lines);

    // Boundary
    open_list(&mut lines, "boundary");
    for patch in reg.patches() {
        lines.push(format!("    {}", patch.name));
        lines.push("    {".to_string());
        lines.push(format!("        type {};", patch.patch_type));
        lines.push("        faces".to_string());
        lines.push("        (".to_string());
        for (n, face) in patch.faces.iter().enumerate() {
            match face_indices(face, patch.normal, &index) {
                Some(idx) => lines.push(format!("            {}", format_indices(&idx))),
                None => warn!(patch = %patch.name, face = n, "face does not resolve to 4 vertices; skipped"),
            }
        }
        lines.push("        );".to_string());
        lines.push("    }".to_string());
    }
    close_list(&mut lines);

    open_list(&mut lines, "mergePatchPairs");
    close_list(&mut lines);

    lines.push(FOOTER.to_string());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn open_list(lines: &mut Vec<String>, keyword: &str) {
    lines.push(keyword.to_string());
    lines.push("(".to_string());
}

fn close_list(lines: &mut Vec<String>) {
    lines.push(");".to_string());
    lines.push(String::new());
}

fn block_line(block: &HexBlock, index: &BTreeMap<PointId, usize>) -> Option<String> {
    let verts = block.vertices()?;
    let idx: Vec<usize> = verts.iter().map(|id| index.get(id).copied()).collect::<Option<_>>()?;
    let d = block.divisions;
    Some(format!(
        "    hex {} ({} {} {}) {} {}",
        format_indices(&idx),
        d.nx,
        d.ny,
        d.nz,
        block.grading.kind.keyword(),
        format_grading(&block.grading),
    ))
}

/// `simpleGrading` takes one ratio per axis; `edgeGrading` takes one per
/// edge, four edges per axis.
fn format_grading(g: &Grading) -> String {
    let values: Vec<String> = match g.kind {
        GradingKind::Simple => g.ratios.iter().map(|r| format_scalar(*r)).collect(),
        GradingKind::Edge => g
            .ratios
            .iter()
            .flat_map(|r| std::iter::repeat_n(format_scalar(*r), 4))
            .collect(),
    };
    format!("({})", values.join(" "))
}

fn face_indices(
    face: &PatchFace,
    normal: NormalDirection,
    index: &BTreeMap<PointId, usize>,
) -> Option<[usize; 4]> {
    if !face.is_quad() {
        return None;
    }
    let mut idx = [0usize; 4];
    for (slot, id) in idx.iter_mut().zip(&face.point_ids) {
        *slot = *index.get(id)?;
    }
    if normal == NormalDirection::Inward {
        idx.reverse();
    }
    Some(idx)
}

fn edge_line(reg: &MeshRegistry, edge: &Edge, index: &BTreeMap<PointId, usize>) -> Option<String> {
    let vertex = |r: &EndpointRef| r.point_id().and_then(|id| index.get(&id).copied());
    let (Some(start), Some(end)) = (vertex(&edge.start), vertex(&edge.end)) else {
        debug!(edge = %edge.id, "edge endpoints are not vertices; not lowered");
        return None;
    };
    let through: Vec<DVec3> = edge
        .intermediate
        .iter()
        .map(|r| reg.resolve(r))
        .collect::<Option<_>>()?;

    match edge.kind {
        EdgeKind::Line => None,
        EdgeKind::Arc => Some(format!(
            "    arc {start} {end} {}",
            format_vector(*through.first()?)
        )),
        EdgeKind::Spline | EdgeKind::PolyLine if !through.is_empty() => {
            let pts: Vec<String> = through.iter().map(|p| format_vector(*p)).collect();
            Some(format!("    {} {start} {end} ({})", edge.kind.keyword(), pts.join(" ")))
        }
        EdgeKind::Spline | EdgeKind::PolyLine => None,
    }
}

fn format_vector(p: DVec3) -> String {
    format!("( {:.6} {:.6} {:.6} )", p.x, p.y, p.z)
}

fn format_indices(idx: &[usize]) -> String {
    let parts: Vec<String> = idx.iter().map(usize::to_string).collect();
    format!("({})", parts.join(" "))
}

/// Shortest round-tripping decimal, always with a fractional part or
/// exponent (`1.0`, `0.001`, `1e-7`).
fn format_scalar(v: f64) -> String {
    format!("{v:?}")
}
