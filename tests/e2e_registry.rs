//! End-to-end tests for the entity registry: ID recycling, layers,
//! reference validation and cascading deletes.

use blockmesh_rs::{
    EdgeKind, EndpointRef, FaceSide, MeshRegistry, NormalDirection, PatchFace, PointId,
    ProjectSpecs, SketchPlane,
};
use pretty_assertions::assert_eq;

/// Unit cube at the origin, bottom face first, counter-clockwise.
fn unit_cube(reg: &mut MeshRegistry) -> Vec<PointId> {
    let mut ids = Vec::new();
    for z in [0.0, 1.0] {
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            ids.push(reg.add_point(x, y, Some(z), None));
        }
    }
    ids
}

// ============================================================================
// 1. Point IDs
// ============================================================================

#[test]
fn test_point_ids_recycle_smallest_first() {
    let mut reg = MeshRegistry::new();
    let ids: Vec<PointId> = (0..6).map(|i| reg.add_point(i as f64, 0.0, Some(0.0), None)).collect();
    assert_eq!(ids, (1..=6).map(PointId).collect::<Vec<_>>());

    assert!(reg.remove_point(PointId(5)));
    assert!(reg.remove_point(PointId(2)));
    assert!(!reg.remove_point(PointId(2)));
    assert_eq!(reg.recycled_point_ids(), vec![PointId(2), PointId(5)]);

    assert_eq!(reg.add_point(0.0, 0.0, Some(0.0), None), PointId(2));
    assert_eq!(reg.add_point(0.0, 0.0, Some(0.0), None), PointId(5));
    assert_eq!(reg.add_point(0.0, 0.0, Some(0.0), None), PointId(7));
}

#[test]
fn test_index_map_is_dense_and_ordered() {
    let mut reg = MeshRegistry::new();
    for i in 0..5 {
        reg.add_point(i as f64, 0.0, Some(0.0), None);
    }
    reg.remove_point(PointId(1));
    reg.remove_point(PointId(4));

    let map = reg.get_point_index_map();
    let pairs: Vec<(u32, usize)> = map.iter().map(|(id, i)| (id.0, *i)).collect();
    assert_eq!(pairs, vec![(2, 0), (3, 1), (5, 2)]);
}

#[test]
fn test_update_point() {
    let mut reg = MeshRegistry::new();
    let p = reg.add_point(1.0, 2.0, Some(3.0), None);
    assert!(reg.update_point(p, None, Some(5.0), None));
    let pt = reg.get_point(p).unwrap();
    assert_eq!((pt.x, pt.y, pt.z), (1.0, 5.0, 3.0));
    assert!(!reg.update_point(PointId(99), Some(0.0), None, None));
}

// ============================================================================
// 2. Layers
// ============================================================================

#[test]
fn test_point_takes_depth_from_layer() {
    let mut reg = MeshRegistry::new();
    reg.add_layer("Top", 2.0);
    let p = reg.add_point(1.0, 1.0, None, Some("Top"));
    assert_eq!(reg.point_position(p).unwrap().z, 2.0);
    assert!(reg.layer("Top").unwrap().contains(p));

    // No z and no layer: the current layer supplies both.
    let q = reg.add_point(0.0, 0.0, None, None);
    assert_eq!(reg.point_position(q).unwrap().z, 0.0);
    assert!(reg.layer("Layer 0").unwrap().contains(q));
}

#[test]
fn test_layer_depth_restamps_members() {
    let mut reg = MeshRegistry::new();
    reg.add_layer("Top", 1.0);
    let a = reg.add_point(0.0, 0.0, None, Some("Top"));
    let b = reg.add_point(1.0, 0.0, Some(0.0), None);

    assert!(reg.set_layer_depth("Top", 4.0));
    assert_eq!(reg.point_position(a).unwrap().z, 4.0);
    assert_eq!(reg.point_position(b).unwrap().z, 0.0);

    assert!(reg.add_point_to_layer(b, "Top"));
    assert_eq!(reg.point_position(b).unwrap().z, 4.0);
    assert!(!reg.add_point_to_layer(PointId(42), "Top"));
}

#[test]
fn test_depth_follows_sketch_plane() {
    let specs = ProjectSpecs::default().with_sketch_plane(SketchPlane::YZ);
    let mut reg = MeshRegistry::with_specs(specs);
    reg.add_layer("Side", 3.0);
    let p = reg.add_sketch_point(1.0, 2.0, "Side").unwrap();
    let pos = reg.point_position(p).unwrap();
    assert_eq!((pos.x, pos.y, pos.z), (3.0, 1.0, 2.0));

    assert!(reg.set_layer_depth("Side", -1.0));
    assert_eq!(reg.point_position(p).unwrap().x, -1.0);
    assert_eq!(reg.add_sketch_point(0.0, 0.0, "Nope"), None);
}

#[test]
fn test_remove_layer_keeps_points() {
    let mut reg = MeshRegistry::new();
    reg.add_layer("Top", 1.0);
    let p = reg.add_point(0.0, 0.0, None, Some("Top"));
    assert!(reg.set_current_layer("Top"));
    assert!(reg.remove_layer("Top"));
    assert!(reg.contains_point(p));
    assert_eq!(reg.current_layer(), Some("Layer 0"));
}

// ============================================================================
// 3. Connections and edges
// ============================================================================

#[test]
fn test_connection_canonical_and_idempotent() {
    let mut reg = MeshRegistry::new();
    let a = reg.add_point(0.0, 0.0, Some(0.0), None);
    let b = reg.add_point(1.0, 0.0, Some(0.0), None);

    let ab = reg.add_connection(a, b).unwrap();
    assert_eq!(reg.add_connection(b, a), Some(ab));
    assert_eq!(reg.connections().count(), 1);

    let c = reg.connection(ab).unwrap();
    assert_eq!((c.a, c.b), (a, b));
    assert_eq!(reg.add_connection(a, PointId(99)), None);
}

#[test]
fn test_edge_arity_and_references() {
    let mut reg = MeshRegistry::new();
    let a = reg.add_point(1.0, 0.0, Some(0.0), None);
    let b = reg.add_point(0.0, 1.0, Some(0.0), None);
    let c = reg.add_point(-1.0, 0.0, Some(0.0), None);

    assert_eq!(reg.add_edge(EdgeKind::Arc, a.into(), c.into(), vec![]), None);
    assert_eq!(reg.add_edge(EdgeKind::Line, a.into(), c.into(), vec![b.into()]), None);
    assert_eq!(reg.add_edge(EdgeKind::Line, a.into(), PointId(9).into(), vec![]), None);
    assert_eq!(
        reg.add_edge(EdgeKind::Spline, a.into(), c.into(), vec![EndpointRef::Literal([f64::NAN, 0.0, 0.0])]),
        None
    );

    let arc = reg.add_edge(EdgeKind::Arc, a.into(), c.into(), vec![b.into()]).unwrap();
    let pts = reg.sample_edge(arc, 8).unwrap();
    assert_eq!(pts.len(), 9);
    assert!((pts[4].y - 1.0).abs() < 1e-9);
}

// ============================================================================
// 4. Cascading deletes
// ============================================================================

#[test]
fn test_remove_point_cascades_everywhere() {
    let mut reg = MeshRegistry::new();
    let ids = unit_cube(&mut reg);
    let victim = ids[0];

    reg.add_layer("Bottom", 0.0);
    reg.add_point_to_layer(victim, "Bottom");
    reg.add_connection(victim, ids[1]).unwrap();
    reg.add_connection(ids[1], ids[2]).unwrap();
    reg.add_edge(EdgeKind::Line, victim.into(), ids[4].into(), vec![]).unwrap();
    reg.add_edge(EdgeKind::Line, ids[1].into(), ids[5].into(), vec![]).unwrap();
    let block = reg.add_hex_block(&ids).unwrap();
    reg.add_patch("inlet", "patch", Vec::new(), NormalDirection::Outward);
    assert!(reg.assign_face("inlet", block, FaceSide::Left));
    assert!(reg.assign_face("inlet", block, FaceSide::Right));

    assert!(reg.remove_point(victim));

    assert!(!reg.layer("Bottom").unwrap().contains(victim));
    assert_eq!(reg.connections().count(), 1);
    assert_eq!(reg.edges().count(), 1);
    assert_eq!(reg.hex_block(block).unwrap().point_refs.len(), 7);
    let inlet = reg.patch("inlet").unwrap();
    assert!(inlet.faces.iter().all(|f| !f.point_ids.contains(&victim)));
    assert_eq!(inlet.faces.len(), 2);

    // The block is gone once fewer than four vertices survive.
    for id in &ids[1..5] {
        reg.remove_point(*id);
    }
    assert_eq!(reg.hex_block(block), None);
    assert!(reg.faces().faces().is_empty());
}

#[test]
fn test_patch_rejects_unknown_points() {
    let mut reg = MeshRegistry::new();
    let ids = unit_cube(&mut reg);
    let good = PatchFace::new([ids[0], ids[1], ids[2], ids[3]]);
    let bad = PatchFace::new([ids[0], ids[1], ids[2], PointId(77)]);

    assert!(!reg.add_patch("p", "wall", vec![good.clone(), bad], NormalDirection::Outward));
    assert_eq!(reg.patch("p"), None);
    assert!(reg.add_patch("p", "wall", vec![good], NormalDirection::Inward));
    assert!(reg.update_patch_type("p", "myCustomBC"));
    assert!(reg.patch("p").unwrap().patch_type.is_custom());
}

#[test]
fn test_clear_keeps_specs() {
    let specs = ProjectSpecs::default().with_units("mm", "0");
    let mut reg = MeshRegistry::with_specs(specs.clone());
    unit_cube(&mut reg);
    reg.remove_point(PointId(3));
    reg.clear();

    assert_eq!(reg.summary().points, 0);
    assert_eq!(reg.summary().layers, 1);
    assert_eq!(reg.specs(), &specs);
    assert!(reg.recycled_point_ids().is_empty());
    assert_eq!(reg.add_point(0.0, 0.0, None, None), PointId(1));
}
