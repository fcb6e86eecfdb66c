//! Property-based tests for the entity registry.
//!
//! Random sequences of point additions and deletions, with connections,
//! edges, blocks and patches hanging off the points, must never leave a
//! duplicate ID, a hole in the index map, or a reference to a dead point.

use std::collections::BTreeSet;

use blockmesh_rs::{EdgeKind, MeshRegistry, NormalDirection, PatchFace, PointId};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Remove the n-th live point (modulo the live count).
    Remove(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        2 => any::<usize>().prop_map(Op::Remove),
    ]
}

fn live_ids(reg: &MeshRegistry) -> Vec<PointId> {
    reg.points().map(|p| p.id).collect()
}

/// A registry with `n` points and some entities on every kind.
fn seeded(n: usize) -> MeshRegistry {
    let mut reg = MeshRegistry::new();
    let ids: Vec<PointId> = (0..n)
        .map(|i| reg.add_point(i as f64, (i * i) as f64, Some((i % 3) as f64), None))
        .collect();
    for w in ids.windows(2) {
        reg.add_connection(w[0], w[1]);
    }
    for w in ids.windows(3) {
        reg.add_edge(EdgeKind::Arc, w[0].into(), w[2].into(), vec![w[1].into()]);
    }
    for chunk in ids.chunks(8) {
        reg.add_hex_block(chunk);
    }
    let faces: Vec<PatchFace> = ids.chunks_exact(4).map(|c| PatchFace::new(c.iter().copied())).collect();
    reg.add_patch("all", "wall", faces, NormalDirection::Outward);
    reg
}

fn assert_no_dangling(reg: &MeshRegistry) {
    let live: BTreeSet<PointId> = live_ids(reg).into_iter().collect();
    for layer in reg.layers() {
        assert!(layer.point_refs.iter().all(|id| live.contains(id)));
    }
    for c in reg.connections() {
        assert!(live.contains(&c.a) && live.contains(&c.b));
    }
    for e in reg.edges() {
        assert!(e.control_refs().filter_map(|r| r.point_id()).all(|id| live.contains(&id)));
    }
    for b in reg.hex_blocks() {
        assert!(b.point_refs.len() >= 4);
        assert!(b.point_refs.iter().all(|id| live.contains(id)));
    }
    for p in reg.patches() {
        assert!(p.faces.iter().flat_map(|f| f.point_ids.iter()).all(|id| live.contains(id)));
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn ids_unique_and_recycled_smallest_first(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut reg = MeshRegistry::new();
        for op in ops {
            match op {
                Op::Add => {
                    let recycled = reg.recycled_point_ids();
                    let before: BTreeSet<PointId> = live_ids(&reg).into_iter().collect();
                    let id = reg.add_point(0.0, 0.0, Some(0.0), None);
                    prop_assert!(!before.contains(&id));
                    if let Some(smallest) = recycled.first() {
                        prop_assert_eq!(id, *smallest);
                    } else {
                        let max = before.iter().next_back().map_or(0, |p| p.0);
                        prop_assert_eq!(id.0, max + 1);
                    }
                }
                Op::Remove(n) => {
                    let live = live_ids(&reg);
                    if !live.is_empty() {
                        prop_assert!(reg.remove_point(live[n % live.len()]));
                    }
                }
            }
        }
    }

    #[test]
    fn index_map_is_order_preserving_bijection(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut reg = MeshRegistry::new();
        for op in ops {
            match op {
                Op::Add => { reg.add_point(1.0, 2.0, Some(3.0), None); }
                Op::Remove(n) => {
                    let live = live_ids(&reg);
                    if !live.is_empty() {
                        reg.remove_point(live[n % live.len()]);
                    }
                }
            }
        }
        let map = reg.get_point_index_map();
        let live = live_ids(&reg);
        prop_assert_eq!(map.len(), live.len());
        for (i, id) in live.iter().enumerate() {
            prop_assert_eq!(map.get(id), Some(&i));
        }
    }

    #[test]
    fn deletions_leave_no_dangling_refs(
        n in 8usize..24,
        victims in prop::collection::vec(any::<usize>(), 1..16),
    ) {
        let mut reg = seeded(n);
        for v in victims {
            let live = live_ids(&reg);
            if live.is_empty() {
                break;
            }
            reg.remove_point(live[v % live.len()]);
            assert_no_dangling(&reg);
        }
        // Faces are recomputed from the surviving blocks.
        let complete = reg.hex_blocks().filter(|b| b.is_complete()).count();
        prop_assert_eq!(reg.faces().faces().len(), complete * 6);
    }

    #[test]
    fn connection_is_symmetric(a in 0usize..10, b in 0usize..10) {
        let mut reg = MeshRegistry::new();
        let ids: Vec<PointId> = (0..10).map(|i| reg.add_point(i as f64, 0.0, Some(0.0), None)).collect();
        let ab = reg.add_connection(ids[a], ids[b]);
        let ba = reg.add_connection(ids[b], ids[a]);
        prop_assert!(ab.is_some());
        prop_assert_eq!(ab, ba);
        prop_assert_eq!(reg.connections().count(), 1);
    }
}
