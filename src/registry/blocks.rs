//! Hex blocks, patches and the face-topology cache.

use std::sync::{Arc, OnceLock};

use glam::DVec3;
use tracing::debug;

use super::MeshRegistry;
use crate::geometry;
use crate::model::*;
use crate::topology::{face_key, FaceSide, FaceTopology};

impl MeshRegistry {
    // ========================================================================
    // Hex blocks
    // ========================================================================

    fn refs_valid(&self, refs: &[PointId]) -> bool {
        distinct_point_count(refs) >= MIN_BLOCK_POINTS && refs.iter().all(|id| self.points.contains_key(id))
    }

    /// Create a block from vertex references in hex order. Rejected with
    /// fewer than four distinct points or any unknown point.
    pub fn add_hex_block(&mut self, point_refs: &[PointId]) -> Option<BlockId> {
        if !self.refs_valid(point_refs) {
            return None;
        }
        let id = BlockId(self.block_ids.mint());
        self.blocks.insert(id, HexBlock::new(id, point_refs.to_vec()));
        self.invalidate_faces();
        Some(id)
    }

    pub fn remove_hex_block(&mut self, id: BlockId) -> bool {
        let removed = self.blocks.remove(&id).is_some();
        if removed {
            self.invalidate_faces();
        }
        removed
    }

    /// Replace a block's vertex references, with the same validation as
    /// [`add_hex_block`](Self::add_hex_block).
    pub fn set_block_points(&mut self, id: BlockId, point_refs: &[PointId]) -> bool {
        if !self.refs_valid(point_refs) {
            return false;
        }
        let Some(block) = self.blocks.get_mut(&id) else { return false };
        block.point_refs = point_refs.to_vec();
        self.invalidate_faces();
        true
    }

    pub fn set_block_divisions(&mut self, id: BlockId, divisions: Divisions) -> bool {
        let Some(block) = self.blocks.get_mut(&id) else { return false };
        block.divisions = divisions;
        true
    }

    pub fn set_block_grading(&mut self, id: BlockId, grading: Grading) -> bool {
        let Some(block) = self.blocks.get_mut(&id) else { return false };
        block.grading = grading;
        true
    }

    pub fn hex_block(&self, id: BlockId) -> Option<&HexBlock> {
        self.blocks.get(&id)
    }

    pub fn hex_blocks(&self) -> impl Iterator<Item = &HexBlock> {
        self.blocks.values()
    }

    /// Coordinates of a block's vertices; `None` entries for refs that
    /// do not resolve.
    pub fn block_vertices(&self, id: BlockId) -> Option<Vec<Option<DVec3>>> {
        let block = self.blocks.get(&id)?;
        Some(block.point_refs.iter().map(|p| self.point_position(*p)).collect())
    }

    /// Divisions giving cells of roughly `cell_size` along each axis.
    /// `None` for unknown or incomplete blocks and non-positive sizes.
    pub fn suggest_divisions(&self, id: BlockId, cell_size: f64) -> Option<Divisions> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return None;
        }
        let verts: Vec<DVec3> = self.block_vertices(id)?.into_iter().collect::<Option<_>>()?;
        let verts: [DVec3; HEX_VERTEX_COUNT] = verts.try_into().ok()?;
        let [nx, ny, nz] = geometry::hex_axis_lengths(&verts)
            .map(|len| ((len / cell_size).round() as u32).max(1));
        Some(Divisions::new(nx, ny, nz))
    }

    // ========================================================================
    // Face topology
    // ========================================================================

    /// Faces of every complete block, classified internal or boundary.
    /// Computed on first use after any change to the block set.
    pub fn faces(&self) -> Arc<FaceTopology> {
        self.faces
            .get_or_init(|| Arc::new(FaceTopology::compute(self.blocks.values())))
            .clone()
    }

    pub(crate) fn invalidate_faces(&mut self) {
        self.faces = OnceLock::new();
    }

    // ========================================================================
    // Patches
    // ========================================================================

    /// Create or replace a patch. Rejected if any face references an
    /// unknown point.
    pub fn add_patch(
        &mut self,
        name: &str,
        patch_type: impl Into<PatchType>,
        faces: Vec<PatchFace>,
        normal: NormalDirection,
    ) -> bool {
        let known = faces
            .iter()
            .flat_map(|f| f.point_ids.iter())
            .all(|id| self.points.contains_key(id));
        if !known {
            return false;
        }
        let mut patch = Patch::new(name, patch_type.into());
        patch.faces = faces;
        patch.normal = normal;
        self.patches.insert(name.to_string(), patch);
        true
    }

    pub fn remove_patch(&mut self, name: &str) -> bool {
        self.patches.remove(name).is_some()
    }

    pub fn update_patch_type(&mut self, name: &str, patch_type: impl Into<PatchType>) -> bool {
        let Some(patch) = self.patches.get_mut(name) else { return false };
        patch.patch_type = patch_type.into();
        true
    }

    pub fn set_patch_normal(&mut self, name: &str, normal: NormalDirection) -> bool {
        let Some(patch) = self.patches.get_mut(name) else { return false };
        patch.normal = normal;
        true
    }

    pub fn patch(&self, name: &str) -> Option<&Patch> {
        self.patches.get(name)
    }

    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.patches.values()
    }

    /// Name of the patch already holding a face with this vertex set.
    pub fn patch_holding(&self, ids: [PointId; 4]) -> Option<&str> {
        let key = face_key(ids);
        self.patches
            .values()
            .find(|p| {
                p.faces.iter().any(|f| {
                    <[PointId; 4]>::try_from(f.point_ids.as_slice()).is_ok_and(|q| face_key(q) == key)
                })
            })
            .map(|p| p.name.as_str())
    }

    /// Append a block face to a patch. Only boundary faces qualify, and a
    /// face may belong to one patch at most.
    pub fn assign_face(&mut self, name: &str, block: BlockId, side: FaceSide) -> bool {
        if !self.patches.contains_key(name) {
            return false;
        }
        let topology = self.faces();
        let Some(face) = topology.face(block, side) else { return false };
        if face.internal {
            debug!(block = %block, %side, "internal face cannot join a patch");
            return false;
        }
        if let Some(holder) = self.patch_holding(face.point_ids) {
            debug!(block = %block, %side, patch = holder, "face already assigned");
            return false;
        }
        let ids = face.point_ids;
        match self.patches.get_mut(name) {
            Some(patch) => {
                patch.faces.push(PatchFace::new(ids));
                true
            }
            None => false,
        }
    }

    /// Reverse the winding of one face of a patch.
    pub fn flip_patch_face(&mut self, name: &str, index: usize) -> bool {
        let Some(face) = self.patches.get_mut(name).and_then(|p| p.faces.get_mut(index)) else {
            return false;
        };
        face.reverse();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit cubes side by side along x, sharing the face x = 1.
    fn two_blocks(reg: &mut MeshRegistry) -> (BlockId, BlockId, Vec<PointId>) {
        let mut p = Vec::new();
        for z in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for x in [0.0, 1.0, 2.0] {
                    p.push(reg.add_point(x, y, Some(z), None));
                }
            }
        }
        // Index = z*6 + y*3 + x
        let at = |x: usize, y: usize, z: usize| p[z * 6 + y * 3 + x];
        let a = reg
            .add_hex_block(&[at(0, 0, 0), at(1, 0, 0), at(1, 1, 0), at(0, 1, 0),
                             at(0, 0, 1), at(1, 0, 1), at(1, 1, 1), at(0, 1, 1)])
            .unwrap();
        let b = reg
            .add_hex_block(&[at(1, 0, 0), at(2, 0, 0), at(2, 1, 0), at(1, 1, 0),
                             at(1, 0, 1), at(2, 0, 1), at(2, 1, 1), at(1, 1, 1)])
            .unwrap();
        (a, b, p)
    }

    #[test]
    fn test_add_hex_block_validation() {
        let mut reg = MeshRegistry::new();
        let p: Vec<_> = (0..3).map(|i| reg.add_point(i as f64, 0.0, Some(0.0), None)).collect();
        assert!(reg.add_hex_block(&p).is_none());
        let mut q = p.clone();
        q.push(PointId(77));
        assert!(reg.add_hex_block(&q).is_none());
    }

    #[test]
    fn test_two_blocks_ten_boundary_faces() {
        let mut reg = MeshRegistry::new();
        let (a, b, _) = two_blocks(&mut reg);
        let topo = reg.faces();
        assert_eq!(topo.faces().len(), 12);
        assert_eq!(topo.boundary_count(), 10);
        assert!(topo.face(a, FaceSide::Right).unwrap().internal);
        assert!(topo.face(b, FaceSide::Left).unwrap().internal);
    }

    #[test]
    fn test_face_cache_invalidated_on_block_change() {
        let mut reg = MeshRegistry::new();
        let (a, b, _) = two_blocks(&mut reg);
        let before = reg.faces();
        assert!(Arc::ptr_eq(&before, &reg.faces()));

        assert!(reg.remove_hex_block(b));
        let after = reg.faces();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.boundary_count(), 6);
        assert!(after.face(a, FaceSide::Right).unwrap().is_boundary());
    }

    #[test]
    fn test_face_cache_invalidated_on_point_cascade() {
        let mut reg = MeshRegistry::new();
        let (a, _, p) = two_blocks(&mut reg);
        assert_eq!(reg.faces().boundary_count(), 10);
        reg.remove_point(p[0]);
        // Block a now has seven refs and contributes no faces.
        assert_eq!(reg.hex_block(a).unwrap().point_refs.len(), 7);
        assert_eq!(reg.faces().faces().len(), 6);
    }

    #[test]
    fn test_block_dropped_below_four_points() {
        let mut reg = MeshRegistry::new();
        let p: Vec<_> = (0..4).map(|i| reg.add_point(i as f64, 0.0, Some(0.0), None)).collect();
        let block = reg.add_hex_block(&p).unwrap();
        reg.remove_point(p[3]);
        assert!(reg.hex_block(block).is_none());
    }

    #[test]
    fn test_repeated_refs_count_once() {
        let mut reg = MeshRegistry::new();
        let p: Vec<_> = (0..4).map(|i| reg.add_point(i as f64, 0.0, Some(0.0), None)).collect();
        assert!(reg.add_hex_block(&[p[0], p[0], p[0], p[0]]).is_none());
        assert!(reg.add_hex_block(&[p[0], p[1], p[2], p[2], p[1], p[0]]).is_none());

        let doubled = [p[0], p[0], p[1], p[1], p[2], p[2], p[3], p[3]];
        let block = reg.add_hex_block(&doubled).unwrap();
        assert!(!reg.set_block_points(block, &doubled[..6]));

        reg.remove_point(p[3]);
        assert!(reg.hex_block(block).is_none());
        assert_eq!(reg.faces().faces().len(), 0);
    }

    #[test]
    fn test_assign_face_rules() {
        let mut reg = MeshRegistry::new();
        let (a, b, _) = two_blocks(&mut reg);
        assert!(reg.add_patch("walls", "wall", vec![], NormalDirection::Outward));

        assert!(!reg.assign_face("walls", a, FaceSide::Right));
        assert!(reg.assign_face("walls", a, FaceSide::Left));
        assert!(!reg.assign_face("walls", a, FaceSide::Left));
        assert!(!reg.assign_face("missing", b, FaceSide::Right));
        assert_eq!(reg.patch("walls").unwrap().faces.len(), 1);
        assert_eq!(reg.patch("walls").unwrap().patch_type, PatchType::Wall);
    }

    #[test]
    fn test_flip_patch_face() {
        let mut reg = MeshRegistry::new();
        let (a, _, _) = two_blocks(&mut reg);
        reg.add_patch("inlet", PatchType::Patch, vec![], NormalDirection::Outward);
        reg.assign_face("inlet", a, FaceSide::Left);
        let before = reg.patch("inlet").unwrap().faces[0].clone();
        assert!(reg.flip_patch_face("inlet", 0));
        let after = &reg.patch("inlet").unwrap().faces[0];
        let mut reversed = before.point_ids.clone();
        reversed.reverse();
        assert_eq!(after.point_ids, reversed);
        assert!(!reg.flip_patch_face("inlet", 3));
    }

    #[test]
    fn test_suggest_divisions() {
        let mut reg = MeshRegistry::new();
        let (a, _, _) = two_blocks(&mut reg);
        assert_eq!(reg.suggest_divisions(a, 0.25), Some(Divisions::new(4, 4, 4)));
        assert_eq!(reg.suggest_divisions(a, 10.0), Some(Divisions::new(1, 1, 1)));
        assert_eq!(reg.suggest_divisions(a, 0.0), None);
    }

    #[test]
    fn test_summary_counts_cells() {
        let mut reg = MeshRegistry::new();
        let (a, b, _) = two_blocks(&mut reg);
        reg.set_block_divisions(a, Divisions::new(2, 3, 4));
        reg.set_block_divisions(b, Divisions::new(1, 1, 1));
        let s = reg.summary();
        assert_eq!(s.blocks, 2);
        assert_eq!(s.points, 12);
        assert_eq!(s.cells, 25);
    }
}
