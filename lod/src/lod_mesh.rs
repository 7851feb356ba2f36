use common::{CollapseRecord, ProgressiveMesh};
use log::trace;

/// Runtime progressive mesh: a live index buffer walked up and down the
/// collapse record array one record at a time, so a level change costs only
/// the slots of the records between the two levels.
///
/// Record 0 is full detail; the last record is the coarsest level.
#[derive(Debug, Clone)]
pub struct LodMesh {
    records: Vec<CollapseRecord>,
    indices: Vec<u32>,
    current: usize,
    vert_count: u32,
    tri_count: u32,
}

impl LodMesh {
    /// `indices` must be the full-detail buffer the records were computed
    /// against. Starts at record 0.
    pub fn new(indices: Vec<u32>, records: Vec<CollapseRecord>) -> Self {
        assert!(!records.is_empty(), "record array needs a base record");

        let base = &records[0];
        let (vert_count, tri_count) = (base.vert_count, base.tri_count);
        Self {
            records,
            indices,
            current: 0,
            vert_count,
            tri_count,
        }
    }

    pub fn from_asset(asset: &ProgressiveMesh) -> Self {
        Self::new(asset.indices.clone(), asset.records.clone())
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn current_record(&self) -> usize {
        self.current
    }

    /// Live counts at the current level.
    pub fn vert_count(&self) -> u32 {
        self.vert_count
    }

    pub fn tri_count(&self) -> u32 {
        self.tri_count
    }

    /// The whole index buffer. Entries past the live prefix belong to finer
    /// levels and must not be drawn.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The index range to draw at the current level.
    pub fn live_indices(&self) -> &[u32] {
        &self.indices[..3 * self.tri_count as usize]
    }

    /// Byte view of the live range, for index buffer uploads.
    pub fn live_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.live_indices())
    }

    /// Walk to `target`, clamped to the record array. Each record between
    /// the current level and the target is applied (moving coarser) or
    /// reverted (moving finer) in order, never skipped.
    pub fn select_level_of_detail(&mut self, target: usize) {
        let target = target.min(self.records.len() - 1);
        if target != self.current {
            trace!("lod {} -> {}", self.current, target);
        }

        while self.current < target {
            self.current += 1;
            let record = &self.records[self.current];
            for &slot in &record.slots {
                debug_assert_eq!(self.indices[slot as usize], record.vert_to_throw);
                self.indices[slot as usize] = record.vert_to_keep;
            }
            self.vert_count = record.vert_count;
            self.tri_count = record.tri_count;
        }

        while self.current > target {
            let record = &self.records[self.current];
            for &slot in &record.slots {
                debug_assert_eq!(self.indices[slot as usize], record.vert_to_keep);
                self.indices[slot as usize] = record.vert_to_throw;
            }
            self.current -= 1;
            let record = &self.records[self.current];
            self.vert_count = record.vert_count;
            self.tri_count = record.tri_count;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use baker::mesh::{ReduceConfig, Simplifier};
    use common::TriMesh;
    use glam::Vec3;

    fn baked_cube() -> LodMesh {
        let mut mesh = TriMesh {
            positions: [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
                [0.0, 1.0, 1.0],
            ]
            .iter()
            .map(|&p| Vec3::from_array(p))
            .collect(),
            indices: vec![
                0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4, 3, 6, 2, 3, 7, 6, 1, 2,
                6, 1, 6, 5, 0, 4, 7, 0, 7, 3,
            ],
            ..Default::default()
        };
        let records = Simplifier::new(&mut mesh, ReduceConfig::default())
            .unwrap()
            .simplify()
            .unwrap();
        LodMesh::new(mesh.indices, records)
    }

    fn assert_no_degenerate_tris(mesh: &LodMesh) {
        for tri in mesh.live_indices().chunks_exact(3) {
            assert!(
                tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0],
                "degenerate triangle {tri:?} at record {}",
                mesh.current_record()
            );
        }
    }

    #[test]
    fn starts_at_full_detail() {
        let mesh = baked_cube();

        assert_eq!(mesh.current_record(), 0);
        assert_eq!(mesh.vert_count(), 8);
        assert_eq!(mesh.tri_count(), 12);
        assert_eq!(mesh.live_indices().len(), 36);
    }

    #[test]
    fn walks_to_coarsest_and_back() {
        let mut mesh = baked_cube();
        let full = mesh.indices().to_vec();

        let coarsest = mesh.record_count() - 1;
        mesh.select_level_of_detail(coarsest);
        assert_eq!(mesh.tri_count(), 4);

        mesh.select_level_of_detail(0);
        assert_eq!(mesh.indices(), &full[..]);
        assert_eq!(mesh.tri_count(), 12);
    }

    #[test]
    fn round_trips_through_every_level() {
        let mut mesh = baked_cube();
        let full = mesh.indices().to_vec();

        for level in 0..mesh.record_count() {
            mesh.select_level_of_detail(level);
            assert_eq!(mesh.current_record(), level);
            assert_no_degenerate_tris(&mesh);

            mesh.select_level_of_detail(0);
            assert_eq!(mesh.indices(), &full[..], "level {level} did not revert");
        }
    }

    #[test]
    fn out_of_range_target_clamps() {
        let mut mesh = baked_cube();
        mesh.select_level_of_detail(usize::MAX);

        assert_eq!(mesh.current_record(), mesh.record_count() - 1);
    }

    #[test]
    fn byte_view_matches_live_range() {
        let mut mesh = baked_cube();
        mesh.select_level_of_detail(1);

        assert_eq!(
            mesh.live_index_bytes().len(),
            mesh.live_indices().len() * std::mem::size_of::<u32>()
        );
    }

    #[test]
    fn empty_floor_draws_nothing() {
        let mut mesh = TriMesh {
            positions: [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ]
            .iter()
            .map(|&p| Vec3::from_array(p))
            .collect(),
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        };
        let records = Simplifier::new(&mut mesh, ReduceConfig::default())
            .unwrap()
            .simplify()
            .unwrap();

        let mut lod = LodMesh::new(mesh.indices, records);
        lod.select_level_of_detail(1);
        assert_eq!(lod.tri_count(), 0);
        assert!(lod.live_indices().is_empty());

        lod.select_level_of_detail(0);
        assert_eq!(lod.tri_count(), 2);
    }
}
