use std::collections::BTreeSet;

use common::{CollapseRecord, TriMesh};
use glam::Vec3;
use log::{debug, warn};

use super::adjacency::{AdjacencyMesh, MeshError, MeshHooks};
use super::edge::{Edge, EdgeTris};
use super::heap::CollapseCostHeap;
use super::triangle::Triangle;
use super::vertex::VertID;

/// Weights for the collapse cost metric.
#[derive(Debug, Clone, Copy)]
pub struct ReduceConfig {
    pub length_weight: f32,
    pub angle_weight: f32,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            length_weight: 10.0,
            angle_weight: 1.0,
        }
    }
}

/// Cost of collapsing `edge`: weighted edge length plus the cross product
/// magnitude of the two face normals, so short edges in flat regions go
/// first. Normals stay un-normalised, weighting larger faces heavier.
/// Boundary and junction edges are never candidates.
fn collapse_cost(edge: Edge, tris: &EdgeTris, positions: &[Vec3], config: &ReduceConfig) -> f32 {
    let Some((t0, t1)) = tris.pair() else {
        return f32::INFINITY;
    };

    let n0 = t0.scaled_normal(positions);
    let n1 = t1.scaled_normal(positions);

    config.length_weight * edge.length(positions) + config.angle_weight * n0.cross(n1).length()
}

/// Keeps the candidate heap and the per-collapse deleted-vertex set in step
/// with mesh surgery. Every mutation inside the collapse loop goes through
/// one of these.
struct HeapSync<'a> {
    heap: &'a mut CollapseCostHeap,
    deleted_verts: &'a mut BTreeSet<VertID>,
    positions: &'a [Vec3],
    config: &'a ReduceConfig,
}

impl MeshHooks for HeapSync<'_> {
    fn on_vert_insert(&mut self, vert: VertID, created: bool) {
        // a vertex recreated mid-surgery was never really deleted
        if created {
            self.deleted_verts.remove(&vert);
        }
    }

    fn on_vert_remove(&mut self, vert: VertID, destroyed: bool) {
        if destroyed {
            self.deleted_verts.insert(vert);
        }
    }

    fn on_edge_insert(&mut self, edge: Edge, _created: bool, tris: &EdgeTris) {
        let cost = collapse_cost(edge, tris, self.positions, self.config);
        self.heap.push_or_update(edge, cost);
    }

    fn on_edge_remove(&mut self, edge: Edge, destroyed: bool) {
        if destroyed {
            self.heap.remove(edge);
        }
    }
}

/// One accepted collapse, in mesh-surgery order. Vertex ids are rewritten to
/// the reordered numbering before records are computed.
struct CollapseStep {
    keep: VertID,
    throw: VertID,
    verts_removed: u32,
    tris_removed: u32,
}

/// Greedy edge-collapse simplifier.
///
/// Consumes an indexed triangle mesh, repeatedly collapses the cheapest
/// surviving manifold edge, then reorders the vertex streams and index
/// buffer so that every resolution occupies a prefix, and emits one
/// [`CollapseRecord`] per collapse (plus the base record).
pub struct Simplifier<'a> {
    tri_mesh: &'a mut TriMesh,
    config: ReduceConfig,

    mesh: AdjacencyMesh,
    heap: CollapseCostHeap,
    deleted_verts: BTreeSet<VertID>,
    steps: Vec<CollapseStep>,

    /// Unique triangle count after duplicate filtering.
    live_tris: usize,

    /// Reordered vertex ids, coarsest-surviving first: `ordered_verts[new]`
    /// is the old id, `permute_verts[old]` the new one.
    ordered_verts: Vec<u32>,
    permute_verts: Vec<u32>,
    /// Original index triples, reordered so later-removed triangles come
    /// first. Filled from the top down as triangles are deleted.
    new_indices: Vec<u32>,
    next_vert_slot: usize,
    next_tri_slot: usize,
}

impl<'a> Simplifier<'a> {
    /// Validates and ingests `tri_mesh`. Fails fast on ragged buffers,
    /// out-of-range ids, and degenerate triangles; duplicate triangles are
    /// dropped with a warning as the collapse machinery keys on canonical
    /// triangles.
    pub fn new(tri_mesh: &'a mut TriMesh, config: ReduceConfig) -> Result<Self, MeshError> {
        let vert_count = tri_mesh.positions.len();
        if tri_mesh.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndexBuffer(tri_mesh.indices.len()));
        }
        for stream_len in [
            tri_mesh.normals.as_ref().map(Vec::len),
            tri_mesh.colours.as_ref().map(Vec::len),
            tri_mesh.texcoords.as_ref().map(Vec::len),
        ]
        .into_iter()
        .flatten()
        {
            if stream_len != vert_count {
                return Err(MeshError::RaggedAttributes(stream_len, vert_count));
            }
        }

        let tri_count = tri_mesh.indices.len() / 3;
        for t in 0..tri_count {
            let [a, b, c] = [
                tri_mesh.indices[3 * t],
                tri_mesh.indices[3 * t + 1],
                tri_mesh.indices[3 * t + 2],
            ];
            for id in [a, b, c] {
                if id as usize >= vert_count {
                    return Err(MeshError::VertOutOfRange(id, vert_count, t));
                }
            }
            if a == b || b == c || c == a {
                return Err(MeshError::DegenerateTriangle(t));
            }
        }

        let mut mesh = AdjacencyMesh::new();
        let mut duplicates = 0usize;
        for t in 0..tri_count {
            let tri = Triangle::new(
                VertID(tri_mesh.indices[3 * t]),
                VertID(tri_mesh.indices[3 * t + 1]),
                VertID(tri_mesh.indices[3 * t + 2]),
            );
            if mesh.contains_triangle(tri) {
                duplicates += 1;
                continue;
            }
            mesh.insert_triangle(tri, &mut ());
            mesh.set_source_index(tri, Some(t as u32));
        }
        if duplicates > 0 {
            warn!("Dropped {duplicates} duplicate triangles of {tri_count}");
        }

        let live_tris = mesh.tri_count();
        Ok(Self {
            tri_mesh,
            config,
            mesh,
            heap: CollapseCostHeap::default(),
            deleted_verts: BTreeSet::new(),
            steps: Vec::new(),
            live_tris,
            ordered_verts: vec![0; vert_count],
            permute_verts: vec![u32::MAX; vert_count],
            new_indices: vec![0; 3 * live_tris],
            next_vert_slot: vert_count,
            next_tri_slot: live_tris,
        })
    }

    /// Run the full pipeline and return the collapse records. The caller's
    /// mesh buffers are reordered in place; `records[0]` describes the full
    /// detail state of the reordered buffers.
    pub fn simplify(mut self) -> anyhow::Result<Vec<CollapseRecord>> {
        self.initialise_heap();
        self.collapse_loop()?;
        self.reorder();
        Ok(self.compute_records())
    }

    fn initialise_heap(&mut self) {
        self.heap = CollapseCostHeap::with_capacity(self.mesh.edge_count());
        for (edge, tris) in self.mesh.iter_edges() {
            let cost = collapse_cost(edge, tris, &self.tri_mesh.positions, &self.config);
            self.heap.push(edge, cost);
        }
    }

    fn collapse_loop(&mut self) -> anyhow::Result<()> {
        #[cfg(feature = "progress")]
        let bar = indicatif::ProgressBar::new(self.mesh.vert_count() as u64);

        // infinite minimum means every surviving edge is pinned
        while let Some((edge, cost)) = self.heap.peek() {
            if !cost.is_finite() {
                break;
            }
            self.try_collapse(edge)?;

            #[cfg(feature = "progress")]
            bar.set_position((self.tri_mesh.positions.len() - self.next_vert_slot) as u64);
        }

        #[cfg(feature = "progress")]
        bar.finish_and_clear();

        debug!(
            "Collapse loop done: {} collapses, {} verts and {} tris remain",
            self.steps.len(),
            self.mesh.vert_count(),
            self.mesh.tri_count()
        );

        self.flush_verts();
        self.flush_tris();
        Ok(())
    }

    /// Collapse the cheapest candidate, or pin it at infinite cost if no
    /// endpoint can be thrown without damaging the surrounding surface.
    fn try_collapse(&mut self, edge: Edge) -> anyhow::Result<()> {
        let throw = edge.verts().into_iter().find(|&v| self.can_throw(edge, v));

        let Some(throw) = throw else {
            self.heap.update(edge, f32::INFINITY);
            return Ok(());
        };
        let keep = edge.other(throw);

        if self.collapse_causes_folding(keep, throw)? {
            // rejected edges are never retried
            self.heap.update(edge, f32::INFINITY);
            return Ok(());
        }

        self.heap.remove(edge);
        self.collapse_edge(keep, throw)
    }

    /// An endpoint may be thrown when every incident edge is manifold, or
    /// when the edge's two triangles are the only triangles at both
    /// endpoints. The latter is an isolated quad: collapsing deletes both
    /// triangles outright, so nothing survives to be reshaped and no
    /// boundary edge moves.
    fn can_throw(&self, edge: Edge, v: VertID) -> bool {
        let Some(vert) = self.mesh.vert(v) else {
            return false;
        };

        if vert
            .edges()
            .iter()
            .all(|&e| self.mesh.edge(e).is_some_and(EdgeTris::is_manifold))
        {
            return true;
        }

        let Some(tris) = self.mesh.edge(edge) else {
            return false;
        };
        let fan_on_edge = |v: VertID| {
            self.mesh
                .vert(v)
                .is_some_and(|vert| vert.tris().iter().all(|t| tris.as_slice().contains(t)))
        };
        tris.is_manifold() && fan_on_edge(v) && fan_on_edge(edge.other(v))
    }

    /// Would rewriting `throw` to `keep` produce a triangle that already
    /// exists in either winding? Such a collapse folds the surface over on
    /// itself.
    fn collapse_causes_folding(&self, keep: VertID, throw: VertID) -> Result<bool, MeshError> {
        let vert = self.mesh.vert(throw).ok_or(MeshError::MissingVertex(throw))?;

        for &tri in vert.tris() {
            // triangles on the collapse edge are deleted, not rewritten
            if tri.contains(keep) {
                continue;
            }
            let (a, b) = tri.opposite_edge_verts(throw);
            if self.mesh.contains_triangle(Triangle::new(keep, a, b))
                || self.mesh.contains_triangle(Triangle::new(keep, b, a))
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn collapse_edge(&mut self, keep: VertID, throw: VertID) -> anyhow::Result<()> {
        self.deleted_verts.clear();

        let edge = Edge::new(keep, throw);
        let shared = self
            .mesh
            .edge(edge)
            .ok_or(MeshError::CollapseNotManifold(keep, throw))?;
        if !shared.is_manifold() {
            return Err(MeshError::CollapseNotManifold(keep, throw).into());
        }
        let shared: Vec<Triangle> = shared.as_slice().to_vec();
        let tris_removed = shared.len() as u32;
        for tri in shared {
            self.remove_tri_recorded(tri);
        }

        // surviving triangles around throw migrate to keep
        let survivors: Vec<Triangle> = self
            .mesh
            .vert(throw)
            .map(|vert| vert.tris().iter().copied().collect())
            .unwrap_or_default();
        for tri in survivors {
            self.modify_triangle(tri, keep, throw);
        }

        // every edge on a triangle around keep may have changed cost
        let mut modified = BTreeSet::new();
        if let Some(vert) = self.mesh.vert(keep) {
            for tri in vert.tris() {
                modified.extend(tri.edges());
            }
        }
        for edge in modified {
            if let Some(tris) = self.mesh.edge(edge) {
                let cost = collapse_cost(edge, tris, &self.tri_mesh.positions, &self.config);
                self.heap.push_or_update(edge, cost);
            }
        }

        let verts_removed = self.deleted_verts.len() as u32;
        let deleted: Vec<VertID> = self.deleted_verts.iter().copied().collect();
        for vert in deleted {
            self.place_vert(vert);
        }

        self.steps.push(CollapseStep {
            keep,
            throw,
            verts_removed,
            tris_removed,
        });
        Ok(())
    }

    /// Remove a triangle for good, flushing its original index triple into
    /// the next reordered slot from the top down.
    fn remove_tri_recorded(&mut self, tri: Triangle) {
        if let Some(src) = self.mesh.source_index(tri) {
            self.next_tri_slot -= 1;
            let dst = 3 * self.next_tri_slot;
            let src = 3 * src as usize;
            self.new_indices[dst..dst + 3].copy_from_slice(&self.tri_mesh.indices[src..src + 3]);
        }

        let mut sync = HeapSync {
            heap: &mut self.heap,
            deleted_verts: &mut self.deleted_verts,
            positions: &self.tri_mesh.positions,
            config: &self.config,
        };
        self.mesh.remove_triangle(tri, &mut sync);
    }

    /// Rewrite one triangle's `throw` corner to `keep`, carrying the source
    /// index across. The triangle is not flushed: it lives on under its new
    /// vertices.
    fn modify_triangle(&mut self, tri: Triangle, keep: VertID, throw: VertID) {
        let src = self.mesh.source_index(tri);

        let mut sync = HeapSync {
            heap: &mut self.heap,
            deleted_verts: &mut self.deleted_verts,
            positions: &self.tri_mesh.positions,
            config: &self.config,
        };
        self.mesh.remove_triangle(tri, &mut sync);

        let [a, b, c] = tri.verts().map(|v| if v == throw { keep } else { v });
        let new_tri = Triangle::new(a, b, c);

        let mut sync = HeapSync {
            heap: &mut self.heap,
            deleted_verts: &mut self.deleted_verts,
            positions: &self.tri_mesh.positions,
            config: &self.config,
        };
        self.mesh.insert_triangle(new_tri, &mut sync);
        self.mesh.set_source_index(new_tri, src);
    }

    fn place_vert(&mut self, vert: VertID) {
        self.next_vert_slot -= 1;
        self.ordered_verts[self.next_vert_slot] = vert.0;
        self.permute_verts[usize::from(vert)] = self.next_vert_slot as u32;
    }

    /// Survivors of the collapse loop take the lowest slots, so the coarsest
    /// resolution is a prefix of the reordered buffers.
    fn flush_verts(&mut self) {
        let remaining: Vec<VertID> = self.mesh.iter_verts().map(|(v, _)| v).collect();
        for vert in remaining {
            self.place_vert(vert);
        }

        // vertices never referenced by a triangle still need slots
        for id in 0..self.permute_verts.len() {
            if self.permute_verts[id] == u32::MAX {
                self.place_vert(VertID(id as u32));
            }
        }
        debug_assert_eq!(self.next_vert_slot, 0);
    }

    fn flush_tris(&mut self) {
        let remaining: Vec<u32> = self
            .mesh
            .iter_tris()
            .filter_map(|(_, info)| info.source_index)
            .collect();
        for src in remaining {
            self.next_tri_slot -= 1;
            let dst = 3 * self.next_tri_slot;
            let src = 3 * src as usize;
            self.new_indices[dst..dst + 3].copy_from_slice(&self.tri_mesh.indices[src..src + 3]);
        }
        debug_assert_eq!(self.next_tri_slot, 0);
    }

    /// Permute every vertex stream and the index buffer into removal order,
    /// and rewrite the recorded steps into the new numbering.
    fn reorder(&mut self) {
        fn permute<T: Copy>(stream: &mut Vec<T>, order: &[u32]) {
            *stream = order.iter().map(|&old| stream[old as usize]).collect();
        }

        permute(&mut self.tri_mesh.positions, &self.ordered_verts);
        if let Some(normals) = &mut self.tri_mesh.normals {
            permute(normals, &self.ordered_verts);
        }
        if let Some(colours) = &mut self.tri_mesh.colours {
            permute(colours, &self.ordered_verts);
        }
        if let Some(texcoords) = &mut self.tri_mesh.texcoords {
            permute(texcoords, &self.ordered_verts);
        }

        self.tri_mesh.indices.truncate(3 * self.live_tris);
        for (slot, &old) in self.new_indices.iter().enumerate() {
            self.tri_mesh.indices[slot] = self.permute_verts[old as usize];
        }

        for step in &mut self.steps {
            step.keep = VertID(self.permute_verts[usize::from(step.keep)]);
            step.throw = VertID(self.permute_verts[usize::from(step.throw)]);
        }
    }

    /// Replay the collapse order against the reordered index buffer. Each
    /// step shrinks the live prefix, rewrites the throw vertex to the keep
    /// vertex inside it, and records the touched slots; the buffer is then
    /// expanded back to full detail.
    fn compute_records(&mut self) -> Vec<CollapseRecord> {
        let mut vert_count = self.tri_mesh.positions.len() as u32;
        let mut tri_count = self.live_tris as u32;

        let mut records = Vec::with_capacity(self.steps.len() + 1);
        records.push(CollapseRecord::base(vert_count, tri_count));

        for step in &self.steps {
            vert_count -= step.verts_removed;
            tri_count -= step.tris_removed;

            let mut record =
                CollapseRecord::new(step.keep.0, step.throw.0, vert_count, tri_count);
            for slot in 0..3 * tri_count as usize {
                if self.tri_mesh.indices[slot] == step.throw.0 {
                    self.tri_mesh.indices[slot] = step.keep.0;
                    record.slots.push(slot as u32);
                }
            }
            records.push(record);
        }

        // leave the buffer at full detail
        for record in records[1..].iter().rev() {
            for &slot in &record.slots {
                self.tri_mesh.indices[slot as usize] = record.vert_to_throw;
            }
        }

        records
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    pub fn tri_mesh(positions: &[[f32; 3]], indices: &[u32]) -> TriMesh {
        TriMesh {
            positions: positions.iter().map(|&p| Vec3::from_array(p)).collect(),
            indices: indices.to_vec(),
            ..Default::default()
        }
    }

    /// Unit cube, 8 vertices, 12 triangles, closed manifold.
    pub fn cube() -> TriMesh {
        tri_mesh(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            &[
                0, 2, 1, 0, 3, 2, // -z
                4, 5, 6, 4, 6, 7, // +z
                0, 1, 5, 0, 5, 4, // -y
                3, 6, 2, 3, 7, 6, // +y
                1, 2, 6, 1, 6, 5, // +x
                0, 4, 7, 0, 7, 3, // -x
            ],
        )
    }

    /// Flat 3x3 vertex grid, 8 triangles. Only the centre vertex (id 4) has
    /// an all-manifold edge fan.
    pub fn grid() -> TriMesh {
        let mut positions = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                positions.push([x as f32, y as f32, 0.0]);
            }
        }
        let mut indices = Vec::new();
        for y in 0..2u32 {
            for x in 0..2u32 {
                let i = 3 * y + x;
                indices.extend_from_slice(&[i, i + 1, i + 4, i, i + 4, i + 3]);
            }
        }
        tri_mesh(&positions, &indices)
    }

    fn simplify(mesh: &mut TriMesh) -> Vec<CollapseRecord> {
        Simplifier::new(mesh, ReduceConfig::default())
            .unwrap()
            .simplify()
            .unwrap()
    }

    fn assert_counts_non_increasing(records: &[CollapseRecord]) {
        for pair in records.windows(2) {
            assert!(pair[1].vert_count < pair[0].vert_count);
            assert!(pair[1].tri_count <= pair[0].tri_count);
        }
    }

    #[test]
    fn single_triangle_never_collapses() {
        let mut mesh = tri_mesh(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[0, 1, 2],
        );
        let records = simplify(&mut mesh);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vert_count, 3);
        assert_eq!(records[0].tri_count, 1);

        // reordering may permute the vertices, but the triangle survives
        let mut referenced = mesh.indices.clone();
        referenced.sort_unstable();
        assert_eq!(referenced, vec![0, 1, 2]);
    }

    #[test]
    fn quad_collapses_to_the_empty_floor() {
        let mut mesh = tri_mesh(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[0, 1, 2, 0, 2, 3],
        );
        let records = simplify(&mut mesh);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tri_count, 2);
        assert_eq!(records[1].tri_count, 0);
        assert_eq!(records[1].vert_count, 0);
        assert!(records[1].slots.is_empty());
    }

    #[test]
    fn cube_terminates_with_shrinking_counts() {
        let mut mesh = cube();
        let records = simplify(&mut mesh);

        assert!(records.len() >= 2);
        assert_eq!(records[0].vert_count, 8);
        assert_eq!(records[0].tri_count, 12);
        assert_counts_non_increasing(&records);

        // a closed manifold bottoms out at a tetrahedron
        let last = records.last().unwrap();
        assert_eq!(last.tri_count, 4);
        assert_eq!(last.vert_count, 4);
    }

    #[test]
    fn grid_boundary_survives() {
        let mut mesh = grid();
        let records = simplify(&mut mesh);

        // only the centre vertex is collapsible, once
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].vert_count, 8);
        assert_eq!(records[1].tri_count, 6);

        // apply the record, then check every corner is still referenced
        let mut indices = mesh.indices.clone();
        for &slot in &records[1].slots {
            indices[slot as usize] = records[1].vert_to_keep;
        }
        let live = &indices[..3 * records[1].tri_count as usize];
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
        ];
        for corner in corners {
            assert!(
                live.iter().any(|&i| mesh.positions[i as usize] == corner),
                "corner {corner} missing at coarse level"
            );
        }
    }

    #[test]
    fn duplicate_triangles_are_dropped() {
        let mut mesh = tri_mesh(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[0, 1, 2, 1, 2, 0],
        );
        let records = simplify(&mut mesh);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tri_count, 1);
        assert_eq!(mesh.indices.len(), 3);
    }

    #[test]
    fn validation_rejects_bad_input() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

        let mut ragged = tri_mesh(&positions, &[0, 1]);
        assert!(matches!(
            Simplifier::new(&mut ragged, ReduceConfig::default()),
            Err(MeshError::RaggedIndexBuffer(2))
        ));

        let mut out_of_range = tri_mesh(&positions, &[0, 1, 9]);
        assert!(matches!(
            Simplifier::new(&mut out_of_range, ReduceConfig::default()),
            Err(MeshError::VertOutOfRange(9, 3, 0))
        ));

        let mut degenerate = tri_mesh(&positions, &[0, 1, 1]);
        assert!(matches!(
            Simplifier::new(&mut degenerate, ReduceConfig::default()),
            Err(MeshError::DegenerateTriangle(0))
        ));
    }

    #[test]
    fn unreferenced_vertices_keep_slots() {
        let mut mesh = tri_mesh(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [9.0, 9.0, 9.0], // never indexed
            ],
            &[0, 1, 2],
        );
        let records = simplify(&mut mesh);

        assert_eq!(records[0].vert_count, 4);
        assert_eq!(mesh.positions.len(), 4);
        assert!(mesh
            .positions
            .contains(&Vec3::new(9.0, 9.0, 9.0)));
    }
}
