use std::collections::BTreeMap;

use thiserror::Error;

use super::edge::{Edge, EdgeTris};
use super::triangle::{TriInfo, Triangle};
use super::vertex::{VertID, Vertex};

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Index count {0} is not a multiple of 3")]
    RaggedIndexBuffer(usize),
    #[error("Vertex id {0} out of range for {1} vertices (triangle {2})")]
    VertOutOfRange(u32, usize, usize),
    #[error("Degenerate triangle {0} references a vertex twice")]
    DegenerateTriangle(usize),
    #[error("Attribute stream holds {0} entries for {1} vertices")]
    RaggedAttributes(usize, usize),
    #[error("Collapse candidate {0}-{1} is no longer manifold")]
    CollapseNotManifold(VertID, VertID),
    #[error("Vertex {0} vanished mid-collapse")]
    MissingVertex(VertID),
}

/// Observer for mesh mutation. [`AdjacencyMesh::insert_triangle`] and
/// [`AdjacencyMesh::remove_triangle`] fan each change out through these
/// callbacks, with `created`/`destroyed` telling a brand-new or fully
/// removed entity apart from an update to an existing one.
///
/// Insertion hooks fire after the maps reflect the change; removal hooks
/// fire just before a destroyed entity is dropped, so the callee can still
/// query surrounding state.
pub trait MeshHooks {
    fn on_vert_insert(&mut self, _vert: VertID, _created: bool) {}
    fn on_vert_remove(&mut self, _vert: VertID, _destroyed: bool) {}
    fn on_edge_insert(&mut self, _edge: Edge, _created: bool, _tris: &EdgeTris) {}
    fn on_edge_remove(&mut self, _edge: Edge, _destroyed: bool) {}
    fn on_tri_insert(&mut self, _tri: Triangle, _created: bool) {}
    fn on_tri_remove(&mut self, _tri: Triangle, _destroyed: bool) {}
}

/// Hook-free mutation.
impl MeshHooks for () {}

/// Vertex-edge-triangle adjacency over canonical keys. Purely topological:
/// vertex ids index the caller's attribute arrays, and the maps carry only
/// connectivity plus small payloads.
#[derive(Default, Debug, Clone)]
pub struct AdjacencyMesh {
    verts: BTreeMap<VertID, Vertex>,
    edges: BTreeMap<Edge, EdgeTris>,
    tris: BTreeMap<Triangle, TriInfo>,
}

impl AdjacencyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vert_count(&self) -> usize {
        self.verts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn tri_count(&self) -> usize {
        self.tris.len()
    }

    pub fn vert(&self, v: VertID) -> Option<&Vertex> {
        self.verts.get(&v)
    }

    pub fn edge(&self, e: Edge) -> Option<&EdgeTris> {
        self.edges.get(&e)
    }

    pub fn contains_triangle(&self, t: Triangle) -> bool {
        self.tris.contains_key(&t)
    }

    pub fn source_index(&self, t: Triangle) -> Option<u32> {
        self.tris.get(&t).and_then(|info| info.source_index)
    }

    pub fn set_source_index(&mut self, t: Triangle, source_index: Option<u32>) {
        if let Some(info) = self.tris.get_mut(&t) {
            info.source_index = source_index;
        }
    }

    pub fn iter_verts(&self) -> impl Iterator<Item = (VertID, &Vertex)> {
        self.verts.iter().map(|(&v, vert)| (v, vert))
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (Edge, &EdgeTris)> {
        self.edges.iter().map(|(&e, tris)| (e, tris))
    }

    pub fn iter_tris(&self) -> impl Iterator<Item = (Triangle, &TriInfo)> {
        self.tris.iter().map(|(&t, info)| (t, info))
    }

    /// No edge is shared by more than two triangles.
    pub fn is_manifold(&self) -> bool {
        self.edges.values().all(|tris| tris.len() <= 2)
    }

    /// Every edge is shared by exactly two triangles.
    pub fn is_closed(&self) -> bool {
        self.edges.values().all(EdgeTris::is_manifold)
    }

    /// Insert `tri`, upserting its vertices and edges, then notify `hooks`.
    /// Re-inserting a live triangle resets its payload.
    pub fn insert_triangle(&mut self, tri: Triangle, hooks: &mut impl MeshHooks) {
        let verts = tri.verts();
        let edges = tri.edges();

        let had_tri = self.tris.insert(tri, TriInfo::default()).is_some();

        let mut had_vert = [false; 3];
        for (i, &v) in verts.iter().enumerate() {
            had_vert[i] = self.verts.contains_key(&v);
            let vert = self.verts.entry(v).or_default();
            vert.add_tri(tri);
            // each vertex picks up the two triangle edges it touches
            vert.add_edge(edges[i]);
            vert.add_edge(edges[(i + 2) % 3]);
        }

        let mut had_edge = [false; 3];
        for (i, &e) in edges.iter().enumerate() {
            had_edge[i] = self.edges.contains_key(&e);
            self.edges.entry(e).or_default().add_tri(tri);
        }

        for (i, &v) in verts.iter().enumerate() {
            hooks.on_vert_insert(v, !had_vert[i]);
        }
        for (i, &e) in edges.iter().enumerate() {
            let tris = &self.edges[&e];
            hooks.on_edge_insert(e, !had_edge[i], tris);
        }
        hooks.on_tri_insert(tri, !had_tri);
    }

    /// Remove `tri`, dropping vertices and edges left with no incident
    /// triangles, then notify `hooks`. Removing an absent triangle is a
    /// no-op.
    pub fn remove_triangle(&mut self, tri: Triangle, hooks: &mut impl MeshHooks) {
        if !self.tris.contains_key(&tri) {
            return;
        }

        let verts = tri.verts();
        let edges = tri.edges();

        for &v in &verts {
            if let Some(vert) = self.verts.get_mut(&v) {
                vert.remove_tri(tri);
            }
        }
        for &e in &edges {
            let emptied = match self.edges.get_mut(&e) {
                Some(tris) => {
                    tris.remove_tri(tri);
                    tris.is_empty()
                }
                None => false,
            };
            // an edge with no remaining triangles leaves its endpoints too
            if emptied {
                for v in e.verts() {
                    if let Some(vert) = self.verts.get_mut(&v) {
                        vert.remove_edge(e);
                    }
                }
            }
        }

        for &v in &verts {
            let destroyed = self.verts.get(&v).is_some_and(Vertex::is_isolated);
            hooks.on_vert_remove(v, destroyed);
            if destroyed {
                self.verts.remove(&v);
            }
        }
        for &e in &edges {
            let destroyed = self.edges.get(&e).is_some_and(EdgeTris::is_empty);
            hooks.on_edge_remove(e, destroyed);
            if destroyed {
                self.edges.remove(&e);
            }
        }
        hooks.on_tri_remove(tri, true);
        self.tris.remove(&tri);
    }
}
