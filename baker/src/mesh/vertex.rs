use std::collections::BTreeSet;
use std::fmt;

use super::edge::Edge;
use super::triangle::Triangle;

/// Handle into the caller's parallel vertex attribute arrays.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VertID(pub u32);

impl From<usize> for VertID {
    fn from(value: usize) -> Self {
        VertID(value as u32)
    }
}

impl From<u32> for VertID {
    fn from(value: u32) -> Self {
        VertID(value)
    }
}

impl From<VertID> for usize {
    fn from(value: VertID) -> Self {
        value.0 as usize
    }
}

impl fmt::Display for VertID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Connectivity around one vertex. Ordered sets keep iteration deterministic,
/// so equal inputs always bake equal records.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    edges: BTreeSet<Edge>,
    tris: BTreeSet<Triangle>,
}

impl Vertex {
    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    pub fn tris(&self) -> &BTreeSet<Triangle> {
        &self.tris
    }

    /// No incident edges and no incident triangles.
    pub fn is_isolated(&self) -> bool {
        self.edges.is_empty() && self.tris.is_empty()
    }

    pub(super) fn add_edge(&mut self, edge: Edge) {
        self.edges.insert(edge);
    }

    pub(super) fn remove_edge(&mut self, edge: Edge) {
        self.edges.remove(&edge);
    }

    pub(super) fn add_tri(&mut self, tri: Triangle) {
        self.tris.insert(tri);
    }

    pub(super) fn remove_tri(&mut self, tri: Triangle) {
        self.tris.remove(&tri);
    }
}
