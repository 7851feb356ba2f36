use glam::Vec3;

use super::triangle::Triangle;
use super::vertex::VertID;

/// Unordered vertex pair in canonical form: the smaller id first. Two edges
/// over the same endpoints compare equal regardless of construction order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge([VertID; 2]);

impl Edge {
    pub fn new(a: VertID, b: VertID) -> Self {
        assert_ne!(a, b, "Degenerate edge at vertex {a}");
        if a < b {
            Self([a, b])
        } else {
            Self([b, a])
        }
    }

    pub fn verts(self) -> [VertID; 2] {
        self.0
    }

    pub fn contains(self, v: VertID) -> bool {
        self.0[0] == v || self.0[1] == v
    }

    /// The endpoint that is not `v`.
    pub fn other(self, v: VertID) -> VertID {
        debug_assert!(self.contains(v));
        if self.0[0] == v {
            self.0[1]
        } else {
            self.0[0]
        }
    }

    pub fn length(self, positions: &[Vec3]) -> f32 {
        positions[usize::from(self.0[0])].distance(positions[usize::from(self.0[1])])
    }
}

/// Triangles currently sharing an edge: one means boundary, two manifold,
/// three or more a junction. Only manifold edges ever collapse.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct EdgeTris {
    tris: Vec<Triangle>,
}

impl EdgeTris {
    pub fn len(&self) -> usize {
        self.tris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    pub fn is_boundary(&self) -> bool {
        self.tris.len() == 1
    }

    pub fn is_manifold(&self) -> bool {
        self.tris.len() == 2
    }

    pub fn as_slice(&self) -> &[Triangle] {
        &self.tris
    }

    /// The two sharing triangles, when the edge is manifold.
    pub fn pair(&self) -> Option<(Triangle, Triangle)> {
        match self.tris[..] {
            [a, b] => Some((a, b)),
            _ => None,
        }
    }

    pub(super) fn add_tri(&mut self, tri: Triangle) {
        debug_assert!(!self.tris.contains(&tri));
        self.tris.push(tri);
    }

    pub(super) fn remove_tri(&mut self, tri: Triangle) {
        self.tris.retain(|&t| t != tri);
    }
}
