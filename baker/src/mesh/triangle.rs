use glam::Vec3;

use super::edge::Edge;
use super::vertex::VertID;

/// Vertex triple in canonical form: rotated so the smallest id leads, with
/// the winding preserved. Derived equality therefore accepts either cyclic
/// rotation of the same winding and rejects the reversed winding.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Triangle([VertID; 3]);

impl Triangle {
    pub fn new(v0: VertID, v1: VertID, v2: VertID) -> Self {
        assert!(
            v0 != v1 && v1 != v2 && v2 != v0,
            "Degenerate triangle ({v0}, {v1}, {v2})"
        );

        if v0 < v1 {
            if v0 < v2 {
                Self([v0, v1, v2])
            } else {
                Self([v2, v0, v1])
            }
        } else if v1 < v2 {
            Self([v1, v2, v0])
        } else {
            Self([v2, v0, v1])
        }
    }

    pub fn verts(self) -> [VertID; 3] {
        self.0
    }

    pub fn contains(self, v: VertID) -> bool {
        self.0.contains(&v)
    }

    pub fn edges(self) -> [Edge; 3] {
        let [v0, v1, v2] = self.0;
        [Edge::new(v0, v1), Edge::new(v1, v2), Edge::new(v2, v0)]
    }

    /// The other two vertices, in cyclic order after `v`.
    pub fn opposite_edge_verts(self, v: VertID) -> (VertID, VertID) {
        debug_assert!(self.contains(v));
        let i = self.0.iter().position(|&x| x == v).unwrap_or(0);
        (self.0[(i + 1) % 3], self.0[(i + 2) % 3])
    }

    /// Face normal scaled by twice the triangle area. Deliberately left
    /// un-normalised so the collapse metric weights larger faces heavier.
    pub fn scaled_normal(self, positions: &[Vec3]) -> Vec3 {
        let [v0, v1, v2] = self.0;
        let p0 = positions[usize::from(v0)];
        let p1 = positions[usize::from(v1)];
        let p2 = positions[usize::from(v2)];
        (p1 - p0).cross(p2 - p0)
    }
}

/// Per-triangle payload: where the triangle sat in the caller's original
/// index buffer, used when rebuilding the reordered buffer.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriInfo {
    pub source_index: Option<u32>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn v(i: u32) -> VertID {
        VertID(i)
    }

    #[test]
    fn rotations_are_equal() {
        let a = Triangle::new(v(4), v(9), v(2));
        let b = Triangle::new(v(9), v(2), v(4));
        let c = Triangle::new(v(2), v(4), v(9));

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.verts()[0], v(2));
    }

    #[test]
    fn reversed_winding_is_distinct() {
        let front = Triangle::new(v(0), v(1), v(2));
        let back = Triangle::new(v(0), v(2), v(1));

        assert_ne!(front, back);
    }

    #[test]
    fn opposite_edge_keeps_cyclic_order() {
        let t = Triangle::new(v(5), v(1), v(3));

        assert_eq!(t.opposite_edge_verts(v(1)), (v(3), v(5)));
        assert_eq!(t.opposite_edge_verts(v(3)), (v(5), v(1)));
        assert_eq!(t.opposite_edge_verts(v(5)), (v(1), v(3)));
    }

    #[test]
    #[should_panic]
    fn degenerate_triangle_panics() {
        Triangle::new(v(1), v(1), v(2));
    }
}
