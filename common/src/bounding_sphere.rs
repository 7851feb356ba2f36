use bincode::{Decode, Encode};
use glam::Vec3;

/// Center/radius bound over a vertex stream. Stored with the baked asset so
/// runtime LOD selection needs no pass over the geometry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Encode, Decode)]
pub struct BoundingSphere {
    center: [f32; 3],
    radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center: center.to_array(),
            radius,
        }
    }

    /// Centroid center, radius to the furthest point. Not minimal, but stable
    /// and cheap; an empty stream gives the zero sphere.
    pub fn from_points(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let center = points.iter().sum::<Vec3>() / points.len() as f32;
        let mut sphere = Self::new(center, 0.0);
        for &p in points {
            sphere.include_point(p);
        }
        sphere
    }

    pub fn center(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Grow the radius if `point` lies outside.
    pub fn include_point(&mut self, point: Vec3) {
        self.radius = self.radius.max(self.center().distance(point));
    }

    /// Distance from `point` to the sphere surface. Zero inside.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        (self.center().distance(point) - self.radius).max(0.0)
    }
}
