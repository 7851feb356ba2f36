use common::{BoundingSphere, CollapseRecord};
use glam::Vec3;

/// Maps a mesh's projected screen coverage to a collapse record, with
/// hysteresis so small camera moves do not churn the index buffer.
///
/// The projected area of the bounding sphere times `tris_per_pixel` gives a
/// triangle budget; the coarsest record still meeting the budget wins.
#[derive(Debug, Clone)]
pub struct ScreenSpaceLodSelector {
    tris_per_pixel: f32,
    distance_tolerance: f32,
    last_distance: f32,
    target: usize,
}

impl ScreenSpaceLodSelector {
    pub fn new(tris_per_pixel: f32) -> Self {
        Self {
            tris_per_pixel,
            distance_tolerance: 1.0,
            last_distance: f32::NEG_INFINITY,
            target: 0,
        }
    }

    /// Distance change below which the previous choice is kept.
    pub fn with_distance_tolerance(mut self, distance_tolerance: f32) -> Self {
        self.distance_tolerance = distance_tolerance;
        self
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Pick the record to display for a camera at `camera_pos` and a
    /// viewport `screen_width` pixels wide. `records` must be non-empty.
    pub fn choose_target(
        &mut self,
        records: &[CollapseRecord],
        bounds: &BoundingSphere,
        camera_pos: Vec3,
        screen_width: u32,
    ) -> usize {
        let distance = bounds.distance_to(camera_pos);

        if (distance - self.last_distance).abs() <= self.distance_tolerance {
            return self.target;
        }
        // no finer level exists while approaching, none coarser while receding
        if self.last_distance > distance && self.target == 0 {
            return self.target;
        }
        if self.last_distance < distance && self.target == records.len() - 1 {
            return self.target;
        }
        self.last_distance = distance;

        let desired_tris = self.projected_area(bounds, distance, screen_width) * self.tris_per_pixel;

        self.target = 0;
        for (i, record) in records.iter().enumerate().rev() {
            if record.tri_count as f32 >= desired_tris {
                self.target = i;
                break;
            }
        }
        self.target
    }

    /// Screen area of the bounding sphere in pixels. A camera inside the
    /// sphere projects to infinite area, which forces full detail.
    fn projected_area(&self, bounds: &BoundingSphere, distance: f32, screen_width: u32) -> f32 {
        let radius = bounds.radius() * screen_width as f32 / (2.0 * distance);
        std::f32::consts::PI * radius * radius
    }
}
