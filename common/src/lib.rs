pub mod asset;
pub mod bounding_sphere;
pub mod tri_mesh;

pub use bounding_sphere::BoundingSphere;
pub use tri_mesh::TriMesh;

use bincode::{Decode, Encode};

/// One reversible edge collapse, expressed against the reordered index buffer.
///
/// `slots` lists the index-buffer positions that referenced `vert_to_throw`
/// at the resolution just above this one. Applying the record writes
/// `vert_to_keep` into those slots; reverting writes `vert_to_throw` back.
/// `vert_count`/`tri_count` are the live counts once the record is applied.
#[derive(Debug, Default, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CollapseRecord {
    pub vert_to_keep: u32,
    pub vert_to_throw: u32,
    pub vert_count: u32,
    pub tri_count: u32,
    pub slots: Vec<u32>,
}

impl CollapseRecord {
    pub fn new(vert_to_keep: u32, vert_to_throw: u32, vert_count: u32, tri_count: u32) -> Self {
        Self {
            vert_to_keep,
            vert_to_throw,
            vert_count,
            tri_count,
            slots: Vec::new(),
        }
    }

    /// The base (full detail) record. Never replayed, so keep/throw hold a
    /// sentinel and the slot list stays empty.
    pub fn base(vert_count: u32, tri_count: u32) -> Self {
        Self::new(u32::MAX, u32::MAX, vert_count, tri_count)
    }
}

/// The baked artifact: vertex streams and indices reordered so that each
/// resolution occupies a prefix of the buffers, plus the collapse records
/// that walk between resolutions.
#[derive(Debug, Clone, Encode, Decode)]
pub struct ProgressiveMesh {
    pub name: String,

    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub colours: Option<Vec<[f32; 4]>>,
    pub texcoords: Option<Vec<[f32; 2]>>,

    /// Full-detail index buffer; record replay patches it in place.
    pub indices: Vec<u32>,

    /// `records[0]` is the base record; counts never increase along the array.
    pub records: Vec<CollapseRecord>,

    pub bounds: BoundingSphere,
}

impl asset::Asset for ProgressiveMesh {}

impl ProgressiveMesh {
    pub fn vert_count(&self) -> usize {
        self.positions.len()
    }

    pub fn tri_count(&self) -> usize {
        self.indices.len() / 3
    }
}
