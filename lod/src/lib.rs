pub mod lod_mesh;
pub mod selector;

pub use lod_mesh::LodMesh;
pub use selector::ScreenSpaceLodSelector;
