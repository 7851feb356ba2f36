pub mod adjacency;
pub mod edge;
pub mod heap;
pub mod reduction;
pub mod triangle;
pub mod vertex;

pub use adjacency::{AdjacencyMesh, MeshError, MeshHooks};
pub use edge::{Edge, EdgeTris};
pub use heap::CollapseCostHeap;
pub use reduction::{ReduceConfig, Simplifier};
pub use triangle::{TriInfo, Triangle};
pub use vertex::{VertID, Vertex};
