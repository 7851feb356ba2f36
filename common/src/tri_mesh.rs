use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use glam::{Vec2, Vec3, Vec4};
use gltf::mesh::util::ReadIndices;

/// Indexed triangle soup pulled straight from a mesh file, before baking.
/// Attribute streams other than positions are optional and, when present,
/// run parallel to `positions`.
#[derive(Debug, Default, Clone)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub colours: Option<Vec<Vec4>>,
    pub texcoords: Option<Vec<Vec2>>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    /// Load from `.gltf`/`.glb`/`.obj`, picked by extension.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "gltf" | "glb" => Self::from_gltf(path),
            "obj" => Self::from_obj(path),
            other => anyhow::bail!("Unsupported mesh format: {other:?}"),
        }
    }

    /// Reads the first primitive of the first mesh in the document.
    pub fn from_gltf(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let (doc, buffers, _) = gltf::import(&path)
            .with_context(|| format!("Failed to import {:?}", path.as_ref()))?;

        let mesh = doc.meshes().next().context("glTF document has no mesh")?;
        let prim = mesh
            .primitives()
            .next()
            .context("glTF mesh has no primitives")?;
        let reader = prim.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("glTF primitive has no positions")?
            .map(Vec3::from_array)
            .collect();

        let normals = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from_array).collect());
        let colours = reader
            .read_colors(0)
            .map(|c| c.into_rgba_f32().map(Vec4::from_array).collect());
        let texcoords = reader
            .read_tex_coords(0)
            .map(|t| t.into_f32().map(Vec2::from_array).collect());

        let indices = match reader.read_indices() {
            Some(ReadIndices::U8(iter)) => iter.map(u32::from).collect(),
            Some(ReadIndices::U16(iter)) => iter.map(u32::from).collect(),
            Some(ReadIndices::U32(iter)) => iter.collect(),
            None => (0..positions.len() as u32).collect(),
        };

        Ok(Self {
            positions,
            normals,
            colours,
            texcoords,
            indices,
        })
    }

    pub fn from_obj(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {:?}", path.as_ref()))?;
        let model: obj::Obj<obj::Vertex, u32> = obj::load_obj(BufReader::new(file))
            .with_context(|| format!("Failed to parse {:?}", path.as_ref()))?;

        let positions = model
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.position))
            .collect();
        let normals = model
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.normal))
            .collect();

        Ok(Self {
            positions,
            normals: Some(normals),
            colours: None,
            texcoords: None,
            indices: model.indices,
        })
    }

    pub fn vert_count(&self) -> usize {
        self.positions.len()
    }

    pub fn tri_count(&self) -> usize {
        self.indices.len() / 3
    }
}
