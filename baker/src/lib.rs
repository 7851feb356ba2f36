pub mod mesh;

use common::{BoundingSphere, ProgressiveMesh, TriMesh};
use log::info;

use mesh::{ReduceConfig, Simplifier};

/// Bake `tri_mesh` into a progressive mesh asset: run the edge-collapse
/// simplifier, then package the reordered streams, the collapse records,
/// and a bounding sphere for runtime selection.
pub fn bake(
    mut tri_mesh: TriMesh,
    name: String,
    config: ReduceConfig,
) -> anyhow::Result<ProgressiveMesh> {
    info!(
        "Baking {name}: {} verts, {} tris",
        tri_mesh.vert_count(),
        tri_mesh.tri_count()
    );

    let records = Simplifier::new(&mut tri_mesh, config)?.simplify()?;

    let coarsest = records.last().map_or(0, |r| r.tri_count);
    info!(
        "Baked {} collapse records, coarsest level {} tris",
        records.len(),
        coarsest
    );

    let bounds = BoundingSphere::from_points(&tri_mesh.positions);

    Ok(ProgressiveMesh {
        name,
        positions: tri_mesh.positions.iter().map(|v| v.to_array()).collect(),
        normals: tri_mesh
            .normals
            .map(|ns| ns.iter().map(|v| v.to_array()).collect()),
        colours: tri_mesh
            .colours
            .map(|cs| cs.iter().map(|v| v.to_array()).collect()),
        texcoords: tri_mesh
            .texcoords
            .map(|ts| ts.iter().map(|v| v.to_array()).collect()),
        indices: tri_mesh.indices,
        records,
        bounds,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::reduction::test::cube;

    #[test]
    fn bake_packages_records_and_bounds() {
        let asset = bake(cube(), "cube".to_owned(), ReduceConfig::default()).unwrap();

        assert_eq!(asset.vert_count(), 8);
        assert_eq!(asset.tri_count(), 12);
        assert_eq!(asset.records[0].vert_count, 8);
        assert!(asset.records.len() >= 2);
        assert!(asset.bounds.radius() > 0.0);
    }
}
