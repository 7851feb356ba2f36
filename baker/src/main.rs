use std::path::PathBuf;

use anyhow::Context;
use baker::mesh::ReduceConfig;
use clap::Parser;
use common::{asset::Asset, TriMesh};

/// Bake a triangle mesh into a progressive mesh asset.
#[derive(Parser)]
struct Args {
    /// Input mesh (.gltf/.glb/.obj).
    input: PathBuf,

    /// Output asset path.
    #[arg(short, long, default_value = "mesh.pmesh")]
    output: PathBuf,

    /// Weight on edge length in the collapse cost.
    #[arg(long, default_value_t = 10.0)]
    length_weight: f32,

    /// Weight on the face normal deviation in the collapse cost.
    #[arg(long, default_value_t = 1.0)]
    angle_weight: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tri_mesh =
        TriMesh::load(&args.input).with_context(|| format!("Failed to load {:?}", args.input))?;
    let name = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_owned());

    let config = ReduceConfig {
        length_weight: args.length_weight,
        angle_weight: args.angle_weight,
    };
    let asset = baker::bake(tri_mesh, name, config)?;

    asset
        .save(&args.output)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    println!(
        "Wrote {:?}: {} records, {} verts at full detail",
        args.output,
        asset.records.len(),
        asset.vert_count()
    );
    Ok(())
}
