//! Mesh file -> glass USDZ conversion pipeline

use glam::DVec3;
use std::path::Path;

use crate::error::Result;
use crate::formats::{package_usdz, usda_to_bytes, Compression};
use crate::material::attach_glass_material;
use crate::mesh::{center_mesh, load_asset, Bounds, LoadedAsset, Mesh};
use crate::scene::{to_geometry_node, Scene};

/// Result of in-memory conversion
#[derive(Debug, Clone)]
pub struct ConvertedScene {
    /// File name of the layer inside the container (`<stem>.usda`)
    pub layer_name: String,
    /// Serialized .usda layer
    pub usda: Vec<u8>,
    /// Complete .usdz container
    pub usdz: Vec<u8>,
    pub vertex_count: usize,
    pub face_count: usize,
    /// Centroid the mesh was moved by
    pub centroid: DVec3,
    /// Bounds before centering
    pub bounds: Bounds,
}

/// Build the glass scene for one mesh: center, emit geometry, bind glass
pub fn build_scene(mesh: &Mesh) -> Result<(Scene, DVec3, Bounds)> {
    let centered = center_mesh(mesh)?;
    let mut geometry = to_geometry_node(&centered.mesh)?;
    let material = attach_glass_material(&mut geometry);
    Ok((Scene::new(geometry, material), centered.centroid, centered.bounds))
}

/// Convert an already loaded asset into a USDZ container
///
/// Containers with several meshes contribute only their first mesh.
pub fn convert_asset(
    asset: LoadedAsset,
    stem: &str,
    compression: Compression,
) -> Result<ConvertedScene> {
    let mesh = asset.into_primary_mesh()?;
    let (scene, centroid, bounds) = build_scene(&mesh)?;

    let layer_name = format!("{}.usda", stem);
    let usda = usda_to_bytes(&scene)?;
    let usdz = package_usdz(&layer_name, &usda, compression)?;

    Ok(ConvertedScene {
        layer_name,
        usda,
        usdz,
        vertex_count: scene.geometry.points.len(),
        face_count: scene.geometry.face_count(),
        centroid,
        bounds,
    })
}

/// Load a mesh file and convert it into a USDZ container (in memory)
pub fn convert_one(input: &Path, stem: &str, compression: Compression) -> Result<ConvertedScene> {
    tracing::info!("Loading mesh: {}", input.display());
    let asset = load_asset(input)?;
    let converted = convert_asset(asset, stem, compression)?;

    tracing::info!(
        "Converted {}: {} vertices, {} faces, centroid=({:.4}, {:.4}, {:.4}), size={:.4}",
        input.display(),
        converted.vertex_count,
        converted.face_count,
        converted.centroid.x,
        converted.centroid.y,
        converted.centroid.z,
        converted.bounds.max_dimension()
    );

    Ok(converted)
}
