//! glTF/GLB mesh loading

use glam::DVec3;
use std::path::Path;

use super::types::{Faces, LoadedAsset, Mesh};
use crate::error::{ConversionError, Result};

/// Load every mesh of a glTF/GLB file
///
/// Each glTF mesh becomes one [`Mesh`] with all of its triangle primitives
/// concatenated. Node transforms are not applied: meshes stay in their own space.
pub fn load_gltf(input: &Path) -> Result<LoadedAsset> {
    let (document, buffers, _images) = gltf::import(input)
        .map_err(|e| ConversionError::parse(input, format!("failed to load glTF: {}", e)))?;

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        let mut vertices: Vec<DVec3> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    "{}: skipping {:?} primitive in mesh {}",
                    input.display(),
                    primitive.mode(),
                    mesh.index()
                );
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            // Positions (required)
            let Some(positions) = reader.read_positions() else {
                tracing::warn!(
                    "{}: primitive without positions in mesh {}",
                    input.display(),
                    mesh.index()
                );
                continue;
            };

            let before = vertices.len();
            vertices.extend(positions.map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)));
            let end = u32::try_from(vertices.len()).map_err(|_| {
                ConversionError::InvalidMesh(format!(
                    "mesh {} has more than {} vertices",
                    mesh.index(),
                    u32::MAX
                ))
            })?;
            // `before` <= `end`, so it fits as well
            let base = before as u32;
            let added = end - base;

            // Indices (optional) - non-indexed primitives are sequential triangles
            let start = indices.len();
            match reader.read_indices() {
                Some(iter) => {
                    for index in iter.into_u32() {
                        if index >= added {
                            return Err(ConversionError::parse(
                                input,
                                format!(
                                    "mesh {} primitive {}: index {} out of range for {} vertices",
                                    mesh.index(),
                                    primitive.index(),
                                    index,
                                    added
                                ),
                            ));
                        }
                        indices.push(base + index);
                    }
                }
                None => indices.extend(base..end),
            }
            if (indices.len() - start) % 3 != 0 {
                return Err(ConversionError::parse(
                    input,
                    format!(
                        "mesh {} primitive {}: {} indices do not form whole triangles",
                        mesh.index(),
                        primitive.index(),
                        indices.len() - start
                    ),
                ));
            }
        }

        let converted = Mesh::new(vertices, Faces::triangles(indices));
        meshes.push(match mesh.name() {
            Some(name) => converted.with_name(name),
            None => converted,
        });
    }

    LoadedAsset::from_meshes(meshes)
}
