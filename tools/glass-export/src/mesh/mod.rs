//! Mesh loading and centering (STL/OBJ/glTF -> Mesh)

mod centering;
mod gltf;
mod obj;
mod stl;
mod types;

use std::path::Path;

use crate::error::{ConversionError, Result};

// Re-export public API
pub use centering::{center_mesh, centroid, Bounds, Centered};
pub use self::gltf::load_gltf;
pub use obj::{load_obj, parse_obj};
pub use stl::{load_stl, parse_stl};
pub use types::{FaceIter, Faces, LoadedAsset, Mesh, MIN_FACE_ARITY};

#[cfg(test)]
pub(crate) use centering::tests::cube;

/// Load a mesh file, dispatching on its extension
///
/// Supports:
/// - .stl (binary or ASCII, multi-solid ASCII loads as a container)
/// - .obj (Wavefront OBJ, `o` objects load as a container)
/// - .gltf / .glb (glTF 2.0, one entry per glTF mesh)
pub fn load_asset(input: &Path) -> Result<LoadedAsset> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "stl" => load_stl(input),
        "obj" => load_obj(input),
        "gltf" | "glb" => load_gltf(input),
        _ => Err(ConversionError::UnsupportedFormat(input.to_path_buf())),
    }
}
