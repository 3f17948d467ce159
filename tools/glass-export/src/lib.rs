//! glass-export library
//!
//! Turns triangle meshes (STL, OBJ, glTF) into USDZ packages that show the mesh as
//! glass in AR viewers. The pipeline is load -> center -> geometry node -> glass
//! material -> .usda layer -> .usdz container.

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod material;
pub mod mesh;
pub mod scene;

// Re-export key types for conversion
pub use batch::{discover_inputs, export_one, run_batch, BatchSummary};
pub use config::BatchConfig;
pub use convert::{build_scene, convert_asset, convert_one, ConvertedScene};
pub use error::{ConversionError, Result};
pub use formats::Compression;
pub use material::{attach_glass_material, MaterialNode, PreviewSurface, GLASS};
pub use mesh::{center_mesh, load_asset, Bounds, Centered, Faces, LoadedAsset, Mesh};
pub use scene::{to_geometry_node, GeometryNode, Scene};
