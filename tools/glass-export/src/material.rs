//! Glass material preset

use crate::scene::{glass_path, GeometryNode, MATERIAL_PRIM, SHADER_PRIM};

/// Shader id of the only surface shader we emit
pub const PREVIEW_SURFACE_ID: &str = "UsdPreviewSurface";

/// `UsdPreviewSurface` inputs written by the exporter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSurface {
    pub diffuse_color: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
    pub ior: f32,
    pub opacity: f32,
    pub transmission_color: [f32; 3],
}

/// Clear, slightly blue glass: dielectric, sharp reflections, IOR 1.5, mostly transparent
pub const GLASS: PreviewSurface = PreviewSurface {
    diffuse_color: [0.9, 0.9, 0.95],
    metallic: 0.0,
    roughness: 0.05,
    ior: 1.5,
    opacity: 0.15,
    transmission_color: [0.95, 0.95, 1.0],
};

/// Material prim plus its surface shader
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialNode {
    pub path: String,
    pub shader_path: String,
    pub surface: PreviewSurface,
}

impl MaterialNode {
    /// Material with the glass preset at its canonical path
    pub fn glass() -> Self {
        let path = format!("{}/{}", glass_path(), MATERIAL_PRIM);
        Self {
            shader_path: format!("{}/{}", path, SHADER_PRIM),
            path,
            surface: GLASS,
        }
    }
}

/// Create the glass material and bind it to `geometry`
pub fn attach_glass_material(geometry: &mut GeometryNode) -> MaterialNode {
    let material = MaterialNode::glass();
    geometry.material_binding = Some(material.path.clone());
    material
}
