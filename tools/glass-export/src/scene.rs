//! Scene graph built for one converted mesh
//!
//! Prim layout of every exported stage:
//!
//! ```text
//! /Snowglobe                      Xform (default prim)
//! /Snowglobe/Glass                Xform
//! /Snowglobe/Glass/Mesh           Mesh, bound to the material below
//! /Snowglobe/Glass/Material       Material
//! /Snowglobe/Glass/Material/GlassShader   UsdPreviewSurface
//! ```

use crate::error::{ConversionError, Result};
use crate::material::MaterialNode;
use crate::mesh::Mesh;

pub const ROOT_PRIM: &str = "Snowglobe";
pub const GLASS_PRIM: &str = "Glass";
pub const MESH_PRIM: &str = "Mesh";
pub const MATERIAL_PRIM: &str = "Material";
pub const SHADER_PRIM: &str = "GlassShader";

/// Stage up axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpAxis {
    Y,
    Z,
}

impl UpAxis {
    pub fn as_token(self) -> &'static str {
        match self {
            UpAxis::Y => "Y",
            UpAxis::Z => "Z",
        }
    }
}

/// Path of the prim grouping mesh and material
pub fn glass_path() -> String {
    format!("/{}/{}", ROOT_PRIM, GLASS_PRIM)
}

/// Mesh geometry in USD attribute form
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryNode {
    /// Prim path of the mesh
    pub path: String,
    pub points: Vec<[f32; 3]>,
    /// Number of indices of each face
    pub face_vertex_counts: Vec<i32>,
    /// Indices of all faces, face-major, winding preserved
    pub face_vertex_indices: Vec<i32>,
    /// Min and max corner of `points`
    pub extent: [[f32; 3]; 2],
    /// Prim path of the bound material
    pub material_binding: Option<String>,
}

impl GeometryNode {
    pub fn face_count(&self) -> usize {
        self.face_vertex_counts.len()
    }
}

/// Convert a (centered) mesh into a geometry node
///
/// Points are truncated to f32. Faces are flattened into counts + indices in
/// source order whether they are stored densely or as ragged rows.
pub fn to_geometry_node(mesh: &Mesh) -> Result<GeometryNode> {
    mesh.validate()?;

    let points: Vec<[f32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| v.as_vec3().to_array())
        .collect();

    let mut face_vertex_counts = Vec::with_capacity(mesh.faces.len());
    let mut face_vertex_indices = Vec::with_capacity(mesh.faces.index_count());
    for face in mesh.faces.iter() {
        face_vertex_counts.push(to_usd_int(face.len())?);
        for &index in face {
            face_vertex_indices.push(to_usd_int(index as usize)?);
        }
    }

    Ok(GeometryNode {
        path: format!("{}/{}", glass_path(), MESH_PRIM),
        extent: extent_of(&points),
        points,
        face_vertex_counts,
        face_vertex_indices,
        material_binding: None,
    })
}

/// USD stores counts and indices as 32-bit signed ints
fn to_usd_int(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        ConversionError::InvalidMesh(format!("value {} exceeds the USD int range", value))
    })
}

fn extent_of(points: &[[f32; 3]]) -> [[f32; 3]; 2] {
    let Some(first) = points.first() else {
        return [[0.0; 3]; 2];
    };
    points.iter().fold([*first, *first], |[min, max], p| {
        [
            [min[0].min(p[0]), min[1].min(p[1]), min[2].min(p[2])],
            [max[0].max(p[0]), max[1].max(p[1]), max[2].max(p[2])],
        ]
    })
}

/// A complete stage ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub up_axis: UpAxis,
    pub meters_per_unit: f64,
    pub geometry: GeometryNode,
    pub material: MaterialNode,
}

impl Scene {
    /// Y-up stage in meters holding one bound mesh
    pub fn new(geometry: GeometryNode, material: MaterialNode) -> Self {
        Self {
            up_axis: UpAxis::Y,
            meters_per_unit: 1.0,
            geometry,
            material,
        }
    }

    pub fn default_prim(&self) -> &'static str {
        ROOT_PRIM
    }
}
