//! Bounding info and re-origining of meshes

use glam::DVec3;

use super::types::Mesh;
use crate::error::{ConversionError, Result};

/// Total face area, relative to the squared bounding size, below which the surface
/// centroid is considered undefined
const DEGENERATE_AREA_RATIO: f64 = 1e-12;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Bounds of a point set, `None` when empty
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for &p in rest {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    /// Per-axis size
    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest per-axis size
    pub fn max_dimension(&self) -> f64 {
        self.extent().max_element()
    }
}

/// A mesh moved so that its centroid sits at the origin
#[derive(Debug, Clone)]
pub struct Centered {
    pub mesh: Mesh,
    /// Centroid of the original mesh; `mesh` was translated by its negation
    pub centroid: DVec3,
    /// Bounds of the original (untranslated) vertices
    pub bounds: Bounds,
}

/// Surface centroid: face centroids weighted by face area
///
/// Polygons are fanned from their first vertex. Falls back to the vertex mean when
/// every face is degenerate, whatever the scale of the mesh. Expects a validated mesh.
pub fn centroid(mesh: &Mesh) -> DVec3 {
    let mut weighted = DVec3::ZERO;
    let mut total_area = 0.0;

    for face in mesh.faces.iter() {
        let anchor = mesh.vertices[face[0] as usize];
        for pair in face[1..].windows(2) {
            let b = mesh.vertices[pair[0] as usize];
            let c = mesh.vertices[pair[1] as usize];
            let area = 0.5 * (b - anchor).cross(c - anchor).length();
            weighted += area * (anchor + b + c) / 3.0;
            total_area += area;
        }
    }

    let size = Bounds::from_points(&mesh.vertices).map_or(0.0, |b| b.max_dimension());
    if total_area > 0.0 && total_area > DEGENERATE_AREA_RATIO * size * size {
        weighted / total_area
    } else {
        vertex_mean(&mesh.vertices)
    }
}

fn vertex_mean(vertices: &[DVec3]) -> DVec3 {
    let sum = vertices.iter().fold(DVec3::ZERO, |acc, &v| acc + v);
    sum / vertices.len().max(1) as f64
}

/// Translate a mesh so its centroid lands on the origin
///
/// The input is left untouched; faces are carried over unchanged.
pub fn center_mesh(mesh: &Mesh) -> Result<Centered> {
    mesh.validate()?;

    let bounds = Bounds::from_points(&mesh.vertices)
        .ok_or_else(|| ConversionError::InvalidMesh("mesh has no vertex data".to_string()))?;
    let centroid = centroid(mesh);
    if !centroid.is_finite() {
        return Err(ConversionError::InvalidMesh(format!(
            "mesh centroid is not finite ({:?})",
            centroid
        )));
    }

    tracing::debug!(
        "Mesh bounds {:?}..{:?}, centroid {:?}, max dimension {}",
        bounds.min,
        bounds.max,
        centroid,
        bounds.max_dimension()
    );

    Ok(Centered {
        mesh: mesh.translated(-centroid),
        centroid,
        bounds,
    })
}
