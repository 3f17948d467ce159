//! Types for loaded meshes

use glam::DVec3;
use hashbrown::HashMap;

use crate::error::{ConversionError, Result};

/// Minimum number of indices in a face (USD rejects points and lines)
pub const MIN_FACE_ARITY: usize = 3;

/// Face topology as delivered by a loader
///
/// STL and glTF produce dense triangle buffers, OBJ may produce n-gons of mixed size.
#[derive(Debug, Clone, PartialEq)]
pub enum Faces {
    /// Every face has `arity` indices, flattened face-major
    Uniform { arity: usize, indices: Vec<u32> },
    /// One row per face, each row with its own length
    Ragged(Vec<Vec<u32>>),
}

impl Faces {
    /// Dense triangle buffer
    pub fn triangles(indices: Vec<u32>) -> Self {
        Faces::Uniform { arity: 3, indices }
    }

    /// Build from rows, collapsing to dense storage when every row has the same length
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Self {
        let arity = rows.first().map(Vec::len).unwrap_or(3);
        if rows.iter().all(|row| row.len() == arity) {
            Faces::Uniform {
                arity,
                indices: rows.into_iter().flatten().collect(),
            }
        } else {
            Faces::Ragged(rows)
        }
    }

    /// Number of faces
    pub fn len(&self) -> usize {
        match self {
            Faces::Uniform { arity: 0, .. } => 0,
            Faces::Uniform { arity, indices } => indices.len() / arity,
            Faces::Ragged(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of indices over all faces
    pub fn index_count(&self) -> usize {
        match self {
            Faces::Uniform { arity: 0, .. } => 0,
            Faces::Uniform { arity, indices } => indices.len() / arity * arity,
            Faces::Ragged(rows) => rows.iter().map(Vec::len).sum(),
        }
    }

    /// Iterate faces in order, each as its slice of vertex indices
    pub fn iter(&self) -> FaceIter<'_> {
        match self {
            Faces::Uniform { arity: 0, .. } => FaceIter::Uniform((&[] as &[u32]).chunks_exact(1)),
            Faces::Uniform { arity, indices } => FaceIter::Uniform(indices.chunks_exact(*arity)),
            Faces::Ragged(rows) => FaceIter::Ragged(rows.iter()),
        }
    }
}

/// Iterator over the faces of a [`Faces`] value
pub enum FaceIter<'a> {
    Uniform(std::slice::ChunksExact<'a, u32>),
    Ragged(std::slice::Iter<'a, Vec<u32>>),
}

impl<'a> Iterator for FaceIter<'a> {
    type Item = &'a [u32];

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FaceIter::Uniform(chunks) => chunks.next(),
            FaceIter::Ragged(rows) => rows.next().map(Vec::as_slice),
        }
    }
}

/// Triangle/polygon mesh in model space
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Solid/object/mesh name from the source file, if any
    pub name: Option<String>,
    pub vertices: Vec<DVec3>,
    pub faces: Faces,
}

impl Mesh {
    pub fn new(vertices: Vec<DVec3>, faces: Faces) -> Self {
        Self {
            name: None,
            vertices,
            faces,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build a mesh from faces that index into a larger shared vertex pool
    ///
    /// Only referenced vertices are kept, renumbered in first-use order.
    pub fn compacted(pool: &[DVec3], rows: Vec<Vec<u32>>) -> Result<Self> {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut vertices = Vec::new();

        let mut compact_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut compact = Vec::with_capacity(row.len());
            for index in row {
                let position = pool.get(index as usize).copied().ok_or_else(|| {
                    ConversionError::InvalidMesh(format!(
                        "face references vertex {} but only {} vertices exist",
                        index,
                        pool.len()
                    ))
                })?;
                let next = vertices.len() as u32;
                let new_index = *remap.entry(index).or_insert_with(|| {
                    vertices.push(position);
                    next
                });
                compact.push(new_index);
            }
            compact_rows.push(compact);
        }

        Ok(Mesh::new(vertices, Faces::from_rows(compact_rows)))
    }

    /// Check the invariants every conversion stage relies on
    ///
    /// Faces are required: a mesh without faces has nothing to render as glass.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() {
            return Err(ConversionError::InvalidMesh(
                "mesh has no vertex data".to_string(),
            ));
        }
        if self.faces.is_empty() {
            return Err(ConversionError::InvalidMesh(
                "mesh has no face data".to_string(),
            ));
        }
        if let Faces::Uniform { arity, indices } = &self.faces {
            if indices.len() % arity != 0 {
                return Err(ConversionError::InvalidMesh(format!(
                    "index buffer length {} is not a multiple of face size {}",
                    indices.len(),
                    arity
                )));
            }
        }

        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.len() < MIN_FACE_ARITY {
                return Err(ConversionError::InvalidMesh(format!(
                    "face {} has {} vertices (minimum {})",
                    face_idx,
                    face.len(),
                    MIN_FACE_ARITY
                )));
            }
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(ConversionError::InvalidMesh(format!(
                    "face {} references vertex {} but mesh has {} vertices",
                    face_idx, index, vertex_count
                )));
            }
        }

        Ok(())
    }

    /// Copy of this mesh with every vertex moved by `offset`
    pub fn translated(&self, offset: DVec3) -> Mesh {
        Mesh {
            name: self.name.clone(),
            vertices: self.vertices.iter().map(|&v| v + offset).collect(),
            faces: self.faces.clone(),
        }
    }
}

/// Whatever a loader produced from one input file
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedAsset {
    Mesh(Mesh),
    /// Container with several meshes (multi-solid STL, multi-object OBJ, multi-mesh glTF)
    MultiMesh(Vec<Mesh>),
}

impl LoadedAsset {
    /// Collapse a loader result: a single mesh stays a `Mesh`
    pub fn from_meshes(mut meshes: Vec<Mesh>) -> Result<Self> {
        match meshes.len() {
            0 => Err(ConversionError::InvalidMesh(
                "file contains no meshes".to_string(),
            )),
            1 => Ok(LoadedAsset::Mesh(meshes.remove(0))),
            _ => Ok(LoadedAsset::MultiMesh(meshes)),
        }
    }

    /// Number of meshes carried
    pub fn mesh_count(&self) -> usize {
        match self {
            LoadedAsset::Mesh(_) => 1,
            LoadedAsset::MultiMesh(meshes) => meshes.len(),
        }
    }

    /// The mesh that gets converted
    ///
    /// For multi-mesh containers only the first mesh is used and the rest is dropped.
    pub fn into_primary_mesh(self) -> Result<Mesh> {
        match self {
            LoadedAsset::Mesh(mesh) => Ok(mesh),
            LoadedAsset::MultiMesh(meshes) => {
                let total = meshes.len();
                let mesh = meshes.into_iter().next().ok_or_else(|| {
                    ConversionError::InvalidMesh("container holds no meshes".to_string())
                })?;
                if total > 1 {
                    tracing::warn!(
                        "Input contains {} meshes, using only the first ({})",
                        total,
                        mesh.name.as_deref().unwrap_or("unnamed")
                    );
                }
                Ok(mesh)
            }
        }
    }
}
