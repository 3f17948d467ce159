//! OBJ mesh loading

use glam::DVec3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::{Faces, LoadedAsset, Mesh, MIN_FACE_ARITY};
use crate::error::{ConversionError, Result};

/// Load an OBJ file
///
/// Polygons are kept as-is (no triangulation). Each `o` record starts a new object;
/// files with more than one object carrying faces load as a multi-mesh container.
/// Every mesh keeps only the vertices its faces reference.
pub fn load_obj(input: &Path) -> Result<LoadedAsset> {
    let file = File::open(input).map_err(|e| ConversionError::io(input, e))?;
    parse_obj(input, BufReader::new(file))
}

/// Parse OBJ records from any buffered reader
pub fn parse_obj<R: BufRead>(input: &Path, reader: R) -> Result<LoadedAsset> {
    let mut positions: Vec<DVec3> = Vec::new();
    let mut objects: Vec<(Option<String>, Vec<Vec<u32>>)> = vec![(None, Vec::new())];

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ConversionError::io(input, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let malformed = || {
            ConversionError::parse(input, format!("line {}: malformed record '{}'", line_idx + 1, line))
        };

        match parts[0] {
            "v" if parts.len() >= 4 => {
                let mut coords = [0.0f64; 3];
                for (coord, part) in coords.iter_mut().zip(&parts[1..4]) {
                    *coord = part.parse().map_err(|_| malformed())?;
                }
                positions.push(DVec3::from_array(coords));
            }
            "v" => return Err(malformed()),
            "o" => {
                let name = parts[1..].join(" ");
                let name = (!name.is_empty()).then_some(name);
                // Nothing emitted yet for the current object: just rename it
                let reuse = objects.last().is_some_and(|(_, faces)| faces.is_empty());
                match objects.last_mut() {
                    Some(current) if reuse => current.0 = name,
                    _ => objects.push((name, Vec::new())),
                }
            }
            "f" => {
                let face = parts[1..]
                    .iter()
                    .map(|v| parse_obj_vertex(v, positions.len()))
                    .collect::<Option<Vec<u32>>>()
                    .ok_or_else(malformed)?;

                if face.len() < MIN_FACE_ARITY {
                    tracing::warn!(
                        "{}: skipping face with {} vertices on line {}",
                        input.display(),
                        face.len(),
                        line_idx + 1
                    );
                    continue;
                }

                if let Some((_, faces)) = objects.last_mut() {
                    faces.push(face);
                }
            }
            // vt, vn, g, s, usemtl, mtllib: not needed for glass
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(ConversionError::InvalidMesh(
            "no vertices found in OBJ file".to_string(),
        ));
    }

    let objects: Vec<_> = objects
        .into_iter()
        .filter(|(_, faces)| !faces.is_empty())
        .collect();

    if objects.is_empty() {
        // Validation reports the missing faces
        return Ok(LoadedAsset::Mesh(Mesh::new(positions, Faces::triangles(Vec::new()))));
    }

    // Vertices no face refers to (other objects, `l`/`p` records) are dropped
    let meshes = objects
        .into_iter()
        .map(|(name, rows)| {
            let mesh = Mesh::compacted(&positions, rows)?;
            Ok(match name {
                Some(name) => mesh.with_name(name),
                None => mesh,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    LoadedAsset::from_meshes(meshes)
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
///
/// Returns the zero-based position index. Negative indices count back from the
/// most recently declared vertex.
fn parse_obj_vertex(s: &str, declared: usize) -> Option<u32> {
    let raw = s.split('/').next()?.parse::<i64>().ok()?;

    let index = match raw {
        0 => return None,
        i if i > 0 => i - 1, // OBJ indices are 1-based
        i => declared as i64 + i,
    };

    if index < 0 || index as usize >= declared {
        return None;
    }
    u32::try_from(index).ok()
}
