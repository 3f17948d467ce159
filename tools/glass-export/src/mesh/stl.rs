//! STL loading (binary and ASCII)

use glam::DVec3;
use hashbrown::HashMap;
use std::path::Path;

use super::types::{Faces, LoadedAsset, Mesh};
use crate::error::{ConversionError, Result};

/// Binary STL: 80-byte header + u32 triangle count
const BINARY_HEADER_SIZE: usize = 84;

/// Binary STL: normal + 3 vertices (12 × f32) + u16 attribute count
const BINARY_TRIANGLE_SIZE: usize = 50;

/// Load an STL file
pub fn load_stl(input: &Path) -> Result<LoadedAsset> {
    let data = std::fs::read(input).map_err(|e| ConversionError::io(input, e))?;
    parse_stl(input, &data)
}

/// Parse STL bytes, detecting binary vs ASCII
///
/// A file is binary when its size matches the declared triangle count exactly;
/// binary files may start with "solid" too, so the size check comes first.
pub fn parse_stl(input: &Path, data: &[u8]) -> Result<LoadedAsset> {
    if let Some(count) = binary_triangle_count(data) {
        if BINARY_HEADER_SIZE + count * BINARY_TRIANGLE_SIZE == data.len() {
            return parse_binary(data, count).map(LoadedAsset::Mesh);
        }
    }

    if data.trim_ascii_start().starts_with(b"solid") {
        let text = std::str::from_utf8(data)
            .map_err(|e| ConversionError::parse(input, format!("ASCII STL is not UTF-8: {}", e)))?;
        let meshes = parse_ascii(input, text)?;
        return LoadedAsset::from_meshes(meshes);
    }

    match binary_triangle_count(data) {
        Some(count) => Err(ConversionError::parse(
            input,
            format!(
                "binary STL declares {} triangles ({} bytes) but file has {} bytes",
                count,
                BINARY_HEADER_SIZE + count * BINARY_TRIANGLE_SIZE,
                data.len()
            ),
        )),
        None => Err(ConversionError::parse(
            input,
            format!("file too small for STL ({} bytes)", data.len()),
        )),
    }
}

fn binary_triangle_count(data: &[u8]) -> Option<usize> {
    let bytes: [u8; 4] = data.get(80..BINARY_HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes) as usize)
}

fn parse_binary(data: &[u8], count: usize) -> Result<Mesh> {
    let mut welder = Welder::default();
    let mut indices = Vec::with_capacity(count * 3);

    for record in data[BINARY_HEADER_SIZE..].chunks_exact(BINARY_TRIANGLE_SIZE) {
        // Skip the stored facet normal (bytes 0..12)
        for corner in 0..3 {
            let offset = 12 + corner * 12;
            let position = [
                read_f32(&record[offset..offset + 4]),
                read_f32(&record[offset + 4..offset + 8]),
                read_f32(&record[offset + 8..offset + 12]),
            ];
            indices.push(welder.insert(position));
        }
    }

    Ok(welder.into_mesh(indices))
}

fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Parse ASCII STL, one mesh per `solid ... endsolid` block
fn parse_ascii(input: &Path, text: &str) -> Result<Vec<Mesh>> {
    let mut meshes = Vec::new();
    let mut current: Option<(Option<String>, Welder, Vec<u32>)> = None;
    let mut loop_corners: Vec<u32> = Vec::with_capacity(3);

    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "solid" => {
                if let Some((name, welder, indices)) = current.take() {
                    meshes.push(finish_solid(name, welder, indices));
                }
                let name = parts.collect::<Vec<_>>().join(" ");
                let name = (!name.is_empty()).then_some(name);
                current = Some((name, Welder::default(), Vec::new()));
            }
            "endsolid" => {
                if let Some((name, welder, indices)) = current.take() {
                    meshes.push(finish_solid(name, welder, indices));
                }
            }
            "outer" => loop_corners.clear(),
            "vertex" => {
                let Some((_, welder, _)) = current.as_mut() else {
                    return Err(ConversionError::parse(
                        input,
                        format!("line {}: vertex outside of a solid", line_no),
                    ));
                };
                let mut coords = [0.0f32; 3];
                for coord in &mut coords {
                    *coord = parts
                        .next()
                        .and_then(|s| s.parse::<f32>().ok())
                        .ok_or_else(|| {
                            ConversionError::parse(
                                input,
                                format!("line {}: malformed vertex '{}'", line_no, line.trim()),
                            )
                        })?;
                }
                loop_corners.push(welder.insert(coords));
            }
            "endloop" => {
                if loop_corners.len() != 3 {
                    return Err(ConversionError::parse(
                        input,
                        format!(
                            "line {}: facet has {} vertices, expected 3",
                            line_no,
                            loop_corners.len()
                        ),
                    ));
                }
                if let Some((_, _, indices)) = current.as_mut() {
                    indices.append(&mut loop_corners);
                }
            }
            // facet normal / endfacet carry nothing we keep
            _ => {}
        }
    }

    // Tolerate a missing trailing endsolid
    if let Some((name, welder, indices)) = current.take() {
        meshes.push(finish_solid(name, welder, indices));
    }

    Ok(meshes)
}

fn finish_solid(name: Option<String>, welder: Welder, indices: Vec<u32>) -> Mesh {
    let mesh = welder.into_mesh(indices);
    match name {
        Some(name) => mesh.with_name(name),
        None => mesh,
    }
}

/// Merges bitwise-identical positions so STL triangle soup becomes an indexed mesh
#[derive(Default)]
struct Welder {
    lookup: HashMap<[u32; 3], u32>,
    vertices: Vec<DVec3>,
}

impl Welder {
    fn insert(&mut self, position: [f32; 3]) -> u32 {
        // -0.0 and 0.0 are the same point
        let key = position.map(|c| if c == 0.0 { 0 } else { c.to_bits() });
        let next = self.vertices.len() as u32;
        let vertices = &mut self.vertices;
        *self.lookup.entry(key).or_insert_with(|| {
            vertices.push(DVec3::new(
                position[0] as f64,
                position[1] as f64,
                position[2] as f64,
            ));
            next
        })
    }

    fn into_mesh(self, indices: Vec<u32>) -> Mesh {
        Mesh::new(self.vertices, Faces::triangles(indices))
    }
}
