//! Programmatic test asset generation (STL, OBJ, GLB).

use gltf_json as json;
use json::validation::Checked::Valid;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// Triangles of an axis-aligned cube, outward winding
pub fn cube_triangles(center: [f32; 3], half_extent: f32) -> Vec<[[f32; 3]; 3]> {
    let corner = |i: usize| -> [f32; 3] {
        let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
        [
            center[0] + sign(1) * half_extent,
            center[1] + sign(2) * half_extent,
            center[2] + sign(4) * half_extent,
        ]
    };
    #[rustfmt::skip]
    let faces: [[usize; 3]; 12] = [
        [0, 2, 1], [1, 2, 3], // -z
        [4, 5, 6], [5, 7, 6], // +z
        [0, 1, 4], [1, 5, 4], // -y
        [2, 6, 3], [3, 6, 7], // +y
        [0, 4, 2], [2, 4, 6], // -x
        [1, 3, 5], [3, 7, 5], // +x
    ];
    faces
        .iter()
        .map(|f| [corner(f[0]), corner(f[1]), corner(f[2])])
        .collect()
}

/// Encode triangles as binary STL
pub fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for tri in triangles {
        data.extend_from_slice(&[0u8; 12]); // normal, recomputed by readers
        for corner in tri {
            for c in corner {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    data
}

/// Cube of half-extent 1 centered at (5, 5, 5), 12 triangles
pub fn generate_cube_stl(path: &Path) -> io::Result<()> {
    std::fs::write(path, binary_stl(&cube_triangles([5.0, 5.0, 5.0], 1.0)))
}

/// Binary STL declaring zero triangles (no vertex data)
pub fn generate_empty_stl(path: &Path) -> io::Result<()> {
    std::fs::write(path, binary_stl(&[]))
}

/// Unit quad plus a triangle sharing an edge, as OBJ n-gons
pub fn generate_polygon_obj(path: &Path) -> io::Result<()> {
    std::fs::write(
        path,
        "# quad + triangle\n\
         v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 2 0 0\n\
         f 1 2 3 4\nf 2 5 3\n",
    )
}

/// One glTF primitive: positions, optional indices, draw mode
pub struct PrimitiveData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
    pub mode: json::mesh::Mode,
}

impl PrimitiveData {
    pub fn triangles(positions: Vec<[f32; 3]>, indices: Option<Vec<u32>>) -> Self {
        Self {
            positions,
            indices,
            mode: json::mesh::Mode::Triangles,
        }
    }
}

/// Single triangle spanning one unit on x and y, moved by `offset`
fn unit_triangle(offset: [f32; 3]) -> Vec<[f32; 3]> {
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        .iter()
        .map(|p| [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]])
        .collect()
}

/// GLB with three meshes, one triangle each, at increasing offsets
///
/// Mesh k spans x in [10k, 10k + 1]; only mesh 0 touches the origin.
pub fn generate_multi_mesh_glb() -> Vec<u8> {
    let meshes: Vec<_> = (0..3)
        .map(|k| {
            let offset = 10.0 * k as f32;
            (
                format!("part{}", k),
                vec![PrimitiveData::triangles(
                    unit_triangle([offset, 0.0, 0.0]),
                    Some(vec![0, 1, 2]),
                )],
            )
        })
        .collect();
    build_glb(&meshes)
}

/// One mesh made of two indexed primitives: a unit quad, then a triangle at x = 2
///
/// Loaded as 7 vertices with the triangle's indices rebased past the quad.
pub fn generate_split_primitive_glb() -> Vec<u8> {
    let quad = PrimitiveData::triangles(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        Some(vec![0, 1, 2, 0, 2, 3]),
    );
    let triangle = PrimitiveData::triangles(unit_triangle([2.0, 0.0, 0.0]), Some(vec![0, 1, 2]));
    build_glb(&[("panel".to_string(), vec![quad, triangle])])
}

/// One mesh whose only primitive has no index accessor (two triangles, 6 positions)
pub fn generate_unindexed_glb() -> Vec<u8> {
    let mut positions = unit_triangle([0.0, 0.0, 0.0]);
    positions.extend(unit_triangle([0.0, 0.0, 1.0]));
    build_glb(&[(
        "soup".to_string(),
        vec![PrimitiveData::triangles(positions, None)],
    )])
}

/// One mesh with a line primitive ahead of a triangle primitive
pub fn generate_mixed_mode_glb() -> Vec<u8> {
    let lines = PrimitiveData {
        positions: vec![[-5.0, -5.0, -5.0], [5.0, 5.0, 5.0]],
        indices: None,
        mode: json::mesh::Mode::Lines,
    };
    let triangle = PrimitiveData::triangles(unit_triangle([0.0, 0.0, 0.0]), Some(vec![2, 1, 0]));
    build_glb(&[("wire".to_string(), vec![lines, triangle])])
}

/// One mesh whose second primitive references a vertex far past its own positions
pub fn generate_bad_index_glb() -> Vec<u8> {
    let first = PrimitiveData::triangles(unit_triangle([0.0, 0.0, 0.0]), Some(vec![0, 1, 2]));
    let second = PrimitiveData::triangles(
        unit_triangle([2.0, 0.0, 0.0]),
        Some(vec![0, 1, u32::MAX]),
    );
    build_glb(&[("broken".to_string(), vec![first, second])])
}

/// Pack named meshes into a GLB, one node per mesh
pub fn build_glb(meshes: &[(String, Vec<PrimitiveData>)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut views = Vec::new();
    let mut accessors = Vec::new();
    let mut json_meshes = Vec::new();

    for (name, primitives) in meshes {
        let mut json_primitives = Vec::new();
        for primitive in primitives {
            let mut data = Vec::new();
            for p in &primitive.positions {
                for c in p {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
            let (min, max) = compute_bounds(&primitive.positions);
            let positions = push_accessor(
                &mut buffer,
                &mut views,
                &mut accessors,
                &data,
                json::buffer::Target::ArrayBuffer,
                json::accessor::ComponentType::F32,
                json::accessor::Type::Vec3,
                primitive.positions.len(),
                Some((min, max)),
            );

            let indices = primitive.indices.as_ref().map(|indices| {
                let data: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
                push_accessor(
                    &mut buffer,
                    &mut views,
                    &mut accessors,
                    &data,
                    json::buffer::Target::ElementArrayBuffer,
                    json::accessor::ComponentType::U32,
                    json::accessor::Type::Scalar,
                    indices.len(),
                    None,
                )
            });

            let mut attributes = BTreeMap::new();
            attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
            json_primitives.push(json::mesh::Primitive {
                attributes,
                extensions: Default::default(),
                extras: Default::default(),
                indices,
                material: None,
                mode: Valid(primitive.mode),
                targets: None,
            });
        }

        json_meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.clone()),
            primitives: json_primitives,
            weights: None,
        });
    }

    let nodes: Vec<json::Node> = (0..meshes.len())
        .map(|k| json::Node {
            mesh: Some(json::Index::new(k as u32)),
            ..Default::default()
        })
        .collect();

    let root = json::Root {
        accessors,
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some("glass-export-test".to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers: vec![json::Buffer {
            byte_length: buffer.len().into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }],
        buffer_views: views,
        meshes: json_meshes,
        scene: Some(json::Index::new(0)),
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: (0..nodes.len() as u32).map(json::Index::new).collect(),
        }],
        nodes,
        ..Default::default()
    };

    assemble_glb(&root, &buffer)
}

/// Append `data` to the buffer with its own view and accessor, returning the accessor
#[allow(clippy::too_many_arguments)]
fn push_accessor(
    buffer: &mut Vec<u8>,
    views: &mut Vec<json::buffer::View>,
    accessors: &mut Vec<json::Accessor>,
    data: &[u8],
    target: json::buffer::Target,
    component_type: json::accessor::ComponentType,
    type_: json::accessor::Type,
    count: usize,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Index<json::Accessor> {
    // Keep every view 4-byte aligned
    while !buffer.len().is_multiple_of(4) {
        buffer.push(0);
    }
    let offset = buffer.len();
    buffer.extend_from_slice(data);

    views.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: data.len().into(),
        byte_offset: Some(offset.into()),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(target)),
    });

    let to_value = |v: [f32; 3]| json::Value::Array(v.into_iter().map(json::Value::from).collect());
    accessors.push(json::Accessor {
        buffer_view: Some(json::Index::new(views.len() as u32 - 1)),
        byte_offset: Some(0u64.into()),
        count: count.into(),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: bounds.map(|(min, _)| to_value(min)),
        max: bounds.map(|(_, max)| to_value(max)),
        name: None,
        normalized: false,
        sparse: None,
    });

    json::Index::new(accessors.len() as u32 - 1)
}

fn compute_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    (min, max)
}

/// Assemble the final GLB binary
fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Vec<u8> {
    let json_string = json::serialize::to_string(root).expect("Failed to serialize JSON");
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    let total_length = 12 + 8 + json_chunk_length + 8 + buffer_chunk_length;
    let mut glb = Vec::with_capacity(total_length);

    // Header
    glb.extend_from_slice(b"glTF"); // magic
    glb.extend_from_slice(&2u32.to_le_bytes()); // version
    glb.extend_from_slice(&(total_length as u32).to_le_bytes()); // length

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(0x20u8, json_padding)); // pad with spaces

    // BIN chunk
    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // "BIN\0"
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat_n(0u8, buffer_padding)); // pad with zeros

    glb
}
