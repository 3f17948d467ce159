//! USD ASCII (.usda) scene writer

use std::fmt::Display;
use std::io::{self, Write};

use crate::error::{ConversionError, Result};
use crate::material::{PreviewSurface, PREVIEW_SURFACE_ID};
use crate::scene::{Scene, GLASS_PRIM, MATERIAL_PRIM, MESH_PRIM, SHADER_PRIM};

const INDENT: &str = "    ";

/// Serialize a scene to an in-memory .usda layer
pub fn usda_to_bytes(scene: &Scene) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_usda(&mut out, scene)?;
    Ok(out)
}

/// Write a complete .usda layer
///
/// Output is deterministic: the same scene always produces the same bytes.
pub fn write_usda<W: Write>(w: &mut W, scene: &Scene) -> Result<()> {
    check_finite(scene)?;
    write_layer(w, scene).map_err(|e| ConversionError::Serialization(e.to_string()))
}

fn check_finite(scene: &Scene) -> Result<()> {
    let geometry = &scene.geometry;
    if let Some((idx, p)) = geometry
        .points
        .iter()
        .enumerate()
        .find(|(_, p)| p.iter().any(|c| !c.is_finite()))
    {
        return Err(ConversionError::Serialization(format!(
            "point {} is not finite: {:?}",
            idx, p
        )));
    }
    if !scene.meters_per_unit.is_finite() || scene.meters_per_unit <= 0.0 {
        return Err(ConversionError::Serialization(format!(
            "invalid metersPerUnit {}",
            scene.meters_per_unit
        )));
    }
    Ok(())
}

fn write_layer<W: Write>(w: &mut W, scene: &Scene) -> io::Result<()> {
    writeln!(w, "#usda 1.0")?;
    writeln!(w, "(")?;
    writeln!(w, "{}defaultPrim = \"{}\"", INDENT, scene.default_prim())?;
    writeln!(w, "{}metersPerUnit = {}", INDENT, scene.meters_per_unit)?;
    writeln!(w, "{}upAxis = \"{}\"", INDENT, scene.up_axis.as_token())?;
    writeln!(w, ")")?;
    writeln!(w)?;

    writeln!(w, "def Xform \"{}\"", scene.default_prim())?;
    writeln!(w, "{{")?;
    writeln!(w, "{}def Xform \"{}\"", INDENT, GLASS_PRIM)?;
    writeln!(w, "{}{{", INDENT)?;
    write_mesh(w, scene, 2)?;
    writeln!(w)?;
    write_material(w, scene, 2)?;
    writeln!(w, "{}}}", INDENT)?;
    writeln!(w, "}}")?;
    Ok(())
}

fn write_mesh<W: Write>(w: &mut W, scene: &Scene, depth: usize) -> io::Result<()> {
    let pad = INDENT.repeat(depth);
    let geometry = &scene.geometry;

    if geometry.material_binding.is_some() {
        writeln!(w, "{}def Mesh \"{}\" (", pad, MESH_PRIM)?;
        writeln!(w, "{}{}prepend apiSchemas = [\"MaterialBindingAPI\"]", pad, INDENT)?;
        writeln!(w, "{})", pad)?;
    } else {
        writeln!(w, "{}def Mesh \"{}\"", pad, MESH_PRIM)?;
    }
    writeln!(w, "{}{{", pad)?;

    let inner = format!("{}{}", pad, INDENT);
    writeln!(
        w,
        "{}float3[] extent = [{}, {}]",
        inner,
        tuple(&geometry.extent[0]),
        tuple(&geometry.extent[1])
    )?;
    writeln!(
        w,
        "{}int[] faceVertexCounts = [{}]",
        inner,
        join(&geometry.face_vertex_counts)
    )?;
    writeln!(
        w,
        "{}int[] faceVertexIndices = [{}]",
        inner,
        join(&geometry.face_vertex_indices)
    )?;
    if let Some(material) = &geometry.material_binding {
        writeln!(w, "{}rel material:binding = <{}>", inner, material)?;
    }
    let points: Vec<String> = geometry.points.iter().map(tuple).collect();
    writeln!(w, "{}point3f[] points = [{}]", inner, points.join(", "))?;
    writeln!(w, "{}uniform token subdivisionScheme = \"none\"", inner)?;

    writeln!(w, "{}}}", pad)?;
    Ok(())
}

fn write_material<W: Write>(w: &mut W, scene: &Scene, depth: usize) -> io::Result<()> {
    let pad = INDENT.repeat(depth);
    let inner = format!("{}{}", pad, INDENT);
    let material = &scene.material;

    writeln!(w, "{}def Material \"{}\"", pad, MATERIAL_PRIM)?;
    writeln!(w, "{}{{", pad)?;
    writeln!(
        w,
        "{}token outputs:surface.connect = <{}.outputs:surface>",
        inner, material.shader_path
    )?;
    writeln!(w)?;
    writeln!(w, "{}def Shader \"{}\"", inner, SHADER_PRIM)?;
    writeln!(w, "{}{{", inner)?;
    write_surface_inputs(w, &material.surface, &format!("{}{}", inner, INDENT))?;
    writeln!(w, "{}}}", inner)?;
    writeln!(w, "{}}}", pad)?;
    Ok(())
}

fn write_surface_inputs<W: Write>(w: &mut W, surface: &PreviewSurface, pad: &str) -> io::Result<()> {
    writeln!(w, "{}uniform token info:id = \"{}\"", pad, PREVIEW_SURFACE_ID)?;
    writeln!(
        w,
        "{}color3f inputs:diffuseColor = {}",
        pad,
        tuple(&surface.diffuse_color)
    )?;
    writeln!(w, "{}float inputs:ior = {}", pad, surface.ior)?;
    writeln!(w, "{}float inputs:metallic = {}", pad, surface.metallic)?;
    writeln!(w, "{}float inputs:opacity = {}", pad, surface.opacity)?;
    writeln!(w, "{}float inputs:roughness = {}", pad, surface.roughness)?;
    writeln!(
        w,
        "{}color3f inputs:transmissionColor = {}",
        pad,
        tuple(&surface.transmission_color)
    )?;
    writeln!(w, "{}token outputs:surface", pad)?;
    Ok(())
}

fn tuple(v: &[f32; 3]) -> String {
    format!("({}, {}, {})", v[0], v[1], v[2])
}

fn join<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::attach_glass_material;
    use crate::mesh::{Faces, Mesh};
    use crate::scene::to_geometry_node;
    use glam::DVec3;

    fn triangle_scene() -> Scene {
        let mesh = Mesh::new(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 0.5, 0.0),
            ],
            Faces::triangles(vec![0, 1, 2]),
        );
        let mut geometry = to_geometry_node(&mesh).unwrap();
        let material = attach_glass_material(&mut geometry);
        Scene::new(geometry, material)
    }

    fn render(scene: &Scene) -> String {
        String::from_utf8(usda_to_bytes(scene).unwrap()).unwrap()
    }

    #[test]
    fn test_stage_metadata() {
        let text = render(&triangle_scene());
        assert!(text.starts_with("#usda 1.0\n(\n"));
        assert!(text.contains("defaultPrim = \"Snowglobe\""));
        assert!(text.contains("metersPerUnit = 1\n"));
        assert!(text.contains("upAxis = \"Y\""));
    }

    #[test]
    fn test_mesh_attributes() {
        let text = render(&triangle_scene());
        assert!(text.contains("int[] faceVertexCounts = [3]"));
        assert!(text.contains("int[] faceVertexIndices = [0, 1, 2]"));
        assert!(text.contains("point3f[] points = [(0, 0, 0), (1, 0, 0), (0, 0.5, 0)]"));
        assert!(text.contains("float3[] extent = [(0, 0, 0), (1, 0.5, 0)]"));
        assert!(text.contains("prepend apiSchemas = [\"MaterialBindingAPI\"]"));
        assert!(text.contains("rel material:binding = </Snowglobe/Glass/Material>"));
    }

    #[test]
    fn test_glass_shader_inputs() {
        let text = render(&triangle_scene());
        assert!(text.contains(
            "token outputs:surface.connect = </Snowglobe/Glass/Material/GlassShader.outputs:surface>"
        ));
        assert!(text.contains("uniform token info:id = \"UsdPreviewSurface\""));
        assert!(text.contains("color3f inputs:diffuseColor = (0.9, 0.9, 0.95)"));
        assert!(text.contains("float inputs:metallic = 0\n"));
        assert!(text.contains("float inputs:roughness = 0.05\n"));
        assert!(text.contains("float inputs:ior = 1.5\n"));
        assert!(text.contains("float inputs:opacity = 0.15\n"));
        assert!(text.contains("color3f inputs:transmissionColor = (0.95, 0.95, 1)"));
    }

    #[test]
    fn test_braces_balance() {
        let text = render(&triangle_scene());
        assert_eq!(text.matches('{').count(), text.matches('}').count());
        assert_eq!(text.matches("def ").count(), 5);
    }

    #[test]
    fn test_unbound_mesh_has_no_binding() {
        let mut scene = triangle_scene();
        scene.geometry.material_binding = None;
        let text = render(&scene);
        assert!(!text.contains("material:binding"));
        assert!(!text.contains("apiSchemas"));
    }

    #[test]
    fn test_non_finite_point_is_rejected() {
        let mut scene = triangle_scene();
        scene.geometry.points[1][2] = f32::NAN;
        assert!(matches!(
            usda_to_bytes(&scene),
            Err(ConversionError::Serialization(_))
        ));
    }

    #[test]
    fn test_output_is_deterministic() {
        let scene = triangle_scene();
        assert_eq!(usda_to_bytes(&scene).unwrap(), usda_to_bytes(&scene).unwrap());
    }
}
