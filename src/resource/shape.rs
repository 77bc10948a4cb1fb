use anyhow::Result;

use crate::resource::mesh::{MaterialData, MeshData, PrimitiveData};

/// UV sphere of the given radius centred at the origin.
pub fn sphere(name: &str, radius: f32, sectors: u32, stacks: u32, color: [f32; 4]) -> Result<MeshData> {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);

    let mut positions = vec![];
    let mut normals = vec![];
    let mut tex_coords = vec![];

    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let polar = v * std::f32::consts::PI;

        for sector in 0..=sectors {
            let u = sector as f32 / sectors as f32;
            let azimuth = u * std::f32::consts::TAU;

            let normal = [
                polar.sin() * azimuth.cos(),
                polar.cos(),
                -polar.sin() * azimuth.sin(),
            ];

            positions.push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            normals.push(normal);
            tex_coords.push([u, v]);
        }
    }

    let row = sectors + 1;
    let mut indices = vec![];
    for stack in 0..stacks {
        for sector in 0..sectors {
            let top_left = stack * row + sector;
            let bottom_left = top_left + row;

            if stack != 0 {
                indices.extend_from_slice(&[top_left, bottom_left, top_left + 1]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[top_left + 1, bottom_left, bottom_left + 1]);
            }
        }
    }

    let primitive = PrimitiveData::new(
        positions,
        Some(normals),
        Some(tex_coords),
        Some(indices),
        Some(0),
    )?;

    Ok(MeshData::new(
        name.to_string(),
        vec![primitive],
        vec![solid_material(name, color)],
    ))
}

/// Axis aligned box centred at the origin with flat shaded faces.
pub fn cuboid(name: &str, half_extents: [f32; 3], color: [f32; 4]) -> Result<MeshData> {
    let [x, y, z] = half_extents;

    // (normal, u axis, v axis) per face; corners wind counter-clockwise seen from outside.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut positions = vec![];
    let mut normals = vec![];
    let mut tex_coords = vec![];
    let mut indices = vec![];

    for (normal, u_axis, v_axis) in faces {
        let base = positions.len() as u32;

        for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = |axis: usize| normal[axis] + u * u_axis[axis] + v * v_axis[axis];
            positions.push([corner(0) * x, corner(1) * y, corner(2) * z]);
            normals.push(normal);
            tex_coords.push([(u + 1.0) / 2.0, (1.0 - v) / 2.0]);
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let primitive = PrimitiveData::new(
        positions,
        Some(normals),
        Some(tex_coords),
        Some(indices),
        Some(0),
    )?;

    Ok(MeshData::new(
        name.to_string(),
        vec![primitive],
        vec![solid_material(name, color)],
    ))
}

fn solid_material(name: &str, color: [f32; 4]) -> MaterialData {
    MaterialData {
        name: format!("{name}_MATERIAL"),
        base_color_factor: color,
        base_color_image: None,
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;
    use crate::data::ray::Ray;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = sphere("SPHERE", 2.0, 16, 8, [1.0; 4]).unwrap();

        for position in &mesh.primitives[0].positions {
            let length = cgmath::Vector3::from(*position).magnitude();
            assert!((length - 2.0).abs() < 1e-4);
        }

        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max.y - 2.0).abs() < 1e-4);
        assert!((bounds.min.y + 2.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let mesh = sphere("SPHERE", 1.0, 12, 6, [1.0; 4]).unwrap();

        for [a, b, c] in mesh.primitives[0].triangles() {
            let normal = (b - a).cross(c - a);
            let center = (a.to_homogeneous().truncate()
                + b.to_homogeneous().truncate()
                + c.to_homogeneous().truncate())
                / 3.0;
            assert!(normal.dot(center) > 0.0);
        }
    }

    #[test]
    fn ray_hits_sphere_surface() {
        let mesh = sphere("SPHERE", 1.0, 32, 16, [1.0; 4]).unwrap();
        let ray = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 5.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );

        let distance = mesh.intersect_ray(&ray).unwrap();
        assert!((distance - 4.0).abs() < 0.02);
    }

    #[test]
    fn cuboid_faces_point_outwards() {
        let mesh = cuboid("BOX", [1.0, 2.0, 3.0], [1.0; 4]).unwrap();
        let primitive = &mesh.primitives[0];

        assert_eq!(mesh.triangle_count(), 12);
        for (triangle, [a, b, c]) in primitive.triangles().enumerate() {
            let face_normal = (b - a).cross(c - a).normalize();
            let vertex_normal = cgmath::Vector3::from(
                primitive.normals[primitive.indices[triangle * 3] as usize],
            );
            assert!((face_normal - vertex_normal).magnitude() < 1e-5);
        }

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.max, cgmath::Point3::new(1.0, 2.0, 3.0));
    }
}
