use std::path::Path;

use anyhow::Result;
use cgmath::InnerSpace;

use crate::data::bounds::Aabb;
use crate::data::ray::Ray;
use crate::error::Error;

/// CPU side copy of a model: everything needed to upload it to the GPU and to pick it with a ray.
pub struct MeshData {
    pub name: String,
    pub primitives: Vec<PrimitiveData>,
    pub materials: Vec<MaterialData>,
    bounds: Option<Aabb>,
}

impl MeshData {
    pub fn new(name: String, primitives: Vec<PrimitiveData>, materials: Vec<MaterialData>) -> Self {
        let bounds = primitives
            .iter()
            .filter_map(|primitive| Aabb::from_points(&primitive.positions))
            .reduce(|a, b| a.merge(&b));

        Self {
            name,
            primitives,
            materials,
            bounds,
        }
    }

    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|primitive| primitive.indices.len() / 3)
            .sum()
    }

    /// Nearest triangle hit along a ray given in the mesh's local space.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(self.bounds.as_ref()?)?;

        self.primitives
            .iter()
            .flat_map(|primitive| primitive.triangles())
            .filter_map(|[a, b, c]| ray.intersect_triangle(a, b, c))
            .min_by(f32::total_cmp)
    }
}

pub struct PrimitiveData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl PrimitiveData {
    /// Validates the attribute streams; missing indices become a plain triangle list and
    /// missing normals are generated from the triangles.
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        tex_coords: Option<Vec<[f32; 2]>>,
        indices: Option<Vec<u32>>,
        material: Option<usize>,
    ) -> Result<Self> {
        let vertex_count = positions.len();
        let indices = indices.unwrap_or_else(|| (0..vertex_count as u32).collect());

        if indices.len() % 3 != 0 {
            return Err(Error::new(format!(
                "The given primitive does not describe a triangle list: {} indices",
                indices.len()
            ))
            .into());
        }

        if let Some(index) = indices.iter().find(|index| **index as usize >= vertex_count) {
            return Err(Error::new(format!(
                "The given primitive references vertex {index} but only has {vertex_count} vertices"
            ))
            .into());
        }

        if let Some(tex_coords) = &tex_coords {
            if tex_coords.len() != vertex_count {
                return Err(Error::new(format!(
                    "Texture coordinate count does not match vertex count: {} != {vertex_count}",
                    tex_coords.len()
                ))
                .into());
            }
        }

        let normals = match normals {
            Some(normals) if normals.len() == vertex_count => normals,
            Some(normals) => {
                log::warn!(
                    "Ignoring normals with mismatched count ({} != {vertex_count}), regenerating",
                    normals.len()
                );
                compute_vertex_normals(&positions, &indices)
            }
            None => compute_vertex_normals(&positions, &indices),
        };

        Ok(Self {
            positions,
            normals,
            tex_coords,
            indices,
            material,
        })
    }

    pub fn triangles(&self) -> impl Iterator<Item = [cgmath::Point3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(|triangle| {
            [
                self.positions[triangle[0] as usize].into(),
                self.positions[triangle[1] as usize].into(),
                self.positions[triangle[2] as usize].into(),
            ]
        })
    }
}

pub struct MaterialData {
    pub name: String,
    pub base_color_factor: [f32; 4],
    pub base_color_image: Option<image::RgbaImage>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: String::from("<DEFAULT>"),
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_image: None,
        }
    }
}

/// Area weighted smooth normals.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![cgmath::Vector3::new(0.0_f32, 0.0, 0.0); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let a = cgmath::Vector3::from(positions[triangle[0] as usize]);
        let b = cgmath::Vector3::from(positions[triangle[1] as usize]);
        let c = cgmath::Vector3::from(positions[triangle[2] as usize]);

        let face_normal = (b - a).cross(c - a);
        for index in triangle {
            normals[*index as usize] += face_normal;
        }
    }

    normals
        .into_iter()
        .map(|normal| {
            if normal.magnitude2() > 0.0 {
                normal.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

pub fn load_mesh_from_path(path: &Path) -> Result<MeshData> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());

    log::debug!("Loading model file: {}", path.display());

    match extension.as_deref() {
        Some("gltf") | Some("glb") => crate::resource::gltf::load_mesh(path),
        Some("obj") => crate::resource::obj::load_mesh(path),
        _ => Err(Error::new(format!(
            "The given model file has an unsupported format: {}",
            path.display()
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> PrimitiveData {
        PrimitiveData::new(
            vec![
                [-1.0, -1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
            ],
            None,
            None,
            Some(vec![0, 1, 2, 0, 2, 3]),
            None,
        )
        .unwrap()
    }

    #[test]
    fn generated_normals_face_out_of_counter_clockwise_triangles() {
        let primitive = quad();

        for normal in &primitive.normals {
            assert_eq!(*normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn missing_indices_become_triangle_list() {
        let primitive = PrimitiveData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert_eq!(primitive.indices, vec![0, 1, 2]);
    }

    #[test]
    fn rejects_out_of_range_indices_and_partial_triangles() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

        assert!(PrimitiveData::new(positions.clone(), None, None, Some(vec![0, 1, 3]), None).is_err());
        assert!(PrimitiveData::new(positions, None, None, Some(vec![0, 1]), None).is_err());
    }

    #[test]
    fn rejects_mismatched_tex_coords() {
        let result = PrimitiveData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            Some(vec![[0.0, 0.0]]),
            None,
            None,
        );

        assert!(result.is_err());
    }

    #[test]
    fn ray_picks_nearest_triangle() {
        let near = quad();
        let far = PrimitiveData::new(
            vec![[-1.0, -1.0, -2.0], [1.0, -1.0, -2.0], [0.0, 1.0, -2.0]],
            None,
            None,
            None,
            None,
        )
        .unwrap();
        let mesh = MeshData::new(String::from("QUADS"), vec![far, near], vec![]);

        let ray = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 4.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );

        assert!((mesh.intersect_ray(&ray).unwrap() - 4.0).abs() < 1e-5);
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn ray_outside_bounds_misses() {
        let mesh = MeshData::new(String::from("QUAD"), vec![quad()], vec![]);
        let ray = Ray::new(
            cgmath::Point3::new(5.0, 0.0, 4.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );

        assert!(mesh.intersect_ray(&ray).is_none());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_mesh_from_path(Path::new("model.stl")).is_err());
    }
}
