use std::path::PathBuf;
use std::rc::Rc;

use cgmath::SquareMatrix;

use crate::data::ray::Ray;
use crate::data::transform::Transform;
use crate::resource::mesh::MeshData;

#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModelId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum ModelKind {
    File(PathBuf),
    ReferenceSphere,
    Box,
}

pub struct SceneModel {
    pub id: ModelId,
    pub name: String,
    pub kind: ModelKind,
    pub mesh: Rc<MeshData>,
    pub transform: Transform,
}

impl SceneModel {
    pub fn model_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from(self.transform)
    }

    pub fn position(&self) -> cgmath::Point3<f32> {
        cgmath::Point3::new(
            self.transform.translation.x,
            self.transform.translation.y,
            self.transform.translation.z,
        )
    }

    /// Distance along a world space ray to the nearest triangle of the model.
    pub fn hit_by_ray(&self, ray: &Ray) -> Option<f32> {
        let inverse = self.model_matrix().invert()?;
        self.mesh.intersect_ray(&ray.transformed(&inverse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::shape;

    fn unit_box(translation: cgmath::Vector3<f32>, scale: f32) -> SceneModel {
        SceneModel {
            id: ModelId(1),
            name: String::from("BOX"),
            kind: ModelKind::Box,
            mesh: Rc::new(shape::cuboid("BOX", [0.5, 0.5, 0.5], [1.0; 4]).unwrap()),
            transform: Transform {
                translation,
                scale: cgmath::Vector3::new(scale, scale, scale),
                ..Default::default()
            },
        }
    }

    #[test]
    fn hit_distance_is_measured_in_world_space() {
        let model = unit_box(cgmath::Vector3::new(0.0, 0.0, -5.0), 2.0);
        let ray = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 0.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );

        // Front face sits at z = -5 + 0.5 * 2.
        let distance = model.hit_by_ray(&ray).unwrap();
        assert!((distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn ray_passing_beside_model_misses() {
        let model = unit_box(cgmath::Vector3::new(3.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 0.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );

        assert!(model.hit_by_ray(&ray).is_none());
    }
}
