pub mod projection;
pub mod user;

use cgmath::Rotation;

use crate::data::projection::PerspectiveProjection;
use crate::data::transform::Transform;
use crate::render::camera::projection::PerspectiveCameraProjection;

pub struct Camera {
    pub projection: PerspectiveCameraProjection,
}

impl Camera {
    pub fn create_projection_matrix(&self, aspect_ratio: f32) -> PerspectiveProjection {
        let aspect_ratio = match self.projection.aspect_ratio {
            Some(aspect_ratio) => aspect_ratio,
            None => aspect_ratio,
        };

        PerspectiveProjection {
            aspect_ratio,
            fovy: self.projection.fovy,
            znear: self.projection.znear,
            zfar: self.projection.zfar,
        }
    }

    pub fn create_view_matrix_from_transform(transform: Transform) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_to_rh(
            cgmath::Point3 {
                x: transform.translation.x,
                y: transform.translation.y,
                z: transform.translation.z,
            },
            Camera::view_direction(&transform),
            cgmath::Vector3::unit_y(),
        )
    }

    /// View matrix with the translation dropped, for geometry pinned to the camera like a skybox.
    pub fn create_rotation_matrix_from_transform(transform: Transform) -> cgmath::Matrix4<f32> {
        Camera::create_view_matrix_from_transform(Transform {
            rotation: transform.rotation,
            ..Default::default()
        })
    }

    pub fn view_direction(transform: &Transform) -> cgmath::Vector3<f32> {
        transform.rotation.rotate_vector(-cgmath::Vector3::unit_z())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub position: [f32; 3],
    _padding: u32,
    pub view_projection_matrix: [[f32; 4]; 4],
    pub skybox_view_projection_matrix: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(
        position: cgmath::Point3<f32>,
        view_projection_matrix: cgmath::Matrix4<f32>,
        skybox_view_projection_matrix: cgmath::Matrix4<f32>,
    ) -> Self {
        Self {
            position: position.into(),
            _padding: 0,
            view_projection_matrix: view_projection_matrix.into(),
            skybox_view_projection_matrix: skybox_view_projection_matrix.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
    }

    #[test]
    fn rotation_matrix_ignores_translation() {
        let transform = Transform {
            translation: cgmath::Vector3::new(3.0, -2.0, 7.0),
            ..Default::default()
        };

        assert_eq!(
            Camera::create_rotation_matrix_from_transform(transform),
            Camera::create_view_matrix_from_transform(Transform::default())
        );
    }
}
