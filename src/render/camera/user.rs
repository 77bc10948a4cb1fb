use crate::data::transform::Transform;
use crate::render::camera::Camera;

/// Camera driven by the orbital controller.
pub struct UserCamera {
    pub camera: Camera,
    pub transform: Transform,
}

impl UserCamera {
    pub fn create_view_matrix(&self) -> cgmath::Matrix4<f32> {
        Camera::create_view_matrix_from_transform(self.transform)
    }

    pub fn create_rotation_matrix(&self) -> cgmath::Matrix4<f32> {
        Camera::create_rotation_matrix_from_transform(self.transform)
    }

    pub fn position(&self) -> cgmath::Point3<f32> {
        cgmath::Point3::new(
            self.transform.translation.x,
            self.transform.translation.y,
            self.transform.translation.z,
        )
    }
}
