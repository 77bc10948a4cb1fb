use cgmath::Rotation3;

use crate::data::transform::Transform;
use crate::scene::description::CameraDescription;

const SAFE_FRAC_PI_2: f32 = std::f32::consts::FRAC_PI_2 - 0.0001;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 200.0;

/// Orbits the camera around a target while the right mouse button is held; the wheel zooms.
/// The left button is left free for picking models.
pub struct OrbitalCameraController {
    target: cgmath::Point3<f32>,
    distance: f32,
    yaw: cgmath::Rad<f32>,
    pitch: cgmath::Rad<f32>,
    sensitivity: f32,
    zoom_sensitivity: f32,
    is_right_mouse_pressed: bool,
    rotation_horizontal: f32,
    rotation_vertical: f32,
    zoom: f32,
}

impl OrbitalCameraController {
    pub fn new(
        target: cgmath::Point3<f32>,
        distance: f32,
        yaw: cgmath::Rad<f32>,
        pitch: cgmath::Rad<f32>,
        sensitivity: f32,
    ) -> Self {
        Self {
            target,
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            yaw,
            pitch: cgmath::Rad(pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2)),
            sensitivity,
            zoom_sensitivity: 0.1,
            is_right_mouse_pressed: false,
            rotation_horizontal: 0.0,
            rotation_vertical: 0.0,
            zoom: 0.0,
        }
    }

    pub fn from_description(description: &CameraDescription) -> Self {
        OrbitalCameraController::new(
            description.target.into(),
            description.distance,
            cgmath::Deg(description.yaw_degrees).into(),
            cgmath::Deg(description.pitch_degrees).into(),
            0.3,
        )
    }

    pub fn handle_mouse_input(
        &mut self,
        button: winit::event::MouseButton,
        state: winit::event::ElementState,
    ) {
        if button == winit::event::MouseButton::Right {
            self.is_right_mouse_pressed = state == winit::event::ElementState::Pressed;
        }
    }

    pub fn handle_mouse_movement(&mut self, delta_x: f32, delta_y: f32) {
        if !self.is_right_mouse_pressed {
            return;
        }

        self.rotation_horizontal += delta_x;
        self.rotation_vertical += delta_y;
    }

    pub fn handle_mouse_wheel(&mut self, delta: winit::event::MouseScrollDelta) {
        self.zoom += match delta {
            winit::event::MouseScrollDelta::LineDelta(_, lines) => lines,
            winit::event::MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
        };
    }

    pub fn generate_updated_camera_transform(
        &mut self,
        delta_time: std::time::Duration,
    ) -> Option<Transform> {
        let has_rotation = self.rotation_vertical != 0.0 || self.rotation_horizontal != 0.0;
        let has_zoom = self.zoom != 0.0;

        if !has_rotation && !has_zoom {
            return None;
        }

        self.apply_scaled_rotation(delta_time);
        self.apply_zoom();
        self.rotation_horizontal = 0.0;
        self.rotation_vertical = 0.0;
        self.zoom = 0.0;

        Some(self.calculate_camera_transform())
    }

    fn apply_scaled_rotation(&mut self, delta_time: std::time::Duration) {
        let delta_time = delta_time.as_secs_f32();

        self.yaw += cgmath::Rad(self.rotation_horizontal) * self.sensitivity * delta_time;
        self.pitch += cgmath::Rad(self.rotation_vertical) * self.sensitivity * delta_time;

        self.pitch = cgmath::Rad(self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }

    fn apply_zoom(&mut self) {
        // Each wheel step scales the distance so zooming feels the same near and far.
        self.distance *= (1.0 - self.zoom_sensitivity).powf(self.zoom);
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn calculate_camera_transform(&self) -> Transform {
        let rotation = cgmath::Quaternion::from_angle_y(-self.yaw)
            * cgmath::Quaternion::from_angle_x(-self.pitch);

        let view_direction = cgmath::Rotation::rotate_vector(&rotation, -cgmath::Vector3::unit_z());
        let translation = self.target + (self.distance * -view_direction);

        Transform {
            translation: cgmath::Vector3 {
                x: translation.x,
                y: translation.y,
                z: translation.z,
            },
            rotation,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, MetricSpace, Rotation};

    use super::*;

    fn view_direction(transform: &Transform) -> cgmath::Vector3<f32> {
        transform.rotation.rotate_vector(-cgmath::Vector3::unit_z())
    }

    fn controller(yaw_degrees: f32, pitch_degrees: f32) -> OrbitalCameraController {
        OrbitalCameraController::from_description(&CameraDescription {
            target: [1.0, 2.0, 3.0],
            distance: 5.0,
            yaw_degrees,
            pitch_degrees,
        })
    }

    #[test]
    fn camera_looks_at_target_from_distance() {
        let controller = controller(30.0, 20.0);
        let transform = controller.calculate_camera_transform();

        let position = cgmath::Point3::new(
            transform.translation.x,
            transform.translation.y,
            transform.translation.z,
        );
        let target = cgmath::Point3::new(1.0, 2.0, 3.0);

        assert!((position.distance(target) - 5.0).abs() < 1e-4);

        let to_target = (target - position).normalize();
        assert!((view_direction(&transform) - to_target).magnitude() < 1e-4);
    }

    #[test]
    fn positive_pitch_looks_down() {
        let transform = controller(0.0, 30.0).calculate_camera_transform();

        assert!(view_direction(&transform).y < 0.0);
        assert!(transform.translation.y > 2.0);
    }

    #[test]
    fn orbit_requires_right_button() {
        let mut controller = controller(0.0, 0.0);

        controller.handle_mouse_movement(10.0, 0.0);
        assert!(controller
            .generate_updated_camera_transform(std::time::Duration::from_millis(16))
            .is_none());

        controller.handle_mouse_input(
            winit::event::MouseButton::Right,
            winit::event::ElementState::Pressed,
        );
        controller.handle_mouse_movement(10.0, 0.0);
        assert!(controller
            .generate_updated_camera_transform(std::time::Duration::from_millis(16))
            .is_some());
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut controller = controller(0.0, 0.0);

        controller.handle_mouse_wheel(winit::event::MouseScrollDelta::LineDelta(0.0, 1.0));
        controller.generate_updated_camera_transform(std::time::Duration::from_millis(16));
        assert!((controller.distance - 4.5).abs() < 1e-4);

        controller.handle_mouse_wheel(winit::event::MouseScrollDelta::LineDelta(0.0, 500.0));
        controller.generate_updated_camera_transform(std::time::Duration::from_millis(16));
        assert_eq!(controller.distance, MIN_DISTANCE);
    }
}
