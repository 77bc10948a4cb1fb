use crate::data::transform::Transform;
use crate::render::camera::user::UserCamera;
use crate::render::camera::{Camera, CameraUniform};
use crate::scene::settings::ViewerSettings;

/// Per-view GPU state shared by every model draw: the camera and the shading environment.
pub struct ViewEnvironment {
    aspect_ratio: f32,
    user_camera: UserCamera,
    gpu_camera_uniform_buffer: wgpu::Buffer,
    gpu_environment_uniform_buffer: wgpu::Buffer,
    view_environment_bind_group_layout: std::rc::Rc<wgpu::BindGroupLayout>,
    gpu_view_environment_bind_group: wgpu::BindGroup,
    device: std::rc::Rc<wgpu::Device>,
    queue: std::rc::Rc<wgpu::Queue>,
}

impl ViewEnvironment {
    pub fn from_device(
        device: std::rc::Rc<wgpu::Device>,
        queue: std::rc::Rc<wgpu::Queue>,
        aspect_ratio: f32,
        user_camera: UserCamera,
        view_environment_bind_group_layout: std::rc::Rc<wgpu::BindGroupLayout>,
    ) -> Self {
        let gpu_camera_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("CAMERA_UNIFORM_BUFFER"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_environment_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ENVIRONMENT_UNIFORM_BUFFER"),
            size: std::mem::size_of::<EnvironmentUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_view_environment_bind_group = ViewEnvironment::create_view_environment_bind_group(
            &device,
            "VIEW_ENVIRONMENT_BIND_GROUP",
            &view_environment_bind_group_layout,
            &gpu_camera_uniform_buffer,
            &gpu_environment_uniform_buffer,
        );

        let object = Self {
            aspect_ratio,
            user_camera,
            gpu_camera_uniform_buffer,
            gpu_environment_uniform_buffer,
            view_environment_bind_group_layout,
            gpu_view_environment_bind_group,
            device,
            queue,
        };

        object.update_camera_uniform_buffer();
        object.update_environment(&ViewerSettings::default());
        object
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.gpu_view_environment_bind_group
    }

    /// Bind group pairing another camera (e.g. a cubemap face) with this view's environment.
    pub fn create_camera_bind_group(
        &self,
        label: &str,
        gpu_camera_uniform_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        ViewEnvironment::create_view_environment_bind_group(
            &self.device,
            label,
            &self.view_environment_bind_group_layout,
            gpu_camera_uniform_buffer,
            &self.gpu_environment_uniform_buffer,
        )
    }

    pub fn set_user_camera_transform(&mut self, transform: Transform) {
        self.user_camera.transform = transform;
        self.update_camera_uniform_buffer();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if self.aspect_ratio == aspect_ratio {
            return;
        }

        self.aspect_ratio = aspect_ratio;

        if self.user_camera.camera.projection.aspect_ratio.is_some() {
            return;
        }

        self.update_camera_uniform_buffer();
    }

    pub fn view_projection_matrix(&self) -> cgmath::Matrix4<f32> {
        self.get_projection_matrix() * self.user_camera.create_view_matrix()
    }

    pub fn view_direction(&self) -> cgmath::Vector3<f32> {
        Camera::view_direction(&self.user_camera.transform)
    }

    pub fn update_environment(&self, settings: &ViewerSettings) {
        self.queue.write_buffer(
            &self.gpu_environment_uniform_buffer,
            0,
            bytemuck::cast_slice(&[EnvironmentUniform::from_settings(settings)]),
        );
    }

    fn update_camera_uniform_buffer(&self) {
        let projection_matrix = self.get_projection_matrix();

        self.queue.write_buffer(
            &self.gpu_camera_uniform_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::new(
                self.user_camera.position(),
                projection_matrix * self.user_camera.create_view_matrix(),
                projection_matrix * self.user_camera.create_rotation_matrix(),
            )]),
        );
    }

    fn get_projection_matrix(&self) -> cgmath::Matrix4<f32> {
        self.user_camera
            .camera
            .create_projection_matrix(self.aspect_ratio)
            .into()
    }

    fn create_view_environment_bind_group(
        device: &wgpu::Device,
        label: &str,
        view_environment_bind_group_layout: &wgpu::BindGroupLayout,
        gpu_camera_uniform_buffer: &wgpu::Buffer,
        gpu_environment_uniform_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: view_environment_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: gpu_camera_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: gpu_environment_uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EnvironmentUniform {
    pub override_color: [f32; 4],
    pub light_direction: [f32; 3],
    pub object_alpha: f32,
    pub enable_environment_mapping: u32,
    pub mapping_type: u32,
    pub use_override_color: u32,
    _padding: u32,
}

impl EnvironmentUniform {
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        Self {
            override_color: settings.renderer_color,
            light_direction: settings.light_direction,
            object_alpha: settings.object_alpha(),
            enable_environment_mapping: settings.enable_environment_mapping as u32,
            mapping_type: settings.mapping_type.shader_value(),
            use_override_color: !settings.show_materials as u32,
            _padding: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::settings::EnvironmentMappingType;

    #[test]
    fn environment_uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<EnvironmentUniform>(), 48);
    }

    #[test]
    fn hidden_materials_use_renderer_color() {
        let settings = ViewerSettings {
            show_materials: false,
            renderer_color: [0.2, 0.4, 0.6, 0.5],
            mapping_type: EnvironmentMappingType::Average,
            ..Default::default()
        };

        let uniform = EnvironmentUniform::from_settings(&settings);

        assert_eq!(uniform.use_override_color, 1);
        assert_eq!(uniform.override_color, [0.2, 0.4, 0.6, 0.5]);
        assert_eq!(uniform.object_alpha, 0.5);
        assert_eq!(uniform.mapping_type, 2);
        assert_eq!(uniform.enable_environment_mapping, 1);
    }
}
