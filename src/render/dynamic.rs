use anyhow::Result;

use crate::data::cubemap::CubeMapFace;
use crate::error::Error;
use crate::render::camera::CameraUniform;
use crate::render::cubemap::CubeMap;
use crate::render::texture::DepthTexture2DPackage;
use crate::render::view::ViewEnvironment;

/// Render target cubemap refreshed from a model's position so the model can reflect the scene
/// around it.
pub struct DynamicCubeMap {
    pub cubemap: CubeMap,
    pub depth_texture: DepthTexture2DPackage,
    pub faces: [DynamicCubeMapFace; 6],
    queue: std::rc::Rc<wgpu::Queue>,
}

impl DynamicCubeMap {
    pub fn from_device(
        name: &str,
        resolution: u32,
        format: wgpu::TextureFormat,
        device: &wgpu::Device,
        queue: std::rc::Rc<wgpu::Queue>,
        view_environment: &ViewEnvironment,
        environment_map_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self> {
        let max_dimension = device.limits().max_texture_dimension_2d;
        if resolution == 0 || resolution > max_dimension {
            return Err(Error::new(format!(
                "Dynamic cubemap resolution {resolution} is outside the supported range 1..={max_dimension}"
            ))
            .into());
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{name}_DYNAMIC_CUBEMAP_TEXTURE")),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let faces = CubeMapFace::ALL.map(|face| {
            DynamicCubeMapFace::from_device(name, face, &gpu_texture, device, view_environment)
        });

        let depth_texture = DepthTexture2DPackage::from_device(
            device,
            &format!("{name}_DYNAMIC_CUBEMAP_DEPTH_TEXTURE"),
            resolution,
            resolution,
        );

        let cubemap = CubeMap::from_texture(
            gpu_texture,
            &format!("{name}_DYNAMIC_CUBEMAP"),
            device,
            environment_map_bind_group_layout,
        );

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::new(format!(
                "The dynamic cubemap render target for {name} is incomplete: {error}"
            ))
            .into());
        }
        let cubemap = cubemap?;

        log::debug!("Created {resolution}x{resolution} dynamic cubemap for {name}");

        Ok(Self {
            cubemap,
            depth_texture,
            faces,
            queue,
        })
    }

    /// Points every face camera out of `position`.
    pub fn update_faces(&self, position: cgmath::Point3<f32>) {
        let projection_matrix = CubeMapFace::projection_matrix();

        for face in &self.faces {
            let uniform = CameraUniform::new(
                position,
                projection_matrix * face.face.view_matrix(position),
                projection_matrix * face.face.rotation_matrix(),
            );

            self.queue.write_buffer(
                &face.gpu_camera_uniform_buffer,
                0,
                bytemuck::cast_slice(&[uniform]),
            );
        }
    }
}

pub struct DynamicCubeMapFace {
    pub face: CubeMapFace,
    pub gpu_texture_view: wgpu::TextureView,
    pub gpu_camera_uniform_buffer: wgpu::Buffer,
    pub gpu_camera_bind_group: wgpu::BindGroup,
}

impl DynamicCubeMapFace {
    fn from_device(
        name: &str,
        face: CubeMapFace,
        gpu_texture: &wgpu::Texture,
        device: &wgpu::Device,
        view_environment: &ViewEnvironment,
    ) -> Self {
        let gpu_texture_view = gpu_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{name}_DYNAMIC_CUBEMAP_FACE_{}_TEXTURE_VIEW", face.label())),
            format: Some(gpu_texture.format()),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: face.layer(),
            array_layer_count: Some(1),
        });

        let gpu_camera_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!(
                "{name}_DYNAMIC_CUBEMAP_FACE_{}_CAMERA_UNIFORM_BUFFER",
                face.label()
            )),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_camera_bind_group = view_environment.create_camera_bind_group(
            &format!("{name}_DYNAMIC_CUBEMAP_FACE_{}_BIND_GROUP", face.label()),
            &gpu_camera_uniform_buffer,
        );

        Self {
            face,
            gpu_texture_view,
            gpu_camera_uniform_buffer,
            gpu_camera_bind_group,
        }
    }
}
