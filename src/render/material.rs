use crate::render::texture::Texture2DPackage;

pub struct Material {
    base_color_factor: [f32; 4],
    #[allow(dead_code)]
    base_color_texture: std::rc::Rc<Texture2DPackage>,
    pub gpu_material_uniform_buffer: wgpu::Buffer,
    pub gpu_bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn from_device(
        name: &str,
        base_color_factor: [f32; 4],
        base_color_texture: std::rc::Rc<Texture2DPackage>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let gpu_material_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{name}_MATERIAL_UNIFORM_BUFFER")),
            size: std::mem::size_of::<MaterialUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}_MATERIAL_BIND_GROUP")),
            layout: material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: gpu_material_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        &base_color_texture.gpu_texture_view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(
                        &base_color_texture.sampler.gpu_sampler,
                    ),
                },
            ],
        });

        let object = Self {
            base_color_factor,
            base_color_texture,
            gpu_material_uniform_buffer,
            gpu_bind_group,
        };
        object.initialize_uniform_buffer(queue);

        object
    }

    fn initialize_uniform_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.gpu_material_uniform_buffer,
            0,
            bytemuck::cast_slice(&[MaterialUniform::new(self.base_color_factor)]),
        );
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    base_color_factor: [f32; 4],
}

impl MaterialUniform {
    pub fn new(base_color_factor: [f32; 4]) -> Self {
        Self { base_color_factor }
    }
}
