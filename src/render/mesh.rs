use crate::data::transform::normal_matrix;
use crate::render::buffer::{IndexBuffer, VertexBuffer};
use crate::render::dynamic::DynamicCubeMap;
use crate::render::material::Material;
use crate::render::pipeline::RenderPipeline;

pub struct GpuPrimitive {
    pub vertex_buffer: VertexBuffer,
    pub index_buffer: IndexBuffer,
    pub material: std::rc::Rc<Material>,
    pub render_pipeline: std::rc::Rc<RenderPipeline>,
}

pub struct Mesh {
    pub primitives: Vec<GpuPrimitive>,
}

/// GPU side of a scene model: its uploaded mesh, instance transform and reflection cubemap.
pub struct ModelInstance {
    pub mesh: Mesh,
    pub gpu_instance_uniform_buffer: wgpu::Buffer,
    pub gpu_instance_bind_group: wgpu::BindGroup,
    pub dynamic_cubemap: DynamicCubeMap,
    model_matrix: Option<cgmath::Matrix4<f32>>,
}

impl ModelInstance {
    pub fn from_device(
        device: &wgpu::Device,
        name: &str,
        mesh: Mesh,
        dynamic_cubemap: DynamicCubeMap,
        instance_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let gpu_instance_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{name}_INSTANCE_UNIFORM_BUFFER")),
            size: std::mem::size_of::<InstanceUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_instance_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}_INSTANCE_BIND_GROUP")),
            layout: instance_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: gpu_instance_uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            mesh,
            gpu_instance_uniform_buffer,
            gpu_instance_bind_group,
            dynamic_cubemap,
            model_matrix: None,
        }
    }

    /// Uploads the model matrix when it differs from the last one written.
    pub fn update_transform(&mut self, model_matrix: cgmath::Matrix4<f32>, queue: &wgpu::Queue) {
        if self.model_matrix == Some(model_matrix) {
            return;
        }

        queue.write_buffer(
            &self.gpu_instance_uniform_buffer,
            0,
            bytemuck::cast_slice(&[InstanceUniform::new(model_matrix)]),
        );
        self.model_matrix = Some(model_matrix);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniform {
    model_matrix: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
}

impl InstanceUniform {
    pub fn new(model_matrix: cgmath::Matrix4<f32>) -> Self {
        Self {
            model_matrix: model_matrix.into(),
            normal_matrix: normal_matrix(&model_matrix).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_uniform_holds_model_and_normal_matrices() {
        assert_eq!(std::mem::size_of::<InstanceUniform>(), 128);

        let model_matrix = cgmath::Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let uniform = InstanceUniform::new(model_matrix);

        assert_eq!(uniform.model_matrix[0][0], 2.0);
        assert_eq!(uniform.normal_matrix[0][0], 0.5);
        assert_eq!(uniform.normal_matrix[1][1], 1.0);
    }
}
