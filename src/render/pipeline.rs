use crate::render::buffer::VertexAttribute;
use crate::render::texture::DepthTexture2DPackage;

pub struct RenderPipeline {
    pub config: RenderPipelineConfiguration,
    pub gpu_pipeline: wgpu::RenderPipeline,
}

impl RenderPipeline {
    pub fn from_config(
        config: RenderPipelineConfiguration,
        name: String,
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        vertex_shader_module: &wgpu::ShaderModule,
        fragment_shader_module: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
    ) -> Self {
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name}_RENDER_PIPELINE_LAYOUT")),
                bind_group_layouts,
                push_constant_ranges: &[],
            });

        let vertex_buffer_layout_builder =
            RenderPipeline::create_vertex_buffer_layout_builder(&config);

        let gpu_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{name}_RENDER_PIPELINE")),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex_shader_module,
                entry_point: "vs_main",
                buffers: &vertex_buffer_layout_builder.build(),
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Models are drawn double sided: imported meshes are not reliably closed and the
            // mirrored cubemap face projections flip winding.
            primitive: wgpu::PrimitiveState {
                topology: config.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTexture2DPackage::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self {
            config,
            gpu_pipeline,
        }
    }

    fn create_vertex_buffer_layout_builder(
        config: &RenderPipelineConfiguration,
    ) -> VertexBufferLayoutBuilder {
        let mut builder: VertexBufferLayoutBuilder = Default::default();

        for attribute in config.attributes() {
            builder.add(VertexBufferLayoutBuilderEntry {
                array_stride: attribute.size() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: vec![wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: config.get_location(attribute),
                    format: attribute.format(),
                }],
            });
        }

        builder
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RenderPipelineConfiguration {
    pub has_tex_coord_0: bool,
    pub topology: wgpu::PrimitiveTopology,
}

impl RenderPipelineConfiguration {
    /// Attributes in vertex buffer slot order.
    pub fn attributes(&self) -> Vec<VertexAttribute> {
        let mut attributes = vec![VertexAttribute::Position, VertexAttribute::Normal];
        if self.has_tex_coord_0 {
            attributes.push(VertexAttribute::TexCoord0);
        }
        attributes
    }

    pub fn get_location(&self, attribute: VertexAttribute) -> u32 {
        match attribute {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 1,
            VertexAttribute::TexCoord0 => self.get_tex_coord_0_location(),
        }
    }

    pub fn get_tex_coord_0_location(&self) -> u32 {
        match self.has_tex_coord_0 {
            true => 2,
            false => 0,
        }
    }
}

#[derive(Default)]
struct VertexBufferLayoutBuilder {
    entries: Vec<VertexBufferLayoutBuilderEntry>,
}

impl VertexBufferLayoutBuilder {
    pub fn add(&mut self, entry: VertexBufferLayoutBuilderEntry) {
        self.entries.push(entry);
    }

    pub fn build(&self) -> Vec<wgpu::VertexBufferLayout> {
        self.entries
            .iter()
            .map(|entry| wgpu::VertexBufferLayout {
                array_stride: entry.array_stride,
                step_mode: entry.step_mode,
                attributes: &entry.attributes,
            })
            .collect()
    }
}

struct VertexBufferLayoutBuilderEntry {
    array_stride: wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode,
    attributes: Vec<wgpu::VertexAttribute>,
}
