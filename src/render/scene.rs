use std::collections::HashMap;

use anyhow::Result;

use crate::render::buffer::allocator::VertexBufferAllocator;
use crate::render::buffer::{IndexBuffer, VertexAttribute};
use crate::render::dynamic::DynamicCubeMap;
use crate::render::material::Material;
use crate::render::mesh::{GpuPrimitive, Mesh, ModelInstance};
use crate::render::pipeline::{RenderPipeline, RenderPipelineConfiguration};
use crate::render::sampler::Sampler;
use crate::render::shader::{ShaderModulePackage, ShaderTemplateConfiguration};
use crate::render::state::RenderSystemState;
use crate::render::storage::RenderSystemSceneStorage;
use crate::render::texture::Texture2DPackage;
use crate::resource::mesh::{MaterialData, PrimitiveData};
use crate::scene::model::SceneModel;

/// Uploads a scene model's CPU mesh to the GPU and gives it a reflection cubemap.
pub struct ModelLoader<'a> {
    state: &'a RenderSystemState,
    storage: &'a mut RenderSystemSceneStorage,
    material_registry: HashMap<Option<usize>, std::rc::Rc<Material>>,
    label_prefix: String,
}

impl<'a> ModelLoader<'a> {
    pub fn load(
        state: &'a RenderSystemState,
        storage: &'a mut RenderSystemSceneStorage,
        model: &SceneModel,
    ) -> Result<ModelInstance> {
        let mut model_loader = Self {
            state,
            storage,
            material_registry: HashMap::new(),
            label_prefix: format!("MODEL_{}_{}", model.name, model.id.0),
        };

        model_loader.load_model(model)
    }

    fn load_model(&mut self, model: &SceneModel) -> Result<ModelInstance> {
        log::debug!("Uploading model: {} - [{}]", model.name, model.id.0);

        let mut primitives = Vec::<GpuPrimitive>::with_capacity(model.mesh.primitives.len());
        for (index, primitive) in model.mesh.primitives.iter().enumerate() {
            log::debug!(
                "Uploading primitive {index} ({} triangles) for model: {}",
                primitive.indices.len() / 3,
                model.name
            );

            let material = self.load_material(primitive.material, &model.mesh.materials);
            primitives.push(self.load_primitive(
                primitive,
                material,
                format!("{}_PRIMITIVE_{index}", self.label_prefix),
            )?);
        }

        let dynamic_cubemap = DynamicCubeMap::from_device(
            &self.label_prefix,
            self.state.cubemap_resolution,
            self.state.surface_config.format,
            &self.state.device,
            self.state.queue.clone(),
            &self.state.view_environment,
            &self.state.environment_map_bind_group_layout,
        )?;

        let mut model_instance = ModelInstance::from_device(
            &self.state.device,
            &self.label_prefix,
            Mesh { primitives },
            dynamic_cubemap,
            &self.state.instance_bind_group_layout,
        );
        model_instance.update_transform(model.model_matrix(), &self.state.queue);

        Ok(model_instance)
    }

    fn load_primitive(
        &mut self,
        primitive: &PrimitiveData,
        material: std::rc::Rc<Material>,
        label_prefix: String,
    ) -> Result<GpuPrimitive> {
        let mut vertex_buffer_allocator =
            VertexBufferAllocator::new(format!("{label_prefix}_VERTEX_BUFFER"));

        vertex_buffer_allocator.add_segment(
            VertexAttribute::Position,
            bytemuck::cast_slice(&primitive.positions).to_vec(),
        );
        vertex_buffer_allocator.add_segment(
            VertexAttribute::Normal,
            bytemuck::cast_slice(&primitive.normals).to_vec(),
        );
        if let Some(tex_coords) = &primitive.tex_coords {
            vertex_buffer_allocator.add_segment(
                VertexAttribute::TexCoord0,
                bytemuck::cast_slice(tex_coords).to_vec(),
            );
        }

        let vertex_buffer =
            vertex_buffer_allocator.finish(&self.state.device, &self.state.queue)?;

        let index_buffer = IndexBuffer::from_indices(
            &format!("{label_prefix}_INDEX_BUFFER"),
            &primitive.indices,
            &self.state.device,
            &self.state.queue,
        );

        let render_pipeline = self.get_render_pipeline(&RenderPipelineConfiguration {
            has_tex_coord_0: primitive.tex_coords.is_some(),
            topology: wgpu::PrimitiveTopology::TriangleList,
        })?;

        Ok(GpuPrimitive {
            vertex_buffer,
            index_buffer,
            material,
            render_pipeline,
        })
    }

    fn load_material(
        &mut self,
        material_index: Option<usize>,
        materials: &[MaterialData],
    ) -> std::rc::Rc<Material> {
        let material_index = material_index.filter(|index| *index < materials.len());

        if let Some(material) = self.material_registry.get(&material_index) {
            return material.clone();
        }

        let default_material = MaterialData::default();
        let material = match material_index {
            Some(index) => &materials[index],
            None => &default_material,
        };

        let material_label = format!(
            "{}_MATERIAL_{}_{}",
            self.label_prefix,
            material.name,
            match material_index {
                Some(index) => index.to_string(),
                None => String::from("<DEFAULT>"),
            },
        );
        log::debug!("Uploading material: {material_label}");

        let base_color_texture = match &material.base_color_image {
            Some(image) => std::rc::Rc::new(Texture2DPackage::from_rgba_image(
                image,
                &format!("{material_label}_BASE_COLOR_TEXTURE"),
                self.load_material_sampler(),
                &self.state.device,
                &self.state.queue,
            )),
            None => self.load_default_texture(),
        };

        let loaded_material = std::rc::Rc::new(Material::from_device(
            &material_label,
            material.base_color_factor,
            base_color_texture,
            &self.state.device,
            &self.state.queue,
            &self.state.material_bind_group_layout,
        ));

        self.material_registry
            .insert(material_index, loaded_material.clone());

        loaded_material
    }

    fn load_material_sampler(&mut self) -> std::rc::Rc<Sampler> {
        if let Some(sampler) = &self.storage.material_sampler {
            return sampler.clone();
        }

        let sampler = std::rc::Rc::new(Sampler::from_device(
            &self.state.device,
            "MATERIAL_SAMPLER",
            wgpu::AddressMode::Repeat,
            wgpu::FilterMode::Linear,
        ));
        self.storage.material_sampler = Some(sampler.clone());

        sampler
    }

    fn load_default_texture(&mut self) -> std::rc::Rc<Texture2DPackage> {
        if let Some(default_texture) = &self.storage.default_texture {
            return default_texture.clone();
        }

        log::debug!("Loading default texture.");

        let sampler = std::rc::Rc::new(Sampler::from_device(
            &self.state.device,
            "DEFAULT_TEXTURE_SAMPLER",
            wgpu::AddressMode::ClampToEdge,
            wgpu::FilterMode::Nearest,
        ));

        let default_texture = std::rc::Rc::new(Texture2DPackage::white(
            sampler,
            &self.state.device,
            &self.state.queue,
        ));
        self.storage.default_texture = Some(default_texture.clone());

        default_texture
    }

    fn get_render_pipeline(
        &mut self,
        render_pipeline_config: &RenderPipelineConfiguration,
    ) -> Result<std::rc::Rc<RenderPipeline>> {
        if let Some(render_pipeline) = self
            .storage
            .render_pipeline_registry
            .get(render_pipeline_config)
        {
            return Ok(render_pipeline.clone());
        }

        let shader_template_config =
            ShaderTemplateConfiguration::from_render_pipeline_config(render_pipeline_config);

        let shader_module_package = self.get_shader_module_package(&shader_template_config)?;

        log::debug!(
            "Creating render pipeline for config: {:?}",
            render_pipeline_config
        );

        let render_pipeline = std::rc::Rc::new(RenderPipeline::from_config(
            *render_pipeline_config,
            format!(
                "MODEL_RENDER_PIPELINE_{}",
                self.storage.render_pipeline_registry.len()
            ),
            &self.state.device,
            &[
                &self.state.view_environment_bind_group_layout,
                &self.state.instance_bind_group_layout,
                &self.state.material_bind_group_layout,
                &self.state.environment_map_bind_group_layout,
            ],
            &shader_module_package.vertex_shader_module,
            &shader_module_package.fragment_shader_module,
            self.state.surface_config.format,
        ));
        self.storage
            .render_pipeline_registry
            .insert(*render_pipeline_config, render_pipeline.clone());

        Ok(render_pipeline)
    }

    fn get_shader_module_package(
        &mut self,
        shader_template_config: &ShaderTemplateConfiguration,
    ) -> Result<std::rc::Rc<ShaderModulePackage>> {
        if let Some(shader_module_package) = self
            .storage
            .shader_module_package_registry
            .get(shader_template_config)
        {
            return Ok(shader_module_package.clone());
        }

        let module_name_prefix = format!(
            "MODEL_SHADER_MODULE_PACKAGE_{}",
            self.storage.shader_module_package_registry.len()
        );

        let shader_module_package = std::rc::Rc::new(ShaderModulePackage::from_templates(
            "model/model.vert",
            "model/model.frag",
            &module_name_prefix,
            &self.state.device,
            &self.state.tera,
            Some(shader_template_config),
        )?);

        self.storage
            .shader_module_package_registry
            .insert(*shader_template_config, shader_module_package.clone());

        Ok(shader_module_package)
    }
}
