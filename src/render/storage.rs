use std::collections::HashMap;

use crate::render::mesh::ModelInstance;
use crate::render::pipeline::{RenderPipeline, RenderPipelineConfiguration};
use crate::render::sampler::Sampler;
use crate::render::shader::{ShaderModulePackage, ShaderTemplateConfiguration};
use crate::render::texture::Texture2DPackage;
use crate::scene::model::ModelId;

#[derive(Default)]
pub struct RenderSystemSceneStorage {
    pub model_registry: HashMap<ModelId, ModelInstance>,
    pub render_pipeline_registry: HashMap<RenderPipelineConfiguration, std::rc::Rc<RenderPipeline>>,
    pub shader_module_package_registry:
        HashMap<ShaderTemplateConfiguration, std::rc::Rc<ShaderModulePackage>>,
    pub default_texture: Option<std::rc::Rc<Texture2DPackage>>,
    pub material_sampler: Option<std::rc::Rc<Sampler>>,
}
