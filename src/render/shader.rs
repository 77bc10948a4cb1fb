use anyhow::Result;

use crate::render::pipeline::RenderPipelineConfiguration;

pub const SHADER_TEMPLATE_GLOB: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/**/*");

pub struct ShaderModulePackage {
    pub vertex_shader_module: wgpu::ShaderModule,
    pub fragment_shader_module: wgpu::ShaderModule,
}

impl ShaderModulePackage {
    pub fn from_templates(
        vertex_template_name: &str,
        fragment_template_name: &str,
        name: &str,
        device: &wgpu::Device,
        tera: &tera::Tera,
        shader_template_config: Option<&ShaderTemplateConfiguration>,
    ) -> Result<Self> {
        let shader_template_context = match shader_template_config {
            Some(shader_template_config) => tera::Context::from_serialize(shader_template_config)?,
            None => tera::Context::new(),
        };

        let vertex_shader_source = ShaderModulePackage::render_shader(
            vertex_template_name,
            tera,
            &shader_template_context,
        )?;

        let fragment_shader_source = ShaderModulePackage::render_shader(
            fragment_template_name,
            tera,
            &shader_template_context,
        )?;

        if shader_template_config.is_some() {
            log::debug!(
                "Creating shader module package {name} from config: {:?}",
                shader_template_config
            );
        } else {
            log::debug!("Creating shader module package {name}");
        }

        Ok(ShaderModulePackage {
            vertex_shader_module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{}_VERTEX_SHADER_MODULE", name)),
                source: wgpu::ShaderSource::Wgsl(vertex_shader_source.into()),
            }),
            fragment_shader_module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{}_FRAGMENT_SHADER_MODULE", name)),
                source: wgpu::ShaderSource::Wgsl(fragment_shader_source.into()),
            }),
        })
    }

    pub fn render_shader(
        template_name: &str,
        tera: &tera::Tera,
        template_context: &tera::Context,
    ) -> Result<String> {
        match tera.render(template_name, template_context) {
            Ok(shader_source) => Ok(shader_source),
            Err(error) => Err(error.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize)]
pub struct ShaderTemplateConfiguration {
    pub has_tex_coord_0: bool,
    pub tex_coord_0_location: u32,
}

impl ShaderTemplateConfiguration {
    pub fn from_render_pipeline_config(config: &RenderPipelineConfiguration) -> Self {
        Self {
            has_tex_coord_0: config.has_tex_coord_0,
            tex_coord_0_location: config.get_tex_coord_0_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader_templates() -> tera::Tera {
        tera::Tera::new(SHADER_TEMPLATE_GLOB).unwrap()
    }

    fn render(template_name: &str, has_tex_coord_0: bool) -> String {
        let config = ShaderTemplateConfiguration::from_render_pipeline_config(
            &RenderPipelineConfiguration {
                has_tex_coord_0,
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        );

        ShaderModulePackage::render_shader(
            template_name,
            &shader_templates(),
            &tera::Context::from_serialize(config).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn tex_coord_input_is_templated() {
        let textured = render("model/model.vert", true);
        let untextured = render("model/model.vert", false);

        assert!(textured.contains("@location(2) tex_coord_0"));
        assert!(!untextured.contains("tex_coord_0"));
    }

    #[test]
    fn model_shaders_declare_every_bind_group() {
        let vertex_source = render("model/model.vert", true);
        let fragment_source = render("model/model.frag", true);

        assert!(vertex_source.contains("@group(1)"));
        for group in [0, 2, 3] {
            assert!(
                fragment_source.contains(&format!("@group({group})")),
                "missing group {group}"
            );
        }
    }

    #[test]
    fn skybox_templates_render_without_context() {
        let tera = shader_templates();

        for template_name in ["skybox/skybox.vert", "skybox/skybox.frag"] {
            let source =
                ShaderModulePackage::render_shader(template_name, &tera, &tera::Context::new())
                    .unwrap();
            assert!(source.contains("fn "));
        }
    }
}
