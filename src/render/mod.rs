use anyhow::Result;

use crate::data::transform::Transform;
use crate::render::cubemap::CubeMap;
use crate::render::gui::{GuiFrame, GuiRenderer};
use crate::render::mesh::ModelInstance;
use crate::render::scene::ModelLoader;
use crate::render::state::RenderSystemState;
use crate::render::storage::RenderSystemSceneStorage;
use crate::resource::cubemap::CubeMapLoader;
use crate::scene::model::ModelId;
use crate::scene::settings::{EnvironmentMapSource, ViewerSettings};
use crate::scene::{face_pass_models, Scene};

mod buffer;
mod camera;
mod cubemap;
mod dynamic;
pub mod gui;
mod material;
mod mesh;
mod pipeline;
mod sampler;
mod scene;
mod shader;
mod skybox;
mod state;
mod storage;
mod texture;
mod view;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.2,
    b: 0.3,
    a: 1.0,
};

pub struct RenderSystem {
    state: RenderSystemState,
    storage: RenderSystemSceneStorage,
    gui_renderer: GuiRenderer,
}

impl RenderSystem {
    pub async fn from_window(
        window: std::sync::Arc<winit::window::Window>,
        cubemap_resolution: u32,
    ) -> Result<Self> {
        let state = RenderSystemState::from_window(window, cubemap_resolution).await?;
        let gui_renderer = GuiRenderer::from_device(&state.device, state.surface_config.format);

        Ok(Self {
            state,
            storage: Default::default(),
            gui_renderer,
        })
    }

    pub fn sync_view_dimensions(&mut self) {
        self.set_view_dimensions(self.state.view_dimensions);
    }

    pub fn set_view_dimensions(&mut self, view_dimensions: winit::dpi::PhysicalSize<u32>) {
        if view_dimensions.width == 0 || view_dimensions.height == 0 {
            return;
        }

        self.state.set_view_dimensions(view_dimensions);
    }

    pub fn view_dimensions(&self) -> winit::dpi::PhysicalSize<u32> {
        self.state.view_dimensions
    }

    pub fn set_user_camera_transform(&mut self, transform: Transform) {
        self.state
            .view_environment
            .set_user_camera_transform(transform);
    }

    pub fn view_projection_matrix(&self) -> cgmath::Matrix4<f32> {
        self.state.view_environment.view_projection_matrix()
    }

    pub fn view_direction(&self) -> cgmath::Vector3<f32> {
        self.state.view_environment.view_direction()
    }

    /// Replaces the static cubemap shown by the skybox and used for static reflections.
    pub fn load_skybox(&mut self, loader: &impl CubeMapLoader) -> Result<()> {
        self.state.static_cubemap = CubeMap::from_loader(
            loader,
            "STATIC_CUBEMAP",
            &self.state.device,
            &self.state.queue,
            &self.state.environment_map_bind_group_layout,
        )?;

        Ok(())
    }

    /// Uploads models new to the scene, drops removed ones and refreshes instance transforms.
    /// Returns the models that could not be uploaded; they are never drawn.
    pub fn sync_scene(&mut self, scene: &Scene) -> Vec<ModelId> {
        self.storage
            .model_registry
            .retain(|id, _| scene.model(*id).is_some());

        let mut failed_models = vec![];
        for model in scene.models() {
            if let Some(model_instance) = self.storage.model_registry.get_mut(&model.id) {
                model_instance.update_transform(model.model_matrix(), &self.state.queue);
                continue;
            }

            match ModelLoader::load(&self.state, &mut self.storage, model) {
                Ok(model_instance) => {
                    self.storage.model_registry.insert(model.id, model_instance);
                }
                Err(error) => {
                    log::error!("Failed to upload model {}: {error}", model.name);
                    failed_models.push(model.id);
                }
            }
        }

        failed_models
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        settings: &ViewerSettings,
        gui_frame: Option<&GuiFrame>,
    ) -> Result<()> {
        self.state.view_environment.update_environment(settings);

        let output = self.state.surface.get_current_texture()?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.state
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("RENDER_SYSTEM_COMMAND_ENCODER"),
                });

        let visible_models: Vec<ModelId> = scene
            .visible_models(settings)
            .map(|model| model.id)
            .filter(|id| self.storage.model_registry.contains_key(id))
            .collect();

        for model in scene.reflection_targets(settings) {
            self.render_dynamic_cubemap(
                model.id,
                model.position(),
                &visible_models,
                settings,
                &mut encoder,
            );
        }

        if let Some(gui_frame) = gui_frame {
            self.gui_renderer.prepare(
                gui_frame,
                &self.state.device,
                &self.state.queue,
                &mut encoder,
            );
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("RENDER_SYSTEM_RENDER_PASS"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.state.depth_texture.gpu_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.state.skybox_renderer.render_skybox(
                &self.state.static_cubemap,
                self.state.view_environment.bind_group(),
                &mut render_pass,
            );

            for id in visible_models.iter() {
                if let Some(model_instance) = self.storage.model_registry.get(id) {
                    self.render_model(
                        model_instance,
                        self.state.view_environment.bind_group(),
                        settings,
                        &mut render_pass,
                    );
                }
            }

            if let Some(gui_frame) = gui_frame {
                self.gui_renderer
                    .render(gui_frame, &mut render_pass.forget_lifetime());
            }
        }

        self.state.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(gui_frame) = gui_frame {
            self.gui_renderer.cleanup(gui_frame);
        }

        Ok(())
    }

    /// Renders the skybox and every other visible model into each face of the target model's
    /// cubemap, seen from the model's position.
    fn render_dynamic_cubemap(
        &self,
        target: ModelId,
        position: cgmath::Point3<f32>,
        visible_models: &[ModelId],
        settings: &ViewerSettings,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let dynamic_cubemap = match self.storage.model_registry.get(&target) {
            Some(model_instance) => &model_instance.dynamic_cubemap,
            None => return,
        };
        dynamic_cubemap.update_faces(position);

        for face in dynamic_cubemap.faces.iter() {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("DYNAMIC_CUBEMAP_FACE_RENDER_PASS"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &face.gpu_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &dynamic_cubemap.depth_texture.gpu_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.state.skybox_renderer.render_skybox(
                &self.state.static_cubemap,
                &face.gpu_camera_bind_group,
                &mut render_pass,
            );

            for id in face_pass_models(target, visible_models) {
                if let Some(model_instance) = self.storage.model_registry.get(&id) {
                    self.render_model(
                        model_instance,
                        &face.gpu_camera_bind_group,
                        settings,
                        &mut render_pass,
                    );
                }
            }
        }
    }

    fn render_model(
        &self,
        model_instance: &ModelInstance,
        camera_bind_group: &wgpu::BindGroup,
        settings: &ViewerSettings,
        render_pass: &mut wgpu::RenderPass,
    ) {
        let environment_map_bind_group = match settings.environment_map_source() {
            EnvironmentMapSource::Dynamic => &model_instance.dynamic_cubemap.cubemap.gpu_bind_group,
            EnvironmentMapSource::Static => &self.state.static_cubemap.gpu_bind_group,
        };

        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &model_instance.gpu_instance_bind_group, &[]);
        render_pass.set_bind_group(3, environment_map_bind_group, &[]);

        for primitive in model_instance.mesh.primitives.iter() {
            render_pass.set_pipeline(&primitive.render_pipeline.gpu_pipeline);

            // Vertex buffer slots follow the pipeline's attribute order.
            for (slot, attribute) in primitive
                .render_pipeline
                .config
                .attributes()
                .into_iter()
                .enumerate()
            {
                if let Some(slice) = primitive.vertex_buffer.slice(attribute) {
                    render_pass.set_vertex_buffer(slot as u32, slice);
                }
            }

            render_pass.set_bind_group(2, &primitive.material.gpu_bind_group, &[]);
            render_pass.set_index_buffer(
                primitive.index_buffer.gpu_buffer.slice(..),
                primitive.index_buffer.type_,
            );
            render_pass.draw_indexed(0..primitive.index_buffer.count, 0, 0..1);
        }
    }
}
