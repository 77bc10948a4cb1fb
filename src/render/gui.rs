use crate::render::texture::DepthTexture2DPackage;

/// Tessellated GUI output for one frame.
pub struct GuiFrame {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

pub struct GuiRenderer {
    egui_renderer: egui_wgpu::Renderer,
}

impl GuiRenderer {
    pub fn from_device(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            egui_renderer: egui_wgpu::Renderer::new(
                device,
                format,
                Some(DepthTexture2DPackage::FORMAT),
                1,
                false,
            ),
        }
    }

    /// Uploads textures and vertex data the frame needs. Must run before the pass is recorded.
    pub fn prepare(
        &mut self,
        frame: &GuiFrame,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        for (id, image_delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.paint_jobs,
            &frame.screen_descriptor,
        );
    }

    pub fn render(&self, frame: &GuiFrame, render_pass: &mut wgpu::RenderPass<'static>) {
        self.egui_renderer
            .render(render_pass, &frame.paint_jobs, &frame.screen_descriptor);
    }

    pub fn cleanup(&mut self, frame: &GuiFrame) {
        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
