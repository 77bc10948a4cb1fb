use std::path::Path;

use anyhow::Result;

use crate::args::Args;
use crate::camera::OrbitalCameraController;
use crate::data::ray::Ray;
use crate::gui::Gui;
use crate::render::RenderSystem;
use crate::resource::cubemap::faces::ImageFacesCubeMapLoader;
use crate::scene::description::SceneDescription;
use crate::scene::settings::ViewerSettings;
use crate::scene::Scene;

pub struct ViewSystem {
    pub window: std::sync::Arc<winit::window::Window>,
    pub render_system: RenderSystem,
    pub camera_controller: OrbitalCameraController,
    gui: Gui,
    scene: Scene,
    settings: ViewerSettings,
    cursor_position: Option<(f64, f64)>,
}

impl ViewSystem {
    pub async fn from_window(window: winit::window::Window, args: &Args) -> Result<Self> {
        let window = std::sync::Arc::new(window);

        let description = match &args.scene {
            Some(path) => SceneDescription::from_path(path)?,
            None => SceneDescription::builtin(),
        };

        let mut render_system =
            RenderSystem::from_window(window.clone(), args.cubemap_resolution).await?;

        let skybox = match (&args.skybox, &description.skybox) {
            (Some(directory), _) => Some(ImageFacesCubeMapLoader::from_directory(directory)),
            (None, Some(skybox)) => Some(ImageFacesCubeMapLoader::from_paths(&skybox.face_paths())),
            (None, None) => None,
        };
        if let Some(loader) = skybox {
            match loader.and_then(|loader| render_system.load_skybox(&loader)) {
                Ok(_) => log::info!("Loaded skybox"),
                Err(error) => log::error!("Failed to load skybox, keeping the default sky: {error}"),
            }
        }

        let mut scene = Scene::default();
        description.populate(&mut scene);
        for path in &args.models {
            if let Err(error) = scene.add_model_file(path) {
                log::error!("Failed to load model {}: {error}", path.display());
            }
        }

        let camera_controller = OrbitalCameraController::from_description(&description.camera);
        render_system.set_user_camera_transform(camera_controller.calculate_camera_transform());

        let gui = Gui::new(&window);

        Ok(Self {
            window,
            render_system,
            camera_controller,
            gui,
            scene,
            settings: description.settings,
            cursor_position: None,
        })
    }

    /// Routes a window event to the GUI first. Returns true when the GUI consumed it.
    pub fn handle_gui_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.gui.handle_window_event(&self.window, event)
    }

    pub fn handle_mouse_input(
        &mut self,
        button: winit::event::MouseButton,
        state: winit::event::ElementState,
    ) {
        self.camera_controller.handle_mouse_input(button, state);

        if button != winit::event::MouseButton::Left {
            return;
        }

        match state {
            winit::event::ElementState::Pressed => {
                if let Some(ray) = self.cursor_ray() {
                    self.scene.begin_drag(
                        &ray,
                        self.render_system.view_direction(),
                        &self.settings,
                    );
                }
            }
            winit::event::ElementState::Released => self.scene.end_drag(),
        }
    }

    pub fn handle_cursor_moved(&mut self, position: winit::dpi::PhysicalPosition<f64>) {
        self.cursor_position = Some((position.x, position.y));

        if !self.scene.is_dragging() {
            return;
        }

        if let Some(ray) = self.cursor_ray() {
            self.scene.drag_to(&ray);
        }
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor_position = None;
        self.scene.end_drag();
    }

    /// Adds a dropped model file at the origin. Load failures are logged, not fatal.
    pub fn handle_dropped_file(&mut self, path: &Path) {
        log::info!("Loading dropped file: {}", path.display());

        match self.scene.add_model_file(path) {
            Ok(id) => log::debug!("Dropped file {} added as model [{}]", path.display(), id.0),
            Err(error) => log::error!("Failed to load dropped file {}: {error}", path.display()),
        }
    }

    pub fn update_view(&mut self, delta_time: std::time::Duration) -> Result<()> {
        if let Some(transform) = self
            .camera_controller
            .generate_updated_camera_transform(delta_time)
        {
            self.render_system.set_user_camera_transform(transform);
        }

        let gui_frame = self
            .gui
            .run(&self.window, &mut self.settings, &mut self.scene);

        for id in self.render_system.sync_scene(&self.scene) {
            if let Some(model) = self.scene.remove_model(id) {
                log::warn!("Removed model {} from the scene, it cannot be drawn", model.name);
            }
        }

        self.render_system
            .render(&self.scene, &self.settings, Some(&gui_frame))?;

        Ok(())
    }

    fn cursor_ray(&self) -> Option<Ray> {
        let view_dimensions = self.render_system.view_dimensions();

        Ray::from_viewport(
            self.cursor_position?,
            (view_dimensions.width, view_dimensions.height),
            self.render_system.view_projection_matrix(),
        )
    }
}
