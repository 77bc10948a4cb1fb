use crate::data::transform::{euler_degrees, rotation_from_euler_degrees, Transform};
use crate::render::gui::GuiFrame;
use crate::scene::settings::{CubeMapType, EnvironmentMappingType, ViewerSettings};
use crate::scene::Scene;

pub struct Gui {
    state: egui_winit::State,
}

impl Gui {
    pub fn new(window: &winit::window::Window) -> Self {
        let context = egui::Context::default();
        let viewport_id = context.viewport_id();

        let state = egui_winit::State::new(
            context,
            viewport_id,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Self { state }
    }

    /// Feeds a window event to the GUI. Returns true when the GUI consumed it.
    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn run(
        &mut self,
        window: &winit::window::Window,
        settings: &mut ViewerSettings,
        scene: &mut Scene,
    ) -> GuiFrame {
        let input = self.state.take_egui_input(window);

        let output = self.state.egui_ctx().run(input, |context| {
            settings_window(context, settings);
            selection_window(context, scene);
        });

        self.state
            .handle_platform_output(window, output.platform_output);

        let paint_jobs = self
            .state
            .egui_ctx()
            .tessellate(output.shapes, output.pixels_per_point);

        let size = window.inner_size();

        GuiFrame {
            paint_jobs,
            textures_delta: output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: output.pixels_per_point,
            },
        }
    }
}

fn settings_window(context: &egui::Context, settings: &mut ViewerSettings) {
    egui::Window::new("Settings")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(context, |ui| {
            ui.checkbox(&mut settings.show_materials, "Show materials");
            ui.horizontal(|ui| {
                ui.color_edit_button_rgba_unmultiplied(&mut settings.renderer_color);
                ui.label("Renderer color");
            });
            ui.checkbox(&mut settings.show_reference_sphere, "Show reference sphere");
            ui.checkbox(
                &mut settings.enable_environment_mapping,
                "Enable environment mapping",
            );

            ui.add_enabled_ui(settings.enable_environment_mapping, |ui| {
                ui.separator();
                ui.label("Cubemap type");
                ui.horizontal(|ui| {
                    for cubemap_type in CubeMapType::ALL {
                        ui.radio_value(
                            &mut settings.cubemap_type,
                            cubemap_type,
                            cubemap_type.label(),
                        );
                    }
                });

                ui.label("Mapping type");
                ui.horizontal(|ui| {
                    for mapping_type in EnvironmentMappingType::ALL {
                        ui.radio_value(
                            &mut settings.mapping_type,
                            mapping_type,
                            mapping_type.label(),
                        );
                    }
                });
            });
        });
}

/// Transform editor for the selected model.
fn selection_window(context: &egui::Context, scene: &mut Scene) {
    let id = match scene.selection() {
        Some(id) => id,
        None => return,
    };

    let mut remove = false;
    let mut deselect = false;

    if let Some(model) = scene.model_mut(id) {
        egui::Window::new("Selected model")
            .default_pos([12.0, 260.0])
            .resizable(false)
            .show(context, |ui| {
                ui.label(&model.name);

                let mut values = GizmoValues::from_transform(&model.transform);
                let mut changed = false;

                egui::Grid::new("SELECTED_MODEL_TRANSFORM").show(ui, |ui| {
                    changed |= vector_row(ui, "Position", &mut values.position, 0.05, None);
                    changed |= vector_row(
                        ui,
                        "Rotation",
                        &mut values.rotation_degrees,
                        1.0,
                        Some(-180.0..=180.0),
                    );
                    changed |= vector_row(
                        ui,
                        "Scale",
                        &mut values.scale,
                        0.01,
                        Some(GizmoValues::MIN_SCALE..=100.0),
                    );
                });

                if changed {
                    values.apply_to(&mut model.transform);
                }

                ui.horizontal(|ui| {
                    deselect = ui.button("Deselect").clicked();
                    remove = ui.button("Remove").clicked();
                });
            });
    }

    if remove {
        scene.remove_model(id);
    } else if deselect {
        scene.select(None);
    }
}

fn vector_row(
    ui: &mut egui::Ui,
    label: &str,
    values: &mut [f32; 3],
    speed: f64,
    range: Option<std::ops::RangeInclusive<f32>>,
) -> bool {
    ui.label(label);

    let mut changed = false;
    for value in values.iter_mut() {
        let mut drag_value = egui::DragValue::new(value).speed(speed).max_decimals(3);
        if let Some(range) = &range {
            drag_value = drag_value.range(range.clone());
        }
        changed |= ui.add(drag_value).changed();
    }
    ui.end_row();

    changed
}

/// Editable view of a transform, with the rotation as Euler angles in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GizmoValues {
    pub position: [f32; 3],
    pub rotation_degrees: [f32; 3],
    pub scale: [f32; 3],
}

impl GizmoValues {
    pub const MIN_SCALE: f32 = 0.01;

    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation.into(),
            rotation_degrees: euler_degrees(transform.rotation),
            scale: transform.scale.into(),
        }
    }

    pub fn apply_to(&self, transform: &mut Transform) {
        transform.translation = self.position.into();
        transform.rotation = rotation_from_euler_degrees(self.rotation_degrees);
        transform.scale = self.scale.map(|value| value.max(GizmoValues::MIN_SCALE)).into();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;
    use crate::scene::description::{ModelDescription, ModelSource};

    #[test]
    fn gizmo_values_round_trip_a_transform() {
        let mut transform = Transform::default();
        let values = GizmoValues {
            position: [1.0, -2.0, 0.5],
            rotation_degrees: [10.0, 20.0, 30.0],
            scale: [2.0, 1.0, 0.5],
        };

        values.apply_to(&mut transform);
        let read_back = GizmoValues::from_transform(&transform);

        assert_eq!(read_back.position, values.position);
        assert_eq!(read_back.scale, values.scale);
        for (actual, expected) in read_back
            .rotation_degrees
            .iter()
            .zip(values.rotation_degrees.iter())
        {
            assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
        }
    }

    #[test]
    fn editor_shows_the_angles_of_a_scene_description() {
        let description = ModelDescription {
            source: ModelSource::Box {
                half_extents: [0.5, 0.5, 0.5],
                color: None,
            },
            name: None,
            position: [1.5, 2.0, 2.5],
            rotation: [20.0, 45.0, 10.0],
            scale: [1.0, 1.0, 1.0],
        };

        let values = GizmoValues::from_transform(&description.transform());

        for (actual, expected) in values.rotation_degrees.iter().zip(description.rotation.iter()) {
            assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
        }
    }

    #[test]
    fn identity_rotation_reads_as_zero_angles() {
        let values = GizmoValues::from_transform(&Transform::default());

        assert_eq!(values.scale, [1.0, 1.0, 1.0]);
        for angle in values.rotation_degrees {
            assert!(angle.abs() < 1e-4);
        }
    }

    #[test]
    fn scale_never_collapses_to_zero() {
        let mut transform = Transform::default();
        GizmoValues {
            position: [0.0; 3],
            rotation_degrees: [0.0; 3],
            scale: [0.0, -1.0, 3.0],
        }
        .apply_to(&mut transform);

        assert_eq!(transform.scale.x, GizmoValues::MIN_SCALE);
        assert_eq!(transform.scale.y, GizmoValues::MIN_SCALE);
        assert_eq!(transform.scale.z, 3.0);
        assert!((transform.rotation.magnitude() - 1.0).abs() < 1e-6);
    }
}
