use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use cgmath::InnerSpace;

use crate::data::ray::Ray;
use crate::data::transform::Transform;
use crate::resource::mesh::{load_mesh_from_path, MeshData};
use crate::scene::model::{ModelId, ModelKind, SceneModel};
use crate::scene::settings::ViewerSettings;

pub mod description;
pub mod model;
pub mod settings;

/// Model being moved with the mouse: it slides in the plane through the grab point facing the
/// camera, keeping the grab point under the cursor.
#[derive(Copy, Clone, Debug)]
struct DragState {
    model: ModelId,
    plane_point: cgmath::Point3<f32>,
    plane_normal: cgmath::Vector3<f32>,
    grab_offset: cgmath::Vector3<f32>,
}

/// Models drawn into the faces of `target`'s cubemap: everything drawn in the frame except the
/// target, which never reflects itself.
pub fn face_pass_models(
    target: ModelId,
    drawn: &[ModelId],
) -> impl Iterator<Item = ModelId> + '_ {
    drawn.iter().copied().filter(move |id| *id != target)
}

#[derive(Default)]
pub struct Scene {
    models: Vec<SceneModel>,
    selection: Option<ModelId>,
    drag: Option<DragState>,
    next_id: u64,
}

impl Scene {
    pub fn add_model(
        &mut self,
        name: String,
        kind: ModelKind,
        mesh: Rc<MeshData>,
        transform: Transform,
    ) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;

        log::info!(
            "Adding model {name} [{}] with {} triangles",
            id.0,
            mesh.triangle_count()
        );

        self.models.push(SceneModel {
            id,
            name,
            kind,
            mesh,
            transform,
        });

        id
    }

    /// Loads a model file and places it at the origin with identity orientation and unit scale.
    pub fn add_model_file(&mut self, path: &Path) -> Result<ModelId> {
        let mesh = load_mesh_from_path(path)?;
        let name = mesh.name.clone();

        Ok(self.add_model(
            name,
            ModelKind::File(path.to_path_buf()),
            Rc::new(mesh),
            Transform::default(),
        ))
    }

    pub fn remove_model(&mut self, id: ModelId) -> Option<SceneModel> {
        let index = self.models.iter().position(|model| model.id == id)?;

        if self.selection == Some(id) {
            self.selection = None;
        }
        if self.drag.map(|drag| drag.model) == Some(id) {
            self.drag = None;
        }

        Some(self.models.remove(index))
    }

    pub fn models(&self) -> &[SceneModel] {
        &self.models
    }

    pub fn model(&self, id: ModelId) -> Option<&SceneModel> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut SceneModel> {
        self.models.iter_mut().find(|model| model.id == id)
    }

    pub fn is_visible(model: &SceneModel, settings: &ViewerSettings) -> bool {
        model.kind != ModelKind::ReferenceSphere || settings.show_reference_sphere
    }

    pub fn visible_models<'a>(
        &'a self,
        settings: &'a ViewerSettings,
    ) -> impl Iterator<Item = &'a SceneModel> + 'a {
        self.models
            .iter()
            .filter(move |model| Scene::is_visible(model, settings))
    }

    /// Models whose cubemaps are re-rendered this frame: every visible model while dynamic
    /// reflections are in use, none otherwise.
    pub fn reflection_targets<'a>(
        &'a self,
        settings: &'a ViewerSettings,
    ) -> impl Iterator<Item = &'a SceneModel> + 'a {
        let refresh = settings.uses_dynamic_cubemaps();
        self.visible_models(settings).filter(move |_| refresh)
    }

    pub fn selection(&self) -> Option<ModelId> {
        self.selection
    }

    pub fn select(&mut self, id: Option<ModelId>) {
        self.selection = id.filter(|id| self.model(*id).is_some());
    }

    /// Nearest visible model along the ray, with the hit distance. Overlapping models resolve to
    /// the one in front, not the one added first.
    pub fn cast_ray(&self, ray: &Ray, settings: &ViewerSettings) -> Option<(ModelId, f32)> {
        self.visible_models(settings)
            .filter_map(|model| model.hit_by_ray(ray).map(|distance| (model.id, distance)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Selects whatever the ray hits first; a miss clears the selection.
    pub fn pick(&mut self, ray: &Ray, settings: &ViewerSettings) -> Option<ModelId> {
        let hit = self.cast_ray(ray, settings).map(|(id, _)| id);
        self.selection = hit;

        match hit {
            Some(id) => log::debug!("Picked model [{}]", id.0),
            None => log::debug!("Pick missed, selection cleared"),
        }

        hit
    }

    /// Picks with the ray and, on a hit, starts dragging the model in the plane facing
    /// `view_direction` through the hit point.
    pub fn begin_drag(
        &mut self,
        ray: &Ray,
        view_direction: cgmath::Vector3<f32>,
        settings: &ViewerSettings,
    ) -> Option<ModelId> {
        self.drag = None;

        let id = self.pick(ray, settings)?;
        let model = self.model(id)?;
        let hit_point = ray.at(model.hit_by_ray(ray)?);
        let position = model.position();

        self.drag = Some(DragState {
            model: id,
            plane_point: hit_point,
            plane_normal: view_direction.normalize(),
            grab_offset: position - hit_point,
        });

        Some(id)
    }

    /// Moves the dragged model so the grab point follows the ray. Returns whether it moved.
    pub fn drag_to(&mut self, ray: &Ray) -> bool {
        let drag = match self.drag {
            Some(drag) => drag,
            None => return false,
        };

        let distance = match ray.intersect_plane(drag.plane_point, drag.plane_normal) {
            Some(distance) => distance,
            None => return false,
        };

        let target = ray.at(distance) + drag.grab_offset;

        match self.model_mut(drag.model) {
            Some(model) => {
                model.transform.translation = cgmath::Vector3::new(target.x, target.y, target.z);
                true
            }
            None => {
                self.drag = None;
                false
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
