//! JSON scene description: skybox, initial models, camera and viewer settings.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::transform::{rotation_from_euler_degrees, Transform};
use crate::resource::cubemap::faces::face_paths_in_directory;
use crate::resource::mesh::load_mesh_from_path;
use crate::resource::shape;
use crate::scene::model::ModelKind;
use crate::scene::settings::ViewerSettings;
use crate::scene::Scene;

const REFERENCE_SPHERE_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
const BOX_COLOR: [f32; 4] = [0.8, 0.35, 0.2, 1.0];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub skybox: Option<SkyboxDescription>,
    pub models: Vec<ModelDescription>,
    pub camera: CameraDescription,
    pub settings: ViewerSettings,
}

/// Either a directory holding `right`, `left`, `top`, `bottom`, `front` and `back` images or
/// the six face paths in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkyboxDescription {
    Directory(PathBuf),
    Faces([PathBuf; 6]),
}

impl SkyboxDescription {
    pub fn face_paths(&self) -> [PathBuf; 6] {
        match self {
            SkyboxDescription::Directory(directory) => face_paths_in_directory(directory),
            SkyboxDescription::Faces(faces) => faces.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSource {
    File {
        path: PathBuf,
    },
    ReferenceSphere {
        #[serde(default = "default_radius")]
        radius: f32,
        #[serde(default)]
        color: Option<[f32; 4]>,
    },
    Box {
        #[serde(default = "default_half_extents")]
        half_extents: [f32; 3],
        #[serde(default)]
        color: Option<[f32; 4]>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    #[serde(flatten)]
    pub source: ModelSource,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees about X, Y and Z, as shown by the transform editor.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

impl ModelDescription {
    pub fn transform(&self) -> Transform {
        Transform::new(
            self.position.into(),
            rotation_from_euler_degrees(self.rotation),
            self.scale.into(),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub target: [f32; 3],
    pub distance: f32,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            target: [0.0, 0.5, 0.0],
            distance: 9.0,
            yaw_degrees: 25.0,
            pitch_degrees: 15.0,
        }
    }
}

fn default_radius() -> f32 {
    1.0
}

fn default_half_extents() -> [f32; 3] {
    [0.5, 0.5, 0.5]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl SceneDescription {
    /// Reads a description; relative paths inside it are resolved against its directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        log::debug!("Loading scene description: {}", path.display());

        let file = std::fs::File::open(path)?;
        let description: SceneDescription = serde_json::from_reader(std::io::BufReader::new(file))?;

        let base_directory = path.parent().unwrap_or(Path::new("."));
        Ok(description.resolve_paths(base_directory))
    }

    pub fn resolve_paths(mut self, base_directory: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_directory.join(&*path);
            }
        };

        match &mut self.skybox {
            Some(SkyboxDescription::Directory(directory)) => resolve(directory),
            Some(SkyboxDescription::Faces(faces)) => faces.iter_mut().for_each(resolve),
            None => {}
        }

        for model in &mut self.models {
            if let ModelSource::File { path } = &mut model.source {
                resolve(path);
            }
        }

        self
    }

    /// Scene used when no description is given: a reference sphere and a few boxes to reflect.
    pub fn builtin() -> Self {
        let sphere = ModelDescription {
            source: ModelSource::ReferenceSphere {
                radius: 1.0,
                color: None,
            },
            name: Some(String::from("Reference sphere")),
            position: [-2.0, 1.0, 1.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [2.0, 2.0, 2.0],
        };

        let boxes = [
            ([2.0, 0.5, 0.0], [0.0, 30.0, 0.0], [0.8, 0.35, 0.2, 1.0]),
            ([0.5, 0.5, -3.0], [0.0, -15.0, 0.0], [0.2, 0.6, 0.3, 1.0]),
            ([1.5, 2.0, 2.5], [20.0, 45.0, 10.0], [0.25, 0.35, 0.85, 1.0]),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (position, rotation, color))| ModelDescription {
            source: ModelSource::Box {
                half_extents: [0.5, 0.5, 0.5],
                color: Some(color),
            },
            name: Some(format!("Box {}", index + 1)),
            position,
            rotation,
            scale: [1.0, 1.0, 1.0],
        });

        Self {
            skybox: None,
            models: std::iter::once(sphere).chain(boxes).collect(),
            camera: CameraDescription::default(),
            settings: ViewerSettings::default(),
        }
    }

    /// Instantiates the described models. Models that fail to load are logged and skipped.
    pub fn populate(&self, scene: &mut Scene) {
        for model in &self.models {
            let loaded = match &model.source {
                ModelSource::File { path } => load_mesh_from_path(path)
                    .map(|mesh| (mesh, ModelKind::File(path.clone()))),
                ModelSource::ReferenceSphere { radius, color } => shape::sphere(
                    "REFERENCE_SPHERE",
                    *radius,
                    48,
                    24,
                    color.unwrap_or(REFERENCE_SPHERE_COLOR),
                )
                .map(|mesh| (mesh, ModelKind::ReferenceSphere)),
                ModelSource::Box {
                    half_extents,
                    color,
                } => shape::cuboid("BOX", *half_extents, color.unwrap_or(BOX_COLOR))
                    .map(|mesh| (mesh, ModelKind::Box)),
            };

            match loaded {
                Ok((mesh, kind)) => {
                    let name = model.name.clone().unwrap_or_else(|| mesh.name.clone());
                    scene.add_model(name, kind, Rc::new(mesh), model.transform());
                }
                Err(err) => log::warn!("Skipping model {:?}: {err}", model.source),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Rotation};

    use super::*;
    use crate::scene::settings::CubeMapType;

    const DESCRIPTION: &str = r#"{
        "skybox": "envmap",
        "models": [
            { "type": "file", "path": "models/teapot.obj", "position": [1.0, 0.0, 0.0] },
            { "type": "reference_sphere", "radius": 0.5, "scale": [2.0, 2.0, 2.0] },
            { "type": "box", "rotation": [0.0, 90.0, 0.0] }
        ],
        "camera": { "distance": 4.0 },
        "settings": { "cubemap_type": "static" }
    }"#;

    #[test]
    fn parses_models_camera_and_settings() {
        let description: SceneDescription = serde_json::from_str(DESCRIPTION).unwrap();

        assert_eq!(description.models.len(), 3);
        assert_eq!(
            description.models[1].source,
            ModelSource::ReferenceSphere {
                radius: 0.5,
                color: None
            }
        );
        assert_eq!(description.models[2].scale, [1.0, 1.0, 1.0]);
        assert_eq!(description.camera.distance, 4.0);
        assert_eq!(description.camera.target, CameraDescription::default().target);
        assert_eq!(description.settings.cubemap_type, CubeMapType::Static);
        assert!(description.settings.show_reference_sphere);
    }

    #[test]
    fn relative_paths_resolve_against_description_directory() {
        let description: SceneDescription = serde_json::from_str(DESCRIPTION).unwrap();
        let description = description.resolve_paths(Path::new("/scenes"));

        assert_eq!(
            description.skybox,
            Some(SkyboxDescription::Directory(PathBuf::from("/scenes/envmap")))
        );
        assert_eq!(
            description.models[0].source,
            ModelSource::File {
                path: PathBuf::from("/scenes/models/teapot.obj")
            }
        );
    }

    #[test]
    fn skybox_accepts_explicit_face_list() {
        let description: SceneDescription = serde_json::from_str(
            r#"{ "skybox": ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"] }"#,
        )
        .unwrap();

        match description.skybox {
            Some(SkyboxDescription::Faces(faces)) => {
                assert_eq!(faces[2], PathBuf::from("py.png"))
            }
            other => panic!("unexpected skybox: {other:?}"),
        }
    }

    #[test]
    fn rotation_is_applied_in_degrees() {
        let description: SceneDescription = serde_json::from_str(DESCRIPTION).unwrap();
        let transform = description.models[2].transform();

        let rotated = transform
            .rotation
            .rotate_vector(cgmath::Vector3::new(1.0, 0.0, 0.0));
        assert!((rotated - cgmath::Vector3::new(0.0, 0.0, -1.0)).magnitude2() < 1e-6);
    }

    #[test]
    fn builtin_scene_populates_sphere_and_boxes() {
        let mut scene = Scene::default();
        SceneDescription::builtin().populate(&mut scene);

        assert_eq!(scene.models().len(), 4);
        assert_eq!(scene.models()[0].kind, ModelKind::ReferenceSphere);
        assert_eq!(
            scene.models()[0].transform.translation,
            cgmath::Vector3::new(-2.0, 1.0, 1.0)
        );
        assert!(scene.models()[1..]
            .iter()
            .all(|model| model.kind == ModelKind::Box));
    }

    #[test]
    fn unloadable_models_are_skipped() {
        let description: SceneDescription = serde_json::from_str(
            r#"{ "models": [ { "type": "file", "path": "/missing/model.obj" }, { "type": "box" } ] }"#,
        )
        .unwrap();

        let mut scene = Scene::default();
        description.populate(&mut scene);

        assert_eq!(scene.models().len(), 1);
        assert_eq!(scene.models()[0].kind, ModelKind::Box);
    }

    #[test]
    fn demo_scene_description_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/demo_scene.json");
        let description = SceneDescription::from_path(&path).unwrap();

        assert_eq!(description.skybox, None);
        assert_eq!(description.models.len(), 4);
        assert_eq!(description.models[3].source, ModelSource::Box {
            half_extents: [6.0, 0.05, 6.0],
            color: Some([0.6, 0.6, 0.6, 1.0]),
        });
        assert_eq!(description.camera.distance, 10.0);
    }
}
