use anyhow::Result;

use crate::error::Error;

pub mod file;

pub trait GltfAsset {
    fn gltf(&self) -> &gltf::Gltf;

    fn get_scene(&self, scene_id: usize) -> Result<gltf::Scene> {
        match self.gltf().scenes().nth(scene_id) {
            Some(scene) => Ok(scene),
            None => {
                Err(Error::new(format!("No scene exists with the given ID: {scene_id}")).into())
            }
        }
    }

    /// The scene flagged as default, or the first scene of files that don't flag one.
    fn default_scene(&self) -> Result<gltf::Scene> {
        match self.gltf().default_scene() {
            Some(scene) => Ok(scene),
            None => self.get_scene(0),
        }
    }
}
