use std::path::PathBuf;

pub const DEFAULT_CUBEMAP_RESOLUTION: u32 = 256;

#[derive(Clone, Debug)]
pub struct Args {
    /// Model files added to the scene at the origin.
    pub models: Vec<PathBuf>,
    /// JSON scene description; the built-in scene is used without one.
    pub scene: Option<PathBuf>,
    /// Directory holding the six skybox face images. Overrides the scene's skybox.
    pub skybox: Option<PathBuf>,
    pub cubemap_resolution: u32,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            models: vec![],
            scene: None,
            skybox: None,
            cubemap_resolution: DEFAULT_CUBEMAP_RESOLUTION,
        }
    }
}
