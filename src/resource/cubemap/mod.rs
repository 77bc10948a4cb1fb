use anyhow::Result;

use crate::data::cubemap::CubeMapFace;

pub mod faces;
pub mod gradient;

/// Source of RGBA8 face images for a cubemap, rows top to bottom.
pub trait CubeMapLoader {
    fn face_dimensions(&self) -> (u32, u32);
    fn load_face(&self, face: CubeMapFace) -> Result<&[u8]>;
}
