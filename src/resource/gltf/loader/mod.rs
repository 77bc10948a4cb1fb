use anyhow::Result;

pub mod file;

pub trait GltfLoader {
    /// Tightly packed element data of an accessor, with any buffer view stride removed.
    fn load_accessor_data(&mut self, accessor_id: usize) -> Result<Vec<u8>>;

    fn load_image(&mut self, image_id: usize) -> Result<image::RgbaImage>;
}
