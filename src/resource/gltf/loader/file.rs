use std::collections::HashMap;

use anyhow::Result;

use crate::error::Error;
use crate::resource::gltf::asset::file::FileSystemGltfAsset;
use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::GltfLoader;

pub struct FileSystemGltfLoader<'a> {
    asset: &'a FileSystemGltfAsset,
    buffer_registry: HashMap<usize, Vec<u8>>,
    image_registry: HashMap<String, Vec<u8>>,
}

impl<'a> FileSystemGltfLoader<'a> {
    pub fn new(asset: &'a FileSystemGltfAsset) -> Self {
        Self {
            asset,
            buffer_registry: HashMap::new(),
            image_registry: HashMap::new(),
        }
    }

    fn get_accessor_read_info(&self, accessor_id: usize) -> Result<GltfAccessorReadInfo> {
        let accessor = match self.asset.gltf().accessors().nth(accessor_id) {
            Some(accessor) => accessor,
            None => {
                return Err(
                    Error::new(format!("The given accessor ID is invalid: {accessor_id}")).into(),
                )
            }
        };

        let view = match accessor.view() {
            Some(view) => view,
            None => {
                return Err(Error::new(format!(
                    "The specified accessor has no buffer view (sparse accessors are not supported): {accessor_id}"
                ))
                .into())
            }
        };

        let element_size = accessor.size();

        Ok(GltfAccessorReadInfo {
            buffer_id: view.buffer().index(),
            offset: view.offset() + accessor.offset(),
            count: accessor.count(),
            element_size,
            stride: view.stride().unwrap_or(element_size),
        })
    }

    fn load_buffer_data(&mut self, buffer_id: usize) -> Result<()> {
        if self.buffer_registry.contains_key(&buffer_id) {
            return Ok(());
        }

        let buffer = match self.asset.gltf().buffers().nth(buffer_id) {
            Some(buffer) => buffer,
            None => {
                return Err(Error::new(format!("The given buffer ID is invalid: {buffer_id}")).into())
            }
        };

        let data = match buffer.source() {
            gltf::buffer::Source::Bin => match self.asset.blob() {
                Some(blob) => blob.to_vec(),
                None => {
                    return Err(Error::new(String::from(
                        "The asset references a binary chunk but none was found.",
                    ))
                    .into())
                }
            },
            gltf::buffer::Source::Uri(uri) => self.read_uri(uri)?,
        };

        if data.len() < buffer.length() {
            return Err(Error::new(format!(
                "Buffer {buffer_id} is shorter than declared: {} < {}",
                data.len(),
                buffer.length()
            ))
            .into());
        }

        log::debug!("Loaded glTF buffer {buffer_id} ({} bytes)", data.len());
        self.buffer_registry.insert(buffer_id, data);

        Ok(())
    }

    fn read_buffer_data(&self, buffer_id: usize, offset: usize, length: usize) -> Result<&[u8]> {
        let data = match self.buffer_registry.get(&buffer_id) {
            Some(data) => data,
            None => {
                return Err(Error::new(format!(
                    "The given buffer ID is not associated with a loaded buffer: {buffer_id}"
                ))
                .into())
            }
        };

        match data.get(offset..offset + length) {
            Some(slice) => Ok(slice),
            None => Err(Error::new(format!(
                "Read of {length} bytes at offset {offset} exceeds buffer {buffer_id}"
            ))
            .into()),
        }
    }

    fn read_uri(&self, uri: &str) -> Result<Vec<u8>> {
        if uri.starts_with("data:") {
            return Err(Error::new(String::from(
                "Loading data URIs is not supported.",
            ))
            .into());
        }

        Ok(std::fs::read(self.asset.root.join(uri))?)
    }

    fn load_image_data(&mut self, uri: &str) -> Result<()> {
        if self.image_registry.contains_key(uri) {
            return Ok(());
        }

        let data = self.read_uri(uri)?;
        self.image_registry.insert(uri.to_string(), data);

        Ok(())
    }
}

impl<'a> GltfLoader for FileSystemGltfLoader<'a> {
    fn load_accessor_data(&mut self, accessor_id: usize) -> Result<Vec<u8>> {
        let read_info = self.get_accessor_read_info(accessor_id)?;
        self.load_buffer_data(read_info.buffer_id)?;

        if read_info.count == 0 {
            return Ok(vec![]);
        }

        let span = read_info.stride * (read_info.count - 1) + read_info.element_size;
        let data = self.read_buffer_data(read_info.buffer_id, read_info.offset, span)?;

        if read_info.stride == read_info.element_size {
            return Ok(data.to_vec());
        }

        let mut packed = Vec::with_capacity(read_info.count * read_info.element_size);
        for element in 0..read_info.count {
            let begin = element * read_info.stride;
            packed.extend_from_slice(&data[begin..begin + read_info.element_size]);
        }

        Ok(packed)
    }

    fn load_image(&mut self, image_id: usize) -> Result<image::RgbaImage> {
        let image = match self.asset.gltf().images().nth(image_id) {
            Some(image) => image,
            None => {
                return Err(Error::new(format!("The given image ID is invalid: {image_id}")).into())
            }
        };

        let (data, mime_type) = match image.source() {
            gltf::image::Source::Uri { uri, mime_type } => {
                self.load_image_data(uri)?;
                (&self.image_registry[uri][..], mime_type)
            }
            gltf::image::Source::View { view, mime_type } => {
                let index = view.buffer().index();
                self.load_buffer_data(index)?;
                (
                    self.read_buffer_data(index, view.offset(), view.length())?,
                    Some(mime_type),
                )
            }
        };

        let image_format = match mime_type {
            Some(mime_type) => match image::ImageFormat::from_mime_type(mime_type) {
                Some(image_format) => Some(image_format),
                None => {
                    return Err(Error::new(format!(
                        "The given MIME type is not supported: {mime_type}"
                    ))
                    .into())
                }
            },
            None => None,
        };

        let loaded_image = match image_format {
            Some(image_format) => image::load_from_memory_with_format(data, image_format)?,
            None => image::load_from_memory(data)?,
        };

        Ok(loaded_image.to_rgba8())
    }
}

struct GltfAccessorReadInfo {
    buffer_id: usize,
    offset: usize,
    count: usize,
    element_size: usize,
    stride: usize,
}
