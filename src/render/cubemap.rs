use anyhow::Result;

use crate::data::cubemap::CubeMapFace;
use crate::error::Error;
use crate::resource::cubemap::CubeMapLoader;

/// Cube texture with the sampler and bind group models and the skybox use to sample it.
pub struct CubeMap {
    #[allow(dead_code)]
    pub gpu_texture: wgpu::Texture,
    pub gpu_texture_view: wgpu::TextureView,
    pub gpu_sampler: wgpu::Sampler,
    pub gpu_bind_group: wgpu::BindGroup,
}

impl CubeMap {
    pub fn from_texture(
        gpu_texture: wgpu::Texture,
        name: &str,
        device: &wgpu::Device,
        environment_map_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self> {
        if gpu_texture.dimension() != wgpu::TextureDimension::D2 {
            return Err(Error::new(format!(
                "The given texture does not have the required dimension (required=D2): {:?}",
                gpu_texture.dimension(),
            ))
            .into());
        }

        if gpu_texture.depth_or_array_layers() != 6 {
            return Err(
                Error::new(
                    format!(
                        "The given texture does not have the required number of depth/array layers (required=6): {}",
                        gpu_texture.depth_or_array_layers(),
                    )
                ).into()
            );
        }

        let gpu_texture_view = gpu_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{name}_TEXTURE_VIEW")),
            format: Some(gpu_texture.format()),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            mip_level_count: Some(gpu_texture.mip_level_count()),
            base_array_layer: 0,
            array_layer_count: Some(6),
        });

        let gpu_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{name}_SAMPLER")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let gpu_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}_BIND_GROUP")),
            layout: environment_map_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu_texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&gpu_sampler),
                },
            ],
        });

        Ok(Self {
            gpu_texture,
            gpu_texture_view,
            gpu_sampler,
            gpu_bind_group,
        })
    }

    pub fn from_loader(
        loader: &impl CubeMapLoader,
        name: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        environment_map_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self> {
        let (width, height) = loader.face_dimensions();
        if width != height || width == 0 {
            return Err(Error::new(format!(
                "Cubemap faces must be square and non-empty, found {width}x{height}"
            ))
            .into());
        }

        let max_dimension = device.limits().max_texture_dimension_2d;
        if width > max_dimension {
            return Err(Error::new(format!(
                "Cubemap faces of {width}x{height} exceed the device limit of {max_dimension}"
            ))
            .into());
        }

        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{name}_TEXTURE")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for face in CubeMapFace::ALL {
            let data = loader.load_face(face)?;
            let expected_length = (4 * width * height) as usize;

            if data.len() != expected_length {
                return Err(Error::new(format!(
                    "Cubemap face {} holds {} bytes, expected {expected_length}",
                    face.label(),
                    data.len()
                ))
                .into());
            }

            CubeMap::write_to_face(&gpu_texture, face.layer(), width, height, data, queue);
        }

        queue.submit([]);

        log::debug!("Created cubemap {name} with {width}x{height} faces");

        CubeMap::from_texture(gpu_texture, name, device, environment_map_bind_group_layout)
    }

    fn write_to_face(
        gpu_texture: &wgpu::Texture,
        face_index: u32,
        width: u32,
        height: u32,
        data: &[u8],
        queue: &wgpu::Queue,
    ) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: face_index,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}
