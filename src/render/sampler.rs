pub struct Sampler {
    pub gpu_sampler: wgpu::Sampler,
}

impl Sampler {
    pub fn from_device(
        device: &wgpu::Device,
        label: &str,
        address_mode: wgpu::AddressMode,
        filter: wgpu::FilterMode,
    ) -> Self {
        Self {
            gpu_sampler: device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: address_mode,
                address_mode_v: address_mode,
                address_mode_w: address_mode,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: filter,
                ..Default::default()
            }),
        }
    }
}
