use anyhow::Result;

use crate::error::Error;
use crate::render::camera::projection::PerspectiveCameraProjection;
use crate::render::camera::user::UserCamera;
use crate::render::camera::Camera;
use crate::render::cubemap::CubeMap;
use crate::render::shader::SHADER_TEMPLATE_GLOB;
use crate::render::skybox::SkyboxRenderer;
use crate::render::texture::DepthTexture2DPackage;
use crate::render::view::ViewEnvironment;
use crate::resource::cubemap::gradient::GradientCubeMapLoader;

pub struct RenderSystemState {
    #[allow(dead_code)]
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub device: std::rc::Rc<wgpu::Device>,
    pub queue: std::rc::Rc<wgpu::Queue>,
    pub view_environment_bind_group_layout: std::rc::Rc<wgpu::BindGroupLayout>,
    pub instance_bind_group_layout: wgpu::BindGroupLayout,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
    pub environment_map_bind_group_layout: wgpu::BindGroupLayout,
    pub depth_texture: DepthTexture2DPackage,
    pub tera: tera::Tera,
    pub skybox_renderer: SkyboxRenderer,
    pub static_cubemap: CubeMap,
    pub view_environment: ViewEnvironment,
    pub view_dimensions: winit::dpi::PhysicalSize<u32>,
    pub cubemap_resolution: u32,
}

impl RenderSystemState {
    pub async fn from_window(
        window: std::sync::Arc<winit::window::Window>,
        cubemap_resolution: u32,
    ) -> Result<Self> {
        let view_dimensions = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Some(adapter) => adapter,
            None => return Err(Error::new(String::from("Failed to retrieve adapter.")).into()),
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                    ..Default::default()
                },
                None,
            )
            .await?;

        let device = std::rc::Rc::new(device);
        let queue = std::rc::Rc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = match surface_caps.formats.iter().find(|f| f.is_srgb()) {
            Some(format) => *format,
            None => match surface_caps.formats.first() {
                Some(format) => *format,
                None => {
                    return Err(Error::new(String::from(
                        "The surface does not support any texture format.",
                    ))
                    .into())
                }
            },
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: view_dimensions.width.max(1),
            height: view_dimensions.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        let view_environment_bind_group_layout = std::rc::Rc::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("VIEW_ENVIRONMENT_BIND_GROUP_LAYOUT"),
                entries: &[
                    // Camera Uniform
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Environment Uniform
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            },
        ));

        let instance_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("INSTANCE_BIND_GROUP_LAYOUT"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("MATERIAL_BIND_GROUP_LAYOUT"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let environment_map_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ENVIRONMENT_MAP_BIND_GROUP_LAYOUT"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let depth_texture = DepthTexture2DPackage::from_device(
            &device,
            "DEPTH_TEXTURE",
            view_dimensions.width,
            view_dimensions.height,
        );

        let tera = tera::Tera::new(SHADER_TEMPLATE_GLOB)?;

        let skybox_renderer = SkyboxRenderer::from_device(
            &device,
            &queue,
            surface_format,
            &view_environment_bind_group_layout,
            &environment_map_bind_group_layout,
            &tera,
        )?;

        let static_cubemap = CubeMap::from_loader(
            &GradientCubeMapLoader::default(),
            "STATIC_CUBEMAP",
            &device,
            &queue,
            &environment_map_bind_group_layout,
        )?;

        let user_camera = UserCamera {
            camera: Camera {
                projection: PerspectiveCameraProjection {
                    aspect_ratio: None,
                    fovy: cgmath::Deg(45.0).into(),
                    znear: 0.1,
                    zfar: 1000.0,
                },
            },
            transform: Default::default(),
        };

        let view_environment = ViewEnvironment::from_device(
            device.clone(),
            queue.clone(),
            surface_config.width as f32 / surface_config.height as f32,
            user_camera,
            view_environment_bind_group_layout.clone(),
        );

        Ok(Self {
            instance,
            surface,
            surface_config,
            adapter,
            device,
            queue,
            view_environment_bind_group_layout,
            instance_bind_group_layout,
            material_bind_group_layout,
            environment_map_bind_group_layout,
            depth_texture,
            tera,
            skybox_renderer,
            static_cubemap,
            view_environment,
            view_dimensions,
            cubemap_resolution,
        })
    }

    pub fn set_view_dimensions(&mut self, view_dimensions: winit::dpi::PhysicalSize<u32>) {
        self.view_dimensions = view_dimensions;
        self.surface_config.width = view_dimensions.width;
        self.surface_config.height = view_dimensions.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture = DepthTexture2DPackage::from_device(
            &self.device,
            "DEPTH_TEXTURE",
            view_dimensions.width,
            view_dimensions.height,
        );
        self.view_environment
            .set_aspect_ratio(view_dimensions.width as f32 / view_dimensions.height as f32);
    }
}
