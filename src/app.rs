use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::args::Args;
use crate::view::ViewSystem;

pub struct App {
    event_loop_proxy: EventLoopProxy<UserEvent>,
    args: Args,
    view_system: Option<ViewSystem>,
    last_render_time: std::time::Instant,
}

impl App {
    pub fn new(event_loop: &EventLoop<UserEvent>, args: Args) -> Self {
        App {
            event_loop_proxy: event_loop.create_proxy(),
            args,
            view_system: None,
            last_render_time: Instant::now(),
        }
    }

    pub fn create_event_loop() -> Result<EventLoop<UserEvent>, EventLoopError> {
        EventLoop::<UserEvent>::with_user_event().build()
    }

    fn create_window(event_loop: &ActiveEventLoop) -> Result<Window, winit::error::OsError> {
        event_loop.create_window(
            Window::default_attributes()
                .with_title("envmap_viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0)),
        )
    }

    async fn initialize_view_system(
        event_loop_proxy: EventLoopProxy<UserEvent>,
        window: Window,
        args: Args,
    ) {
        let event = match ViewSystem::from_window(window, &args).await {
            Ok(view_system) => UserEvent::ViewSystemReady(view_system),
            Err(error) => UserEvent::ViewSystemFailed(error),
        };

        if event_loop_proxy.send_event(event).is_err() {
            log::error!("The event loop closed before the view system was ready");
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Application resumed");

        if self.view_system.is_some() {
            return;
        }

        let window = match App::create_window(event_loop) {
            Ok(window) => window,
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };

        let event_loop_proxy = self.event_loop_proxy.clone();
        let args = self.args.clone();
        pollster::block_on(App::initialize_view_system(event_loop_proxy, window, args));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let view_system = match &mut self.view_system {
            Some(view_system) => view_system,
            None => return,
        };

        if view_system.window.id() != window_id {
            return;
        }

        let consumed_by_gui = view_system.handle_gui_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } if !consumed_by_gui => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                view_system.render_system.set_view_dimensions(new_size)
            }
            WindowEvent::RedrawRequested => {
                let now = std::time::Instant::now();
                let delta_time = now - self.last_render_time;

                if let Err(error) = view_system.update_view(delta_time) {
                    match error.downcast_ref::<wgpu::SurfaceError>() {
                        Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            view_system.render_system.sync_view_dimensions()
                        }
                        Some(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("OutOfMemory");
                            event_loop.exit();
                        }
                        Some(wgpu::SurfaceError::Timeout) => {
                            log::warn!("Surface timeout");
                        }
                        None => log::error!("Failed to render frame: {error}"),
                    }
                }

                self.last_render_time = now;
                view_system.window.request_redraw();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                // Releases always reach the scene so a drag never gets stuck under a GUI window.
                if !consumed_by_gui || state == ElementState::Released {
                    view_system.handle_mouse_input(button, state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                view_system.handle_cursor_moved(position);
            }
            WindowEvent::CursorLeft { .. } => view_system.handle_cursor_left(),
            WindowEvent::MouseWheel { delta, .. } if !consumed_by_gui => {
                view_system.camera_controller.handle_mouse_wheel(delta);
            }
            WindowEvent::DroppedFile(path) => view_system.handle_dropped_file(&path),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let view_system = match &mut self.view_system {
            Some(view_system) => view_system,
            None => return,
        };

        if let DeviceEvent::MouseMotion { delta } = event {
            view_system
                .camera_controller
                .handle_mouse_movement(delta.0 as f32, delta.1 as f32);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::ViewSystemReady(view_system) => {
                log::info!("View system created");

                view_system.window.request_redraw();
                self.view_system = Some(view_system);
                self.last_render_time = std::time::Instant::now();
            }
            UserEvent::ViewSystemFailed(error) => {
                log::error!("Failed to create the view system: {error:#}");
                event_loop.exit();
            }
        }
    }
}

pub enum UserEvent {
    ViewSystemReady(ViewSystem),
    ViewSystemFailed(anyhow::Error),
}
