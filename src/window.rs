//! Window collaborator of the frame loop.
//!
//! [`Window`] is what [`crate::flow::Engine`] needs from a window: polling,
//! keyboard and cursor state, title, size and the projection matrix.
//! [`DesktopWindow`] implements it on winit. It does not hand control to
//! `EventLoop::run_app`. Instead every [`Window::update`] pumps the pending
//! events, which keeps the engine's own fixed-timestep loop in charge.

use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::Context as _;
use cgmath::{Deg, Matrix4, Vector2};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::WindowId,
};

use crate::{
    camera::Projection, config::EngineConfig, context::GpuContext, error::EngineError,
    input::CursorState,
};

pub trait Window {
    /// Open the window and bring up everything needed to draw into it.
    fn init(&mut self) -> anyhow::Result<()>;
    /// Present and poll: process every pending window event.
    fn update(&mut self);
    fn cleanup(&mut self);
    fn is_key_pressed(&self, key: KeyCode) -> bool;
    fn window_should_close(&self) -> bool;
    fn set_title(&mut self, title: &str);
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Projection for the current aspect ratio.
    fn update_projection_matrix(&mut self) -> Matrix4<f32>;
    fn is_resize(&self) -> bool;
    fn set_resize(&mut self, resize: bool);
    fn cursor(&self) -> CursorState;
}

/// Polls can only wait this long for the platform to deliver `resumed`.
const INIT_ATTEMPTS: u32 = 200;

#[derive(Default)]
struct WindowState {
    title: String,
    requested_size: (u32, u32),
    vsync: bool,
    window: Option<Arc<winit::window::Window>>,
    ctx: Option<GpuContext>,
    init_error: Option<anyhow::Error>,
    keys: HashSet<KeyCode>,
    cursor: CursorState,
    should_close: bool,
    resize: bool,
    size: (u32, u32),
}

impl WindowState {
    fn create(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.requested_size;
        let mut attributes = winit::window::Window::default_attributes().with_title(self.title.clone());
        attributes = if width == 0 || height == 0 {
            attributes.with_maximized(true)
        } else {
            attributes.with_inner_size(PhysicalSize::new(width, height))
        };
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| EngineError::Initialization(format!("failed to create the window: {e}")))?,
        );
        let ctx = futures::executor::block_on(GpuContext::new(window.clone(), self.vsync))
            .map_err(|e| EngineError::Initialization(format!("{e:#}")))?;
        let size = window.inner_size();
        self.size = (size.width, size.height);
        self.window = Some(window);
        self.ctx = Some(ctx);
        log::info!("Opened a {}x{} window", size.width, size.height);
        Ok(())
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if self.window.is_some() || self.init_error.is_some() {
            return;
        }
        if let Err(e) = self.create(event_loop) {
            self.init_error = Some(e);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => {
                self.size = (size.width, size.height);
                self.resize = true;
                if let Some(ctx) = &mut self.ctx {
                    ctx.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.keys.insert(code);
                        }
                        ElementState::Released => {
                            self.keys.remove(&code);
                            if code == KeyCode::Escape {
                                self.should_close = true;
                            }
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor.position = Vector2::new(position.x, position.y);
            }
            WindowEvent::CursorEntered { .. } => self.cursor.in_window = true,
            WindowEvent::CursorLeft { .. } => self.cursor.in_window = false,
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state.is_pressed();
                match button {
                    MouseButton::Left => self.cursor.left_pressed = pressed,
                    MouseButton::Right => self.cursor.right_pressed = pressed,
                    _ => (),
                }
            }
            // Focus loss never delivers the matching key releases.
            WindowEvent::Focused(false) => self.keys.clear(),
            _ => (),
        }
    }
}

/// A native window drawn through wgpu.
pub struct DesktopWindow {
    event_loop: Option<EventLoop<()>>,
    state: WindowState,
    projection: Projection,
}

impl DesktopWindow {
    pub fn new(config: &EngineConfig) -> Self {
        let state = WindowState {
            title: config.title.clone(),
            requested_size: (config.width, config.height),
            vsync: config.vsync,
            size: (config.width, config.height),
            ..Default::default()
        };
        Self {
            event_loop: None,
            state,
            projection: Projection::new(
                config.width,
                config.height,
                Deg(config.fov_degrees),
                config.z_near,
                config.z_far,
            ),
        }
    }

    /// The GPU context, available between `init` and `cleanup`.
    pub fn context(&self) -> anyhow::Result<&GpuContext> {
        self.state.ctx.as_ref().context("the window has not been initialised")
    }

    fn pump(&mut self, timeout: Duration) {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return;
        };
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(timeout), &mut self.state) {
            log::info!("Event loop exited with code {code}");
            self.state.should_close = true;
        }
    }
}

impl Window for DesktopWindow {
    fn init(&mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()
            .map_err(|e| EngineError::Initialization(format!("failed to create an event loop: {e}")))?;
        self.event_loop = Some(event_loop);

        for _ in 0..INIT_ATTEMPTS {
            self.pump(Duration::from_millis(10));
            if let Some(e) = self.state.init_error.take() {
                return Err(e);
            }
            if self.state.ctx.is_some() {
                let (width, height) = self.state.size;
                self.projection.resize(width, height);
                return Ok(());
            }
        }
        Err(EngineError::Initialization("the platform never resumed the event loop".to_string()).into())
    }

    fn update(&mut self) {
        self.pump(Duration::ZERO);
    }

    fn cleanup(&mut self) {
        self.state.ctx = None;
        self.state.window = None;
        self.state.keys.clear();
    }

    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.state.keys.contains(&key)
    }

    fn window_should_close(&self) -> bool {
        self.state.should_close
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = &self.state.window {
            window.set_title(title);
        }
    }

    fn width(&self) -> u32 {
        self.state.size.0
    }

    fn height(&self) -> u32 {
        self.state.size.1
    }

    fn update_projection_matrix(&mut self) -> Matrix4<f32> {
        let (width, height) = self.state.size;
        self.projection.resize(width, height);
        self.projection.calc_matrix()
    }

    fn is_resize(&self) -> bool {
        self.state.resize
    }

    fn set_resize(&mut self, resize: bool) {
        self.state.resize = resize;
    }

    fn cursor(&self) -> CursorState {
        self.state.cursor
    }
}
