//! Native window and frame loop
//!
//! One redraw is one frame: run the fixed-step ticks that are due, log what
//! happened, record the scene and present.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use super::clock::FixedStep;
use super::input::{InputState, Key, map_key};
use crate::renderer::{Camera, RenderState, Scene};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameWorld, tick};

/// Open the window and run until it is closed
pub fn run(settings: Settings) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Everything that needs a live window
struct Graphics {
    window: Arc<Window>,
    renderer: RenderState,
    scene: Scene,
}

struct App {
    settings: Settings,
    world: GameWorld,
    camera: Camera,
    input: InputState,
    clock: FixedStep,
    graphics: Option<Graphics>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings) -> Self {
        let world = GameWorld::new(settings.seed, &settings.tuning);
        let camera = Camera::new(settings.window_width, settings.window_height);
        Self {
            settings,
            world,
            camera,
            input: InputState::default(),
            clock: FixedStep::new(),
            graphics: None,
            failure: None,
        }
    }

    fn init_graphics(&self, event_loop: &ActiveEventLoop) -> Result<Graphics> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.window_title.clone())
            .with_inner_size(PhysicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut renderer = pollster::block_on(RenderState::new(
            surface,
            &adapter,
            size.width,
            size.height,
            self.settings.vsync,
        ))?;
        let scene = Scene::load(&mut renderer, &self.settings.assets_dir)
            .context("failed to load game assets")?;

        Ok(Graphics {
            window,
            renderer,
            scene,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.failure = Some(err);
        event_loop.exit();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if self.camera.resize(size.width, size.height) {
            log::debug!(
                "Resized to {}x{} (aspect {:.3})",
                size.width,
                size.height,
                self.camera.aspect()
            );
        }
        if let Some(gfx) = self.graphics.as_mut() {
            gfx.renderer.resize(size.width, size.height);
        }
    }

    fn key_event(&mut self, event_loop: &ActiveEventLoop, key: Key, down: bool, repeat: bool) {
        if key == Key::Quit {
            if down {
                log::info!("Quit requested");
                event_loop.exit();
            }
            return;
        }
        self.input.key_event(key, down, repeat);
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let steps = self.clock.advance_to(Instant::now());
        for _ in 0..steps {
            let input = self.input.tick_input();
            tick(&mut self.world, &input, &self.settings.tuning);
            // One-shot inputs are consumed by the first substep
            self.input.consume_edges();
        }
        for event in self.world.drain_events() {
            log_event(&event);
        }

        let Some(gfx) = self.graphics.as_mut() else {
            return;
        };
        gfx.scene
            .render(&mut gfx.renderer, &self.world, &self.camera);

        match gfx.renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU out of memory"));
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        match self.init_graphics(event_loop) {
            Ok(gfx) => {
                let size = gfx.window.inner_size();
                self.camera.resize(size.width, size.height);
                gfx.window.request_redraw();
                self.graphics = Some(gfx);
                self.clock.reset();
                log::info!("Balloon shooter ready, press Enter to start");
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                if let Some(key) = map_key(code) {
                    let down = event.state == ElementState::Pressed;
                    self.key_event(event_loop, key, down, event.repeat);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.graphics {
            gfx.window.request_redraw();
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ModeChanged { from, to } => log::info!("Game mode {from:?} -> {to:?}"),
        GameEvent::ProjectileFired { at } => log::debug!("Fired from {at}"),
        GameEvent::FireIgnored => log::debug!("Fire ignored, projectile limit reached"),
        GameEvent::TargetPopped { at } => log::debug!("Balloon popped at {at}"),
        GameEvent::ProjectilesCulled { count } => log::trace!("Culled {count} projectiles"),
    }
}
