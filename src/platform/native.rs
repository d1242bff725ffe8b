//! Native shell: winit window, wgpu surface, continuous redraw

use std::sync::Arc;
use std::time::Instant;

use glam::DVec2;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use super::keymap::{KeyBinding, map_key};
use crate::error::InitError;
use crate::game::Game;
use crate::overlay::LogOverlay;
use crate::renderer::WgpuRenderer;
use crate::settings::Settings;
use crate::sim::InputEvent;

struct App {
    settings: Settings,
    game: Game,
    overlay: LogOverlay,
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    last_frame: Option<Instant>,
    /// Startup failure, reported once the loop has exited
    error: Option<InitError>,
}

impl App {
    fn new(settings: Settings) -> Self {
        Self {
            game: Game::new(settings.clone()),
            settings,
            overlay: LogOverlay::default(),
            window: None,
            renderer: None,
            last_frame: None,
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), InitError> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let renderer = pollster::block_on(WgpuRenderer::new(window.clone(), &self.settings))?;

        let size = window.inner_size();
        self.game.push_input(InputEvent::Resized {
            width: size.width,
            height: size.height,
        });

        self.window = Some(window);
        self.renderer = Some(renderer);
        log::info!("Window and renderer initialized ({}x{})", size.width, size.height);
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;
        match map_key(code) {
            Some(KeyBinding::Action(action)) => {
                self.game.push_input(InputEvent::Action { action, pressed });
            }
            Some(KeyBinding::Shading(index)) if pressed => {
                self.game.push_input(InputEvent::SelectShading(index));
            }
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        match self.game.frame(dt, renderer, &mut self.overlay) {
            Ok(output) => {
                if let Some(center) = output.warp_cursor
                    && let Err(e) = window.set_cursor_position(PhysicalPosition::new(center.x, center.y))
                {
                    log::warn!("Cannot warp cursor: {e}");
                }
                if output.exit {
                    self.game.teardown();
                    event_loop.exit();
                    return;
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = renderer.size;
                renderer.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                self.game.teardown();
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("Render error: {e:?}"),
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.game.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if size.width > 0 && size.height > 0 {
                    self.game.push_input(InputEvent::Resized {
                        width: size.width,
                        height: size.height,
                    });
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.game
                    .push_input(InputEvent::CursorMoved(DVec2::new(position.x, position.y)));
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GPU resources go before the window they render into
        self.renderer = None;
        self.window = None;
    }
}

/// Open the window and run until it closes
pub fn run(settings: Settings) -> Result<(), InitError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
