//! Session context
//!
//! Everything that lives for the whole session and is shared between the
//! input bridge, the camera and the frame loop. Owned by `Game` and handed
//! out by `&mut`.

use std::collections::VecDeque;

use glam::{DVec2, Mat4};

use super::camera::{Camera, CameraMove};
use super::input::{Action, ActionState, CursorState, InputEvent};
use crate::consts::SPIN_SPEED;
use crate::overlay::OverlayParams;
use crate::renderer::ShadingModel;
use crate::settings::Settings;

/// Vertical field of view (degrees)
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 10_000.0;

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Perspective projection for a viewport (wgpu depth range)
pub fn projection_matrix(viewport: Viewport) -> Mat4 {
    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), viewport.aspect(), Z_NEAR, Z_FAR)
}

/// One-shot requests raised while draining input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Shoot,
    Restart,
}

/// Session-wide mutable state
#[derive(Debug, Clone)]
pub struct Session {
    pub camera: Camera,
    pub actions: ActionState,
    pub cursor: CursorState,
    pub viewport: Viewport,

    pub wireframe: bool,
    pub spinning: bool,
    /// Background rotation (degrees)
    pub spin_angle: f32,
    pub shading: ShadingModel,

    /// Checked at the top of every frame
    pub close_requested: bool,
    /// Values edited through the overlay, applied on restart
    pub overlay: OverlayParams,
    /// Seconds since the session started
    pub elapsed: f32,

    events: VecDeque<InputEvent>,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            camera: Camera::new(settings.camera_start, true),
            actions: ActionState::default(),
            cursor: CursorState::default(),
            viewport: Viewport::new(settings.window_width, settings.window_height),
            wireframe: false,
            spinning: false,
            spin_angle: 0.0,
            shading: settings.shading_model(),
            close_requested: false,
            overlay: OverlayParams::new(settings.instance_count, settings.particle_count),
            elapsed: 0.0,
            events: VecDeque::new(),
        }
    }

    pub fn projection(&self) -> Mat4 {
        projection_matrix(self.viewport)
    }

    /// Queue an event for the next frame
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Apply every queued event in arrival order and collect the one-shot
    /// requests they raised
    pub fn poll_input(&mut self) -> Vec<Trigger> {
        let mut triggers = Vec::new();
        while let Some(event) = self.events.pop_front() {
            if let Some(trigger) = self.apply(event) {
                triggers.push(trigger);
            }
        }
        triggers
    }

    fn apply(&mut self, event: InputEvent) -> Option<Trigger> {
        match event {
            InputEvent::Action { action, pressed } => {
                let fresh = self.actions.set(action, pressed);
                if !fresh {
                    return None;
                }
                match action {
                    Action::Shoot => return Some(Trigger::Shoot),
                    Action::Restart => return Some(Trigger::Restart),
                    Action::ToggleWireframe => {
                        self.wireframe = !self.wireframe;
                        log::info!("Wireframe {}", if self.wireframe { "on" } else { "off" });
                    }
                    Action::ToggleSpin => self.spinning = !self.spinning,
                    Action::Quit => self.close_requested = true,
                    Action::MoveForward
                    | Action::MoveBack
                    | Action::MoveLeft
                    | Action::MoveRight => {}
                }
            }
            InputEvent::CursorMoved(position) => {
                let (x, y) = self.cursor.moved(position);
                self.camera.process_look(x, y);
            }
            InputEvent::Resized { width, height } => {
                self.viewport = Viewport::new(width, height);
            }
            InputEvent::SelectShading(index) => {
                self.select_shading(index);
            }
        }
        None
    }

    /// Switch shading variant. Unknown indices leave the selection alone.
    pub fn select_shading(&mut self, index: usize) -> bool {
        match ShadingModel::from_index(index) {
            Some(model) => {
                if model != self.shading {
                    log::info!("Shading: {model:?}");
                }
                self.shading = model;
                true
            }
            None => {
                log::debug!("Ignoring shading index {index}");
                false
            }
        }
    }

    /// Move the camera along every held direction
    pub fn apply_movement(&mut self, dt: f32) {
        const MOVES: [(Action, CameraMove); 4] = [
            (Action::MoveForward, CameraMove::Forward),
            (Action::MoveBack, CameraMove::Backward),
            (Action::MoveLeft, CameraMove::Left),
            (Action::MoveRight, CameraMove::Right),
        ];
        for (action, direction) in MOVES {
            if self.actions.is_held(action) {
                self.camera.process_move(direction, dt);
            }
        }
    }

    /// Advance the background rotation while spinning is on
    pub fn advance_spin(&mut self, dt: f32) {
        if self.spinning {
            self.spin_angle = (self.spin_angle + dt * SPIN_SPEED) % 360.0;
        }
    }

    /// Drop held actions and make `origin` the look reference
    pub fn reset_input(&mut self, origin: DVec2) {
        self.actions.release_all();
        self.cursor.reset_origin(origin);
    }
}
