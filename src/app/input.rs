use crate::render::OrbitCamera;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
const ZOOM_PER_LINE: f32 = 0.9;
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Orbit,
    Pan,
}

/// Mouse state behind the orbit controls.
#[derive(Default, Debug, Clone, Copy)]
pub struct MouseState {
    pub position: Option<(f32, f32)>,
    pub drag: Option<DragMode>,
}

impl MouseState {
    pub fn handle_button(&mut self, button: MouseButton, state: ElementState) {
        let mode = match button {
            MouseButton::Left => DragMode::Orbit,
            MouseButton::Right | MouseButton::Middle => DragMode::Pan,
            _ => return,
        };
        match state {
            ElementState::Pressed => self.drag = Some(mode),
            ElementState::Released if self.drag == Some(mode) => self.drag = None,
            ElementState::Released => {}
        }
    }

    /// Records the new cursor position and applies any active drag.
    pub fn handle_motion(&mut self, x: f32, y: f32, viewport_height: f32, camera: &mut OrbitCamera) {
        if let (Some((last_x, last_y)), Some(mode)) = (self.position, self.drag) {
            let dx = x - last_x;
            let dy = y - last_y;
            match mode {
                DragMode::Orbit => camera.orbit(
                    -dx * ORBIT_RADIANS_PER_PIXEL,
                    dy * ORBIT_RADIANS_PER_PIXEL,
                ),
                DragMode::Pan => {
                    let height = viewport_height.max(1.0);
                    camera.pan(dx / height, dy / height);
                }
            }
        }
        self.position = Some((x, y));
    }

    pub fn release_all(&mut self) {
        self.drag = None;
        self.position = None;
    }
}

/// Dolly factor for one wheel event; below 1 moves closer.
pub fn zoom_factor(delta: MouseScrollDelta) -> f32 {
    let lines = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    };
    ZOOM_PER_LINE.powf(lines)
}
