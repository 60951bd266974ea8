mod light;
mod material;
mod rotation;

pub use light::{derive_light, LightState, DEFAULT_LIGHT_DIRECTION};
pub use material::{derive_material, MaterialState};
#[cfg(test)]
pub use material::TextureBinding;
pub use rotation::{Orientation, RotationDriver, DEFAULT_ROTATION_STEP};

/// Geometry of the previewed sphere. Not user-configurable.
pub const SPHERE_RADIUS: f32 = 1.0;
pub const SPHERE_WIDTH_SEGMENTS: u32 = 32;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 32;

pub const DEFAULT_BACKGROUND: &str = "#f0f0f0";

/// Everything the draw call needs for one frame, derived fresh each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub orientation: Orientation,
    pub material: MaterialState,
    pub light: LightState,
}
