use crate::params::RenderParameters;
use glam::Vec3;

/// Direction toward the light, matching a light placed at `(1, 1, 1)` that
/// targets the origin.
pub const DEFAULT_LIGHT_DIRECTION: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub effective_intensity: f32,
    /// Linear RGB.
    pub color: Vec3,
    /// Unit vector from the surface toward the light, world space.
    pub direction: Vec3,
}

pub fn derive_light(params: &RenderParameters, direction: Vec3) -> LightState {
    LightState {
        effective_intensity: if params.is_light_on {
            params.light_intensity
        } else {
            0.0
        },
        color: params.light_color.to_linear_rgb().unwrap_or(Vec3::ONE),
        direction: direction.try_normalize().unwrap_or(Vec3::Y),
    }
}
