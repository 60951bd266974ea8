use crate::assets::{ResolvedTexture, SourceId};
use crate::params::RenderParameters;
use glam::Vec3;

/// Image the textured surface samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureBinding {
    Loaded(SourceId),
    /// The selected image is still decoding or failed to decode.
    Placeholder,
}

/// Sphere appearance for one frame. Exactly one mode is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialState {
    Flat {
        base_color: Vec3,
        emissive_color: Vec3,
        emissive_intensity: f32,
    },
    Textured {
        texture: TextureBinding,
    },
}

impl MaterialState {
    pub fn is_textured(&self) -> bool {
        matches!(self, MaterialState::Textured { .. })
    }

    pub fn base_color(&self) -> Vec3 {
        match self {
            MaterialState::Flat { base_color, .. } => *base_color,
            MaterialState::Textured { .. } => Vec3::ONE,
        }
    }

    pub fn emissive_color(&self) -> Vec3 {
        match self {
            MaterialState::Flat { emissive_color, .. } => *emissive_color,
            MaterialState::Textured { .. } => Vec3::ZERO,
        }
    }

    pub fn emissive_intensity(&self) -> f32 {
        match self {
            MaterialState::Flat {
                emissive_intensity, ..
            } => *emissive_intensity,
            MaterialState::Textured { .. } => 0.0,
        }
    }

    #[cfg(test)]
    pub fn texture(&self) -> Option<TextureBinding> {
        match self {
            MaterialState::Flat { .. } => None,
            MaterialState::Textured { texture } => Some(*texture),
        }
    }
}

/// Mode is chosen by `texture_source` alone; the resolved texture only decides
/// which image the textured mode samples.
pub fn derive_material(params: &RenderParameters, texture: &ResolvedTexture) -> MaterialState {
    match &params.texture_source {
        Some(source) => {
            let binding = if texture.loaded_for(source.id()) {
                TextureBinding::Loaded(source.id())
            } else {
                TextureBinding::Placeholder
            };
            MaterialState::Textured { texture: binding }
        }
        None => {
            let color = params.object_color.to_linear_rgb().unwrap_or(Vec3::ONE);
            MaterialState::Flat {
                base_color: color,
                emissive_color: color,
                emissive_intensity: params.emissive_intensity,
            }
        }
    }
}
