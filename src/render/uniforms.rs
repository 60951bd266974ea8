use crate::scene::{LightState, MaterialState, Orientation};
use glam::Mat4;

/// Mirrors `SceneUniforms` in `sphere.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// rgb = base color, w = 1 when the texture is sampled.
    pub base_color: [f32; 4],
    /// rgb = emissive color, w = emissive intensity.
    pub emissive: [f32; 4],
    /// xyz = direction toward the light.
    pub light_direction: [f32; 4],
    /// rgb = light color, w = effective intensity.
    pub light_color: [f32; 4],
}

impl SceneUniforms {
    pub fn new(
        view_proj: Mat4,
        orientation: Orientation,
        material: &MaterialState,
        light: &LightState,
    ) -> Self {
        let textured = if material.is_textured() { 1.0 } else { 0.0 };
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: orientation.model_matrix().to_cols_array_2d(),
            base_color: material.base_color().extend(textured).to_array(),
            emissive: material
                .emissive_color()
                .extend(material.emissive_intensity())
                .to_array(),
            light_direction: light.direction.extend(0.0).to_array(),
            light_color: light.color.extend(light.effective_intensity).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SceneUniforms;
    use crate::scene::{LightState, MaterialState, Orientation, TextureBinding};
    use glam::{Mat4, Vec3};

    fn light() -> LightState {
        LightState {
            effective_intensity: 5.0,
            color: Vec3::ONE,
            direction: Vec3::Y,
        }
    }

    #[test]
    fn layout_matches_shader_struct_size() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 192);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn flat_material_packs_color_and_glow() {
        let material = MaterialState::Flat {
            base_color: Vec3::new(0.2, 0.4, 0.6),
            emissive_color: Vec3::new(0.2, 0.4, 0.6),
            emissive_intensity: 0.5,
        };
        let uniforms = SceneUniforms::new(
            Mat4::IDENTITY,
            Orientation::default(),
            &material,
            &light(),
        );
        assert_eq!(uniforms.base_color, [0.2, 0.4, 0.6, 0.0]);
        assert_eq!(uniforms.emissive, [0.2, 0.4, 0.6, 0.5]);
        assert_eq!(uniforms.light_color, [1.0, 1.0, 1.0, 5.0]);
    }

    #[test]
    fn textured_material_sets_sampling_flag_and_kills_glow() {
        let material = MaterialState::Textured {
            texture: TextureBinding::Placeholder,
        };
        let uniforms = SceneUniforms::new(
            Mat4::IDENTITY,
            Orientation::default(),
            &material,
            &light(),
        );
        assert_eq!(uniforms.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniforms.emissive, [0.0, 0.0, 0.0, 0.0]);
    }
}
