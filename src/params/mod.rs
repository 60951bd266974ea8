mod color;
mod event;

pub use color::Color;
pub use event::{
    ControlEvent, ParamField, EMISSIVE_RANGE, EMISSIVE_STEP, LIGHT_INTENSITY_RANGE,
};

use crate::assets::ImageSource;
use std::sync::Arc;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("invalid input for {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },
}

/// Every user-controllable property of the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParameters {
    pub object_color: Color,
    pub emissive_intensity: f32,
    pub light_intensity: f32,
    pub light_color: Color,
    pub is_light_on: bool,
    pub texture_source: Option<ImageSource>,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            // Ghost white for a marble look.
            object_color: Color::new("#F8F8FF"),
            emissive_intensity: 0.0,
            light_intensity: 5.0,
            light_color: Color::new("#ffffff"),
            is_light_on: true,
            texture_source: None,
        }
    }
}

/// Single source of truth for [`RenderParameters`].
///
/// Readers take an `Arc` snapshot; writers go through copy-on-write setters so
/// a snapshot handed out earlier never changes underneath its holder.
#[derive(Debug)]
pub struct ParameterStore {
    current: Arc<RenderParameters>,
    revision: u64,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            current: Arc::new(RenderParameters::default()),
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> Arc<RenderParameters> {
        Arc::clone(&self.current)
    }

    /// Bumped once per committed mutation (including reset).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn object_color(&self) -> &Color {
        &self.current.object_color
    }

    pub fn emissive_intensity(&self) -> f32 {
        self.current.emissive_intensity
    }

    pub fn light_intensity(&self) -> f32 {
        self.current.light_intensity
    }

    pub fn light_color(&self) -> &Color {
        &self.current.light_color
    }

    pub fn is_light_on(&self) -> bool {
        self.current.is_light_on
    }

    pub fn texture_source(&self) -> Option<&ImageSource> {
        self.current.texture_source.as_ref()
    }

    pub fn set_object_color(&mut self, color: Color) {
        self.commit(|params| params.object_color = color);
    }

    pub fn set_emissive_intensity(&mut self, value: f32) -> Result<(), ParamError> {
        let value = finite("emissiveIntensity", value)?;
        self.commit(|params| params.emissive_intensity = value);
        Ok(())
    }

    pub fn set_light_intensity(&mut self, value: f32) -> Result<(), ParamError> {
        let value = finite("lightIntensity", value)?;
        self.commit(|params| params.light_intensity = value);
        Ok(())
    }

    pub fn set_light_color(&mut self, color: Color) {
        self.commit(|params| params.light_color = color);
    }

    pub fn set_light_on(&mut self, on: bool) {
        self.commit(|params| params.is_light_on = on);
    }

    pub fn set_texture_source(&mut self, source: Option<ImageSource>) {
        self.commit(|params| params.texture_source = source);
    }

    /// Restores the default tuple in a single assignment.
    pub fn reset_to_default(&mut self) {
        self.current = Arc::new(RenderParameters::default());
        self.revision += 1;
        log::debug!("parameters reset to defaults (revision {})", self.revision);
    }

    pub fn apply(&mut self, event: ControlEvent) -> Result<(), ParamError> {
        match event {
            ControlEvent::SetObjectColor(color) => self.set_object_color(color),
            ControlEvent::SetEmissiveIntensity(value) => self.set_emissive_intensity(value)?,
            ControlEvent::SetLightIntensity(value) => self.set_light_intensity(value)?,
            ControlEvent::SetLightColor(color) => self.set_light_color(color),
            ControlEvent::SetLightOn(on) => self.set_light_on(on),
            ControlEvent::ToggleLight => {
                let on = !self.is_light_on();
                self.set_light_on(on);
            }
            ControlEvent::SetTextureSource(source) => self.set_texture_source(Some(source)),
            ControlEvent::ClearTexture => self.set_texture_source(None),
            ControlEvent::Reset => self.reset_to_default(),
        }
        Ok(())
    }

    fn commit(&mut self, mutate: impl FnOnce(&mut RenderParameters)) {
        mutate(Arc::make_mut(&mut self.current));
        self.revision += 1;
        log::debug!("parameters changed (revision {})", self.revision);
    }
}

fn finite(field: &'static str, value: f32) -> Result<f32, ParamError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::InvalidInput {
            field,
            value: value.to_string(),
        })
    }
}
