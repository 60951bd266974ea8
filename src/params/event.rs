use super::{Color, ParamError};
use crate::assets::ImageSource;

pub const EMISSIVE_RANGE: (f32, f32) = (0.0, 1.0);
pub const EMISSIVE_STEP: f32 = 0.1;
pub const LIGHT_INTENSITY_RANGE: (i32, i32) = (0, 20);

/// Discrete change produced by one control widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    SetObjectColor(Color),
    SetEmissiveIntensity(f32),
    SetLightIntensity(f32),
    SetLightColor(Color),
    SetLightOn(bool),
    ToggleLight,
    SetTextureSource(ImageSource),
    ClearTexture,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    ObjectColor,
    EmissiveIntensity,
    LightIntensity,
    LightColor,
}

impl ParamField {
    pub fn name(self) -> &'static str {
        match self {
            ParamField::ObjectColor => "objectColor",
            ParamField::EmissiveIntensity => "emissiveIntensity",
            ParamField::LightIntensity => "lightIntensity",
            ParamField::LightColor => "lightColor",
        }
    }
}

impl ControlEvent {
    /// Converts raw widget text into a typed event.
    ///
    /// Ranges belong to the widgets, so numeric input is clamped here and the
    /// store receives an in-range value. Text that is not a number is rejected.
    pub fn parse(field: ParamField, raw: &str) -> Result<Self, ParamError> {
        let value = raw.trim();
        let invalid = || ParamError::InvalidInput {
            field: field.name(),
            value: raw.to_string(),
        };
        match field {
            ParamField::ObjectColor | ParamField::LightColor => {
                if value.is_empty() {
                    return Err(invalid());
                }
                let color = Color::new(value);
                Ok(if field == ParamField::ObjectColor {
                    ControlEvent::SetObjectColor(color)
                } else {
                    ControlEvent::SetLightColor(color)
                })
            }
            ParamField::EmissiveIntensity => {
                let parsed = value.parse::<f32>().map_err(|_| invalid())?;
                if !parsed.is_finite() {
                    return Err(invalid());
                }
                Ok(ControlEvent::SetEmissiveIntensity(
                    parsed.clamp(EMISSIVE_RANGE.0, EMISSIVE_RANGE.1),
                ))
            }
            ParamField::LightIntensity => {
                let parsed = value.parse::<f64>().map_err(|_| invalid())?;
                if !parsed.is_finite() {
                    return Err(invalid());
                }
                // Integer widget: fractional text truncates toward zero.
                let whole = parsed
                    .trunc()
                    .clamp(LIGHT_INTENSITY_RANGE.0 as f64, LIGHT_INTENSITY_RANGE.1 as f64);
                Ok(ControlEvent::SetLightIntensity(whole as f32))
            }
        }
    }
}
