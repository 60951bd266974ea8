use glam::Vec3;

/// Opaque color string as produced by the color widgets (`#F8F8FF`).
///
/// The store never validates it. Conversion to GPU values happens in the
/// binders through [`Color::to_linear_rgb`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses `#rgb` / `#rrggbb` (case-insensitive, leading `#` optional).
    pub fn to_srgb8(&self) -> Option<[u8; 3]> {
        let hex = self.0.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let nibble = ch.to_digit(16)? as u8;
                    *slot = nibble * 17;
                }
                Some(out)
            }
            6 => {
                let mut out = [0u8; 3];
                for (index, slot) in out.iter_mut().enumerate() {
                    let pair = &hex[index * 2..index * 2 + 2];
                    // from_str_radix alone would take a sign: "+f".
                    if !pair.bytes().all(|byte| byte.is_ascii_hexdigit()) {
                        return None;
                    }
                    *slot = u8::from_str_radix(pair, 16).ok()?;
                }
                Some(out)
            }
            _ => None,
        }
    }

    pub fn to_linear_rgb(&self) -> Option<Vec3> {
        let [r, g, b] = self.to_srgb8()?;
        Some(Vec3::new(
            srgb_to_linear(r as f32 / 255.0),
            srgb_to_linear(g as f32 / 255.0),
            srgb_to_linear(b as f32 / 255.0),
        ))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn srgb_to_linear(channel: f32) -> f32 {
    if channel <= 0.04045 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::new("#F8F8FF").to_srgb8(), Some([0xf8, 0xf8, 0xff]));
        assert_eq!(Color::new("#fff").to_srgb8(), Some([255, 255, 255]));
        assert_eq!(Color::new("00ff00").to_srgb8(), Some([0, 255, 0]));
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert_eq!(Color::new("ghostwhite").to_srgb8(), None);
        assert_eq!(Color::new("#12345").to_srgb8(), None);
        assert_eq!(Color::new("#ééé").to_srgb8(), None);
        assert_eq!(Color::new("#+f+f+f").to_srgb8(), None);
        assert_eq!(Color::new("-1-1-1").to_srgb8(), None);
        assert_eq!(Color::new("#+f").to_srgb8(), None);
        assert!(Color::new("").to_linear_rgb().is_none());
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        let white = Color::new("#ffffff").to_linear_rgb().unwrap();
        let black = Color::new("#000000").to_linear_rgb().unwrap();
        assert!((white.x - 1.0).abs() < 1e-6);
        assert!(black.length() < 1e-6);
        let grey = Color::new("#808080").to_linear_rgb().unwrap();
        assert!(grey.x > 0.2 && grey.x < 0.23);
    }

    #[test]
    fn srgb8_formatting_is_lowercase_hex() {
        assert_eq!(Color::from_srgb8([248, 248, 255]).as_str(), "#f8f8ff");
    }
}
