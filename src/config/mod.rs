use crate::assets::DEFAULT_MAX_TEXTURE_DIMENSION;
use crate::params::Color;
use crate::scene::{DEFAULT_BACKGROUND, DEFAULT_LIGHT_DIRECTION, DEFAULT_ROTATION_STEP};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "ORBVIZ_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "orbviz.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// What happens to `textureSource` when its image cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFailurePolicy {
    /// Leave it set; the sphere shows the placeholder until the user acts.
    #[default]
    Keep,
    /// Clear it so the sphere returns to flat mode.
    Clear,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub rotation_step: f32,
    pub background: Color,
    pub light_direction: [f32; 3],
    pub camera_distance: f32,
    pub vsync: bool,
    pub max_texture_dimension: u32,
    pub texture_failure_policy: TextureFailurePolicy,
    pub log_filter: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Orbviz".to_string(),
            window_width: 1280,
            window_height: 720,
            rotation_step: DEFAULT_ROTATION_STEP,
            background: Color::new(DEFAULT_BACKGROUND),
            light_direction: DEFAULT_LIGHT_DIRECTION,
            camera_distance: 5.0,
            vsync: true,
            max_texture_dimension: DEFAULT_MAX_TEXTURE_DIMENSION,
            texture_failure_policy: TextureFailurePolicy::Keep,
            log_filter: "info,wgpu_core=warn,wgpu_hal=warn,naga=warn".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Config path from `ORBVIZ_CONFIG`, else `orbviz.json` in the working dir.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Missing file means defaults. A broken file is reported and ignored.
    ///
    /// Runs before the logger exists, so the outcome comes back as a message
    /// for the caller to log at the given level.
    pub fn load_or_default(path: &Path) -> (Self, Option<(log::Level, String)>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from_file(path) {
            Ok(config) => (
                config.sanitized(),
                Some((
                    log::Level::Info,
                    format!("Loaded config from {}", path.display()),
                )),
            ),
            Err(err) => (
                Self::default(),
                Some((
                    log::Level::Warn,
                    format!("Ignoring config {}: {}; using defaults", path.display(), err),
                )),
            ),
        }
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.rotation_step.is_finite() {
            self.rotation_step = defaults.rotation_step;
        }
        if !self.camera_distance.is_finite() || self.camera_distance <= 0.0 {
            self.camera_distance = defaults.camera_distance;
        }
        self.window_width = self.window_width.max(1);
        self.window_height = self.window_height.max(1);
        self.max_texture_dimension = self.max_texture_dimension.max(1);
        self
    }
}
