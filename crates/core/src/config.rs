//! Demo configuration loaded from RON.
//!
//! Every field has a default matching the stock demo scene, so a config file
//! only needs to name the values it changes:
//!
//! ```ron
//! (
//!     viewport: (width: 1280, height: 720),
//!     frames: 600,
//! )
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable naming a config file to load.
pub const CONFIG_ENV_VAR: &str = "SCENEGRAPH_CONFIG";

/// Output surface size. Only the ratio matters to the scene.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1920 / 2,
            height: 1080 / 2,
        }
    }
}

impl ViewportConfig {
    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Perspective camera settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Top-level configuration for the headless demo driver.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub viewport: ViewportConfig,
    pub camera: CameraConfig,
    /// Spin rate applied to the demo cubes, in degrees per second.
    pub spin_degrees_per_second: f32,
    /// Number of frames to run before exiting.
    pub frames: u32,
    /// When set, every frame advances by this many seconds instead of
    /// wall-clock time.
    pub fixed_delta: Option<f32>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
            spin_degrees_per_second: 180.0,
            frames: 120,
            fixed_delta: Some(1.0 / 60.0),
        }
    }
}

impl DemoConfig {
    /// Parse a config from RON source.
    pub fn from_ron(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron(&source)
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or fall back to defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                tracing::info!(path = ?path, "Loading demo config");
                Self::load(path)
            }
            None => {
                tracing::debug!("{} not set, using default config", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(Error::InvalidConfig(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            )));
        }
        Ok(())
    }
}
