//! Viewer configuration.
//!
//! Loaded from a TOML file, first match wins:
//! 1. an explicit path (e.g. `--config`)
//! 2. `$FOLIO_CONFIG`
//! 3. `<config_dir>/folio/config.toml`
//! 4. built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_MAX_TEXT_BYTES, DEFAULT_OPEN_EXTERNAL_GRACE_MS, DEFAULT_PAN_PADDING,
    DEFAULT_SELECTION_TRANSITION_MS, DEFAULT_THUMBNAIL_DPI, DEFAULT_THUMBNAIL_HEIGHT,
    DEFAULT_THUMBNAIL_WIDTH, DEFAULT_VIEWER_DPI, DEFAULT_ZOOM_STEP,
};
use crate::error::{FolioError, Result};
use crate::transform::TransformSettings;

pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub network: NetworkConfig,
    pub viewer: DisplayConfig,
    pub thumbnails: ThumbnailConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Prefix for relative remote locators.
    pub base_url: Option<String>,
    /// Environment variable holding the bearer credential.
    pub token_env: String,
    /// Endpoint that issues a fresh credential.
    pub refresh_url: Option<String>,
    /// Environment variable holding the refresh token sent to `refresh_url`.
    pub refresh_token_env: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token_env: "FOLIO_TOKEN".into(),
            refresh_url: None,
            refresh_token_env: "FOLIO_REFRESH_TOKEN".into(),
            timeout_secs: 30,
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Zoom change per wheel tick or +/- press, in percent.
    pub zoom_step: f32,
    /// Pan slack past the content edges, in pixels.
    pub pan_padding: f32,
    pub selection_transition_ms: u64,
    /// How long a handle opened in an external application stays alive.
    pub open_external_grace_ms: u64,
    pub max_text_bytes: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            zoom_step: DEFAULT_ZOOM_STEP,
            pan_padding: DEFAULT_PAN_PADDING,
            selection_transition_ms: DEFAULT_SELECTION_TRANSITION_MS,
            open_external_grace_ms: DEFAULT_OPEN_EXTERNAL_GRACE_MS,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }
}

impl DisplayConfig {
    pub fn transform_settings(&self) -> TransformSettings {
        TransformSettings {
            zoom_step: self.zoom_step,
            pan_padding: self.pan_padding,
        }
    }

    pub fn selection_transition(&self) -> Duration {
        Duration::from_millis(self.selection_transition_ms)
    }

    pub fn open_external_grace(&self) -> Duration {
        Duration::from_millis(self.open_external_grace_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
    /// External page rasterizer program; empty disables document previews.
    pub rasterizer: String,
    pub dpi: u32,
    /// Resolution for the main-view page render.
    pub viewer_dpi: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_THUMBNAIL_WIDTH,
            height: DEFAULT_THUMBNAIL_HEIGHT,
            rasterizer: "pdftoppm".into(),
            dpi: DEFAULT_THUMBNAIL_DPI,
            viewer_dpi: DEFAULT_VIEWER_DPI,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| FolioError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FolioError::Config(e.to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| FolioError::Config(format!("{}: {e}", path.display())))
    }

    /// Load following the documented lookup order.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }
        match Self::default_path().filter(|p| p.exists()) {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::load_from(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        let viewer = &self.viewer;
        if !(viewer.zoom_step.is_finite() && viewer.zoom_step > 0.0) {
            return Err(FolioError::Config(format!(
                "viewer.zoom_step must be positive, got {}",
                viewer.zoom_step
            )));
        }
        if !(viewer.pan_padding.is_finite() && viewer.pan_padding >= 0.0) {
            return Err(FolioError::Config(format!(
                "viewer.pan_padding must be >= 0, got {}",
                viewer.pan_padding
            )));
        }
        if self.thumbnails.width == 0 || self.thumbnails.height == 0 {
            return Err(FolioError::Config(
                "thumbnails.width and thumbnails.height must be > 0".into(),
            ));
        }
        Ok(())
    }
}
