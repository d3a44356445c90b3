//! Runtime configuration.
//!
//! [`Config`] is the single source of truth for the model service settings,
//! the drawing area, and the frame rate, however they were specified. It
//! loads from TOML; the front end layers environment variables and flags on
//! top.
//!
//! ```toml
//! model = "gemini-3-pro-preview"
//! fps = 30
//!
//! [canvas]
//! width = 800.0
//! height = 600.0
//! padding = 60.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::scheduler::DEFAULT_FPS;
use crate::viewport::Viewport;

/// Environment variable holding the model service API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Default model service base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Cannot read config file {path}: {message}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config: {0}")]
    Parse(String),

    /// The canvas leaves no room to draw.
    #[error("Canvas {width}x{height} with padding {padding} has no drawing area")]
    InvalidCanvas {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
        /// Padding in pixels.
        padding: f64,
    },

    /// Frame rate of zero.
    #[error("Frame rate must be at least 1")]
    ZeroFps,

    /// No model name.
    #[error("Model name must not be empty")]
    EmptyModel,
}

/// Drawing area settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Padding on every side, in pixels.
    pub padding: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let vp = Viewport::default();
        Self {
            width: vp.width,
            height: vp.height,
            padding: vp.padding,
        }
    }
}

impl CanvasConfig {
    /// The corresponding viewport.
    pub const fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.padding)
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model service API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model name.
    pub model: String,

    /// Model service base URL.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Drawing area.
    pub canvas: CanvasConfig,

    /// Playback frame rate.
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            canvas: CanvasConfig::default(),
            fps: DEFAULT_FPS,
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location for this platform.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("rs", "kinema", "kinema").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on invalid TOML or wrong field types.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the default file if it exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) when the file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Takes the API key from the environment when one is set.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Some(key) = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
        {
            self.api_key = Some(key);
        }
        self
    }

    /// Request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured drawing area.
    pub const fn viewport(&self) -> Viewport {
        self.canvas.viewport()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self.canvas;
        if !(c.width > 0.0 && c.height > 0.0 && c.padding >= 0.0)
            || c.width <= 2.0 * c.padding
            || c.height <= 2.0 * c.padding
        {
            return Err(ConfigError::InvalidCanvas {
                width: c.width,
                height: c.height,
                padding: c.padding,
            });
        }

        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        Ok(())
    }

    /// Export configuration as a diagnostic string. The key is masked.
    pub fn to_diagnostic_string(&self) -> String {
        let key = match &self.api_key {
            Some(k) if k.chars().count() > 4 => {
                let start = k.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
                format!("set (…{})", &k[start..])
            }
            Some(_) => "set".to_string(),
            None => "not set".to_string(),
        };

        [
            format!("API key: {key}"),
            format!("Model: {}", self.model),
            format!("Endpoint: {}", self.endpoint),
            format!("Timeout: {}s", self.timeout_secs),
            format!(
                "Canvas: {}x{} (padding {})",
                self.canvas.width, self.canvas.height, self.canvas.padding
            ),
            format!("FPS: {}", self.fps),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.fps, 60);
        assert_eq!(config.viewport(), Viewport::new(800.0, 600.0, 60.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("fps = 30\n[canvas]\nwidth = 400.0\n").unwrap();
        assert_eq!(config.fps, 30);
        assert!((config.canvas.width - 400.0).abs() < f64::EPSILON);
        assert!((config.canvas.height - 600.0).abs() < f64::EPSILON);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn config_bad_toml() {
        let err = Config::from_toml_str("fps = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("here.toml"));
    }

    #[test]
    fn config_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.canvas.padding = 400.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCanvas { .. })
        ));

        let mut config = Config::default();
        config.fps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroFps)));

        let mut config = Config::default();
        config.model = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyModel)));
    }

    #[test]
    fn config_diagnostic_masks_key() {
        let config = Config {
            api_key: Some("secret-key-1234".into()),
            ..Config::default()
        };
        let diag = config.to_diagnostic_string();
        assert!(diag.contains("…1234"));
        assert!(!diag.contains("secret"));
    }

    #[test]
    fn config_key_is_not_serialized() {
        let config = Config {
            api_key: Some("secret".into()),
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("[canvas]"));
    }
}
