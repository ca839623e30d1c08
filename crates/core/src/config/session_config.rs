use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use crate::gate::domain::dwell_policy::{DwellPolicy, PolicyError};
use crate::shared::constants::{
    APP_DIR_NAME, DEFAULT_COOLDOWN_MS, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH,
    DEFAULT_DWELL_THRESHOLD_MS, DEFAULT_OVAL_RADIUS_X, DEFAULT_OVAL_RADIUS_Y,
    DEFAULT_TICK_PERIOD_MS,
};
use crate::shared::oval_region::{OvalError, OvalRegion};

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Oval(#[from] OvalError),
    #[error("display size must be non-zero, got {width}x{height}")]
    ZeroDisplay { width: u32, height: u32 },
    #[error("confidence must be within 0.0..=1.0, got {0}")]
    Confidence(f64),
    #[error("upload endpoint must be an http(s) URL, got {0:?}")]
    Endpoint(String),
}

/// Where captured snapshots go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum OutputMode {
    Save { dir: PathBuf },
    Upload { endpoint: String },
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Save {
            dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Save { dir } => write!(f, "save to {}", dir.display()),
            OutputMode::Upload { endpoint } => write!(f, "upload to {endpoint}"),
        }
    }
}

/// Persisted session settings. Missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tick_period_ms: u64,
    pub threshold_ms: u64,
    pub cooldown_ms: u64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub display_width: u32,
    pub display_height: u32,
    pub confidence: f64,
    pub output: OutputMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            threshold_ms: DEFAULT_DWELL_THRESHOLD_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            radius_x: DEFAULT_OVAL_RADIUS_X,
            radius_y: DEFAULT_OVAL_RADIUS_Y,
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            confidence: DEFAULT_CONFIDENCE,
            output: OutputMode::default(),
        }
    }
}

impl SessionConfig {
    /// `<config dir>/Dwellcam/settings.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the per-user settings file, or defaults when there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::debug!("Loading settings from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy()?;
        self.oval()?;
        if self.display_width == 0 || self.display_height == 0 {
            return Err(ConfigError::ZeroDisplay {
                width: self.display_width,
                height: self.display_height,
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Confidence(self.confidence));
        }
        if let OutputMode::Upload { endpoint } = &self.output {
            let ok = reqwest::Url::parse(endpoint)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !ok {
                return Err(ConfigError::Endpoint(endpoint.clone()));
            }
        }
        Ok(())
    }

    pub fn policy(&self) -> Result<DwellPolicy, PolicyError> {
        DwellPolicy::new(self.tick_period_ms, self.threshold_ms, self.cooldown_ms)
    }

    /// The guide oval, centered on the display.
    pub fn oval(&self) -> Result<OvalRegion, OvalError> {
        OvalRegion::centered(
            self.display_width,
            self.display_height,
            self.radius_x,
            self.radius_y,
        )
    }
}
