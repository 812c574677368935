//! Runtime configuration for the model client and the pipeline.
//!
//! Values are plain structs. The binary loads `.env` first, then reads the
//! process environment through [`ClientConfig::from_env`]; command line flags
//! override individual fields afterwards.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::airfoil::DEFAULT_STATIONS;
use crate::export::ExportFormat;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-0125-preview";
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Environment variables read by [`ClientConfig::from_env`].
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_KEY_LEGACY: &str = "OPENAI";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "OPENAI_TIMEOUT_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key configured; set OPENAI_API_KEY (or OPENAI)")]
    MissingApiKey,
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Whole-request timeout; `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(ENV_API_KEY)
            .or_else(|| get(ENV_API_KEY_LEGACY))
            .ok_or(ConfigError::MissingApiKey)?;

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                    name: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            base_url: get(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
        })
    }
}

/// Settings for the geometry and output stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Created on demand.
    pub output_dir: PathBuf,
    /// Chordwise stations per airfoil surface.
    pub stations: usize,
    pub root_chord: f64,
    pub formats: Vec<ExportFormat>,
    /// Use the NACA code from the reply instead of the default section.
    pub use_extracted_airfoil: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            stations: DEFAULT_STATIONS,
            root_chord: 1.0,
            formats: vec![ExportFormat::Obj],
            use_extracted_airfoil: true,
        }
    }
}
