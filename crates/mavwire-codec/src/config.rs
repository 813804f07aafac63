use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::reporter::DECODE_ERROR_NAME;

/// Outbound identity and framing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// System id stamped on every encoded frame. Default: 255 (ground station).
    pub source_system: u8,
    /// Component id stamped on every encoded frame. Default: 0.
    pub source_component: u8,
    /// Strip trailing zero payload bytes before sending. Default: false.
    pub truncate_payload: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            source_system: 255,
            source_component: 0,
            truncate_payload: false,
        }
    }
}

/// Inbound filtering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Only accept frames from this system id. `None` or `Some(0)` accepts all.
    pub target_system: Option<u8>,
}

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub encoder: EncoderConfig,
    pub decoder: DecoderConfig,
    /// Diagnostic channel decode errors are pushed to.
    pub error_channel: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            decoder: DecoderConfig::default(),
            error_channel: DECODE_ERROR_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
