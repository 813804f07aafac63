use serde::Deserialize;

/// Controls how dialect definitions are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum bytes read from a dialect definition file.
    pub max_dialect_file_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_dialect_file_size: 4 * 1024 * 1024,
        }
    }
}
