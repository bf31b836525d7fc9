use std::{fs, path::Path};

use serde::Deserialize;

use crate::ident::DEFAULT_TAG_LENGTH;

/// Top-level configuration for the duplicator.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub message: MessageConfig,
}

/// Mail transport invocation configuration.
#[derive(Debug, Deserialize)]
pub struct TransportConfig {
    /// Sendmail-compatible command to invoke once per copy.
    #[serde(default = "default_command")]
    pub command: String,

    /// Fixed arguments placed before the envelope addressing.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
        }
    }
}

/// Copy generation configuration.
#[derive(Debug, Deserialize)]
pub struct MessageConfig {
    /// Domain stamped into generated Message-ID values. Defaults to the
    /// local hostname when unset.
    #[serde(default)]
    pub domain: Option<String>,

    /// Length of the random subject tag.
    #[serde(default = "default_tag_length")]
    pub tag_length: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            domain: None,
            tag_length: default_tag_length(),
        }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading the file.
    Io(std::io::Error),
    /// A parse error occurred deserializing TOML.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "Config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_command() -> String {
    "/usr/sbin/sendmail".to_string()
}

// -i keeps a lone dot on a line from terminating sendmail's input
fn default_args() -> Vec<String> {
    vec!["-i".to_string()]
}

fn default_tag_length() -> usize {
    DEFAULT_TAG_LENGTH
}
