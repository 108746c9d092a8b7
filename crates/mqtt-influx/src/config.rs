// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration.

use crate::error::ParserError;
use crate::numeric::NumericMode;
use crate::payload::PayloadMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),
}

/// Message parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Payload interpretation mode.
    #[serde(default)]
    pub mode: PayloadMode,

    /// Field holding the raw payload in `static` mode.
    #[serde(default = "default_static_field")]
    pub static_field: String,

    /// Field holding non-numeric payloads in `auto` mode.
    #[serde(default = "default_text_field")]
    pub text_field: String,

    /// Field holding numeric payloads in `auto` mode.
    #[serde(default = "default_numeric_field")]
    pub numeric_field: String,

    /// Numeric classification policy for `auto` mode.
    #[serde(default)]
    pub numeric_parser_mode: NumericMode,
}

fn default_static_field() -> String {
    "payload".to_string()
}

fn default_text_field() -> String {
    "text".to_string()
}

fn default_numeric_field() -> String {
    "value".to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: PayloadMode::default(),
            static_field: default_static_field(),
            text_field: default_text_field(),
            numeric_field: default_numeric_field(),
            numeric_parser_mode: NumericMode::default(),
        }
    }
}

impl ParserConfig {
    /// Set the payload mode.
    pub fn mode(mut self, mode: PayloadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the numeric classification policy.
    pub fn numeric_parser_mode(mut self, mode: NumericMode) -> Self {
        self.numeric_parser_mode = mode;
        self
    }

    /// Validate field names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("static_field", &self.static_field),
            ("text_field", &self.text_field),
            ("numeric_field", &self.numeric_field),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

/// Line protocol output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Number of lines to batch before flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Flush interval in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

fn default_batch_size() -> usize {
    1000
}

fn default_flush_interval_ms() -> u64 {
    1000
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

/// Top-level bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bridge name (for identification).
    #[serde(default = "default_bridge_name")]
    pub name: String,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Statistics reporting interval (seconds, 0 disables).
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// Message parser settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_bridge_name() -> String {
    "mqtt-influx".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stats_interval() -> u64 {
    10
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: default_bridge_name(),
            log_level: default_log_level(),
            stats_interval_secs: default_stats_interval(),
            parser: ParserConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parser.validate()?;
        if self.output.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be greater than 0".into()));
        }
        Ok(())
    }
}
