//! Configuration management for sloth-comments
//!
//! Settings load from environment variables with defaults; CLI flags override
//! them afterwards.
//!
//! # Environment Variables
//!
//! - `SLOTH_COMMENTS_SENTINEL`: Tag prefix word after `@` - default: "sloth"
//! - `SLOTH_COMMENTS_LANGUAGE`: Source language (go|rust|python|wasm) - default: "go"
//! - `SLOTH_COMMENTS_FORMATS`: Comma-separated output formats - default: "prometheus/v1"
//! - `SLOTH_COMMENTS_MAX_DEPTH`: Directory depth limit - default: unlimited
//! - `SLOTH_COMMENTS_EXCLUDE`: Comma-separated exclude globs - default: none
//!
//! Logging variables (`SLOTH_COMMENTS_LOG_LEVEL`, `SLOTH_COMMENTS_LOG_JSON`) belong
//! to [`crate::util::logging`] and are not read here.
//!
//! # Example
//!
//! ```no_run
//! use sloth_comments::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_env().expect("invalid environment");
//! config.validate().expect("invalid configuration");
//! ```

use crate::languages::{SourceLanguage, DEFAULT_SENTINEL};
use crate::output::SpecFormat;
use std::env;
use std::fmt;
use thiserror::Error;

const MAX_DEPTH_LIMIT: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Word following `@` that marks a tag
    pub sentinel: String,

    pub language: SourceLanguage,

    /// Output formats, in emission order
    pub formats: Vec<SpecFormat>,

    pub max_depth: Option<usize>,

    pub exclude: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            language: SourceLanguage::Go,
            formats: vec![SpecFormat::PrometheusV1],
            max_depth: None,
            exclude: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Loads `SLOTH_COMMENTS_*` variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(sentinel) = non_empty_var("SLOTH_COMMENTS_SENTINEL") {
            config.sentinel = sentinel;
        }

        if let Some(language) = non_empty_var("SLOTH_COMMENTS_LANGUAGE") {
            config.language = language
                .parse::<SourceLanguage>()
                .map_err(ConfigError::InvalidLanguage)?;
        }

        if let Some(formats) = non_empty_var("SLOTH_COMMENTS_FORMATS") {
            config.formats = split_list(&formats)
                .map(|f| f.parse::<SpecFormat>().map_err(ConfigError::InvalidFormat))
                .collect::<Result<Vec<_>, _>>()?;
        }

        if let Some(depth) = non_empty_var("SLOTH_COMMENTS_MAX_DEPTH") {
            let depth = depth
                .parse::<usize>()
                .map_err(|e| ConfigError::ParseError {
                    field: "SLOTH_COMMENTS_MAX_DEPTH".to_string(),
                    error: e.to_string(),
                })?;
            config.max_depth = Some(depth);
        }

        if let Some(exclude) = non_empty_var("SLOTH_COMMENTS_EXCLUDE") {
            config.exclude = split_list(&exclude).map(str::to_string).collect();
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sentinel.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Sentinel cannot be empty".to_string(),
            ));
        }
        if self
            .sentinel
            .chars()
            .any(|c| c.is_whitespace() || c == '@' || c == '.')
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Sentinel '{}' may not contain whitespace, '@' or '.'",
                self.sentinel
            )));
        }

        if self.formats.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one output format is required".to_string(),
            ));
        }

        if let Some(depth) = self.max_depth {
            if depth == 0 || depth > MAX_DEPTH_LIMIT {
                return Err(ConfigError::ValidationFailed(format!(
                    "Max depth must be between 1 and {}",
                    MAX_DEPTH_LIMIT
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sloth-comments Configuration:")?;
        writeln!(f, "  Sentinel: @{}", self.sentinel)?;
        writeln!(f, "  Language: {}", self.language)?;
        let formats: Vec<&str> = self.formats.iter().map(|f| f.id()).collect();
        writeln!(f, "  Formats: {}", formats.join(", "))?;
        match self.max_depth {
            Some(depth) => writeln!(f, "  Max Depth: {}", depth)?,
            None => writeln!(f, "  Max Depth: unlimited")?,
        }
        if !self.exclude.is_empty() {
            writeln!(f, "  Exclude: {}", self.exclude.join(", "))?;
        }
        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
