// src/config.rs

//! Defines the configuration structures for `canvas-core`.
//!
//! Every struct is `#[serde(default)]`, so a configuration file only needs to
//! name the settings it changes. The process-wide `CONFIG` is read once from
//! the JSON file named by `CANVAS_CORE_CONFIG`, falling back to defaults.

use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "CANVAS_CORE_CONFIG";

/// Process-wide configuration, loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match std::env::var_os(CONFIG_ENV_VAR) {
    Some(path) => Config::load_or_default(Path::new(&path)),
    None => Config::default(),
});

// --- Top-Level Configuration Structure ---

/// Root of the configuration tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Metrics for the headless glyph driver.
    pub text: TextConfig,
    /// Output format defaults for the CLI.
    pub export: ExportConfig,
    /// Logger defaults for the CLI.
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Config> {
        serde_json::from_str(json).context("Failed to parse configuration JSON")
    }

    /// Reads `path`; any failure is logged and the defaults are used instead.
    pub fn load_or_default(path: &Path) -> Config {
        let loaded = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))
            .and_then(|json| Config::from_json_str(&json));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                Config::default()
            }
        }
    }
}

// --- Text Configuration ---

/// Glyph metrics used by `HeadlessFontDriver`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Horizontal advance per character, as a fraction of the font size.
    pub advance_ratio: f32,
    /// Line height, as a multiple of the font size.
    pub line_spacing: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            advance_ratio: 0.6,
            line_spacing: 1.2,
        }
    }
}

// --- Export Configuration ---

/// Flat raster formats the CLI can write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Ppm,
    Pgm,
    Pbm,
}

impl ExportFormat {
    /// Format implied by a file extension, if any.
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "ppm" => Some(ExportFormat::Ppm),
            "pgm" => Some(ExportFormat::Pgm),
            "pbm" => Some(ExportFormat::Pbm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Used when the output path has no recognised extension.
    pub format: ExportFormat,
    /// Pretty-print project JSON.
    pub pretty_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: ExportFormat::Png,
            pretty_json: true,
        }
    }
}

// --- Logging Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter applied when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            default_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(r#"{ "export": { "format": "ppm" } }"#).unwrap();
        assert_eq!(config.export.format, ExportFormat::Ppm);
        assert!(config.export.pretty_json);
        assert_eq!(config.text, TextConfig::default());
        assert_eq!(config.logging.default_filter, "info");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Config::from_json_str("{ nope").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default(Path::new("/definitely/not/here.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_export_format_from_extension() {
        assert_eq!(ExportFormat::from_extension("PGM"), Some(ExportFormat::Pgm));
        assert_eq!(ExportFormat::from_extension("tiff"), None);
    }
}
