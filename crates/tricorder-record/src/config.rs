// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recorder configuration boundary.
//!
//! The recorder reads configuration through [`RecorderConfig`]; hosts
//! either implement it over their own settings system or deserialize a
//! [`RecorderSettings`].

use crate::sanitize::sanitize_file_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read-only view of recorder configuration.
pub trait RecorderConfig {
    /// Whether trace recording is enabled at all.
    fn enabled(&self) -> bool;
    /// Directory all output is rooted under (typically the project or
    /// test-results directory).
    fn base_directory(&self) -> &Path;
    /// Subdirectory for trace output, relative to the base directory.
    fn output_directory(&self) -> &Path;
    /// Configured output file name, before sanitization.
    fn output_file_name(&self) -> &str;
}

/// Configuration layer failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings text failed to parse.
    #[error("[CONFIG_PARSE] settings do not parse: {source}")]
    Parse {
        /// Underlying deserializer failure.
        #[from]
        source: serde_json::Error,
    },
}

/// Concrete, serializable recorder settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderSettings {
    /// Whether trace recording is enabled.
    pub enabled: bool,
    /// Directory all output is rooted under.
    pub base_directory: PathBuf,
    /// Subdirectory for trace output, relative to the base directory.
    pub output_directory: PathBuf,
    /// Output file name, sanitized before use.
    pub output_file_name: String,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_directory: PathBuf::from("."),
            output_directory: PathBuf::from("tricorder"),
            output_file_name: "trace.ndjson".to_string(),
        }
    }
}

impl RecorderSettings {
    /// Parses settings from their JSON form. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `raw` is not valid JSON for
    /// this shape.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies the `TRICORDER_TRACE` environment override: `0`, `false`,
    /// or `off` (case-insensitive) disables recording regardless of the
    /// configured value.
    pub fn apply_env_override(&mut self) {
        if let Some(raw) = std::env::var_os("TRICORDER_TRACE") {
            let raw = raw.to_string_lossy().to_ascii_lowercase();
            if matches!(raw.as_str(), "0" | "false" | "off") {
                self.enabled = false;
            }
        }
    }
}

impl RecorderConfig for RecorderSettings {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    fn output_file_name(&self) -> &str {
        &self.output_file_name
    }
}

/// Resolves the full destination path for a configuration:
/// `<base>/<output-dir>/<sanitized-file-name>`.
#[must_use]
pub fn destination_path(config: &dyn RecorderConfig) -> PathBuf {
    config
        .base_directory()
        .join(config.output_directory())
        .join(sanitize_file_name(config.output_file_name()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn defaults_are_enabled_and_relative() {
        let settings = RecorderSettings::default();
        assert!(settings.enabled);
        assert_eq!(
            destination_path(&settings),
            PathBuf::from("./tricorder/trace.ndjson")
        );
    }

    #[test]
    fn json_settings_fill_missing_fields_with_defaults() {
        let settings =
            RecorderSettings::from_json_str(r#"{"outputFileName":"run one.ndjson"}"#)
                .expect("parse");
        assert!(settings.enabled);
        assert_eq!(settings.output_file_name, "run one.ndjson");
    }

    #[test]
    fn destination_path_sanitizes_the_file_name() {
        let settings = RecorderSettings {
            output_file_name: "  trace?.ndjson  ".into(),
            ..RecorderSettings::default()
        };
        let path = destination_path(&settings);
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("trace.ndjson")
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RecorderSettings::from_json_str("{not json").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
