//! Configuration management for the merge and complexity tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (openapi-complexity.toml)
//! - Environment variables (OPENAPI_COMPLEXITY_*)
//!
//! ## Example config file (openapi-complexity.toml):
//! ```toml
//! [merge]
//! default_openapi_version = "3.0.3"
//! default_title = "Combined OpenAPI"
//! default_version = "0.0.0"
//!
//! [scoring.saturation]
//! operations = 200.0
//! schemas = 300.0
//!
//! [waveform]
//! property_names = ["samples", "waveform", "signal"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Merge defaults
    #[serde(default)]
    pub merge: MergeConfig,

    /// Score normalization constants
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Waveform advisory settings
    #[serde(default)]
    pub waveform: WaveformConfig,
}

/// Values inserted when the baseline document lacks them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// `openapi` version used when none is present
    #[serde(default = "default_openapi_version")]
    pub default_openapi_version: String,

    /// `info.title` used when `info` is missing
    #[serde(default = "default_title")]
    pub default_title: String,

    /// `info.version` used when `info` is missing
    #[serde(default = "default_version")]
    pub default_version: String,
}

/// Normalization constants for the complexity score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Counts normalized by `log10(1 + x) / log10(1 + k)`
    #[serde(default)]
    pub saturation: SaturationConfig,

    /// Counts normalized by `x / d`
    #[serde(default)]
    pub linear: LinearConfig,
}

/// Saturation points `k` for the log-scaled counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaturationConfig {
    #[serde(default = "default_operations_k")]
    pub operations: f64,
    #[serde(default = "default_paths_k")]
    pub paths: f64,
    #[serde(default = "default_schemas_k")]
    pub schemas: f64,
    #[serde(default = "default_refs_k")]
    pub refs: f64,
}

/// Denominators for the linearly scaled values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearConfig {
    #[serde(default = "default_avg_params")]
    pub avg_params: f64,
    #[serde(default = "default_max_params")]
    pub max_params: f64,
    #[serde(default = "default_depth")]
    pub depth: f64,
    #[serde(default = "default_cyclic")]
    pub cyclic: f64,
    #[serde(default = "default_union_branches")]
    pub union_branches: f64,
    #[serde(default = "default_all_of")]
    pub all_of: f64,
    #[serde(default = "default_discriminators")]
    pub discriminators: f64,
}

/// Waveform advisory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Property names (matched case-insensitively) treated as sample arrays
    #[serde(default = "default_property_names")]
    pub property_names: Vec<String>,
}

// Default value functions
fn default_openapi_version() -> String {
    "3.0.3".to_string()
}

fn default_title() -> String {
    "Combined OpenAPI".to_string()
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_operations_k() -> f64 {
    200.0
}

fn default_paths_k() -> f64 {
    150.0
}

fn default_schemas_k() -> f64 {
    300.0
}

fn default_refs_k() -> f64 {
    1000.0
}

fn default_avg_params() -> f64 {
    10.0
}

fn default_max_params() -> f64 {
    30.0
}

fn default_depth() -> f64 {
    10.0
}

fn default_cyclic() -> f64 {
    20.0
}

fn default_union_branches() -> f64 {
    50.0
}

fn default_all_of() -> f64 {
    50.0
}

fn default_discriminators() -> f64 {
    20.0
}

fn default_property_names() -> Vec<String> {
    [
        "samples",
        "sampledata",
        "sample_data",
        "waveform",
        "waveformdata",
        "waveform_data",
        "signal",
        "signaldata",
        "signal_data",
        "amplitudes",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_openapi_version: default_openapi_version(),
            default_title: default_title(),
            default_version: default_version(),
        }
    }
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            operations: default_operations_k(),
            paths: default_paths_k(),
            schemas: default_schemas_k(),
            refs: default_refs_k(),
        }
    }
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            avg_params: default_avg_params(),
            max_params: default_max_params(),
            depth: default_depth(),
            cyclic: default_cyclic(),
            union_branches: default_union_branches(),
            all_of: default_all_of(),
            discriminators: default_discriminators(),
        }
    }
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            property_names: default_property_names(),
        }
    }
}

impl WaveformConfig {
    /// Lowercased name set for matching
    pub fn name_set(&self) -> HashSet<String> {
        self.property_names.iter().map(|n| n.to_lowercase()).collect()
    }
}

impl AnalyzerConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file at `config_path` when given
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "openapi-complexity.toml",
            ".openapi-complexity.toml",
            "config/openapi-complexity.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "openapi", "openapi-complexity") {
            let platform_config = dirs.config_dir().join("openapi-complexity.toml");
            if platform_config.exists() {
                builder = builder.add_source(File::from(platform_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // OPENAPI_COMPLEXITY__SCORING__SATURATION__OPERATIONS=400
        builder = builder.add_source(
            Environment::with_prefix("OPENAPI_COMPLEXITY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.merge.default_openapi_version, "3.0.3");
        assert_eq!(config.scoring.saturation.refs, 1000.0);
        assert_eq!(config.scoring.linear.depth, 10.0);
        assert_eq!(config.waveform.property_names.len(), 10);
    }

    #[test]
    fn test_serialize_config() {
        let config = AnalyzerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[merge]"));
        assert!(toml_str.contains("[scoring.saturation]"));
        assert!(toml_str.contains("[waveform]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[merge]\ndefault_title = \"Gateway\"\n\n[scoring.linear]\ndepth = 20.0\n").unwrap();

        let config = AnalyzerConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.merge.default_title, "Gateway");
        assert_eq!(config.merge.default_version, "0.0.0");
        assert_eq!(config.scoring.linear.depth, 20.0);
        assert_eq!(config.scoring.linear.cyclic, 20.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = AnalyzerConfig::default();
        config.waveform.property_names = vec!["Trace".to_string()];
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = AnalyzerConfig::load_from(path.to_str()).unwrap();
        assert_eq!(loaded.waveform.property_names, vec!["Trace".to_string()]);
        assert!(loaded.waveform.name_set().contains("trace"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(AnalyzerConfig::load_from(Some("/nonexistent/openapi-complexity.toml")).is_err());
    }
}
