//! Project-level configuration support
//!
//! Loads defaults from `mdl-explore.toml` in the working directory, or from
//! a file passed with `--config`.
//!
//! # Configuration Format
//!
//! ```toml
//! # mdl-explore.toml
//!
//! [data]
//! path = "mdl_exploration/data/mdl_data.csv"
//! placeholder = "-"
//!
//! [gtest]
//! top = 5
//! matches = 5
//! min_volume = 0
//!
//! [timeline]
//! top = 7
//!
//! [correlate]
//! top = 20
//! redundancy_threshold = 0.999
//!
//! [output]
//! format = "text"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILENAME: &str = "mdl-explore.toml";
pub const DEFAULT_DATA_PATH: &str = "mdl_exploration/data/mdl_data.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub gtest: GTestDefaults,
    #[serde(default)]
    pub timeline: TimelineDefaults,
    #[serde(default)]
    pub correlate: CorrelateDefaults,
    #[serde(default)]
    pub output: OutputDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset path
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Value that marks a field as unknown (default "-")
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GTestDefaults {
    /// Row categories to show
    #[serde(default)]
    pub top: Option<usize>,

    /// Column categories kept in the table
    #[serde(default)]
    pub matches: Option<usize>,

    /// Minimum total occurrences for a row category
    #[serde(default)]
    pub min_volume: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDefaults {
    #[serde(default)]
    pub top: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelateDefaults {
    #[serde(default)]
    pub top: Option<usize>,

    /// |r| at or above this marks two columns as duplicates of each other
    #[serde(default)]
    pub redundancy_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// Default output format (text, json, markdown)
    #[serde(default)]
    pub format: Option<String>,
}

impl ExploreConfig {
    pub fn data_path(&self) -> PathBuf {
        self.data
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
    }

    pub fn placeholder(&self) -> &str {
        self.data.placeholder.as_deref().unwrap_or("-")
    }

    pub fn gtest_top(&self) -> usize {
        self.gtest.top.unwrap_or(5)
    }

    pub fn gtest_matches(&self) -> usize {
        self.gtest.matches.unwrap_or(5)
    }

    pub fn gtest_min_volume(&self) -> u64 {
        self.gtest.min_volume.unwrap_or(0)
    }

    pub fn timeline_top(&self) -> usize {
        self.timeline.top.unwrap_or(7)
    }

    pub fn correlate_top(&self) -> usize {
        self.correlate.top.unwrap_or(20)
    }

    pub fn redundancy_threshold(&self) -> f64 {
        self.correlate.redundancy_threshold.unwrap_or(0.999)
    }

    pub fn output_format(&self) -> &str {
        self.output.format.as_deref().unwrap_or("text")
    }
}

/// Load configuration.
///
/// An explicit path must exist and parse. Without one, `mdl-explore.toml`
/// in `dir` is used when present; a broken auto-discovered file is reported
/// and ignored.
pub fn load_project_config(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<ExploreConfig> {
    if let Some(path) = explicit {
        let config = load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    let toml_path = dir.join(CONFIG_FILENAME);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded config from {}", toml_path.display());
                return Ok(config);
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    Ok(ExploreConfig::default())
}

fn load_toml_config(path: &Path) -> anyhow::Result<ExploreConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ExploreConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Example file written by `mdl-explore init`.
pub const EXAMPLE_CONFIG: &str = r#"# mdl-explore configuration

[data]
# Path to the Malware Domain List CSV export
path = "mdl_exploration/data/mdl_data.csv"
# Fields equal to this value are treated as unknown and the row is dropped
placeholder = "-"

[gtest]
# Row categories to show
top = 5
# Column categories kept per table
matches = 5
# Minimum total occurrences for a row category to be ranked
min_volume = 0

[timeline]
# Descriptions plotted over time
top = 7

[correlate]
# Descriptions included in the correlation matrix
top = 20
# |r| at or above this flags two numeric columns as duplicates
redundancy_threshold = 0.999

[output]
# text, json or markdown
format = "text"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExploreConfig::default();
        assert_eq!(config.data_path(), PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.placeholder(), "-");
        assert_eq!(config.gtest_top(), 5);
        assert_eq!(config.gtest_matches(), 5);
        assert_eq!(config.gtest_min_volume(), 0);
        assert_eq!(config.timeline_top(), 7);
        assert_eq!(config.correlate_top(), 20);
        assert_eq!(config.output_format(), "text");
    }

    #[test]
    fn test_example_config_parses() {
        let config: ExploreConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.gtest.top, Some(5));
        assert_eq!(config.correlate.redundancy_threshold, Some(0.999));
        assert_eq!(config.placeholder(), "-");
    }

    #[test]
    fn test_partial_config() {
        let config: ExploreConfig = toml::from_str("[gtest]\nmin_volume = 500\n").unwrap();
        assert_eq!(config.gtest_min_volume(), 500);
        assert_eq!(config.gtest_top(), 5);
        assert!(config.data.path.is_none());
    }

    #[test]
    fn test_load_from_dir_and_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_project_config(None, dir.path()).unwrap();
        assert_eq!(config, ExploreConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILENAME), "[timeline]\ntop = 3\n").unwrap();
        let config = load_project_config(None, dir.path()).unwrap();
        assert_eq!(config.timeline_top(), 3);

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[timeline\n").unwrap();
        assert!(load_project_config(Some(&broken), dir.path()).is_err());
    }

    #[test]
    fn test_broken_discovered_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "not = [valid").unwrap();
        let config = load_project_config(None, dir.path()).unwrap();
        assert_eq!(config, ExploreConfig::default());
    }
}
