//! Configuration module for mdl-explore
//!
//! This module handles:
//! - Project-level configuration (mdl-explore.toml)
//! - Defaults for the ranking, timeline and correlation commands

mod project_config;

pub use project_config::{
    load_project_config, CorrelateDefaults, DataConfig, ExploreConfig, GTestDefaults,
    OutputDefaults, TimelineDefaults, CONFIG_FILENAME, DEFAULT_DATA_PATH, EXAMPLE_CONFIG,
};
