//! mdl-explore - Malware Domain List exploration
//!
//! Loads the Malware Domain List CSV export, cleans it, and ranks how
//! strongly one categorical column is associated with another using the
//! G-test. Also builds monthly volume pivots and correlation matrices.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod models;
pub mod reporters;
pub mod stats;

pub use dataset::{Column, Dataset, DatasetError, Record};
pub use stats::{GTest, GTestRanking, RankOptions, StatsError};
