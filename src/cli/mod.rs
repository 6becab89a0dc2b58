//! CLI command definitions and handlers

mod clean;
mod correlate;
mod gtest;
mod init;
mod summary;
mod timeline;

use crate::config::{load_project_config, ExploreConfig};
use crate::dataset::{self, CleanOptions, CleaningReport, Dataset, IngestStats};
use crate::models::Report;
use crate::reporters::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Parse a strictly positive count
fn parse_positive(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Split a comma-separated series list, dropping empty entries
fn parse_series(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// mdl-explore - G-test exploration of the Malware Domain List
#[derive(Parser, Debug)]
#[command(name = "mdl-explore")]
#[command(
    version,
    about = "Explore the Malware Domain List export: clean it, rank associations with the G-test, chart monthly volume",
    after_help = "\
Examples:
  mdl-explore summary                                  Cleaning report and column overview
  mdl-explore gtest description asn                    Descriptions most tied to specific ASNs
  mdl-explore gtest description asn --reverse --top 7 --min-volume 500 --matches 15
  mdl-explore gtest domain asn --filter 'description=trojan banker'
  mdl-explore timeline --format markdown               Monthly volume of the top descriptions
  mdl-explore correlate --series 'zeus v1 trojan,zeus v2 trojan'"
)]
pub struct Cli {
    /// Dataset CSV (default: from mdl-explore.toml, else mdl_exploration/data/mdl_data.csv)
    #[arg(long, short = 'd', global = true, env = "MDL_EXPLORE_DATA")]
    pub data: Option<PathBuf>,

    /// Config file (default: ./mdl-explore.toml when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Output format: text, json, markdown (or md)
    #[arg(long, short = 'f', global = true, value_parser = ["text", "json", "markdown", "md"])]
    pub format: Option<String>,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cleaning report, per-column summaries and duplicated columns
    Summary {
        /// Number of most frequent descriptions to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Rank ROW_COLUMN categories by G-test association with COL_COLUMN
    #[command(after_help = "\
Columns: date, domain, ip, reverse, description, registrant, asn, inactive, country

Filters:
  column=value     exact match (value is trimmed and lowercased)
  column~regex     case-insensitive regex match

Examples:
  mdl-explore gtest description asn --top 5 --matches 5
  mdl-explore gtest description domain
  mdl-explore gtest description asn --reverse --top 7 --min-volume 500 --matches 15")]
    Gtest {
        /// Column whose categories are ranked
        row_column: String,

        /// Column the ranked categories are compared across
        col_column: String,

        /// Row categories to return
        #[arg(long, short = 'n', value_parser = parse_positive)]
        top: Option<usize>,

        /// Column categories kept in the occurrence table
        #[arg(long, short = 'm', value_parser = parse_positive)]
        matches: Option<usize>,

        /// Lowest scores first (categories that follow the overall distribution)
        #[arg(long)]
        reverse: bool,

        /// Minimum total occurrences for a category to be ranked
        #[arg(long)]
        min_volume: Option<u64>,

        /// Keep only rows matching EXPR (repeatable, combined with AND)
        #[arg(long = "filter", value_name = "EXPR")]
        filters: Vec<String>,
    },

    /// Monthly record volume for the most common descriptions
    Timeline {
        /// Number of descriptions to chart
        #[arg(long, short = 'n', value_parser = parse_positive)]
        top: Option<usize>,

        /// Explicit descriptions (comma separated) instead of the top N
        #[arg(long, value_delimiter = ',')]
        series: Vec<String>,
    },

    /// Correlation matrix of monthly volumes between descriptions
    Correlate {
        /// Number of descriptions to correlate
        #[arg(long, short = 'n', value_parser = parse_positive)]
        top: Option<usize>,

        /// Explicit descriptions (comma separated) instead of the top N
        #[arg(long, value_delimiter = ',')]
        series: Vec<String>,
    },

    /// Write the cleaned dataset as CSV
    Clean {
        /// Destination file
        #[arg(long)]
        out: PathBuf,
    },

    /// Write an example mdl-explore.toml in the current directory
    Init,

    /// Show version information
    Version,
}

/// Resolved settings shared by every command
pub(crate) struct Session {
    pub config: ExploreConfig,
    pub data: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl Session {
    fn new(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let config = load_project_config(cli.config.as_deref(), &cwd)?;

        let data = cli.data.clone().unwrap_or_else(|| config.data_path());
        let format_name = cli
            .format
            .clone()
            .unwrap_or_else(|| config.output_format().to_string());
        let format = OutputFormat::from_str(&format_name)?;

        debug!(
            "Session: data={} format={} output={:?}",
            data.display(),
            format,
            cli.output
        );
        Ok(Self {
            config,
            data,
            format,
            output: cli.output.clone(),
        })
    }

    /// Read and clean the dataset
    pub fn load(&self) -> Result<(Dataset, IngestStats, CleaningReport)> {
        let opts = CleanOptions {
            placeholder: self.config.placeholder().to_string(),
        };
        let loaded = dataset::load(&self.data, &opts)
            .with_context(|| format!("Failed to load dataset {}", self.data.display()))?;
        Ok(loaded)
    }

    /// Render a report to stdout or the output file
    pub fn emit(&self, report: &Report) -> Result<()> {
        match &self.output {
            Some(path) => {
                console::set_colors_enabled(false);
                let rendered = reporters::report_with_format(report, self.format)?;
                write_output(path, &rendered)?;
                eprintln!(
                    "{} Wrote {} to {}",
                    style("✓").green(),
                    report.title(),
                    style(path.display()).cyan()
                );
            }
            None => {
                let rendered = reporters::report_with_format(report, self.format)?;
                print!("{}", rendered);
                if !rendered.ends_with('\n') {
                    println!();
                }
            }
        }
        Ok(())
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Version => {
            println!("mdl-explore {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Init => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            return init::run(&cwd);
        }
        _ => {}
    }

    let session = Session::new(&cli)?;
    match cli.command {
        Commands::Summary { top } => summary::run(&session, top),

        Commands::Gtest {
            row_column,
            col_column,
            top,
            matches,
            reverse,
            min_volume,
            filters,
        } => gtest::run(
            &session,
            &row_column,
            &col_column,
            gtest::Limits {
                top: top.unwrap_or_else(|| session.config.gtest_top()),
                matches: matches.unwrap_or_else(|| session.config.gtest_matches()),
                reverse,
                min_volume: min_volume.unwrap_or_else(|| session.config.gtest_min_volume()),
            },
            &filters,
        ),

        Commands::Timeline { top, series } => timeline::run(
            &session,
            top.unwrap_or_else(|| session.config.timeline_top()),
            &parse_series(&series),
        ),

        Commands::Correlate { top, series } => correlate::run(
            &session,
            top.unwrap_or_else(|| session.config.correlate_top()),
            &parse_series(&series),
        ),

        Commands::Clean { out } => clean::run(&session, &out),

        Commands::Version | Commands::Init => Ok(()),
    }
}
