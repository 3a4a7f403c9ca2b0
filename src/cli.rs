//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{PreviewFormat, RoundingMode};
use clap::Parser;
use std::path::PathBuf;

/// social-summary - average likes per platform, post type and day
///
/// Reads a table of social media posts and writes two summaries: the mean
/// number of likes per (Platform, PostType) pair and per calendar date of
/// PostTimestamp. Values are rounded to two decimals.
///
/// Examples:
///   social-summary
///   social-summary --input posts.csv --rounding half-up
///   social-summary --age-group-output socialMediaAgeGroup.csv --report run.json
///   social-summary --dry-run --preview-format json
///   social-summary --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Posts table to read [default: socialMedia.csv]
    ///
    /// Needs a header row with at least Platform, PostType, Likes and
    /// PostTimestamp columns.
    #[arg(short, long, value_name = "FILE", env = "SOCIAL_SUMMARY_INPUT")]
    pub input: Option<PathBuf>,

    /// Where to write average likes per platform and post type
    /// [default: socialMediaAvg.csv]
    #[arg(long, value_name = "FILE")]
    pub platform_output: Option<PathBuf>,

    /// Where to write average likes per date [default: socialMediaTime.csv]
    #[arg(long, value_name = "FILE")]
    pub date_output: Option<PathBuf>,

    /// Also write the likes spread (min, quartiles, max) per AgeGroup
    #[arg(long, value_name = "FILE")]
    pub age_group_output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .social-summary.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Field delimiter for input and output tables [default: ,]
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// How ties are rounded to two decimals [default: half-even]
    #[arg(long, value_name = "MODE")]
    pub rounding: Option<RoundingMode>,

    /// Rows shown in each console preview [default: 5]
    #[arg(long, value_name = "COUNT")]
    pub preview_rows: Option<usize>,

    /// Console preview format [default: markdown]
    #[arg(long, value_name = "FORMAT")]
    pub preview_format: Option<PreviewFormat>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Compute and preview the summaries without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no previews)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .social-summary.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.preview_rows == Some(0) {
            return Err("Preview rows must be at least 1".to_string());
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
