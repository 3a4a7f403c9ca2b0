//! social-summary - average likes per platform, post type and date
//!
//! A CLI tool that reads a table of social media posts and writes
//! two summary tables: mean likes per (Platform, PostType) pair and
//! mean likes per calendar date, both rounded to two decimals.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, unreadable input, bad data or unwritable output

mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use dataset::{Dataset, LoadOptions};
use error::SummaryError;
use models::{RunMetadata, RunReport, SummaryRow, TableSummary};
use std::path::Path;
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("social-summary v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Summary failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .social-summary.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change file names, delimiters and rounding.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` wins over the flags when it is set. Logs go to stderr so the
/// previews on stdout stay clean.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete summary workflow.
fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate().map_err(anyhow::Error::msg)?;

    let options = RunOptions {
        dry_run: args.dry_run,
        show_preview: !args.quiet,
        show_progress: !args.quiet,
    };

    let run_report = summarize(&config, &options)?;

    if let Some(ref path) = args.report {
        report::write_json_report(&run_report, path)?;
        info!("Run report saved to {}", path.display());
    }

    if !args.quiet {
        println!("\n📊 Summary:");
        println!("   Rows read: {}", run_report.metadata.rows_read);
        for table in &run_report.tables {
            match table.path {
                Some(ref path) => println!("   {}: {} row(s) -> {}", table.name, table.rows, path),
                None => println!("   {}: {} row(s) (not written)", table.name, table.rows),
            }
        }
        println!("   Rounding: {}", run_report.metadata.rounding);
        println!("   Duration: {:.2}s", run_report.metadata.duration_seconds);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Per-run switches that are not part of the config file.
#[derive(Debug, Clone, Default)]
struct RunOptions {
    /// Compute and preview, but write nothing.
    dry_run: bool,
    /// Print a preview after each table.
    show_preview: bool,
    /// Show a spinner while loading.
    show_progress: bool,
}

/// Load the input table, then build, write and preview each summary in turn.
///
/// Tables are written as soon as they are computed, so a failure in a later
/// table leaves the earlier ones on disk.
fn summarize(config: &Config, options: &RunOptions) -> Result<RunReport> {
    let start_time = Instant::now();
    let rounding = config.aggregation.rounding;

    let load_options = LoadOptions {
        show_progress: options.show_progress,
        ..LoadOptions::from(&config.input)
    };
    let posts = Dataset::load(&config.input.path, &load_options)?;
    debug!("Input columns: {}", posts.headers.join(", "));

    if posts.is_empty() {
        warn!(
            "{} has no data rows; summaries will be header-only",
            posts.source.display()
        );
    }

    if config.output.age_group_summary.is_some() && !posts.has_age_group() {
        return Err(SummaryError::Schema {
            missing: vec![dataset::AGE_GROUP_COLUMN.to_string()],
        }
        .into());
    }

    let mut tables = Vec::new();

    let by_type = analysis::compute_platform_type_averages(&posts.records, rounding)
        .context("Could not compute averages by platform and post type")?;
    tables.push(emit(
        "platform_type",
        &by_type,
        &config.output.platform_summary,
        config,
        options,
    )?);

    let by_date = analysis::compute_date_averages(&posts.records, rounding)
        .context("Could not compute averages by date")?;
    tables.push(emit(
        "date",
        &by_date,
        &config.output.date_summary,
        config,
        options,
    )?);

    if let Some(ref path) = config.output.age_group_summary {
        let by_age = analysis::compute_age_group_spread(&posts.records, rounding)
            .context("Could not compute likes spread by age group")?;
        tables.push(emit("age_group", &by_age, path, config, options)?);
    }

    Ok(RunReport {
        metadata: RunMetadata {
            input: config.input.path.display().to_string(),
            rows_read: posts.len(),
            generated_at: Utc::now(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
            rounding,
            dry_run: options.dry_run,
        },
        tables,
    })
}

/// Write one table (unless dry-running) and print its preview.
fn emit<R: SummaryRow>(
    name: &str,
    rows: &[R],
    path: &Path,
    config: &Config,
    options: &RunOptions,
) -> Result<TableSummary> {
    let written = if options.dry_run {
        let contents = report::render_table(rows, config.output.delimiter_byte())?;
        debug!(
            "Dry run: not writing {}, contents would be:\n{}",
            path.display(),
            contents
        );
        None
    } else {
        report::write_table(rows, path, config.output.delimiter_byte())?;
        Some(path.display().to_string())
    };

    if options.show_preview {
        let preview = report::generate_preview(
            path,
            rows,
            config.general.preview_rows,
            config.general.preview_format,
        )?;
        println!("\n{}", preview);
    }

    Ok(TableSummary {
        name: name.to_string(),
        path: written,
        rows: rows.len(),
    })
}
