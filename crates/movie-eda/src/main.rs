//! CLI entry point for the movie analysis pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use movie_eda::{
    ChartDataExporter, EdaConfig, EdaPipeline, EdaReport, EdaResult, ReportWriter, describe_table,
};
use std::sync::Arc;
use tracing::{error, info};

/// Line terminator of the input file.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEol {
    /// Records end with `\n`
    Lf,
    /// Records end with `\r\n`; read with `\n` as terminator
    Crlf,
    /// Records end with `\r`
    Cr,
}

impl CliEol {
    fn as_byte(self) -> u8 {
        match self {
            CliEol::Lf | CliEol::Crlf => b'\n',
            CliEol::Cr => b'\r',
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis of a movie dataset",
    long_about = "Cleans a movie table, derives features, prints descriptive statistics \
                  and IQR outlier bounds, and exports the cleaned table plus chart data.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  movie-eda -i mymoviedb.csv\n\n  \
                  # Semicolon-separated input with a custom output directory\n  \
                  movie-eda -i movies.csv --separator ';' -o results/\n\n  \
                  # Preview without writing any files\n  \
                  movie-eda -i mymoviedb.csv --dry-run"
)]
struct Args {
    /// Path to the delimited movie file
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned table, chart data and reports
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Output file name for the cleaned table (without extension)
    #[arg(long, default_value = "movies_cleaned")]
    output_name: String,

    /// Field separator (single ASCII character)
    #[arg(long, default_value = ",")]
    separator: char,

    /// Line terminator of the input file
    #[arg(long, value_enum, default_value = "lf")]
    eol: CliEol,

    /// IQR multiplier for the popularity outlier interval
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Value written into missing Overview and Poster_Url fields
    #[arg(long, default_value = "Not Available")]
    placeholder: String,

    /// Fail instead of creating a missing output directory
    #[arg(long)]
    no_create_dir: bool,

    /// Skip writing chart data
    #[arg(long)]
    no_charts: bool,

    /// Number of histogram bins in the chart data
    #[arg(long, default_value = "20")]
    histogram_bins: usize,

    /// Load, clean, derive and report without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.separator.is_ascii() {
        return Err(anyhow!(
            "Separator must be a single ASCII character, got {:?}",
            args.separator
        ));
    }

    let config = EdaConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output_dir)
        .output_name(&args.output_name)
        .separator(args.separator as u8)
        .eol_char(args.eol.as_byte())
        .iqr_multiplier(args.iqr_multiplier)
        .placeholder(&args.placeholder)
        .histogram_bins(args.histogram_bins)
        .create_output_dir(!args.no_create_dir)
        .save_to_disk(!args.dry_run)
        .build()?;

    let pipeline = build_pipeline(&args, &config)?;

    info!("{}", "=".repeat(80));
    info!("Starting movie analysis...");
    info!("{}", "=".repeat(80));

    let result = pipeline.run().map_err(|e| {
        error!("Analysis failed: {}", e);
        anyhow!("Analysis failed [{}]: {}", e.error_code(), e)
    })?;

    handle_pipeline_output(&result, &config, &args)
}

fn build_pipeline(args: &Args, config: &EdaConfig) -> Result<EdaPipeline> {
    let mut builder = EdaPipeline::builder().config(config.clone());

    if !args.no_charts && !args.dry_run {
        let exporter = ChartDataExporter::new(&config.output_dir)
            .bins(config.histogram_bins)
            .create_dirs(config.create_output_dir);
        builder = builder.chart_renderer(Arc::new(exporter));
    }

    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn handle_pipeline_output(result: &EdaResult, config: &EdaConfig, args: &Args) -> Result<()> {
    let report = EdaReport::from_result(config, result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report && !args.dry_run {
        let report_path =
            ReportWriter::new(&config.output_dir).write_report(&report, &config.input_stem())?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(result, &report, config, args);
    Ok(())
}

/// Print a human-readable summary of the analysis.
///
/// Uses `println!` so the summary stays visible regardless of log level.
fn print_human_readable_summary(
    result: &EdaResult,
    report: &EdaReport,
    config: &EdaConfig,
    args: &Args,
) {
    println!();
    println!("{}", "=".repeat(80));
    if args.dry_run {
        println!("DRY RUN - no files were written");
    } else {
        println!("ANALYSIS COMPLETE");
    }
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, report.rows.loaded, report.columns_loaded
    );
    match &report.output_file {
        Some(output_file) => println!(
            "Output: {} ({} rows x {} columns)",
            output_file, report.rows.after_dedup, report.columns_final
        ),
        None => println!(
            "Output: {} (not written)",
            config.output_path().display()
        ),
    }
    println!();

    println!("Cleaning:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Missing values: {} across {} columns",
        result.cleaning.total_nulls(),
        report.null_audit.iter().filter(|n| n.null_count > 0).count()
    );
    println!(
        "  Rows: {} -> {} after dates -> {} after duplicates",
        report.rows.loaded, report.rows.after_date_drop, report.rows.after_dedup
    );
    for action in report.cleaning_actions.iter().take(6) {
        println!("  - {}", action);
    }
    println!();

    println!("Numeric statistics:");
    print!("{}", describe_table(&report.numeric_statistics));
    println!();
    println!("Feature statistics:");
    print!("{}", describe_table(&report.feature_statistics));
    println!();

    println!("Most voted:");
    for movie in &report.top_voted {
        println!(
            "  {} ({} votes, average {})",
            truncate_str(&movie.title, 60),
            movie.vote_count,
            movie
                .vote_average
                .map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
        );
    }
    println!();

    let outliers = &report.outliers;
    println!("Outliers ({}, k = {}):", outliers.column, outliers.multiplier);
    match &outliers.bounds {
        Some(bounds) => {
            println!(
                "  Q1 = {:.3}, Q3 = {:.3}, IQR = {:.3}",
                bounds.q1, bounds.q3, bounds.iqr
            );
            println!(
                "  Accepted [{:.3}, {:.3}]: {} kept, {} excluded",
                bounds.lower, bounds.upper, outliers.rows_kept, outliers.rows_excluded
            );
        }
        None => println!(
            "  No values to filter: {} kept, {} excluded",
            outliers.rows_kept, outliers.rows_excluded
        ),
    }
    println!();

    println!("Top genres:");
    for freq in report.genre_frequencies.iter().take(10) {
        println!("  {:<20} {}", truncate_str(&freq.genre, 19), freq.count);
    }
    if report.genre_frequencies.len() > 10 {
        println!("  ... and {} more", report.genre_frequencies.len() - 10);
    }
    println!();

    if !report.chart_artifacts.is_empty() {
        println!("Chart artifacts:");
        for artifact in &report.chart_artifacts {
            println!("  - {}", artifact);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
    if args.dry_run {
        println!("To write the cleaned table and chart data, run without --dry-run");
    } else if !args.emit_report {
        println!("Add --emit-report to save a detailed JSON report");
    }
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length (in characters) with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
