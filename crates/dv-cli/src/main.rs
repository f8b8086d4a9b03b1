//! Data Validator CLI
//!
//! Command-line tool for reconciling paired columns of a CSV table and
//! exporting the mismatches.

use clap::{Parser, Subcommand, ValueEnum};
use dv_core::{parse_csv, run as run_validation, ColumnPair, RunConfig, ValidationReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dv-cli")]
#[command(about = "Type-aware validation of paired table columns", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the columns of a CSV file and preview its data rows
    Columns {
        /// Path to CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Record holding the column names (0-based)
        #[arg(long, default_value_t = 0)]
        header_row: usize,

        /// Number of data rows to preview
        #[arg(short, long, default_value_t = 8)]
        limit: usize,
    },

    /// Compare column pairs cell by cell and report mismatches
    Validate {
        /// Run configuration (JSON); flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to CSV file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Record holding the column names (0-based)
        #[arg(long)]
        header_row: Option<usize>,

        /// Column pair to compare, as LEFT=RIGHT (repeatable)
        #[arg(short, long)]
        pair: Vec<ColumnPair>,

        /// First data row to check
        #[arg(long)]
        start: Option<usize>,

        /// Last data row to check, inclusive
        #[arg(long)]
        end: Option<usize>,

        /// Absolute tolerance for numeric comparisons
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Minimum similarity ratio for fuzzy text matches
        #[arg(long)]
        fuzzy: Option<f64>,

        /// Write mismatches to this file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for --output
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Create a run configuration template
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,

        /// Source CSV file to reference
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Column pairs to include, as LEFT=RIGHT
        #[arg(short, long)]
        pair: Vec<ColumnPair>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

struct ValidateArgs {
    config: Option<PathBuf>,
    file: Option<PathBuf>,
    header_row: Option<usize>,
    pairs: Vec<ColumnPair>,
    start: Option<usize>,
    end: Option<usize>,
    tolerance: Option<f64>,
    fuzzy: Option<f64>,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

fn run(command: Commands) -> dv_core::Result<()> {
    match command {
        Commands::Columns {
            file,
            header_row,
            limit,
        } => cmd_columns(&file, header_row, limit),
        Commands::Validate {
            config,
            file,
            header_row,
            pair,
            start,
            end,
            tolerance,
            fuzzy,
            output,
            format,
        } => {
            let args = ValidateArgs {
                config,
                file,
                header_row,
                pairs: pair,
                start,
                end,
                tolerance,
                fuzzy,
            };
            cmd_validate(args, output.as_deref(), format)
        }
        Commands::CreateConfig { output, file, pair } => cmd_create_config(&output, file, pair),
    }
}

fn cmd_columns(file: &Path, header_row: usize, limit: usize) -> dv_core::Result<()> {
    let table = parse_csv(file, header_row)?;

    println!("File: {}", file.display());
    println!("Header row: {}", header_row);
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    for column in &table.columns {
        println!("  {:>3}  {}", column.index, column.name);
    }
    println!();

    // Print header
    let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    println!("row\t{}", header.join("\t"));
    println!("{}", "-".repeat((header.len() + 1) * 12));

    for (i, row) in table.rows.iter().take(limit).enumerate() {
        let values: Vec<String> = row.cells.iter().map(|c| c.to_string_value()).collect();
        println!("{}\t{}", i, values.join("\t"));
    }

    if table.row_count() > limit {
        println!("... ({} more rows)", table.row_count() - limit);
    }

    Ok(())
}

/// Merge the optional config file with command-line overrides
fn resolve_config(args: ValidateArgs) -> dv_core::Result<RunConfig> {
    let mut config = match (&args.config, &args.file) {
        (Some(path), _) => RunConfig::load(path)?,
        (None, Some(file)) => RunConfig::new(file),
        (None, None) => {
            return Err(dv_core::Error::MissingInput(
                "--file or --config".to_string(),
            ))
        }
    };

    if let Some(file) = args.file {
        config.file = file;
    }
    if let Some(header_row) = args.header_row {
        config.header_row = header_row;
    }
    if !args.pairs.is_empty() {
        config.pairs = args.pairs;
    }
    if args.start.is_some() {
        config.start_row = args.start;
    }
    if args.end.is_some() {
        config.end_row = args.end;
    }
    if let Some(numeric) = args.tolerance {
        config.tolerance.numeric = numeric;
    }
    if let Some(fuzzy) = args.fuzzy {
        config.tolerance.fuzzy_threshold = fuzzy;
    }

    if config.pairs.is_empty() {
        return Err(dv_core::Error::MissingInput(
            "at least one --pair LEFT=RIGHT".to_string(),
        ));
    }

    Ok(config)
}

fn cmd_validate(args: ValidateArgs, output: Option<&Path>, format: Format) -> dv_core::Result<()> {
    let config = resolve_config(args)?;
    config.tolerance.validate()?;
    debug!(file = %config.file.display(), pairs = config.pairs.len(), "resolved run config");

    let table = parse_csv(&config.file, config.header_row)?;
    let report = run_validation(&table, &config)?;

    let summary = report.summary();
    println!("Validation summary");
    println!("  Total checks: {}", summary.total_checks);
    println!("  Mismatches:   {}", summary.mismatches);

    if report.is_clean() {
        println!();
        println!("All values match.");
        return Ok(());
    }

    match output {
        Some(path) => {
            write_report(&report, path, format)?;
            println!();
            println!("Wrote {} mismatches to {}", report.mismatch_count(), path.display());
        }
        None => print_mismatches(&report),
    }

    Ok(())
}

fn write_report(report: &ValidationReport, path: &Path, format: Format) -> dv_core::Result<()> {
    match format {
        Format::Csv => dv_core::write_csv_file(&report.mismatches, path),
        Format::Json => {
            fs::write(path, dv_core::to_json(report)?)?;
            Ok(())
        }
    }
}

fn print_mismatches(report: &ValidationReport) {
    println!();
    println!("row\tleft_column\tright_column\tleft_value\tright_value\treason");
    println!("{}", "-".repeat(72));
    for m in &report.mismatches {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            m.row, m.left_column, m.right_column, m.left_value, m.right_value, m.reason
        );
    }
}

fn cmd_create_config(
    output: &Path,
    file: Option<PathBuf>,
    pairs: Vec<ColumnPair>,
) -> dv_core::Result<()> {
    let mut config = RunConfig::new(file.unwrap_or_else(|| PathBuf::from("data.csv")));
    config.pairs = pairs;

    // If no pairs provided, add a placeholder
    if config.pairs.is_empty() {
        config.add_pair(ColumnPair::new("LeftColumn", "RightColumn"));
    }

    config.save(output)?;
    println!("Created run config: {}", output.display());
    println!("Source: {}", config.file.display());
    println!("Pairs: {}", config.pairs.len());
    println!();
    println!("Edit the file to map your columns, then run:");
    println!("  dv-cli validate --config {}", output.display());

    Ok(())
}
