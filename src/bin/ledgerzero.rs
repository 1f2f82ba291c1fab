use clap::{Parser, ValueEnum};
use ledgerzero::{ExtractorBuilder, LedgerZeroError, OutputFormat, SheetSelector};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Extract processed and errored journal entry lines from "Create Accounting" reports.
#[derive(Debug, Parser)]
#[command(name = "ledgerzero", version, about)]
struct Args {
    /// Report workbooks to read
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (only valid with a single input)
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for output files. Defaults to the directory of each input.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Name of the sheet holding the report
    #[arg(long, default_value = ledgerzero::DEFAULT_SHEET_NAME)]
    sheet: String,

    /// Zero-based index of the sheet holding the report (overrides --sheet)
    #[arg(long, conflicts_with = "sheet")]
    sheet_index: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Xlsx)]
    format: FormatArg,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xlsx,
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level);
    debug!("Log level set to {}", args.log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one input failed.
fn main_inner(args: Args) -> Result<bool, LedgerZeroError> {
    trace!("{args:?}");

    if args.output.is_some() && args.inputs.len() > 1 {
        return Err(LedgerZeroError::Config(
            "--output can only be used with a single input; use --output-dir instead".to_string(),
        ));
    }

    let selector = match args.sheet_index {
        Some(index) => SheetSelector::Index(index),
        None => SheetSelector::Name(args.sheet.clone()),
    };
    let format = OutputFormat::from(args.format);
    let extractor = ExtractorBuilder::new()
        .with_sheet_selector(selector)
        .with_output_format(format)
        .build()?;

    let jobs: Vec<(PathBuf, PathBuf)> = args
        .inputs
        .iter()
        .map(|input| {
            let output = match &args.output {
                Some(output) => output.clone(),
                None => default_output_path(input, args.output_dir.as_deref(), format),
            };
            (input.clone(), output)
        })
        .collect();
    check_unique_outputs(&jobs)?;

    let results = extractor.convert_files(&jobs);

    let mut all_ok = true;
    for ((input, output), result) in jobs.iter().zip(results) {
        match result {
            Ok(summary) => info!(
                "{} -> {}: {} processed, {} errored",
                input.display(),
                output.display(),
                summary.processed_lines,
                summary.errored_lines
            ),
            Err(e) => {
                all_ok = false;
                error!("Failed to process {}: {e}", input.display());
            }
        }
    }

    Ok(all_ok)
}

/// `Processed_<input stem>.<ext>`, next to the input unless a directory is given.
fn default_output_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let file_name = format!("Processed_{}.{}", stem, format.extension());

    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}

/// Rejects job lists where two inputs would write the same output file.
fn check_unique_outputs(jobs: &[(PathBuf, PathBuf)]) -> Result<(), LedgerZeroError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for (input, output) in jobs {
        if let Some(previous) = seen.insert(output.as_path(), input.as_path()) {
            return Err(LedgerZeroError::Config(format!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                output.display()
            )));
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only this crate logs, at the requested level.
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
