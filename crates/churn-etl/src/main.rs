//! CLI entry point for the telco churn ETL workflow.

use anyhow::Result;
use churn_etl::{
    AnalysisOutcome, EtlError, Pipeline, PipelineConfig, RunSummary, TableStore, TransformSummary,
};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[cfg(feature = "supabase")]
use churn_etl::{StoreConfig, store::SupabaseStore};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Telco customer churn ETL workflow",
    long_about = "Extracts the telco churn CSV, transforms it into a staged table, loads it \
                  into a hosted table store, then validates and analyzes the loaded table.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  SUPABASE_URL    Base URL of the Supabase project (load, validate, analyze, run)\n  \
                  SUPABASE_KEY    API key for the project\n\n\
                  EXAMPLES:\n  \
                  # Full workflow\n  \
                  churn-etl run --source WA_Fn-UseC_-Telco-Customer-Churn.csv\n\n  \
                  # Only rebuild the staged table\n  \
                  churn-etl transform --data-dir ./data"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Vendor CSV to extract
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Root of the raw, staged and processed directories
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Table name in the hosted store
    #[arg(long, global = true)]
    table: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Only show warnings, errors and the final result
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Copy the source CSV into raw staging
    Extract,
    /// Clean and derive the staged table from the raw copy
    Transform,
    /// Insert the staged table into the hosted store
    Load,
    /// Compare the loaded table with the staged file
    Validate,
    /// Summarize the loaded table and render charts
    Analyze,
    /// Run every stage in order
    Run,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Load environment variables from .env file
    dotenv().ok();

    init_logging(&args.log_level, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error [{}]: {:#}", error_code(&e), e);
            if e.downcast_ref::<EtlError>().is_some_and(EtlError::is_store_error) {
                eprintln!("Check SUPABASE_URL, SUPABASE_KEY and that the table exists");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    info!("Using data directory: {}", args.data_dir.display());

    match args.command {
        Command::Extract => {
            let outcome = churn_etl::Extractor::extract(
                &config.source_file,
                &config.raw_dir,
                &config.raw_file_name,
            )?;
            println!(
                "Extracted {} bytes to {}",
                outcome.bytes_copied,
                outcome.raw_path.display()
            );
        }
        Command::Transform => {
            let summary = churn_etl::Transformer::transform_file(&config.raw_path(), &config.staged_path())?;
            print_transform(&summary, &config);
        }
        Command::Load => {
            let outcome = build_pipeline(config)?.load()?;
            println!("Loaded {} rows into '{}'", outcome.rows_written, outcome.table);
        }
        Command::Validate => {
            let report = build_pipeline(config)?.validate()?;
            println!("{}", report);
        }
        Command::Analyze => {
            let outcome = build_pipeline(config)?.analyze()?;
            print_analysis(&outcome);
        }
        Command::Run => {
            let summary = build_pipeline(config)?.run()?;
            print_run(&summary);
        }
    }

    Ok(())
}

/// Code printed next to a failure; `ERROR` for errors from outside the library.
fn error_code(e: &anyhow::Error) -> &'static str {
    e.downcast_ref::<EtlError>()
        .map(EtlError::error_code)
        .unwrap_or("ERROR")
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder().data_dir(&args.data_dir);

    if let Some(ref source) = args.source {
        builder = builder.source_file(source);
    }
    if let Some(ref table) = args.table {
        builder = builder.table_name(table);
    }

    Ok(builder.build()?)
}

fn build_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    Ok(Pipeline::builder()
        .config(config)
        .store(open_store()?)
        .build()?)
}

#[cfg(feature = "supabase")]
fn open_store() -> Result<Arc<dyn TableStore>> {
    let store = SupabaseStore::new(StoreConfig::from_env()?)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "supabase"))]
fn open_store() -> Result<Arc<dyn TableStore>> {
    Err(EtlError::Configuration(
        "This build has no table store; rebuild with the 'supabase' feature".to_string(),
    )
    .into())
}

/// Print the transform result.
///
/// Uses `println!` for user-facing output that should show regardless of
/// the log level.
fn print_transform(summary: &TransformSummary, config: &PipelineConfig) {
    println!(
        "Staged {} rows x {} columns to {}",
        summary.rows_out,
        summary.columns_out,
        config.staged_path().display()
    );
    for step in &summary.processing_steps {
        println!("  - {}", step);
    }
}

fn print_analysis(outcome: &AnalysisOutcome) {
    println!("\nANALYSIS SUMMARY");
    println!("{}", "-".repeat(40));
    for (metric, value) in outcome.summary.to_metric_rows() {
        println!("  {:<55} {}", metric, value);
    }
    println!("\nSummary saved to {}", outcome.summary_path.display());
    for chart in &outcome.charts {
        println!("Chart saved to {}", chart.display());
    }
}

fn print_run(summary: &RunSummary) {
    println!("\n{}", "=".repeat(60));
    println!("ETL RUN COMPLETE ({} ms)", summary.duration_ms);
    println!("{}", "=".repeat(60));
    println!(
        "Extracted {} bytes, staged {} rows, loaded {} rows into '{}'",
        summary.extract.bytes_copied,
        summary.transform.rows_out,
        summary.load.rows_written,
        summary.load.table
    );

    match &summary.validation {
        Some(report) => println!("\n{}", report),
        None => println!("\nValidation did not run; see the log for details"),
    }

    print_analysis(&summary.analysis);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_of_library_errors() {
        let e: anyhow::Error = EtlError::Configuration("Missing SUPABASE_URL".to_string()).into();
        assert_eq!(error_code(&e), "CONFIGURATION_ERROR");

        let e = anyhow::anyhow!("something else");
        assert_eq!(error_code(&e), "ERROR");
    }

    #[cfg(not(feature = "supabase"))]
    #[test]
    fn test_open_store_without_backend_is_configuration_error() {
        let e = open_store().err().unwrap();
        assert_eq!(error_code(&e), "CONFIGURATION_ERROR");
    }
}
