//! Sensor Align CLI
//!
//! Aligns experiment recordings onto one wall-clock timeline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sensor_align::{
    batch::{run_batch, OUTPUT_FILE, REPORT_FILE},
    config::Config,
    core::{table::AlignedTable, timeline::Frequency},
    features::build_features,
    pipeline::preprocess_session,
    report::create_shared_log,
    VERSION,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensor-align")]
#[command(version = VERSION)]
#[command(about = "Align multi-sensor experiment recordings onto a wall-clock timeline", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess one session directory into an aligned, cleaned table
    Preprocess {
        /// Session directory (contains meta/time.csv and sensor CSVs)
        #[arg(long, short)]
        input: PathBuf,

        /// Output CSV path
        #[arg(long, short)]
        output: PathBuf,

        /// Timeline frequency, e.g. 1000ms, 2s, 1min
        #[arg(long, short)]
        frequency: Option<Frequency>,

        /// Also write a JSON run report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Add rolling and spectral features to a preprocessed table
    Features {
        /// Preprocessed CSV
        #[arg(long, short)]
        input: PathBuf,

        /// Output CSV path
        #[arg(long, short)]
        output: PathBuf,

        /// Frequency the input was preprocessed at
        #[arg(long, short)]
        frequency: Option<Frequency>,
    },

    /// Preprocess every session directory under a root
    Batch {
        /// Directory whose subdirectories are sessions
        #[arg(long, short)]
        input: PathBuf,

        /// Output directory; one subdirectory per session
        #[arg(long, short)]
        output: PathBuf,

        /// Worker threads
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Timeline frequency, e.g. 1000ms, 2s, 1min
        #[arg(long, short)]
        frequency: Option<Frequency>,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Preprocess {
            input,
            output,
            frequency,
            report,
        } => cmd_preprocess(&input, &output, frequency, report.as_deref()),
        Commands::Features {
            input,
            output,
            frequency,
        } => cmd_features(&input, &output, frequency),
        Commands::Batch {
            input,
            output,
            jobs,
            frequency,
        } => cmd_batch(&input, &output, jobs, frequency),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file and apply CLI overrides.
fn load_config(frequency: Option<Frequency>, jobs: Option<usize>) -> anyhow::Result<Config> {
    let mut config = Config::load().context("loading configuration")?;
    if let Some(frequency) = frequency {
        config.frequency = frequency;
    }
    if let Some(jobs) = jobs {
        config.jobs = jobs;
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn cmd_preprocess(
    input: &Path,
    output: &Path,
    frequency: Option<Frequency>,
    report: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(frequency, None)?;

    println!("Preprocessing {}", input.display());
    let session = preprocess_session(input, &config)
        .with_context(|| format!("preprocessing {}", input.display()))?;

    session
        .table
        .write_csv(output)
        .with_context(|| format!("writing {}", output.display()))?;
    if let Some(path) = report {
        session
            .report
            .save(path)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    println!(
        "Results saved to {} ({} rows)",
        output.display(),
        session.table.len()
    );
    Ok(())
}

fn cmd_features(input: &Path, output: &Path, frequency: Option<Frequency>) -> anyhow::Result<()> {
    let config = load_config(frequency, None)?;

    println!("Running feature engineering on {}", input.display());
    let table = AlignedTable::read_csv(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let features = build_features(table, &config.rolling_windows, config.frequency)
        .context("building features")?;
    features
        .write_csv(output)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Results saved to {} ({} rows, {} columns)",
        output.display(),
        features.len(),
        features.columns().len() + 1
    );
    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    jobs: Option<usize>,
    frequency: Option<Frequency>,
) -> anyhow::Result<()> {
    let config = load_config(frequency, jobs)?;
    let log = create_shared_log();

    let results = run_batch(input, output, &config, &log)
        .with_context(|| format!("scanning {}", input.display()))?;

    for result in &results {
        match &result.outcome {
            Ok(path) => println!("  ok      {}", path.display()),
            Err(e) => println!("  failed  {}: {e}", result.session.display()),
        }
    }
    println!();
    println!("{}", log.summary());
    println!("Each session writes {OUTPUT_FILE} and {REPORT_FILE}.");

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} sessions failed", results.len());
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", config.to_json()?);
    Ok(())
}
