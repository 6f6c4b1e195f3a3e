use clap::Parser;
use dashdata::config::{
    Config, DEFAULT_INPUT, DEFAULT_OUTPUT, ENV_INPUT, ENV_OUTPUT, ENV_REQUIRE, ENV_STRICT,
};
use dashdata::runner::{Progress, run_with_progress};
use dashdata::validation::RequiredFields;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

/// Convert the cohort CSV into the JSON array the dashboard loads.
#[derive(Parser, Debug)]
#[command(name = "dashdata", version, about)]
struct Args {
    /// Path to the cohort CSV (may be .gz, .zst, .bz2 or .xz compressed)
    #[arg(short, long, env = ENV_INPUT, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Path of the JSON array to write (overwritten if present)
    #[arg(short, long, env = ENV_OUTPUT, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Comma-separated fields that must be present and non-empty
    #[arg(long, env = ENV_REQUIRE, default_value = "age,sex,cogstat,uresidence")]
    require: RequiredFields,

    /// Abort on a row whose field count differs from the header
    #[arg(long, env = ENV_STRICT)]
    strict: bool,

    /// Also write a JSON run summary to this path
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Print row counts and stage timings after the run
    #[arg(long)]
    stats: bool,

    /// Quiet mode - only warnings and the final summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the quiet flag.
    let default_filter = if args.quiet {
        "dashdata=warn"
    } else {
        "dashdata=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::new(args.input, args.output)
        .with_required(args.require)
        .strict(args.strict);
    if let Some(path) = args.metrics {
        config = config.with_metrics_path(path);
    }

    let quiet = args.quiet;
    let report = run_with_progress(&config, |event| match event {
        Progress::Loading(path) if !quiet => println!("Loading data from {}...", path.display()),
        Progress::Loaded { retained } if !quiet => println!("Loaded {} records", retained),
        Progress::Saving(path) if !quiet => println!("Saving to {}...", path.display()),
        _ => {}
    })?;

    println!("Successfully converted {} records to JSON", report.rows);
    println!("File saved to: {}", report.output.display());

    if args.stats {
        report.metrics.print();
    }
    Ok(())
}
