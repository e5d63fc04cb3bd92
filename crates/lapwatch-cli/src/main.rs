//! lapwatch demo runner
//!
//! Runs a small timed workload against the global registry and prints the
//! raw totals, averages and laps as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lapwatch_core::{RegistryConfig, SharedRegistry, TimeUnit, init_global, time_scope};
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "lapwatch")]
#[command(about = "Named stopwatch registry with laps and averages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Time a nested sleep workload and print the results
    Demo {
        /// Number of inner iterations
        #[arg(short, long, default_value = "5")]
        iterations: u32,

        /// Delay of the slowest iteration in milliseconds
        #[arg(short, long, default_value = "50")]
        max_delay_ms: u64,

        /// Output unit (s, ms, us); overrides configuration
        #[arg(short, long)]
        unit: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting lapwatch");

    match cli.command {
        Command::Demo { iterations, max_delay_ms, unit } => {
            let mut config = RegistryConfig::load()?;
            if let Some(unit) = unit {
                config.multiplier = TimeUnit::parse(&unit)?.multiplier();
            }
            let registry = init_global(config).context("Failed to set up timing registry")?;
            run_demo(&registry, iterations, max_delay_ms)
        }
        Command::Config => {
            let config = RegistryConfig::load()?;
            println!("{}", config.description());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose { "lapwatch=debug,lapwatch_core=debug" } else { "lapwatch=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_demo(registry: &SharedRegistry, iterations: u32, max_delay_ms: u64) -> anyhow::Result<()> {
    let iterations = iterations.max(1);
    info!(iterations, max_delay_ms, "Running demo workload");

    registry.start("demo")?;

    for i in 1..=iterations {
        let delay = Duration::from_millis(max_delay_ms * u64::from(i) / u64::from(iterations));

        registry.start("demo.iteration")?;
        sleep(delay);
        registry.stop("demo.iteration");

        let checkpoint = format!("demo.after_{i}");
        let elapsed = registry.lap("demo", Some(&checkpoint))?;
        debug!(iteration = i, elapsed, "Checkpoint recorded");
    }

    {
        time_scope!(registry, "demo.teardown");
        sleep(Duration::from_millis(max_delay_ms / 10));
    }

    let totals = registry.stop_and_show();
    let report = serde_json::json!({
        "unit": registry.config().unit().map(TimeUnit::suffix).unwrap_or("custom"),
        "totals": totals,
        "averages": registry.all_average_lap_times(),
        "laps": registry.laps("demo")?,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
