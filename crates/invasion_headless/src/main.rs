//! Invasion battle simulator.
//!
//! # Usage
//!
//! ```bash
//! # Interactive run, one timestep per Enter
//! cargo run -p invasion_headless -- run --scenario scenarios/skirmish.txt
//!
//! # Silent run writing both reports
//! cargo run -p invasion_headless -- run --scenario scenarios/skirmish.txt \
//!     --mode silent --output report.txt --json report.json
//!
//! # Batch of seeds in parallel
//! cargo run -p invasion_headless -- batch --scenario scenarios/outbreak.ron --count 1000
//!
//! # Check a scenario file
//! cargo run -p invasion_headless -- validate scenarios/skirmish.txt
//! ```
//!
//! Battle output goes to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invasion_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{run, RunMode, RunOptions},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "invasion")]
#[command(about = "Earth vs alien invasion battle simulator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle
    Run {
        /// Scenario file (text, or RON with a .ron extension)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Print every timestep or only banners
        #[arg(short, long, value_enum, default_value = "interactive")]
        mode: RunMode,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Minimum battle length in timesteps
        #[arg(long)]
        min_ticks: Option<u64>,

        /// Maximum battle length in timesteps
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Text report path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON statistics path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Do not wait for Enter between timesteps
        #[arg(long)]
        no_pause: bool,
    },

    /// Run many seeds of a scenario in parallel
    Batch {
        /// Scenario file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum battle length in timesteps
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Output file for results
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },

    /// Verify that a seed always produces the same battle
    Verify {
        /// Scenario file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Seed to test
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs to compare
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Maximum battle length in timesteps
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Parse and validate a scenario file
    Validate {
        /// Scenario file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            mode,
            seed,
            min_ticks,
            max_ticks,
            output,
            json,
            no_pause,
        } => {
            let options = RunOptions {
                mode,
                seed,
                min_ticks,
                max_ticks,
                pause: !no_pause,
                report_path: output,
                json_path: json,
            };
            cmd_run(&scenario, &options)
        }
        Commands::Batch {
            scenario,
            count,
            seed,
            max_ticks,
            output,
        } => cmd_batch(&scenario, count, seed, max_ticks, &output),
        Commands::Verify {
            scenario,
            seed,
            runs,
            max_ticks,
        } => cmd_verify(&scenario, seed, runs, max_ticks),
        Commands::Validate { file } => cmd_validate(&file),
    }
}

fn load(path: &Path) -> Option<Scenario> {
    match Scenario::load(path) {
        Ok(scenario) => Some(scenario),
        Err(e) => {
            eprintln!("{e}");
            None
        }
    }
}

fn cmd_run(scenario: &Path, options: &RunOptions) -> ExitCode {
    let Some(scenario) = load(scenario) else {
        return ExitCode::FAILURE;
    };

    let stdout = std::io::stdout();
    let stdin = std::io::stdin();
    match run(&scenario, options, &mut stdout.lock(), &mut stdin.lock()) {
        Ok(summary) => {
            if !summary.statistics.capped.is_empty() {
                tracing::warn!(
                    factions = ?summary.statistics.capped,
                    "unit cap reached during the battle"
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Run failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_batch(
    scenario: &Path,
    count: u32,
    seed: u64,
    max_ticks: Option<u64>,
    output: &Path,
) -> ExitCode {
    let Some(scenario) = load(scenario) else {
        return ExitCode::FAILURE;
    };

    let mut config = BatchConfig::new(count).with_seed(seed);
    config.max_ticks = max_ticks;
    let results = run_batch(&scenario, config);

    let summary = &results.summary;
    eprintln!("Battles:       {}", summary.games);
    eprintln!("Earth wins:    {}", summary.earth_wins);
    eprintln!("Alien wins:    {}", summary.alien_wins);
    eprintln!("Draws:         {}", summary.draws);
    eprintln!("Avg timesteps: {:.1}", summary.average_timesteps);

    if let Err(e) = results.save(output) {
        eprintln!("Failed to save results: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("Results saved to {}", output.display());

    if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_verify(scenario: &Path, seed: u64, runs: u32, max_ticks: Option<u64>) -> ExitCode {
    let Some(scenario) = load(scenario) else {
        return ExitCode::FAILURE;
    };

    tracing::info!("Verifying determinism: seed {} ({} runs)", seed, runs);

    match verify_determinism(&scenario, seed, runs, max_ticks) {
        Ok(report) if report.is_deterministic() => {
            eprintln!("PASS: All {runs} runs produced identical results");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            eprintln!("FAIL: Non-determinism detected! hashes: {:?}", report.hashes);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Run failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(file: &Path) -> ExitCode {
    let Some(scenario) = load(file) else {
        return ExitCode::FAILURE;
    };
    eprintln!("OK: {}", file.display());
    eprintln!("  Units per wave: {}", scenario.units_per_wave);
    eprintln!("  Spawn probability: {}%", scenario.probability);
    eprintln!(
        "  Allied ranges: {}",
        if scenario.allied.is_some() { "given" } else { "from Earth" }
    );
    eprintln!(
        "  Infection: {}% per hit, allies at {}%",
        scenario.infection_probability, scenario.infection_threshold
    );
    ExitCode::SUCCESS
}
