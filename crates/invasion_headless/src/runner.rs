//! Single-battle runner: builds the game from a scenario, drives it to the
//! end and writes the console output and reports.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use invasion_core::error::GameError;
use invasion_core::game::{Game, Outcome};
use invasion_core::stats::BattleStatistics;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::console;
use crate::generator::RandomGenerator;
use crate::report;
use crate::scenario::{Scenario, ScenarioError};

/// Error type for a run.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The scenario could not be loaded.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// The game config was rejected.
    #[error(transparent)]
    Game(#[from] GameError),
    /// Console or report IO failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// How much the runner prints while the battle runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum RunMode {
    /// Print the battle state after every timestep.
    #[default]
    Interactive,
    /// Print a start and end banner only.
    Silent,
}

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Output mode.
    pub mode: RunMode,
    /// Seed for the game and the generator.
    pub seed: u64,
    /// Override for the minimum battle length.
    pub min_ticks: Option<u64>,
    /// Override for the maximum battle length.
    pub max_ticks: Option<u64>,
    /// Wait for Enter after each interactive timestep.
    pub pause: bool,
    /// Where to write the text report.
    pub report_path: Option<PathBuf>,
    /// Where to write the JSON statistics.
    pub json_path: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::Interactive,
            seed: 0,
            min_ticks: None,
            max_ticks: None,
            pause: true,
            report_path: None,
            json_path: None,
        }
    }
}

impl RunOptions {
    /// Silent run with the given seed.
    #[must_use]
    pub fn silent(seed: u64) -> Self {
        Self {
            mode: RunMode::Silent,
            seed,
            pause: false,
            ..Self::default()
        }
    }

    /// Set the report paths.
    #[must_use]
    pub fn with_reports(mut self, report: Option<PathBuf>, json: Option<PathBuf>) -> Self {
        self.report_path = report;
        self.json_path = json;
        self
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Battle result.
    pub outcome: Outcome,
    /// Timesteps played.
    pub timesteps: u64,
    /// Final state hash.
    pub state_hash: u64,
    /// Full statistics.
    pub statistics: BattleStatistics,
}

/// Create a game and its generator for `scenario`.
pub fn build_game(
    scenario: &Scenario,
    options: &RunOptions,
) -> Result<(Game, RandomGenerator), RunnerError> {
    let mut config = scenario.game_config(options.seed);
    if let Some(min) = options.min_ticks {
        config.min_timesteps = min;
    }
    if let Some(max) = options.max_ticks {
        config.max_timesteps = max;
        // a lone max override shortens the minimum with it
        if options.min_ticks.is_none() {
            config.min_timesteps = config.min_timesteps.min(max);
        }
    }
    let game = Game::new(config)?;
    let generator = RandomGenerator::new(scenario, options.seed);
    Ok((game, generator))
}

/// Run `scenario` to the end without any output.
pub fn simulate(scenario: &Scenario, options: &RunOptions) -> Result<Game, RunnerError> {
    let (mut game, mut generator) = build_game(scenario, options)?;
    game.run(&mut generator);
    Ok(game)
}

/// Run `scenario` to the end, printing to `out` and reading pauses from
/// `input`. Reports are written once the battle is over.
pub fn run<W: Write, R: BufRead>(
    scenario: &Scenario,
    options: &RunOptions,
    out: &mut W,
    input: &mut R,
) -> Result<RunSummary, RunnerError> {
    let (mut game, mut generator) = build_game(scenario, options)?;
    info!(seed = options.seed, mode = ?options.mode, "run starting");

    if options.mode == RunMode::Silent {
        console::render_silent_start(out)?;
    }

    while !game.is_over() {
        let events = game.step(&mut generator);
        if options.mode == RunMode::Interactive {
            console::render_tick(out, &game, &events)?;
            if options.pause {
                write!(out, "Press Enter to continue...")?;
                out.flush()?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    debug!("input closed, continuing without pauses");
                }
                writeln!(out)?;
            }
        }
    }

    let statistics = BattleStatistics::collect(&game);
    if let Some(path) = &options.report_path {
        report::save_report(path, &statistics)?;
        info!(path = %path.display(), "report written");
    }
    if let Some(path) = &options.json_path {
        report::save_json(path, &statistics)?;
        info!(path = %path.display(), "JSON statistics written");
    }

    if options.mode == RunMode::Silent {
        console::render_silent_end(out, options.report_path.is_some())?;
    } else {
        writeln!(out, "Battle result: {}", statistics.outcome.label())?;
    }

    let summary = RunSummary {
        outcome: statistics.outcome,
        timesteps: game.tick(),
        state_hash: game.state_hash(),
        statistics,
    };
    info!(
        timesteps = summary.timesteps,
        outcome = ?summary.outcome,
        "run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Scenario {
        Scenario {
            units_per_wave: 2,
            probability: 100,
            ..Scenario::default()
        }
    }

    fn quick(seed: u64) -> RunOptions {
        RunOptions {
            min_ticks: Some(5),
            max_ticks: Some(60),
            ..RunOptions::silent(seed)
        }
    }

    #[test]
    fn test_silent_run_prints_banners_only() {
        let mut out = Vec::new();
        let summary = run(&fast(), &quick(3), &mut out, &mut io::empty()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Silent Mode\nSimulation Starts...\nSimulation ends\n");
        assert!(summary.timesteps >= 5);
        assert!(summary.timesteps <= 60);
    }

    #[test]
    fn test_silent_run_mentions_written_report() {
        let dir = tempfile::tempdir().unwrap();
        let options = quick(3).with_reports(Some(dir.path().join("report.txt")), None);
        let mut out = Vec::new();
        run(&fast(), &options, &mut out, &mut io::empty()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Simulation ends, Output file is created\n"));
    }

    #[test]
    fn test_interactive_run_prints_every_tick() {
        let options = RunOptions {
            mode: RunMode::Interactive,
            pause: false,
            ..quick(3)
        };
        let mut out = Vec::new();
        let summary = run(&fast(), &options, &mut out, &mut io::empty()).unwrap();
        let text = String::from_utf8(out).unwrap();
        for tick in 1..=summary.timesteps {
            assert!(text.contains(&format!("Current Timestep {tick}\n")));
        }
        assert!(!text.contains("Press Enter"));
        assert!(text.ends_with(&format!("Battle result: {}\n", summary.outcome.label())));
    }

    #[test]
    fn test_pause_reads_input() {
        let options = RunOptions {
            mode: RunMode::Interactive,
            pause: true,
            max_ticks: Some(2),
            min_ticks: Some(1),
            ..quick(3)
        };
        let mut out = Vec::new();
        let mut input = io::Cursor::new("\n\n");
        run(&fast(), &options, &mut out, &mut input).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.matches("Press Enter to continue...").count() >= 1);
    }

    #[test]
    fn test_run_matches_simulate() {
        let summary = run(&fast(), &quick(12), &mut io::sink(), &mut io::empty()).unwrap();
        let game = simulate(&fast(), &quick(12)).unwrap();
        assert_eq!(summary.state_hash, game.state_hash());
        assert_eq!(summary.timesteps, game.tick());
    }

    #[test]
    fn test_invalid_tick_override_rejected() {
        let options = RunOptions {
            min_ticks: Some(50),
            max_ticks: Some(10),
            ..quick(1)
        };
        assert!(matches!(
            simulate(&fast(), &options),
            Err(RunnerError::Game(GameError::InvalidConfig(_)))
        ));
    }
}
