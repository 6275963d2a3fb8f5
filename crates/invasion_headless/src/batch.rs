//! Batch runner for many seeds of one scenario.
//!
//! Battles are independent, so they run in parallel using rayon. Each one
//! stays on a single thread.

use std::path::Path;
use std::time::Instant;

use invasion_core::factions::Faction;
use invasion_core::game::{Game, Outcome};
use invasion_core::stats::BattleStatistics;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::runner::{simulate, RunOptions, RunnerError};
use crate::scenario::Scenario;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of battles to run
    pub game_count: u32,
    /// Seed of the first battle; battle `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Override for the maximum battle length
    pub max_ticks: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            max_ticks: None,
        }
    }
}

impl BatchConfig {
    /// Create a config for `game_count` battles.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Self::default()
        }
    }

    /// Set the starting seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the maximum battle length.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

/// Result of one battle in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Seed used
    pub seed: u64,
    /// Battle result
    pub outcome: Outcome,
    /// Timesteps played
    pub timesteps: u64,
    /// Final state hash
    pub state_hash: u64,
    /// Earth units destroyed, in percent
    pub earth_destroyed_percent: f64,
    /// Alien units destroyed, in percent
    pub alien_destroyed_percent: f64,
    /// Whether any saver unit joined the battle
    pub allies_called: bool,
}

/// Aggregate over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Battles completed
    pub games: usize,
    /// Battles Earth won
    pub earth_wins: usize,
    /// Battles the aliens won
    pub alien_wins: usize,
    /// Drawn battles
    pub draws: usize,
    /// Mean battle length
    pub average_timesteps: f64,
}

impl BatchSummary {
    /// Summarize `games`.
    #[must_use]
    pub fn from_games(games: &[GameRecord]) -> Self {
        let count = |outcome| games.iter().filter(|g| g.outcome == outcome).count();
        let average_timesteps = if games.is_empty() {
            0.0
        } else {
            games.iter().map(|g| g.timesteps as f64).sum::<f64>() / games.len() as f64
        };
        Self {
            games: games.len(),
            earth_wins: count(Outcome::EarthWins),
            alien_wins: count(Outcome::AlienWins),
            draws: count(Outcome::Drawn),
            average_timesteps,
        }
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Results from a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual battles, in seed order
    pub games: Vec<GameRecord>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

fn destroyed_percent(stats: &BattleStatistics, faction: Faction) -> f64 {
    stats.faction(faction).map_or(0.0, |f| f.destroyed_percent)
}

fn run_single_game(
    scenario: &Scenario,
    seed: u64,
    config: &BatchConfig,
) -> Result<GameRecord, String> {
    let options = RunOptions {
        max_ticks: config.max_ticks,
        ..RunOptions::silent(seed)
    };
    let game = simulate(scenario, &options).map_err(|e| e.to_string())?;
    let stats = BattleStatistics::collect(&game);
    let allies_called = game.pool().iter().any(|u| u.faction() == Faction::EarthAllied);
    Ok(GameRecord {
        seed,
        outcome: stats.outcome,
        timesteps: game.tick(),
        state_hash: game.state_hash(),
        earth_destroyed_percent: destroyed_percent(&stats, Faction::Earth),
        alien_destroyed_percent: destroyed_percent(&stats, Faction::Alien),
        allies_called,
    })
}

/// Run a batch of battles
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        "Starting batch run: {} battles from seed {}",
        config.game_count, config.seed_start
    );

    let results: Vec<Result<GameRecord, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match run_single_game(scenario, seed, &config) {
                Ok(record) => {
                    debug!(seed, outcome = ?record.outcome, "battle finished");
                    Ok(record)
                }
                Err(message) => {
                    warn!("Battle with seed {} failed: {}", seed, message);
                    Err(BatchError { seed, message })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameRecord> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} battles in {:.1}s ({} errors)",
        games.len(),
        duration_seconds,
        errors.len()
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismReport {
    /// Seed checked
    pub seed: u64,
    /// Final state hash of each run
    pub hashes: Vec<u64>,
    /// Timesteps of each run
    pub timesteps: Vec<u64>,
}

impl DeterminismReport {
    /// Whether every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
            && self.timesteps.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run the same seed `runs` times in parallel and compare final states.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    runs: u32,
    max_ticks: Option<u64>,
) -> Result<DeterminismReport, RunnerError> {
    let options = RunOptions {
        max_ticks,
        ..RunOptions::silent(seed)
    };
    let games = (0..runs)
        .into_par_iter()
        .map(|_| simulate(scenario, &options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DeterminismReport {
        seed,
        hashes: games.iter().map(Game::state_hash).collect(),
        timesteps: games.iter().map(Game::tick).collect(),
    })
}
