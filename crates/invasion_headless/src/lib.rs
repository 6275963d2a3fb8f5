//! Headless runner for the invasion battle simulator.
//!
//! This crate wraps the deterministic core with everything that touches the
//! outside world:
//!
//! - **Scenarios**: text or RON files with the generation parameters
//! - **Random generation**: a seeded [`generator::RandomGenerator`] unit source
//! - **Console output**: per-timestep printout in interactive mode
//! - **Reports**: fixed-width text and JSON statistics
//! - **Batches**: many seeds in parallel, plus determinism checks
//!
//! # Example
//!
//! ```bash
//! # Watch a battle step by step
//! cargo run -p invasion_headless -- run --scenario scenarios/skirmish.txt
//!
//! # Silent run with a report
//! cargo run -p invasion_headless -- run --scenario scenarios/skirmish.txt \
//!     --mode silent --output report.txt --json report.json
//!
//! # Run a batch of seeds
//! cargo run -p invasion_headless -- batch --scenario scenarios/outbreak.ron --count 500
//!
//! # Verify determinism
//! cargo run -p invasion_headless -- verify --scenario scenarios/skirmish.txt --seed 7
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod console;
pub mod generator;
pub mod report;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, BatchSummary};
pub use generator::RandomGenerator;
pub use runner::{run, simulate, RunMode, RunOptions, RunSummary, RunnerError};
pub use scenario::{Scenario, ScenarioError};
