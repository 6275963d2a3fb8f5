//! # Invasion Core
//!
//! Deterministic battle simulation core for the Earth vs Alien invasion
//! simulator.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No system randomness (every RNG is seeded from [`game::GameConfig`])
//! - No floating-point math in combat (uses fixed-point)
//!
//! New units arrive through the [`game::UnitSource`] trait, so scenario
//! parsing, random generation and reporting all live in the headless crate.
//!
//! ## Crate Structure
//!
//! - [`containers`] - Queue, stack, priority queue, bag and deque
//! - [`unit`] - Units, kinds and their capability table
//! - [`pool`] - Unit arena, move-only handles and id allocation
//! - [`army`] - Per-faction rosters and selection disciplines
//! - [`battle`] - Combat resolution, healing and list ownership
//! - [`infection`] - Infection rolls and spread
//! - [`game`] - Timestep loop and termination
//! - [`stats`] - End-of-battle statistics
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod army;
pub mod battle;
pub mod containers;
pub mod error;
pub mod factions;
pub mod game;
pub mod infection;
pub mod math;
pub mod pool;
pub mod stats;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::army::{Army, Discipline};
    pub use crate::battle::{Battlefield, CombatRules};
    pub use crate::error::{GameError, Result};
    pub use crate::factions::{Faction, MAX_UNIT_CAP};
    pub use crate::game::{
        AttackRecord, Game, GameConfig, Outcome, SpawnContext, TickEvents, UnitSource,
    };
    pub use crate::math::Fixed;
    pub use crate::pool::{UnitHandle, UnitPool};
    pub use crate::stats::{BattleStatistics, FactionStats, KillRecord, KindStats};
    pub use crate::unit::{Unit, UnitId, UnitKind, UnitStats};
}
