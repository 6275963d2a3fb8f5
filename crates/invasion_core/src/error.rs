//! Error types for the battle simulation.

use thiserror::Error;

use crate::factions::Faction;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the simulation core.
///
/// None of these abort a running simulation: callers recover at the call
/// site (skip the unit, report the config problem) and carry on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A configuration value is out of range.
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    /// The faction has created as many units as its id space allows.
    #[error("Unit cap reached for {0}")]
    UnitCapReached(Faction),
}
