//! Test fixtures and helpers.
//!
//! Scripted unit sources and pre-built games for consistent testing.

use std::collections::BTreeMap;

use fixed::types::I32F32;
use invasion_core::game::{Game, GameConfig, SpawnContext, UnitSource};
use invasion_core::unit::{UnitKind, UnitStats};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Stats with attack capacity 1.
#[must_use]
pub const fn stats(kind: UnitKind, health: i32, power: i32) -> UnitStats {
    UnitStats::new(kind, health, power, 1)
}

/// Unit source that replays a fixed schedule.
///
/// Timesteps without an entry produce nothing. Units in the `every_tick`
/// list are produced every timestep, after the scheduled ones.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    schedule: BTreeMap<u64, Vec<UnitStats>>,
    every_tick: Vec<UnitStats>,
    allied: Vec<UnitStats>,
}

impl ScriptedSource {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce `units` at timestep `tick`.
    #[must_use]
    pub fn at(mut self, tick: u64, units: impl IntoIterator<Item = UnitStats>) -> Self {
        self.schedule.entry(tick).or_default().extend(units);
        self
    }

    /// Produce `units` every timestep.
    #[must_use]
    pub fn every_tick(mut self, units: impl IntoIterator<Item = UnitStats>) -> Self {
        self.every_tick.extend(units);
        self
    }

    /// Produce `units` every timestep while the allies are called.
    #[must_use]
    pub fn allied(mut self, units: impl IntoIterator<Item = UnitStats>) -> Self {
        self.allied.extend(units);
        self
    }
}

impl UnitSource for ScriptedSource {
    fn generate(&mut self, ctx: &SpawnContext) -> Vec<UnitStats> {
        let mut units = self.schedule.get(&ctx.tick).cloned().unwrap_or_default();
        units.extend(self.every_tick.iter().copied());
        if ctx.allies_called {
            units.extend(self.allied.iter().copied());
        }
        units
    }
}

/// Config with short battles, for tests.
#[must_use]
pub fn quick_config(seed: u64) -> GameConfig {
    GameConfig {
        seed,
        min_timesteps: 5,
        max_timesteps: 500,
        ..GameConfig::default()
    }
}

/// A game with `units` already filed at timestep 0.
///
/// # Panics
///
/// Panics if the config is invalid or a unit exceeds the cap.
#[must_use]
pub fn game_with(config: GameConfig, units: &[UnitStats]) -> Game {
    let mut game = Game::new(config).expect("valid test config");
    for &unit in units {
        game.add_unit(unit).expect("unit within cap");
    }
    game
}

/// Both armies with every kind, capacity 2.
#[must_use]
pub fn mixed_armies() -> Vec<UnitStats> {
    let mut units = Vec::new();
    for kind in [
        UnitKind::EarthSoldier,
        UnitKind::EarthTank,
        UnitKind::EarthGunner,
        UnitKind::AlienSoldier,
        UnitKind::AlienMonster,
        UnitKind::AlienDrone,
    ] {
        for n in 0..3 {
            units.push(UnitStats::new(kind, 40 + n * 20, 20 + n * 5, 2));
        }
    }
    units.push(UnitStats::new(UnitKind::EarthHealer, 60, 30, 2));
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_schedule() {
        let mut source = ScriptedSource::new()
            .at(2, [stats(UnitKind::EarthTank, 50, 5)])
            .every_tick([stats(UnitKind::AlienSoldier, 50, 5)])
            .allied([stats(UnitKind::SaverUnit, 50, 5)]);

        let quiet = SpawnContext {
            tick: 1,
            allies_called: false,
        };
        assert_eq!(source.generate(&quiet).len(), 1);

        let busy = SpawnContext {
            tick: 2,
            allies_called: true,
        };
        let kinds: Vec<_> = source.generate(&busy).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![UnitKind::EarthTank, UnitKind::AlienSoldier, UnitKind::SaverUnit]
        );
    }

    #[test]
    fn test_game_with_files_units() {
        let game = game_with(quick_config(1), &mixed_armies());
        assert_eq!(game.pool().len(), 19);
    }
}
