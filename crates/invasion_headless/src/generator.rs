//! Random unit generation driven by a scenario.

use invasion_core::factions::Faction;
use invasion_core::game::{SpawnContext, UnitSource};
use invasion_core::unit::{UnitKind, UnitStats};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scenario::{ArmyRanges, Scenario, StatRange};

/// Seeded [`UnitSource`] that spawns waves per the scenario's mix and ranges.
///
/// Each timestep every faction rolls `A` in `[1, 100]`. When `A` is at most
/// the spawn probability, the faction receives a wave of `N` units. Each unit
/// rolls `B` in `[1, 100]` for its kind and draws its stats uniformly.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    scenario: Scenario,
    rng: ChaCha8Rng,
}

impl RandomGenerator {
    /// Create a generator for `scenario`.
    #[must_use]
    pub fn new(scenario: &Scenario, seed: u64) -> Self {
        Self {
            scenario: scenario.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=100)
    }

    fn draw(&mut self, range: StatRange) -> i32 {
        self.rng.gen_range(range.min..=range.max)
    }

    /// Kind picked by roll `b` for `faction`.
    #[must_use]
    pub fn pick_kind(&self, faction: Faction, b: u8) -> UnitKind {
        match faction {
            Faction::Earth => by_share(&self.scenario.earth_mix.shares(), b),
            Faction::Alien => by_share(&self.scenario.alien_mix.shares(), b),
            Faction::EarthAllied => UnitKind::SaverUnit,
        }
    }

    fn ranges(&self, faction: Faction) -> ArmyRanges {
        match faction {
            Faction::Earth => self.scenario.earth,
            Faction::Alien => self.scenario.alien,
            Faction::EarthAllied => self.scenario.allied_ranges(),
        }
    }

    fn wave(&mut self, faction: Faction, out: &mut Vec<UnitStats>) {
        if self.roll() > self.scenario.probability {
            return;
        }
        let ranges = self.ranges(faction);
        for _ in 0..self.scenario.units_per_wave {
            let b = self.roll();
            let kind = self.pick_kind(faction, b);
            let power = self.draw(ranges.power);
            let health = self.draw(ranges.health);
            let capacity = self.draw(ranges.capacity);
            out.push(UnitStats::new(
                kind,
                health,
                power,
                u32::try_from(capacity).unwrap_or(0),
            ));
        }
    }
}

fn by_share<const N: usize>(shares: &[(UnitKind, u8); N], b: u8) -> UnitKind {
    let mut cumulative = 0_u32;
    for &(kind, share) in shares {
        cumulative += u32::from(share);
        if u32::from(b) <= cumulative {
            return kind;
        }
    }
    // validated shares sum to 100, so only b > 100 lands here
    shares[N - 1].0
}

impl UnitSource for RandomGenerator {
    fn generate(&mut self, ctx: &SpawnContext) -> Vec<UnitStats> {
        let mut units = Vec::new();
        self.wave(Faction::Earth, &mut units);
        self.wave(Faction::Alien, &mut units);
        if ctx.allies_called {
            self.wave(Faction::EarthAllied, &mut units);
        }
        tracing::trace!(tick = ctx.tick, count = units.len(), "units generated");
        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{AlienMix, EarthMix};

    fn certain() -> Scenario {
        Scenario {
            units_per_wave: 1,
            probability: 100,
            ..Scenario::default()
        }
    }

    fn ctx(tick: u64, allies_called: bool) -> SpawnContext {
        SpawnContext {
            tick,
            allies_called,
        }
    }

    #[test]
    fn test_cumulative_kind_selection() {
        let gen = RandomGenerator::new(&Scenario::default(), 0);
        // 60 20 15 5
        assert_eq!(gen.pick_kind(Faction::Earth, 1), UnitKind::EarthSoldier);
        assert_eq!(gen.pick_kind(Faction::Earth, 60), UnitKind::EarthSoldier);
        assert_eq!(gen.pick_kind(Faction::Earth, 61), UnitKind::EarthTank);
        assert_eq!(gen.pick_kind(Faction::Earth, 80), UnitKind::EarthTank);
        assert_eq!(gen.pick_kind(Faction::Earth, 95), UnitKind::EarthGunner);
        assert_eq!(gen.pick_kind(Faction::Earth, 96), UnitKind::EarthHealer);
        assert_eq!(gen.pick_kind(Faction::Earth, 100), UnitKind::EarthHealer);
        // 60 20 20
        assert_eq!(gen.pick_kind(Faction::Alien, 80), UnitKind::AlienMonster);
        assert_eq!(gen.pick_kind(Faction::Alien, 81), UnitKind::AlienDrone);
        assert_eq!(gen.pick_kind(Faction::EarthAllied, 1), UnitKind::SaverUnit);
    }

    #[test]
    fn test_zero_share_kind_never_picked() {
        let scenario = Scenario {
            earth_mix: EarthMix {
                soldier: 0,
                tank: 100,
                gunner: 0,
                healer: 0,
            },
            ..Scenario::default()
        };
        let gen = RandomGenerator::new(&scenario, 0);
        for b in 1..=100 {
            assert_eq!(gen.pick_kind(Faction::Earth, b), UnitKind::EarthTank);
        }
    }

    #[test]
    fn test_full_probability_spawns_every_tick() {
        let mut gen = RandomGenerator::new(&certain(), 5);
        for tick in 1..=20 {
            let units = gen.generate(&ctx(tick, false));
            assert_eq!(units.len(), 2);
            assert_eq!(units[0].kind.faction(), Faction::Earth);
            assert_eq!(units[1].kind.faction(), Faction::Alien);
        }
    }

    #[test]
    fn test_zero_probability_spawns_nothing() {
        let scenario = Scenario {
            probability: 0,
            ..Scenario::default()
        };
        let mut gen = RandomGenerator::new(&scenario, 5);
        for tick in 1..=20 {
            assert!(gen.generate(&ctx(tick, true)).is_empty());
        }
    }

    #[test]
    fn test_savers_only_when_called() {
        let mut gen = RandomGenerator::new(&certain(), 1);
        let quiet = gen.generate(&ctx(1, false));
        assert!(quiet.iter().all(|u| u.kind != UnitKind::SaverUnit));

        let called = gen.generate(&ctx(2, true));
        assert_eq!(called.len(), 3);
        assert_eq!(called[2].kind, UnitKind::SaverUnit);
    }

    #[test]
    fn test_stats_within_ranges() {
        let scenario = Scenario {
            units_per_wave: 20,
            alien_mix: AlienMix {
                soldier: 34,
                monster: 33,
                drone: 33,
            },
            ..certain()
        };
        let mut gen = RandomGenerator::new(&scenario, 11);
        for tick in 1..=10 {
            for unit in gen.generate(&ctx(tick, true)) {
                let ranges = match unit.kind.faction() {
                    Faction::Earth => scenario.earth,
                    Faction::Alien => scenario.alien,
                    Faction::EarthAllied => scenario.allied_ranges(),
                };
                assert!((ranges.power.min..=ranges.power.max).contains(&unit.power));
                assert!((ranges.health.min..=ranges.health.max).contains(&unit.health));
                let capacity = i32::try_from(unit.attack_capacity).unwrap();
                assert!((ranges.capacity.min..=ranges.capacity.max).contains(&capacity));
            }
        }
    }

    #[test]
    fn test_same_seed_same_units() {
        let mut a = RandomGenerator::new(&Scenario::default(), 42);
        let mut b = RandomGenerator::new(&Scenario::default(), 42);
        for tick in 1..=30 {
            assert_eq!(a.generate(&ctx(tick, false)), b.generate(&ctx(tick, false)));
        }
    }
}
