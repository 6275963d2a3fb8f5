//! Proptest strategies for units, stats and configs.

use invasion_core::game::GameConfig;
use invasion_core::unit::{UnitKind, UnitStats};
use proptest::prelude::*;

/// Any unit kind.
pub fn arb_kind() -> impl Strategy<Value = UnitKind> {
    proptest::sample::select(UnitKind::ALL.to_vec())
}

/// Any Earth or Alien kind (no saver units).
pub fn arb_main_kind() -> impl Strategy<Value = UnitKind> {
    proptest::sample::select(
        UnitKind::ALL
            .iter()
            .copied()
            .filter(|k| *k != UnitKind::SaverUnit)
            .collect::<Vec<_>>(),
    )
}

/// Stats including out-of-range values, to exercise clamping.
pub fn arb_raw_stats() -> impl Strategy<Value = UnitStats> {
    let health = prop_oneof![-50i32..200, any::<i32>()];
    let power = prop_oneof![-20i32..150, any::<i32>()];
    let capacity = prop_oneof![0u32..6, any::<u32>()];
    (arb_kind(), health, power, capacity)
        .prop_map(|(kind, health, power, capacity)| UnitStats::new(kind, health, power, capacity))
}

/// Stats within the ranges a scenario would produce.
pub fn arb_stats() -> impl Strategy<Value = UnitStats> {
    (arb_main_kind(), 1i32..=100, 1i32..=100, 1u32..=4)
        .prop_map(|(kind, health, power, capacity)| UnitStats::new(kind, health, power, capacity))
}

/// A starting force of up to `max` units.
pub fn arb_force(max: usize) -> impl Strategy<Value = Vec<UnitStats>> {
    proptest::collection::vec(arb_stats(), 0..=max)
}

/// A short-battle config with random seed and infection settings.
pub fn arb_config() -> impl Strategy<Value = GameConfig> {
    (any::<u64>(), 0u8..=100, 0u8..=100).prop_map(|(seed, infection, threshold)| GameConfig {
        seed,
        min_timesteps: 5,
        max_timesteps: 60,
        infection_probability: infection,
        infection_threshold: threshold,
        ..GameConfig::default()
    })
}
