//! Infection rolls, spread between soldiers, and the allied call threshold.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::pool::UnitPool;
use crate::unit::UnitId;

/// Roll a `percent` chance in `[1, 100]`.
pub fn roll(rng: &mut ChaCha8Rng, percent: u8) -> bool {
    percent > 0 && rng.gen_range(1..=100u8) <= percent
}

/// Let every infected soldier in `soldiers` try to pass the infection to one
/// random soldier that is neither infected nor immune.
///
/// Soldiers infected during this pass do not spread until the next call.
/// Returns the newly infected ids.
pub fn spread(
    pool: &mut UnitPool,
    soldiers: &[UnitId],
    percent: u8,
    rng: &mut ChaCha8Rng,
) -> Vec<UnitId> {
    let carriers: Vec<UnitId> = soldiers
        .iter()
        .copied()
        .filter(|&id| pool.get(id).is_some_and(|u| u.is_infected()))
        .collect();

    let mut newly_infected = Vec::new();
    for carrier in carriers {
        if !roll(rng, percent) {
            continue;
        }
        let healthy: Vec<UnitId> = soldiers
            .iter()
            .copied()
            .filter(|&id| {
                pool.get(id)
                    .is_some_and(|u| !u.is_infected() && !u.is_immune())
            })
            .collect();
        if healthy.is_empty() {
            break;
        }
        let victim = healthy[rng.gen_range(0..healthy.len())];
        if pool.get_mut(victim).is_some_and(|u| u.infect()) {
            tracing::debug!(%carrier, %victim, "infection spread");
            newly_infected.push(victim);
        }
    }
    newly_infected
}

/// Whether `infected` out of `live` soldiers reaches `threshold` percent.
///
/// A threshold of 100 or more disables the call.
#[must_use]
pub fn threshold_reached(infected: usize, live: usize, threshold: u8) -> bool {
    if threshold >= 100 || live == 0 || infected == 0 {
        return false;
    }
    infected * 100 >= usize::from(threshold) * live
}
