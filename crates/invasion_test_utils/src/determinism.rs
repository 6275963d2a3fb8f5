//! Replay harness for checking that battles are deterministic.
//!
//! A battle rebuilt from the same setup must end in the same state. Health
//! and damage are [`invasion_core::math::Fixed`], the unit pool iterates in
//! id order and every RNG is a seeded `ChaCha8Rng`, so any difference
//! between replays is a bug.

use invasion_core::game::{Game, UnitSource};

/// Final state of each replay of one battle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replays {
    /// Final state hash per replay.
    pub hashes: Vec<u64>,
    /// Timesteps played per replay.
    pub ticks: Vec<u64>,
}

impl Replays {
    /// Whether every replay ended in the same state at the same timestep.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
            && self.ticks.windows(2).all(|w| w[0] == w[1])
    }

    /// # Panics
    ///
    /// Panics if the replays ended in different states.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "battle is non-deterministic\nhashes: {:?}\ntimesteps: {:?}",
            self.hashes,
            self.ticks
        );
    }
}

/// Build the battle with `setup` `runs` times and step each replay until it
/// is over or `max_ticks` timesteps have been played.
pub fn replay_battle<S, F>(setup: F, runs: usize, max_ticks: u64) -> Replays
where
    S: UnitSource,
    F: Fn() -> (Game, S),
{
    let mut replays = Replays {
        hashes: Vec::with_capacity(runs),
        ticks: Vec::with_capacity(runs),
    };

    for _ in 0..runs {
        let (mut game, mut source) = setup();
        while !game.is_over() && game.tick() < max_ticks {
            game.step(&mut source);
        }
        replays.hashes.push(game.state_hash());
        replays.ticks.push(game.tick());
    }

    if !replays.is_deterministic() {
        tracing::warn!(
            hashes = ?replays.hashes,
            ticks = ?replays.ticks,
            "replays diverged"
        );
    }
    replays
}
