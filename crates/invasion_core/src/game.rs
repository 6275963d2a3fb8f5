//! The battle orchestrator.
//!
//! [`Game`] owns the id allocators and the [`Battlefield`] and advances the
//! battle one timestep at a time. New units come from a [`UnitSource`], so
//! the core never touches the randomness or IO used to produce them.
//!
//! # Timestep Order
//!
//! 1. **Clock** - increment the timestep counter
//! 2. **Generation** - ask the source for new units and file them
//! 3. **Attacks** - Earth, then Alien, then Earth Allied
//! 4. **Infection** - spread, then call or withdraw the allies
//! 5. **Report** - drain the attackers' fought lists into [`TickEvents`]
//! 6. **Stalemate** - flag the timestep if no attack found a target

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::battle::{Battlefield, CombatRules};
use crate::error::{GameError, Result};
use crate::factions::{Faction, MAX_UNIT_CAP};
use crate::infection;
use crate::pool::{IdAllocator, UnitPool};
use crate::unit::{UnitId, UnitKind, UnitStats};

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every random choice made inside the core.
    pub seed: u64,
    /// The battle cannot end before this timestep.
    pub min_timesteps: u64,
    /// The battle is called a draw at this timestep.
    pub max_timesteps: u64,
    /// Units each faction may create.
    pub unit_cap: u32,
    /// Chance, in percent, that a monster hit infects a soldier.
    pub infection_probability: u8,
    /// Infected share of Earth soldiers, in percent, that calls the allies.
    pub infection_threshold: u8,
    /// Chance, in percent, that an infected soldier infects another each
    /// timestep.
    pub infection_spread_probability: u8,
    /// Timesteps a unit may wait for maintenance.
    pub maintenance_timeout: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            min_timesteps: 40,
            max_timesteps: 10_000,
            unit_cap: 1000,
            infection_probability: 0,
            infection_threshold: 100,
            infection_spread_probability: 2,
            maintenance_timeout: 10,
        }
    }
}

impl GameConfig {
    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.unit_cap == 0 || self.unit_cap > MAX_UNIT_CAP {
            return Err(GameError::InvalidConfig(format!(
                "unit_cap must be in 1..={MAX_UNIT_CAP}, got {}",
                self.unit_cap
            )));
        }
        if self.max_timesteps < self.min_timesteps {
            return Err(GameError::InvalidConfig(format!(
                "max_timesteps ({}) is below min_timesteps ({})",
                self.max_timesteps, self.min_timesteps
            )));
        }
        for (name, value) in [
            ("infection_probability", self.infection_probability),
            ("infection_threshold", self.infection_threshold),
            ("infection_spread_probability", self.infection_spread_probability),
        ] {
            if value > 100 {
                return Err(GameError::InvalidConfig(format!(
                    "{name} is a percentage, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// What a unit source knows about the battle when asked for units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnContext {
    /// The timestep being generated for.
    pub tick: u64,
    /// Whether saver units are wanted.
    pub allies_called: bool,
}

/// Producer of new units, consulted once per timestep.
pub trait UnitSource {
    /// Stats of the units joining this timestep, in filing order.
    fn generate(&mut self, ctx: &SpawnContext) -> Vec<UnitStats>;
}

impl<F> UnitSource for F
where
    F: FnMut(&SpawnContext) -> Vec<UnitStats>,
{
    fn generate(&mut self, ctx: &SpawnContext) -> Vec<UnitStats> {
        self(ctx)
    }
}

/// One unit's attack during a timestep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    /// The attacking unit.
    pub attacker: UnitId,
    /// Its kind.
    pub kind: UnitKind,
    /// Units engaged, in order.
    pub targets: Vec<UnitId>,
}

/// Everything that happened in one timestep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// The timestep these events belong to.
    pub tick: u64,
    /// Units created this timestep.
    pub spawned: Vec<UnitId>,
    /// Attacks that engaged at least one unit.
    pub attacks: Vec<AttackRecord>,
    /// Soldiers infected by spread at the end of the timestep.
    pub infected: Vec<UnitId>,
    /// The allies were called this timestep.
    pub allies_called: bool,
    /// Saver units withdrawn this timestep.
    pub allies_withdrawn: usize,
    /// No attack found a target.
    pub stalemate: bool,
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The alien army was wiped out.
    EarthWins,
    /// The Earth army was wiped out.
    AlienWins,
    /// Both armies died, neither did, or the battle stalled.
    Drawn,
}

impl Outcome {
    /// Human readable result.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::EarthWins => "Earth wins",
            Self::AlienWins => "Aliens win",
            Self::Drawn => "Drawn",
        }
    }
}

/// A battle between Earth and the aliens.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    tick: u64,
    allocators: [IdAllocator; 3],
    field: Battlefield,
    allies_called: bool,
    cap_reached: BTreeSet<Faction>,
    stalemate: bool,
    attackers: Vec<UnitId>,
}

fn slot(faction: Faction) -> usize {
    match faction {
        Faction::Earth => 0,
        Faction::Alien => 1,
        Faction::EarthAllied => 2,
    }
}

impl Game {
    /// Create a battle at timestep 0 with empty armies.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let rules = CombatRules {
            infection_probability: config.infection_probability,
            maintenance_timeout: config.maintenance_timeout,
        };
        let field = Battlefield::new(config.seed, Some(config.unit_cap as usize), rules);
        let allocators = Faction::ALL.map(|f| IdAllocator::new(f, config.unit_cap));
        tracing::info!(seed = config.seed, unit_cap = config.unit_cap, "game created");
        Ok(Self {
            config,
            tick: 0,
            allocators,
            field,
            allies_called: false,
            cap_reached: BTreeSet::new(),
            stalemate: false,
            attackers: Vec::new(),
        })
    }

    /// The configuration this battle runs with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current timestep. Zero before the first [`step`](Self::step).
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Unit ownership state.
    #[must_use]
    pub const fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    /// Every unit created so far.
    #[must_use]
    pub const fn pool(&self) -> &UnitPool {
        self.field.pool()
    }

    /// Whether saver units are currently wanted.
    #[must_use]
    pub const fn allies_called(&self) -> bool {
        self.allies_called
    }

    /// Whether `faction` has used up its unit cap.
    #[must_use]
    pub fn cap_reached(&self, faction: Faction) -> bool {
        self.cap_reached.contains(&faction)
    }

    /// Factions that used up their unit cap.
    #[must_use]
    pub const fn capped_factions(&self) -> &BTreeSet<Faction> {
        &self.cap_reached
    }

    /// Whether the last timestep found no targets at all.
    #[must_use]
    pub const fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    /// Create a unit from raw stats and file it into its army.
    ///
    /// Fails with [`GameError::UnitCapReached`] once the faction's budget is
    /// spent; the unit is not created and the cap flag is raised.
    pub fn add_unit(&mut self, stats: UnitStats) -> Result<UnitId> {
        let faction = stats.kind.faction();
        let id = match self.allocators[slot(faction)].allocate() {
            Ok(id) => id,
            Err(err) => {
                if self.cap_reached.insert(faction) {
                    tracing::warn!(%faction, cap = self.config.unit_cap, "unit cap reached");
                }
                return Err(err);
            }
        };
        self.field.enlist(id, stats, self.tick);
        tracing::trace!(unit = %id, kind = %stats.kind, "unit created");
        Ok(id)
    }

    /// Let every kind of `faction` attack once, in attack order.
    ///
    /// Returns `true` if any attacker engaged a target.
    pub fn army_attack(&mut self, faction: Faction) -> bool {
        let mut engaged = false;
        for &kind in faction.kinds() {
            let Some(attacker) = self.field.pick_attacker(kind) else {
                continue;
            };
            if self.field.attack(attacker, self.tick) {
                engaged = true;
                self.attackers.push(attacker);
            }
        }
        engaged
    }

    /// Advance the battle by one timestep.
    pub fn step<S>(&mut self, source: &mut S) -> TickEvents
    where
        S: UnitSource + ?Sized,
    {
        self.tick += 1;
        let mut events = TickEvents {
            tick: self.tick,
            ..TickEvents::default()
        };

        let ctx = SpawnContext {
            tick: self.tick,
            allies_called: self.allies_called,
        };
        for stats in source.generate(&ctx) {
            if let Ok(id) = self.add_unit(stats) {
                events.spawned.push(id);
            }
        }

        let mut engaged = false;
        for faction in Faction::ALL {
            engaged |= self.army_attack(faction);
        }

        events.infected = self
            .field
            .spread_infection(self.config.infection_spread_probability);
        self.update_allies(&mut events);

        for attacker in std::mem::take(&mut self.attackers) {
            let targets = self.field.take_fought(attacker);
            if targets.is_empty() {
                continue;
            }
            if let Some(unit) = self.field.pool().get(attacker) {
                events.attacks.push(AttackRecord {
                    attacker,
                    kind: unit.kind(),
                    targets,
                });
            }
        }

        self.stalemate = !engaged;
        events.stalemate = self.stalemate;

        tracing::debug!(
            tick = self.tick,
            earth = self.field.army(Faction::Earth).total_live(),
            alien = self.field.army(Faction::Alien).total_live(),
            allied = self.field.army(Faction::EarthAllied).total_live(),
            stalemate = self.stalemate,
            "timestep complete"
        );
        #[cfg(feature = "debug-validation")]
        {
            let faults = self.field.ownership_faults();
            if !faults.is_empty() {
                tracing::error!(tick = self.tick, ?faults, "units with broken ownership");
            }
        }
        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "state hash");
        }

        events
    }

    fn update_allies(&mut self, events: &mut TickEvents) {
        if !self.allies_called {
            let infected = self.field.infected_soldiers();
            let live = self
                .field
                .army(Faction::Earth)
                .live_count(UnitKind::EarthSoldier);
            if infection::threshold_reached(infected, live, self.config.infection_threshold) {
                self.allies_called = true;
                events.allies_called = true;
                tracing::info!(tick = self.tick, infected, live, "allies called");
            }
        } else if !self.field.infection_alive() {
            self.allies_called = false;
            tracing::info!(tick = self.tick, "infection cleared, allies withdrawn");
        }

        if !self.allies_called {
            events.allies_withdrawn = self.field.withdraw_allies();
        }
    }

    /// Whether the battle has ended.
    ///
    /// Past the minimum duration it ends when either army is dead or the
    /// last timestep was a stalemate. It always ends at the maximum.
    #[must_use]
    pub fn is_over(&self) -> bool {
        if self.tick >= self.config.max_timesteps {
            return true;
        }
        self.tick >= self.config.min_timesteps
            && (self.field.army(Faction::Earth).is_dead()
                || self.field.army(Faction::Alien).is_dead()
                || self.stalemate)
    }

    /// Result of the battle as things stand.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        let earth_dead = self.field.army(Faction::Earth).is_dead();
        let alien_dead = self.field.army(Faction::Alien).is_dead();
        match (earth_dead, alien_dead) {
            (false, true) => Outcome::EarthWins,
            (true, false) => Outcome::AlienWins,
            _ => Outcome::Drawn,
        }
    }

    /// Step until the battle is over.
    pub fn run<S>(&mut self, source: &mut S) -> Outcome
    where
        S: UnitSource + ?Sized,
    {
        while !self.is_over() {
            self.step(source);
        }
        let outcome = self.outcome();
        tracing::info!(tick = self.tick, ?outcome, "battle over");
        outcome
    }

    /// Hash of the complete battle state.
    ///
    /// Two runs with the same config and unit source hash identically at
    /// every timestep.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.allies_called.hash(&mut hasher);
        self.field.soldier_mode().hash(&mut hasher);

        self.pool().len().hash(&mut hasher);
        for unit in self.pool().iter() {
            unit.id().hash(&mut hasher);
            unit.kind().hash(&mut hasher);
            unit.health().to_bits().hash(&mut hasher);
            unit.first_attack_time().hash(&mut hasher);
            unit.destruction_time().hash(&mut hasher);
            unit.maintenance_join_time().hash(&mut hasher);
            unit.is_infected().hash(&mut hasher);
            unit.is_immune().hash(&mut hasher);
        }

        for faction in Faction::ALL {
            let army = self.field.army(faction);
            for &kind in army.kinds() {
                army.unit_ids(kind).hash(&mut hasher);
            }
        }
        self.field.killed_ids().hash(&mut hasher);
        self.field.maintenance_ids().hash(&mut hasher);
        self.field.retired_ids().hash(&mut hasher);

        hasher.finish()
    }
}
