//! Combat units: identity, stats, timing bookkeeping and per-kind capabilities.
//!
//! Every unit kind shares one damage model ([`Unit::attack_power_against`]).
//! What differs between kinds (container discipline, healability, the verb
//! used in battle narration) is read from the capability table on
//! [`UnitKind`] instead of being spread over a type hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::army::Discipline;
use crate::factions::Faction;
use crate::math::{scaled_strike, Fixed, HUNDRED};

/// Stable identity of a unit. Unique within its faction's id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of unit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Earth infantry. Fights alien soldiers.
    EarthSoldier,
    /// Earth armour. Fights monsters (and soldiers in soldier mode).
    EarthTank,
    /// Earth gunnery. Fights monsters and drones.
    EarthGunner,
    /// Earth medic. Treats units from the maintenance list.
    EarthHealer,
    /// Alien infantry. Fights Earth soldiers and saver units.
    AlienSoldier,
    /// Alien monster. Fights soldiers and tanks, may infect soldiers.
    AlienMonster,
    /// Alien drone. Fights tanks and gunners.
    AlienDrone,
    /// Allied unit sent to contain the infection. Fights alien soldiers.
    SaverUnit,
}

impl UnitKind {
    /// All kinds, grouped by faction.
    pub const ALL: [UnitKind; 8] = [
        UnitKind::EarthSoldier,
        UnitKind::EarthTank,
        UnitKind::EarthGunner,
        UnitKind::EarthHealer,
        UnitKind::AlienSoldier,
        UnitKind::AlienMonster,
        UnitKind::AlienDrone,
        UnitKind::SaverUnit,
    ];

    /// The faction fielding this kind.
    #[must_use]
    pub const fn faction(self) -> Faction {
        match self {
            Self::EarthSoldier | Self::EarthTank | Self::EarthGunner | Self::EarthHealer => {
                Faction::Earth
            }
            Self::AlienSoldier | Self::AlienMonster | Self::AlienDrone => Faction::Alien,
            Self::SaverUnit => Faction::EarthAllied,
        }
    }

    /// Two-letter code used in console output and reports.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EarthSoldier => "ES",
            Self::EarthTank => "ET",
            Self::EarthGunner => "EG",
            Self::EarthHealer => "EH",
            Self::AlienSoldier => "AS",
            Self::AlienMonster => "AM",
            Self::AlienDrone => "AD",
            Self::SaverUnit => "SU",
        }
    }

    /// Container discipline the owning army uses for this kind.
    #[must_use]
    pub const fn discipline(self) -> Discipline {
        match self {
            Self::EarthSoldier | Self::AlienSoldier | Self::SaverUnit => Discipline::Fifo,
            Self::EarthTank | Self::EarthHealer => Discipline::Lifo,
            Self::EarthGunner => Discipline::Strongest,
            Self::AlienMonster => Discipline::Random,
            Self::AlienDrone => Discipline::Alternating,
        }
    }

    /// Whether badly damaged units of this kind go to maintenance instead of
    /// staying in the fight.
    #[must_use]
    pub const fn is_healable(self) -> bool {
        matches!(self, Self::EarthSoldier | Self::EarthTank | Self::SaverUnit)
    }

    /// Verb used when narrating this kind's attack.
    #[must_use]
    pub const fn attack_verb(self) -> &'static str {
        match self {
            Self::EarthHealer => "heals",
            _ => "shots",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Highest starting health. Values outside `[1, MAX_HEALTH]` are clamped.
pub const MAX_HEALTH: i32 = 100;

/// Highest attack power. Larger values are clamped.
pub const MAX_POWER: i32 = 10_000;

/// Most enemies a unit can engage per timestep. Larger values are clamped.
pub const MAX_ATTACK_CAPACITY: u32 = 1_000;

/// Raw stats produced by a unit source, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Kind of unit to create.
    pub kind: UnitKind,
    /// Starting health. Clamped to `[1, MAX_HEALTH]`.
    pub health: i32,
    /// Attack power. Clamped to `[0, MAX_POWER]`.
    pub power: i32,
    /// Enemies engaged per timestep. Capped at `MAX_ATTACK_CAPACITY`.
    pub attack_capacity: u32,
}

impl UnitStats {
    /// Create a stats record.
    #[must_use]
    pub const fn new(kind: UnitKind, health: i32, power: i32, attack_capacity: u32) -> Self {
        Self {
            kind,
            health,
            power,
            attack_capacity,
        }
    }
}

/// Health fraction at or below which a healable unit needs maintenance.
fn heal_threshold() -> Fixed {
    Fixed::from_num(20) / HUNDRED
}

/// A single combat unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: UnitId,
    kind: UnitKind,
    health: Fixed,
    initial_health: Fixed,
    power: Fixed,
    attack_capacity: u32,
    join_time: u64,
    first_attack_time: Option<u64>,
    destruction_time: Option<u64>,
    maintenance_join_time: Option<u64>,
    infected: bool,
    immune: bool,
    fought: Vec<UnitId>,
}

impl Unit {
    /// Create a unit that joins the battle at timestep `now`.
    ///
    /// Health, power and capacity are clamped to [`MAX_HEALTH`],
    /// [`MAX_POWER`] and [`MAX_ATTACK_CAPACITY`]; invalid values are never
    /// rejected.
    #[must_use]
    pub fn new(id: UnitId, stats: UnitStats, now: u64) -> Self {
        let health = Fixed::from_num(stats.health.clamp(1, MAX_HEALTH));
        Self {
            id,
            kind: stats.kind,
            health,
            initial_health: health,
            power: Fixed::from_num(stats.power.clamp(0, MAX_POWER)),
            attack_capacity: stats.attack_capacity.min(MAX_ATTACK_CAPACITY),
            join_time: now,
            first_attack_time: None,
            destruction_time: None,
            maintenance_join_time: None,
            infected: false,
            immune: false,
            fought: Vec::new(),
        }
    }

    /// Unit identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Unit kind.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Owning faction, derived from the kind.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.kind.faction()
    }

    /// Current health in `[0, 100]`.
    #[must_use]
    pub const fn health(&self) -> Fixed {
        self.health
    }

    /// Health at creation.
    #[must_use]
    pub const fn initial_health(&self) -> Fixed {
        self.initial_health
    }

    /// Attack power.
    #[must_use]
    pub const fn power(&self) -> Fixed {
        self.power
    }

    /// Enemies engaged per timestep.
    #[must_use]
    pub const fn attack_capacity(&self) -> u32 {
        self.attack_capacity
    }

    /// Timestep the unit was created (Tj).
    #[must_use]
    pub const fn join_time(&self) -> u64 {
        self.join_time
    }

    /// Timestep the unit first took damage (Ta).
    #[must_use]
    pub const fn first_attack_time(&self) -> Option<u64> {
        self.first_attack_time
    }

    /// Timestep the unit was destroyed (Td).
    #[must_use]
    pub const fn destruction_time(&self) -> Option<u64> {
        self.destruction_time
    }

    /// Timestep the unit entered the maintenance list, while it is there.
    #[must_use]
    pub const fn maintenance_join_time(&self) -> Option<u64> {
        self.maintenance_join_time
    }

    /// `Ta - Tj`.
    #[must_use]
    pub fn first_attack_delay(&self) -> Option<u64> {
        self.first_attack_time
            .map(|ta| ta.saturating_sub(self.join_time))
    }

    /// `Td - Ta`.
    #[must_use]
    pub fn destruction_delay(&self) -> Option<u64> {
        match (self.first_attack_time, self.destruction_time) {
            (Some(ta), Some(td)) => Some(td.saturating_sub(ta)),
            _ => None,
        }
    }

    /// `Td - Tj`.
    #[must_use]
    pub fn battle_delay(&self) -> Option<u64> {
        self.destruction_time
            .map(|td| td.saturating_sub(self.join_time))
    }

    /// Check if health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= Fixed::ZERO
    }

    /// Check if a healable unit has dropped to 20% of its initial health.
    #[must_use]
    pub fn needs_heal(&self) -> bool {
        if !self.kind.is_healable() || self.is_dead() {
            return false;
        }
        self.health / self.initial_health <= heal_threshold()
    }

    /// Maintenance-list priority: the lower the health, the more urgent.
    #[must_use]
    pub fn heal_urgency(&self) -> Fixed {
        HUNDRED - self.health
    }

    /// Damage this unit deals to `target` (UAP):
    /// `(power * health / 100) / sqrt(target health)`.
    ///
    /// Depends on both sides' current health, so it must be recomputed for
    /// every target.
    #[must_use]
    pub fn attack_power_against(&self, target: &Unit) -> Fixed {
        scaled_strike(self.power, self.health, target.health)
    }

    /// Health this unit restores to `patient` (UHP). Same shape as UAP.
    #[must_use]
    pub fn heal_power_for(&self, patient: &Unit) -> Fixed {
        scaled_strike(self.power, self.health, patient.health)
    }

    /// Apply damage at timestep `now`.
    ///
    /// Records the first-attack time on the first call and the destruction
    /// time when health reaches zero. Neither timestamp is ever overwritten.
    pub fn receive_damage(&mut self, amount: Fixed, now: u64) {
        if self.first_attack_time.is_none() {
            self.first_attack_time = Some(now);
        }

        self.health = self
            .health
            .saturating_sub(amount.max(Fixed::ZERO))
            .max(Fixed::ZERO);

        if self.is_dead() && self.destruction_time.is_none() {
            self.destruction_time = Some(now);
        }
    }

    /// Restore health, capped at the initial health.
    pub fn receive_heal(&mut self, amount: Fixed) {
        if self.is_dead() {
            return;
        }
        self.health = self
            .health
            .saturating_add(amount.max(Fixed::ZERO))
            .min(self.initial_health);
    }

    /// Take the unit out of play at timestep `now` without combat damage.
    ///
    /// Used for spent healers and for units that waited too long for
    /// maintenance.
    pub fn destroy(&mut self, now: u64) {
        self.health = Fixed::ZERO;
        if self.destruction_time.is_none() {
            self.destruction_time = Some(now);
        }
    }

    /// Whether this soldier carries the infection.
    #[must_use]
    pub const fn is_infected(&self) -> bool {
        self.infected
    }

    /// Whether this soldier has been cured and cannot be infected again.
    #[must_use]
    pub const fn is_immune(&self) -> bool {
        self.immune
    }

    /// Infect an Earth soldier. Returns `true` if the unit was newly infected.
    pub fn infect(&mut self) -> bool {
        if self.kind != UnitKind::EarthSoldier || self.infected || self.immune || self.is_dead() {
            return false;
        }
        self.infected = true;
        true
    }

    /// Cure the infection and grant immunity. Returns `true` if it was infected.
    pub fn cure(&mut self) -> bool {
        let was_infected = self.infected;
        if was_infected {
            self.infected = false;
            self.immune = true;
        }
        was_infected
    }

    pub(crate) fn enter_maintenance(&mut self, now: u64) {
        self.maintenance_join_time = Some(now);
    }

    pub(crate) fn leave_maintenance(&mut self) {
        self.maintenance_join_time = None;
    }

    /// Ids of units engaged since the last report cycle.
    #[must_use]
    pub fn fought(&self) -> &[UnitId] {
        &self.fought
    }

    pub(crate) fn record_fought(&mut self, target: UnitId) {
        self.fought.push(target);
    }

    pub(crate) fn take_fought(&mut self) -> Vec<UnitId> {
        std::mem::take(&mut self.fought)
    }
}
