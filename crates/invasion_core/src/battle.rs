//! Combat resolution.
//!
//! The [`Battlefield`] owns every unit handle: the three armies, the kill
//! list, the maintenance list (UML) and the retired list. An attack draws a
//! bounded enemy sub-list out of the defending army, applies damage to each
//! target in turn and files every handle back before returning, so a unit
//! is never in two places and never lost.

use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::army::Army;
use crate::containers::{PriorityQueue, Queue};
use crate::factions::Faction;
use crate::infection;
use crate::math::Fixed;
use crate::pool::{UnitHandle, UnitPool};
use crate::unit::{UnitId, UnitKind, UnitStats};

/// Earth soldiers below this share of alien soldiers put tanks in soldier
/// mode.
const SOLDIER_MODE_ON_PERCENT: usize = 30;
/// Earth soldiers at or above this share of alien soldiers end soldier mode.
const SOLDIER_MODE_OFF_PERCENT: usize = 80;

/// Per-run combat parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatRules {
    /// Chance, in percent, that a monster hit infects an Earth soldier.
    pub infection_probability: u8,
    /// Timesteps a unit may wait in the UML before it is written off.
    pub maintenance_timeout: u64,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            infection_probability: 0,
            maintenance_timeout: 10,
        }
    }
}

/// What happened to a target after it was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Back in its army.
    Returned,
    /// Sent to the maintenance list.
    Maintenance,
    /// Sent to the kill list.
    Killed,
}

/// Split `n` into `(ceil(n/2), floor(n/2))`.
#[must_use]
pub const fn split_ceil(n: u32) -> (u32, u32) {
    let first = n - n / 2;
    (first, n - first)
}

/// Split `n` into `(floor(n/2), ceil(n/2))`.
#[must_use]
pub const fn split_floor(n: u32) -> (u32, u32) {
    let first = n / 2;
    (first, n - first)
}

fn sub_seed(seed: u64, salt: u64) -> u64 {
    seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// All unit ownership for one battle.
#[derive(Debug)]
pub struct Battlefield {
    pool: UnitPool,
    earth: Army,
    alien: Army,
    allied: Army,
    killed: Queue<UnitHandle>,
    maintenance: PriorityQueue<UnitHandle, Fixed>,
    retired: Queue<UnitHandle>,
    rules: CombatRules,
    rng: ChaCha8Rng,
    soldier_mode: bool,
    healed: BTreeSet<UnitId>,
}

impl Battlefield {
    /// Create an empty battlefield.
    ///
    /// `stack_limit` bounds the `Lifo` rosters of every army.
    #[must_use]
    pub fn new(seed: u64, stack_limit: Option<usize>, rules: CombatRules) -> Self {
        Self {
            pool: UnitPool::new(),
            earth: Army::new(Faction::Earth, sub_seed(seed, 1), stack_limit),
            alien: Army::new(Faction::Alien, sub_seed(seed, 2), stack_limit),
            allied: Army::new(Faction::EarthAllied, sub_seed(seed, 3), stack_limit),
            killed: Queue::new(),
            maintenance: PriorityQueue::new(),
            retired: Queue::new(),
            rules,
            rng: ChaCha8Rng::seed_from_u64(sub_seed(seed, 4)),
            soldier_mode: false,
            healed: BTreeSet::new(),
        }
    }

    /// Every unit created so far.
    #[must_use]
    pub const fn pool(&self) -> &UnitPool {
        &self.pool
    }

    /// The army of `faction`.
    #[must_use]
    pub const fn army(&self, faction: Faction) -> &Army {
        match faction {
            Faction::Earth => &self.earth,
            Faction::Alien => &self.alien,
            Faction::EarthAllied => &self.allied,
        }
    }

    fn army_mut(&mut self, faction: Faction) -> &mut Army {
        match faction {
            Faction::Earth => &mut self.earth,
            Faction::Alien => &mut self.alien,
            Faction::EarthAllied => &mut self.allied,
        }
    }

    /// Ids on the kill list, in order of death.
    #[must_use]
    pub fn killed_ids(&self) -> Vec<UnitId> {
        self.killed.iter().map(UnitHandle::id).collect()
    }

    /// Ids on the maintenance list, most urgent first.
    #[must_use]
    pub fn maintenance_ids(&self) -> Vec<UnitId> {
        self.maintenance.iter().map(|(h, _)| h.id()).collect()
    }

    /// Ids of withdrawn or overflowed units.
    #[must_use]
    pub fn retired_ids(&self) -> Vec<UnitId> {
        self.retired.iter().map(UnitHandle::id).collect()
    }

    /// Units that received treatment at least once.
    #[must_use]
    pub const fn healed(&self) -> &BTreeSet<UnitId> {
        &self.healed
    }

    /// Whether tanks are currently engaging alien soldiers.
    #[must_use]
    pub const fn soldier_mode(&self) -> bool {
        self.soldier_mode
    }

    /// Create a unit at timestep `now` and file it into its army.
    pub(crate) fn enlist(&mut self, id: UnitId, stats: UnitStats, now: u64) {
        let handle = self.pool.create(id, stats, now);
        self.file(handle);
    }

    /// Return a handle to the army of its unit's kind.
    ///
    /// A full roster parks the unit on the retired list.
    fn file(&mut self, handle: UnitHandle) {
        let Some(unit) = self.pool.resolve(&handle) else {
            tracing::error!(unit = %handle.id(), "handle without a unit");
            return;
        };
        let army = match unit.faction() {
            Faction::Earth => &mut self.earth,
            Faction::Alien => &mut self.alien,
            Faction::EarthAllied => &mut self.allied,
        };
        if let Err(overflow) = army.add_unit(handle, unit) {
            let handle = overflow.into_inner();
            tracing::error!(unit = %handle.id(), "roster full, unit retired");
            self.retired.enqueue(handle);
        }
    }

    /// Choose this timestep's attacker of `kind` without removing it.
    pub fn pick_attacker(&mut self, kind: UnitKind) -> Option<UnitId> {
        self.army_mut(kind.faction()).pick_attacker(kind)
    }

    /// Borrow up to `count` units of `kind` out of their army.
    fn enemy_list(&mut self, kind: UnitKind, count: u32) -> Queue<UnitHandle> {
        let army = self.army_mut(kind.faction());
        (0..count).map_while(|_| army.remove_unit(kind)).collect()
    }

    /// Resolve one timestep's attack by `attacker`.
    ///
    /// Returns `true` if at least one target was engaged.
    pub fn attack(&mut self, attacker: UnitId, now: u64) -> bool {
        let Some(unit) = self.pool.get(attacker) else {
            return false;
        };
        let kind = unit.kind();
        let capacity = unit.attack_capacity();
        let infected = unit.is_infected();

        match kind {
            UnitKind::EarthSoldier if infected => self.attack_own_soldiers(attacker, capacity, now),
            UnitKind::EarthSoldier | UnitKind::SaverUnit => {
                let targets = self.enemy_list(UnitKind::AlienSoldier, capacity);
                self.engage(attacker, targets, now)
            }
            UnitKind::EarthTank => {
                self.update_soldier_mode();
                let (soldiers, monsters) = if self.soldier_mode {
                    split_ceil(capacity)
                } else {
                    (0, capacity)
                };
                let soldiers = self.enemy_list(UnitKind::AlienSoldier, soldiers);
                let monsters = self.enemy_list(UnitKind::AlienMonster, monsters);
                let hit_soldiers = self.engage(attacker, soldiers, now);
                self.engage(attacker, monsters, now) || hit_soldiers
            }
            UnitKind::EarthGunner => {
                let (monsters, drones) = split_ceil(capacity);
                let monsters = self.enemy_list(UnitKind::AlienMonster, monsters);
                let drones = self.enemy_list(UnitKind::AlienDrone, drones);
                let hit_monsters = self.engage(attacker, monsters, now);
                self.engage(attacker, drones, now) || hit_monsters
            }
            UnitKind::EarthHealer => self.heal(attacker, capacity, now),
            UnitKind::AlienSoldier => {
                let (soldiers, savers) = if self.allied.is_dead() {
                    (capacity, 0)
                } else {
                    split_floor(capacity)
                };
                let soldiers = self.enemy_list(UnitKind::EarthSoldier, soldiers);
                let savers = self.enemy_list(UnitKind::SaverUnit, savers);
                let hit_soldiers = self.engage(attacker, soldiers, now);
                self.engage(attacker, savers, now) || hit_soldiers
            }
            UnitKind::AlienMonster => {
                let (soldiers, tanks) = split_floor(capacity);
                let soldiers = self.enemy_list(UnitKind::EarthSoldier, soldiers);
                let tanks = self.enemy_list(UnitKind::EarthTank, tanks);
                let hit_soldiers = self.engage(attacker, soldiers, now);
                self.engage(attacker, tanks, now) || hit_soldiers
            }
            UnitKind::AlienDrone => {
                let (tanks, gunners) = split_ceil(capacity);
                let mut tanks = self.enemy_list(UnitKind::EarthTank, tanks);
                let mut gunners = self.enemy_list(UnitKind::EarthGunner, gunners);
                let mut engaged = false;
                loop {
                    let mut struck = false;
                    for list in [&mut tanks, &mut gunners] {
                        if let Some(target) = list.dequeue() {
                            self.strike(attacker, target, now);
                            struck = true;
                        }
                    }
                    if !struck {
                        break;
                    }
                    engaged = true;
                }
                engaged
            }
        }
    }

    fn engage(&mut self, attacker: UnitId, mut targets: Queue<UnitHandle>, now: u64) -> bool {
        let mut engaged = false;
        while let Some(target) = targets.dequeue() {
            self.strike(attacker, target, now);
            engaged = true;
        }
        engaged
    }

    /// An infected soldier leaves the front of its queue, turns on its own
    /// comrades and rejoins at the tail.
    fn attack_own_soldiers(&mut self, attacker: UnitId, capacity: u32, now: u64) -> bool {
        let Some(own) = self.earth.remove_unit(UnitKind::EarthSoldier) else {
            return false;
        };
        if own.id() != attacker {
            self.file(own);
            return false;
        }
        let targets = self.enemy_list(UnitKind::EarthSoldier, capacity);
        let engaged = self.engage(attacker, targets, now);
        self.file(own);
        engaged
    }

    /// Apply one hit and settle the target.
    pub(crate) fn strike(&mut self, attacker: UnitId, target: UnitHandle, now: u64) -> Disposition {
        let target_id = target.id();
        let (amount, attacker_kind) = match (self.pool.get(attacker), self.pool.get(target_id)) {
            (Some(a), Some(t)) => (a.attack_power_against(t), a.kind()),
            _ => (Fixed::ZERO, UnitKind::EarthSoldier),
        };

        let infects = attacker_kind == UnitKind::AlienMonster
            && infection::roll(&mut self.rng, self.rules.infection_probability);
        if let Some(unit) = self.pool.get_mut(target_id) {
            unit.receive_damage(amount, now);
            if infects && unit.infect() {
                tracing::debug!(monster = %attacker, soldier = %target_id, "soldier infected");
            }
        }
        if let Some(unit) = self.pool.get_mut(attacker) {
            unit.record_fought(target_id);
        }
        tracing::debug!(%attacker, target = %target_id, damage = %amount, "hit");

        self.settle(target, now)
    }

    fn settle(&mut self, handle: UnitHandle, now: u64) -> Disposition {
        let Some(unit) = self.pool.get_mut(handle.id()) else {
            return Disposition::Killed;
        };
        if unit.is_dead() {
            self.killed.enqueue(handle);
            Disposition::Killed
        } else if unit.needs_heal() {
            unit.enter_maintenance(now);
            let urgency = unit.heal_urgency();
            self.maintenance.enqueue(handle, urgency);
            Disposition::Maintenance
        } else {
            self.file(handle);
            Disposition::Returned
        }
    }

    fn update_soldier_mode(&mut self) {
        let earth = self.earth.live_count(UnitKind::EarthSoldier);
        let alien = self.alien.live_count(UnitKind::AlienSoldier);
        if alien == 0 {
            self.soldier_mode = false;
        } else if !self.soldier_mode && earth * 100 < alien * SOLDIER_MODE_ON_PERCENT {
            self.soldier_mode = true;
        } else if self.soldier_mode && earth * 100 >= alien * SOLDIER_MODE_OFF_PERCENT {
            self.soldier_mode = false;
        }
    }

    /// Treat up to `capacity` units from the UML.
    ///
    /// Units that waited longer than the timeout are written off instead.
    /// A healer that treated anyone is used up and joins the kill list.
    fn heal(&mut self, healer: UnitId, capacity: u32, now: u64) -> bool {
        let mut requeue = Vec::new();
        let mut treated = 0_u32;
        let mut expired = 0_u32;

        for _ in 0..capacity {
            let Some((handle, _)) = self.maintenance.dequeue() else {
                break;
            };
            let id = handle.id();
            let power = match (self.pool.get(healer), self.pool.get(id)) {
                (Some(h), Some(p)) => h.heal_power_for(p),
                _ => Fixed::ZERO,
            };
            let Some(patient) = self.pool.get_mut(id) else {
                continue;
            };

            let joined = patient.maintenance_join_time().unwrap_or(now);
            if now.saturating_sub(joined) > self.rules.maintenance_timeout {
                patient.leave_maintenance();
                patient.destroy(now);
                tracing::debug!(unit = %id, waited = now - joined, "maintenance timeout");
                self.killed.enqueue(handle);
                expired += 1;
                continue;
            }

            patient.receive_heal(power);
            if patient.cure() {
                tracing::debug!(unit = %id, "soldier cured");
            }
            let still_hurt = patient.needs_heal();
            let urgency = patient.heal_urgency();
            if !still_hurt {
                patient.leave_maintenance();
            }
            self.healed.insert(id);
            treated += 1;
            if let Some(h) = self.pool.get_mut(healer) {
                h.record_fought(id);
            }

            if still_hurt {
                requeue.push((handle, urgency));
            } else {
                self.file(handle);
            }
        }

        for (handle, urgency) in requeue {
            self.maintenance.enqueue(handle, urgency);
        }

        if treated > 0 {
            self.consume_healer(healer, now);
        }
        treated > 0 || expired > 0
    }

    fn consume_healer(&mut self, healer: UnitId, now: u64) {
        let Some(handle) = self.earth.remove_unit(UnitKind::EarthHealer) else {
            return;
        };
        if handle.id() != healer {
            self.file(handle);
            return;
        }
        if let Some(unit) = self.pool.get_mut(healer) {
            unit.destroy(now);
        }
        self.killed.enqueue(handle);
    }

    /// Infected soldiers still in the Earth army.
    #[must_use]
    pub fn infected_soldiers(&self) -> usize {
        self.earth
            .unit_ids(UnitKind::EarthSoldier)
            .into_iter()
            .filter(|&id| self.pool.get(id).is_some_and(|u| u.is_infected()))
            .count()
    }

    /// Whether any living unit carries the infection, wherever it is.
    #[must_use]
    pub fn infection_alive(&self) -> bool {
        self.pool.iter().any(|u| u.is_infected() && !u.is_dead())
    }

    /// Spread the infection among Earth soldiers.
    pub fn spread_infection(&mut self, percent: u8) -> Vec<UnitId> {
        let soldiers = self.earth.unit_ids(UnitKind::EarthSoldier);
        infection::spread(&mut self.pool, &soldiers, percent, &mut self.rng)
    }

    /// Move every saver unit to the retired list.
    pub fn withdraw_allies(&mut self) -> usize {
        let withdrawn = self.allied.drain();
        let count = withdrawn.len();
        for handle in withdrawn {
            self.retired.enqueue(handle);
        }
        count
    }

    /// Take the fought list of `attacker`.
    pub(crate) fn take_fought(&mut self, attacker: UnitId) -> Vec<UnitId> {
        self.pool
            .get_mut(attacker)
            .map(|u| u.take_fought())
            .unwrap_or_default()
    }

    /// Ids held by two containers, or by none.
    ///
    /// Always empty unless handle bookkeeping is broken.
    #[must_use]
    pub fn ownership_faults(&self) -> Vec<UnitId> {
        let mut holders: BTreeMap<UnitId, usize> =
            self.pool.iter().map(|u| (u.id(), 0)).collect();
        let mut held = self.killed_ids();
        held.extend(self.maintenance_ids());
        held.extend(self.retired_ids());
        for faction in Faction::ALL {
            let army = self.army(faction);
            for &kind in army.kinds() {
                held.extend(army.unit_ids(kind));
            }
        }
        for id in held {
            *holders.entry(id).or_insert(0) += 1;
        }
        holders
            .into_iter()
            .filter(|&(_, count)| count != 1)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Setup {
        field: Battlefield,
        next: [u32; 3],
    }

    impl Setup {
        fn new() -> Self {
            Self::with_rules(CombatRules::default())
        }

        fn with_rules(rules: CombatRules) -> Self {
            Self {
                field: Battlefield::new(11, None, rules),
                next: [
                    Faction::Earth.id_base(),
                    Faction::Alien.id_base(),
                    Faction::EarthAllied.id_base(),
                ],
            }
        }

        fn add(&mut self, kind: UnitKind, health: i32, power: i32, capacity: u32) -> UnitId {
            let slot = match kind.faction() {
                Faction::Earth => 0,
                Faction::Alien => 1,
                Faction::EarthAllied => 2,
            };
            let id = UnitId(self.next[slot]);
            self.next[slot] += 1;
            self.field
                .enlist(id, UnitStats::new(kind, health, power, capacity), 0);
            id
        }

        fn health(&self, id: UnitId) -> Fixed {
            self.field.pool().get(id).unwrap().health()
        }
    }

    #[test]
    fn test_splits() {
        assert_eq!(split_ceil(5), (3, 2));
        assert_eq!(split_ceil(4), (2, 2));
        assert_eq!(split_ceil(1), (1, 0));
        assert_eq!(split_floor(5), (2, 3));
        assert_eq!(split_floor(1), (0, 1));
        assert_eq!(split_floor(0), (0, 0));
    }

    #[test]
    fn test_soldier_hits_and_returns_target() {
        let mut s = Setup::new();
        let es = s.add(UnitKind::EarthSoldier, 100, 40, 1);
        let alien = s.add(UnitKind::AlienSoldier, 100, 10, 1);

        assert!(s.field.attack(es, 1));
        // (40 * 100 / 100) / sqrt(100) = 4
        assert_eq!(s.health(alien), Fixed::from_num(96));
        assert_eq!(s.field.army(Faction::Alien).live_count(UnitKind::AlienSoldier), 1);
        assert_eq!(s.field.take_fought(es), vec![alien]);
        assert!(s.field.take_fought(es).is_empty());
        assert_eq!(
            s.field.pool().get(alien).unwrap().first_attack_time(),
            Some(1)
        );
    }

    #[test]
    fn test_no_targets_reports_false() {
        let mut s = Setup::new();
        let es = s.add(UnitKind::EarthSoldier, 100, 40, 3);
        let before = s.health(es);

        assert!(!s.field.attack(es, 1));
        assert_eq!(s.health(es), before);
        assert!(s.field.take_fought(es).is_empty());
    }

    #[test]
    fn test_lethal_hit_goes_to_kill_list() {
        let mut s = Setup::new();
        let gunner = s.add(UnitKind::EarthGunner, 100, 100, 1);
        let monster = s.add(UnitKind::AlienMonster, 4, 10, 1);

        assert!(s.field.attack(gunner, 3));
        assert_eq!(s.field.killed_ids(), vec![monster]);
        assert!(s.field.army(Faction::Alien).is_dead());
        let dead = s.field.pool().get(monster).unwrap();
        assert_eq!(dead.destruction_time(), Some(3));
    }

    #[test]
    fn test_damaged_soldier_goes_to_maintenance() {
        let mut s = Setup::new();
        let alien = s.add(UnitKind::AlienSoldier, 100, 90, 1);
        let frail = s.add(UnitKind::EarthSoldier, 10, 10, 1);
        let tough = s.add(UnitKind::EarthSoldier, 100, 10, 1);

        // 90 / sqrt(10) ~ 28.5
        assert!(s.field.attack(alien, 2));
        assert_eq!(s.field.killed_ids(), vec![frail]);

        // seven hits leave ~21.8, the eighth ~2.5
        for now in 3..10 {
            s.field.attack(alien, now);
        }
        assert!(s.field.maintenance_ids().is_empty());
        assert!(s.field.attack(alien, 10));
        assert_eq!(s.field.maintenance_ids(), vec![tough]);
        assert_eq!(
            s.field.pool().get(tough).unwrap().maintenance_join_time(),
            Some(10)
        );
    }

    #[test]
    fn test_gunner_split() {
        let mut s = Setup::new();
        let gunner = s.add(UnitKind::EarthGunner, 100, 10, 3);
        for _ in 0..3 {
            s.add(UnitKind::AlienMonster, 100, 10, 1);
            s.add(UnitKind::AlienDrone, 100, 10, 1);
        }

        assert!(s.field.attack(gunner, 1));
        let fought = s.field.take_fought(gunner);
        let kinds: Vec<_> = fought
            .iter()
            .map(|&id| s.field.pool().get(id).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![UnitKind::AlienMonster, UnitKind::AlienMonster, UnitKind::AlienDrone]
        );
    }

    #[test]
    fn test_drone_alternates_tank_gunner() {
        let mut s = Setup::new();
        let drone = s.add(UnitKind::AlienDrone, 100, 10, 4);
        for _ in 0..2 {
            s.add(UnitKind::EarthTank, 100, 10, 1);
            s.add(UnitKind::EarthGunner, 100, 10, 1);
        }

        assert!(s.field.attack(drone, 1));
        let kinds: Vec<_> = s
            .field
            .take_fought(drone)
            .iter()
            .map(|&id| s.field.pool().get(id).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::EarthTank,
                UnitKind::EarthGunner,
                UnitKind::EarthTank,
                UnitKind::EarthGunner
            ]
        );
    }

    #[test]
    fn test_alien_soldier_splits_only_with_allies() {
        let mut s = Setup::new();
        let alien = s.add(UnitKind::AlienSoldier, 100, 10, 2);
        s.add(UnitKind::EarthSoldier, 100, 10, 1);
        s.add(UnitKind::EarthSoldier, 100, 10, 1);

        s.field.attack(alien, 1);
        assert_eq!(s.field.take_fought(alien).len(), 2);

        let saver = s.add(UnitKind::SaverUnit, 100, 10, 1);
        s.field.attack(alien, 2);
        let fought = s.field.take_fought(alien);
        assert_eq!(fought.len(), 2);
        assert_eq!(fought[1], saver);
    }

    #[test]
    fn test_tank_soldier_mode_hysteresis() {
        let mut s = Setup::new();
        let tank = s.add(UnitKind::EarthTank, 100, 10, 2);
        for _ in 0..10 {
            s.add(UnitKind::AlienSoldier, 100, 1, 1);
        }
        s.add(UnitKind::EarthSoldier, 100, 1, 1);

        s.field.attack(tank, 1);
        assert!(s.field.soldier_mode());
        let fought = s.field.take_fought(tank);
        assert_eq!(fought.len(), 1);

        // 5 of 10 is above 30% but below 80%, so the mode holds
        for _ in 0..4 {
            s.add(UnitKind::EarthSoldier, 100, 1, 1);
        }
        s.field.attack(tank, 2);
        assert!(s.field.soldier_mode());

        for _ in 0..3 {
            s.add(UnitKind::EarthSoldier, 100, 1, 1);
        }
        s.field.attack(tank, 3);
        assert!(!s.field.soldier_mode());
    }

    #[test]
    fn test_monster_infects_soldier() {
        let mut s = Setup::with_rules(CombatRules {
            infection_probability: 100,
            maintenance_timeout: 10,
        });
        let monster = s.add(UnitKind::AlienMonster, 100, 1, 2);
        let es = s.add(UnitKind::EarthSoldier, 100, 1, 1);

        assert!(s.field.attack(monster, 1));
        assert!(s.field.pool().get(es).unwrap().is_infected());
        assert_eq!(s.field.infected_soldiers(), 1);
        assert!(s.field.infection_alive());
    }

    #[test]
    fn test_infected_soldier_attacks_comrades_and_rejoins_tail() {
        let mut s = Setup::new();
        let carrier = s.add(UnitKind::EarthSoldier, 100, 10, 2);
        let a = s.add(UnitKind::EarthSoldier, 100, 10, 1);
        let b = s.add(UnitKind::EarthSoldier, 100, 10, 1);
        s.add(UnitKind::AlienSoldier, 100, 10, 1);
        s.field.pool.get_mut(carrier).unwrap().infect();

        assert!(s.field.attack(carrier, 1));
        assert_eq!(s.field.take_fought(carrier), vec![a, b]);
        assert_eq!(
            s.field.army(Faction::Earth).unit_ids(UnitKind::EarthSoldier),
            vec![a, b, carrier]
        );
    }

    fn wounded_soldier(s: &mut Setup, now: u64) -> UnitId {
        let es = s.add(UnitKind::EarthSoldier, 100, 10, 1);
        let handle = s.field.earth.remove_unit(UnitKind::EarthSoldier).unwrap();
        assert_eq!(handle.id(), es);
        s.field.pool.get_mut(es).unwrap().receive_damage(Fixed::from_num(90), now);
        assert_eq!(s.field.settle(handle, now), Disposition::Maintenance);
        es
    }

    #[test]
    fn test_healer_heals_and_is_consumed() {
        let mut s = Setup::new();
        let es = wounded_soldier(&mut s, 1);
        s.field.pool.get_mut(es).unwrap().infect();
        let healer = s.add(UnitKind::EarthHealer, 100, 100, 1);

        assert!(s.field.attack(healer, 2));
        let patient = s.field.pool().get(es).unwrap();
        // 10 + (100 * 100 / 100) / sqrt(10) ~ 41.6
        assert!(patient.health() > Fixed::from_num(41));
        assert!(patient.is_immune());
        assert_eq!(patient.maintenance_join_time(), None);
        assert!(s.field.army(Faction::Earth).contains(es));
        assert!(s.field.healed().contains(&es));

        assert_eq!(s.field.killed_ids(), vec![healer]);
        assert_eq!(s.field.army(Faction::Earth).live_count(UnitKind::EarthHealer), 0);
    }

    #[test]
    fn test_maintenance_timeout_kills() {
        let mut s = Setup::new();
        let es = wounded_soldier(&mut s, 1);
        let healer = s.add(UnitKind::EarthHealer, 100, 100, 1);

        assert!(s.field.attack(healer, 12));
        assert_eq!(s.field.killed_ids(), vec![es]);
        assert_eq!(s.field.pool().get(es).unwrap().destruction_time(), Some(12));
        // healer treated nobody and stays in its stack
        assert_eq!(s.field.army(Faction::Earth).live_count(UnitKind::EarthHealer), 1);
    }

    #[test]
    fn test_weak_heal_requeues_with_first_join_time() {
        let mut s = Setup::new();
        let es = wounded_soldier(&mut s, 1);
        let healer = s.add(UnitKind::EarthHealer, 10, 1, 3);

        assert!(s.field.attack(healer, 2));
        assert_eq!(s.field.maintenance_ids(), vec![es]);
        assert_eq!(
            s.field.pool().get(es).unwrap().maintenance_join_time(),
            Some(1)
        );
        assert_eq!(s.field.take_fought(healer), vec![es]);
    }

    #[test]
    fn test_withdraw_allies() {
        let mut s = Setup::new();
        let saver = s.add(UnitKind::SaverUnit, 100, 10, 1);
        assert_eq!(s.field.withdraw_allies(), 1);
        assert!(s.field.army(Faction::EarthAllied).is_dead());
        assert_eq!(s.field.retired_ids(), vec![saver]);
    }

    #[test]
    fn test_full_stack_retires_unit() {
        let mut field = Battlefield::new(1, Some(1), CombatRules::default());
        field.enlist(UnitId(1), UnitStats::new(UnitKind::EarthTank, 50, 5, 1), 0);
        field.enlist(UnitId(2), UnitStats::new(UnitKind::EarthTank, 50, 5, 1), 0);

        assert_eq!(field.army(Faction::Earth).live_count(UnitKind::EarthTank), 1);
        assert_eq!(field.retired_ids(), vec![UnitId(2)]);
    }

    #[test]
    fn test_no_ownership_faults_after_mixed_fighting() {
        let mut s = Setup::with_rules(CombatRules {
            infection_probability: 50,
            maintenance_timeout: 3,
        });
        let mut attackers = Vec::new();
        for kind in UnitKind::ALL {
            for _ in 0..3 {
                attackers.push(s.add(kind, 60, 40, 2));
            }
        }
        for now in 1..=6 {
            for &id in &attackers {
                let kind = s.field.pool().get(id).unwrap().kind();
                if !s.field.army(kind.faction()).contains(id) {
                    continue;
                }
                s.field.attack(id, now);
                s.field.take_fought(id);
            }
            assert!(s.field.ownership_faults().is_empty(), "tick {now}");
        }
    }
}
