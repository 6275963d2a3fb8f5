//! Arena storage for every unit created during a run.
//!
//! The pool owns all [`Unit`] values. Armies and lists hold [`UnitHandle`]s,
//! which can be moved but not copied or cloned, and only the pool creates
//! them. Each unit therefore has one handle, and that handle sits in exactly
//! one container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::factions::{Faction, MAX_UNIT_CAP};
use crate::unit::{Unit, UnitId, UnitStats};

/// Move-only ownership token for a unit in the pool.
#[derive(Debug, PartialEq, Eq)]
pub struct UnitHandle(UnitId);

impl UnitHandle {
    /// Id of the unit this handle refers to.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.0
    }
}

/// Monotonic id counter for one faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    faction: Faction,
    issued: u32,
    cap: u32,
}

impl IdAllocator {
    /// Create an allocator that hands out at most `cap` ids.
    #[must_use]
    pub fn new(faction: Faction, cap: u32) -> Self {
        Self {
            faction,
            issued: 0,
            cap: cap.min(MAX_UNIT_CAP),
        }
    }

    /// Next id, or `UnitCapReached` when the faction's budget is spent.
    pub fn allocate(&mut self) -> Result<UnitId> {
        if self.issued >= self.cap {
            return Err(GameError::UnitCapReached(self.faction));
        }
        let id = UnitId(self.faction.id_base() + self.issued);
        self.issued += 1;
        Ok(id)
    }

}

/// Storage for all units in the simulation, keyed by id.
///
/// A `BTreeMap` keeps iteration in id order, which keeps statistics and
/// state hashes deterministic.
#[derive(Debug, Clone, Default)]
pub struct UnitPool {
    units: BTreeMap<UnitId, Unit>,
}

impl UnitPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a unit from `stats` and return the only handle to it.
    pub(crate) fn create(&mut self, id: UnitId, stats: UnitStats, now: u64) -> UnitHandle {
        self.units.insert(id, Unit::new(id, stats, now));
        UnitHandle(id)
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable reference to a unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Look up the unit behind a handle.
    ///
    /// Handles are only minted by the pool, so this cannot miss for a
    /// handle that came from this pool.
    #[must_use]
    pub fn resolve(&self, handle: &UnitHandle) -> Option<&Unit> {
        self.units.get(&handle.0)
    }

    /// Number of units ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over all units in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitKind;

    #[test]
    fn test_allocator_starts_at_faction_base() {
        let mut earth = IdAllocator::new(Faction::Earth, 10);
        let mut alien = IdAllocator::new(Faction::Alien, 10);

        assert_eq!(earth.allocate(), Ok(UnitId(1)));
        assert_eq!(earth.allocate(), Ok(UnitId(2)));
        assert_eq!(alien.allocate(), Ok(UnitId(2000)));
        assert_eq!(earth.allocate(), Ok(UnitId(3)));
    }

    #[test]
    fn test_allocator_cap() {
        let mut allied = IdAllocator::new(Faction::EarthAllied, 2);
        assert!(allied.allocate().is_ok());
        assert!(allied.allocate().is_ok());
        assert_eq!(
            allied.allocate(),
            Err(GameError::UnitCapReached(Faction::EarthAllied))
        );
    }

    #[test]
    fn test_allocator_cap_limited_to_id_space() {
        let mut allocator = IdAllocator::new(Faction::Earth, 50_000);
        let mut last = UnitId(0);
        while let Ok(id) = allocator.allocate() {
            last = id;
        }
        assert_eq!(last, UnitId(MAX_UNIT_CAP));
    }

    #[test]
    fn test_create_and_resolve() {
        let mut pool = UnitPool::new();
        let handle = pool.create(UnitId(7), UnitStats::new(UnitKind::EarthTank, 50, 10, 1), 2);

        assert_eq!(handle.id(), UnitId(7));
        assert_eq!(pool.resolve(&handle).map(Unit::join_time), Some(2));
        assert!(pool.get(UnitId(8)).is_none());
        assert_eq!(pool.len(), 1);
    }
}
