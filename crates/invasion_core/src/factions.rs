//! Faction definitions and identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::UnitKind;

/// One of the opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Earth's home army.
    Earth,
    /// The invading alien army.
    Alien,
    /// Saver units called in when the infection spreads.
    EarthAllied,
}

impl Faction {
    /// All factions, in timestep attack order.
    pub const ALL: [Faction; 3] = [Faction::Earth, Faction::Alien, Faction::EarthAllied];

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Earth => "Earth",
            Self::Alien => "Alien",
            Self::EarthAllied => "Earth Allied",
        }
    }

    /// First id handed out to units of this faction.
    ///
    /// The id spaces are disjoint as long as a faction creates fewer than
    /// [`MAX_UNIT_CAP`] units.
    #[must_use]
    pub const fn id_base(&self) -> u32 {
        match self {
            Self::Earth => 1,
            Self::Alien => 2000,
            Self::EarthAllied => 4000,
        }
    }

    /// Unit kinds of this faction, in the army's attack order.
    #[must_use]
    pub const fn kinds(&self) -> &'static [UnitKind] {
        match self {
            Self::Earth => &[
                UnitKind::EarthSoldier,
                UnitKind::EarthTank,
                UnitKind::EarthGunner,
                UnitKind::EarthHealer,
            ],
            Self::Alien => &[
                UnitKind::AlienSoldier,
                UnitKind::AlienMonster,
                UnitKind::AlienDrone,
            ],
            Self::EarthAllied => &[UnitKind::SaverUnit],
        }
    }
}

/// Largest per-faction unit cap that keeps the id spaces disjoint.
pub const MAX_UNIT_CAP: u32 = 1999;

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
