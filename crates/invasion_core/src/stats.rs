//! End-of-battle statistics.
//!
//! Everything here is derived from a finished (or paused) [`Game`]; nothing
//! is tracked incrementally. Ratios are plain `f64` because they only feed
//! reports.

use serde::{Deserialize, Serialize};

use crate::factions::Faction;
use crate::game::{Game, Outcome};
use crate::math::to_f64;
use crate::unit::{Unit, UnitId, UnitKind};

/// One kill-list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillRecord {
    /// Destruction time.
    pub td: u64,
    /// Unit id.
    pub id: UnitId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Join time.
    pub tj: u64,
    /// First-attack delay, `Ta - Tj`. `None` for units destroyed untouched.
    pub df: Option<u64>,
    /// Destruction delay, `Td - Ta`.
    pub dd: Option<u64>,
    /// Battle delay, `Td - Tj`.
    pub db: u64,
}

impl KillRecord {
    fn from_unit(unit: &Unit) -> Option<Self> {
        let td = unit.destruction_time()?;
        Some(Self {
            td,
            id: unit.id(),
            kind: unit.kind(),
            tj: unit.join_time(),
            df: unit.first_attack_delay(),
            dd: unit.destruction_delay(),
            db: td.saturating_sub(unit.join_time()),
        })
    }
}

/// Counts for one unit kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindStats {
    /// The kind.
    pub kind: UnitKind,
    /// Units created.
    pub total: usize,
    /// Units destroyed.
    pub destroyed: usize,
    /// `destroyed / total`, in percent.
    pub destroyed_percent: f64,
}

/// Aggregates for one faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionStats {
    /// The faction.
    pub faction: Faction,
    /// Per-kind counts, in attack order.
    pub kinds: Vec<KindStats>,
    /// Units created.
    pub total: usize,
    /// Units destroyed.
    pub destroyed: usize,
    /// `destroyed / total`, in percent.
    pub destroyed_percent: f64,
    /// Mean first-attack delay over destroyed units.
    pub average_df: f64,
    /// Mean destruction delay over destroyed units.
    pub average_dd: f64,
    /// Mean battle delay over destroyed units.
    pub average_db: f64,
    /// `sum(Df) / sum(Db)`, in percent.
    pub df_db_percent: f64,
    /// `sum(Dd) / sum(Db)`, in percent.
    pub dd_db_percent: f64,
    /// Units healed at least once.
    pub healed: usize,
    /// `healed / total`, in percent.
    pub healed_percent: f64,
    /// Units ever infected.
    pub infected: usize,
    /// Mean health of units still in the army.
    pub average_live_health: f64,
}

/// Full statistics for a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleStatistics {
    /// Timesteps played.
    pub timesteps: u64,
    /// Result at the time of collection.
    pub outcome: Outcome,
    /// Kill list, in order of death.
    pub killed: Vec<KillRecord>,
    /// Per-faction aggregates.
    pub factions: Vec<FactionStats>,
    /// Factions that hit their unit cap.
    pub capped: Vec<Faction>,
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<u64>() as f64 / values.len() as f64
    }
}

impl BattleStatistics {
    /// Collect statistics from `game`.
    #[must_use]
    pub fn collect(game: &Game) -> Self {
        let field = game.battlefield();
        let killed = field
            .killed_ids()
            .into_iter()
            .filter_map(|id| game.pool().get(id))
            .filter_map(KillRecord::from_unit)
            .collect::<Vec<_>>();

        let factions = Faction::ALL
            .iter()
            .map(|&faction| Self::faction_stats(game, faction, &killed))
            .collect();

        Self {
            timesteps: game.tick(),
            outcome: game.outcome(),
            killed,
            factions,
            capped: game.capped_factions().iter().copied().collect(),
        }
    }

    fn faction_stats(game: &Game, faction: Faction, killed: &[KillRecord]) -> FactionStats {
        let units: Vec<&Unit> = game
            .pool()
            .iter()
            .filter(|u| u.faction() == faction)
            .collect();
        let dead: Vec<&KillRecord> = killed
            .iter()
            .filter(|r| r.kind.faction() == faction)
            .collect();

        let kinds = faction
            .kinds()
            .iter()
            .map(|&kind| {
                let total = units.iter().filter(|u| u.kind() == kind).count();
                let destroyed = dead.iter().filter(|r| r.kind == kind).count();
                KindStats {
                    kind,
                    total,
                    destroyed,
                    destroyed_percent: percent(destroyed as f64, total as f64),
                }
            })
            .collect();

        let df: Vec<u64> = dead.iter().filter_map(|r| r.df).collect();
        let dd: Vec<u64> = dead.iter().filter_map(|r| r.dd).collect();
        let db: Vec<u64> = dead.iter().map(|r| r.db).collect();
        let sum_db = db.iter().sum::<u64>() as f64;

        let healed = game
            .battlefield()
            .healed()
            .iter()
            .filter(|id| game.pool().get(**id).is_some_and(|u| u.faction() == faction))
            .count();
        let infected = units
            .iter()
            .filter(|u| u.is_infected() || u.is_immune())
            .count();

        let army = game.battlefield().army(faction);
        let live: Vec<f64> = army
            .kinds()
            .iter()
            .flat_map(|&kind| army.unit_ids(kind))
            .filter_map(|id| game.pool().get(id))
            .map(|u| to_f64(u.health()))
            .collect();
        let average_live_health = if live.is_empty() {
            0.0
        } else {
            live.iter().sum::<f64>() / live.len() as f64
        };

        FactionStats {
            faction,
            kinds,
            total: units.len(),
            destroyed: dead.len(),
            destroyed_percent: percent(dead.len() as f64, units.len() as f64),
            average_df: mean(&df),
            average_dd: mean(&dd),
            average_db: mean(&db),
            df_db_percent: percent(df.iter().sum::<u64>() as f64, sum_db),
            dd_db_percent: percent(dd.iter().sum::<u64>() as f64, sum_db),
            healed,
            healed_percent: percent(healed as f64, units.len() as f64),
            infected,
            average_live_health,
        }
    }

    /// Statistics for `faction`.
    #[must_use]
    pub fn faction(&self, faction: Faction) -> Option<&FactionStats> {
        self.factions.iter().find(|f| f.faction == faction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, SpawnContext};
    use crate::unit::UnitStats;

    fn nothing(_: &SpawnContext) -> Vec<UnitStats> {
        Vec::new()
    }

    #[test]
    fn test_percent_and_mean_handle_empty() {
        assert_eq!(percent(1.0, 0.0), 0.0);
        assert_eq!(percent(1.0, 4.0), 25.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2, 4]), 3.0);
    }

    #[test]
    fn test_collect_after_kill() {
        let mut game = Game::new(GameConfig {
            min_timesteps: 1,
            ..GameConfig::default()
        })
        .unwrap();
        game.add_unit(UnitStats::new(UnitKind::EarthGunner, 100, 100, 1))
            .unwrap();
        game.add_unit(UnitStats::new(UnitKind::AlienMonster, 4, 1, 1))
            .unwrap();
        game.add_unit(UnitStats::new(UnitKind::AlienDrone, 100, 1, 1))
            .unwrap();
        game.step(&mut nothing);

        let stats = BattleStatistics::collect(&game);
        assert_eq!(stats.timesteps, 1);
        assert_eq!(stats.killed.len(), 1);
        let record = &stats.killed[0];
        assert_eq!(record.id, UnitId(2000));
        assert_eq!((record.td, record.tj, record.db), (1, 0, 1));
        assert_eq!(record.df, Some(1));
        assert_eq!(record.dd, Some(0));

        let alien = stats.faction(Faction::Alien).unwrap();
        assert_eq!(alien.total, 2);
        assert_eq!(alien.destroyed, 1);
        assert_eq!(alien.destroyed_percent, 50.0);
        assert_eq!(alien.kinds[1].kind, UnitKind::AlienMonster);
        assert_eq!(alien.kinds[1].destroyed_percent, 100.0);
        assert_eq!(alien.df_db_percent, 100.0);
        assert_eq!(alien.dd_db_percent, 0.0);

        let earth = stats.faction(Faction::Earth).unwrap();
        assert_eq!(earth.destroyed, 0);
        assert_eq!(earth.average_db, 0.0);
        assert!(stats.capped.is_empty());
    }
}
