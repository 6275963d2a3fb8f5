//! Scenario loading and validation.
//!
//! A scenario holds the generation parameters for a battle: wave size,
//! kind mix per army, spawn probability, stat ranges and the infection
//! settings. Two file formats are accepted:
//!
//! - **Text** (any extension but `.ron`): whitespace-separated tokens
//!
//!   ```text
//!   N
//!   ES% ET% EG% EH%
//!   AS% AM% AD%
//!   prob
//!   earth power(min-max) health(min-max) capacity(min-max)
//!   alien power(min-max) health(min-max) capacity(min-max)
//!   [allied power(min-max) health(min-max) capacity(min-max)]
//!   [infection_probability infection_threshold]
//!   ```
//!
//!   Allied ranges are told apart from the infection numbers by their `-`.
//!   Spaces around the `-` are allowed.
//!
//! - **RON** (`.ron`): the [`Scenario`] struct itself.

use std::path::Path;

use invasion_core::game::GameConfig;
use invasion_core::unit::{UnitKind, MAX_ATTACK_CAPACITY, MAX_HEALTH, MAX_POWER};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// A token in a text scenario could not be read.
    #[error("Failed to parse scenario at '{token}': {message}")]
    ParseError {
        /// The offending token, or `<end of file>`.
        token: String,
        /// What was expected.
        message: String,
    },
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    RonError(#[from] ron::error::SpannedError),
    /// Parsed but inconsistent.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRange {
    /// Lower bound.
    pub min: i32,
    /// Upper bound.
    pub max: i32,
}

impl StatRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Stat ranges for one army.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyRanges {
    /// Attack power.
    pub power: StatRange,
    /// Starting health.
    pub health: StatRange,
    /// Attack capacity.
    pub capacity: StatRange,
}

/// Earth kind mix, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarthMix {
    /// Earth soldiers.
    pub soldier: u8,
    /// Earth tanks.
    pub tank: u8,
    /// Earth gunners.
    pub gunner: u8,
    /// Earth healers.
    pub healer: u8,
}

/// Alien kind mix, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlienMix {
    /// Alien soldiers.
    pub soldier: u8,
    /// Alien monsters.
    pub monster: u8,
    /// Alien drones.
    pub drone: u8,
}

impl EarthMix {
    /// Kinds paired with their shares, in cumulative order.
    #[must_use]
    pub const fn shares(&self) -> [(UnitKind, u8); 4] {
        [
            (UnitKind::EarthSoldier, self.soldier),
            (UnitKind::EarthTank, self.tank),
            (UnitKind::EarthGunner, self.gunner),
            (UnitKind::EarthHealer, self.healer),
        ]
    }
}

impl AlienMix {
    /// Kinds paired with their shares, in cumulative order.
    #[must_use]
    pub const fn shares(&self) -> [(UnitKind, u8); 3] {
        [
            (UnitKind::AlienSoldier, self.soldier),
            (UnitKind::AlienMonster, self.monster),
            (UnitKind::AlienDrone, self.drone),
        ]
    }
}

fn default_threshold() -> u8 {
    100
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Units generated per army when the spawn roll succeeds.
    pub units_per_wave: u32,
    /// Earth kind mix.
    pub earth_mix: EarthMix,
    /// Alien kind mix.
    pub alien_mix: AlienMix,
    /// Chance, in percent, that an army receives a wave in a timestep.
    pub probability: u8,
    /// Earth stat ranges.
    pub earth: ArmyRanges,
    /// Alien stat ranges.
    pub alien: ArmyRanges,
    /// Saver unit stat ranges. Earth ranges are used when absent.
    #[serde(default)]
    pub allied: Option<ArmyRanges>,
    /// Chance, in percent, that a monster hit infects a soldier.
    #[serde(default)]
    pub infection_probability: u8,
    /// Infected share of soldiers, in percent, that calls the allies.
    #[serde(default = "default_threshold")]
    pub infection_threshold: u8,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            units_per_wave: 3,
            earth_mix: EarthMix {
                soldier: 60,
                tank: 20,
                gunner: 15,
                healer: 5,
            },
            alien_mix: AlienMix {
                soldier: 60,
                monster: 20,
                drone: 20,
            },
            probability: 60,
            earth: ArmyRanges {
                power: StatRange::new(5, 50),
                health: StatRange::new(40, 100),
                capacity: StatRange::new(1, 3),
            },
            alien: ArmyRanges {
                power: StatRange::new(5, 50),
                health: StatRange::new(40, 100),
                capacity: StatRange::new(1, 3),
            },
            allied: None,
            infection_probability: 0,
            infection_threshold: 100,
        }
    }
}

impl Scenario {
    /// Load and validate a scenario file.
    ///
    /// `.ron` files are read as RON, everything else as the text format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let is_ron = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
        let scenario = if is_ron {
            Self::from_ron_str(&contents)?
        } else {
            Self::from_text(&contents)?
        };
        tracing::debug!(path = %path.display(), ?scenario, "scenario loaded");
        Ok(scenario)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse the whitespace-separated text format.
    pub fn from_text(text: &str) -> Result<Self, ScenarioError> {
        let mut tokens = Tokens::new(text);

        let units_per_wave = tokens.number("wave size")?;
        let earth_mix = EarthMix {
            soldier: tokens.number("ES percentage")?,
            tank: tokens.number("ET percentage")?,
            gunner: tokens.number("EG percentage")?,
            healer: tokens.number("EH percentage")?,
        };
        let alien_mix = AlienMix {
            soldier: tokens.number("AS percentage")?,
            monster: tokens.number("AM percentage")?,
            drone: tokens.number("AD percentage")?,
        };
        let probability = tokens.number("spawn probability")?;
        let earth = tokens.ranges("earth")?;
        let alien = tokens.ranges("alien")?;

        let allied = if tokens.peek_at(1) == Some("-") {
            Some(tokens.ranges("allied")?)
        } else {
            None
        };

        let (infection_probability, infection_threshold) = if tokens.peek().is_some() {
            (
                tokens.number("infection probability")?,
                tokens.number("infection threshold")?,
            )
        } else {
            (0, default_threshold())
        };

        if let Some(extra) = tokens.peek() {
            return Err(ScenarioError::ParseError {
                token: extra.to_string(),
                message: "unexpected trailing token".to_string(),
            });
        }

        let scenario = Self {
            units_per_wave,
            earth_mix,
            alien_mix,
            probability,
            earth,
            alien,
            allied,
            infection_probability,
            infection_threshold,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check percentages and ranges.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let earth_total: u32 = self.earth_mix.shares().iter().map(|(_, p)| u32::from(*p)).sum();
        if earth_total != 100 {
            return Err(ScenarioError::Invalid(format!(
                "earth percentages sum to {earth_total}, expected 100"
            )));
        }
        let alien_total: u32 = self.alien_mix.shares().iter().map(|(_, p)| u32::from(*p)).sum();
        if alien_total != 100 {
            return Err(ScenarioError::Invalid(format!(
                "alien percentages sum to {alien_total}, expected 100"
            )));
        }
        for (name, value) in [
            ("spawn probability", self.probability),
            ("infection probability", self.infection_probability),
            ("infection threshold", self.infection_threshold),
        ] {
            if value > 100 {
                return Err(ScenarioError::Invalid(format!(
                    "{name} is {value}, expected at most 100"
                )));
            }
        }

        let mut armies = vec![("earth", self.earth), ("alien", self.alien)];
        if let Some(allied) = self.allied {
            armies.push(("allied", allied));
        }
        for (army, ranges) in armies {
            let capacity_limit = i32::try_from(MAX_ATTACK_CAPACITY).unwrap_or(i32::MAX);
            for (stat, range, limit) in [
                ("power", ranges.power, MAX_POWER),
                ("health", ranges.health, MAX_HEALTH),
                ("capacity", ranges.capacity, capacity_limit),
            ] {
                if range.min < 0 || range.min > range.max {
                    return Err(ScenarioError::Invalid(format!(
                        "{army} {stat} range {}-{} is not a valid range",
                        range.min, range.max
                    )));
                }
                if range.max > limit {
                    return Err(ScenarioError::Invalid(format!(
                        "{army} {stat} range {}-{} exceeds the limit of {limit}",
                        range.min, range.max
                    )));
                }
            }
        }
        Ok(())
    }

    /// Game config for this scenario with the given seed.
    #[must_use]
    pub fn game_config(&self, seed: u64) -> GameConfig {
        GameConfig {
            seed,
            infection_probability: self.infection_probability,
            infection_threshold: self.infection_threshold,
            ..GameConfig::default()
        }
    }

    /// Ranges for saver units.
    #[must_use]
    pub fn allied_ranges(&self) -> ArmyRanges {
        self.allied.unwrap_or(self.earth)
    }
}

struct Tokens<'a> {
    items: Vec<&'a str>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Split on whitespace, with every `-` a token of its own, so `5-50`
    /// and `5 - 50` read the same.
    fn new(text: &'a str) -> Self {
        let mut items = Vec::new();
        for word in text.split_whitespace() {
            let mut rest = word;
            while let Some(at) = rest.find('-') {
                if at > 0 {
                    items.push(&rest[..at]);
                }
                items.push("-");
                rest = &rest[at + 1..];
            }
            if !rest.is_empty() {
                items.push(rest);
            }
        }
        Self { items, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a str> {
        self.items.get(self.pos + offset).copied()
    }

    fn next(&mut self, what: &str) -> Result<&'a str, ScenarioError> {
        let token = self.peek().ok_or_else(|| ScenarioError::ParseError {
            token: "<end of file>".to_string(),
            message: format!("expected {what}"),
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, ScenarioError> {
        let token = self.next(what)?;
        token.parse().map_err(|_| ScenarioError::ParseError {
            token: token.to_string(),
            message: format!("expected {what} as a non-negative integer"),
        })
    }

    fn range(&mut self, what: &str) -> Result<StatRange, ScenarioError> {
        let min = self.number(&format!("{what} minimum"))?;
        let hyphen = self.next(&format!("'-' in {what}"))?;
        if hyphen != "-" {
            return Err(ScenarioError::ParseError {
                token: hyphen.to_string(),
                message: format!("expected {what} as min-max"),
            });
        }
        let max = self.number(&format!("{what} maximum"))?;
        Ok(StatRange { min, max })
    }

    fn ranges(&mut self, army: &str) -> Result<ArmyRanges, ScenarioError> {
        Ok(ArmyRanges {
            power: self.range(&format!("{army} power range"))?,
            health: self.range(&format!("{army} health range"))?,
            capacity: self.range(&format!("{army} capacity range"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
10
60 20 15 5
50 30 20
80
5-50 40-100 1-3
10-60 30-90 1-4
";

    #[test]
    fn test_parse_basic_text() {
        let scenario = Scenario::from_text(BASIC).unwrap();
        assert_eq!(scenario.units_per_wave, 10);
        assert_eq!(scenario.earth_mix.gunner, 15);
        assert_eq!(scenario.alien_mix.drone, 20);
        assert_eq!(scenario.probability, 80);
        assert_eq!(scenario.alien.capacity, StatRange::new(1, 4));
        assert_eq!(scenario.allied, None);
        assert_eq!(scenario.infection_threshold, 100);
    }

    #[test]
    fn test_parse_allied_and_infection() {
        let text = format!("{BASIC}20-40 50-100 2-3\n5 30\n");
        let scenario = Scenario::from_text(&text).unwrap();
        assert_eq!(
            scenario.allied.map(|a| a.health),
            Some(StatRange::new(50, 100))
        );
        assert_eq!(scenario.infection_probability, 5);
        assert_eq!(scenario.infection_threshold, 30);
    }

    #[test]
    fn test_parse_infection_without_allies() {
        let text = format!("{BASIC}7 25");
        let scenario = Scenario::from_text(&text).unwrap();
        assert_eq!(scenario.allied, None);
        assert_eq!(scenario.allied_ranges(), scenario.earth);
        assert_eq!(scenario.infection_probability, 7);
    }

    #[test]
    fn test_truncated_file() {
        let err = Scenario::from_text("10\n60 20 15").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError { ref token, .. } if token == "<end of file>"));
    }

    #[test]
    fn test_bad_token() {
        let err = Scenario::from_text("ten").unwrap_err();
        match err {
            ScenarioError::ParseError { token, message } => {
                assert_eq!(token, "ten");
                assert!(message.contains("wave size"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_range() {
        let text = BASIC.replace("5-50", "5_50");
        assert!(matches!(
            Scenario::from_text(&text),
            Err(ScenarioError::ParseError { .. })
        ));
    }

    #[test]
    fn test_spaced_hyphens() {
        let spaced = BASIC.replace("5-50", "5 - 50").replace("1-4", "1 -4");
        assert_eq!(
            Scenario::from_text(&spaced).unwrap(),
            Scenario::from_text(BASIC).unwrap()
        );

        let text = format!("{BASIC}20 - 40 50 - 100 2 - 3\n5 30\n");
        let scenario = Scenario::from_text(&text).unwrap();
        assert_eq!(scenario.allied.map(|a| a.power), Some(StatRange::new(20, 40)));
        assert_eq!(scenario.infection_threshold, 30);
    }

    #[test]
    fn test_missing_hyphen() {
        let text = BASIC.replace("5-50", "5 50");
        assert!(matches!(
            Scenario::from_text(&text),
            Err(ScenarioError::ParseError { ref token, .. }) if token == "50"
        ));
    }

    #[test]
    fn test_out_of_bound_ranges_rejected() {
        for (from, to) in [
            ("5-50", "2147483600-2147483647"),
            ("40-100", "40-101"),
            ("1-3", "1-5000"),
        ] {
            let text = BASIC.replace(from, to);
            match Scenario::from_text(&text) {
                Err(ScenarioError::Invalid(message)) => assert!(message.contains("limit")),
                other => panic!("{to}: unexpected result {other:?}"),
            }
        }
        let text = BASIC.replace("5-50", "5-10000");
        assert!(Scenario::from_text(&text).is_ok());
    }

    #[test]
    fn test_trailing_token() {
        let text = format!("{BASIC}5 30 99");
        assert!(matches!(
            Scenario::from_text(&text),
            Err(ScenarioError::ParseError { ref token, .. }) if token == "99"
        ));
    }

    #[test]
    fn test_percentages_must_sum_to_100() {
        let text = BASIC.replace("60 20 15 5", "60 20 15 6");
        assert!(matches!(
            Scenario::from_text(&text),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let text = BASIC.replace("40-100", "100-40");
        assert!(matches!(
            Scenario::from_text(&text),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_probability_bound() {
        let text = BASIC.replace("\n80\n", "\n101\n");
        assert!(matches!(
            Scenario::from_text(&text),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(Scenario::default().validate().is_ok());
    }

    #[test]
    fn test_ron_round_trip() {
        let scenario = Scenario::default();
        let text = ron::to_string(&scenario).unwrap();
        assert_eq!(Scenario::from_ron_str(&text).unwrap(), scenario);
    }

    #[test]
    fn test_game_config_carries_infection() {
        let text = format!("{BASIC}5 30");
        let config = Scenario::from_text(&text).unwrap().game_config(9);
        assert_eq!(config.seed, 9);
        assert_eq!(config.infection_probability, 5);
        assert_eq!(config.infection_threshold, 30);
        assert_eq!(config.min_timesteps, 40);
    }
}
