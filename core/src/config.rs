//! Tunable parameters for a run and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LevelDimensions;

/// Reasons a configuration value is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The map cannot hold a walled maze.
    #[error("map must be at least 5x5 cells (received {width}x{height})")]
    MapTooSmall {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Floors are numbered from one.
    #[error("floor numbers start at 1")]
    ZeroFloor,
    /// A per-tick speed must be strictly positive and finite.
    #[error("{name} must be positive (received {value})")]
    NonPositiveSpeed {
        /// Name of the offending field.
        name: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// Enemies must tick at some cadence.
    #[error("enemy_tick_interval must be at least 1 frame")]
    ZeroTickInterval,
    /// At least one floor must be playable.
    #[error("final_floor must be at least 1")]
    ZeroFinalFloor,
    /// Descending must not hurt the player.
    #[error("floor_heal must not be negative (received {value})")]
    NegativeFloorHeal {
        /// Value that failed validation.
        value: i32,
    },
    /// The player must start alive.
    #[error("max_health must be positive (received {value})")]
    NonPositiveHealth {
        /// Value that failed validation.
        value: i32,
    },
}

/// Complete set of knobs for a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Level size.
    pub map: MapConfig,
    /// Per-tick movement and cadence.
    pub tuning: Tuning,
    /// Starting player stats.
    pub player: PlayerConfig,
    /// Floor count and between-floor rewards.
    pub progression: ProgressionConfig,
    /// Whether enemy AI is reproducible from the seed alone.
    pub ai_randomness: AiRandomness,
}

impl GameConfig {
    /// Checks every section, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.map.dimensions()?;
        self.tuning.validate()?;
        if self.player.max_health <= 0 {
            return Err(ConfigError::NonPositiveHealth {
                value: self.player.max_health,
            });
        }
        if self.progression.final_floor == 0 {
            return Err(ConfigError::ZeroFinalFloor);
        }
        if self.progression.floor_heal < 0 {
            return Err(ConfigError::NegativeFloorHeal {
                value: self.progression.floor_heal,
            });
        }
        Ok(())
    }
}

/// Level size in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl MapConfig {
    /// Validated dimensions for the generator.
    pub fn dimensions(&self) -> Result<LevelDimensions, ConfigError> {
        LevelDimensions::new(self.width, self.height)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 60,
        }
    }
}

/// Per-tick movement speeds and the enemy cadence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Cells travelled per move command.
    pub move_speed: f32,
    /// Radians rotated per turn command.
    pub turn_speed: f32,
    /// Frames between enemy ticks, decoupling enemy speed from frame rate.
    pub enemy_tick_interval: u32,
}

impl Tuning {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("move_speed", self.move_speed),
            ("turn_speed", self.turn_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveSpeed { name, value });
            }
        }
        if self.enemy_tick_interval == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_speed: 0.15,
            turn_speed: 0.1,
            enemy_tick_interval: 5,
        }
    }
}

/// Starting player stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Starting and maximum health.
    pub max_health: i32,
    /// Damage per shot.
    pub damage: u32,
    /// Weapon display name.
    pub weapon: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            damage: 25,
            weapon: "Laser Gun".to_owned(),
        }
    }
}

/// Floor count and rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Last playable floor; using its exit wins the game.
    pub final_floor: u32,
    /// Health restored when descending.
    pub floor_heal: i32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            final_floor: 5,
            floor_heal: 20,
        }
    }
}

/// Source of randomness for enemy decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiRandomness {
    /// Derived from the run seed, floor and tick index only.
    #[default]
    Seeded,
    /// Additionally perturbed by wall-clock time, so runs diverge.
    WallClockPerturbed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_negative_floor_heal() {
        let mut config = GameConfig::default();
        config.progression.floor_heal = -20;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeFloorHeal { value: -20 })
        );

        config.progression.floor_heal = 0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut config = GameConfig::default();
        config.tuning.turn_speed = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveSpeed {
                name: "turn_speed",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_zero_cadence() {
        let mut config = GameConfig::default();
        config.tuning.enemy_tick_interval = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn rejects_tiny_map() {
        let mut config = GameConfig::default();
        config.map.width = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MapTooSmall { width: 3, .. })
        ));
    }

    #[test]
    fn error_messages_name_the_field() {
        let error = ConfigError::NonPositiveSpeed {
            name: "move_speed",
            value: -1.0,
        };
        assert_eq!(error.to_string(), "move_speed must be positive (received -1)");
    }
}
