#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for the Terminal Abyss.
//!
//! [`apply`] routes a [`Command`] to the system that owns it and is the only
//! way the snapshot changes. [`Session`] layers the per-frame loop on top:
//! it turns held intents into commands and schedules enemy ticks.

use terminal_abyss_core::{Command, ConfigError, Event, GameConfig, GameSnapshot, Intents, Phase};
use terminal_abyss_system_bootstrap::Bootstrap;
use terminal_abyss_system_combat::interact;
use terminal_abyss_system_enemy_ai::{ai_stream, enemy_tick};
use terminal_abyss_system_movement::{move_player, turn_player};
use tracing::debug;

/// Applies the provided command, returning the replacement snapshot.
///
/// Once the run is won or lost the snapshot is returned untouched and no
/// events are emitted.
pub fn apply(
    snapshot: GameSnapshot,
    command: Command,
    config: &GameConfig,
    out_events: &mut Vec<Event>,
) -> GameSnapshot {
    if snapshot.phase() != Phase::Playing {
        return snapshot;
    }

    match command {
        Command::Move { forward, strafe } => {
            move_player(snapshot, forward, strafe, &config.tuning, out_events)
        }
        Command::Turn { right } => turn_player(snapshot, right, &config.tuning, out_events),
        Command::Interact => interact(snapshot, config, out_events),
        Command::EnemyTick => {
            let mut rng = ai_stream(&snapshot, config.ai_randomness);
            enemy_tick(snapshot, &mut rng, out_events)
        }
    }
}

/// Expands held intents into commands in the order the frame applies them.
#[must_use]
pub fn intent_commands(intents: &mut Intents) -> Vec<Command> {
    let mut commands = Vec::new();
    if intents.forward {
        commands.push(Command::Move {
            forward: true,
            strafe: false,
        });
    }
    if intents.backward {
        commands.push(Command::Move {
            forward: false,
            strafe: false,
        });
    }
    if intents.strafe_left {
        commands.push(Command::Move {
            forward: false,
            strafe: true,
        });
    }
    if intents.strafe_right {
        commands.push(Command::Move {
            forward: true,
            strafe: true,
        });
    }
    if intents.turn_left {
        commands.push(Command::Turn { right: false });
    }
    if intents.turn_right {
        commands.push(Command::Turn { right: true });
    }
    if intents.take_interact() {
        commands.push(Command::Interact);
    }
    commands
}

/// Outcome of a single [`Session::advance`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// One-based index of the frame that ran.
    pub frame: u64,
    /// Events emitted by every command of the frame, in order.
    pub events: Vec<Event>,
    /// Phase after the frame.
    pub phase: Phase,
}

/// A running game: configuration, current snapshot and frame counter.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    snapshot: GameSnapshot,
    frame: u64,
}

impl Session {
    /// Starts a new run for `seed`.
    pub fn new(seed: u64, config: GameConfig) -> Result<Self, ConfigError> {
        let snapshot = Bootstrap.new_game(seed, &config)?;
        Ok(Self {
            config,
            snapshot,
            frame: 0,
        })
    }

    /// Resumes from an existing snapshot.
    pub fn resume(snapshot: GameSnapshot, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            snapshot,
            frame: 0,
        })
    }

    /// Current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of frames advanced so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Applies a single command outside the frame loop.
    pub fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let snapshot = std::mem::take(&mut self.snapshot);
        self.snapshot = apply(snapshot, command, &self.config, out_events);
    }

    /// Runs one frame.
    ///
    /// Held intents are applied first, then the pending interaction, which is
    /// cleared. Every `enemy_tick_interval` frames the enemies act last.
    pub fn advance(&mut self, intents: &mut Intents) -> FrameReport {
        self.frame = self.frame.saturating_add(1);
        let mut events = Vec::new();

        for command in intent_commands(intents) {
            self.execute(command, &mut events);
        }

        let interval = u64::from(self.config.tuning.enemy_tick_interval.max(1));
        if self.frame % interval == 0 {
            self.execute(Command::EnemyTick, &mut events);
        }

        let phase = self.snapshot.phase();
        if phase != Phase::Playing {
            debug!(frame = self.frame, ?phase, "frame ended the run");
        }
        FrameReport {
            frame: self.frame,
            events,
            phase,
        }
    }
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use terminal_abyss_core::{Entity, GameSnapshot, Phase};
    use terminal_abyss_system_raycasting::can_see_entity;

    /// Compass direction toward a target along its dominant axis.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum Bearing {
        /// Increasing columns.
        East,
        /// Decreasing columns.
        West,
        /// Decreasing rows.
        North,
        /// Increasing rows.
        South,
    }

    /// Current phase of the run.
    #[must_use]
    pub fn phase(snapshot: &GameSnapshot) -> Phase {
        snapshot.phase()
    }

    /// Reports whether the player has run out of health.
    #[must_use]
    pub fn is_game_over(snapshot: &GameSnapshot) -> bool {
        snapshot.player.health <= 0
    }

    /// Entities on the player's cell or one of its eight neighbours.
    #[must_use]
    pub fn nearby_entities(snapshot: &GameSnapshot) -> Vec<&Entity> {
        let Some(cell) = snapshot.player.cell() else {
            return Vec::new();
        };
        snapshot
            .level
            .entities()
            .iter()
            .filter(|entity| entity.cell.chebyshev_distance(cell) <= 1)
            .collect()
    }

    /// Direction of the exit from the player, if the level has one.
    ///
    /// Ties between the axes resolve to north or south.
    #[must_use]
    pub fn exit_bearing(snapshot: &GameSnapshot) -> Option<Bearing> {
        let door = snapshot.level.door()?;
        let delta = door.cell.to_position() - snapshot.player.position;
        let bearing = if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Bearing::East
            } else {
                Bearing::West
            }
        } else if delta.y > 0.0 {
            Bearing::South
        } else {
            Bearing::North
        };
        Some(bearing)
    }

    /// Entities the player can currently see.
    #[must_use]
    pub fn visible_entities(snapshot: &GameSnapshot) -> Vec<&Entity> {
        snapshot
            .level
            .entities()
            .iter()
            .filter(|entity| can_see_entity(&snapshot.level, snapshot.player.position, entity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_expand_in_frame_order() {
        let mut intents = Intents {
            forward: true,
            strafe_left: true,
            turn_right: true,
            interact: true,
            ..Intents::default()
        };

        assert_eq!(
            intent_commands(&mut intents),
            vec![
                Command::Move {
                    forward: true,
                    strafe: false
                },
                Command::Move {
                    forward: false,
                    strafe: true
                },
                Command::Turn { right: true },
                Command::Interact,
            ]
        );
        assert!(!intents.interact, "interaction is edge-triggered");
        assert!(intents.forward, "held intents persist");
    }
}
