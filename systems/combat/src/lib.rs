#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player interaction: shooting enemies and taking the exit.

use glam::Vec2;
use terminal_abyss_core::{CellCoord, EntityId, EntityKind, Event, GameConfig, GameSnapshot, OPEN};
use terminal_abyss_system_generation::{find_valid_start_position, generate_level};
use terminal_abyss_system_raycasting::update_visibility;
use tracing::{debug, info, warn};

/// Length of each step of the interaction ray.
pub const INTERACT_STEP: f32 = 0.1;

/// Number of steps the interaction ray takes, for a reach of ten cells.
pub const INTERACT_STEPS: u32 = 100;

/// What the interaction ray ran into first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// An enemy in the line of fire.
    Enemy(EntityId),
    /// The floor exit.
    Door(EntityId),
}

/// Walks the interaction ray from the player and returns the first enemy or
/// door on it.
///
/// The ray stops at walls and at the grid edge. Items do not stop it.
#[must_use]
pub fn find_target(snapshot: &GameSnapshot) -> Option<Target> {
    let player = &snapshot.player;
    let level = &snapshot.level;
    let step = Vec2::new(player.direction.cos(), player.direction.sin()) * INTERACT_STEP;
    let mut probe = player.position;

    for _ in 0..INTERACT_STEPS {
        probe += step;
        let column = probe.x.floor() as i64;
        let row = probe.y.floor() as i64;
        match level.grid().cell_at(column, row) {
            Some(OPEN) => {}
            _ => return None,
        }
        let cell = CellCoord::new(column as u32, row as u32);
        let target = level
            .entities()
            .iter()
            .filter(|entity| entity.cell == cell)
            .find_map(|entity| match entity.kind {
                EntityKind::Enemy => Some(Target::Enemy(entity.id)),
                EntityKind::Door => Some(Target::Door(entity.id)),
                EntityKind::Item => None,
            });
        if target.is_some() {
            return target;
        }
    }
    None
}

/// Shoots whatever the player faces, or descends when facing the exit.
///
/// A shot subtracts the player's damage from the first enemy on the ray and
/// removes it once its health is exhausted. Using the exit on the final floor
/// marks the run as escaped and leaves everything else untouched; on earlier
/// floors it generates the next level, moves the player to its start, heals
/// them and reveals the view from there.
pub fn interact(
    mut snapshot: GameSnapshot,
    config: &GameConfig,
    out_events: &mut Vec<Event>,
) -> GameSnapshot {
    match find_target(&snapshot) {
        Some(Target::Enemy(enemy)) => {
            shoot(&mut snapshot, enemy, out_events);
            snapshot
        }
        Some(Target::Door(_)) => descend(snapshot, config, out_events),
        None => {
            out_events.push(Event::InteractionMissed);
            snapshot
        }
    }
}

fn shoot(snapshot: &mut GameSnapshot, enemy: EntityId, out_events: &mut Vec<Event>) {
    let damage = snapshot.player.damage;
    let entities = snapshot.level.entities_mut();
    let Some(index) = entities.iter().position(|entity| entity.id == enemy) else {
        return;
    };
    let Some(health) = entities[index].health else {
        out_events.push(Event::InteractionMissed);
        return;
    };

    if health <= damage {
        let _ = entities.remove(index);
        debug!(enemy = enemy.get(), "enemy defeated");
        out_events.push(Event::EnemyDefeated { enemy });
    } else {
        let remaining_health = health - damage;
        entities[index].health = Some(remaining_health);
        out_events.push(Event::EnemyDamaged {
            enemy,
            remaining_health,
        });
    }
}

fn descend(
    mut snapshot: GameSnapshot,
    config: &GameConfig,
    out_events: &mut Vec<Event>,
) -> GameSnapshot {
    let floor = snapshot.floor;
    if floor.get() >= config.progression.final_floor {
        info!(floor = floor.get(), "escaped the abyss");
        snapshot.escaped = true;
        out_events.push(Event::Victory { floor });
        return snapshot;
    }

    let dimensions = match config.map.dimensions() {
        Ok(dimensions) => dimensions,
        Err(error) => {
            warn!(%error, "exit unusable with the configured map size");
            out_events.push(Event::InteractionMissed);
            return snapshot;
        }
    };

    let next = floor.next();
    let mut level = generate_level(dimensions, snapshot.seed, next);
    let start = find_valid_start_position(&level);
    let position = start.to_position();
    update_visibility(&mut level, position, snapshot.player.direction);

    snapshot.level = level;
    snapshot.floor = next;
    snapshot.player.position = position;
    snapshot.player.heal(config.progression.floor_heal);

    info!(
        floor = next.get(),
        health = snapshot.player.health,
        "descended to the next floor"
    );
    out_events.push(Event::FloorAdvanced { floor: next });
    snapshot
}
