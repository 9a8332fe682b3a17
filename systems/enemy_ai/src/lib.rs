#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour: wandering, chasing and contact attacks.
//!
//! A tick runs in two phases. Every enemy first proposes a step and an attack
//! against the unchanged pre-tick snapshot, drawing from the random stream in
//! entity-id order. The proposals are then applied in the same order, each
//! accepted destination reserving its cell so no two enemies finish the tick
//! on the same cell regardless of how the entity list happens to be ordered.

use std::{
    collections::HashSet,
    time::{SystemTime, UNIX_EPOCH},
};

use terminal_abyss_core::{
    AiRandomness, BehaviorState, CellCoord, EntityId, Event, GameSnapshot, Level, Prng,
    RandomSource, RNG_STREAM_ENEMY_AI,
};
use tracing::{info, trace};

/// Squared distance below which enemies chase the player.
pub const CHASE_RANGE_SQUARED: f32 = 25.0;

/// Squared distance below which enemies turn alert.
pub const ALERT_RANGE_SQUARED: f32 = 100.0;

/// Squared distance below which a chasing enemy may attack.
pub const CONTACT_RANGE_SQUARED: f32 = 2.0;

/// Contact damage assumed for enemies without a damage value.
pub const FALLBACK_CONTACT_DAMAGE: u32 = 5;

const CHASE_STEP_CHANCE: f64 = 0.8;
const ATTACK_CHANCE: f64 = 0.5;
const ALERT_MOVE_CHANCE: f64 = 0.4;
const ALERT_TOWARD_CHANCE: f64 = 0.6;
const ALERT_WANDER_CHANCE: f64 = 0.3;
const IDLE_MOVE_CHANCE: f64 = 0.2;
const IDLE_BACKWARD_CHANCE: f64 = 0.33;
const COIN_FLIP: f64 = 0.5;

/// Random stream for the next enemy tick of `snapshot`.
///
/// Seeded streams depend only on the run seed, the floor and the number of
/// ticks already processed. Perturbed streams additionally mix in the wall
/// clock, so two runs of the same seed drift apart.
#[must_use]
pub fn ai_stream(snapshot: &GameSnapshot, randomness: AiRandomness) -> Prng {
    let floor = u64::from(snapshot.floor.get());
    match randomness {
        AiRandomness::Seeded => Prng::for_stream(
            snapshot.seed,
            RNG_STREAM_ENEMY_AI,
            &[floor, snapshot.enemy_ticks],
        ),
        AiRandomness::WallClockPerturbed => Prng::for_stream(
            snapshot.seed,
            RNG_STREAM_ENEMY_AI,
            &[floor, snapshot.enemy_ticks, wall_clock_nanos()],
        ),
    }
}

/// Contact damage every enemy deals on `floor`, reapplied after each tick.
#[must_use]
pub fn floor_contact_damage(floor: u32) -> u32 {
    2 + floor / 2
}

/// Advances every enemy by one behaviour step.
pub fn enemy_tick<R: RandomSource>(
    mut snapshot: GameSnapshot,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> GameSnapshot {
    let mut order: Vec<usize> = snapshot
        .level
        .entities()
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity.is_enemy())
        .map(|(index, _)| index)
        .collect();
    order.sort_by_key(|index| snapshot.level.entities()[*index].id);

    let proposals: Vec<Proposal> = order
        .into_iter()
        .map(|index| propose(&snapshot, index, rng))
        .collect();

    let health_before = snapshot.player.health;
    let mut reserved = HashSet::new();
    let mut hits = Vec::new();
    let entities = snapshot.level.entities_mut();

    for proposal in proposals {
        let entity = &mut entities[proposal.index];
        entity.behavior = Some(proposal.behavior);

        if proposal.to != proposal.from {
            if reserved.insert(proposal.to) {
                entity.cell = proposal.to;
                out_events.push(Event::EnemyMoved {
                    enemy: proposal.enemy,
                    from: proposal.from,
                    to: proposal.to,
                });
            } else {
                trace!(
                    enemy = proposal.enemy.get(),
                    "step lost its reservation, staying put"
                );
            }
        }

        if let Some(damage) = proposal.attack {
            hits.push((proposal.enemy, damage));
        }
    }

    let contact_damage = floor_contact_damage(snapshot.floor.get());
    for entity in entities.iter_mut().filter(|entity| entity.is_enemy()) {
        entity.damage = Some(contact_damage);
    }

    for (enemy, damage) in hits {
        let player = &mut snapshot.player;
        player.health = player
            .health
            .saturating_sub(i32::try_from(damage).unwrap_or(i32::MAX));
        out_events.push(Event::PlayerHit {
            enemy,
            damage,
            remaining_health: player.health,
        });
    }

    if health_before > 0 && snapshot.player.health <= 0 {
        info!(floor = snapshot.floor.get(), "player defeated");
        out_events.push(Event::PlayerDefeated);
    }

    snapshot.enemy_ticks = snapshot.enemy_ticks.saturating_add(1);
    snapshot
}

#[derive(Clone, Copy, Debug)]
struct Proposal {
    index: usize,
    enemy: EntityId,
    from: CellCoord,
    to: CellCoord,
    behavior: BehaviorState,
    attack: Option<u32>,
}

fn propose<R: RandomSource>(snapshot: &GameSnapshot, index: usize, rng: &mut R) -> Proposal {
    let level = &snapshot.level;
    let entity = &level.entities()[index];
    let delta = snapshot.player.position - entity.cell.to_position();
    let distance_squared = delta.length_squared();

    let (behavior, step, attacks) = if distance_squared < CHASE_RANGE_SQUARED {
        let column = toward(delta.x) * i64::from(rng.chance(CHASE_STEP_CHANCE));
        let row = toward(delta.y) * i64::from(rng.chance(CHASE_STEP_CHANCE));
        let attacks = distance_squared < CONTACT_RANGE_SQUARED && rng.chance(ATTACK_CHANCE);
        (BehaviorState::Chase, (column, row), attacks)
    } else if distance_squared < ALERT_RANGE_SQUARED {
        let step = if rng.chance(ALERT_MOVE_CHANCE) {
            let column = alert_axis(delta.x, rng);
            let row = alert_axis(delta.y, rng);
            (column, row)
        } else {
            (0, 0)
        };
        (BehaviorState::Alert, step, false)
    } else {
        let step = if rng.chance(IDLE_MOVE_CHANCE) {
            let column = idle_axis(rng);
            let row = idle_axis(rng);
            (column, row)
        } else {
            (0, 0)
        };
        (BehaviorState::Idle, step, false)
    };

    let from = entity.cell;
    let mut to = from;
    if let Some(cell) = step_target(level, entity.id, to, step.0, 0) {
        to = cell;
    }
    if let Some(cell) = step_target(level, entity.id, to, 0, step.1) {
        to = cell;
    }

    trace!(
        enemy = entity.id.get(),
        ?behavior,
        distance_squared,
        attacks,
        "enemy decided"
    );

    Proposal {
        index,
        enemy: entity.id,
        from,
        to,
        behavior,
        attack: attacks.then(|| entity.damage.unwrap_or(FALLBACK_CONTACT_DAMAGE)),
    }
}

/// Cell reached by stepping `(column, row)` from `from`, if it is open and
/// held by no other entity before the tick.
fn step_target(
    level: &Level,
    mover: EntityId,
    from: CellCoord,
    column: i64,
    row: i64,
) -> Option<CellCoord> {
    if column == 0 && row == 0 {
        return None;
    }
    let target_column = i64::from(from.column()) + column;
    let target_row = i64::from(from.row()) + row;
    if !level.grid().is_open_at(target_column, target_row) {
        return None;
    }
    let target = CellCoord::new(
        u32::try_from(target_column).ok()?,
        u32::try_from(target_row).ok()?,
    );
    let occupied = level
        .entities()
        .iter()
        .any(|other| other.id != mover && other.cell == target);
    (!occupied).then_some(target)
}

fn toward(delta: f32) -> i64 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

fn alert_axis<R: RandomSource>(delta: f32, rng: &mut R) -> i64 {
    let biased = toward(delta) * i64::from(rng.chance(ALERT_TOWARD_CHANCE));
    if biased != 0 {
        biased
    } else if rng.chance(ALERT_WANDER_CHANCE) {
        coin_step(rng)
    } else {
        0
    }
}

fn idle_axis<R: RandomSource>(rng: &mut R) -> i64 {
    if rng.chance(IDLE_BACKWARD_CHANCE) {
        -1
    } else if rng.chance(COIN_FLIP) {
        1
    } else {
        0
    }
}

fn coin_step<R: RandomSource>(rng: &mut R) -> i64 {
    if rng.chance(COIN_FLIP) {
        1
    } else {
        -1
    }
}

fn wall_clock_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
        })
}
