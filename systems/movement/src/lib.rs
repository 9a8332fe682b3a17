#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player locomotion: walking, strafing and turning against the level grid.

use std::f32::consts::TAU;

use glam::Vec2;
use terminal_abyss_core::{Event, GameSnapshot, Grid, Tuning};
use terminal_abyss_system_raycasting::update_visibility;
use tracing::trace;

/// Distance ahead of the player probed for walls on each axis.
pub const COLLISION_LOOK_AHEAD: f32 = 0.3;

/// Moves the player one step and refreshes the fog of war.
///
/// Without `strafe` the step runs along the view direction, backwards when
/// `forward` is false. With `strafe` it runs perpendicular to the view, to the
/// right when `forward` is true. Each axis is resolved on its own so the
/// player slides along a wall that only blocks one of them.
pub fn move_player(
    mut snapshot: GameSnapshot,
    forward: bool,
    strafe: bool,
    tuning: &Tuning,
    out_events: &mut Vec<Event>,
) -> GameSnapshot {
    let from = snapshot.player.position;
    let displacement = displacement(snapshot.player.direction, forward, strafe, tuning.move_speed);
    let to = resolve(snapshot.level.grid(), from, displacement);

    snapshot.player.position = to;
    if to == from {
        trace!(x = from.x, y = from.y, "player blocked");
        out_events.push(Event::PlayerBlocked { at: from });
    } else {
        out_events.push(Event::PlayerMoved { from, to });
    }

    update_visibility(&mut snapshot.level, to, snapshot.player.direction);
    snapshot
}

/// Rotates the player one step and refreshes the fog of war.
///
/// Turning right increases the angle, which with rows growing downwards is
/// clockwise on screen.
pub fn turn_player(
    mut snapshot: GameSnapshot,
    right: bool,
    tuning: &Tuning,
    out_events: &mut Vec<Event>,
) -> GameSnapshot {
    let delta = if right {
        tuning.turn_speed
    } else {
        -tuning.turn_speed
    };
    let direction = normalize_angle(snapshot.player.direction + delta);
    snapshot.player.direction = direction;
    out_events.push(Event::PlayerTurned { direction });

    update_visibility(&mut snapshot.level, snapshot.player.position, direction);
    snapshot
}

/// Wraps an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

fn displacement(direction: f32, forward: bool, strafe: bool, speed: f32) -> Vec2 {
    let sign = if forward { 1.0 } else { -1.0 };
    let heading = Vec2::new(direction.cos(), direction.sin());
    let axis = if strafe { heading.perp() } else { heading };
    axis * speed * sign
}

/// Both the landing cell and the look-ahead cell must be open, so a step
/// longer than the look-ahead cannot end inside a thin wall.
fn resolve(grid: &Grid, from: Vec2, displacement: Vec2) -> Vec2 {
    let mut position = from;

    if displacement.x != 0.0 {
        let candidate = position.x + displacement.x;
        let probe = candidate + COLLISION_LOOK_AHEAD.copysign(displacement.x);
        let row = position.y.floor() as i64;
        if grid.is_open_at(candidate.floor() as i64, row)
            && grid.is_open_at(probe.floor() as i64, row)
        {
            position.x = candidate;
        }
    }

    if displacement.y != 0.0 {
        let candidate = position.y + displacement.y;
        let probe = candidate + COLLISION_LOOK_AHEAD.copysign(displacement.y);
        let column = position.x.floor() as i64;
        if grid.is_open_at(column, candidate.floor() as i64)
            && grid.is_open_at(column, probe.floor() as i64)
        {
            position.y = candidate;
        }
    }

    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn strafe_right_is_clockwise_of_the_heading() {
        let east = displacement(0.0, true, true, 1.0);
        assert!(close(east, Vec2::new(0.0, 1.0)), "{east:?}");

        let south = displacement(FRAC_PI_2, true, true, 1.0);
        assert!(close(south, Vec2::new(-1.0, 0.0)), "{south:?}");

        let left = displacement(0.0, false, true, 1.0);
        assert!(close(left, Vec2::new(0.0, -1.0)), "{left:?}");
    }

    #[test]
    fn backwards_reverses_the_heading() {
        let back = displacement(PI, false, false, 0.5);
        assert!(close(back, Vec2::new(0.5, 0.0)), "{back:?}");
    }

    #[test]
    fn angles_wrap_into_one_turn() {
        assert!((normalize_angle(-0.1) - (TAU - 0.1)).abs() < 1e-5);
        assert!((normalize_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        let tiny = normalize_angle(-1e-9);
        assert!((0.0..TAU).contains(&tiny));
    }
}
