#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid ray caster that turns a level and a viewpoint into a text view.
//!
//! Rays walk the grid one cell boundary at a time (DDA) until they reach a
//! wall, leave the grid, or exceed their range. The same traversal backs the
//! column renderer, the entity line-of-sight test and, through a coarser
//! fixed-step march, the fog-of-war sweep.

mod view;

pub use view::{
    render_screen, render_view, screen_column, GlyphGrid, CEILING_GLYPH, CROSSHAIR_GLYPH,
    FLOOR_GLYPH, WALL_SHADES,
};

use glam::Vec2;
use terminal_abyss_core::{CellCoord, Entity, Grid, Level, OPEN, WALL};
use tracing::trace;

/// Horizontal field of view in radians.
pub const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_3;

/// Range of the rays cast for rendering.
pub const MAX_RAY_DISTANCE: f32 = 20.0;

/// Range of the fog-of-war sweep and of entity sight.
pub const SIGHT_RADIUS: f32 = 10.0;

/// Slack granted to line-of-sight tests so entities flush with a wall show.
pub const SIGHT_TOLERANCE: f32 = 0.5;

const VISIBILITY_RAY_SEGMENTS: u16 = 20;
const VISIBILITY_MARCH_STEP: f32 = 0.5;
const NEAR_ZERO: f32 = 1e-9;

/// Grid line crossed by the final step of a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The ray crossed a vertical grid line, entering a new column.
    Vertical,
    /// The ray crossed a horizontal grid line, entering a new row.
    Horizontal,
}

/// Outcome of a single cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Perpendicular distance to the hit, or the range when nothing was hit.
    pub distance: f32,
    /// Code of the wall that stopped the ray; zero when the range ran out and
    /// [`WALL`] when the ray left the grid.
    pub wall_type: u8,
    /// Grid line crossed last.
    pub side: Side,
    /// Wall cell that stopped the ray, when it lies inside the grid.
    pub cell: Option<CellCoord>,
}

/// Casts a ray from `position` at `angle` radians.
#[must_use]
pub fn cast_ray(grid: &Grid, position: Vec2, angle: f32, max_distance: f32) -> RayHit {
    let direction = Vec2::new(angle.cos(), angle.sin());
    let mut column = position.x.floor() as i64;
    let mut row = position.y.floor() as i64;
    let mut column_axis = Axis::new(position.x, column, direction.x);
    let mut row_axis = Axis::new(position.y, row, direction.y);

    let mut side = Side::Vertical;
    let mut distance = 0.0;
    let mut hit = false;

    while !hit && distance < max_distance {
        if column_axis.side_distance < row_axis.side_distance {
            column_axis.side_distance += column_axis.delta;
            column += column_axis.step;
            side = Side::Vertical;
            distance = column_axis.crossing(column, position.x, direction.x);
        } else {
            row_axis.side_distance += row_axis.delta;
            row += row_axis.step;
            side = Side::Horizontal;
            distance = row_axis.crossing(row, position.y, direction.y);
        }
        hit = grid.cell_at(column, row).map_or(true, |code| code != OPEN);
    }

    if distance >= max_distance {
        return RayHit {
            distance: max_distance,
            wall_type: 0,
            side,
            cell: None,
        };
    }

    let code = grid.cell_at(column, row);
    RayHit {
        distance,
        wall_type: code.unwrap_or(WALL),
        side,
        cell: code.and_then(|_| {
            Some(CellCoord::new(
                u32::try_from(column).ok()?,
                u32::try_from(row).ok()?,
            ))
        }),
    }
}

/// Per-axis DDA bookkeeping.
#[derive(Clone, Copy, Debug)]
struct Axis {
    step: i64,
    side_distance: f32,
    delta: f32,
}

impl Axis {
    fn new(origin: f32, cell: i64, direction: f32) -> Self {
        if direction.abs() < NEAR_ZERO {
            return Self {
                step: 1,
                side_distance: f32::INFINITY,
                delta: f32::INFINITY,
            };
        }
        let delta = (1.0 / direction).abs();
        if direction < 0.0 {
            Self {
                step: -1,
                side_distance: (origin - cell as f32) * delta,
                delta,
            }
        } else {
            Self {
                step: 1,
                side_distance: (cell as f32 + 1.0 - origin) * delta,
                delta,
            }
        }
    }

    /// Distance along the ray to the grid line bordering `cell`.
    fn crossing(&self, cell: i64, origin: f32, direction: f32) -> f32 {
        let near_edge = if self.step < 0 { 1.0 } else { 0.0 };
        (cell as f32 - origin + near_edge) / direction
    }
}

/// Reveals what the player can see from `position` facing `angle`.
///
/// The player's own cell is always revealed. Twenty-one rays fanned evenly
/// across the field of view then march outwards in half-cell steps up to
/// [`SIGHT_RADIUS`], revealing each cell they pass and stopping after the
/// first wall. Nothing is ever hidden again.
pub fn update_visibility(level: &mut Level, position: Vec2, angle: f32) {
    let origin = (position.x.floor() as i64, position.y.floor() as i64);
    let mut seen = vec![origin];

    for segment in 0..=VISIBILITY_RAY_SEGMENTS {
        let offset = f32::from(segment) * FIELD_OF_VIEW / f32::from(VISIBILITY_RAY_SEGMENTS);
        let ray_angle = angle - FIELD_OF_VIEW / 2.0 + offset;
        let direction = Vec2::new(ray_angle.cos(), ray_angle.sin());

        let mut distance = 0.0;
        while distance < SIGHT_RADIUS {
            distance += VISIBILITY_MARCH_STEP;
            let sample = position + direction * distance;
            let column = sample.x.floor() as i64;
            let row = sample.y.floor() as i64;
            let Some(code) = level.grid().cell_at(column, row) else {
                break;
            };
            seen.push((column, row));
            if code != OPEN {
                break;
            }
        }
    }

    let mask = level.visibility_mut();
    for (column, row) in &seen {
        mask.reveal_at(*column, *row);
    }
    trace!(
        samples = seen.len(),
        revealed = mask.revealed_count(),
        "visibility swept"
    );
}

/// Reports whether `entity` is within sight range and not behind a wall.
#[must_use]
pub fn can_see_entity(level: &Level, position: Vec2, entity: &Entity) -> bool {
    let offset = entity.cell.to_position() - position;
    let distance = offset.length();
    if distance > SIGHT_RADIUS {
        return false;
    }
    let angle = offset.y.atan2(offset.x);
    let hit = cast_ray(level.grid(), position, angle, distance);
    hit.distance >= distance - SIGHT_TOLERANCE
}
