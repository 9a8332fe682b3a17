//! Column rendering and full-view composition.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use terminal_abyss_core::{Grid, Level};

use crate::{cast_ray, can_see_entity, Side, FIELD_OF_VIEW, MAX_RAY_DISTANCE, SIGHT_RADIUS};

/// Wall glyphs from nearest to farthest.
pub const WALL_SHADES: [char; 5] = ['█', '▓', '▒', '░', ' '];

/// Glyph drawn above wall slabs.
pub const CEILING_GLYPH: char = ' ';

/// Glyph drawn below wall slabs.
pub const FLOOR_GLYPH: char = '·';

/// Glyph stamped on the centre of the full-screen view.
pub const CROSSHAIR_GLYPH: char = '+';

const SHADE_BAND: f32 = 4.0;

/// Row-major grid of glyphs sized to a viewport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    columns: usize,
    rows: usize,
    glyphs: Vec<char>,
}

impl GlyphGrid {
    /// Creates a grid with every slot set to `glyph`.
    #[must_use]
    pub fn filled(columns: usize, rows: usize, glyph: char) -> Self {
        Self {
            columns,
            rows,
            glyphs: vec![glyph; columns * rows],
        }
    }

    /// Number of glyph columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of glyph rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Glyph at the provided slot, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, column: usize, row: usize) -> Option<char> {
        if column >= self.columns {
            return None;
        }
        self.glyphs.get(row * self.columns + column).copied()
    }

    /// Overwrites a slot. Writes outside the grid are ignored.
    pub fn set(&mut self, column: usize, row: usize, glyph: char) {
        if column >= self.columns {
            return;
        }
        if let Some(slot) = self.glyphs.get_mut(row * self.columns + column) {
            *slot = glyph;
        }
    }

    /// Glyphs of a single row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[char]> {
        let start = row.checked_mul(self.columns)?;
        self.glyphs.get(start..start + self.columns)
    }

    /// Every row collected into a string.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.rows)
            .filter_map(|row| self.row(row))
            .map(|glyphs| glyphs.iter().collect())
            .collect()
    }
}

/// Renders the glyphs of one screen column from top to bottom.
///
/// The wall slab is `rows / distance` tall and centred vertically, shaded by
/// distance band with horizontal faces one band darker. Rows above are
/// ceiling, rows below are floor; the bottom row is always floor.
#[must_use]
pub fn screen_column(
    grid: &Grid,
    position: Vec2,
    angle: f32,
    column: usize,
    columns: usize,
    rows: usize,
) -> Vec<char> {
    let ray_angle =
        angle - FIELD_OF_VIEW / 2.0 + (column as f32 / columns.max(1) as f32) * FIELD_OF_VIEW;
    let hit = cast_ray(grid, position, ray_angle, MAX_RAY_DISTANCE);

    let half = rows as f32 / 2.0;
    let line_height = (rows as f32 / hit.distance).floor();
    let draw_start = clamp_row(-line_height / 2.0 + half, rows);
    let draw_end = clamp_row(line_height / 2.0 + half, rows);
    let shade = wall_shade(hit.distance, hit.side);

    (0..rows)
        .map(|row| {
            if row < draw_start {
                CEILING_GLYPH
            } else if row < draw_end {
                shade
            } else {
                FLOOR_GLYPH
            }
        })
        .collect()
}

/// Renders the first-person view without the crosshair.
///
/// Entities in the field of view, closer than [`SIGHT_RADIUS`] and not hidden
/// behind a wall are stamped as a single glyph. Later entities overwrite
/// earlier ones sharing a slot.
#[must_use]
pub fn render_view(
    level: &Level,
    position: Vec2,
    angle: f32,
    columns: usize,
    rows: usize,
) -> GlyphGrid {
    let mut view = GlyphGrid::filled(columns, rows, CEILING_GLYPH);
    for column in 0..columns {
        let glyphs = screen_column(level.grid(), position, angle, column, columns, rows);
        for (row, glyph) in glyphs.into_iter().enumerate() {
            view.set(column, row, glyph);
        }
    }

    for entity in level.entities() {
        let offset = entity.cell.to_position() - position;
        let view_angle = (offset.y.atan2(offset.x) - angle + PI).rem_euclid(TAU) - PI;
        if view_angle.abs() >= FIELD_OF_VIEW / 2.0 {
            continue;
        }
        let distance = offset.length();
        if distance >= SIGHT_RADIUS || !can_see_entity(level, position, entity) {
            continue;
        }

        let screen_x = ((0.5 + view_angle / FIELD_OF_VIEW) * columns as f32).floor();
        if screen_x < 0.0 || screen_x >= columns as f32 {
            continue;
        }
        let size = (rows as f32 / distance).floor();
        let screen_y = clamp_row(rows as f32 / 2.0 - size / 2.0, rows);
        view.set(screen_x as usize, screen_y, entity.glyph);
    }

    view
}

/// Renders the first-person view with the crosshair at the centre slot.
#[must_use]
pub fn render_screen(
    level: &Level,
    position: Vec2,
    angle: f32,
    columns: usize,
    rows: usize,
) -> GlyphGrid {
    let mut view = render_view(level, position, angle, columns, rows);
    view.set(columns / 2, rows / 2, CROSSHAIR_GLYPH);
    view
}

fn wall_shade(distance: f32, side: Side) -> char {
    let last = WALL_SHADES.len() - 1;
    let band = (distance / SHADE_BAND).floor();
    let mut index = if band.is_finite() && band > 0.0 {
        (band as usize).min(last)
    } else {
        0
    };
    if side == Side::Horizontal {
        index = (index + 1).min(last);
    }
    WALL_SHADES[index]
}

/// Floors `value` into `[0, rows - 1]`, treating non-finite values as edges.
fn clamp_row(value: f32, rows: usize) -> usize {
    let last = rows.saturating_sub(1);
    let value = value.floor();
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= last as f32 {
        last
    } else {
        value as usize
    }
}
