#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded maze generator that lays out each floor of the abyss.
//!
//! Generation runs in three passes over a wall-filled canvas: a randomized
//! growing-tree carve on the odd lattice produces a perfect maze, a handful
//! of rectangular rooms are cleared on top of it, and finally the exit,
//! enemies and items are scattered over open cells. Every draw comes from a
//! single stream derived from `(seed, floor)`, so the same arguments always
//! produce the same level.

use terminal_abyss_core::{
    BehaviorState, CellCoord, Entity, EntityId, EntityKind, Floor, Grid, Level, LevelDimensions,
    Prng, RandomSource, OPEN, RNG_STREAM_GENERATION, WALL,
};
use tracing::{debug, warn};

/// Glyph drawn for the floor exit.
pub const DOOR_GLYPH: char = '▣';
/// Glyph drawn for the rarer enemy variant.
pub const SKULL_GLYPH: char = '☠';
/// Glyph drawn for the common enemy variant.
pub const WANDERER_GLYPH: char = '웃';
/// Glyph drawn for pickups.
pub const ITEM_GLYPH: char = '✦';

const MAX_ENEMIES: u32 = 15;
const SKULL_CHANCE: f64 = 0.3;
const EXIT_SEARCH_RADIUS: i64 = 8;
const EXIT_SEARCH_ATTEMPTS: u32 = 50;
const PLACEMENT_ATTEMPT_CAP: u32 = 1_000;

const CARDINALS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Generates the level for `floor` of the run started with `seed`.
#[must_use]
pub fn generate_level(dimensions: LevelDimensions, seed: u64, floor: Floor) -> Level {
    let mut rng = Prng::for_stream(seed, RNG_STREAM_GENERATION, &[u64::from(floor.get())]);
    let level = generate_level_with(dimensions, floor, &mut rng);
    debug!(
        seed,
        floor = floor.get(),
        width = dimensions.width(),
        height = dimensions.height(),
        entities = level.entities().len(),
        "generated level"
    );
    level
}

/// Generates a level drawing from the provided random source.
#[must_use]
pub fn generate_level_with<R: RandomSource>(
    dimensions: LevelDimensions,
    floor: Floor,
    rng: &mut R,
) -> Level {
    let mut canvas = Canvas::new(dimensions);
    let start = carve_maze(&mut canvas, rng);
    overlay_rooms(&mut canvas, floor, rng);

    let mut placer = Placer::new(&canvas, start);
    if let Some(cell) = placer.exit_cell(rng) {
        placer.push(cell, EntityKind::Door, DOOR_GLYPH, None, None, None);
    }

    for _ in 0..enemy_count(floor) {
        let Some(cell) = placer.free_cell(rng) else {
            break;
        };
        let glyph = if rng.chance(SKULL_CHANCE) {
            SKULL_GLYPH
        } else {
            WANDERER_GLYPH
        };
        let health = 10 + rng.below(10) + floor.get() * 3 / 2;
        let damage = 5 + rng.below(5) + floor.get() / 2;
        placer.push(
            cell,
            EntityKind::Enemy,
            glyph,
            Some(health),
            Some(damage),
            Some(BehaviorState::Idle),
        );
    }

    let item_count = 2 + rng.below(3);
    for _ in 0..item_count {
        let Some(cell) = placer.free_cell(rng) else {
            break;
        };
        placer.push(cell, EntityKind::Item, ITEM_GLYPH, None, None, None);
    }

    let entities = placer.into_entities();
    Level::new(canvas.into_grid(), entities)
}

/// Resolves where the player enters a level.
///
/// Scans the interior row by row for the first open cell without an entity,
/// then for the first open cell at all, and finally falls back to `(1, 1)`.
#[must_use]
pub fn find_valid_start_position(level: &Level) -> CellCoord {
    let interior = || {
        (1..level.height().saturating_sub(1)).flat_map(move |row| {
            (1..level.width().saturating_sub(1)).map(move |column| CellCoord::new(column, row))
        })
    };

    interior()
        .find(|cell| level.grid().is_open(*cell) && level.entity_at(*cell).is_none())
        .or_else(|| interior().find(|cell| level.grid().is_open(*cell)))
        .unwrap_or(CellCoord::new(1, 1))
}

/// Number of enemies spawned on a floor.
#[must_use]
pub fn enemy_count(floor: Floor) -> u32 {
    (5 + floor.get()).min(MAX_ENEMIES)
}

#[derive(Debug)]
struct Canvas {
    width: i64,
    height: i64,
    cells: Vec<u8>,
}

impl Canvas {
    fn new(dimensions: LevelDimensions) -> Self {
        let width = i64::from(dimensions.width());
        let height = i64::from(dimensions.height());
        Self {
            width,
            height,
            cells: vec![WALL; usize::try_from(width * height).unwrap_or(0)],
        }
    }

    fn index(&self, column: i64, row: i64) -> Option<usize> {
        if column < 0 || row < 0 || column >= self.width || row >= self.height {
            return None;
        }
        usize::try_from(row * self.width + column).ok()
    }

    fn get(&self, column: i64, row: i64) -> Option<u8> {
        self.index(column, row)
            .and_then(|index| self.cells.get(index).copied())
    }

    fn open(&mut self, column: i64, row: i64) {
        if let Some(index) = self.index(column, row) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = OPEN;
            }
        }
    }

    fn is_interior(&self, column: i64, row: i64) -> bool {
        column >= 1 && row >= 1 && column < self.width - 1 && row < self.height - 1
    }

    fn is_open(&self, column: i64, row: i64) -> bool {
        self.get(column, row) == Some(OPEN)
    }

    fn into_grid(self) -> Grid {
        let width = u32::try_from(self.width).unwrap_or(0);
        let height = u32::try_from(self.height).unwrap_or(0);
        Grid::from_cells(width, height, self.cells)
            .unwrap_or_else(|| Grid::filled(width, height, WALL))
    }
}

/// Carves a perfect maze on the odd lattice and returns the carve origin.
fn carve_maze<R: RandomSource>(canvas: &mut Canvas, rng: &mut R) -> (i64, i64) {
    let column_slots = (canvas.width - 2) as f64 / 2.0;
    let row_slots = (canvas.height - 2) as f64 / 2.0;
    let start = (
        1 + (rng.next_unit() * column_slots).floor() as i64 * 2,
        1 + (rng.next_unit() * row_slots).floor() as i64 * 2,
    );

    canvas.open(start.0, start.1);
    let mut frontier = vec![start];

    while !frontier.is_empty() {
        let index = rng.below(frontier.len() as u32) as usize;
        let current = frontier.remove(index);

        let neighbors: Vec<(i64, i64)> = CARDINALS
            .iter()
            .map(|(dc, dr)| (current.0 + dc * 2, current.1 + dr * 2))
            .filter(|(column, row)| {
                canvas.is_interior(*column, *row) && canvas.get(*column, *row) == Some(WALL)
            })
            .collect();

        if neighbors.is_empty() {
            continue;
        }

        frontier.push(current);
        let next = neighbors[rng.below(neighbors.len() as u32) as usize];
        canvas.open((current.0 + next.0) / 2, (current.1 + next.1) / 2);
        canvas.open(next.0, next.1);
        frontier.push(next);
    }

    start
}

/// Clears rectangular rooms over the maze. Rooms only ever open cells.
fn overlay_rooms<R: RandomSource>(canvas: &mut Canvas, floor: Floor, rng: &mut R) {
    let room_count = 1 + rng.below(3) + floor.get() / 2;
    for _ in 0..room_count {
        let room_width = 3 + i64::from(rng.below(4)) * 2;
        let room_height = 3 + i64::from(rng.below(4)) * 2;
        let origin_column = 1 + scaled(rng, canvas.width - room_width - 2);
        let origin_row = 1 + scaled(rng, canvas.height - room_height - 2);

        for row in origin_row.max(1)..(origin_row + room_height).min(canvas.height - 1) {
            for column in origin_column.max(1)..(origin_column + room_width).min(canvas.width - 1) {
                canvas.open(column, row);
            }
        }
    }
}

/// `floor(r * span)`; a negative span yields a negative offset that the
/// caller clips to the interior.
fn scaled<R: RandomSource>(rng: &mut R, span: i64) -> i64 {
    (rng.next_unit() * span as f64).floor() as i64
}

#[derive(Debug)]
struct Placer<'a> {
    canvas: &'a Canvas,
    start: (i64, i64),
    entities: Vec<Entity>,
}

impl<'a> Placer<'a> {
    fn new(canvas: &'a Canvas, start: (i64, i64)) -> Self {
        Self {
            canvas,
            start,
            entities: Vec::new(),
        }
    }

    fn is_free(&self, column: i64, row: i64) -> bool {
        if !self.canvas.is_interior(column, row) || !self.canvas.is_open(column, row) {
            return false;
        }
        if (column, row) == self.start {
            return false;
        }
        !self.entities.iter().any(|entity| {
            i64::from(entity.cell.column()) == column && i64::from(entity.cell.row()) == row
        })
    }

    /// Picks the exit near the carve origin, falling back to anywhere.
    fn exit_cell<R: RandomSource>(&self, rng: &mut R) -> Option<CellCoord> {
        let span = (EXIT_SEARCH_RADIUS * 2 + 1) as u32;
        for _ in 0..EXIT_SEARCH_ATTEMPTS {
            let column = self.start.0 + i64::from(rng.below(span)) - EXIT_SEARCH_RADIUS;
            let row = self.start.1 + i64::from(rng.below(span)) - EXIT_SEARCH_RADIUS;
            if self.is_free(column, row) {
                return to_cell(column, row);
            }
        }
        debug!("no exit candidate near the start, searching the whole level");
        self.free_cell(rng)
    }

    /// Rejection-samples a free interior cell, then scans deterministically.
    fn free_cell<R: RandomSource>(&self, rng: &mut R) -> Option<CellCoord> {
        let column_span = u32::try_from(self.canvas.width - 2).unwrap_or(0);
        let row_span = u32::try_from(self.canvas.height - 2).unwrap_or(0);
        for _ in 0..PLACEMENT_ATTEMPT_CAP {
            let column = 1 + i64::from(rng.below(column_span));
            let row = 1 + i64::from(rng.below(row_span));
            if self.is_free(column, row) {
                return to_cell(column, row);
            }
        }

        warn!(
            attempts = PLACEMENT_ATTEMPT_CAP,
            "random placement exhausted, scanning for a free cell"
        );
        for row in 1..self.canvas.height - 1 {
            for column in 1..self.canvas.width - 1 {
                if self.is_free(column, row) {
                    return to_cell(column, row);
                }
            }
        }
        warn!("level has no free cell left, skipping placement");
        None
    }

    fn push(
        &mut self,
        cell: CellCoord,
        kind: EntityKind,
        glyph: char,
        health: Option<u32>,
        damage: Option<u32>,
        behavior: Option<BehaviorState>,
    ) {
        let id = EntityId::new(self.entities.len() as u32);
        self.entities.push(Entity {
            id,
            cell,
            kind,
            glyph,
            health,
            damage,
            behavior,
        });
    }

    fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

fn to_cell(column: i64, row: i64) -> Option<CellCoord> {
    Some(CellCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}
