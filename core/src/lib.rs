#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Terminal Abyss engine.
//!
//! This crate defines the data model that every system operates on. The
//! generator produces a [`Level`], the state-machine systems consume a
//! [`GameSnapshot`] together with a [`Command`] and hand back a replacement
//! snapshot while reporting what happened as [`Event`] values, and the ray
//! caster reads the level and player to produce glyph grids. Nothing in here
//! performs I/O.

mod config;
mod rng;

pub use config::{
    AiRandomness, ConfigError, GameConfig, MapConfig, PlayerConfig, ProgressionConfig, Tuning,
};
pub use rng::{derive_seed, Prng, RandomSource, RNG_STREAM_ENEMY_AI, RNG_STREAM_GENERATION};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Terminal Abyss.";

/// Cell code describing a traversable floor cell.
pub const OPEN: u8 = 0;

/// Cell code describing the default wall variant.
pub const WALL: u8 = 1;

/// Smallest width or height accepted for a generated level.
pub const MIN_LEVEL_DIMENSION: u32 = 5;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Resolves a continuous position to the cell containing it.
    ///
    /// Returns `None` when either component is negative or not finite.
    #[must_use]
    pub fn containing(position: Vec2) -> Option<Self> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        Some(Self::new(position.x.floor() as u32, position.y.floor() as u32))
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Continuous position of the cell's upper-left corner.
    #[must_use]
    pub fn to_position(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Chebyshev distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Validated width and height of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelDimensions {
    width: u32,
    height: u32,
}

impl LevelDimensions {
    /// Validates the provided dimensions.
    ///
    /// Both axes must be at least [`MIN_LEVEL_DIMENSION`] so the carved maze
    /// keeps a perimeter wall around a non-empty interior.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width < MIN_LEVEL_DIMENSION || height < MIN_LEVEL_DIMENSION {
            return Err(ConfigError::MapTooSmall { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// One-based dungeon floor number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Floor(u32);

impl Floor {
    /// Floor every new game starts on.
    pub const FIRST: Floor = Floor(1);

    /// Creates a floor number, rejecting zero.
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::ZeroFloor);
        }
        Ok(Self(value))
    }

    /// Retrieves the numeric floor.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Floor directly below this one.
    #[must_use]
    pub const fn next(self) -> Floor {
        Floor(self.0.saturating_add(1))
    }
}

impl Default for Floor {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Dense row-major grid of cell codes.
///
/// Code [`OPEN`] is traversable, any other value is a wall variant. Grids are
/// immutable once built; the generator assembles the cell buffer and hands
/// it over through [`Grid::from_cells`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates a grid with every cell set to `code`.
    #[must_use]
    pub fn filled(width: u32, height: u32, code: u8) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![code; capacity],
        }
    }

    /// Wraps an existing row-major buffer, returning `None` on a size mismatch.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<u8>) -> Option<Self> {
        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
        if cells.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Builds a grid from text rows where `#` marks a wall and anything else
    /// is open. Rows must share one length.
    #[must_use]
    pub fn from_ascii(rows: &[&str]) -> Option<Self> {
        let height = u32::try_from(rows.len()).ok()?;
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            if row.chars().count() != width {
                return None;
            }
            cells.extend(row.chars().map(|glyph| if glyph == '#' { WALL } else { OPEN }));
        }
        Self::from_cells(u32::try_from(width).ok()?, height, cells)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell code at the provided coordinate, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<u8> {
        self.cell_at(i64::from(cell.column()), i64::from(cell.row()))
    }

    /// Cell code at signed coordinates, or `None` outside the grid.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Option<u8> {
        self.index(column, row)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell exists and is traversable.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.cell(cell) == Some(OPEN)
    }

    /// Reports whether the signed coordinate exists and is traversable.
    #[must_use]
    pub fn is_open_at(&self, column: i64, row: i64) -> bool {
        self.cell_at(column, row) == Some(OPEN)
    }

    /// Iterates over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, code)| **code == OPEN)
            .map(move |(index, _)| {
                let index = index as u32;
                CellCoord::new(index % width, index / width)
            })
    }

    /// Raw row-major cell codes.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    fn index(&self, column: i64, row: i64) -> Option<usize> {
        if column < 0 || row < 0 || column >= i64::from(self.width) || row >= i64::from(self.height)
        {
            return None;
        }
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

/// Per-cell record of which cells have ever been observed.
///
/// Bits only ever transition from hidden to revealed; the mask exposes no way
/// to hide a cell again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityMask {
    width: u32,
    height: u32,
    revealed: Vec<bool>,
}

impl VisibilityMask {
    /// Creates a fully hidden mask.
    #[must_use]
    pub fn hidden(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            revealed: vec![false; capacity],
        }
    }

    /// Marks the cell at signed coordinates as seen. Out-of-bounds is ignored.
    pub fn reveal_at(&mut self, column: i64, row: i64) {
        if let Some(index) = self.index(column, row) {
            if let Some(slot) = self.revealed.get_mut(index) {
                *slot = true;
            }
        }
    }

    /// Marks the cell as seen.
    pub fn reveal(&mut self, cell: CellCoord) {
        self.reveal_at(i64::from(cell.column()), i64::from(cell.row()));
    }

    /// Reports whether the cell was ever seen.
    #[must_use]
    pub fn is_revealed(&self, cell: CellCoord) -> bool {
        self.index(i64::from(cell.column()), i64::from(cell.row()))
            .and_then(|index| self.revealed.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of revealed cells.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|revealed| **revealed).count()
    }

    /// Provides the dimensions of the mask.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, column: i64, row: i64) -> Option<usize> {
        if column < 0 || row < 0 || column >= i64::from(self.width) || row >= i64::from(self.height)
        {
            return None;
        }
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

/// Unique identifier assigned to an entity within a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Broad category of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Hostile creature that wanders, chases and attacks.
    Enemy,
    /// Inert pickup.
    Item,
    /// Exit portal leading to the next floor.
    Door,
}

/// Current AI mode of an enemy, derived each tick from distance to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Player is far away; occasional random steps.
    Idle,
    /// Player is nearby; hesitant steps biased toward the player.
    Alert,
    /// Player is close; aggressive pursuit and contact attacks.
    Chase,
}

/// Anything occupying a discrete grid cell besides walls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: EntityId,
    /// Cell the entity occupies.
    pub cell: CellCoord,
    /// Category of the entity.
    pub kind: EntityKind,
    /// Symbol drawn by the renderers.
    pub glyph: char,
    /// Remaining health for damageable entities.
    pub health: Option<u32>,
    /// Contact damage dealt to the player.
    pub damage: Option<u32>,
    /// AI mode for enemies.
    pub behavior: Option<BehaviorState>,
}

impl Entity {
    /// Reports whether the entity is an enemy.
    #[must_use]
    pub fn is_enemy(&self) -> bool {
        self.kind == EntityKind::Enemy
    }
}

/// The player avatar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Continuous position measured in cells.
    pub position: Vec2,
    /// View direction in radians within `[0, 2π)`; zero faces increasing columns.
    pub direction: f32,
    /// Current health; the game is lost once this reaches zero.
    pub health: i32,
    /// Upper bound for healing.
    pub max_health: i32,
    /// Display name of the equipped weapon.
    pub weapon: String,
    /// Damage dealt per successful shot.
    pub damage: u32,
    /// Ordered item names carried by the player.
    pub inventory: Vec<String>,
}

impl Player {
    /// Creates a fresh player at `position` using the configured stats.
    #[must_use]
    pub fn new(position: Vec2, config: &PlayerConfig) -> Self {
        Self {
            position,
            direction: 0.0,
            health: config.max_health,
            max_health: config.max_health,
            weapon: config.weapon.clone(),
            damage: config.damage,
            inventory: Vec::new(),
        }
    }

    /// Cell containing the player's position.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        CellCoord::containing(self.position)
    }

    /// Restores health without exceeding the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }
}

/// A single generated floor: its grid, fog of war and inhabitants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Level {
    grid: Grid,
    visibility: VisibilityMask,
    entities: Vec<Entity>,
}

impl Level {
    /// Assembles a level with a fully hidden visibility mask.
    #[must_use]
    pub fn new(grid: Grid, entities: Vec<Entity>) -> Self {
        let visibility = VisibilityMask::hidden(grid.width(), grid.height());
        Self {
            grid,
            visibility,
            entities,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Read-only access to the wall layout.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read-only access to the fog-of-war mask.
    #[must_use]
    pub const fn visibility(&self) -> &VisibilityMask {
        &self.visibility
    }

    /// Mutable access to the fog-of-war mask, which only supports revealing.
    pub fn visibility_mut(&mut self) -> &mut VisibilityMask {
        &mut self.visibility
    }

    /// Entities inhabiting the level, in no particular order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access to the entity list.
    pub fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    /// First entity occupying the provided cell.
    #[must_use]
    pub fn entity_at(&self, cell: CellCoord) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.cell == cell)
    }

    /// The floor exit, if one was placed.
    #[must_use]
    pub fn door(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.kind == EntityKind::Door)
    }
}

/// Coarse game phase derived from the snapshot at each transition boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The run is in progress.
    Playing,
    /// The player escaped past the final floor.
    Victory,
    /// The player's health dropped to zero.
    Defeated,
}

/// Complete world state handed between transitions.
///
/// Transitions consume a snapshot and return its replacement; nothing keeps
/// a reference across calls. The default value is an empty placeholder with
/// a zero-sized level that drivers swap out while a transition runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// The player avatar.
    pub player: Player,
    /// The floor currently being explored.
    pub level: Level,
    /// Current one-based floor number.
    pub floor: Floor,
    /// Seed the run was started with.
    pub seed: u64,
    /// Set once the player used the exit on the final floor.
    pub escaped: bool,
    /// Number of enemy ticks processed on the current run.
    pub enemy_ticks: u64,
}

impl GameSnapshot {
    /// Derives the game phase. Defeat takes precedence over escape.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.player.health <= 0 {
            Phase::Defeated
        } else if self.escaped {
            Phase::Victory
        } else {
            Phase::Playing
        }
    }
}

/// Commands that express all permissible state transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Moves the player one step.
    Move {
        /// Positive direction along the chosen axis: forward, or right when strafing.
        forward: bool,
        /// Moves perpendicular to the view direction instead of along it.
        strafe: bool,
    },
    /// Rotates the view direction by one step.
    Turn {
        /// Rotates clockwise on screen (increasing angle).
        right: bool,
    },
    /// Shoots at whatever the player faces, or uses the exit.
    Interact,
    /// Advances every enemy by one AI step.
    EnemyTick,
}

/// Events describing the outcome of a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The player changed position.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// A move was fully rejected by walls on both axes.
    PlayerBlocked {
        /// Position the player remained at.
        at: Vec2,
    },
    /// The player rotated.
    PlayerTurned {
        /// New view direction in radians.
        direction: f32,
    },
    /// A shot wounded an enemy.
    EnemyDamaged {
        /// Identifier of the wounded enemy.
        enemy: EntityId,
        /// Health left after the shot.
        remaining_health: u32,
    },
    /// A shot killed an enemy, which was removed from the level.
    EnemyDefeated {
        /// Identifier of the removed enemy.
        enemy: EntityId,
    },
    /// The player used the exit and a new level was generated.
    FloorAdvanced {
        /// Floor that became active.
        floor: Floor,
    },
    /// The player used the exit on the final floor.
    Victory {
        /// Floor the exit was used on.
        floor: Floor,
    },
    /// An interaction found nothing to act on.
    InteractionMissed,
    /// An enemy stepped to a neighbouring cell.
    EnemyMoved {
        /// Identifier of the enemy.
        enemy: EntityId,
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
    },
    /// An enemy landed a contact attack.
    PlayerHit {
        /// Identifier of the attacker.
        enemy: EntityId,
        /// Damage dealt.
        damage: u32,
        /// Player health after the hit.
        remaining_health: i32,
    },
    /// The player's health dropped to zero.
    PlayerDefeated,
}

/// Per-frame boolean intents supplied by the input collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Intents {
    /// Move along the view direction.
    pub forward: bool,
    /// Move against the view direction.
    pub backward: bool,
    /// Step to the left of the view direction.
    pub strafe_left: bool,
    /// Step to the right of the view direction.
    pub strafe_right: bool,
    /// Rotate counter-clockwise.
    pub turn_left: bool,
    /// Rotate clockwise.
    pub turn_right: bool,
    /// Shoot or use the exit. Edge-triggered: cleared once consumed.
    pub interact: bool,
}

impl Intents {
    /// Consumes the pending interaction request.
    pub fn take_interact(&mut self) -> bool {
        std::mem::take(&mut self.interact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_positive_positions() {
        assert_eq!(
            CellCoord::containing(Vec2::new(3.9, 2.0)),
            Some(CellCoord::new(3, 2))
        );
        assert_eq!(CellCoord::containing(Vec2::new(-0.1, 2.0)), None);
        assert_eq!(CellCoord::containing(Vec2::new(f32::NAN, 2.0)), None);
    }

    #[test]
    fn dimensions_reject_small_maps() {
        assert!(LevelDimensions::new(5, 5).is_ok());
        assert_eq!(
            LevelDimensions::new(4, 9),
            Err(ConfigError::MapTooSmall {
                width: 4,
                height: 9
            })
        );
    }

    #[test]
    fn floor_rejects_zero() {
        assert_eq!(Floor::new(0), Err(ConfigError::ZeroFloor));
        assert_eq!(Floor::FIRST.next().get(), 2);
    }

    #[test]
    fn grid_lookups_are_bounds_checked() {
        let grid = Grid::from_ascii(&["###", "#.#", "###"]).expect("valid grid");
        assert!(grid.is_open(CellCoord::new(1, 1)));
        assert!(!grid.is_open(CellCoord::new(0, 1)));
        assert_eq!(grid.cell_at(-1, 0), None);
        assert_eq!(grid.cell_at(3, 0), None);
        assert_eq!(grid.open_cells().collect::<Vec<_>>(), vec![CellCoord::new(1, 1)]);
    }

    #[test]
    fn ragged_ascii_is_rejected() {
        assert!(Grid::from_ascii(&["###", "##"]).is_none());
    }

    #[test]
    fn visibility_only_reveals() {
        let mut mask = VisibilityMask::hidden(4, 3);
        mask.reveal(CellCoord::new(2, 1));
        mask.reveal(CellCoord::new(2, 1));
        mask.reveal_at(-1, 7);
        assert!(mask.is_revealed(CellCoord::new(2, 1)));
        assert!(!mask.is_revealed(CellCoord::new(1, 1)));
        assert_eq!(mask.revealed_count(), 1);
    }

    #[test]
    fn player_heal_caps_at_maximum() {
        let mut player = Player::new(Vec2::new(1.0, 1.0), &PlayerConfig::default());
        player.health = 90;
        player.heal(20);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn defeat_takes_precedence_over_escape() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#####"]).expect("valid grid");
        let mut snapshot = GameSnapshot {
            player: Player::new(Vec2::new(1.0, 1.0), &PlayerConfig::default()),
            level: Level::new(grid, Vec::new()),
            floor: Floor::FIRST,
            seed: 7,
            escaped: false,
            enemy_ticks: 0,
        };
        assert_eq!(snapshot.phase(), Phase::Playing);
        snapshot.escaped = true;
        assert_eq!(snapshot.phase(), Phase::Victory);
        snapshot.player.health = 0;
        assert_eq!(snapshot.phase(), Phase::Defeated);
    }

    #[test]
    fn interact_intent_is_edge_triggered() {
        let mut intents = Intents {
            interact: true,
            ..Intents::default()
        };
        assert!(intents.take_interact());
        assert!(!intents.take_interact());
    }
}
