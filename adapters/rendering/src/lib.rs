#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Terminal Abyss adapters.
//!
//! A [`Frame`] bundles everything a text front end blits each tick: the
//! first-person view, a fog-aware minimap around the player and the HUD
//! status line. Frames are plain data; a [`RenderingBackend`] decides where
//! they go.

use std::{f32::consts::FRAC_PI_2, fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use terminal_abyss_core::{CellCoord, GameSnapshot, Grid, OPEN};
use terminal_abyss_system_raycasting::{render_screen, GlyphGrid};
use terminal_abyss_world::query::{self, Bearing};
use thiserror::Error;

/// Number of cells the minimap shows on each side of the player.
pub const MINIMAP_RADIUS: u32 = 10;

/// Minimap glyph for cells the player has not discovered yet.
pub const UNEXPLORED_GLYPH: char = ' ';

/// Minimap glyph for discovered walls.
pub const MINIMAP_WALL_GLYPH: char = '#';

/// Minimap glyph for discovered open floor.
pub const MINIMAP_OPEN_GLYPH: char = '.';

/// Player markers indexed by the nearest quarter turn, starting east.
pub const PLAYER_ARROWS: [char; 4] = ['►', '▼', '◄', '▲'];

/// Size of the first-person view in glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    columns: usize,
    rows: usize,
}

impl Viewport {
    /// Creates a viewport, rejecting empty sizes.
    pub fn new(columns: usize, rows: usize) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyViewport { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    /// Glyph columns of the view.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Glyph rows of the view.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }
}

/// Coarse health bracket used to colour or label the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthBand {
    /// At least 70% of maximum health.
    Healthy,
    /// At least 30% of maximum health.
    Wounded,
    /// Below 30% of maximum health.
    Critical,
}

impl HealthBand {
    /// Classifies `health` against `max_health`.
    #[must_use]
    pub fn classify(health: i32, max_health: i32) -> Self {
        if max_health <= 0 {
            return Self::Critical;
        }
        let percent = i64::from(health) * 100 / i64::from(max_health);
        if percent < 30 {
            Self::Critical
        } else if percent < 70 {
            Self::Wounded
        } else {
            Self::Healthy
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Wounded => "wounded",
            Self::Critical => "critical",
        }
    }
}

/// HUD summary of the player and the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    /// Current health.
    pub health: i32,
    /// Maximum health.
    pub max_health: i32,
    /// Health bracket.
    pub band: HealthBand,
    /// Equipped weapon name.
    pub weapon: String,
    /// Current floor number.
    pub floor: u32,
    /// Floor whose exit ends the run.
    pub final_floor: u32,
    /// Direction of the exit, if the level has one.
    pub exit: Option<Bearing>,
    /// Carried item names.
    pub inventory: Vec<String>,
}

impl StatusLine {
    /// Summarises `snapshot` for the HUD.
    #[must_use]
    pub fn from_snapshot(snapshot: &GameSnapshot, final_floor: u32) -> Self {
        let player = &snapshot.player;
        Self {
            health: player.health,
            max_health: player.max_health,
            band: HealthBand::classify(player.health, player.max_health),
            weapon: player.weapon.clone(),
            floor: snapshot.floor.get(),
            final_floor,
            exit: query::exit_bearing(snapshot),
            inventory: player.inventory.clone(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exit = self.exit.map_or('?', bearing_arrow);
        let inventory = if self.inventory.is_empty() {
            "empty".to_owned()
        } else {
            self.inventory.join(", ")
        };
        write!(
            f,
            "HP {}/{} ({}) | {} | FLOOR {}/{} | EXIT {} | INV {}",
            self.health,
            self.max_health,
            self.band.label(),
            self.weapon,
            self.floor,
            self.final_floor,
            exit,
            inventory
        )
    }
}

/// Everything presented for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// First-person view with the crosshair applied.
    pub view: GlyphGrid,
    /// Minimap rows, top to bottom.
    pub minimap: Vec<String>,
    /// HUD status line.
    pub status: StatusLine,
}

impl Frame {
    /// Joins the view, the minimap and the status line into printable text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut lines = self.view.to_lines();
        lines.push(String::new());
        lines.extend(self.minimap.iter().cloned());
        lines.push(String::new());
        lines.push(self.status.to_string());
        lines.join("\n")
    }
}

/// Builds the frame presenting `snapshot` in `viewport`.
#[must_use]
pub fn compose_frame(snapshot: &GameSnapshot, viewport: Viewport, final_floor: u32) -> Frame {
    let player = &snapshot.player;
    Frame {
        view: render_screen(
            &snapshot.level,
            player.position,
            player.direction,
            viewport.columns(),
            viewport.rows(),
        ),
        minimap: minimap(snapshot),
        status: StatusLine::from_snapshot(snapshot, final_floor),
    }
}

/// Renders the discovered surroundings of the player.
///
/// The window spans [`MINIMAP_RADIUS`] cells around the player's cell and is
/// clipped to the grid.
#[must_use]
pub fn minimap(snapshot: &GameSnapshot) -> Vec<String> {
    let level = &snapshot.level;
    let grid = level.grid();
    if grid.width() == 0 || grid.height() == 0 {
        return Vec::new();
    }

    let centre = clamped_cell(grid, snapshot.player.position.x, snapshot.player.position.y);
    let columns = centre.column().saturating_sub(MINIMAP_RADIUS)
        ..=centre
            .column()
            .saturating_add(MINIMAP_RADIUS)
            .min(grid.width() - 1);
    let rows = centre.row().saturating_sub(MINIMAP_RADIUS)
        ..=centre
            .row()
            .saturating_add(MINIMAP_RADIUS)
            .min(grid.height() - 1);
    let arrow = player_arrow(snapshot.player.direction);

    rows.map(|row| {
        columns
            .clone()
            .map(|column| {
                let cell = CellCoord::new(column, row);
                if !level.visibility().is_revealed(cell) {
                    UNEXPLORED_GLYPH
                } else if cell == centre {
                    arrow
                } else if let Some(entity) = level.entity_at(cell) {
                    entity.glyph
                } else if grid.cell(cell) != Some(OPEN) {
                    MINIMAP_WALL_GLYPH
                } else {
                    MINIMAP_OPEN_GLYPH
                }
            })
            .collect()
    })
    .collect()
}

/// Arrow pointing along the nearest quarter turn of `direction`.
#[must_use]
pub fn player_arrow(direction: f32) -> char {
    let quarter = (direction / FRAC_PI_2).round();
    let index = if quarter.is_finite() {
        (quarter as i64).rem_euclid(4)
    } else {
        0
    };
    PLAYER_ARROWS[usize::try_from(index).unwrap_or(0)]
}

/// Arrow glyph for a compass bearing.
#[must_use]
pub const fn bearing_arrow(bearing: Bearing) -> char {
    match bearing {
        Bearing::East => '→',
        Bearing::West => '←',
        Bearing::South => '↓',
        Bearing::North => '↑',
    }
}

fn clamped_cell(grid: &Grid, x: f32, y: f32) -> CellCoord {
    let clamp = |value: f32, limit: u32| -> u32 {
        let floored = value.floor();
        if floored.is_finite() && floored > 0.0 {
            (floored as u32).min(limit - 1)
        } else {
            0
        }
    };
    CellCoord::new(clamp(x, grid.width()), clamp(y, grid.height()))
}

/// Destination for composed frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend that writes frames as plain text to any writer.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
}

impl<W: Write> TextBackend<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        writeln!(self.writer, "{}", frame.to_text()).context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The viewport needs at least one column and one row.
    #[error("viewport must be at least 1x1 (received {columns}x{rows})")]
    EmptyViewport {
        /// Requested column count.
        columns: usize,
        /// Requested row count.
        rows: usize,
    },
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use glam::Vec2;
    use terminal_abyss_core::{
        CellCoord, Entity, EntityId, EntityKind, Floor, Grid, Level, Player, PlayerConfig,
    };

    use super::*;

    fn snapshot(rows: &[&str], position: Vec2, entities: Vec<Entity>) -> GameSnapshot {
        let grid = Grid::from_ascii(rows).expect("rectangular grid");
        GameSnapshot {
            player: Player::new(position, &PlayerConfig::default()),
            level: Level::new(grid, entities),
            floor: Floor::FIRST,
            seed: 3,
            escaped: false,
            enemy_ticks: 0,
        }
    }

    #[test]
    fn viewport_rejects_zero_sizes_without_panicking() {
        let error = Viewport::new(0, 24).expect_err("zero columns must be rejected");
        assert!(matches!(
            error,
            RenderingError::EmptyViewport {
                columns: 0,
                rows: 24
            }
        ));
        assert!(Viewport::new(80, 0).is_err());
        assert_eq!(
            Viewport::new(80, 24).expect("valid viewport").columns(),
            80
        );
    }

    #[test]
    fn health_bands_split_at_thirty_and_seventy_percent() {
        assert_eq!(HealthBand::classify(100, 100), HealthBand::Healthy);
        assert_eq!(HealthBand::classify(70, 100), HealthBand::Healthy);
        assert_eq!(HealthBand::classify(69, 100), HealthBand::Wounded);
        assert_eq!(HealthBand::classify(30, 100), HealthBand::Wounded);
        assert_eq!(HealthBand::classify(29, 100), HealthBand::Critical);
        assert_eq!(HealthBand::classify(-5, 100), HealthBand::Critical);
        assert_eq!(HealthBand::classify(10, 0), HealthBand::Critical);
    }

    #[test]
    fn player_arrow_tracks_quarter_turns() {
        assert_eq!(player_arrow(0.0), '►');
        assert_eq!(player_arrow(FRAC_PI_2), '▼');
        assert_eq!(player_arrow(PI), '◄');
        assert_eq!(player_arrow(3.0 * FRAC_PI_2), '▲');
        assert_eq!(player_arrow(2.0 * PI - 0.1), '►');
        assert_eq!(player_arrow(-FRAC_PI_2), '▲');
    }

    #[test]
    fn minimap_hides_unexplored_cells() {
        let mut state = snapshot(
            &["#####", "#...#", "#####"],
            Vec2::new(1.5, 1.5),
            vec![Entity {
                id: EntityId::new(0),
                cell: CellCoord::new(2, 1),
                kind: EntityKind::Item,
                glyph: '✦',
                health: None,
                damage: None,
                behavior: None,
            }],
        );
        for column in 0..3 {
            for row in 0..3 {
                state.level.visibility_mut().reveal(CellCoord::new(column, row));
            }
        }

        assert_eq!(
            minimap(&state),
            vec!["###  ".to_owned(), "#►✦  ".to_owned(), "###  ".to_owned()]
        );
    }

    #[test]
    fn minimap_draws_every_wall_variant_as_wall() {
        let cells = vec![1, 2, 7, 2, 0, 3, 1, 1, 1];
        let grid = Grid::from_cells(3, 3, cells).expect("matching buffer");
        let mut state = snapshot(&["###", "#.#", "###"], Vec2::new(1.5, 1.5), Vec::new());
        state.level = Level::new(grid, Vec::new());
        for column in 0..3 {
            for row in 0..3 {
                state.level.visibility_mut().reveal(CellCoord::new(column, row));
            }
        }

        assert_eq!(
            minimap(&state),
            vec!["###".to_owned(), "#►#".to_owned(), "###".to_owned()]
        );
    }

    #[test]
    fn status_line_reports_empty_inventory_and_exit() {
        let door = Entity {
            id: EntityId::new(0),
            cell: CellCoord::new(3, 1),
            kind: EntityKind::Door,
            glyph: '▣',
            health: None,
            damage: None,
            behavior: None,
        };
        let state = snapshot(&["#####", "#...#", "#####"], Vec2::new(1.0, 1.0), vec![door]);
        let status = StatusLine::from_snapshot(&state, 5);

        assert_eq!(status.exit, Some(Bearing::East));
        assert_eq!(
            status.to_string(),
            "HP 100/100 (healthy) | Laser Gun | FLOOR 1/5 | EXIT → | INV empty"
        );
    }

    #[test]
    fn text_backend_writes_the_whole_frame() {
        let state = snapshot(&["#####", "#...#", "#####"], Vec2::new(1.5, 1.5), Vec::new());
        let viewport = Viewport::new(8, 4).expect("valid viewport");
        let frame = compose_frame(&state, viewport, 5);
        let mut backend = TextBackend::new(Vec::new());

        backend.present(&frame).expect("writing to memory succeeds");

        let text = String::from_utf8(backend.into_inner()).expect("utf-8 output");
        assert_eq!(text, format!("{}\n", frame.to_text()));
        assert!(text.contains("FLOOR 1/5"));
    }
}
