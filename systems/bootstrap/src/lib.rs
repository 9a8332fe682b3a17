#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a fresh Terminal Abyss run.

use terminal_abyss_core::{ConfigError, Floor, GameConfig, GameSnapshot, Player, WELCOME_BANNER};
use terminal_abyss_system_generation::{find_valid_start_position, generate_level};
use terminal_abyss_system_raycasting::update_visibility;
use tracing::info;

/// Produces the opening state of a run.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        WELCOME_BANNER
    }

    /// Builds the first floor for `seed` and places a fresh player on it.
    ///
    /// The configuration is validated first. The player starts facing east
    /// on the first open, unoccupied cell with the view from there revealed.
    pub fn new_game(&self, seed: u64, config: &GameConfig) -> Result<GameSnapshot, ConfigError> {
        config.validate()?;
        let dimensions = config.map.dimensions()?;

        let mut level = generate_level(dimensions, seed, Floor::FIRST);
        let start = find_valid_start_position(&level);
        let player = Player::new(start.to_position(), &config.player);
        update_visibility(&mut level, player.position, player.direction);

        info!(
            seed,
            column = start.column(),
            row = start.row(),
            "new game started"
        );

        Ok(GameSnapshot {
            player,
            level,
            floor: Floor::FIRST,
            seed,
            escaped: false,
            enemy_ticks: 0,
        })
    }
}
