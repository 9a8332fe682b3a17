use terminal_abyss_core::{ConfigError, GameConfig, Phase, WELCOME_BANNER};
use terminal_abyss_system_bootstrap::Bootstrap;

#[test]
fn banner_matches_the_core_constant() {
    assert_eq!(Bootstrap.welcome_banner(), WELCOME_BANNER);
}

#[test]
fn new_game_starts_on_the_first_floor_with_full_health() {
    let snapshot = Bootstrap
        .new_game(42, &GameConfig::default())
        .expect("default configuration is valid");

    assert_eq!(snapshot.floor.get(), 1);
    assert_eq!(snapshot.seed, 42);
    assert_eq!(snapshot.player.health, 100);
    assert_eq!(snapshot.player.max_health, 100);
    assert_eq!(snapshot.player.weapon, "Laser Gun");
    assert_eq!(snapshot.player.damage, 25);
    assert_eq!(snapshot.player.direction, 0.0);
    assert!(snapshot.player.inventory.is_empty());
    assert_eq!(snapshot.phase(), Phase::Playing);
}

#[test]
fn new_game_reveals_the_start() {
    let snapshot = Bootstrap
        .new_game(7, &GameConfig::default())
        .expect("default configuration is valid");
    let cell = snapshot.player.cell().expect("start inside the grid");

    assert!(snapshot.level.grid().is_open(cell));
    assert!(snapshot.level.visibility().is_revealed(cell));
}

#[test]
fn same_seed_starts_identically() {
    let config = GameConfig::default();
    let first = Bootstrap.new_game(9, &config).expect("valid configuration");
    let second = Bootstrap.new_game(9, &config).expect("valid configuration");
    assert_eq!(first, second);
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = GameConfig::default();
    config.map.height = 2;
    assert_eq!(
        Bootstrap.new_game(1, &config),
        Err(ConfigError::MapTooSmall {
            width: 60,
            height: 2
        })
    );
}
