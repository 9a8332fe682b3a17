use std::f32::consts::PI;

use glam::Vec2;
use terminal_abyss_core::{
    BehaviorState, CellCoord, Entity, EntityId, EntityKind, Event, Floor, GameConfig,
    GameSnapshot, Grid, Level, Player, PlayerConfig,
};
use terminal_abyss_system_combat::{find_target, interact, Target};

const CORRIDOR: [&str; 3] = ["############", "#..........#", "############"];

fn enemy(id: u32, column: u32, health: u32) -> Entity {
    Entity {
        id: EntityId::new(id),
        cell: CellCoord::new(column, 1),
        kind: EntityKind::Enemy,
        glyph: 'E',
        health: Some(health),
        damage: Some(5),
        behavior: Some(BehaviorState::Idle),
    }
}

fn inert(id: u32, column: u32, kind: EntityKind) -> Entity {
    Entity {
        id: EntityId::new(id),
        cell: CellCoord::new(column, 1),
        kind,
        glyph: 'o',
        health: None,
        damage: None,
        behavior: None,
    }
}

fn snapshot(rows: &[&str], entities: Vec<Entity>) -> GameSnapshot {
    let grid = Grid::from_ascii(rows).expect("rectangular grid");
    GameSnapshot {
        player: Player::new(Vec2::new(1.5, 1.5), &PlayerConfig::default()),
        level: Level::new(grid, entities),
        floor: Floor::FIRST,
        seed: 42,
        escaped: false,
        enemy_ticks: 0,
    }
}

#[test]
fn shot_wounds_the_first_enemy_in_line() {
    let config = GameConfig::default();
    let state = snapshot(&CORRIDOR, vec![enemy(0, 4, 40), enemy(1, 6, 40)]);
    let mut events = Vec::new();

    let state = interact(state, &config, &mut events);

    assert_eq!(
        events,
        vec![Event::EnemyDamaged {
            enemy: EntityId::new(0),
            remaining_health: 15
        }]
    );
    assert_eq!(state.level.entities()[0].health, Some(15));
    assert_eq!(state.level.entities()[1].health, Some(40));
}

#[test]
fn lethal_shot_removes_the_enemy() {
    let config = GameConfig::default();
    let state = snapshot(&CORRIDOR, vec![enemy(3, 4, 25), inert(4, 9, EntityKind::Item)]);
    let mut events = Vec::new();

    let state = interact(state, &config, &mut events);

    assert_eq!(
        events,
        vec![Event::EnemyDefeated {
            enemy: EntityId::new(3)
        }]
    );
    assert_eq!(state.level.entities().len(), 1);
    assert_eq!(state.level.entities()[0].kind, EntityKind::Item);
}

#[test]
fn items_do_not_stop_the_ray() {
    let state = snapshot(
        &CORRIDOR,
        vec![inert(0, 3, EntityKind::Item), enemy(1, 5, 30)],
    );
    assert_eq!(find_target(&state), Some(Target::Enemy(EntityId::new(1))));
}

#[test]
fn walls_stop_the_ray() {
    let rows = ["############", "#....#.....#", "############"];
    let state = snapshot(&rows, vec![enemy(0, 7, 30)]);
    let mut events = Vec::new();

    let after = interact(state.clone(), &GameConfig::default(), &mut events);

    assert_eq!(events, vec![Event::InteractionMissed]);
    assert_eq!(after, state);
}

#[test]
fn ray_reach_is_ten_cells() {
    let wall = "#".repeat(16);
    let mut row = String::from("#");
    row.push_str(&".".repeat(14));
    row.push('#');
    let rows = [wall.as_str(), row.as_str(), wall.as_str()];

    let near = snapshot(&rows, vec![enemy(0, 11, 30)]);
    assert_eq!(find_target(&near), Some(Target::Enemy(EntityId::new(0))));

    let far = snapshot(&rows, vec![enemy(0, 12, 30)]);
    assert_eq!(find_target(&far), None);
}

#[test]
fn facing_away_misses() {
    let mut state = snapshot(&CORRIDOR, vec![enemy(0, 4, 30)]);
    state.player.direction = PI;
    assert_eq!(find_target(&state), None);
}

#[test]
fn exit_descends_to_a_fresh_floor() {
    let config = GameConfig::default();
    let mut state = snapshot(&CORRIDOR, vec![inert(0, 5, EntityKind::Door)]);
    state.player.health = 50;
    let mut events = Vec::new();

    let state = interact(state, &config, &mut events);

    assert_eq!(
        events,
        vec![Event::FloorAdvanced {
            floor: Floor::new(2).expect("non-zero floor")
        }]
    );
    assert_eq!(state.floor.get(), 2);
    assert_eq!(state.player.health, 70);
    assert_eq!(state.level.width(), config.map.width);
    let cell = state.player.cell().expect("start inside the grid");
    assert!(state.level.grid().is_open(cell));
    assert!(state.level.visibility().is_revealed(cell));
    assert!(!state.escaped);
}

#[test]
fn descending_heal_is_capped() {
    let config = GameConfig::default();
    let mut state = snapshot(&CORRIDOR, vec![inert(0, 5, EntityKind::Door)]);
    state.player.health = 95;
    let mut events = Vec::new();

    let state = interact(state, &config, &mut events);

    assert_eq!(state.player.health, 100);
}

#[test]
fn exit_on_the_final_floor_escapes() {
    let config = GameConfig::default();
    let mut state = snapshot(&CORRIDOR, vec![inert(0, 5, EntityKind::Door)]);
    state.floor = Floor::new(5).expect("non-zero floor");
    let mut events = Vec::new();

    let after = interact(state.clone(), &config, &mut events);

    assert_eq!(
        events,
        vec![Event::Victory {
            floor: Floor::new(5).expect("non-zero floor")
        }]
    );
    assert!(after.escaped);
    assert_eq!(after.floor, state.floor);
    assert_eq!(after.level, state.level);
    assert_eq!(after.player, state.player);
}
