use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_fusion_core::{CellCoord, Event};
use tower_fusion_system_update::UpdateSystem;
use tower_fusion_world::{EventLog, World, WorldConfig};

const TICK: Duration = Duration::from_millis(100);

fn world(config: WorldConfig, seed: u64) -> World<EventLog> {
    World::with_rng(config, EventLog::new(), ChaCha8Rng::seed_from_u64(seed))
}

fn cells_beside_path(world: &World<EventLog>, count: usize) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    for cell in world.path() {
        for (dc, dr) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            let candidate = CellCoord::new(cell.column() + dc, cell.row() + dr);
            let (max_column, max_row) = world.buildable_limits();
            let in_bounds = candidate.column() >= 0
                && candidate.row() >= 0
                && candidate.column() <= max_column
                && candidate.row() <= max_row;
            if in_bounds && !world.is_blocked(candidate) && !cells.contains(&candidate) {
                cells.push(candidate);
            }
            if cells.len() == count {
                return cells;
            }
        }
    }
    cells
}

#[test]
fn paused_ticks_leave_state_untouched() {
    let config = WorldConfig {
        starting_gold: 500,
        ..WorldConfig::default()
    };
    let mut world = world(config, 17);
    for cell in cells_beside_path(&world, 2) {
        let _ = world.place_tower(cell).expect("cell beside the path is free");
    }
    let _ = world.start_next_wave();
    let mut system = UpdateSystem::new();
    for _ in 0..30 {
        let _ = system.update(&mut world, TICK);
    }
    assert!(!world.enemies().is_empty(), "scenario needs live enemies");

    world.pause();
    let before = world.state().clone();
    let events_before = world.observer().events().len();

    for _ in 0..200 {
        let report = system.update(&mut world, TICK);
        assert_eq!(report.simulated, 0.0);
    }

    assert_eq!(world.state(), &before, "paused ticks mutated the world");
    assert_eq!(world.observer().events().len(), events_before);

    world.resume();
    let report = system.update(&mut world, TICK);
    assert!(report.simulated > 0.0);
    assert_ne!(world.state(), &before);
}

#[test]
fn game_over_stops_the_simulation() {
    let config = WorldConfig {
        starting_lives: 1,
        ..WorldConfig::default()
    };
    let mut world = world(config, 5);
    let _ = world.start_next_wave();
    let mut system = UpdateSystem::new();

    let mut ticks = 0;
    while !world.is_game_over() {
        let _ = system.update(&mut world, TICK);
        ticks += 1;
        assert!(ticks < 10_000, "no enemy ever leaked");
    }
    assert_eq!(world.status_text(), "Game over.");

    let frozen = world.state().clone();
    for _ in 0..50 {
        let _ = system.update(&mut world, TICK);
    }
    assert_eq!(world.state(), &frozen);
}

#[test]
fn second_wave_follows_the_first() {
    let mut world = world(WorldConfig::default(), 23);
    let first = world.start_next_wave();
    assert_eq!(world.wave_number(), 1);
    let mut system = UpdateSystem::new();

    let mut ticks = 0;
    let second = loop {
        let report = system.update(&mut world, TICK);
        if let Some(plan) = report.wave_started {
            break plan;
        }
        ticks += 1;
        assert!(ticks < 20_000, "second wave never started");
    };

    assert_eq!(second.wave, 2);
    assert_eq!(world.wave_number(), 2);
    assert!(second.enemy_count > first.enemy_count);
    assert!(second.base_health > first.base_health);
    assert!(second.base_speed > first.base_speed);
    assert_eq!(second.enemy_count, 12);
    assert_eq!(world.enemies_to_spawn(), 12);
    assert!(world.enemies().is_empty());
    assert_eq!(world.lives(), 10, "every wave-one enemy leaked");
}

#[test]
fn game_speed_scales_simulated_time() {
    let mut world = world(WorldConfig::default(), 2);
    let _ = world.set_game_speed(2.0);
    let mut system = UpdateSystem::new();

    let report = system.update(&mut world, TICK);

    assert!((report.simulated - 0.2).abs() < 1e-6);
    assert!((world.time_to_next_wave() - 2.8).abs() < 1e-5);
}

#[test]
fn towers_beside_the_path_kill_enemies() {
    let config = WorldConfig {
        starting_gold: 500,
        ..WorldConfig::default()
    };
    let mut world = world(config, 9);
    for cell in cells_beside_path(&world, 8) {
        let _ = world.place_tower(cell).expect("cell beside the path is free");
    }
    let _ = world.start_next_wave();
    let mut system = UpdateSystem::new();

    let mut kills = 0;
    for _ in 0..3_000 {
        kills += system.update(&mut world, TICK).kills;
    }

    assert!(kills > 0, "eight cannons should kill something");
    assert!(world.gold() >= 100 + 10 * kills);
    let recorded_deaths = world
        .observer()
        .events()
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .count();
    assert_eq!(recorded_deaths, kills as usize);
    assert!(system.shots_fired() > 0);
}

#[test]
fn seeded_runs_replay_identically() {
    fn run() -> (tower_fusion_world::WorldState, Vec<Event>) {
        let config = WorldConfig {
            starting_gold: 300,
            ..WorldConfig::default()
        };
        let mut world = world(config, 42);
        for cell in cells_beside_path(&world, 3) {
            let _ = world.place_tower(cell);
        }
        let mut system = UpdateSystem::new();
        for _ in 0..1_500 {
            let _ = system.update(&mut world, Duration::from_millis(16));
        }
        let events = world.observer_mut().drain();
        (world.state().clone(), events)
    }

    let (first_state, first_events) = run();
    let (second_state, second_events) = run();
    assert_eq!(first_state, second_state, "replay diverged between runs");
    assert_eq!(first_events, second_events);
}
