use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_fusion_core::{EnemyId, Event};
use tower_fusion_system_movement::{Movement, MovementReport};
use tower_fusion_world::{EventLog, World, WorldConfig};

fn world_with_enemies(count: u32) -> World<EventLog> {
    let config = WorldConfig {
        fast_enemy_chance: 0.0,
        ..WorldConfig::default()
    };
    let mut world = World::with_rng(config, EventLog::new(), ChaCha8Rng::seed_from_u64(3));
    let plan = world.start_next_wave();
    let _ = world.advance_waves(plan.spawn_interval * count as f32 + 0.01);
    assert_eq!(world.enemies().len(), count as usize);
    world
}

fn step(world: &mut World<EventLog>, movement: &mut Movement, dt: f32) -> MovementReport {
    let mut frame = world.combat_frame();
    movement.handle(frame.enemies, &mut frame.ledger, frame.observer, dt)
}

#[test]
fn dead_enemies_pay_reward_and_notify() {
    let mut world = world_with_enemies(1);
    let mut movement = Movement::new();
    let victim = world.enemies()[0].id();
    world.combat_frame().enemies[0].take_damage(1_000.0);

    let report = step(&mut world, &mut movement, 0.016);

    assert_eq!(report, MovementReport { kills: 1, leaks: 0 });
    assert!(world.enemies().is_empty());
    assert_eq!(world.gold(), 160);
    assert_eq!(
        world.observer().events(),
        &[Event::EnemyDied {
            enemy: victim,
            kind: tower_fusion_core::EnemyKind::Normal,
        }]
    );
}

#[test]
fn survivors_keep_spawn_order() {
    let mut world = world_with_enemies(3);
    let mut movement = Movement::new();
    world.combat_frame().enemies[1].take_damage(1_000.0);

    let _ = step(&mut world, &mut movement, 0.016);

    let ids: Vec<EnemyId> = world.enemies().iter().map(|enemy| enemy.id()).collect();
    assert_eq!(ids, vec![EnemyId::new(0), EnemyId::new(2)]);
}

#[test]
fn enemies_walking_off_the_path_cost_lives() {
    let mut world = world_with_enemies(2);
    let mut movement = Movement::new();
    let mut leaks = 0;

    for _ in 0..2_000 {
        leaks += step(&mut world, &mut movement, 0.5).leaks;
        if world.enemies().is_empty() {
            break;
        }
    }

    assert_eq!(leaks, 2, "both enemies should leak");
    assert_eq!(world.lives(), 18);
    assert_eq!(world.gold(), 150, "leaks pay nothing");
    assert!(world.observer().events().is_empty());
}

#[test]
fn enemies_advance_along_waypoints() {
    let mut world = world_with_enemies(1);
    let mut movement = Movement::new();
    let start = world.enemies()[0].position();

    let _ = step(&mut world, &mut movement, 0.1);

    let enemy = &world.enemies()[0];
    let travelled = enemy.position().distance(start);
    assert!(
        (travelled - 6.4).abs() < 1e-3,
        "wave one enemies walk 64 units per second, got {travelled}"
    );
}
