#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower targeting and firing for a single simulation tick.

use glam::Vec2;
use tower_fusion_world::{CombatObserver, Enemy, Tower};

/// Tower combat system that lets every ready tower shoot its nearest target.
#[derive(Debug, Default)]
pub struct TowerCombat {
    shots_fired: u64,
}

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts cooldowns down by `dt` and fires every ready tower that has a
    /// living enemy in range. Returns the number of shots fired this call.
    pub fn handle<O>(
        &mut self,
        towers: &mut [Tower],
        enemies: &mut [Enemy],
        observer: &mut O,
        dt: f32,
    ) -> usize
    where
        O: CombatObserver + ?Sized,
    {
        let mut shots = 0;
        for tower in towers.iter_mut() {
            tower.update_cooldown(dt);
            if !tower.can_shoot() {
                continue;
            }
            let Some(index) = nearest_in_range(tower.position(), tower.range(), enemies) else {
                continue;
            };

            let enemy = &mut enemies[index];
            enemy.take_damage(tower.damage());
            if let Some(slow) = tower.kind().on_hit_slow() {
                enemy.apply_slow(slow.factor, slow.duration);
            }
            tower.shoot();
            observer.on_tower_fired(tower, enemy);
            shots += 1;
        }

        self.shots_fired += shots as u64;
        if shots > 0 {
            log::trace!("{shots} towers fired ({} total)", self.shots_fired);
        }
        shots
    }

    /// Shots fired over the lifetime of the system.
    #[must_use]
    pub const fn shots_fired(&self) -> u64 {
        self.shots_fired
    }
}

/// Index of the living enemy closest to `origin` within `range`.
///
/// Equally distant enemies resolve to the one that comes first.
#[must_use]
pub fn nearest_in_range(origin: Vec2, range: f32, enemies: &[Enemy]) -> Option<usize> {
    let mut best = f32::INFINITY;
    let mut target = None;
    for (index, enemy) in enemies.iter().enumerate() {
        if !enemy.is_alive() {
            continue;
        }
        let distance = origin.distance(enemy.position());
        if distance <= range && distance < best {
            best = distance;
            target = Some(index);
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_fusion_core::{CellCoord, EnemyId, EnemyKind, Event, TowerId, TowerKind};
    use tower_fusion_world::EventLog;

    fn enemy_at(id: u32, x: f32) -> Enemy {
        Enemy::spawn(
            EnemyId::new(id),
            EnemyKind::Normal,
            100.0,
            0.0,
            Arc::from(vec![Vec2::new(x, 0.0), Vec2::new(x + 500.0, 0.0)]),
        )
    }

    fn tower(kind: TowerKind) -> Tower {
        Tower::new(
            TowerId::new(1),
            kind,
            1,
            CellCoord::new(0, 0),
            Vec2::ZERO,
            kind.standard_entry().stats(),
        )
    }

    #[test]
    fn picks_nearest_enemy_within_range() {
        let enemies = vec![enemy_at(1, 120.0), enemy_at(2, 60.0), enemy_at(3, 200.0)];
        assert_eq!(nearest_in_range(Vec2::ZERO, 140.0, &enemies), Some(1));
    }

    #[test]
    fn ties_resolve_to_first_encountered() {
        let enemies = vec![enemy_at(1, 50.0), enemy_at(2, 50.0)];
        assert_eq!(nearest_in_range(Vec2::ZERO, 140.0, &enemies), Some(0));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let enemies = vec![enemy_at(1, 140.0)];
        assert_eq!(nearest_in_range(Vec2::ZERO, 140.0, &enemies), Some(0));
        assert_eq!(nearest_in_range(Vec2::ZERO, 139.9, &enemies), None);
    }

    #[test]
    fn dead_enemies_are_ignored() {
        let mut enemies = vec![enemy_at(1, 10.0), enemy_at(2, 90.0)];
        enemies[0].take_damage(1_000.0);
        assert_eq!(nearest_in_range(Vec2::ZERO, 140.0, &enemies), Some(1));
    }

    #[test]
    fn firing_damages_target_and_starts_cooldown() {
        let mut system = TowerCombat::new();
        let mut towers = vec![tower(TowerKind::Cannon)];
        let mut enemies = vec![enemy_at(7, 100.0)];
        let mut log = EventLog::new();

        let shots = system.handle(&mut towers, &mut enemies, &mut log, 0.016);

        assert_eq!(shots, 1);
        assert_eq!(enemies[0].health(), 85.0);
        assert_eq!(towers[0].cooldown(), 1.0);
        assert_eq!(
            log.events(),
            &[Event::TowerFired {
                tower: TowerId::new(1),
                enemy: EnemyId::new(7),
                damage: 15.0,
            }]
        );

        let shots = system.handle(&mut towers, &mut enemies, &mut log, 0.5);
        assert_eq!(shots, 0, "cooldown still running");
        assert_eq!(system.shots_fired(), 1);
    }

    #[test]
    fn slow_towers_apply_slow_effect() {
        let mut system = TowerCombat::new();
        let mut towers = vec![tower(TowerKind::Slow)];
        let mut enemies = vec![enemy_at(1, 50.0)];
        let mut log = EventLog::new();

        let _ = system.handle(&mut towers, &mut enemies, &mut log, 0.016);

        assert_eq!(enemies[0].slow_factor(), 0.5);
        assert_eq!(enemies[0].slow_timer(), 1.0);
    }

    #[test]
    fn other_towers_do_not_slow() {
        let mut system = TowerCombat::new();
        let mut towers = vec![tower(TowerKind::Sniper)];
        let mut enemies = vec![enemy_at(1, 250.0)];
        let mut log = EventLog::new();

        let _ = system.handle(&mut towers, &mut enemies, &mut log, 0.016);

        assert_eq!(enemies[0].health(), 55.0);
        assert_eq!(enemies[0].slow_factor(), 1.0);
    }

    #[test]
    fn out_of_range_towers_hold_fire() {
        let mut system = TowerCombat::new();
        let mut towers = vec![tower(TowerKind::Rapid)];
        let mut enemies = vec![enemy_at(1, 300.0)];
        let mut log = EventLog::new();

        assert_eq!(system.handle(&mut towers, &mut enemies, &mut log, 0.016), 0);
        assert!(towers[0].can_shoot());
        assert!(log.events().is_empty());
    }
}
