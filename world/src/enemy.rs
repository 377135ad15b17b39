//! Enemy state and its per-step movement state machine.

use std::sync::Arc;

use glam::Vec2;
use tower_fusion_core::{EnemyId, EnemyKind, EnemySnapshot, WorldPoint};

/// Distance below which the enemy counts as standing on its target waypoint.
const ARRIVAL_EPSILON: f32 = 1e-3;

/// Squared distance at which a moving enemy advances to the next waypoint.
const WAYPOINT_REACHED_DISTANCE_SQ: f32 = 4.0;

/// Outcome of a single enemy step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStatus {
    /// The enemy is still on its way.
    Advancing,
    /// The enemy ran out of health.
    Dead,
    /// The enemy walked past the final waypoint.
    ReachedEnd,
}

/// Enemy walking along the shared waypoint list.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec2,
    health: f32,
    max_health: f32,
    speed: f32,
    waypoints: Arc<[Vec2]>,
    next_waypoint: usize,
    alive: bool,
    slow_factor: f32,
    slow_timer: f32,
}

impl Enemy {
    /// Spawns an enemy on the first waypoint, heading for the second.
    #[must_use]
    pub fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        health: f32,
        speed: f32,
        waypoints: Arc<[Vec2]>,
    ) -> Self {
        let position = waypoints.first().copied().unwrap_or(Vec2::ZERO);
        Self {
            id,
            kind,
            position,
            health,
            max_health: health,
            speed,
            waypoints,
            next_waypoint: 1,
            alive: health > 0.0,
            slow_factor: 1.0,
            slow_timer: 0.0,
        }
    }

    /// Advances the enemy by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> EnemyStatus {
        if !self.alive {
            return EnemyStatus::Dead;
        }
        let Some(target) = self.waypoints.get(self.next_waypoint).copied() else {
            return EnemyStatus::ReachedEnd;
        };

        let offset = target - self.position;
        let distance = offset.length();
        if distance < ARRIVAL_EPSILON {
            self.next_waypoint += 1;
        } else {
            let step = (self.speed * self.slow_factor * dt).min(distance);
            self.position += offset / distance * step;
            if self.position.distance_squared(target) < WAYPOINT_REACHED_DISTANCE_SQ {
                self.next_waypoint += 1;
            }
        }

        self.tick_slow(dt);
        EnemyStatus::Advancing
    }

    /// Subtracts `amount` from the enemy's health.
    pub fn take_damage(&mut self, amount: f32) {
        self.health -= amount;
        if self.health <= 0.0 {
            self.alive = false;
        }
    }

    /// Applies a slow effect.
    ///
    /// Reapplication never stacks: the lower factor and the longer remaining
    /// duration are each kept independently.
    pub fn apply_slow(&mut self, factor: f32, duration: f32) {
        if factor < self.slow_factor {
            self.slow_factor = factor;
        }
        if duration > self.slow_timer {
            self.slow_timer = duration;
        }
    }

    fn tick_slow(&mut self, dt: f32) {
        if self.slow_timer <= 0.0 {
            return;
        }
        self.slow_timer -= dt;
        if self.slow_timer <= 0.0 {
            self.slow_timer = 0.0;
            self.slow_factor = 1.0;
        }
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Variant of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health; may be negative once the enemy is dead.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Unimpaired movement speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether the enemy still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Active speed multiplier; `1.0` when not slowed.
    #[must_use]
    pub const fn slow_factor(&self) -> f32 {
        self.slow_factor
    }

    /// Seconds left on the active slow effect.
    #[must_use]
    pub const fn slow_timer(&self) -> f32 {
        self.slow_timer
    }

    /// Index of the waypoint the enemy is walking towards.
    #[must_use]
    pub const fn next_waypoint(&self) -> usize {
        self.next_waypoint
    }

    /// Remaining health as a share of maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Captures a rendering snapshot.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: WorldPoint::new(self.position.x, self.position.y),
            health_fraction: self.health_fraction(),
            slowed: self.slow_timer > 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn straight_route() -> Arc<[Vec2]> {
        Arc::from(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        ])
    }

    fn enemy(health: f32, speed: f32) -> Enemy {
        Enemy::spawn(
            EnemyId::new(1),
            EnemyKind::Normal,
            health,
            speed,
            straight_route(),
        )
    }

    #[test]
    fn spawns_on_first_waypoint_targeting_second() {
        let enemy = enemy(50.0, 10.0);
        assert_eq!(enemy.position(), Vec2::ZERO);
        assert_eq!(enemy.next_waypoint(), 1);
        assert!(enemy.is_alive());
    }

    #[test]
    fn damage_lowers_health_and_kills_at_zero() {
        let mut enemy = enemy(30.0, 10.0);

        enemy.take_damage(10.0);
        assert_eq!(enemy.health(), 20.0);
        assert!(enemy.is_alive());

        enemy.take_damage(19.5);
        assert!(enemy.health() < 20.0);
        assert!(enemy.is_alive(), "alive until health crosses zero");

        enemy.take_damage(0.5);
        assert_eq!(enemy.health(), 0.0);
        assert!(!enemy.is_alive());
    }

    proptest! {
        #[test]
        fn positive_damage_always_lowers_health(
            health in 1.0f32..1_000.0,
            hits in prop::collection::vec(0.01f32..400.0, 1..8),
        ) {
            let mut enemy = enemy(health, 10.0);
            for damage in hits {
                let before = enemy.health();
                enemy.take_damage(damage);
                prop_assert!(enemy.health() < before);
                prop_assert_eq!(enemy.health(), before - damage);
                prop_assert_eq!(enemy.is_alive(), enemy.health() > 0.0);
                if !enemy.is_alive() {
                    prop_assert_eq!(enemy.advance(0.016), EnemyStatus::Dead);
                }
            }
        }
    }

    #[test]
    fn overkill_leaves_negative_health_but_dead_flag() {
        let mut enemy = enemy(10.0, 10.0);
        enemy.take_damage(25.0);
        assert_eq!(enemy.health(), -15.0);
        assert!(!enemy.is_alive());
        assert_eq!(enemy.health_fraction(), 0.0);
        assert_eq!(enemy.advance(0.1), EnemyStatus::Dead);
    }

    #[test]
    fn moves_towards_target_waypoint() {
        let mut enemy = enemy(10.0, 20.0);
        assert_eq!(enemy.advance(0.5), EnemyStatus::Advancing);
        assert!((enemy.position().x - 10.0).abs() < 1e-5);
        assert_eq!(enemy.position().y, 0.0);
        assert_eq!(enemy.next_waypoint(), 1);
    }

    #[test]
    fn advances_cursor_inside_reach_threshold() {
        let mut enemy = enemy(10.0, 99.0);
        let _ = enemy.advance(1.0);
        assert_eq!(enemy.next_waypoint(), 2, "1 unit short counts as arrived");
    }

    #[test]
    fn reaches_end_after_final_waypoint() {
        let mut enemy = enemy(10.0, 1_000.0);
        let mut steps = 0;
        while enemy.advance(1.0) == EnemyStatus::Advancing {
            steps += 1;
            assert!(steps < 10, "enemy never reached the end");
        }
        assert_eq!(enemy.advance(1.0), EnemyStatus::ReachedEnd);
    }

    #[test]
    fn single_waypoint_route_ends_immediately() {
        let mut enemy = Enemy::spawn(
            EnemyId::new(4),
            EnemyKind::Fast,
            10.0,
            10.0,
            Arc::from(vec![Vec2::new(5.0, 5.0)]),
        );
        assert_eq!(enemy.advance(0.1), EnemyStatus::ReachedEnd);
    }

    #[test]
    fn stronger_and_longer_slow_each_win() {
        let mut enemy = enemy(10.0, 10.0);
        enemy.apply_slow(0.5, 2.0);
        enemy.apply_slow(0.7, 1.0);
        assert_eq!(enemy.slow_factor(), 0.5);
        assert_eq!(enemy.slow_timer(), 2.0);

        let _ = enemy.advance(0.5);
        assert!((enemy.slow_timer() - 1.5).abs() < 1e-6);

        enemy.apply_slow(0.8, 1.0);
        assert_eq!(enemy.slow_factor(), 0.5);
        assert!((enemy.slow_timer() - 1.5).abs() < 1e-6, "1.0 < remaining 1.5");

        enemy.apply_slow(0.9, 3.0);
        assert_eq!(enemy.slow_factor(), 0.5);
        assert_eq!(enemy.slow_timer(), 3.0);
    }

    #[test]
    fn slow_halves_distance_and_expires() {
        let mut enemy = enemy(10.0, 20.0);
        enemy.apply_slow(0.5, 1.0);

        let _ = enemy.advance(0.5);
        assert!((enemy.position().x - 5.0).abs() < 1e-5);
        assert!(enemy.snapshot().slowed);

        let _ = enemy.advance(0.5);
        assert_eq!(enemy.slow_factor(), 1.0);
        assert_eq!(enemy.slow_timer(), 0.0);
        assert!(!enemy.snapshot().slowed);
    }
}
