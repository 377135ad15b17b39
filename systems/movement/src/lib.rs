#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy advancement, kill rewards and leak accounting for a single tick.

use tower_fusion_world::{CombatObserver, Enemy, EnemyStatus, Ledger};

/// Counts of enemies removed during one call to [`Movement::handle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementReport {
    /// Enemies removed because their health ran out.
    pub kills: u32,
    /// Enemies removed because they reached the end of the path.
    pub leaks: u32,
}

/// Movement system that advances enemies and rebuilds the live list.
#[derive(Debug, Default)]
pub struct Movement {
    survivors: Vec<Enemy>,
}

impl Movement {
    /// Creates a movement system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every enemy by `dt` seconds.
    ///
    /// Dead enemies notify the observer and pay the kill reward; enemies past
    /// the final waypoint cost a life. Both are dropped from `enemies`, which
    /// keeps the survivors in spawn order.
    pub fn handle<O>(
        &mut self,
        enemies: &mut Vec<Enemy>,
        ledger: &mut Ledger<'_>,
        observer: &mut O,
        dt: f32,
    ) -> MovementReport
    where
        O: CombatObserver + ?Sized,
    {
        let mut report = MovementReport::default();
        self.survivors.clear();
        self.survivors.reserve(enemies.len());

        for mut enemy in enemies.drain(..) {
            match enemy.advance(dt) {
                EnemyStatus::Advancing => self.survivors.push(enemy),
                EnemyStatus::Dead => {
                    observer.on_enemy_died(&enemy);
                    ledger.reward_kill();
                    report.kills += 1;
                }
                EnemyStatus::ReachedEnd => {
                    ledger.record_leak();
                    report.leaks += 1;
                    log::debug!(
                        "enemy {} leaked, {} lives left",
                        enemy.id().get(),
                        ledger.economy().lives()
                    );
                }
            }
        }

        std::mem::swap(enemies, &mut self.survivors);
        report
    }
}
