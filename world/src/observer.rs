//! Combat notifications delivered synchronously during a tick.

use tower_fusion_core::Event;

use crate::{Enemy, Tower};

/// Receives the shot and death notifications raised while a tick runs.
///
/// Observers see entities by shared reference only and must not drive the
/// world from inside a callback.
pub trait CombatObserver {
    /// A tower fired at an enemy; the enemy already carries the damage.
    fn on_tower_fired(&mut self, tower: &Tower, enemy: &Enemy);

    /// An enemy was removed because its health ran out.
    fn on_enemy_died(&mut self, enemy: &Enemy);
}

impl<T: CombatObserver + ?Sized> CombatObserver for Box<T> {
    fn on_tower_fired(&mut self, tower: &Tower, enemy: &Enemy) {
        (**self).on_tower_fired(tower, enemy);
    }

    fn on_enemy_died(&mut self, enemy: &Enemy) {
        (**self).on_enemy_died(enemy);
    }
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullObserver;

impl CombatObserver for NullObserver {
    fn on_tower_fired(&mut self, _tower: &Tower, _enemy: &Enemy) {}

    fn on_enemy_died(&mut self, _enemy: &Enemy) {}
}

/// Observer that records notifications as [`Event`] values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns every recorded event.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl CombatObserver for EventLog {
    fn on_tower_fired(&mut self, tower: &Tower, enemy: &Enemy) {
        log::trace!(
            "tower {} hit enemy {} for {:.1}",
            tower.id().get(),
            enemy.id().get(),
            tower.damage()
        );
        self.events.push(Event::TowerFired {
            tower: tower.id(),
            enemy: enemy.id(),
            damage: tower.damage(),
        });
    }

    fn on_enemy_died(&mut self, enemy: &Enemy) {
        self.events.push(Event::EnemyDied {
            enemy: enemy.id(),
            kind: enemy.kind(),
        });
    }
}
