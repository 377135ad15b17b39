//! Scripted player used by `--autobuild`.

use tower_fusion_core::{CellCoord, Command, TowerId, TowerKind};
use tower_fusion_world::World;

const NEIGHBOURS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Builds and fuses towers while no wave is running.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    candidates: Vec<CellCoord>,
}

impl Autopilot {
    /// Queues at most one fusion and one placement for the current frame.
    pub(crate) fn plan<O>(&mut self, world: &World<O>, out: &mut Vec<Command>) {
        if world.is_halted() || !world.enemies().is_empty() || world.enemies_to_spawn() > 0 {
            return;
        }

        if let Some((first, second)) = mergeable_pair(world) {
            out.push(Command::FuseTowers { first, second });
        }

        let Some(kind) = cheapest_affordable(world) else {
            return;
        };
        self.collect_candidates(world);
        let Some(cell) = self.candidates.first().copied() else {
            return;
        };

        for _ in 0..cycle_steps(world, kind) {
            out.push(Command::CycleTowerType);
        }
        out.push(Command::PlaceTower { cell });
    }

    /// Free buildable cells next to the path, nearest the spawn first.
    fn collect_candidates<O>(&mut self, world: &World<O>) {
        self.candidates.clear();
        let (max_column, max_row) = world.buildable_limits();
        for cell in world.path() {
            for (dc, dr) in NEIGHBOURS {
                let candidate = CellCoord::new(cell.column() + dc, cell.row() + dr);
                if candidate.column() < 0
                    || candidate.row() < 0
                    || candidate.column() > max_column
                    || candidate.row() > max_row
                {
                    continue;
                }
                if world.is_blocked(candidate)
                    || world.tower_at(candidate).is_some()
                    || self.candidates.contains(&candidate)
                {
                    continue;
                }
                self.candidates.push(candidate);
            }
        }
    }
}

fn mergeable_pair<O>(world: &World<O>) -> Option<(TowerId, TowerId)> {
    let towers = world.towers();
    towers.iter().enumerate().find_map(|(index, first)| {
        towers[index + 1..]
            .iter()
            .find(|second| first.mergeable(second))
            .map(|second| (first.id(), second.id()))
    })
}

fn cheapest_affordable<O>(world: &World<O>) -> Option<TowerKind> {
    world
        .config()
        .catalog
        .entries()
        .iter()
        .filter(|entry| entry.cost <= world.gold())
        .min_by_key(|entry| entry.cost)
        .map(|entry| entry.kind)
}

fn cycle_steps<O>(world: &World<O>, target: TowerKind) -> usize {
    let entries = world.config().catalog.entries();
    let position = |kind: TowerKind| entries.iter().position(|entry| entry.kind == kind);
    match (position(world.build_kind()), position(target)) {
        (Some(current), Some(wanted)) => (wanted + entries.len() - current) % entries.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tower_fusion_world::{apply, NullObserver, WorldConfig};

    fn world(gold: u32) -> World {
        let config = WorldConfig {
            starting_gold: gold,
            ..WorldConfig::default()
        };
        World::with_rng(config, NullObserver, ChaCha8Rng::seed_from_u64(31))
    }

    fn run(world: &mut World, autopilot: &mut Autopilot) -> Vec<Command> {
        let mut commands = Vec::new();
        autopilot.plan(world, &mut commands);
        let mut events = Vec::new();
        for command in commands.clone() {
            apply(world, command, &mut events);
        }
        commands
    }

    #[test]
    fn places_cheapest_tower_beside_the_path() {
        let mut world = world(150);
        let mut autopilot = Autopilot::default();

        let commands = run(&mut world, &mut autopilot);

        assert_eq!(commands.len(), 1);
        assert_eq!(world.towers().len(), 1);
        let tower = &world.towers()[0];
        assert_eq!(tower.kind(), TowerKind::Cannon);
        assert!(world
            .path()
            .iter()
            .any(|cell| cell.manhattan_distance(tower.cell()) == 1));
    }

    #[test]
    fn fuses_matching_towers_on_the_next_frame() {
        let mut world = world(100);
        let mut autopilot = Autopilot::default();

        let _ = run(&mut world, &mut autopilot);
        let _ = run(&mut world, &mut autopilot);
        assert_eq!(world.towers().len(), 2);
        assert_eq!(world.gold(), 0);

        let commands = run(&mut world, &mut autopilot);
        assert!(matches!(commands[0], Command::FuseTowers { .. }));
        assert_eq!(world.towers().len(), 1);
        assert_eq!(world.towers()[0].level(), 2);
    }

    #[test]
    fn cycles_to_the_cheapest_kind() {
        let mut world = world(150);
        let _ = world.cycle_tower_type();
        let _ = world.cycle_tower_type();
        let mut autopilot = Autopilot::default();

        let commands = run(&mut world, &mut autopilot);

        assert_eq!(
            commands
                .iter()
                .filter(|command| **command == Command::CycleTowerType)
                .count(),
            2
        );
        assert_eq!(world.build_kind(), TowerKind::Cannon);
    }

    #[test]
    fn stays_idle_during_a_wave() {
        let mut world = world(150);
        let _ = world.start_next_wave();
        let mut autopilot = Autopilot::default();

        assert!(run(&mut world, &mut autopilot).is_empty());
    }
}
