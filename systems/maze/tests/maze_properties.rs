use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_fusion_core::{CellCoord, Viewport};
use tower_fusion_system_maze::{best_path, generate_path, GridSize, Maze};

fn reachable_from(maze: &Maze, start: CellCoord) -> HashSet<CellCoord> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let _ = seen.insert(start);
    queue.push_back(start);
    while let Some(cell) = queue.pop_front() {
        for neighbor in maze.linked_neighbors(cell) {
            if seen.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    seen
}

fn assert_simple_adjacent(path: &[CellCoord]) {
    let unique: HashSet<CellCoord> = path.iter().copied().collect();
    assert_eq!(unique.len(), path.len(), "path revisits a cell");
    for pair in path.windows(2) {
        assert!(
            pair[0].is_adjacent(pair[1]),
            "{:?} and {:?} are not adjacent",
            pair[0],
            pair[1]
        );
    }
}

proptest! {
    #[test]
    fn every_cell_is_reachable(seed in any::<u64>(), columns in 1u32..24, rows in 1u32..24) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let size = GridSize::new(columns, rows);
        let maze = Maze::carve(size, CellCoord::new(0, 0), &mut rng);

        let reachable = reachable_from(&maze, CellCoord::new(0, 0));
        prop_assert_eq!(reachable.len(), size.cell_count());
        prop_assert_eq!(maze.passage_count(), size.cell_count() - 1);
    }

    #[test]
    fn extracted_paths_are_simple(seed in any::<u64>(), columns in 2u32..20, rows in 2u32..20) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let path = best_path(GridSize::new(columns, rows), &mut rng);

        prop_assert!(!path.is_empty());
        assert_simple_adjacent(&path);
        prop_assert_eq!(path[0].column(), 0);
        prop_assert_eq!(path[path.len() - 1].column(), columns as i32 - 1);
    }
}

#[test]
fn seeded_paths_span_left_to_right_edge() {
    let viewport = Viewport::default();
    for seed in [1_u64, 2, 3, 42, 0xdead_beef] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generated = generate_path(48.0, &viewport, &mut rng);
        let cells = &generated.cells;

        assert_eq!(cells.first().map(CellCoord::column), Some(0), "seed {seed}");
        assert_eq!(
            cells.last().map(CellCoord::column),
            Some(generated.size.columns() as i32 - 1),
            "seed {seed}"
        );
        assert_simple_adjacent(cells);
        assert_eq!(cells.len(), generated.waypoints.len());
    }
}

#[test]
fn waypoints_are_cell_centres() {
    let viewport = Viewport::new(8.0, 16.0, 960.0, 720.0);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let generated = generate_path(48.0, &viewport, &mut rng);

    for (cell, waypoint) in generated.cells.iter().zip(&generated.waypoints) {
        assert_eq!(waypoint.x, 8.0 + cell.column() as f32 * 48.0 + 24.0);
        assert_eq!(waypoint.y, 16.0 + cell.row() as f32 * 48.0 + 24.0);
    }
}

#[test]
fn same_seed_reproduces_the_same_maze() {
    let viewport = Viewport::default();
    let first = generate_path(48.0, &viewport, &mut ChaCha8Rng::seed_from_u64(99));
    let second = generate_path(48.0, &viewport, &mut ChaCha8Rng::seed_from_u64(99));
    assert_eq!(first, second);
}

#[test]
fn different_seeds_produce_different_mazes() {
    let viewport = Viewport::default();
    let first = generate_path(48.0, &viewport, &mut ChaCha8Rng::seed_from_u64(1));
    let second = generate_path(48.0, &viewport, &mut ChaCha8Rng::seed_from_u64(2));
    assert_ne!(first.cells, second.cells);
}
