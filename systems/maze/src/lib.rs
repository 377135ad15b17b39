#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomised maze carving and enemy path extraction.
//!
//! The generator carves a spanning-tree maze over the buildable part of the
//! viewport with an iterative randomised depth-first traversal, then extracts
//! the unique path between a cell on the left edge and a cell on the right
//! edge. That path doubles as the render layout and the enemy route.
//!
//! The random source is always supplied by the caller so that tests and
//! replays can pin the outcome.

use std::collections::VecDeque;

use rand::{seq::SliceRandom, Rng};
use tower_fusion_core::{CellCoord, Viewport, WorldPoint};

/// Lower bound on the number of maze columns.
pub const MIN_COLUMNS: u32 = 12;

/// Lower bound on the number of maze rows.
pub const MIN_ROWS: u32 = 14;

const MAX_ATTEMPTS: usize = 24;
const STRAIGHT_BIAS: f64 = 0.35;
const MIN_ROW_COVERAGE: f32 = 0.6;

/// Dimensions of the maze grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a grid size with explicit dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Derives the grid that fits the buildable part of the viewport.
    ///
    /// Both axes are clamped to [`MIN_COLUMNS`] and [`MIN_ROWS`].
    #[must_use]
    pub fn for_viewport(tile_size: f32, viewport: &Viewport) -> Self {
        if !(tile_size > 0.0) || !tile_size.is_finite() {
            return Self::new(MIN_COLUMNS, MIN_ROWS);
        }

        let columns = (viewport.buildable_width() / tile_size).floor() as u32;
        let rows = (viewport.height / tile_size).floor() as u32;
        Self::new(columns.max(MIN_COLUMNS), rows.max(MIN_ROWS))
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::try_from(u64::from(self.columns) * u64::from(self.rows)).unwrap_or(0)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }

    fn cell_at(&self, index: usize) -> CellCoord {
        let width = self.columns.max(1) as usize;
        CellCoord::new((index % width) as i32, (index / width) as i32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    const ALL: [Heading; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Right => 0b0010,
            Self::Down => 0b0100,
            Self::Left => 0b1000,
        }
    }

    const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    fn step(self, cell: CellCoord) -> CellCoord {
        match self {
            Self::Up => CellCoord::new(cell.column(), cell.row() + 1),
            Self::Right => CellCoord::new(cell.column() + 1, cell.row()),
            Self::Down => CellCoord::new(cell.column(), cell.row() - 1),
            Self::Left => CellCoord::new(cell.column() - 1, cell.row()),
        }
    }
}

/// Spanning-tree maze over a rectangular grid.
///
/// Every cell stores a bitmask of the passages leading out of it. Passages
/// are always recorded on both of their cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    size: GridSize,
    passages: Vec<u8>,
}

impl Maze {
    /// Carves a maze by randomised depth-first traversal starting at `start`.
    ///
    /// The traversal prefers to keep its heading with a fixed probability,
    /// which produces longer corridors. Every cell ends up visited, so the
    /// passages form a spanning tree. A `start` outside the grid is clamped
    /// to the origin.
    pub fn carve<R>(size: GridSize, start: CellCoord, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut maze = Self {
            size,
            passages: vec![0; size.cell_count()],
        };
        if maze.passages.is_empty() {
            return maze;
        }

        let start = if size.contains(start) {
            start
        } else {
            CellCoord::new(0, 0)
        };

        let mut visited = vec![false; maze.passages.len()];
        let mut stack: Vec<(CellCoord, Option<Heading>)> = vec![(start, None)];
        if let Some(index) = size.index(start) {
            visited[index] = true;
        }

        while let Some(&(cell, heading)) = stack.last() {
            let mut candidates = [None; 4];
            let mut count = 0;
            for candidate in Heading::ALL {
                let next = candidate.step(cell);
                if let Some(index) = size.index(next) {
                    if !visited[index] {
                        candidates[count] = Some(candidate);
                        count += 1;
                    }
                }
            }

            if count == 0 {
                let _ = stack.pop();
                continue;
            }

            let open = &candidates[..count];
            let keep_heading = heading
                .filter(|current| open.contains(&Some(*current)))
                .filter(|_| rng.gen_bool(STRAIGHT_BIAS));
            let Some(chosen) = keep_heading.or_else(|| open[rng.gen_range(0..count)]) else {
                let _ = stack.pop();
                continue;
            };

            let next = chosen.step(cell);
            maze.link(cell, chosen);
            if let Some(index) = size.index(next) {
                visited[index] = true;
            }
            stack.push((next, Some(chosen)));
        }

        maze
    }

    /// Dimensions of the maze.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Reports whether a passage connects the two cells.
    #[must_use]
    pub fn is_linked(&self, from: CellCoord, to: CellCoord) -> bool {
        Heading::ALL
            .into_iter()
            .any(|heading| heading.step(from) == to && self.has_passage(from, heading))
    }

    /// Cells reachable from `cell` through a single passage.
    pub fn linked_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Heading::ALL
            .into_iter()
            .filter(move |heading| self.has_passage(cell, *heading))
            .map(move |heading| heading.step(cell))
    }

    /// Number of undirected passages in the maze.
    #[must_use]
    pub fn passage_count(&self) -> usize {
        let endpoints: u32 = self.passages.iter().map(|mask| mask.count_ones()).sum();
        (endpoints / 2) as usize
    }

    /// Extracts the unique path between two cells with a breadth-first search.
    ///
    /// Returns `None` when either cell lies outside the grid or the cells are
    /// not connected.
    #[must_use]
    pub fn path_between(&self, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
        let start_index = self.size.index(start)?;
        let goal_index = self.size.index(goal)?;

        let mut parents: Vec<Option<usize>> = vec![None; self.passages.len()];
        let mut seen = vec![false; self.passages.len()];
        let mut queue = VecDeque::new();
        seen[start_index] = true;
        queue.push_back(start_index);

        while let Some(index) = queue.pop_front() {
            if index == goal_index {
                break;
            }

            let cell = self.size.cell_at(index);
            for neighbor in self.linked_neighbors(cell) {
                let Some(neighbor_index) = self.size.index(neighbor) else {
                    continue;
                };
                if seen[neighbor_index] {
                    continue;
                }
                seen[neighbor_index] = true;
                parents[neighbor_index] = Some(index);
                queue.push_back(neighbor_index);
            }
        }

        if !seen[goal_index] {
            return None;
        }

        let mut path = vec![goal];
        let mut cursor = goal_index;
        while let Some(parent) = parents[cursor] {
            path.push(self.size.cell_at(parent));
            cursor = parent;
        }
        path.reverse();
        Some(path)
    }

    fn has_passage(&self, cell: CellCoord, heading: Heading) -> bool {
        self.size
            .index(cell)
            .and_then(|index| self.passages.get(index))
            .map_or(false, |mask| mask & heading.bit() != 0)
    }

    fn link(&mut self, cell: CellCoord, heading: Heading) {
        let next = heading.step(cell);
        if let (Some(from), Some(to)) = (self.size.index(cell), self.size.index(next)) {
            self.passages[from] |= heading.bit();
            self.passages[to] |= heading.opposite().bit();
        }
    }
}

/// Enemy route produced by [`generate_path`].
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedPath {
    /// Grid the path was carved in.
    pub size: GridSize,
    /// Ordered cells from the left edge to the right edge.
    pub cells: Vec<CellCoord>,
    /// Pixel centres of [`GeneratedPath::cells`], in the same order.
    pub waypoints: Vec<WorldPoint>,
}

/// Generates a maze for the viewport and extracts a long left-to-right path.
///
/// Up to a fixed number of mazes are carved. The first path that is long
/// enough and visits enough distinct rows is returned; otherwise the longest
/// candidate found is used. The function never fails: in the degenerate case
/// the path is a single cell.
pub fn generate_path<R>(tile_size: f32, viewport: &Viewport, rng: &mut R) -> GeneratedPath
where
    R: Rng + ?Sized,
{
    let size = GridSize::for_viewport(tile_size, viewport);
    let cells = best_path(size, rng);
    let waypoints = cells
        .iter()
        .map(|cell| viewport.cell_center(*cell, tile_size))
        .collect();

    GeneratedPath {
        size,
        cells,
        waypoints,
    }
}

/// Carves mazes for the provided grid until an acceptable path is found.
pub fn best_path<R>(size: GridSize, rng: &mut R) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    let mut best: Option<Vec<CellCoord>> = None;

    for attempt in 0..MAX_ATTEMPTS {
        let (start, goal) = pick_endpoints(size, rng);
        let maze = Maze::carve(size, start, rng);
        let Some(path) = maze.path_between(start, goal) else {
            continue;
        };

        if is_acceptable(&path, size) {
            log::debug!(
                "maze attempt {attempt} accepted with {} path cells",
                path.len()
            );
            return path;
        }

        if best.as_ref().map_or(true, |current| path.len() > current.len()) {
            best = Some(path);
        }
    }

    match best {
        Some(path) => {
            log::debug!(
                "no maze met the length heuristic, falling back to {} path cells",
                path.len()
            );
            path
        }
        None => {
            log::debug!("maze generation produced no path, using a single cell");
            vec![CellCoord::new(0, (size.rows() / 2) as i32)]
        }
    }
}

fn pick_endpoints<R>(size: GridSize, rng: &mut R) -> (CellCoord, CellCoord)
where
    R: Rng + ?Sized,
{
    let rows = size.rows().max(1);
    let last_column = size.columns().saturating_sub(1) as i32;
    let start_row = rng.gen_range(0..rows);
    let separation = (rows / 3).max(2);

    let far_rows: Vec<u32> = (0..rows)
        .filter(|row| row.abs_diff(start_row) >= separation)
        .collect();
    let goal_row = far_rows
        .choose(rng)
        .copied()
        .unwrap_or_else(|| rng.gen_range(0..rows));

    (
        CellCoord::new(0, start_row as i32),
        CellCoord::new(last_column, goal_row as i32),
    )
}

fn is_acceptable(path: &[CellCoord], size: GridSize) -> bool {
    let cell_count = size.cell_count();
    let minimum_length = (size.columns() as usize * 2).max(cell_count / 4);
    if path.len() < minimum_length {
        return false;
    }

    let mut rows_seen = vec![false; size.rows() as usize];
    for cell in path {
        if let Some(seen) = usize::try_from(cell.row())
            .ok()
            .and_then(|row| rows_seen.get_mut(row))
        {
            *seen = true;
        }
    }
    let covered = rows_seen.iter().filter(|seen| **seen).count();
    covered as f32 >= size.rows() as f32 * MIN_ROW_COVERAGE
}
