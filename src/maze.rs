use std::collections::{HashMap, HashSet, VecDeque};

use crate::constants::MIN_MAZE_SIZE;
use crate::error::MazeError;
use crate::rng::Rng;
use crate::types::{Cell, Coord, Direction, MazeView};

const LATTICE_STEPS: [Coord; 4] = [
    Coord::new(0, -2),
    Coord::new(0, 2),
    Coord::new(-2, 0),
    Coord::new(2, 0),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(width: i32, height: i32, cell: Cell) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![cell; len],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn is_interior(&self, pos: Coord) -> bool {
        pos.x >= 1 && pos.y >= 1 && pos.x <= self.width - 2 && pos.y <= self.height - 2
    }

    pub fn get(&self, pos: Coord) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells.get(self.index(pos)).copied()
    }

    pub fn is_open(&self, pos: Coord) -> bool {
        self.get(pos) == Some(Cell::Open)
    }

    /// Writes a cell; out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Coord, cell: Cell) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Open).count()
    }

    pub fn interior_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (1..self.height - 1)
            .flat_map(move |y| (1..self.width - 1).map(move |x| Coord::new(x, y)))
    }

    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| match self.cells[self.index(Coord::new(x, y))] {
                        Cell::Wall => '#',
                        Cell::Open => '.',
                    })
                    .collect()
            })
            .collect()
    }

    fn index(&self, pos: Coord) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    pub width: i32,
    pub height: i32,
    pub extra_path_divisor: i32,
}

impl MazeLayout {
    pub fn square(size: i32, extra_path_divisor: i32) -> Self {
        Self {
            width: size,
            height: size,
            extra_path_divisor,
        }
    }

    pub fn start(&self) -> Coord {
        Coord::new(1, 1)
    }

    pub fn end(&self) -> Coord {
        Coord::new(self.width - 2, self.height - 2)
    }

    fn validate(&self) -> Result<(), MazeError> {
        let valid_side = |side: i32| side >= MIN_MAZE_SIZE && side % 2 == 1;
        if !valid_side(self.width) || !valid_side(self.height) || self.extra_path_divisor <= 0 {
            return Err(MazeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Maze {
    pub grid: Grid,
    pub start: Coord,
    pub end: Coord,
    /// False when the backtracker ran out of cells before touching `end`.
    pub tree_reached_end: bool,
}

impl Maze {
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn to_view(&self) -> MazeView {
        MazeView {
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.to_rows(),
            start: self.start,
            end: self.end,
        }
    }
}

pub fn generate_maze(layout: MazeLayout, rng: &mut Rng) -> Result<Maze, MazeError> {
    layout.validate()?;
    let start = layout.start();
    let end = layout.end();
    let mut grid = Grid::filled(layout.width, layout.height, Cell::Wall);

    let tree_reached_end = carve_spanning_tree(&mut grid, start, end, rng);
    grid.set(start, Cell::Open);
    grid.set(end, Cell::Open);

    densify(&mut grid, start, end, extra_path_count(&layout), rng);

    Ok(Maze {
        grid,
        start,
        end,
        tree_reached_end,
    })
}

pub fn extra_path_count(layout: &MazeLayout) -> usize {
    if layout.extra_path_divisor <= 0 {
        return 0;
    }
    let area = i64::from(layout.width) * i64::from(layout.height);
    (area / i64::from(layout.extra_path_divisor)).max(0) as usize
}

/// Randomized depth-first carving on the odd lattice, stopping as soon as
/// `end` becomes current. Returns whether `end` was reached.
pub fn carve_spanning_tree(grid: &mut Grid, start: Coord, end: Coord, rng: &mut Rng) -> bool {
    let mut visited = HashSet::new();
    let mut stack: Vec<Coord> = Vec::new();
    let mut current = start;

    while current != end {
        visited.insert(current);
        grid.set(current, Cell::Open);

        let candidates: Vec<Coord> = LATTICE_STEPS
            .iter()
            .map(|step| current + *step)
            .filter(|next| grid.is_interior(*next) && !visited.contains(next))
            .collect();

        if !candidates.is_empty() {
            let next = candidates[rng.pick_index(candidates.len())];
            grid.set(current.midpoint(next), Cell::Open);
            stack.push(current);
            current = next;
        } else if let Some(previous) = stack.pop() {
            current = previous;
        } else {
            return false;
        }
    }
    true
}

/// Forces `path_count` random interior cells open, skipping start and end.
/// Returns how many cells changed from wall to open.
pub fn densify(
    grid: &mut Grid,
    start: Coord,
    end: Coord,
    path_count: usize,
    rng: &mut Rng,
) -> usize {
    let mut opened = 0;
    for _ in 0..path_count {
        let pos = Coord::new(
            rng.int(1, grid.width() - 2),
            rng.int(1, grid.height() - 2),
        );
        if pos == start || pos == end {
            continue;
        }
        if !grid.is_open(pos) {
            grid.set(pos, Cell::Open);
            opened += 1;
        }
    }
    opened
}

pub fn is_valid_move(grid: &Grid, pos: Coord) -> bool {
    grid.in_bounds(pos) && grid.is_open(pos)
}

pub fn reachable_from(grid: &Grid, start: Coord) -> HashSet<Coord> {
    let mut out = HashSet::new();
    if !grid.is_open(start) {
        return out;
    }

    let mut queue = VecDeque::new();
    out.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for dir in Direction::ALL {
            let next = pos + dir.delta();
            if !grid.is_open(next) {
                continue;
            }
            if out.insert(next) {
                queue.push_back(next);
            }
        }
    }

    out
}

pub fn is_reachable(grid: &Grid, from: Coord, to: Coord) -> bool {
    shortest_path(grid, from, to).is_some()
}

/// Breadth-first shortest path, both endpoints included.
pub fn shortest_path(grid: &Grid, from: Coord, to: Coord) -> Option<Vec<Coord>> {
    if !grid.is_open(from) || !grid.is_open(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut queue = VecDeque::new();
    came_from.insert(from, from);
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        if pos == to {
            break;
        }
        for dir in Direction::ALL {
            let next = pos + dir.delta();
            if !grid.is_open(next) || came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, pos);
            queue.push_back(next);
        }
    }

    if !came_from.contains_key(&to) {
        return None;
    }
    let mut path = vec![to];
    let mut cursor = to;
    while cursor != from {
        cursor = came_from[&cursor];
        path.push(cursor);
    }
    path.reverse();
    Some(path)
}
