use std::collections::HashSet;

use crate::constants::PLACEMENT_MAX_ATTEMPTS;
use crate::error::MazeError;
use crate::maze::{reachable_from, Grid};
use crate::rng::Rng;
use crate::types::{Coord, PowerUpType};

/// Picks `count` distinct enemy spawn cells: interior, open, never start or end.
pub fn place_enemies(
    grid: &Grid,
    start: Coord,
    end: Coord,
    count: usize,
    rng: &mut Rng,
) -> Result<Vec<Coord>, MazeError> {
    let blocked = HashSet::from([start, end]);
    place_cells(grid, count, &blocked, None, rng)
}

/// Picks power-up cells reachable from `start`, avoiding start, end and `taken`.
pub fn place_power_ups(
    grid: &Grid,
    start: Coord,
    end: Coord,
    taken: &[Coord],
    count: usize,
    rng: &mut Rng,
) -> Result<Vec<(PowerUpType, Coord)>, MazeError> {
    let mut blocked: HashSet<Coord> = taken.iter().copied().collect();
    blocked.insert(start);
    blocked.insert(end);
    let reachable = reachable_from(grid, start);
    let cells = place_cells(grid, count, &blocked, Some(&reachable), rng)?;
    Ok(cells
        .into_iter()
        .map(|cell| {
            let kind = PowerUpType::ALL[rng.pick_index(PowerUpType::ALL.len())];
            (kind, cell)
        })
        .collect())
}

pub fn is_placeable(grid: &Grid, blocked: &HashSet<Coord>, pos: Coord) -> bool {
    grid.is_interior(pos) && grid.is_open(pos) && !blocked.contains(&pos)
}

/// Rejection sampling capped per cell, then a draw from the explicit list
/// of remaining eligible cells.
fn place_cells(
    grid: &Grid,
    count: usize,
    blocked: &HashSet<Coord>,
    allowed: Option<&HashSet<Coord>>,
    rng: &mut Rng,
) -> Result<Vec<Coord>, MazeError> {
    let mut used = blocked.clone();
    let mut out = Vec::with_capacity(count);
    let eligible = |used: &HashSet<Coord>, pos: Coord| {
        is_placeable(grid, used, pos) && allowed.is_none_or(|set| set.contains(&pos))
    };

    for _ in 0..count {
        let mut picked = None;
        for _ in 0..PLACEMENT_MAX_ATTEMPTS {
            let pos = Coord::new(
                rng.int(1, grid.width() - 2),
                rng.int(1, grid.height() - 2),
            );
            if eligible(&used, pos) {
                picked = Some(pos);
                break;
            }
        }

        if picked.is_none() {
            let candidates: Vec<Coord> = grid
                .interior_cells()
                .filter(|pos| eligible(&used, *pos))
                .collect();
            if !candidates.is_empty() {
                picked = Some(candidates[rng.pick_index(candidates.len())]);
            }
        }

        let Some(pos) = picked else {
            return Err(MazeError::PlacementExhausted {
                requested: count,
                placed: out.len(),
            });
        };
        used.insert(pos);
        out.push(pos);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{generate_maze, MazeLayout};
    use crate::types::Cell;

    #[test]
    fn enemies_land_on_distinct_open_cells() {
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let maze = generate_maze(MazeLayout::square(31, 15), &mut rng).expect("valid layout");
            let spawns =
                place_enemies(&maze.grid, maze.start, maze.end, 6, &mut rng).expect("room");
            assert_eq!(spawns.len(), 6);
            let unique: HashSet<Coord> = spawns.iter().copied().collect();
            assert_eq!(unique.len(), spawns.len(), "duplicate spawn: seed={seed}");
            for spawn in spawns {
                assert!(maze.grid.is_interior(spawn));
                assert!(maze.grid.is_open(spawn));
                assert_ne!(spawn, maze.start);
                assert_ne!(spawn, maze.end);
            }
        }
    }

    #[test]
    fn falls_back_to_candidate_list_on_sparse_grid() {
        let mut grid = Grid::filled(15, 15, Cell::Wall);
        let start = Coord::new(1, 1);
        let end = Coord::new(13, 13);
        grid.set(start, Cell::Open);
        grid.set(end, Cell::Open);
        grid.set(Coord::new(7, 7), Cell::Open);
        grid.set(Coord::new(9, 3), Cell::Open);

        let mut rng = Rng::new(12);
        let mut spawns = place_enemies(&grid, start, end, 2, &mut rng).expect("two cells left");
        spawns.sort();
        assert_eq!(spawns, vec![Coord::new(7, 7), Coord::new(9, 3)]);
    }

    #[test]
    fn reports_exhaustion_instead_of_looping() {
        let mut grid = Grid::filled(15, 15, Cell::Wall);
        let start = Coord::new(1, 1);
        let end = Coord::new(13, 13);
        grid.set(start, Cell::Open);
        grid.set(end, Cell::Open);
        grid.set(Coord::new(5, 5), Cell::Open);

        let mut rng = Rng::new(1);
        assert_eq!(
            place_enemies(&grid, start, end, 3, &mut rng),
            Err(MazeError::PlacementExhausted {
                requested: 3,
                placed: 1,
            })
        );
    }

    #[test]
    fn zero_count_places_nothing() {
        let grid = Grid::filled(15, 15, Cell::Wall);
        let mut rng = Rng::new(1);
        let spawns = place_enemies(&grid, Coord::new(1, 1), Coord::new(13, 13), 0, &mut rng)
            .expect("nothing requested");
        assert!(spawns.is_empty());
    }

    #[test]
    fn power_ups_are_reachable_and_avoid_taken_cells() {
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let maze = generate_maze(MazeLayout::square(21, 10), &mut rng).expect("valid layout");
            let spawns =
                place_enemies(&maze.grid, maze.start, maze.end, 4, &mut rng).expect("room");
            let power_ups =
                place_power_ups(&maze.grid, maze.start, maze.end, &spawns, 4, &mut rng)
                    .expect("room");
            let reachable = reachable_from(&maze.grid, maze.start);
            assert_eq!(power_ups.len(), 4);
            for (_, pos) in &power_ups {
                assert!(reachable.contains(pos));
                assert!(!spawns.contains(pos));
                assert_ne!(*pos, maze.start);
                assert_ne!(*pos, maze.end);
            }
        }
    }

    #[test]
    fn power_ups_skip_isolated_open_cells() {
        let mut grid = Grid::filled(15, 15, Cell::Wall);
        let start = Coord::new(1, 1);
        let end = Coord::new(13, 13);
        for x in 1..=4 {
            grid.set(Coord::new(x, 1), Cell::Open);
        }
        grid.set(end, Cell::Open);
        grid.set(Coord::new(9, 9), Cell::Open);

        let mut rng = Rng::new(2);
        let power_ups =
            place_power_ups(&grid, start, end, &[], 3, &mut rng).expect("three connected cells");
        let mut cells: Vec<Coord> = power_ups.iter().map(|(_, pos)| *pos).collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![Coord::new(2, 1), Coord::new(3, 1), Coord::new(4, 1)]
        );
    }
}
