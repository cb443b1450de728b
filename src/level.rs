use crate::constants::get_difficulty_profile;
use crate::error::MazeError;
use crate::maze::{generate_maze, Maze, MazeLayout};
use crate::placement::{place_enemies, place_power_ups};
use crate::rng::Rng;
use crate::types::{Coord, Difficulty, DifficultyProfile, PowerUpType};

/// One maze together with everything placed on it. Replaced wholesale on
/// every new game, difficulty change or cleared goal.
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    pub maze: Maze,
    pub enemy_spawns: Vec<Coord>,
    pub power_ups: Vec<(PowerUpType, Coord)>,
}

pub fn resolve_profile(
    difficulty: Difficulty,
    custom: Option<DifficultyProfile>,
) -> Result<DifficultyProfile, MazeError> {
    match difficulty {
        Difficulty::Custom => custom.ok_or(MazeError::UnsupportedDifficulty(difficulty)),
        _ => get_difficulty_profile(difficulty)
            .ok_or(MazeError::UnsupportedDifficulty(difficulty)),
    }
}

pub fn generate_level(
    profile: &DifficultyProfile,
    rng: &mut Rng,
) -> Result<GeneratedLevel, MazeError> {
    let layout = MazeLayout::square(profile.size, profile.extra_path_divisor);
    let maze = generate_maze(layout, rng)?;
    let enemy_spawns =
        place_enemies(&maze.grid, maze.start, maze.end, profile.enemy_count, rng)?;
    let power_ups = place_power_ups(
        &maze.grid,
        maze.start,
        maze.end,
        &enemy_spawns,
        profile.power_up_count,
        rng,
    )?;
    Ok(GeneratedLevel {
        maze,
        enemy_spawns,
        power_ups,
    })
}
