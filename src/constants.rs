use crate::types::{Difficulty, DifficultyProfile};

pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MIN_MAZE_SIZE: i32 = 15;

pub const GOAL_BONUS: i32 = 1_000;
pub const TIME_PENALTY_PER_SEC: f32 = 10.0;
pub const MOVE_PENALTY: i32 = 5;

pub const POWER_UP_DURATION_MS: u64 = 10_000;
pub const TIME_SLOW_FACTOR: f32 = 0.5;

/// Patrol waypoints advanced per second before the difficulty multiplier.
pub const ENEMY_BASE_SPEED: f32 = 1.0;
pub const ENEMY_PATROL_SPAN: i32 = 3;

pub const PLACEMENT_MAX_ATTEMPTS: usize = 64;

pub fn get_difficulty_profile(difficulty: Difficulty) -> Option<DifficultyProfile> {
    match difficulty {
        Difficulty::Easy => Some(DifficultyProfile {
            size: 15,
            extra_path_divisor: 8,
            enemy_count: 2,
            enemy_speed: 1.0,
            power_up_count: 3,
        }),
        Difficulty::Medium => Some(DifficultyProfile {
            size: 21,
            extra_path_divisor: 10,
            enemy_count: 4,
            enemy_speed: 1.5,
            power_up_count: 4,
        }),
        Difficulty::Hard => Some(DifficultyProfile {
            size: 31,
            extra_path_divisor: 15,
            enemy_count: 6,
            enemy_speed: 2.0,
            power_up_count: 5,
        }),
        Difficulty::Custom => None,
    }
}
