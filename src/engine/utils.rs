use crate::constants::{GOAL_BONUS, MOVE_PENALTY, TIME_PENALTY_PER_SEC};

pub(super) fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}

/// Points for clearing a maze; negative when the run took too long.
pub(super) fn goal_award(maze_elapsed_ms: u64, maze_moves: i32) -> i32 {
    let time_penalty = (ms_to_secs(maze_elapsed_ms) * TIME_PENALTY_PER_SEC) as i32;
    GOAL_BONUS - time_penalty - maze_moves * MOVE_PENALTY
}

pub(super) fn apply_award(score: i32, award: i32) -> i32 {
    score.saturating_add(award).max(0)
}
