use std::fmt;

use crate::types::Difficulty;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MazeError {
    /// Width and height must both be odd and at least `MIN_MAZE_SIZE`.
    InvalidDimensions { width: i32, height: i32 },
    UnsupportedDifficulty(Difficulty),
    PlacementExhausted { requested: usize, placed: usize },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::InvalidDimensions { width, height } => {
                write!(f, "invalid maze dimensions {width}x{height}")
            }
            MazeError::UnsupportedDifficulty(difficulty) => {
                write!(f, "no profile available for difficulty {difficulty:?}")
            }
            MazeError::PlacementExhausted { requested, placed } => write!(
                f,
                "placement exhausted: placed {placed} of {requested} requested cells"
            ),
        }
    }
}

impl std::error::Error for MazeError {}
