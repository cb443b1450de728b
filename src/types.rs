use std::ops::Add;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell halfway between two lattice cells that sit two steps apart.
    pub fn midpoint(self, other: Coord) -> Coord {
        Coord::new((self.x + other.x) / 2, (self.y + other.y) / 2)
    }

    pub fn manhattan(self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Wall,
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> Coord {
        match self {
            Direction::Up => Coord::new(0, -1),
            Direction::Down => Coord::new(0, 1),
            Direction::Left => Coord::new(-1, 0),
            Direction::Right => Coord::new(1, 0),
        }
    }

    /// Direction of a single orthogonal step, if `from -> to` is one.
    pub fn between(from: Coord, to: Coord) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|dir| from + dir.delta() == to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    /// Only usable with a caller-supplied [`DifficultyProfile`].
    Custom,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DifficultyProfile {
    pub size: i32,
    #[serde(rename = "extraPathDivisor")]
    pub extra_path_divisor: i32,
    #[serde(rename = "enemyCount")]
    pub enemy_count: usize,
    #[serde(rename = "enemySpeed")]
    pub enemy_speed: f32,
    #[serde(rename = "powerUpCount")]
    pub power_up_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    DifficultySelect,
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    EnemyCollision,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpType {
    SpeedBoost,
    WallBreak,
    Teleport,
    RevealPath,
    TimeSlow,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 5] = [
        PowerUpType::SpeedBoost,
        PowerUpType::WallBreak,
        PowerUpType::Teleport,
        PowerUpType::RevealPath,
        PowerUpType::TimeSlow,
    ];
}

#[derive(Clone, Debug, Serialize)]
pub struct MazeView {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub start: Coord,
    pub end: Coord,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub spawn: Coord,
}

#[derive(Clone, Debug, Serialize)]
pub struct PowerUpView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PowerUpType,
    pub x: i32,
    pub y: i32,
    pub active: bool,
    #[serde(rename = "remainingMs")]
    pub remaining_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct EffectView {
    #[serde(rename = "type")]
    pub kind: PowerUpType,
    #[serde(rename = "remainingMs")]
    pub remaining_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MazeGenerated {
        difficulty: Difficulty,
        width: i32,
        height: i32,
    },
    GoalReached {
        award: i32,
        score: i32,
        #[serde(rename = "mazeMoves")]
        maze_moves: i32,
        #[serde(rename = "mazeElapsedMs")]
        maze_elapsed_ms: u64,
    },
    PowerUpCollected {
        #[serde(rename = "powerUpId")]
        power_up_id: String,
        #[serde(rename = "powerUpType")]
        power_up_type: PowerUpType,
    },
    PowerUpExpired {
        #[serde(rename = "powerUpId")]
        power_up_id: String,
    },
    WallBroken {
        x: i32,
        y: i32,
    },
    Teleported {
        from: Coord,
        to: Coord,
    },
    GameOver {
        reason: GameOverReason,
        score: i32,
        #[serde(rename = "newHighScore")]
        new_high_score: bool,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub state: GameState,
    pub difficulty: Difficulty,
    pub player: Coord,
    pub end: Coord,
    pub score: i32,
    #[serde(rename = "highScore")]
    pub high_score: i32,
    #[serde(rename = "mazeMoves")]
    pub maze_moves: i32,
    #[serde(rename = "mazeElapsedMs")]
    pub maze_elapsed_ms: u64,
    #[serde(rename = "wallBreakCharges")]
    pub wall_break_charges: u32,
    pub enemies: Vec<EnemyView>,
    #[serde(rename = "powerUps")]
    pub power_ups: Vec<PowerUpView>,
    pub effects: Vec<EffectView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Vec<Coord>>,
    pub events: Vec<SessionEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GameOverReason>,
    pub score: i32,
    #[serde(rename = "highScore")]
    pub high_score: i32,
    #[serde(rename = "mazesCleared")]
    pub mazes_cleared: u32,
    #[serde(rename = "totalMoves")]
    pub total_moves: u32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "powerUpsCollected")]
    pub power_ups_collected: u32,
}
