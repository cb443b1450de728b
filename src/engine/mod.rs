use crate::constants::{
    ENEMY_BASE_SPEED, ENEMY_PATROL_SPAN, POWER_UP_DURATION_MS, TIME_SLOW_FACTOR,
};
use crate::error::MazeError;
use crate::level::{generate_level, resolve_profile, GeneratedLevel};
use crate::maze::{is_valid_move, shortest_path, Maze};
use crate::rng::Rng;
use crate::types::{
    Cell, Coord, Difficulty, DifficultyProfile, Direction, EffectView, EnemyView, GameOverReason,
    GameState, GameSummary, MazeView, PowerUpType, PowerUpView, SessionEvent, Snapshot,
};

mod enemy_system;
mod power_up_system;
mod utils;

use self::enemy_system::EnemyInternal;
use self::power_up_system::{ActiveEffect, PowerUpInternal};
use self::utils::{apply_award, goal_award, ms_to_secs};

#[derive(Clone, Debug, Default)]
struct SessionStats {
    score: i32,
    maze_moves: i32,
    maze_elapsed_ms: u64,
    total_moves: u32,
    total_elapsed_ms: u64,
    mazes_cleared: u32,
    power_ups_collected: u32,
}

#[derive(Clone, Debug, Default)]
pub struct GameSessionOptions {
    /// Profile used when `Difficulty::Custom` is selected.
    pub custom_profile: Option<DifficultyProfile>,
    /// Best score known before this session, usually read from the high-score file.
    pub high_score: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameInput {
    SelectDifficulty(Difficulty),
    Move(Direction),
    TogglePause,
    ToggleSolution,
    Restart,
    OpenMenu,
}

#[derive(Clone, Debug)]
pub struct GameSession {
    pub level: GeneratedLevel,

    rng: Rng,
    options: GameSessionOptions,
    state: GameState,
    difficulty: Difficulty,
    profile: DifficultyProfile,
    player: Coord,
    enemies: Vec<EnemyInternal>,
    power_ups: Vec<PowerUpInternal>,
    effects: Vec<ActiveEffect>,
    wall_break_charges: u32,
    show_solution: bool,
    stats: SessionStats,
    high_score: i32,
    events: Vec<SessionEvent>,
    end_reason: Option<GameOverReason>,
    tick_counter: u64,
    next_id_counter: u64,
}

impl GameSession {
    /// Opens on the difficulty menu with a medium maze already built behind it.
    pub fn new(seed: u32, options: GameSessionOptions) -> Result<Self, MazeError> {
        let mut rng = Rng::new(seed);
        let difficulty = Difficulty::Medium;
        let profile = resolve_profile(difficulty, None)?;
        let level = generate_level(&profile, &mut rng)?;
        let high_score = options.high_score.max(0);

        let mut session = Self {
            player: level.maze.start,
            level,
            rng,
            options,
            state: GameState::DifficultySelect,
            difficulty,
            profile,
            enemies: Vec::new(),
            power_ups: Vec::new(),
            effects: Vec::new(),
            wall_break_charges: 0,
            show_solution: false,
            stats: SessionStats::default(),
            high_score,
            events: Vec::new(),
            end_reason: None,
            tick_counter: 0,
            next_id_counter: 1,
        };
        let spawns = session.level.enemy_spawns.clone();
        let power_ups = session.level.power_ups.clone();
        session.spawn_enemies(&spawns);
        session.spawn_power_ups(&power_ups);
        Ok(session)
    }

    /// Shortcut for a session that has already left the menu.
    pub fn start(
        difficulty: Difficulty,
        seed: u32,
        options: GameSessionOptions,
    ) -> Result<Self, MazeError> {
        let mut session = Self::new(seed, options)?;
        session.handle_input(GameInput::SelectDifficulty(difficulty))?;
        Ok(session)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.profile
    }

    pub fn player(&self) -> Coord {
        self.player
    }

    pub fn score(&self) -> i32 {
        self.stats.score
    }

    pub fn high_score(&self) -> i32 {
        self.high_score
    }

    pub fn mazes_cleared(&self) -> u32 {
        self.stats.mazes_cleared
    }

    pub fn is_ended(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn maze(&self) -> &Maze {
        &self.level.maze
    }

    pub fn maze_view(&self) -> MazeView {
        self.level.maze.to_view()
    }

    pub fn handle_input(&mut self, input: GameInput) -> Result<(), MazeError> {
        match (self.state, input) {
            (GameState::DifficultySelect, GameInput::SelectDifficulty(difficulty)) => {
                self.start_new_game(difficulty)?;
            }
            (GameState::Playing, GameInput::Move(dir)) => self.try_move(dir)?,
            (GameState::Playing, GameInput::TogglePause) => self.state = GameState::Paused,
            (GameState::Paused, GameInput::TogglePause) => self.state = GameState::Playing,
            (GameState::Playing, GameInput::ToggleSolution) => {
                self.show_solution = !self.show_solution;
            }
            (GameState::Paused | GameState::GameOver, GameInput::OpenMenu) => {
                self.state = GameState::DifficultySelect;
            }
            (GameState::GameOver, GameInput::Restart) => self.start_new_game(self.difficulty)?,
            _ => {}
        }
        Ok(())
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.state != GameState::Playing {
            return;
        }
        self.tick_counter += 1;
        self.stats.maze_elapsed_ms = self.stats.maze_elapsed_ms.saturating_add(dt_ms);
        self.stats.total_elapsed_ms = self.stats.total_elapsed_ms.saturating_add(dt_ms);

        self.update_power_ups(dt_ms);
        self.update_effects(dt_ms);
        self.update_enemies(dt_ms);
        if self.enemy_touches_player() {
            self.end_game(GameOverReason::EnemyCollision);
        }
    }

    pub fn solution_path(&self) -> Option<Vec<Coord>> {
        shortest_path(&self.level.maze.grid, self.player, self.level.maze.end)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let solution = if self.show_solution || self.has_effect(PowerUpType::RevealPath) {
            self.solution_path()
        } else {
            None
        };
        let snapshot = Snapshot {
            tick: self.tick_counter,
            state: self.state,
            difficulty: self.difficulty,
            player: self.player,
            end: self.level.maze.end,
            score: self.stats.score,
            high_score: self.high_score,
            maze_moves: self.stats.maze_moves,
            maze_elapsed_ms: self.stats.maze_elapsed_ms,
            wall_break_charges: self.wall_break_charges,
            enemies: self.enemies.iter().map(|e| e.view.clone()).collect(),
            power_ups: self.power_ups.iter().map(|p| p.view.clone()).collect(),
            effects: self
                .effects
                .iter()
                .map(|effect| EffectView {
                    kind: effect.kind,
                    remaining_ms: effect.remaining_ms,
                })
                .collect(),
            solution,
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            difficulty: self.difficulty,
            reason: self.end_reason,
            score: self.stats.score,
            high_score: self.high_score,
            mazes_cleared: self.stats.mazes_cleared,
            total_moves: self.stats.total_moves,
            duration_ms: self.stats.total_elapsed_ms,
            power_ups_collected: self.stats.power_ups_collected,
        }
    }

    /// Nothing is committed until the new level has been generated, so a
    /// failed selection leaves the previous difficulty and level in place.
    fn start_new_game(&mut self, difficulty: Difficulty) -> Result<(), MazeError> {
        let profile = resolve_profile(difficulty, self.options.custom_profile)?;
        let level = generate_level(&profile, &mut self.rng)?;
        self.difficulty = difficulty;
        self.profile = profile;
        self.install_level(level);
        self.stats = SessionStats::default();
        self.end_reason = None;
        self.state = GameState::Playing;
        Ok(())
    }

    fn install_level(&mut self, level: GeneratedLevel) {
        let spawns = level.enemy_spawns.clone();
        let power_ups = level.power_ups.clone();
        self.player = level.maze.start;
        self.level = level;
        self.spawn_enemies(&spawns);
        self.spawn_power_ups(&power_ups);
        self.effects.clear();
        self.wall_break_charges = 0;
        self.stats.maze_moves = 0;
        self.stats.maze_elapsed_ms = 0;
        self.events.push(SessionEvent::MazeGenerated {
            difficulty: self.difficulty,
            width: self.level.maze.width(),
            height: self.level.maze.height(),
        });
    }

    fn try_move(&mut self, dir: Direction) -> Result<(), MazeError> {
        let target = self.player + dir.delta();
        if !is_valid_move(&self.level.maze.grid, target) {
            if self.wall_break_charges == 0 || !self.level.maze.grid.is_interior(target) {
                return Ok(());
            }
            self.wall_break_charges -= 1;
            self.level.maze.grid.set(target, Cell::Open);
            self.events.push(SessionEvent::WallBroken {
                x: target.x,
                y: target.y,
            });
        }

        self.player = target;
        self.stats.total_moves += 1;
        if !self.has_effect(PowerUpType::SpeedBoost) {
            self.stats.maze_moves += 1;
        }
        self.collect_power_up_at(target);

        if self.enemy_touches_player() {
            self.end_game(GameOverReason::EnemyCollision);
            return Ok(());
        }
        if self.player == self.level.maze.end {
            self.reach_goal()?;
        }
        Ok(())
    }

    fn reach_goal(&mut self) -> Result<(), MazeError> {
        let next_level = generate_level(&self.profile, &mut self.rng)?;
        let award = goal_award(self.stats.maze_elapsed_ms, self.stats.maze_moves);
        self.stats.score = apply_award(self.stats.score, award);
        self.stats.mazes_cleared += 1;
        self.events.push(SessionEvent::GoalReached {
            award,
            score: self.stats.score,
            maze_moves: self.stats.maze_moves,
            maze_elapsed_ms: self.stats.maze_elapsed_ms,
        });
        self.install_level(next_level);
        Ok(())
    }

    fn end_game(&mut self, reason: GameOverReason) {
        let new_high_score = self.stats.score > self.high_score;
        if new_high_score {
            self.high_score = self.stats.score;
        }
        self.state = GameState::GameOver;
        self.end_reason = Some(reason);
        self.events.push(SessionEvent::GameOver {
            reason,
            score: self.stats.score,
            new_high_score,
        });
    }

    fn make_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}_{}", self.next_id_counter);
        self.next_id_counter += 1;
        id
    }
}
