use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_runner_rust::constants::TICK_MS;
use maze_runner_rust::engine::{GameInput, GameSession, GameSessionOptions};
use maze_runner_rust::high_score_store::HighScoreStore;
use maze_runner_rust::level::{generate_level, resolve_profile, GeneratedLevel};
use maze_runner_rust::maze::{extra_path_count, is_reachable, is_valid_move, MazeLayout};
use maze_runner_rust::rng::Rng;
use maze_runner_rust::types::{Coord, Difficulty, Direction, GameOverReason, GameState};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates mazes headlessly, checks their invariants and optionally plays them.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// easy, medium or hard; every difficulty when omitted
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    /// Mazes generated per difficulty
    #[arg(long, default_value_t = 3)]
    mazes: u32,
    /// Drive a session along the shortest route after generation checks
    #[arg(long)]
    autoplay: bool,
    #[arg(long, default_value_t = 3)]
    max_goals: u32,
    /// Print each generated maze to stderr
    #[arg(long)]
    render: bool,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    high_score_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    difficulty: Difficulty,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    difficulty: Difficulty,
    width: i32,
    height: i32,
    #[serde(rename = "openCells")]
    open_cells: usize,
    #[serde(rename = "extraPaths")]
    extra_paths: usize,
    #[serde(rename = "enemySpawns")]
    enemy_spawns: Vec<Coord>,
    #[serde(rename = "powerUps")]
    power_ups: usize,
    #[serde(rename = "treeReachedEnd")]
    tree_reached_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    autoplay: Option<AutoplayResult>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AutoplayResult {
    #[serde(rename = "mazesCleared")]
    mazes_cleared: u32,
    score: i32,
    #[serde(rename = "totalMoves")]
    total_moves: u32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<GameOverReason>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "generatedAtIso")]
    generated_at_iso: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "bestScore")]
    best_score: i32,
    #[serde(rename = "difficultyCounts")]
    difficulty_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = match resolve_scenarios(&cli) {
        Ok(scenarios) => scenarios,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = default_run_id(seed_hint, now_ms());
    let mut high_scores = cli.high_score_file.clone().map(HighScoreStore::new);
    let mut best_score = high_scores.as_ref().map(|store| store.best()).unwrap_or(0);
    let mut results = Vec::new();
    let mut difficulty_counts: BTreeMap<String, usize> = BTreeMap::new();

    for scenario in &scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            json!({ "difficulty": scenario.difficulty }),
        );

        let mut result = match run_scenario(scenario, &cli, best_score) {
            Ok(result) => result,
            Err(error) => {
                emit_log(
                    "error",
                    "generation_failed",
                    &run_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    json!({ "error": error }),
                );
                std::process::exit(2);
            }
        };

        if let Some(play) = result.autoplay.as_ref() {
            best_score = best_score.max(play.score);
            if let Some(store) = high_scores.as_mut() {
                match store.record(play.score) {
                    Ok(true) => emit_log(
                        "info",
                        "high_score_updated",
                        &run_id,
                        Some(&scenario.name),
                        Some(scenario.seed),
                        json!({ "score": play.score, "path": store.path().to_string_lossy() }),
                    ),
                    Ok(false) => {}
                    Err(error) => result
                        .anomalies
                        .push(format!("high score not saved: {error}")),
                }
            }
        }

        for anomaly in &result.anomalies {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                json!({ "message": anomaly }),
            );
        }
        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            json!({
                "openCells": result.open_cells,
                "treeReachedEnd": result.tree_reached_end,
                "anomalyCount": result.anomalies.len(),
            }),
        );

        *difficulty_counts
            .entry(difficulty_key(scenario.difficulty))
            .or_insert(0) += 1;
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(error) => eprintln!("[simulate] failed to serialize result: {error}"),
        }
        results.push(result);
    }

    let summary = build_run_summary(run_id.clone(), results, difficulty_counts, best_score);
    let has_anomaly = summary.anomaly_count > 0;

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "bestScore": summary.best_score,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(
    scenario: &Scenario,
    cli: &Cli,
    high_score: i32,
) -> Result<ScenarioResultLine, String> {
    let profile = resolve_profile(scenario.difficulty, None).map_err(|e| e.to_string())?;
    let mut rng = Rng::new(scenario.seed);
    let level = generate_level(&profile, &mut rng).map_err(|e| e.to_string())?;
    if cli.render {
        eprintln!("{}", render_level(&level));
    }

    let mut anomalies = collect_level_anomalies(&level, profile.size, profile.enemy_count);
    let autoplay = if cli.autoplay {
        let play = autoplay(scenario, cli.max_goals, high_score).map_err(|e| e.to_string())?;
        if play.mazes_cleared == 0 && play.reason.is_none() {
            anomalies.push("autoplay made no progress".to_string());
        }
        Some(play)
    } else {
        None
    };

    Ok(ScenarioResultLine {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        difficulty: scenario.difficulty,
        width: level.maze.width(),
        height: level.maze.height(),
        open_cells: level.maze.grid.open_count(),
        extra_paths: extra_path_count(&MazeLayout::square(
            profile.size,
            profile.extra_path_divisor,
        )),
        enemy_spawns: level.enemy_spawns.clone(),
        power_ups: level.power_ups.len(),
        tree_reached_end: level.maze.tree_reached_end,
        autoplay,
        anomalies,
    })
}

fn collect_level_anomalies(
    level: &GeneratedLevel,
    expected_size: i32,
    expected_enemies: usize,
) -> Vec<String> {
    let maze = &level.maze;
    let mut anomalies = Vec::new();
    if maze.width() != expected_size || maze.height() != expected_size {
        anomalies.push(format!(
            "unexpected size {}x{} (expected {expected_size})",
            maze.width(),
            maze.height()
        ));
    }
    if !maze.grid.is_open(maze.start) || !maze.grid.is_open(maze.end) {
        anomalies.push("start or end is walled".to_string());
    }
    if !is_reachable(&maze.grid, maze.start, maze.end) {
        anomalies.push("end unreachable from start".to_string());
    }
    if level.enemy_spawns.len() != expected_enemies {
        anomalies.push(format!(
            "enemy count {} (expected {expected_enemies})",
            level.enemy_spawns.len()
        ));
    }
    let unique: HashSet<Coord> = level.enemy_spawns.iter().copied().collect();
    if unique.len() != level.enemy_spawns.len() {
        anomalies.push("enemy spawns overlap".to_string());
    }
    for spawn in &level.enemy_spawns {
        if !is_valid_move(&maze.grid, *spawn) || *spawn == maze.start || *spawn == maze.end {
            anomalies.push(format!("invalid enemy spawn ({},{})", spawn.x, spawn.y));
        }
    }
    anomalies
}

/// Walks the shortest route one step per tick until the goal budget is met
/// or an enemy ends the run.
fn autoplay(
    scenario: &Scenario,
    max_goals: u32,
    high_score: i32,
) -> Result<AutoplayResult, maze_runner_rust::error::MazeError> {
    let options = GameSessionOptions {
        custom_profile: None,
        high_score,
    };
    let mut session = GameSession::start(scenario.difficulty, scenario.seed, options)?;
    let mut tick_safety = 0usize;

    while session.state() == GameState::Playing && session.mazes_cleared() < max_goals {
        tick_safety += 1;
        if tick_safety > 100_000 {
            break;
        }
        session.step(TICK_MS);
        if session.is_ended() {
            break;
        }
        let Some(route) = session.solution_path() else {
            break;
        };
        let Some(next) = route.get(1).copied() else {
            break;
        };
        let Some(dir) = Direction::between(session.player(), next) else {
            break;
        };
        session.handle_input(GameInput::Move(dir))?;
    }

    let summary = session.build_summary();
    Ok(AutoplayResult {
        mazes_cleared: summary.mazes_cleared,
        score: summary.score,
        total_moves: summary.total_moves,
        duration_ms: summary.duration_ms,
        reason: summary.reason,
    })
}

fn render_level(level: &GeneratedLevel) -> String {
    let spawns: HashSet<Coord> = level.enemy_spawns.iter().copied().collect();
    let power_ups: HashSet<Coord> = level.power_ups.iter().map(|(_, pos)| *pos).collect();
    level
        .maze
        .grid
        .to_rows()
        .into_iter()
        .enumerate()
        .map(|(y, row)| {
            row.chars()
                .enumerate()
                .map(|(x, tile)| {
                    let pos = Coord::new(x as i32, y as i32);
                    if pos == level.maze.start {
                        'S'
                    } else if pos == level.maze.end {
                        'G'
                    } else if spawns.contains(&pos) {
                        'E'
                    } else if power_ups.contains(&pos) {
                        '*'
                    } else {
                        tile
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn resolve_scenarios(cli: &Cli) -> Result<Vec<Scenario>, String> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let difficulties = match cli.difficulty.as_deref() {
        None => vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard],
        Some(raw) => match Difficulty::parse(raw) {
            Some(Difficulty::Custom) | None => {
                return Err(format!("unsupported difficulty '{raw}'"));
            }
            Some(difficulty) => vec![difficulty],
        },
    };

    let mut scenarios = Vec::new();
    for difficulty in difficulties {
        for idx in 0..cli.mazes.max(1) {
            let scenario_seed = seed.wrapping_add(idx);
            scenarios.push(Scenario {
                name: format!("{}-{}", difficulty_key(difficulty), idx + 1),
                difficulty,
                seed: scenario_seed,
            });
        }
    }
    Ok(scenarios)
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("maze-{seed}-{timestamp_ms}")
}

fn difficulty_key(difficulty: Difficulty) -> String {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
        Difficulty::Custom => "custom",
    }
    .to_string()
}

fn build_run_summary(
    run_id: String,
    scenarios: Vec<ScenarioResultLine>,
    difficulty_counts: BTreeMap<String, usize>,
    best_score: i32,
) -> RunSummary {
    RunSummary {
        run_id,
        generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_count: scenarios.len(),
        anomaly_count: scenarios.iter().map(|s| s.anomalies.len()).sum(),
        best_score,
        difficulty_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => eprintln!("[simulate] failed to serialize log line: {error}"),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cli(difficulty: Option<&str>, mazes: u32, seed: u64) -> Cli {
        Cli {
            difficulty: difficulty.map(|value| value.to_string()),
            seed: Some(seed),
            mazes,
            autoplay: false,
            max_goals: 3,
            render: false,
            summary_out: None,
            high_score_file: None,
        }
    }

    fn make_scenario_result(anomalies: Vec<String>) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            difficulty: Difficulty::Easy,
            width: 15,
            height: 15,
            open_cells: 80,
            extra_paths: 28,
            enemy_spawns: Vec::new(),
            power_ups: 3,
            tree_reached_end: true,
            autoplay: None,
            anomalies,
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "maze-42-123456789");
    }

    #[test]
    fn scenarios_cover_every_difficulty_by_default() {
        let scenarios = resolve_scenarios(&make_cli(None, 2, 10)).expect("scenarios");
        assert_eq!(scenarios.len(), 6);
        assert_eq!(scenarios[0].name, "easy-1");
        assert_eq!(scenarios[1].seed, 11);
        assert_eq!(scenarios[5].difficulty, Difficulty::Hard);
    }

    #[test]
    fn scenarios_reject_custom_and_unknown_names() {
        assert!(resolve_scenarios(&make_cli(Some("custom"), 1, 1)).is_err());
        assert!(resolve_scenarios(&make_cli(Some("nightmare"), 1, 1)).is_err());
        let scenarios = resolve_scenarios(&make_cli(Some("hard"), 0, 1)).expect("hard");
        assert_eq!(scenarios.len(), 1);
    }

    #[test]
    fn generated_scenarios_have_no_anomalies() {
        let cli = make_cli(None, 5, 77);
        for scenario in resolve_scenarios(&cli).expect("scenarios") {
            let result = run_scenario(&scenario, &cli, 0).expect("scenario runs");
            assert!(result.anomalies.is_empty(), "{:?}", result.anomalies);
        }
    }

    #[test]
    fn autoplay_clears_mazes_or_reports_collision() {
        let scenario = Scenario {
            name: "easy-1".to_string(),
            difficulty: Difficulty::Easy,
            seed: 5,
        };
        let play = autoplay(&scenario, 2, 0).expect("autoplay");
        assert!(play.mazes_cleared == 2 || play.reason == Some(GameOverReason::EnemyCollision));
        assert!(play.total_moves > 0);
    }

    #[test]
    fn render_marks_start_goal_and_entities() {
        let profile = resolve_profile(Difficulty::Easy, None).expect("easy");
        let level = generate_level(&profile, &mut Rng::new(3)).expect("level");
        let text = render_level(&level);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[1].chars().nth(1), Some('S'));
        assert_eq!(rows[13].chars().nth(13), Some('G'));
        assert_eq!(text.matches('E').count(), 2);
    }

    #[test]
    fn summary_counts_anomalies() {
        let summary = build_run_summary(
            "maze-1-1".to_string(),
            vec![
                make_scenario_result(Vec::new()),
                make_scenario_result(vec!["a".to_string(), "b".to_string()]),
            ],
            BTreeMap::from([("easy".to_string(), 2usize)]),
            970,
        );
        assert_eq!(summary.scenario_count, 2);
        assert_eq!(summary.anomaly_count, 2);
        assert!(summary.generated_at_iso.ends_with('Z'));
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-runner-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary("maze-1-1".to_string(), Vec::new(), BTreeMap::new(), 0);
        assert!(write_summary(&target, &summary).is_err());
    }
}
