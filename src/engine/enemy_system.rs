use super::*;

#[derive(Clone, Debug)]
pub(super) struct EnemyInternal {
    pub(super) view: EnemyView,
    patrol: Vec<Coord>,
    progress: f32,
    speed: f32,
}

impl EnemyInternal {
    pub(super) fn new(id: String, spawn: Coord, speed: f32, width: i32, height: i32) -> Self {
        Self {
            view: EnemyView {
                id,
                x: spawn.x as f32,
                y: spawn.y as f32,
                spawn,
            },
            patrol: build_patrol_path(spawn, width, height),
            progress: 0.0,
            speed,
        }
    }

    /// Moves along the closed patrol loop, interpolating between waypoints.
    pub(super) fn advance(&mut self, dt_secs: f32) {
        let len = self.patrol.len();
        if len < 2 {
            return;
        }
        self.progress = (self.progress + self.speed * dt_secs).rem_euclid(len as f32);

        let idx = (self.progress.floor() as usize).min(len - 1);
        let next = (idx + 1) % len;
        let fraction = self.progress - idx as f32;
        let a = self.patrol[idx];
        let b = self.patrol[next];
        self.view.x = a.x as f32 + (b.x - a.x) as f32 * fraction;
        self.view.y = a.y as f32 + (b.y - a.y) as f32 * fraction;
    }

    pub(super) fn touches(&self, pos: Coord) -> bool {
        (self.view.x - pos.x as f32).abs() < 1.0 && (self.view.y - pos.y as f32).abs() < 1.0
    }
}

/// Square loop anchored at the spawn, kept inside the interior.
pub(super) fn build_patrol_path(spawn: Coord, width: i32, height: i32) -> Vec<Coord> {
    let span = ENEMY_PATROL_SPAN;
    [
        spawn,
        spawn + Coord::new(span, 0),
        spawn + Coord::new(span, span),
        spawn + Coord::new(0, span),
    ]
    .into_iter()
    .map(|corner| {
        Coord::new(
            corner.x.clamp(1, (width - 2).max(1)),
            corner.y.clamp(1, (height - 2).max(1)),
        )
    })
    .collect()
}

impl GameSession {
    pub(super) fn spawn_enemies(&mut self, spawns: &[Coord]) {
        let speed = ENEMY_BASE_SPEED * self.profile.enemy_speed;
        let width = self.level.maze.width();
        let height = self.level.maze.height();
        self.enemies.clear();
        for spawn in spawns {
            let id = self.make_id("enemy");
            self.enemies
                .push(EnemyInternal::new(id, *spawn, speed, width, height));
        }
    }

    pub(super) fn update_enemies(&mut self, dt_ms: u64) {
        let mut dt_secs = ms_to_secs(dt_ms);
        if self.has_effect(PowerUpType::TimeSlow) {
            dt_secs *= TIME_SLOW_FACTOR;
        }
        for enemy in &mut self.enemies {
            enemy.advance(dt_secs);
        }
    }

    pub(super) fn enemy_touches_player(&self) -> bool {
        self.enemies.iter().any(|enemy| enemy.touches(self.player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-4
    }

    #[test]
    fn patrol_path_is_square_loop() {
        let path = build_patrol_path(Coord::new(3, 5), 21, 21);
        assert_eq!(
            path,
            vec![
                Coord::new(3, 5),
                Coord::new(6, 5),
                Coord::new(6, 8),
                Coord::new(3, 8),
            ]
        );
    }

    #[test]
    fn patrol_path_is_clamped_to_interior() {
        for path in [
            build_patrol_path(Coord::new(13, 12), 15, 15),
            build_patrol_path(Coord::new(1, 13), 15, 15),
        ] {
            for corner in path {
                assert!((1..=13).contains(&corner.x));
                assert!((1..=13).contains(&corner.y));
            }
        }
    }

    #[test]
    fn advance_interpolates_between_waypoints() {
        let mut enemy = EnemyInternal::new("enemy_1".to_string(), Coord::new(3, 5), 1.0, 21, 21);
        enemy.advance(0.5);
        assert!(approx_eq(enemy.view.x, 4.5));
        assert!(approx_eq(enemy.view.y, 5.0));
        enemy.advance(0.5);
        assert!(approx_eq(enemy.view.x, 6.0));
        enemy.advance(0.5);
        assert!(approx_eq(enemy.view.x, 6.0));
        assert!(approx_eq(enemy.view.y, 6.5));
    }

    #[test]
    fn advance_wraps_after_full_loop() {
        let mut enemy = EnemyInternal::new("enemy_1".to_string(), Coord::new(3, 5), 2.0, 21, 21);
        enemy.advance(2.0);
        assert!(approx_eq(enemy.view.x, 3.0));
        assert!(approx_eq(enemy.view.y, 5.0));
    }

    #[test]
    fn faster_enemy_covers_more_ground() {
        let mut slow = EnemyInternal::new("a".to_string(), Coord::new(3, 5), 1.0, 21, 21);
        let mut fast = EnemyInternal::new("b".to_string(), Coord::new(3, 5), 2.0, 21, 21);
        slow.advance(0.25);
        fast.advance(0.25);
        assert!(fast.view.x > slow.view.x);
    }

    #[test]
    fn session_scales_enemy_speed_by_difficulty() {
        let spawn = Coord::new(3, 3);
        let mut travelled = Vec::new();
        for difficulty in [Difficulty::Easy, Difficulty::Hard] {
            let mut session = GameSession::start(difficulty, 21, GameSessionOptions::default())
                .expect("session");
            session.power_ups.clear();
            session.spawn_enemies(&[spawn]);
            session.step(500);
            assert_eq!(session.state(), GameState::Playing);
            travelled.push(session.enemies[0].view.x - spawn.x as f32);
        }
        assert!(approx_eq(travelled[0], 1.5));
        assert!(approx_eq(travelled[1], 3.0));
    }

    #[test]
    fn touches_uses_unit_tolerance() {
        let mut enemy = EnemyInternal::new("enemy_1".to_string(), Coord::new(3, 5), 1.0, 21, 21);
        assert!(enemy.touches(Coord::new(3, 5)));
        enemy.advance(0.5);
        assert!(enemy.touches(Coord::new(4, 5)));
        assert!(enemy.touches(Coord::new(5, 5)));
        assert!(!enemy.touches(Coord::new(4, 6)));
        assert!(!enemy.touches(Coord::new(6, 5)));
    }
}
