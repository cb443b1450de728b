use super::*;

#[derive(Clone, Debug)]
pub(super) struct PowerUpInternal {
    pub(super) view: PowerUpView,
}

impl PowerUpInternal {
    pub(super) fn new(id: String, kind: PowerUpType, pos: Coord) -> Self {
        Self {
            view: PowerUpView {
                id,
                kind,
                x: pos.x,
                y: pos.y,
                active: true,
                remaining_ms: POWER_UP_DURATION_MS,
            },
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ActiveEffect {
    pub(super) kind: PowerUpType,
    pub(super) remaining_ms: u64,
}

impl GameSession {
    pub(super) fn spawn_power_ups(&mut self, placed: &[(PowerUpType, Coord)]) {
        self.power_ups.clear();
        for (kind, pos) in placed {
            let id = self.make_id("power_up");
            self.power_ups.push(PowerUpInternal::new(id, *kind, *pos));
        }
    }

    pub(super) fn update_power_ups(&mut self, dt_ms: u64) {
        for power_up in &mut self.power_ups {
            if !power_up.view.active {
                continue;
            }
            power_up.view.remaining_ms = power_up.view.remaining_ms.saturating_sub(dt_ms);
            if power_up.view.remaining_ms == 0 {
                power_up.view.active = false;
                self.events.push(SessionEvent::PowerUpExpired {
                    power_up_id: power_up.view.id.clone(),
                });
            }
        }
    }

    pub(super) fn update_effects(&mut self, dt_ms: u64) {
        for effect in &mut self.effects {
            effect.remaining_ms = effect.remaining_ms.saturating_sub(dt_ms);
        }
        self.effects.retain(|effect| effect.remaining_ms > 0);
    }

    pub(super) fn has_effect(&self, kind: PowerUpType) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    pub(super) fn collect_power_up_at(&mut self, pos: Coord) {
        let Some(power_up) = self
            .power_ups
            .iter_mut()
            .find(|p| p.view.active && p.view.x == pos.x && p.view.y == pos.y)
        else {
            return;
        };
        power_up.view.active = false;
        power_up.view.remaining_ms = 0;
        let kind = power_up.view.kind;
        let power_up_id = power_up.view.id.clone();

        self.stats.power_ups_collected += 1;
        self.events.push(SessionEvent::PowerUpCollected {
            power_up_id,
            power_up_type: kind,
        });
        self.apply_power_up(kind);
    }

    fn apply_power_up(&mut self, kind: PowerUpType) {
        match kind {
            PowerUpType::WallBreak => self.wall_break_charges += 1,
            PowerUpType::Teleport => self.teleport_toward_goal(),
            PowerUpType::SpeedBoost | PowerUpType::RevealPath | PowerUpType::TimeSlow => {
                self.grant_effect(kind)
            }
        }
    }

    fn grant_effect(&mut self, kind: PowerUpType) {
        if let Some(effect) = self.effects.iter_mut().find(|effect| effect.kind == kind) {
            effect.remaining_ms = POWER_UP_DURATION_MS;
            return;
        }
        self.effects.push(ActiveEffect {
            kind,
            remaining_ms: POWER_UP_DURATION_MS,
        });
    }

    /// Jumps halfway along the shortest route, never onto the goal itself.
    fn teleport_toward_goal(&mut self) {
        let Some(path) = self.solution_path() else {
            return;
        };
        if path.len() <= 2 {
            return;
        }
        let target = path[(path.len() - 1) / 2];
        if target == self.player {
            return;
        }
        self.events.push(SessionEvent::Teleported {
            from: self.player,
            to: target,
        });
        self.player = target;
        self.collect_power_up_at(target);
    }
}
