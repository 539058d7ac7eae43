//! Boss wave state machine
//!
//! `None` -> `Entering` -> `Engaging` -> defeated (rewards paid, back to `None`).
//! A boss that reaches the bottom ends the run like any landed hazard.

use glam::Vec2;

use super::spawn::spawn_hazard_at;
use super::state::{GameEvent, GameState, HazardShot, ShotKind, Viewport};
use super::timer::Countdown;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    /// Descending to its engage depth
    Entering,
    /// Attacking while creeping downward
    Engaging,
}

#[derive(Debug, Clone)]
pub struct Boss {
    pub pos: Vec2,
    pub size: f32,
    pub health: i32,
    pub max_health: i32,
    pub phase: BossPhase,
    pub shot_timer: Countdown,
    pub burst_timer: Countdown,
}

impl Boss {
    /// A boss just above the top edge, centered
    pub fn new(viewport: &Viewport, health: u32) -> Self {
        let size = viewport.unit() * BOSS_SCALE;
        let health = health.max(1) as i32;
        Self {
            pos: Vec2::new(viewport.width * 0.5, -size),
            size,
            health,
            max_health: health,
            phase: BossPhase::Entering,
            shot_timer: Countdown::ZERO,
            burst_timer: Countdown::ZERO,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * BODY_RADIUS
    }

    /// Apply a hit. Returns true if this defeated the boss.
    pub fn hit(&mut self, damage: u32) -> bool {
        self.health -= damage as i32;
        self.health <= 0
    }
}

/// Current downward velocity of the boss
pub fn boss_velocity(state: &GameState, boss: &Boss) -> Vec2 {
    let unit = state.viewport.unit();
    let speed = match boss.phase {
        BossPhase::Entering => state.tuning.boss_enter_speed,
        BossPhase::Engaging => state.tuning.boss_descent_speed,
    };
    Vec2::new(0.0, unit * speed * state.slow_factor())
}

/// Spawn a boss for `level` unless one is already active
pub fn spawn_boss(state: &mut GameState, level: u32) -> bool {
    if state.boss.is_some() {
        return false;
    }
    let mut boss = Boss::new(&state.viewport, level);
    boss.shot_timer.set(state.tuning.boss_shot_interval);
    boss.burst_timer.set(state.tuning.boss_burst_interval);
    log::info!("Boss incoming with {} health", boss.health);
    state.events.push(GameEvent::BossSpawned {
        health: boss.health as u32,
    });
    state.boss = Some(boss);
    true
}

/// Advance the boss. Returns true if it reached the bottom.
pub fn update_boss(state: &mut GameState, dt: f32) -> bool {
    let Some(mut boss) = state.boss.take() else {
        return false;
    };

    boss.pos += boss_velocity(state, &boss) * dt;

    match boss.phase {
        BossPhase::Entering => {
            let depth = state.viewport.height * state.tuning.boss_engage_depth;
            if boss.pos.y >= depth {
                boss.pos.y = depth;
                boss.phase = BossPhase::Engaging;
                log::debug!("Boss engaging");
            }
        }
        BossPhase::Engaging => {
            if boss.shot_timer.tick_done(dt) {
                fire_at_player(state, &boss);
                boss.shot_timer.set(state.tuning.boss_shot_interval);
            }
            if boss.burst_timer.tick_done(dt) {
                spawn_burst(state, &boss);
                boss.burst_timer.set(state.tuning.boss_burst_interval);
            }
        }
    }

    let landed = boss.pos.y - boss.size * LANDING_MARGIN > state.viewport.height;
    state.boss = Some(boss);
    landed
}

fn fire_at_player(state: &mut GameState, boss: &Boss) {
    let unit = state.viewport.unit();
    let origin = boss.pos + Vec2::new(0.0, boss.size * 0.4);
    let dir = (state.player.pos - origin).try_normalize().unwrap_or(Vec2::Y);
    state.hazard_shots.push(HazardShot {
        kind: ShotKind::BossCoal,
        pos: origin,
        size: unit * BOSS_COAL_SCALE,
        vel: dir * unit * state.tuning.boss_shot_speed,
    });
}

/// A row of regular hazards evenly spaced across the width at the boss's height
fn spawn_burst(state: &mut GameState, boss: &Boss) {
    let count = state.tuning.boss_burst_size;
    let width = state.viewport.width;
    for i in 0..count {
        let x = width * (i + 1) as f32 / (count + 1) as f32;
        spawn_hazard_at(state, Vec2::new(x, boss.pos.y));
    }
}

/// Pay out a defeated boss and clear it
pub fn defeat_boss(state: &mut GameState) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    let reward = state.tuning.boss_reward;
    state.progression.award(reward);
    state.progression.combo += state.tuning.boss_combo_bonus;

    // Reward bundle in a ring around the boss
    let bundle = state.tuning.boss_bundle.clone();
    let ring = boss.size * 0.5;
    let n = bundle.len().max(1) as f32;
    for (i, kind) in bundle.into_iter().enumerate() {
        let angle = std::f32::consts::TAU * i as f32 / n;
        let offset = Vec2::new(angle.cos(), angle.sin()) * ring;
        state.drop_pickup(kind, boss.pos + offset);
    }

    log::info!("Boss defeated (+{} points)", reward);
    state.events.push(GameEvent::BossDefeated);

    if !state.companions_unlocked {
        state.companions_unlocked = true;
        log::info!("Companions unlocked");
        state.events.push(GameEvent::CompanionsUnlocked);
    }
    super::companion::spawn_star(state, boss.pos);
}
