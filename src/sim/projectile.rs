//! Player and companion projectiles
//!
//! Each projectile moves by exactly one motion mode. Homing shots carry the
//! mode they fall back to when no hazard is left to chase.

use glam::Vec2;

use super::state::{GameState, Viewport};
use crate::consts::*;
use crate::steer_toward;

/// Non-homing displacement rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaseMotion {
    /// Straight up at `speed`
    Straight,
    /// Up at `speed`, sideways at `drift * speed`
    Diagonal { drift: f32 },
    /// Fixed velocity vector
    Vector { vel: Vec2 },
}

impl BaseMotion {
    pub fn velocity(&self, speed: f32) -> Vec2 {
        match *self {
            BaseMotion::Straight => Vec2::new(0.0, -speed),
            BaseMotion::Diagonal { drift } => Vec2::new(drift * speed, -speed),
            BaseMotion::Vector { vel } => vel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Base(BaseMotion),
    /// Steers toward the nearest hazard; `vel` keeps magnitude `speed`
    Homing { vel: Vec2, fallback: BaseMotion },
}

/// What happens on impact beyond plain damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Plain,
    /// Splashes every other hazard within the explosion radius
    Explosive,
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shooter {
    Player,
    /// Reindeer or orbiting companion; never affects the combo
    Companion,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub motion: Motion,
    pub payload: Payload,
    pub damage: u32,
    pub shooter: Shooter,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, unit: f32, motion: BaseMotion, shooter: Shooter) -> Self {
        Self {
            id,
            pos,
            size: unit * ORNAMENT_SCALE,
            speed: unit * ORNAMENT_SPEED,
            motion: Motion::Base(motion),
            payload: Payload::Plain,
            damage: 1,
            shooter,
        }
    }

    /// Turn this projectile into a homing one, starting along its current heading
    pub fn homing(mut self) -> Self {
        if let Motion::Base(base) = self.motion {
            let vel = base.velocity(self.speed).normalize_or_zero() * self.speed;
            self.motion = Motion::Homing {
                vel,
                fallback: base,
            };
        }
        self
    }

    pub fn explosive(mut self, damage: u32) -> Self {
        self.payload = Payload::Explosive;
        self.damage = damage;
        self
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * ITEM_RADIUS
    }

    #[inline]
    pub fn is_companion_fired(&self) -> bool {
        self.shooter == Shooter::Companion
    }

    /// Advance one frame. `target` is the nearest hazard for homing shots.
    pub fn advance(&mut self, target: Option<Vec2>, blend_rate: f32, dt: f32) {
        match &mut self.motion {
            Motion::Base(base) => {
                self.pos += base.velocity(self.speed) * dt;
            }
            Motion::Homing { vel, fallback } => match target {
                Some(target) => {
                    let dir = (target - self.pos).normalize_or_zero();
                    if dir != Vec2::ZERO {
                        *vel = steer_toward(*vel, dir, self.speed, blend_rate * dt);
                    }
                    self.pos += *vel * dt;
                }
                None => {
                    let base_vel = fallback.velocity(self.speed);
                    *vel = base_vel.normalize_or_zero() * self.speed;
                    self.pos += base_vel * dt;
                }
            },
        }
    }

    /// Unit heading of the current motion
    pub fn heading(&self) -> Vec2 {
        match self.motion {
            Motion::Base(base) => base.velocity(self.speed).normalize_or_zero(),
            Motion::Homing { vel, .. } => vel.normalize_or_zero(),
        }
    }

    pub(crate) fn rescale(&mut self, unit: f32, ratio: f32) {
        self.size = unit * ORNAMENT_SCALE;
        self.speed *= ratio;
        match &mut self.motion {
            Motion::Base(BaseMotion::Vector { vel }) => *vel *= ratio,
            Motion::Homing { vel, fallback } => {
                *vel *= ratio;
                if let BaseMotion::Vector { vel } = fallback {
                    *vel *= ratio;
                }
            }
            _ => {}
        }
    }
}

/// Nearest live hazard (regular or boss) to a point
pub fn nearest_hazard(state: &GameState, from: Vec2) -> Option<Vec2> {
    state
        .hazards
        .iter()
        .map(|h| h.pos)
        .chain(state.boss.as_ref().map(|b| b.pos))
        .min_by(|a, b| {
            a.distance_squared(from)
                .partial_cmp(&b.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Move every projectile and drop the ones that left the play field.
///
/// A player shot leaving unused breaks the combo; companion misses do not.
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let blend_rate = state.tuning.homing_blend;
    let mut projectiles = std::mem::take(&mut state.projectiles);
    for projectile in &mut projectiles {
        let target = match projectile.motion {
            Motion::Homing { .. } => nearest_hazard(state, projectile.pos),
            Motion::Base(_) => None,
        };
        projectile.advance(target, blend_rate, dt);
    }

    let viewport: Viewport = state.viewport;
    let mut missed = false;
    projectiles.retain(|p| {
        if viewport.is_outside(p.pos, p.size) {
            missed |= p.shooter == Shooter::Player;
            false
        } else {
            true
        }
    });
    if missed {
        state.progression.break_combo();
    }
    state.projectiles = projectiles;
}
