//! Helpers that fight alongside the player
//!
//! - Reindeer: a timed fly-by at level milestones, firing straight up
//! - Stars: wandering collectibles that turn into companions on contact
//! - Companions: orbit the player and snipe hazards with predictive aim

use glam::Vec2;

use super::boss::boss_velocity;
use super::projectile::{BaseMotion, Projectile, Shooter};
use super::state::{GameEvent, GameState};
use super::timer::Countdown;
use crate::consts::*;

/// Level-milestone helper crossing the screen
#[derive(Debug, Clone)]
pub struct Reindeer {
    pub pos: Vec2,
    pub size: f32,
    pub life: Countdown,
    pub fire_timer: Countdown,
}

/// Orbiting ally
#[derive(Debug, Clone)]
pub struct Companion {
    pub pos: Vec2,
    pub size: f32,
    /// Current orbit angle (radians)
    pub angle: f32,
    pub fire_timer: Countdown,
}

/// Wandering collectible
#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub waypoint: Vec2,
    pub retarget: Countdown,
}

impl Star {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * ITEM_RADIUS
    }
}

pub fn spawn_reindeer(state: &mut GameState) {
    if state.reindeer.is_some() {
        return;
    }
    let size = state.viewport.unit() * REINDEER_SCALE;
    state.reindeer = Some(Reindeer {
        pos: Vec2::new(-size, state.viewport.height * REINDEER_Y),
        size,
        life: Countdown::secs(state.tuning.reindeer_secs),
        fire_timer: Countdown::ZERO,
    });
    log::info!("Reindeer to the rescue");
    state.events.push(GameEvent::ReindeerArrived);
}

pub fn update_reindeer(state: &mut GameState, dt: f32) {
    let Some(mut reindeer) = state.reindeer.take() else {
        return;
    };
    let unit = state.viewport.unit();
    reindeer.pos.x += unit * REINDEER_SPEED * dt;

    if reindeer.fire_timer.tick_done(dt) {
        let id = state.next_entity_id();
        let muzzle = reindeer.pos + Vec2::new(0.0, reindeer.size * 0.3);
        state.projectiles.push(Projectile::new(
            id,
            muzzle,
            unit,
            BaseMotion::Straight,
            Shooter::Companion,
        ));
        reindeer.fire_timer.set(state.tuning.reindeer_fire_interval);
    }

    let expired = reindeer.life.tick_done(dt);
    let gone = reindeer.pos.x > state.viewport.width + reindeer.size;
    if !expired && !gone {
        state.reindeer = Some(reindeer);
    }
}

fn random_waypoint(state: &mut GameState) -> Vec2 {
    let (w, h) = (state.viewport.width, state.viewport.height);
    let margin = state.viewport.unit() * STAR_SCALE;
    let x = margin + state.roll() * (w - margin * 2.0).max(0.0);
    let y = margin + state.roll() * (h * 0.7 - margin).max(0.0);
    Vec2::new(x, y)
}

/// Spawn a star if the companion cap leaves room for another ally
pub fn spawn_star(state: &mut GameState, pos: Vec2) -> bool {
    if !state.companions_unlocked
        || state.companions.len() + state.stars.len() >= state.tuning.max_companions
    {
        return false;
    }
    let waypoint = random_waypoint(state);
    state.stars.push(Star {
        pos,
        size: state.viewport.unit() * STAR_SCALE,
        waypoint,
        retarget: Countdown::secs(state.tuning.star_retarget_secs),
    });
    true
}

/// Stars drift toward a waypoint and pick a new one on a fixed interval
pub fn update_stars(state: &mut GameState, dt: f32) {
    let speed = state.viewport.unit() * state.tuning.star_speed;
    let retarget_secs = state.tuning.star_retarget_secs;
    let mut stars = std::mem::take(&mut state.stars);
    for star in &mut stars {
        if star.retarget.tick_done(dt) {
            star.waypoint = random_waypoint(state);
            star.retarget.set(retarget_secs);
        }
        let to = star.waypoint - star.pos;
        let step = speed * dt;
        if to.length() <= step {
            star.pos = star.waypoint;
        } else {
            star.pos += to.normalize_or_zero() * step;
        }
    }
    state.stars = stars;
}

/// Turn a collected star into a companion (respecting the cap)
pub fn collect_star(state: &mut GameState, star: Star) {
    let bonus = state.tuning.star_bonus;
    state.progression.currency += bonus;
    state.events.push(GameEvent::StarCollected { bonus });
    if state.companions.len() < state.tuning.max_companions {
        let angle = state.companions.first().map_or(0.0, |c| c.angle + std::f32::consts::PI);
        state.companions.push(Companion {
            pos: star.pos,
            size: state.viewport.unit() * COMPANION_SCALE,
            angle,
            fire_timer: Countdown::secs(state.tuning.companion_fire_interval),
        });
        log::info!("Companion joined ({} total)", state.companions.len());
        state.events.push(GameEvent::CompanionJoined);
    }
}

/// Where to shoot so a projectile at `shot_speed` meets a target moving at `target_vel`.
///
/// Lead time is the current distance over the projectile speed.
pub fn predictive_aim(from: Vec2, target: Vec2, target_vel: Vec2, shot_speed: f32) -> Vec2 {
    if shot_speed <= 0.0 {
        return target;
    }
    let lead = from.distance(target) / shot_speed;
    target + target_vel * lead
}

/// Nearest hazard within `range`, with its current velocity
fn nearest_target(state: &GameState, from: Vec2, range: f32) -> Option<(Vec2, Vec2)> {
    let regular = state
        .hazards
        .iter()
        .map(|h| (h.pos, state.hazard_velocity(h)));
    let boss = state
        .boss
        .as_ref()
        .map(|b| (b.pos, boss_velocity(state, b)));
    regular
        .chain(boss)
        .filter(|(pos, _)| pos.distance(from) <= range)
        .min_by(|a, b| {
            a.0.distance_squared(from)
                .partial_cmp(&b.0.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Orbit the player and fire at hazards in range
pub fn update_companions(state: &mut GameState, dt: f32) {
    let unit = state.viewport.unit();
    let radius = unit * state.tuning.orbit_radius;
    let range = unit * state.tuning.companion_range;
    let shot_speed = unit * ORNAMENT_SPEED;
    let smoothing = 1.0 - (-state.tuning.orbit_smoothing * dt).exp();
    let orbit_speed = state.tuning.orbit_speed;
    let fire_interval = state.tuning.companion_fire_interval;
    let center = state.player.pos;

    let mut companions = std::mem::take(&mut state.companions);
    for companion in &mut companions {
        companion.angle = (companion.angle + orbit_speed * dt) % std::f32::consts::TAU;
        let slot = center + Vec2::new(companion.angle.cos(), companion.angle.sin()) * radius;
        companion.pos += (slot - companion.pos) * smoothing;

        if companion.fire_timer.tick_done(dt) {
            if let Some((target, vel)) = nearest_target(state, companion.pos, range) {
                let aim = predictive_aim(companion.pos, target, vel, shot_speed);
                let dir = (aim - companion.pos).normalize_or_zero();
                if dir != Vec2::ZERO {
                    let id = state.next_entity_id();
                    state.projectiles.push(Projectile::new(
                        id,
                        companion.pos,
                        unit,
                        BaseMotion::Vector {
                            vel: dir * shot_speed,
                        },
                        Shooter::Companion,
                    ));
                    companion.fire_timer.set(fire_interval);
                }
            }
        }
    }
    state.companions = companions;
}
