//! Jingle Defense - a falling-hazard arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, collisions, bosses, progression)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key-value storage gateway
//! - `profile`: Persisted high score, currency and character unlocks
//! - `session`: Glue between clock, simulation and persistence
//! - `platform`: Browser/native input and storage adapters

pub mod persistence;
pub mod platform;
pub mod profile;
pub mod session;
pub mod sim;
pub mod tuning;

pub use profile::{Profile, ProfileError};
pub use session::Session;
pub use tuning::Tuning;

use glam::Vec2;

/// Screen-relative scale factors and speed factors.
///
/// Every size and speed is a multiple of the viewport "unit",
/// `min(width, height)`, so the game plays the same on any screen.
pub mod consts {
    /// Hazard (tree) footprint
    pub const TREE_SCALE: f32 = 0.22;
    /// Player projectile footprint
    pub const ORNAMENT_SCALE: f32 = 0.1;
    pub const STOCKING_SCALE: f32 = 0.12;
    pub const SNOWFLAKE_SCALE: f32 = 0.14;
    pub const COCOA_SCALE: f32 = 0.12;
    pub const PRESENT_SCALE: f32 = 0.12;
    pub const COAL_SCALE: f32 = 0.18;
    pub const BOSS_COAL_SCALE: f32 = 0.14;
    pub const REINDEER_SCALE: f32 = 0.18;
    pub const BOSS_SCALE: f32 = 0.45;
    pub const STAR_SCALE: f32 = 0.1;
    pub const COMPANION_SCALE: f32 = 0.12;

    /// Collision radius factor for round hazards and the player
    pub const BODY_RADIUS: f32 = 0.35;
    /// Collision radius factor for pickups and projectiles
    pub const ITEM_RADIUS: f32 = 0.4;

    /// Player base move speed (units/s), before character and upgrade multipliers
    pub const PLAYER_SPEED: f32 = 0.6;
    /// Player spawn height as a fraction of the viewport height
    pub const PLAYER_START_Y: f32 = 0.78;
    /// Projectile speed (units/s)
    pub const ORNAMENT_SPEED: f32 = 0.9;
    /// Horizontal drift of diagonal shots, relative to their speed
    pub const DIAGONAL_DRIFT: f32 = 0.3;
    /// Fraction of the player footprint above center where shots appear
    pub const MUZZLE_OFFSET: f32 = 0.55;

    /// Hazard fall speed range (units/s): base + rand * spread
    pub const TREE_SPEED_BASE: f32 = 0.12;
    pub const TREE_SPEED_SPREAD: f32 = 0.08;
    /// Seconds of play for the fall-speed difficulty to grow by 1.0
    pub const DIFFICULTY_RAMP_SECS: f32 = 25.0;
    /// Pickup fall speed (units/s)
    pub const PICKUP_SPEED: f32 = 0.08;
    /// Regular coal fall speed (units/s)
    pub const COAL_SPEED: f32 = 0.18;
    /// Spawn padding relative to the spawned entity's size
    pub const SPAWN_PADDING: f32 = 0.7;
    /// Fraction of a hazard's size that must pass the bottom edge to count as landed
    pub const LANDING_MARGIN: f32 = 0.4;

    /// Reindeer horizontal speed (units/s)
    pub const REINDEER_SPEED: f32 = 0.25;
    /// Reindeer vertical position as a fraction of the viewport height
    pub const REINDEER_Y: f32 = 0.5;

    /// Level banner display time (seconds)
    pub const LEVEL_BANNER_SECS: f32 = 1.5;
    /// Explosion chain effect display time (seconds)
    pub const CHAIN_EFFECT_SECS: f32 = 0.3;
    /// Kills needed per level
    pub const KILLS_PER_LEVEL: u32 = 10;
}

/// Circle-circle overlap: `distance(a, b) < ra + rb`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Random horizontal spawn position padded so an entity of `size` is not clipped
#[inline]
pub fn padded_x(width: f32, size: f32, roll: f32) -> f32 {
    let padding = size * consts::SPAWN_PADDING;
    let span = width - padding * 2.0;
    if span <= 0.0 {
        width * 0.5
    } else {
        padding + roll * span
    }
}

/// Rotate a unit direction toward `target_dir * speed` with first-order smoothing,
/// keeping the speed magnitude.
#[inline]
pub fn steer_toward(vel: Vec2, target_dir: Vec2, speed: f32, blend: f32) -> Vec2 {
    let desired = target_dir * speed;
    let blended = vel.lerp(desired, blend.clamp(0.0, 1.0));
    let steered = blended.normalize_or_zero();
    if steered == Vec2::ZERO {
        desired
    } else {
        steered * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap_is_strict() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(circles_overlap(a, 5.0, b, 5.1));
        assert!(!circles_overlap(a, 5.0, b, 5.0));
    }

    #[test]
    fn test_padded_x_stays_inside() {
        let w = 400.0;
        let size = 50.0;
        assert!((padded_x(w, size, 0.0) - 35.0).abs() < 1e-4);
        assert!((padded_x(w, size, 1.0) - 365.0).abs() < 1e-4);
        // Too narrow: centered
        assert_eq!(padded_x(40.0, size, 0.3), 20.0);
    }

    #[test]
    fn test_steer_toward_preserves_speed() {
        let vel = Vec2::new(0.0, -100.0);
        let steered = steer_toward(vel, Vec2::X, 100.0, 0.1);
        assert!((steered.length() - 100.0).abs() < 1e-3);
        assert!(steered.x > 0.0);
    }
}
