//! Data-driven game balance
//!
//! Every knob has a default; a JSON document only needs to name the fields
//! it overrides.

use serde::{Deserialize, Serialize};

use crate::sim::ammo::AmmoKind;
use crate::sim::state::PickupKind;

/// How the regular hazard spawn interval shrinks over a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnDecay {
    /// `ceiling - elapsed * rate`
    Elapsed { rate: f32 },
    /// `ceiling - min(level * per_level, max_reduction)`
    Level { per_level: f32, max_reduction: f32 },
}

/// Regular hazard spawn interval curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnCurve {
    /// Shortest interval (seconds)
    pub floor: f32,
    /// Starting interval (seconds)
    pub ceiling: f32,
    pub decay: SpawnDecay,
}

impl Default for SpawnCurve {
    fn default() -> Self {
        Self {
            floor: 0.6,
            ceiling: 1.5,
            decay: SpawnDecay::Level {
                per_level: 0.05,
                max_reduction: 0.8,
            },
        }
    }
}

impl SpawnCurve {
    /// The time-based curve: `max(0.45, 1.5 - elapsed * 0.03)`
    pub fn elapsed_based() -> Self {
        Self {
            floor: 0.45,
            ceiling: 1.5,
            decay: SpawnDecay::Elapsed { rate: 0.03 },
        }
    }

    /// Seconds until the next regular hazard
    pub fn interval(&self, elapsed: f32, level: u32) -> f32 {
        let reduction = match self.decay {
            SpawnDecay::Elapsed { rate } => elapsed * rate,
            SpawnDecay::Level {
                per_level,
                max_reduction,
            } => (level as f32 * per_level).min(max_reduction),
        };
        (self.ceiling - reduction).max(self.floor)
    }
}

/// One band of a cumulative probability roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Exclusive upper bound of the cumulative roll
    pub below: f32,
    pub kind: PickupKind,
}

/// Inclusive integer range of ammo granted by a present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoGrant {
    pub min: u32,
    pub max: u32,
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Frame ===
    /// Largest dt (seconds) a single frame may advance
    pub max_frame_dt: f32,

    // === Spawning ===
    pub spawn_curve: SpawnCurve,
    /// Pickup bands rolled once per hazard spawn (disjoint, ascending)
    pub pickup_bands: Vec<Band>,
    /// Coal Bernoulli trial interval (seconds)
    pub coal_interval: f32,
    /// Coal probability per trial
    pub coal_chance: f32,
    /// Bands rolled once per projectile kill (chain kills excluded)
    pub drop_table: Vec<Band>,

    // === Pickup effects ===
    pub homing_grant: AmmoGrant,
    pub explosive_grant: AmmoGrant,
    pub fire_rate_step: f32,
    pub fire_rate_cap: f32,
    pub speed_step: f32,
    pub speed_cap: f32,
    /// Seconds added per snowflake
    pub slow_secs: f32,
    /// Hazard speed multiplier while slowed
    pub slow_factor: f32,

    // === Firing ===
    /// Seconds between shots at fire rate 1.0
    pub fire_interval: f32,
    /// Seconds between aimed shots at fire rate 1.0
    pub aimed_fire_interval: f32,
    /// Damage of explosive shots
    pub explosive_damage: u32,
    /// Explosion radius (units)
    pub explosion_radius: f32,
    /// Homing steering blend per second
    pub homing_blend: f32,

    // === Penalties ===
    pub body_penalty: u64,
    pub coal_penalty: u64,

    // === Progression ===
    /// Boss spawns at levels that are multiples of this
    pub boss_interval: u32,
    /// Reindeer arrives at levels that are multiples of this
    pub reindeer_interval: u32,

    // === Boss ===
    pub boss_reward: u64,
    pub boss_combo_bonus: u32,
    pub boss_bundle: Vec<PickupKind>,
    /// Depth (fraction of viewport height) where the boss stops entering
    pub boss_engage_depth: f32,
    pub boss_enter_speed: f32,
    pub boss_descent_speed: f32,
    pub boss_shot_interval: f32,
    pub boss_shot_speed: f32,
    pub boss_burst_interval: f32,
    pub boss_burst_size: u32,

    // === Helpers ===
    pub reindeer_secs: f32,
    pub reindeer_fire_interval: f32,
    pub max_companions: usize,
    pub orbit_radius: f32,
    pub orbit_speed: f32,
    /// Exponential smoothing rate toward the orbit slot (1/s)
    pub orbit_smoothing: f32,
    pub companion_fire_interval: f32,
    pub companion_range: f32,
    pub star_speed: f32,
    pub star_retarget_secs: f32,
    pub star_bonus: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.1,

            spawn_curve: SpawnCurve::default(),
            pickup_bands: vec![
                Band {
                    below: 0.017,
                    kind: PickupKind::Stocking,
                },
                Band {
                    below: 0.033,
                    kind: PickupKind::Snowflake,
                },
                Band {
                    below: 0.05,
                    kind: PickupKind::Cocoa,
                },
            ],
            coal_interval: 1.0,
            coal_chance: 0.03,
            drop_table: vec![
                Band {
                    below: 0.10,
                    kind: PickupKind::Present(AmmoKind::Homing),
                },
                Band {
                    below: 0.13,
                    kind: PickupKind::Present(AmmoKind::Explosive),
                },
            ],

            homing_grant: AmmoGrant { min: 3, max: 6 },
            explosive_grant: AmmoGrant { min: 1, max: 3 },
            fire_rate_step: 0.1,
            fire_rate_cap: 1.0,
            speed_step: 0.1,
            speed_cap: 0.8,
            slow_secs: 5.0,
            slow_factor: 0.4,

            fire_interval: 0.35,
            aimed_fire_interval: 0.25,
            explosive_damage: 2,
            explosion_radius: 0.3,
            homing_blend: 3.0,

            body_penalty: 1,
            coal_penalty: 5,

            boss_interval: 5,
            reindeer_interval: 3,

            boss_reward: 50,
            boss_combo_bonus: 5,
            boss_bundle: vec![
                PickupKind::Present(AmmoKind::Homing),
                PickupKind::Present(AmmoKind::Explosive),
                PickupKind::Stocking,
                PickupKind::Cocoa,
                PickupKind::Present(AmmoKind::Homing),
            ],
            boss_engage_depth: 0.18,
            boss_enter_speed: 0.12,
            boss_descent_speed: 0.012,
            boss_shot_interval: 1.8,
            boss_shot_speed: 0.35,
            boss_burst_interval: 5.0,
            boss_burst_size: 4,

            reindeer_secs: 4.0,
            reindeer_fire_interval: 0.25,
            max_companions: 2,
            orbit_radius: 0.18,
            orbit_speed: 2.5,
            orbit_smoothing: 8.0,
            companion_fire_interval: 0.6,
            companion_range: 0.6,
            star_speed: 0.15,
            star_retarget_secs: 2.5,
            star_bonus: 25,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a balance document, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Invalid tuning document, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Ammo grant range for a present of the given kind
    pub fn grant_for(&self, kind: AmmoKind) -> AmmoGrant {
        match kind {
            AmmoKind::Explosive => self.explosive_grant,
            _ => self.homing_grant,
        }
    }
}

/// Pick the band a cumulative roll falls into
pub fn roll_band(bands: &[Band], roll: f32) -> Option<PickupKind> {
    bands.iter().find(|b| roll < b.below).map(|b| b.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_curve_floor() {
        let curve = SpawnCurve::elapsed_based();
        assert!((curve.interval(0.0, 1) - 1.5).abs() < 1e-6);
        assert!((curve.interval(10.0, 1) - 1.2).abs() < 1e-5);
        assert!((curve.interval(1000.0, 1) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_level_curve_caps_reduction() {
        let curve = SpawnCurve::default();
        assert!((curve.interval(0.0, 1) - 1.45).abs() < 1e-6);
        assert!((curve.interval(0.0, 10) - 1.0).abs() < 1e-6);
        // Reduction capped at 0.8, then floored at 0.6
        assert!((curve.interval(0.0, 100) - 0.7).abs() < 1e-6);
        let steep = SpawnCurve {
            floor: 0.6,
            ceiling: 1.0,
            decay: SpawnDecay::Level {
                per_level: 0.1,
                max_reduction: 0.8,
            },
        };
        assert!((steep.interval(0.0, 50) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_roll_band_is_exclusive() {
        let tuning = Tuning::default();
        assert_eq!(roll_band(&tuning.pickup_bands, 0.0), Some(PickupKind::Stocking));
        assert_eq!(roll_band(&tuning.pickup_bands, 0.02), Some(PickupKind::Snowflake));
        assert_eq!(roll_band(&tuning.pickup_bands, 0.04), Some(PickupKind::Cocoa));
        assert_eq!(roll_band(&tuning.pickup_bands, 0.05), None);
        assert_eq!(
            roll_band(&tuning.drop_table, 0.11),
            Some(PickupKind::Present(AmmoKind::Explosive))
        );
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "boss_interval": 2, "coal_chance": 0.5 }"#).unwrap();
        assert_eq!(tuning.boss_interval, 2);
        assert_eq!(tuning.coal_chance, 0.5);
        assert_eq!(tuning.reindeer_interval, 3);
    }

    #[test]
    fn test_bad_json_falls_back() {
        let tuning = Tuning::from_json_or_default("{ not json");
        assert_eq!(tuning, Tuning::default());
    }
}
