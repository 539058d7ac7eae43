//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module stays free of platform code:
//! - Variable frame delta, clamped by `SimClock`
//! - Seeded RNG only
//! - Documented per-frame pass order (see `tick`)
//! - No rendering or storage dependencies

pub mod ammo;
pub mod boss;
pub mod characters;
pub mod clock;
pub mod collision;
pub mod companion;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use ammo::{AmmoBelt, AmmoKind};
pub use boss::{Boss, BossPhase};
pub use characters::{Character, FireStyle};
pub use clock::SimClock;
pub use companion::{Companion, Reindeer, Star};
pub use progression::{Progression, Upgrades};
pub use projectile::{BaseMotion, Motion, Payload, Projectile, Shooter};
pub use snapshot::{Hud, RenderSink, RenderSnapshot, Sprite, SpriteKind};
pub use state::{
    GameEvent, GamePhase, GameState, Hazard, HazardShot, Pickup, PickupKind, Player, RunSetup,
    ShotKind, Viewport,
};
pub use tick::{TickInput, tick};
pub use timer::Countdown;
