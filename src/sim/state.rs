//! Game state and core simulation types
//!
//! Everything a frame reads or writes lives in `GameState`; update functions
//! take it explicitly instead of sharing globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ammo::{AmmoBelt, AmmoKind};
use super::boss::Boss;
use super::characters::Character;
use super::companion::{Companion, Reindeer, Star};
use super::progression::Progression;
use super::projectile::Projectile;
use super::spawn::Spawner;
use super::timer::Countdown;
use crate::consts::*;
use crate::tuning::Tuning;

/// Play field dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The size every entity scale is relative to
    #[inline]
    pub fn unit(&self) -> f32 {
        self.width.min(self.height)
    }

    /// True once an entity of `size` is entirely past any edge
    pub fn is_outside(&self, pos: Vec2, size: f32) -> bool {
        pos.y + size < 0.0 || pos.y - size > self.height || pos.x + size < 0.0 || pos.x - size > self.width
    }

    /// True once an entity of `size` is entirely below the bottom edge
    pub fn is_below(&self, pos: Vec2, size: f32) -> bool {
        pos.y - size > self.height
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to start
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// A hazard landed
    GameOver,
}

/// The player-controlled character
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub character: Character,
    pub fire_cooldown: Countdown,
}

impl Player {
    pub fn new(character: Character, viewport: &Viewport) -> Self {
        Self {
            pos: Vec2::new(viewport.width * 0.5, viewport.height * PLAYER_START_Y),
            size: viewport.unit() * character.scale(),
            character,
            fire_cooldown: Countdown::ZERO,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * BODY_RADIUS
    }
}

/// A falling hazard; the game ends if one reaches the bottom
#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    /// Base fall speed (px/s) before difficulty and slow motion
    pub speed: f32,
    pub health: u32,
}

impl Hazard {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * BODY_RADIUS
    }
}

/// Pickup types, each mapped to exactly one effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Permanent fire-rate upgrade
    Stocking,
    /// Temporary global slow motion
    Snowflake,
    /// Permanent move-speed upgrade
    Cocoa,
    /// Ammo grant
    Present(AmmoKind),
}

impl PickupKind {
    pub fn scale(&self) -> f32 {
        match self {
            PickupKind::Stocking => STOCKING_SCALE,
            PickupKind::Snowflake => SNOWFLAKE_SCALE,
            PickupKind::Cocoa => COCOA_SCALE,
            PickupKind::Present(_) => PRESENT_SCALE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub size: f32,
    /// Fall speed (px/s)
    pub speed: f32,
}

impl Pickup {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * ITEM_RADIUS
    }
}

/// Hazard projectile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    /// Falls straight down from the top
    Coal,
    /// Fired by the boss at the player
    BossCoal,
}

impl ShotKind {
    pub fn scale(&self) -> f32 {
        match self {
            ShotKind::Coal => COAL_SCALE,
            ShotKind::BossCoal => BOSS_COAL_SCALE,
        }
    }
}

/// A projectile that hurts the player
#[derive(Debug, Clone)]
pub struct HazardShot {
    pub kind: ShotKind,
    pub pos: Vec2,
    pub size: f32,
    pub vel: Vec2,
}

impl HazardShot {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * ITEM_RADIUS
    }
}

/// Short-lived explosion link drawn from the blast to each splashed hazard
#[derive(Debug, Clone)]
pub struct ChainEffect {
    pub from: Vec2,
    pub to: Vec2,
    pub ttl: Countdown,
}

/// Timed effects and HUD timers
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    pub slow: Countdown,
    /// Snowflakes collected during the current slow period
    pub slow_stacks: u32,
    pub level_banner: Countdown,
    pub chains: Vec<ChainEffect>,
}

impl ActiveEffects {
    pub fn tick(&mut self, dt: f32) {
        if self.slow.is_running() && self.slow.tick_done(dt) {
            self.slow_stacks = 0;
        }
        self.level_banner.tick(dt);
        for chain in &mut self.chains {
            chain.ttl.tick(dt);
        }
        self.chains.retain(|c| c.ttl.is_running());
    }
}

/// Notifications for audio/UI collaborators, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunStarted { character: Character },
    LevelUp { level: u32 },
    ReindeerArrived,
    BossSpawned { health: u32 },
    BossDefeated,
    CompanionsUnlocked,
    CompanionJoined,
    StarCollected { bonus: u64 },
    PickupCollected(PickupKind),
    AmmoSwitched(AmmoKind),
    /// Player body touched a hazard
    PlayerHit,
    /// Player touched coal
    CoalHit,
    GameOver { score: u64, level: u32, new_best: bool },
}

/// Run start parameters read from the persisted profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSetup {
    pub character: Character,
    pub currency: u64,
    pub companions_unlocked: bool,
    /// Best score so far, for the game-over comparison
    pub high_score: u64,
}

impl Default for RunSetup {
    fn default() -> Self {
        Self {
            character: Character::Santa,
            currency: 0,
            companions_unlocked: false,
            high_score: 0,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub phase: GamePhase,
    /// Seconds of play this run
    pub elapsed: f32,
    pub player: Player,
    pub ammo: AmmoBelt,
    pub progression: Progression,
    pub effects: ActiveEffects,
    pub spawner: Spawner,
    pub hazards: Vec<Hazard>,
    pub pickups: Vec<Pickup>,
    pub hazard_shots: Vec<HazardShot>,
    pub projectiles: Vec<Projectile>,
    /// At most one boss at a time
    pub boss: Option<Boss>,
    pub reindeer: Option<Reindeer>,
    pub companions: Vec<Companion>,
    pub stars: Vec<Star>,
    /// Set once per profile by the first boss defeat
    pub companions_unlocked: bool,
    /// Best score before this run
    pub high_score: u64,
    /// Events raised this frame
    pub events: Vec<GameEvent>,
    /// Levels reached during this frame's collision passes
    pub(crate) levels_gained: Vec<u32>,
    next_id: u32,
}

impl GameState {
    /// Create an idle state waiting for `start_run`
    pub fn new(seed: u64, viewport: Viewport, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            viewport,
            phase: GamePhase::Ready,
            elapsed: 0.0,
            player: Player::new(Character::Santa, &viewport),
            ammo: AmmoBelt::default(),
            progression: Progression::new(0),
            effects: ActiveEffects::default(),
            spawner: Spawner::default(),
            hazards: Vec::new(),
            pickups: Vec::new(),
            hazard_shots: Vec::new(),
            projectiles: Vec::new(),
            boss: None,
            reindeer: None,
            companions: Vec::new(),
            stars: Vec::new(),
            companions_unlocked: false,
            high_score: 0,
            events: Vec::new(),
            levels_gained: Vec::new(),
            next_id: 1,
        }
    }

    /// Reset every population and start playing
    pub fn start_run(&mut self, setup: RunSetup) {
        self.phase = GamePhase::Playing;
        self.elapsed = 0.0;
        self.player = Player::new(setup.character, &self.viewport);
        self.ammo = AmmoBelt::default();
        self.progression = Progression::new(setup.currency);
        self.effects = ActiveEffects::default();
        self.spawner = Spawner::default();
        self.hazards.clear();
        self.pickups.clear();
        self.hazard_shots.clear();
        self.projectiles.clear();
        self.boss = None;
        self.reindeer = None;
        self.companions.clear();
        self.stars.clear();
        self.companions_unlocked = setup.companions_unlocked;
        self.high_score = setup.high_score;
        self.levels_gained.clear();
        log::info!("Run started as {}", setup.character.name());
        self.events.push(GameEvent::RunStarted {
            character: setup.character,
        });
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform roll in [0, 1)
    #[inline]
    pub fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hazard fall-speed multiplier from play time
    #[inline]
    pub fn difficulty(&self) -> f32 {
        1.0 + self.elapsed / DIFFICULTY_RAMP_SECS
    }

    /// Global slow-motion factor (1.0 when inactive)
    #[inline]
    pub fn slow_factor(&self) -> f32 {
        if self.effects.slow.is_running() {
            self.tuning.slow_factor
        } else {
            1.0
        }
    }

    /// Current downward velocity of a regular hazard
    #[inline]
    pub fn hazard_velocity(&self, hazard: &Hazard) -> Vec2 {
        Vec2::new(0.0, hazard.speed * self.difficulty() * self.slow_factor())
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Drop a pickup at a position (kill drops, boss bundles)
    pub fn drop_pickup(&mut self, kind: PickupKind, pos: Vec2) {
        let id = self.next_entity_id();
        let unit = self.viewport.unit();
        log::debug!("Dropped {:?}", kind);
        self.pickups.push(Pickup {
            id,
            kind,
            pos,
            size: unit * kind.scale(),
            speed: unit * PICKUP_SPEED,
        });
    }

    /// Apply a new viewport: every size follows the unit, speeds scale with it
    pub fn resize(&mut self, viewport: Viewport) {
        let old_unit = self.viewport.unit();
        self.viewport = viewport;
        let unit = viewport.unit();
        let ratio = if old_unit > 0.0 { unit / old_unit } else { 1.0 };

        self.player.size = unit * self.player.character.scale();
        let half = self.player.size * 0.5;
        self.player.pos = super::player::clamp_to_viewport(self.player.pos, half, &viewport);

        for hazard in &mut self.hazards {
            hazard.size = unit * TREE_SCALE;
            hazard.speed *= ratio;
        }
        for pickup in &mut self.pickups {
            pickup.size = unit * pickup.kind.scale();
            pickup.speed *= ratio;
        }
        for shot in &mut self.hazard_shots {
            shot.size = unit * shot.kind.scale();
            shot.vel *= ratio;
        }
        for projectile in &mut self.projectiles {
            projectile.rescale(unit, ratio);
        }
        if let Some(boss) = &mut self.boss {
            boss.size = unit * BOSS_SCALE;
        }
        if let Some(reindeer) = &mut self.reindeer {
            reindeer.size = unit * REINDEER_SCALE;
        }
        for companion in &mut self.companions {
            companion.size = unit * COMPANION_SCALE;
        }
        for star in &mut self.stars {
            star.size = unit * STAR_SCALE;
        }
        log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready() {
        let state = GameState::new(1, Viewport::new(800.0, 600.0), Tuning::default());
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.progression.level, 1);
        assert!((state.player.size - 600.0 * 0.24).abs() < 1e-3);
    }

    #[test]
    fn test_start_run_clears_populations() {
        let mut state = GameState::new(1, Viewport::new(800.0, 600.0), Tuning::default());
        state.drop_pickup(PickupKind::Cocoa, Vec2::new(10.0, 10.0));
        state.start_run(RunSetup {
            character: Character::Frosty,
            currency: 77,
            companions_unlocked: true,
            high_score: 500,
        });
        assert!(state.pickups.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progression.currency, 77);
        assert_eq!(state.high_score, 500);
        assert_eq!(state.player.character, Character::Frosty);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::RunStarted {
                character: Character::Frosty
            }]
        );
    }

    #[test]
    fn test_resize_recomputes_sizes() {
        let mut state = GameState::new(1, Viewport::new(800.0, 600.0), Tuning::default());
        state.start_run(RunSetup::default());
        state.drop_pickup(PickupKind::Snowflake, Vec2::new(100.0, 100.0));
        state.resize(Viewport::new(400.0, 900.0));
        assert!((state.pickups[0].size - 400.0 * SNOWFLAKE_SCALE).abs() < 1e-3);
        assert!((state.player.size - 400.0 * 0.24).abs() < 1e-3);
        assert!(state.player.pos.x <= 400.0 - state.player.size * 0.5);
    }

    #[test]
    fn test_outside_checks_every_edge() {
        let vp = Viewport::new(100.0, 100.0);
        assert!(!vp.is_outside(Vec2::new(50.0, -5.0), 10.0));
        assert!(vp.is_outside(Vec2::new(50.0, -11.0), 10.0));
        assert!(vp.is_outside(Vec2::new(111.0, 50.0), 10.0));
        assert!(vp.is_outside(Vec2::new(-11.0, 50.0), 10.0));
        assert!(vp.is_outside(Vec2::new(50.0, 111.0), 10.0));
    }

    #[test]
    fn test_slow_stacks_reset_on_expiry() {
        let mut effects = ActiveEffects::default();
        effects.slow.extend(5.0);
        effects.slow_stacks = 2;
        effects.tick(4.0);
        assert_eq!(effects.slow_stacks, 2);
        effects.tick(1.5);
        assert_eq!(effects.slow_stacks, 0);
    }
}
