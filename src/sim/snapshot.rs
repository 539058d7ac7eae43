//! Read-only frame snapshot for renderers
//!
//! Built once per frame after the update, so a renderer never touches
//! `GameState` directly.

use glam::Vec2;
use serde::Serialize;

use super::ammo::AmmoKind;
use super::boss::BossPhase;
use super::characters::Character;
use super::progression::{combo_label, Upgrades};
use super::projectile::{Motion, Payload};
use super::state::{GamePhase, GameState, PickupKind, ShotKind};
use crate::consts::CHAIN_EFFECT_SECS;

/// What a sprite depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpriteKind {
    Player(Character),
    Tree,
    Pickup(PickupKind),
    Ornament { homing: bool, explosive: bool },
    Coal,
    BossCoal,
    Boss { engaging: bool },
    Reindeer,
    Companion,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub pos: Vec2,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChainLine {
    pub from: Vec2,
    pub to: Vec2,
    /// 1.0 when fresh, fading to 0.0
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BossBar {
    pub health: i32,
    pub max_health: i32,
}

/// HUD scalars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: &'static str,
    pub score: u64,
    pub combo: u32,
    pub multiplier: u64,
    pub combo_label: Option<String>,
    pub level: u32,
    /// Level banner still showing
    pub level_banner: bool,
    /// Whole seconds of slow motion left (0 when inactive)
    pub slow_secs: u32,
    pub slow_stacks: u32,
    pub selected_ammo: AmmoKind,
    pub homing_ammo: u32,
    pub explosive_ammo: u32,
    pub boss: Option<BossBar>,
    pub currency: u64,
    pub upgrades: Upgrades,
    pub companions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub width: f32,
    pub height: f32,
    /// Back-to-front draw order
    pub sprites: Vec<Sprite>,
    pub chains: Vec<ChainLine>,
    pub hud: Hud,
}

/// Anything that draws a frame
pub trait RenderSink {
    fn draw(&mut self, snapshot: &RenderSnapshot);
}

fn phase_name(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Ready => "ready",
        GamePhase::Playing => "playing",
        GamePhase::Paused => "paused",
        GamePhase::GameOver => "gameOver",
    }
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let mut sprites = Vec::with_capacity(
            state.hazards.len() + state.pickups.len() + state.projectiles.len() + state.hazard_shots.len() + 8,
        );

        if let Some(boss) = &state.boss {
            sprites.push(Sprite {
                kind: SpriteKind::Boss {
                    engaging: boss.phase == BossPhase::Engaging,
                },
                pos: boss.pos,
                size: boss.size,
            });
        }
        sprites.extend(state.hazards.iter().map(|h| Sprite {
            kind: SpriteKind::Tree,
            pos: h.pos,
            size: h.size,
        }));
        sprites.extend(state.pickups.iter().map(|p| Sprite {
            kind: SpriteKind::Pickup(p.kind),
            pos: p.pos,
            size: p.size,
        }));
        sprites.extend(state.stars.iter().map(|s| Sprite {
            kind: SpriteKind::Star,
            pos: s.pos,
            size: s.size,
        }));
        sprites.extend(state.hazard_shots.iter().map(|s| Sprite {
            kind: match s.kind {
                ShotKind::Coal => SpriteKind::Coal,
                ShotKind::BossCoal => SpriteKind::BossCoal,
            },
            pos: s.pos,
            size: s.size,
        }));
        if let Some(reindeer) = &state.reindeer {
            sprites.push(Sprite {
                kind: SpriteKind::Reindeer,
                pos: reindeer.pos,
                size: reindeer.size,
            });
        }
        sprites.extend(state.projectiles.iter().map(|p| Sprite {
            kind: SpriteKind::Ornament {
                homing: matches!(p.motion, Motion::Homing { .. }),
                explosive: p.payload == Payload::Explosive,
            },
            pos: p.pos,
            size: p.size,
        }));
        sprites.extend(state.companions.iter().map(|c| Sprite {
            kind: SpriteKind::Companion,
            pos: c.pos,
            size: c.size,
        }));
        sprites.push(Sprite {
            kind: SpriteKind::Player(state.player.character),
            pos: state.player.pos,
            size: state.player.size,
        });

        let chains = state
            .effects
            .chains
            .iter()
            .map(|c| ChainLine {
                from: c.from,
                to: c.to,
                alpha: (c.ttl.remaining() / CHAIN_EFFECT_SECS).clamp(0.0, 1.0),
            })
            .collect();

        let progression = &state.progression;
        let hud = Hud {
            phase: phase_name(state.phase),
            score: progression.score,
            combo: progression.combo,
            multiplier: progression.multiplier(),
            combo_label: combo_label(progression.combo),
            level: progression.level,
            level_banner: state.effects.level_banner.is_running(),
            slow_secs: state.effects.slow.display_secs(),
            slow_stacks: state.effects.slow_stacks,
            selected_ammo: state.ammo.selected,
            homing_ammo: state.ammo.homing,
            explosive_ammo: state.ammo.explosive,
            boss: state.boss.as_ref().map(|b| BossBar {
                health: b.health,
                max_health: b.max_health,
            }),
            currency: progression.currency,
            upgrades: progression.upgrades,
            companions: state.companions.len(),
        };

        Self {
            width: state.viewport.width,
            height: state.viewport.height,
            sprites,
            chains,
            hud,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{RunSetup, Viewport};
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = GameState::new(2, Viewport::new(640.0, 480.0), Tuning::default());
        state.start_run(RunSetup::default());
        state.drop_pickup(PickupKind::Snowflake, Vec2::new(10.0, 20.0));
        state.progression.combo = 6;
        state.effects.slow.set(2.2);

        let snapshot = RenderSnapshot::capture(&state);
        assert_eq!(snapshot.sprites.len(), 2);
        assert_eq!(
            snapshot.sprites.last().map(|s| s.kind),
            Some(SpriteKind::Player(Character::Santa))
        );
        assert_eq!(snapshot.hud.multiplier, 2);
        assert_eq!(snapshot.hud.combo_label.as_deref(), Some("NICE LIST!"));
        assert_eq!(snapshot.hud.slow_secs, 3);
        assert_eq!(snapshot.hud.phase, "playing");
        assert!(snapshot.hud.boss.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(2, Viewport::new(640.0, 480.0), Tuning::default());
        let json = serde_json::to_string(&RenderSnapshot::capture(&state)).unwrap();
        assert!(json.contains("\"phase\":\"ready\""));
    }
}
