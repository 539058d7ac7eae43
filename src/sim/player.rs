//! Player movement and firing

use glam::Vec2;

use super::ammo::AmmoKind;
use super::characters::FireStyle;
use super::projectile::{BaseMotion, Projectile, Shooter};
use super::state::{GameEvent, GameState, Viewport};
use super::tick::TickInput;
use crate::consts::*;

/// Keep a point `half` away from every viewport edge
pub fn clamp_to_viewport(pos: Vec2, half: f32, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        pos.x.clamp(half, (viewport.width - half).max(half)),
        pos.y.clamp(half, (viewport.height - half).max(half)),
    )
}

/// Pixels per second the player moves at full stick
pub fn move_speed(state: &GameState) -> f32 {
    state.viewport.unit()
        * PLAYER_SPEED
        * state.player.character.move_speed()
        * (1.0 + state.progression.upgrades.speed_bonus)
}

/// Character fire rate scaled by the run's permanent upgrade
pub fn effective_fire_rate(state: &GameState) -> f32 {
    state.player.character.fire_rate() * (1.0 + state.progression.upgrades.fire_rate_bonus)
}

/// Move, switch ammo and fire according to this frame's input
pub fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    state.player.fire_cooldown.tick(dt);

    // Unnormalized on purpose: diagonals are faster
    let speed = move_speed(state);
    let half = state.player.size * 0.5;
    let pos = state.player.pos + input.movement * speed * dt;
    state.player.pos = clamp_to_viewport(pos, half, &state.viewport);

    if input.cycle_ammo {
        let kind = state.ammo.cycle();
        state.events.push(GameEvent::AmmoSwitched(kind));
    }

    let wants_fire = match state.player.character.fire_style() {
        FireStyle::Aimed => input.aim != Vec2::ZERO,
        _ => input.fire,
    };
    if wants_fire {
        try_fire(state, input.aim);
    }
}

/// Fire if the cooldown allows. Returns true if projectiles were spawned.
pub fn try_fire(state: &mut GameState, aim: Vec2) -> bool {
    if !state.is_playing() || state.player.fire_cooldown.is_running() {
        return false;
    }

    let style = state.player.character.fire_style();
    let aim_dir = aim.normalize_or_zero();
    if style == FireStyle::Aimed && aim_dir == Vec2::ZERO {
        return false;
    }

    // One round per trigger pull, shared by every projectile of the volley
    let ammo = state.ammo.take_round();
    let unit = state.viewport.unit();
    let speed = unit * ORNAMENT_SPEED;
    let player = &state.player;
    let muzzle = Vec2::new(player.pos.x, player.pos.y - player.size * MUZZLE_OFFSET);

    let shots: Vec<(Vec2, BaseMotion)> = match style {
        FireStyle::Straight => vec![(muzzle, BaseMotion::Straight)],
        FireStyle::DualDiagonal => vec![
            (muzzle, BaseMotion::Diagonal { drift: -DIAGONAL_DRIFT }),
            (muzzle, BaseMotion::Diagonal { drift: DIAGONAL_DRIFT }),
        ],
        FireStyle::Aimed => vec![(player.pos, BaseMotion::Vector { vel: aim_dir * speed })],
    };

    for (pos, motion) in shots {
        let id = state.next_entity_id();
        let projectile = Projectile::new(id, pos, unit, motion, Shooter::Player);
        let projectile = match ammo {
            AmmoKind::Standard => projectile,
            AmmoKind::Homing => projectile.homing(),
            AmmoKind::Explosive => projectile.explosive(state.tuning.explosive_damage),
        };
        state.projectiles.push(projectile);
    }

    let base_interval = match style {
        FireStyle::Aimed => state.tuning.aimed_fire_interval,
        _ => state.tuning.fire_interval,
    };
    let cooldown = base_interval / effective_fire_rate(state);
    state.player.fire_cooldown.set(cooldown);
    true
}
