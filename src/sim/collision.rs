//! Collision passes for one frame
//!
//! All tests are circle-circle with entity radii derived from size. Passes run
//! in a fixed order and each one walks its lists from the end so removals
//! never skip an element:
//!
//! 1. hazards vs projectiles (with explosion splash)
//! 2. boss vs projectiles
//! 3. player vs pickups and stars
//! 4. player vs hazard bodies
//! 5. player vs coal

use glam::Vec2;
use rand::Rng;

use super::ammo::AmmoKind;
use super::boss::defeat_boss;
use super::companion::collect_star;
use super::projectile::Payload;
use super::spawn::roll_kill_drop;
use super::state::{ChainEffect, GameEvent, GameState, PickupKind};
use super::timer::Countdown;
use crate::circles_overlap;
use crate::consts::*;

/// Run every collision pass in order
pub fn resolve_collisions(state: &mut GameState) {
    hazards_vs_projectiles(state);
    boss_vs_projectiles(state);
    player_vs_pickups(state);
    player_vs_hazards(state);
    player_vs_shots(state);
}

fn record_level_up(state: &mut GameState, level_up: Option<u32>) {
    if let Some(level) = level_up {
        state.levels_gained.push(level);
    }
}

fn hazards_vs_projectiles(state: &mut GameState) {
    let mut p = state.projectiles.len();
    while p > 0 {
        p -= 1;
        let (pos, radius) = (state.projectiles[p].pos, state.projectiles[p].radius());
        let Some(h) = state
            .hazards
            .iter()
            .rposition(|hazard| circles_overlap(hazard.pos, hazard.radius(), pos, radius))
        else {
            continue;
        };

        let shot = state.projectiles.remove(p);
        let hazard = &mut state.hazards[h];
        hazard.health = hazard.health.saturating_sub(shot.damage);
        let (center, hit_id) = (hazard.pos, hazard.id);

        if hazard.health == 0 {
            state.hazards.remove(h);
            let award = state.progression.register_kill(shot.is_companion_fired());
            roll_kill_drop(state, center);
            record_level_up(state, award.level_up);
        }

        if shot.payload == Payload::Explosive {
            explode(state, center, hit_id);
        }
    }
}

/// Splash one point of damage on every other hazard within the blast radius
fn explode(state: &mut GameState, center: Vec2, hit_id: u32) {
    let radius = state.tuning.explosion_radius * state.viewport.unit();
    let mut destroyed = Vec::new();
    for hazard in &mut state.hazards {
        if hazard.id == hit_id || hazard.pos.distance(center) > radius {
            continue;
        }
        hazard.health = hazard.health.saturating_sub(1);
        state.effects.chains.push(ChainEffect {
            from: center,
            to: hazard.pos,
            ttl: Countdown::secs(CHAIN_EFFECT_SECS),
        });
        if hazard.health == 0 {
            destroyed.push(hazard.id);
        }
    }
    if destroyed.is_empty() {
        return;
    }
    log::debug!("Explosion took out {} extra hazards", destroyed.len());
    state.hazards.retain(|h| !destroyed.contains(&h.id));
    for _ in &destroyed {
        let award = state.progression.register_chain_kill();
        record_level_up(state, award.level_up);
    }
}

fn boss_vs_projectiles(state: &mut GameState) {
    let mut p = state.projectiles.len();
    while p > 0 {
        p -= 1;
        let Some(boss) = state.boss.as_mut() else {
            return;
        };
        let shot = &state.projectiles[p];
        if !circles_overlap(boss.pos, boss.radius(), shot.pos, shot.radius()) {
            continue;
        }
        let shot = state.projectiles.remove(p);
        if boss.hit(shot.damage) {
            defeat_boss(state);
            return;
        }
    }
}

fn apply_pickup(state: &mut GameState, kind: PickupKind) {
    let tuning = &state.tuning;
    match kind {
        PickupKind::Stocking => {
            let (step, cap) = (tuning.fire_rate_step, tuning.fire_rate_cap);
            state.progression.upgrade_fire_rate(step, cap);
        }
        PickupKind::Cocoa => {
            let (step, cap) = (tuning.speed_step, tuning.speed_cap);
            state.progression.upgrade_speed(step, cap);
        }
        PickupKind::Snowflake => {
            let secs = tuning.slow_secs;
            state.effects.slow.extend(secs);
            state.effects.slow_stacks += 1;
        }
        PickupKind::Present(AmmoKind::Standard) => {}
        PickupKind::Present(ammo) => {
            let grant = tuning.grant_for(ammo);
            let amount = state.rng.random_range(grant.min..=grant.max.max(grant.min));
            state.ammo.grant(ammo, amount);
            log::debug!("Present: +{} {:?} rounds", amount, ammo);
        }
    }
    state.events.push(GameEvent::PickupCollected(kind));
}

fn player_vs_pickups(state: &mut GameState) {
    let (player_pos, player_radius) = (state.player.pos, state.player.radius());

    let mut i = state.pickups.len();
    while i > 0 {
        i -= 1;
        let pickup = &state.pickups[i];
        if circles_overlap(player_pos, player_radius, pickup.pos, pickup.radius()) {
            let pickup = state.pickups.remove(i);
            apply_pickup(state, pickup.kind);
        }
    }

    let mut i = state.stars.len();
    while i > 0 {
        i -= 1;
        let star = &state.stars[i];
        if circles_overlap(player_pos, player_radius, star.pos, star.radius()) {
            let star = state.stars.remove(i);
            collect_star(state, star);
        }
    }
}

fn player_vs_hazards(state: &mut GameState) {
    let (player_pos, player_radius) = (state.player.pos, state.player.radius());
    let mut i = state.hazards.len();
    while i > 0 {
        i -= 1;
        let hazard = &state.hazards[i];
        if circles_overlap(player_pos, player_radius, hazard.pos, hazard.radius()) {
            state.hazards.remove(i);
            state.progression.penalize(state.tuning.body_penalty);
            state.progression.break_combo();
            state.events.push(GameEvent::PlayerHit);
        }
    }
}

/// Coal costs points but leaves the combo alone
fn player_vs_shots(state: &mut GameState) {
    let (player_pos, player_radius) = (state.player.pos, state.player.radius());
    let mut i = state.hazard_shots.len();
    while i > 0 {
        i -= 1;
        let shot = &state.hazard_shots[i];
        if circles_overlap(player_pos, player_radius, shot.pos, shot.radius()) {
            state.hazard_shots.remove(i);
            state.progression.penalize(state.tuning.coal_penalty);
            state.events.push(GameEvent::CoalHit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::Boss;
    use crate::sim::projectile::{BaseMotion, Projectile, Shooter};
    use crate::sim::state::{Hazard, HazardShot, RunSetup, ShotKind, Viewport};
    use crate::tuning::{Band, Tuning};

    fn playing_state() -> GameState {
        let tuning = Tuning {
            drop_table: Vec::new(),
            ..Tuning::default()
        };
        let mut state = GameState::new(17, Viewport::new(1000.0, 1000.0), tuning);
        state.start_run(RunSetup::default());
        // Park the player out of the way
        state.player.pos = Vec2::new(900.0, 950.0);
        state
    }

    fn hazard_at(state: &mut GameState, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            pos: Vec2::new(x, y),
            size: 1000.0 * TREE_SCALE,
            speed: 100.0,
            health: 1,
        });
        id
    }

    fn shot_at(state: &mut GameState, x: f32, y: f32, shooter: Shooter) {
        let id = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(id, Vec2::new(x, y), 1000.0, BaseMotion::Straight, shooter));
    }

    #[test]
    fn test_player_kill_scores_and_extends_combo() {
        let mut state = playing_state();
        hazard_at(&mut state, 300.0, 300.0);
        shot_at(&mut state, 300.0, 320.0, Shooter::Player);
        resolve_collisions(&mut state);
        assert!(state.hazards.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.progression.score, 1);
        assert_eq!(state.progression.combo, 1);
        assert_eq!(state.progression.kills, 1);
    }

    #[test]
    fn test_one_projectile_one_hazard() {
        let mut state = playing_state();
        hazard_at(&mut state, 300.0, 300.0);
        hazard_at(&mut state, 310.0, 300.0);
        shot_at(&mut state, 305.0, 300.0, Shooter::Player);
        resolve_collisions(&mut state);
        assert_eq!(state.hazards.len(), 1);
        assert_eq!(state.progression.kills, 1);
    }

    #[test]
    fn test_every_overlapping_shot_resolves() {
        let mut state = playing_state();
        hazard_at(&mut state, 100.0, 300.0);
        hazard_at(&mut state, 400.0, 300.0);
        hazard_at(&mut state, 700.0, 300.0);
        for x in [100.0, 400.0, 700.0] {
            shot_at(&mut state, x, 300.0, Shooter::Player);
        }
        resolve_collisions(&mut state);
        assert!(state.hazards.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.progression.combo, 3);
    }

    #[test]
    fn test_companion_kill_uses_multiplier_without_combo() {
        let mut state = playing_state();
        state.progression.combo = 6;
        hazard_at(&mut state, 300.0, 300.0);
        shot_at(&mut state, 300.0, 300.0, Shooter::Companion);
        resolve_collisions(&mut state);
        assert_eq!(state.progression.combo, 6);
        assert_eq!(state.progression.score, 2);
    }

    #[test]
    fn test_every_projectile_kill_rolls_drop_table() {
        let mut state = playing_state();
        state.tuning.drop_table = vec![Band {
            below: 1.0,
            kind: PickupKind::Cocoa,
        }];
        hazard_at(&mut state, 300.0, 300.0);
        shot_at(&mut state, 300.0, 300.0, Shooter::Player);
        resolve_collisions(&mut state);
        assert_eq!(state.pickups.len(), 1);

        hazard_at(&mut state, 600.0, 300.0);
        shot_at(&mut state, 600.0, 300.0, Shooter::Companion);
        resolve_collisions(&mut state);
        assert_eq!(state.pickups.len(), 2);
        assert_eq!(state.pickups[1].pos, Vec2::new(600.0, 300.0));
    }

    #[test]
    fn test_explosion_splashes_neighbors() {
        let mut state = playing_state();
        let target = hazard_at(&mut state, 500.0, 300.0);
        // Outside the direct hit but inside the blast
        hazard_at(&mut state, 700.0, 300.0);
        hazard_at(&mut state, 500.0, 550.0);
        // Far away, untouched
        hazard_at(&mut state, 100.0, 100.0);
        state.hazards.iter_mut().find(|h| h.id == target).unwrap().health = 5;

        let id = state.next_entity_id();
        state.projectiles.push(
            Projectile::new(id, Vec2::new(500.0, 300.0), 1000.0, BaseMotion::Straight, Shooter::Player)
                .explosive(2),
        );
        resolve_collisions(&mut state);

        // Target survives with 3 health, both neighbors die as chain kills
        assert_eq!(state.hazards.len(), 2);
        assert_eq!(state.hazards.iter().find(|h| h.id == target).unwrap().health, 3);
        assert_eq!(state.effects.chains.len(), 2);
        assert_eq!(state.progression.kills, 2);
        assert_eq!(state.progression.score, 2);
        assert_eq!(state.progression.combo, 0);
    }

    #[test]
    fn test_boss_takes_damage_then_falls() {
        let mut state = playing_state();
        let mut boss = Boss::new(&state.viewport, 2);
        boss.pos = Vec2::new(500.0, 200.0);
        state.boss = Some(boss);
        shot_at(&mut state, 500.0, 200.0, Shooter::Player);
        resolve_collisions(&mut state);
        assert_eq!(state.boss.as_ref().map(|b| b.health), Some(1));

        shot_at(&mut state, 500.0, 200.0, Shooter::Player);
        shot_at(&mut state, 510.0, 200.0, Shooter::Player);
        resolve_collisions(&mut state);
        assert!(state.boss.is_none());
        // The second shot flies on once the boss is gone
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.progression.score, 50);
        assert!(state.companions_unlocked);
    }

    #[test]
    fn test_pickup_effects() {
        let mut state = playing_state();
        let at = state.player.pos;
        state.drop_pickup(PickupKind::Stocking, at);
        state.drop_pickup(PickupKind::Cocoa, at);
        state.drop_pickup(PickupKind::Snowflake, at);
        state.drop_pickup(PickupKind::Snowflake, at);
        state.drop_pickup(PickupKind::Present(AmmoKind::Homing), at);
        state.drop_pickup(PickupKind::Present(AmmoKind::Explosive), at);
        resolve_collisions(&mut state);

        assert!(state.pickups.is_empty());
        assert!((state.progression.upgrades.fire_rate_bonus - 0.1).abs() < 1e-6);
        assert!((state.progression.upgrades.speed_bonus - 0.1).abs() < 1e-6);
        assert!((state.effects.slow.remaining() - 10.0).abs() < 1e-4);
        assert_eq!(state.effects.slow_stacks, 2);
        assert!((3..=6).contains(&state.ammo.homing));
        assert!((1..=3).contains(&state.ammo.explosive));
        let collected = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PickupCollected(_)))
            .count();
        assert_eq!(collected, 6);
    }

    #[test]
    fn test_body_hit_penalty_and_combo_reset() {
        let mut state = playing_state();
        state.progression.score = 10;
        state.progression.combo = 4;
        let (x, y) = (state.player.pos.x, state.player.pos.y);
        hazard_at(&mut state, x, y);
        resolve_collisions(&mut state);
        assert!(state.hazards.is_empty());
        assert_eq!(state.progression.score, 9);
        assert_eq!(state.progression.combo, 0);
        assert!(state.drain_events().contains(&GameEvent::PlayerHit));
    }

    #[test]
    fn test_coal_penalty_keeps_combo() {
        let mut state = playing_state();
        state.progression.score = 3;
        state.progression.combo = 4;
        state.hazard_shots.push(HazardShot {
            kind: ShotKind::Coal,
            pos: state.player.pos,
            size: 180.0,
            vel: Vec2::ZERO,
        });
        resolve_collisions(&mut state);
        assert!(state.hazard_shots.is_empty());
        assert_eq!(state.progression.score, 0);
        assert_eq!(state.progression.combo, 4);
        assert!(state.drain_events().contains(&GameEvent::CoalHit));
    }

    #[test]
    fn test_tenth_kill_queues_level_up() {
        let mut state = playing_state();
        state.progression.kills = 9;
        hazard_at(&mut state, 300.0, 300.0);
        shot_at(&mut state, 300.0, 300.0, Shooter::Player);
        resolve_collisions(&mut state);
        assert_eq!(state.levels_gained, vec![2]);
        assert_eq!(state.progression.level, 2);
    }
}
