//! Per-frame simulation tick
//!
//! Advances the game by one variable frame delta. Pass order is fixed:
//! pause, autopilot, timers, spawning, player, projectiles, falling entities,
//! boss, helpers, collisions, then level-up consequences.

use glam::Vec2;

use super::boss::{spawn_boss, update_boss};
use super::characters::FireStyle;
use super::collision::resolve_collisions;
use super::companion::{spawn_reindeer, update_companions, update_reindeer, update_stars};
use super::player::update_player;
use super::projectile::update_projectiles;
use super::spawn::update_spawner;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axes in [-1, 1]; diagonals are not normalized
    pub movement: Vec2,
    /// Aim direction for aimed characters (zero = not aiming)
    pub aim: Vec2,
    /// Fire button held
    pub fire: bool,
    /// Switch to the next ammo kind (edge-triggered)
    pub cycle_ammo: bool,
    /// Pause toggle (edge-triggered)
    pub pause: bool,
    /// Demo mode: the AI plays
    pub autopilot: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }
    if !state.is_playing() {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }

    state.elapsed += dt;
    state.effects.tick(dt);

    update_spawner(state, dt);
    update_player(state, &input, dt);
    update_projectiles(state, dt);

    if update_falling(state, dt) {
        end_game(state);
        return;
    }
    if update_boss(state, dt) {
        end_game(state);
        return;
    }

    update_reindeer(state, dt);
    update_companions(state, dt);
    update_stars(state, dt);

    resolve_collisions(state);
    apply_level_ups(state);
}

/// Move hazards, pickups and coal. Returns true if a hazard landed.
fn update_falling(state: &mut GameState, dt: f32) -> bool {
    let difficulty = state.difficulty();
    let slow = state.slow_factor();
    let viewport = state.viewport;

    let mut landed = false;
    for hazard in &mut state.hazards {
        hazard.pos.y += hazard.speed * difficulty * slow * dt;
        landed |= hazard.pos.y - hazard.size * LANDING_MARGIN > viewport.height;
    }

    for pickup in &mut state.pickups {
        pickup.pos.y += pickup.speed * dt;
    }
    state.pickups.retain(|p| !viewport.is_below(p.pos, p.size));

    for shot in &mut state.hazard_shots {
        shot.pos += shot.vel * slow * dt;
    }
    state.hazard_shots.retain(|s| !viewport.is_outside(s.pos, s.size));

    landed
}

fn apply_level_ups(state: &mut GameState) {
    for level in std::mem::take(&mut state.levels_gained) {
        log::info!("Level {}", level);
        state.events.push(GameEvent::LevelUp { level });
        state.effects.level_banner.set(LEVEL_BANNER_SECS);

        let interval = state.tuning.reindeer_interval;
        if state.progression.claim_reindeer_milestone(level, interval) {
            spawn_reindeer(state);
        }
        let boss_interval = state.tuning.boss_interval;
        if boss_interval > 0 && level % boss_interval == 0 {
            spawn_boss(state, level);
        }
    }
}

fn end_game(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    let (score, level) = (state.progression.score, state.progression.level);
    let new_best = score > state.high_score;
    if new_best {
        log::info!("Game over: new best score {} at level {}", score, level);
    } else {
        log::info!("Game over: score {} at level {}", score, level);
    }
    state.events.push(GameEvent::GameOver { score, level, new_best });
}

/// Demo AI: dodge toward the lowest threat's column, grab nearby pickups, keep firing
fn autopilot(state: &GameState, input: &mut TickInput) {
    let player = state.player.pos;

    // The most urgent hazard is the lowest one on screen
    let threat = state
        .hazards
        .iter()
        .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
        .map(|h| h.pos)
        .or(state.boss.as_ref().map(|b| b.pos));

    let pickup = state
        .pickups
        .iter()
        .map(|p| p.pos)
        .chain(state.stars.iter().map(|s| s.pos))
        .filter(|p| p.y > state.viewport.height * 0.5)
        .min_by(|a, b| {
            a.distance_squared(player)
                .partial_cmp(&b.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    // Coal in our column: sidestep
    let dodge = state
        .hazard_shots
        .iter()
        .filter(|s| s.pos.y < player.y && (s.pos.x - player.x).abs() < state.player.size)
        .map(|s| if s.pos.x > player.x { -1.0 } else { 1.0 })
        .next();

    let target_x = match (dodge, pickup, threat) {
        (Some(dir), _, _) => player.x + dir * state.player.size,
        (None, Some(p), _) => p.x,
        (None, None, Some(t)) => t.x,
        (None, None, None) => state.viewport.width * 0.5,
    };
    let dx = target_x - player.x;
    input.movement.x = if dx.abs() < 2.0 { 0.0 } else { dx.signum() };

    // Drift back toward the home row
    let home_y = state.viewport.height * PLAYER_START_Y;
    let dy = home_y - player.y;
    input.movement.y = if dy.abs() < 2.0 { 0.0 } else { dy.signum() * 0.5 };

    input.fire = threat.is_some();
    if state.player.character.fire_style() == FireStyle::Aimed {
        input.aim = threat.map_or(Vec2::ZERO, |t| (t - player).normalize_or_zero());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::characters::Character;
    use crate::sim::state::{Hazard, RunSetup, Viewport};
    use crate::tuning::Tuning;

    const FRAME: f32 = 1.0 / 60.0;

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Viewport::new(800.0, 1000.0), Tuning::default());
        state.start_run(RunSetup::default());
        state.drain_events();
        state
    }

    #[test]
    fn test_ready_state_does_not_advance() {
        let mut state = GameState::new(1, Viewport::new(800.0, 1000.0), Tuning::default());
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.elapsed, 0.0);
        assert!(state.hazards.is_empty());
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = playing_state(1);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, FRAME);
        assert_eq!(state.phase, GamePhase::Paused);
        let frozen = state.elapsed;

        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.elapsed, frozen);

        tick(&mut state, &pause, FRAME);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.elapsed > frozen);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing_state(4242);
        let mut b = playing_state(4242);
        let inputs = [
            TickInput {
                fire: true,
                ..Default::default()
            },
            TickInput {
                movement: Vec2::new(1.0, 0.0),
                fire: true,
                ..Default::default()
            },
            TickInput {
                autopilot: true,
                ..Default::default()
            },
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, FRAME);
            tick(&mut b, input, FRAME);
        }
        assert_eq!(a.progression, b.progression);
        assert_eq!(a.hazards.len(), b.hazards.len());
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_landed_hazard_ends_run() {
        let mut state = playing_state(2);
        state.hazards.push(Hazard {
            id: 500,
            pos: Vec2::new(100.0, 1070.0),
            size: 176.0,
            speed: 100.0,
            health: 1,
        });
        tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(matches!(
            state.drain_events().last(),
            Some(GameEvent::GameOver { .. })
        ));

        // Frozen afterwards
        let elapsed = state.elapsed;
        tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(state.elapsed, elapsed);
    }

    #[test]
    fn test_offscreen_entities_are_removed() {
        let mut state = playing_state(3);
        state.drop_pickup(crate::sim::state::PickupKind::Cocoa, Vec2::new(50.0, 1200.0));
        state.hazard_shots.push(crate::sim::state::HazardShot {
            kind: crate::sim::state::ShotKind::BossCoal,
            pos: Vec2::new(-200.0, 500.0),
            size: 10.0,
            vel: Vec2::new(-10.0, 0.0),
        });
        tick(&mut state, &TickInput::default(), FRAME);
        assert!(state.pickups.is_empty());
        assert!(state.hazard_shots.iter().all(|s| s.kind != crate::sim::state::ShotKind::BossCoal));
    }

    #[test]
    fn test_level_five_brings_boss_and_level_three_reindeer() {
        let mut state = playing_state(5);
        state.levels_gained = vec![3];
        apply_level_ups(&mut state);
        assert!(state.reindeer.is_some());
        assert!(state.boss.is_none());
        assert!(state.effects.level_banner.is_running());

        state.levels_gained = vec![5];
        apply_level_ups(&mut state);
        assert_eq!(state.boss.as_ref().map(|b| b.max_health), Some(5));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LevelUp { level: 3 }));
        assert!(events.contains(&GameEvent::ReindeerArrived));
        assert!(events.contains(&GameEvent::BossSpawned { health: 5 }));
    }

    #[test]
    fn test_slow_motion_scales_hazard_fall() {
        let mut normal = playing_state(6);
        let mut slowed = playing_state(6);
        slowed.effects.slow.set(5.0);
        for state in [&mut normal, &mut slowed] {
            state.hazards.push(Hazard {
                id: 900,
                pos: Vec2::new(400.0, 100.0),
                size: 10.0,
                speed: 100.0,
                health: 1,
            });
            update_falling(state, 1.0);
        }
        let fall = |s: &GameState| s.hazards.iter().find(|h| h.id == 900).map(|h| h.pos.y - 100.0);
        let (a, b) = (fall(&normal).unwrap(), fall(&slowed).unwrap());
        assert!((b - a * 0.4).abs() < 1e-3);
    }

    #[test]
    fn test_autopilot_survives_a_while() {
        let mut state = GameState::new(77, Viewport::new(800.0, 1000.0), Tuning::default());
        state.start_run(RunSetup {
            character: Character::Kasie,
            ..RunSetup::default()
        });
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state, &input, FRAME);
        }
        assert!(state.progression.kills > 0);
    }
}
