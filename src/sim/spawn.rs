//! Timed spawning of hazards, pickups and coal
//!
//! Regular spawns happen at the top edge at a padded random x. Everything
//! here is suspended while a boss is on the field.

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, Hazard, HazardShot, PickupKind, ShotKind};
use super::timer::Countdown;
use crate::consts::*;
use crate::padded_x;
use crate::tuning::roll_band;

/// Countdowns for the two independent spawn cycles
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    pub hazard_timer: Countdown,
    pub coal_timer: Countdown,
}

/// Run both spawn cycles for this frame
pub fn update_spawner(state: &mut GameState, dt: f32) {
    if state.boss.is_some() {
        return;
    }

    if state.spawner.hazard_timer.tick_done(dt) {
        spawn_hazard(state);
        let roll = state.roll();
        if let Some(kind) = roll_band(&state.tuning.pickup_bands, roll) {
            spawn_falling_pickup(state, kind);
        }
        let interval = state
            .tuning
            .spawn_curve
            .interval(state.elapsed, state.progression.level);
        state.spawner.hazard_timer.set(interval);
    }

    if state.spawner.coal_timer.tick_done(dt) {
        if state.roll() < state.tuning.coal_chance {
            spawn_coal(state);
        }
        state.spawner.coal_timer.set(state.tuning.coal_interval);
    }
}

/// A regular hazard at the top edge
pub fn spawn_hazard(state: &mut GameState) {
    let unit = state.viewport.unit();
    let size = unit * TREE_SCALE;
    let roll = state.roll();
    let x = padded_x(state.viewport.width, size, roll);
    spawn_hazard_at(state, Vec2::new(x, -size));
}

/// A regular hazard at a given position
pub fn spawn_hazard_at(state: &mut GameState, pos: Vec2) {
    let unit = state.viewport.unit();
    let speed = unit * state.rng.random_range(TREE_SPEED_BASE..TREE_SPEED_BASE + TREE_SPEED_SPREAD);
    let id = state.next_entity_id();
    state.hazards.push(Hazard {
        id,
        pos,
        size: unit * TREE_SCALE,
        speed,
        health: 1,
    });
}

/// A pickup dropping in from the top edge
pub fn spawn_falling_pickup(state: &mut GameState, kind: PickupKind) {
    let size = state.viewport.unit() * kind.scale();
    let roll = state.roll();
    let x = padded_x(state.viewport.width, size, roll);
    state.drop_pickup(kind, Vec2::new(x, -size));
}

pub fn spawn_coal(state: &mut GameState) {
    let unit = state.viewport.unit();
    let size = unit * COAL_SCALE;
    let roll = state.roll();
    let x = padded_x(state.viewport.width, size, roll);
    log::debug!("Coal incoming at x={:.0}", x);
    state.hazard_shots.push(HazardShot {
        kind: ShotKind::Coal,
        pos: Vec2::new(x, -size),
        size,
        vel: Vec2::new(0.0, unit * COAL_SPEED),
    });
}

/// Roll the kill drop table at a kill location
pub fn roll_kill_drop(state: &mut GameState, pos: Vec2) {
    let roll = state.roll();
    if let Some(kind) = roll_band(&state.tuning.drop_table, roll) {
        state.drop_pickup(kind, pos);
    }
}
