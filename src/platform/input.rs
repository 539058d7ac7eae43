//! Polled input state
//!
//! Held keys and analog sticks are sampled every frame. Fire, ammo cycling and
//! pause are latched on press and consumed by the next frame, so a tap is
//! never lost between two display refreshes.

use glam::Vec2;

use crate::sim::tick::TickInput;

/// Logical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    AimLeft,
    AimRight,
    AimUp,
    AimDown,
    Fire,
    CycleAmmo,
    Pause,
    Autopilot,
}

/// Map a DOM `KeyboardEvent.key` value
pub fn map_key(key: &str) -> Option<Key> {
    let key = match key {
        "ArrowLeft" | "a" | "A" => Key::Left,
        "ArrowRight" | "d" | "D" => Key::Right,
        "ArrowUp" | "w" | "W" => Key::Up,
        "ArrowDown" | "s" | "S" => Key::Down,
        "j" | "J" => Key::AimLeft,
        "l" | "L" => Key::AimRight,
        "i" | "I" => Key::AimUp,
        "k" | "K" => Key::AimDown,
        " " | "Enter" => Key::Fire,
        "q" | "Q" | "Shift" => Key::CycleAmmo,
        "Escape" | "p" | "P" => Key::Pause,
        "t" | "T" => Key::Autopilot,
        _ => return None,
    };
    Some(key)
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

fn clamp_axes(v: Vec2) -> Vec2 {
    v.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: [bool; 8],
    stick: Vec2,
    aim_stick: Vec2,
    fire_pressed: bool,
    cycle_pressed: bool,
    pause_pressed: bool,
    pub autopilot: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn held_index(key: Key) -> Option<usize> {
        match key {
            Key::Left => Some(0),
            Key::Right => Some(1),
            Key::Up => Some(2),
            Key::Down => Some(3),
            Key::AimLeft => Some(4),
            Key::AimRight => Some(5),
            Key::AimUp => Some(6),
            Key::AimDown => Some(7),
            _ => None,
        }
    }

    /// Key pressed. `repeat` is the browser's auto-repeat flag.
    pub fn key_down(&mut self, key: Key, repeat: bool) {
        if let Some(i) = Self::held_index(key) {
            self.held[i] = true;
            return;
        }
        if repeat {
            return;
        }
        match key {
            Key::Fire => self.fire_pressed = true,
            Key::CycleAmmo => self.cycle_pressed = true,
            Key::Pause => self.pause_pressed = true,
            Key::Autopilot => {
                self.autopilot = !self.autopilot;
                log::info!("Autopilot: {}", self.autopilot);
            }
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if let Some(i) = Self::held_index(key) {
            self.held[i] = false;
        }
    }

    /// Left analog stick (touch joystick), each axis in [-1, 1]
    pub fn set_stick(&mut self, v: Vec2) {
        self.stick = clamp_axes(v);
    }

    /// Right analog stick, used by aimed characters
    pub fn set_aim_stick(&mut self, v: Vec2) {
        self.aim_stick = clamp_axes(v);
    }

    /// Request a pause on the next frame (tab hidden, window blur)
    pub fn request_pause(&mut self) {
        self.pause_pressed = true;
    }

    /// Drop held keys, e.g. when focus is lost and key-ups will never arrive
    pub fn release_all(&mut self) {
        self.held = [false; 8];
        self.stick = Vec2::ZERO;
        self.aim_stick = Vec2::ZERO;
    }

    /// Digital plus analog movement, each axis clamped, not normalized
    pub fn movement(&self) -> Vec2 {
        let h = &self.held;
        clamp_axes(Vec2::new(axis(h[0], h[1]), axis(h[2], h[3])) + self.stick)
    }

    pub fn aim(&self) -> Vec2 {
        let h = &self.held;
        clamp_axes(Vec2::new(axis(h[4], h[5]), axis(h[6], h[7])) + self.aim_stick)
    }

    /// Sample this frame's input and consume the latched presses
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            movement: self.movement(),
            aim: self.aim(),
            fire: std::mem::take(&mut self.fire_pressed),
            cycle_ammo: std::mem::take(&mut self.cycle_pressed),
            pause: std::mem::take(&mut self.pause_pressed),
            autopilot: self.autopilot,
        }
    }
}
