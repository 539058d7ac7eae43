//! One player's game session
//!
//! Owns the persisted profile, the frame clock and the simulation. Hosts call
//! `frame` once per display refresh and draw from `snapshot`. Persistence
//! happens only at checkpoints: pickups, stars, boss defeats, unlocks,
//! purchases and game over.

use crate::persistence::{KeyValueStore, StoreError};
use crate::profile::{Profile, ProfileError};
use crate::sim::characters::Character;
use crate::sim::clock::SimClock;
use crate::sim::snapshot::{RenderSink, RenderSnapshot};
use crate::sim::state::{GameEvent, GamePhase, GameState, RunSetup, Viewport};
use crate::sim::tick::{TickInput, tick};
use crate::tuning::Tuning;

/// What a batch of events requires from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Checkpoint {
    None,
    Points,
    Full,
}

pub struct Session<S: KeyValueStore> {
    store: S,
    profile: Profile,
    clock: SimClock,
    state: GameState,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S, seed: u64, viewport: Viewport, tuning: Tuning) -> Self {
        let profile = Profile::load(&store);
        let clock = SimClock::new(tuning.max_frame_dt);
        Self {
            store,
            profile,
            clock,
            state: GameState::new(seed, viewport, tuning),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Start a run with the selected character and persisted unlocks
    pub fn start_run(&mut self) {
        let setup = RunSetup {
            character: self.profile.selected,
            currency: self.profile.total_points,
            companions_unlocked: self.profile.companions_unlocked,
            high_score: self.profile.high_score,
        };
        self.clock.reset();
        self.state.start_run(setup);
    }

    /// Advance one display frame. Returns the events raised during it.
    pub fn frame(&mut self, timestamp_ms: f64, input: &TickInput) -> Vec<GameEvent> {
        let dt = self.clock.tick(timestamp_ms);
        tick(&mut self.state, input, dt);
        let events = self.state.drain_events();
        self.checkpoint(&events);
        events
    }

    fn checkpoint(&mut self, events: &[GameEvent]) {
        let mut needed = Checkpoint::None;
        for event in events {
            let level = match event {
                GameEvent::PickupCollected(_)
                | GameEvent::StarCollected { .. }
                | GameEvent::BossDefeated => Checkpoint::Points,
                GameEvent::CompanionsUnlocked => {
                    self.profile.companions_unlocked = true;
                    Checkpoint::Full
                }
                GameEvent::GameOver { score, .. } => {
                    self.profile.record_score(*score);
                    Checkpoint::Full
                }
                _ => Checkpoint::None,
            };
            needed = needed.max(level);
        }
        if needed == Checkpoint::None {
            return;
        }

        self.profile.total_points = self.state.progression.currency;
        let result = match needed {
            Checkpoint::Full => self.profile.save(&mut self.store),
            _ => self.profile.save_points(&mut self.store),
        };
        if let Err(e) = result {
            log::warn!("Failed to persist profile: {}", e);
        }
    }

    /// Select (and if needed buy) a character, persisting the result.
    ///
    /// On a storage error the in-memory profile keeps the change.
    pub fn choose_character(&mut self, character: Character) -> Result<bool, ProfileError> {
        let purchased = self.profile.choose(character)?;
        self.state.progression.currency = self.profile.total_points;
        self.persist()?;
        Ok(purchased)
    }

    /// Switch to an owned character. Never spends points.
    pub fn select_character(&mut self, character: Character) -> Result<(), ProfileError> {
        self.profile.select_owned(character)?;
        self.persist()?;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.profile.save(&mut self.store)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.state.resize(viewport);
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state)
    }

    pub fn render(&self, sink: &mut impl RenderSink) {
        sink.draw(&self.snapshot());
    }
}
