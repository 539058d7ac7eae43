//! Selectable ammo types and their supply

use serde::{Deserialize, Serialize};

/// Projectile variants the player can load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmmoKind {
    /// Infinite supply, no special effect
    #[default]
    Standard,
    /// "Blue" ammo: steers toward the nearest hazard
    Homing,
    /// "Red" ammo: double damage plus area damage on impact
    Explosive,
}

impl AmmoKind {
    pub const CYCLE: [AmmoKind; 3] = [AmmoKind::Standard, AmmoKind::Homing, AmmoKind::Explosive];
}

/// Ammo counts and the currently loaded kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmmoBelt {
    pub selected: AmmoKind,
    pub homing: u32,
    pub explosive: u32,
}

impl AmmoBelt {
    /// Remaining rounds; `None` means unlimited
    pub fn count(&self, kind: AmmoKind) -> Option<u32> {
        match kind {
            AmmoKind::Standard => None,
            AmmoKind::Homing => Some(self.homing),
            AmmoKind::Explosive => Some(self.explosive),
        }
    }

    fn count_mut(&mut self, kind: AmmoKind) -> Option<&mut u32> {
        match kind {
            AmmoKind::Standard => None,
            AmmoKind::Homing => Some(&mut self.homing),
            AmmoKind::Explosive => Some(&mut self.explosive),
        }
    }

    pub fn available(&self, kind: AmmoKind) -> bool {
        self.count(kind).is_none_or(|n| n > 0)
    }

    pub fn grant(&mut self, kind: AmmoKind, amount: u32) {
        if let Some(n) = self.count_mut(kind) {
            *n = n.saturating_add(amount);
        }
    }

    /// Take one round of the loaded kind for a shot.
    ///
    /// An empty special kind falls back to standard ammo first.
    pub fn take_round(&mut self) -> AmmoKind {
        if !self.available(self.selected) {
            log::debug!("{:?} ammo empty, falling back to standard", self.selected);
            self.selected = AmmoKind::Standard;
        }
        let kind = self.selected;
        if let Some(n) = self.count_mut(kind) {
            *n -= 1;
        }
        kind
    }

    /// Load the next kind with rounds left (standard is always available)
    pub fn cycle(&mut self) -> AmmoKind {
        let start = AmmoKind::CYCLE
            .iter()
            .position(|k| *k == self.selected)
            .unwrap_or(0);
        for step in 1..=AmmoKind::CYCLE.len() {
            let next = AmmoKind::CYCLE[(start + step) % AmmoKind::CYCLE.len()];
            if self.available(next) {
                self.selected = next;
                break;
            }
        }
        self.selected
    }
}
