//! Playable characters

use serde::{Deserialize, Serialize};

/// How a character's trigger turns into projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireStyle {
    /// One shot straight up
    Straight,
    /// Two shots drifting left and right
    DualDiagonal,
    /// One shot along the aim stick, fired automatically while aiming
    Aimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Character {
    #[default]
    Santa,
    MsClaus,
    Frosty,
    Kasie,
}

impl Character {
    pub const ALL: [Character; 4] = [
        Character::Santa,
        Character::MsClaus,
        Character::Frosty,
        Character::Kasie,
    ];

    /// Persisted identifier
    pub fn key(&self) -> &'static str {
        match self {
            Character::Santa => "santa",
            Character::MsClaus => "msClaus",
            Character::Frosty => "frosty",
            Character::Kasie => "kasie",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Character::Santa => "Santa",
            Character::MsClaus => "Ms. Claus",
            Character::Frosty => "Frosty",
            Character::Kasie => "Kasie",
        }
    }

    /// Unlock price in currency
    pub fn cost(&self) -> u64 {
        match self {
            Character::Santa => 0,
            Character::MsClaus => 1000,
            Character::Frosty => 2000,
            Character::Kasie => 10000,
        }
    }

    pub fn move_speed(&self) -> f32 {
        match self {
            Character::Santa | Character::Frosty => 1.0,
            Character::MsClaus => 1.3,
            Character::Kasie => 1.6,
        }
    }

    pub fn fire_rate(&self) -> f32 {
        match self {
            Character::MsClaus => 1.5,
            _ => 1.0,
        }
    }

    pub fn fire_style(&self) -> FireStyle {
        match self {
            Character::Frosty => FireStyle::DualDiagonal,
            Character::Kasie => FireStyle::Aimed,
            _ => FireStyle::Straight,
        }
    }

    /// Footprint relative to the viewport unit
    pub fn scale(&self) -> f32 {
        match self {
            Character::Santa | Character::MsClaus => 0.24,
            Character::Frosty => 0.26,
            Character::Kasie => 0.22,
        }
    }

    pub fn blurb(&self) -> &'static str {
        match self {
            Character::Santa => "Classic hero",
            Character::MsClaus => "Faster movement & shooting",
            Character::Frosty => "Shoots diagonal ornaments",
            Character::Kasie => "Joystick firing, fastest",
        }
    }
}
