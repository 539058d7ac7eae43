//! Persisted player profile
//!
//! High score, spendable currency, unlocked characters, the selected
//! character and one-time unlock flags. Every value lives under its own key so
//! a corrupt entry only resets itself.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use thiserror::Error;

use crate::persistence::{KeyValueStore, StoreError};
use crate::sim::characters::Character;

pub const KEY_HIGH_SCORE: &str = "highScore";
pub const KEY_TOTAL_POINTS: &str = "totalPoints";
pub const KEY_UNLOCKED: &str = "unlockedCharacters";
pub const KEY_SELECTED: &str = "selectedCharacter";
pub const KEY_COMPANIONS: &str = "companionsUnlocked";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{0} is locked")]
    Locked(&'static str),
    #[error("not enough points: costs {cost}, have {available}")]
    InsufficientPoints { cost: u64, available: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub high_score: u64,
    /// Spendable currency; grows with every point scored
    pub total_points: u64,
    pub unlocked: BTreeSet<Character>,
    pub selected: Character,
    pub companions_unlocked: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            high_score: 0,
            total_points: 0,
            unlocked: BTreeSet::from([Character::Santa]),
            selected: Character::Santa,
            companions_unlocked: false,
        }
    }
}

/// Parse a stored scalar, falling back on corrupt data
fn read_parsed<T: FromStr>(store: &impl KeyValueStore, key: &str, default: T) -> T {
    match store.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Corrupt value for {}: {:?}, using default", key, raw);
            default
        }),
    }
}

fn read_unlocked(store: &impl KeyValueStore) -> BTreeSet<Character> {
    let mut unlocked = BTreeSet::from([Character::Santa]);
    let Some(raw) = store.get(KEY_UNLOCKED) else {
        return unlocked;
    };
    match serde_json::from_str::<BTreeMap<String, bool>>(&raw) {
        Ok(map) => {
            unlocked.extend(
                map.into_iter()
                    .filter(|(_, owned)| *owned)
                    .filter_map(|(key, _)| Character::from_key(&key)),
            );
        }
        Err(e) => log::warn!("Corrupt unlock set, resetting: {}", e),
    }
    unlocked
}

impl Profile {
    /// Load from a store. Never fails: bad values fall back to the baseline.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let unlocked = read_unlocked(store);
        let selected = store
            .get(KEY_SELECTED)
            .and_then(|key| Character::from_key(&key))
            .filter(|c| unlocked.contains(c))
            .unwrap_or_default();
        let profile = Self {
            high_score: read_parsed(store, KEY_HIGH_SCORE, 0),
            total_points: read_parsed(store, KEY_TOTAL_POINTS, 0),
            unlocked,
            selected,
            companions_unlocked: read_parsed(store, KEY_COMPANIONS, false),
        };
        log::info!(
            "Profile loaded: best {}, {} points, {} characters",
            profile.high_score,
            profile.total_points,
            profile.unlocked.len()
        );
        profile
    }

    /// Write every field
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(KEY_HIGH_SCORE, &self.high_score.to_string())?;
        store.set(KEY_TOTAL_POINTS, &self.total_points.to_string())?;
        self.save_unlocks(store)?;
        store.set(KEY_SELECTED, self.selected.key())?;
        store.set(KEY_COMPANIONS, &self.companions_unlocked.to_string())?;
        Ok(())
    }

    fn save_unlocks(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        let map: BTreeMap<&str, bool> = self.unlocked.iter().map(|c| (c.key(), true)).collect();
        let json = serde_json::to_string(&map).map_err(|e| StoreError::Write {
            key: KEY_UNLOCKED.to_string(),
            reason: e.to_string(),
        })?;
        store.set(KEY_UNLOCKED, &json)
    }

    /// Persist only the currency (the hot checkpoint during play)
    pub fn save_points(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(KEY_TOTAL_POINTS, &self.total_points.to_string())
    }

    pub fn is_unlocked(&self, character: Character) -> bool {
        self.unlocked.contains(&character)
    }

    /// Whether `character` can be selected right now (owned or affordable)
    pub fn can_choose(&self, character: Character) -> bool {
        self.is_unlocked(character) || self.total_points >= character.cost()
    }

    /// Select a character, buying it first if needed.
    ///
    /// Returns true if this was a purchase. Nothing changes on error.
    pub fn choose(&mut self, character: Character) -> Result<bool, ProfileError> {
        let purchased = if self.is_unlocked(character) {
            false
        } else {
            let cost = character.cost();
            if self.total_points < cost {
                return Err(ProfileError::InsufficientPoints {
                    cost,
                    available: self.total_points,
                });
            }
            self.total_points -= cost;
            self.unlocked.insert(character);
            log::info!("Purchased {} for {} points", character.name(), cost);
            true
        };
        self.selected = character;
        Ok(purchased)
    }

    /// Select an already-owned character without buying
    pub fn select_owned(&mut self, character: Character) -> Result<(), ProfileError> {
        if !self.is_unlocked(character) {
            return Err(ProfileError::Locked(character.name()));
        }
        self.selected = character;
        Ok(())
    }

    /// Record a finished run's score. Returns true on a new best.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_empty_store_gives_baseline() {
        let profile = Profile::load(&MemoryStore::new());
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let store = MemoryStore::with_values([
            (KEY_HIGH_SCORE, "lots"),
            (KEY_TOTAL_POINTS, "1500"),
            (KEY_UNLOCKED, "{not json"),
            (KEY_SELECTED, "frosty"),
            (KEY_COMPANIONS, "maybe"),
        ]);
        let profile = Profile::load(&store);
        assert_eq!(profile.high_score, 0);
        assert_eq!(profile.total_points, 1500);
        assert_eq!(profile.unlocked, BTreeSet::from([Character::Santa]));
        // Frosty was never unlocked, so the selection resets
        assert_eq!(profile.selected, Character::Santa);
        assert!(!profile.companions_unlocked);
    }

    #[test]
    fn test_reads_object_unlock_format() {
        let store = MemoryStore::with_values([
            (KEY_UNLOCKED, r#"{"santa":true,"msClaus":true,"kasie":false,"grinch":true}"#),
            (KEY_SELECTED, "msClaus"),
        ]);
        let profile = Profile::load(&store);
        assert_eq!(
            profile.unlocked,
            BTreeSet::from([Character::Santa, Character::MsClaus])
        );
        assert_eq!(profile.selected, Character::MsClaus);
    }

    #[test]
    fn test_purchase_round_trip() {
        let mut store = MemoryStore::new();
        let profile = Profile {
            total_points: 2500,
            ..Profile::default()
        };
        profile.save(&mut store).unwrap();

        let before = Profile::load(&store).total_points;
        let mut profile = Profile::load(&store);
        assert_eq!(profile.choose(Character::Frosty), Ok(true));
        profile.save(&mut store).unwrap();

        let reloaded = Profile::load(&store);
        assert_eq!(reloaded.total_points, before - Character::Frosty.cost());
        assert!(reloaded.is_unlocked(Character::Frosty));
        assert_eq!(reloaded.selected, Character::Frosty);
    }

    #[test]
    fn test_unaffordable_purchase_changes_nothing() {
        let mut profile = Profile {
            total_points: 999,
            ..Profile::default()
        };
        let err = profile.choose(Character::MsClaus).unwrap_err();
        assert_eq!(
            err,
            ProfileError::InsufficientPoints {
                cost: 1000,
                available: 999
            }
        );
        assert_eq!(profile.total_points, 999);
        assert_eq!(profile.selected, Character::Santa);
        assert!(!profile.can_choose(Character::MsClaus));
    }

    #[test]
    fn test_owned_character_is_free() {
        let mut profile = Profile::default();
        profile.unlocked.insert(Character::Kasie);
        assert_eq!(profile.choose(Character::Kasie), Ok(false));
        assert_eq!(profile.total_points, 0);
        assert_eq!(
            profile.select_owned(Character::Frosty),
            Err(ProfileError::Locked("Frosty"))
        );
    }

    #[test]
    fn test_record_score() {
        let mut profile = Profile::default();
        assert!(profile.record_score(40));
        assert!(!profile.record_score(40));
        assert!(!profile.record_score(10));
        assert_eq!(profile.high_score, 40);
    }

    #[test]
    fn test_save_failure_surfaces() {
        let mut store = MemoryStore::read_only();
        let err: ProfileError = Profile::default().save(&mut store).unwrap_err().into();
        assert_eq!(err, ProfileError::Store(StoreError::Unavailable));
    }
}
