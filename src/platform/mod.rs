//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input polling (keyboard, touch joysticks)
//! - Storage (LocalStorage on web)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod storage;

pub use input::{InputState, Key, map_key};
#[cfg(target_arch = "wasm32")]
pub use storage::WebStorage;
