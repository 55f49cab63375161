//! Core deterministic primitives.
//!
//! Everything in this module is integer-only and platform independent.
//! The simulation in `game/` is built exclusively on these types.

pub mod fixed;
pub mod vec2;
pub mod rect;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use rect::Rect;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
