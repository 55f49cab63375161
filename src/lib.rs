//! # Boss Arena Server
//!
//! Authoritative, deterministic tick simulation for a boss encounter fought
//! by a small group of players, with rollback reconciliation of late input.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BOSS ARENA SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rect.rs     - Axis-aligned boxes                        │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Buttons, motion buffer, commands          │
//! │  ├── state.rs    - World, player and boss state              │
//! │  ├── weapon.rs   - Data-driven move tables                   │
//! │  ├── physics.rs  - Gravity, friction, landing, wall-splat    │
//! │  ├── combat.rs   - Hitboxes, clash, parry, combos, juggles   │
//! │  ├── boss.rs     - Armor phases, limbs, break, finisher      │
//! │  ├── events.rs   - Discrete game events                      │
//! │  └── tick.rs     - The step function                         │
//! │                                                              │
//! │  netcode/        - Rollback (deterministic)                  │
//! │  ├── snapshot.rs - Ring buffer of world snapshots            │
//! │  └── reconciler.rs - Late input, resimulation                │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Fixed-rate async session loop             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `game/` and `netcode/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from the seeded Xorshift128+ stored in the world
//!
//! Restoring a snapshot and replaying the same per-tick inputs reproduces
//! the same world bit for bit, which is what makes rollback safe.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod netcode;
pub mod network;

// Re-export commonly used types
pub use config::{ArenaConfig, ConfigError};
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rng::DeterministicRng;
pub use game::input::{InputFrame, TickInputs, WorldCommand};
pub use game::state::{BossState, PlayerId, PlayerState, WorldState};
pub use game::tick::{SimConfig, step};
pub use netcode::{InputDisposition, InputReconciler, InputRejected, SnapshotStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Default snapshot retention (2 seconds @ 60 Hz)
pub const SNAPSHOT_WINDOW: usize = 120;
