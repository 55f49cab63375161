//! Game Logic Module
//!
//! All simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Input frames, per-tick input sets, roster commands
//! - `state`: World state, player and boss state
//! - `weapon`: Data-driven weapon move tables
//! - `physics`: Gravity, friction, floor/platform/wall resolution
//! - `combat`: Weapon state machine, hit arbitration, damage pipeline
//! - `boss`: Armor phases, break gauge, limbs, attack selection, finisher
//! - `tick`: Authoritative step function
//! - `events`: Discrete events for consumers

pub mod input;
pub mod state;
pub mod weapon;
pub mod physics;
pub mod combat;
pub mod boss;
pub mod tick;
pub mod events;

// Re-export key types
pub use input::{InputFrame, TickInputs, WorldCommand};
pub use state::{BossState, EntityId, Limb, PlayerId, PlayerState, WeaponState, WorldState};
pub use weapon::{MoveSlot, WeaponKind};
pub use tick::{SimConfig, TickResult, step};
pub use events::{GameEvent, GameEventData};
