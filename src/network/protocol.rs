//! Protocol Messages
//!
//! Wire format between clients and the arena session.
//! Messages are JSON for debugging ease; the flat per-tick structs also
//! have a bincode encoding for production.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::weapon::WeaponKind;

/// Protocol encode/decode failure.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Malformed or unexpected JSON.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed binary frame.
    #[error("binary: {0}")]
    Binary(#[from] bincode::Error),
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the arena.
    Join {
        /// Starting weapon
        #[serde(default)]
        weapon: WeaponKind,
    },

    /// Player input for a tick.
    Input(InputMessage),

    /// Switch weapon.
    Equip {
        /// New weapon
        weapon: WeaponKind,
    },

    /// Player is leaving.
    Leave,
}

/// Per-tick input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Tick the client believes is current.
    pub tick: u32,
    /// Buttons held.
    #[serde(default)]
    pub buttons: ButtonState,
}

impl InputMessage {
    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Held buttons. Missing fields read as released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonState {
    /// Walk left
    pub left: bool,
    /// Walk right
    pub right: bool,
    /// Up
    pub up: bool,
    /// Down
    pub down: bool,
    /// Jump
    pub jump: bool,
    /// Light attack
    pub light_attack: bool,
    /// Heavy attack
    pub heavy_attack: bool,
    /// Grab
    pub grab: bool,
    /// Parry
    pub parry: bool,
    /// Tech
    pub tech: bool,
}

impl ButtonState {
    /// Convert to InputFrame for game simulation.
    pub fn to_input_frame(&self) -> InputFrame {
        let mut frame = InputFrame::new();
        frame.set(InputFrame::FLAG_LEFT, self.left);
        frame.set(InputFrame::FLAG_RIGHT, self.right);
        frame.set(InputFrame::FLAG_UP, self.up);
        frame.set(InputFrame::FLAG_DOWN, self.down);
        frame.set(InputFrame::FLAG_JUMP, self.jump);
        frame.set(InputFrame::FLAG_LIGHT, self.light_attack);
        frame.set(InputFrame::FLAG_HEAVY, self.heavy_attack);
        frame.set(InputFrame::FLAG_GRAB, self.grab);
        frame.set(InputFrame::FLAG_PARRY, self.parry);
        frame.set(InputFrame::FLAG_TECH, self.tech);
        frame
    }

    /// Buttons held in a frame.
    pub fn from_input_frame(frame: InputFrame) -> Self {
        Self {
            left: frame.has(InputFrame::FLAG_LEFT),
            right: frame.has(InputFrame::FLAG_RIGHT),
            up: frame.has(InputFrame::FLAG_UP),
            down: frame.has(InputFrame::FLAG_DOWN),
            jump: frame.has(InputFrame::FLAG_JUMP),
            light_attack: frame.has(InputFrame::FLAG_LIGHT),
            heavy_attack: frame.has(InputFrame::FLAG_HEAVY),
            grab: frame.has(InputFrame::FLAG_GRAB),
            parry: frame.has(InputFrame::FLAG_PARRY),
            tech: frame.has(InputFrame::FLAG_TECH),
        }
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Join accepted.
    Welcome {
        /// Assigned player id (UUID string)
        player_id: String,
        /// Tick the join applies to
        tick: u32,
        /// Ticks per second
        tick_rate: u32,
    },

    /// Committed world state (every tick).
    State(StateBroadcast),

    /// Discrete game event.
    Event(GameEvent),

    /// Input was not applied.
    InputRejected {
        /// Tag on the rejected input
        tick: u32,
        /// Human-readable reason
        reason: String,
    },

    /// Server is shutting down.
    Shutdown {
        /// Reason
        reason: String,
    },
}

/// Per-tick state broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBroadcast {
    /// Committed tick (the next one to be simulated).
    pub tick: u32,
    /// Players in id order.
    pub players: Vec<PlayerSnapshot>,
    /// The boss.
    pub boss: BossSnapshot,
    /// Hex SHA-256 of the world, for desync checks.
    pub state_hash: String,
}

impl StateBroadcast {
    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Player state in a broadcast. Fixed-point values are converted to floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Player id (UUID string)
    pub id: String,
    /// Feet x
    pub x: f32,
    /// Feet y
    pub y: f32,
    /// Velocity x
    pub vx: f32,
    /// Velocity y
    pub vy: f32,
    /// Health
    pub health: f32,
    /// -1 left, +1 right
    pub facing: i8,
    /// Equipped weapon
    pub weapon: WeaponKind,
    /// Weapon state name
    pub weapon_state: String,
    /// Hits taken in the current combo
    pub combo_counter: u32,
    /// Airborne hits since landing
    pub juggle_count: u32,
    /// Standing on ground
    pub on_ground: bool,
}

/// Boss state in a broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossSnapshot {
    /// Feet x
    pub x: f32,
    /// Feet y
    pub y: f32,
    /// Health
    pub health: f32,
    /// Armor phase
    pub phase: u8,
    /// Break stagger active
    pub staggered: bool,
    /// Limb durability by wire name
    pub limbs: BTreeMap<String, LimbSnapshot>,
}

/// Limb durability in a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimbSnapshot {
    /// Remaining durability
    pub health: f32,
    /// Broken
    pub broken: bool,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}
