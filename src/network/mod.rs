//! Network Layer
//!
//! Wire protocol and the async session loop.
//! This layer is **non-deterministic** - all game logic runs through `game/`.

pub mod protocol;
pub mod session;

pub use protocol::{
    ButtonState, ClientMessage, InputMessage, ProtocolError, ServerMessage, StateBroadcast,
};
pub use session::{ArenaSession, SessionCommand, SessionError, SessionHandle};
