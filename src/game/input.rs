//! Input Frames and Per-Tick Input Sets
//!
//! A player's input for one tick is a packed button mask. Actions trigger
//! on the press edge (pressed this tick, not held last tick); the held mask
//! is part of `PlayerState`, so edge detection replays identically.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::game::state::PlayerId;
use crate::game::weapon::WeaponKind;

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Button state for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Packed button bits, see the `FLAG_*` constants.
    pub buttons: u16,
}

impl InputFrame {
    /// Move left
    pub const FLAG_LEFT: u16 = 1 << 0;
    /// Move right
    pub const FLAG_RIGHT: u16 = 1 << 1;
    /// Up (aims the scythe chain)
    pub const FLAG_UP: u16 = 1 << 2;
    /// Down (motion inputs)
    pub const FLAG_DOWN: u16 = 1 << 3;
    /// Jump
    pub const FLAG_JUMP: u16 = 1 << 4;
    /// Light attack
    pub const FLAG_LIGHT: u16 = 1 << 5;
    /// Heavy attack
    pub const FLAG_HEAVY: u16 = 1 << 6;
    /// Grab / finisher
    pub const FLAG_GRAB: u16 = 1 << 7;
    /// Parry
    pub const FLAG_PARRY: u16 = 1 << 8;
    /// Tech
    pub const FLAG_TECH: u16 = 1 << 9;

    /// Create an empty frame.
    pub const fn new() -> Self {
        Self { buttons: 0 }
    }

    /// Create a frame from a button mask.
    pub const fn with_buttons(buttons: u16) -> Self {
        Self { buttons }
    }

    /// Check a button.
    #[inline]
    pub fn has(&self, flag: u16) -> bool {
        self.buttons & flag != 0
    }

    /// Set or clear a button.
    #[inline]
    pub fn set(&mut self, flag: u16, pressed: bool) {
        if pressed {
            self.buttons |= flag;
        } else {
            self.buttons &= !flag;
        }
    }

    /// OR another frame into this one.
    #[inline]
    pub fn merge(&mut self, other: InputFrame) {
        self.buttons |= other.buttons;
    }

    /// Buttons down in `self` that were up in `previous`.
    #[inline]
    pub fn pressed_since(&self, previous: InputFrame) -> InputFrame {
        InputFrame {
            buttons: self.buttons & !previous.buttons,
        }
    }

    /// Horizontal direction: -1, 0 or 1. Opposing directions cancel.
    #[inline]
    pub fn horizontal(&self) -> i32 {
        let left = self.has(Self::FLAG_LEFT) as i32;
        let right = self.has(Self::FLAG_RIGHT) as i32;
        right - left
    }

    /// Check if no button is down.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.buttons == 0
    }
}

// =============================================================================
// MOTION BUFFER
// =============================================================================

/// Ticks a recorded press stays matchable (0.25 s).
pub const INPUT_BUFFER_TICKS: u8 = 15;

const INPUT_BUFFER_CAPACITY: usize = 12;

/// A press the motion buffer tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Press {
    /// Left edge
    Left = 0,
    /// Right edge
    Right = 1,
    /// Up edge
    Up = 2,
    /// Down edge
    Down = 3,
    /// Light attack edge
    Light = 4,
    /// Heavy attack edge
    Heavy = 5,
}

impl Press {
    const FLAGS: [(u16, Press); 6] = [
        (InputFrame::FLAG_LEFT, Press::Left),
        (InputFrame::FLAG_RIGHT, Press::Right),
        (InputFrame::FLAG_UP, Press::Up),
        (InputFrame::FLAG_DOWN, Press::Down),
        (InputFrame::FLAG_LIGHT, Press::Light),
        (InputFrame::FLAG_HEAVY, Press::Heavy),
    ];

    /// The horizontal press pointing along a facing sign.
    #[inline]
    pub fn forward(facing_sign: i32) -> Press {
        if facing_sign < 0 { Press::Left } else { Press::Right }
    }
}

/// A recorded press and its remaining lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedPress {
    /// What was pressed
    pub press: Press,
    /// Ticks until it expires
    pub ticks_left: u8,
}

/// Recent press edges, oldest first.
///
/// Motion inputs match as subsequences, so unrelated presses in between
/// do not break a pattern. Lives in `PlayerState` and is snapshotted with it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBuffer {
    entries: Vec<BufferedPress>,
}

impl InputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one press with a full lifetime. The oldest entry is dropped
    /// when the buffer is full.
    pub fn push(&mut self, press: Press) {
        if self.entries.len() == INPUT_BUFFER_CAPACITY {
            self.entries.remove(0);
        }
        self.entries.push(BufferedPress { press, ticks_left: INPUT_BUFFER_TICKS });
    }

    /// Record every tracked press edge in `pressed`.
    pub fn record(&mut self, pressed: InputFrame) {
        for (flag, press) in Press::FLAGS {
            if pressed.has(flag) {
                self.push(press);
            }
        }
    }

    /// Age every entry by one tick and drop the expired ones.
    pub fn age(&mut self) {
        for entry in &mut self.entries {
            entry.ticks_left = entry.ticks_left.saturating_sub(1);
        }
        self.entries.retain(|entry| entry.ticks_left > 0);
    }

    /// Match `pattern` as a subsequence of the buffer. On a match, every
    /// entry up to and including the final matched press is removed.
    pub fn consume(&mut self, pattern: &[Press]) -> bool {
        if pattern.is_empty() {
            return false;
        }
        let mut next = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.press == pattern[next] {
                next += 1;
                if next == pattern.len() {
                    self.entries.drain(..=i);
                    return true;
                }
            }
        }
        false
    }

    /// Buffered presses, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BufferedPress> {
        self.entries.iter()
    }

    /// Number of buffered presses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every press.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// WORLD COMMANDS
// =============================================================================

/// Roster and arena changes, applied at the start of a tick.
///
/// Commands are recorded with the tick they apply to so resimulation replays
/// joins and leaves at the same point in the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldCommand {
    /// Player connects with a weapon
    Join {
        /// Joining player
        player_id: PlayerId,
        /// Starting weapon
        weapon: WeaponKind,
    },
    /// Player disconnects
    Leave {
        /// Leaving player
        player_id: PlayerId,
    },
    /// Switch weapon (only while idle)
    EquipWeapon {
        /// Player
        player_id: PlayerId,
        /// New weapon
        weapon: WeaponKind,
    },
    /// Re-initialize boss and players
    ResetArena,
}

// =============================================================================
// TICK INPUTS
// =============================================================================

/// Everything the step function consumes for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInputs {
    /// Per-player frames (BTreeMap for deterministic order)
    pub frames: BTreeMap<PlayerId, InputFrame>,
    /// Commands in arrival order
    pub commands: Vec<WorldCommand>,
}

impl TickInputs {
    /// Create an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// OR a frame into a player's input. Returns true if anything changed.
    pub fn merge_frame(&mut self, player_id: PlayerId, frame: InputFrame) -> bool {
        let entry = self.frames.entry(player_id).or_default();
        let before = *entry;
        entry.merge(frame);
        *entry != before
    }

    /// Frame for a player, empty if none arrived.
    pub fn frame_for(&self, player_id: &PlayerId) -> InputFrame {
        self.frames.get(player_id).copied().unwrap_or_default()
    }

    /// Append a command.
    pub fn push_command(&mut self, command: WorldCommand) {
        self.commands.push(command);
    }

    /// Drop a player's frame. Returns true if one was present.
    pub fn discard_player(&mut self, player_id: &PlayerId) -> bool {
        self.frames.remove(player_id).is_some()
    }

    /// Check if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.frames.values().all(InputFrame::is_idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_flags() {
        let mut frame = InputFrame::new();
        assert!(frame.is_idle());

        frame.set(InputFrame::FLAG_LIGHT, true);
        frame.set(InputFrame::FLAG_RIGHT, true);
        assert!(frame.has(InputFrame::FLAG_LIGHT));
        assert_eq!(frame.horizontal(), 1);

        frame.set(InputFrame::FLAG_LEFT, true);
        assert_eq!(frame.horizontal(), 0);

        frame.set(InputFrame::FLAG_LIGHT, false);
        assert!(!frame.has(InputFrame::FLAG_LIGHT));
    }

    #[test]
    fn test_press_edge() {
        let held = InputFrame::with_buttons(InputFrame::FLAG_LIGHT);
        let now = InputFrame::with_buttons(InputFrame::FLAG_LIGHT | InputFrame::FLAG_JUMP);
        let pressed = now.pressed_since(held);
        assert!(pressed.has(InputFrame::FLAG_JUMP));
        assert!(!pressed.has(InputFrame::FLAG_LIGHT));
    }

    #[test]
    fn test_buffer_matches_subsequence_and_drops_prefix() {
        let mut buffer = InputBuffer::new();
        buffer.push(Press::Light);
        buffer.push(Press::Down);
        buffer.push(Press::Up);
        buffer.push(Press::Right);
        buffer.push(Press::Heavy);
        buffer.push(Press::Light);

        assert!(!buffer.consume(&[Press::Right, Press::Down]));
        assert!(buffer.consume(&[Press::Down, Press::Right, Press::Heavy]));
        // Only the trailing light survives
        let left: Vec<Press> = buffer.iter().map(|e| e.press).collect();
        assert_eq!(left, vec![Press::Light]);
        assert!(!buffer.consume(&[]));
    }

    #[test]
    fn test_buffer_entries_expire() {
        let mut buffer = InputBuffer::new();
        buffer.record(InputFrame::with_buttons(InputFrame::FLAG_DOWN | InputFrame::FLAG_LIGHT | InputFrame::FLAG_JUMP));
        assert_eq!(buffer.len(), 2);

        for _ in 0..INPUT_BUFFER_TICKS - 1 {
            buffer.age();
        }
        assert_eq!(buffer.len(), 2);
        buffer.age();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_capacity_drops_oldest() {
        let mut buffer = InputBuffer::new();
        buffer.push(Press::Down);
        for _ in 0..INPUT_BUFFER_CAPACITY {
            buffer.push(Press::Left);
        }
        assert_eq!(buffer.len(), INPUT_BUFFER_CAPACITY);
        assert!(buffer.iter().all(|e| e.press == Press::Left));
        assert_eq!(Press::forward(-1), Press::Left);
        assert_eq!(Press::forward(1), Press::Right);
    }

    #[test]
    fn test_merge_reports_changes() {
        let id = PlayerId::new([1; 16]);
        let mut inputs = TickInputs::new();

        assert!(inputs.merge_frame(id, InputFrame::with_buttons(InputFrame::FLAG_JUMP)));
        // Same buttons again: no change
        assert!(!inputs.merge_frame(id, InputFrame::with_buttons(InputFrame::FLAG_JUMP)));
        assert!(inputs.merge_frame(id, InputFrame::with_buttons(InputFrame::FLAG_TECH)));

        let frame = inputs.frame_for(&id);
        assert!(frame.has(InputFrame::FLAG_JUMP) && frame.has(InputFrame::FLAG_TECH));
        assert!(inputs.frame_for(&PlayerId::new([2; 16])).is_idle());

        assert!(inputs.discard_player(&id));
        assert!(inputs.is_empty());
    }
}
