//! Weapon Move Tables
//!
//! Every weapon shares one state machine; weapons differ only in the data
//! below. A move is looked up by `(WeaponKind, MoveSlot)` and never stored
//! by value, so snapshots carry two small enums instead of frame data.
//!
//! Frame data is authored in ticks at 60 Hz. Geometry is relative to the
//! owner's feet and mirrored by facing (see `Rect::from_offset`).

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, from_centi};
use crate::core::vec2::FixedVec2;

// =============================================================================
// MOVE DESCRIPTORS
// =============================================================================

/// Hit priority class. Higher beats lower; equal clashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Fast, low-damage weapons
    Light = 1,
    /// Standard blades
    Normal = 2,
    /// Slow, heavy weapons and boss attacks
    Heavy = 3,
}

/// Hitbox placement relative to the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitboxShape {
    /// Near-edge distance forward and bottom-edge height
    pub offset: FixedVec2,
    /// Width and height
    pub size: FixedVec2,
}

/// One attack: timings, geometry and payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveData {
    /// Identifier used in logs
    pub name: &'static str,
    /// Ticks before the hitbox appears
    pub startup: u16,
    /// Ticks the hitbox is live
    pub active: u16,
    /// Ticks after the hitbox expires
    pub recovery: u16,
    /// Hitbox geometry
    pub hitbox: HitboxShape,
    /// Base damage
    pub damage: Fixed,
    /// Knockback impulse, x along the attacker's facing
    pub knockback: FixedVec2,
    /// Forces the target airborne
    pub launches: bool,
}

impl MoveData {
    /// Total length of the move in ticks.
    pub const fn total_ticks(&self) -> u16 {
        self.startup + self.active + self.recovery
    }
}

/// Position of a move inside a weapon's table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveSlot {
    /// Grounded light chain step
    Light(u8),
    /// Heavy attack
    Heavy,
    /// Airborne attack
    Air,
    /// Throw
    Grab,
    /// Down then light
    Launcher,
    /// Forward then heavy
    Smash,
    /// Down, forward, then light or heavy
    QuarterCircle,
}

/// Complete move set for one weapon.
#[derive(Debug)]
pub struct WeaponTable {
    /// Priority class for clash arbitration
    pub priority: Priority,
    /// Ticks after recovery during which the next light input continues the chain
    pub combo_window: u16,
    /// Light chain, step 0 first
    pub light: &'static [MoveData],
    /// Heavy attack
    pub heavy: MoveData,
    /// Air attack
    pub air: MoveData,
    /// Throw
    pub grab: MoveData,
    /// Down + light
    pub launcher: MoveData,
    /// Forward + heavy
    pub smash: MoveData,
    /// Quarter circle
    pub quarter_circle: MoveData,
}

// Compact constructor for the static tables; lengths and payloads in hundredths.
#[allow(clippy::too_many_arguments)]
const fn mv(
    name: &'static str,
    startup: u16,
    active: u16,
    recovery: u16,
    offset: (i32, i32),
    size: (i32, i32),
    damage: i32,
    knockback: (i32, i32),
    launches: bool,
) -> MoveData {
    MoveData {
        name,
        startup,
        active,
        recovery,
        hitbox: HitboxShape {
            offset: FixedVec2::new(from_centi(offset.0), from_centi(offset.1)),
            size: FixedVec2::new(from_centi(size.0), from_centi(size.1)),
        },
        damage: from_centi(damage),
        knockback: FixedVec2::new(from_centi(knockback.0), from_centi(knockback.1)),
        launches,
    }
}

// =============================================================================
// TABLES
// =============================================================================

static LONGSWORD_LIGHT: [MoveData; 4] = [
    mv("cleave", 6, 4, 10, (30, 40), (130, 100), 1500, (150, 0), false),
    mv("riposte", 6, 4, 11, (30, 40), (130, 100), 1600, (180, 0), false),
    mv("thrust", 8, 5, 12, (30, 60), (160, 60), 1800, (220, 0), false),
    mv("upswing", 9, 5, 16, (20, 20), (120, 180), 2000, (80, 350), true),
];

static LONGSWORD: WeaponTable = WeaponTable {
    priority: Priority::Normal,
    combo_window: 18,
    light: &LONGSWORD_LIGHT,
    heavy: mv("overhead", 14, 6, 20, (20, 0), (150, 200), 2800, (300, 50), false),
    air: mv("air_slash", 5, 5, 10, (20, 0), (120, 120), 900, (60, 100), false),
    grab: mv("pommel_throw", 5, 3, 18, (20, 20), (60, 140), 1000, (250, 250), true),
    launcher: mv("rising_edge", 8, 5, 16, (20, 20), (110, 180), 1400, (40, 420), true),
    smash: mv("lunge", 12, 6, 20, (30, 30), (180, 100), 2600, (420, 60), false),
    quarter_circle: mv("sword_wave", 10, 6, 18, (30, 30), (260, 80), 2200, (260, 120), false),
};

static KATANA_LIGHT: [MoveData; 4] = [
    mv("slash_1", 7, 5, 11, (30, 50), (110, 90), 1200, (120, 0), false),
    mv("slash_2", 7, 5, 11, (30, 50), (110, 90), 1400, (140, 0), false),
    mv("launcher", 8, 5, 14, (20, 20), (100, 180), 1000, (50, 380), true),
    mv("iaido", 10, 4, 18, (30, 50), (180, 60), 1600, (250, 50), false),
];

static KATANA: WeaponTable = WeaponTable {
    priority: Priority::Normal,
    combo_window: 13,
    light: &KATANA_LIGHT,
    heavy: mv("crescent", 12, 6, 18, (20, 20), (160, 140), 2200, (280, 80), false),
    air: mv("air_slash", 4, 5, 9, (20, 0), (110, 110), 900, (60, 100), false),
    grab: mv("shoulder_throw", 5, 3, 18, (20, 20), (60, 140), 1000, (250, 250), true),
    launcher: mv("tsubame", 7, 5, 14, (20, 20), (100, 180), 1200, (40, 400), true),
    smash: mv("dash_cut", 10, 5, 18, (30, 40), (200, 80), 2400, (380, 40), false),
    quarter_circle: mv("kaiten", 9, 6, 16, (20, 20), (220, 120), 2000, (200, 200), true),
};

static SCYTHE_LIGHT: [MoveData; 3] = [
    mv("reap", 12, 6, 18, (30, 30), (180, 120), 2200, (240, 0), false),
    mv("harvest", 13, 6, 20, (30, 30), (190, 120), 2400, (260, 40), false),
    mv("ground_slam", 16, 7, 24, (20, 0), (200, 80), 3000, (60, 400), true),
];

static SCYTHE: WeaponTable = WeaponTable {
    priority: Priority::Heavy,
    combo_window: 20,
    light: &SCYTHE_LIGHT,
    heavy: mv("gallows", 20, 8, 28, (20, 0), (220, 220), 3600, (350, 150), false),
    air: mv("falling_arc", 7, 6, 14, (10, 0), (160, 160), 1400, (80, 50), false),
    grab: mv("hook_throw", 6, 3, 20, (20, 20), (100, 140), 1200, (300, 200), true),
    launcher: mv("reaping_rise", 12, 6, 20, (20, 0), (150, 220), 1800, (40, 440), true),
    smash: mv("guillotine", 18, 8, 26, (30, 0), (240, 160), 3800, (460, 80), false),
    quarter_circle: mv("whirl", 14, 8, 22, (0, 0), (260, 160), 2600, (280, 120), false),
};

static FISTS_LIGHT: [MoveData; 4] = [
    mv("jab", 3, 3, 6, (30, 80), (80, 50), 600, (80, 0), false),
    mv("cross", 4, 3, 7, (30, 80), (85, 50), 700, (100, 0), false),
    mv("hook", 5, 3, 9, (30, 60), (90, 70), 900, (140, 0), false),
    mv("uppercut", 6, 4, 12, (20, 30), (80, 160), 1100, (40, 320), true),
];

static FISTS: WeaponTable = WeaponTable {
    priority: Priority::Light,
    combo_window: 12,
    light: &FISTS_LIGHT,
    heavy: mv("haymaker", 10, 4, 16, (30, 60), (100, 80), 1600, (300, 60), false),
    air: mv("knee", 3, 4, 8, (20, 20), (70, 80), 700, (40, 80), false),
    grab: mv("suplex", 4, 3, 16, (20, 20), (60, 140), 1200, (200, 300), true),
    launcher: mv("rising_knee", 5, 4, 11, (20, 30), (70, 150), 900, (30, 380), true),
    smash: mv("straight", 8, 4, 14, (30, 70), (100, 60), 1500, (400, 40), false),
    quarter_circle: mv("shoryu", 6, 5, 16, (10, 20), (80, 200), 1400, (60, 460), true),
};

// =============================================================================
// WEAPON KIND
// =============================================================================

/// Weapon identifier. Selecting a weapon is a table lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WeaponKind {
    /// Balanced blade, four-step chain ending in a launcher
    #[default]
    Longsword = 0,
    /// Fast blade with short combo window
    Katana = 1,
    /// Slow, heavy priority
    Scythe = 2,
    /// Fastest, light priority
    Fists = 3,
}

impl WeaponKind {
    /// All weapons, in id order.
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Longsword,
        WeaponKind::Katana,
        WeaponKind::Scythe,
        WeaponKind::Fists,
    ];

    /// Move table for this weapon.
    pub fn table(self) -> &'static WeaponTable {
        match self {
            WeaponKind::Longsword => &LONGSWORD,
            WeaponKind::Katana => &KATANA,
            WeaponKind::Scythe => &SCYTHE,
            WeaponKind::Fists => &FISTS,
        }
    }

    /// Priority class.
    #[inline]
    pub fn priority(self) -> Priority {
        self.table().priority
    }

    /// Resolve a slot to its move. Out-of-range chain steps wrap.
    pub fn resolve(self, slot: MoveSlot) -> &'static MoveData {
        let table = self.table();
        match slot {
            MoveSlot::Light(step) => &table.light[step as usize % table.light.len()],
            MoveSlot::Heavy => &table.heavy,
            MoveSlot::Air => &table.air,
            MoveSlot::Grab => &table.grab,
            MoveSlot::Launcher => &table.launcher,
            MoveSlot::Smash => &table.smash,
            MoveSlot::QuarterCircle => &table.quarter_circle,
        }
    }

    /// Number of steps in the light chain.
    pub fn chain_len(self) -> u8 {
        self.table().light.len() as u8
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Longsword => "longsword",
            WeaponKind::Katana => "katana",
            WeaponKind::Scythe => "scythe",
            WeaponKind::Fists => "fists",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};

    #[test]
    fn test_longsword_opener_payload() {
        let cleave = WeaponKind::Longsword.resolve(MoveSlot::Light(0));
        assert_eq!(cleave.damage, from_int(15));
        assert_eq!(cleave.knockback, FixedVec2::new(to_fixed(1.5), 0));
        assert!(!cleave.launches);
    }

    #[test]
    fn test_priority_ranking() {
        assert!(WeaponKind::Scythe.priority() > WeaponKind::Longsword.priority());
        assert_eq!(WeaponKind::Katana.priority(), WeaponKind::Longsword.priority());
        assert!(WeaponKind::Fists.priority() < WeaponKind::Katana.priority());
    }

    #[test]
    fn test_chain_steps_are_distinct_and_wrap() {
        for weapon in WeaponKind::ALL {
            let len = weapon.chain_len();
            assert!((2..=4).contains(&len));
            let first = weapon.resolve(MoveSlot::Light(0));
            let second = weapon.resolve(MoveSlot::Light(1));
            assert_ne!(first.name, second.name);
            assert_eq!(weapon.resolve(MoveSlot::Light(len)), first);
        }
    }

    #[test]
    fn test_directional_launchers_launch() {
        for weapon in WeaponKind::ALL {
            let launcher = weapon.resolve(MoveSlot::Launcher);
            assert!(launcher.launches, "{}", launcher.name);
            assert!(launcher.knockback.y > launcher.knockback.x);
            // The smash trades speed for horizontal carry
            let smash = weapon.resolve(MoveSlot::Smash);
            assert!(smash.knockback.x > weapon.resolve(MoveSlot::Heavy).knockback.x);
        }
    }

    #[test]
    fn test_every_move_has_frames() {
        for weapon in WeaponKind::ALL {
            let table = weapon.table();
            for step in 0..weapon.chain_len() {
                let m = weapon.resolve(MoveSlot::Light(step));
                assert!(m.startup > 0 && m.active > 0 && m.recovery > 0, "{}", m.name);
            }
            for m in [&table.heavy, &table.air, &table.grab, &table.launcher, &table.smash, &table.quarter_circle] {
                assert!(m.total_ticks() > 0, "{}", m.name);
                assert!(m.damage > 0);
            }
        }
    }
}
