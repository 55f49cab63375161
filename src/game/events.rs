//! Game Events
//!
//! Discrete events generated during simulation. They are not part of the
//! per-tick state; consumers render, play or persist them.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::game::state::{EntityId, Limb, PlayerId};
use crate::game::weapon::WeaponKind;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Defeats processed first
    Defeat = 0,
    /// Hits, clashes, parries
    Combat = 1,
    /// Boss state changes
    Boss = 2,
    /// Finisher sequence
    Finisher = 3,
    /// Joins, leaves, resets
    Roster = 4,
    /// Lowest priority
    Other = 255,
}

/// Kind of tech escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechKind {
    /// Airborne hitstun cancel
    Air,
    /// Launch off a wall pin
    Wall,
}

/// Timed callout of the finisher sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinisherCue {
    /// Camera closes in
    Approach,
    /// First blow
    Strike,
    /// Limb severed
    Sever,
    /// Final impact
    Impact,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventData {
    /// Damage applied to a combatant
    HitLanded {
        attacker: EntityId,
        defender: EntityId,
        damage: Fixed,
        combo_counter: u32,
        launched: bool,
    },

    /// Two live hitboxes cancelled each other
    Clash { a: EntityId, b: EntityId },

    /// Defender parried the attacker
    Parried { attacker: EntityId, defender: EntityId },

    /// Grab connected
    Thrown { attacker: PlayerId, defender: PlayerId, damage: Fixed },

    /// Player hit a stage bound at speed
    WallSplat { player_id: PlayerId, damage: Fixed },

    /// Player escaped hitstun
    Teched { player_id: PlayerId, kind: TechKind },

    /// Scythe chain hooked an anchor
    GrappleAttached { player_id: PlayerId },

    /// Scythe chain let go
    GrappleReleased { player_id: PlayerId },

    /// Player health reached zero
    PlayerDefeated { player_id: PlayerId, by: Option<EntityId> },

    /// Player reset after defeat
    PlayerRespawned { player_id: PlayerId },

    /// Boss started a pattern
    BossAttackStarted { pattern: String, limb: Limb },

    /// Boss armor phase changed
    BossPhaseChanged { old_phase: u8, new_phase: u8 },

    /// A limb broke
    LimbBroken { limb: Limb, by: Option<PlayerId> },

    /// Break gauge filled
    BossStaggered { by: Option<PlayerId> },

    /// Break stagger ended
    BossRecovered,

    /// Finisher triggered
    FinisherStarted { player_id: PlayerId },

    /// Finisher callout
    FinisherCue { player_id: PlayerId, cue: FinisherCue },

    /// Finisher sequence ended
    FinisherEnded { player_id: PlayerId },

    /// Boss health reached zero
    BossDefeated { by: Option<PlayerId>, finisher: bool },

    /// Reward for a participating player
    RewardGranted { player_id: PlayerId, amount: u32 },

    /// Player joined the arena
    PlayerJoined { player_id: PlayerId, weapon: WeaponKind },

    /// Player left the arena
    PlayerLeft { player_id: PlayerId },

    /// Player switched weapon
    WeaponEquipped { player_id: PlayerId, weapon: WeaponKind },

    /// Arena re-initialized
    ArenaReset,
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Player involved (for tie-breaking)
    pub player_id: Option<PlayerId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let player_id = match &data {
            GameEventData::HitLanded { defender, .. } => defender.player(),
            GameEventData::Clash { a, .. } => a.player(),
            GameEventData::Parried { defender, .. } => defender.player(),
            GameEventData::Thrown { defender, .. } => Some(*defender),
            GameEventData::WallSplat { player_id, .. }
            | GameEventData::Teched { player_id, .. }
            | GameEventData::GrappleAttached { player_id }
            | GameEventData::GrappleReleased { player_id }
            | GameEventData::PlayerDefeated { player_id, .. }
            | GameEventData::PlayerRespawned { player_id }
            | GameEventData::FinisherStarted { player_id }
            | GameEventData::FinisherCue { player_id, .. }
            | GameEventData::FinisherEnded { player_id }
            | GameEventData::RewardGranted { player_id, .. }
            | GameEventData::PlayerJoined { player_id, .. }
            | GameEventData::PlayerLeft { player_id }
            | GameEventData::WeaponEquipped { player_id, .. } => Some(*player_id),
            GameEventData::LimbBroken { by, .. }
            | GameEventData::BossStaggered { by }
            | GameEventData::BossDefeated { by, .. } => *by,
            _ => None,
        };

        Self {
            tick,
            priority,
            player_id,
            data,
        }
    }

    /// Ordering key: (tick, priority, player).
    pub fn sort_key(&self) -> (u32, EventPriority, Option<PlayerId>) {
        (self.tick, self.priority, self.player_id)
    }

    /// Create hit landed event.
    pub fn hit_landed(
        tick: u32,
        attacker: EntityId,
        defender: EntityId,
        damage: Fixed,
        combo_counter: u32,
        launched: bool,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::HitLanded {
                attacker,
                defender,
                damage,
                combo_counter,
                launched,
            },
        )
    }

    /// Create clash event.
    pub fn clash(tick: u32, a: EntityId, b: EntityId) -> Self {
        Self::new(tick, EventPriority::Combat, GameEventData::Clash { a, b })
    }

    /// Create parried event.
    pub fn parried(tick: u32, attacker: EntityId, defender: EntityId) -> Self {
        Self::new(tick, EventPriority::Combat, GameEventData::Parried { attacker, defender })
    }

    /// Create player defeated event.
    pub fn player_defeated(tick: u32, player_id: PlayerId, by: Option<EntityId>) -> Self {
        Self::new(tick, EventPriority::Defeat, GameEventData::PlayerDefeated { player_id, by })
    }

    /// Create limb broken event.
    pub fn limb_broken(tick: u32, limb: Limb, by: Option<PlayerId>) -> Self {
        Self::new(tick, EventPriority::Boss, GameEventData::LimbBroken { limb, by })
    }

    /// Create boss phase changed event.
    pub fn boss_phase_changed(tick: u32, old_phase: u8, new_phase: u8) -> Self {
        Self::new(
            tick,
            EventPriority::Boss,
            GameEventData::BossPhaseChanged { old_phase, new_phase },
        )
    }

    /// Create reward granted event.
    pub fn reward_granted(tick: u32, player_id: PlayerId, amount: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::RewardGranted { player_id, amount },
        )
    }

    /// Create a grapple event.
    pub fn grapple(tick: u32, player_id: PlayerId, attached: bool) -> Self {
        let data = if attached {
            GameEventData::GrappleAttached { player_id }
        } else {
            GameEventData::GrappleReleased { player_id }
        };
        Self::new(tick, EventPriority::Other, data)
    }

    /// Create a finisher event.
    pub fn finisher(tick: u32, data: GameEventData) -> Self {
        Self::new(tick, EventPriority::Finisher, data)
    }

    /// Create a roster event.
    pub fn roster(tick: u32, data: GameEventData) -> Self {
        Self::new(tick, EventPriority::Roster, data)
    }

    /// Short name for logs and the JSON event stream.
    pub fn kind(&self) -> &'static str {
        match &self.data {
            GameEventData::HitLanded { .. } => "hit_landed",
            GameEventData::Clash { .. } => "clash",
            GameEventData::Parried { .. } => "parried",
            GameEventData::Thrown { .. } => "thrown",
            GameEventData::WallSplat { .. } => "wall_splat",
            GameEventData::Teched { .. } => "teched",
            GameEventData::GrappleAttached { .. } => "grapple_attached",
            GameEventData::GrappleReleased { .. } => "grapple_released",
            GameEventData::PlayerDefeated { .. } => "player_defeated",
            GameEventData::PlayerRespawned { .. } => "player_respawned",
            GameEventData::BossAttackStarted { .. } => "boss_attack_started",
            GameEventData::BossPhaseChanged { .. } => "boss_phase_changed",
            GameEventData::LimbBroken { .. } => "limb_broken",
            GameEventData::BossStaggered { .. } => "boss_staggered",
            GameEventData::BossRecovered => "boss_recovered",
            GameEventData::FinisherStarted { .. } => "finisher_started",
            GameEventData::FinisherCue { .. } => "finisher_cue",
            GameEventData::FinisherEnded { .. } => "finisher_ended",
            GameEventData::BossDefeated { .. } => "boss_defeated",
            GameEventData::RewardGranted { .. } => "reward_granted",
            GameEventData::PlayerJoined { .. } => "player_joined",
            GameEventData::PlayerLeft { .. } => "player_left",
            GameEventData::WeaponEquipped { .. } => "weapon_equipped",
            GameEventData::ArenaReset => "arena_reset",
        }
    }
}

/// Sort events into processing order. Stable, so equal keys keep emission order.
pub fn sort_events(events: &mut [GameEvent]) {
    events.sort_by_key(GameEvent::sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let p1 = PlayerId::new([1; 16]);
        let p2 = PlayerId::new([2; 16]);

        let mut events = vec![
            GameEvent::reward_granted(100, p1, 100),
            GameEvent::player_defeated(100, p2, Some(EntityId::Boss)),
            GameEvent::limb_broken(99, Limb::LeftArm, Some(p1)),
            GameEvent::player_defeated(100, p1, None),
        ];
        sort_events(&mut events);

        assert_eq!(events[0].tick, 99);
        assert_eq!(events[1].player_id, Some(p1));
        assert_eq!(events[1].priority, EventPriority::Defeat);
        assert_eq!(events[2].player_id, Some(p2));
        assert_eq!(events[3].kind(), "reward_granted");
    }

    #[test]
    fn test_player_id_derived_from_data() {
        let p = PlayerId::new([7; 16]);
        let hit = GameEvent::hit_landed(5, EntityId::Boss, EntityId::Player(p), 10, 1, false);
        assert_eq!(hit.player_id, Some(p));

        let on_boss = GameEvent::hit_landed(5, EntityId::Player(p), EntityId::Boss, 10, 0, false);
        assert_eq!(on_boss.player_id, None);
    }

    #[test]
    fn test_events_compare_by_payload() {
        let p = PlayerId::new([3; 16]);
        let a = GameEvent::hit_landed(5, EntityId::Boss, EntityId::Player(p), 10, 1, false);
        let b = GameEvent::hit_landed(5, EntityId::Boss, EntityId::Player(p), 11, 1, false);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
