//! World State Definitions
//!
//! The complete, serializable state of the arena at a tick. Pure data:
//! behaviour lives in `physics`, `combat`, `boss` and `tick`.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, from_centi, from_int};
use crate::core::vec2::FixedVec2;
use crate::core::rect::Rect;
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::events::GameEvent;
use crate::game::input::{InputBuffer, InputFrame};
use crate::game::physics::Grapple;
use crate::game::weapon::{MoveSlot, WeaponKind};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a random id (session layer only, never inside a tick).
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Short hex prefix for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_bytes(self.0))
    }
}

/// Any combatant. Players sort before the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// A connected player
    Player(PlayerId),
    /// The boss
    Boss,
}

impl EntityId {
    /// Player id, if this is a player.
    pub fn player(self) -> Option<PlayerId> {
        match self {
            EntityId::Player(id) => Some(id),
            EntityId::Boss => None,
        }
    }
}

// =============================================================================
// SHARED PIECES
// =============================================================================

/// Horizontal facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward -x
    Left,
    /// Toward +x
    #[default]
    Right,
}

impl Facing {
    /// -1 or +1.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    /// Facing from a direction sign. Zero keeps `fallback`.
    #[inline]
    pub fn from_sign(sign: i32, fallback: Facing) -> Facing {
        match sign.signum() {
            -1 => Facing::Left,
            1 => Facing::Right,
            _ => fallback,
        }
    }
}

/// Weapon state machine states. Exactly one per entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WeaponState {
    /// Actionable
    #[default]
    Idle = 0,
    /// Wind-up before the hitbox
    Startup = 1,
    /// Hitbox live
    Active = 2,
    /// Wind-down after the hitbox
    Recovery = 3,
    /// Hitstun, clash or parry stagger
    Stagger = 4,
    /// Successful parry follow-through
    Parry = 5,
    /// Throw attempt
    Grab = 6,
}

impl WeaponState {
    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            WeaponState::Idle => "idle",
            WeaponState::Startup => "startup",
            WeaponState::Active => "active",
            WeaponState::Recovery => "recovery",
            WeaponState::Stagger => "stagger",
            WeaponState::Parry => "parry",
            WeaponState::Grab => "grab",
        }
    }
}

/// Current weapon state plus its countdown.
///
/// The hitbox is not stored: it exists while `state == Active` and
/// `hitbox_spent` is false, and is recomputed from the current move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    /// Current state
    pub state: WeaponState,
    /// Ticks left in this state
    pub timer: u16,
    /// Ticks spent in this state
    pub age: u16,
    /// Hitbox already resolved (hit, clash or parry)
    pub hitbox_spent: bool,
}

impl ActionState {
    /// Enter a state with a fresh countdown.
    pub fn enter(&mut self, state: WeaponState, timer: u16) {
        self.state = state;
        self.timer = timer;
        self.age = 0;
        self.hitbox_spent = false;
    }

    /// Return to Idle.
    pub fn reset(&mut self) {
        self.enter(WeaponState::Idle, 0);
    }

    /// Check the current state.
    #[inline]
    pub fn is(&self, state: WeaponState) -> bool {
        self.state == state
    }

    /// Whether a hitbox exists this tick.
    #[inline]
    pub fn hitbox_live(&self) -> bool {
        self.state == WeaponState::Active && !self.hitbox_spent
    }
}

/// Kinematic body. Position is the bottom centre (feet).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// Feet position
    pub position: FixedVec2,
    /// Velocity in units per second
    pub velocity: FixedVec2,
    /// Standing on the floor or a platform
    pub on_ground: bool,
}

impl Body {
    /// Body at rest on the ground.
    pub fn grounded_at(position: FixedVec2) -> Self {
        Self {
            position,
            velocity: FixedVec2::ZERO,
            on_ground: true,
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.put(self.position);
        hasher.put(self.velocity);
        hasher.put(self.on_ground);
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State of a single fighter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Unique player ID
    pub id: PlayerId,
    /// Kinematics
    pub body: Body,
    /// Facing direction
    pub facing: Facing,
    /// Current health, in [0, max_health]
    pub health: Fixed,
    /// Maximum health
    pub max_health: Fixed,
    /// Pinned to a stage bound after a wall-splat
    pub on_wall: bool,
    /// Side of the wall: -1 left bound, +1 right bound
    pub wall_dir: i8,
    /// Ticks left pinned to the wall
    pub wall_timer: u16,
    /// Hits taken since the last combo reset
    pub combo_counter: u32,
    /// Ticks since this player was last hit
    pub ticks_since_hit: u32,
    /// Airborne hits taken since the last landing
    pub juggle_count: u32,
    /// Hits this player has landed in the current chain
    pub chain_count: u32,
    /// Ticks left before the chain lapses
    pub chain_timer: u16,
    /// Tech input will cancel hitstun
    pub tech_eligible: bool,
    /// Ticks left in the tech window
    pub tech_timer: u16,
    /// Untechable knockdown pending on landing
    pub knocked_down: bool,
    /// Equipped weapon
    pub weapon: WeaponKind,
    /// Weapon state machine
    pub action: ActionState,
    /// Move being performed (Startup/Active/Recovery/Grab)
    pub current_move: Option<MoveSlot>,
    /// Next light chain step
    pub combo_step: u8,
    /// Ticks left to continue the light chain
    pub combo_window: u16,
    /// Ticks left in the parry window
    pub parry_timer: u16,
    /// Ticks until respawn (non-zero while defeated)
    pub respawn_timer: u16,
    /// Input applied on the last tick
    pub pending_input: InputFrame,
    /// Buttons held on the last tick (press-edge detection)
    pub held: InputFrame,
    /// Recent press edges for motion inputs
    pub input_buffer: InputBuffer,
    /// Scythe chain, while swinging
    pub grapple: Option<Grapple>,
    /// Respawn location
    pub spawn: FixedVec2,
}

impl PlayerState {
    /// Body half-width: 0.4
    pub const HALF_WIDTH: Fixed = from_centi(40);
    /// Body height: 1.8
    pub const HEIGHT: Fixed = from_centi(180);
    /// Starting health
    pub const MAX_HEALTH: Fixed = from_int(100);

    /// Create a new player standing at `spawn`.
    pub fn new(id: PlayerId, weapon: WeaponKind, spawn: FixedVec2) -> Self {
        Self {
            id,
            body: Body::grounded_at(spawn),
            facing: if spawn.x > 0 { Facing::Left } else { Facing::Right },
            health: Self::MAX_HEALTH,
            max_health: Self::MAX_HEALTH,
            on_wall: false,
            wall_dir: 0,
            wall_timer: 0,
            combo_counter: 0,
            ticks_since_hit: 0,
            juggle_count: 0,
            chain_count: 0,
            chain_timer: 0,
            tech_eligible: false,
            tech_timer: 0,
            knocked_down: false,
            weapon,
            action: ActionState::default(),
            current_move: None,
            combo_step: 0,
            combo_window: 0,
            parry_timer: 0,
            respawn_timer: 0,
            pending_input: InputFrame::new(),
            held: InputFrame::new(),
            input_buffer: InputBuffer::new(),
            grapple: None,
            spawn,
        }
    }

    /// Reset health, position and every counter in one step.
    pub fn respawn(&mut self) {
        *self = Self::new(self.id, self.weapon, self.spawn);
    }

    /// Hurtbox in world space.
    pub fn hurtbox(&self) -> Rect {
        Rect::from_feet(self.body.position, Self::HALF_WIDTH, Self::HEIGHT)
    }

    /// Health reached zero and the player is waiting to respawn.
    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Airborne (not standing, not pinned).
    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.body.on_ground && !self.on_wall
    }

    /// Hash this player's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.put(self.id.0);
        self.body.hash_into(hasher);
        hasher.put(self.facing.sign());
        hasher.put(self.health);
        hasher.put(self.on_wall);
        hasher.put(self.wall_dir as u8);
        hasher.put(self.wall_timer);
        hasher.put(self.combo_counter);
        hasher.put(self.ticks_since_hit);
        hasher.put(self.juggle_count);
        hasher.put(self.chain_count);
        hasher.put(self.chain_timer);
        hasher.put(self.tech_eligible);
        hasher.put(self.tech_timer);
        hasher.put(self.knocked_down);
        hasher.put(self.weapon as u8);
        hasher.put(self.action.state as u8);
        hasher.put(self.action.timer);
        hasher.put(self.action.age);
        hasher.put(self.action.hitbox_spent);
        match self.current_move {
            None => hasher.put(0u8),
            Some(MoveSlot::Light(step)) => {
                hasher.put(1u8);
                hasher.put(step);
            }
            Some(MoveSlot::Heavy) => hasher.put(2u8),
            Some(MoveSlot::Air) => hasher.put(3u8),
            Some(MoveSlot::Grab) => hasher.put(4u8),
            Some(MoveSlot::Launcher) => hasher.put(5u8),
            Some(MoveSlot::Smash) => hasher.put(6u8),
            Some(MoveSlot::QuarterCircle) => hasher.put(7u8),
        }
        hasher.put(self.combo_step);
        hasher.put(self.combo_window);
        hasher.put(self.parry_timer);
        hasher.put(self.respawn_timer);
        hasher.put(self.held.buttons);
        hasher.put(self.input_buffer.len() as u8);
        for entry in self.input_buffer.iter() {
            hasher.put(entry.press as u8);
            hasher.put(entry.ticks_left);
        }
        match self.grapple {
            Some(grapple) => {
                hasher.put(true);
                hasher.put(grapple.anchor);
                hasher.put(grapple.length);
            }
            None => hasher.put(false),
        }
    }
}

// =============================================================================
// BOSS STATE
// =============================================================================

/// Boss limb with independent durability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Limb {
    /// Screen-left arm
    LeftArm = 0,
    /// Screen-right arm
    RightArm = 1,
    /// Screen-left leg
    LeftLeg = 2,
    /// Screen-right leg
    RightLeg = 3,
}

impl Limb {
    /// All limbs.
    pub const ALL: [Limb; 4] = [Limb::LeftArm, Limb::RightArm, Limb::LeftLeg, Limb::RightLeg];

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Limb::LeftArm => "leftArm",
            Limb::RightArm => "rightArm",
            Limb::LeftLeg => "leftLeg",
            Limb::RightLeg => "rightLeg",
        }
    }
}

/// Durability of one limb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbState {
    /// Remaining durability, clamped at 0
    pub health: Fixed,
    /// Starting durability
    pub max_health: Fixed,
    /// Broken limbs stay broken until the boss is re-initialized
    pub broken: bool,
}

/// State of the boss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossState {
    /// Kinematics
    pub body: Body,
    /// Facing direction
    pub facing: Facing,
    /// Current health
    pub health: Fixed,
    /// Maximum health
    pub max_health: Fixed,
    /// Accumulated break damage
    pub break_gauge: Fixed,
    /// Gauge value that forces a stagger
    pub break_threshold: Fixed,
    /// Break stagger active
    pub staggered: bool,
    /// Ticks left in the break stagger
    pub stagger_timer: u16,
    /// Armor phase, 1-based
    pub armor_phase: u8,
    /// Ticks before the next pattern may start
    pub attack_cooldown: u16,
    /// Limb durability
    pub limbs: BTreeMap<Limb, LimbState>,
    /// Ignores hits (finisher in progress)
    pub untouchable: bool,
    /// Weapon state machine, shared with players
    pub action: ActionState,
    /// Index into the pattern table while attacking
    pub current_pattern: Option<u8>,
    /// Player who last damaged the boss
    pub last_attacker: Option<PlayerId>,
}

impl BossState {
    /// Body half-width: 1.2
    pub const HALF_WIDTH: Fixed = from_centi(120);
    /// Body height: 3.6
    pub const HEIGHT: Fixed = from_centi(360);
    /// Starting health
    pub const MAX_HEALTH: Fixed = from_int(800);
    /// Break gauge threshold
    pub const BREAK_THRESHOLD: Fixed = from_int(100);
    /// Starting limb durability
    pub const LIMB_DURABILITY: Fixed = from_int(100);

    /// Create a fresh boss at `spawn`.
    pub fn new(spawn: FixedVec2) -> Self {
        let limbs = Limb::ALL
            .iter()
            .map(|limb| {
                (*limb, LimbState {
                    health: Self::LIMB_DURABILITY,
                    max_health: Self::LIMB_DURABILITY,
                    broken: false,
                })
            })
            .collect();

        Self {
            body: Body::grounded_at(spawn),
            facing: Facing::Left,
            health: Self::MAX_HEALTH,
            max_health: Self::MAX_HEALTH,
            break_gauge: 0,
            break_threshold: Self::BREAK_THRESHOLD,
            staggered: false,
            stagger_timer: 0,
            armor_phase: 1,
            attack_cooldown: 0,
            limbs,
            untouchable: false,
            action: ActionState::default(),
            current_pattern: None,
            last_attacker: None,
        }
    }

    /// Hurtbox in world space.
    pub fn hurtbox(&self) -> Rect {
        Rect::from_feet(self.body.position, Self::HALF_WIDTH, Self::HEIGHT)
    }

    /// Check if a limb is broken. Unknown limbs count as intact.
    pub fn limb_broken(&self, limb: Limb) -> bool {
        self.limbs.get(&limb).is_some_and(|l| l.broken)
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.body.hash_into(hasher);
        hasher.put(self.facing.sign());
        hasher.put(self.health);
        hasher.put(self.break_gauge);
        hasher.put(self.staggered);
        hasher.put(self.stagger_timer);
        hasher.put(self.armor_phase);
        hasher.put(self.attack_cooldown);
        for (limb, state) in &self.limbs {
            hasher.put(*limb as u8);
            hasher.put(state.health);
            hasher.put(state.broken);
        }
        hasher.put(self.untouchable);
        hasher.put(self.action.state as u8);
        hasher.put(self.action.timer);
        hasher.put(self.action.age);
        hasher.put(self.action.hitbox_spent);
        hasher.put(self.current_pattern.unwrap_or(u8::MAX));
        if let Some(id) = &self.last_attacker {
            hasher.put(id.0);
        }
    }
}

// =============================================================================
// FINISHER
// =============================================================================

/// Cinematic finisher in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinisherState {
    /// Player who triggered it
    pub player_id: PlayerId,
    /// Ticks since it started
    pub elapsed: u16,
}

// =============================================================================
// WORLD STATE
// =============================================================================

/// Complete state of the arena.
///
/// Snapshots are deep clones of this value; nothing in it aliases the live
/// instance. Uses BTreeMap for deterministic iteration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// Tick being assembled next
    pub tick: u32,
    /// RNG seed (for verification)
    pub seed: u64,
    /// Deterministic RNG state, part of every snapshot
    pub rng: DeterministicRng,
    /// All players (BTreeMap for deterministic iteration)
    pub players: BTreeMap<PlayerId, PlayerState>,
    /// The boss
    pub boss: BossState,
    /// Where the boss (re)spawns
    pub boss_spawn: FixedVec2,
    /// Finisher sequence, if running
    pub finisher: Option<FinisherState>,
    /// Bosses defeated since the last arena reset
    pub bosses_defeated: u32,
    /// Events generated during the current step (drained at its end)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl WorldState {
    /// Create an empty arena with a fresh boss.
    pub fn new(seed: u64, boss_spawn: FixedVec2) -> Self {
        Self {
            tick: 0,
            seed,
            rng: DeterministicRng::new(seed),
            players: BTreeMap::new(),
            boss: BossState::new(boss_spawn),
            boss_spawn,
            finisher: None,
            bosses_defeated: 0,
            pending_events: Vec::new(),
        }
    }

    /// Add a player. Returns false if the id is already present.
    pub fn add_player(&mut self, id: PlayerId, weapon: WeaponKind, spawn: FixedVec2) -> bool {
        if self.players.contains_key(&id) {
            return false;
        }
        self.players.insert(id, PlayerState::new(id, weapon, spawn));
        true
    }

    /// Remove a player. Returns the removed state.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<PlayerState> {
        if self.finisher.is_some_and(|f| f.player_id == *id) {
            // The lock is released with the initiator gone
            self.finisher = None;
            self.boss.untouchable = false;
        }
        self.players.remove(id)
    }

    /// Re-initialize the boss at its spawn point.
    pub fn reset_boss(&mut self) {
        self.boss = BossState::new(self.boss_spawn);
        self.finisher = None;
    }

    /// Player input is locked while a finisher runs.
    #[inline]
    pub fn input_locked(&self) -> bool {
        self.finisher.is_some()
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng.state(), |hasher| {
            hasher.put(self.seed);
            // BTreeMap guarantees sorted order
            for player in self.players.values() {
                player.hash_into(hasher);
            }
            self.boss.hash_into(hasher);
            match &self.finisher {
                Some(f) => {
                    hasher.put(true);
                    hasher.put(f.player_id.0);
                    hasher.put(f.elapsed);
                }
                None => hasher.put(false),
            }
            hasher.put(self.bosses_defeated);
        })
    }

    /// Encode as bincode bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode from bincode bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;
    use crate::game::input::Press;

    fn spawn(x: f64) -> FixedVec2 {
        FixedVec2::new(to_fixed(x), 0)
    }

    #[test]
    fn test_player_id_ordering() {
        let id1 = PlayerId::new([0; 16]);
        let id2 = PlayerId::new([1; 16]);
        let id3 = PlayerId::new([0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        assert!(id1 < id2);
        assert!(id1 < id3);
        assert!(id3 < id2);
        assert!(EntityId::Player(id2) < EntityId::Boss);
    }

    #[test]
    fn test_player_uuid_formatting() {
        let id = PlayerId::random();
        assert_eq!(id.to_uuid_string().len(), 36);
        assert_eq!(id.to_string(), id.to_uuid_string());
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_new_player_faces_center() {
        let left = PlayerState::new(PlayerId::new([1; 16]), WeaponKind::Katana, spawn(-4.0));
        let right = PlayerState::new(PlayerId::new([2; 16]), WeaponKind::Katana, spawn(4.0));
        assert_eq!(left.facing, Facing::Right);
        assert_eq!(right.facing, Facing::Left);
        assert!(left.body.on_ground);
        assert_eq!(left.health, PlayerState::MAX_HEALTH);
    }

    #[test]
    fn test_respawn_resets_everything() {
        let id = PlayerId::new([3; 16]);
        let mut player = PlayerState::new(id, WeaponKind::Scythe, spawn(-2.0));
        player.health = 0;
        player.combo_counter = 7;
        player.juggle_count = 2;
        player.chain_count = 4;
        player.input_buffer.push(Press::Down);
        player.grapple = Some(Grapple { anchor: spawn(0.0), length: from_int(3) });
        player.body.position = spawn(9.0);
        player.respawn_timer = 1;
        player.action.enter(WeaponState::Stagger, 30);

        player.respawn();

        assert_eq!(player, PlayerState::new(id, WeaponKind::Scythe, spawn(-2.0)));
    }

    #[test]
    fn test_boss_starts_with_intact_limbs() {
        let boss = BossState::new(spawn(6.0));
        assert_eq!(boss.limbs.len(), 4);
        assert!(Limb::ALL.iter().all(|l| !boss.limb_broken(*l)));
        assert_eq!(boss.armor_phase, 1);
        assert_eq!(boss.break_gauge, 0);
    }

    #[test]
    fn test_btreemap_iteration_order() {
        let mut world = WorldState::new(12345, spawn(6.0));
        for b in [5u8, 1, 9, 3] {
            assert!(world.add_player(PlayerId::new([b; 16]), WeaponKind::Longsword, spawn(0.0)));
        }
        assert!(!world.add_player(PlayerId::new([5; 16]), WeaponKind::Fists, spawn(0.0)));

        let iterated: Vec<_> = world.players.keys().collect();
        let mut sorted = iterated.clone();
        sorted.sort();
        assert_eq!(iterated, sorted);
    }

    #[test]
    fn test_world_hash_tracks_state() {
        let mut a = WorldState::new(7, spawn(6.0));
        let b = a.clone();
        assert_eq!(a.compute_hash(), b.compute_hash());

        a.boss.break_gauge = 1;
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_world_hash_covers_buffer_and_chain() {
        let id = PlayerId::new([1; 16]);
        let mut base = WorldState::new(7, spawn(6.0));
        base.add_player(id, WeaponKind::Scythe, spawn(-3.0));

        let mut buffered = base.clone();
        buffered.players.get_mut(&id).unwrap().input_buffer.push(Press::Down);
        assert_ne!(base.compute_hash(), buffered.compute_hash());

        let mut swinging = base.clone();
        swinging.players.get_mut(&id).unwrap().grapple =
            Some(Grapple { anchor: FixedVec2::from_ints(-5, 3), length: from_int(3) });
        assert_ne!(base.compute_hash(), swinging.compute_hash());

        let mut chained = base.clone();
        chained.players.get_mut(&id).unwrap().chain_count = 1;
        assert_ne!(base.compute_hash(), chained.compute_hash());
    }

    #[test]
    fn test_snapshot_bytes_preserve_rng() {
        let mut world = WorldState::new(99, spawn(6.0));
        world.add_player(PlayerId::new([1; 16]), WeaponKind::Fists, spawn(-3.0));
        world.rng.next_u64();

        let bytes = world.to_bytes().unwrap();
        let mut restored = WorldState::from_bytes(&bytes).unwrap();
        assert_eq!(restored, world);
        assert_eq!(restored.rng.next_u64(), world.rng.next_u64());
    }

    #[test]
    fn test_removing_finisher_initiator_releases_lock() {
        let id = PlayerId::new([4; 16]);
        let mut world = WorldState::new(1, spawn(6.0));
        world.add_player(id, WeaponKind::Longsword, spawn(0.0));
        world.finisher = Some(FinisherState { player_id: id, elapsed: 10 });
        world.boss.untouchable = true;

        assert!(world.remove_player(&id).is_some());
        assert!(!world.input_locked());
        assert!(!world.boss.untouchable);
    }
}
