//! Combat Resolver
//!
//! Drives every combatant's weapon state machine and resolves live hitboxes
//! against opposing hurtboxes.
//!
//! ## Resolution order (once per tick)
//!
//! 1. Advance state-machine timers (Startup → Active → Recovery → Idle).
//! 2. Grabs on their connect frame.
//! 3. Collect hitbox and hurtbox views from the start-of-pass state.
//! 4. Arbitrate: clash pre-pass over all hitbox pairs, then priority, parry
//!    and damage for each remaining hitbox.
//! 5. Apply the collected resolutions.
//!
//! Arbitration reads only the immutable views, so the outcome does not
//! depend on the order entities are evaluated in.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::fixed::{
    BP_ONE, Fixed, apply_bp, fixed_abs, fixed_floor_int, from_int, saturating_sub_floor,
};
use crate::core::rect::Rect;
use crate::core::vec2::FixedVec2;
use crate::game::boss;
use crate::game::events::{EventPriority, GameEvent, GameEventData, TechKind};
use crate::game::physics::WALL_SPLAT_DAMAGE;
use crate::game::state::{EntityId, Facing, PlayerId, PlayerState, WeaponState, WorldState};
use crate::game::weapon::{MoveData, MoveSlot, Priority};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Ticks a tech input stays available after becoming airborne from a hit
pub const TECH_WINDOW_TICKS: u16 = 21;
/// Wall tech is accepted during the final ticks of the wall pin
pub const WALL_TECH_WINDOW_TICKS: u16 = 24;
/// Grounded ticks without being hit before the combo counter resets
pub const COMBO_RESET_TICKS: u32 = 54;
/// Combo damage scale floor (0.5)
pub const COMBO_SCALE_FLOOR_BP: u32 = 5_000;
/// Combo damage decay per counter (0.05)
pub const COMBO_DECAY_BP: u32 = 500;
/// Juggle count at which launch scaling begins
pub const JUGGLE_THRESHOLD: u32 = 3;
/// Launch scaling factor per juggle beyond the threshold (0.85)
pub const JUGGLE_FACTOR_BP: u32 = 8_500;
/// Scaled launches never drop below this speed
pub const MIN_LAUNCH_SPEED: Fixed = from_int(4);
/// Juggle count that forces an untechable knockdown
pub const JUGGLE_CAP: u32 = 6;
/// Grounded stagger after an untechable knockdown
pub const KNOCKDOWN_TICKS: u16 = 40;
/// Ticks a parry input stays armed
pub const PARRY_WINDOW_TICKS: u16 = 11;
/// Maximum |attacker active age - parry age| for a successful parry
pub const PARRY_TIMING_TICKS: u16 = 9;
/// Attacker stagger after being parried
pub const PARRY_STAGGER_TICKS: u16 = 21;
/// Backward push on a parried attacker (units/s)
pub const PARRY_PUSH: Fixed = from_int(3);
/// Defender's Parry state duration
pub const PARRY_STATE_TICKS: u16 = 12;
/// Stagger applied to both sides of a clash
pub const CLASH_STAGGER_TICKS: u16 = 15;
/// Hitstun base
pub const HITSTUN_BASE_TICKS: i32 = 18;
/// Additional hitstun per unit of vertical knockback
pub const HITSTUN_PER_UNIT: i32 = 6;
/// Knockback payloads are applied as velocity × 4
pub const KNOCKBACK_SCALE: i32 = 4;
/// Ticks a defeated player waits before respawning
pub const RESPAWN_TICKS: u16 = 180;
/// Horizontal speed granted by an air tech (away from facing)
const AIR_TECH_DRIFT: Fixed = from_int(2);
/// Vertical recovery speed granted by an air tech
const AIR_TECH_LIFT: Fixed = from_int(6);
/// Launch velocity off the wall after a wall tech
const WALL_TECH_LAUNCH: FixedVec2 = FixedVec2::from_ints(6, 10);

// =============================================================================
// FORMULAS
// =============================================================================

/// Combo damage scale in basis points: `max(floor, 1 - counter × decay)`.
pub fn combo_scale_bp(combo_counter: u32) -> u32 {
    BP_ONE
        .saturating_sub(combo_counter.saturating_mul(COMBO_DECAY_BP))
        .max(COMBO_SCALE_FLOOR_BP)
}

/// Hitstun for a hit with vertical knockback payload `knockback_y`.
pub fn hitstun_ticks(knockback_y: Fixed) -> u16 {
    let extra = fixed_floor_int(fixed_abs(knockback_y).saturating_mul(HITSTUN_PER_UNIT));
    (HITSTUN_BASE_TICKS + extra).clamp(0, u16::MAX as i32) as u16
}

/// Scale a launch speed by the attacker's chain length.
///
/// From the threshold on, the launch is multiplied by
/// `factor^(chain - threshold + 1)` and floored at [`MIN_LAUNCH_SPEED`].
pub fn juggle_launch_speed(launch: Fixed, chain_count: u32) -> Fixed {
    if chain_count < JUGGLE_THRESHOLD || launch <= 0 {
        return launch;
    }
    let exponent = chain_count - JUGGLE_THRESHOLD + 1;
    let mut bp = BP_ONE;
    for _ in 0..exponent {
        bp = bp * JUGGLE_FACTOR_BP / BP_ONE;
    }
    apply_bp(launch, bp).max(MIN_LAUNCH_SPEED)
}

// =============================================================================
// VIEWS
// =============================================================================

/// A live hitbox for this tick. Recomputed from weapon state, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hitbox {
    /// Owning entity
    pub owner: EntityId,
    /// World-space rectangle
    pub rect: Rect,
    /// Base damage
    pub damage: Fixed,
    /// Knockback payload, already mirrored by the owner's facing
    pub knockback: FixedVec2,
    /// Forces the target airborne
    pub launches: bool,
    /// Priority class
    pub priority: Priority,
    /// Owner's ticks in Active (parry timing)
    pub age: u16,
}

impl Hitbox {
    /// Place a move's hitbox in world space.
    pub fn from_move(
        owner: EntityId,
        feet: FixedVec2,
        facing: Facing,
        data: &MoveData,
        priority: Priority,
        age: u16,
    ) -> Self {
        Self {
            owner,
            rect: Rect::from_offset(feet, facing.sign(), data.hitbox.offset, data.hitbox.size),
            damage: data.damage,
            knockback: data.knockback.mirrored(facing.sign()),
            launches: data.launches,
            priority,
            age,
        }
    }
}

/// A hurtbox with the defender facts arbitration needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    /// Defending entity
    pub id: EntityId,
    /// World-space hurtbox
    pub hurtbox: Rect,
    /// Ticks since the parry input, while the parry window is open
    pub parry_age: Option<u16>,
    /// Defender is in Recovery (cannot parry)
    pub in_recovery: bool,
}

/// Live hitbox of a player, if any.
pub fn player_hitbox(player: &PlayerState) -> Option<Hitbox> {
    if !player.action.hitbox_live() || player.is_defeated() {
        return None;
    }
    let slot = player.current_move?;
    Some(Hitbox::from_move(
        EntityId::Player(player.id),
        player.body.position,
        player.facing,
        player.weapon.resolve(slot),
        player.weapon.priority(),
        player.action.age,
    ))
}

fn player_target(player: &PlayerState) -> Option<Target> {
    if player.is_defeated() {
        return None;
    }
    Some(Target {
        id: EntityId::Player(player.id),
        hurtbox: player.hurtbox(),
        parry_age: (player.parry_timer > 0).then(|| PARRY_WINDOW_TICKS.saturating_sub(player.parry_timer)),
        in_recovery: player.action.is(WeaponState::Recovery),
    })
}

/// All live hitboxes, ordered by owner.
pub fn collect_hitboxes(state: &WorldState) -> Vec<Hitbox> {
    let mut boxes: Vec<Hitbox> = state.players.values().filter_map(player_hitbox).collect();
    boxes.extend(boss::boss_hitbox(&state.boss));
    boxes
}

/// All hurtboxes that can be hit this tick, ordered by id.
pub fn collect_targets(state: &WorldState) -> Vec<Target> {
    let mut targets: Vec<Target> = state.players.values().filter_map(player_target).collect();
    if !state.boss.untouchable && state.boss.health > 0 {
        targets.push(Target {
            id: EntityId::Boss,
            hurtbox: state.boss.hurtbox(),
            parry_age: None,
            in_recovery: false,
        });
    }
    targets
}

// =============================================================================
// ARBITRATION
// =============================================================================

/// Outcome for one hitbox (or hitbox pair) this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Both stagger, no damage
    Clash {
        /// Lower id
        a: EntityId,
        /// Higher id
        b: EntityId,
    },
    /// Attacker staggered, defender enters Parry
    Parry {
        /// Parried attacker
        attacker: EntityId,
        /// Parrying defender
        defender: EntityId,
    },
    /// Attacker's hitbox is consumed without effect
    Abort {
        /// Outprioritized attacker
        attacker: EntityId,
    },
    /// Damage pipeline runs
    Hit {
        /// The connecting hitbox
        hitbox: Hitbox,
        /// Defender
        defender: EntityId,
        /// Hitbox ∩ hurtbox, used for limb routing
        overlap: Rect,
    },
}

fn ordered_pair(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn parry_succeeds(hitbox: &Hitbox, target: &Target) -> bool {
    match target.parry_age {
        Some(parry_age) if !target.in_recovery => {
            hitbox.age.abs_diff(parry_age) <= PARRY_TIMING_TICKS
        }
        _ => false,
    }
}

/// Arbitrate all live hitboxes against all targets.
///
/// Pure function of its inputs; the result is the same for any permutation
/// of `hitboxes` and `targets`.
pub fn arbitrate(hitboxes: &[Hitbox], targets: &[Target]) -> Vec<Resolution> {
    let mut boxes = hitboxes.to_vec();
    boxes.sort_by_key(|h| h.owner);
    let mut targets = targets.to_vec();
    targets.sort_by_key(|t| t.id);

    let mut resolutions = Vec::new();

    // Clash pre-pass: any two overlapping hitboxes cancel
    let mut clashed: BTreeSet<EntityId> = BTreeSet::new();
    for (i, a) in boxes.iter().enumerate() {
        for b in &boxes[i + 1..] {
            if a.owner != b.owner && a.rect.overlaps(&b.rect) {
                clashed.insert(a.owner);
                clashed.insert(b.owner);
                resolutions.push(Resolution::Clash { a: a.owner, b: b.owner });
            }
        }
    }

    let live: BTreeMap<EntityId, Hitbox> = boxes
        .iter()
        .filter(|h| !clashed.contains(&h.owner))
        .map(|h| (h.owner, *h))
        .collect();

    // Each hitbox strikes the first overlapping target in id order
    let strikes: Vec<(Hitbox, Target, Rect)> = live
        .values()
        .filter_map(|h| {
            targets
                .iter()
                .filter(|t| t.id != h.owner)
                .find_map(|t| h.rect.intersection(&t.hurtbox).map(|o| (*h, *t, o)))
        })
        .collect();

    // Equal priority against a live defender hitbox is a clash
    let mut priority_clashes: BTreeSet<(EntityId, EntityId)> = BTreeSet::new();
    for (hitbox, target, _) in &strikes {
        if let Some(defender_box) = live.get(&target.id) {
            if hitbox.priority == defender_box.priority {
                priority_clashes.insert(ordered_pair(hitbox.owner, target.id));
            }
        }
    }
    let in_priority_clash: BTreeSet<EntityId> =
        priority_clashes.iter().flat_map(|(a, b)| [*a, *b]).collect();
    for (a, b) in &priority_clashes {
        resolutions.push(Resolution::Clash { a: *a, b: *b });
    }

    for (hitbox, target, overlap) in strikes {
        if in_priority_clash.contains(&hitbox.owner) {
            continue;
        }
        let outprioritized = live
            .get(&target.id)
            .is_some_and(|d| hitbox.priority.cmp(&d.priority) == Ordering::Less);
        let defender_attacking = live.contains_key(&target.id);

        if parry_succeeds(&hitbox, &target) && !(defender_attacking && !outprioritized) {
            resolutions.push(Resolution::Parry { attacker: hitbox.owner, defender: target.id });
        } else if outprioritized {
            resolutions.push(Resolution::Abort { attacker: hitbox.owner });
        } else {
            resolutions.push(Resolution::Hit { hitbox, defender: target.id, overlap });
        }
    }

    resolutions
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Advance a player's weapon state machine by one tick.
pub fn advance_player_action(player: &mut PlayerState) {
    player.action.age = player.action.age.saturating_add(1);
    player.action.timer = player.action.timer.saturating_sub(1);
    if player.action.timer > 0 || player.action.is(WeaponState::Idle) {
        return;
    }

    match player.action.state {
        WeaponState::Startup => match player.current_move {
            Some(slot) => {
                let data = player.weapon.resolve(slot);
                player.action.enter(WeaponState::Active, data.active);
            }
            None => player.action.reset(),
        },
        WeaponState::Active => match player.current_move {
            Some(slot) => {
                let data = player.weapon.resolve(slot);
                player.action.enter(WeaponState::Recovery, data.recovery);
            }
            None => player.action.reset(),
        },
        WeaponState::Recovery => {
            if matches!(player.current_move, Some(MoveSlot::Light(_))) {
                player.combo_window = player.weapon.table().combo_window;
            }
            player.current_move = None;
            player.action.reset();
        }
        WeaponState::Stagger | WeaponState::Parry | WeaponState::Grab => {
            player.current_move = None;
            player.action.reset();
        }
        WeaponState::Idle => {}
    }
}

/// Start a move from Idle. Returns false if the player cannot act.
pub fn start_move(player: &mut PlayerState, slot: MoveSlot) -> bool {
    if !player.action.is(WeaponState::Idle) || player.is_defeated() || player.on_wall {
        return false;
    }
    let data = player.weapon.resolve(slot);
    match slot {
        MoveSlot::Grab => player.action.enter(WeaponState::Grab, data.total_ticks()),
        _ => player.action.enter(WeaponState::Startup, data.startup),
    }
    player.current_move = Some(slot);
    player.parry_timer = 0;
    match slot {
        MoveSlot::Light(step) => {
            player.combo_step = (step + 1) % player.weapon.chain_len().max(1);
        }
        _ => player.combo_step = 0,
    }
    player.combo_window = 0;
    true
}

// =============================================================================
// TECH
// =============================================================================

/// Attempt a tech escape. Returns the kind on success.
///
/// Wall tech takes precedence: it is only possible while pinned, and air
/// tech only while airborne.
pub fn try_tech(player: &mut PlayerState) -> Option<TechKind> {
    if player.is_defeated() {
        return None;
    }

    if player.on_wall {
        if player.wall_timer == 0 || player.wall_timer > WALL_TECH_WINDOW_TICKS {
            return None;
        }
        player.on_wall = false;
        player.wall_timer = 0;
        player.body.on_ground = false;
        player.body.velocity = WALL_TECH_LAUNCH.mirrored(-(player.wall_dir as i32));
        player.facing = Facing::from_sign(-(player.wall_dir as i32), player.facing);
        player.wall_dir = 0;
        player.combo_counter = 0;
        player.current_move = None;
        player.action.reset();
        return Some(TechKind::Wall);
    }

    if player.is_airborne() && player.tech_eligible && player.tech_timer > 0 && !player.knocked_down {
        player.action.reset();
        player.current_move = None;
        player.body.velocity = FixedVec2::new(-player.facing.sign() * AIR_TECH_DRIFT, AIR_TECH_LIFT);
        player.juggle_count = 0;
        player.tech_eligible = false;
        player.tech_timer = 0;
        return Some(TechKind::Air);
    }

    None
}

// =============================================================================
// APPLICATION
// =============================================================================

/// Put a player into the defeated state.
pub fn defeat_player(state: &mut WorldState, player_id: PlayerId, by: Option<EntityId>) {
    let tick = state.tick;
    let Some(player) = state.players.get_mut(&player_id) else {
        return;
    };
    player.health = 0;
    player.respawn_timer = RESPAWN_TICKS;
    player.action.reset();
    player.current_move = None;
    player.on_wall = false;
    player.wall_timer = 0;
    player.tech_eligible = false;
    player.tech_timer = 0;
    player.knocked_down = false;
    player.parry_timer = 0;
    player.chain_count = 0;
    player.chain_timer = 0;
    player.grapple = None;
    player.input_buffer.clear();
    state.push_event(GameEvent::player_defeated(tick, player_id, by));
}

/// Hits `attacker` has landed in its current chain. The boss never chains.
fn attacker_chain(state: &WorldState, attacker: EntityId) -> u32 {
    attacker
        .player()
        .and_then(|id| state.players.get(&id))
        .map_or(0, |player| player.chain_count)
}

/// Count a landed hit toward the attacker's chain and restart its timer.
fn extend_chain(state: &mut WorldState, attacker: EntityId) {
    if let Some(player) = attacker.player().and_then(|id| state.players.get_mut(&id)) {
        player.chain_count = player.chain_count.saturating_add(1);
        player.chain_timer = COMBO_RESET_TICKS as u16;
    }
}

/// Run the damage pipeline on a player. Returns the damage dealt.
///
/// Launches are scaled by the attacker's chain, the cap by the defender's
/// juggle count. No-op for unknown or defeated players.
pub fn apply_player_hit(state: &mut WorldState, defender_id: PlayerId, hit: &Hitbox) -> Option<Fixed> {
    let tick = state.tick;
    let chain = attacker_chain(state, hit.owner);
    let defender = state.players.get_mut(&defender_id)?;
    if defender.is_defeated() {
        return None;
    }

    let damage = apply_bp(hit.damage, combo_scale_bp(defender.combo_counter));
    defender.health = saturating_sub_floor(defender.health, damage);

    let launching = hit.launches || hit.knockback.y > 0;
    let mut impulse = hit.knockback.scale_int(KNOCKBACK_SCALE);
    if launching || defender.is_airborne() {
        defender.juggle_count = defender.juggle_count.saturating_add(1);
    }
    if defender.juggle_count >= JUGGLE_CAP {
        defender.knocked_down = true;
        impulse.y = impulse.y.min(0);
    } else if launching {
        impulse.y = juggle_launch_speed(impulse.y, chain);
    }

    if !defender.on_wall {
        defender.body.velocity = defender.body.velocity + impulse;
        if launching && impulse.y > 0 {
            defender.body.on_ground = false;
        }
    }

    defender.action.enter(WeaponState::Stagger, hitstun_ticks(hit.knockback.y));
    defender.current_move = None;
    defender.combo_step = 0;
    defender.combo_window = 0;
    defender.parry_timer = 0;
    defender.grapple = None;
    defender.combo_counter = defender.combo_counter.saturating_add(1);
    defender.ticks_since_hit = 0;

    if defender.knocked_down {
        defender.tech_eligible = false;
        defender.tech_timer = 0;
        if defender.body.on_ground {
            defender.knocked_down = false;
            defender.action.enter(WeaponState::Stagger, KNOCKDOWN_TICKS);
        }
    } else if defender.is_airborne() {
        defender.tech_eligible = true;
        defender.tech_timer = TECH_WINDOW_TICKS;
    }

    let combo_counter = defender.combo_counter;
    let defeated = defender.health == 0;
    extend_chain(state, hit.owner);
    state.push_event(GameEvent::hit_landed(
        tick,
        hit.owner,
        EntityId::Player(defender_id),
        damage,
        combo_counter,
        launching,
    ));
    if defeated {
        defeat_player(state, defender_id, Some(hit.owner));
    }
    Some(damage)
}

/// Apply wall impact damage after a splat.
pub fn apply_wall_splat(state: &mut WorldState, player_id: PlayerId) {
    let tick = state.tick;
    let Some(player) = state.players.get_mut(&player_id) else {
        return;
    };
    player.health = saturating_sub_floor(player.health, WALL_SPLAT_DAMAGE);
    let defeated = player.health == 0;
    state.push_event(GameEvent::new(
        tick,
        EventPriority::Combat,
        GameEventData::WallSplat { player_id, damage: WALL_SPLAT_DAMAGE },
    ));
    if defeated {
        defeat_player(state, player_id, None);
    }
}

fn stagger_entity(state: &mut WorldState, id: EntityId, ticks: u16, velocity_x: impl Fn(Fixed, Facing) -> Fixed) {
    match id {
        EntityId::Player(player_id) => {
            if let Some(player) = state.players.get_mut(&player_id) {
                player.action.enter(WeaponState::Stagger, ticks);
                player.current_move = None;
                player.combo_window = 0;
                if !player.on_wall {
                    player.body.velocity.x = velocity_x(player.body.velocity.x, player.facing);
                }
            }
        }
        EntityId::Boss => {
            let boss = &mut state.boss;
            boss.action.enter(WeaponState::Stagger, ticks);
            boss.current_pattern = None;
            boss.body.velocity.x = velocity_x(boss.body.velocity.x, boss.facing);
        }
    }
}

fn spend_hitbox(state: &mut WorldState, id: EntityId) {
    match id {
        EntityId::Player(player_id) => {
            if let Some(player) = state.players.get_mut(&player_id) {
                player.action.hitbox_spent = true;
            }
        }
        EntityId::Boss => state.boss.action.hitbox_spent = true,
    }
}

fn apply_resolution(state: &mut WorldState, resolution: Resolution) {
    let tick = state.tick;
    match resolution {
        Resolution::Clash { a, b } => {
            // Horizontal velocity reflected at half magnitude
            stagger_entity(state, a, CLASH_STAGGER_TICKS, |vx, _| -vx / 2);
            stagger_entity(state, b, CLASH_STAGGER_TICKS, |vx, _| -vx / 2);
            state.push_event(GameEvent::clash(tick, a, b));
        }
        Resolution::Parry { attacker, defender } => {
            stagger_entity(state, attacker, PARRY_STAGGER_TICKS, |_, facing| -facing.sign() * PARRY_PUSH);
            if let EntityId::Player(id) = defender {
                if let Some(player) = state.players.get_mut(&id) {
                    player.action.enter(WeaponState::Parry, PARRY_STATE_TICKS);
                    player.current_move = None;
                    player.parry_timer = 0;
                }
            }
            state.push_event(GameEvent::parried(tick, attacker, defender));
        }
        Resolution::Abort { attacker } => spend_hitbox(state, attacker),
        Resolution::Hit { hitbox, defender, overlap } => {
            spend_hitbox(state, hitbox.owner);
            match defender {
                EntityId::Player(id) => {
                    apply_player_hit(state, id, &hitbox);
                }
                EntityId::Boss => {
                    if boss::apply_strike(state, &hitbox, &overlap) > 0 {
                        extend_chain(state, hitbox.owner);
                    }
                }
            }
        }
    }
}

/// Grabs on their connect frame: bypass clash, priority and parry.
fn resolve_grabs(state: &mut WorldState) {
    let mut throws: Vec<(Hitbox, PlayerId)> = Vec::new();

    for grabber in state.players.values() {
        if !grabber.action.is(WeaponState::Grab) || grabber.action.hitbox_spent {
            continue;
        }
        let data = grabber.weapon.resolve(MoveSlot::Grab);
        if grabber.action.age != data.startup {
            continue;
        }
        let hitbox = Hitbox::from_move(
            EntityId::Player(grabber.id),
            grabber.body.position,
            grabber.facing,
            data,
            grabber.weapon.priority(),
            grabber.action.age,
        );
        let victim = state.players.values().find(|p| {
            p.id != grabber.id
                && !p.is_defeated()
                && p.body.on_ground
                && !p.on_wall
                && hitbox.rect.overlaps(&p.hurtbox())
        });
        throws.push((hitbox, victim.map_or(grabber.id, |v| v.id)));
    }

    let tick = state.tick;
    for (hitbox, victim) in throws {
        spend_hitbox(state, hitbox.owner);
        let Some(attacker) = hitbox.owner.player() else {
            continue;
        };
        if victim == attacker {
            continue;
        }
        if let Some(damage) = apply_player_hit(state, victim, &hitbox) {
            state.push_event(GameEvent::new(
                tick,
                EventPriority::Combat,
                GameEventData::Thrown { attacker, defender: victim, damage },
            ));
        }
    }
}

/// Run one combat pass over the world.
pub fn resolve_combat(state: &mut WorldState) {
    for player in state.players.values_mut() {
        if !player.is_defeated() {
            advance_player_action(player);
        }
    }
    boss::advance_boss_action(&mut state.boss);

    resolve_grabs(state);

    let hitboxes = collect_hitboxes(state);
    if hitboxes.is_empty() {
        return;
    }
    let targets = collect_targets(state);
    for resolution in arbitrate(&hitboxes, &targets) {
        apply_resolution(state, resolution);
    }
}

// =============================================================================
// TESTS
// =============================================================================
