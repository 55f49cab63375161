//! Boss Director
//!
//! Armor phases, break gauge and stagger, per-limb durability, attack
//! selection and the cinematic finisher.
//!
//! Boss attacks are ordinary hitboxes: they go through the same
//! arbitration and damage pipeline as player attacks.

use crate::core::fixed::{
    BP_ONE, Fixed, FIXED_HALF, apply_bp, fixed_abs, fixed_mul, from_centi, from_int, ratio_bp,
    saturating_sub_floor,
};
use crate::core::rect::Rect;
use crate::game::combat::Hitbox;
use crate::game::events::{EventPriority, FinisherCue, GameEvent, GameEventData};
use crate::game::state::{BossState, EntityId, Facing, FinisherState, Limb, PlayerId, WeaponState, WorldState};
use crate::game::weapon::{HitboxShape, MoveData, Priority};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Fraction of unreduced damage added to the break gauge (35%)
pub const BREAK_GAIN_BP: u32 = 3_500;
/// Break stagger duration
pub const BREAK_STAGGER_TICKS: u16 = 180;
/// Ticks between attack patterns
pub const ATTACK_COOLDOWN_TICKS: u16 = 45;
/// Horizontal distance at which the boss starts a pattern
pub const ENGAGE_RANGE: Fixed = from_int(5);
/// The boss stops walking inside this distance
pub const STANDOFF_RANGE: Fixed = from_centi(250);
/// Walking speed toward the nearest player (units/s)
pub const WALK_SPEED: Fixed = from_int(2);
/// Final armor phase
pub const FINAL_PHASE: u8 = 4;
/// Finisher requires health at or below this fraction of max (10%)
pub const FINISHER_HEALTH_BP: u32 = 1_000;
/// Finisher grab reach
pub const FINISHER_RANGE: Fixed = from_int(3);
/// Length of the finisher sequence
pub const FINISHER_TICKS: u16 = 240;
/// Reward per present player on boss defeat
pub const DEFEAT_REWARD: u32 = 100;

/// Cue schedule, in ticks since the finisher started.
pub const FINISHER_CUES: [(u16, FinisherCue); 4] = [
    (0, FinisherCue::Approach),
    (60, FinisherCue::Strike),
    (120, FinisherCue::Sever),
    (180, FinisherCue::Impact),
];

/// Armor phases: (health ratio above which the phase applies, damage reduction).
const ARMOR_TABLE: [(u32, u32); 4] = [(7_000, 0), (4_500, 1_500), (2_000, 3_000), (0, 5_000)];

// =============================================================================
// PATTERNS
// =============================================================================

/// Boss attack pattern. Each one is driven by a limb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BossPattern {
    /// Wide forward swipe
    ClawSwipe = 0,
    /// Overhead slam that launches
    HammerFist = 1,
    /// Ground wave on both sides
    Stomp = 2,
    /// Low sweep
    SweepKick = 3,
}

const fn boss_move(
    name: &'static str,
    frames: (u16, u16, u16),
    offset: (i32, i32),
    size: (i32, i32),
    damage: i32,
    knockback: (i32, i32),
    launches: bool,
) -> MoveData {
    use crate::core::vec2::FixedVec2;
    MoveData {
        name,
        startup: frames.0,
        active: frames.1,
        recovery: frames.2,
        hitbox: HitboxShape {
            offset: FixedVec2::new(from_centi(offset.0), from_centi(offset.1)),
            size: FixedVec2::new(from_centi(size.0), from_centi(size.1)),
        },
        damage: from_centi(damage),
        knockback: FixedVec2::new(from_centi(knockback.0), from_centi(knockback.1)),
        launches,
    }
}

static CLAW_SWIPE: MoveData = boss_move("claw_swipe", (24, 6, 30), (100, 120), (220, 160), 1800, (250, 50), false);
static HAMMER_FIST: MoveData = boss_move("hammer_fist", (30, 6, 36), (80, 0), (200, 250), 2400, (100, 400), true);
static STOMP: MoveData = boss_move("stomp", (36, 4, 40), (-300, 0), (600, 60), 2000, (0, 300), true);
static SWEEP_KICK: MoveData = boss_move("sweep_kick", (20, 8, 28), (60, 0), (260, 80), 1500, (300, 150), false);

impl BossPattern {
    /// All patterns, in index order.
    pub const ALL: [BossPattern; 4] = [
        BossPattern::ClawSwipe,
        BossPattern::HammerFist,
        BossPattern::Stomp,
        BossPattern::SweepKick,
    ];

    /// Pattern by index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Limb that performs the pattern. Breaking it disables the pattern.
    pub fn limb(self) -> Limb {
        match self {
            BossPattern::ClawSwipe => Limb::LeftArm,
            BossPattern::HammerFist => Limb::RightArm,
            BossPattern::Stomp => Limb::LeftLeg,
            BossPattern::SweepKick => Limb::RightLeg,
        }
    }

    /// Selection weight.
    pub fn weight(self) -> u32 {
        match self {
            BossPattern::ClawSwipe => 4,
            BossPattern::HammerFist => 3,
            BossPattern::Stomp => 2,
            BossPattern::SweepKick => 3,
        }
    }

    /// Frame data and payload.
    pub fn move_data(self) -> &'static MoveData {
        match self {
            BossPattern::ClawSwipe => &CLAW_SWIPE,
            BossPattern::HammerFist => &HAMMER_FIST,
            BossPattern::Stomp => &STOMP,
            BossPattern::SweepKick => &SWEEP_KICK,
        }
    }
}

// =============================================================================
// ARMOR AND DAMAGE
// =============================================================================

/// Armor phase for a health ratio. Monotone in health.
pub fn armor_phase_for(health: Fixed, max_health: Fixed) -> u8 {
    let ratio = ratio_bp(health, max_health);
    ARMOR_TABLE
        .iter()
        .position(|(above, _)| ratio > *above)
        .map_or(FINAL_PHASE, |index| index as u8 + 1)
}

/// Damage reduction of a phase, in basis points.
pub fn armor_reduction_bp(phase: u8) -> u32 {
    let index = (phase.clamp(1, FINAL_PHASE) - 1) as usize;
    ARMOR_TABLE[index].1
}

/// Limb under the centre of a hit on the boss.
///
/// Upper half of the body routes to an arm, lower half to a leg; the side
/// of the boss's centre picks left or right.
pub fn limb_for_overlap(boss: &BossState, overlap: &Rect) -> Limb {
    let center = overlap.center();
    let waist = boss.body.position.y + fixed_mul(BossState::HEIGHT, FIXED_HALF);
    let left = center.x < boss.body.position.x;
    match (center.y >= waist, left) {
        (true, true) => Limb::LeftArm,
        (true, false) => Limb::RightArm,
        (false, true) => Limb::LeftLeg,
        (false, false) => Limb::RightLeg,
    }
}

/// Apply incoming damage to the boss. Returns the damage after armor.
///
/// Armor reduces health and limb damage; the break gauge gains a fraction of
/// the unreduced damage. Phase changes, limb breaks and staggers each emit
/// their event exactly once.
pub fn apply_boss_damage(
    state: &mut WorldState,
    raw_damage: Fixed,
    limb: Option<Limb>,
    by: Option<PlayerId>,
) -> Fixed {
    let tick = state.tick;
    let boss = &mut state.boss;
    if boss.untouchable || boss.health <= 0 || raw_damage <= 0 {
        return 0;
    }

    let mut events = Vec::new();
    let applied = apply_bp(raw_damage, BP_ONE - armor_reduction_bp(boss.armor_phase));
    boss.health = saturating_sub_floor(boss.health, applied);
    if by.is_some() {
        boss.last_attacker = by;
    }

    if let Some((limb, limb_state)) = limb.and_then(|l| boss.limbs.get_mut(&l).map(|s| (l, s))) {
        if !limb_state.broken {
            limb_state.health = saturating_sub_floor(limb_state.health, applied);
            if limb_state.health == 0 {
                limb_state.broken = true;
                events.push(GameEvent::limb_broken(tick, limb, by));
            }
        }
    }

    if !boss.staggered {
        boss.break_gauge = boss.break_gauge.saturating_add(apply_bp(raw_damage, BREAK_GAIN_BP));
        if boss.break_gauge >= boss.break_threshold {
            boss.break_gauge = 0;
            boss.staggered = true;
            boss.stagger_timer = BREAK_STAGGER_TICKS;
            boss.action.reset();
            boss.current_pattern = None;
            boss.body.velocity.x = 0;
            events.push(GameEvent::new(tick, EventPriority::Boss, GameEventData::BossStaggered { by }));
        }
    }

    let new_phase = armor_phase_for(boss.health, boss.max_health).max(boss.armor_phase);
    if new_phase != boss.armor_phase {
        events.push(GameEvent::boss_phase_changed(tick, boss.armor_phase, new_phase));
        boss.armor_phase = new_phase;
    }

    for event in events {
        state.push_event(event);
    }
    applied
}

/// Resolve a player hitbox connecting with the boss.
///
/// Super-armor: no hitstun, no knockback, no combo scaling. Returns the
/// damage applied.
pub fn apply_strike(state: &mut WorldState, hitbox: &Hitbox, overlap: &Rect) -> Fixed {
    let limb = limb_for_overlap(&state.boss, overlap);
    let by = hitbox.owner.player();
    let applied = apply_boss_damage(state, hitbox.damage, Some(limb), by);
    if applied > 0 {
        let tick = state.tick;
        state.push_event(GameEvent::hit_landed(tick, hitbox.owner, EntityId::Boss, applied, 0, false));
    }
    applied
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Live hitbox of the boss, if any.
pub fn boss_hitbox(boss: &BossState) -> Option<Hitbox> {
    if !boss.action.hitbox_live() || boss.health <= 0 {
        return None;
    }
    let pattern = BossPattern::from_index(boss.current_pattern?)?;
    Some(Hitbox::from_move(
        EntityId::Boss,
        boss.body.position,
        boss.facing,
        pattern.move_data(),
        Priority::Heavy,
        boss.action.age,
    ))
}

/// Advance the boss's weapon state machine by one tick.
pub fn advance_boss_action(boss: &mut BossState) {
    boss.action.age = boss.action.age.saturating_add(1);
    boss.action.timer = boss.action.timer.saturating_sub(1);
    if boss.action.timer > 0 || boss.action.is(WeaponState::Idle) {
        return;
    }

    let pattern = boss.current_pattern.and_then(BossPattern::from_index);
    match (boss.action.state, pattern) {
        (WeaponState::Startup, Some(p)) => boss.action.enter(WeaponState::Active, p.move_data().active),
        (WeaponState::Active, Some(p)) => boss.action.enter(WeaponState::Recovery, p.move_data().recovery),
        _ => {
            boss.current_pattern = None;
            boss.action.reset();
        }
    }
}

// =============================================================================
// DIRECTOR
// =============================================================================

/// Check whether `player_id` may trigger the finisher right now.
pub fn finisher_eligible(state: &WorldState, player_id: &PlayerId) -> bool {
    let boss = &state.boss;
    if state.finisher.is_some() || boss.health <= 0 || !boss.staggered || boss.armor_phase < FINAL_PHASE {
        return false;
    }
    if ratio_bp(boss.health, boss.max_health) > FINISHER_HEALTH_BP {
        return false;
    }
    state.players.get(player_id).is_some_and(|p| {
        !p.is_defeated() && fixed_abs(p.body.position.x - boss.body.position.x) <= FINISHER_RANGE
    })
}

/// Start the finisher. Locks input and makes the boss untouchable.
pub fn start_finisher(state: &mut WorldState, player_id: PlayerId) {
    let tick = state.tick;
    state.finisher = Some(FinisherState { player_id, elapsed: 0 });
    state.boss.untouchable = true;
    state.boss.body.velocity.x = 0;
    state.push_event(GameEvent::finisher(tick, GameEventData::FinisherStarted { player_id }));
}

fn advance_finisher(state: &mut WorldState) {
    let tick = state.tick;
    let Some(mut finisher) = state.finisher else {
        return;
    };

    if let Some((_, cue)) = FINISHER_CUES.iter().find(|(at, _)| *at == finisher.elapsed) {
        let player_id = finisher.player_id;
        state.push_event(GameEvent::finisher(tick, GameEventData::FinisherCue { player_id, cue: *cue }));
    }

    finisher.elapsed += 1;
    if finisher.elapsed < FINISHER_TICKS {
        state.finisher = Some(finisher);
        return;
    }

    let player_id = finisher.player_id;
    state.finisher = None;
    state.boss.untouchable = false;
    state.boss.health = 0;
    state.boss.last_attacker = Some(player_id);
    state.push_event(GameEvent::finisher(tick, GameEventData::FinisherEnded { player_id }));
    defeat_boss(state, true);
}

/// Boss defeat flow: defeat event, one reward per present player, re-init.
fn defeat_boss(state: &mut WorldState, finisher: bool) {
    let tick = state.tick;
    let by = state.boss.last_attacker;
    state.push_event(GameEvent::new(
        tick,
        EventPriority::Boss,
        GameEventData::BossDefeated { by, finisher },
    ));
    let rewards: Vec<GameEvent> = state
        .players
        .keys()
        .map(|id| GameEvent::reward_granted(tick, *id, DEFEAT_REWARD))
        .collect();
    for event in rewards {
        state.push_event(event);
    }
    state.bosses_defeated = state.bosses_defeated.saturating_add(1);
    state.reset_boss();
}

/// Run the boss for one tick, after players have been updated.
pub fn direct_boss(state: &mut WorldState) {
    if state.finisher.is_some() {
        advance_finisher(state);
        return;
    }
    if state.boss.health <= 0 {
        defeat_boss(state, false);
        return;
    }

    let tick = state.tick;
    let boss = &mut state.boss;

    if boss.staggered {
        boss.body.velocity.x = 0;
        boss.stagger_timer = boss.stagger_timer.saturating_sub(1);
        if boss.stagger_timer == 0 {
            boss.staggered = false;
            state.push_event(GameEvent::new(tick, EventPriority::Boss, GameEventData::BossRecovered));
        }
        return;
    }

    boss.attack_cooldown = boss.attack_cooldown.saturating_sub(1);
    if !boss.action.is(WeaponState::Idle) {
        boss.body.velocity.x = 0;
        return;
    }

    // Nearest standing player; ties go to the lower id
    let boss_x = boss.body.position.x;
    let nearest = state
        .players
        .values()
        .filter(|p| !p.is_defeated())
        .map(|p| p.body.position.x - boss_x)
        .fold(None, |best: Option<Fixed>, dx| match best {
            Some(b) if fixed_abs(b) <= fixed_abs(dx) => Some(b),
            _ => Some(dx),
        });

    let boss = &mut state.boss;
    let Some(dx) = nearest else {
        boss.body.velocity.x = 0;
        return;
    };
    boss.facing = Facing::from_sign(dx, boss.facing);

    if fixed_abs(dx) <= ENGAGE_RANGE && boss.attack_cooldown == 0 {
        boss.body.velocity.x = 0;
        let weights: Vec<u32> = BossPattern::ALL
            .iter()
            .map(|p| if boss.limb_broken(p.limb()) { 0 } else { p.weight() })
            .collect();
        if let Some(index) = state.rng.choose_weighted(&weights) {
            let pattern = BossPattern::ALL[index];
            let boss = &mut state.boss;
            boss.action.enter(WeaponState::Startup, pattern.move_data().startup);
            boss.current_pattern = Some(index as u8);
            boss.attack_cooldown = ATTACK_COOLDOWN_TICKS;
            state.push_event(GameEvent::new(
                tick,
                EventPriority::Boss,
                GameEventData::BossAttackStarted {
                    pattern: pattern.move_data().name.to_string(),
                    limb: pattern.limb(),
                },
            ));
        }
    } else if fixed_abs(dx) > STANDOFF_RANGE {
        boss.body.velocity.x = boss.facing.sign() * WALK_SPEED;
    } else {
        boss.body.velocity.x = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::FixedVec2;
    use crate::game::weapon::WeaponKind;

    fn world() -> WorldState {
        WorldState::new(42, FixedVec2::new(from_int(6), 0))
    }

    fn count_events(state: &WorldState, pred: impl Fn(&GameEventData) -> bool) -> usize {
        state.pending_events.iter().filter(|e| pred(&e.data)).count()
    }

    #[test]
    fn test_armor_phase_table() {
        let max = from_int(800);
        assert_eq!(armor_phase_for(max, max), 1);
        assert_eq!(armor_phase_for(from_int(560), max), 2);
        assert_eq!(armor_phase_for(from_int(561), max), 1);
        assert_eq!(armor_phase_for(from_int(300), max), 3);
        assert_eq!(armor_phase_for(from_int(160), max), 4);
        assert_eq!(armor_phase_for(0, max), 4);
        assert_eq!(armor_reduction_bp(3), 3_000);
        assert_eq!(armor_reduction_bp(4), 5_000);
    }

    #[test]
    fn test_limb_break_scenario() {
        let mut state = world();
        let attacker = PlayerId::new([1; 16]);
        state.boss.health = from_int(300);
        state.boss.armor_phase = 3;
        state.boss.limbs.get_mut(&Limb::LeftArm).unwrap().health = from_int(10);

        let applied = apply_boss_damage(&mut state, from_int(40), Some(Limb::LeftArm), Some(attacker));

        assert_eq!(applied, from_int(28));
        assert_eq!(state.boss.health, from_int(272));
        assert_eq!(state.boss.break_gauge, from_int(14));
        let arm = state.boss.limbs[&Limb::LeftArm];
        assert!(arm.broken);
        assert_eq!(arm.health, 0);
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::LimbBroken { .. })), 1);

        // Further damage to the broken limb does not re-fire
        apply_boss_damage(&mut state, from_int(40), Some(Limb::LeftArm), Some(attacker));
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::LimbBroken { .. })), 1);
    }

    #[test]
    fn test_break_gauge_staggers() {
        let mut state = world();
        state.boss.break_gauge = from_int(90);
        state.boss.action.enter(WeaponState::Startup, 10);
        state.boss.current_pattern = Some(0);

        apply_boss_damage(&mut state, from_int(40), None, None);

        assert!(state.boss.staggered);
        assert_eq!(state.boss.stagger_timer, BREAK_STAGGER_TICKS);
        assert_eq!(state.boss.break_gauge, 0);
        assert_eq!(state.boss.action.state, WeaponState::Idle);

        // Stagger counts down and recovers once
        for _ in 0..BREAK_STAGGER_TICKS {
            direct_boss(&mut state);
        }
        assert!(!state.boss.staggered);
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::BossRecovered)), 1);
    }

    #[test]
    fn test_phase_change_fires_once() {
        let mut state = world();
        state.boss.health = from_int(570);
        apply_boss_damage(&mut state, from_int(20), None, None);
        apply_boss_damage(&mut state, from_int(5), None, None);
        assert_eq!(state.boss.armor_phase, 2);
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::BossPhaseChanged { .. })), 1);
    }

    #[test]
    fn test_limb_routing() {
        let boss = BossState::new(FixedVec2::new(from_int(6), 0));
        let upper_left = Rect::new(FixedVec2::new(from_int(5), from_int(3)), FixedVec2::new(from_centi(550), from_centi(340)));
        let lower_right = Rect::new(FixedVec2::new(from_centi(650), 0), FixedVec2::new(from_int(7), from_int(1)));
        assert_eq!(limb_for_overlap(&boss, &upper_left), Limb::LeftArm);
        assert_eq!(limb_for_overlap(&boss, &lower_right), Limb::RightLeg);
    }

    #[test]
    fn test_boss_walks_then_attacks() {
        let mut state = world();
        state.add_player(PlayerId::new([1; 16]), WeaponKind::Katana, FixedVec2::new(from_int(-6), 0));

        direct_boss(&mut state);
        assert_eq!(state.boss.facing, Facing::Left);
        assert_eq!(state.boss.body.velocity.x, -WALK_SPEED);

        state.boss.body.position.x = from_int(-2);
        direct_boss(&mut state);
        assert_eq!(state.boss.action.state, WeaponState::Startup);
        assert_eq!(state.boss.attack_cooldown, ATTACK_COOLDOWN_TICKS);
        assert!(state.boss.current_pattern.is_some());
    }

    #[test]
    fn test_broken_limbs_remove_patterns() {
        let mut state = world();
        state.add_player(PlayerId::new([1; 16]), WeaponKind::Katana, FixedVec2::new(from_int(4), 0));
        for limb in [Limb::LeftArm, Limb::RightArm, Limb::LeftLeg] {
            state.boss.limbs.get_mut(&limb).unwrap().broken = true;
        }
        direct_boss(&mut state);
        assert_eq!(state.boss.current_pattern, Some(BossPattern::SweepKick as u8));

        // Everything broken: no attack, rng untouched
        state.boss.limbs.get_mut(&Limb::RightLeg).unwrap().broken = true;
        state.boss.action.reset();
        state.boss.attack_cooldown = 0;
        let rng_before = state.rng.clone();
        direct_boss(&mut state);
        assert_eq!(state.boss.action.state, WeaponState::Idle);
        assert_eq!(state.rng, rng_before);
    }

    #[test]
    fn test_boss_pattern_cycle() {
        let mut boss = BossState::new(FixedVec2::new(from_int(6), 0));
        let data = BossPattern::Stomp.move_data();
        boss.current_pattern = Some(BossPattern::Stomp as u8);
        boss.action.enter(WeaponState::Startup, data.startup);

        let mut live = 0;
        for _ in 0..data.total_ticks() {
            advance_boss_action(&mut boss);
            if let Some(hitbox) = boss_hitbox(&boss) {
                live += 1;
                // Stomp covers both sides
                assert!(hitbox.rect.min.x < boss.body.position.x);
                assert!(hitbox.rect.max.x > boss.body.position.x);
            }
        }
        assert_eq!(live, data.active);
        assert_eq!(boss.action.state, WeaponState::Idle);
        assert_eq!(boss.current_pattern, None);
    }

    #[test]
    fn test_finisher_sequence() {
        let mut state = world();
        let p1 = PlayerId::new([1; 16]);
        let p2 = PlayerId::new([2; 16]);
        state.add_player(p1, WeaponKind::Longsword, FixedVec2::new(from_int(4), 0));
        state.add_player(p2, WeaponKind::Fists, FixedVec2::new(from_int(-8), 0));
        state.boss.health = from_int(60);
        state.boss.armor_phase = FINAL_PHASE;

        assert!(!finisher_eligible(&state, &p1));
        state.boss.staggered = true;
        state.boss.stagger_timer = 100;
        assert!(finisher_eligible(&state, &p1));
        assert!(!finisher_eligible(&state, &p2));

        start_finisher(&mut state, p1);
        assert!(state.input_locked());
        assert!(state.boss.untouchable);
        assert_eq!(apply_boss_damage(&mut state, from_int(50), None, Some(p2)), 0);

        for _ in 0..FINISHER_TICKS {
            direct_boss(&mut state);
        }

        assert!(!state.input_locked());
        assert_eq!(state.bosses_defeated, 1);
        assert_eq!(state.boss.health, BossState::MAX_HEALTH);
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::FinisherCue { .. })), 4);
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::FinisherEnded { .. })), 1);
        assert_eq!(
            count_events(&state, |d| matches!(d, GameEventData::BossDefeated { finisher: true, .. })),
            1
        );
        assert_eq!(count_events(&state, |d| matches!(d, GameEventData::RewardGranted { amount: 100, .. })), 2);
    }

    #[test]
    fn test_lethal_damage_triggers_defeat_flow() {
        let mut state = world();
        let p1 = PlayerId::new([1; 16]);
        state.add_player(p1, WeaponKind::Scythe, FixedVec2::new(from_int(4), 0));
        state.boss.health = from_int(10);
        state.boss.armor_phase = FINAL_PHASE;

        apply_boss_damage(&mut state, from_int(40), None, Some(p1));
        assert_eq!(state.boss.health, 0);
        direct_boss(&mut state);

        assert_eq!(state.bosses_defeated, 1);
        assert!(state.pending_events.iter().any(|e| matches!(
            e.data,
            GameEventData::BossDefeated { by: Some(id), finisher: false } if id == p1
        )));
        assert_eq!(state.boss.armor_phase, 1);
    }
}
