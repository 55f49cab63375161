//! Authoritative Simulation Tick
//!
//! The step function. It must be 100% deterministic: resimulation after a
//! rollback replays it with the same inputs and expects the same bits.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE, TICK_DURATION, from_int};
use crate::core::vec2::FixedVec2;
use crate::game::boss;
use crate::game::combat::{self, COMBO_RESET_TICKS, PARRY_WINDOW_TICKS};
use crate::game::events::{EventPriority, GameEvent, GameEventData, sort_events};
use crate::game::input::{InputFrame, Press, TickInputs, WorldCommand};
use crate::game::physics::{self, AIR_STEER_SPEED, JUMP_VELOCITY, Stage, WALK_SPEED};
use crate::game::state::{Facing, PlayerId, PlayerState, WeaponState, WorldState};
use crate::game::weapon::{MoveSlot, WeaponKind};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick that was simulated
    pub tick: u32,
    /// Events generated this tick, in processing order
    pub events: Vec<GameEvent>,
}

/// Configuration for the simulation.
///
/// Immutable for the lifetime of a reconciler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Ticks per second
    pub tick_rate: u32,
    /// Seconds per tick in fixed point
    pub dt: Fixed,
    /// Stage geometry
    pub stage: Stage,
    /// Spawn points for joining players (cycled)
    pub spawn_points: Vec<FixedVec2>,
    /// Boss spawn point
    pub boss_spawn: FixedVec2,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            dt: TICK_DURATION,
            stage: Stage::default(),
            spawn_points: vec![
                FixedVec2::new(from_int(-8), 0),
                FixedVec2::new(from_int(-4), 0),
                FixedVec2::new(from_int(-6), 0),
                FixedVec2::new(from_int(-2), 0),
            ],
            boss_spawn: FixedVec2::new(from_int(6), 0),
        }
    }
}

impl SimConfig {
    /// Default geometry at a given tick rate.
    pub fn with_tick_rate(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            tick_rate,
            dt: FIXED_ONE / tick_rate as Fixed,
            ..Self::default()
        }
    }

    /// Spawn point for the n-th player present.
    pub fn spawn_for(&self, index: usize) -> FixedVec2 {
        if self.spawn_points.is_empty() {
            return FixedVec2::ZERO;
        }
        self.spawn_points[index % self.spawn_points.len()]
    }

    /// Fresh world for this configuration.
    pub fn new_world(&self, seed: u64) -> WorldState {
        WorldState::new(seed, self.boss_spawn)
    }
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The world (mutated in place)
/// * `inputs` - Frames and commands for `state.tick`
/// * `config` - Simulation configuration
///
/// # Determinism
///
/// - Uses BTreeMap for iteration order
/// - Uses fixed-point math only
/// - Uses deterministic RNG (state.rng)
/// - No system calls, no floating point
pub fn step(state: &mut WorldState, inputs: &TickInputs, config: &SimConfig) -> TickResult {
    #[cfg(feature = "debug-tracing")]
    tracing::trace!(tick = state.tick, players = state.players.len(), "step");

    // 0. Roster and arena commands
    apply_commands(state, &inputs.commands, config);

    // 1. Player inputs
    apply_inputs(state, inputs, &config.stage);

    // 2. Physics
    update_physics(state, config);

    // 3. Combat
    combat::resolve_combat(state);

    // 4. Boss director (after players are updated)
    boss::direct_boss(state);

    // 5. Player timers
    update_player_timers(state);

    // 6. Advance tick counter
    let tick = state.tick;
    state.tick += 1;

    // 7. Collect events
    let mut events = state.take_events();
    sort_events(&mut events);

    TickResult { tick, events }
}

/// Apply roster and arena commands in arrival order.
fn apply_commands(state: &mut WorldState, commands: &[WorldCommand], config: &SimConfig) {
    let tick = state.tick;
    for command in commands {
        match *command {
            WorldCommand::Join { player_id, weapon } => {
                let spawn = config.spawn_for(state.players.len());
                if state.add_player(player_id, weapon, spawn) {
                    state.push_event(GameEvent::roster(tick, GameEventData::PlayerJoined { player_id, weapon }));
                }
            }
            WorldCommand::Leave { player_id } => {
                if state.remove_player(&player_id).is_some() {
                    state.push_event(GameEvent::roster(tick, GameEventData::PlayerLeft { player_id }));
                }
            }
            WorldCommand::EquipWeapon { player_id, weapon } => {
                let Some(player) = state.players.get_mut(&player_id) else {
                    continue;
                };
                // Switching is only allowed while idle
                if !player.action.is(WeaponState::Idle) || player.is_defeated() || player.weapon == weapon {
                    continue;
                }
                player.weapon = weapon;
                player.combo_step = 0;
                player.combo_window = 0;
                state.push_event(GameEvent::roster(tick, GameEventData::WeaponEquipped { player_id, weapon }));
            }
            WorldCommand::ResetArena => {
                state.reset_boss();
                state.bosses_defeated = 0;
                for player in state.players.values_mut() {
                    player.respawn();
                }
                state.push_event(GameEvent::roster(tick, GameEventData::ArenaReset));
            }
        }
    }
}

/// Pick the attack the motion buffer asks for, consuming it.
///
/// Motion inputs are grounded only and win over plain presses; the
/// quarter circle is tried first since `down, light` is its subsequence.
fn next_attack(player: &mut PlayerState) -> Option<MoveSlot> {
    let grounded = player.body.on_ground;
    let forward = Press::forward(player.facing.sign());
    let buffer = &mut player.input_buffer;

    if grounded {
        if buffer.consume(&[Press::Down, forward, Press::Light])
            || buffer.consume(&[Press::Down, forward, Press::Heavy])
        {
            return Some(MoveSlot::QuarterCircle);
        }
        if buffer.consume(&[Press::Down, Press::Light]) {
            return Some(MoveSlot::Launcher);
        }
        if buffer.consume(&[forward, Press::Heavy]) {
            return Some(MoveSlot::Smash);
        }
    }
    if buffer.consume(&[Press::Heavy]) {
        return Some(MoveSlot::Heavy);
    }
    if buffer.consume(&[Press::Light]) {
        return Some(if !grounded {
            MoveSlot::Air
        } else if player.combo_window > 0 {
            MoveSlot::Light(player.combo_step)
        } else {
            MoveSlot::Light(0)
        });
    }
    None
}

/// Apply player inputs to their states.
///
/// Attack presses go through the motion buffer, so a press made during
/// another move fires if the player returns to Idle before it expires.
fn apply_inputs(state: &mut WorldState, inputs: &TickInputs, stage: &Stage) {
    let tick = state.tick;
    let locked = state.input_locked();
    let mut techs = Vec::new();
    let mut grabs: Vec<PlayerId> = Vec::new();
    let mut grapples: Vec<(PlayerId, bool)> = Vec::new();

    // BTreeMap iterates in sorted key order - DETERMINISTIC
    for (player_id, player) in state.players.iter_mut() {
        let frame = inputs.frame_for(player_id);
        let pressed = frame.pressed_since(player.held);
        player.held = frame;
        player.pending_input = frame;

        if locked || player.is_defeated() {
            continue;
        }
        player.input_buffer.age();
        player.input_buffer.record(pressed);

        // The chain holds while grab is held
        if player.grapple.is_some() {
            if !frame.has(InputFrame::FLAG_GRAB) && physics::release_grapple(player) {
                grapples.push((*player_id, false));
            }
            continue;
        }

        if pressed.has(InputFrame::FLAG_TECH) {
            if let Some(kind) = combat::try_tech(player) {
                techs.push((*player_id, kind));
                continue;
            }
        }
        if player.on_wall || !player.action.is(WeaponState::Idle) {
            continue;
        }

        // Movement
        let dir = frame.horizontal();
        if dir != 0 {
            let speed = if player.body.on_ground { WALK_SPEED } else { AIR_STEER_SPEED };
            player.body.velocity.x = dir * speed;
            player.facing = Facing::from_sign(dir, player.facing);
        }
        if pressed.has(InputFrame::FLAG_JUMP) && player.body.on_ground {
            player.body.velocity.y = JUMP_VELOCITY;
        }

        // Actions (Idle only)
        if pressed.has(InputFrame::FLAG_PARRY) {
            player.parry_timer = PARRY_WINDOW_TICKS;
        } else if pressed.has(InputFrame::FLAG_GRAB) {
            let aiming_chain =
                player.weapon == WeaponKind::Scythe && frame.has(InputFrame::FLAG_UP) && !player.body.on_ground;
            if !aiming_chain {
                grabs.push(*player_id);
            } else if let Some(anchor) = stage.grapple_anchor(player.body.position) {
                physics::start_grapple(player, anchor);
                grapples.push((*player_id, true));
            }
        } else if let Some(slot) = next_attack(player) {
            combat::start_move(player, slot);
        }
    }

    for (player_id, attached) in grapples {
        state.push_event(GameEvent::grapple(tick, player_id, attached));
    }

    for (player_id, kind) in techs {
        state.push_event(GameEvent::new(
            tick,
            EventPriority::Combat,
            GameEventData::Teched { player_id, kind },
        ));
    }

    // Grab near a finished-off boss starts the finisher instead of a throw
    for player_id in grabs {
        if boss::finisher_eligible(state, &player_id) {
            boss::start_finisher(state, player_id);
            continue;
        }
        if let Some(player) = state.players.get_mut(&player_id) {
            if player.body.on_ground {
                combat::start_move(player, MoveSlot::Grab);
            }
        }
    }
}

/// Integrate every body, then apply wall impacts.
fn update_physics(state: &mut WorldState, config: &SimConfig) {
    let tick = state.tick;
    let mut splats = Vec::new();
    let mut dropped = Vec::new();
    for (player_id, player) in state.players.iter_mut() {
        let outcome = physics::integrate_player(player, config.dt, &config.stage);
        if outcome.splatted {
            splats.push(*player_id);
        }
        if outcome.grapple_dropped {
            dropped.push(*player_id);
        }
    }
    physics::integrate_boss(&mut state.boss, config.dt, &config.stage);

    for player_id in dropped {
        state.push_event(GameEvent::grapple(tick, player_id, false));
    }

    for player_id in splats {
        combat::apply_wall_splat(state, player_id);
    }
}

/// Count down per-player windows; respawn defeated players.
fn update_player_timers(state: &mut WorldState) {
    let tick = state.tick;
    let mut respawned = Vec::new();

    for (player_id, player) in state.players.iter_mut() {
        if player.is_defeated() {
            player.respawn_timer = player.respawn_timer.saturating_sub(1);
            if player.respawn_timer == 0 {
                player.respawn();
                respawned.push(*player_id);
            }
            continue;
        }

        if player.on_wall {
            player.wall_timer = player.wall_timer.saturating_sub(1);
            if player.wall_timer == 0 {
                player.on_wall = false;
                player.wall_dir = 0;
            }
        }
        if player.tech_timer > 0 {
            player.tech_timer -= 1;
            if player.tech_timer == 0 {
                player.tech_eligible = false;
            }
        }
        player.parry_timer = player.parry_timer.saturating_sub(1);
        if player.combo_window > 0 {
            player.combo_window -= 1;
            if player.combo_window == 0 {
                player.combo_step = 0;
            }
        }

        // Attack chains only survive in the air
        if player.body.on_ground {
            player.chain_count = 0;
            player.chain_timer = 0;
        } else if player.chain_timer > 0 {
            player.chain_timer -= 1;
            if player.chain_timer == 0 {
                player.chain_count = 0;
            }
        }

        player.ticks_since_hit = player.ticks_since_hit.saturating_add(1);
        if player.body.on_ground && player.combo_counter > 0 && player.ticks_since_hit >= COMBO_RESET_TICKS {
            player.combo_counter = 0;
        }
    }

    for player_id in respawned {
        state.push_event(GameEvent::roster(tick, GameEventData::PlayerRespawned { player_id }));
    }
}

/// Replay recorded inputs from `initial` for `tick_count` ticks.
///
/// Ticks without a recorded entry run with empty inputs.
/// Returns final state and all events.
pub fn replay(
    initial: WorldState,
    history: &BTreeMap<u32, TickInputs>,
    tick_count: u32,
    config: &SimConfig,
) -> (WorldState, Vec<GameEvent>) {
    let mut state = initial;
    let mut all_events = Vec::new();
    let empty = TickInputs::new();

    for _ in 0..tick_count {
        let inputs = history.get(&state.tick).unwrap_or(&empty);
        let result = step(&mut state, inputs, config);
        all_events.extend(result.events);
    }

    (state, all_events)
}
