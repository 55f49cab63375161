//! Input Reconciler
//!
//! Owns the authoritative world and decides what to do with each tagged
//! input: queue it for the tick being assembled, buffer it for a future
//! tick, or roll back to the snapshot at its tick and resimulate to the
//! present. Inputs older than the oldest retained snapshot are dropped.
//!
//! The reconciler is the single owner of the world. Calls are serialized by
//! `&mut self`, so an input can never interleave with a resimulation.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::hash::StateHash;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{InputFrame, TickInputs, WorldCommand};
use crate::game::state::{PlayerId, WorldState};
use crate::game::tick::{SimConfig, TickResult, replay, step};
use crate::netcode::snapshot::SnapshotStore;

/// Why an input was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputRejected {
    /// Older than the retention window; the action is lost.
    #[error("input for tick {tick} is older than the oldest snapshot ({oldest})")]
    Stale {
        /// Tag on the input
        tick: u32,
        /// Oldest retained tick
        oldest: u32,
    },

    /// Player is neither present nor joining.
    #[error("unknown player {player}")]
    UnknownPlayer {
        /// Claimed player
        player: PlayerId,
    },

    /// Tagged too far in the future.
    #[error("input for tick {tick} is more than {max_lead} ticks ahead of {current}")]
    TooFarAhead {
        /// Tag on the input
        tick: u32,
        /// Current authoritative tick
        current: u32,
        /// Allowed lead
        max_lead: u32,
    },
}

/// What happened to an accepted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDisposition {
    /// Queued for the tick being assembled
    Pending,
    /// Held until the simulation reaches its tick
    Buffered,
    /// Late, but identical to what was already applied
    Unchanged,
    /// Late input spliced in and the timeline recomputed
    RolledBack {
        /// Tick the world was restored to
        from: u32,
        /// Number of ticks resimulated
        resimulated: u32,
        /// Events the corrected timeline produced that were not emitted before
        corrected_events: Vec<GameEvent>,
    },
}

/// Counters for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilerStats {
    /// Ticks advanced
    pub ticks: u64,
    /// Inputs accepted
    pub inputs_accepted: u64,
    /// Rollbacks performed
    pub rollbacks: u64,
    /// Ticks replayed by rollbacks
    pub resimulated_ticks: u64,
    /// Late inputs dropped outside the window
    pub stale_dropped: u64,
    /// Inputs rejected for other reasons
    pub rejected: u64,
}

/// Authoritative loop state: world, snapshots and input history.
#[derive(Clone, Debug)]
pub struct InputReconciler {
    world: WorldState,
    store: SnapshotStore,
    /// Inputs per tick, kept for every tick a rollback could still replay
    history: BTreeMap<u32, TickInputs>,
    /// Events emitted per tick, for rollback event correction
    event_log: BTreeMap<u32, Vec<GameEvent>>,
    config: SimConfig,
    max_input_lead: u32,
    stats: ReconcilerStats,
}

impl InputReconciler {
    /// Create a reconciler around `world`, retaining `window` snapshots.
    pub fn new(world: WorldState, config: SimConfig, window: usize, max_input_lead: u32) -> Self {
        let mut store = SnapshotStore::new(window);
        store.commit(&world);

        Self {
            world,
            store,
            history: BTreeMap::new(),
            event_log: BTreeMap::new(),
            config,
            max_input_lead,
            stats: ReconcilerStats::default(),
        }
    }

    /// Current authoritative tick (the one being assembled).
    pub fn current_tick(&self) -> u32 {
        self.world.tick
    }

    /// Oldest tick a late input can still correct.
    pub fn oldest_tick(&self) -> u32 {
        self.store.oldest_tick().unwrap_or(self.world.tick)
    }

    /// Read-only view of the committed world.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Snapshot store.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.store
    }

    /// Recorded inputs for a tick.
    pub fn inputs_at(&self, tick: u32) -> Option<&TickInputs> {
        self.history.get(&tick)
    }

    /// Events emitted for a tick on the current timeline.
    pub fn events_at(&self, tick: u32) -> &[GameEvent] {
        self.event_log.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Counters.
    pub fn stats(&self) -> ReconcilerStats {
        self.stats
    }

    /// Hash of the committed world.
    pub fn state_hash(&self) -> StateHash {
        self.world.compute_hash()
    }

    fn is_known(&self, player: &PlayerId) -> bool {
        self.world.players.contains_key(player)
            || self.history.values().any(|inputs| {
                inputs.commands.iter().any(|c| {
                    matches!(c, WorldCommand::Join { player_id, .. } if player_id == player)
                })
            })
    }

    /// Accept an input tagged with `tick`.
    ///
    /// Frames for the same player and tick are OR-merged. A late input that
    /// changes nothing does not trigger a resimulation.
    pub fn submit_input(
        &mut self,
        player: PlayerId,
        tick: u32,
        frame: InputFrame,
    ) -> Result<InputDisposition, InputRejected> {
        let current = self.world.tick;

        if !self.is_known(&player) {
            self.stats.rejected += 1;
            debug!(player = %player.short(), tick, "input from unknown player");
            return Err(InputRejected::UnknownPlayer { player });
        }

        if tick > current.saturating_add(self.max_input_lead) {
            self.stats.rejected += 1;
            warn!(player = %player.short(), tick, current, "input too far ahead, rejected");
            return Err(InputRejected::TooFarAhead {
                tick,
                current,
                max_lead: self.max_input_lead,
            });
        }

        if tick < current {
            let oldest = self.oldest_tick();
            if tick < oldest || !self.store.contains(tick) {
                self.stats.stale_dropped += 1;
                warn!(player = %player.short(), tick, oldest, current, "stale input dropped");
                return Err(InputRejected::Stale { tick, oldest });
            }
        }

        let changed = self.history.entry(tick).or_default().merge_frame(player, frame);
        self.stats.inputs_accepted += 1;

        if tick == current {
            return Ok(InputDisposition::Pending);
        }
        if tick > current {
            return Ok(InputDisposition::Buffered);
        }
        if !changed {
            return Ok(InputDisposition::Unchanged);
        }

        let (resimulated, corrected_events) = self.rollback(tick)?;
        Ok(InputDisposition::RolledBack {
            from: tick,
            resimulated,
            corrected_events,
        })
    }

    /// Queue a roster or arena command for the tick being assembled.
    ///
    /// A leave discards the player's frames buffered for this and later ticks.
    pub fn queue_command(&mut self, command: WorldCommand) {
        let current = self.world.tick;
        if let WorldCommand::Leave { player_id } = command {
            for inputs in self.history.range_mut(current..).map(|(_, inputs)| inputs) {
                inputs.discard_player(&player_id);
            }
        }
        self.history.entry(current).or_default().push_command(command);
    }

    /// Run the tick being assembled and commit the result.
    pub fn advance(&mut self) -> TickResult {
        let empty = TickInputs::new();
        let inputs = self.history.get(&self.world.tick).unwrap_or(&empty);
        let result = step(&mut self.world, inputs, &self.config);

        self.store.commit(&self.world);
        self.event_log.insert(result.tick, result.events.clone());
        self.stats.ticks += 1;
        self.prune();

        for event in &result.events {
            log_lifecycle(event);
        }

        result
    }

    /// Restore the snapshot at `from` and replay every tick up to the
    /// present, recommitting snapshots and the event log on the way.
    ///
    /// Returns the number of ticks replayed and the events that are new on
    /// the corrected timeline.
    fn rollback(&mut self, from: u32) -> Result<(u32, Vec<GameEvent>), InputRejected> {
        let present = self.world.tick;
        let mut world = self.store.restore(from).ok_or_else(|| InputRejected::Stale {
            tick: from,
            oldest: self.oldest_tick(),
        })?;

        debug!(from, present, "rollback");

        let empty = TickInputs::new();
        let mut corrected = Vec::new();
        while world.tick < present {
            let inputs = self.history.get(&world.tick).unwrap_or(&empty);
            let result = step(&mut world, inputs, &self.config);
            self.store.commit(&world);

            let previous = self.event_log.insert(result.tick, result.events.clone()).unwrap_or_default();
            corrected.extend(new_events(&result.events, &previous));
        }

        let resimulated = present - from;
        self.world = world;
        self.stats.rollbacks += 1;
        self.stats.resimulated_ticks += u64::from(resimulated);

        debug!(from, resimulated, corrected = corrected.len(), "resimulated");
        for event in &corrected {
            log_lifecycle(event);
        }

        Ok((resimulated, corrected))
    }

    /// Recompute the present from the snapshot at `tick` without touching
    /// the committed timeline.
    pub fn replay_from(&self, tick: u32) -> Result<WorldState, InputRejected> {
        let mut world = self.store.restore(tick).ok_or_else(|| InputRejected::Stale {
            tick,
            oldest: self.oldest_tick(),
        })?;

        let ticks = self.world.tick.saturating_sub(world.tick);
        let (world, _) = replay(world, &self.history, ticks, &self.config);
        Ok(world)
    }

    /// Forget inputs and events no snapshot can reach anymore.
    fn prune(&mut self) {
        let oldest = self.oldest_tick();
        self.history = self.history.split_off(&oldest);
        self.event_log = self.event_log.split_off(&oldest);
    }
}

/// Events in `current` that have no equal counterpart in `previous`.
fn new_events(current: &[GameEvent], previous: &[GameEvent]) -> Vec<GameEvent> {
    let mut unmatched: Vec<&GameEvent> = previous.iter().collect();
    current
        .iter()
        .filter(|event| match unmatched.iter().position(|p| *p == *event) {
            Some(i) => {
                unmatched.swap_remove(i);
                false
            }
            None => true,
        })
        .cloned()
        .collect()
}

fn log_lifecycle(event: &GameEvent) {
    match &event.data {
        GameEventData::BossPhaseChanged { old_phase, new_phase } => {
            info!(tick = event.tick, old_phase, new_phase, "boss phase changed");
        }
        GameEventData::LimbBroken { limb, .. } => {
            info!(tick = event.tick, limb = limb.name(), "limb broken");
        }
        GameEventData::BossStaggered { .. } => {
            info!(tick = event.tick, "boss staggered");
        }
        GameEventData::FinisherStarted { player_id } => {
            info!(tick = event.tick, player = %player_id.short(), "finisher started");
        }
        GameEventData::BossDefeated { finisher, .. } => {
            info!(tick = event.tick, finisher, "boss defeated");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::weapon::WeaponKind;

    fn pid(b: u8) -> PlayerId {
        PlayerId::new([b; 16])
    }

    fn reconciler(window: usize) -> InputReconciler {
        let config = SimConfig::default();
        let world = config.new_world(4242);
        let mut rec = InputReconciler::new(world, config, window, 120);
        rec.queue_command(WorldCommand::Join { player_id: pid(1), weapon: WeaponKind::Longsword });
        rec.queue_command(WorldCommand::Join { player_id: pid(2), weapon: WeaponKind::Katana });
        rec.advance();
        rec
    }

    fn run(rec: &mut InputReconciler, ticks: u32) {
        for _ in 0..ticks {
            rec.advance();
        }
    }

    #[test]
    fn test_current_tick_input_is_pending() {
        let mut rec = reconciler(120);
        let tick = rec.current_tick();
        let result = rec.submit_input(pid(1), tick, InputFrame::with_buttons(InputFrame::FLAG_RIGHT));
        assert_eq!(result, Ok(InputDisposition::Pending));

        let before = rec.world().players[&pid(1)].body.position.x;
        rec.advance();
        assert!(rec.world().players[&pid(1)].body.position.x > before);
    }

    #[test]
    fn test_ahead_input_is_buffered_until_its_tick() {
        let mut rec = reconciler(120);
        let target = rec.current_tick() + 3;
        let result = rec.submit_input(pid(1), target, InputFrame::with_buttons(InputFrame::FLAG_LIGHT));
        assert_eq!(result, Ok(InputDisposition::Buffered));

        run(&mut rec, 3);
        assert!(rec.world().players[&pid(1)].current_move.is_none());
        rec.advance();
        assert!(rec.world().players[&pid(1)].current_move.is_some());
    }

    #[test]
    fn test_too_far_ahead_rejected() {
        let mut rec = reconciler(120);
        let current = rec.current_tick();
        let result = rec.submit_input(pid(1), current + 500, InputFrame::new());
        assert!(matches!(result, Err(InputRejected::TooFarAhead { .. })));
        assert_eq!(rec.stats().rejected, 1);
    }

    #[test]
    fn test_unknown_player_rejected() {
        let mut rec = reconciler(120);
        let result = rec.submit_input(pid(9), rec.current_tick(), InputFrame::new());
        assert_eq!(result, Err(InputRejected::UnknownPlayer { player: pid(9) }));
    }

    #[test]
    fn test_joining_player_may_send_input_same_tick() {
        let mut rec = reconciler(120);
        rec.queue_command(WorldCommand::Join { player_id: pid(3), weapon: WeaponKind::Fists });
        let result = rec.submit_input(pid(3), rec.current_tick(), InputFrame::new());
        assert_eq!(result, Ok(InputDisposition::Pending));
    }

    #[test]
    fn test_late_input_rolls_back() {
        let mut rec = reconciler(120);
        run(&mut rec, 30);
        let late = rec.current_tick() - 20;

        let result = rec.submit_input(pid(1), late, InputFrame::with_buttons(InputFrame::FLAG_RIGHT));
        match result {
            Ok(InputDisposition::RolledBack { from, resimulated, .. }) => {
                assert_eq!(from, late);
                assert_eq!(resimulated, 20);
            }
            other => panic!("expected rollback, got {:?}", other),
        }
        assert_eq!(rec.current_tick(), late + 20);
        assert_eq!(rec.stats().rollbacks, 1);
    }

    #[test]
    fn test_repeated_late_input_is_unchanged() {
        let mut rec = reconciler(120);
        run(&mut rec, 10);
        let late = rec.current_tick() - 5;
        let frame = InputFrame::with_buttons(InputFrame::FLAG_JUMP);

        assert!(matches!(rec.submit_input(pid(1), late, frame), Ok(InputDisposition::RolledBack { .. })));
        assert_eq!(rec.submit_input(pid(1), late, frame), Ok(InputDisposition::Unchanged));
        assert_eq!(rec.stats().rollbacks, 1);
    }

    #[test]
    fn test_stale_input_leaves_no_trace() {
        let mut rec = reconciler(10);
        run(&mut rec, 40);
        let hash = rec.state_hash();
        let oldest = rec.oldest_tick();

        let result = rec.submit_input(pid(1), oldest - 1, InputFrame::with_buttons(InputFrame::FLAG_LIGHT));

        assert_eq!(result, Err(InputRejected::Stale { tick: oldest - 1, oldest }));
        assert_eq!(rec.state_hash(), hash);
        assert!(rec.inputs_at(oldest - 1).is_none());
        assert_eq!(rec.stats().stale_dropped, 1);
    }

    #[test]
    fn test_rollback_matches_timely_delivery() {
        // One reconciler gets the input on time, the other late
        let mut timely = reconciler(120);
        let mut late = reconciler(120);
        let frame = InputFrame::with_buttons(InputFrame::FLAG_HEAVY);

        run(&mut timely, 5);
        run(&mut late, 5);
        let tag = timely.current_tick();
        timely.submit_input(pid(2), tag, frame).unwrap();
        run(&mut timely, 25);
        run(&mut late, 25);
        late.submit_input(pid(2), tag, frame).unwrap();

        assert_eq!(late.current_tick(), timely.current_tick());
        assert_eq!(late.state_hash(), timely.state_hash());
        for tick in tag..timely.current_tick() {
            assert_eq!(late.events_at(tick), timely.events_at(tick));
        }
    }

    #[test]
    fn test_replay_from_reproduces_present() {
        let mut rec = reconciler(60);
        for t in 0..50u32 {
            let buttons = if t % 5 == 0 { InputFrame::FLAG_LIGHT } else { InputFrame::FLAG_LEFT };
            let tick = rec.current_tick();
            rec.submit_input(pid(1), tick, InputFrame::with_buttons(buttons)).unwrap();
            rec.advance();
        }

        let oldest = rec.oldest_tick();
        let replayed = rec.replay_from(oldest).unwrap();
        assert_eq!(replayed.compute_hash(), rec.state_hash());
        assert_eq!(&replayed, rec.world());
    }

    #[test]
    fn test_history_pruned_to_window() {
        let mut rec = reconciler(8);
        for _ in 0..30 {
            let tick = rec.current_tick();
            rec.submit_input(pid(1), tick, InputFrame::with_buttons(InputFrame::FLAG_RIGHT)).unwrap();
            rec.advance();
        }
        let oldest = rec.oldest_tick();
        assert!(rec.inputs_at(oldest - 1).is_none());
        assert!(rec.inputs_at(oldest).is_some());
        assert!(rec.events_at(0).is_empty());
    }

    #[test]
    fn test_leave_discards_buffered_frames() {
        let mut rec = reconciler(120);
        let ahead = rec.current_tick() + 2;
        rec.submit_input(pid(1), ahead, InputFrame::with_buttons(InputFrame::FLAG_LIGHT)).unwrap();

        rec.queue_command(WorldCommand::Leave { player_id: pid(1) });
        assert!(!rec.inputs_at(ahead).is_some_and(|i| i.frames.contains_key(&pid(1))));

        rec.advance();
        assert!(!rec.world().players.contains_key(&pid(1)));
    }

    #[test]
    fn test_new_events_is_multiset_difference() {
        let a = GameEvent::reward_granted(1, pid(1), 100);
        let b = GameEvent::reward_granted(1, pid(2), 100);

        assert!(new_events(&[a.clone()], &[a.clone()]).is_empty());
        assert_eq!(new_events(&[a.clone(), a.clone()], &[a.clone()]), vec![a.clone()]);
        assert_eq!(new_events(&[a.clone(), b.clone()], &[a]), vec![b]);
    }
}
