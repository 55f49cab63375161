//! Boss Arena Server
//!
//! Runs an offline rollback demo against the deterministic core, verifies
//! it by replay, then drives the live session loop with bot clients.

use std::collections::BTreeMap;
use std::time::Duration;
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use boss_arena::{
    ArenaConfig, DeterministicRng, InputDisposition, InputFrame, InputReconciler, PlayerId,
    WorldCommand, TICK_RATE, VERSION,
    game::{events::GameEventData, weapon::WeaponKind},
    network::{ArenaSession, ButtonState, InputMessage, ServerMessage},
};

/// Worst delivery delay applied to bot inputs, in ticks.
const MAX_JITTER_TICKS: u32 = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ArenaConfig::from_env().context("loading ARENA_* configuration")?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting tracing subscriber")?;

    info!("Boss Arena Server v{}", VERSION);
    info!("Tick Rate: {} Hz (default {})", config.tick_rate, TICK_RATE);
    info!("Snapshot Window: {} ticks", config.snapshot_window);

    rollback_demo(&config)?;
    live_session(config).await?;
    Ok(())
}

/// Scripted bot input: close in on the boss, then mix attacks and parries.
fn bot_frame(rng: &mut DeterministicRng, bot: usize, tick: u32) -> InputFrame {
    let mut buttons = InputFrame::FLAG_RIGHT;
    match (tick + bot as u32 * 11) % 30 {
        0 => buttons |= InputFrame::FLAG_LIGHT,
        10 if rng.next_int(3) == 0 => buttons |= InputFrame::FLAG_HEAVY,
        20 if rng.next_int(4) == 0 => buttons = InputFrame::FLAG_PARRY,
        25 if rng.next_int(5) == 0 => buttons |= InputFrame::FLAG_JUMP,
        27 => buttons |= InputFrame::FLAG_GRAB | InputFrame::FLAG_TECH,
        _ => {}
    }
    InputFrame::with_buttons(buttons)
}

/// Offline demo: bot inputs arrive with random delay, forcing rollbacks.
fn rollback_demo(config: &ArenaConfig) -> anyhow::Result<()> {
    info!("=== Starting Rollback Demo ===");

    let sim = config.sim_config();
    let mut reconciler = InputReconciler::new(
        sim.new_world(config.seed),
        sim,
        config.snapshot_window,
        config.max_input_lead,
    );

    let bots: Vec<(PlayerId, WeaponKind)> = vec![
        (PlayerId::new([1; 16]), WeaponKind::Longsword),
        (PlayerId::new([2; 16]), WeaponKind::Katana),
    ];
    for (player_id, weapon) in &bots {
        reconciler.queue_command(WorldCommand::Join { player_id: *player_id, weapon: *weapon });
        info!("Added player {} with {}", player_id.short(), weapon.name());
    }

    // Separate RNGs: one scripts the bots, one models the network
    let mut script_rng = DeterministicRng::new(config.seed ^ 0x5EED);
    let mut network_rng = DeterministicRng::new(config.seed ^ 0x1A7E);
    let mut in_flight: BTreeMap<u32, Vec<(PlayerId, u32, InputFrame)>> = BTreeMap::new();

    let total_ticks = config.demo_seconds * config.tick_rate;
    let mut total_events = 0usize;
    let mut corrected_events = 0usize;

    for t in 0..total_ticks {
        for (i, (player_id, _)) in bots.iter().enumerate() {
            let frame = bot_frame(&mut script_rng, i, t);
            let delay = network_rng.next_int(MAX_JITTER_TICKS + 1);
            in_flight.entry(t + delay).or_default().push((*player_id, t, frame));
        }

        // Deliver everything due now, tagged with the tick it was meant for
        let current = reconciler.current_tick();
        for (player_id, tag, frame) in in_flight.remove(&current).unwrap_or_default() {
            match reconciler.submit_input(player_id, tag, frame) {
                Ok(InputDisposition::RolledBack { corrected_events: events, .. }) => {
                    corrected_events += events.len();
                }
                Ok(_) => {}
                Err(e) => warn!("Input dropped: {}", e),
            }
        }

        let result = reconciler.advance();
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::PlayerDefeated { player_id, .. } => {
                    info!("Player {} defeated at tick {}", player_id.short(), event.tick);
                }
                GameEventData::RewardGranted { player_id, amount } => {
                    info!("Player {} rewarded {}", player_id.short(), amount);
                }
                _ => {}
            }
        }

        if t % config.tick_rate == 0 {
            let boss = &reconciler.world().boss;
            info!(
                "Tick {}: boss health {:.1}, phase {}, {} events so far",
                t,
                boss_arena::core::fixed::to_float(boss.health),
                boss.armor_phase,
                total_events
            );
        }
    }

    // One input far older than the window, to show the lossy path
    let ancient = reconciler.current_tick().saturating_sub(config.snapshot_window as u32 + 10);
    if let Err(e) = reconciler.submit_input(bots[0].0, ancient, InputFrame::with_buttons(InputFrame::FLAG_LIGHT)) {
        info!("Expected rejection: {}", e);
    }

    let stats = reconciler.stats();
    info!("=== Demo Results ===");
    info!(
        "Ticks: {}, rollbacks: {}, resimulated: {}, stale: {}",
        stats.ticks, stats.rollbacks, stats.resimulated_ticks, stats.stale_dropped
    );
    info!("Events: {} live, {} corrected by rollback", total_events, corrected_events);

    let hash = reconciler.state_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying the retained window
    info!("=== Verifying Determinism ===");
    let replayed = reconciler
        .replay_from(reconciler.oldest_tick())
        .context("replaying retained window")?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}

/// Live demo: the async session loop with two bot clients for a few seconds.
async fn live_session(config: ArenaConfig) -> anyhow::Result<()> {
    info!("=== Starting Live Session ===");
    let duration = Duration::from_secs(u64::from(config.demo_seconds));
    let (session, handle) = ArenaSession::new(config)?;
    let task = tokio::spawn(session.run());

    let (p1, _rx1) = handle.connect(WeaponKind::Scythe).await?;
    let (p2, _rx2) = handle.connect(WeaponKind::Fists).await?;

    let bot_handle = handle.clone();
    let mut updates = handle.subscribe();
    let bots = tokio::spawn(async move {
        let mut rng = DeterministicRng::new(7);
        let mut states = 0u32;
        while let Ok(message) = updates.recv().await {
            match message {
                ServerMessage::State(state) => {
                    states += 1;
                    for (i, player_id) in [p1, p2].into_iter().enumerate() {
                        // Some inputs claim an older tick, as a lagging client would
                        let lag = if rng.next_int(10) == 0 { rng.next_int(6) } else { 0 };
                        let frame = bot_frame(&mut rng, i, state.tick);
                        let input = InputMessage {
                            tick: state.tick.saturating_sub(lag),
                            buttons: ButtonState::from_input_frame(frame),
                        };
                        if bot_handle.send_input(player_id, input).await.is_err() {
                            return states;
                        }
                    }
                }
                ServerMessage::Event(event) => {
                    if let GameEventData::BossDefeated { finisher, .. } = event.data {
                        info!("Boss defeated (finisher: {})", finisher);
                    }
                }
                ServerMessage::Shutdown { .. } => break,
                _ => {}
            }
        }
        states
    });

    tokio::time::sleep(duration).await;
    handle.shutdown();
    task.await.context("session task")?;
    let states = bots.await.context("bot task")?;
    info!("Live session delivered {} state broadcasts", states);
    Ok(())
}
