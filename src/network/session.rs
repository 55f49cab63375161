//! Arena Session
//!
//! Async shell around the deterministic core. One task owns the
//! [`InputReconciler`]; clients talk to it through a cloneable
//! [`SessionHandle`]. Commands are queued on an mpsc channel and drained at
//! the start of each tick, so nothing mutates the world mid-step.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::{mpsc, broadcast};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ArenaConfig, ConfigError};
use crate::core::fixed::to_float;
use crate::game::input::WorldCommand;
use crate::game::state::PlayerId;
use crate::game::tick::TickResult;
use crate::game::weapon::WeaponKind;
use crate::netcode::reconciler::{InputDisposition, InputReconciler};
use crate::network::protocol::{
    BossSnapshot, ClientMessage, InputMessage, LimbSnapshot, PlayerSnapshot, ServerMessage,
    StateBroadcast,
};

/// Maximum fighters in one arena.
pub const MAX_PLAYERS: usize = 4;

/// Capacity of the outbound broadcast channel.
const BROADCAST_CAPACITY: usize = 1024;

/// Capacity of the inbound command channel.
const COMMAND_CAPACITY: usize = 1024;

/// Capacity of each client's direct channel.
const CLIENT_CAPACITY: usize = 64;

/// Requests from connections to the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// New client.
    Connect {
        /// Assigned id
        player_id: PlayerId,
        /// Starting weapon
        weapon: WeaponKind,
        /// Direct channel to this client
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Tagged input from a client.
    Input {
        /// Sender
        player_id: PlayerId,
        /// Input message
        input: InputMessage,
    },
    /// Weapon switch.
    Equip {
        /// Player
        player_id: PlayerId,
        /// New weapon
        weapon: WeaponKind,
    },
    /// Client gone.
    Disconnect {
        /// Player
        player_id: PlayerId,
    },
    /// Re-initialize boss and players.
    ResetArena,
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Session is full.
    #[error("Session is full")]
    SessionFull,

    /// Player already connected.
    #[error("Already in session")]
    AlreadyInSession,

    /// Player not connected.
    #[error("Player not found")]
    PlayerNotFound,

    /// The session task has stopped.
    #[error("Session closed")]
    Closed,

    /// Configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// The session task state.
pub struct ArenaSession {
    config: ArenaConfig,
    reconciler: InputReconciler,
    /// Direct channels to connected clients
    clients: BTreeMap<PlayerId, mpsc::Sender<ServerMessage>>,
    command_rx: mpsc::Receiver<SessionCommand>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ArenaSession {
    /// Create a session and the handle used to reach it.
    pub fn new(config: ArenaConfig) -> Result<(Self, SessionHandle), SessionError> {
        config.validate()?;

        let sim = config.sim_config();
        let world = sim.new_world(config.seed);
        let reconciler = InputReconciler::new(world, sim, config.snapshot_window, config.max_input_lead);

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (shutdown_tx, _) = broadcast::channel(1);

        let handle = SessionHandle {
            command_tx,
            broadcast_tx: broadcast_tx.clone(),
            shutdown_tx: shutdown_tx.clone(),
        };

        let session = Self {
            config,
            reconciler,
            clients: BTreeMap::new(),
            command_rx,
            broadcast_tx,
            shutdown_tx,
        };

        Ok((session, handle))
    }

    /// Run the fixed-rate loop until shutdown or until every handle is gone.
    pub async fn run(mut self) {
        let mut tick_interval = interval(self.config.tick_period());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(
            tick_rate = self.config.tick_rate,
            window = self.config.snapshot_window,
            "Arena session started"
        );

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    if !self.drain_commands() {
                        info!("All handles dropped");
                        break;
                    }
                    self.run_tick();
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.broadcast(ServerMessage::Shutdown { reason: "server shutting down".to_string() });
        info!(tick = self.reconciler.current_tick(), "Arena session stopped");
    }

    /// Apply every queued command. Returns false once the channel is closed.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => {
                    if let Err(e) = self.handle_command(command) {
                        debug!("Command refused: {}", e);
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Apply one command to the reconciler.
    pub fn handle_command(&mut self, command: SessionCommand) -> Result<(), SessionError> {
        match command {
            SessionCommand::Connect { player_id, weapon, sender } => {
                if self.clients.contains_key(&player_id) {
                    return Err(SessionError::AlreadyInSession);
                }
                if self.clients.len() >= MAX_PLAYERS {
                    return Err(SessionError::SessionFull);
                }

                let tick = self.reconciler.current_tick();
                self.reconciler.queue_command(WorldCommand::Join { player_id, weapon });
                let _ = sender.try_send(ServerMessage::Welcome {
                    player_id: player_id.to_uuid_string(),
                    tick,
                    tick_rate: self.config.tick_rate,
                });
                self.clients.insert(player_id, sender);
                info!(player = %player_id.short(), weapon = weapon.name(), tick, "Player connected");
            }

            SessionCommand::Input { player_id, input } => {
                if !self.clients.contains_key(&player_id) {
                    return Err(SessionError::PlayerNotFound);
                }
                let frame = input.buttons.to_input_frame();
                match self.reconciler.submit_input(player_id, input.tick, frame) {
                    Ok(InputDisposition::RolledBack { corrected_events, .. }) => {
                        for event in corrected_events {
                            self.broadcast(ServerMessage::Event(event));
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if let Some(sender) = self.clients.get(&player_id) {
                            let _ = sender.try_send(ServerMessage::InputRejected {
                                tick: input.tick,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }

            SessionCommand::Equip { player_id, weapon } => {
                if !self.clients.contains_key(&player_id) {
                    return Err(SessionError::PlayerNotFound);
                }
                self.reconciler.queue_command(WorldCommand::EquipWeapon { player_id, weapon });
            }

            SessionCommand::Disconnect { player_id } => {
                if self.clients.remove(&player_id).is_none() {
                    return Err(SessionError::PlayerNotFound);
                }
                self.reconciler.queue_command(WorldCommand::Leave { player_id });
                info!(player = %player_id.short(), "Player disconnected");
            }

            SessionCommand::ResetArena => {
                self.reconciler.queue_command(WorldCommand::ResetArena);
                info!(tick = self.reconciler.current_tick(), "Arena reset requested");
            }
        }
        Ok(())
    }

    /// Run a single game tick and broadcast its events and the new state.
    pub fn run_tick(&mut self) -> TickResult {
        let result = self.reconciler.advance();

        for event in &result.events {
            self.broadcast(ServerMessage::Event(event.clone()));
        }
        let update = self.generate_state_update();
        self.broadcast(ServerMessage::State(update));

        result
    }

    /// Generate state update message.
    pub fn generate_state_update(&self) -> StateBroadcast {
        let world = self.reconciler.world();

        let players = world
            .players
            .values()
            .map(|p| PlayerSnapshot {
                id: p.id.to_uuid_string(),
                x: to_float(p.body.position.x),
                y: to_float(p.body.position.y),
                vx: to_float(p.body.velocity.x),
                vy: to_float(p.body.velocity.y),
                health: to_float(p.health),
                facing: p.facing.sign() as i8,
                weapon: p.weapon,
                weapon_state: p.action.state.name().to_string(),
                combo_counter: p.combo_counter,
                juggle_count: p.juggle_count,
                on_ground: p.body.on_ground,
            })
            .collect();

        let boss = &world.boss;
        let limbs = boss
            .limbs
            .iter()
            .map(|(limb, state)| {
                (limb.name().to_string(), LimbSnapshot {
                    health: to_float(state.health),
                    broken: state.broken,
                })
            })
            .collect();

        StateBroadcast {
            tick: world.tick,
            players,
            boss: BossSnapshot {
                x: to_float(boss.body.position.x),
                y: to_float(boss.body.position.y),
                health: to_float(boss.health),
                phase: boss.armor_phase,
                staggered: boss.staggered,
                limbs,
            },
            state_hash: hex::encode(world.compute_hash()),
        }
    }

    /// Read-only access to the reconciler.
    pub fn reconciler(&self) -> &InputReconciler {
        &self.reconciler
    }

    /// Connected client count.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    fn broadcast(&self, message: ServerMessage) {
        // No subscribers is not an error
        let _ = self.broadcast_tx.send(message);
    }
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SessionHandle {
    /// Join with a fresh player id. Returns the id and the client's direct
    /// channel (welcome and rejections).
    pub async fn connect(
        &self,
        weapon: WeaponKind,
    ) -> Result<(PlayerId, mpsc::Receiver<ServerMessage>), SessionError> {
        let player_id = PlayerId::random();
        let (sender, receiver) = mpsc::channel(CLIENT_CAPACITY);
        self.send(SessionCommand::Connect { player_id, weapon, sender }).await?;
        Ok((player_id, receiver))
    }

    /// Forward a decoded client message.
    pub async fn dispatch(&self, player_id: PlayerId, message: ClientMessage) -> Result<(), SessionError> {
        let command = match message {
            ClientMessage::Input(input) => SessionCommand::Input { player_id, input },
            ClientMessage::Equip { weapon } => SessionCommand::Equip { player_id, weapon },
            ClientMessage::Leave => SessionCommand::Disconnect { player_id },
            ClientMessage::Join { .. } => {
                warn!(player = %player_id.short(), "Join from connected client ignored");
                return Ok(());
            }
        };
        self.send(command).await
    }

    /// Send tagged input.
    pub async fn send_input(&self, player_id: PlayerId, input: InputMessage) -> Result<(), SessionError> {
        self.send(SessionCommand::Input { player_id, input }).await
    }

    /// Leave the arena.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), SessionError> {
        self.send(SessionCommand::Disconnect { player_id }).await
    }

    /// Reset boss and players.
    pub async fn reset_arena(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ResetArena).await
    }

    /// Subscribe to state broadcasts and events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Stop the session loop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.command_tx
            .send_timeout(command, Duration::from_secs(1))
            .await
            .map_err(|_| SessionError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::network::protocol::ButtonState;

    fn session() -> (ArenaSession, SessionHandle) {
        ArenaSession::new(ArenaConfig::default()).unwrap()
    }

    fn connect(session: &mut ArenaSession, b: u8) -> (PlayerId, mpsc::Receiver<ServerMessage>) {
        let player_id = PlayerId::new([b; 16]);
        let (sender, receiver) = mpsc::channel(CLIENT_CAPACITY);
        session
            .handle_command(SessionCommand::Connect { player_id, weapon: WeaponKind::Longsword, sender })
            .unwrap();
        (player_id, receiver)
    }

    #[tokio::test]
    async fn test_connect_sends_welcome() {
        let (mut session, _handle) = session();
        let (player_id, mut rx) = connect(&mut session, 1);

        match rx.recv().await {
            Some(ServerMessage::Welcome { player_id: id, tick, tick_rate }) => {
                assert_eq!(id, player_id.to_uuid_string());
                assert_eq!(tick, 0);
                assert_eq!(tick_rate, 60);
            }
            other => panic!("expected welcome, got {:?}", other),
        }
        assert_eq!(session.client_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_and_full_rejected() {
        let (mut session, _handle) = session();
        connect(&mut session, 1);

        let (sender, _rx) = mpsc::channel(1);
        let result = session.handle_command(SessionCommand::Connect {
            player_id: PlayerId::new([1; 16]),
            weapon: WeaponKind::Fists,
            sender,
        });
        assert_eq!(result, Err(SessionError::AlreadyInSession));

        for b in 2..=MAX_PLAYERS as u8 {
            connect(&mut session, b);
        }
        let (sender, _rx) = mpsc::channel(1);
        let result = session.handle_command(SessionCommand::Connect {
            player_id: PlayerId::new([99; 16]),
            weapon: WeaponKind::Fists,
            sender,
        });
        assert_eq!(result, Err(SessionError::SessionFull));
    }

    #[tokio::test]
    async fn test_run_tick_broadcasts_events_then_state() {
        let (mut session, handle) = session();
        let mut updates = handle.subscribe();
        let (player_id, _rx) = connect(&mut session, 1);

        let result = session.run_tick();
        assert_eq!(result.tick, 0);

        match updates.recv().await.unwrap() {
            ServerMessage::Event(event) => {
                assert_eq!(event.data, GameEventData::PlayerJoined { player_id, weapon: WeaponKind::Longsword });
            }
            other => panic!("expected event, got {:?}", other),
        }
        match updates.recv().await.unwrap() {
            ServerMessage::State(state) => {
                assert_eq!(state.tick, 1);
                assert_eq!(state.players.len(), 1);
                assert_eq!(state.players[0].weapon_state, "idle");
                assert_eq!(state.boss.limbs.len(), 4);
                assert_eq!(state.state_hash.len(), 64);
            }
            other => panic!("expected state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_input_notifies_client() {
        let (mut session, _handle) = session();
        let (player_id, mut rx) = connect(&mut session, 1);
        rx.recv().await; // welcome

        for _ in 0..200 {
            session.run_tick();
        }
        let hash = session.reconciler().state_hash();

        session
            .handle_command(SessionCommand::Input {
                player_id,
                input: InputMessage { tick: 5, buttons: ButtonState { right: true, ..Default::default() } },
            })
            .unwrap();

        match rx.recv().await {
            Some(ServerMessage::InputRejected { tick, .. }) => assert_eq!(tick, 5),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(session.reconciler().state_hash(), hash);
    }

    #[tokio::test]
    async fn test_input_from_unknown_client() {
        let (mut session, _handle) = session();
        let result = session.handle_command(SessionCommand::Input {
            player_id: PlayerId::new([7; 16]),
            input: InputMessage { tick: 0, buttons: ButtonState::default() },
        });
        assert_eq!(result, Err(SessionError::PlayerNotFound));
    }

    #[tokio::test]
    async fn test_disconnect_removes_player() {
        let (mut session, _handle) = session();
        let (player_id, _rx) = connect(&mut session, 1);
        session.run_tick();
        assert_eq!(session.reconciler().world().players.len(), 1);

        session.handle_command(SessionCommand::Disconnect { player_id }).unwrap();
        session.run_tick();
        assert!(session.reconciler().world().players.is_empty());
        assert_eq!(
            session.handle_command(SessionCommand::Disconnect { player_id }),
            Err(SessionError::PlayerNotFound)
        );
    }

    #[tokio::test]
    async fn test_session_loop_runs_and_shuts_down() {
        let (session, handle) = session();
        let mut updates = handle.subscribe();
        let task = tokio::spawn(session.run());

        let (player_id, mut rx) = handle.connect(WeaponKind::Katana).await.unwrap();
        assert!(matches!(rx.recv().await, Some(ServerMessage::Welcome { .. })));
        handle
            .send_input(player_id, InputMessage { tick: 1, buttons: ButtonState { left: true, ..Default::default() } })
            .await
            .unwrap();

        let mut saw_state = false;
        while !saw_state {
            if let ServerMessage::State(state) = updates.recv().await.unwrap() {
                saw_state = state.players.len() == 1;
            }
        }

        handle.shutdown();
        tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ArenaConfig { tick_rate: 0, ..ArenaConfig::default() };
        assert!(matches!(ArenaSession::new(config), Err(SessionError::Config(_))));
    }
}
