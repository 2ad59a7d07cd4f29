//! Session adapter: binds connections to matches and delivers engine output.
//!
//! The [`Hub`] is the single serialization domain for every match. Engine
//! calls run synchronously while its lock is held, and no lock is held across
//! an `.await`. Each bound participant has an outbound mailbox that its
//! [`Session`] drains onto the transport.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep_until, Duration, Instant};

use crate::common::MatchError;
use crate::engine::{Action, MatchEngine};
use crate::events::{notice, Dispatch, Recipient};
use crate::game::{Match, MatchId, MatchSummary, Phase};
use crate::player::{Player, PlayerId};
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::registry::MatchRegistry;
use crate::transport::Transport;

type Outbox = UnboundedSender<Message>;

const MISSING_IDENTITY: &str = "Player name and ID are required.";

/// Options for one connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    /// Treat a connection as departed after this long without inbound traffic.
    pub idle_timeout: Option<Duration>,
}

struct HubState {
    registry: MatchRegistry,
    engine: MatchEngine,
    mailboxes: BTreeMap<(MatchId, PlayerId), Outbox>,
}

impl HubState {
    /// Route `events` to the mailboxes of the match's current participants.
    fn deliver(&self, match_id: &MatchId, events: Vec<Dispatch>) {
        let players: Vec<PlayerId> = self
            .registry
            .get(match_id)
            .map(|game| game.players().iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default();
        for dispatch in events {
            let targets: Vec<&PlayerId> = match &dispatch.to {
                Recipient::Player(id) => vec![id],
                Recipient::Everyone => players.iter().collect(),
            };
            for target in targets {
                let key = (match_id.clone(), target.clone());
                if let Some(outbox) = self.mailboxes.get(&key) {
                    // A closed mailbox means the session is already gone; its
                    // departure is processed separately.
                    let _ = outbox.send(Message::Event(dispatch.event.clone()));
                }
            }
        }
    }
}

/// Shared owner of the registry and engine, cloned into every session.
#[derive(Clone)]
pub struct Hub {
    state: Arc<Mutex<HubState>>,
}

impl Hub {
    pub fn new(engine: MatchEngine, registry: MatchRegistry) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                registry,
                engine,
                mailboxes: BTreeMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        // Engine steps validate before mutating, so state behind a poisoned
        // lock is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lobby listing of matches waiting for an opponent.
    pub fn list_open(&self) -> Vec<MatchSummary> {
        self.lock().registry.summaries()
    }

    /// Run `f` against a registered match.
    pub fn inspect<R>(&self, match_id: &MatchId, f: impl FnOnce(&Match) -> R) -> Option<R> {
        self.lock().registry.get(match_id).ok().map(f)
    }

    pub fn match_count(&self) -> usize {
        self.lock().registry.len()
    }

    /// Open a new match for `host`, whose events go to `outbox`.
    pub fn create_match(&self, host: Player, outbox: Outbox) -> MatchId {
        let mut guard = self.lock();
        let state = &mut *guard;
        let match_id = state.registry.generate_id();
        let host_id = host.id.clone();
        let (game, events) = state.engine.create_match(match_id.clone(), host);
        state.registry.create(match_id.clone(), game);
        state.mailboxes.insert((match_id.clone(), host_id), outbox);
        state.deliver(&match_id, events);
        match_id
    }

    pub fn join_match(&self, match_id: &MatchId, player: Player, outbox: Outbox) -> Result<(), MatchError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let player_id = player.id.clone();
        let game = state.registry.get_mut(match_id)?;
        let events = state.engine.join_match(game, player)?;
        state.mailboxes.insert((match_id.clone(), player_id), outbox);
        state.deliver(match_id, events);
        Ok(())
    }

    /// Feed one in-match action through the engine.
    pub fn act(&self, match_id: &MatchId, player: &PlayerId, action: Action) -> Result<(), MatchError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let game = state.registry.get_mut(match_id)?;
        if game.phase() == Phase::Finished && matches!(action, Action::PlaceShip { .. } | Action::Attack { .. }) {
            warn!("match {}: {} acted on a finished match (stale client state)", match_id, player);
        }
        let events = state.engine.handle(game, player, action);
        let empty = game.is_empty();
        state.deliver(match_id, events);
        if empty {
            info!("match {}: last player left, removing", match_id);
            state.registry.remove(match_id);
        }
        Ok(())
    }

    /// Process `player` leaving `match_id`. Safe to call repeatedly.
    pub fn depart(&self, match_id: &MatchId, player: &PlayerId) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Ok(game) = state.registry.get_mut(match_id) {
            let events = state.engine.handle(game, player, Action::Leave);
            let empty = game.is_empty();
            state.deliver(match_id, events);
            if empty {
                info!("match {}: last player left, removing", match_id);
                state.registry.remove(match_id);
            }
        }
        state.mailboxes.remove(&(match_id.clone(), player.clone()));
    }
}

enum Step {
    Inbound(anyhow::Result<Message>),
    Outbound(Message),
    Idle,
}

/// Drives one connected participant.
pub struct Session<T: Transport> {
    hub: Hub,
    transport: T,
    config: SessionConfig,
    outbox_tx: Outbox,
    outbox_rx: UnboundedReceiver<Message>,
    binding: Option<(MatchId, PlayerId)>,
}

impl<T: Transport> Session<T> {
    pub fn new(hub: Hub, transport: T, config: SessionConfig) -> Self {
        let (outbox_tx, outbox_rx) = unbounded_channel();
        Self {
            hub,
            transport,
            config,
            outbox_tx,
            outbox_rx,
            binding: None,
        }
    }

    /// Handshake, then serve until the peer disconnects or idles out. The
    /// bound participant, if any, departs on the way out.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = match self.handshake().await {
            Ok(()) => self.serve().await,
            Err(e) => Err(e),
        };
        self.leave();
        result
    }

    async fn handshake(&mut self) -> anyhow::Result<()> {
        match self.transport.recv().await? {
            Message::Handshake { version } if version == PROTOCOL_VERSION => {
                self.transport
                    .send(Message::HandshakeAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await
            }
            Message::Handshake { version } => {
                self.transport
                    .send(Message::HandshakeAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await?;
                Err(anyhow::anyhow!(
                    "Protocol version mismatch in Handshake: expected {}, got {}",
                    PROTOCOL_VERSION,
                    version
                ))
            }
            other => Err(anyhow::anyhow!("Expected Handshake, got {:?}", other)),
        }
    }

    async fn serve(&mut self) -> anyhow::Result<()> {
        let idle_timeout = self.config.idle_timeout;
        let far_future = Duration::from_secs(60 * 60 * 24);
        let mut deadline = Instant::now() + idle_timeout.unwrap_or(far_future);
        loop {
            let step = tokio::select! {
                inbound = self.transport.recv() => Step::Inbound(inbound),
                Some(outbound) = self.outbox_rx.recv() => Step::Outbound(outbound),
                _ = sleep_until(deadline), if idle_timeout.is_some() => Step::Idle,
            };
            match step {
                Step::Inbound(Ok(msg)) => {
                    deadline = Instant::now() + idle_timeout.unwrap_or(far_future);
                    self.handle(msg).await?;
                }
                Step::Inbound(Err(e)) => {
                    info!("session closed: {}", e);
                    return Ok(());
                }
                Step::Outbound(msg) => self.transport.send(msg).await?,
                Step::Idle => {
                    warn!("session idle for {:?}, disconnecting", idle_timeout);
                    self.leave();
                    let _ = self
                        .transport
                        .send(Message::Event(notice("Disconnected for inactivity.")))
                        .await;
                    return Ok(());
                }
            }
        }
    }

    async fn handle(&mut self, msg: Message) -> anyhow::Result<()> {
        debug!("session received {:?}", msg);
        match msg {
            Message::ListMatches => {
                let matches = self.hub.list_open();
                self.transport.send(Message::MatchList { matches }).await
            }
            Message::CreateMatch {
                player_id,
                player_name,
            } => {
                if self.binding.is_some() {
                    return self.reply_notice("You are already in a game.").await;
                }
                if is_blank(&player_id, &player_name) {
                    return self.reply_notice(MISSING_IDENTITY).await;
                }
                let host = Player::new(player_id.clone(), player_name);
                let match_id = self.hub.create_match(host, self.outbox_tx.clone());
                self.binding = Some((match_id.clone(), player_id));
                self.transport.send(Message::MatchCreated { match_id }).await
            }
            Message::JoinMatch {
                match_id,
                player_id,
                player_name,
            } => {
                if self.binding.is_some() {
                    return self.reply_notice("You are already in a game.").await;
                }
                if is_blank(&player_id, &player_name) {
                    return self.reply_notice(MISSING_IDENTITY).await;
                }
                let player = Player::new(player_id.clone(), player_name);
                match self.hub.join_match(&match_id, player, self.outbox_tx.clone()) {
                    Ok(()) => {
                        self.binding = Some((match_id.clone(), player_id));
                        self.transport.send(Message::Joined { match_id }).await
                    }
                    Err(err) => {
                        log_rejection(&match_id, &err);
                        self.reply_notice(&err.to_string()).await
                    }
                }
            }
            Message::LeaveMatch => {
                self.leave();
                Ok(())
            }
            other => match (other.into_action(), self.binding.clone()) {
                (Some(action), Some((match_id, player_id))) => {
                    if let Err(err) = self.hub.act(&match_id, &player_id, action) {
                        log_rejection(&match_id, &err);
                        self.binding = None;
                        return self.reply_notice(&err.to_string()).await;
                    }
                    Ok(())
                }
                (Some(_), None) => self.reply_notice("You are not in a game.").await,
                (None, _) => self.reply_notice("Unexpected message.").await,
            },
        }
    }

    async fn reply_notice(&mut self, text: &str) -> anyhow::Result<()> {
        self.transport.send(Message::Event(notice(text))).await
    }

    fn leave(&mut self) {
        if let Some((match_id, player_id)) = self.binding.take() {
            self.hub.depart(&match_id, &player_id);
        }
    }
}

fn is_blank(player_id: &PlayerId, player_name: &str) -> bool {
    player_id.as_str().trim().is_empty() || player_name.trim().is_empty()
}

fn log_rejection(match_id: &MatchId, err: &MatchError) {
    match err {
        MatchError::MatchNotFound(_) | MatchError::MatchOver => {
            warn!("match {}: {} (stale client state)", match_id, err)
        }
        _ => debug!("match {}: {}", match_id, err),
    }
}
