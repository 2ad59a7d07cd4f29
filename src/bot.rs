//! A scripted client that plays a full match over any [`Transport`].

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::GRID_SIZE;
use crate::events::{AttackMode, EndReason, Event, GridView};
use crate::game::{MatchId, Phase};
use crate::grid::{CellState, MatchGrid};
use crate::player::PlayerId;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::ship::{FleetRules, Orientation};
use crate::transport::Transport;

/// How a bot's match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotReport {
    pub player: PlayerId,
    pub winner: PlayerId,
    pub reason: EndReason,
    pub shots_fired: usize,
}

impl BotReport {
    pub fn won(&self) -> bool {
        self.player == self.winner
    }
}

/// Hunt/target shooter: fires next to known hits, otherwise at random.
pub struct Bot {
    id: PlayerId,
    name: String,
    fleet: FleetRules,
    rng: SmallRng,
    /// Last opponent view the server sent.
    target_view: Vec<Vec<CellState>>,
    shots_fired: usize,
}

impl Bot {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, seed: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fleet: FleetRules::standard(),
            rng: SmallRng::seed_from_u64(seed),
            target_view: vec![vec![CellState::Empty; GRID_SIZE]; GRID_SIZE],
            shots_fired: 0,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub async fn handshake<T: Transport>(&mut self, transport: &mut T) -> anyhow::Result<()> {
        transport
            .send(Message::Handshake {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match transport.recv().await? {
            Message::HandshakeAck { version } if version == PROTOCOL_VERSION => Ok(()),
            Message::HandshakeAck { version } => Err(anyhow::anyhow!(
                "Protocol version mismatch in HandshakeAck: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            other => Err(anyhow::anyhow!("Expected HandshakeAck, got {:?}", other)),
        }
    }

    /// Open a new match and return its id.
    pub async fn create<T: Transport>(&mut self, transport: &mut T) -> anyhow::Result<MatchId> {
        transport
            .send(Message::CreateMatch {
                player_id: self.id.clone(),
                player_name: self.name.clone(),
            })
            .await?;
        loop {
            match transport.recv().await? {
                Message::MatchCreated { match_id } => return Ok(match_id),
                Message::Event(Event::Notice { text }) => {
                    return Err(anyhow::anyhow!("create rejected: {}", text))
                }
                other => debug!("{}: ignoring {:?} while creating", self.id, other),
            }
        }
    }

    pub async fn join<T: Transport>(&mut self, transport: &mut T, match_id: MatchId) -> anyhow::Result<()> {
        transport
            .send(Message::JoinMatch {
                match_id,
                player_id: self.id.clone(),
                player_name: self.name.clone(),
            })
            .await?;
        loop {
            match transport.recv().await? {
                Message::Joined { .. } => return Ok(()),
                Message::Event(Event::Notice { text }) => {
                    return Err(anyhow::anyhow!("join rejected: {}", text))
                }
                other => debug!("{}: ignoring {:?} while joining", self.id, other),
            }
        }
    }

    /// Play the bound match to its end.
    pub async fn play<T: Transport>(&mut self, transport: &mut T) -> anyhow::Result<BotReport> {
        loop {
            let msg = transport.recv().await?;
            let Message::Event(event) = msg else {
                debug!("{}: ignoring {:?}", self.id, msg);
                continue;
            };
            match event {
                Event::PhaseChanged {
                    phase: Phase::Placement,
                } => self.place_fleet(transport).await?,
                Event::GridUpdated {
                    view: GridView::Opponent,
                    cells,
                } => self.target_view = cells,
                Event::TurnChanged { your_turn: true, .. } => {
                    let (x, y) = self.next_target()?;
                    self.shots_fired += 1;
                    transport
                        .send(Message::Attack {
                            x: coord(x)?,
                            y: coord(y)?,
                            mode: AttackMode::Single,
                        })
                        .await?;
                }
                Event::MatchEnded { winner, reason } => {
                    info!("{}: match ended, winner {} ({:?})", self.id, winner, reason);
                    return Ok(BotReport {
                        player: self.id.clone(),
                        winner,
                        reason,
                        shots_fired: self.shots_fired,
                    });
                }
                Event::Notice { text } => debug!("{}: {}", self.id, text),
                _ => {}
            }
        }
    }

    async fn place_fleet<T: Transport>(&mut self, transport: &mut T) -> anyhow::Result<()> {
        let mut layout = MatchGrid::new();
        for ship in self.fleet.types() {
            for _ in 0..ship.count() {
                let (x, y, orientation) = layout
                    .random_placement(&mut self.rng, *ship)
                    .ok_or_else(|| anyhow::anyhow!("no room for {}", ship.id()))?;
                let cells = FleetRules::footprint(*ship, x, y, orientation, GRID_SIZE)?;
                layout.place_ship(&cells)?;
                transport
                    .send(Message::PlaceShip {
                        x: coord(x)?,
                        y: coord(y)?,
                        ship_type: ship.id().to_string(),
                        vertical: orientation == Orientation::Vertical,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    fn next_target(&mut self) -> anyhow::Result<(usize, usize)> {
        let view = &self.target_view;
        let unshot = |x: usize, y: usize| view[y][x] == CellState::Empty;

        let mut near_hits = Vec::new();
        let mut open = Vec::new();
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                if !unshot(x, y) {
                    continue;
                }
                open.push((x, y));
                let touches_hit = [(0, 1), (2, 1), (1, 0), (1, 2)].iter().any(|&(dx, dy)| {
                    let (Some(nx), Some(ny)) = ((x + dx).checked_sub(1), (y + dy).checked_sub(1)) else {
                        return false;
                    };
                    nx < GRID_SIZE && ny < GRID_SIZE && view[ny][nx] == CellState::Hit
                });
                if touches_hit {
                    near_hits.push((x, y));
                }
            }
        }

        let pool = if near_hits.is_empty() { &open } else { &near_hits };
        let pick = pool
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no unshot cells left"))?;
        // Mark locally so a bonus turn before the grid update never repeats it.
        self.target_view[pick.1][pick.0] = CellState::Miss;
        Ok(pick)
    }
}

fn coord(value: usize) -> anyhow::Result<u8> {
    u8::try_from(value).map_err(|_| anyhow::anyhow!("coordinate {} does not fit the wire format", value))
}
