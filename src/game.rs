//! The match aggregate: players, per-player records, phase and turn.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::player::{Player, PlayerId, PlayerState};
use crate::ship::FleetRules;

/// Unique match identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Top-level stage of a match. Declaration order is the only order in which
/// a match may move through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Initializing,
    AwaitingOpponent,
    Placement,
    Battle,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::Initializing => "the game is initializing",
            Phase::AwaitingOpponent => "waiting for an opponent",
            Phase::Placement => "ships are being placed",
            Phase::Battle => "the battle is running",
            Phase::Finished => "the game is over",
        };
        f.write_str(text)
    }
}

/// Lobby listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchSummary {
    pub id: MatchId,
    pub name: String,
    pub player_count: usize,
    pub listed: bool,
}

/// One two-player game from creation to conclusion.
#[derive(Debug, Clone)]
pub struct Match {
    id: MatchId,
    name: String,
    fleet: FleetRules,
    phase: Phase,
    players: Vec<Player>,
    listed: bool,
    states: BTreeMap<PlayerId, PlayerState>,
    turn_owner: Option<PlayerId>,
    round: u32,
    departed: BTreeSet<PlayerId>,
    winner: Option<PlayerId>,
}

impl Match {
    /// A fresh match hosted by `host`, still `Initializing`.
    pub fn new(id: MatchId, host: Player, fleet: FleetRules) -> Self {
        let name = format!("{}'s Game", host.display_name);
        Self {
            id,
            name,
            fleet,
            phase: Phase::Initializing,
            players: alloc::vec![host],
            listed: true,
            states: BTreeMap::new(),
            turn_owner: None,
            round: 0,
            departed: BTreeSet::new(),
            winner: None,
        }
    }

    pub fn id(&self) -> &MatchId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fleet(&self) -> &FleetRules {
        &self.fleet
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= 2
    }

    /// Open for discovery in the lobby.
    pub fn listed(&self) -> bool {
        self.listed
    }

    /// Player allowed to attack; `Some` exactly while in `Battle`.
    pub fn turn_owner(&self) -> Option<&PlayerId> {
        self.turn_owner.as_ref()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Declared winner once the match is `Finished`.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn is_participant(&self, id: &PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn has_departed(&self, id: &PlayerId) -> bool {
        self.departed.contains(id)
    }

    /// The other participant, if there is one.
    pub fn opponent_of(&self, id: &PlayerId) -> Option<&PlayerId> {
        self.players.iter().map(|p| &p.id).find(|other| *other != id)
    }

    pub fn player_state(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.states.get(id)
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            player_count: self.players.len(),
            listed: self.listed,
        }
    }

    pub(crate) fn player_state_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.states.get_mut(id)
    }

    /// Moves forward to `phase`; backward moves are ignored.
    pub(crate) fn advance_to(&mut self, phase: Phase) {
        debug_assert!(phase >= self.phase, "phase moved backwards");
        if phase > self.phase {
            self.phase = phase;
        }
        if phase != Phase::Battle {
            self.turn_owner = None;
        }
    }

    pub(crate) fn add_player(&mut self, player: Player) {
        self.players.push(player);
        if self.is_full() {
            self.listed = false;
        }
    }

    /// Gives every current participant an empty record.
    pub(crate) fn reset_player_states(&mut self, square_blasts: u8, radar_scans: u8) {
        self.states = self
            .players
            .iter()
            .map(|p| (p.id.clone(), PlayerState::new(square_blasts, radar_scans)))
            .collect();
    }

    pub(crate) fn start_battle(&mut self, first: PlayerId) {
        self.advance_to(Phase::Battle);
        self.turn_owner = Some(first);
        self.round = 1;
    }

    pub(crate) fn next_round(&mut self, turn_owner: PlayerId) -> u32 {
        self.round += 1;
        self.turn_owner = Some(turn_owner);
        self.round
    }

    pub(crate) fn finish(&mut self, winner: Option<PlayerId>) {
        self.advance_to(Phase::Finished);
        self.listed = false;
        self.winner = winner;
    }

    /// Drops `id` from the roster and remembers the departure.
    pub(crate) fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| &p.id == id)?;
        self.departed.insert(id.clone());
        self.states.remove(id);
        Some(self.players.remove(idx))
    }
}
