//! Outbound events produced by the engine and the addressing that tells the
//! session layer who receives them.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::game::Phase;
use crate::grid::CellState;
use crate::player::PlayerId;

/// Which side of the board a grid update describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GridView {
    /// The recipient's own fleet, ships visible.
    Own,
    /// The recipient's picture of the enemy fleet, unhit ships hidden.
    Opponent,
}

/// How an attack is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackMode {
    /// One cell.
    #[default]
    Single,
    /// The 2×2 block anchored at the target.
    SquareBlast,
    /// Count ship cells around the target without firing.
    RadarScan,
}

impl fmt::Display for AttackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackMode::Single => write!(f, "Single shot"),
            AttackMode::SquareBlast => write!(f, "Square Blast"),
            AttackMode::RadarScan => write!(f, "Radar Scan"),
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    /// The loser's whole fleet was hit.
    Victory,
    /// The opponent left.
    Forfeit,
}

/// A state delta or message for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    PhaseChanged { phase: Phase },
    TurnChanged { player: PlayerId, your_turn: bool },
    GridUpdated { view: GridView, cells: Vec<Vec<CellState>> },
    ShipPlaced { ship_type: String },
    RoundAdvanced { round: u32 },
    /// Informational status text; never a state change.
    Notice { text: String },
    MatchEnded { winner: PlayerId, reason: EndReason },
    /// Sent to the remaining participant when the other one departs.
    OpponentLeft { player: PlayerId, name: String },
    Chat { from: String, text: String },
    ScanResult { x: usize, y: usize, ship_cells: usize },
}

/// Who receives an event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Recipient {
    Player(PlayerId),
    /// Every participant still in the match.
    Everyone,
}

/// An addressed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub to: Recipient,
    pub event: Event,
}

impl Dispatch {
    pub fn to_player(player: &PlayerId, event: Event) -> Self {
        Self {
            to: Recipient::Player(player.clone()),
            event,
        }
    }

    pub fn to_everyone(event: Event) -> Self {
        Self {
            to: Recipient::Everyone,
            event,
        }
    }

    /// True when `player` receives this dispatch.
    pub fn reaches(&self, player: &PlayerId) -> bool {
        match &self.to {
            Recipient::Player(id) => id == player,
            Recipient::Everyone => true,
        }
    }
}

/// Shorthand for a [`Event::Notice`].
pub fn notice(text: impl Into<String>) -> Event {
    Event::Notice { text: text.into() }
}
