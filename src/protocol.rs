//! Wire messages exchanged between a client and the session layer.

use alloc::string::String;
use alloc::vec::Vec;

pub use crate::config::PROTOCOL_VERSION;
use crate::engine::Action;
use crate::events::{AttackMode, Event};
use crate::game::{MatchId, MatchSummary};
use crate::player::PlayerId;
use crate::ship::Orientation;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// First message of every connection, sent by the client.
    Handshake { version: u32 },
    HandshakeAck { version: u32 },

    /// Ask for the lobby listing.
    ListMatches,
    MatchList { matches: Vec<MatchSummary> },
    CreateMatch { player_id: PlayerId, player_name: String },
    MatchCreated { match_id: MatchId },
    JoinMatch {
        match_id: MatchId,
        player_id: PlayerId,
        player_name: String,
    },
    Joined { match_id: MatchId },

    PlaceShip {
        x: u8,
        y: u8,
        ship_type: String,
        vertical: bool,
    },
    Attack { x: u8, y: u8, mode: AttackMode },
    Chat { text: String },
    LeaveMatch,

    /// Engine output addressed to this connection.
    Event(Event),
}

impl Message {
    /// The engine action for an in-match message, if it is one.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Message::PlaceShip {
                x,
                y,
                ship_type,
                vertical,
            } => Some(Action::PlaceShip {
                x: x.into(),
                y: y.into(),
                ship_type,
                orientation: Orientation::from_vertical(vertical),
            }),
            Message::Attack { x, y, mode } => Some(Action::Attack {
                x: x.into(),
                y: y.into(),
                mode,
            }),
            Message::Chat { text } => Some(Action::Chat { text }),
            Message::LeaveMatch => Some(Action::Leave),
            _ => None,
        }
    }
}
