//! Common types for the match engine: action errors and shot outcomes.

use alloc::string::String;
use core::fmt;

use crate::events::AttackMode;
use crate::game::{MatchId, Phase};
use crate::player::PlayerId;

/// Result of a single resolved shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotOutcome {
    /// The shot struck a ship segment.
    Hit,
    /// The shot landed in open water.
    Miss,
}

impl ShotOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, ShotOutcome::Hit)
    }
}

/// Rejections of a single action.
///
/// Every variant is recoverable: the engine validates before it mutates, so a
/// rejected action leaves the match exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Coordinate (or part of a ship) lies outside the grid.
    OutOfBounds { x: usize, y: usize },
    /// Ship placement collides with a ship already on the grid.
    Overlap,
    /// Every ship of this type has already been placed.
    AlreadyPlaced(&'static str),
    /// Ship type id is not in the fleet catalog.
    UnknownShipType(String),
    /// Target cell was already shot.
    AlreadyShot { x: usize, y: usize },
    /// Acting player does not own the turn.
    NotYourTurn,
    /// Match has finished; no further actions are accepted.
    MatchOver,
    /// No match is registered under this id.
    MatchNotFound(MatchId),
    /// Match already has two players.
    MatchFull,
    /// Acting player is not a participant of the match.
    PlayerNotInMatch(PlayerId),
    /// Action is not valid in the current phase.
    WrongPhase(Phase),
    /// Another participant already uses this player id.
    PlayerIdTaken(PlayerId),
    /// Ability is disabled or its charges are used up.
    AbilityUnavailable(AttackMode),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::OutOfBounds { x, y } => write!(
                f,
                "Position ({}, {}) is out of bounds! Try another position.",
                x, y
            ),
            MatchError::Overlap => {
                write!(f, "Invalid placement! Ship would overlap with another ship.")
            }
            MatchError::AlreadyPlaced(ship) => write!(f, "You've already placed your {}!", ship),
            MatchError::UnknownShipType(ship) => write!(f, "Invalid ship type '{}' selected!", ship),
            MatchError::AlreadyShot { .. } => {
                write!(f, "You already hit that spot! Try another one.")
            }
            MatchError::NotYourTurn => write!(f, "It's not your turn!"),
            MatchError::MatchOver => write!(f, "Game is over! You can stop clicking!"),
            MatchError::MatchNotFound(id) => write!(f, "Game {} does not exist.", id),
            MatchError::MatchFull => write!(f, "Game is already full."),
            MatchError::PlayerNotInMatch(id) => write!(f, "Player {} is not part of this game.", id),
            MatchError::WrongPhase(phase) => write!(f, "That action is not allowed while {}.", phase),
            MatchError::PlayerIdTaken(id) => write!(f, "Player id {} is already taken in this game.", id),
            MatchError::AbilityUnavailable(mode) => write!(f, "{} is not available.", mode),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MatchError {}
