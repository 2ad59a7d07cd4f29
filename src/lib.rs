#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bitboard;
mod common;
mod config;
pub mod engine;
pub mod events;
mod game;
mod grid;
mod player;
pub mod protocol;
mod registry;
mod ship;
#[cfg(feature = "std")]
pub mod bot;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use bitboard::{BitBoard, BitBoardError};
pub use common::*;
pub use config::*;
pub use engine::{Action, MatchEngine};
pub use events::*;
pub use game::*;
pub use grid::*;
pub use player::*;
pub use protocol::Message;
pub use registry::MatchRegistry;
pub use ship::*;
#[cfg(feature = "std")]
pub use bot::{Bot, BotReport};
#[cfg(feature = "std")]
pub use logging::{init_logging, level_from};
#[cfg(feature = "std")]
pub use session::{Hub, Session, SessionConfig};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, stream::StreamTransport, stream::TcpTransport, Transport};
