//! Match registry: the lifecycle store from match id to [`Match`].
//!
//! The registry owns its matches; a match never refers back to it. It does no
//! locking of its own, so callers serialize access.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::common::MatchError;
use crate::game::{Match, MatchId, MatchSummary};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 12;

pub struct MatchRegistry {
    matches: BTreeMap<MatchId, Match>,
    rng: SmallRng,
}

impl MatchRegistry {
    pub fn new(seed: u64) -> Self {
        Self {
            matches: BTreeMap::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// A fresh random base-36 id that is not in use.
    pub fn generate_id(&mut self) -> MatchId {
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| ID_ALPHABET[self.rng.random_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = MatchId::new(id);
            if !self.matches.contains_key(&id) {
                return id;
            }
        }
    }

    /// Store `game` under `id`, returning any match it replaced.
    pub fn create(&mut self, id: MatchId, game: Match) -> Option<Match> {
        debug!("registry: storing match {}", id);
        self.matches.insert(id, game)
    }

    pub fn get(&self, id: &MatchId) -> Result<&Match, MatchError> {
        self.matches
            .get(id)
            .ok_or_else(|| MatchError::MatchNotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &MatchId) -> Result<&mut Match, MatchError> {
        self.matches
            .get_mut(id)
            .ok_or_else(|| MatchError::MatchNotFound(id.clone()))
    }

    pub fn remove(&mut self, id: &MatchId) -> Option<Match> {
        debug!("registry: removing match {}", id);
        self.matches.remove(id)
    }

    /// Matches still accepting a second player.
    pub fn list_open(&self) -> impl Iterator<Item = &Match> + '_ {
        self.matches
            .values()
            .filter(|m| m.listed() && m.players().len() < 2)
    }

    /// Lobby entries for [`list_open`](Self::list_open).
    pub fn summaries(&self) -> Vec<MatchSummary> {
        self.list_open().map(Match::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
