//! Participants and their per-match records.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use crate::grid::MatchGrid;
use crate::ship::{FleetRules, ShipType};

/// Externally supplied participant identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Everything the match tracks for one participant.
#[derive(Debug, Clone)]
pub struct PlayerState {
    grid: MatchGrid,
    placed_count: usize,
    placed_ship_cells: usize,
    hit_cells_taken: usize,
    placed_types: BTreeMap<&'static str, usize>,
    square_blasts: u8,
    radar_scans: u8,
}

impl PlayerState {
    pub(crate) fn new(square_blasts: u8, radar_scans: u8) -> Self {
        Self {
            grid: MatchGrid::new(),
            placed_count: 0,
            placed_ship_cells: 0,
            hit_cells_taken: 0,
            placed_types: BTreeMap::new(),
            square_blasts,
            radar_scans,
        }
    }

    pub fn grid(&self) -> &MatchGrid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut MatchGrid {
        &mut self.grid
    }

    /// Ships placed so far.
    pub fn placed_count(&self) -> usize {
        self.placed_count
    }

    /// Grid cells covered by placed ships.
    pub fn placed_ship_cells(&self) -> usize {
        self.placed_ship_cells
    }

    /// Cells of this player's fleet that have been hit.
    pub fn hit_cells_taken(&self) -> usize {
        self.hit_cells_taken
    }

    /// How many ships of `ship_type` are on the grid.
    pub fn placed_of(&self, ship_type: &str) -> usize {
        self.placed_types.get(ship_type).copied().unwrap_or(0)
    }

    /// Ship type ids with at least one ship placed.
    pub fn placed_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.placed_types.keys().copied()
    }

    /// True once every catalog entry is on the grid `count` times.
    pub fn has_placed_fleet(&self, fleet: &FleetRules) -> bool {
        fleet
            .types()
            .iter()
            .all(|ty| self.placed_of(ty.id()) >= ty.count())
    }

    pub fn square_blasts_left(&self) -> u8 {
        self.square_blasts
    }

    pub fn radar_scans_left(&self) -> u8 {
        self.radar_scans
    }

    pub(crate) fn record_placement(&mut self, ship: ShipType) {
        self.placed_count += 1;
        self.placed_ship_cells += ship.length();
        *self.placed_types.entry(ship.id()).or_insert(0) += 1;
    }

    pub(crate) fn record_hit_taken(&mut self) {
        self.hit_cells_taken += 1;
    }

    pub(crate) fn spend_square_blast(&mut self) -> bool {
        match self.square_blasts.checked_sub(1) {
            Some(left) => {
                self.square_blasts = left;
                true
            }
            None => false,
        }
    }

    pub(crate) fn spend_radar_scan(&mut self) -> bool {
        match self.radar_scans.checked_sub(1) {
            Some(left) => {
                self.radar_scans = left;
                true
            }
            None => false,
        }
    }
}
