use crate::ship::ShipType;

/// Side length of every match grid.
pub const GRID_SIZE: usize = 10;

/// Wire protocol version exchanged in the session handshake.
pub const PROTOCOL_VERSION: u32 = 1;

pub const NUM_SHIP_TYPES: usize = 5;
pub const STANDARD_FLEET: [ShipType; NUM_SHIP_TYPES] = [
    ShipType::new("carrier", 5, 1),
    ShipType::new("battleship", 4, 1),
    ShipType::new("cruiser", 3, 1),
    ShipType::new("destroyer", 2, 1),
    ShipType::new("submarine", 1, 1),
];

/// Total number of ship segments in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = fleet_cells(&STANDARD_FLEET);

const fn fleet_cells(fleet: &[ShipType]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fleet.len() {
        total += fleet[i].total_cells();
        i += 1;
    }
    total
}

/// How the turn advances after a shot that hits but does not end the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnRule {
    /// Turns always alternate.
    #[default]
    Alternate,
    /// A hit lets the attacker fire again.
    BonusShotOnHit,
}

/// Runtime options for a [`MatchEngine`](crate::MatchEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub turn_rule: TurnRule,
    /// Enables the square blast and radar scan abilities.
    pub abilities_enabled: bool,
    /// Square blasts each player may fire per match.
    pub square_blast_charges: u8,
    /// Radar scans each player may run per match.
    pub radar_scan_charges: u8,
    /// Fixed RNG seed for reproducible matches.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_rule: TurnRule::Alternate,
            abilities_enabled: false,
            square_blast_charges: 1,
            radar_scan_charges: 1,
            seed: None,
        }
    }
}
