//! Per-player grid: ship occupancy and shot history packed into bitboards.

use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use crate::bitboard::{BitBoard, BitBoardError};
use crate::common::{MatchError, ShotOutcome};
use crate::config::GRID_SIZE;
use crate::events::GridView;
use crate::ship::{FleetRules, Orientation, ShipType};

type BB<const N: usize> = BitBoard<u128, N>;

/// The grid every match player owns.
pub type MatchGrid = Grid<GRID_SIZE>;

/// State of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    Empty,
    Ship,
    /// Shot water.
    Miss,
    /// Shot ship segment.
    Hit,
}

impl CellState {
    /// `Miss` and `Hit` never change again.
    pub fn is_shot(self) -> bool {
        matches!(self, CellState::Miss | CellState::Hit)
    }
}

impl From<BitBoardError> for MatchError {
    fn from(err: BitBoardError) -> Self {
        match err {
            BitBoardError::IndexOutOfBounds { x, y } => MatchError::OutOfBounds { x, y },
            BitBoardError::SizeTooLarge { n, .. } => MatchError::OutOfBounds { x: n, y: n },
        }
    }
}

/// An N×N grid. A cell is `Ship` when it is in the ship mask, `Miss`/`Hit`
/// once it is in the shot mask.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Grid<const N: usize> {
    ships: BB<N>,
    shots: BB<N>,
}

impl<const N: usize> Grid<N> {
    const FITS: () = assert!(N * N <= 128, "grid does not fit in a u128 bitboard");

    /// Create a grid with every cell `Empty`.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        Self {
            ships: BB::new(),
            shots: BB::new(),
        }
    }

    pub const fn size(&self) -> usize {
        N
    }

    pub fn is_in_bounds(&self, x: usize, y: usize) -> bool {
        x < N && y < N
    }

    /// Current state of (`x`, `y`).
    pub fn cell_at(&self, x: usize, y: usize) -> Result<CellState, MatchError> {
        let ship = self.ships.get(x, y)?;
        let shot = self.shots.get(x, y)?;
        Ok(match (ship, shot) {
            (false, false) => CellState::Empty,
            (true, false) => CellState::Ship,
            (false, true) => CellState::Miss,
            (true, true) => CellState::Hit,
        })
    }

    /// Mark every listed cell as `Ship`, or none of them.
    pub fn place_ship(&mut self, cells: &[(usize, usize)]) -> Result<(), MatchError> {
        let mask = BB::<N>::from_cells(cells.iter().copied())?;
        if mask.count_ones() != cells.len() || mask.intersects(&(self.ships | self.shots)) {
            return Err(MatchError::Overlap);
        }
        self.ships = self.ships | mask;
        Ok(())
    }

    /// Fire at (`x`, `y`), turning the cell into `Hit` or `Miss`.
    pub fn apply_shot(&mut self, x: usize, y: usize) -> Result<ShotOutcome, MatchError> {
        if self.shots.get(x, y)? {
            return Err(MatchError::AlreadyShot { x, y });
        }
        self.shots.set(x, y)?;
        if self.ships.get(x, y)? {
            Ok(ShotOutcome::Hit)
        } else {
            Ok(ShotOutcome::Miss)
        }
    }

    /// Row-major cell matrix (`cells[y][x]`). The opponent view hides
    /// ships that have not been hit.
    pub fn view(&self, view: GridView) -> Vec<Vec<CellState>> {
        (0..N)
            .map(|y| {
                (0..N)
                    .map(|x| {
                        let ship = self.ships.get(x, y).unwrap_or(false);
                        let shot = self.shots.get(x, y).unwrap_or(false);
                        match (ship, shot, view) {
                            (true, true, _) => CellState::Hit,
                            (false, true, _) => CellState::Miss,
                            (true, false, GridView::Own) => CellState::Ship,
                            _ => CellState::Empty,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Unshot ship cells within `radius` of (`x`, `y`), clipped to the grid.
    pub fn ship_cells_around(&self, x: usize, y: usize, radius: usize) -> Result<usize, MatchError> {
        if !self.is_in_bounds(x, y) {
            return Err(MatchError::OutOfBounds { x, y });
        }
        let afloat = self.ships & !self.shots;
        let count = afloat
            .iter_set_bits()
            .filter(|&(cx, cy)| cx.abs_diff(x) <= radius && cy.abs_diff(y) <= radius)
            .count();
        Ok(count)
    }

    /// Ship segments not yet hit.
    pub fn ship_cells_afloat(&self) -> usize {
        (self.ships & !self.shots).count_ones()
    }

    /// Ship segments that have been hit.
    pub fn hit_count(&self) -> usize {
        (self.ships & self.shots).count_ones()
    }

    pub fn shot_count(&self) -> usize {
        self.shots.count_ones()
    }

    /// Returns a random non-overlapping (x, y, Orientation) for `ship`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        ship: ShipType,
    ) -> Option<(usize, usize, Orientation)> {
        if ship.length() > N {
            return None;
        }
        for _ in 0..100 {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_x, max_y) = match orientation {
                Orientation::Horizontal => (N - ship.length(), N - 1),
                Orientation::Vertical => (N - 1, N - ship.length()),
            };
            let x = rng.random_range(0..=max_x);
            let y = rng.random_range(0..=max_y);
            let Ok(cells) = FleetRules::footprint(ship, x, y, orientation, N) else {
                continue;
            };
            let fits = cells
                .iter()
                .all(|&(cx, cy)| matches!(self.cell_at(cx, cy), Ok(CellState::Empty)));
            if fits {
                return Some((x, y, orientation));
            }
        }
        None
    }
}

impl<const N: usize> Default for Grid<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Grid<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid<{}>:", N)?;
        for row in self.view(GridView::Own) {
            for cell in row {
                let glyph = match cell {
                    CellState::Empty => '.',
                    CellState::Ship => '#',
                    CellState::Miss => 'o',
                    CellState::Hit => 'X',
                };
                write!(f, "{} ", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
