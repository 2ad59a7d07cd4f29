//! Ship types, orientation and the fleet catalog used by every match.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;

use crate::common::MatchError;
use crate::config::STANDARD_FLEET;

/// Orientation of a ship on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Extends along the row (increasing `x`).
    Horizontal,
    /// Extends along the column (increasing `y`).
    Vertical,
}

impl Orientation {
    pub fn from_vertical(is_vertical: bool) -> Self {
        if is_vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

/// Catalog entry: id, length and how many of it each fleet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    id: &'static str,
    length: usize,
    count: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(id: &'static str, length: usize, count: usize) -> Self {
        Self { id, length, count }
    }

    /// Ship's catalog id.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Ship's length.
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Ships of this type per fleet.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Cells this type contributes to a full fleet.
    pub const fn total_cells(&self) -> usize {
        self.length * self.count
    }
}

/// Reasons a custom catalog is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetError {
    Empty,
    DuplicateId(&'static str),
    ZeroSized(&'static str),
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::Empty => write!(f, "fleet catalog is empty"),
            FleetError::DuplicateId(id) => write!(f, "ship type '{}' is listed twice", id),
            FleetError::ZeroSized(id) => write!(f, "ship type '{}' has zero length or count", id),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FleetError {}

/// Immutable fleet catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetRules {
    types: &'static [ShipType],
    total_cells: usize,
}

impl FleetRules {
    /// Carrier, battleship, cruiser, destroyer and submarine.
    pub fn standard() -> Self {
        Self {
            types: &STANDARD_FLEET,
            total_cells: STANDARD_FLEET.iter().map(ShipType::total_cells).sum(),
        }
    }

    /// Validate and wrap a custom catalog.
    pub fn new(types: &'static [ShipType]) -> Result<Self, FleetError> {
        if types.is_empty() {
            return Err(FleetError::Empty);
        }
        for (i, ty) in types.iter().enumerate() {
            if ty.length == 0 || ty.count == 0 {
                return Err(FleetError::ZeroSized(ty.id));
            }
            if types[..i].iter().any(|other| other.id == ty.id) {
                return Err(FleetError::DuplicateId(ty.id));
            }
        }
        Ok(Self {
            types,
            total_cells: types.iter().map(ShipType::total_cells).sum(),
        })
    }

    /// Look up a ship type by id.
    pub fn ship_type(&self, id: &str) -> Result<ShipType, MatchError> {
        self.types
            .iter()
            .find(|ty| ty.id == id)
            .copied()
            .ok_or_else(|| MatchError::UnknownShipType(id.to_string()))
    }

    /// Ship cells of a complete fleet; reaching this many hits loses the match.
    pub fn total_ship_cells(&self) -> usize {
        self.total_cells
    }

    /// Catalog ids in declaration order.
    pub fn all_type_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.iter().map(ShipType::id)
    }

    pub fn types(&self) -> &'static [ShipType] {
        self.types
    }

    /// The `length` contiguous cells of a ship anchored at (`x`, `y`).
    ///
    /// Fails with `OutOfBounds` on the first cell that leaves a
    /// `grid_size`×`grid_size` grid.
    pub fn footprint(
        ship: ShipType,
        x: usize,
        y: usize,
        orientation: Orientation,
        grid_size: usize,
    ) -> Result<Vec<(usize, usize)>, MatchError> {
        (0..ship.length())
            .map(|i| {
                let cell = match orientation {
                    Orientation::Horizontal => x.checked_add(i).map(|cx| (cx, y)),
                    Orientation::Vertical => y.checked_add(i).map(|cy| (x, cy)),
                };
                match cell {
                    Some((cx, cy)) if cx < grid_size && cy < grid_size => Ok((cx, cy)),
                    Some((cx, cy)) => Err(MatchError::OutOfBounds { x: cx, y: cy }),
                    None => Err(MatchError::OutOfBounds { x, y }),
                }
            })
            .collect()
    }
}

impl Default for FleetRules {
    fn default() -> Self {
        Self::standard()
    }
}
