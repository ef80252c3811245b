//! Tile-grid position type.
//!
//! The city is a rectangular grid of tiles; a citizen always stands on exactly
//! one tile.  Coordinates are signed so that offsets and neighbour arithmetic
//! never underflow; the navigation port decides which tiles actually exist.

use std::fmt;

/// A tile coordinate on the city grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (4-neighbour) distance in tiles.
    #[inline]
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// `true` if `other` lies within `radius` tiles (Manhattan).
    #[inline]
    pub fn is_near(self, other: Position, radius: u32) -> bool {
        self.manhattan(other) <= radius
    }

    /// The four orthogonal neighbours, in a fixed order (E, W, S, N).
    pub fn neighbors4(self) -> [Position; 4] {
        [
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x, self.y - 1),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
