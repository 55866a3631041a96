use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod board;
pub mod cell;
pub mod explore;
pub mod map;
pub mod reach;
pub mod rules;
pub mod select;
pub mod state;

pub use board::{BoardError, load_board};
pub use explore::{Explorer, Path, search};
pub use rules::{Action, Edge};
pub use select::{KeyCount, Objective, SelectError, select_best, select_best_by_key};
pub use state::{KeyCounts, State};

/// A key color, as written in the third and fourth character of a cell.
pub type KeyColor = char;

/// Colors with special meaning to the rule engine.
pub mod colors {
    use crate::KeyColor;

    /// Brown keys gate cursing, and cursed doors are paid in brown.
    pub const BROWN: KeyColor = 'n';
    /// Pure doors ignore curses and cannot be opened with a master key.
    pub const PURE: KeyColor = 'u';
    /// Master keys open (almost) any door.
    pub const MASTER: KeyColor = 'm';
    /// Needed to unfreeze a door.
    pub const RED: KeyColor = 'r';
    /// Needed to unpaint a door.
    pub const BLUE: KeyColor = 'b';
    /// Needed to unwither a door.
    pub const GREEN: KeyColor = 'g';
}

/// Represents a 2D coordinate on the board, in cells.
///
/// Positions order in board scan order: top to bottom, then left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Euclidean distance to `other`, rounded up.
    pub fn distance_ceil(&self, other: &Position) -> u32 {
        let dx = self.x.abs_diff(other.x) as f64;
        let dy = self.y.abs_diff(other.y) as f64;
        (dx * dx + dy * dy).sqrt().ceil() as u32
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_sort_in_scan_order() {
        let mut positions = vec![
            Position::new(3, 1),
            Position::new(0, 2),
            Position::new(1, 1),
            Position::new(5, 0),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                Position::new(5, 0),
                Position::new(1, 1),
                Position::new(3, 1),
                Position::new(0, 2),
            ]
        );
    }

    #[test]
    fn distance_is_rounded_up() {
        let origin = Position::new(2, 2);
        assert_eq!(origin.distance_ceil(&Position::new(2, 2)), 0);
        assert_eq!(origin.distance_ceil(&Position::new(3, 2)), 1);
        assert_eq!(origin.distance_ceil(&Position::new(3, 3)), 2);
        assert_eq!(origin.distance_ceil(&Position::new(5, 6)), 5);
    }
}
