use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{KeyColor, Position};
use crate::cell::Cell;
use crate::map::Grid;

/// Signed key counts per color.
///
/// Colors with a count of zero are never stored, so two tables holding the
/// same nonzero counts are equal and hash equal regardless of history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCounts(BTreeMap<KeyColor, i32>);

impl KeyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// The count of `color`; absent colors count as zero.
    pub fn get(&self, color: KeyColor) -> i32 {
        self.0.get(&color).copied().unwrap_or(0)
    }

    /// Returns a copy with `color` set to `count`.
    pub fn with(&self, color: KeyColor, count: i32) -> Self {
        let mut counts = self.0.clone();
        if count == 0 {
            counts.remove(&color);
        } else {
            counts.insert(color, count);
        }
        KeyCounts(counts)
    }

    /// Returns a copy with `delta` added to `color`.
    pub fn adding(&self, color: KeyColor, delta: i32) -> Self {
        self.with(color, self.get(color) + delta)
    }

    /// Nonzero counts in color order.
    pub fn iter(&self) -> impl Iterator<Item = (KeyColor, i32)> + '_ {
        self.0.iter().map(|(&color, &count)| (color, count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Later entries win; zero counts are dropped.
impl FromIterator<(KeyColor, i32)> for KeyCounts {
    fn from_iter<I: IntoIterator<Item = (KeyColor, i32)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(KeyCounts::new(), |counts, (color, count)| counts.with(color, count))
    }
}

/// One node of the puzzle's state space.
///
/// All facets are value types kept in canonical (sorted) form, so derived
/// equality and hashing are structural. Transitions build new states and
/// never modify existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    position: Position,
    grid: Grid<Cell>,
    keys: KeyCounts,
    starred: BTreeSet<KeyColor>,
    toggles: BTreeSet<char>,
}

impl State {
    /// A fresh state: no keys, nothing starred, every toggle off.
    pub fn new(position: Position, grid: Grid<Cell>) -> Self {
        State {
            position,
            grid,
            keys: KeyCounts::new(),
            starred: BTreeSet::new(),
            toggles: BTreeSet::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn grid(&self) -> &Grid<Cell> {
        &self.grid
    }

    pub fn keys(&self) -> &KeyCounts {
        &self.keys
    }

    pub fn starred(&self) -> &BTreeSet<KeyColor> {
        &self.starred
    }

    pub fn toggles(&self) -> &BTreeSet<char> {
        &self.toggles
    }

    pub fn is_starred(&self, color: KeyColor) -> bool {
        self.starred.contains(&color)
    }

    pub fn is_toggled(&self, id: char) -> bool {
        self.toggles.contains(&id)
    }

    /// The cell at `position`, or `None` off the board.
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.grid.get(position.x, position.y).copied()
    }

    /// A state is terminal once the player stands on the exit.
    pub fn is_terminal(&self) -> bool {
        self.cell(self.position).is_some_and(|cell| cell.is_exit())
    }

    pub fn with_position(self, position: Position) -> Self {
        State { position, ..self }
    }

    pub fn with_grid(self, grid: Grid<Cell>) -> Self {
        State { grid, ..self }
    }

    pub fn with_keys(self, keys: KeyCounts) -> Self {
        State { keys, ..self }
    }

    pub fn with_starred<I: IntoIterator<Item = KeyColor>>(self, starred: I) -> Self {
        State {
            starred: starred.into_iter().collect(),
            ..self
        }
    }

    pub fn with_toggles<I: IntoIterator<Item = char>>(self, toggles: I) -> Self {
        State {
            toggles: toggles.into_iter().collect(),
            ..self
        }
    }

    /// Adds `delta` to `color` unless the color is starred.
    pub(crate) fn keys_adding(&self, color: KeyColor, delta: i32) -> KeyCounts {
        if self.is_starred(color) {
            self.keys.clone()
        } else {
            self.keys.adding(color, delta)
        }
    }

    /// Sets `color` to `count` unless the color is starred.
    pub(crate) fn keys_setting(&self, color: KeyColor, count: i32) -> KeyCounts {
        if self.is_starred(color) {
            self.keys.clone()
        } else {
            self.keys.with(color, count)
        }
    }

    /// Formats the key table, e.g. `p*=3, r=-1`. Starred colors without keys show as `=0`.
    pub fn key_summary(&self) -> String {
        let star = |color: KeyColor| if self.is_starred(color) { "*" } else { "" };
        self.keys
            .iter()
            .map(|(color, count)| format!("{color}{}={count}", star(color)))
            .chain(
                self.starred
                    .iter()
                    .filter(|&&color| self.keys.get(color) == 0)
                    .map(|color| format!("{color}*=0")),
            )
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Renders the board with `####` at the player, followed by keys and toggles.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.grid.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for (x, cell) in row.iter().enumerate() {
                if self.position == Position::new(x, y) {
                    write!(f, "{}", Cell::START)?;
                } else {
                    write!(f, "{cell}")?;
                }
            }
        }
        let keys = self.key_summary();
        if !keys.is_empty() {
            write!(f, "    {keys}")?;
        }
        if !self.toggles.is_empty() {
            let toggles: Vec<String> = self.toggles.iter().map(char::to_string).collect();
            write!(f, "    Toggles: {}", toggles.join(", "))?;
        }
        Ok(())
    }
}
