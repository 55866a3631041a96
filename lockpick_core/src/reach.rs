//! Free movement across open floor.

use std::collections::BTreeSet;

use crate::Position;
use crate::cell::Tile;
use crate::state::State;

/// Whether the player can walk through `position` without performing an action.
pub fn is_passable(state: &State, position: Position) -> bool {
    match state.cell(position).map(|cell| cell.decode()) {
        Some(Tile::Empty) => true,
        Some(Tile::Gate {
            id,
            open_when_off,
            open_when_on,
        }) => {
            if state.is_toggled(id) {
                open_when_on
            } else {
                open_when_off
            }
        }
        _ => false,
    }
}

/// Every position the player can walk to from where they stand, in scan order.
pub fn reachable(state: &State) -> BTreeSet<Position> {
    let grid = state.grid();
    let mut seen = BTreeSet::from([state.position()]);
    let mut frontier = vec![state.position()];
    while let Some(position) = frontier.pop() {
        for next in grid.neighbors(position) {
            if is_passable(state, next) && seen.insert(next) {
                frontier.push(next);
            }
        }
    }
    seen
}

/// Positions adjacent to the walkable area, each listed once.
///
/// Ordered by the reachable position they border (scan order), then left,
/// right, up, down. Floor cells show up too; they simply offer no moves.
pub fn candidates(state: &State) -> Vec<Position> {
    let grid = state.grid();
    let mut listed = BTreeSet::new();
    let mut out = Vec::new();
    for position in reachable(state) {
        for next in grid.neighbors(position) {
            if listed.insert(next) {
                out.push(next);
            }
        }
    }
    out
}
