//! The rule engine: which actions a tile offers and what they do.

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{KeyColor, Position};
use crate::cell::{Cell, Count, Door, DoorBits, KeyKind, Tile};
use crate::colors::{BLUE, BROWN, GREEN, MASTER, PURE, RED};
use crate::map::Grid;
use crate::reach::candidates;
use crate::state::State;

/// Red keys needed to unfreeze a door.
pub const UNFREEZE_RED: i32 = 1;
/// Blue keys needed to unpaint a door.
pub const UNPAINT_BLUE: i32 = 3;
/// Green keys needed to unwither a door.
pub const UNWITHER_GREEN: i32 = 5;

/// Describes a door in action labels, e.g. `negative cursed blast c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorLabel {
    pub negative: bool,
    pub cursed: bool,
    pub count: Count,
    pub color: KeyColor,
}

impl DoorLabel {
    fn of(door: &Door) -> Self {
        DoorLabel {
            negative: door.bits.is_negative(),
            cursed: door.bits.is_cursed(),
            count: door.count,
            color: door.color_req,
        }
    }
}

impl fmt::Display for DoorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("negative ")?;
        }
        if self.cursed {
            f.write_str("cursed ")?;
        }
        write!(f, "{} {} door", self.count, self.color)
    }
}

/// An action the player performs on a tile next to the walkable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Exit {
        at: Position,
    },
    PickUp {
        at: Position,
        kind: KeyKind,
        amount: i32,
        color: KeyColor,
    },
    Star {
        at: Position,
        color: KeyColor,
    },
    Unstar {
        at: Position,
        color: KeyColor,
    },
    Open {
        at: Position,
        door: DoorLabel,
    },
    MasterKey {
        at: Position,
        door: DoorLabel,
    },
    Curse {
        at: Position,
        count: Count,
        color: KeyColor,
    },
    Uncurse {
        at: Position,
        count: Count,
        color: KeyColor,
    },
    Unfreeze {
        at: Position,
        color: KeyColor,
    },
    Unpaint {
        at: Position,
        color: KeyColor,
    },
    Unwither {
        at: Position,
        color: KeyColor,
    },
    Toggle {
        at: Position,
        id: char,
    },
}

impl Action {
    /// The tile the action was performed on.
    pub fn target(&self) -> Position {
        match *self {
            Action::Exit { at }
            | Action::PickUp { at, .. }
            | Action::Star { at, .. }
            | Action::Unstar { at, .. }
            | Action::Open { at, .. }
            | Action::MasterKey { at, .. }
            | Action::Curse { at, .. }
            | Action::Uncurse { at, .. }
            | Action::Unfreeze { at, .. }
            | Action::Unpaint { at, .. }
            | Action::Unwither { at, .. }
            | Action::Toggle { at, .. } => at,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Exit { at } => write!(f, "Exit at {at}"),
            Action::PickUp {
                at,
                kind,
                amount,
                color,
            } => {
                let variant = match kind {
                    KeyKind::Add => "",
                    KeyKind::Subtract => " negative",
                    KeyKind::Exact => " exact",
                    KeyKind::ExactNegative => " exact negative",
                };
                write!(f, "Pick up {amount} {color}{variant} key at {at}")
            }
            Action::Star { at, color } => write!(f, "Pick up {color} star key at {at}"),
            Action::Unstar { at, color } => write!(f, "Pick up {color} unstar key at {at}"),
            Action::Open { at, door } => write!(f, "Open {door} at {at}"),
            Action::MasterKey { at, door } => write!(f, "Use master key to open {door} at {at}"),
            Action::Curse { at, count, color } => write!(f, "Curse {count} {color} door at {at}"),
            Action::Uncurse { at, count, color } => {
                write!(f, "Uncurse {count} {color} door at {at}")
            }
            Action::Unfreeze { at, color } => write!(f, "Unfreeze {color} door at {at}"),
            Action::Unpaint { at, color } => write!(f, "Unpaint {color} door at {at}"),
            Action::Unwither { at, color } => write!(f, "Unwither {color} door at {at}"),
            Action::Toggle { at, .. } => write!(f, "Trigger toggle at {at}"),
        }
    }
}

/// One transition of the state graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Rounded-up distance from the player to the target. Informational only.
    pub cost: u32,
    pub action: Action,
    pub state: State,
}

impl Edge {
    pub fn label(&self) -> String {
        self.action.to_string()
    }
}

/// All edges out of `state`, in candidate order.
pub fn edges(state: &State) -> Vec<Edge> {
    let edges: Vec<Edge> = candidates(state)
        .into_iter()
        .flat_map(|target| moves_from(state, target))
        .collect();
    trace!("{} edges out of state at {}", edges.len(), state.position());
    edges
}

/// The edges offered by the tile at `target`.
///
/// Walls, floor and anything that does not decode offer nothing.
pub fn moves_from(state: &State, target: Position) -> Vec<Edge> {
    let Some(cell) = state.cell(target) else {
        return Vec::new();
    };
    let tile = cell.decode();
    let mut moves = Moves {
        state,
        target,
        cost: state.position().distance_ceil(&target),
        edges: Vec::new(),
    };

    match tile {
        Tile::Exit => {
            moves.push(
                Action::Exit { at: target },
                state.clone().with_position(target),
            );
        }
        Tile::Key {
            kind,
            amount,
            color,
        } => {
            let keys = match kind {
                KeyKind::Add => state.keys_adding(color, amount),
                KeyKind::Subtract => state.keys_adding(color, -amount),
                KeyKind::Exact => state.keys_setting(color, amount),
                KeyKind::ExactNegative => state.keys_setting(color, -amount),
            };
            let next = moves.step_onto().with_keys(keys);
            moves.push(
                Action::PickUp {
                    at: target,
                    kind,
                    amount,
                    color,
                },
                next,
            );
        }
        Tile::Star { color } => {
            let starred = state.starred().iter().copied().chain([color]);
            let next = moves.step_onto().with_starred(starred);
            moves.push(Action::Star { at: target, color }, next);
        }
        Tile::Unstar { color } => {
            let starred = state.starred().iter().copied().filter(|&c| c != color);
            let next = moves.step_onto().with_starred(starred);
            moves.push(Action::Unstar { at: target, color }, next);
        }
        Tile::Door(door) => door_moves(&mut moves, cell, &door),
        Tile::Toggle { id } => {
            let toggles: Vec<char> = if state.is_toggled(id) {
                state.toggles().iter().copied().filter(|&t| t != id).collect()
            } else {
                state.toggles().iter().copied().chain([id]).collect()
            };
            let next = moves.step_onto().with_toggles(toggles);
            moves.push(Action::Toggle { at: target, id }, next);
        }
        Tile::Empty | Tile::Wall | Tile::Gate { .. } | Tile::Unknown => {}
    }
    moves.edges
}

/// Whether `door` can be opened with the keys in `state`, ignoring master keys.
pub fn can_open(state: &State, door: &Door) -> bool {
    let bits = door.bits;
    if bits.is_sealed() {
        return false;
    }
    let brown = state.keys().get(BROWN);
    let cursed = bits.is_cursed();
    let usable = door.color_req == BROWN
        || (!cursed && (door.color_req == PURE || brown <= 0))
        || (cursed && brown >= 0);
    if !usable {
        return false;
    }

    let held = state.keys().get(checked_color(door));
    match (door.count, bits.is_negative()) {
        (Count::Blast, false) => held > 0,
        (Count::Blast, true) => held < 0,
        (Count::Exact(0), _) => held == 0,
        (Count::Exact(n), false) => held >= n,
        (Count::Exact(n), true) => held <= -n,
    }
}

/// Whether a master key may stand in for the door's own keys.
pub fn accepts_master_key(state: &State, door: &Door) -> bool {
    let brown = state.keys().get(BROWN);
    door.color_req != PURE
        && (door.color_req != MASTER || (door.bits.is_cursed() && brown >= 0))
        && !door.bits.is_sealed()
        && state.keys().get(MASTER) > 0
}

/// Cursed doors are checked and paid in brown.
fn checked_color(door: &Door) -> KeyColor {
    if door.bits.is_cursed() { BROWN } else { door.color_req }
}

fn paid_color(door: &Door) -> KeyColor {
    if door.bits.is_cursed() { BROWN } else { door.color }
}

fn door_moves(moves: &mut Moves<'_>, cell: Cell, door: &Door) {
    let state = moves.state;
    let at = moves.target;
    let keys = state.keys();
    let bits = door.bits;
    let label = DoorLabel::of(door);

    if can_open(state, door) {
        let paid = paid_color(door);
        let delta = match door.count {
            Count::Blast => -keys.get(checked_color(door)),
            Count::Exact(n) if bits.is_negative() => n,
            Count::Exact(n) => -n,
        };
        let next = moves.step_onto().with_keys(state.keys_adding(paid, delta));
        moves.push(Action::Open { at, door: label }, next);
    }

    if accepts_master_key(state, door) {
        let next = moves.step_onto().with_keys(state.keys_adding(MASTER, -1));
        moves.push(Action::MasterKey { at, door: label }, next);
    }

    let curseable = door.color_req != PURE && door.color_req != BROWN;
    let brown = keys.get(BROWN);
    if curseable && !bits.is_cursed() && brown > 0 {
        let next = moves.rewrite(cell, bits.with(DoorBits::CURSED));
        moves.push(
            Action::Curse {
                at,
                count: door.count,
                color: door.color_req,
            },
            next,
        );
    }
    if curseable && bits.is_cursed() && brown < 0 {
        let next = moves.rewrite(cell, bits.without(DoorBits::CURSED));
        moves.push(
            Action::Uncurse {
                at,
                count: door.count,
                color: door.color_req,
            },
            next,
        );
    }

    let color = door.color_req;
    if bits.is_frozen() && keys.get(RED) >= UNFREEZE_RED {
        let next = moves.rewrite(cell, bits.without(DoorBits::FROZEN));
        moves.push(Action::Unfreeze { at, color }, next);
    }
    if bits.is_painted() && keys.get(BLUE) >= UNPAINT_BLUE {
        let next = moves.rewrite(cell, bits.without(DoorBits::PAINTED));
        moves.push(Action::Unpaint { at, color }, next);
    }
    if bits.is_withered() && keys.get(GREEN) >= UNWITHER_GREEN {
        let next = moves.rewrite(cell, bits.without(DoorBits::WITHERED));
        moves.push(Action::Unwither { at, color }, next);
    }
}

/// Edge accumulator for one target tile.
struct Moves<'a> {
    state: &'a State,
    target: Position,
    cost: u32,
    edges: Vec<Edge>,
}

impl Moves<'_> {
    fn push(&mut self, action: Action, state: State) {
        self.edges.push(Edge {
            cost: self.cost,
            action,
            state,
        });
    }

    /// The player walks onto the target, which becomes floor.
    fn step_onto(&self) -> State {
        self.state
            .clone()
            .with_grid(self.replaced(Cell::EMPTY))
            .with_position(self.target)
    }

    /// The player stays put and the door at the target gets new modifier bits.
    fn rewrite(&self, cell: Cell, bits: DoorBits) -> State {
        self.state
            .clone()
            .with_grid(self.replaced(cell.with_kind(bits.symbol())))
    }

    fn replaced(&self, cell: Cell) -> Grid<Cell> {
        self.state
            .grid()
            .with_cell(self.target, cell)
            .unwrap_or_else(|_| self.state.grid().clone())
    }
}
