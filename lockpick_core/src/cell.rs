//! Board cells and their decoding into tiles.
//!
//! Every cell on the board is four characters wide:
//! `[type][count][color requirement][color]`. Floor is four spaces, walls
//! are `████`, the exit is `!!!!` and the start marker is `####`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::KeyColor;

/// Number of characters in one encoded cell.
pub const CELL_WIDTH: usize = 4;

/// Door type symbols; a symbol's index is its modifier bit field.
pub const DOOR_SYMBOLS: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Letters usable in the count slot and the amount they stand for.
pub const LETTER_COUNTS: &[(char, i32)] = &[('A', 24), ('B', 256)];

/// Count character meaning "blast" door semantics.
pub const BLAST: char = '-';

/// A raw four-character cell record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub kind: char,
    pub count: char,
    pub color_req: KeyColor,
    pub color: KeyColor,
}

impl Cell {
    pub const EMPTY: Cell = Cell::uniform(' ');
    pub const WALL: Cell = Cell::uniform('█');
    pub const EXIT: Cell = Cell::uniform('!');
    pub const START: Cell = Cell::uniform('#');

    pub const fn new(kind: char, count: char, color_req: KeyColor, color: KeyColor) -> Self {
        Cell {
            kind,
            count,
            color_req,
            color,
        }
    }

    const fn uniform(c: char) -> Self {
        Cell::new(c, c, c, c)
    }

    /// Builds a cell from exactly [`CELL_WIDTH`] characters.
    pub fn from_chars(chars: &[char]) -> Option<Self> {
        match *chars {
            [kind, count, color_req, color] => Some(Cell::new(kind, count, color_req, color)),
            _ => None,
        }
    }

    /// Returns a copy of this cell with a different type character.
    pub fn with_kind(self, kind: char) -> Self {
        Cell { kind, ..self }
    }

    pub fn is_empty(&self) -> bool {
        *self == Cell::EMPTY
    }

    pub fn is_exit(&self) -> bool {
        *self == Cell::EXIT
    }

    /// Interprets the raw record.
    pub fn decode(&self) -> Tile {
        match *self {
            Cell::EMPTY => return Tile::Empty,
            Cell::WALL => return Tile::Wall,
            Cell::EXIT => return Tile::Exit,
            _ => {}
        }

        let Cell {
            kind,
            count,
            color_req,
            color,
        } = *self;
        match kind {
            'K' | 'N' | 'X' | 'Y' => {
                let Some(Count::Exact(amount)) = Count::from_char(count) else {
                    return Tile::Unknown;
                };
                let kind = match kind {
                    'K' => KeyKind::Add,
                    'N' => KeyKind::Subtract,
                    'X' => KeyKind::Exact,
                    _ => KeyKind::ExactNegative,
                };
                Tile::Key {
                    kind,
                    amount,
                    color: color_req,
                }
            }
            'S' => Tile::Star { color: color_req },
            'U' => Tile::Unstar { color: color_req },
            'T' => Tile::Toggle { id: count },
            'P' => Tile::Gate {
                id: count,
                open_when_off: color_req == ' ',
                open_when_on: color == ' ',
            },
            _ => match (DoorBits::from_symbol(kind), Count::from_char(count)) {
                (Some(bits), Some(count)) => Tile::Door(Door {
                    bits,
                    count,
                    color_req,
                    color,
                }),
                _ => Tile::Unknown,
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.kind, self.count, self.color_req, self.color)
    }
}

/// The amount written in a cell's count slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Count {
    /// Any nonzero amount of the right sign; opening consumes all of it.
    Blast,
    Exact(i32),
}

impl Count {
    pub fn from_char(c: char) -> Option<Self> {
        if c == BLAST {
            return Some(Count::Blast);
        }
        if let Some(digit) = c.to_digit(10) {
            return Some(Count::Exact(digit as i32));
        }
        LETTER_COUNTS
            .iter()
            .find(|(letter, _)| *letter == c)
            .map(|&(_, amount)| Count::Exact(amount))
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Blast => f.write_str("blast"),
            Count::Exact(n) => write!(f, "{n}"),
        }
    }
}

/// How picking up a key changes the count of its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    Add,
    Subtract,
    Exact,
    ExactNegative,
}

/// Door modifier bit field, stored as the index into [`DOOR_SYMBOLS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorBits(u8);

impl DoorBits {
    /// Needs at least one red key to clear.
    pub const FROZEN: u8 = 1;
    /// Needs at least three blue keys to clear.
    pub const PAINTED: u8 = 2;
    /// Needs at least five green keys to clear.
    pub const WITHERED: u8 = 4;
    pub const NEGATIVE: u8 = 8;
    pub const CURSED: u8 = 16;

    const ALL: u8 = 31;

    pub fn new(bits: u8) -> Option<Self> {
        (bits <= Self::ALL).then_some(DoorBits(bits))
    }

    /// Only the first 32 symbols carry a valid bit field.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let index = DOOR_SYMBOLS.find(symbol)?;
        DoorBits::new(u8::try_from(index).ok()?)
    }

    pub fn symbol(self) -> char {
        DOOR_SYMBOLS.as_bytes()[self.0 as usize] as char
    }

    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn is_frozen(self) -> bool {
        self.has(Self::FROZEN)
    }

    pub fn is_painted(self) -> bool {
        self.has(Self::PAINTED)
    }

    pub fn is_withered(self) -> bool {
        self.has(Self::WITHERED)
    }

    pub fn is_negative(self) -> bool {
        self.has(Self::NEGATIVE)
    }

    pub fn is_cursed(self) -> bool {
        self.has(Self::CURSED)
    }

    /// Frozen, painted or withered doors cannot be opened at all.
    pub fn is_sealed(self) -> bool {
        self.has(Self::FROZEN | Self::PAINTED | Self::WITHERED)
    }

    pub fn with(self, flag: u8) -> Self {
        DoorBits(self.0 | flag)
    }

    pub fn without(self, flag: u8) -> Self {
        DoorBits(self.0 & !flag)
    }
}

/// A decoded door cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Door {
    pub bits: DoorBits,
    pub count: Count,
    /// The color checked to open the door.
    pub color_req: KeyColor,
    /// The color whose count changes when the door opens.
    pub color: KeyColor,
}

/// A decoded cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Wall,
    Exit,
    Key {
        kind: KeyKind,
        amount: i32,
        color: KeyColor,
    },
    Star {
        color: KeyColor,
    },
    Unstar {
        color: KeyColor,
    },
    Door(Door),
    /// Flips toggle `id` when stepped on.
    Toggle {
        id: char,
    },
    /// Floor or wall depending on toggle `id`.
    Gate {
        id: char,
        open_when_off: bool,
        open_when_on: bool,
    },
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> Cell {
        let chars: Vec<char> = text.chars().collect();
        Cell::from_chars(&chars).unwrap()
    }

    #[test]
    fn markers_decode() {
        assert_eq!(cell("    ").decode(), Tile::Empty);
        assert_eq!(cell("████").decode(), Tile::Wall);
        assert_eq!(cell("!!!!").decode(), Tile::Exit);
        assert_eq!(cell("????").decode(), Tile::Unknown);
    }

    #[test]
    fn keys_decode_with_letter_counts() {
        assert_eq!(
            cell("K4pp").decode(),
            Tile::Key {
                kind: KeyKind::Add,
                amount: 4,
                color: 'p',
            }
        );
        assert_eq!(
            cell("NBcc").decode(),
            Tile::Key {
                kind: KeyKind::Subtract,
                amount: 256,
                color: 'c',
            }
        );
        assert_eq!(
            cell("YAnn").decode(),
            Tile::Key {
                kind: KeyKind::ExactNegative,
                amount: 24,
                color: 'n',
            }
        );
        // Keys need a definite amount.
        assert_eq!(cell("K-pp").decode(), Tile::Unknown);
        assert_eq!(cell("KZpp").decode(), Tile::Unknown);
    }

    #[test]
    fn doors_decode_bits() {
        let Tile::Door(door) = cell("b2cp").decode() else {
            panic!("expected a door");
        };
        // 'b' is index 11 = negative | painted | frozen
        assert!(door.bits.is_frozen());
        assert!(door.bits.is_painted());
        assert!(!door.bits.is_withered());
        assert!(door.bits.is_negative());
        assert!(!door.bits.is_cursed());
        assert!(door.bits.is_sealed());
        assert_eq!(door.count, Count::Exact(2));
        assert_eq!(door.color_req, 'c');
        assert_eq!(door.color, 'p');

        let Tile::Door(blast) = cell("0-pp").decode() else {
            panic!("expected a door");
        };
        assert_eq!(blast.count, Count::Blast);
        assert!(!blast.bits.is_sealed());
    }

    #[test]
    fn symbols_past_five_bits_are_not_doors() {
        for symbol in ['w', 'x', 'y', 'z'] {
            assert_eq!(Cell::new(symbol, '1', 'r', 'r').decode(), Tile::Unknown);
        }
        assert!(DoorBits::from_symbol('v').is_some());
    }

    #[test]
    fn door_bit_arithmetic_matches_symbol_indices() {
        let frozen = DoorBits::from_symbol('1').unwrap();
        assert_eq!(frozen.without(DoorBits::FROZEN).symbol(), '0');

        let plain = DoorBits::from_symbol('7').unwrap();
        assert_eq!(plain.with(DoorBits::CURSED).symbol(), 'n');
        assert_eq!(DoorBits::from_symbol('n').unwrap().without(DoorBits::CURSED).symbol(), '7');
        assert_eq!(plain.without(DoorBits::PAINTED).symbol(), '5');
        assert_eq!(plain.without(DoorBits::WITHERED).symbol(), '3');
    }

    #[test]
    fn toggles_and_gates_decode() {
        assert_eq!(cell("Tq  ").decode(), Tile::Toggle { id: 'q' });
        assert_eq!(
            cell("Pq █").decode(),
            Tile::Gate {
                id: 'q',
                open_when_off: true,
                open_when_on: false,
            }
        );
    }
}
