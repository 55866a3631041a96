use log::debug;

use crate::Position;
use crate::cell::{CELL_WIDTH, Cell};
use crate::map::Grid;
use crate::state::State;

/// Reasons a board text cannot be turned into an initial state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Board text is empty.")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected} characters, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} has {len} characters, which is not a multiple of the cell width (4)")]
    MisalignedRow { row: usize, len: usize },
    #[error("No start position ('####') found on the board.")]
    MissingStart,
    #[error("Multiple start positions ('####') found: {first} and {second}")]
    MultipleStarts { first: Position, second: Position },
    #[error("No exit ('!!!!') found on the board.")]
    MissingExit,
}

/// Loads the initial state from a board literal.
///
/// Leading and trailing blank lines are ignored and `\r` is stripped. Every
/// remaining line is one row of four-character cells. The start cell
/// (`####`) becomes floor under the player.
pub fn load_board(text: &str) -> Result<State, BoardError> {
    let text = text.replace('\r', "");
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.first().is_some_and(|line| line.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(BoardError::Empty);
    }

    let rows: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();
    let expected = rows[0].len();
    for (row, chars) in rows.iter().enumerate() {
        if chars.len() != expected {
            return Err(BoardError::RaggedRow {
                row,
                expected,
                found: chars.len(),
            });
        }
        if chars.len() % CELL_WIDTH != 0 {
            return Err(BoardError::MisalignedRow {
                row,
                len: chars.len(),
            });
        }
    }
    if expected == 0 {
        return Err(BoardError::Empty);
    }

    let width = expected / CELL_WIDTH;
    let height = rows.len();
    let cells: Vec<Vec<Cell>> = rows
        .iter()
        .map(|chars| {
            chars
                .chunks(CELL_WIDTH)
                .filter_map(Cell::from_chars)
                .collect()
        })
        .collect();

    let mut start: Option<Position> = None;
    let mut has_exit = false;
    for (y, row) in cells.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if *cell == Cell::START {
                let position = Position::new(x, y);
                if let Some(first) = start {
                    return Err(BoardError::MultipleStarts {
                        first,
                        second: position,
                    });
                }
                start = Some(position);
            } else if cell.is_exit() {
                has_exit = true;
            }
        }
    }
    let start = start.ok_or(BoardError::MissingStart)?;
    if !has_exit {
        return Err(BoardError::MissingExit);
    }

    let grid = Grid::from_generator(width, height, |x, y| {
        if Position::new(x, y) == start {
            Cell::EMPTY
        } else {
            cells[y][x]
        }
    });
    debug!("Loaded {width}x{height} board, start at {start}");
    Ok(State::new(start, grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_start_and_clears_it() {
        let state = load_board(
            "
████████████████
████####K1rr!!!!
████████████████
",
        )
        .unwrap();
        assert_eq!(state.position(), Position::new(1, 1));
        assert_eq!(state.grid().width(), 4);
        assert_eq!(state.grid().height(), 3);
        assert_eq!(state.cell(Position::new(1, 1)), Some(Cell::EMPTY));
        assert_eq!(state.cell(Position::new(2, 1)), Some(Cell::new('K', '1', 'r', 'r')));
        assert!(state.keys().is_empty());
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let state = load_board("####!!!!\r\n████████\r\n").unwrap();
        assert_eq!(state.position(), Position::new(0, 0));
    }

    #[test]
    fn rejects_empty_board() {
        assert_eq!(load_board(""), Err(BoardError::Empty));
        assert_eq!(load_board("\n\n"), Err(BoardError::Empty));
    }

    #[test]
    fn rejects_ragged_rows() {
        assert_eq!(
            load_board("####!!!!\n████"),
            Err(BoardError::RaggedRow {
                row: 1,
                expected: 8,
                found: 4,
            })
        );
    }

    #[test]
    fn rejects_misaligned_rows() {
        assert_eq!(
            load_board("####!!!! \n████████ "),
            Err(BoardError::MisalignedRow { row: 0, len: 9 })
        );
    }

    #[test]
    fn rejects_missing_markers() {
        assert_eq!(load_board("    !!!!"), Err(BoardError::MissingStart));
        assert_eq!(load_board("####    "), Err(BoardError::MissingExit));
        assert_eq!(
            load_board("####!!!!####"),
            Err(BoardError::MultipleStarts {
                first: Position::new(0, 0),
                second: Position::new(2, 0),
            })
        );
    }
}
