use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// An immutable 2D grid structure.
///
/// Stores elements of type `T` in a flat, shared slice using row-major order.
/// Cloning a grid is cheap; replacing a cell produces a new grid and leaves
/// every other clone untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Arc<[T]>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes `(x, y)` coordinates and returns the value for that cell.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Grid {
            width,
            height,
            cells: cells.into(),
        }
    }

    /// Returns the width of the grid.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the grid.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts (x, y) coordinates to a flat index.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[inline]
    pub fn coords_to_index(&self, x: usize, y: usize) -> Option<usize> {
        if self.is_valid(x, y) {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Checks if the given coordinates are within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Gets a reference to the cell at the given coordinates.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        let index = self.coords_to_index(x, y)?;
        self.cells.get(index)
    }

    /// The 4-adjacent positions of `position` that lie inside the grid,
    /// in the order left, right, up, down.
    pub fn neighbors(&self, position: Position) -> impl Iterator<Item = Position> + use<T> {
        let Position { x, y } = position;
        let (width, height) = (self.width, self.height);
        [
            (x > 0).then(|| Position::new(x - 1, y)),
            (x + 1 < width).then(|| Position::new(x + 1, y)),
            (y > 0).then(|| Position::new(x, y - 1)),
            (y + 1 < height).then(|| Position::new(x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }

    /// Returns an iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // `chunks` rejects a zero chunk size, and a zero-width grid has no cells anyway.
        self.cells.chunks(self.width.max(1))
    }
}

impl<T: Clone> Grid<T> {
    /// Returns a copy of this grid with the cell at `position` replaced by `value`.
    ///
    /// Returns `Err(GridError::OutOfBounds)` if the position is invalid.
    pub fn with_cell(&self, position: Position, value: T) -> Result<Self, GridError> {
        let index = self
            .coords_to_index(position.x, position.y)
            .ok_or(GridError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            })?;
        let mut cells = self.cells.to_vec();
        cells[index] = value;
        Ok(Grid {
            width: self.width,
            height: self.height,
            cells: cells.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Grid<usize> {
        Grid::from_generator(width, height, |x, y| y * 10 + x)
    }

    #[test]
    fn with_cell_leaves_original_untouched() {
        let grid = numbered(3, 2);
        let changed = grid.with_cell(Position::new(2, 1), 99).unwrap();

        assert_eq!(grid.get(2, 1), Some(&12));
        assert_eq!(changed.get(2, 1), Some(&99));
        assert_ne!(grid, changed);
        assert_eq!(grid, numbered(3, 2));
    }

    #[test]
    fn with_cell_out_of_bounds() {
        let grid = numbered(3, 2);
        assert_eq!(
            grid.with_cell(Position::new(3, 0), 1),
            Err(GridError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2,
            })
        );
    }

    #[test]
    fn neighbors_stay_inside() {
        let grid = numbered(3, 3);
        let corner: Vec<_> = grid.neighbors(Position::new(0, 0)).collect();
        assert_eq!(corner, vec![Position::new(1, 0), Position::new(0, 1)]);

        let center: Vec<_> = grid.neighbors(Position::new(1, 1)).collect();
        assert_eq!(
            center,
            vec![
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
    }

    #[test]
    fn rows_are_row_major() {
        let grid = numbered(2, 2);
        let rows: Vec<Vec<usize>> = grid.rows().map(<[usize]>::to_vec).collect();
        assert_eq!(rows, vec![vec![0, 1], vec![10, 11]]);
        assert_eq!(grid.get(2, 0), None);
    }
}
