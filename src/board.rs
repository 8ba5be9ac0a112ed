//! Board: fixed 20x10 grid of locked cells and the row-clear pass.

use crate::piece::TetrominoKind;
use std::collections::VecDeque;

/// Board height in cells.
pub const ROWS: usize = 20;
/// Board width in cells.
pub const COLUMNS: usize = 10;

/// Single cell: empty, or locked content tagged with the kind (and so the colour) of its piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(TetrominoKind),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

type Row = [Cell; COLUMNS];

/// Playfield grid. y=0 is top; rows are stored [0..ROWS].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Row>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: (0..ROWS).map(|_| [Cell::Empty; COLUMNS]).collect(),
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Writes a cell; out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    #[inline]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Cell::is_filled)
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|r| r.iter().all(|c| c.is_filled()))
    }

    /// Removes every full row, scanning bottom to top, and inserts an empty row at the
    /// top for each. After a removal the same index is checked again, since the row
    /// above has just shifted into it. Returns the number of rows cleared.
    pub fn clear_completed_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = ROWS;
        while row > 0 {
            let y = row - 1;
            if self.is_row_full(y) {
                self.rows.remove(y);
                self.rows.push_front([Cell::Empty; COLUMNS]);
                cleared += 1;
            } else {
                row -= 1;
            }
        }
        cleared
    }

    pub fn reset(&mut self) {
        for r in &mut self.rows {
            *r = [Cell::Empty; COLUMNS];
        }
    }

    /// Every locked cell as (col, row, kind).
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, TetrominoKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, r)| {
            r.iter().enumerate().filter_map(move |(x, c)| match c {
                Cell::Filled(kind) => Some((x, y, *kind)),
                Cell::Empty => None,
            })
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
