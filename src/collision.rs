//! Placement check for a hypothetical piece position.

use crate::board::{Board, COLUMNS, ROWS};
use crate::piece::{Piece, Shape};

/// True if `piece`, translated by (dx, dy) and optionally given `shape` instead of its own,
/// would leave the side walls, pass the floor, or overlap a locked cell.
/// Cells above the top row only get the wall check.
pub fn collides(board: &Board, piece: &Piece, dx: i32, dy: i32, shape: Option<&Shape>) -> bool {
    let shape = shape.unwrap_or(&piece.shape);
    for (sx, sy) in shape.occupied() {
        let x = piece.x + dx + sx as i32;
        let y = piece.y + dy + sy as i32;

        if x < 0 || x >= COLUMNS as i32 || y >= ROWS as i32 {
            return true;
        }
        if y < 0 {
            continue;
        }
        if board.is_occupied(y as usize, x as usize) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_from;
    use crate::piece::TetrominoKind;

    fn piece_at(kind: TetrominoKind, x: i32, y: i32) -> Piece {
        Piece {
            x,
            y,
            ..Piece::spawn(kind)
        }
    }

    #[test]
    fn test_free_fall_on_empty_board() {
        let board = Board::new();
        let p = piece_at(TetrominoKind::T, 4, 5);
        assert!(!collides(&board, &p, 0, 1, None));
    }

    #[test]
    fn test_walls_block_at_any_row() {
        let board = Board::new();
        for y in -2..ROWS as i32 - 1 {
            let left = piece_at(TetrominoKind::I, 0, y);
            assert!(collides(&board, &left, -1, 0, None), "row {y}");
            let right = piece_at(TetrominoKind::I, COLUMNS as i32 - 4, y);
            assert!(collides(&board, &right, 1, 0, None), "row {y}");
        }
    }

    #[test]
    fn test_floor_blocks() {
        let board = Board::new();
        let p = piece_at(TetrominoKind::O, 4, ROWS as i32 - 2);
        assert!(!collides(&board, &p, 0, 0, None));
        assert!(collides(&board, &p, 0, 1, None));
    }

    #[test]
    fn test_locked_cells_block() {
        let board = board_from(&["....#....."]);
        let p = piece_at(TetrominoKind::O, 4, ROWS as i32 - 3);
        assert!(collides(&board, &p, 0, 1, None));
        assert!(!collides(&board, &p, 1, 0, None));
    }

    #[test]
    fn test_above_top_ignores_cells_but_not_walls() {
        let mut board = Board::new();
        for x in 0..COLUMNS {
            board.set(0, x, crate::board::Cell::Filled(TetrominoKind::Z));
        }
        let high = piece_at(TetrominoKind::O, 4, -2);
        assert!(!collides(&board, &high, 0, 0, None));
        assert!(collides(&board, &high, 0, 1, None));
        let off_side = piece_at(TetrominoKind::O, -1, -2);
        assert!(collides(&board, &off_side, 0, 0, None));
    }

    #[test]
    fn test_override_shape_is_used() {
        let board = Board::new();
        let flat = piece_at(TetrominoKind::I, 3, ROWS as i32 - 1);
        let upright = flat.rotated_shape();
        assert!(!collides(&board, &flat, 0, 0, None));
        assert!(collides(&board, &flat, 0, 0, Some(&upright)));
    }
}
