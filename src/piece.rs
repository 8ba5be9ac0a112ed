//! Pieces: the seven shapes, the falling piece and its rotation, and the catalog that deals them.

use crate::board::COLUMNS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;

/// Tetromino kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Spawn orientation as rows of 0/1, origin top-left.
    fn rows(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::S => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Z => &[&[0, 1, 1], &[1, 1, 0]],
            Self::J => &[&[1, 0, 0], &[1, 1, 1]],
            Self::L => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }

    pub fn shape(self) -> Shape {
        Shape::from_rows(self.rows())
    }

    /// Colour index 0..7 for theme.piece_color().
    pub fn color_index(self) -> usize {
        match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::S => 3,
            Self::Z => 4,
            Self::J => 5,
            Self::L => 6,
        }
    }
}

/// Rectangular occupancy matrix, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Shape {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let cells = rows
            .iter()
            .flat_map(|r| (0..width).map(move |x| r.get(x).is_some_and(|&v| v != 0)))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }

    /// Occupied cells as (col, row) relative to the top-left origin.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_set(y, x))
    }

    /// Clockwise quarter turn: transpose, then reverse each row.
    /// The result has `height` columns and `width` rows.
    pub fn rotated_cw(&self) -> Self {
        let (w, h) = (self.height, self.width);
        let mut cells = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                cells.push(self.is_set(self.height - 1 - x, y));
            }
        }
        Self {
            width: w,
            height: h,
            cells,
        }
    }
}

/// Falling piece: current (possibly rotated) shape and the board position of its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: TetrominoKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Spawn orientation, horizontally centred on the top row.
    pub fn spawn(kind: TetrominoKind) -> Self {
        let shape = kind.shape();
        let x = (COLUMNS / 2) as i32 - (shape.width() / 2) as i32;
        Self { kind, shape, x, y: 0 }
    }

    /// Board coordinates (col, row) of every occupied cell; rows may be negative.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied()
            .map(move |(dx, dy)| (self.x + dx as i32, self.y + dy as i32))
    }

    /// Shape this piece would have after a clockwise turn. Committed by the caller.
    pub fn rotated_shape(&self) -> Shape {
        self.shape.rotated_cw()
    }
}

/// Where the catalog gets its next kind from.
pub trait PieceSource: Debug {
    fn next_kind(&mut self) -> TetrominoKind;
}

/// Uniform choice among the seven kinds.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Seeded for reproducible sequences; `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl PieceSource for RandomSource {
    fn next_kind(&mut self) -> TetrominoKind {
        TetrominoKind::ALL[self.rng.random_range(0..TetrominoKind::ALL.len())]
    }
}

/// Produces spawn-ready piece instances.
#[derive(Debug)]
pub struct Catalog {
    source: Box<dyn PieceSource>,
}

impl Catalog {
    pub fn new(source: Box<dyn PieceSource>) -> Self {
        Self { source }
    }

    pub fn random(seed: Option<u64>) -> Self {
        Self::new(Box::new(RandomSource::new(seed)))
    }

    pub fn random_piece(&mut self) -> Piece {
        Piece::spawn(self.source.next_kind())
    }
}
