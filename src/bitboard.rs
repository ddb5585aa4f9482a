//! Bitboard helpers and board geometry.
//!
//! A bitboard is a 64-bit integer where each bit represents a square on the chess board.
//! Square indexing: a1 = 0, b1 = 1, ..., h1 = 7, a2 = 8, ..., h8 = 63
//! This corresponds to: square_index = row * 8 + column with both 0-indexed.
//!
//! Every square that leaves this module has been bounds checked. A step that would
//! leave the board yields `None` instead of a wrapped or clamped index.

use crate::types::{Bitboard, Direction, Square};

/// Convert a 0-indexed row and column to a square index (0-63)
#[inline(always)]
pub const fn rc_to_sq(row: u8, col: u8) -> Square {
    row * 8 + col
}

/// Convert a square index to a bitboard with that single bit set
#[inline(always)]
pub const fn sq_to_bb(sq: Square) -> Bitboard {
    1u64 << sq
}

/// Get the row (0-7) from a square index
#[inline(always)]
pub const fn sq_row(sq: Square) -> u8 {
    sq >> 3
}

/// Get the column (0-7) from a square index
#[inline(always)]
pub const fn sq_col(sq: Square) -> u8 {
    sq & 7
}

/// Move one step from `sq` in `dir`, or `None` if that leaves the 8x8 board.
#[inline]
pub fn step(sq: Square, (dr, dc): Direction) -> Option<Square> {
    assert!(sq < 64, "square {sq} is off the board");
    let row = sq_row(sq) as i8 + dr;
    let col = sq_col(sq) as i8 + dc;
    if (0..8).contains(&row) && (0..8).contains(&col) {
        let next = rc_to_sq(row as u8, col as u8);
        assert!(next < 64, "ray step produced square {next}");
        Some(next)
    } else {
        None
    }
}

/// All squares reached walking from `sq` (exclusive) in `dir` until the board edge.
pub fn ray(sq: Square, dir: Direction) -> impl Iterator<Item = Square> {
    std::iter::successors(step(sq, dir), move |&s| step(s, dir))
}

/// Collect a list of squares into a bitboard
pub fn squares_to_bb(squares: &[Square]) -> Bitboard {
    squares.iter().fold(0, |bb, &sq| bb | sq_to_bb(sq))
}

/// Iterate over set bits in a bitboard, returning square indices
pub struct BitboardIter(pub Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as Square;
            self.0 &= self.0 - 1; // Clear the lowest set bit
            Some(sq)
        }
    }
}

/// Render a bitboard as an 8x8 grid, row 7 (rank 8) on top, `1` for set squares.
pub fn render(bb: Bitboard) -> String {
    let mut out = String::with_capacity(8 * 17);
    for row in (0..8u8).rev() {
        let line: Vec<&str> = (0..8u8)
            .map(|col| if bb & sq_to_bb(rc_to_sq(row, col)) != 0 { "1" } else { "." })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
