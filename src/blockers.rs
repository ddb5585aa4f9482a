//! Relevant-occupancy masks and occupancy enumeration.
//!
//! The mask for a slider on a square is every square along its four rays except the
//! last square of each ray: a piece on the board edge cannot hide anything behind it,
//! so its presence never changes the attack set.

use crate::bitboard::{ray, sq_to_bb, squares_to_bb};
use crate::types::{Bitboard, Direction, PieceType, Square};

/// Squares along each ray from `square`, with the final (edge) square of every ray dropped.
/// Rays are visited in the order given and concatenated.
pub fn relevant_squares(square: Square, directions: &[Direction]) -> Vec<Square> {
    let mut squares = Vec::with_capacity(12);
    for &dir in directions {
        let mut walked: Vec<Square> = ray(square, dir).collect();
        walked.pop();
        squares.extend(walked);
    }
    squares
}

/// The relevant occupancy squares for one (square, piece type) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockerMask {
    pub square: Square,
    pub piece: PieceType,
    pub bits: Bitboard,
    pub squares: Vec<Square>,
}

impl BlockerMask {
    pub fn new(piece: PieceType, square: Square) -> Self {
        let squares = relevant_squares(square, piece.directions());
        let bits = squares_to_bb(&squares);
        debug_assert_eq!(bits.count_ones() as usize, squares.len());
        BlockerMask { square, piece, bits, squares }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Number of distinct occupancies of this mask (2^n)
    #[inline]
    pub fn occupancy_count(&self) -> usize {
        1usize << self.squares.len()
    }

    pub fn occupancies(&self) -> Occupancies<'_> {
        Occupancies::new(&self.squares)
    }
}

/// Every subset of a list of blocker squares, as bitboards.
///
/// Counter value `i` maps bit `k` of `i` to `squares[k]`, so walking `0..2^n`
/// visits each subset exactly once: the empty board first, the full mask last.
pub struct Occupancies<'a> {
    squares: &'a [Square],
    next: u64,
    end: u64,
}

impl<'a> Occupancies<'a> {
    pub fn new(squares: &'a [Square]) -> Self {
        assert!(squares.len() < 64, "blocker list of {} squares is too long", squares.len());
        Occupancies {
            squares,
            next: 0,
            end: 1u64 << squares.len(),
        }
    }

    /// Occupancy for counter value `index`
    pub fn nth_subset(&self, index: u64) -> Bitboard {
        self.squares
            .iter()
            .enumerate()
            .filter(|(bit, _)| index & (1u64 << bit) != 0)
            .fold(0, |occ, (_, &sq)| occ | sq_to_bb(sq))
    }
}

impl Iterator for Occupancies<'_> {
    type Item = Bitboard;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.end {
            return None;
        }
        let occ = self.nth_subset(self.next);
        self.next += 1;
        Some(occ)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.end - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Occupancies<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    /// Interior squares along each ray, counted independently of the ray walker.
    fn interior_count(square: Square, piece: PieceType) -> usize {
        let row = (square / 8) as i32;
        let col = (square % 8) as i32;
        piece
            .directions()
            .iter()
            .map(|&(dr, dc)| {
                let mut len = 0usize;
                let (mut r, mut c) = (row + dr as i32, col + dc as i32);
                while (0..8).contains(&r) && (0..8).contains(&c) {
                    len += 1;
                    r += dr as i32;
                    c += dc as i32;
                }
                len.max(1) - 1
            })
            .sum()
    }

    #[test]
    fn test_rook_corner_mask() {
        let mask = BlockerMask::new(PieceType::Rook, 0);
        let mut squares = mask.squares.clone();
        squares.sort();
        assert_eq!(squares, vec![1, 2, 3, 4, 5, 6, 8, 16, 24, 32, 40, 48]);
        assert_eq!(mask.len(), 12);
    }

    #[test]
    fn test_bishop_corner_mask() {
        let mask = BlockerMask::new(PieceType::Bishop, 0);
        assert_eq!(mask.squares, vec![9, 18, 27, 36, 45, 54]);
    }

    #[test]
    fn test_mask_sizes_match_interior_ray_lengths() {
        for piece in PieceType::ALL {
            for sq in 0..64u8 {
                let mask = BlockerMask::new(piece, sq);
                assert_eq!(mask.len(), interior_count(sq, piece), "{piece} on {sq}");
                assert!(mask.bits & sq_to_bb(sq) == 0);
            }
        }
    }

    #[test]
    fn test_mask_sizes_fit_default_tables() {
        let rook_max = (0..64).map(|sq| BlockerMask::new(PieceType::Rook, sq).len()).max();
        let bishop_max = (0..64).map(|sq| BlockerMask::new(PieceType::Bishop, sq).len()).max();
        assert_eq!(rook_max, Some(12));
        assert_eq!(bishop_max, Some(9));
    }

    #[test]
    fn test_mask_excludes_board_edge_squares() {
        // Bishop on e4: rays end on the rim and those squares are dropped
        let mask = BlockerMask::new(PieceType::Bishop, 28);
        for sq in mask.squares.iter() {
            assert!((1..7).contains(&(sq / 8)) && (1..7).contains(&(sq % 8)));
        }
    }

    #[test]
    fn test_enumeration_is_exhaustive_and_unique() {
        let mask = BlockerMask::new(PieceType::Rook, 0);
        let all: Vec<Bitboard> = mask.occupancies().collect();
        assert_eq!(all.len(), 4096);
        let distinct: HashSet<Bitboard> = all.iter().copied().collect();
        assert_eq!(distinct.len(), 4096);
        assert_eq!(all[0], 0);
        assert_eq!(*all.last().unwrap(), mask.bits);
        assert!(all.iter().all(|occ| occ & !mask.bits == 0));
    }

    #[test]
    fn test_occupancies_reports_exact_size() {
        let mask = BlockerMask::new(PieceType::Bishop, 27);
        let mut occs = mask.occupancies();
        assert_eq!(occs.len(), 512);
        occs.next();
        assert_eq!(occs.len(), 511);
    }

    #[test]
    fn test_empty_blocker_list_yields_only_empty_board() {
        let occs: Vec<Bitboard> = Occupancies::new(&[]).collect();
        assert_eq!(occs, vec![0]);
    }
}
