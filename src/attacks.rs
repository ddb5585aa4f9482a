use crate::bitboard::{ray, sq_to_bb};
use crate::types::{Bitboard, Direction, PieceType, Square};

/// Compute actual slider attacks given occupancy.
///
/// Each ray is walked to the edge and includes the first occupied square it meets,
/// so unlike the blocker mask the rim squares are part of the result.
pub fn attacks_for(square: Square, occupancy: Bitboard, directions: &[Direction]) -> Bitboard {
    let mut attacks = 0u64;
    for &dir in directions {
        for target in ray(square, dir) {
            let bb = sq_to_bb(target);
            attacks |= bb;
            if occupancy & bb != 0 {
                break;
            }
        }
    }
    attacks
}

/// Slow attacks for a piece type, used to fill and to check magic tables
#[inline]
pub fn piece_attacks(piece: PieceType, square: Square, occupancy: Bitboard) -> Bitboard {
    attacks_for(square, occupancy, piece.directions())
}
