//! Consumer view of the generated artifacts.
//!
//! This is the lookup the engine performs: mask the board occupancy with the
//! square's blocker mask, hash it with the square's magic, and read the attack set
//! from the table. Loading it back here lets a run check its own output end to end.

use std::path::Path;

use tracing::info;

use crate::attacks::piece_attacks;
use crate::blockers::BlockerMask;
use crate::config::OutputPaths;
use crate::emit::{read_json, AttackArtifact, Artifacts, BlockerArtifact, MagicArtifact};
use crate::error::GenError;
use crate::magic::magic_index;
use crate::types::{Bitboard, PerPiece, PieceType, Square, NUM_SQUARES};

/// Per-piece magic tables as the engine holds them
#[derive(Debug, Clone)]
pub struct SliderLookup {
    bits: PerPiece<u8>,
    masks: BlockerArtifact,
    magics: MagicArtifact,
    attacks: AttackArtifact,
}

fn shape_error(artifact: &'static str, detail: String) -> GenError {
    GenError::ArtifactShape { artifact, detail }
}

fn check_squares<T>(artifact: &'static str, piece: PieceType, entries: &[T]) -> Result<(), GenError> {
    if entries.len() != NUM_SQUARES {
        return Err(shape_error(
            artifact,
            format!("{piece} has {} entries, expected {NUM_SQUARES}", entries.len()),
        ));
    }
    Ok(())
}

/// Index width implied by the attack tables of one piece: all 64 tables must
/// share one power-of-two length.
fn table_bits(piece: PieceType, tables: &[Vec<Option<Bitboard>>]) -> Result<u8, GenError> {
    let len = tables.first().map_or(0, Vec::len);
    if !len.is_power_of_two() || len < 2 {
        return Err(shape_error("attack", format!("{piece} table length {len} is not a power of two")));
    }
    if let Some((sq, t)) = tables.iter().enumerate().find(|(_, t)| t.len() != len) {
        return Err(shape_error(
            "attack",
            format!("{piece} square {sq} has {} slots, square 0 has {len}", t.len()),
        ));
    }
    Ok(len.trailing_zeros() as u8)
}

impl SliderLookup {
    pub fn new(
        magics: MagicArtifact,
        attacks: AttackArtifact,
        masks: BlockerArtifact,
    ) -> Result<Self, GenError> {
        for piece in PieceType::ALL {
            check_squares("magic", piece, magics.get(piece))?;
            check_squares("attack", piece, attacks.get(piece))?;
            check_squares("blocker", piece, masks.get(piece))?;
        }
        let bits = PerPiece {
            bishop: table_bits(PieceType::Bishop, &attacks.bishop)?,
            rook: table_bits(PieceType::Rook, &attacks.rook)?,
        };
        Ok(SliderLookup { bits, masks, magics, attacks })
    }

    pub fn from_artifacts(artifacts: &Artifacts) -> Result<Self, GenError> {
        Self::new(
            artifacts.magics.clone(),
            artifacts.attacks.clone(),
            artifacts.blockers.clone(),
        )
    }

    /// Load the three engine-facing artifacts from disk.
    pub fn load(paths: &OutputPaths) -> Result<Self, GenError> {
        Self::load_files(&paths.magics, &paths.attacks, &paths.blockers)
    }

    pub fn load_files(magics: &Path, attacks: &Path, blockers: &Path) -> Result<Self, GenError> {
        Self::new(read_json(magics)?, read_json(attacks)?, read_json(blockers)?)
    }

    pub fn index_bits(&self, piece: PieceType) -> u8 {
        *self.bits.get(piece)
    }

    pub fn mask(&self, piece: PieceType, sq: Square) -> Bitboard {
        self.masks.get(piece)[sq as usize]
    }

    pub fn magic(&self, piece: PieceType, sq: Square) -> u64 {
        self.magics.get(piece)[sq as usize]
    }

    /// Attacks of `piece` on `sq` for the full board occupancy `occupied`.
    /// `None` only if the tables were not built for this mask and magic.
    #[inline]
    pub fn attacks(&self, piece: PieceType, sq: Square, occupied: Bitboard) -> Option<Bitboard> {
        let relevant = occupied & self.mask(piece, sq);
        let index = magic_index(self.magic(piece, sq), relevant, self.index_bits(piece));
        self.attacks.get(piece)[sq as usize][index]
    }

    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Option<Bitboard> {
        self.attacks(PieceType::Bishop, sq, occupied)
    }

    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Option<Bitboard> {
        self.attacks(PieceType::Rook, sq, occupied)
    }

    /// Get queen attacks (combines bishop and rook)
    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Option<Bitboard> {
        Some(self.bishop_attacks(sq, occupied)? | self.rook_attacks(sq, occupied)?)
    }

    /// Check every square against freshly built masks and ray-walked attacks for
    /// every occupancy of its mask. Returns the number of lookups checked.
    pub fn verify(&self) -> Result<usize, GenError> {
        let mut checked = 0;
        for piece in PieceType::ALL {
            for sq in 0..NUM_SQUARES as Square {
                let expected_mask = BlockerMask::new(piece, sq);
                let mask = self.mask(piece, sq);
                if mask != expected_mask.bits {
                    return Err(shape_error(
                        "blocker",
                        format!("{piece} square {sq} mask {mask:#018x}, expected {:#018x}", expected_mask.bits),
                    ));
                }
                for occupancy in expected_mask.occupancies() {
                    let expected = piece_attacks(piece, sq, occupancy);
                    let found = self.attacks(piece, sq, occupancy);
                    if found != Some(expected) {
                        return Err(GenError::TableMismatch {
                            piece,
                            square: sq,
                            occupancy,
                            expected,
                            found,
                        });
                    }
                    checked += 1;
                }
            }
        }
        info!(checked, "magic tables verified");
        Ok(checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::{rc_to_sq, sq_to_bb};

    /// Tables with only the a1 rook filled in, from a known-good magic, so the
    /// lookup can be exercised without running a search.
    fn lookup_for_rook_a1(magic: u64) -> SliderLookup {
        let mask = BlockerMask::new(PieceType::Rook, 0);
        let mut rook_table = vec![None; 4096];
        for occ in mask.occupancies() {
            rook_table[magic_index(magic, occ, 12)] = Some(piece_attacks(PieceType::Rook, 0, occ));
        }
        let mut attacks = AttackArtifact {
            bishop: vec![vec![None; 512]; 64],
            rook: vec![vec![None; 4096]; 64],
        };
        attacks.rook[0] = rook_table;
        let mut magics = MagicArtifact { bishop: vec![0; 64], rook: vec![0; 64] };
        magics.rook[0] = magic;
        let masks = BlockerArtifact {
            bishop: (0..64).map(|sq| BlockerMask::new(PieceType::Bishop, sq).bits).collect(),
            rook: (0..64).map(|sq| BlockerMask::new(PieceType::Rook, sq).bits).collect(),
        };
        SliderLookup::new(magics, attacks, masks).unwrap()
    }

    #[test]
    fn test_lookup_ignores_irrelevant_occupancy() {
        // A well-known a1 rook magic
        let lookup = lookup_for_rook_a1(0x0080_0010_2040_0080);
        assert_eq!(lookup.index_bits(PieceType::Rook), 12);
        assert_eq!(lookup.index_bits(PieceType::Bishop), 9);

        let a4 = sq_to_bb(rc_to_sq(3, 0));
        // h1 and a8 are outside the mask, b2 is not on a rook ray
        let noise = sq_to_bb(7) | sq_to_bb(56) | sq_to_bb(9);
        let expected = piece_attacks(PieceType::Rook, 0, a4);
        assert_eq!(lookup.rook_attacks(0, a4 | noise), Some(expected));
        assert_eq!(lookup.rook_attacks(0, u64::MAX), Some(sq_to_bb(1) | sq_to_bb(8)));
    }

    #[test]
    fn test_rejects_wrong_square_count() {
        let magics = MagicArtifact { bishop: vec![0; 63], rook: vec![0; 64] };
        let attacks = AttackArtifact {
            bishop: vec![vec![None; 512]; 64],
            rook: vec![vec![None; 4096]; 64],
        };
        let masks = BlockerArtifact { bishop: vec![0; 64], rook: vec![0; 64] };
        let err = SliderLookup::new(magics, attacks, masks).unwrap_err();
        assert!(matches!(err, GenError::ArtifactShape { artifact: "magic", .. }));
    }

    #[test]
    fn test_rejects_ragged_tables() {
        let mut attacks = AttackArtifact {
            bishop: vec![vec![None; 512]; 64],
            rook: vec![vec![None; 4096]; 64],
        };
        attacks.rook[5] = vec![None; 2048];
        let magics = MagicArtifact { bishop: vec![0; 64], rook: vec![0; 64] };
        let masks = BlockerArtifact { bishop: vec![0; 64], rook: vec![0; 64] };
        let err = SliderLookup::new(magics, attacks, masks).unwrap_err();
        assert!(matches!(err, GenError::ArtifactShape { artifact: "attack", .. }));
    }

    #[test]
    fn test_verify_reports_unbuilt_squares() {
        let lookup = lookup_for_rook_a1(0x0080_0010_2040_0080);
        // Bishops were never filled in, so the very first bishop lookup misses
        match lookup.verify() {
            Err(GenError::TableMismatch { piece, square, found, .. }) => {
                assert_eq!((piece, square, found), (PieceType::Bishop, 0, None));
            }
            other => panic!("expected a mismatch, got {other:?}"),
        }
    }
}
