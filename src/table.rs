//! Drives mask building, enumeration, attack calculation and the magic search for
//! all 64 squares of both sliders, and assembles the resulting tables.
//!
//! Every (piece, square) unit is independent: it builds its own mask, its own
//! seeded RNG and its own slice of the attack table, so the units run on a rayon
//! pool with no shared state and are stitched together after the join.

use std::time::Instant;

use itertools::iproduct;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::attacks::attacks_for;
use crate::blockers::BlockerMask;
use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::magic::{is_injective, magic_index, MagicSearch};
use crate::types::{Bitboard, PerPiece, PieceType, Square, NUM_SQUARES};

/// Output of one (piece, square) unit
#[derive(Debug, Clone)]
pub struct UnitTable {
    pub piece: PieceType,
    pub square: Square,
    pub mask: Bitboard,
    pub magic: u64,
    pub attempts: u64,
    /// `2^bits` slots; `None` where no occupancy hashes
    pub attacks: Vec<Option<Bitboard>>,
}

/// The complete generated data set, every vector in square order.
#[derive(Debug, Clone)]
pub struct MagicTables {
    pub seed: u64,
    pub attempt_budget: u64,
    pub bits: PerPiece<u8>,
    pub masks: PerPiece<Vec<Bitboard>>,
    pub magics: PerPiece<Vec<u64>>,
    pub attempts: PerPiece<Vec<u64>>,
    pub attacks: PerPiece<Vec<Vec<Option<Bitboard>>>>,
}

impl MagicTables {
    pub fn total_attempts(&self) -> u64 {
        self.attempts.bishop.iter().chain(self.attempts.rook.iter()).sum()
    }
}

/// Seed for one unit's RNG, a pure function of the run seed so results do not
/// depend on which thread picks up which unit.
pub fn unit_seed(seed: u64, piece: PieceType, square: Square) -> u64 {
    let unit = ((piece.index() as u64) << 8) | square as u64;
    seed ^ unit.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Find a magic for one square and fill its slice of the attack table.
pub fn build_unit(
    piece: PieceType,
    square: Square,
    bits: u8,
    attempt_budget: u64,
    seed: u64,
) -> Result<UnitTable, GenError> {
    let mask = BlockerMask::new(piece, square);
    let occupancies: Vec<Bitboard> = mask.occupancies().collect();
    let attack_sets: Vec<Bitboard> = occupancies
        .iter()
        .map(|&occ| attacks_for(square, occ, piece.directions()))
        .collect();

    let mut rng = StdRng::seed_from_u64(unit_seed(seed, piece, square));
    let (magic, attempts) =
        MagicSearch::new(piece, square, bits, &occupancies).find(&mut rng, attempt_budget)?;
    debug_assert!(is_injective(magic, &occupancies, bits));

    let mut attacks = vec![None; 1usize << bits];
    for (&occ, &attack) in occupancies.iter().zip(attack_sets.iter()) {
        attacks[magic_index(magic, occ, bits)] = Some(attack);
    }

    debug!(piece = %piece, square, magic = %format!("{magic:#018x}"), attempts, "magic found");
    Ok(UnitTable {
        piece,
        square,
        mask: mask.bits,
        magic,
        attempts,
        attacks,
    })
}

/// Build the full table set. Fails as a whole if any unit exhausts its budget.
pub fn build_tables(config: &GeneratorConfig) -> Result<MagicTables, GenError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let bits = PerPiece::new(|piece| config.index_bits(piece));
    info!(
        seed,
        attempt_budget = config.attempt_budget,
        bishop_bits = bits.bishop,
        rook_bits = bits.rook,
        "generating magic tables"
    );

    let units: Vec<(PieceType, Square)> =
        iproduct!(PieceType::ALL, 0..NUM_SQUARES as Square).collect();
    let start = Instant::now();
    let run = || {
        units
            .par_iter()
            .map(|&(piece, square)| {
                build_unit(piece, square, *bits.get(piece), config.attempt_budget, seed)
            })
            .collect::<Result<Vec<_>, _>>()
    };
    let results = match config.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| GenError::InvalidConfig(format!("cannot start {n} workers: {e}")))?
            .install(run),
        None => run(),
    }?;

    let mut tables = MagicTables {
        seed,
        attempt_budget: config.attempt_budget,
        bits: bits.clone(),
        masks: PerPiece::new(|_| vec![0; NUM_SQUARES]),
        magics: PerPiece::new(|_| vec![0; NUM_SQUARES]),
        attempts: PerPiece::new(|_| vec![0; NUM_SQUARES]),
        attacks: PerPiece::new(|_| vec![Vec::new(); NUM_SQUARES]),
    };
    for unit in results {
        let sq = unit.square as usize;
        tables.masks.get_mut(unit.piece)[sq] = unit.mask;
        tables.magics.get_mut(unit.piece)[sq] = unit.magic;
        tables.attempts.get_mut(unit.piece)[sq] = unit.attempts;
        tables.attacks.get_mut(unit.piece)[sq] = unit.attacks;
    }

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        total_attempts = tables.total_attempts(),
        "all 128 magics found"
    );
    Ok(tables)
}
