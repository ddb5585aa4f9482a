//! Magic hashing and the randomized search for collision-free multipliers.
//!
//! A magic maps every occupancy of a blocker mask to a distinct slot of a
//! `2^bits` table via `(occupancy * magic) >> (64 - bits)`. The multiplication
//! wraps at 2^64 on purpose: the useful bits are the ones that overflow into the
//! top of the product.

use rand::Rng;
use tracing::{trace, warn};

use crate::error::GenError;
use crate::types::{Bitboard, PieceType, Square};

/// Attempt budget per (square, piece type) used when nothing else is configured
pub const DEFAULT_ATTEMPT_BUDGET: u64 = 10_000_000;

/// Table slot for an occupancy
#[inline(always)]
pub const fn magic_index(magic: u64, occupancy: Bitboard, bits: u8) -> usize {
    (occupancy.wrapping_mul(magic) >> (64 - bits as u32)) as usize
}

/// 64 random bits assembled from four 16-bit draws
#[inline]
fn random_u64<R: Rng>(rng: &mut R) -> u64 {
    (0..4).fold(0u64, |acc, i| acc | (u64::from(rng.gen::<u16>()) << (16 * i)))
}

/// Candidate multiplier with few set bits: the AND of four independent 64-bit draws.
/// Sparse multipliers collide far less for this hash family.
#[inline]
pub fn sparse_candidate<R: Rng>(rng: &mut R) -> u64 {
    random_u64(rng) & random_u64(rng) & random_u64(rng) & random_u64(rng)
}

/// Terminal states of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// First collision-free candidate, and the attempt on which it was drawn (1-based)
    Found { magic: u64, attempts: u64 },
    Exhausted { attempts: u64 },
}

/// Search state for one (square, piece type): the occupancies to place and the
/// table width they must fit into.
pub struct MagicSearch<'a> {
    pub piece: PieceType,
    pub square: Square,
    pub bits: u8,
    occupancies: &'a [Bitboard],
    // epoch[slot] == generation means the slot is used by the current candidate
    epoch: Vec<u64>,
    generation: u64,
}

impl<'a> MagicSearch<'a> {
    pub fn new(piece: PieceType, square: Square, bits: u8, occupancies: &'a [Bitboard]) -> Self {
        assert!((1..=32).contains(&bits), "index width {bits} out of range");
        MagicSearch {
            piece,
            square,
            bits,
            occupancies,
            epoch: vec![0; 1usize << bits],
            generation: 0,
        }
    }

    /// Place every occupancy for `magic`, abandoning it on the first shared slot.
    fn try_candidate(&mut self, magic: u64) -> bool {
        // A fresh generation marks every slot unused without clearing the table
        self.generation += 1;
        for (i, &occ) in self.occupancies.iter().enumerate() {
            let slot = magic_index(magic, occ, self.bits);
            if self.epoch[slot] == self.generation {
                trace!(generation = self.generation, placed = i, "collision");
                return false;
            }
            self.epoch[slot] = self.generation;
        }
        true
    }

    /// Draw candidates until one is collision-free or `budget` attempts are spent.
    pub fn run<R: Rng>(&mut self, rng: &mut R, budget: u64) -> SearchOutcome {
        // More occupancies than slots can never hash injectively, but every
        // candidate is still drawn so exhaustion costs the same fixed budget.
        for attempt in 1..=budget {
            let magic = sparse_candidate(rng);
            if self.try_candidate(magic) {
                return SearchOutcome::Found { magic, attempts: attempt };
            }
        }
        SearchOutcome::Exhausted { attempts: budget }
    }

    /// Like `run`, but exhaustion becomes the fatal error for this unit.
    pub fn find<R: Rng>(&mut self, rng: &mut R, budget: u64) -> Result<(u64, u64), GenError> {
        match self.run(rng, budget) {
            SearchOutcome::Found { magic, attempts } => Ok((magic, attempts)),
            SearchOutcome::Exhausted { attempts } => {
                warn!(piece = %self.piece, square = self.square, attempts, bits = self.bits, "magic search exhausted");
                Err(GenError::SearchExhausted {
                    piece: self.piece,
                    square: self.square,
                    attempts,
                })
            }
        }
    }
}

/// True when no two occupancies share a slot under `magic`.
/// Independent of the search so accepted magics can be rechecked from scratch.
pub fn is_injective(magic: u64, occupancies: &[Bitboard], bits: u8) -> bool {
    let mut used = vec![false; 1usize << bits];
    occupancies.iter().all(|&occ| {
        let slot = magic_index(magic, occ, bits);
        !std::mem::replace(&mut used[slot], true)
    })
}
