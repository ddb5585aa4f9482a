pub mod types;
pub mod bitboard;
pub mod blockers;
pub mod attacks;
pub mod magic;
pub mod error;
pub mod config;
pub mod table;
pub mod emit;
pub mod lookup;
