//! Failures that abort a generation or verification run.
//!
//! None of these are recoverable per square: a table set with one bad square is
//! unusable to the engine, so the whole run stops and nothing is written.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Bitboard, PieceType, Square};

#[derive(Debug, Error)]
pub enum GenError {
    /// No collision-free multiplier within the attempt budget. Rerunning with another
    /// seed may succeed; repeated failures usually mean the index width is too small.
    #[error("no magic found for {piece} on square {square} after {attempts} attempts")]
    SearchExhausted {
        piece: PieceType,
        square: Square,
        attempts: u64,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} artifact is malformed: {detail}")]
    ArtifactShape { artifact: &'static str, detail: String },

    #[error(
        "{piece} on square {square}: occupancy {occupancy:#018x} looks up {found:?}, expected {expected:#018x}"
    )]
    TableMismatch {
        piece: PieceType,
        square: Square,
        occupancy: Bitboard,
        expected: Bitboard,
        found: Option<Bitboard>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
