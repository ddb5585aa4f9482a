use std::path::{Path, PathBuf};

use crate::error::GenError;
use crate::magic::DEFAULT_ATTEMPT_BUDGET;
use crate::types::PieceType;

/// Where the generated artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub magics: PathBuf,
    pub attacks: PathBuf,
    pub blockers: PathBuf,
    /// Optional run record (seed, budget, attempts per square)
    pub manifest: Option<PathBuf>,
}

impl OutputPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        OutputPaths {
            magics: dir.join("magics.json"),
            attacks: dir.join("attacks.json"),
            blockers: dir.join("blockers.json"),
            manifest: Some(dir.join("manifest.json")),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        OutputPaths::in_dir(".")
    }
}

/// Generation parameters.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Candidates drawn per (square, piece type) before giving up.
    pub attempt_budget: u64,
    /// RNG seed; a random one is drawn and logged when absent.
    pub seed: Option<u64>,
    /// Index width for bishops, 9 for the engine's 512-slot tables.
    pub bishop_bits: u8,
    /// Index width for rooks, 12 for the engine's 4096-slot tables.
    pub rook_bits: u8,
    /// Worker threads, rayon's default when absent.
    pub threads: Option<usize>,
    pub output: OutputPaths,
}

impl GeneratorConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = GeneratorConfig::default();
        GeneratorConfig {
            attempt_budget: std::env::var("MAGIC_ATTEMPT_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.attempt_budget),
            seed: std::env::var("MAGIC_SEED").ok().and_then(|v| parse_seed(&v)),
            threads: std::env::var("MAGIC_THREADS").ok().and_then(|v| v.parse().ok()),
            output: std::env::var("MAGIC_OUT_DIR")
                .map(OutputPaths::in_dir)
                .unwrap_or_default(),
            ..defaults
        }
    }

    pub fn index_bits(&self, piece: PieceType) -> u8 {
        match piece {
            PieceType::Bishop => self.bishop_bits,
            PieceType::Rook => self.rook_bits,
        }
    }

    /// Table slots per square for a piece type
    pub fn table_size(&self, piece: PieceType) -> usize {
        1usize << self.index_bits(piece)
    }

    pub fn validate(&self) -> Result<(), GenError> {
        if self.attempt_budget == 0 {
            return Err(GenError::InvalidConfig("attempt budget must be at least 1".to_string()));
        }
        for piece in PieceType::ALL {
            let bits = self.index_bits(piece);
            if !(1..=16).contains(&bits) {
                return Err(GenError::InvalidConfig(format!(
                    "{piece} index width {bits} is outside 1..=16"
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(GenError::InvalidConfig("thread count must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
            seed: None,
            bishop_bits: PieceType::Bishop.default_index_bits(),
            rook_bits: PieceType::Rook.default_index_bits(),
            threads: None,
            output: OutputPaths::default(),
        }
    }
}

/// Accepts decimal or `0x`-prefixed hexadecimal seeds
pub fn parse_seed(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => s.replace('_', "").parse().ok(),
    }
}
