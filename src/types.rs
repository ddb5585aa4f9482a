use serde::{Deserialize, Serialize};

/// Square index 0-63, row-major: a1 = 0, b1 = 1, ..., h8 = 63.
/// row = sq / 8, column = sq % 8.
pub type Square = u8;

/// One bit per square, bit i set means square i is in the set.
pub type Bitboard = u64;

/// A (row delta, column delta) unit step.
pub type Direction = (i8, i8);

pub const NUM_SQUARES: usize = 64;

pub const BISHOP_DIRECTIONS: [Direction; 4] = [(-1, 1), (1, 1), (1, -1), (-1, -1)];
pub const ROOK_DIRECTIONS: [Direction; 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// The sliding pieces that get a magic table. Queens are served by combining both.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Bishop,
    Rook,
}

impl PieceType {
    pub const ALL: [PieceType; 2] = [PieceType::Bishop, PieceType::Rook];

    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            _ => None,
        }
    }

    /// Position of this piece type in `[2][64]` shaped tables
    #[inline(always)]
    pub const fn index(self) -> usize {
        match self {
            PieceType::Bishop => 0,
            PieceType::Rook => 1,
        }
    }

    pub const fn directions(self) -> &'static [Direction; 4] {
        match self {
            PieceType::Bishop => &BISHOP_DIRECTIONS,
            PieceType::Rook => &ROOK_DIRECTIONS,
        }
    }

    /// Index width the consuming engine is built for: 2^9 bishop slots, 2^12 rook slots.
    pub const fn default_index_bits(self) -> u8 {
        match self {
            PieceType::Bishop => 9,
            PieceType::Rook => 12,
        }
    }

    /// Name used as the key in every artifact
    pub fn to_human(&self) -> &'static str {
        match self {
            Self::Bishop => "bishop",
            Self::Rook => "rook",
        }
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_human())
    }
}

impl std::str::FromStr for PieceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bishop" | "b" => Ok(PieceType::Bishop),
            "rook" | "r" => Ok(PieceType::Rook),
            other => Err(format!("Unrecognized slider `{other}`, expected bishop or rook.")),
        }
    }
}

/// Per piece type pair, serialized as `{"bishop": ..., "rook": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerPiece<T> {
    pub bishop: T,
    pub rook: T,
}

impl<T> PerPiece<T> {
    pub fn new(mut f: impl FnMut(PieceType) -> T) -> Self {
        PerPiece {
            bishop: f(PieceType::Bishop),
            rook: f(PieceType::Rook),
        }
    }

    pub fn get(&self, piece: PieceType) -> &T {
        match piece {
            PieceType::Bishop => &self.bishop,
            PieceType::Rook => &self.rook,
        }
    }

    pub fn get_mut(&mut self, piece: PieceType) -> &mut T {
        match piece {
            PieceType::Bishop => &mut self.bishop,
            PieceType::Rook => &mut self.rook,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(PieceType, &T) -> U) -> PerPiece<U> {
        PerPiece {
            bishop: f(PieceType::Bishop, &self.bishop),
            rook: f(PieceType::Rook, &self.rook),
        }
    }
}
