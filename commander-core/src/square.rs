//! Square encoding for the 11 × 12 board.
//!
//! # Encoding
//!
//! ```text
//! square = rank * 16 + file
//!
//!   file: 0..11  (a..k)
//!   rank: 0..12  (internal rank 0 is the top row, displayed as rank 12)
//!
//!   a12 = 0x00   k12 = 0x0a
//!   a1  = 0xb0   k1  = 0xba
//! ```
//!
//! The 16-wide rows leave 5 unused slots per rank, so an offset that leaves the
//! board on the file axis lands on a slot with `file >= 11` and is rejected by a
//! single bounds check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FenError;

/// Number of files (a..k).
pub const FILES: u8 = 11;
/// Number of ranks (1..12).
pub const RANKS: u8 = 12;
/// Size of the mailbox address space.
pub const SLOTS: usize = 256;

/// A board square, `rank * 16 + file`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(pub u8);

impl Square {
    /// Create a square from file (0-10) and internal rank (0-11).
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Square {
        debug_assert!(file < FILES && rank < RANKS);
        Square(rank * 16 + file)
    }

    /// Checked constructor.
    #[inline]
    pub fn try_new(file: i32, rank: i32) -> Option<Square> {
        if (0..FILES as i32).contains(&file) && (0..RANKS as i32).contains(&rank) {
            Some(Square::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// File index (0 = a).
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 0x0f
    }

    /// Internal rank index (0 = top row).
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 4
    }

    /// Rank as printed in algebraic notation (1..12).
    #[inline]
    pub const fn display_rank(self) -> u8 {
        RANKS - self.rank()
    }

    /// Check that the encoding addresses one of the 132 playable squares.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.file() < FILES && self.rank() < RANKS
    }

    /// Step by a file/rank delta, staying on the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Square::try_new(self.file() as i32 + df as i32, self.rank() as i32 + dr as i32)
    }

    /// Iterate over all 132 squares, top row first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..RANKS).flat_map(|rank| (0..FILES).map(move |file| Square::new(file, rank)))
    }

    /// Absolute file and rank distances.
    #[inline]
    pub fn deltas(self, other: Square) -> (u8, u8) {
        (
            self.file().abs_diff(other.file()),
            self.rank().abs_diff(other.rank()),
        )
    }

    /// King-move distance.
    #[inline]
    pub fn chebyshev(self, other: Square) -> u8 {
        let (df, dr) = self.deltas(other);
        df.max(dr)
    }

    /// Taxicab distance.
    #[inline]
    pub fn manhattan(self, other: Square) -> u8 {
        let (df, dr) = self.deltas(other);
        df + dr
    }

    #[inline]
    pub fn same_file(self, other: Square) -> bool {
        self.file() == other.file()
    }

    #[inline]
    pub fn same_rank(self, other: Square) -> bool {
        self.rank() == other.rank()
    }

    #[inline]
    pub fn same_diagonal(self, other: Square) -> bool {
        let (df, dr) = self.deltas(other);
        df == dr && df != 0
    }

    /// Unit direction from `self` towards `other` if they share a line
    /// (file, rank or diagonal), with the distance along it.
    pub fn direction_to(self, other: Square) -> Option<((i8, i8), u8)> {
        if self == other {
            return None;
        }
        let (df, dr) = self.deltas(other);
        if df != 0 && dr != 0 && df != dr {
            return None;
        }
        let sf = (other.file() as i8 - self.file() as i8).signum();
        let sr = (other.rank() as i8 - self.rank() as i8).signum();
        Some(((sf, sr), df.max(dr)))
    }

    /// Parse algebraic notation such as `c5` or `k12`.
    pub fn parse(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file_char = chars.next()?;
        if !('a'..='k').contains(&file_char) {
            return None;
        }
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let display_rank: u8 = digits.parse().ok()?;
        if !(1..=RANKS).contains(&display_rank) {
            return None;
        }
        Some(Square::new(file_char as u8 - b'a', RANKS - display_rank))
    }

    /// File letter (`a`..`k`).
    #[inline]
    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.display_rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Square {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::parse(s).ok_or_else(|| FenError::InvalidSquare(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = FenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_string()
    }
}

/// Orthogonal unit steps (file delta, rank delta).
pub const ORTHOGONAL: [(i8, i8); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];
/// Diagonal unit steps.
pub const DIAGONAL: [(i8, i8); 4] = [(1, -1), (-1, -1), (1, 1), (-1, 1)];

/// A compact set of squares over the 256-slot address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SquareSet([u64; 4]);

impl SquareSet {
    #[inline]
    pub const fn new() -> SquareSet {
        SquareSet([0; 4])
    }

    #[inline]
    pub fn insert(&mut self, sq: Square) {
        self.0[(sq.0 >> 6) as usize] |= 1 << (sq.0 & 63);
    }

    #[inline]
    pub fn remove(&mut self, sq: Square) {
        self.0[(sq.0 >> 6) as usize] &= !(1 << (sq.0 & 63));
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        (self.0[(sq.0 >> 6) as usize] >> (sq.0 & 63)) & 1 == 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Iterate in ascending square order.
    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        self.0.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros();
                bits &= bits - 1;
                Some(Square((word_idx as u32 * 64 + bit) as u8))
            })
        })
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = SquareSet::new();
        for sq in iter {
            set.insert(sq);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_encoding() {
        assert_eq!(Square::parse("a12"), Some(Square(0x00)));
        assert_eq!(Square::parse("k12"), Some(Square(0x0a)));
        assert_eq!(Square::parse("a1"), Some(Square(0xb0)));
        assert_eq!(Square::parse("k1"), Some(Square(0xba)));
    }

    #[test]
    fn test_algebraic_roundtrip() {
        for sq in Square::all() {
            assert!(sq.is_valid());
            assert_eq!(Square::parse(&sq.to_string()), Some(sq));
        }
        assert_eq!(Square::all().count(), 132);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "a", "l5", "a0", "a13", "a012", "5a", "A5", "a1x"] {
            assert_eq!(Square::parse(bad), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_offset_stays_on_board() {
        let a12 = Square::parse("a12").unwrap();
        assert_eq!(a12.offset(-1, 0), None);
        assert_eq!(a12.offset(0, -1), None);
        assert_eq!(a12.offset(1, 1), Square::parse("b11"));
        let k1 = Square::parse("k1").unwrap();
        assert_eq!(k1.offset(1, 0), None);
        assert_eq!(k1.offset(0, 1), None);
    }

    #[test]
    fn test_distances_and_lines() {
        let c3 = Square::parse("c3").unwrap();
        let f7 = Square::parse("f7").unwrap();
        assert_eq!(c3.chebyshev(f7), 4);
        assert_eq!(c3.manhattan(f7), 7);
        assert!(!c3.same_diagonal(f7));
        assert!(c3.same_diagonal(Square::parse("f6").unwrap()));
        assert!(c3.same_file(Square::parse("c11").unwrap()));
        assert!(c3.same_rank(Square::parse("k3").unwrap()));
    }

    #[test]
    fn test_direction_to() {
        let e5 = Square::parse("e5").unwrap();
        let e9 = Square::parse("e9").unwrap();
        // Higher display rank is a lower internal rank.
        assert_eq!(e5.direction_to(e9), Some(((0, -1), 4)));
        assert_eq!(e5.direction_to(Square::parse("g3").unwrap()), Some(((1, 1), 2)));
        assert_eq!(e5.direction_to(Square::parse("f7").unwrap()), None);
        assert_eq!(e5.direction_to(e5), None);
    }

    #[test]
    fn test_square_set() {
        let mut set = SquareSet::new();
        assert!(set.is_empty());
        let squares = ["a12", "k1", "f6", "c3"].map(|s| Square::parse(s).unwrap());
        for sq in squares {
            set.insert(sq);
        }
        assert_eq!(set.len(), 4);
        assert!(set.contains(squares[2]));
        set.remove(squares[2]);
        assert!(!set.contains(squares[2]));
        let collected: Vec<Square> = set.iter().collect();
        let mut expected = vec![squares[0], squares[1], squares[3]];
        expected.sort();
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_serde_as_string() {
        let sq = Square::parse("h10").unwrap();
        let json = serde_json::to_string(&sq).unwrap();
        assert_eq!(json, "\"h10\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sq);
        assert!(serde_json::from_str::<Square>("\"z9\"").is_err());
    }
}
