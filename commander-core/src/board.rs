//! Mailbox board with per-color occupancy sets.

use std::fmt;

use crate::piece::{Color, Piece, Role};
use crate::square::{Square, SquareSet, FILES, RANKS, SLOTS};

/// Mailbox of 256 slots indexed by [`Square`], plus one occupied-square set per
/// color. Every mutation goes through `put`/`remove` so the sets stay in sync.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: Vec<Option<Piece>>,
    occupied: [SquareSet; 2],
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Board {
        Board {
            squares: vec![None; SLOTS],
            occupied: [SquareSet::new(); 2],
        }
    }

    /// Piece or stack on a square.
    #[inline]
    pub fn get(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.0 as usize].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.0 as usize].is_none()
    }

    /// Place a piece, returning whatever was there before.
    pub fn put(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        debug_assert!(sq.is_valid());
        let previous = self.remove(sq);
        self.occupied[piece.color.index()].insert(sq);
        self.squares[sq.0 as usize] = Some(piece);
        previous
    }

    /// Clear a square, returning its piece.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let previous = self.squares[sq.0 as usize].take();
        if let Some(p) = &previous {
            self.occupied[p.color.index()].remove(sq);
        }
        previous
    }

    /// Write an optional value: `Some` puts, `None` clears.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) -> Option<Piece> {
        match piece {
            Some(p) => self.put(sq, p),
            None => self.remove(sq),
        }
    }

    /// Squares occupied by `color`.
    #[inline]
    pub fn occupied(&self, color: Color) -> &SquareSet {
        &self.occupied[color.index()]
    }

    /// Iterate over the pieces of one color.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        self.occupied[color.index()]
            .iter()
            .filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Square of the piece or stack holding `color`'s commander.
    pub fn commander_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.contains(Role::Commander))
            .map(|(sq, _)| sq)
    }

    /// Remove every piece.
    pub fn clear(&mut self) {
        *self = Board::new();
    }

    /// Human-readable diagram, top row first.
    pub fn ascii(&self) -> String {
        let mut out = String::new();
        out.push_str("     +");
        out.push_str(&"-".repeat(FILES as usize * 4));
        out.push_str("+\n");
        for rank in 0..RANKS {
            out.push_str(&format!(" {:>3} |", RANKS - rank));
            for file in 0..FILES {
                let cell = match self.get(Square::new(file, rank)) {
                    Some(p) => p.to_string(),
                    None => ".".to_string(),
                };
                // Stacks wider than a column push the rest of the row right.
                out.push_str(&format!("{:^4}", cell));
            }
            out.push_str("|\n");
        }
        out.push_str("     +");
        out.push_str(&"-".repeat(FILES as usize * 4));
        out.push_str("+\n       ");
        for file in 0..FILES {
            out.push_str(&format!("{:<4}", (b'a' + file) as char));
        }
        out.push('\n');
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn test_put_remove_keeps_index_in_sync() {
        let mut board = Board::new();
        board.put(sq("e5"), Piece::new(Color::Red, Role::Tank));
        board.put(sq("e8"), Piece::new(Color::Blue, Role::Infantry));
        assert!(board.occupied(Color::Red).contains(sq("e5")));
        assert!(board.occupied(Color::Blue).contains(sq("e8")));

        // Overwrite with the other color moves the square between indices.
        let previous = board.put(sq("e5"), Piece::new(Color::Blue, Role::Militia));
        assert_eq!(previous.map(|p| p.role), Some(Role::Tank));
        assert!(!board.occupied(Color::Red).contains(sq("e5")));
        assert!(board.occupied(Color::Blue).contains(sq("e5")));

        board.remove(sq("e5"));
        assert!(board.is_empty(sq("e5")));
        assert!(!board.occupied(Color::Blue).contains(sq("e5")));
        assert_eq!(board.occupied(Color::Blue).len(), 1);
    }

    #[test]
    fn test_index_matches_mailbox() {
        let mut board = Board::new();
        let roles = Role::ALL;
        for (i, s) in Square::all().enumerate().step_by(7) {
            let color = if i % 2 == 0 { Color::Red } else { Color::Blue };
            board.put(s, Piece::new(color, roles[i % roles.len()]));
        }
        for s in Square::all() {
            let red = board.occupied(Color::Red).contains(s);
            let blue = board.occupied(Color::Blue).contains(s);
            match board.get(s) {
                None => assert!(!red && !blue),
                Some(p) => {
                    assert_eq!(red, p.color == Color::Red);
                    assert_eq!(blue, p.color == Color::Blue);
                }
            }
        }
    }

    #[test]
    fn test_commander_inside_stack() {
        let mut board = Board::new();
        let mut hq = Piece::new(Color::Red, Role::Headquarter);
        hq.carrying.push(Piece::new(Color::Red, Role::Commander));
        board.put(sq("g2"), hq);
        assert_eq!(board.commander_square(Color::Red), Some(sq("g2")));
        assert_eq!(board.commander_square(Color::Blue), None);
    }

    #[test]
    fn test_ascii_has_all_ranks() {
        let board = Board::new();
        let text = board.ascii();
        assert!(text.contains(" 12 |"));
        assert!(text.contains("  1 |"));
        assert!(text.trim_end().ends_with('k'));
    }
}
