//! Air-defense zones and Air Force transit resolution.
//!
//! Anti-Air, Missile and Navy units project a disc of influence
//! (`dx² + dy² <= r²`) around their square. An Air Force flying through enemy
//! discs is classified per path:
//!
//! - no disc entered: safe
//! - exactly one defender's disc, entered once: kamikaze (may only strike and
//!   die with its target)
//! - two distinct defenders, or leaving a disc and entering again: destroyed

use crate::board::Board;
use crate::piece::{Color, Piece, Role};
use crate::square::{Square, SLOTS};

/// Radius never grows past this, heroic or not.
pub const MAX_RADIUS: u8 = 3;

/// Base defense radius of a lone unit; 0 for roles without anti-air.
pub fn base_radius(role: Role) -> u8 {
    match role {
        Role::AntiAir => 1,
        Role::Missile => 2,
        Role::Navy => 1,
        _ => 0,
    }
}

/// Effective radius of a unit, heroic bonus included.
pub fn radius(unit: &Piece) -> u8 {
    let base = base_radius(unit.role);
    if base == 0 {
        return 0;
    }
    (base + unit.heroic as u8).min(MAX_RADIUS)
}

/// Largest radius any unit of a stack projects.
pub fn stack_radius(piece: &Piece) -> u8 {
    piece.flatten().iter().map(radius).max().unwrap_or(0)
}

/// Squares covered by a defender of `radius` standing on `center`.
pub fn zone(center: Square, radius: u8) -> Vec<Square> {
    let r = radius as i32;
    let mut squares = Vec::new();
    for dr in -r..=r {
        for df in -r..=r {
            if df * df + dr * dr > r * r {
                continue;
            }
            if let Some(sq) = Square::try_new(center.file() as i32 + df, center.rank() as i32 + dr) {
                squares.push(sq);
            }
        }
    }
    squares
}

/// Per color, the defenders covering each square.
#[derive(Clone, Debug)]
pub struct AirDefense {
    coverage: [Vec<Vec<Square>>; 2],
}

impl AirDefense {
    /// Build the coverage maps from scratch.
    pub fn compute(board: &Board) -> AirDefense {
        let mut coverage = [vec![Vec::new(); SLOTS], vec![Vec::new(); SLOTS]];
        for color in Color::both() {
            let map = &mut coverage[color.index()];
            for (sq, piece) in board.pieces(color) {
                let r = stack_radius(piece);
                if r == 0 {
                    continue;
                }
                for covered in zone(sq, r) {
                    map[covered.0 as usize].push(sq);
                }
            }
        }
        AirDefense { coverage }
    }

    /// Defenders of `color` whose zone covers `sq`.
    #[inline]
    pub fn defenders(&self, color: Color, sq: Square) -> &[Square] {
        &self.coverage[color.index()][sq.0 as usize]
    }

    #[inline]
    pub fn is_covered(&self, color: Color, sq: Square) -> bool {
        !self.defenders(color, sq).is_empty()
    }

    /// Start tracking a flight by an Air Force of `attacker`'s color.
    pub fn transit(&self, attacker: Color) -> Transit<'_> {
        Transit {
            defense: self,
            enemy: attacker.opponent(),
            seen: Vec::new(),
            inside: false,
            left: false,
            destroyed: false,
        }
    }

    /// Classify a whole path (origin excluded).
    pub fn classify(&self, attacker: Color, path: &[Square]) -> TransitOutcome {
        let mut transit = self.transit(attacker);
        let mut outcome = TransitOutcome::Safe;
        for &sq in path {
            outcome = transit.step(sq);
        }
        outcome
    }
}

/// Result of flying through a sequence of squares.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransitOutcome {
    Safe,
    Kamikaze,
    Destroyed,
}

/// Incremental flight tracker, fed one square at a time.
#[derive(Clone, Debug)]
pub struct Transit<'a> {
    defense: &'a AirDefense,
    enemy: Color,
    seen: Vec<Square>,
    inside: bool,
    left: bool,
    destroyed: bool,
}

impl Transit<'_> {
    /// Fly over `sq` and report the outcome of the path so far.
    pub fn step(&mut self, sq: Square) -> TransitOutcome {
        if self.destroyed {
            return TransitOutcome::Destroyed;
        }
        let defenders = self.defense.defenders(self.enemy, sq);
        if defenders.is_empty() {
            if self.inside {
                self.inside = false;
                self.left = true;
            }
        } else {
            if self.left {
                self.destroyed = true;
            }
            self.inside = true;
            for d in defenders {
                if !self.seen.contains(d) {
                    self.seen.push(*d);
                }
            }
            if self.seen.len() > 1 {
                self.destroyed = true;
            }
        }
        self.outcome()
    }

    pub fn outcome(&self) -> TransitOutcome {
        if self.destroyed {
            TransitOutcome::Destroyed
        } else if self.seen.is_empty() {
            TransitOutcome::Safe
        } else {
            TransitOutcome::Kamikaze
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn path(squares: &[&str]) -> Vec<Square> {
        squares.iter().map(|s| sq(s)).collect()
    }

    #[test]
    fn test_radius_rules() {
        assert_eq!(radius(&Piece::new(Color::Red, Role::AntiAir)), 1);
        assert_eq!(radius(&Piece::new(Color::Red, Role::AntiAir).heroic()), 2);
        assert_eq!(radius(&Piece::new(Color::Red, Role::Missile).heroic()), 3);
        assert_eq!(radius(&Piece::new(Color::Red, Role::Tank).heroic()), 0);
        let mut engineer = Piece::new(Color::Red, Role::Engineer);
        engineer.carrying.push(Piece::new(Color::Red, Role::Missile));
        assert_eq!(stack_radius(&engineer), 2);
    }

    #[test]
    fn test_zone_is_disc() {
        // Radius 1 is a plus sign, radius 2 a 13-square disc.
        assert_eq!(zone(sq("f6"), 1).len(), 5);
        assert_eq!(zone(sq("f6"), 2).len(), 13);
        assert!(!zone(sq("f6"), 1).contains(&sq("g7")));
        assert!(zone(sq("f6"), 2).contains(&sq("g7")));
        // Clipped in the corner.
        assert_eq!(zone(sq("a1"), 1).len(), 3);
    }

    #[test]
    fn test_compute_per_color() {
        let mut board = Board::new();
        board.put(sq("f8"), Piece::new(Color::Blue, Role::AntiAir));
        let ad = AirDefense::compute(&board);
        assert!(ad.is_covered(Color::Blue, sq("f9")));
        assert!(!ad.is_covered(Color::Blue, sq("g9")));
        assert!(!ad.is_covered(Color::Red, sq("f9")));
        assert_eq!(ad.defenders(Color::Blue, sq("f8")), &[sq("f8")]);
    }

    #[test]
    fn test_single_disc_is_kamikaze() {
        let mut board = Board::new();
        board.put(sq("f8"), Piece::new(Color::Blue, Role::AntiAir));
        let ad = AirDefense::compute(&board);
        assert_eq!(ad.classify(Color::Red, &path(&["d6", "d7"])), TransitOutcome::Safe);
        assert_eq!(
            ad.classify(Color::Red, &path(&["f5", "f6", "f7"])),
            TransitOutcome::Kamikaze
        );
        // Enter, leave, stay outside.
        assert_eq!(
            ad.classify(Color::Red, &path(&["e8", "f9", "g10"])),
            TransitOutcome::Kamikaze
        );
    }

    #[test]
    fn test_two_discs_destroy_even_when_disjoint() {
        let mut board = Board::new();
        board.put(sq("d8"), Piece::new(Color::Blue, Role::AntiAir));
        board.put(sq("h8"), Piece::new(Color::Blue, Role::AntiAir));
        let ad = AirDefense::compute(&board);
        assert_eq!(
            ad.classify(Color::Red, &path(&["d8", "e8", "f8", "g8", "h8"])),
            TransitOutcome::Destroyed
        );
    }

    #[test]
    fn test_reentry_destroys() {
        let mut board = Board::new();
        // Radius-1 disc around f6: in, out, and back in.
        board.put(sq("f6"), Piece::new(Color::Blue, Role::Navy));
        let ad = AirDefense::compute(&board);
        assert!(ad.is_covered(Color::Blue, sq("f7")));
        assert!(!ad.is_covered(Color::Blue, sq("f8")));
        let mut transit = ad.transit(Color::Red);
        assert_eq!(transit.step(sq("f7")), TransitOutcome::Kamikaze);
        assert_eq!(transit.step(sq("f8")), TransitOutcome::Kamikaze);
        assert_eq!(transit.step(sq("f7")), TransitOutcome::Destroyed);
        assert_eq!(transit.step(sq("f12")), TransitOutcome::Destroyed);
    }
}
