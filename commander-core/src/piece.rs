//! Colors, roles and the piece/stack value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side identifier. Red moves first and starts at the bottom of the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    /// Get the opponent color.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// Index into per-color arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Blue => 1,
        }
    }

    /// FEN turn letter.
    #[inline]
    pub fn to_char(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Blue => 'b',
        }
    }

    #[inline]
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'r' => Some(Color::Red),
            'b' => Some(Color::Blue),
            _ => None,
        }
    }

    pub fn both() -> [Color; 2] {
        [Color::Red, Color::Blue]
    }
}

/// The eleven piece roles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Commander,
    Infantry,
    Tank,
    Militia,
    Engineer,
    Artillery,
    AntiAir,
    Missile,
    AirForce,
    Navy,
    Headquarter,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Commander,
        Role::Infantry,
        Role::Tank,
        Role::Militia,
        Role::Engineer,
        Role::Artillery,
        Role::AntiAir,
        Role::Missile,
        Role::AirForce,
        Role::Navy,
        Role::Headquarter,
    ];

    /// Lowercase notation letter.
    pub fn letter(self) -> char {
        match self {
            Role::Commander => 'c',
            Role::Infantry => 'i',
            Role::Tank => 't',
            Role::Militia => 'm',
            Role::Engineer => 'e',
            Role::Artillery => 'a',
            Role::AntiAir => 'g',
            Role::Missile => 's',
            Role::AirForce => 'f',
            Role::Navy => 'n',
            Role::Headquarter => 'h',
        }
    }

    /// Parse a notation letter in either case.
    pub fn from_letter(c: char) -> Option<Role> {
        let lower = c.to_ascii_lowercase();
        Role::ALL.into_iter().find(|r| r.letter() == lower)
    }

    /// Artillery, Anti-Air and Missile are bound by the river.
    #[inline]
    pub fn is_heavy(self) -> bool {
        matches!(self, Role::Artillery | Role::AntiAir | Role::Missile)
    }

    /// Roles a Tank, Air Force or Navy may carry as a passenger.
    #[inline]
    pub fn is_humanlike(self) -> bool {
        matches!(self, Role::Commander | Role::Infantry | Role::Militia)
    }
}

/// A piece, or a stack when `carrying` is non-empty.
///
/// The piece itself is the carrier; carried pieces never carry anything.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub heroic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub carrying: Vec<Piece>,
}

impl Piece {
    /// A lone, non-heroic piece.
    pub fn new(color: Color, role: Role) -> Piece {
        Piece {
            color,
            role,
            heroic: false,
            carrying: Vec::new(),
        }
    }

    pub fn heroic(mut self) -> Piece {
        self.heroic = true;
        self
    }

    #[inline]
    pub fn is_stack(&self) -> bool {
        !self.carrying.is_empty()
    }

    /// Number of units in the stack (1 for a lone piece).
    #[inline]
    pub fn size(&self) -> usize {
        1 + self.carrying.len()
    }

    /// The carrier alone, without passengers.
    pub fn unit(&self) -> Piece {
        Piece {
            color: self.color,
            role: self.role,
            heroic: self.heroic,
            carrying: Vec::new(),
        }
    }

    /// Every unit in the stack, carrier first.
    pub fn flatten(&self) -> Vec<Piece> {
        let mut units = Vec::with_capacity(self.size());
        units.push(self.unit());
        for carried in &self.carrying {
            units.extend(carried.flatten());
        }
        units
    }

    /// Iterate over the roles in the stack, carrier first.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        std::iter::once(self.role).chain(self.carrying.iter().map(|p| p.role))
    }

    #[inline]
    pub fn contains(&self, role: Role) -> bool {
        self.roles().any(|r| r == role)
    }

    /// Find a unit of the stack by role.
    pub fn unit_of(&self, role: Role) -> Option<Piece> {
        self.flatten().into_iter().find(|p| p.role == role)
    }

    /// Notation letter, uppercase for red.
    pub fn letter(&self) -> char {
        let c = self.role.letter();
        match self.color {
            Color::Red => c.to_ascii_uppercase(),
            Color::Blue => c,
        }
    }
}

/// FEN-style notation: `T`, `t*`, `(NFT)`.
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn unit(p: &Piece, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", p.letter())?;
            if p.heroic {
                write!(f, "*")?;
            }
            Ok(())
        }
        if self.is_stack() {
            write!(f, "(")?;
            for p in self.flatten() {
                unit(&p, f)?;
            }
            write!(f, ")")
        } else {
            unit(self, f)
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::Red.opponent(), Color::Blue);
        assert_eq!(Color::Blue.opponent(), Color::Red);
    }

    #[test]
    fn test_role_letters_unique() {
        for role in Role::ALL {
            assert_eq!(Role::from_letter(role.letter()), Some(role));
            assert_eq!(Role::from_letter(role.letter().to_ascii_uppercase()), Some(role));
        }
        assert_eq!(Role::from_letter('x'), None);
    }

    #[test]
    fn test_flatten_and_display() {
        let mut navy = Piece::new(Color::Red, Role::Navy);
        navy.carrying.push(Piece::new(Color::Red, Role::AirForce).heroic());
        navy.carrying.push(Piece::new(Color::Red, Role::Tank));
        assert!(navy.is_stack());
        assert_eq!(navy.size(), 3);
        assert_eq!(navy.to_string(), "(NF*T)");

        let units = navy.flatten();
        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|p| !p.is_stack()));
        assert_eq!(units[0].role, Role::Navy);
        assert!(units[1].heroic);

        assert!(navy.contains(Role::Tank));
        assert!(!navy.contains(Role::Infantry));
        assert_eq!(navy.unit_of(Role::AirForce).map(|p| p.heroic), Some(true));
    }

    #[test]
    fn test_blue_letters_lowercase() {
        let p = Piece::new(Color::Blue, Role::Headquarter).heroic();
        assert_eq!(p.to_string(), "h*");
    }

    #[test]
    fn test_serde_skips_defaults() {
        let p = Piece::new(Color::Blue, Role::Militia);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"color":"blue","role":"militia"}"#);
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
