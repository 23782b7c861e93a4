//! Pseudo-legal move generation.
//!
//! Generation ignores check: the validator filters the result. Every role is
//! described by a [`Profile`] (ranges per direction class and blocking rules)
//! and a single directional walk turns profiles into moves.

use crate::air_defense::{AirDefense, Transit, TransitOutcome};
use crate::board::Board;
use crate::deploy::DeploySession;
use crate::moves::{DeployAction, Move};
use crate::piece::{Piece, Role};
use crate::square::{Square, DIAGONAL, ORTHOGONAL};
use crate::stacker;
use crate::terrain::{can_place_on_square, can_stand_on, is_navy_passable};

/// Longest straight line on the board.
pub const UNLIMITED: u8 = 11;

/// Move and capture range along one class of directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Reach {
    pub moves: u8,
    pub captures: u8,
}

impl Reach {
    const NONE: Reach = Reach { moves: 0, captures: 0 };

    const fn new(moves: u8, captures: u8) -> Reach {
        Reach { moves, captures }
    }

    fn is_none(self) -> bool {
        self.moves == 0 && self.captures == 0
    }

    fn heroic(self) -> Reach {
        let bump = |r: u8| match r {
            0 | UNLIMITED => r,
            _ => r + 1,
        };
        Reach::new(bump(self.moves), bump(self.captures))
    }
}

/// How a unit moves and strikes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Profile {
    pub orthogonal: Reach,
    pub diagonal: Reach,
    /// Captures are not blocked by pieces in between.
    pub shoots_over: bool,
    /// Movement ignores pieces and terrain in transit (Air Force).
    pub flies: bool,
}

/// Movement profile of a single unit, heroic bonus applied.
pub fn profile(unit: &Piece) -> Profile {
    let (orthogonal, diagonal, shoots_over, flies) = match unit.role {
        Role::Commander => (Reach::new(UNLIMITED, 1), Reach::NONE, false, false),
        Role::Infantry | Role::Engineer | Role::AntiAir => {
            (Reach::new(1, 1), Reach::NONE, false, false)
        }
        Role::Militia => (Reach::new(1, 1), Reach::new(1, 1), false, false),
        Role::Tank => (Reach::new(2, 2), Reach::NONE, true, false),
        Role::Artillery => (Reach::new(3, 3), Reach::new(3, 3), true, false),
        Role::Missile => (Reach::new(2, 2), Reach::new(1, 1), true, false),
        Role::AirForce => (Reach::new(4, 4), Reach::new(4, 4), true, true),
        Role::Navy => (Reach::new(4, 4), Reach::new(4, 4), true, false),
        Role::Headquarter => (Reach::NONE, Reach::NONE, false, false),
    };
    if !unit.heroic {
        return Profile {
            orthogonal,
            diagonal,
            shoots_over,
            flies,
        };
    }
    let orthogonal = if unit.role == Role::Headquarter {
        Reach::new(1, 1)
    } else {
        orthogonal.heroic()
    };
    Profile {
        orthogonal,
        diagonal: diagonal.heroic(),
        shoots_over,
        flies,
    }
}

/// Capture range of `attacker` against `target` along a direction with the
/// given reach. Navy guns reach one square less than its torpedoes, which only
/// hit other Navies.
#[inline]
pub fn capture_range(attacker: Role, reach: Reach, target: &Piece) -> u8 {
    if attacker == Role::Navy && target.role != Role::Navy {
        reach.captures.saturating_sub(1)
    } else {
        reach.captures
    }
}

/// Directions with their reach for a profile, skipping dead directions.
fn directions(profile: &Profile) -> impl Iterator<Item = ((i8, i8), Reach)> + '_ {
    ORTHOGONAL
        .iter()
        .map(move |&d| (d, profile.orthogonal))
        .chain(DIAGONAL.iter().map(move |&d| (d, profile.diagonal)))
        .filter(|(_, reach)| !reach.is_none())
}

/// Pseudo-legal moves of `piece` (lone or stack) standing on `from`.
///
/// A stack moves as its carrier; the moves carry the whole stack as `piece`.
pub fn generate(board: &Board, from: Square, piece: &Piece, defense: &AirDefense) -> Vec<Move> {
    let profile = profile(&piece.unit());
    let mut moves = Vec::new();
    for (dir, reach) in directions(&profile) {
        walk(board, from, piece, &profile, dir, reach, defense, &mut moves);
    }
    moves
}

#[allow(clippy::too_many_arguments)]
fn walk(
    board: &Board,
    from: Square,
    piece: &Piece,
    profile: &Profile,
    (df, dr): (i8, i8),
    reach: Reach,
    defense: &AirDefense,
    moves: &mut Vec<Move>,
) {
    let role = piece.role;
    let flying_general = role == Role::Commander && (df == 0 || dr == 0);
    let limit = reach.moves.max(reach.captures);

    let mut transit: Option<Transit<'_>> = profile.flies.then(|| defense.transit(piece.color));
    let mut movement_open = true;
    let mut capture_open = true;
    // A Navy may only relocate while every square so far has been water.
    let mut afloat = true;
    let mut sq = from;

    for distance in 1..=limit {
        sq = match sq.offset(df, dr) {
            Some(next) => next,
            None => break,
        };
        let outcome = match transit.as_mut() {
            Some(t) => t.step(sq),
            None => TransitOutcome::Safe,
        };
        if outcome == TransitOutcome::Destroyed {
            break;
        }
        if role == Role::Navy && !is_navy_passable(sq) {
            afloat = false;
        }
        let can_move = movement_open && afloat && distance <= reach.moves;
        let safe = outcome == TransitOutcome::Safe;

        match board.get(sq) {
            None => {
                if can_move && safe && can_stand_on(piece, from, sq) {
                    moves.push(Move::Normal {
                        from,
                        to: sq,
                        piece: piece.clone(),
                    });
                }
            }
            Some(target) if target.color == piece.color => {
                if can_move && safe {
                    if let Some(combined) = stacker::combine(&[piece.clone(), target.clone()]) {
                        if can_stand_on(piece, from, sq) && can_place_on_square(combined.role, sq) {
                            moves.push(Move::Combine {
                                from,
                                to: sq,
                                piece: piece.clone(),
                                partner: target.clone(),
                                combined,
                            });
                        }
                    }
                }
                movement_open &= profile.flies;
                capture_open &= profile.shoots_over;
            }
            Some(target) => {
                let in_range = distance <= capture_range(role, reach, target)
                    || (flying_general && target.contains(Role::Commander));
                if capture_open && in_range {
                    moves.push(capture(from, sq, piece, target, outcome, afloat));
                }
                movement_open &= profile.flies;
                capture_open &= profile.shoots_over;
            }
        }

        if !movement_open && !capture_open {
            break;
        }
    }
}

fn capture(
    from: Square,
    target_sq: Square,
    piece: &Piece,
    target: &Piece,
    outcome: TransitOutcome,
    afloat: bool,
) -> Move {
    if outcome == TransitOutcome::Kamikaze {
        return Move::SuicideCapture {
            from,
            target: target_sq,
            piece: piece.clone(),
            captured: target.clone(),
        };
    }
    if afloat && can_stand_on(piece, from, target_sq) {
        Move::Capture {
            from,
            to: target_sq,
            piece: piece.clone(),
            captured: target.clone(),
        }
    } else {
        Move::StayCapture {
            from,
            target: target_sq,
            piece: piece.clone(),
            captured: target.clone(),
        }
    }
}

/// Deploy steps for the stack on `origin` of the effective `board`.
///
/// Without a session this yields the relocations that would open one; inside
/// a session it covers the undecided units and their stay declarations.
pub fn generate_deploy(
    board: &Board,
    origin: Square,
    session: Option<&DeploySession>,
    defense: &AirDefense,
) -> Vec<Move> {
    let Some(stack) = board.get(origin) else {
        return Vec::new();
    };
    let decided = session.map(DeploySession::decided_roles).unwrap_or_default();
    let undecided: Vec<Piece> = stack
        .flatten()
        .into_iter()
        .filter(|u| !decided.contains(&u.role))
        .collect();
    let nothing_moved = session.map_or(true, |s| s.moved.is_empty());

    let mut moves = Vec::new();
    for unit in &undecided {
        // The rest of the stack must hold together on the origin.
        let remainder_ok = match stacker::decombine(stack, unit.role) {
            Ok((_, None)) => true,
            Ok((_, Some(rest))) => can_place_on_square(rest.role, origin),
            Err(_) => false,
        };
        for step in generate(board, origin, unit, defense) {
            let leaves_origin = !matches!(step, Move::StayCapture { .. });
            if leaves_origin && !remainder_ok {
                continue;
            }
            moves.push(Move::DeployStep {
                origin,
                action: DeployAction::Relocate {
                    step: Box::new(step),
                },
            });
        }
        let last_undecided = undecided.len() == 1;
        if session.is_some() && !(nothing_moved && last_undecided) {
            moves.push(Move::DeployStep {
                origin,
                action: DeployAction::Stay {
                    piece: unit.clone(),
                },
            });
        }
    }
    moves
}
