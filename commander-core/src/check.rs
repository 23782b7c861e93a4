//! Commander safety: attacks and the flying-general rule.

use crate::air_defense::{AirDefense, TransitOutcome};
use crate::board::Board;
use crate::movegen::{capture_range, profile};
use crate::piece::{Color, Piece, Role};
use crate::square::Square;

/// Whether the commander of `color` standing on `sq` is attacked by any enemy
/// unit, carried units included.
pub fn is_commander_attacked(board: &Board, sq: Square, color: Color) -> bool {
    let enemy = color.opponent();
    let needs_defense = board
        .pieces(enemy)
        .any(|(_, p)| p.contains(Role::AirForce));
    let defense = needs_defense.then(|| AirDefense::compute(board));

    board.pieces(enemy).any(|(from, piece)| {
        piece
            .flatten()
            .iter()
            .any(|unit| unit_attacks(board, from, unit, sq, defense.as_ref()))
    })
}

/// Whether `unit`, standing on `from` (alone or inside a stack), could
/// capture whatever stands on `target`.
pub fn unit_attacks(
    board: &Board,
    from: Square,
    unit: &Piece,
    target: Square,
    defense: Option<&AirDefense>,
) -> bool {
    let Some(((df, dr), distance)) = from.direction_to(target) else {
        return false;
    };
    let Some(victim) = board.get(target) else {
        return false;
    };
    let profile = profile(unit);
    let diagonal = df != 0 && dr != 0;
    let reach = if diagonal {
        profile.diagonal
    } else {
        profile.orthogonal
    };
    let flying_general =
        unit.role == Role::Commander && !diagonal && victim.contains(Role::Commander);
    if distance > capture_range(unit.role, reach, victim) && !flying_general {
        return false;
    }

    let mut transit = match (profile.flies, defense) {
        (true, Some(d)) => Some(d.transit(unit.color)),
        _ => None,
    };
    let mut sq = from;
    for _ in 1..distance {
        sq = match sq.offset(df, dr) {
            Some(next) => next,
            None => return false,
        };
        match transit.as_mut() {
            Some(t) => {
                if t.step(sq) == TransitOutcome::Destroyed {
                    return false;
                }
            }
            None => {
                if !profile.shoots_over && !board.is_empty(sq) {
                    return false;
                }
            }
        }
    }
    match transit.as_mut() {
        Some(t) => t.step(target) != TransitOutcome::Destroyed,
        None => true,
    }
}

/// Two commanders facing each other on a file or rank with nothing between.
pub fn is_commander_exposed(board: &Board, red: Square, blue: Square) -> bool {
    if !red.same_file(blue) && !red.same_rank(blue) {
        return false;
    }
    let Some(((df, dr), distance)) = red.direction_to(blue) else {
        return false;
    };
    let mut sq = red;
    for _ in 1..distance {
        sq = match sq.offset(df, dr) {
            Some(next) => next,
            None => return false,
        };
        if !board.is_empty(sq) {
            return false;
        }
    }
    true
}

/// Whether `color` is in check on `board`: its commander is attacked or
/// stands exposed to the enemy commander.
pub fn in_check(board: &Board, color: Color) -> bool {
    let Some(own) = board.commander_square(color) else {
        return false;
    };
    if is_commander_attacked(board, own, color) {
        return true;
    }
    match board.commander_square(color.opponent()) {
        Some(enemy) => is_commander_exposed(board, own, enemy),
        None => false,
    }
}
