//! Legality filtering and heroic promotion.

use crate::apply::{apply, Applied};
use crate::board::Board;
use crate::check::{is_commander_attacked, is_commander_exposed};
use crate::moves::Move;
use crate::piece::{Color, Role};
use crate::square::Square;

/// Whether `color`'s commander is safe on `board` after a move: present, not
/// attacked, not facing the enemy commander.
pub fn commander_safe(board: &Board, color: Color) -> bool {
    let Some(own) = board.commander_square(color) else {
        return false;
    };
    if is_commander_attacked(board, own, color) {
        return false;
    }
    match board.commander_square(color.opponent()) {
        Some(enemy) => !is_commander_exposed(board, own, enemy),
        None => true,
    }
}

/// Keep the moves of `color` that do not leave its commander in danger.
///
/// Each candidate is simulated on a clone of `board`. Positions where `color`
/// has no commander at all (board setups, puzzles) skip the safety test.
pub fn filter_legal(board: &Board, color: Color, moves: Vec<Move>) -> Vec<Move> {
    let guarded = board.commander_square(color).is_some();
    moves
        .into_iter()
        .filter(|mv| {
            let mut scratch = board.clone();
            if apply(&mut scratch, mv).is_err() {
                return false;
            }
            !guarded || commander_safe(&scratch, color)
        })
        .collect()
}

/// After a move has been applied for real, make the mover heroic when it
/// leaves the opponent's commander attacked.
pub fn promote_if_checking(board: &mut Board, applied: &mut Applied) -> bool {
    let Some((sq, role)) = applied.mover else {
        return false;
    };
    let Some(color) = board.get(sq).map(|p| p.color) else {
        return false;
    };
    let Some(enemy) = board.commander_square(color.opponent()) else {
        return false;
    };
    if !is_commander_attacked(board, enemy, color.opponent()) {
        return false;
    }
    applied.promoted = promote(board, sq, role);
    applied.promoted
}

/// Set the heroic flag on the unit of `role` at `sq`. Returns false when it
/// was already heroic or is not there.
fn promote(board: &mut Board, sq: Square, role: Role) -> bool {
    let Some(mut piece) = board.get(sq).cloned() else {
        return false;
    };
    let unit = if piece.role == role {
        Some(&mut piece)
    } else {
        piece.carrying.iter_mut().find(|c| c.role == role)
    };
    match unit {
        Some(u) if !u.heroic => u.heroic = true,
        _ => return false,
    }
    board.put(sq, piece);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use crate::stacker;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn test_pinned_piece_cannot_leave_file() {
        let mut board = Board::new();
        board.put(sq("g1"), Piece::new(Color::Red, Role::Commander));
        board.put(sq("g5"), Piece::new(Color::Red, Role::Infantry));
        board.put(sq("g12"), Piece::new(Color::Blue, Role::Commander));
        let sideways = Move::Normal {
            from: sq("g5"),
            to: sq("h5"),
            piece: Piece::new(Color::Red, Role::Infantry),
        };
        let forward = Move::Normal {
            from: sq("g5"),
            to: sq("g6"),
            piece: Piece::new(Color::Red, Role::Infantry),
        };
        let legal = filter_legal(&board, Color::Red, vec![sideways, forward.clone()]);
        assert_eq!(legal, vec![forward]);
    }

    #[test]
    fn test_no_commander_means_no_filter() {
        let mut board = Board::new();
        board.put(sq("f4"), Piece::new(Color::Red, Role::Tank));
        let mv = Move::Normal {
            from: sq("f4"),
            to: sq("f5"),
            piece: Piece::new(Color::Red, Role::Tank),
        };
        assert_eq!(filter_legal(&board, Color::Red, vec![mv.clone()]), vec![mv]);
    }

    #[test]
    fn test_promotion_on_check() {
        let mut board = Board::new();
        board.put(sq("f10"), Piece::new(Color::Blue, Role::Commander));
        board.put(sq("f7"), Piece::new(Color::Red, Role::Tank));
        let mut applied = Applied {
            mover: Some((sq("f7"), Role::Tank)),
            promoted: false,
        };
        // Three squares away is out of the Tank's reach.
        assert!(!promote_if_checking(&mut board, &mut applied));

        board.remove(sq("f7"));
        board.put(sq("f8"), Piece::new(Color::Red, Role::Tank));
        let mut applied = Applied {
            mover: Some((sq("f8"), Role::Tank)),
            promoted: false,
        };
        assert!(promote_if_checking(&mut board, &mut applied));
        assert!(applied.promoted);
        assert!(board.get(sq("f8")).unwrap().heroic);
    }

    #[test]
    fn test_promotion_inside_stack() {
        let mut board = Board::new();
        board.put(sq("f10"), Piece::new(Color::Blue, Role::Commander));
        let stack = stacker::combine(&[
            Piece::new(Color::Red, Role::Tank),
            Piece::new(Color::Red, Role::Infantry),
        ])
        .unwrap();
        board.put(sq("f9"), stack);
        let mut applied = Applied {
            mover: Some((sq("f9"), Role::Infantry)),
            promoted: false,
        };
        assert!(promote_if_checking(&mut board, &mut applied));
        let piece = board.get(sq("f9")).unwrap();
        assert!(!piece.heroic);
        assert!(piece.carrying[0].heroic);
    }
}
