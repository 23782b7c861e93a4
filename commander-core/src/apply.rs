//! Applying and reverting moves on a board.

use crate::board::Board;
use crate::error::StackError;
use crate::moves::{DeployAction, Move};
use crate::piece::{Piece, Role};
use crate::square::Square;
use crate::stacker;

/// Outcome of applying a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Applied {
    /// Where the acting unit ended up, with its role. `None` when it left
    /// the board (suicide capture) or did not act (stay declaration).
    pub mover: Option<(Square, Role)>,
    /// Set by heroic promotion.
    pub promoted: bool,
}

impl Applied {
    fn at(sq: Square, role: Role) -> Applied {
        Applied {
            mover: Some((sq, role)),
            promoted: false,
        }
    }
}

/// Apply `mv` to `board`.
///
/// Primitive moves cannot fail. Deploy steps fail when the origin no longer
/// holds the unit or the rest of the stack cannot recombine.
pub fn apply(board: &mut Board, mv: &Move) -> Result<Applied, StackError> {
    match mv {
        Move::DeployStep { origin, action } => apply_step(board, *origin, action),
        Move::DeployComplete { origin, steps, .. } => {
            for action in steps {
                apply_step(board, *origin, action)?;
            }
            Ok(Applied::default())
        }
        Move::StayCapture { .. } => Ok(land(board, mv)),
        _ => {
            board.remove(mv.from());
            Ok(land(board, mv))
        }
    }
}

fn apply_step(board: &mut Board, origin: Square, action: &DeployAction) -> Result<Applied, StackError> {
    let DeployAction::Relocate { step } = action else {
        return Ok(Applied::default());
    };
    let unit = step.piece();
    if let Move::StayCapture { .. } = **step {
        return Ok(land(board, step));
    }
    let stack = board
        .get(origin)
        .ok_or(StackError::MissingRole(unit.role))?;
    let (_, rest) = stacker::decombine(stack, unit.role)?;
    board.set(origin, rest);
    Ok(land(board, step))
}

/// Effects of a primitive move beyond vacating its origin.
fn land(board: &mut Board, mv: &Move) -> Applied {
    match mv {
        Move::Normal { to, piece, .. } | Move::Capture { to, piece, .. } => {
            board.put(*to, piece.clone());
            Applied::at(*to, piece.role)
        }
        Move::StayCapture {
            from,
            target,
            piece,
            ..
        } => {
            board.remove(*target);
            Applied::at(*from, piece.role)
        }
        Move::SuicideCapture { target, .. } => {
            board.remove(*target);
            Applied::default()
        }
        Move::Combine {
            to, piece, combined, ..
        } => {
            board.put(*to, combined.clone());
            Applied::at(*to, piece.role)
        }
        Move::DeployStep { .. } | Move::DeployComplete { .. } => Applied::default(),
    }
}

/// Undo the effects of a primitive move on its destination.
fn unland(board: &mut Board, mv: &Move) {
    match mv {
        Move::Normal { to, .. } => {
            board.remove(*to);
        }
        Move::Capture { to, captured, .. } => {
            board.put(*to, captured.clone());
        }
        Move::StayCapture {
            target, captured, ..
        }
        | Move::SuicideCapture {
            target, captured, ..
        } => {
            board.put(*target, captured.clone());
        }
        Move::Combine { to, partner, .. } => {
            board.put(*to, partner.clone());
        }
        Move::DeployStep { .. } | Move::DeployComplete { .. } => {}
    }
}

/// Restore the board as it was before `mv` was applied.
pub fn revert(board: &mut Board, mv: &Move) -> Result<(), StackError> {
    match mv {
        Move::DeployStep { origin, action } => revert_step(board, *origin, action),
        Move::DeployComplete {
            origin,
            original,
            steps,
        } => {
            for action in steps.iter().rev() {
                if let DeployAction::Relocate { step } = action {
                    unland(board, step);
                }
            }
            board.put(*origin, original.clone());
            Ok(())
        }
        _ => {
            unland(board, mv);
            board.put(mv.from(), mv.piece().clone());
            Ok(())
        }
    }
}

fn revert_step(board: &mut Board, origin: Square, action: &DeployAction) -> Result<(), StackError> {
    let DeployAction::Relocate { step } = action else {
        return Ok(());
    };
    unland(board, step);
    let unit = step.piece();
    let mut units: Vec<Piece> = match board.get(origin) {
        // A stay-capturer never left; swap it for its snapshot.
        Some(stack) if matches!(**step, Move::StayCapture { .. }) => stack
            .flatten()
            .into_iter()
            .filter(|u| u.role != unit.role)
            .collect(),
        Some(stack) => stack.flatten(),
        None => Vec::new(),
    };
    units.push(unit.clone());
    let restored = stacker::combine(&units).ok_or(StackError::Incompatible)?;
    board.put(origin, restored);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn red(role: Role) -> Piece {
        Piece::new(Color::Red, role)
    }

    fn blue(role: Role) -> Piece {
        Piece::new(Color::Blue, role)
    }

    fn relocate(origin: &str, step: Move) -> Move {
        Move::DeployStep {
            origin: sq(origin),
            action: DeployAction::Relocate {
                step: Box::new(step),
            },
        }
    }

    #[test]
    fn test_primitive_apply_revert() {
        let mut board = Board::new();
        board.put(sq("f4"), red(Role::Tank));
        board.put(sq("f6"), blue(Role::Infantry));
        let before = board.clone();

        let mv = Move::Capture {
            from: sq("f4"),
            to: sq("f6"),
            piece: red(Role::Tank),
            captured: blue(Role::Infantry),
        };
        let applied = apply(&mut board, &mv).unwrap();
        assert_eq!(applied.mover, Some((sq("f6"), Role::Tank)));
        assert!(board.is_empty(sq("f4")));
        assert_eq!(board.get(sq("f6")), Some(&red(Role::Tank)));

        revert(&mut board, &mv).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_stay_and_suicide_capture() {
        let mut board = Board::new();
        board.put(sq("b5"), red(Role::Navy));
        board.put(sq("d5"), blue(Role::Infantry));
        let before = board.clone();
        let stay = Move::StayCapture {
            from: sq("b5"),
            target: sq("d5"),
            piece: red(Role::Navy),
            captured: blue(Role::Infantry),
        };
        apply(&mut board, &stay).unwrap();
        assert_eq!(board.get(sq("b5")), Some(&red(Role::Navy)));
        assert!(board.is_empty(sq("d5")));
        revert(&mut board, &stay).unwrap();
        assert_eq!(board, before);

        let mut board = Board::new();
        board.put(sq("f3"), red(Role::AirForce));
        board.put(sq("f7"), blue(Role::Tank));
        let before = board.clone();
        let suicide = Move::SuicideCapture {
            from: sq("f3"),
            target: sq("f7"),
            piece: red(Role::AirForce),
            captured: blue(Role::Tank),
        };
        let applied = apply(&mut board, &suicide).unwrap();
        assert_eq!(applied.mover, None);
        assert!(board.is_empty(sq("f3")) && board.is_empty(sq("f7")));
        revert(&mut board, &suicide).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_deploy_steps_and_composite_revert() {
        let stack = stacker::combine(&[red(Role::Tank), red(Role::Militia)]).unwrap();
        let mut board = Board::new();
        board.put(sq("f4"), stack.clone());
        let before = board.clone();

        let militia = relocate(
            "f4",
            Move::Normal {
                from: sq("f4"),
                to: sq("f5"),
                piece: red(Role::Militia),
            },
        );
        apply(&mut board, &militia).unwrap();
        assert_eq!(board.get(sq("f4")), Some(&red(Role::Tank)));
        assert_eq!(board.get(sq("f5")), Some(&red(Role::Militia)));

        // The Tank rejoins the Militia on f5.
        let combined = stacker::combine(&[red(Role::Tank), red(Role::Militia)]).unwrap();
        let tank = relocate(
            "f4",
            Move::Combine {
                from: sq("f4"),
                to: sq("f5"),
                piece: red(Role::Tank),
                partner: red(Role::Militia),
                combined: combined.clone(),
            },
        );
        apply(&mut board, &tank).unwrap();
        assert!(board.is_empty(sq("f4")));
        assert_eq!(board.get(sq("f5")), Some(&combined));

        // Step-wise revert.
        let mut stepwise = board.clone();
        revert(&mut stepwise, &tank).unwrap();
        revert(&mut stepwise, &militia).unwrap();
        assert_eq!(stepwise, before);

        // Composite revert.
        let steps = [militia, tank]
            .into_iter()
            .map(|m| match m {
                Move::DeployStep { action, .. } => action,
                _ => unreachable!(),
            })
            .collect();
        let composite = Move::DeployComplete {
            origin: sq("f4"),
            original: stack,
            steps,
        };
        revert(&mut board, &composite).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_deploy_step_missing_unit() {
        let mut board = Board::new();
        board.put(sq("f4"), red(Role::Tank));
        let mv = relocate(
            "f4",
            Move::Normal {
                from: sq("f4"),
                to: sq("f5"),
                piece: red(Role::Militia),
            },
        );
        assert_eq!(
            apply(&mut board, &mv),
            Err(StackError::MissingRole(Role::Militia))
        );
    }
}
