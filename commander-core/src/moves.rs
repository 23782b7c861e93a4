//! The move type.

use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::square::Square;

/// A move, tagged by kind.
///
/// Every variant keeps snapshots of the pieces it touches (as they were
/// before the move) so that it can be reverted exactly.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    /// Relocate to an empty square.
    Normal { from: Square, to: Square, piece: Piece },
    /// Relocate onto an enemy, removing it.
    Capture {
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
    },
    /// Remove an enemy without moving.
    StayCapture {
        from: Square,
        target: Square,
        piece: Piece,
        captured: Piece,
    },
    /// Strike an enemy and be destroyed with it.
    SuicideCapture {
        from: Square,
        target: Square,
        piece: Piece,
        captured: Piece,
    },
    /// Move onto a friendly piece and form a stack.
    Combine {
        from: Square,
        to: Square,
        piece: Piece,
        partner: Piece,
        combined: Piece,
    },
    /// One unit of the stack on `origin` acts during a deploy session.
    DeployStep { origin: Square, action: DeployAction },
    /// A finished deploy session, as recorded in history.
    DeployComplete {
        origin: Square,
        original: Piece,
        steps: Vec<DeployAction>,
    },
}

/// What a single unit does during a deploy session.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeployAction {
    /// The unit leaves (or strikes from) the origin; `step` is never a deploy
    /// variant and its `piece` is the single unit.
    Relocate { step: Box<Move> },
    /// The unit stays on the origin.
    Stay { piece: Piece },
}

impl DeployAction {
    /// The unit acting.
    pub fn piece(&self) -> &Piece {
        match self {
            DeployAction::Relocate { step } => step.piece(),
            DeployAction::Stay { piece } => piece,
        }
    }

    pub fn is_stay(&self) -> bool {
        matches!(self, DeployAction::Stay { .. })
    }
}

impl Move {
    /// Square the acting piece starts from.
    pub fn from(&self) -> Square {
        match self {
            Move::Normal { from, .. }
            | Move::Capture { from, .. }
            | Move::StayCapture { from, .. }
            | Move::SuicideCapture { from, .. }
            | Move::Combine { from, .. } => *from,
            Move::DeployStep { origin, .. } | Move::DeployComplete { origin, .. } => *origin,
        }
    }

    /// Square the acting piece ends on. A stay-capture ends where it began.
    pub fn to(&self) -> Square {
        match self {
            Move::Normal { to, .. } | Move::Capture { to, .. } | Move::Combine { to, .. } => *to,
            Move::StayCapture { from, .. } => *from,
            Move::SuicideCapture { target, .. } => *target,
            Move::DeployStep { origin, action } => match action {
                DeployAction::Relocate { step } => step.to(),
                DeployAction::Stay { .. } => *origin,
            },
            Move::DeployComplete { origin, steps, .. } => steps
                .iter()
                .rev()
                .find_map(|a| match a {
                    DeployAction::Relocate { step } => Some(step.to()),
                    DeployAction::Stay { .. } => None,
                })
                .unwrap_or(*origin),
        }
    }

    /// Square whose occupant is affected: the destination, or the struck
    /// square for stay/suicide captures.
    pub fn target(&self) -> Square {
        match self {
            Move::StayCapture { target, .. } | Move::SuicideCapture { target, .. } => *target,
            Move::DeployStep {
                action: DeployAction::Relocate { step },
                ..
            } => step.target(),
            _ => self.to(),
        }
    }

    /// The moving piece (the unit for deploy steps, the whole stack for the
    /// composite entry).
    pub fn piece(&self) -> &Piece {
        match self {
            Move::Normal { piece, .. }
            | Move::Capture { piece, .. }
            | Move::StayCapture { piece, .. }
            | Move::SuicideCapture { piece, .. }
            | Move::Combine { piece, .. } => piece,
            Move::DeployStep { action, .. } => action.piece(),
            Move::DeployComplete { original, .. } => original,
        }
    }

    /// Piece removed from the board by this move, if any.
    pub fn captured(&self) -> Option<&Piece> {
        match self {
            Move::Capture { captured, .. }
            | Move::StayCapture { captured, .. }
            | Move::SuicideCapture { captured, .. } => Some(captured),
            Move::DeployStep {
                action: DeployAction::Relocate { step },
                ..
            } => step.captured(),
            _ => None,
        }
    }

    pub fn is_capture(&self) -> bool {
        match self {
            Move::DeployComplete { steps, .. } => steps.iter().any(|a| match a {
                DeployAction::Relocate { step } => step.is_capture(),
                DeployAction::Stay { .. } => false,
            }),
            _ => self.captured().is_some(),
        }
    }

    pub fn is_deploy(&self) -> bool {
        matches!(self, Move::DeployStep { .. } | Move::DeployComplete { .. })
    }

    /// The primitive move inside a deploy step, or the move itself.
    pub fn primitive(&self) -> Option<&Move> {
        match self {
            Move::DeployStep {
                action: DeployAction::Relocate { step },
                ..
            } => Some(step),
            Move::DeployStep { .. } | Move::DeployComplete { .. } => None,
            _ => Some(self),
        }
    }
}
