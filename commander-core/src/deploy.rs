//! Incremental deploy sessions.
//!
//! Splitting a stack is a multi-step move: each unit either relocates (or
//! strikes from the origin) or declares that it stays. Steps are staged in an
//! overlay on top of the committed board; the session commits when every
//! unit of the original stack is accounted for.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::apply::{apply, Applied};
use crate::board::Board;
use crate::error::StackError;
use crate::moves::{DeployAction, Move};
use crate::piece::{Color, Piece, Role};
use crate::square::Square;
use crate::validate::promote_if_checking;

/// A deploy in progress from one origin square.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeploySession {
    pub origin: Square,
    pub turn: Color,
    /// The stack as it stood before the first step.
    pub original: Piece,
    /// Units that acted (relocated or captured), as they were before acting.
    pub moved: Vec<Piece>,
    /// Units declared as staying.
    pub stayed: Vec<Piece>,
    pub steps: Vec<DeployAction>,
    #[serde(skip)]
    overlay: BTreeMap<Square, Option<Piece>>,
}

impl DeploySession {
    pub fn new(origin: Square, turn: Color, original: Piece) -> DeploySession {
        DeploySession {
            origin,
            turn,
            original,
            moved: Vec::new(),
            stayed: Vec::new(),
            steps: Vec::new(),
            overlay: BTreeMap::new(),
        }
    }

    /// Occupant of `sq` with staged steps taken into account.
    pub fn effective<'a>(&'a self, board: &'a Board, sq: Square) -> Option<&'a Piece> {
        match self.overlay.get(&sq) {
            Some(staged) => staged.as_ref(),
            None => board.get(sq),
        }
    }

    /// A copy of `board` with the staged steps written in.
    pub fn effective_board(&self, board: &Board) -> Board {
        let mut effective = board.clone();
        for (&sq, piece) in &self.overlay {
            effective.set(sq, piece.clone());
        }
        effective
    }

    /// Roles that have acted or declared a stay.
    pub fn decided_roles(&self) -> Vec<Role> {
        self.moved
            .iter()
            .chain(&self.stayed)
            .map(|p| p.role)
            .collect()
    }

    /// Units still waiting for a decision.
    pub fn undecided(&self) -> Vec<Piece> {
        let decided = self.decided_roles();
        self.original
            .flatten()
            .into_iter()
            .filter(|u| !decided.contains(&u.role))
            .collect()
    }

    #[inline]
    pub fn has_moved(&self) -> bool {
        !self.moved.is_empty()
    }

    /// Every unit of the original stack has acted or stayed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.moved.len() + self.stayed.len() == self.original.size()
    }

    /// Stage one step. The overlay is only touched when the step applies.
    pub fn apply_step(&mut self, board: &Board, action: DeployAction) -> Result<Applied, StackError> {
        let mut scratch = self.effective_board(board);
        let mv = Move::DeployStep {
            origin: self.origin,
            action: action.clone(),
        };
        let mut applied = apply(&mut scratch, &mv)?;
        promote_if_checking(&mut scratch, &mut applied);

        for sq in [self.origin, mv.target()] {
            self.overlay.insert(sq, scratch.get(sq).cloned());
        }
        match &action {
            DeployAction::Relocate { step } => self.moved.push(step.piece().clone()),
            DeployAction::Stay { piece } => self.stayed.push(piece.clone()),
        }
        self.steps.push(action);
        Ok(applied)
    }

    /// Drop the last step by replaying the others onto a fresh overlay.
    pub fn undo_step(&mut self, board: &Board) -> Result<Option<DeployAction>, StackError> {
        let mut steps = std::mem::take(&mut self.steps);
        let last = steps.pop();
        self.moved.clear();
        self.stayed.clear();
        self.overlay.clear();
        for action in steps {
            self.apply_step(board, action)?;
        }
        Ok(last)
    }

    /// Declare every undecided unit as staying.
    pub fn stay_remaining(&mut self) {
        for unit in self.undecided() {
            self.stayed.push(unit.clone());
            self.steps.push(DeployAction::Stay { piece: unit });
        }
    }

    /// The units left on the origin are exactly the ones that stayed or
    /// struck from there, and they still form a single stack.
    pub fn check_integrity(&self, board: &Board) -> bool {
        let mut expected: Vec<Role> = self.stayed.iter().map(|p| p.role).collect();
        expected.extend(self.steps.iter().filter_map(|a| match a {
            DeployAction::Relocate { step } if matches!(**step, Move::StayCapture { .. }) => {
                Some(step.piece().role)
            }
            _ => None,
        }));
        expected.sort();

        let mut present: Vec<Role> = self
            .effective(board, self.origin)
            .map(|p| p.roles().collect())
            .unwrap_or_default();
        present.sort();
        present == expected
    }

    /// The history entry recorded on commit.
    pub fn to_move(&self) -> Move {
        Move::DeployComplete {
            origin: self.origin,
            original: self.original.clone(),
            steps: self.steps.clone(),
        }
    }
}
