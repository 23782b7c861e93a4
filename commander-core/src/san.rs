//! Standard algebraic notation.
//!
//! ```text
//! [letter][disambiguation][x|&]<dest>[<|@]
//! ```
//!
//! - the letter is omitted for an Infantry move or combine that captures
//!   nothing
//! - `x` captures, `&` combines
//! - `<` marks a stay-capture and `@` a suicide-capture; dest is then the
//!   struck square
//! - deploy steps put `>` after the letter (`M>f5`, `T>xg6<`), a stay is `T=`,
//!   and a finished deploy joins its steps with `,`
//! - check and mate are not marked; a trailing `+` or `#` is ignored on input

use std::mem::discriminant;

use crate::error::SanError;
use crate::moves::{DeployAction, Move};
use crate::piece::Role;
use crate::square::Square;

/// Render `mv` in SAN. `legal` is the list it was picked from and drives
/// disambiguation.
pub fn to_san(mv: &Move, legal: &[Move]) -> String {
    match mv {
        Move::DeployStep { action, .. } => {
            let mut body = deploy_san(action);
            let rivals = legal.iter().filter(|o| match o {
                Move::DeployStep { origin, action: a } => {
                    *origin != mv.from() && deploy_san(a) == body
                }
                _ => false,
            });
            let prefix = separate(mv.from(), rivals.map(Move::from));
            body.insert_str(1, &prefix);
            body
        }
        Move::DeployComplete { steps, .. } => steps
            .iter()
            .map(deploy_san)
            .collect::<Vec<_>>()
            .join(","),
        _ => primitive_san(mv, &disambiguation(mv, legal)),
    }
}

/// Whether `text` names `mv` with any (or no) origin disambiguation.
pub fn matches_loosely(mv: &Move, text: &str) -> bool {
    match mv {
        Move::DeployStep { .. } | Move::DeployComplete { .. } => to_san(mv, &[]) == text,
        _ => {
            let from = mv.from();
            [
                String::new(),
                from.file_char().to_string(),
                from.display_rank().to_string(),
                from.to_string(),
            ]
            .iter()
            .any(|d| primitive_san(mv, d) == text)
        }
    }
}

fn letter(role: Role) -> char {
    role.letter().to_ascii_uppercase()
}

fn deploy_san(action: &DeployAction) -> String {
    match action {
        DeployAction::Stay { piece } => format!("{}=", letter(piece.role)),
        DeployAction::Relocate { step } => {
            let mut body = primitive_san(step, "");
            // Infantry keeps its letter inside a deploy.
            if !body.starts_with(letter(step.piece().role)) {
                body.insert(0, letter(Role::Infantry));
            }
            body.insert(1, '>');
            body
        }
    }
}

fn primitive_san(mv: &Move, disambiguation: &str) -> String {
    let role = mv.piece().role;
    let mut out = String::new();
    let plain = matches!(mv, Move::Normal { .. } | Move::Combine { .. });
    if !(plain && role == Role::Infantry) {
        out.push(letter(role));
    }
    out.push_str(disambiguation);
    match mv {
        Move::Capture { .. } | Move::StayCapture { .. } | Move::SuicideCapture { .. } => out.push('x'),
        Move::Combine { .. } => out.push('&'),
        _ => {}
    }
    out.push_str(&mv.target().to_string());
    match mv {
        Move::StayCapture { .. } => out.push('<'),
        Move::SuicideCapture { .. } => out.push('@'),
        _ => {}
    }
    out
}

/// Origin disambiguation against other legal moves of the same role, kind
/// and target.
fn disambiguation(mv: &Move, legal: &[Move]) -> String {
    let rivals = legal.iter().filter(|o| {
        !o.is_deploy()
            && o.from() != mv.from()
            && o.piece().role == mv.piece().role
            && o.target() == mv.target()
            && discriminant(*o) == discriminant(mv)
    });
    separate(mv.from(), rivals.map(Move::from))
}

/// Origin file, then rank, then full square, whichever first tells `from`
/// apart from the rival origins.
fn separate(from: Square, rivals: impl Iterator<Item = Square>) -> String {
    let rivals: Vec<Square> = rivals.collect();
    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|s| s.file() != from.file()) {
        from.file_char().to_string()
    } else if rivals.iter().all(|s| s.rank() != from.rank()) {
        from.display_rank().to_string()
    } else {
        from.to_string()
    }
}

/// Find the legal move written as `text`.
pub fn parse_san(text: &str, legal: &[Move]) -> Result<Move, SanError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SanError::Empty);
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "x&<@>=+#,*".contains(c);
    if !text.chars().all(allowed) {
        return Err(SanError::Unparseable(text.to_string()));
    }
    let wanted = text.trim_end_matches(['+', '#']);

    let exact: Vec<&Move> = legal.iter().filter(|m| to_san(m, legal) == wanted).collect();
    match exact.as_slice() {
        [one] => return Ok((*one).clone()),
        [] => {}
        _ => return Err(SanError::Ambiguous(text.to_string())),
    }
    let loose: Vec<&Move> = legal.iter().filter(|m| matches_loosely(m, wanted)).collect();
    match loose.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(SanError::NoMatch(text.to_string())),
        _ => Err(SanError::Ambiguous(text.to_string())),
    }
}
