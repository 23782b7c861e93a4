//! FEN import and export.
//!
//! ```text
//! <board> <turn> <commanders> <deploy> <halfmove> <fullmove>
//! ```
//!
//! The board lists the 12 rows top first. Digits are runs of empty squares,
//! letters are pieces (uppercase red), `*` marks a heroic unit and
//! `(...)` a stack written carrier first. The deploy field is `-` or
//! `<origin>:<token>;<token>...` with tokens `T@f6` (relocate), `N<d5`
//! (stay-capture) and `M=` (stay); the board field always holds the committed
//! board and the tokens are replayed on load.

use std::fmt;

use crate::board::Board;
use crate::deploy::DeploySession;
use crate::error::FenError;
use crate::game::GameState;
use crate::moves::{DeployAction, Move};
use crate::piece::{Color, Piece, Role};
use crate::square::{Square, FILES, RANKS};
use crate::stacker;
use crate::terrain::can_place_on_square;

/// The standard starting position.
pub const STANDARD_FEN: &str =
    "6c4/1n2fh1hf2/3a2s2a1/2n1gt1tg2/2ie2m3i/11/11/2IE2M3I/2N1GT1TG2/3A2S2A1/1N2FH1HF2/6C4 r - - 0 1";

/// Everything a FEN string describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFen {
    pub board: Board,
    pub turn: Color,
    pub commanders: [Option<Square>; 2],
    pub deploy: Option<DeployField>,
    pub halfmove_clock: u32,
    pub move_number: u32,
}

/// A deploy session in progress, as written in FEN.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployField {
    pub origin: Square,
    pub tokens: Vec<DeployToken>,
}

/// One recorded deploy step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployToken {
    pub piece: Piece,
    pub kind: TokenKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Relocate(Square),
    StayCapture(Square),
    Stay,
}

impl DeployToken {
    pub fn from_action(action: &DeployAction) -> DeployToken {
        let kind = match action {
            DeployAction::Stay { .. } => TokenKind::Stay,
            DeployAction::Relocate { step } => match **step {
                Move::StayCapture { target, .. } => TokenKind::StayCapture(target),
                _ => TokenKind::Relocate(step.to()),
            },
        };
        DeployToken {
            piece: action.piece().unit(),
            kind,
        }
    }

    /// Whether a generated deploy step is the one this token records.
    pub fn matches(&self, mv: &Move) -> bool {
        let Move::DeployStep { action, .. } = mv else {
            return false;
        };
        action.piece().role == self.piece.role && DeployToken::from_action(action).kind == self.kind
    }

    fn parse(text: &str) -> Result<DeployToken, FenError> {
        let bad = || FenError::InvalidDeploy(text.to_string());
        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(bad)?;
        let piece = parse_unit(letter).map_err(|_| bad())?;
        let mut rest = chars.as_str();
        let heroic = rest.starts_with('*');
        if heroic {
            rest = &rest[1..];
        }
        let piece = Piece { heroic, ..piece };
        let kind = if rest == "=" {
            TokenKind::Stay
        } else if let Some(sq) = rest.strip_prefix('@') {
            TokenKind::Relocate(Square::parse(sq).ok_or_else(bad)?)
        } else if let Some(sq) = rest.strip_prefix('<') {
            TokenKind::StayCapture(Square::parse(sq).ok_or_else(bad)?)
        } else {
            return Err(bad());
        };
        Ok(DeployToken { piece, kind })
    }
}

impl fmt::Display for DeployToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.piece)?;
        match self.kind {
            TokenKind::Relocate(sq) => write!(f, "@{sq}"),
            TokenKind::StayCapture(sq) => write!(f, "<{sq}"),
            TokenKind::Stay => write!(f, "="),
        }
    }
}

/// Parse a full FEN string.
pub fn parse(fen: &str) -> Result<ParsedFen, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount(fields.len()));
    }
    let board = parse_board(fields[0])?;
    let turn = match fields[1] {
        "r" => Color::Red,
        "b" => Color::Blue,
        other => return Err(FenError::InvalidTurn(other.to_string())),
    };
    let commanders = parse_commanders(fields[2], &board)?;
    let deploy = parse_deploy(fields[3], &board, turn)?;
    let halfmove_clock = parse_number(fields[4])?;
    let move_number = parse_number(fields[5])?;
    if move_number == 0 {
        return Err(FenError::InvalidNumber(fields[5].to_string()));
    }
    Ok(ParsedFen {
        board,
        turn,
        commanders,
        deploy,
        halfmove_clock,
        move_number,
    })
}

fn parse_number(field: &str) -> Result<u32, FenError> {
    field
        .parse()
        .map_err(|_| FenError::InvalidNumber(field.to_string()))
}

fn parse_unit(c: char) -> Result<Piece, FenError> {
    let role = Role::from_letter(c).ok_or(FenError::InvalidPiece(c))?;
    let color = if c.is_ascii_uppercase() {
        Color::Red
    } else {
        Color::Blue
    };
    Ok(Piece::new(color, role))
}

/// Parse the piece-placement field.
pub fn parse_board(field: &str) -> Result<Board, FenError> {
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != RANKS as usize {
        return Err(FenError::WrongRowCount(rows.len()));
    }
    let mut board = Board::new();
    let mut commanders = [0usize; 2];

    for (rank, row) in rows.iter().enumerate() {
        let mut file = 0usize;
        let mut chars = row.chars().peekable();
        while let Some(c) = chars.next() {
            if let Some(d) = c.to_digit(10) {
                let mut run = d as usize;
                if let Some(d2) = chars.peek().and_then(|n| n.to_digit(10)) {
                    run = run * 10 + d2 as usize;
                    chars.next();
                }
                if run == 0 || file + run > FILES as usize {
                    return Err(FenError::BadRowWidth {
                        row: rank,
                        files: file + run,
                    });
                }
                file += run;
                continue;
            }

            let piece = if c == '(' {
                let mut text = String::from("(");
                let mut units = Vec::new();
                loop {
                    match chars.next() {
                        Some(')') => break,
                        Some('*') => match units.last_mut() {
                            Some(Piece { heroic, .. }) => {
                                *heroic = true;
                                text.push('*');
                            }
                            None => return Err(FenError::InvalidPiece('*')),
                        },
                        Some(u) => {
                            units.push(parse_unit(u)?);
                            text.push(u);
                        }
                        None => return Err(FenError::UnterminatedStack(rank)),
                    }
                }
                text.push(')');
                if units.len() < 2 {
                    return Err(FenError::InvalidStack(text));
                }
                stacker::combine(&units).ok_or(FenError::InvalidStack(text))?
            } else {
                let mut unit = parse_unit(c)?;
                if chars.peek() == Some(&'*') {
                    chars.next();
                    unit.heroic = true;
                }
                unit
            };

            if file >= FILES as usize {
                return Err(FenError::BadRowWidth {
                    row: rank,
                    files: file + 1,
                });
            }
            let sq = Square::new(file as u8, rank as u8);
            if !can_place_on_square(piece.role, sq) {
                return Err(FenError::BadTerrain {
                    piece: piece.to_string(),
                    square: sq.to_string(),
                });
            }
            if piece.contains(Role::Commander) {
                commanders[piece.color.index()] += 1;
            }
            board.put(sq, piece);
            file += 1;
        }
        if file != FILES as usize {
            return Err(FenError::BadRowWidth {
                row: rank,
                files: file,
            });
        }
    }

    if commanders.iter().any(|&n| n > 1) {
        return Err(FenError::CommanderMismatch("more than one commander per side".to_string()));
    }
    Ok(board)
}

fn parse_commanders(field: &str, board: &Board) -> Result<[Option<Square>; 2], FenError> {
    let derived = [
        board.commander_square(Color::Red),
        board.commander_square(Color::Blue),
    ];
    if field == "-" {
        return Ok(derived);
    }
    let mismatch = || FenError::CommanderMismatch(field.to_string());
    let parts: Vec<&str> = field.split(',').collect();
    if parts.len() != 2 {
        return Err(mismatch());
    }
    for (part, expected) in parts.iter().zip(derived) {
        let listed = match *part {
            "-" => None,
            text => Some(Square::parse(text).ok_or_else(|| FenError::InvalidSquare(text.to_string()))?),
        };
        if listed != expected {
            return Err(mismatch());
        }
    }
    Ok(derived)
}

fn parse_deploy(field: &str, board: &Board, turn: Color) -> Result<Option<DeployField>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let bad = || FenError::InvalidDeploy(field.to_string());
    let (origin, tokens) = field.split_once(':').ok_or_else(bad)?;
    let origin = Square::parse(origin).ok_or_else(bad)?;
    match board.get(origin) {
        Some(stack) if stack.color == turn && stack.is_stack() => {}
        _ => return Err(bad()),
    }
    let tokens = tokens
        .split(';')
        .map(DeployToken::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(DeployField { origin, tokens }))
}

/// The piece-placement field of `board`.
pub fn board_field(board: &Board) -> String {
    let mut out = String::new();
    for rank in 0..RANKS {
        if rank > 0 {
            out.push('/');
        }
        let mut empty = 0;
        for file in 0..FILES {
            match board.get(Square::new(file, rank)) {
                None => empty += 1,
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push_str(&piece.to_string());
                }
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
    }
    out
}

fn commanders_field(commanders: &[Option<Square>; 2]) -> String {
    if commanders.iter().all(Option::is_none) {
        return "-".to_string();
    }
    commanders
        .iter()
        .map(|c| c.map_or_else(|| "-".to_string(), |sq| sq.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// The deploy field for an optional session.
pub fn deploy_field(session: Option<&DeploySession>) -> String {
    match session {
        None => "-".to_string(),
        Some(s) => {
            let tokens: Vec<String> = s
                .steps
                .iter()
                .map(|a| DeployToken::from_action(a).to_string())
                .collect();
            format!("{}:{}", s.origin, tokens.join(";"))
        }
    }
}

/// Board and side to move; equal keys mean a repeated position.
pub fn position_key(board: &Board, turn: Color) -> String {
    format!("{} {}", board_field(board), turn.to_char())
}

/// Serialize a game state.
pub fn write(state: &GameState) -> String {
    format!(
        "{} {} {} {} {} {}",
        board_field(&state.board),
        state.turn.to_char(),
        commanders_field(&state.commanders),
        deploy_field(state.session.as_ref()),
        state.halfmove_clock,
        state.move_number
    )
}
