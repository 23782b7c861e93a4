//! The game controller: the public face of the engine.

use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::air_defense::AirDefense;
use crate::apply::{apply, revert};
use crate::board::Board;
use crate::check::in_check;
use crate::deploy::DeploySession;
use crate::error::{FenError, GameError, GameResult};
use crate::fen::{self, DeployField, STANDARD_FEN};
use crate::movegen::{generate, generate_deploy};
use crate::moves::{DeployAction, Move};
use crate::piece::{Color, Piece, Role};
use crate::san;
use crate::square::Square;
use crate::stacker;
use crate::terrain::can_place_on_square;
use crate::validate::{filter_legal, promote_if_checking};

/// Plies without a capture before the game is drawn.
pub const HALFMOVE_LIMIT: u32 = 100;

/// Everything that describes a position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// The committed board; staged deploy steps live in `session`.
    pub board: Board,
    pub turn: Color,
    /// Commander squares, red first.
    pub commanders: [Option<Square>; 2],
    pub move_number: u32,
    pub halfmove_clock: u32,
    pub session: Option<DeploySession>,
}

impl GameState {
    /// The board as the side to move sees it, deploy steps included.
    pub fn effective_board(&self) -> Cow<'_, Board> {
        match &self.session {
            Some(session) => Cow::Owned(session.effective_board(&self.board)),
            None => Cow::Borrowed(&self.board),
        }
    }

    fn refresh_commanders(&mut self) {
        self.commanders = [
            self.board.commander_square(Color::Red),
            self.board.commander_square(Color::Blue),
        ];
    }
}

/// Filter for [`Game::moves`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveQuery {
    pub square: Option<Square>,
    pub verbose: bool,
}

/// Legal moves as SAN strings or full move objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MoveList {
    San(Vec<String>),
    Verbose(Vec<Move>),
}

/// What a caller can hand to [`Game::make_move`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveInput {
    San(String),
    /// Click-style input. `to` is the struck square for captures that do
    /// not relocate and the origin for a stay declaration. `piece` picks a
    /// unit out of a stack; `deploy` asks for a deploy step instead of
    /// moving the whole stack.
    Coords {
        from: Square,
        to: Square,
        piece: Option<Role>,
        deploy: bool,
    },
    /// A move object as returned by [`Game::legal_moves`].
    Move(Move),
}

impl From<Move> for MoveInput {
    fn from(mv: Move) -> Self {
        MoveInput::Move(mv)
    }
}

impl From<&str> for MoveInput {
    fn from(san: &str) -> Self {
        MoveInput::San(san.to_string())
    }
}

impl From<String> for MoveInput {
    fn from(san: String) -> Self {
        MoveInput::San(san)
    }
}

/// A committed move with what is needed to take it back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "move")]
    pub mv: Move,
    pub san: String,
    /// Side that made the move.
    pub turn: Color,
    #[serde(skip)]
    halfmove_clock: u32,
    #[serde(skip)]
    move_number: u32,
}

/// Memoized legal-move list and air-defense coverage for the current
/// position. Both are dropped together on any mutation.
#[derive(Clone, Debug, Default)]
pub struct MoveCache {
    legal: RefCell<Option<Arc<Vec<Move>>>>,
    defense: RefCell<Option<Arc<AirDefense>>>,
}

impl MoveCache {
    pub fn get_or_compute(&self, compute: impl FnOnce() -> Vec<Move>) -> Arc<Vec<Move>> {
        if let Some(moves) = self.legal.borrow().as_ref() {
            return Arc::clone(moves);
        }
        let moves = Arc::new(compute());
        *self.legal.borrow_mut() = Some(Arc::clone(&moves));
        moves
    }

    /// Coverage of the effective board, computed at most once per position.
    pub fn defense_or_compute(&self, compute: impl FnOnce() -> AirDefense) -> Arc<AirDefense> {
        if let Some(defense) = self.defense.borrow().as_ref() {
            return Arc::clone(defense);
        }
        let defense = Arc::new(compute());
        *self.defense.borrow_mut() = Some(Arc::clone(&defense));
        defense
    }

    pub fn invalidate(&self) {
        self.legal.borrow_mut().take();
        self.defense.borrow_mut().take();
    }

    pub fn is_cached(&self) -> bool {
        self.legal.borrow().is_some()
    }

    pub fn has_defense(&self) -> bool {
        self.defense.borrow().is_some()
    }
}

/// A game of Commander Chess.
#[derive(Clone, Debug)]
pub struct Game {
    state: GameState,
    history: Vec<HistoryEntry>,
    /// Position keys after every committed move, starting position first.
    positions: Vec<String>,
    cache: MoveCache,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Game {
        Game::from_fen(STANDARD_FEN).expect("standard position is valid")
    }

    /// A game from any FEN, replaying a deploy field if present.
    pub fn from_fen(fen: &str) -> GameResult<Game> {
        let parsed = fen::parse(fen)?;
        let mut game = Game::from_state(GameState {
            board: parsed.board,
            turn: parsed.turn,
            commanders: parsed.commanders,
            move_number: parsed.move_number,
            halfmove_clock: parsed.halfmove_clock,
            session: None,
        });
        if let Some(deploy) = parsed.deploy {
            game.replay_deploy(&deploy)?;
        }
        Ok(game)
    }

    fn from_state(state: GameState) -> Game {
        let key = fen::position_key(&state.board, state.turn);
        Game {
            state,
            history: Vec::new(),
            positions: vec![key],
            cache: MoveCache::default(),
        }
    }

    fn replay_deploy(&mut self, field: &DeployField) -> GameResult<()> {
        for token in &field.tokens {
            let legal = self.legal_all();
            let step = legal
                .iter()
                .find(|m| m.from() == field.origin && token.matches(m))
                .ok_or_else(|| FenError::InvalidDeploy(token.to_string()))?;
            if let Move::DeployStep { origin, action } = step {
                self.deploy_step(*origin, action.clone())?;
            }
            // A deploy field describes a session still in progress.
            if self.state.session.is_none() {
                return Err(FenError::InvalidDeploy(token.to_string()).into());
            }
        }
        Ok(())
    }

    /// Replace the game with the position in `fen`. On error nothing changes.
    pub fn load(&mut self, fen: &str) -> GameResult<()> {
        *self = Game::from_fen(fen)?;
        debug!(fen, "position loaded");
        Ok(())
    }

    /// Back to the standard starting position.
    pub fn reset(&mut self) {
        *self = Game::new();
    }

    pub fn fen(&self) -> String {
        fen::write(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.state.turn
    }

    #[inline]
    pub fn move_number(&self) -> u32 {
        self.state.move_number
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }

    /// Piece on `sq`, deploy steps included.
    pub fn get(&self, sq: Square) -> Option<Piece> {
        match &self.state.session {
            Some(session) => session.effective(&self.state.board, sq).cloned(),
            None => self.state.board.get(sq).cloned(),
        }
    }

    pub fn session(&self) -> Option<&DeploySession> {
        self.state.session.as_ref()
    }

    /// SAN of every committed move, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.iter().map(|e| e.san.clone()).collect()
    }

    pub fn history_entries(&self) -> &[HistoryEntry] {
        &self.history
    }

    // ========================================================================
    // Move generation
    // ========================================================================

    /// Air-defense coverage of the board as the side to move sees it.
    pub fn air_defense(&self) -> Arc<AirDefense> {
        self.cache
            .defense_or_compute(|| AirDefense::compute(&self.state.effective_board()))
    }

    fn legal_all(&self) -> Arc<Vec<Move>> {
        self.cache.get_or_compute(|| self.generate_legal())
    }

    fn generate_legal(&self) -> Vec<Move> {
        let board = self.state.effective_board();
        let defense = self.air_defense();
        let turn = self.state.turn;
        let pseudo = match &self.state.session {
            Some(session) => generate_deploy(&board, session.origin, Some(session), &defense),
            None => {
                let mut moves = Vec::new();
                for (sq, piece) in board.pieces(turn) {
                    moves.extend(generate(&board, sq, piece, &defense));
                    if piece.is_stack() {
                        moves.extend(generate_deploy(&board, sq, None, &defense));
                    }
                }
                moves
            }
        };
        filter_legal(&board, turn, pseudo)
    }

    /// Legal moves, optionally only those from `square`.
    pub fn legal_moves(&self, square: Option<Square>) -> Vec<Move> {
        let all = self.legal_all();
        match square {
            Some(sq) => all.iter().filter(|m| m.from() == sq).cloned().collect(),
            None => all.as_ref().clone(),
        }
    }

    pub fn moves(&self, query: MoveQuery) -> MoveList {
        let moves = self.legal_moves(query.square);
        if query.verbose {
            return MoveList::Verbose(moves);
        }
        let all = self.legal_all();
        MoveList::San(moves.iter().map(|m| san::to_san(m, &all)).collect())
    }

    /// SAN of a legal move in the current position.
    pub fn san(&self, mv: &Move) -> String {
        san::to_san(mv, &self.legal_all())
    }

    // ========================================================================
    // Making and taking back moves
    // ========================================================================

    /// Play a move. Deploy steps are staged in the session and committed
    /// once every unit has acted or stayed.
    pub fn make_move(&mut self, input: impl Into<MoveInput>) -> GameResult<Move> {
        let legal = self.legal_all();
        let mv = self.resolve(input.into(), &legal)?;
        match &mv {
            Move::DeployStep { origin, action } => self.deploy_step(*origin, action.clone())?,
            _ => {
                let san = san::to_san(&mv, &legal);
                let mut board = self.state.board.clone();
                let mut applied = apply(&mut board, &mv)?;
                promote_if_checking(&mut board, &mut applied);
                debug!(%san, promoted = applied.promoted, "move applied");
                self.record(mv.clone(), san, board);
            }
        }
        self.cache.invalidate();
        Ok(mv)
    }

    fn resolve(&self, input: MoveInput, legal: &[Move]) -> GameResult<Move> {
        match input {
            MoveInput::San(text) => Ok(san::parse_san(&text, legal)?),
            MoveInput::Move(mv) => legal
                .iter()
                .find(|m| **m == mv)
                .cloned()
                .ok_or_else(|| GameError::IllegalMove(format!("{}-{}", mv.from(), mv.target()))),
            MoveInput::Coords {
                from,
                to,
                piece,
                deploy,
            } => {
                let deploy = deploy || self.state.session.is_some();
                let candidates: Vec<&Move> = legal
                    .iter()
                    .filter(|m| {
                        m.from() == from
                            && m.target() == to
                            && m.is_deploy() == deploy
                            && piece.map_or(true, |r| m.piece().role == r)
                    })
                    .collect();
                match candidates.as_slice() {
                    [one] => Ok((*one).clone()),
                    [] => Err(GameError::IllegalMove(format!("{from}-{to}"))),
                    _ => Err(GameError::IllegalMove(format!(
                        "{from}-{to} is ambiguous, name the piece"
                    ))),
                }
            }
        }
    }

    fn deploy_step(&mut self, origin: Square, action: DeployAction) -> GameResult<()> {
        let mut session = match &self.state.session {
            Some(s) => s.clone(),
            None => {
                let original = self
                    .state
                    .board
                    .get(origin)
                    .cloned()
                    .ok_or_else(|| GameError::NoPieceAtSquare(origin.to_string()))?;
                debug!(%origin, stack = %original, "deploy session started");
                DeploySession::new(origin, self.state.turn, original)
            }
        };
        let applied = session.apply_step(&self.state.board, action)?;
        debug!(
            %origin,
            promoted = applied.promoted,
            undecided = session.undecided().len(),
            "deploy step staged"
        );
        if session.is_complete() {
            self.state.session = None;
            self.finish_session(session);
        } else {
            self.state.session = Some(session);
        }
        self.cache.invalidate();
        Ok(())
    }

    /// Flush a finished session into the board as one history entry.
    fn finish_session(&mut self, session: DeploySession) -> Option<Move> {
        if !session.check_integrity(&self.state.board) {
            warn!(
                origin = %session.origin,
                steps = session.steps.len(),
                "deploy session failed its integrity check, discarding it"
            );
            self.advance_turn();
            self.cache.invalidate();
            return None;
        }
        let board = session.effective_board(&self.state.board);
        let mv = session.to_move();
        let san = san::to_san(&mv, &[]);
        debug!(origin = %session.origin, %san, "deploy session committed");
        self.record(mv.clone(), san, board);
        Some(mv)
    }

    fn record(&mut self, mv: Move, san: String, board: Board) {
        let capture = mv.is_capture();
        self.history.push(HistoryEntry {
            mv,
            san,
            turn: self.state.turn,
            halfmove_clock: self.state.halfmove_clock,
            move_number: self.state.move_number,
        });
        self.state.board = board;
        self.state.halfmove_clock = if capture {
            0
        } else {
            self.state.halfmove_clock + 1
        };
        self.advance_turn();
        self.state.refresh_commanders();
        self.positions
            .push(fen::position_key(&self.state.board, self.state.turn));
    }

    fn advance_turn(&mut self) {
        if self.state.turn == Color::Blue {
            self.state.move_number += 1;
        }
        self.state.turn = self.state.turn.opponent();
    }

    /// Take back the last deploy step, or the last committed move.
    pub fn undo(&mut self) -> Option<Move> {
        self.cache.invalidate();
        if let Some(mut session) = self.state.session.take() {
            let origin = session.origin;
            return match session.undo_step(&self.state.board) {
                Ok(popped) => {
                    if !session.steps.is_empty() {
                        self.state.session = Some(session);
                    }
                    debug!(%origin, "deploy step undone");
                    popped.map(|action| Move::DeployStep { origin, action })
                }
                Err(err) => {
                    warn!(%origin, %err, "deploy session could not be replayed, discarding it");
                    None
                }
            };
        }

        let entry = self.history.pop()?;
        let mut board = self.state.board.clone();
        if let Err(err) = revert(&mut board, &entry.mv) {
            warn!(san = %entry.san, %err, "move could not be reverted");
            self.history.push(entry);
            return None;
        }
        self.state.board = board;
        self.state.turn = entry.turn;
        self.state.halfmove_clock = entry.halfmove_clock;
        self.state.move_number = entry.move_number;
        self.state.refresh_commanders();
        self.positions.pop();
        debug!(san = %entry.san, "move undone");
        Some(entry.mv)
    }

    // ========================================================================
    // Deploy sessions
    // ========================================================================

    /// Abandon the session in progress; the board is left as committed.
    pub fn cancel_deploy_session(&mut self) -> GameResult<()> {
        let session = self.state.session.take().ok_or(GameError::NoSession)?;
        debug!(origin = %session.origin, steps = session.steps.len(), "deploy session cancelled");
        self.cache.invalidate();
        Ok(())
    }

    /// Commit the session early: units that have not acted stay on the origin.
    pub fn commit_deploy_session(&mut self) -> GameResult<Move> {
        let session = self.state.session.as_ref().ok_or(GameError::NoSession)?;
        if !session.has_moved() {
            return Err(GameError::SessionIncomplete(
                "no unit has left the origin".to_string(),
            ));
        }
        let mut session = self.state.session.take().ok_or(GameError::NoSession)?;
        session.stay_remaining();
        self.cache.invalidate();
        self.finish_session(session).ok_or_else(|| {
            GameError::SessionIncomplete("integrity check failed, session discarded".to_string())
        })
    }

    // ========================================================================
    // Game status
    // ========================================================================

    pub fn is_check(&self) -> bool {
        in_check(&self.state.effective_board(), self.state.turn)
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_all().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_all().is_empty()
    }

    pub fn is_threefold_repetition(&self) -> bool {
        match self.positions.last() {
            Some(current) => self.positions.iter().filter(|k| *k == current).count() >= 3,
            None => false,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.state.halfmove_clock >= HALFMOVE_LIMIT || self.is_threefold_repetition()
    }

    /// Over by checkmate, stalemate, draw, or a captured commander.
    pub fn is_game_over(&self) -> bool {
        self.state.commanders.iter().any(Option::is_none)
            || self.is_checkmate()
            || self.is_stalemate()
            || self.is_draw()
    }

    // ========================================================================
    // Board editing
    // ========================================================================

    fn ensure_no_session(&self) -> GameResult<()> {
        match &self.state.session {
            Some(s) => Err(GameError::SessionActive(s.origin.to_string())),
            None => Ok(()),
        }
    }

    fn edited(&mut self) {
        self.state.refresh_commanders();
        self.positions = vec![fen::position_key(&self.state.board, self.state.turn)];
        self.cache.invalidate();
    }

    /// Place a piece or stack, replacing whatever stood there.
    pub fn put(&mut self, piece: Piece, sq: Square) -> GameResult<()> {
        self.ensure_no_session()?;
        let invalid = GameError::InvalidPlacement {
            piece: piece.to_string(),
            square: sq.to_string(),
        };
        let Some(piece) = stacker::combine(&[piece]) else {
            return Err(invalid);
        };
        if !sq.is_valid() || !can_place_on_square(piece.role, sq) {
            return Err(invalid);
        }
        if piece.contains(Role::Commander) {
            if let Some(existing) = self.state.board.commander_square(piece.color) {
                if existing != sq {
                    return Err(invalid);
                }
            }
        }
        self.state.board.put(sq, piece);
        self.edited();
        Ok(())
    }

    pub fn remove(&mut self, sq: Square) -> GameResult<Option<Piece>> {
        self.ensure_no_session()?;
        let removed = self.state.board.remove(sq);
        self.edited();
        Ok(removed)
    }

    /// Empty the board and forget the history.
    pub fn clear(&mut self) {
        self.state.board.clear();
        self.state.session = None;
        self.state.halfmove_clock = 0;
        self.state.move_number = 1;
        self.history.clear();
        self.edited();
    }

    pub fn ascii(&self) -> String {
        self.state.effective_board().ascii()
    }
}
