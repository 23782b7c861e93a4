//! Commander Chess Web API
//!
//! A single in-memory game behind a JSON facade. Every handler locks the
//! game, calls the public engine API and answers with the resulting state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use commander_core::san::to_san;
use commander_core::{
    Color, DeployAction, Game, GameError, Move, MoveInput, MoveList, MoveQuery, Piece, Role, Square,
};

/// Address used when `COMMANDER_API_ADDR` is unset.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub addr: String,
}

impl Config {
    /// Read settings from the environment (after `.env` has been loaded).
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        Config {
            addr: lookup("COMMANDER_API_ADDR")
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
        }
    }
}

// =============================================================================
// Session State
// =============================================================================

/// Shared application state
pub struct ApiState {
    game: Mutex<Game>,
}

pub type AppState = Arc<ApiState>;

impl ApiState {
    pub fn shared(game: Game) -> AppState {
        Arc::new(ApiState {
            game: Mutex::new(game),
        })
    }

    fn game(&self) -> MutexGuard<'_, Game> {
        // A panic mid-request leaves the game as it was; keep serving it.
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct PieceModel {
    square: Square,
    piece: Piece,
}

#[derive(Serialize)]
struct SessionModel {
    origin: Square,
    original: Piece,
    moved: Vec<Piece>,
    stayed: Vec<Piece>,
    undecided: Vec<Piece>,
    steps: Vec<DeployAction>,
}

#[derive(Serialize)]
struct GameStateModel {
    fen: String,
    turn: Color,
    move_number: u32,
    halfmove_clock: u32,
    pieces: Vec<PieceModel>,
    session: Option<SessionModel>,
    history: Vec<String>,
    in_check: bool,
    checkmate: bool,
    stalemate: bool,
    draw: bool,
    game_over: bool,
}

#[derive(Serialize)]
struct MoveResultModel {
    #[serde(rename = "move")]
    mv: Move,
    san: String,
    state: GameStateModel,
}

#[derive(Serialize)]
struct HistoryModel {
    moves: Vec<String>,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Deserialize)]
struct MovesParams {
    square: Option<String>,
    #[serde(default)]
    verbose: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MoveRequest {
    San {
        san: String,
    },
    Coords {
        from: Square,
        to: Square,
        #[serde(default)]
        piece: Option<Role>,
        #[serde(default)]
        deploy: bool,
    },
}

impl From<MoveRequest> for MoveInput {
    fn from(req: MoveRequest) -> Self {
        match req {
            MoveRequest::San { san } => MoveInput::San(san),
            MoveRequest::Coords {
                from,
                to,
                piece,
                deploy,
            } => MoveInput::Coords {
                from,
                to,
                piece,
                deploy,
            },
        }
    }
}

#[derive(Deserialize)]
struct LoadRequest {
    fen: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Every failure is a 400 with a `detail` message.
#[derive(Debug)]
pub struct ApiError(String);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        ApiError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorModel { detail: self.0 })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Helpers
// =============================================================================

fn state_model(game: &Game) -> GameStateModel {
    let board = game.state().effective_board();
    let pieces = Color::both()
        .into_iter()
        .flat_map(|c| board.pieces(c))
        .map(|(square, piece)| PieceModel {
            square,
            piece: piece.clone(),
        })
        .collect();
    GameStateModel {
        fen: game.fen(),
        turn: game.turn(),
        move_number: game.move_number(),
        halfmove_clock: game.halfmove_clock(),
        pieces,
        session: session_model(game),
        history: game.history(),
        in_check: game.is_check(),
        checkmate: game.is_checkmate(),
        stalemate: game.is_stalemate(),
        draw: game.is_draw(),
        game_over: game.is_game_over(),
    }
}

fn session_model(game: &Game) -> Option<SessionModel> {
    game.session().map(|s| SessionModel {
        origin: s.origin,
        original: s.original.clone(),
        moved: s.moved.clone(),
        stayed: s.stayed.clone(),
        undecided: s.undecided(),
        steps: s.steps.clone(),
    })
}

fn parse_square(text: &str) -> Result<Square, ApiError> {
    Square::parse(text).ok_or_else(|| ApiError(format!("Invalid square: {text}")))
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    Json(state_model(&state.game()))
}

async fn get_moves(
    State(state): State<AppState>,
    Query(params): Query<MovesParams>,
) -> ApiResult<MoveList> {
    let square = params.square.as_deref().map(parse_square).transpose()?;
    let game = state.game();
    Ok(Json(game.moves(MoveQuery {
        square,
        verbose: params.verbose,
    })))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<MoveResultModel> {
    let mut game = state.game();
    let legal = game.legal_moves(None);
    let mv = game.make_move(MoveInput::from(req))?;
    let san = to_san(&mv, &legal);
    info!(%san, fen = %game.fen(), "move played");
    Ok(Json(MoveResultModel {
        mv,
        san,
        state: state_model(&game),
    }))
}

async fn undo(State(state): State<AppState>) -> ApiResult<GameStateModel> {
    let mut game = state.game();
    if game.undo().is_none() {
        return Err(ApiError("Nothing to undo".to_string()));
    }
    Ok(Json(state_model(&game)))
}

async fn load(
    State(state): State<AppState>,
    Json(req): Json<LoadRequest>,
) -> ApiResult<GameStateModel> {
    let mut game = state.game();
    game.load(&req.fen)?;
    info!(fen = %req.fen, "position loaded");
    Ok(Json(state_model(&game)))
}

async fn reset(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut game = state.game();
    game.reset();
    Json(state_model(&game))
}

async fn get_history(State(state): State<AppState>) -> Json<HistoryModel> {
    Json(HistoryModel {
        moves: state.game().history(),
    })
}

async fn get_session(State(state): State<AppState>) -> Json<Option<SessionModel>> {
    Json(session_model(&state.game()))
}

async fn cancel_session(State(state): State<AppState>) -> ApiResult<GameStateModel> {
    let mut game = state.game();
    game.cancel_deploy_session()?;
    Ok(Json(state_model(&game)))
}

async fn commit_session(State(state): State<AppState>) -> ApiResult<MoveResultModel> {
    let mut game = state.game();
    let mv = game.commit_deploy_session()?;
    let san = to_san(&mv, &[]);
    info!(%san, "deploy committed");
    Ok(Json(MoveResultModel {
        mv,
        san,
        state: state_model(&game),
    }))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/move", post(make_move))
        .route("/undo", post(undo))
        .route("/load", post(load))
        .route("/reset", post(reset))
        .route("/history", get(get_history))
        .route("/session", get(get_session))
        .route("/session/cancel", post(cancel_session))
        .route("/session/commit", post(commit_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.addr, DEFAULT_ADDR);
        let config = Config::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_config_override() {
        let config = Config::from_lookup(|key| {
            (key == "COMMANDER_API_ADDR").then(|| "127.0.0.1:9000".to_string())
        });
        assert_eq!(config.addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_move_request_shapes() {
        let req: MoveRequest = serde_json::from_str(r#"{"san": "c6"}"#).unwrap();
        assert_eq!(MoveInput::from(req), MoveInput::San("c6".to_string()));

        let req: MoveRequest =
            serde_json::from_str(r#"{"from": "f4", "to": "f5", "piece": "militia", "deploy": true}"#)
                .unwrap();
        assert_eq!(
            MoveInput::from(req),
            MoveInput::Coords {
                from: Square::parse("f4").unwrap(),
                to: Square::parse("f5").unwrap(),
                piece: Some(Role::Militia),
                deploy: true,
            }
        );
    }
}
