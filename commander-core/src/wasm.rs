//! WASM bindings for commander-core
//!
//! Moves and sessions cross the boundary as plain JS objects.

use wasm_bindgen::prelude::*;

use crate::{Game, MoveInput, MoveQuery, Role, Square};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_square(s: &str) -> Result<Square, JsValue> {
    Square::parse(s).ok_or_else(|| js_error(format!("invalid square: {s}")))
}

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Standard starting position
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { inner: Game::new() }
    }

    #[wasm_bindgen(js_name = fromFen)]
    pub fn from_fen(fen: &str) -> Result<WasmGame, JsValue> {
        Game::from_fen(fen)
            .map(|inner| WasmGame { inner })
            .map_err(js_error)
    }

    pub fn fen(&self) -> String {
        self.inner.fen()
    }

    pub fn load(&mut self, fen: &str) -> Result<(), JsValue> {
        self.inner.load(fen).map_err(js_error)
    }

    /// Legal moves, as SAN strings or, with `verbose`, as move objects
    pub fn moves(&self, square: Option<String>, verbose: bool) -> Result<JsValue, JsValue> {
        let square = square.as_deref().map(parse_square).transpose()?;
        let list = self.inner.moves(MoveQuery { square, verbose });
        serde_wasm_bindgen::to_value(&list).map_err(js_error)
    }

    /// Play a move given in SAN; returns the move object
    #[wasm_bindgen(js_name = "move")]
    pub fn make_move(&mut self, san: &str) -> Result<JsValue, JsValue> {
        let mv = self.inner.make_move(san).map_err(js_error)?;
        serde_wasm_bindgen::to_value(&mv).map_err(js_error)
    }

    /// Play a move given by squares. `piece` is a role name such as "tank".
    #[wasm_bindgen(js_name = moveFromTo)]
    pub fn move_from_to(
        &mut self,
        from: &str,
        to: &str,
        piece: Option<String>,
        deploy: bool,
    ) -> Result<JsValue, JsValue> {
        let piece = match piece {
            Some(name) => Some(
                serde_wasm_bindgen::from_value::<Role>(JsValue::from_str(&name))
                    .map_err(js_error)?,
            ),
            None => None,
        };
        let input = MoveInput::Coords {
            from: parse_square(from)?,
            to: parse_square(to)?,
            piece,
            deploy,
        };
        let mv = self.inner.make_move(input).map_err(js_error)?;
        serde_wasm_bindgen::to_value(&mv).map_err(js_error)
    }

    /// Undo the last step or move; null when there is nothing to undo
    pub fn undo(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.undo() {
            Some(mv) => serde_wasm_bindgen::to_value(&mv).map_err(js_error),
            None => Ok(JsValue::NULL),
        }
    }

    /// "r" or "b"
    pub fn turn(&self) -> String {
        self.inner.turn().to_char().to_string()
    }

    #[wasm_bindgen(js_name = isCheck)]
    pub fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    #[wasm_bindgen(js_name = isCheckmate)]
    pub fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    #[wasm_bindgen(js_name = isStalemate)]
    pub fn is_stalemate(&self) -> bool {
        self.inner.is_stalemate()
    }

    #[wasm_bindgen(js_name = isDraw)]
    pub fn is_draw(&self) -> bool {
        self.inner.is_draw()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }

    /// The deploy session in progress, or null
    pub fn session(&self) -> Result<JsValue, JsValue> {
        match self.inner.session() {
            Some(session) => serde_wasm_bindgen::to_value(session).map_err(js_error),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = cancelDeploySession)]
    pub fn cancel_deploy_session(&mut self) -> Result<(), JsValue> {
        self.inner.cancel_deploy_session().map_err(js_error)
    }

    #[wasm_bindgen(js_name = commitDeploySession)]
    pub fn commit_deploy_session(&mut self) -> Result<JsValue, JsValue> {
        let mv = self.inner.commit_deploy_session().map_err(js_error)?;
        serde_wasm_bindgen::to_value(&mv).map_err(js_error)
    }

    pub fn ascii(&self) -> String {
        self.inner.ascii()
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
