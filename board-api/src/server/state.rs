// App state for the Axum server
use std::sync::Arc;

use board_core::BoardService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BoardService>,
}
