pub mod export;
pub mod logs;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;
use crate::views;

pub fn log_routes() -> Router<SharedState> {
    Router::new()
        .route("/log", post(logs::ingest).get(views::logs::index))
        .route("/export/csv", get(export::csv))
}
