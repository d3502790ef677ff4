use axum::routing::post;
use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", post(handlers::save_profile))
}
