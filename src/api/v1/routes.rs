/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開, /me は token gate の内側
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::middleware::jwt;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = jwt::apply(Router::new().route("/me", get(me)), state.gate.clone());

    Router::new().route("/health", get(health)).merge(protected)
}
