/*
 * Responsibility
 * - GET /me: echo the verified token's claims back to the caller
 * - reads the token from request locals under the gate's context key
 */
use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AppError;
use crate::extractors::Locals;
use crate::services::auth::{MapClaims, VerifiedToken};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub algorithm: String,
    pub claims: MapClaims,
}

pub async fn me(
    State(state): State<AppState>,
    Locals(locals): Locals,
) -> Result<Json<MeResponse>, AppError> {
    let token = locals
        .get::<VerifiedToken<MapClaims>>(state.gate.context_key())
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(MeResponse {
        algorithm: format!("{:?}", token.header.alg),
        claims: token.claims.clone(),
    }))
}
