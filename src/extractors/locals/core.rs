use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::RequestLocals;

/// Extractor handing the request locals to a handler.
/// The token gate must have run first; without any locals the request was never
/// authenticated, so the extractor answers 401.
pub struct Locals(pub RequestLocals);

impl<S> FromRequestParts<S> for Locals
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestLocals>()
            .cloned()
            .map(Locals)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
