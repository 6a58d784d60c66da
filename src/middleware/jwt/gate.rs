//! The per-request token gate.
//!
//! Each request ends in exactly one of:
//! - skipped: the skipper matched, the next handler runs untouched
//! - admitted: the verified token is stored in `RequestLocals` under the context key
//! - rejected: error hook response, or the default JSON error; the chain stops here

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::error::JwtError;
use crate::extractors::RequestLocals;
use crate::middleware::jwt::config::JwtGate;
use crate::services::auth::{TokenClaims, VerifiedToken};

/// Install the gate on every route of `router`.
///
/// Uses `route_layer`, so unknown paths still answer 404 and `param:` lookups
/// see the routed path parameters.
pub fn apply<S, C>(router: Router<S>, gate: Arc<JwtGate<C>>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    C: TokenClaims,
{
    router.route_layer(middleware::from_fn_with_state(gate, jwt_middleware::<C>))
}

pub async fn jwt_middleware<C: TokenClaims>(
    State(gate): State<Arc<JwtGate<C>>>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    if (gate.skipper)(&parts) {
        return next.run(Request::from_parts(parts, body)).await;
    }

    match gate.authenticate(&mut parts).await {
        Ok(token) => {
            gate.admit(&mut parts, token);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => gate.reject(err, &parts),
    }
}

impl<C: TokenClaims> JwtGate<C> {
    /// Extract the token from the configured source and verify it.
    pub async fn authenticate(&self, parts: &mut Parts) -> Result<VerifiedToken<C>, JwtError> {
        let token = self.lookup.extract(parts, &self.auth_scheme).await?;
        self.verifier.verify(&token)
    }

    fn admit(&self, parts: &mut Parts, token: VerifiedToken<C>) {
        RequestLocals::of(&mut parts.extensions).insert(self.context_key.clone(), token);

        if let Some(hook) = &self.success_hook {
            hook(parts);
        }
    }

    fn reject(&self, err: JwtError, parts: &Parts) -> Response {
        tracing::warn!(
            error = %err,
            code = err.code(),
            method = %parts.method,
            uri = %parts.uri,
            "jwt rejected request"
        );

        if let Some(hook) = &self.error_hook {
            return hook(err);
        }
        if let Some(hook) = &self.error_hook_with_context {
            return hook(err, parts);
        }

        err.into_response()
    }
}
