//! CORS policy for browser clients.
//!
//! Policy:
//! - Development: any origin, WITHOUT credentials.
//! - Production: allowlist origins from Config (comma-separated env var), WITH credentials.
//!
//! Preflight `OPTIONS` requests are answered by the layer and never reach a handler.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

const ALLOWED_METHODS: [Method; 5] = [
    Method::POST,
    Method::OPTIONS,
    Method::GET,
    Method::PUT,
    Method::DELETE,
];

fn allowed_headers() -> [HeaderName; 12] {
    [
        header::CONTENT_TYPE,
        header::CONTENT_LENGTH,
        header::ACCEPT_ENCODING,
        HeaderName::from_static("x-csrf-token"),
        header::AUTHORIZATION,
        header::ACCEPT,
        header::ORIGIN,
        header::CACHE_CONTROL,
        HeaderName::from_static("x-requested-with"),
        HeaderName::from_static("token"),
        HeaderName::from_static("language"),
        header::FROM,
    ]
}

/// Build the CORS layer for the given environment.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn layer(config: &Config) -> CorsLayer {
    let cors = if config.app_env.is_production() {
        // An empty allowlist allows no origin at all.
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        });

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_credentials(true)
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods(ALLOWED_METHODS)
        .allow_headers(allowed_headers())
        .max_age(Duration::from_secs(60 * 10))
}

/// Apply CORS policy to the given Router.
pub fn apply<S>(router: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(layer(config))
}
