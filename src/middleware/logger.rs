//! Access log: one event per request, emitted after the response is produced.
//!
//! Fields: status, reason, elapsed, host, remote address, user agent, method, uri.
//! Status >= 400 logs at `error`, everything else at `info`.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Router,
    extract::{ConnectInfo, Request},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::JwtError;

pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn(log_request))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn log_request(req: Request, next: Next) -> Response {
    let begin = Instant::now();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let host = header_str(req.headers(), header::HOST);
    let user_agent = header_str(req.headers(), header::USER_AGENT);
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let response = next.run(req).await;

    let elapsed = begin.elapsed();
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or_default();
    let rejection = response
        .extensions()
        .get::<JwtError>()
        .map(|e| tracing::field::display(e.to_string()));

    if status.as_u16() >= 400 {
        tracing::error!(
            status = status.as_u16(),
            reason,
            ?elapsed,
            %host,
            %remote_addr,
            %user_agent,
            %method,
            %uri,
            rejection,
            "request"
        );
    } else {
        tracing::info!(
            status = status.as_u16(),
            reason,
            ?elapsed,
            %host,
            %remote_addr,
            %user_agent,
            %method,
            %uri,
            "request"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn passes_responses_through() {
        let app = apply(
            Router::new()
                .route("/", get(|| async { "hello" }))
                .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT })),
        );

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"hello");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/teapot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
