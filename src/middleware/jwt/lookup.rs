//! Where the gate looks for the token.
//!
//! A lookup is written as `"<source>:<name>"`:
//! - `header:<name>` (default `header:Authorization`, value must be `<scheme> <token>`)
//! - `query:<name>`
//! - `param:<name>` (path parameter captured by routing)
//! - `cookie:<name>`
//!
//! An unknown source falls back to `header`.

use std::fmt;
use std::str::FromStr;

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::{HeaderMap, Uri, header, request::Parts};

use crate::error::{ConfigError, JwtError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Query,
    Param,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLookup {
    pub source: TokenSource,
    pub name: String,
}

impl Default for TokenLookup {
    fn default() -> Self {
        Self {
            source: TokenSource::Header,
            name: header::AUTHORIZATION.as_str().to_string(),
        }
    }
}

impl fmt::Display for TokenLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            TokenSource::Header => "header",
            TokenSource::Query => "query",
            TokenSource::Param => "param",
            TokenSource::Cookie => "cookie",
        };
        write!(f, "{}:{}", source, self.name)
    }
}

impl FromStr for TokenLookup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, name) = s
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidTokenLookup(s.to_string()))?;
        if name.is_empty() {
            return Err(ConfigError::InvalidTokenLookup(s.to_string()));
        }

        let source = match source {
            "query" => TokenSource::Query,
            "param" => TokenSource::Param,
            "cookie" => TokenSource::Cookie,
            _ => TokenSource::Header,
        };

        Ok(Self {
            source,
            name: name.to_string(),
        })
    }
}

impl TokenLookup {
    /// Read the token from the configured source only. Absent or empty is `JwtError::Missing`.
    pub async fn extract(&self, parts: &mut Parts, auth_scheme: &str) -> Result<String, JwtError> {
        let token = match self.source {
            TokenSource::Header => from_header(&parts.headers, &self.name, auth_scheme),
            TokenSource::Query => from_query(&parts.uri, &self.name),
            TokenSource::Param => from_param(parts, &self.name).await,
            TokenSource::Cookie => from_cookie(&parts.headers, &self.name),
        };

        token.filter(|t| !t.is_empty()).ok_or(JwtError::Missing)
    }
}

fn from_header(headers: &HeaderMap, name: &str, auth_scheme: &str) -> Option<String> {
    let auth = headers.get(name)?.to_str().ok()?;
    let l = auth_scheme.len();

    // Byte-exact `<scheme> ` prefix and something after it.
    if auth.len() > l + 1 && auth.starts_with(auth_scheme) && auth.as_bytes()[l] == b' ' {
        return Some(auth[l + 1..].to_string());
    }
    None
}

fn from_query(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

async fn from_param(parts: &mut Parts, name: &str) -> Option<String> {
    // Only populated when the gate runs after routing (`route_layer`).
    let params = RawPathParams::from_request_parts(parts, &()).await.ok()?;
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn from_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| {
            let value = value.trim();
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts(req: Request<Body>) -> Parts {
        req.into_parts().0
    }

    async fn extract(lookup: &str, req: Request<Body>) -> Result<String, JwtError> {
        let lookup: TokenLookup = lookup.parse().unwrap();
        lookup.extract(&mut parts(req), "Bearer").await
    }

    #[test]
    fn parses_lookup_strings() {
        let lookup: TokenLookup = "query:jwt".parse().unwrap();
        assert_eq!(lookup.source, TokenSource::Query);
        assert_eq!(lookup.name, "jwt");

        let lookup: TokenLookup = "param:id".parse().unwrap();
        assert_eq!(lookup.source, TokenSource::Param);

        let lookup: TokenLookup = "cookie:session".parse().unwrap();
        assert_eq!(lookup.to_string(), "cookie:session");
    }

    #[test]
    fn unknown_source_falls_back_to_header() {
        let lookup: TokenLookup = "form:token".parse().unwrap();
        assert_eq!(lookup.source, TokenSource::Header);
        assert_eq!(lookup.name, "token");
    }

    #[test]
    fn rejects_lookup_without_name() {
        assert!(matches!(
            "header".parse::<TokenLookup>(),
            Err(ConfigError::InvalidTokenLookup(_))
        ));
        assert!(matches!(
            "query:".parse::<TokenLookup>(),
            Err(ConfigError::InvalidTokenLookup(_))
        ));
    }

    #[test]
    fn default_lookup_is_authorization_header() {
        assert_eq!(TokenLookup::default().to_string(), "header:authorization");
    }

    #[tokio::test]
    async fn header_requires_exact_scheme_and_space() {
        let req = Request::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract("header:Authorization", req).await.unwrap(), "abc.def.ghi");

        for value in ["Token abc", "bearer abc", "Bearer", "Bearer ", "Bearerabc", "invalid-auth"] {
            let req = Request::builder()
                .header("Authorization", value)
                .body(Body::empty())
                .unwrap();
            assert_eq!(
                extract("header:Authorization", req).await,
                Err(JwtError::Missing),
                "{value}"
            );
        }
    }

    #[tokio::test]
    async fn header_honours_custom_scheme() {
        let lookup = TokenLookup::default();
        let req = Request::builder()
            .header("Authorization", "Token abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            lookup.extract(&mut parts(req), "Token").await.unwrap(),
            "abc"
        );
    }

    #[tokio::test]
    async fn query_reads_named_parameter_only() {
        let req = Request::builder()
            .uri("/?a=b&jwt=abc")
            .header("Authorization", "Bearer other")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract("query:jwt", req).await.unwrap(), "abc");

        let req = Request::builder()
            .uri("/?a=b&jwtxyz=abc")
            .header("Authorization", "Bearer other")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract("query:jwt", req).await, Err(JwtError::Missing));

        let req = Request::builder().uri("/?jwt=").body(Body::empty()).unwrap();
        assert_eq!(extract("query:jwt", req).await, Err(JwtError::Missing));

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(extract("query:jwt", req).await, Err(JwtError::Missing));
    }

    #[tokio::test]
    async fn cookie_reads_named_cookie() {
        let req = Request::builder()
            .header("Cookie", "theme=dark; jwt=abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract("cookie:jwt", req).await.unwrap(), "abc");

        let req = Request::builder()
            .header("Cookie", "jwt=\"quoted\"")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract("cookie:jwt", req).await.unwrap(), "quoted");

        let req = Request::builder()
            .header("Cookie", "theme=dark")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract("cookie:jwt", req).await, Err(JwtError::Missing));

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract("cookie:jwt", req).await, Err(JwtError::Missing));
    }

    #[tokio::test]
    async fn param_without_routing_is_missing() {
        let req = Request::builder().uri("/abc").body(Body::empty()).unwrap();
        assert_eq!(extract("param:jwt", req).await, Err(JwtError::Missing));
    }
}
