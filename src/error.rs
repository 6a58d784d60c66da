/*
 * Responsibility
 * - JwtError: per-request rejection reasons of the token gate (status + code + JSON body)
 * - ConfigError: setup-time failures (gate refuses to build)
 * - AppError: errors of the demo server handlers
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub const TOKEN_EXPIRED: u32 = 10400;
pub const TOKEN_NOT_VALID_YET: u32 = 10401;
pub const TOKEN_MALFORMED: u32 = 10402;
pub const TOKEN_INVALID: u32 = 10403;
pub const TOKEN_MISSING: u32 = 10404;
pub const TOKEN_REFRESH_USED: u32 = 10405;

/// Body written for every rejected request.
#[derive(Debug, Serialize)]
pub struct JwtErrorBody {
    pub code: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("missing or malformed jwt")]
    Missing,
    #[error("unexpected jwt signing method={0}")]
    UnexpectedSigningMethod(String),
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token is expired")]
    Expired,
    #[error("token is not valid yet")]
    NotValidYet,
    #[error("token is invalid: {0}")]
    Invalid(String),
    #[error("refresh token cannot be used as an access token")]
    RefreshTokenUsed,
}

impl JwtError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Missing | Self::UnexpectedSigningMethod(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Expired => TOKEN_EXPIRED,
            Self::NotValidYet => TOKEN_NOT_VALID_YET,
            Self::Malformed(_) => TOKEN_MALFORMED,
            Self::Invalid(_) | Self::UnexpectedSigningMethod(_) => TOKEN_INVALID,
            Self::Missing => TOKEN_MISSING,
            Self::RefreshTokenUsed => TOKEN_REFRESH_USED,
        }
    }

    /// Message written to the client. Decoder detail stays in `Display` for logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Malformed(_) => "token is malformed".to_string(),
            Self::Invalid(_) => "token is invalid".to_string(),
            other => other.to_string(),
        }
    }

    pub fn body(&self) -> JwtErrorBody {
        JwtErrorBody {
            code: self.code(),
            message: self.public_message(),
        }
    }
}

impl IntoResponse for JwtError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();
        // Lets outer layers (logging, tests) see why the request was rejected.
        response.extensions_mut().insert(self);
        response
    }
}

/// Setup-time failures. A gate is never built from an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("jwt middleware requires signing key")]
    MissingSigningKey,
    #[error("unknown jwt signing method: {0}")]
    UnknownSigningMethod(String),
    #[error("invalid token lookup {0:?} (expected \"<source>:<name>\")")]
    InvalidTokenLookup(String),
    #[error("invalid signing key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
