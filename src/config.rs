/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CORS 許可, JWT 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::middleware::jwt::JwtConfig;
use crate::middleware::jwt::config::{
    DEFAULT_AUTH_SCHEME, DEFAULT_CONTEXT_KEY, DEFAULT_SIGNING_METHOD,
};
use crate::services::auth::{MapClaims, SigningKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum EnvConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for EnvConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            EnvConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for EnvConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_signing_key: String,
    pub jwt_signing_method: String,
    pub jwt_token_lookup: String,
    pub jwt_auth_scheme: String,
    pub jwt_context_key: String,
    pub jwt_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_signing_method", &self.jwt_signing_method)
            .field("jwt_token_lookup", &self.jwt_token_lookup)
            .field("jwt_auth_scheme", &self.jwt_auth_scheme)
            .field("jwt_context_key", &self.jwt_context_key)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Defaults for everything except the signing key.
    pub fn for_secret(jwt_signing_key: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            jwt_signing_key: jwt_signing_key.into(),
            jwt_signing_method: DEFAULT_SIGNING_METHOD.to_string(),
            jwt_token_lookup: "header:Authorization".to_string(),
            jwt_auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            jwt_context_key: DEFAULT_CONTEXT_KEY.to_string(),
            jwt_leeway_seconds: 0,
        }
    }

    pub fn from_env() -> Result<Self, EnvConfigError> {
        dotenvy::dotenv().ok();

        let jwt_signing_key = std::env::var("JWT_SIGNING_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(EnvConfigError::Missing("JWT_SIGNING_KEY"))?;
        let mut config = Self::for_secret(jwt_signing_key);

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        config.addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| EnvConfigError::Invalid("PORT"))?;

        config.app_env = AppEnv::from_env();

        config.cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        if let Ok(v) = std::env::var("JWT_SIGNING_METHOD") {
            config.jwt_signing_method = v;
        }
        if let Ok(v) = std::env::var("JWT_TOKEN_LOOKUP") {
            config.jwt_token_lookup = v;
        }
        if let Ok(v) = std::env::var("JWT_AUTH_SCHEME") {
            config.jwt_auth_scheme = v;
        }
        if let Ok(v) = std::env::var("JWT_CONTEXT_KEY") {
            config.jwt_context_key = v;
        }

        config.jwt_leeway_seconds = match std::env::var("JWT_LEEWAY_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| EnvConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            Err(_) => 0,
        };

        Ok(config)
    }

    /// Partial gate configuration; `resolve` fills in whatever is still empty.
    pub fn jwt(&self) -> JwtConfig<MapClaims> {
        JwtConfig::new(SigningKey::secret(&self.jwt_signing_key))
            .signing_method(self.jwt_signing_method.clone())
            .token_lookup(self.jwt_token_lookup.clone())
            .auth_scheme(self.jwt_auth_scheme.clone())
            .context_key(self.jwt_context_key.clone())
            .leeway(self.jwt_leeway_seconds)
    }
}
