//! HTTP middleware for axum: JSON Web Token authentication, CORS, access logging
//! and panic recovery, plus the demo server that wires them together.
//!
//! ```ignore
//! use token_gate::middleware::jwt::{self, JwtConfig};
//! use token_gate::services::auth::SigningKey;
//!
//! let gate = JwtConfig::new(SigningKey::secret("secret"))
//!     .token_lookup("query:jwt")
//!     .resolve()?;
//! let app = jwt::apply(Router::new().route("/", get(handler)), Arc::new(gate));
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod services;
pub mod state;
