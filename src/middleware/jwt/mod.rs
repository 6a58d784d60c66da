/*
 * Responsibility
 * - JSON Web Token authentication middleware
 * - config: partial config -> resolved, immutable JwtGate
 * - lookup: where the token comes from (header / query / param / cookie)
 * - gate: skip / admit / reject per request
 */
pub mod config;
pub mod gate;
pub mod lookup;

use std::sync::Arc;

pub use config::{
    ErrorHook, ErrorHookWithContext, JwtConfig, JwtGate, Skipper, SuccessHook,
};
pub use gate::{apply, jwt_middleware};
pub use lookup::{TokenLookup, TokenSource};

use crate::error::ConfigError;
use crate::services::auth::SigningKey;

/// Gate with every default and an HMAC secret.
pub fn jwt(secret: impl AsRef<[u8]>) -> Result<Arc<JwtGate>, ConfigError> {
    Ok(Arc::new(JwtConfig::new(SigningKey::secret(secret)).resolve()?))
}
