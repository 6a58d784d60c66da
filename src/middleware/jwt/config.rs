//! Gate configuration.
//!
//! `JwtConfig` is the partial, caller-facing form: every field is optional except the
//! signing key. `resolve` fills the defaults in and produces an immutable `JwtGate`,
//! so no shared default is ever mutated.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::http::request::Parts;
use axum::response::Response;

use crate::error::{ConfigError, JwtError};
use crate::middleware::jwt::lookup::TokenLookup;
use crate::services::auth::{MapClaims, SigningKey, TokenClaims, TokenVerifier};

pub const DEFAULT_SIGNING_METHOD: &str = "HS256";
pub const DEFAULT_CONTEXT_KEY: &str = "user";
pub const DEFAULT_AUTH_SCHEME: &str = "Bearer";

/// Returning true lets the request through without looking at any token.
pub type Skipper = Arc<dyn Fn(&Parts) -> bool + Send + Sync>;

/// Runs after the verified token is stored, before the next handler.
pub type SuccessHook = Arc<dyn Fn(&mut Parts) + Send + Sync>;

/// Replaces the default rejection response.
pub type ErrorHook = Arc<dyn Fn(JwtError) -> Response + Send + Sync>;

/// Like `ErrorHook`, with access to the rejected request.
pub type ErrorHookWithContext = Arc<dyn Fn(JwtError, &Parts) -> Response + Send + Sync>;

pub struct JwtConfig<C = MapClaims> {
    pub skipper: Option<Skipper>,
    pub signing_key: Option<SigningKey>,
    pub signing_method: Option<String>,
    pub context_key: Option<String>,
    pub token_lookup: Option<String>,
    pub auth_scheme: Option<String>,
    pub leeway: Option<u64>,
    pub success_hook: Option<SuccessHook>,
    pub error_hook: Option<ErrorHook>,
    pub error_hook_with_context: Option<ErrorHookWithContext>,
    _claims: PhantomData<fn() -> C>,
}

impl<C> Default for JwtConfig<C> {
    fn default() -> Self {
        Self {
            skipper: None,
            signing_key: None,
            signing_method: None,
            context_key: None,
            token_lookup: None,
            auth_scheme: None,
            leeway: None,
            success_hook: None,
            error_hook: None,
            error_hook_with_context: None,
            _claims: PhantomData,
        }
    }
}

impl<C> fmt::Debug for JwtConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("signing_key", &self.signing_key)
            .field("signing_method", &self.signing_method)
            .field("context_key", &self.context_key)
            .field("token_lookup", &self.token_lookup)
            .field("auth_scheme", &self.auth_scheme)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

impl JwtConfig<MapClaims> {
    pub fn new(signing_key: SigningKey) -> Self {
        Self {
            signing_key: Some(signing_key),
            ..Self::default()
        }
    }
}

impl<C> JwtConfig<C> {
    /// Decode tokens into `D` instead of the current claims shape.
    pub fn claims<D>(self) -> JwtConfig<D> {
        JwtConfig {
            skipper: self.skipper,
            signing_key: self.signing_key,
            signing_method: self.signing_method,
            context_key: self.context_key,
            token_lookup: self.token_lookup,
            auth_scheme: self.auth_scheme,
            leeway: self.leeway,
            success_hook: self.success_hook,
            error_hook: self.error_hook,
            error_hook_with_context: self.error_hook_with_context,
            _claims: PhantomData,
        }
    }

    pub fn signing_key(mut self, key: SigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn signing_method(mut self, method: impl Into<String>) -> Self {
        self.signing_method = Some(method.into());
        self
    }

    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = Some(key.into());
        self
    }

    pub fn token_lookup(mut self, lookup: impl Into<String>) -> Self {
        self.token_lookup = Some(lookup.into());
        self
    }

    pub fn auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = Some(scheme.into());
        self
    }

    pub fn leeway(mut self, seconds: u64) -> Self {
        self.leeway = Some(seconds);
        self
    }

    pub fn skipper<F>(mut self, f: F) -> Self
    where
        F: Fn(&Parts) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(f));
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Parts) + Send + Sync + 'static,
    {
        self.success_hook = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(JwtError) -> Response + Send + Sync + 'static,
    {
        self.error_hook = Some(Arc::new(f));
        self
    }

    pub fn on_error_with_context<F>(mut self, f: F) -> Self
    where
        F: Fn(JwtError, &Parts) -> Response + Send + Sync + 'static,
    {
        self.error_hook_with_context = Some(Arc::new(f));
        self
    }
}

impl<C: TokenClaims> JwtConfig<C> {
    /// Fill in defaults and build the gate. Fails fast on a missing key, an unknown
    /// algorithm or an unparsable token lookup.
    pub fn resolve(self) -> Result<JwtGate<C>, ConfigError> {
        let signing_key = self.signing_key.ok_or(ConfigError::MissingSigningKey)?;
        let signing_method = non_empty(self.signing_method, DEFAULT_SIGNING_METHOD);
        let verifier = TokenVerifier::new(&signing_method, signing_key, self.leeway.unwrap_or(0))?;

        let lookup = match self.token_lookup.filter(|s| !s.is_empty()) {
            Some(lookup) => lookup.parse()?,
            None => TokenLookup::default(),
        };

        Ok(JwtGate {
            skipper: self.skipper.unwrap_or_else(|| Arc::new(never_skip) as Skipper),
            verifier,
            lookup,
            auth_scheme: non_empty(self.auth_scheme, DEFAULT_AUTH_SCHEME),
            context_key: non_empty(self.context_key, DEFAULT_CONTEXT_KEY),
            success_hook: self.success_hook,
            error_hook: self.error_hook,
            error_hook_with_context: self.error_hook_with_context,
        })
    }
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn never_skip(_: &Parts) -> bool {
    false
}

/// Fully resolved, immutable gate configuration shared by every request.
pub struct JwtGate<C = MapClaims> {
    pub(crate) skipper: Skipper,
    pub(crate) verifier: TokenVerifier<C>,
    pub(crate) lookup: TokenLookup,
    pub(crate) auth_scheme: String,
    pub(crate) context_key: String,
    pub(crate) success_hook: Option<SuccessHook>,
    pub(crate) error_hook: Option<ErrorHook>,
    pub(crate) error_hook_with_context: Option<ErrorHookWithContext>,
}

impl<C> fmt::Debug for JwtGate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtGate")
            .field("verifier", &self.verifier)
            .field("lookup", &self.lookup)
            .field("auth_scheme", &self.auth_scheme)
            .field("context_key", &self.context_key)
            .finish_non_exhaustive()
    }
}

impl<C> JwtGate<C> {
    pub fn context_key(&self) -> &str {
        &self.context_key
    }

    pub fn auth_scheme(&self) -> &str {
        &self.auth_scheme
    }

    pub fn token_lookup(&self) -> &TokenLookup {
        &self.lookup
    }

    pub fn verifier(&self) -> &TokenVerifier<C> {
        &self.verifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::jwt::lookup::TokenSource;
    use jsonwebtoken::Algorithm;

    #[test]
    fn missing_signing_key_fails_fast() {
        let err = JwtConfig::<MapClaims>::default().resolve().err();
        assert!(matches!(err, Some(ConfigError::MissingSigningKey)));

        let err = JwtConfig::new(SigningKey::secret("")).resolve().err();
        assert!(matches!(err, Some(ConfigError::MissingSigningKey)));
    }

    #[test]
    fn defaults_are_filled_in() {
        let gate = JwtConfig::new(SigningKey::secret("secret")).resolve().unwrap();

        assert_eq!(gate.context_key(), "user");
        assert_eq!(gate.auth_scheme(), "Bearer");
        assert_eq!(gate.token_lookup(), &TokenLookup::default());
        assert_eq!(gate.verifier().algorithm(), Algorithm::HS256);
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let gate = JwtConfig::new(SigningKey::secret("secret"))
            .signing_method("")
            .context_key("")
            .auth_scheme("")
            .token_lookup("")
            .resolve()
            .unwrap();

        assert_eq!(gate.context_key(), DEFAULT_CONTEXT_KEY);
        assert_eq!(gate.auth_scheme(), DEFAULT_AUTH_SCHEME);
        assert_eq!(gate.verifier().algorithm(), Algorithm::HS256);
    }

    #[test]
    fn explicit_fields_win() {
        let gate = JwtConfig::new(SigningKey::secret("secret"))
            .signing_method("HS512")
            .context_key("claims")
            .auth_scheme("Token")
            .token_lookup("cookie:jwt")
            .resolve()
            .unwrap();

        assert_eq!(gate.context_key(), "claims");
        assert_eq!(gate.auth_scheme(), "Token");
        assert_eq!(gate.token_lookup().source, TokenSource::Cookie);
        assert_eq!(gate.verifier().algorithm(), Algorithm::HS512);
    }

    #[test]
    fn bad_lookup_and_method_fail_at_setup() {
        let err = JwtConfig::new(SigningKey::secret("secret"))
            .token_lookup("cookie")
            .resolve()
            .err();
        assert!(matches!(err, Some(ConfigError::InvalidTokenLookup(_))));

        let err = JwtConfig::new(SigningKey::secret("secret"))
            .signing_method("XX999")
            .resolve()
            .err();
        assert!(matches!(err, Some(ConfigError::UnknownSigningMethod(_))));
    }
}
