use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, Header, Validation, errors::ErrorKind};

use crate::error::{ConfigError, JwtError};
use crate::services::auth::claims::TokenClaims;
use crate::services::auth::signing_key::{KeyResolver, SigningKey};

/// A token that passed verification, as handed to downstream handlers.
#[derive(Debug, Clone)]
pub struct VerifiedToken<C> {
    pub header: Header,
    pub claims: C,
    pub raw: String,
}

/// Verifies tokens against one configured algorithm and key source.
///
/// Built once at setup; `verify` only reads it.
pub struct TokenVerifier<C> {
    algorithm: Algorithm,
    keys: KeyResolver,
    validation: Validation,
    _claims: PhantomData<fn() -> C>,
}

impl<C> Clone for TokenVerifier<C> {
    fn clone(&self) -> Self {
        Self {
            algorithm: self.algorithm,
            keys: self.keys.clone(),
            validation: self.validation.clone(),
            _claims: PhantomData,
        }
    }
}

impl<C> fmt::Debug for TokenVerifier<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm)
            .field("validation", &self.validation)
            .finish()
    }
}

impl<C: TokenClaims> TokenVerifier<C> {
    /// `signing_method` is matched case-sensitively against algorithm names (`"HS256"`, `"RS256"`, ...).
    pub fn new(signing_method: &str, key: SigningKey, leeway: u64) -> Result<Self, ConfigError> {
        let algorithm = Algorithm::from_str(signing_method)
            .map_err(|_| ConfigError::UnknownSigningMethod(signing_method.to_string()))?;
        let keys = KeyResolver::new(key)?;

        let mut validation = Validation::new(algorithm);
        // `exp`/`nbf` are checked when present, never required.
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = leeway;

        Ok(Self {
            algorithm,
            keys,
            validation,
            _claims: PhantomData,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken<C>, JwtError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "jwt header rejected");
            classify(&e)
        })?;

        // Reject before any key is handed out.
        if header.alg != self.algorithm {
            return Err(JwtError::UnexpectedSigningMethod(format!("{:?}", header.alg)));
        }
        let key = self.keys.key_for(&header)?;

        let data = jsonwebtoken::decode::<C>(token, key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "jwt validation failed");
            classify(&e)
        })?;

        if data.claims.is_refresh_token() {
            return Err(JwtError::RefreshTokenUsed);
        }

        Ok(VerifiedToken {
            header: data.header,
            claims: data.claims,
            raw: token.to_string(),
        })
    }
}

type Rule = (fn(&ErrorKind) -> bool, fn(&jsonwebtoken::errors::Error) -> JwtError);

// Evaluated in order, first match wins. Anything unmatched is a generic invalid token.
const RULES: [Rule; 3] = [
    (is_malformed, malformed),
    (is_expired, expired),
    (is_not_valid_yet, not_valid_yet),
];

fn is_malformed(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_)
    )
}

fn is_expired(kind: &ErrorKind) -> bool {
    matches!(kind, ErrorKind::ExpiredSignature)
}

fn is_not_valid_yet(kind: &ErrorKind) -> bool {
    matches!(kind, ErrorKind::ImmatureSignature)
}

fn malformed(err: &jsonwebtoken::errors::Error) -> JwtError {
    JwtError::Malformed(err.to_string())
}

fn expired(_: &jsonwebtoken::errors::Error) -> JwtError {
    JwtError::Expired
}

fn not_valid_yet(_: &jsonwebtoken::errors::Error) -> JwtError {
    JwtError::NotValidYet
}

pub(crate) fn classify(err: &jsonwebtoken::errors::Error) -> JwtError {
    RULES
        .iter()
        .find(|(applies, _)| applies(err.kind()))
        .map(|(_, reject)| reject(err))
        .unwrap_or_else(|| JwtError::Invalid(err.to_string()))
}
