use std::collections::HashMap;
use std::fmt;

use jsonwebtoken::{DecodingKey, Header};

use crate::error::{ConfigError, JwtError};

/// Key material used to verify incoming tokens.
///
/// - `Secret`: raw HMAC secret (HS256/HS384/HS512)
/// - `Key`: any prepared `DecodingKey` (RSA/EC/Ed PEM, JWK, ...)
/// - `KeySet`: keys selected by the token header's `kid`
#[derive(Clone)]
pub enum SigningKey {
    Secret(Vec<u8>),
    Key(DecodingKey),
    KeySet(HashMap<String, DecodingKey>),
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Secret(_) => f.write_str("SigningKey::Secret(..)"),
            Self::Key(_) => f.write_str("SigningKey::Key(..)"),
            Self::KeySet(keys) => f
                .debug_tuple("SigningKey::KeySet")
                .field(&keys.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl SigningKey {
    pub fn secret(secret: impl AsRef<[u8]>) -> Self {
        Self::Secret(secret.as_ref().to_vec())
    }

    pub fn from_rsa_pem(pem: &str) -> Result<Self, ConfigError> {
        Ok(Self::Key(DecodingKey::from_rsa_pem(pem.as_bytes())?))
    }

    pub fn from_ec_pem(pem: &str) -> Result<Self, ConfigError> {
        Ok(Self::Key(DecodingKey::from_ec_pem(pem.as_bytes())?))
    }

    pub fn from_ed_pem(pem: &str) -> Result<Self, ConfigError> {
        Ok(Self::Key(DecodingKey::from_ed_pem(pem.as_bytes())?))
    }

    pub fn key_set<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = (K, DecodingKey)>,
        K: Into<String>,
    {
        Self::KeySet(keys.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Secret(secret) => secret.is_empty(),
            Self::Key(_) => false,
            Self::KeySet(keys) => keys.is_empty(),
        }
    }
}

/// Verification keys prepared once at setup.
#[derive(Clone)]
pub(crate) enum KeyResolver {
    Single(DecodingKey),
    ById(HashMap<String, DecodingKey>),
}

impl KeyResolver {
    pub(crate) fn new(key: SigningKey) -> Result<Self, ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }

        Ok(match key {
            SigningKey::Secret(secret) => Self::Single(DecodingKey::from_secret(&secret)),
            SigningKey::Key(key) => Self::Single(key),
            SigningKey::KeySet(keys) => Self::ById(keys),
        })
    }

    pub(crate) fn key_for(&self, header: &Header) -> Result<&DecodingKey, JwtError> {
        match self {
            Self::Single(key) => Ok(key),
            Self::ById(keys) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| JwtError::Invalid("token header has no kid".to_string()))?;
                keys.get(kid)
                    .ok_or_else(|| JwtError::Invalid(format!("unknown signing key id={kid}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;

    #[test]
    fn empty_secret_is_rejected() {
        let err = KeyResolver::new(SigningKey::secret("")).err();
        assert!(matches!(err, Some(ConfigError::MissingSigningKey)));
    }

    #[test]
    fn empty_key_set_is_rejected() {
        let keys: Vec<(String, DecodingKey)> = Vec::new();
        let err = KeyResolver::new(SigningKey::key_set(keys)).err();
        assert!(matches!(err, Some(ConfigError::MissingSigningKey)));
    }

    #[test]
    fn key_set_selects_by_kid() {
        let resolver = KeyResolver::new(SigningKey::key_set([
            ("a", DecodingKey::from_secret(b"first")),
            ("b", DecodingKey::from_secret(b"second")),
        ]))
        .unwrap();

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("b".to_string());
        assert!(resolver.key_for(&header).is_ok());

        header.kid = Some("c".to_string());
        assert!(matches!(
            resolver.key_for(&header),
            Err(JwtError::Invalid(_))
        ));

        header.kid = None;
        assert!(matches!(
            resolver.key_for(&header),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_pem_is_rejected_at_setup() {
        assert!(matches!(
            SigningKey::from_ed_pem("not a pem"),
            Err(ConfigError::InvalidKey(_))
        ));
        assert!(matches!(
            SigningKey::from_rsa_pem(""),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let key = SigningKey::secret("top-secret");
        assert!(!format!("{key:?}").contains("top-secret"));
    }
}
