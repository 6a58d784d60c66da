use serde::de::DeserializeOwned;

/// Claim that marks what a token was issued for.
pub const AUTH_TYPE_CLAIM: &str = "auth_type";

/// `auth_type` value carried by refresh tokens.
pub const REFRESH_AUTH_TYPE: &str = "refresh";

/// Generic, string-keyed claims. The default claims shape.
pub type MapClaims = serde_json::Map<String, serde_json::Value>;

/// Claims shape the gate can decode a token into.
///
/// Every request decodes into a fresh `Self`, so implementors never share
/// state between requests.
///
/// `auth_type` is consulted after a successful decode: a token reporting
/// `"refresh"` is rejected even though its signature is valid. Custom claims
/// that do not carry the claim keep the default (`None`).
pub trait TokenClaims: DeserializeOwned + Clone + Send + Sync + 'static {
    fn auth_type(&self) -> Option<&str> {
        None
    }

    fn is_refresh_token(&self) -> bool {
        self.auth_type() == Some(REFRESH_AUTH_TYPE)
    }
}

impl TokenClaims for MapClaims {
    // Missing or non-string `auth_type` means "not a refresh token".
    fn auth_type(&self) -> Option<&str> {
        self.get(AUTH_TYPE_CLAIM).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn map(value: serde_json::Value) -> MapClaims {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn map_claims_detects_refresh_tokens() {
        let claims = map(json!({"sub": "1", "auth_type": "refresh"}));
        assert!(claims.is_refresh_token());
    }

    #[test]
    fn map_claims_without_auth_type_is_not_refresh() {
        let claims = map(json!({"sub": "1"}));
        assert_eq!(claims.auth_type(), None);
        assert!(!claims.is_refresh_token());
    }

    #[test]
    fn non_string_auth_type_is_ignored() {
        let claims = map(json!({"auth_type": 7}));
        assert!(!claims.is_refresh_token());

        let claims = map(json!({"auth_type": "access"}));
        assert_eq!(claims.auth_type(), Some("access"));
        assert!(!claims.is_refresh_token());
    }

    #[derive(Clone, Deserialize)]
    struct Plain {
        #[allow(dead_code)]
        name: String,
    }

    impl TokenClaims for Plain {}

    #[test]
    fn custom_claims_default_to_access() {
        let claims = Plain {
            name: "John Doe".to_string(),
        };
        assert!(!claims.is_refresh_token());
    }
}
