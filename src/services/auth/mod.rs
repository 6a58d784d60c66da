pub mod claims;
pub mod signing_key;
pub mod verifier;

pub use claims::{MapClaims, TokenClaims};
pub use signing_key::SigningKey;
pub use verifier::{TokenVerifier, VerifiedToken};
