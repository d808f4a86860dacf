//! Bearer token issuance and verification (HS256 JWT).
//!
//! Tokens are stateless: there is no server-side revocation list, and logout
//! is a client-side no-op — a token stays valid until its natural expiry.
//! This is a deliberate, documented trade-off carried over from the system
//! this replaces; revocation would be a new deny-list component, not a fix
//! here.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use salespoint_core::EmailAddress;

use crate::roles::TokenRole;

/// Default token validity when none is configured.
pub const DEFAULT_VALIDITY_DAYS: i64 = 7;

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal identifier.
    pub id: Uuid,
    /// Principal email at issuance time.
    pub email: String,
    /// Role the principal authenticated as.
    pub role: TokenRole,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed (bad key material). Internal, not user-correctable.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token's expiry has passed.
    #[error("token has expired")]
    Expired,

    /// Anything else: bad shape, bad signature, wrong algorithm.
    #[error("token is not valid")]
    Malformed,
}

/// Signs tokens with the process-wide secret.
///
/// The secret is loaded once at startup and injected; there is no runtime
/// rotation.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], validity: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            validity,
        }
    }

    pub fn with_default_validity(secret: &[u8]) -> Self {
        Self::new(secret, Duration::days(DEFAULT_VALIDITY_DAYS))
    }

    /// Mint a signed token for a principal.
    pub fn issue(
        &self,
        id: Uuid,
        email: &EmailAddress,
        role: TokenRole,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            id,
            email: email.as_str().to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

/// Verifies token signatures and expiry.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        // Exact expiry: a token is rejected the second it lapses.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Decode and verify a token, distinguishing expiry from everything else.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Malformed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    fn email() -> EmailAddress {
        EmailAddress::parse("claims@example.com").unwrap()
    }

    #[test]
    fn issued_token_round_trips() {
        let issuer = TokenIssuer::with_default_validity(SECRET);
        let id = Uuid::now_v7();
        let now = Utc::now();

        let token = issuer.issue(id, &email(), TokenRole::Employee, now).unwrap();
        let claims = TokenVerifier::new(SECRET).verify(&token).unwrap();

        assert_eq!(claims.id, id);
        assert_eq!(claims.email, "claims@example.com");
        assert_eq!(claims.role, TokenRole::Employee);
        assert_eq!(claims.exp - claims.iat, Duration::days(DEFAULT_VALIDITY_DAYS).num_seconds());
    }

    #[test]
    fn short_lived_token_is_valid_before_expiry_and_rejected_after() {
        let issuer = TokenIssuer::new(SECRET, Duration::seconds(1));
        let verifier = TokenVerifier::new(SECRET);

        // Valid at issuance.
        let fresh = issuer
            .issue(Uuid::now_v7(), &email(), TokenRole::User, Utc::now())
            .unwrap();
        assert!(verifier.verify(&fresh).is_ok());

        // Issued two seconds ago with one second of validity: expired.
        let stale = issuer
            .issue(
                Uuid::now_v7(),
                &email(),
                TokenRole::User,
                Utc::now() - Duration::seconds(2),
            )
            .unwrap();
        assert!(matches!(verifier.verify(&stale), Err(TokenError::Expired)));
    }

    #[test]
    fn wrong_secret_is_malformed_not_expired() {
        let token = TokenIssuer::with_default_validity(SECRET)
            .issue(Uuid::now_v7(), &email(), TokenRole::Admin, Utc::now())
            .unwrap();

        let result = TokenVerifier::new(b"a-different-secret").verify(&token);
        assert!(matches!(result, Err(TokenError::Malformed)));
    }

    #[test]
    fn garbage_is_malformed() {
        let verifier = TokenVerifier::new(SECRET);
        assert!(matches!(verifier.verify("not.a.jwt"), Err(TokenError::Malformed)));
        assert!(matches!(verifier.verify(""), Err(TokenError::Malformed)));
    }
}
