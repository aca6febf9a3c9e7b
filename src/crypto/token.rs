//! Stateless session tokens (HS256 JWT).

use crate::domain::model::User;
use crate::domain::{MarketError, MarketResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub username: String,
    pub branch: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> MarketResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            id: user.id,
            username: user.username.clone(),
            branch: user.branch.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| MarketError::Internal(anyhow::anyhow!("token signing failed: {}", e)))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> MarketResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| MarketError::Unauthorized(format!("Invalid session token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("asha", "hash".into(), "Computer", "9876543210")
    }

    #[test]
    fn issued_tokens_decode_to_the_same_user() {
        let signer = TokenSigner::new(b"secret", Duration::hours(1));
        let user = user();
        let claims = signer.verify(&signer.issue(&user).unwrap()).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "asha");
        assert_eq!(claims.branch, "Computer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = TokenSigner::new(b"one", Duration::hours(1))
            .issue(&user())
            .unwrap();
        let err = TokenSigner::new(b"two", Duration::hours(1))
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, MarketError::Unauthorized(_)));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // Past the default 60s leeway.
        let signer = TokenSigner::new(b"secret", Duration::minutes(-5));
        let token = signer.issue(&user()).unwrap();
        assert!(signer.verify(&token).is_err());
    }
}
