//! Registration, login, and token verification.

use crate::crypto::{hash_password, verify_password, SessionClaims, TokenSigner};
use crate::domain::model::user::{require_field, validate_mobile};
use crate::domain::model::User;
use crate::domain::{MarketError, MarketResult};
use crate::storage::MarketStore;
use std::sync::Arc;
use tracing::{info, warn};

/// What a successful login hands back to the client for caching.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn MarketStore>,
    tokens: TokenSigner,
}

impl AuthService {
    pub fn new(store: Arc<dyn MarketStore>, tokens: TokenSigner) -> Self {
        Self { store, tokens }
    }

    /// Creates the account. Does not log the user in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        branch: &str,
        mobile: &str,
    ) -> MarketResult<()> {
        let username = username.trim();
        require_field("username", username)?;
        require_field("password", password)?;
        require_field("branch", branch)?;
        validate_mobile(mobile)?;

        // Fast path; the store still enforces uniqueness on insert.
        if self.store.find_user(username).await?.is_some() {
            return Err(MarketError::UsernameTaken);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| MarketError::Internal(e.into()))??;

        self.store
            .insert_user(User::new(username, password_hash, branch.trim(), mobile))
            .await?;
        info!(%username, "user registered");
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> MarketResult<LoginOutcome> {
        let user = self
            .store
            .find_user(username.trim())
            .await?
            .ok_or(MarketError::UnknownUser)?;

        let candidate = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &stored))
            .await
            .map_err(|e| MarketError::Internal(e.into()))??;
        if !matches {
            warn!(username = %user.username, "login rejected: bad password");
            return Err(MarketError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        info!(username = %user.username, "user logged in");
        Ok(LoginOutcome { token, user })
    }

    pub fn verify(&self, token: &str) -> MarketResult<SessionClaims> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            TokenSigner::new(b"test-secret", Duration::hours(1)),
        )
    }

    #[tokio::test]
    async fn second_registration_conflicts() {
        let auth = service();
        auth.register("asha", "pw", "IT", "9876543210").await.unwrap();
        let err = auth
            .register("asha", "other", "EXTC", "9123456780")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::UsernameTaken));
    }

    #[tokio::test]
    async fn login_issues_a_token_for_the_user() {
        let auth = service();
        auth.register("asha", "pw", "IT", "9876543210").await.unwrap();
        let outcome = auth.login("asha", "pw").await.unwrap();
        let claims = auth.verify(&outcome.token).unwrap();
        assert_eq!(claims.username, "asha");
        assert_eq!(claims.branch, "IT");
        assert_eq!(outcome.user.mobile, "9876543210");
    }

    #[tokio::test]
    async fn login_failures_are_distinguished() {
        let auth = service();
        auth.register("asha", "pw", "IT", "9876543210").await.unwrap();
        assert!(matches!(
            auth.login("asha", "wrong").await.unwrap_err(),
            MarketError::InvalidCredentials
        ));
        assert!(matches!(
            auth.login("ghost", "pw").await.unwrap_err(),
            MarketError::UnknownUser
        ));
    }

    #[tokio::test]
    async fn registration_validates_mobile() {
        let auth = service();
        let err = auth.register("asha", "pw", "IT", "12345").await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }
}
