use crate::domain::model::user::{require_field, validate_mobile};
use crate::domain::model::ProfileCascade;
use crate::domain::{MarketError, MarketResult};
use crate::storage::MarketStore;
use std::sync::Arc;
use tracing::info;

/// Profile edits, including the contact-number cascade onto listings.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn MarketStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Updates mobile/branch and rewrites `contactPhone` on every listing the
    /// user owns, atomically in the store.
    pub async fn update_profile(
        &self,
        actor: &str,
        username: &str,
        mobile: &str,
        branch: &str,
    ) -> MarketResult<ProfileCascade> {
        if actor != username {
            return Err(MarketError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }
        validate_mobile(mobile)?;
        require_field("branch", branch)?;

        let cascade = self
            .store
            .update_profile_cascade(username, mobile, branch.trim())
            .await?
            .ok_or(MarketError::UserNotFound)?;
        info!(
            %username,
            products_updated = cascade.products_updated,
            "profile updated"
        );
        Ok(cascade)
    }
}
