use crate::domain::{MarketError, MarketResult};
use uuid::Uuid;

/// Institute recorded for every account.
pub const DEFAULT_INSTITUTE: &str = "VJTI";

/// Number of digits a mobile number must carry.
pub const MOBILE_DIGITS: usize = 10;

/// A registered account. `password_hash` is a PHC-format Argon2 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub institute: String,
    pub branch: String,
    pub mobile: String,
}

impl User {
    pub fn new(username: &str, password_hash: String, branch: &str, mobile: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            institute: DEFAULT_INSTITUTE.to_string(),
            branch: branch.to_string(),
            mobile: mobile.to_string(),
        }
    }
}

/// Result of a profile update: the stored user plus how many listings had
/// their contact number rewritten.
#[derive(Debug, Clone)]
pub struct ProfileCascade {
    pub user: User,
    pub products_updated: u64,
}

/// Rejects blank values for a required field.
pub fn require_field(field: &str, value: &str) -> MarketResult<()> {
    if value.trim().is_empty() {
        return Err(MarketError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Mobile numbers are exactly ten ASCII digits.
pub fn validate_mobile(mobile: &str) -> MarketResult<()> {
    if mobile.len() != MOBILE_DIGITS || !mobile.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MarketError::validation(
            "Please enter a valid 10-digit mobile number",
        ));
    }
    Ok(())
}
