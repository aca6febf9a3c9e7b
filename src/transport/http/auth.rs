//! Bearer-token extractor for protected routes.

use crate::crypto::SessionClaims;
use crate::domain::MarketError;
use crate::transport::http::types::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

/// The verified caller. Adding this to a handler's arguments makes the route
/// reject requests without a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| {
                warn!(path = %parts.uri.path(), "rejected request without bearer token");
                MarketError::Unauthorized("Please login to continue".to_string())
            })?;
        let claims = state.auth.verify(token)?;
        Ok(AuthUser(claims))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn parses_bearer_headers() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
