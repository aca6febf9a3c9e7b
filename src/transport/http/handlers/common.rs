use crate::domain::{MarketError, MarketResult};
use crate::transport::http::types::AppState;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Public origin for URLs handed back to clients: the configured
/// `PUBLIC_BASE_URL`, else `http://{Host}`.
pub fn public_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.public_base_url {
        return base.clone();
    }
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

/// Parses a path id; unknown formats are reported as a missing product.
pub fn parse_product_id(raw: &str) -> MarketResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| MarketError::ProductNotFound)
}
