//! Maps [`MarketError`] onto HTTP status codes and `{ "error": ... }` bodies.

use crate::domain::MarketError;
use crate::transport::http::types::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

pub fn status_for(err: &MarketError) -> StatusCode {
    match err {
        // Register/login failures keep the 400 contract the client expects.
        MarketError::Validation(_)
        | MarketError::UsernameTaken
        | MarketError::UnknownUser
        | MarketError::InvalidCredentials => StatusCode::BAD_REQUEST,
        MarketError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
        MarketError::ProductNotFound | MarketError::UserNotFound => StatusCode::NOT_FOUND,
        MarketError::Storage(_) | MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = if self.is_internal() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
