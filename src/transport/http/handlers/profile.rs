use crate::domain::MarketError;
use crate::transport::http::auth::AuthUser;
use crate::transport::http::types::{
    json_422, AppState, ErrorResponse, UpdateProfileRequest, UpdateProfileResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    put,
    path = "/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile and every listing's contact number updated", body = UpdateProfileResponse),
        (status = 400, description = "Invalid mobile or branch", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Updating someone else's profile", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    request: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Response, MarketError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return Ok(json_422(e, "{\"username\",\"mobile\",\"branch\"}").into_response())
        }
    };

    let cascade = state
        .profile
        .update_profile(
            caller.username(),
            &request.username,
            &request.mobile,
            &request.branch,
        )
        .await?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile and Ads updated successfully!".to_string(),
        mobile: cascade.user.mobile,
        branch: cascade.user.branch,
    })
    .into_response())
}
