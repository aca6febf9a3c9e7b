use crate::domain::MarketError;
use crate::transport::http::types::{
    json_422, AppState, ErrorResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 400, description = "Username taken or invalid input", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse)
    )
)]
pub async fn register_handler(
    State(state): State<AppState>,
    request: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, MarketError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return Ok(
                json_422(e, "{\"username\",\"password\",\"branch\",\"mobile\"}").into_response(),
            )
        }
    };

    state
        .auth
        .register(
            &request.username,
            &request.password,
            &request.branch,
            &request.mobile,
        )
        .await?;
    Ok(MessageResponse::new("Registered").into_response())
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token and cached profile fields", body = LoginResponse),
        (status = 400, description = "User not found or invalid credentials", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, MarketError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, "{\"username\",\"password\"}").into_response()),
    };

    let outcome = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        username: outcome.user.username,
        branch: outcome.user.branch,
        mobile: outcome.user.mobile,
    })
    .into_response())
}
