use crate::app::{AuthService, ProductService, ProfileService};
use crate::crypto::TokenSigner;
use crate::domain::model::Product;
use crate::infra::config::AppConfig;
use crate::storage::{MarketStore, UploadStore};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub products: ProductService,
    pub profile: ProfileService,
    pub store: Arc<dyn MarketStore>,
    /// Overrides the `Host`-derived origin in generated image URLs.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, uploads: UploadStore, tokens: TokenSigner) -> Self {
        Self {
            auth: AuthService::new(store.clone(), tokens),
            products: ProductService::new(store.clone(), uploads),
            profile: ProfileService::new(store.clone()),
            store,
            public_base_url: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    /// Connects the configured store and prepares the upload directory.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = crate::storage::connect(config).await?;
        let uploads = UploadStore::prepare(&config.upload_dir).await?;
        let tokens = TokenSigner::new(config.jwt_secret.as_bytes(), config.token_ttl());
        let mut state = Self::new(store, uploads, tokens);
        state.public_base_url = config.public_base_url.clone();
        state.max_upload_bytes = config.max_upload_bytes;
        Ok(state)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub branch: String,
    pub mobile: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for protected routes.
    pub token: String,
    pub username: String,
    pub branch: String,
    pub mobile: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Serialize, Debug, Default, IntoParams)]
pub struct ProductsQuery {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Exact category, or `All`.
    pub category: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, IntoParams)]
pub struct MyAdsQuery {
    pub username: Option<String>,
}

/// Multipart body of `POST /add-product` (documentation only; the handler
/// reads the fields off the stream).
#[derive(Deserialize, Debug, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct AddProductForm {
    pub name: String,
    /// Number or numeric string.
    pub price: String,
    pub category: String,
    pub description: Option<String>,
    pub contact_phone: Option<String>,
    /// Defaults to the authenticated user; any other value is rejected.
    pub seller_name: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct UpdateProductResponse {
    pub message: String,
    pub product: Product,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub mobile: String,
    pub branch: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub mobile: String,
    pub branch: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: format!("Invalid JSON body: {} (expected: {})", err, expected),
        }),
    )
}
