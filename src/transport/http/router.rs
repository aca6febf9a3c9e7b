use crate::domain::model::{Product, ProductPatch, ProductStatus};
use crate::storage::uploads::UPLOADS_ROUTE;
use crate::transport::http::handlers::{auth, health, products, profile};
use crate::transport::http::types::{
    AddProductForm, AppState, ErrorResponse, HealthResponse, LoginRequest, LoginResponse,
    MessageResponse, RegisterRequest, UpdateProductResponse, UpdateProfileRequest,
    UpdateProfileResponse,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        auth::register_handler,
        auth::login_handler,
        products::list_products_handler,
        products::my_ads_handler,
        products::add_product_handler,
        products::mark_sold_handler,
        products::delete_product_handler,
        products::update_product_handler,
        profile::update_profile_handler
    ),
    components(schemas(
        Product,
        ProductStatus,
        ProductPatch,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        MessageResponse,
        ErrorResponse,
        AddProductForm,
        UpdateProductResponse,
        UpdateProfileRequest,
        UpdateProfileResponse,
        HealthResponse
    )),
    modifiers(&BearerSecurity)
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    let uploads_dir = app_state.products.uploads().dir().to_path_buf();
    let max_upload_bytes = app_state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/products", get(products::list_products_handler))
        .route("/my-ads", get(products::my_ads_handler))
        .route(
            "/add-product",
            post(products::add_product_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/mark-sold/:id", put(products::mark_sold_handler))
        .route("/delete-product/:id", delete(products::delete_product_handler))
        .route("/update-product/:id", put(products::update_product_handler))
        .route("/update-profile", put(profile::update_profile_handler))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(uploads_dir))
        .with_state(app_state)
}
