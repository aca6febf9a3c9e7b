use crate::app::{ImageUpload, ListingDraft};
use crate::domain::model::product::parse_price;
use crate::domain::model::user::require_field;
use crate::domain::model::{Product, ProductPatch, ProductQuery};
use crate::domain::MarketError;
use crate::transport::http::auth::AuthUser;
use crate::transport::http::handlers::common::{parse_product_id, public_base_url};
use crate::transport::http::types::{
    json_422, AddProductForm, AppState, ErrorResponse, MessageResponse, MyAdsQuery,
    ProductsQuery, UpdateProductResponse,
};
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;

#[utoipa::path(
    get,
    path = "/products",
    params(ProductsQuery),
    responses(
        (status = 200, description = "Active listings, newest first", body = [Product])
    )
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>, MarketError> {
    let query = ProductQuery::new(params.search.as_deref(), params.category.as_deref());
    Ok(Json(state.products.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/my-ads",
    params(MyAdsQuery),
    responses(
        (status = 200, description = "All of a seller's listings (active and sold), newest first", body = [Product]),
        (status = 400, description = "Missing username", body = ErrorResponse)
    )
)]
pub async fn my_ads_handler(
    State(state): State<AppState>,
    Query(params): Query<MyAdsQuery>,
) -> Result<Json<Vec<Product>>, MarketError> {
    let username = params.username.unwrap_or_default();
    require_field("username", &username)?;
    Ok(Json(state.products.my_ads(&username).await?))
}

#[utoipa::path(
    post,
    path = "/add-product",
    request_body(content = AddProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Listing created", body = MessageResponse),
        (status = 400, description = "Invalid listing", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "sellerName does not match the caller", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn add_product_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, MarketError> {
    let (fields, image) = match read_listing_form(multipart).await {
        Ok(parts) => parts,
        Err(e) => {
            return Ok((e.status(), Json(ErrorResponse { error: e.body_text() })).into_response())
        }
    };
    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

    let seller_name = field("sellerName");
    if !seller_name.trim().is_empty() && seller_name.trim() != caller.username() {
        return Err(MarketError::Forbidden(
            "sellerName must match the logged-in user".to_string(),
        ));
    }

    let draft = ListingDraft {
        name: field("name"),
        price: parse_price(&field("price"))?,
        category: field("category"),
        description: field("description"),
        contact_phone: field("contactPhone"),
        seller_name: caller.username().to_string(),
    };

    let base_url = public_base_url(&state, &headers);
    state.products.create(draft, image, &base_url).await?;
    Ok(MessageResponse::new("Item added!").into_response())
}

/// Collects text fields by name plus the optional `image` file part.
async fn read_listing_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Option<ImageUpload>), MultipartError> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let bytes = field.bytes().await?;
            image = Some(ImageUpload {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            fields.insert(name, field.text().await?);
        }
    }
    Ok((fields, image))
}

#[utoipa::path(
    put,
    path = "/mark-sold/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Listing marked as sold", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Not the seller", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn mark_sold_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MarketError> {
    let id = parse_product_id(&id)?;
    state.products.mark_sold(id, caller.username()).await?;
    Ok(MessageResponse::new("Marked as sold"))
}

#[utoipa::path(
    delete,
    path = "/delete-product/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Listing removed", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Not the seller", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MarketError> {
    let id = parse_product_id(&id)?;
    state.products.delete(id, caller.username()).await?;
    Ok(MessageResponse::new("Deleted"))
}

#[utoipa::path(
    put,
    path = "/update-product/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Listing updated", body = UpdateProductResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Not the seller", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    request: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Response, MarketError> {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, "{\"name\",\"price\",\"description\"}").into_response()),
    };
    let id = parse_product_id(&id)?;
    let product = state.products.update(id, &patch, caller.username()).await?;
    Ok(Json(UpdateProductResponse {
        message: "Product updated successfully".to_string(),
        product,
    })
    .into_response())
}
