//! Typed REST client for the marketplace server.

use crate::domain::model::{Product, ProductPatch};
use crate::transport::http::types::{
    ErrorResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    UpdateProductResponse, UpdateProfileRequest, UpdateProfileResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("Server Connection Failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fields of the sell form. Seller name and contact phone come from the session.
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub image: Option<ImageFile>,
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        send(self.http.post(self.url("/register")).json(request)).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        send(self.http.post(self.url("/login")).json(request)).await
    }

    pub async fn products(&self, search: &str, category: &str) -> Result<Vec<Product>, ApiError> {
        send(
            self.http
                .get(self.url("/products"))
                .query(&[("search", search), ("category", category)]),
        )
        .await
    }

    pub async fn my_ads(&self, username: &str) -> Result<Vec<Product>, ApiError> {
        send(self.http.get(self.url("/my-ads")).query(&[("username", username)])).await
    }

    pub async fn add_product(
        &self,
        token: &str,
        seller_name: &str,
        contact_phone: &str,
        form: &ListingForm,
    ) -> Result<MessageResponse, ApiError> {
        let mut body = Form::new()
            .text("name", form.name.clone())
            .text("price", form.price.to_string())
            .text("category", form.category.clone())
            .text("description", form.description.clone())
            .text("contactPhone", contact_phone.to_string())
            .text("sellerName", seller_name.to_string());
        if let Some(image) = &form.image {
            body = body.part(
                "image",
                Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
            );
        }
        send(
            self.http
                .post(self.url("/add-product"))
                .bearer_auth(token)
                .multipart(body),
        )
        .await
    }

    pub async fn mark_sold(&self, token: &str, id: Uuid) -> Result<MessageResponse, ApiError> {
        send(
            self.http
                .put(self.url(&format!("/mark-sold/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn delete_product(&self, token: &str, id: Uuid) -> Result<MessageResponse, ApiError> {
        send(
            self.http
                .delete(self.url(&format!("/delete-product/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: Uuid,
        patch: &ProductPatch,
    ) -> Result<UpdateProductResponse, ApiError> {
        send(
            self.http
                .put(self.url(&format!("/update-product/{}", id)))
                .bearer_auth(token)
                .json(patch),
        )
        .await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> Result<UpdateProfileResponse, ApiError> {
        send(
            self.http
                .put(self.url("/update-profile"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    decode(request.send().await?).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
