//! Shared harness: runs the router in-process on an ephemeral port.

#![allow(dead_code)]

use async_trait::async_trait;
use campus_market::crypto::TokenSigner;
use campus_market::domain::model::{
    Product, ProductPatch, ProductQuery, ProductStatus, ProfileCascade, User,
};
use campus_market::{
    create_router, AppState, MarketError, MarketResult, MarketStore, MemoryStore, UploadStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub uploads: TempDir,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub fn signer() -> TokenSigner {
    TokenSigner::new(SECRET, chrono::Duration::hours(1))
}

pub async fn spawn_app() -> TestApp {
    spawn_with_store(Arc::new(MemoryStore::new())).await
}

pub async fn spawn_with_store(store: Arc<dyn MarketStore>) -> TestApp {
    spawn_configured(store, |_| {}).await
}

/// Like [`spawn_with_store`], with a hook to adjust the state first.
pub async fn spawn_configured<F>(store: Arc<dyn MarketStore>, configure: F) -> TestApp
where
    F: FnOnce(&mut AppState),
{
    let uploads = tempfile::tempdir().expect("tempdir");
    let upload_store = UploadStore::prepare(uploads.path())
        .await
        .expect("upload dir");
    let mut state = AppState::new(store, upload_store, signer());
    configure(&mut state);
    let router = create_router(state);

    // Bind to an ephemeral port to avoid conflicts with a running server.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        uploads,
        server,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, username: &str, mobile: &str) -> reqwest::Response {
        self.client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "password": "hunter22",
                "branch": "Computer",
                "mobile": mobile,
            }))
            .send()
            .await
            .expect("register request")
    }

    /// Registers and logs in; returns the bearer token.
    pub async fn signup(&self, username: &str, mobile: &str) -> String {
        let res = self.register(username, mobile).await;
        assert_eq!(res.status(), 200, "register {}", username);
        let body: Value = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": "hunter22" }))
            .send()
            .await
            .expect("login request")
            .json()
            .await
            .expect("login body");
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn add_product(
        &self,
        token: &str,
        seller: &str,
        name: &str,
        category: &str,
    ) -> reqwest::Response {
        let form = reqwest::multipart::Form::new()
            .text("name", name.to_string())
            .text("price", "499")
            .text("category", category.to_string())
            .text("description", format!("{} in good condition", name))
            .text("contactPhone", "")
            .text("sellerName", seller.to_string());
        self.client
            .post(self.url("/add-product"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("add-product request")
    }

    pub async fn products(&self, query: &[(&str, &str)]) -> Vec<Value> {
        self.client
            .get(self.url("/products"))
            .query(query)
            .send()
            .await
            .expect("products request")
            .json()
            .await
            .expect("products body")
    }

    pub async fn my_ads(&self, username: &str) -> Vec<Value> {
        self.client
            .get(self.url("/my-ads"))
            .query(&[("username", username)])
            .send()
            .await
            .expect("my-ads request")
            .json()
            .await
            .expect("my-ads body")
    }
}

pub fn names(products: &[Value]) -> Vec<String> {
    products
        .iter()
        .map(|p| p["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn id_of(products: &[Value], name: &str) -> String {
    products
        .iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["_id"].as_str())
        .unwrap_or_else(|| panic!("no product named {}", name))
        .to_string()
}

/// A store whose backend is gone: every call fails.
pub struct UnreachableStore;

fn backend_gone() -> MarketError {
    MarketError::Internal(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl MarketStore for UnreachableStore {
    async fn ping(&self) -> MarketResult<()> {
        Err(backend_gone())
    }
    async fn find_user(&self, _: &str) -> MarketResult<Option<User>> {
        Err(backend_gone())
    }
    async fn insert_user(&self, _: User) -> MarketResult<()> {
        Err(backend_gone())
    }
    async fn update_profile_cascade(
        &self,
        _: &str,
        _: &str,
        _: &str,
    ) -> MarketResult<Option<ProfileCascade>> {
        Err(backend_gone())
    }
    async fn insert_product(&self, _: Product) -> MarketResult<()> {
        Err(backend_gone())
    }
    async fn find_product(&self, _: Uuid) -> MarketResult<Option<Product>> {
        Err(backend_gone())
    }
    async fn list_active(&self, _: &ProductQuery) -> MarketResult<Vec<Product>> {
        Err(backend_gone())
    }
    async fn list_by_seller(&self, _: &str) -> MarketResult<Vec<Product>> {
        Err(backend_gone())
    }
    async fn set_status(&self, _: Uuid, _: ProductStatus) -> MarketResult<bool> {
        Err(backend_gone())
    }
    async fn update_product(&self, _: Uuid, _: &ProductPatch) -> MarketResult<Option<Product>> {
        Err(backend_gone())
    }
    async fn delete_product(&self, _: Uuid) -> MarketResult<bool> {
        Err(backend_gone())
    }
}
