//! Persistence for accounts and listings.
//!
//! Services only see [`MarketStore`]; the backend is chosen at startup from
//! `STORE_BACKEND`.

pub mod memory;
pub mod postgres;
pub mod uploads;

use crate::domain::model::{Product, ProductPatch, ProductQuery, ProductStatus, ProfileCascade, User};
use crate::domain::MarketResult;
use crate::infra::config::{AppConfig, StoreBackend};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use uploads::UploadStore;

/// Users and Products collections.
///
/// Listing reads return newest-first. Single-record writes are atomic;
/// [`MarketStore::update_profile_cascade`] is atomic across both collections.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Cheap reachability check used by the health probe.
    async fn ping(&self) -> MarketResult<()>;

    async fn find_user(&self, username: &str) -> MarketResult<Option<User>>;

    /// Fails with `UsernameTaken` if the username already exists.
    async fn insert_user(&self, user: User) -> MarketResult<()>;

    /// Sets mobile/branch on the user and rewrites `contact_phone` on every
    /// product whose `seller_name` is `username`. Returns `None` when no such
    /// user exists, in which case nothing is written.
    async fn update_profile_cascade(
        &self,
        username: &str,
        mobile: &str,
        branch: &str,
    ) -> MarketResult<Option<ProfileCascade>>;

    async fn insert_product(&self, product: Product) -> MarketResult<()>;

    async fn find_product(&self, id: Uuid) -> MarketResult<Option<Product>>;

    /// Active products matching the query, newest-first.
    async fn list_active(&self, query: &ProductQuery) -> MarketResult<Vec<Product>>;

    /// Every product (any status) listed by `seller`, newest-first.
    async fn list_by_seller(&self, seller: &str) -> MarketResult<Vec<Product>>;

    /// Returns false when the product does not exist.
    async fn set_status(&self, id: Uuid, status: ProductStatus) -> MarketResult<bool>;

    async fn update_product(&self, id: Uuid, patch: &ProductPatch)
        -> MarketResult<Option<Product>>;

    /// Returns false when the product does not exist.
    async fn delete_product(&self, id: Uuid) -> MarketResult<bool>;
}

/// Builds the store selected by configuration, preparing its schema.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn MarketStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let store =
                PostgresStore::connect(config.database_url()?, config.db_max_connections).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
