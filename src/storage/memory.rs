//! In-process store. Used by the test suite and by `STORE_BACKEND=memory`.

use crate::domain::model::{
    Product, ProductPatch, ProductQuery, ProductStatus, ProfileCascade, User,
};
use crate::domain::{MarketError, MarketResult};
use crate::storage::MarketStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    users: HashMap<String, User>,
    /// Insertion order; newest-first reads walk it backwards.
    products: Vec<Product>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest-first, with later inserts winning timestamp ties.
fn newest_first<'a>(products: impl DoubleEndedIterator<Item = &'a Product>) -> Vec<Product> {
    let mut out: Vec<Product> = products.rev().cloned().collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn ping(&self) -> MarketResult<()> {
        Ok(())
    }

    async fn find_user(&self, username: &str) -> MarketResult<Option<User>> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn insert_user(&self, user: User) -> MarketResult<()> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.username) {
            return Err(MarketError::UsernameTaken);
        }
        inner.users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn update_profile_cascade(
        &self,
        username: &str,
        mobile: &str,
        branch: &str,
    ) -> MarketResult<Option<ProfileCascade>> {
        // One write guard covers both collections.
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(username) else {
            return Ok(None);
        };
        user.mobile = mobile.to_string();
        user.branch = branch.to_string();
        let user = user.clone();

        let mut products_updated = 0;
        for product in inner.products.iter_mut().filter(|p| p.seller_name == username) {
            product.contact_phone = mobile.to_string();
            products_updated += 1;
        }
        Ok(Some(ProfileCascade { user, products_updated }))
    }

    async fn insert_product(&self, product: Product) -> MarketResult<()> {
        self.inner.write().await.products.push(product);
        Ok(())
    }

    async fn find_product(&self, id: Uuid) -> MarketResult<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_active(&self, query: &ProductQuery) -> MarketResult<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(newest_first(
            inner
                .products
                .iter()
                .filter(|p| p.status == ProductStatus::Active && query.matches(p)),
        ))
    }

    async fn list_by_seller(&self, seller: &str) -> MarketResult<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(newest_first(
            inner.products.iter().filter(|p| p.seller_name == seller),
        ))
    }

    async fn set_status(&self, id: Uuid, status: ProductStatus) -> MarketResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: &ProductPatch,
    ) -> MarketResult<Option<Product>> {
        let mut inner = self.inner.write().await;
        Ok(inner.products.iter_mut().find(|p| p.id == id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: Uuid) -> MarketResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() != before)
    }
}
