//! Listing lifecycle: create, browse, edit, mark sold, delete.

use crate::domain::model::{
    NewProduct, Product, ProductPatch, ProductQuery, ProductStatus, PLACEHOLDER_IMAGE_URL,
};
use crate::domain::{MarketError, MarketResult};
use crate::storage::uploads::public_url;
use crate::storage::{MarketStore, UploadStore};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Image bytes received with a listing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Listing fields as submitted, before the image is resolved.
#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    /// Falls back to the seller's registered mobile when blank.
    pub contact_phone: String,
    pub seller_name: String,
}

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn MarketStore>,
    uploads: UploadStore,
}

impl ProductService {
    pub fn new(store: Arc<dyn MarketStore>, uploads: UploadStore) -> Self {
        Self { store, uploads }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub async fn list(&self, query: &ProductQuery) -> MarketResult<Vec<Product>> {
        self.store.list_active(query).await
    }

    pub async fn my_ads(&self, username: &str) -> MarketResult<Vec<Product>> {
        self.store.list_by_seller(username.trim()).await
    }

    /// Stores the image (if any) first, then the listing. `base_url` is the
    /// public origin used to build the image URL.
    pub async fn create(
        &self,
        draft: ListingDraft,
        image: Option<ImageUpload>,
        base_url: &str,
    ) -> MarketResult<Product> {
        let contact_phone = if draft.contact_phone.trim().is_empty() {
            self.store
                .find_user(&draft.seller_name)
                .await?
                .map(|u| u.mobile)
                .unwrap_or_default()
        } else {
            draft.contact_phone.trim().to_string()
        };

        let mut new_product = NewProduct {
            name: draft.name.trim().to_string(),
            price: draft.price,
            category: draft.category.trim().to_string(),
            description: draft.description,
            contact_phone,
            seller_name: draft.seller_name,
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        };
        new_product.validate()?;

        let stored_file = match image.filter(|i| !i.bytes.is_empty()) {
            Some(image) => {
                let file_name = self.uploads.save(&image.file_name, &image.bytes).await?;
                new_product.image_url = public_url(base_url, &file_name);
                Some(file_name)
            }
            None => None,
        };

        let product = new_product.into_product();
        if let Err(e) = self.store.insert_product(product.clone()).await {
            error!(error = %e, "failed to save listing");
            if let Some(file_name) = stored_file {
                self.uploads.remove(&file_name).await;
            }
            return Err(e);
        }

        info!(id = %product.id, seller = %product.seller_name, "listing created");
        Ok(product)
    }

    /// Idempotent: marking a sold listing sold again succeeds.
    pub async fn mark_sold(&self, id: Uuid, actor: &str) -> MarketResult<()> {
        self.owned_product(id, actor).await?;
        if !self.store.set_status(id, ProductStatus::Sold).await? {
            return Err(MarketError::ProductNotFound);
        }
        info!(%id, "listing marked sold");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid, actor: &str) -> MarketResult<()> {
        self.owned_product(id, actor).await?;
        if !self.store.delete_product(id).await? {
            return Err(MarketError::ProductNotFound);
        }
        info!(%id, "listing deleted");
        Ok(())
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &ProductPatch,
        actor: &str,
    ) -> MarketResult<Product> {
        patch.validate()?;
        self.owned_product(id, actor).await?;
        let product = self
            .store
            .update_product(id, patch)
            .await?
            .ok_or(MarketError::ProductNotFound)?;
        info!(%id, "listing updated");
        Ok(product)
    }

    async fn owned_product(&self, id: Uuid, actor: &str) -> MarketResult<Product> {
        let product = self
            .store
            .find_product(id)
            .await?
            .ok_or(MarketError::ProductNotFound)?;
        if product.seller_name != actor {
            return Err(MarketError::Forbidden(
                "You can only manage your own listings".to_string(),
            ));
        }
        Ok(product)
    }
}
