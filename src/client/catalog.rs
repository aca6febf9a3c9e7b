use crate::domain::model::Product;
use std::collections::HashMap;
use uuid::Uuid;

/// Snapshot of the last fetched feed: grid order plus lookup by id.
/// [`ProductCatalog::replace`] discards everything from the previous fetch.
#[derive(Debug, Default, Clone)]
pub struct ProductCatalog {
    order: Vec<Uuid>,
    by_id: HashMap<Uuid, Product>,
}

impl ProductCatalog {
    pub fn replace(&mut self, products: Vec<Product>) {
        self.order.clear();
        self.by_id.clear();
        for product in products {
            self.order.push(product.id);
            self.by_id.insert(product.id, product);
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Product> {
        self.by_id.get(&id)
    }

    /// Products in grid order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
