//! Product storage collaborator.
//!
//! The import pipeline persists records through the [`ProductStore`] trait;
//! each `create_product` call may fail independently and the orchestrator
//! converts failures into itemized report errors. `MemoryProductStore` is
//! the in-process implementation backing the service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;
use validator::Validate;

use hoc_models::{NewProduct, Product};
use hoc_utils::{HocError, HocResult};

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> HocResult<Product>;
    async fn get_product(&self, id: i32) -> HocResult<Option<Product>>;
    async fn list_products(&self) -> HocResult<Vec<Product>>;
}

/// In-memory product store with serial ids and a unique product-code
/// constraint. Uniqueness is enforced at creation time only; two concurrent
/// imports are not otherwise coordinated.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: RwLock<HashMap<i32, Product>>,
    next_id: AtomicI32,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create_product(&self, product: NewProduct) -> HocResult<Product> {
        if let Err(errors) = product.validate() {
            return Err(HocError::validation("product", errors.to_string()));
        }

        let mut products = self.products.write().await;
        if products
            .values()
            .any(|existing| existing.product_code == product.product_code)
        {
            return Err(HocError::conflict(format!(
                "product code {} already exists",
                product.product_code
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let persisted = product.into_product(id);
        products.insert(id, persisted.clone());
        Ok(persisted)
    }

    async fn get_product(&self, id: i32) -> HocResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list_products(&self) -> HocResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by_key(|product| product.id);
        Ok(all)
    }
}
