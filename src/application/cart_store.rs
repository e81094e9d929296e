use super::registry::Registry;
use crate::domain::cart::{Cart, CartSnapshot};
use crate::domain::catalog::Catalog;
use crate::domain::{ProductId, UserId};
use crate::error::Result;
use std::sync::Arc;

/// Per-user carts. Nothing here is persisted.
pub struct CartStore {
    catalog: Arc<Catalog>,
    carts: Registry<Cart>,
}

impl CartStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            carts: Registry::new(),
        }
    }

    /// Adds one unit of a catalog product and returns the new quantity.
    pub async fn increment(&self, user: UserId, product_id: ProductId) -> Result<u32> {
        self.catalog.lookup(product_id)?;
        let mut cart = self.carts.lock(user).await;
        Ok(cart.add(product_id))
    }

    /// Removes one unit and returns what is left. Products not in the cart are ignored.
    pub async fn decrement(&self, user: UserId, product_id: ProductId) -> u32 {
        match self.carts.get(user).await {
            Some(slot) => slot.lock().await.remove_one(product_id),
            None => 0,
        }
    }

    /// Empties the cart. The user keeps an (empty) entry.
    pub async fn clear(&self, user: UserId) {
        self.carts.lock(user).await.clear();
    }

    pub async fn snapshot(&self, user: UserId) -> CartSnapshot {
        match self.carts.get(user).await {
            Some(slot) => slot.lock().await.snapshot(),
            None => CartSnapshot::default(),
        }
    }

    pub async fn quantity(&self, user: UserId, product_id: ProductId) -> u32 {
        match self.carts.get(user).await {
            Some(slot) => slot.lock().await.quantity(product_id),
            None => 0,
        }
    }

    pub async fn total(&self, user: UserId) -> u64 {
        self.snapshot(user).await.total(&self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use crate::error::BotError;

    fn store() -> CartStore {
        let catalog = Catalog::from_products(vec![
            Product {
                id: 1,
                name: "Non".to_string(),
                description: String::new(),
                price: 10000,
                image: None,
            },
            Product {
                id: 2,
                name: "Choy".to_string(),
                description: String::new(),
                price: 5000,
                image: None,
            },
        ]);
        CartStore::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_increment_unknown_product() {
        let carts = store();
        assert!(matches!(
            carts.increment(1, 99).await,
            Err(BotError::UnknownProduct(99))
        ));
        assert!(carts.snapshot(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_increment_decrement_total() {
        let carts = store();
        carts.increment(1, 1).await.unwrap();
        carts.increment(1, 1).await.unwrap();
        carts.increment(1, 2).await.unwrap();
        assert_eq!(carts.total(1).await, 25000);

        assert_eq!(carts.decrement(1, 2).await, 0);
        assert_eq!(carts.quantity(1, 2).await, 0);
        assert_eq!(carts.total(1).await, 20000);
    }

    #[tokio::test]
    async fn test_decrement_absent_is_noop() {
        let carts = store();
        assert_eq!(carts.decrement(1, 1).await, 0);
        carts.increment(1, 2).await.unwrap();
        assert_eq!(carts.decrement(1, 1).await, 0);

        let snapshot = carts.snapshot(1).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.quantity(1), 0);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let carts = store();
        carts.increment(1, 1).await.unwrap();
        carts.increment(2, 2).await.unwrap();
        carts.clear(1).await;

        assert!(carts.snapshot(1).await.is_empty());
        assert_eq!(carts.total(2).await, 5000);
        assert_eq!(carts.total(3).await, 0);
    }
}
