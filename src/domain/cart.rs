use super::ProductId;
use super::catalog::Catalog;
use std::collections::BTreeMap;

/// A user's shopping selection: product id to a strictly positive quantity.
///
/// Entries are removed as soon as their quantity would reach zero, so the cart
/// never holds zero or negative rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: BTreeMap<ProductId, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit and returns the new quantity.
    pub fn add(&mut self, product_id: ProductId) -> u32 {
        let quantity = self.items.entry(product_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    /// Removes one unit and returns the remaining quantity (0 if the entry is gone).
    /// Absent products are left alone.
    pub fn remove_one(&mut self, product_id: ProductId) -> u32 {
        let Some(quantity) = self.items.get_mut(&product_id) else {
            return 0;
        };
        *quantity -= 1;
        if *quantity == 0 {
            self.items.remove(&product_id);
            0
        } else {
            *quantity
        }
    }

    pub fn quantity(&self, product_id: ProductId) -> u32 {
        self.items.get(&product_id).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
        }
    }
}

/// Owned, read-only copy of a cart used for rendering and committing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    items: BTreeMap<ProductId, u32>,
}

impl CartSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.items.iter().map(|(&id, &quantity)| (id, quantity))
    }

    pub fn quantity(&self, product_id: ProductId) -> u32 {
        self.items.get(&product_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of `price * quantity` over the entries that resolve in `catalog`,
    /// saturating at `u64::MAX`.
    pub fn total(&self, catalog: &Catalog) -> u64 {
        self.iter()
            .filter_map(|(id, quantity)| {
                catalog
                    .lookup(id)
                    .ok()
                    .map(|product| product.price.saturating_mul(u64::from(quantity)))
            })
            .fold(0, u64::saturating_add)
    }
}

impl FromIterator<(ProductId, u32)> for CartSnapshot {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().filter(|&(_, quantity)| quantity > 0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
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
        ])
    }

    #[test]
    fn test_add_accumulates() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(1), 1);
        assert_eq!(cart.add(1), 2);
        assert_eq!(cart.quantity(1), 2);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_one_drops_entry_at_zero() {
        let mut cart = Cart::new();
        cart.add(1);
        cart.add(1);
        assert_eq!(cart.remove_one(1), 1);
        assert_eq!(cart.remove_one(1), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.quantity(1), 0);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(2);
        assert_eq!(cart.remove_one(1), 0);
        assert_eq!(cart.len(), 1);
        assert!(!cart.snapshot().iter().any(|(id, _)| id == 1));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut cart = Cart::new();
        cart.add(1);
        let snapshot = cart.snapshot();
        cart.add(1);
        cart.clear();
        assert_eq!(snapshot.quantity(1), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total() {
        let catalog = catalog();
        let mut cart = Cart::new();
        assert_eq!(cart.snapshot().total(&catalog), 0);

        cart.add(1);
        cart.add(1);
        cart.add(2);
        assert_eq!(cart.snapshot().total(&catalog), 25000);
    }

    #[test]
    fn test_total_saturates() {
        let catalog = Catalog::from_products(vec![Product {
            id: 1,
            name: "Gold".to_string(),
            description: String::new(),
            price: u64::MAX,
            image: None,
        }]);
        let mut cart = Cart::new();
        cart.add(1);
        assert_eq!(cart.snapshot().total(&catalog), u64::MAX);
        cart.add(1);
        assert_eq!(cart.snapshot().total(&catalog), u64::MAX);
    }

    #[test]
    fn test_snapshot_from_iter_skips_zero_rows() {
        let snapshot: CartSnapshot = vec![(1, 0), (2, 3)].into_iter().collect();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.quantity(2), 3);
    }
}
