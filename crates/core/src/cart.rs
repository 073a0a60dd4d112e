//! Shopping cart and its persistent store.
//!
//! [`CartStore`] is the only way to change a cart. Every successful mutation is
//! written to [`Storage`] under [`keys::CART`] before the call returns; a write
//! that fails leaves the in-memory cart untouched.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Product};
use crate::pricing::{self, Totals};
use crate::storage::{Storage, StorageError, keys};
use crate::types::{Price, ProductId};

/// One product in the cart.
///
/// `name`, `price` and `image` are copied from the catalog when the line is
/// created, so later catalog changes do not reprice an existing cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: NonZeroU32,
    pub image: String,
}

impl CartLine {
    fn snapshot(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: NonZeroU32::MIN,
            image: product.image.clone(),
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.get())
    }
}

/// Rejected cart payload.
#[derive(Debug, thiserror::Error)]
#[error("cart contains more than one line for product {0}")]
pub struct DuplicateLine(pub ProductId);

/// Ordered cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = DuplicateLine;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if !seen.insert(line.id) {
                return Err(DuplicateLine(line.id));
            }
        }
        Ok(Self { lines })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The line for `id`, if the product is in the cart.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Fresh totals for the current lines.
    #[must_use]
    pub fn totals(&self) -> Totals {
        pricing::price_lines(&self.lines)
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }
}

/// A cart bound to the storage it is persisted in.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: Storage> CartStore<S> {
    /// Restore the cart from `storage`.
    ///
    /// A missing, empty or unreadable value yields an empty cart. Nothing is
    /// written back until the first mutation.
    pub fn load(storage: S) -> Self {
        let cart = storage
            .get_item(keys::CART)
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => Some(cart),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable stored cart");
                    None
                }
            })
            .unwrap_or_default();

        Self { storage, cart }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give back the storage, e.g. to flush its changes elsewhere.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Add one unit of `product_id`.
    ///
    /// Returns the catalog product that was added, or `None` when the id is
    /// not in the catalog (in which case nothing changes).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the updated cart cannot be persisted.
    pub fn add_item<'c>(
        &mut self,
        catalog: &'c Catalog,
        product_id: ProductId,
    ) -> Result<Option<&'c Product>, StorageError> {
        let Some(product) = catalog.get(product_id) else {
            tracing::debug!(%product_id, "Ignoring add of unknown product");
            return Ok(None);
        };

        let mut lines = self.cart.lines.clone();
        match lines.iter_mut().find(|line| line.id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => lines.push(CartLine::snapshot(product)),
        }
        self.commit(lines)?;

        Ok(Some(product))
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the updated cart cannot be persisted.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<bool, StorageError> {
        let Some(index) = self.cart.position(product_id) else {
            return Ok(false);
        };

        let mut lines = self.cart.lines.clone();
        lines.remove(index);
        self.commit(lines)?;
        Ok(true)
    }

    /// Overwrite the quantity of the line for `product_id`.
    ///
    /// A quantity below one removes the line. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the updated cart cannot be persisted.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        new_quantity: i64,
    ) -> Result<(), StorageError> {
        let Some(quantity) = u32::try_from(new_quantity.max(0))
            .ok()
            .or(Some(u32::MAX))
            .and_then(NonZeroU32::new)
        else {
            self.remove_item(product_id)?;
            return Ok(());
        };

        let Some(index) = self.cart.position(product_id) else {
            return Ok(());
        };

        let mut lines = self.cart.lines.clone();
        if let Some(line) = lines.get_mut(index) {
            line.quantity = quantity;
        }
        self.commit(lines)
    }

    /// Empty the cart unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the empty cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.commit(Vec::new())
    }

    fn commit(&mut self, lines: Vec<CartLine>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&lines).map_err(|source| StorageError::Encode {
            key: keys::CART.to_owned(),
            source,
        })?;
        self.storage.set_item(keys::CART, encoded)?;
        self.cart.lines = lines;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> CartStore<MemoryStorage> {
        CartStore::load(MemoryStorage::new())
    }

    fn id(n: i32) -> ProductId {
        ProductId::new(n)
    }

    fn qty(store: &CartStore<MemoryStorage>, n: i32) -> Option<u32> {
        store.cart().line(id(n)).map(|line| line.quantity.get())
    }

    #[test]
    fn test_add_item_appends_snapshot() {
        let catalog = Catalog::builtin();
        let mut store = store();

        let added = store.add_item(&catalog, id(3)).unwrap().unwrap();
        assert_eq!(added.name, "Mechanical Pencil (0.5mm)");

        assert_eq!(store.lines().len(), 1);
        let line = &store.lines()[0];
        assert_eq!(line.id, id(3));
        assert_eq!(line.price, Price::new(250));
        assert_eq!(line.quantity.get(), 1);
        assert_eq!(line.image, "images/mechanical pencil.jpeg");
    }

    #[test]
    fn test_repeated_adds_increment_single_line() {
        let catalog = Catalog::builtin();
        let mut store = store();

        for _ in 0..5 {
            store.add_item(&catalog, id(2)).unwrap();
        }

        assert_eq!(store.lines().len(), 1);
        assert_eq!(qty(&store, 2), Some(5));
        assert_eq!(store.item_count(), 5);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(5)).unwrap();
        store.add_item(&catalog, id(1)).unwrap();
        store.add_item(&catalog, id(5)).unwrap();

        let ids: Vec<_> = store.lines().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![5, 1]);
    }

    #[test]
    fn test_add_unknown_product_is_ignored() {
        let catalog = Catalog::builtin();
        let mut store = store();

        assert!(store.add_item(&catalog, id(42)).unwrap().is_none());
        assert!(store.is_empty());
        assert_eq!(store.storage().changes().count(), 0);
    }

    #[test]
    fn test_snapshot_survives_catalog_price_change() {
        let mut store = store();
        let original = Catalog::builtin();
        store.add_item(&original, id(1)).unwrap();

        let mut repriced = original.products().to_vec();
        repriced[0].price = Price::new(999);
        let repriced = Catalog::new(repriced).unwrap();
        store.add_item(&repriced, id(1)).unwrap();

        let line = store.cart().line(id(1)).unwrap();
        assert_eq!(line.price, Price::new(400));
        assert_eq!(line.quantity.get(), 2);
    }

    #[test]
    fn test_remove_absent_item_leaves_cart_unchanged() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(1)).unwrap();
        store.add_item(&catalog, id(2)).unwrap();
        let before = store.cart().clone();

        assert!(!store.remove_item(id(7)).unwrap());
        assert_eq!(store.cart(), &before);
        assert_eq!(store.lines().len(), 2);
    }

    #[test]
    fn test_remove_item() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(1)).unwrap();
        store.add_item(&catalog, id(2)).unwrap();

        assert!(store.remove_item(id(1)).unwrap());
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].id, id(2));
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(4)).unwrap();

        store.set_quantity(id(4), 7).unwrap();
        assert_eq!(qty(&store, 4), Some(7));
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let catalog = Catalog::builtin();
        for requested in [0, -1, -100] {
            let mut via_set = store();
            via_set.add_item(&catalog, id(4)).unwrap();
            via_set.add_item(&catalog, id(6)).unwrap();
            let mut via_remove = store();
            via_remove.add_item(&catalog, id(4)).unwrap();
            via_remove.add_item(&catalog, id(6)).unwrap();

            via_set.set_quantity(id(4), requested).unwrap();
            via_remove.remove_item(id(4)).unwrap();

            assert_eq!(via_set.cart(), via_remove.cart());
            assert_eq!(via_set.storage(), via_remove.storage());
        }
    }

    #[test]
    fn test_set_quantity_unknown_id_is_ignored() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(1)).unwrap();
        let before = store.cart().clone();

        store.set_quantity(id(8), 3).unwrap();
        assert_eq!(store.cart(), &before);
    }

    #[test]
    fn test_set_quantity_huge_value_saturates() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(1)).unwrap();

        store.set_quantity(id(1), i64::MAX).unwrap();
        assert_eq!(qty(&store, 1), Some(u32::MAX));
    }

    #[test]
    fn test_clear() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(1)).unwrap();
        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(store.storage().get_item(keys::CART).as_deref(), Some("[]"));
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(3)).unwrap();
        store.add_item(&catalog, id(7)).unwrap();
        store.set_quantity(id(3), 4).unwrap();

        let reloaded = CartStore::load(store.storage().clone());
        assert_eq!(reloaded.cart(), store.cart());
    }

    #[test]
    fn test_load_missing_empty_or_malformed_is_empty() {
        let mut empty_value = MemoryStorage::new();
        empty_value.preload(keys::CART, "");

        let mut garbage = MemoryStorage::new();
        garbage.preload(keys::CART, "{not json");

        let mut zero_quantity = MemoryStorage::new();
        zero_quantity.preload(
            keys::CART,
            r#"[{"id":1,"name":"A","price":10,"quantity":0,"image":""}]"#,
        );

        let mut duplicate = MemoryStorage::new();
        duplicate.preload(
            keys::CART,
            r#"[{"id":1,"name":"A","price":10,"quantity":1,"image":""},
                {"id":1,"name":"A","price":10,"quantity":2,"image":""}]"#,
        );

        for storage in [MemoryStorage::new(), empty_value, garbage, zero_quantity, duplicate] {
            assert!(CartStore::load(storage).is_empty());
        }
    }

    #[test]
    fn test_stored_format_is_json_array_of_lines() {
        let catalog = Catalog::builtin();
        let mut store = store();
        store.add_item(&catalog, id(3)).unwrap();

        let raw = store.storage().get_item(keys::CART).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": 3,
                "name": "Mechanical Pencil (0.5mm)",
                "price": 250,
                "quantity": 1,
                "image": "images/mechanical pencil.jpeg"
            }])
        );
    }

    #[test]
    fn test_failed_write_leaves_cart_untouched() {
        let catalog = Catalog::builtin();
        let mut store = CartStore::load(MemoryStorage::with_quota(8));

        assert!(store.add_item(&catalog, id(1)).is_err());
        assert!(store.is_empty());
    }
}
