//! Persistent shopping cart.
//!
//! [`CartStore`] is a cloneable handle onto a single [`CartState`]. Every
//! mutation is applied in memory and then written through the
//! [`KeyValueStore`] under [`keys::CART`]. Opening a store rehydrates the
//! last persisted list.
//!
//! Store operations never fail: a storage error is logged and the in-memory
//! state stays authoritative for the rest of the process.

mod state;

pub use state::{CartItem, CartState};

use std::sync::{Arc, PoisonError, RwLock};

use handyhub_core::{CategorySummary, Price, ServiceId, ServiceSummary};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, keys};

/// Shared cart handle.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: RwLock<CartState>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart persisted in `storage`, or an empty one.
    ///
    /// An unreadable or unparseable cart is discarded with a warning; a
    /// cart with duplicate or zero-quantity lines is repaired and rewritten.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut state = match storage.get(keys::CART) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable persisted cart");
                CartState::new()
            }),
            Ok(None) => CartState::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart");
                CartState::new()
            }
        };

        let repaired = state.normalize();
        debug!(items = state.items().len(), "Cart rehydrated");

        let store = Self {
            inner: Arc::new(CartStoreInner {
                state: RwLock::new(state),
                storage,
            }),
        };
        if repaired {
            warn!("Persisted cart had duplicate or empty lines; repaired");
            store.mutate(|_| true);
        }
        store
    }

    /// Apply `f` to the state and persist the result if it reports a change.
    fn mutate(&self, f: impl FnOnce(&mut CartState) -> bool) {
        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if f(&mut state) {
            self.persist(&state);
        }
    }

    fn persist(&self, state: &CartState) {
        let result = serde_json::to_string(state)
            .map_err(crate::storage::StorageError::from)
            .and_then(|raw| self.inner.storage.set(keys::CART, &raw));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&CartState) -> T) -> T {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    /// Add one unit of `service`, merging with an existing line.
    pub fn add_item(&self, service: ServiceSummary, category: CategorySummary) {
        debug!(service_id = %service.id, "Adding service to cart");
        self.mutate(|state| {
            state.add_item(service, category);
            true
        });
    }

    /// Remove the line for `service_id`; absent ids are ignored.
    pub fn remove_item(&self, service_id: &ServiceId) {
        self.mutate(|state| state.remove_item(service_id));
    }

    /// Remove the lines for every id in `service_ids` with a single write.
    pub fn remove_items(&self, service_ids: &[ServiceId]) {
        self.mutate(|state| {
            service_ids
                .iter()
                .fold(false, |changed, id| state.remove_item(id) || changed)
        });
    }

    /// Set a line's quantity; zero or negative removes the line.
    pub fn update_quantity(&self, service_id: &ServiceId, quantity: i64) {
        self.mutate(|state| state.update_quantity(service_id, quantity));
    }

    /// Set the customer's notes for a line; absent ids are ignored.
    pub fn update_issue_description(&self, service_id: &ServiceId, text: &str) {
        self.mutate(|state| state.update_issue_description(service_id, text));
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        self.mutate(|state| {
            state.clear();
            true
        });
    }

    /// Sum of quantities (not distinct lines).
    #[must_use]
    pub fn get_item_count(&self) -> u64 {
        self.read(CartState::item_count)
    }

    /// Sum of priced line totals.
    #[must_use]
    pub fn get_total_price(&self) -> Decimal {
        self.read(CartState::total_price)
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.read(CartState::subtotal)
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.read(|state| state.items().to_vec())
    }

    #[must_use]
    pub fn item(&self, service_id: &ServiceId) -> Option<CartItem> {
        self.read(|state| state.item(service_id).cloned())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(CartState::is_empty)
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.read(Clone::clone)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn tap_repair() -> ServiceSummary {
        ServiceSummary::new("svc1", "Tap repair", Some(Decimal::from(139)))
    }

    fn plumbing() -> CategorySummary {
        CategorySummary::new("cat1", "Plumbing")
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    #[test]
    fn test_mutations_are_persisted() {
        let disk = MemoryStore::new();
        let cart = CartStore::open(Arc::new(disk.clone()));

        cart.add_item(tap_repair(), plumbing());
        let raw = disk.get(keys::CART).unwrap().unwrap();
        let persisted: CartState = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, cart.snapshot());

        cart.clear_cart();
        let raw = disk.get(keys::CART).unwrap().unwrap();
        let persisted: CartState = serde_json::from_str(&raw).unwrap();
        assert!(persisted.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let cart = CartStore::open(Arc::new(MemoryStore::new()));
        let other = cart.clone();

        cart.add_item(tap_repair(), plumbing());
        other.add_item(tap_repair(), plumbing());

        assert_eq!(cart.get_item_count(), 2);
        assert_eq!(cart.get_total_price(), Decimal::from(278));
    }

    #[test]
    fn test_remove_items_keeps_other_lines() {
        let disk = MemoryStore::new();
        let cart = CartStore::open(Arc::new(disk.clone()));
        cart.add_item(tap_repair(), plumbing());
        cart.add_item(
            ServiceSummary::new("svc2", "Drain cleaning", Some(Decimal::from(299))),
            plumbing(),
        );

        cart.remove_items(&["svc1".into(), "missing".into()]);

        assert_eq!(cart.items().len(), 1);
        assert!(cart.item(&"svc2".into()).is_some());
        let persisted: CartState =
            serde_json::from_str(&disk.get(keys::CART).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, cart.snapshot());
    }

    #[test]
    fn test_rehydrated_duplicates_are_merged_and_rewritten() {
        let disk = MemoryStore::new();
        let line = serde_json::json!({
            "service": {"_id": "svc1", "name": "Tap repair", "basePrice": "139"},
            "category": {"_id": "cat1", "name": "Plumbing"},
            "quantity": 1
        });
        let mut empty_line = line.clone();
        empty_line["service"]["_id"] = "svc9".into();
        empty_line["quantity"] = 0.into();
        let raw = serde_json::json!({"items": [line.clone(), empty_line, line]});
        disk.set(keys::CART, &raw.to_string()).unwrap();

        let cart = CartStore::open(Arc::new(disk.clone()));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get_item_count(), 2);
        let persisted: CartState =
            serde_json::from_str(&disk.get(keys::CART).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, cart.snapshot());
    }

    #[test]
    fn test_corrupt_cart_rehydrates_empty() {
        let disk = MemoryStore::new();
        disk.set(keys::CART, "{not json").unwrap();

        let cart = CartStore::open(Arc::new(disk));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_storage_failures_never_surface() {
        let cart = CartStore::open(Arc::new(FailingStore));

        cart.add_item(tap_repair(), plumbing());
        cart.update_quantity(&"svc1".into(), 4);
        cart.update_issue_description(&"svc1".into(), "Bathroom");

        assert_eq!(cart.get_item_count(), 4);
        assert_eq!(
            cart.item(&"svc1".into())
                .and_then(|i| i.issue_description),
            Some("Bathroom".to_string())
        );
    }
}
