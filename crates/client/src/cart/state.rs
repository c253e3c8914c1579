//! Cart line items and the pure state transitions over them.

use handyhub_core::{CategorySummary, Price, ServiceId, ServiceSummary};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A selected service pending checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub service: ServiceSummary,
    pub category: CategorySummary,
    /// Always at least 1.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
}

impl CartItem {
    fn new(service: ServiceSummary, category: CategorySummary) -> Self {
        Self {
            service,
            category,
            quantity: 1,
            issue_description: None,
        }
    }

    /// Line total; zero for services without a base price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.service.base_price.unwrap_or(Decimal::ZERO) * Decimal::from(self.quantity)
    }
}

/// Ordered list of cart lines, at most one per service id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for `service_id`, if present.
    #[must_use]
    pub fn item(&self, service_id: &ServiceId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.service.id == service_id)
    }

    fn item_mut(&mut self, service_id: &ServiceId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.service.id == service_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `service`, merging with an existing line.
    pub fn add_item(&mut self, service: ServiceSummary, category: CategorySummary) {
        if let Some(existing) = self.item_mut(&service.id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem::new(service, category));
        }
    }

    /// Drop the line for `service_id`. Returns whether anything was removed.
    pub fn remove_item(&mut self, service_id: &ServiceId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.service.id != service_id);
        self.items.len() != before
    }

    /// Set a line's quantity; zero or negative removes the line.
    ///
    /// Returns whether the cart changed.
    pub fn update_quantity(&mut self, service_id: &ServiceId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(service_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.item_mut(service_id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Set or clear a line's free-text notes. Blank text clears them.
    ///
    /// Returns whether the cart changed.
    pub fn update_issue_description(&mut self, service_id: &ServiceId, text: &str) -> bool {
        let text = Some(text.trim()).filter(|t| !t.is_empty()).map(str::to_owned);
        match self.item_mut(service_id) {
            Some(item) if item.issue_description != text => {
                item.issue_description = text;
                true
            }
            _ => false,
        }
    }

    /// Restore the one-line-per-service and quantity >= 1 rules on state
    /// read back from storage. Duplicate lines are merged into the first
    /// (quantities summed, first non-empty notes kept) and zero-quantity
    /// lines dropped.
    ///
    /// Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.items.len();
        let mut merged: Vec<CartItem> = Vec::with_capacity(before);
        let mut changed = false;

        for item in self.items.drain(..) {
            if item.quantity == 0 {
                changed = true;
                continue;
            }
            match merged.iter_mut().find(|m| m.service.id == item.service.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                    if existing.issue_description.is_none() {
                        existing.issue_description = item.issue_description;
                    }
                    changed = true;
                }
                None => merged.push(item),
            }
        }

        self.items = merged;
        changed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals. Unpriced services contribute nothing.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total as a displayable [`Price`].
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .filter_map(|item| item.service.price().map(|p| p.times(item.quantity)))
            .fold(Price::zero(), |total, line| total + line)
    }

    /// Whether any line is quoted on inspection.
    #[must_use]
    pub fn has_unpriced_items(&self) -> bool {
        self.items.iter().any(|item| item.service.base_price.is_none())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tap_repair() -> ServiceSummary {
        ServiceSummary::new("svc1", "Tap repair", Some(Decimal::from(139)))
    }

    fn fan_install() -> ServiceSummary {
        ServiceSummary::new("svc2", "Fan installation", Some(Decimal::from(249)))
    }

    fn inspection() -> ServiceSummary {
        ServiceSummary::new("svc3", "Wiring inspection", None)
    }

    fn plumbing() -> CategorySummary {
        CategorySummary::new("cat1", "Plumbing")
    }

    fn electrical() -> CategorySummary {
        CategorySummary::new("cat2", "Electrical")
    }

    #[test]
    fn test_normalize_merges_duplicates_and_drops_empty_lines() {
        let raw = r#"{"items":[
            {"service":{"_id":"svc1","name":"Tap repair","basePrice":"139"},
             "category":{"_id":"cat1","name":"Plumbing"},"quantity":2},
            {"service":{"_id":"svc2","name":"Fan installation","basePrice":"249"},
             "category":{"_id":"cat2","name":"Electrical"},"quantity":0},
            {"service":{"_id":"svc1","name":"Tap repair","basePrice":"139"},
             "category":{"_id":"cat1","name":"Plumbing"},"quantity":3,
             "issueDescription":"Kitchen tap"}
        ]}"#;
        let mut cart: CartState = serde_json::from_str(raw).unwrap();

        assert!(cart.normalize());
        assert_eq!(cart.items().len(), 1);

        let item = cart.item(&"svc1".into()).unwrap();
        assert_eq!(item.quantity, 5);
        assert_eq!(item.issue_description.as_deref(), Some("Kitchen tap"));
        assert_eq!(cart.total_price(), Decimal::from(695));

        assert!(!cart.normalize());
    }

    #[test]
    fn test_add_merges_same_service() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        cart.add_item(tap_repair(), plumbing());

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item(&"svc1".into()).map(|i| i.quantity), Some(2));
        assert_eq!(cart.total_price(), Decimal::from(278));
    }

    #[test]
    fn test_add_keeps_issue_description_on_merge() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        cart.update_issue_description(&"svc1".into(), "Kitchen tap drips");
        cart.add_item(tap_repair(), plumbing());

        let item = cart.item(&"svc1".into());
        assert_eq!(
            item.and_then(|i| i.issue_description.as_deref()),
            Some("Kitchen tap drips")
        );
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        let before = cart.clone();

        assert!(!cart.remove_item(&"missing".into()));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_quantity_floor_removes() {
        for target in [0, -5] {
            let mut cart = CartState::new();
            cart.add_item(tap_repair(), plumbing());
            cart.add_item(fan_install(), electrical());

            let mut expected = cart.clone();
            expected.remove_item(&"svc1".into());

            assert!(cart.update_quantity(&"svc1".into(), target));
            assert_eq!(cart, expected);
        }
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let mut cart = CartState::new();
        assert!(!cart.update_quantity(&"svc1".into(), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_has_no_upper_bound() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        cart.update_quantity(&"svc1".into(), 10_000);
        assert_eq!(cart.item_count(), 10_000);

        cart.update_quantity(&"svc1".into(), i64::MAX);
        assert_eq!(cart.item(&"svc1".into()).map(|i| i.quantity), Some(u32::MAX));
    }

    #[test]
    fn test_unpriced_item_contributes_zero() {
        let mut cart = CartState::new();
        cart.add_item(inspection(), electrical());
        cart.update_quantity(&"svc3".into(), 7);

        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(cart.has_unpriced_items());
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        cart.add_item(fan_install(), electrical());
        cart.update_quantity(&"svc1".into(), 2);
        cart.update_quantity(&"svc2".into(), 3);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_blank_description_clears_notes() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        assert!(cart.update_issue_description(&"svc1".into(), "  leaking  "));
        assert_eq!(
            cart.item(&"svc1".into())
                .and_then(|i| i.issue_description.as_deref()),
            Some("leaking")
        );

        assert!(cart.update_issue_description(&"svc1".into(), "   "));
        assert_eq!(
            cart.item(&"svc1".into()).and_then(|i| i.issue_description.clone()),
            None
        );
        assert!(!cart.update_issue_description(&"nope".into(), "text"));
    }

    #[test]
    fn test_worked_example() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        cart.add_item(tap_repair(), plumbing());
        cart.update_quantity(&"svc1".into(), 5);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_price(), Decimal::from(695));
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal().to_string(), "₹695.00");
    }

    #[test]
    fn test_persisted_shape() {
        let mut cart = CartState::new();
        cart.add_item(tap_repair(), plumbing());
        let json = serde_json::to_value(&cart).unwrap_or_default();

        assert_eq!(json["items"][0]["service"]["_id"], "svc1");
        assert_eq!(json["items"][0]["category"]["name"], "Plumbing");
        assert_eq!(json["items"][0]["quantity"], 1);
        assert!(json["items"][0].get("issueDescription").is_none());
    }
}
