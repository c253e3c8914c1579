//! Catalog descriptors carried by cart lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ServiceId};
use super::price::{CurrencyCode, Price};

/// A bookable service as listed in the catalog.
///
/// `base_price` is absent for services quoted on inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    #[serde(rename = "_id")]
    pub id: ServiceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

impl ServiceSummary {
    /// Create a service descriptor with no image.
    #[must_use]
    pub fn new(
        id: impl Into<ServiceId>,
        name: impl Into<String>,
        base_price: Option<Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_price,
            hero_image: None,
        }
    }

    /// Base price as a [`Price`], if the service has one.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.base_price
            .map(|amount| Price::new(amount, CurrencyCode::default()))
    }
}

/// The category a service is listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
}

impl CategorySummary {
    /// Create a category descriptor.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_from_backend_json() {
        let json = r#"{"_id":"svc1","name":"Tap repair","basePrice":139,"heroImage":"/img/tap.jpg","slug":"tap-repair"}"#;
        let service: ServiceSummary = serde_json::from_str(json).unwrap();
        assert_eq!(service.id.as_str(), "svc1");
        assert_eq!(service.base_price, Some(Decimal::from(139)));
        assert_eq!(service.hero_image.as_deref(), Some("/img/tap.jpg"));
    }

    #[test]
    fn test_service_without_price() {
        let service: ServiceSummary =
            serde_json::from_str(r#"{"_id":"svc9","name":"Wiring inspection"}"#).unwrap();
        assert_eq!(service.base_price, None);
        assert!(service.price().is_none());
    }
}
