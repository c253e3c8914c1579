//! Catalog endpoints (cached).

use handyhub_core::{CategoryId, ServiceSummary};
use tracing::instrument;

use super::types::Category;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List service categories.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint(&["categories"])?;
        self.get_cached(url).await
    }

    /// List the services offered under a category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, category_id), fields(category_id = %category_id))]
    pub async fn list_services(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<ServiceSummary>, ApiError> {
        let url = self.endpoint(&["categories", category_id.as_str(), "services"])?;
        self.get_cached(url).await
    }
}

/// Case-insensitive name search over an already fetched service list.
///
/// A blank query matches everything.
#[must_use]
pub fn filter_services<'a>(
    services: &'a [ServiceSummary],
    query: &str,
) -> Vec<&'a ServiceSummary> {
    let needle = query.trim().to_lowercase();
    services
        .iter()
        .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_filter_services() {
        let services = vec![
            ServiceSummary::new("svc1", "Tap repair", Some(Decimal::from(139))),
            ServiceSummary::new("svc2", "Tap installation", Some(Decimal::from(199))),
            ServiceSummary::new("svc3", "Fan repair", None),
        ];

        let names = |q: &str| {
            filter_services(&services, q)
                .into_iter()
                .map(|s| s.id.as_str().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(names("TAP"), vec!["svc1", "svc2"]);
        assert_eq!(names(" repair "), vec!["svc1", "svc3"]);
        assert_eq!(names(""), vec!["svc1", "svc2", "svc3"]);
        assert!(names("geyser").is_empty());
    }
}
