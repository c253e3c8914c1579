//! Catalog commands.

use handyhub_client::api::filter_services;
use handyhub_core::CategoryId;

use super::{App, CommandError};
use crate::output;

/// List categories.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn categories(app: &App) -> Result<(), CommandError> {
    let categories = app.api.list_categories().await?;
    if categories.is_empty() {
        output::line("No categories available");
        return Ok(());
    }

    output::heading("Categories");
    for category in &categories {
        output::line(&format!("{:<26} {}", category.id, category.name));
    }
    Ok(())
}

/// List services in a category, optionally filtered by name.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn services(
    app: &App,
    category_id: &str,
    search: Option<&str>,
) -> Result<(), CommandError> {
    let services = app.api.list_services(&CategoryId::from(category_id)).await?;
    let matches = filter_services(&services, search.unwrap_or_default());

    if matches.is_empty() {
        output::line("No services found");
        return Ok(());
    }

    output::heading("Services");
    for service in matches {
        let price = service
            .price()
            .map_or_else(|| "quote on inspection".to_string(), |p| p.to_string());
        output::line(&format!("{:<26} {:<32} {price}", service.id, service.name));
    }
    Ok(())
}
