//! Cart commands.
//!
//! The cart lives in local state; only `add` talks to the backend, to
//! resolve the service and category descriptors.

use handyhub_core::{CategoryId, CategorySummary, ServiceId};

use super::{App, CommandError};
use crate::output;

/// Add one unit of a service to the cart.
///
/// # Errors
///
/// Returns error if the catalog lookup fails or the ids are unknown.
pub async fn add(app: &App, category_id: &str, service_id: &str) -> Result<(), CommandError> {
    let category_id = CategoryId::from(category_id);
    let service_id = ServiceId::from(service_id);

    let category = app
        .api
        .list_categories()
        .await?
        .iter()
        .find(|c| c.id == category_id)
        .map(CategorySummary::from)
        .ok_or_else(|| CommandError::NotFound(format!("category {category_id}")))?;

    let service = app
        .api
        .list_services(&category_id)
        .await?
        .into_iter()
        .find(|s| s.id == service_id)
        .ok_or_else(|| CommandError::NotFound(format!("service {service_id}")))?;

    let name = service.name.clone();
    app.cart.add_item(service, category);

    let quantity = app.cart.item(&service_id).map_or(0, |item| item.quantity);
    output::line(&format!("{name} x{quantity} in cart"));
    Ok(())
}

/// Remove a service from the cart.
pub fn remove(app: &App, service_id: &str) {
    app.cart.remove_item(&ServiceId::from(service_id));
    show(app);
}

/// Set a service's quantity.
pub fn set_quantity(app: &App, service_id: &str, quantity: i64) {
    app.cart.update_quantity(&ServiceId::from(service_id), quantity);
    show(app);
}

/// Describe the problem for a service.
pub fn note(app: &App, service_id: &str, text: &str) {
    let service_id = ServiceId::from(service_id);
    if app.cart.item(&service_id).is_none() {
        output::line(&format!("{service_id} is not in the cart"));
        return;
    }
    app.cart.update_issue_description(&service_id, text);
    output::line("Note saved");
}

/// Empty the cart.
pub fn clear(app: &App) {
    app.cart.clear_cart();
    output::line("Cart cleared");
}

/// Print cart lines and totals.
pub fn show(app: &App) {
    let cart = app.cart.snapshot();
    if cart.is_empty() {
        output::line("Your cart is empty");
        return;
    }

    output::heading("Cart");
    for item in cart.items() {
        let price = item
            .service
            .price()
            .map_or_else(|| "on inspection".to_string(), |p| p.times(item.quantity).to_string());
        output::line(&format!(
            "{:<26} {:<32} x{:<4} {price}",
            item.service.id, item.service.name, item.quantity
        ));
        if let Some(notes) = &item.issue_description {
            output::line(&format!("    note: {notes}"));
        }
    }

    output::line(&format!(
        "{} item(s), total {}",
        cart.item_count(),
        cart.subtotal()
    ));
    if cart.has_unpriced_items() {
        output::line("Some services are priced after inspection and are not included");
    }
}
