//! Booking commands: addresses, time slots, checkout and payment.

use chrono::NaiveDate;
use handyhub_client::api::{ConfirmPaymentRequest, Order, PaymentMethod, default_address};
use handyhub_client::{CheckoutDetails, place_cart_order};
use handyhub_core::{AddressId, OrderId, SlotId};
use tracing::info;

use super::{App, CommandError};
use crate::output;

fn print_order(order: &Order) {
    let number = order.order_number.as_deref().unwrap_or(order.id.as_str());
    output::line(&format!("Order {number}: {:?}", order.status));
    if let Some(payment) = order.payment_status {
        output::line(&format!("payment: {payment:?}"));
    }
    if let Some(total) = order.total_amount {
        output::line(&format!("total: \u{20b9}{total:.2}"));
    }
}

/// List saved addresses.
///
/// # Errors
///
/// Returns error if anonymous or the request fails.
pub async fn addresses(app: &App) -> Result<(), CommandError> {
    app.require_session()?;

    let addresses = app.api.list_addresses().await?;
    if addresses.is_empty() {
        output::line("No saved addresses");
        return Ok(());
    }

    output::heading("Addresses");
    for address in &addresses {
        let marker = if address.is_default { "*" } else { " " };
        let label = address.label.as_deref().unwrap_or("");
        output::line(&format!(
            "{marker} {:<26} {label:<8} {}",
            address.id,
            address.one_line()
        ));
    }
    Ok(())
}

/// List visit windows for a date.
///
/// # Errors
///
/// Returns error if anonymous or the request fails.
pub async fn slots(app: &App, date: NaiveDate, available_only: bool) -> Result<(), CommandError> {
    app.require_session()?;

    let slots = app.api.list_time_slots(date, available_only).await?;
    if slots.is_empty() {
        output::line(&format!("No open slots on {date}"));
        return Ok(());
    }

    output::heading(&format!("Slots on {date}"));
    for slot in &slots {
        let status = if slot.available { "" } else { " (full)" };
        output::line(&format!("{:<26} {}{status}", slot.id, slot.window()));
    }
    Ok(())
}

/// Place an order for the whole cart.
///
/// Without `--address` the saved default address is used.
///
/// # Errors
///
/// Returns error if anonymous, validation fails, or the backend rejects the
/// order. The cart is kept on failure.
pub async fn checkout(
    app: &App,
    address: Option<String>,
    date: NaiveDate,
    slot: String,
    payment_method: PaymentMethod,
    notes: Option<String>,
) -> Result<(), CommandError> {
    app.require_session()?;

    let address_id = match address {
        Some(id) => Some(AddressId::new(id)),
        None => {
            let addresses = app.api.list_addresses().await?;
            default_address(&addresses).map(|a| a.id.clone())
        }
    };

    let details = CheckoutDetails {
        address_id,
        scheduled_date: Some(date),
        time_slot_id: Some(SlotId::new(slot)),
        payment_method,
        notes,
    };

    let order = place_cart_order(&app.api, &app.cart, details).await?;
    print_order(&order);
    if payment_method == PaymentMethod::Online {
        output::line(&format!(
            "Complete payment, then run `hh pay --order {} --payment-id <id>`",
            order.id
        ));
    }
    Ok(())
}

/// Confirm an online payment.
///
/// # Errors
///
/// Returns error if anonymous or verification fails.
pub async fn pay(
    app: &App,
    order: String,
    payment_id: String,
    signature: Option<String>,
) -> Result<(), CommandError> {
    app.require_session()?;

    let request = ConfirmPaymentRequest {
        order_id: OrderId::new(order),
        payment_id,
        signature,
    };
    let order = app.api.confirm_payment(&request).await?;

    info!(order_id = %order.id, "Payment recorded");
    print_order(&order);
    Ok(())
}
