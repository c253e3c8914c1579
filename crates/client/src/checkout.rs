//! Cart checkout.
//!
//! Turns the cart into an order request. Validation runs locally before any
//! request is made, and the cart is only cleared once the backend has
//! accepted the order.

use chrono::NaiveDate;
use handyhub_core::{AddressId, CategoryId, ServiceId, SlotId};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError, Order, PaymentMethod};
use crate::cart::{CartItem, CartState, CartStore};

/// Problems caught before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please choose {0}")]
    MissingField(&'static str),

    #[error("Quantity for {service} must be at least 1")]
    QuantityBelowMinimum { service: String },
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message suitable for an inline banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// Booking details chosen on the checkout page.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDetails {
    pub address_id: Option<AddressId>,
    pub scheduled_date: Option<NaiveDate>,
    pub time_slot_id: Option<SlotId>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// One ordered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub service: ServiceId,
    pub category: CategoryId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            service: item.service.id.clone(),
            category: item.category.id.clone(),
            quantity: item.quantity,
            issue_description: item.issue_description.clone(),
        }
    }
}

/// The backend accepts either a single service or a `services` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OrderLines {
    Single(OrderLine),
    Multiple { services: Vec<OrderLine> },
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(flatten)]
    pub lines: OrderLines,
    pub address: AddressId,
    pub scheduled_date: NaiveDate,
    pub time_slot: SlotId,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderRequest {
    /// Build an order from the cart contents.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty cart, a missing address,
    /// date or slot, or a line with quantity zero.
    pub fn from_cart(cart: &CartState, details: CheckoutDetails) -> Result<Self, ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        if let Some(item) = cart.items().iter().find(|item| item.quantity == 0) {
            return Err(ValidationError::QuantityBelowMinimum {
                service: item.service.name.clone(),
            });
        }

        let address = details
            .address_id
            .ok_or(ValidationError::MissingField("an address"))?;
        let scheduled_date = details
            .scheduled_date
            .ok_or(ValidationError::MissingField("a date"))?;
        let time_slot = details
            .time_slot_id
            .ok_or(ValidationError::MissingField("a time slot"))?;

        let mut lines: Vec<OrderLine> = cart.items().iter().map(OrderLine::from).collect();
        let lines = if lines.len() == 1
            && let Some(line) = lines.pop()
        {
            OrderLines::Single(line)
        } else {
            OrderLines::Multiple { services: lines }
        };

        Ok(Self {
            lines,
            address,
            scheduled_date,
            time_slot,
            payment_method: details.payment_method,
            notes: details
                .notes
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
        })
    }

    /// Number of services in the order.
    #[must_use]
    pub fn line_count(&self) -> usize {
        match &self.lines {
            OrderLines::Single(_) => 1,
            OrderLines::Multiple { services } => services.len(),
        }
    }

    /// Ids of the ordered services.
    #[must_use]
    pub fn service_ids(&self) -> Vec<ServiceId> {
        match &self.lines {
            OrderLines::Single(line) => vec![line.service.clone()],
            OrderLines::Multiple { services } => {
                services.iter().map(|line| line.service.clone()).collect()
            }
        }
    }
}

/// Validate the cart, place the order, then remove the ordered lines.
///
/// Lines added while the order is in flight stay in the cart. On any
/// failure the cart is left exactly as it was.
///
/// # Errors
///
/// Returns [`CheckoutError::Validation`] before any request is made, or
/// [`CheckoutError::Api`] if the backend rejects the order.
#[instrument(skip_all, fields(items = cart.get_item_count()))]
pub async fn place_cart_order(
    api: &ApiClient,
    cart: &CartStore,
    details: CheckoutDetails,
) -> Result<Order, CheckoutError> {
    let request = OrderRequest::from_cart(&cart.snapshot(), details)?;
    let order = api.place_order(&request).await?;

    cart.remove_items(&request.service_ids());
    info!(order_id = %order.id, "Cart checked out");
    Ok(order)
}
