//! Checkout endpoints: addresses, time slots, orders, payments.

use chrono::NaiveDate;
use tracing::{info, instrument};

use super::types::{Address, ConfirmPaymentRequest, Order, TimeSlot};
use super::{ApiClient, ApiError};
use crate::checkout::OrderRequest;

impl ApiClient {
    /// List the customer's saved addresses. An empty list is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoint(&["addresses"])?;
        Ok(self
            .get::<Option<Vec<Address>>>(url)
            .await?
            .unwrap_or_default())
    }

    /// List visit windows for `date`, optionally filtered to open ones.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, date), fields(date = %date))]
    pub async fn list_time_slots(
        &self,
        date: NaiveDate,
        available_only: bool,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let mut url = self.endpoint(&["time-slots"])?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());

        let mut slots = self
            .get::<Option<Vec<TimeSlot>>>(url)
            .await?
            .unwrap_or_default();
        if available_only {
            slots.retain(|slot| slot.available);
        }
        Ok(slots)
    }

    /// Place an order for one or several services.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the order or the request fails.
    #[instrument(skip(self, request), fields(lines = request.line_count()))]
    pub async fn place_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let url = self.endpoint(&["orders"])?;
        let order: Order = self.post(url, request).await?;
        info!(order_id = %order.id, status = ?order.status, "Order placed");
        Ok(order)
    }

    /// Forward a gateway payment result for server-side verification.
    ///
    /// # Errors
    ///
    /// Returns error if verification fails or the request fails.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn confirm_payment(
        &self,
        request: &ConfirmPaymentRequest,
    ) -> Result<Order, ApiError> {
        let url = self.endpoint(&["payments", "confirm"])?;
        let order: Order = self.post(url, request).await?;
        info!(order_id = %order.id, payment_status = ?order.payment_status, "Payment confirmed");
        Ok(order)
    }
}
