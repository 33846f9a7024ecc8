use std::fmt::Debug;

use crate::{
    api::errors::PaymentFlowError,
    booking_objects::{BookingQueryFilter, ReceiptsReport},
    db_types::{Booking, BookingId},
    traits::BookingStore,
};

/// Read-only booking queries. Mutations live on [`crate::PaymentFlowApi`] and friends.
pub struct BookingApi<B> {
    store: B,
}

impl<B> Debug for BookingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BookingApi")
    }
}

impl<B> BookingApi<B> {
    pub fn new(store: B) -> Self {
        Self { store }
    }
}

impl<B: BookingStore> BookingApi<B> {
    pub async fn fetch_booking(&self, id: &BookingId) -> Result<Booking, PaymentFlowError> {
        self.store
            .fetch_booking_by_id(id)
            .await?
            .ok_or_else(|| PaymentFlowError::BookingNotFound(id.clone()))
    }

    /// All bookings belonging to the given customer email, newest first.
    pub async fn customer_bookings(&self, email: &str) -> Result<Vec<Booking>, PaymentFlowError> {
        let filter = BookingQueryFilter::default().with_customer_email(email.to_string());
        Ok(self.store.search_bookings(filter).await?)
    }

    pub async fn search(&self, filter: BookingQueryFilter) -> Result<Vec<Booking>, PaymentFlowError> {
        Ok(self.store.search_bookings(filter).await?)
    }

    /// The receipt URLs currently on record, together with the payment position they belong to. Missing
    /// receipts can often be backfilled via [`crate::PaymentFlowApi::backfill_receipts`].
    pub async fn receipts(&self, id: &BookingId) -> Result<ReceiptsReport, PaymentFlowError> {
        let booking = self.fetch_booking(id).await?;
        Ok(ReceiptsReport {
            booking_id: booking.id.clone(),
            payment_status: booking.payment_status,
            total_price: booking.total_price,
            deposit_amount: booking.deposit_amount,
            currency: booking.currency.clone(),
            receipts: booking.receipts(),
        })
    }
}
