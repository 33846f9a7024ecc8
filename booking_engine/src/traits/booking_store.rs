use thiserror::Error;

use crate::{
    booking_objects::BookingQueryFilter,
    db_types::{Booking, BookingId, NewBooking, PaymentPurpose},
};

/// The result of a conditional state transition.
///
/// `transitioned` is `false` when the record was already at (or past) the target state and the update was a no-op.
/// Callers use this to suppress side effects on duplicate webhook deliveries.
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub booking: Booking,
    pub transitioned: bool,
}

/// Persistence contract for booking records.
///
/// Every mutator is a single atomic conditional update keyed by booking id (compare-and-set on the current
/// status, `COALESCE` for set-once columns). Two concurrent webhook deliveries for the same booking can therefore
/// never produce a lost update: whichever lands second sees the condition fail and becomes a no-op.
#[allow(async_fn_in_trait)]
pub trait BookingStore {
    /// The URL of the backing database.
    fn url(&self) -> &str;

    /// Persists a new booking in `pending` state with its deposit amount computed from the request.
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, BookingStoreError>;

    async fn fetch_booking_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingStoreError>;

    /// Fetches bookings matching the filter, newest first.
    async fn search_bookings(&self, query: BookingQueryFilter) -> Result<Vec<Booking>, BookingStoreError>;

    /// Records the processor's customer reference. Set once; a second call leaves the original value in place.
    async fn set_customer_ref(&self, id: &BookingId, customer_ref: &str) -> Result<Booking, BookingStoreError>;

    /// Records the deposit payment-request reference. Set once.
    async fn set_deposit_payment_ref(&self, id: &BookingId, payment_ref: &str) -> Result<Booking, BookingStoreError>;

    /// Records the final payment-request reference. Set once.
    async fn set_final_payment_ref(&self, id: &BookingId, payment_ref: &str) -> Result<Booking, BookingStoreError>;

    /// Transitions `pending → deposit_paid`, stamping `deposit_paid_at` exactly once and upserting the deposit
    /// receipt if one is supplied. A no-op (besides the receipt upsert) when the booking is already at
    /// `deposit_paid` or later.
    async fn mark_deposit_paid(
        &self,
        id: &BookingId,
        receipt_url: Option<&str>,
    ) -> Result<TransitionResult, BookingStoreError>;

    /// Transitions `pending|deposit_paid → paid`, stamping `paid_at` exactly once and upserting the final
    /// receipt. When jumping straight from `pending`, the skipped `deposit_paid_at` timestamp is backfilled.
    async fn mark_paid(&self, id: &BookingId, receipt_url: Option<&str>) -> Result<TransitionResult, BookingStoreError>;

    /// Transitions any non-terminal state to `failed`. Kept for the processor's failure signals even though the
    /// current event set never sends one.
    async fn mark_payment_failed(&self, id: &BookingId) -> Result<TransitionResult, BookingStoreError>;

    /// Sets the receipt URL for the given purpose if it is not already set. First write wins.
    async fn upsert_receipt(
        &self,
        id: &BookingId,
        purpose: PaymentPurpose,
        url: &str,
    ) -> Result<Booking, BookingStoreError>;

    /// Transitions the contract `none → draft` with the rendered document URL and a creation timestamp.
    /// `transitioned` is `false` when a draft (or later state) already exists.
    async fn set_contract_draft(&self, id: &BookingId, draft_url: &str) -> Result<TransitionResult, BookingStoreError>;

    /// Marks the contract as signed with the rendered document URL and signer name. The contract must already
    /// have a draft; re-signing an already-signed contract is permitted and refreshes the signed fields.
    async fn set_contract_signed(
        &self,
        id: &BookingId,
        signed_url: &str,
        signer_name: &str,
    ) -> Result<Booking, BookingStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), BookingStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum BookingStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Booking {0} does not exist")]
    BookingNotFound(BookingId),
    #[error("Concurrent update conflict on booking {0}")]
    UpdateConflict(BookingId),
}

impl From<sqlx::Error> for BookingStoreError {
    fn from(e: sqlx::Error) -> Self {
        BookingStoreError::DatabaseError(e.to_string())
    }
}
