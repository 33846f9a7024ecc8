//! `SqliteDatabase` is the concrete SQLite-backed implementation of [`BookingStore`].
//!
//! Every mutator runs as a single conditional statement (or a short transaction of them), so concurrent webhook
//! deliveries resolve at the database rather than in application code.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{bookings, db_url, new_pool};
use crate::{
    booking_objects::BookingQueryFilter,
    db_types::{Booking, BookingId, NewBooking, PaymentPurpose},
    traits::{BookingStore, BookingStoreError, TransitionResult},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database connection pool using the URL from the `VBG_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_required(&self, id: &BookingId) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        bookings::fetch_booking_by_id(id, &mut conn)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))
    }
}

impl BookingStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let booking = bookings::insert_booking(booking, &mut conn).await?;
        debug!("🗃️ Booking [{}] has been saved in the DB", booking.id);
        Ok(booking)
    }

    async fn fetch_booking_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(bookings::fetch_booking_by_id(id, &mut conn).await?)
    }

    async fn search_bookings(&self, query: BookingQueryFilter) -> Result<Vec<Booking>, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(bookings::search_bookings(query, &mut conn).await?)
    }

    async fn set_customer_ref(&self, id: &BookingId, customer_ref: &str) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        bookings::set_customer_ref(id, customer_ref, &mut conn)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))
    }

    async fn set_deposit_payment_ref(&self, id: &BookingId, payment_ref: &str) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        bookings::set_payment_ref(id, PaymentPurpose::Deposit, payment_ref, &mut conn)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))
    }

    async fn set_final_payment_ref(&self, id: &BookingId, payment_ref: &str) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        bookings::set_payment_ref(id, PaymentPurpose::FinalPayment, payment_ref, &mut conn)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))
    }

    async fn mark_deposit_paid(
        &self,
        id: &BookingId,
        receipt_url: Option<&str>,
    ) -> Result<TransitionResult, BookingStoreError> {
        let mut tx = self.pool.begin().await?;
        let transitioned = bookings::mark_deposit_paid(id, &mut tx).await?;
        if let Some(url) = receipt_url {
            bookings::upsert_receipt(id, PaymentPurpose::Deposit, url, &mut tx).await?;
        }
        let booking = bookings::fetch_booking_by_id(id, &mut tx)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))?;
        tx.commit().await?;
        if transitioned {
            debug!("🗃️ Booking [{id}] transitioned to deposit_paid");
        }
        Ok(TransitionResult { booking, transitioned })
    }

    async fn mark_paid(&self, id: &BookingId, receipt_url: Option<&str>) -> Result<TransitionResult, BookingStoreError> {
        let mut tx = self.pool.begin().await?;
        let transitioned = bookings::mark_paid(id, &mut tx).await?;
        if let Some(url) = receipt_url {
            bookings::upsert_receipt(id, PaymentPurpose::FinalPayment, url, &mut tx).await?;
        }
        let booking = bookings::fetch_booking_by_id(id, &mut tx)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))?;
        tx.commit().await?;
        if transitioned {
            debug!("🗃️ Booking [{id}] transitioned to paid");
        }
        Ok(TransitionResult { booking, transitioned })
    }

    async fn mark_payment_failed(&self, id: &BookingId) -> Result<TransitionResult, BookingStoreError> {
        let mut tx = self.pool.begin().await?;
        let transitioned = bookings::mark_payment_failed(id, &mut tx).await?;
        let booking = bookings::fetch_booking_by_id(id, &mut tx)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))?;
        tx.commit().await?;
        if transitioned {
            warn!("🗃️ Booking [{id}] transitioned to failed");
        }
        Ok(TransitionResult { booking, transitioned })
    }

    async fn upsert_receipt(
        &self,
        id: &BookingId,
        purpose: PaymentPurpose,
        url: &str,
    ) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        bookings::upsert_receipt(id, purpose, url, &mut conn)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))
    }

    async fn set_contract_draft(&self, id: &BookingId, draft_url: &str) -> Result<TransitionResult, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let transitioned = bookings::set_contract_draft(id, draft_url, &mut conn).await?;
        let booking = bookings::fetch_booking_by_id(id, &mut conn)
            .await?
            .ok_or_else(|| BookingStoreError::BookingNotFound(id.clone()))?;
        Ok(TransitionResult { booking, transitioned })
    }

    async fn set_contract_signed(
        &self,
        id: &BookingId,
        signed_url: &str,
        signer_name: &str,
    ) -> Result<Booking, BookingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let updated = bookings::set_contract_signed(id, signed_url, signer_name, &mut conn).await?;
        if updated {
            self.fetch_required(id).await
        } else {
            // The row exists but has no draft to sign, or it vanished. Distinguish the two.
            let _ = self.fetch_required(id).await?;
            Err(BookingStoreError::UpdateConflict(id.clone()))
        }
    }

    async fn close(&mut self) -> Result<(), BookingStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
