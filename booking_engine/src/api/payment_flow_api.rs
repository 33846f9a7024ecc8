use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::PaymentFlowError,
    booking_objects::{DepositInit, FinalPaymentInit},
    db_types::{Booking, BookingId, NewBooking, PaymentPurpose, PaymentReceipts, PaymentStatus},
    traits::{BookingStore, CustomerRef, NewPaymentRequest, PaymentProcessor},
};

/// `PaymentFlowApi` orchestrates the two synchronous payment operations: creating a booking with its deposit
/// payment request, and creating the final payment request for the remaining balance.
///
/// Neither operation advances the payment state machine. State only moves when the processor confirms a payment
/// through the webhook channel ([`crate::WebhookApi`]).
pub struct PaymentFlowApi<B, P> {
    store: B,
    processor: P,
}

impl<B, P> Debug for PaymentFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, P> PaymentFlowApi<B, P> {
    pub fn new(store: B, processor: P) -> Self {
        Self { store, processor }
    }

    pub fn store(&self) -> &B {
        &self.store
    }
}

impl<B, P> PaymentFlowApi<B, P>
where
    B: BookingStore,
    P: PaymentProcessor,
{
    /// Creates a new booking and the deposit payment request for it.
    ///
    /// The booking is persisted in `pending` state *before* any processor call, and each processor reference is
    /// stored as soon as its object is confirmed created. A processor failure therefore leaves a retryable record
    /// that never references a payment request which might not exist.
    pub async fn initiate_deposit(&self, booking: NewBooking) -> Result<DepositInit, PaymentFlowError> {
        booking.validate().map_err(PaymentFlowError::ValidationError)?;
        let deposit = booking.deposit_amount();
        let booking = self.store.create_booking(booking).await?;
        debug!("💰️ Booking [{}] created. Deposit due: {} {}", booking.id, deposit, booking.currency);

        let customer = self
            .processor
            .create_customer(&booking.customer_email, &booking.customer_name, &booking.id)
            .await?;
        let booking = self.store.set_customer_ref(&booking.id, customer.as_str()).await?;
        trace!("💰️ Customer reference {} stored for booking [{}]", customer.as_str(), booking.id);

        let request = self
            .processor
            .create_payment_request(NewPaymentRequest {
                amount: booking.deposit_amount,
                currency: &booking.currency,
                customer_ref: customer.as_str(),
                booking_id: &booking.id,
                purpose: PaymentPurpose::Deposit,
                metadata: Vec::new(),
            })
            .await?;
        let booking = self.store.set_deposit_payment_ref(&booking.id, &request.id).await?;
        info!("💰️ Deposit payment request [{}] created for booking [{}]", request.id, booking.id);

        Ok(DepositInit { booking_id: booking.id, client_secret: request.client_secret, deposit_amount: deposit })
    }

    /// Creates the payment request for the remaining balance of a deposit-paid booking.
    ///
    /// The existing customer reference is reused when present; otherwise one is created and persisted first. The
    /// deposit amount and total are attached as metadata for downstream reconciliation and audit.
    pub async fn initiate_final_payment(&self, id: &BookingId) -> Result<FinalPaymentInit, PaymentFlowError> {
        let booking = self.fetch_booking(id).await?;
        if booking.is_fully_paid() {
            return Err(PaymentFlowError::InvalidState("Booking is already fully paid".to_string()));
        }
        if !booking.has_deposit_paid() {
            return Err(PaymentFlowError::InvalidState(
                "Deposit must be paid before creating the final payment".to_string(),
            ));
        }
        let remaining = booking.remaining_amount();
        if remaining.is_zero() {
            return Err(PaymentFlowError::InvalidState("No remaining balance to pay".to_string()));
        }

        let (booking, customer) = match &booking.customer_ref {
            Some(reference) => {
                let customer = CustomerRef(reference.clone());
                (booking, customer)
            },
            None => {
                let customer = self
                    .processor
                    .create_customer(&booking.customer_email, &booking.customer_name, &booking.id)
                    .await?;
                let booking = self.store.set_customer_ref(&booking.id, customer.as_str()).await?;
                debug!("💰️ Created customer reference {} for booking [{}]", customer.as_str(), booking.id);
                (booking, customer)
            },
        };

        let metadata = vec![
            ("deposit_amount".to_string(), booking.deposit_amount.value().to_string()),
            ("total_price".to_string(), booking.total_price.value().to_string()),
        ];
        let request = self
            .processor
            .create_payment_request(NewPaymentRequest {
                amount: remaining,
                currency: &booking.currency,
                customer_ref: customer.as_str(),
                booking_id: &booking.id,
                purpose: PaymentPurpose::FinalPayment,
                metadata,
            })
            .await?;
        let booking = self.store.set_final_payment_ref(&booking.id, &request.id).await?;
        info!(
            "💰️ Final payment request [{}] for {} {} created for booking [{}]",
            request.id, remaining, booking.currency, booking.id
        );
        Ok(FinalPaymentInit {
            booking_id: booking.id,
            payment_request_id: request.id,
            client_secret: request.client_secret,
            amount: remaining,
            currency: booking.currency,
        })
    }

    /// Retrieves the receipt URL for the booking's most relevant payment request from the processor and upserts
    /// it into the receipt map. The payment status determines which key the receipt belongs to.
    pub async fn backfill_receipts(&self, id: &BookingId) -> Result<PaymentReceipts, PaymentFlowError> {
        let booking = self.fetch_booking(id).await?;
        let (payment_ref, purpose) = match booking.payment_status {
            PaymentStatus::DepositPaid => (booking.deposit_payment_ref.as_deref(), PaymentPurpose::Deposit),
            PaymentStatus::Paid => (
                // Fall back to the deposit request for bookings paid in a single combined charge.
                booking.final_payment_ref.as_deref().or(booking.deposit_payment_ref.as_deref()),
                PaymentPurpose::FinalPayment,
            ),
            status => {
                return Err(PaymentFlowError::InvalidState(format!(
                    "No confirmed payment to fetch a receipt for (status is {status})"
                )));
            },
        };
        let payment_ref = payment_ref.ok_or_else(|| {
            PaymentFlowError::InvalidState("No payment request reference recorded for this booking".to_string())
        })?;
        let details = self.processor.fetch_payment_request(payment_ref).await?;
        let url = details.receipt_url.ok_or_else(|| PaymentFlowError::ReceiptNotAvailable(booking.id.clone()))?;
        let booking = self.store.upsert_receipt(&booking.id, purpose, &url).await?;
        debug!("💰️ Receipt for {purpose} backfilled on booking [{}]", booking.id);
        Ok(booking.receipts())
    }

    async fn fetch_booking(&self, id: &BookingId) -> Result<Booking, PaymentFlowError> {
        self.store
            .fetch_booking_by_id(id)
            .await?
            .ok_or_else(|| PaymentFlowError::BookingNotFound(id.clone()))
    }
}
