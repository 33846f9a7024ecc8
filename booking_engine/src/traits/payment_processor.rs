use serde::{Deserialize, Serialize};
use thiserror::Error;
use vbg_common::Amount;

use crate::db_types::{BookingId, PaymentPurpose};

/// The event type reported when a charge settles successfully. Everything else is acknowledged and ignored.
pub const PAYMENT_SUCCEEDED_EVENT: &str = "charge.succeeded";

/// An opaque reference to a customer object held by the external processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef(pub String);

impl CustomerRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A request to create a payment intent with the external processor.
#[derive(Debug, Clone)]
pub struct NewPaymentRequest<'a> {
    /// Amount in minor units. The processor boundary only ever sees integers.
    pub amount: Amount,
    pub currency: &'a str,
    pub customer_ref: &'a str,
    pub booking_id: &'a BookingId,
    pub purpose: PaymentPurpose,
    /// Extra metadata echoed back in webhook events, used for reconciliation and audit.
    pub metadata: Vec<(String, String)>,
}

/// A payment request as created with the processor. The `client_secret` is the client-side payment handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub id: String,
    pub client_secret: String,
}

/// A payment request as later retrieved from the processor, for receipt backfill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequestDetails {
    pub id: String,
    pub receipt_url: Option<String>,
}

/// A verified, parsed webhook notification.
///
/// Fields the processor did not supply are `None`; the reconciler decides whether their absence is tolerable
/// (missing metadata) or ignorable (unrecognised event type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub event_id: String,
    pub event_type: String,
    pub payment_request_id: Option<String>,
    pub booking_id: Option<BookingId>,
    pub purpose: Option<String>,
    pub receipt_url: Option<String>,
}

impl PaymentEvent {
    pub fn is_payment_succeeded(&self) -> bool {
        self.event_type == PAYMENT_SUCCEEDED_EVENT
    }
}

/// Client contract for the external payment processor.
///
/// All network calls must carry a bounded timeout. A timeout or failure during payment-request creation leaves no
/// reference on the booking record, so the caller can safely retry.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    /// Creates a customer object with the processor and returns its reference.
    async fn create_customer(
        &self,
        email: &str,
        name: &str,
        booking_id: &BookingId,
    ) -> Result<CustomerRef, ProcessorError>;

    /// Creates a payment request (intent to collect `amount`) tagged with the booking id and purpose.
    async fn create_payment_request(&self, request: NewPaymentRequest<'_>) -> Result<PaymentRequest, ProcessorError>;

    /// Retrieves an existing payment request, primarily to recover its receipt URL.
    async fn fetch_payment_request(&self, payment_ref: &str) -> Result<PaymentRequestDetails, ProcessorError>;

    /// Verifies a webhook notification against the shared signing secret, operating on the exact unparsed body,
    /// and parses it into a [`PaymentEvent`].
    ///
    /// Fails with [`ProcessorError::Authentication`] when the secret is unconfigured, the signature header is
    /// absent, or verification fails. This rejection is final; the sender must not be told to retry.
    fn verify_webhook(&self, raw_body: &[u8], signature_header: Option<&str>) -> Result<PaymentEvent, ProcessorError>;
}

#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    #[error("Webhook signature verification failed. {0}")]
    Authentication(String),
    #[error("Payment processor request failed. {0}")]
    Upstream(String),
    #[error("Could not interpret the processor's response. {0}")]
    MalformedResponse(String),
}
