use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vbg_common::Amount;

use crate::db_types::{BookingId, Contract, PaymentReceipts, PaymentStatus};

//--------------------------------------  BookingQueryFilter  --------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingQueryFilter {
    pub customer_email: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub hall: Option<String>,
    pub event_from: Option<DateTime<Utc>>,
    pub event_until: Option<DateTime<Utc>>,
}

impl BookingQueryFilter {
    pub fn with_customer_email(mut self, email: String) -> Self {
        self.customer_email = Some(email);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn with_hall(mut self, hall: String) -> Self {
        self.hall = Some(hall);
        self
    }

    pub fn from_event_date(mut self, from: DateTime<Utc>) -> Self {
        self.event_from = Some(from);
        self
    }

    pub fn until_event_date(mut self, until: DateTime<Utc>) -> Self {
        self.event_until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_email.is_none()
            && self.payment_status.is_none()
            && self.hall.is_none()
            && self.event_from.is_none()
            && self.event_until.is_none()
    }
}

//--------------------------------------   Flow result types  --------------------------------------------------------
/// The result of initiating the deposit payment for a freshly created booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositInit {
    pub booking_id: BookingId,
    /// The client-side payment handle for completing the deposit payment.
    pub client_secret: String,
    pub deposit_amount: Amount,
}

/// The result of initiating the final payment for a deposit-paid booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPaymentInit {
    pub booking_id: BookingId,
    pub payment_request_id: String,
    pub client_secret: String,
    /// The remaining balance being collected, `total - deposit`.
    pub amount: Amount,
    pub currency: String,
}

/// Receipt URLs in the context of the payment they settle: how much was owed, in what currency, and how far
/// along the payment lifecycle the booking is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptsReport {
    pub booking_id: BookingId,
    pub payment_status: PaymentStatus,
    pub total_price: Amount,
    pub deposit_amount: Amount,
    pub currency: String,
    pub receipts: PaymentReceipts,
}

/// Read-only snapshot of a booking's contract and payment position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractStatusReport {
    pub booking_id: BookingId,
    pub contract: Contract,
    pub payment_status: PaymentStatus,
    pub receipts: PaymentReceipts,
}

/// The outcome of a draft-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOutcome {
    pub booking_id: BookingId,
    pub draft_url: String,
    /// `false` when an existing draft was returned instead of a new one being produced.
    pub created: bool,
}

/// The outcome of signing a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignOutcome {
    pub booking_id: BookingId,
    pub signed_url: String,
    pub contract: Contract,
}
