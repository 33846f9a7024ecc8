use booking_engine::{
    booking_objects::BookingQueryFilter,
    db_types::{BookingId, PaymentStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The webhook acknowledgment body. Senders deliver at-least-once and key retries off the HTTP status, so the
/// body is informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPaymentParams {
    pub booking_id: BookingId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDraftParams {
    pub booking_id: BookingId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignContractParams {
    pub booking_id: BookingId,
    pub signer_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MyBookingsQuery {
    pub email: String,
}

/// Admin search filters, straight off the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingSearchQuery {
    pub status: Option<PaymentStatus>,
    pub hall: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl From<BookingSearchQuery> for BookingQueryFilter {
    fn from(q: BookingSearchQuery) -> Self {
        let mut filter = BookingQueryFilter::default();
        if let Some(status) = q.status {
            filter = filter.with_payment_status(status);
        }
        if let Some(hall) = q.hall {
            filter = filter.with_hall(hall);
        }
        if let Some(from) = q.from {
            filter = filter.from_event_date(from);
        }
        if let Some(to) = q.to {
            filter = filter.until_event_date(to);
        }
        filter
    }
}
