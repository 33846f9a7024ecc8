use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        contract_api::{ContractApi, DraftMode},
        errors::PaymentFlowError,
    },
    db_types::{BookingId, PaymentPurpose},
    traits::{BookingStore, ContractRenderer, PaymentEvent},
};

/// What the reconciler did with a (verified) webhook notification.
///
/// Every variant except an error is acknowledged to the sender with a success response; the processor delivers
/// at-least-once and must not be driven to retry for conditions that are not transient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WebhookOutcome {
    /// The event was not a payment-succeeded event, or lacked the metadata needed to route it. No state change.
    Ignored { reason: String },
    /// A deposit payment was recorded (or re-confirmed, for a duplicate delivery).
    DepositRecorded {
        booking_id: BookingId,
        /// `false` for duplicate deliveries: the record was already at `deposit_paid` or later.
        transitioned: bool,
        /// The draft contract URL, when drafting succeeded or a draft already existed.
        draft_url: Option<String>,
        /// Present when contract drafting failed. The payment transition above is already durable regardless.
        draft_error: Option<String>,
    },
    /// A final payment was recorded (or re-confirmed).
    FinalPaymentRecorded {
        booking_id: BookingId,
        transitioned: bool,
    },
}

/// `WebhookApi` is the reconciliation engine for asynchronous payment notifications.
///
/// It consumes a single already-verified [`PaymentEvent`] and applies it exactly once to the booking it names.
/// All state mutations go through the store's conditional updates, so duplicate deliveries and re-ordered events
/// can never regress the payment state or overwrite a receipt.
pub struct WebhookApi<B, R> {
    store: B,
    contracts: ContractApi<B, R>,
}

impl<B, R> Debug for WebhookApi<B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B, R> WebhookApi<B, R> {
    pub fn new(store: B, contracts: ContractApi<B, R>) -> Self {
        Self { store, contracts }
    }
}

impl<B, R> WebhookApi<B, R>
where
    B: BookingStore,
    R: ContractRenderer,
{
    /// Applies a verified payment event to its booking record.
    ///
    /// Unrecognised event types and events without routing metadata are tolerated, not rejected: rejecting makes
    /// the sender retry indefinitely for a condition that will never clear. A missing booking *is* an error
    /// (surfaced as not-found) because it signals a data-integrity problem worth a human's attention.
    pub async fn apply_event(&self, event: PaymentEvent) -> Result<WebhookOutcome, PaymentFlowError> {
        if !event.is_payment_succeeded() {
            trace!("🪝️ Ignoring webhook event [{}] of type {}", event.event_id, event.event_type);
            return Ok(WebhookOutcome::Ignored { reason: format!("Unhandled event type: {}", event.event_type) });
        }
        let (booking_id, purpose) = match (&event.booking_id, &event.purpose) {
            (Some(id), Some(purpose)) => (id.clone(), PaymentPurpose::from_metadata(purpose)),
            _ => {
                debug!("🪝️ Payment event [{}] carries no booking id or purpose metadata. Ignoring.", event.event_id);
                return Ok(WebhookOutcome::Ignored { reason: "Event metadata has no booking id or purpose".to_string() });
            },
        };
        // Existence check up front so that an unknown booking surfaces as 404 rather than a silent ack.
        self.store
            .fetch_booking_by_id(&booking_id)
            .await?
            .ok_or_else(|| PaymentFlowError::BookingNotFound(booking_id.clone()))?;

        match purpose {
            PaymentPurpose::Deposit => self.record_deposit_paid(&booking_id, event.receipt_url.as_deref()).await,
            PaymentPurpose::FinalPayment => self.record_final_paid(&booking_id, event.receipt_url.as_deref()).await,
        }
    }

    /// Phase one: durably record the deposit confirmation. Phase two: attempt contract drafting.
    ///
    /// The two phases are deliberately not one transaction. The payment confirmation must stick even when
    /// drafting fails; a failed draft is logged and reported in the outcome so an admin can re-run it through the
    /// explicit path.
    async fn record_deposit_paid(
        &self,
        booking_id: &BookingId,
        receipt_url: Option<&str>,
    ) -> Result<WebhookOutcome, PaymentFlowError> {
        let result = self.store.mark_deposit_paid(booking_id, receipt_url).await?;
        if result.transitioned {
            info!("🪝️💰️ Deposit payment confirmed for booking [{booking_id}]");
        } else {
            debug!("🪝️💰️ Duplicate deposit confirmation for booking [{booking_id}]. No transition.");
        }

        let (draft_url, draft_error) = match self.contracts.create_draft(booking_id, DraftMode::Lenient).await {
            Ok(outcome) => {
                if outcome.created {
                    info!("🪝️📄️ Draft contract auto-created for booking [{booking_id}]");
                }
                (Some(outcome.draft_url), None)
            },
            Err(e) => {
                // The deposit is already recorded; do not let a drafting failure bounce the notification.
                error!("🪝️📄️ Could not auto-create draft contract for booking [{booking_id}]. {e}");
                (None, Some(e.to_string()))
            },
        };
        Ok(WebhookOutcome::DepositRecorded {
            booking_id: booking_id.clone(),
            transitioned: result.transitioned,
            draft_url,
            draft_error,
        })
    }

    async fn record_final_paid(
        &self,
        booking_id: &BookingId,
        receipt_url: Option<&str>,
    ) -> Result<WebhookOutcome, PaymentFlowError> {
        let result = self.store.mark_paid(booking_id, receipt_url).await?;
        if result.transitioned {
            info!("🪝️💰️ Final payment confirmed for booking [{booking_id}]. Booking is fully paid.");
        } else {
            debug!("🪝️💰️ Duplicate final-payment confirmation for booking [{booking_id}]. No transition.");
        }
        Ok(WebhookOutcome::FinalPaymentRecorded { booking_id: booking_id.clone(), transitioned: result.transitioned })
    }
}
