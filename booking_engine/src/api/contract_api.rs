use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::PaymentFlowError,
    booking_objects::{ContractStatusReport, DraftOutcome, SignOutcome},
    db_types::{Booking, BookingId},
    traits::{BookingStore, ContractFields, ContractRenderer, TemplateKind},
};

/// How to treat a draft-creation request when a draft already exists.
///
/// The explicit administrative path rejects the request; the webhook-triggered path treats it as a no-op so that
/// duplicate deposit notifications never fail, and never produce a second document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Strict,
    Lenient,
}

/// `ContractApi` owns the contract sub-lifecycle: `none → draft → signed`.
///
/// It never touches payment state; payment state gates what contract operations are allowed, not the other way
/// around.
pub struct ContractApi<B, R> {
    store: B,
    renderer: R,
}

impl<B, R> Debug for ContractApi<B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContractApi")
    }
}

impl<B, R> ContractApi<B, R> {
    pub fn new(store: B, renderer: R) -> Self {
        Self { store, renderer }
    }
}

impl<B, R> ContractApi<B, R>
where
    B: BookingStore,
    R: ContractRenderer,
{
    /// Renders a draft contract and records it on the booking.
    ///
    /// With [`DraftMode::Strict`], an existing draft is an error. With [`DraftMode::Lenient`], the existing
    /// draft's URL is returned unchanged, including when a concurrent call won the race to create it.
    pub async fn create_draft(&self, id: &BookingId, mode: DraftMode) -> Result<DraftOutcome, PaymentFlowError> {
        let booking = self.fetch_booking(id).await?;
        if let Some(url) = booking.contract().draft_url() {
            return match mode {
                DraftMode::Strict => Err(PaymentFlowError::InvalidState("Draft contract already exists".to_string())),
                DraftMode::Lenient => {
                    trace!("📄️ Draft already exists for booking [{id}]; returning it unchanged");
                    Ok(DraftOutcome { booking_id: booking.id, draft_url: url.to_string(), created: false })
                },
            };
        }
        let url = self.renderer.render(TemplateKind::Draft, ContractFields { booking: &booking, signer_name: None }).await?;
        let result = self.store.set_contract_draft(&booking.id, &url).await?;
        if result.transitioned {
            info!("📄️ Draft contract created for booking [{}]: {url}", result.booking.id);
            Ok(DraftOutcome { booking_id: result.booking.id, draft_url: url, created: true })
        } else {
            // A concurrent draft beat us to the transition. The rendered document is orphaned but harmless.
            let existing = result.booking.contract().draft_url().map(str::to_string);
            match (mode, existing) {
                (DraftMode::Lenient, Some(url)) => {
                    Ok(DraftOutcome { booking_id: result.booking.id, draft_url: url, created: false })
                },
                _ => Err(PaymentFlowError::InvalidState("Draft contract already exists".to_string())),
            }
        }
    }

    /// Renders the signed contract document and marks the contract as signed.
    ///
    /// Requires an existing draft. Re-signing an already-signed contract is permitted and refreshes the signed
    /// document, signer name and timestamp.
    pub async fn sign(&self, id: &BookingId, signer_name: &str) -> Result<SignOutcome, PaymentFlowError> {
        if signer_name.trim().is_empty() {
            return Err(PaymentFlowError::ValidationError("signer_name is required".to_string()));
        }
        let booking = self.fetch_booking(id).await?;
        if !booking.contract().has_draft() {
            return Err(PaymentFlowError::InvalidState(
                "No draft contract found. Create a draft first.".to_string(),
            ));
        }
        let url = self
            .renderer
            .render(TemplateKind::Signed, ContractFields { booking: &booking, signer_name: Some(signer_name) })
            .await?;
        let booking = self.store.set_contract_signed(&booking.id, &url, signer_name).await?;
        info!("📄️ Contract for booking [{}] signed by {signer_name}: {url}", booking.id);
        Ok(SignOutcome { booking_id: booking.id.clone(), signed_url: url, contract: booking.contract() })
    }

    /// Read-only snapshot of the contract sub-record alongside the payment position.
    pub async fn status(&self, id: &BookingId) -> Result<ContractStatusReport, PaymentFlowError> {
        let booking = self.fetch_booking(id).await?;
        Ok(ContractStatusReport {
            booking_id: booking.id.clone(),
            contract: booking.contract(),
            payment_status: booking.payment_status,
            receipts: booking.receipts(),
        })
    }

    async fn fetch_booking(&self, id: &BookingId) -> Result<Booking, PaymentFlowError> {
        self.store
            .fetch_booking_by_id(id)
            .await?
            .ok_or_else(|| PaymentFlowError::BookingNotFound(id.clone()))
    }
}
