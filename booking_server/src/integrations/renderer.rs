//! File-based contract renderer.
//!
//! Renders venue agreements as plain-text documents under a storage directory and returns the public URL they
//! are served from. Document production is deliberately simple; the engine only cares about getting a stable URL
//! back.
use booking_engine::traits::{ContractFields, ContractRenderer, RendererError, TemplateKind};
use chrono::Utc;
use log::*;

use crate::{config::ContractConfig, errors::ServerError};

#[derive(Clone)]
pub struct FileContractRenderer {
    config: ContractConfig,
}

impl FileContractRenderer {
    pub fn new(config: ContractConfig) -> Result<Self, ServerError> {
        std::fs::create_dir_all(&config.storage_dir)?;
        Ok(Self { config })
    }
}

impl ContractRenderer for FileContractRenderer {
    async fn render(&self, kind: TemplateKind, fields: ContractFields<'_>) -> Result<String, RendererError> {
        let suffix = match kind {
            TemplateKind::Draft => "draft",
            TemplateKind::Signed => "signed",
        };
        let filename = format!("contract_{}_{suffix}.txt", fields.booking.id);
        let path = std::path::Path::new(&self.config.storage_dir).join(&filename);
        let document = match kind {
            TemplateKind::Draft => draft_document(&fields),
            TemplateKind::Signed => signed_document(&fields),
        };
        tokio::fs::write(&path, document).await.map_err(|e| RendererError(e.to_string()))?;
        debug!("📄️ Rendered {suffix} contract for booking [{}] to {}", fields.booking.id, path.display());
        Ok(format!("{}/contracts/{filename}", self.config.public_base_url))
    }
}

fn draft_document(fields: &ContractFields<'_>) -> String {
    let booking = fields.booking;
    format!(
        "VENUE SERVICES AGREEMENT\n\
         \n\
         Date: {date}\n\
         Client Name: {name}\n\
         Client Email: {email}\n\
         Event Date: {event_date}\n\
         Hall: {hall}\n\
         Package: {package}\n\
         Guests: {guests}\n\
         Total Price: {total} {currency}\n\
         Deposit ({percent}%): {deposit} {currency}\n\
         Balance Due: {balance} {currency}\n\
         \n\
         Terms & Conditions:\n\
         - Deposit is non-refundable after 7 days.\n\
         - Final payment due 14 days before event date.\n\
         - Cancellation policy applies as per venue rules.\n\
         - Electronic signatures are legally binding (ESIGN Act, UETA).\n\
         \n\
         Signature: _____________________________  Date: ____________\n",
        date = Utc::now().format("%Y-%m-%d %H:%M"),
        name = booking.customer_name,
        email = booking.customer_email,
        event_date = booking.event_date.format("%Y-%m-%d"),
        hall = booking.hall,
        package = booking.package,
        guests = booking.guests,
        total = booking.total_price,
        percent = booking.deposit_percent,
        deposit = booking.deposit_amount,
        balance = booking.remaining_amount(),
        currency = booking.currency.to_uppercase(),
    )
}

fn signed_document(fields: &ContractFields<'_>) -> String {
    let booking = fields.booking;
    let signer = fields.signer_name.unwrap_or(&booking.customer_name);
    format!(
        "VENUE SERVICES AGREEMENT (SIGNED)\n\
         \n\
         Signed At: {signed_at}\n\
         Signer Name: {signer}\n\
         Signer Email: {email}\n\
         \n\
         Booking Details:\n\
         Event Date: {event_date}\n\
         Hall: {hall}\n\
         Package: {package}\n\
         Total Price: {total} {currency}\n\
         \n\
         By signing electronically, the client agrees to the Terms & Conditions.\n",
        signed_at = Utc::now().format("%Y-%m-%d %H:%M"),
        email = booking.customer_email,
        event_date = booking.event_date.format("%Y-%m-%d"),
        hall = booking.hall,
        package = booking.package,
        total = booking.total_price,
        currency = booking.currency.to_uppercase(),
    )
}
