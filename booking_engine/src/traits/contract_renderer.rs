use thiserror::Error;

use crate::db_types::Booking;

/// Which contract document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Draft,
    Signed,
}

/// The structured data a rendered contract is built from.
#[derive(Debug, Clone)]
pub struct ContractFields<'a> {
    pub booking: &'a Booking,
    /// Present only for signed documents.
    pub signer_name: Option<&'a str>,
}

/// Document production collaborator. The engine treats rendering as a black box that yields a stable URL for the
/// produced document.
#[allow(async_fn_in_trait)]
pub trait ContractRenderer {
    async fn render(&self, kind: TemplateKind, fields: ContractFields<'_>) -> Result<String, RendererError>;
}

#[derive(Debug, Clone, Error)]
#[error("Contract rendering failed. {0}")]
pub struct RendererError(pub String);
