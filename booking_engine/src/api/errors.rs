use thiserror::Error;

use crate::{
    db_types::BookingId,
    traits::{BookingStoreError, ProcessorError, RendererError},
};

/// The error taxonomy for all engine operations.
///
/// Variants map one-to-one onto HTTP classes at the server boundary: validation and invalid-state errors are the
/// caller's fault and are never retried; upstream errors are transient and safe to retry; conflicts tell the
/// caller to re-fetch and try again.
#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("Invalid input. {0}")]
    ValidationError(String),
    #[error("Booking {0} does not exist")]
    BookingNotFound(BookingId),
    #[error("Operation is not valid for the booking's current state. {0}")]
    InvalidState(String),
    #[error("No receipt is available yet for booking {0}")]
    ReceiptNotAvailable(BookingId),
    #[error("Payment processor error. {0}")]
    UpstreamError(String),
    #[error("Contract rendering error. {0}")]
    RendererError(String),
    #[error("Concurrent update conflict. {0}")]
    Conflict(String),
    #[error("Internal database error. {0}")]
    DatabaseError(String),
}

impl From<BookingStoreError> for PaymentFlowError {
    fn from(e: BookingStoreError) -> Self {
        match e {
            BookingStoreError::DatabaseError(msg) => Self::DatabaseError(msg),
            BookingStoreError::BookingNotFound(id) => Self::BookingNotFound(id),
            BookingStoreError::UpdateConflict(id) => Self::Conflict(format!("booking {id}")),
        }
    }
}

impl From<ProcessorError> for PaymentFlowError {
    fn from(e: ProcessorError) -> Self {
        Self::UpstreamError(e.to_string())
    }
}

impl From<RendererError> for PaymentFlowError {
    fn from(e: RendererError) -> Self {
        Self::RendererError(e.to_string())
    }
}
