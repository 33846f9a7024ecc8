//! The engine's public API surface.
//!
//! Each API wraps a [`BookingStore`](crate::traits::BookingStore) backend (and, where needed, the processor or
//! renderer collaborators) and owns one slice of the booking lifecycle:
//!
//! * [`PaymentFlowApi`]: deposit and final-payment orchestration against the external processor.
//! * [`WebhookApi`]: reconciliation of asynchronous payment-succeeded notifications.
//! * [`ContractApi`]: the contract draft/sign lifecycle.
//! * [`BookingApi`]: read-only booking queries.
mod bookings_api;
mod contract_api;
mod errors;
mod payment_flow_api;
mod webhook_api;

pub use bookings_api::BookingApi;
pub use contract_api::{ContractApi, DraftMode};
pub use errors::PaymentFlowError;
pub use payment_flow_api::PaymentFlowApi;
pub use webhook_api::{WebhookApi, WebhookOutcome};
