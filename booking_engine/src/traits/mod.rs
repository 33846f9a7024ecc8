//! Behaviour contracts for the engine's collaborators.
//!
//! The engine core only ever talks to a [`BookingStore`] (persistence), a [`PaymentProcessor`] (the external
//! payment service) and a [`ContractRenderer`] (document production). Concrete implementations live elsewhere:
//! the SQLite store in this crate, the processor client and the file renderer in the server crate, and mocks in
//! the test suites.
mod booking_store;
mod contract_renderer;
mod payment_processor;

pub use booking_store::{BookingStore, BookingStoreError, TransitionResult};
pub use contract_renderer::{ContractFields, ContractRenderer, RendererError, TemplateKind};
pub use payment_processor::{
    CustomerRef,
    NewPaymentRequest,
    PaymentEvent,
    PaymentProcessor,
    PaymentRequest,
    PaymentRequestDetails,
    ProcessorError,
    PAYMENT_SUCCEEDED_EVENT,
};
