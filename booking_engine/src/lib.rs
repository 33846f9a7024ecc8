//! Venue Booking Engine
//!
//! The booking engine holds the core logic of the venue booking gateway: the booking record, its two-phase
//! payment state machine (deposit, then final balance), and the contract lifecycle that hangs off it. It is
//! provider-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need
//!    to access the database directly. Instead, use the public API provided by the engine. The exception is the
//!    data types used in the database, which are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`PaymentFlowApi`], [`WebhookApi`], [`ContractApi`], [`BookingApi`]). These provide
//!    the public-facing functionality: payment orchestration, webhook reconciliation, contract management and
//!    booking queries. A backend acts as storage for these APIs by implementing [`traits::BookingStore`].
//! 3. The collaborator traits ([`mod@traits`]): the storage backend, the external payment processor, and the
//!    contract document renderer. The engine never talks to the outside world except through these.
mod api;

pub mod booking_objects;
pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use api::{BookingApi, ContractApi, DraftMode, PaymentFlowApi, PaymentFlowError, WebhookApi, WebhookOutcome};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
