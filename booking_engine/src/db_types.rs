use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use vbg_common::Amount;

//--------------------------------------     BookingId       ---------------------------------------------------------
/// A lightweight wrapper around the externally referenceable booking identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl BookingId {
    /// Generates a fresh random id. Assigned once at creation and immutable thereafter.
    pub fn random() -> Self {
        let bytes = rand::thread_rng().gen::<[u8; 12]>();
        let id = bytes.iter().fold(String::with_capacity(24), |mut s, b| {
            s.push_str(&format!("{b:02x}"));
            s
        });
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BookingId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
/// The payment lifecycle of a booking.
///
/// `Pending → DepositPaid → Paid`, with `Failed` reachable from any non-terminal state. `Pending → Paid` is an
/// accepted fallback for processors that send a single charge event for a combined payment. No transition leaves
/// `Paid`. Only the webhook reconciler advances this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The booking exists but no payment has been confirmed yet.
    Pending,
    /// The deposit has been confirmed by the payment processor.
    DepositPaid,
    /// The booking is fully paid. Terminal.
    Paid,
    /// A payment failure signal was received. Not exercised by the current event set, but preserved.
    Failed,
}

impl PaymentStatus {
    pub fn has_deposit_paid(&self) -> bool {
        matches!(self, Self::DepositPaid | Self::Paid)
    }

    pub fn is_fully_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::DepositPaid => write!(f, "deposit_paid"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment status: {0}")]
pub struct ConversionError(String);

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "deposit_paid" => Ok(Self::DepositPaid),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   PaymentPurpose    ---------------------------------------------------------
/// What a payment request is collecting money for. Carried in processor metadata and echoed back in webhook events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    Deposit,
    FinalPayment,
}

impl PaymentPurpose {
    /// Webhook metadata that names any purpose other than `deposit` is treated as the final payment.
    pub fn from_metadata(s: &str) -> Self {
        if s == "deposit" {
            Self::Deposit
        } else {
            Self::FinalPayment
        }
    }
}

impl Display for PaymentPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::FinalPayment => write!(f, "final_payment"),
        }
    }
}

//--------------------------------------   ContractStatus    ---------------------------------------------------------
/// Raw contract status as persisted. `Sent` exists in the schema for forward compatibility; nothing transitions
/// into it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    None,
    Draft,
    Sent,
    Signed,
}

impl Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::Signed => write!(f, "signed"),
        }
    }
}

//--------------------------------------     Contract        ---------------------------------------------------------
/// The contract sub-record as a tagged variant, with "no contract yet" as a first-class state rather than a pile of
/// nullable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Contract {
    None,
    Draft {
        draft_url: String,
        created_at: DateTime<Utc>,
    },
    Sent {
        draft_url: String,
        created_at: DateTime<Utc>,
    },
    Signed {
        draft_url: Option<String>,
        signed_url: String,
        signer_name: String,
        created_at: Option<DateTime<Utc>>,
        signed_at: DateTime<Utc>,
    },
}

impl Contract {
    pub fn status(&self) -> ContractStatus {
        match self {
            Self::None => ContractStatus::None,
            Self::Draft { .. } => ContractStatus::Draft,
            Self::Sent { .. } => ContractStatus::Sent,
            Self::Signed { .. } => ContractStatus::Signed,
        }
    }

    /// True once a draft (or any later state) exists.
    pub fn has_draft(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn draft_url(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Draft { draft_url, .. } | Self::Sent { draft_url, .. } => Some(draft_url),
            Self::Signed { draft_url, .. } => draft_url.as_deref(),
        }
    }
}

//--------------------------------------  PaymentReceipts    ---------------------------------------------------------
/// Receipt URLs for the two payments of a booking. Each key is set at most once; duplicate webhook deliveries never
/// overwrite an existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<String>,
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_payment: Option<String>,
}

//--------------------------------------      Booking        ---------------------------------------------------------
/// The persisted booking record. One row per booking; the unit of consistency for the payment and contract state
/// machines.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub customer_name: String,
    pub customer_email: String,
    pub event_date: DateTime<Utc>,
    pub hall: String,
    pub package: String,
    pub guests: i64,
    pub notes: Option<String>,
    pub total_price: Amount,
    pub deposit_percent: i64,
    /// Computed once at creation as round-half-up(percent/100 × total). Immutable thereafter.
    pub deposit_amount: Amount,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub customer_ref: Option<String>,
    pub deposit_payment_ref: Option<String>,
    pub final_payment_ref: Option<String>,
    pub deposit_receipt_url: Option<String>,
    pub final_receipt_url: Option<String>,
    pub contract_status: ContractStatus,
    pub contract_draft_url: Option<String>,
    pub contract_signed_url: Option<String>,
    pub contract_signer_name: Option<String>,
    pub contract_created_at: Option<DateTime<Utc>>,
    pub contract_signed_at: Option<DateTime<Utc>>,
    pub deposit_paid_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn remaining_amount(&self) -> Amount {
        self.total_price.remaining_after(self.deposit_amount)
    }

    pub fn has_deposit_paid(&self) -> bool {
        self.payment_status.has_deposit_paid()
    }

    pub fn is_fully_paid(&self) -> bool {
        self.payment_status.is_fully_paid()
    }

    pub fn receipts(&self) -> PaymentReceipts {
        PaymentReceipts { deposit: self.deposit_receipt_url.clone(), final_payment: self.final_receipt_url.clone() }
    }

    /// Assembles the tagged contract state from the flat columns. Rows whose status disagrees with the populated
    /// columns (which only an out-of-band edit could produce) degrade to the closest consistent state.
    pub fn contract(&self) -> Contract {
        match self.contract_status {
            ContractStatus::None => Contract::None,
            ContractStatus::Draft => match (&self.contract_draft_url, self.contract_created_at) {
                (Some(url), Some(created_at)) => Contract::Draft { draft_url: url.clone(), created_at },
                _ => Contract::None,
            },
            ContractStatus::Sent => match (&self.contract_draft_url, self.contract_created_at) {
                (Some(url), Some(created_at)) => Contract::Sent { draft_url: url.clone(), created_at },
                _ => Contract::None,
            },
            ContractStatus::Signed => match (&self.contract_signed_url, &self.contract_signer_name, self.contract_signed_at) {
                (Some(signed_url), Some(signer_name), Some(signed_at)) => Contract::Signed {
                    draft_url: self.contract_draft_url.clone(),
                    signed_url: signed_url.clone(),
                    signer_name: signer_name.clone(),
                    created_at: self.contract_created_at,
                    signed_at,
                },
                _ => Contract::None,
            },
        }
    }
}

//--------------------------------------     NewBooking      ---------------------------------------------------------
/// A booking request as submitted by a client, before the record exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub event_date: DateTime<Utc>,
    pub hall: String,
    pub package: String,
    pub guests: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub total_price: Amount,
    #[serde(default = "default_deposit_percent")]
    pub deposit_percent: u8,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_deposit_percent() -> u8 {
    vbg_common::DEFAULT_DEPOSIT_PERCENT
}

fn default_currency() -> String {
    vbg_common::DEFAULT_CURRENCY.to_string()
}

impl NewBooking {
    pub fn deposit_amount(&self) -> Amount {
        self.total_price.deposit_at_percent(self.deposit_percent)
    }

    /// Checks the commercial invariants. Returns the first violation as a human-readable message.
    pub fn validate(&self) -> Result<(), String> {
        if !self.total_price.is_positive() {
            return Err("total_price must be a positive amount".to_string());
        }
        if !(vbg_common::MIN_DEPOSIT_PERCENT..=vbg_common::MAX_DEPOSIT_PERCENT).contains(&self.deposit_percent) {
            return Err(format!(
                "deposit_percent must be between {} and {}",
                vbg_common::MIN_DEPOSIT_PERCENT,
                vbg_common::MAX_DEPOSIT_PERCENT
            ));
        }
        if self.guests < 1 {
            return Err("guests must be at least 1".to_string());
        }
        if self.customer_name.trim().is_empty() {
            return Err("customer_name is required".to_string());
        }
        if self.customer_email.trim().is_empty() {
            return Err("customer_email is required".to_string());
        }
        if self.hall.trim().is_empty() {
            return Err("hall is required".to_string());
        }
        if self.package.trim().is_empty() {
            return Err("package is required".to_string());
        }
        Ok(())
    }
}
