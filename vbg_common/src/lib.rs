mod amount;
mod secret;

pub use amount::{Amount, AmountConversionError, DEFAULT_CURRENCY, DEFAULT_DEPOSIT_PERCENT, MAX_DEPOSIT_PERCENT, MIN_DEPOSIT_PERCENT};
pub use secret::Secret;
