use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayoffError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Payment too low: {payment} does not cover monthly interest of {interest}")]
    PaymentTooLow { payment: Decimal, interest: Decimal },

    #[error("Payoff exceeds horizon: balance is not repaid within {horizon_months} months")]
    PayoffExceedsHorizon { horizon_months: u32 },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PayoffError {
    /// Stable machine-readable code used in boundary error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            PayoffError::InvalidInput { .. } => "invalid_input",
            PayoffError::PaymentTooLow { .. } => "payment_too_low",
            PayoffError::PayoffExceedsHorizon { .. } => "payoff_exceeds_horizon",
            PayoffError::DateError(_) => "date_error",
            PayoffError::SerializationError(_) => "serialization_error",
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PayoffError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PayoffError {
    fn from(e: serde_json::Error) -> Self {
        PayoffError::SerializationError(e.to_string())
    }
}
