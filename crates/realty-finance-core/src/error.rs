use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealtyFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}: result exceeds the decimal range")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RealtyFinanceError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        RealtyFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: &str) -> Self {
        RealtyFinanceError::Overflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for RealtyFinanceError {
    fn from(e: serde_json::Error) -> Self {
        RealtyFinanceError::SerializationError(e.to_string())
    }
}
