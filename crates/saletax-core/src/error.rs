use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaleTaxError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid rate schedule: {field} — {reason}")]
    InvalidSchedule { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SaleTaxError {
    fn from(e: serde_json::Error) -> Self {
        SaleTaxError::SerializationError(e.to_string())
    }
}
