//! Error types for the premium model
//!
//! Only conditions that halt a computation live here. Recoverable numeric
//! degradations are reported through [`crate::diagnostics::Diagnostics`].

use thiserror::Error;

/// Result type alias using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid loss window: d = {d} must not exceed u = {u}")]
    InvalidWindow { d: i64, u: i64 },

    #[error("Division by zero: (1 - QT) * n is zero (QT = {qt}, n = {n})")]
    DivisionByZero { qt: f64, n: u32 },

    #[error("Lambda value '{item}' is not a number; enter comma-separated numbers")]
    LambdaParse { item: String },

    #[error("Pipeline is at stage {current}, cannot run stage {requested}")]
    StageOrder { current: u8, requested: u8 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        ModelError::InvalidParameter { name, value, reason }
    }
}
