//! Error taxonomy shared by the analyzer and the prosody lab.

use rust_i18n::t;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed user input. Caught before any oracle call.
    #[error("validation error: {0}")]
    Validation(String),

    /// A request is already outstanding.
    #[error("an oracle request is already in flight")]
    Busy,

    #[error("oracle transport error: {0}")]
    OracleTransport(String),

    /// The oracle answered, but not in the shape we asked for.
    #[error("oracle schema error: {0}")]
    OracleSchema(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("no history record with id {0}")]
    UnknownRecord(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Text shown to the user. Transport and schema failures are deliberately
    /// indistinguishable here; the detail goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Busy => t!("errors.busy").to_string(),
            AppError::OracleTransport(_) | AppError::OracleSchema(_) => {
                t!("errors.oracle_failed").to_string()
            }
            AppError::Storage(_) => t!("errors.storage").to_string(),
            AppError::InvalidTransition { .. } => t!("errors.not_now").to_string(),
            AppError::UnknownRecord(_) => t!("errors.unknown_record").to_string(),
            AppError::Config(msg) => t!("errors.config", detail = msg).to_string(),
            AppError::Clipboard(_) => t!("errors.clipboard").to_string(),
            AppError::Io(e) => t!("errors.io", detail = e.to_string()).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_schema_share_user_message() {
        let transport = AppError::OracleTransport("connection reset".into());
        let schema = AppError::OracleSchema("missing field `meter`".into());
        assert_eq!(transport.user_message(), schema.user_message());
        assert!(!transport.user_message().contains("connection reset"));
    }

    #[test]
    fn validation_message_passes_through() {
        let err = AppError::Validation("primary subject is required".into());
        assert_eq!(err.user_message(), "primary subject is required");
    }
}
