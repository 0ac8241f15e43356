//! The generative-model "oracle": an opaque request/response function.
//!
//! Everything that looks like intelligence (meter detection, scoring,
//! profiling, poem writing) happens on the other side of [`Oracle::generate`].

pub mod gemini;
pub mod prosody;
pub mod schema;
#[cfg(test)]
pub(crate) mod scripted;

use serde_json::Value;

use crate::error::Result;

/// One call to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct OracleRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub prompt: String,
    /// JSON response schema. When set the model is asked for
    /// `application/json` output conforming to it.
    pub response_schema: Option<Value>,
}

impl OracleRequest {
    pub fn text(model: &str, system_instruction: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            system_instruction: Some(system_instruction.to_string()),
            prompt,
            response_schema: None,
        }
    }

    pub fn structured(model: &str, system_instruction: &str, prompt: String, schema: Value) -> Self {
        Self {
            response_schema: Some(schema),
            ..Self::text(model, system_instruction, prompt)
        }
    }
}

/// A blocking model call. Implementations return the model's raw text.
///
/// Transport problems map to [`AppError::OracleTransport`](crate::error::AppError::OracleTransport);
/// a reply with no usable text maps to
/// [`AppError::OracleSchema`](crate::error::AppError::OracleSchema).
pub trait Oracle: Send + Sync {
    fn generate(&self, request: &OracleRequest) -> Result<String>;
}
