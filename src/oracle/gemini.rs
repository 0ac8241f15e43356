//! Gemini `generateContent` client (blocking reqwest).

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::oracle::{Oracle, OracleRequest};

/// Upper bound on how much of an HTTP error body ends up in error messages
/// and logs.
const MAX_ERROR_BODY_LEN: usize = 200;

pub struct GeminiClient {
    base_url: String,
    api_key: String,
    #[cfg(feature = "network")]
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("empty oracle API key".to_string()));
        }
        #[cfg(feature = "network")]
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("http client: {e}")))?;
        #[cfg(not(feature = "network"))]
        let _ = timeout;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            #[cfg(feature = "network")]
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(
            &config.oracle_base_url,
            api_key,
            Duration::from_secs(config.oracle_timeout_secs),
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Build the JSON body for a `generateContent` call.
    pub fn build_body(request: &OracleRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }]
        });
        if let Some(system) = &request.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        if let Some(schema) = &request.response_schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema
            });
        }
        body
    }

    /// Concatenate the text parts of the first candidate.
    pub fn extract_text(response: &Value) -> Result<String> {
        let Some(candidate) = response.pointer("/candidates/0") else {
            let reason = response
                .pointer("/promptFeedback/blockReason")
                .and_then(|v| v.as_str())
                .unwrap_or("no candidates");
            return Err(AppError::OracleSchema(format!("empty reply: {reason}")));
        };

        let text: String = candidate
            .pointer("/content/parts")
            .and_then(|v| v.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let finish = candidate
                .get("finishReason")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            return Err(AppError::OracleSchema(format!(
                "candidate has no text (finishReason {finish})"
            )));
        }
        Ok(text)
    }
}

#[cfg(feature = "network")]
impl Oracle for GeminiClient {
    fn generate(&self, request: &OracleRequest) -> Result<String> {
        let body = Self::build_body(request);
        debug!(model = %request.model, structured = request.response_schema.is_some(), "oracle call");

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AppError::OracleTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            let err = map_http_error(status.as_u16(), &error_body);
            warn!(status = status.as_u16(), error = %err, "oracle call failed");
            return Err(err);
        }

        let json: Value = response
            .json()
            .map_err(|e| AppError::OracleSchema(format!("response is not JSON: {e}")))?;
        Self::extract_text(&json)
    }
}

#[cfg(not(feature = "network"))]
impl Oracle for GeminiClient {
    fn generate(&self, request: &OracleRequest) -> Result<String> {
        let _ = (self.endpoint(&request.model), &self.api_key);
        Err(AppError::OracleTransport(
            "built without the `network` feature".to_string(),
        ))
    }
}

fn map_http_error(status: u16, body: &str) -> AppError {
    let safe_body = if body.chars().count() > MAX_ERROR_BODY_LEN {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{truncated}…[truncated]")
    } else {
        body.to_string()
    };

    let msg = match status {
        401 | 403 => "unauthorized: check the oracle API key".to_string(),
        429 => "rate limited by the oracle".to_string(),
        s if s >= 500 => format!("oracle unavailable ({s}): {safe_body}"),
        s => format!("HTTP {s}: {safe_body}"),
    };
    AppError::OracleTransport(msg)
}
