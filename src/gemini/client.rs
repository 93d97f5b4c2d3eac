//! HTTP transport to the Gemini generateContent API.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GeminiError;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "GITMUSE_TIMEOUT";

/// A single generation request: the assistant role plus the repository state.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_message: String,
}

/// Get the configured request timeout.
///
/// Reads from GITMUSE_TIMEOUT (seconds) if set, otherwise uses the default.
/// Logs a warning if the variable holds an invalid value.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

// ── request/response bodies ──

#[derive(Serialize)]
struct GenerateContentBody<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// Error envelope the API returns on non-2xx responses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GeminiError {
    /// Whether this error is a rate-limit signal.
    ///
    /// The API surfaces quota exhaustion as HTTP 429 with a
    /// `RESOURCE_EXHAUSTED` status, but the message wording has changed
    /// across API revisions, so the markers are matched here in one place.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GeminiError::Api {
                code,
                status,
                message,
            } => {
                *code == 429
                    || status.as_deref() == Some("RESOURCE_EXHAUSTED")
                    || message.contains("Too Many Requests")
                    || message.to_ascii_lowercase().contains("quota")
            }
            _ => false,
        }
    }
}

/// Client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, API_BASE_URL)
    }

    /// Build a client against a custom endpoint. Used by tests.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(get_timeout())
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Run one generation call against the given model.
    ///
    /// Returns the concatenated candidate text. Non-2xx responses become
    /// [`GeminiError::Api`] with the envelope's message and status so the
    /// caller can classify rate limiting.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let body = GenerateContentBody {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_prompt,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.user_message,
                }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(GeminiError::Http)?;

        let code = response.status().as_u16();
        if !response.status().is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(parse_api_error(code, &raw));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(GeminiError::Http)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Turn a non-2xx response body into an [`GeminiError::Api`].
///
/// Falls back to the raw body when the error envelope doesn't parse.
fn parse_api_error(code: u16, raw: &str) -> GeminiError {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(envelope) => GeminiError::Api {
            code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => GeminiError::Api {
            code,
            status: None,
            message: raw.trim().to_string(),
        },
    }
}
