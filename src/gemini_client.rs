use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Current stable model recommendation (2026).
pub const MODEL_NAME: &str = "gemini-2.5-flash";

/// Decoding parameters are fixed; there is no per-request override surface.
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The one error kind a generation can fail with. Callers surface the
/// display text and return the session to idle; no variant is meant to be
/// matched on.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to Gemini failed: {0}")]
    Transport(reqwest::Error),
    #[error("Gemini API error: {0}")]
    Api(String),
    #[error("Gemini returned no usable text")]
    EmptyResponse,
}

/// `reqwest::Error` prints the request URL, and the Gemini URL carries the
/// API key in its query string. Strip the URL before the error can reach
/// logs or the page.
impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

/// Boundary for issuing one text-generation call per user turn. The turn
/// handler only ever sees this trait, which keeps the transport swappable
/// in tests.
#[async_trait]
pub trait GenerateText: Send + Sync {
    async fn generate(&self, full_prompt: &str) -> Result<String, GenerationError>;
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    // Safety-blocked candidates come back without content.
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: MODEL_NAME.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{API_BASE}/{model}:generateContent?key={key}",
            model = self.model,
            key = self.api_key
        )
    }
}

fn request_body(full_prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: full_prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    }
}

/// Concatenated text parts of the first candidate, trimmed, or
/// `EmptyResponse` if nothing usable came back.
fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    let text = candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl GenerateText for GeminiClient {
    async fn generate(&self, full_prompt: &str) -> Result<String, GenerationError> {
        let body = request_body(full_prompt);
        debug!(
            "Sending generateContent request to {} ({} prompt bytes)",
            self.model,
            full_prompt.len()
        );

        // The endpoint URL carries the API key; it must never be logged.
        let response = self.http.post(self.endpoint()).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            error!("Gemini API request failed with status {status}: {error_text}");
            return Err(GenerationError::Api(format!("{status}: {error_text}")));
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}
