//! Requests to the generative-language service.

mod prompt;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use self::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::settings::LlmSettings;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, thiserror::Error)]
pub(crate) enum RequestError {
    #[error("API key is missing; set `llm.api_key` or the API_KEY environment variable")]
    Configuration,
    #[error("model service request failed: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        RequestError::Service(ServiceError::Transport(e))
    }
}

#[async_trait]
pub(crate) trait ModelClient: Send + Sync {
    /// Sends `query` with the fixed instruction and context, returning the
    /// raw reply text. An empty reply is not an error.
    async fn generate(&self, query: &str) -> Result<String, RequestError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub(crate) struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
    client: Client,
}

impl GeminiClient {
    pub(crate) fn new(settings: &LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key().map(str::to_string),
            temperature: settings.temperature,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    #[instrument(name = "generate_content", skip(self, query), fields(model = %self.model))]
    async fn generate(&self, query: &str) -> Result<String, RequestError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RequestError::Configuration)?;

        let prompt = build_prompt(query);
        debug!(%prompt, "Built compliance prompt");

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let res = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            error!(%status, "Model service returned an error");
            return Err(ServiceError::Status { status, body: text }.into());
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(ServiceError::from)?;
        let reply = parsed.text();
        info!(len = reply.len(), "Model reply received");
        Ok(reply)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
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

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}
