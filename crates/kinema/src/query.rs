//! Asking for a scenario.
//!
//! A [`ScenarioSource`] turns a free-text question into a validated
//! [`Scenario`]. [`GeminiClient`] asks the model service over HTTP;
//! [`FixtureSource`] serves a scenario stored on disk. Both share
//! [`parse_scenario`], so a fixture and a live answer are held to the same
//! schema.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::{API_KEY_ENV, Config};
use crate::model::Scenario;
use crate::prompt::INSTRUCTIONS;

/// Result alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Why a question produced no scenario.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// No API key is configured.
    #[error("No API key configured. Set {API_KEY_ENV} or add api_key to the config file.")]
    MissingCredential,

    /// The service answered `{}`: it judged the question unanimatable.
    #[error(
        "I couldn't generate a simple animation for that question. \
         Try a simpler motion problem like a projectile or a braking car."
    )]
    EmptyResult,

    /// Network error or non-success HTTP status.
    #[error(
        "Request failed{}: {message}",
        .status.map(|s| format!(" ({s})")).unwrap_or_default()
    )]
    TransportFailure {
        /// HTTP status, when the service answered at all.
        status: Option<u16>,
        /// What went wrong.
        message: String,
    },

    /// The answer is not JSON matching the scenario schema.
    #[error("The answer could not be read: {0}")]
    MalformedResponse(String),
}

impl QueryError {
    fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        Self::TransportFailure {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Something that answers questions with scenarios.
pub trait ScenarioSource: Send + Sync {
    /// Answers `query`.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`]; callers surface it unchanged.
    fn ask(&self, query: &str) -> Result<Scenario>;
}

/// Parses a model answer into a scenario.
///
/// Accepts the answer wrapped in a Markdown code fence. An empty object is
/// the service's way of declining and maps to [`QueryError::EmptyResult`].
///
/// # Errors
///
/// [`QueryError::EmptyResult`] for `{}`, [`QueryError::MalformedResponse`]
/// for anything that is not a valid scenario.
pub fn parse_scenario(text: &str) -> Result<Scenario> {
    let body = strip_fence(text.trim());
    if body.is_empty() {
        return Err(QueryError::EmptyResult);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| QueryError::MalformedResponse(e.to_string()))?;

    match &value {
        Value::Object(map) if map.is_empty() => return Err(QueryError::EmptyResult),
        Value::Object(_) => {}
        other => {
            return Err(QueryError::MalformedResponse(format!(
                "expected a JSON object, found {}",
                kind_of(other)
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| QueryError::MalformedResponse(e.to_string()))
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate; `{}` when there is none.
    fn text(&self) -> String {
        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            "{}".to_string()
        } else {
            text
        }
    }
}

/// Asks the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    /// Builds a client from the configuration.
    ///
    /// A missing key is not an error here; [`ask`](ScenarioSource::ask)
    /// reports it.
    ///
    /// # Errors
    ///
    /// [`QueryError::TransportFailure`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("kinema/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a key is configured.
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// The `generateContent` URL.
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// The JSON body sent for `query`.
    pub fn request_body(query: &str) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": INSTRUCTIONS }] },
            "contents": [{ "role": "user", "parts": [{ "text": query }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        })
    }

    fn send(&self, key: &str, query: &str) -> Result<Scenario> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&Self::request_body(query))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(QueryError::TransportFailure {
                status: Some(status.as_u16()),
                message: summarize(&message),
            });
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| QueryError::MalformedResponse(e.to_string()))?;
        let text = body.text();
        debug!(bytes = text.len(), "model answer received");

        parse_scenario(&text)
    }
}

impl ScenarioSource for GeminiClient {
    fn ask(&self, query: &str) -> Result<Scenario> {
        let Some(key) = self.api_key.as_deref() else {
            warn!("no API key configured");
            return Err(QueryError::MissingCredential);
        };

        info!(model = %self.model, query_len = query.len(), "asking model service");
        let result = self.send(key, query);
        if let Err(err) = &result {
            warn!(%err, "query failed");
        }
        result
    }
}

/// Shortens an error body to its service message when it has one.
fn summarize(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

/// Serves a stored scenario, whatever the question.
#[derive(Debug, Clone)]
pub enum FixtureSource {
    /// Re-read from disk on every question.
    File(PathBuf),
    /// Held in memory.
    Scenario(Box<Scenario>),
}

impl FixtureSource {
    /// Serves the scenario in `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Serves `scenario`.
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self::Scenario(Box::new(scenario))
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// [`QueryError::TransportFailure`] if the file cannot be read, otherwise
    /// whatever [`parse_scenario`] reports.
    pub fn load(path: &Path) -> Result<Scenario> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| QueryError::transport(format!("{}: {e}", path.display())))?;
        parse_scenario(&text)
    }
}

impl ScenarioSource for FixtureSource {
    fn ask(&self, query: &str) -> Result<Scenario> {
        debug!(query_len = query.len(), "answering from fixture");
        match self {
            Self::File(path) => Self::load(path),
            Self::Scenario(scenario) => Ok((**scenario).clone()),
        }
    }
}
