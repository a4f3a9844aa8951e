//! AI-feedback client: the mission guide persona that judges whether a
//! research question is measurable and suggests topic ideas.
//!
//! The client is infallible from the caller's perspective. HTTP or parse
//! failures are logged and absorbed into a safe fallback value, and without
//! an API key a deterministic offline heuristic stands in, so the mission
//! flow never blocks on the network. The store is never informed of failure
//! modes - it only ever sees the resulting boolean and string.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

mod offline;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_ERROR_BODY_BYTES: usize = 2 * 1024;

const VALIDATION_SYSTEM_INSTRUCTION: &str = "Eres \"El guardián del agua\", un guía de misión \
ingenioso y motivador para estudiantes de secundaria mexicanos. Tu tono es enérgico, usas \
modismos mexicanos y eres un bromista nato. Analiza la pregunta del estudiante. Responde \
ÚNICAMENTE con un objeto JSON válido con la siguiente estructura: {\"is_measurable\": boolean, \
\"feedback\": string}.\n\
- Si la pregunta es medible (contiene o implica números, porcentajes, mediciones, tiempo, \
etc.), asigna 'is_measurable' a true. El 'feedback' debe ser una felicitación entusiasta en \
español mexicano.\n\
- Si la pregunta NO es medible, asigna 'is_measurable' a false. El 'feedback' debe ser una \
guía socrática, sin dar la respuesta, para que reformulen la pregunta usando términos \
medibles. ¡No seas aburrido!";

const INSPIRATION_SYSTEM_INSTRUCTION: &str = "Eres \"El guardián del agua\", un guía de misión \
para estudiantes de secundaria mexicanos. El equipo te da un tema y tú propones ideas cortas de \
preguntas de investigación medibles sobre ese tema. Responde ÚNICAMENTE con un objeto JSON \
válido con la estructura {\"ideas\": [string]}: tres ideas, cada una una pregunta medible en \
español, con números, porcentajes o tiempos.";

/// Verdict on a research question: measurable or not, plus guide feedback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionVerdict {
    pub is_measurable: bool,
    pub feedback: String,
}

/// Topic inspiration: an ordered list of candidate research questions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicIdeas {
    pub ideas: Vec<String>,
}

#[derive(Debug, Error)]
enum FeedbackError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response carried no content")]
    MissingContent,
    #[error("response was not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub struct FeedbackClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl FeedbackClient {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: http_client(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build a client from the `GEMINI_API_KEY` environment variable.
    /// A missing key selects the offline heuristic, not an error.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env::var(API_KEY_ENV).ok())
    }

    /// Point the client at a different API host (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Judge whether a research question is measurable.
    ///
    /// Never fails: without a key the offline heuristic answers, and any
    /// API failure collapses into a safe negative verdict.
    pub async fn assess_question(&self, question: &str) -> QuestionVerdict {
        let Some(key) = self.api_key.clone() else {
            tracing::debug!("No API key set; answering with the offline heuristic");
            return offline::assess_question(question);
        };
        match self
            .generate(&key, VALIDATION_SYSTEM_INSTRUCTION, question, verdict_schema())
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Question assessment failed: {e}");
                QuestionVerdict {
                    is_measurable: false,
                    feedback: offline::ERROR_FEEDBACK.to_string(),
                }
            }
        }
    }

    /// Suggest measurable research questions for a topic.
    ///
    /// Never fails: without a key the canned offline ideas answer, and any
    /// API failure collapses into an empty list.
    pub async fn suggest_topics(&self, topic: &str) -> TopicIdeas {
        let Some(key) = self.api_key.clone() else {
            tracing::debug!("No API key set; answering with the offline ideas");
            return offline::suggest_topics(topic);
        };
        match self
            .generate(&key, INSPIRATION_SYSTEM_INSTRUCTION, topic, ideas_schema())
            .await
        {
            Ok(ideas) => ideas,
            Err(e) => {
                tracing::warn!("Topic suggestion failed: {e}");
                TopicIdeas { ideas: Vec::new() }
            }
        }
    }

    /// One `generateContent` round trip with a JSON response schema.
    async fn generate<T: serde::de::DeserializeOwned>(
        &self,
        api_key: &str,
        system_instruction: &str,
        contents: &str,
        schema: Value,
    ) -> Result<T, FeedbackError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": contents }] }],
            "system_instruction": { "parts": [{ "text": system_instruction }] },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(MAX_ERROR_BODY_BYTES);
            return Err(FeedbackError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let text = payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or(FeedbackError::MissingContent)?;
        Ok(serde_json::from_str(text)?)
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeouts, using defaults: {e}");
            reqwest::Client::new()
        })
}

fn verdict_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_measurable": { "type": "BOOLEAN" },
            "feedback": { "type": "STRING" }
        }
    })
}

fn ideas_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ideas": { "type": "ARRAY", "items": { "type": "STRING" } }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::FeedbackClient;

    #[test]
    fn blank_api_key_counts_as_absent() {
        assert!(!FeedbackClient::new(None).has_api_key());
        assert!(!FeedbackClient::new(Some("   ".to_string())).has_api_key());
        assert!(FeedbackClient::new(Some("k".to_string())).has_api_key());
    }
}
