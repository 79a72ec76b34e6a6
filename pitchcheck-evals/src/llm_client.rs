// Copyright 2025 Pitchcheck Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Response generation: the Gemini REST client and an offline replay generator

use crate::prompt::{PromptTemplate, TemplateError};
use async_trait::async_trait;
use pitchcheck_core::{ConfigError, ModelConfig, Scenario};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Produces one model response for a scenario
///
/// The prompt is `template` rendered with the scenario's listing payload.
/// The scenario itself is passed so offline generators can key on its name.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        template: &PromptTemplate,
        scenario: &Scenario,
    ) -> Result<String, GenerationError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Errors from response generators
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Prompt error: {0}")]
    Template(#[from] TemplateError),

    #[error("No canned response for scenario {0}")]
    NoCannedResponse(String),

    #[error("Failed to read responses from {path}: {message}")]
    Responses { path: PathBuf, message: String },
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: pitchcheck_core::DEFAULT_BASE_URL.to_string(),
            temperature: 0.2,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from explicit model settings
    pub fn from_config(config: &ModelConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "model.timeout_secs".to_string(),
                value: e.to_string(),
            })?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            temperature: config.temperature,
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send an already rendered prompt
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::MissingCredentials(
                "GEMINI_API_KEY is empty".to_string(),
            ));
        }

        let request = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": { "temperature": self.temperature }
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(GenerationError::ApiError { status, body });
        }

        let response_data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let text = response_data.text().ok_or_else(|| {
            GenerationError::InvalidResponse("Missing candidate text".to_string())
        })?;
        debug!(model = %self.model, chars = text.chars().count(), "Received response");
        Ok(text)
    }
}

#[async_trait]
impl ResponseGenerator for GeminiClient {
    async fn generate(
        &self,
        template: &PromptTemplate,
        scenario: &Scenario,
    ) -> Result<String, GenerationError> {
        let prompt = template.render(&scenario.payload)?;
        self.complete(&prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let parts: Vec<&str> = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }
}

/// Pre-recorded responses keyed by scenario name
#[derive(Debug, Clone, Default)]
pub struct CannedResponses {
    responses: HashMap<String, String>,
}

impl CannedResponses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, scenario: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(scenario.into(), response.into());
        self
    }

    /// Load a JSON object of `{"scenario name": "response"}`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        let responses_error = |message: String| GenerationError::Responses {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| responses_error(e.to_string()))?;
        let responses: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| responses_error(e.to_string()))?;
        Ok(Self { responses })
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[async_trait]
impl ResponseGenerator for CannedResponses {
    async fn generate(
        &self,
        template: &PromptTemplate,
        scenario: &Scenario,
    ) -> Result<String, GenerationError> {
        // Render anyway so template errors surface the same way as online.
        template.render(&scenario.payload)?;
        self.responses
            .get(&scenario.name)
            .cloned()
            .ok_or_else(|| GenerationError::NoCannedResponse(scenario.name.clone()))
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pitchcheck_core::fixtures;
    use std::io::Write;

    fn template() -> PromptTemplate {
        PromptTemplate::new("Analyze:\n{data_payload}").unwrap()
    }

    fn client_for(server: &mockito::Server) -> GeminiClient {
        GeminiClient::new("test-key".to_string(), "gemini-2.0-flash".to_string())
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_gemini_generate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Regex("Waterfront Residences".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"• one\n"},{"text":"• two"}]}}]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let output = client
            .generate(&template(), &fixtures::waterfront_residences())
            .await
            .unwrap();

        assert_eq!(output, "• one\n• two");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_api_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let err = client_for(&server)
            .generate(&template(), &fixtures::compact_towers())
            .await
            .unwrap_err();

        match err {
            GenerationError::ApiError { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_gemini_empty_candidates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate(&template(), &fixtures::premium_towers())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ModelConfig::default();
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(ConfigError::MissingApiKey)
        ));

        let config = ModelConfig {
            api_key: Some("abc".to_string()),
            model: "gemini-test".to_string(),
            ..ModelConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model_name(), "gemini-test");
        assert!(client.endpoint().ends_with("/models/gemini-test:generateContent"));
    }

    #[tokio::test]
    async fn test_canned_responses() {
        let scenario = fixtures::compact_towers();
        let canned = CannedResponses::new().with_response(scenario.name.clone(), "• canned");

        assert_eq!(
            canned.generate(&template(), &scenario).await.unwrap(),
            "• canned"
        );

        let missing = canned
            .generate(&template(), &fixtures::premium_towers())
            .await
            .unwrap_err();
        assert!(matches!(missing, GenerationError::NoCannedResponse(_)));
    }

    #[test]
    fn test_canned_responses_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Compact Towers - Yield Investor": "• a\n• b"}}"#).unwrap();

        let canned = CannedResponses::from_file(file.path()).unwrap();
        assert_eq!(canned.len(), 1);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "[1, 2]").unwrap();
        assert!(matches!(
            CannedResponses::from_file(bad.path()),
            Err(GenerationError::Responses { .. })
        ));
    }
}
