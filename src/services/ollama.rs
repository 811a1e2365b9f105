//! Model service backed by a local Ollama-compatible server.
//!
//! The structured-output calls use `/api/generate` with `stream: false` and
//! a JSON schema in the `format` field, so the model's reply parses straight
//! into the result types.

use super::{ExtractionService, GenerationService};
use crate::error::{ServiceError, ServiceResult};
use crate::types::{Extraction, Generation, InputSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};

/// Extraction and generation backed by a local model server.
pub struct OllamaService {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: Value,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaService {
    /// Create a service against the given server URL and model name.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Check whether the server is reachable and the model is present.
    pub async fn check_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        let Ok(response) = self.client.get(&url).send().await else {
            return false;
        };
        if !response.status().is_success() {
            return false;
        }

        #[derive(serde::Deserialize)]
        struct ListResponse {
            models: Vec<ModelEntry>,
        }
        #[derive(serde::Deserialize)]
        struct ModelEntry {
            name: String,
        }

        match response.json::<ListResponse>().await {
            Ok(list) => list.models.iter().any(|m| m.name.contains(&self.model)),
            Err(_) => false,
        }
    }

    /// Run one structured-generation round trip and parse the reply.
    async fn generate_structured<T: serde::de::DeserializeOwned>(
        &self,
        prompt: String,
        schema: Value,
    ) -> ServiceResult<T> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            format: schema,
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "model server unreachable");
                ServiceError::Unavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Invalid(format!("{status}: {body}")));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Invalid(e.to_string()))?;

        serde_json::from_str(&reply.response).map_err(|e| ServiceError::Invalid(e.to_string()))
    }
}

fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": {"type": "string"}
            },
            "suggested_title": {"type": "string"},
            "category": {
                "type": "string",
                "enum": ["shopping", "task", "procedure", "travel", "cooking", "other"]
            }
        },
        "required": ["items", "suggested_title", "category"]
    })
}

fn generation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "note": {"type": "string"},
                        "priority": {
                            "type": "string",
                            "enum": ["high", "medium", "low"]
                        }
                    },
                    "required": ["name", "priority"]
                }
            },
            "title": {"type": "string"},
            "tips": {"type": "string"},
            "category": {
                "type": "string",
                "enum": ["shopping", "task", "procedure", "travel", "cooking", "other"]
            }
        },
        "required": ["items", "title", "category"]
    })
}

#[async_trait]
impl ExtractionService for OllamaService {
    async fn extract(&self, text: &str, source: InputSource) -> ServiceResult<Extraction> {
        let source_phrase = match source {
            InputSource::Photo => "captured from a photo",
            InputSource::Voice => "transcribed from speech",
            InputSource::Text => "typed in",
            InputSource::AiGenerated => "provided",
        };

        let prompt = format!(
            "Analyze the following text ({source_phrase}) and extract the entries that belong \
             on a checklist.\n\n\
             - Phrase each entry as a concrete, actionable item\n\
             - Merge duplicates and drop noise\n\
             - Suggest a fitting title and a category (shopping, task, procedure, travel, \
             cooking, other)\n\n\
             Input text:\n{text}"
        );

        let extraction: Extraction = self.generate_structured(prompt, extraction_schema()).await?;
        if extraction.items.is_empty() {
            return Err(ServiceError::Empty);
        }
        Ok(extraction)
    }
}

#[async_trait]
impl GenerationService for OllamaService {
    async fn generate(&self, condition: &str) -> ServiceResult<Generation> {
        let prompt = format!(
            "Create a practical checklist for \"{condition}\".\n\n\
             Requirements:\n\
             - Cover the items generally needed, without gaps\n\
             - Give each item a priority (high, medium, low)\n\
             - Add a short note to the important items\n\
             - Offer practical advice in the tips field\n\
             - Pick a category (shopping, task, procedure, travel, cooking, other)"
        );

        let generation: Generation = self.generate_structured(prompt, generation_schema()).await?;
        if generation.items.is_empty() {
            return Err(ServiceError::Empty);
        }
        Ok(generation)
    }
}

impl std::fmt::Debug for OllamaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaService")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
