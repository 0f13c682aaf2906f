use crate::core::config::GeminiProviderConfig;
use crate::core::{ExtractedCandidate, StatementExtractor};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, warn};

const PROMPT: &str = "Analyze the following bank statement lines and extract the recurring monthly \
subscriptions they contain. Look for services such as Netflix, Hulu, HBO, gyms, Spotify, Amazon, \
Adobe, Microsoft or Zoom.\nStatement text:\n";

/// Extracts subscriptions from statement text with the Gemini API.
pub struct GeminiExtractor {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiExtractor {
    pub fn new(config: &GeminiProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("subaudit/1.0")
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            client,
        })
    }

    fn request_body(text: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": format!("{PROMPT}{text}") }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": {
                                "type": "STRING",
                                "description": "Commercial name of the subscription service"
                            },
                            "price": {
                                "type": "NUMBER",
                                "description": "Monthly cost estimated from the statement"
                            },
                            "category": {
                                "type": "STRING",
                                "description": "Category like Entertainment, Software, Fitness, Utilities"
                            }
                        },
                        "required": ["name", "price", "category"]
                    }
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, if the model produced any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl StatementExtractor for GeminiExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedCandidate>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("No Gemini API key configured"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("Requesting statement extraction from {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(text))
            .send()
            .await
            .context("Failed to send extraction request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to get extraction response text")?;

        if !status.is_success() {
            bail!(
                "Extraction request failed with status {}: '{}'",
                status,
                response_text
            );
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&response_text)
            .with_context(|| {
                format!("Failed to parse extraction response. Response: '{response_text}'")
            })?;

        let Some(payload) = envelope.text() else {
            warn!("Extraction returned an empty response");
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<ExtractedCandidate>>(payload.trim()) {
            Ok(candidates) => {
                debug!("Extracted {} candidates", candidates.len());
                Ok(candidates)
            }
            Err(e) => {
                error!(
                    error = ?e,
                    response = %payload,
                    "Failed to parse extracted subscriptions"
                );
                Ok(Vec::new())
            }
        }
    }
}
