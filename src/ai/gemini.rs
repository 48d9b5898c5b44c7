use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::ai::prompt::{build_prompt, parse_payload, response_schema};
use crate::ai::Recommender;
use crate::config::AiConfig;
use crate::error::{AppError, RecommendationError};
use crate::models::fleet::{Driver, Truck};
use crate::models::trip::{RecommendationResponse, TripRequest};

/// Client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() { None } else { Some(text) }
    }
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AppError::Internal(format!("failed to create http client: {err}")))?;

        tracing::info!(
            base_url = %config.base_url,
            model = %config.model,
            has_api_key = config.api_key.is_some(),
            "recommendation client initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
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
impl Recommender for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn recommend(
        &self,
        request: &TripRequest,
        trucks: &[Truck],
        drivers: &[Driver],
    ) -> Result<RecommendationResponse, RecommendationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            RecommendationError::Authentication("no API key configured".to_string())
        })?;

        let prompt = build_prompt(request, trucks, drivers)?;
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [TextPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let url = self.endpoint();
        debug!(url = %url, "recommendation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "recommendation request failed");
                RecommendationError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_failure(status, &body);
            error!(status = %status, kind = err.kind(), "recommendation service error");
            return Err(err);
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|err| {
            error!(error = %err, "failed to decode recommendation envelope");
            RecommendationError::Schema(format!("invalid response envelope: {err}"))
        })?;

        let text = envelope.text().ok_or(RecommendationError::EmptyResponse)?;
        parse_payload(&text)
    }
}

/// Maps a non-success HTTP answer onto an error kind.
pub fn classify_failure(status: StatusCode, body: &str) -> RecommendationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RecommendationError::Authentication(format!("service answered {status}"))
        }
        StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") => {
            RecommendationError::Authentication("API key rejected".to_string())
        }
        _ => RecommendationError::Transport(format!("service answered {status}")),
    }
}
