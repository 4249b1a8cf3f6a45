use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ai_service::{GenerationOutcome, GenerationRequest, GenerationService};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GroundingMetadata>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    web_search_queries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for the Gemini `generateContent` REST endpoint.
///
/// Built once at startup and shared read-only between requests.
pub struct GeminiService {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key is empty");
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("food-analyzer-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn send(&self, request: &GenerationRequest<'_>) -> Result<GenerateContentResponse> {
        let body = GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: request.system_instruction,
                }],
            },
            contents: vec![RequestContent {
                role: "user",
                parts: vec![TextPart {
                    text: request.contents,
                }],
            }],
            tools: if request.search_grounding {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
        };

        log::debug!(
            "📤 Sending request to Gemini with model: {} (grounding: {})",
            self.model,
            request.search_grounding
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Gemini API error response: {}", error_text);

            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            anyhow::bail!("Gemini API error ({}): {}", status, message);
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

/// Turn a decoded 2xx response into an outcome. No usable text means the
/// provider filtered the answer.
fn interpret(response: GenerateContentResponse) -> GenerationOutcome {
    let candidate = response.candidates.first();

    if let Some(grounding) = candidate.and_then(|c| c.grounding_metadata.as_ref()) {
        log::debug!("🔎 Grounded on web searches: {:?}", grounding.web_search_queries);
    }

    let text: String = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return GenerationOutcome::Text(text);
    }

    let feedback = match (
        &response.prompt_feedback,
        candidate.and_then(|c| c.finish_reason.as_deref()),
    ) {
        (Some(feedback), _) => feedback.to_string(),
        (None, Some(reason)) => format!("finishReason={}", reason),
        (None, None) => "none".to_string(),
    };

    GenerationOutcome::Blocked { feedback }
}

#[async_trait::async_trait]
impl GenerationService for GeminiService {
    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationOutcome {
        match self.send(&request).await {
            Ok(response) => interpret(response),
            Err(e) => GenerationOutcome::Failed(e.to_string()),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
