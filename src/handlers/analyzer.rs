use std::sync::Arc;

use crate::models::{
    AnalysisRequest, AnalysisResult, AnalysisStatus, HealthResponse, HealthStatus, RawPayload,
    MSG_NOT_INITIALIZED,
};
use crate::services::{GenerationOutcome, GenerationRequest, GenerationService};

/// Persona and report layout sent with every query.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a food and nutrition analysis expert.

Generate a visually engaging report using this structure:
🥗 Summary — brief verdict
🧾 Ingredient Cleanliness — bulleted notes + full-width table
💪 Nutritional Value — bullets + table (compare to eggs, tofu, chicken using Google Search)
🍽 Diet Suitability — bullets + table
🍲 Usage Suggestions — 5 simple vegetarian dishes + table

Maintain clarity, emojis, and clean formatting as in Amul Butter style.
Use Google Search to find all necessary nutritional and ingredient data.
";

/// Stateless front door for food analysis requests.
///
/// `generator` is `None` when the capability failed to initialize at startup;
/// it is never replaced afterwards.
pub struct AnalyzerGateway {
    generator: Option<Arc<dyn GenerationService>>,
    model: String,
}

impl AnalyzerGateway {
    pub fn new(generator: Option<Arc<dyn GenerationService>>, model: String) -> Self {
        Self { generator, model }
    }

    pub fn is_ready(&self) -> bool {
        self.generator.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn analyze(&self, payload: RawPayload<'_>) -> AnalysisResult {
        let generator = match &self.generator {
            Some(generator) => generator,
            None => {
                log::error!("❌ Rejecting analysis: AI service not initialized");
                return AnalysisResult::failure(
                    AnalysisStatus::ServiceUnavailable,
                    MSG_NOT_INITIALIZED,
                );
            }
        };

        let request = match AnalysisRequest::from_payload(payload) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("⚠️ Rejected analysis request: {}", e);
                return AnalysisResult::failure(AnalysisStatus::ClientError, e.message());
            }
        };

        let outcome = generator
            .generate(GenerationRequest {
                system_instruction: SYSTEM_INSTRUCTION,
                contents: &request.query,
                search_grounding: true,
            })
            .await;

        match outcome {
            GenerationOutcome::Text(text) => AnalysisResult::success(text),
            GenerationOutcome::Blocked { feedback } => {
                log::error!(
                    "🚫 Response blocked by API for query {:?}. Feedback: {}",
                    request.query,
                    feedback
                );
                AnalysisResult::failure(
                    AnalysisStatus::UpstreamBlocked,
                    format!("The response was blocked. Feedback: {}", feedback),
                )
            }
            GenerationOutcome::Failed(description) => {
                log::error!("❌ Internal Server Error: {}", description);
                AnalysisResult::failure(
                    AnalysisStatus::InternalError,
                    format!(
                        "An unexpected internal server error occurred: {}",
                        description
                    ),
                )
            }
        }
    }

    /// Report readiness without touching the provider.
    pub fn health_check(&self) -> HealthResponse {
        if self.is_ready() {
            HealthResponse {
                status: HealthStatus::Ok,
                message: "backend is running".to_string(),
                model: self.model.clone(),
            }
        } else {
            HealthResponse {
                status: HealthStatus::Error,
                message: "backend is running, but AI model failed to initialize.".to_string(),
                model: self.model.clone(),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed outcome and records what it was asked.
    pub(crate) struct StubGenerator {
        outcome: GenerationOutcome,
        pub calls: AtomicUsize,
        pub last_query: Mutex<Option<String>>,
        pub last_grounding: Mutex<Option<bool>>,
    }

    impl StubGenerator {
        pub(crate) fn new(outcome: GenerationOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                last_grounding: Mutex::new(None),
            })
        }
    }

    #[async_trait::async_trait]
    impl GenerationService for StubGenerator {
        async fn generate(&self, request: GenerationRequest<'_>) -> GenerationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(request.contents.to_string());
            *self.last_grounding.lock().unwrap() = Some(request.search_grounding);
            self.outcome.clone()
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    fn gateway(stub: &Arc<StubGenerator>) -> AnalyzerGateway {
        AnalyzerGateway::new(
            Some(stub.clone() as Arc<dyn GenerationService>),
            "gemini-2.5-flash".to_string(),
        )
    }

    #[test]
    fn test_system_instruction_names_every_section() {
        for section in [
            "Summary",
            "Ingredient Cleanliness",
            "Nutritional Value",
            "Diet Suitability",
            "Usage Suggestions",
        ] {
            assert!(SYSTEM_INSTRUCTION.contains(section), "missing {}", section);
        }
        assert!(SYSTEM_INSTRUCTION.contains("eggs, tofu, chicken"));
    }

    #[tokio::test]
    async fn test_success_passes_text_through_unchanged() {
        let text = "🥗 Summary ...\n| a | b |\n";
        let stub = StubGenerator::new(GenerationOutcome::Text(text.to_string()));

        let result = gateway(&stub)
            .analyze(RawPayload::json(br#"{"query": "Amul Butter"}"#))
            .await;

        assert_eq!(result, AnalysisResult::success(text.to_string()));
        assert_eq!(stub.last_query.lock().unwrap().as_deref(), Some("Amul Butter"));
        assert_eq!(*stub.last_grounding.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_generator() {
        let stub = StubGenerator::new(GenerationOutcome::Text("unused".to_string()));
        let gateway = gateway(&stub);

        let result = gateway.analyze(RawPayload::json(b"not json")).await;
        assert_eq!(result.status, AnalysisStatus::ClientError);
        assert_eq!(result.message(), Some("Invalid or missing JSON payload."));

        let payloads: [&[u8]; 3] = [br#"{}"#, br#"{"query": "  "}"#, br#"{"query": 3}"#];
        for raw in payloads {
            let result = gateway.analyze(RawPayload::json(raw)).await;
            assert_eq!(result.status, AnalysisStatus::ClientError);
            assert_eq!(
                result.message(),
                Some("Missing or empty \"query\" field in the request.")
            );
        }

        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_uninitialized_gateway_reports_unavailable() {
        let gateway = AnalyzerGateway::new(None, "gemini-2.5-flash".to_string());

        // Availability is checked before the payload is looked at.
        let result = gateway
            .analyze(RawPayload {
                content_type: Some("text/plain"),
                body: None,
            })
            .await;
        assert_eq!(result.status, AnalysisStatus::ServiceUnavailable);
        assert_eq!(
            result.message(),
            Some("AI service not initialized. Check API key configuration.")
        );

        let health = gateway.health_check();
        assert_eq!(health.status, HealthStatus::Error);
        assert_eq!(
            health.message,
            "backend is running, but AI model failed to initialize."
        );
        assert_eq!(health.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_blocked_response_is_not_success() {
        let stub = StubGenerator::new(GenerationOutcome::Blocked {
            feedback: r#"{"blockReason":"SAFETY"}"#.to_string(),
        });

        let result = gateway(&stub)
            .analyze(RawPayload::json(br#"{"query": "tofu"}"#))
            .await;

        assert_eq!(result.status, AnalysisStatus::UpstreamBlocked);
        assert!(result.text().is_none());
        assert!(result.message().unwrap().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_failure_is_internal_error_and_gateway_keeps_serving() {
        let failing = StubGenerator::new(GenerationOutcome::Failed("timed out".to_string()));
        let gateway = gateway(&failing);

        for _ in 0..2 {
            let result = gateway
                .analyze(RawPayload::json(br#"{"query": "paneer"}"#))
                .await;
            assert_eq!(result.status, AnalysisStatus::InternalError);
            assert_eq!(
                result.message(),
                Some("An unexpected internal server error occurred: timed out")
            );
        }
        assert_eq!(failing.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_health_check_when_ready() {
        let stub = StubGenerator::new(GenerationOutcome::Text("x".to_string()));
        let health = gateway(&stub).health_check();

        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.message, "backend is running");
        assert_eq!(health.model, "gemini-2.5-flash");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }
}
