/// What the gateway asks the generation capability to do.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub system_instruction: &'a str,
    pub contents: &'a str,
    /// Let the provider consult live web search while composing the answer.
    pub search_grounding: bool,
}

/// Result of one generation round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Non-empty generated text, exactly as the provider returned it.
    Text(String),
    /// The provider answered but produced no usable content.
    Blocked { feedback: String },
    /// Transport, auth, quota or decoding failure. Holds a short description.
    Failed(String),
}

/// Trait for text generation backends (Gemini, test stubs, etc.)
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> GenerationOutcome;
    fn model(&self) -> &str;
}
