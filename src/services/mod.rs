pub mod ai_service; // Generation capability seam
pub mod gemini; // Google Gemini REST client

pub use ai_service::{GenerationOutcome, GenerationRequest, GenerationService};
pub use gemini::GeminiService;
