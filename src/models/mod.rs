use serde::Serialize;

pub const MSG_NOT_INITIALIZED: &str = "AI service not initialized. Check API key configuration.";
pub const MSG_INVALID_PAYLOAD: &str = "Invalid or missing JSON payload.";
pub const MSG_MISSING_QUERY: &str = "Missing or empty \"query\" field in the request.";

/// An inbound body as the HTTP layer handed it over.
#[derive(Debug, Clone, Copy)]
pub struct RawPayload<'a> {
    pub content_type: Option<&'a str>,
    /// `None` when the body could not be read (over the size limit, aborted).
    pub body: Option<&'a [u8]>,
}

/// A validated analysis request. Only constructed through [`AnalysisRequest::from_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub query: String,
}

/// Why an inbound payload was rejected before any business logic ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidPayload,
    MissingQuery,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::InvalidPayload => MSG_INVALID_PAYLOAD,
            ValidationError::MissingQuery => MSG_MISSING_QUERY,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

impl AnalysisRequest {
    /// Parse and validate a raw request body.
    ///
    /// The body must be declared as JSON and be a JSON object carrying a
    /// string `query` that is not blank. The query is kept as sent (not trimmed).
    pub fn from_payload(payload: RawPayload<'_>) -> Result<Self, ValidationError> {
        if !payload.content_type.is_some_and(is_json_content_type) {
            return Err(ValidationError::InvalidPayload);
        }
        let raw = payload.body.ok_or(ValidationError::InvalidPayload)?;

        let value: serde_json::Value =
            serde_json::from_slice(raw).map_err(|_| ValidationError::InvalidPayload)?;

        let object = value.as_object().ok_or(ValidationError::InvalidPayload)?;

        match object.get("query").and_then(|q| q.as_str()) {
            Some(query) if !query.trim().is_empty() => Ok(Self {
                query: query.to_string(),
            }),
            _ => Err(ValidationError::MissingQuery),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Success,
    ClientError,
    ServiceUnavailable,
    UpstreamBlocked,
    InternalError,
}

/// Outcome of one `analyze` call.
///
/// `body` is the report on success and the error message otherwise, so a
/// result never carries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    body: String,
}

impl AnalysisResult {
    pub fn success(text: String) -> Self {
        Self {
            status: AnalysisStatus::Success,
            body: text,
        }
    }

    pub fn failure(status: AnalysisStatus, message: impl Into<String>) -> Self {
        debug_assert!(status != AnalysisStatus::Success);
        Self {
            status,
            body: message.into(),
        }
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

/// Body of a successful `POST /api/execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub result: String,
}

/// Body of every failed `POST /api/execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Body of `GET /check`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub message: String,
    pub model: String,
}

#[cfg(test)]
impl AnalysisResult {
    pub(crate) fn text(&self) -> Option<&str> {
        (self.status == AnalysisStatus::Success).then_some(self.body.as_str())
    }

    pub(crate) fn message(&self) -> Option<&str> {
        (self.status != AnalysisStatus::Success).then_some(self.body.as_str())
    }
}

#[cfg(test)]
impl<'a> RawPayload<'a> {
    pub(crate) fn json(body: &'a [u8]) -> Self {
        Self {
            content_type: Some("application/json"),
            body: Some(body),
        }
    }
}
