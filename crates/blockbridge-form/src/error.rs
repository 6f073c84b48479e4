//! Error types for forms.

/// Errors that can occur while encoding forms or handling their responses.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Form or response JSON could not be (de)serialized.
    #[error("form json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response parsed as JSON but doesn't fit the form it answers.
    #[error("invalid form response: {0}")]
    InvalidResponse(String),

    /// A response handler reported a failure.
    #[error("form handler failed: {0}")]
    Handler(String),
}
