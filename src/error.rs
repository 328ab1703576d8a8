//! Structured error types for syncview.
//!
//! Replaces `Result<T, String>` throughout the codebase with proper error types.

/// All errors that can occur in syncview layout, evaluation and rendering.
#[derive(Debug, thiserror::Error)]
pub enum SyncviewError {
    /// Formula rejected by the validator (syntax or grammar violation).
    #[error("Formula error: {0}")]
    Formula(String),

    /// Formula evaluation failure (e.g. division by zero).
    #[error("Evaluation error: {0}")]
    Eval(String),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// Backend API request failure.
    #[error("API error: {0}")]
    Api(String),

    /// Session misuse (missing token, logged-out session).
    #[error("Session error: {0}")]
    Session(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncviewError>;

impl From<String> for SyncviewError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SyncviewError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SyncviewError> for wasm_bindgen::JsValue {
    fn from(e: SyncviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
