use thiserror::Error;

/// Errors surfaced by the viewport engine.
///
/// Only `RenderContext` is fatal; everything else leaves the engine in its
/// previous state and can be retried with corrected input.
#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("screen {index}: invalid {field} ({value})")]
    InvalidSpec {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("rendering context unavailable: {0}")]
    RenderContext(String),
    #[error("invalid viewport config: {0}")]
    InvalidConfig(&'static str),
    #[error("unknown view mode {0:?}")]
    UnknownViewMode(String),
    #[error("unknown theme {0:?}")]
    UnknownTheme(String),
    #[error("malformed screen list: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ViewportError> = std::result::Result<T, E>;
