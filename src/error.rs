use thiserror::Error;

/// Application error types.
///
/// Only `Config` is fatal; everything else is recovered inside the
/// evaluation loop (per-symbol isolation or bounded backoff).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("insufficient data: needed {needed} bars, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Whether this error counts as a per-symbol failure (isolated,
    /// logged, never aborts the cycle).
    pub fn is_per_symbol(&self) -> bool {
        matches!(self, AppError::InsufficientData { .. } | AppError::Fetch(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
