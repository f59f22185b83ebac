/// Crate-wide result alias.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Errors surfaced by the compositing pipeline.
///
/// Only conditions the caller must act on are reported here. Per-frame degradations (missing
/// landmarks, an empty inference result, a garment that failed to load) never become errors; they
/// simply render the frame without an overlay.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// Input or configuration rejected before any work was done.
    #[error("validation error: {0}")]
    Validation(String),

    /// The pose engine has not been initialized yet.
    #[error("not ready: {0}")]
    NotReady(String),

    /// The video source could not be acquired (permission denied, device missing, ...).
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The pose engine failed to initialize.
    #[error("pose engine init error: {0}")]
    EngineInit(String),

    /// An image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Composition failed.
    #[error("render error: {0}")]
    Render(String),

    /// Any other failure, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrapeError::NotReady`].
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`DrapeError::CameraUnavailable`].
    pub fn camera_unavailable(msg: impl Into<String>) -> Self {
        Self::CameraUnavailable(msg.into())
    }

    /// Build a [`DrapeError::EngineInit`].
    pub fn engine_init(msg: impl Into<String>) -> Self {
        Self::EngineInit(msg.into())
    }

    /// Build a [`DrapeError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`DrapeError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
