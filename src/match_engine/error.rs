use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for matching operations.
pub type EngineResult<T> = Result<T, MatchError>;

/// The error type for the matching layer.
///
/// A template that is missing or scores below its threshold is not an error;
/// those outcomes are reported as `None` / empty candidate lists. Only host
/// failures and explicit misconfiguration surface here.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(
        "empty threshold map passed to multi-target matching. Every requested template needs an explicit threshold."
    )]
    EmptyThresholds,

    #[error("template directory not found: {path:?}")]
    TemplateDirMissing { path: PathBuf },

    #[error("screen capture failed: {source}")]
    Capture {
        #[from]
        source: crate::capture::CaptureError,
    },

    #[error("input synthesis failed: {source}")]
    Input {
        #[from]
        source: crate::input::DispatchError,
    },
}
