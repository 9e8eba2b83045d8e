//! Template matching engine
//!
//! The core of the crate: capture a screen region, correlate one or more
//! templates against it, and hand back actionable screen coordinates.
//! Locating and acting are separate primitives; convenience entry points
//! compose them for scripted call sites.

pub mod config;
pub mod engine;
pub mod error;
pub mod region;
pub mod template;

#[cfg(test)]
mod tests;

// Re-export main types and functions
pub use config::{ColorMode, LocateOptions, MultiLocateOptions, ThresholdMap, WaitOptions};
pub use engine::{
    MatchCandidate, MatchEngine, MultiMatchResult, PrimaryTarget, WaitOutcome, color_spread,
    is_far_enough, locate_in_buffer,
};
pub use error::{EngineResult, MatchError};
pub use region::CaptureRegion;
pub use template::{Template, TemplateStore};
