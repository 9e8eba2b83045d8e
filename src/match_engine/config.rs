//! Configuration for matching operations

use std::collections::HashMap;
use std::time::Duration;

use super::region::CaptureRegion;

/// Per-template-name minimum correlation scores in `[0, 1]`.
///
/// Always supplied explicitly by the caller. A requested name that is absent
/// from the map is skipped with a warning, never silently defaulted.
pub type ThresholdMap = HashMap<String, f32>;

/// Color space a single-target match runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Correlate per RGB channel and average. Enables the color-spread
    /// rejection filter on the matched area.
    Color,
    /// Correlate on luma only. No color-spread filtering.
    Grayscale,
}

/// Options for a single-target locate pass.
#[derive(Debug, Clone)]
pub struct LocateOptions {
    /// Minimum acceptable correlation score (0.0 to 1.0).
    pub threshold: f32,
    /// Capture region; `None` means the full display.
    pub region: Option<CaptureRegion>,
    pub color: ColorMode,
    /// Minimum mean channel spread (0-255 scale) the matched area must show
    /// in color mode. Guards against desaturated look-alike regions.
    pub gray_diff_threshold: f32,
    /// Pixel offset added to the matched center before it is returned.
    pub offset: (i32, i32),
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            region: None,
            color: ColorMode::Color,
            gray_diff_threshold: 15.0,
            offset: (0, 0),
        }
    }
}

/// Options for a multi-target locate pass.
///
/// Deduplication is per-axis: a candidate is dropped when it is closer than
/// `min_dx` in x AND closer than `min_dy` in y to an already retained
/// candidate or an excluded point.
#[derive(Debug, Clone)]
pub struct MultiLocateOptions {
    /// Capture region; `None` means the full display.
    pub region: Option<CaptureRegion>,
    pub min_dx: u32,
    pub min_dy: u32,
    /// Points already acted on in earlier passes, e.g. a click history.
    pub excluded: Vec<(i32, i32)>,
}

impl Default for MultiLocateOptions {
    fn default() -> Self {
        Self {
            region: None,
            min_dx: 40,
            min_dy: 40,
            excluded: Vec::new(),
        }
    }
}

/// Options for a wait-for-appearance poll loop.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    /// Threshold applied to every polled template.
    pub threshold: f32,
    /// `None` polls forever.
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            threshold: 0.8,
            timeout: Some(Duration::from_secs(45)),
        }
    }
}
