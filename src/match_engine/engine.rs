//! Locate-and-act engine built on normalized cross-correlation

use std::collections::HashMap;
use std::time::Instant;

use image::{GrayImage, ImageBuffer, Luma, RgbaImage};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use log::{debug, info, warn};

use crate::capture::ScreenSource;
use crate::input::{ActPlan, Dispatcher, InputSink, pause};

use super::config::{ColorMode, LocateOptions, MultiLocateOptions, ThresholdMap, WaitOptions};
use super::error::{EngineResult, MatchError};
use super::region::CaptureRegion;
use super::template::{Template, TemplateStore};

type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// One located instance of a template: the geometric center of the matched
/// footprint in screen coordinates, and its correlation score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    pub x: i32,
    pub y: i32,
    pub score: f32,
}

/// The first candidate retained across an entire multi-target pass, in
/// discovery order (template order, then variant order, then raster order).
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryTarget {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub score: f32,
}

/// Result of one multi-target pass. Candidate sequences keep discovery
/// order; they are not sorted by score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiMatchResult {
    pub by_name: HashMap<String, Vec<MatchCandidate>>,
    pub primary: Option<PrimaryTarget>,
}

impl MultiMatchResult {
    /// Candidates for a name. Absent names and empty families both read as
    /// "nothing found".
    pub fn candidates(&self, name: &str) -> &[MatchCandidate] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn found_any(&self) -> bool {
        self.by_name.values().any(|c| !c.is_empty())
    }
}

/// Outcome of a wait-for-appearance poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    Appeared { name: String, point: (i32, i32) },
    TimedOut,
}

impl WaitOutcome {
    pub fn appeared(&self) -> bool {
        matches!(self, WaitOutcome::Appeared { .. })
    }
}

/// The matching engine: a screen source plus a template store.
///
/// `locate`/`locate_all` are pure lookups returning coordinates; acting on
/// them is a separate dispatcher concern. The `*_and_*` entry points
/// compose the two for call sites that want a single-call shape.
pub struct MatchEngine<S: ScreenSource> {
    screen: S,
    store: TemplateStore,
}

impl<S: ScreenSource> MatchEngine<S> {
    pub fn new(screen: S, store: TemplateStore) -> Self {
        Self { screen, store }
    }

    pub fn screen_dimensions(&self) -> (u32, u32) {
        self.screen.dimensions()
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Find the single best match for `name` on screen.
    ///
    /// Returns `Ok(None)` when the template is missing, scores below the
    /// threshold, or fails the color-spread check; none of those are errors.
    pub fn locate(
        &mut self,
        name: &str,
        opts: &LocateOptions,
    ) -> EngineResult<Option<(i32, i32)>> {
        let Some(template) = self.store.load(name) else {
            return Ok(None);
        };

        let (sw, sh) = self.screen.dimensions();
        let region = opts
            .region
            .unwrap_or_else(|| CaptureRegion::full_screen(sw, sh))
            .clip_to_screen(sw, sh);
        let capture = self.screen.capture(region)?;

        let Some(candidate) = locate_in_buffer(&capture, template, opts) else {
            return Ok(None);
        };

        let x = candidate.x + region.x1 as i32 + opts.offset.0;
        let y = candidate.y + region.y1 as i32 + opts.offset.1;
        info!("[FOUND] {name} at ({x}, {y}) score {:.3}", candidate.score);
        Ok(Some((x, y)))
    }

    /// `locate`, then click the resolved point `click_times` times.
    pub fn locate_and_click<I: InputSink>(
        &mut self,
        name: &str,
        opts: &LocateOptions,
        click_times: u32,
        dispatcher: &mut Dispatcher<I>,
    ) -> EngineResult<Option<(i32, i32)>> {
        let Some((x, y)) = self.locate(name, opts)? else {
            return Ok(None);
        };

        if click_times > 0 {
            dispatcher.click_times(x, y, click_times)?;
            info!("[ACTION] clicked {name} x{click_times} at ({x}, {y})");
        }
        Ok(Some((x, y)))
    }

    /// Find every instance of every requested template family on screen.
    ///
    /// Matching runs in grayscale over each family's variants. Candidates
    /// are visited in variant order, then raster order, and retained only
    /// when farther than `(min_dx, min_dy)` per-axis from every candidate
    /// already retained in this pass (any template) and from every excluded
    /// point. First found wins; later near-duplicates are dropped, not
    /// merged.
    pub fn locate_all(
        &mut self,
        names: &[&str],
        thresholds: &ThresholdMap,
        opts: &MultiLocateOptions,
    ) -> EngineResult<MultiMatchResult> {
        // Misconfiguration, not a miss. Checked before any capture happens.
        if thresholds.is_empty() {
            return Err(MatchError::EmptyThresholds);
        }

        let (sw, sh) = self.screen.dimensions();
        let region = opts
            .region
            .unwrap_or_else(|| CaptureRegion::full_screen(sw, sh))
            .clip_to_screen(sw, sh);
        let capture = self.screen.capture(region)?;
        let screen_gray = image::imageops::grayscale(&capture);
        let origin = (region.x1 as i32, region.y1 as i32);

        let mut result = MultiMatchResult::default();
        let mut pass_points: Vec<(i32, i32)> = Vec::new();

        for &name in names {
            let Some(&threshold) = thresholds.get(name) else {
                warn!("[WARN] no threshold configured for '{name}', skipping it");
                continue;
            };

            let mut kept: Vec<MatchCandidate> = Vec::new();
            for variant in self.store.load_family(name) {
                if variant.width > screen_gray.width() || variant.height > screen_gray.height() {
                    debug!(
                        "[MISS] variant '{}' ({}x{}) larger than capture, skipped",
                        variant.name, variant.width, variant.height
                    );
                    continue;
                }

                let map = match_template(
                    &screen_gray,
                    &variant.gray,
                    MatchTemplateMethod::CrossCorrelationNormalized,
                );

                for (mx, my, pixel) in map.enumerate_pixels() {
                    let score = pixel[0];
                    if score < threshold {
                        continue;
                    }

                    let cx = origin.0 + (mx + variant.width / 2) as i32;
                    let cy = origin.1 + (my + variant.height / 2) as i32;
                    if !is_far_enough(
                        cx,
                        cy,
                        &pass_points,
                        &opts.excluded,
                        opts.min_dx,
                        opts.min_dy,
                    ) {
                        continue;
                    }

                    pass_points.push((cx, cy));
                    let candidate = MatchCandidate {
                        x: cx,
                        y: cy,
                        score: score.clamp(0.0, 1.0),
                    };
                    if result.primary.is_none() {
                        result.primary = Some(PrimaryTarget {
                            name: name.to_string(),
                            x: cx,
                            y: cy,
                            score: candidate.score,
                        });
                    }
                    kept.push(candidate);
                }
            }

            if kept.is_empty() {
                debug!("[MISS] no candidates for '{name}'");
            } else {
                info!("[FOUND] {} candidate(s) for '{name}'", kept.len());
            }
            result.by_name.insert(name.to_string(), kept);
        }

        Ok(result)
    }

    /// `locate_all`, then run the act plan against the pass's primary
    /// target if one exists.
    pub fn locate_all_and_act<I: InputSink>(
        &mut self,
        names: &[&str],
        thresholds: &ThresholdMap,
        opts: &MultiLocateOptions,
        plan: &ActPlan,
        dispatcher: &mut Dispatcher<I>,
    ) -> EngineResult<MultiMatchResult> {
        let result = self.locate_all(names, thresholds, opts)?;

        if plan.click_times > 0
            && let Some(primary) = &result.primary
        {
            info!(
                "[ACTION] acting on '{}' at ({}, {}) score {:.3}",
                primary.name, primary.x, primary.y, primary.score
            );
            dispatcher.act_on(primary.x, primary.y, plan)?;
        }

        Ok(result)
    }

    /// Poll until any of `names` appears on screen.
    ///
    /// Each tick tries a single-target locate for every name in order and
    /// returns the first hit. Past the deadline this returns
    /// [`WaitOutcome::TimedOut`]; it never errors on timeout, the caller
    /// decides whether that is fatal.
    pub fn wait_until_any(
        &mut self,
        names: &[&str],
        opts: &WaitOptions,
    ) -> EngineResult<WaitOutcome> {
        let started = Instant::now();
        debug!("waiting for any of {names:?}");

        loop {
            for &name in names {
                let locate_opts = LocateOptions {
                    threshold: opts.threshold,
                    ..LocateOptions::default()
                };
                if let Some(point) = self.locate(name, &locate_opts)? {
                    return Ok(WaitOutcome::Appeared {
                        name: name.to_string(),
                        point,
                    });
                }
            }

            if let Some(timeout) = opts.timeout
                && started.elapsed() >= timeout
            {
                warn!("[MISS] timed out after {timeout:?} waiting for {names:?}");
                return Ok(WaitOutcome::TimedOut);
            }

            pause(opts.poll_interval);
        }
    }
}

/// Single-target matching against an already captured buffer.
///
/// Coordinates in the returned candidate are buffer-local; callers add the
/// region origin and any offset.
pub fn locate_in_buffer(
    screen: &RgbaImage,
    template: &Template,
    opts: &LocateOptions,
) -> Option<MatchCandidate> {
    if template.width > screen.width() || template.height > screen.height() {
        debug!(
            "[MISS] template '{}' ({}x{}) larger than the {}x{} capture",
            template.name,
            template.width,
            template.height,
            screen.width(),
            screen.height()
        );
        return None;
    }

    let map = match opts.color {
        ColorMode::Color => correlation_map_color(screen, &template.image),
        ColorMode::Grayscale => {
            let screen_gray = image::imageops::grayscale(screen);
            match_template(
                &screen_gray,
                &template.gray,
                MatchTemplateMethod::CrossCorrelationNormalized,
            )
        }
    };

    let (bx, by, best) = peak(&map);
    if best < opts.threshold {
        debug!(
            "[MISS] '{}' best score {best:.3} below threshold {:.2}",
            template.name, opts.threshold
        );
        return None;
    }

    if opts.color == ColorMode::Color {
        let spread = color_spread(screen, bx, by, template.width, template.height);
        if spread < opts.gray_diff_threshold {
            info!(
                "[REJECTED] '{}' scored {best:.3} but the matched area is too grey (spread {spread:.2} < {:.2})",
                template.name, opts.gray_diff_threshold
            );
            return None;
        }
    }

    Some(MatchCandidate {
        x: (bx + template.width / 2) as i32,
        y: (by + template.height / 2) as i32,
        score: best.clamp(0.0, 1.0),
    })
}

/// Per-axis proximity test used for spatial deduplication.
///
/// A point is too close only when it is within `min_dx` in x AND `min_dy`
/// in y of some retained or excluded point.
pub fn is_far_enough(
    cx: i32,
    cy: i32,
    retained: &[(i32, i32)],
    excluded: &[(i32, i32)],
    min_dx: u32,
    min_dy: u32,
) -> bool {
    let too_close = |&(px, py): &(i32, i32)| {
        (cx - px).unsigned_abs() < min_dx && (cy - py).unsigned_abs() < min_dy
    };
    !retained.iter().any(too_close) && !excluded.iter().any(too_close)
}

/// Mean channel spread of a footprint-sized window, on the 0-255 scale.
///
/// Per pixel this averages |R-G|, |R-B| and |G-B|; a window of grey pixels
/// scores near zero no matter how well its shape correlates.
pub fn color_spread(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> f32 {
    let mut total = 0.0f64;
    let mut count = 0u64;

    for dy in 0..height {
        for dx in 0..width {
            let pixel = image.get_pixel(x + dx, y + dy);
            let (r, g, b) = (pixel[0] as f64, pixel[1] as f64, pixel[2] as f64);
            total += ((r - g).abs() + (r - b).abs() + (g - b).abs()) / 3.0;
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        (total / count as f64) as f32
    }
}

/// Correlate per RGB channel and average the three score maps.
///
/// `imageproc` matches single-channel buffers only, so color matching runs
/// the correlation once per channel. A template that matches in shape but
/// not in channel balance is pulled down by the per-channel average.
fn correlation_map_color(screen: &RgbaImage, template: &RgbaImage) -> ScoreMap {
    let [r, g, b] = [0usize, 1, 2].map(|ch| {
        match_template(
            &channel_plane(screen, ch),
            &channel_plane(template, ch),
            MatchTemplateMethod::CrossCorrelationNormalized,
        )
    });

    ScoreMap::from_fn(r.width(), r.height(), |x, y| {
        let sum = r.get_pixel(x, y)[0] + g.get_pixel(x, y)[0] + b.get_pixel(x, y)[0];
        Luma([sum / 3.0])
    })
}

fn channel_plane(image: &RgbaImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[channel]])
    })
}

/// Location and value of the maximum score. NaN cells (zero-variance
/// windows) never win because the comparison is strict.
fn peak(map: &ScoreMap) -> (u32, u32, f32) {
    let mut best = f32::MIN;
    let (mut bx, mut by) = (0u32, 0u32);

    for (x, y, pixel) in map.enumerate_pixels() {
        if pixel[0] > best {
            best = pixel[0];
            bx = x;
            by = y;
        }
    }

    (bx, by, best)
}
