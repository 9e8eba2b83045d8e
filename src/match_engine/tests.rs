//! Tests for the matching engine against synthetic screen buffers
//!
//! Everything runs on in-memory frames through a fake screen source, so no
//! display server is needed. Template files are generated into a temp
//! directory per test. Scenes are kept small so correlation stays fast in
//! debug builds.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use image::{DynamicImage, Rgba, RgbaImage};

use crate::capture::{CaptureError, ScreenSource};
use crate::input::{ActPlan, ActionDelays, DispatchError, Dispatcher, InputSink};
use crate::match_engine::{
    CaptureRegion, ColorMode, LocateOptions, MatchError, MultiLocateOptions, Template,
    TemplateStore, WaitOptions, WaitOutcome, color_spread, is_far_enough, locate_in_buffer,
};

use super::engine::MatchEngine;

const BG: u8 = 8;
const BLOCK: u32 = 30;

/// Screen source backed by a fixed in-memory frame, counting captures.
struct TestScreen {
    frame: RgbaImage,
    captures: u32,
}

impl TestScreen {
    fn new(frame: RgbaImage) -> Self {
        Self { frame, captures: 0 }
    }
}

impl ScreenSource for TestScreen {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn capture(&mut self, region: CaptureRegion) -> Result<RgbaImage, CaptureError> {
        self.captures += 1;
        let clipped = region.clip_to_screen(self.frame.width(), self.frame.height());
        Ok(image::imageops::crop_imm(
            &self.frame,
            clipped.x1,
            clipped.y1,
            clipped.width(),
            clipped.height(),
        )
        .to_image())
    }
}

/// Input sink that records instead of synthesizing.
struct CountingSink {
    clicks: Vec<(i32, i32)>,
    presses: Vec<String>,
}

impl CountingSink {
    fn new() -> Self {
        Self {
            clicks: Vec::new(),
            presses: Vec::new(),
        }
    }
}

impl InputSink for CountingSink {
    fn move_to(&mut self, _x: i32, _y: i32) -> Result<(), DispatchError> {
        Ok(())
    }
    fn click(&mut self, x: i32, y: i32) -> Result<(), DispatchError> {
        self.clicks.push((x, y));
        Ok(())
    }
    fn mouse_down(&mut self, _button: enigo::Button) -> Result<(), DispatchError> {
        Ok(())
    }
    fn mouse_up(&mut self, _button: enigo::Button) -> Result<(), DispatchError> {
        Ok(())
    }
    fn key_down(&mut self, _key: enigo::Key) -> Result<(), DispatchError> {
        Ok(())
    }
    fn key_up(&mut self, _key: enigo::Key) -> Result<(), DispatchError> {
        Ok(())
    }
    fn press(&mut self, key: enigo::Key) -> Result<(), DispatchError> {
        self.presses.push(format!("{key:?}"));
        Ok(())
    }
    fn scroll(&mut self, _amount: i32) -> Result<(), DispatchError> {
        Ok(())
    }
    fn cursor_position(&mut self) -> Result<(i32, i32), DispatchError> {
        Ok((0, 0))
    }
}

/// Deterministic pseudo-noise so synthetic patterns decorrelate under any
/// shift. `seed` separates patterns that must not match each other.
fn speckle(x: u32, y: u32, seed: u32) -> u8 {
    let h = x
        .wrapping_add(seed.wrapping_mul(7919))
        .wrapping_mul(2654435761)
        .wrapping_add(y.wrapping_mul(40503));
    if h % 7 < 3 { 230 } else { 10 }
}

fn blank_screen(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([BG, BG, BG, 255]))
}

/// Block with equal channels: correlates in every mode, zero color spread.
fn gray_block(seed: u32) -> RgbaImage {
    RgbaImage::from_fn(BLOCK, BLOCK, |x, y| {
        let v = speckle(x, y, seed);
        Rgba([v, v, v, 255])
    })
}

/// Block with three independent channel patterns: high color spread.
fn color_block(seed: u32) -> RgbaImage {
    RgbaImage::from_fn(BLOCK, BLOCK, |x, y| {
        Rgba([
            speckle(x, y, seed),
            speckle(x, y, seed.wrapping_add(101)),
            speckle(x, y, seed.wrapping_add(202)),
            255,
        ])
    })
}

fn paste(screen: &mut RgbaImage, block: &RgbaImage, x: u32, y: u32) {
    image::imageops::replace(screen, block, x as i64, y as i64);
}

fn template_from(image: &RgbaImage, name: &str) -> Template {
    let gray = DynamicImage::ImageRgba8(image.clone()).to_luma8();
    Template {
        name: name.to_string(),
        width: image.width(),
        height: image.height(),
        gray,
        image: image.clone(),
    }
}

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

/// Write the given images as PNG templates into a fresh temp directory.
fn temp_template_dir(files: &[(&str, &RgbaImage)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "screen-match-run-test-{}-{}",
        std::process::id(),
        DIR_SEQ.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    for (name, image) in files {
        image.save(dir.join(format!("{name}.png"))).unwrap();
    }
    dir
}

fn thresholds(entries: &[(&str, f32)]) -> HashMap<String, f32> {
    entries
        .iter()
        .map(|&(name, t)| (name.to_string(), t))
        .collect()
}

/// 150x150 screen with one block whose center lands at (75, 105).
fn screen_with_block(block: &RgbaImage) -> RgbaImage {
    let mut screen = blank_screen(150, 150);
    paste(&mut screen, block, 60, 90);
    screen
}

// --- template store ---

#[test]
fn test_store_missing_directory_fails() {
    let result = TemplateStore::open("/definitely/not/a/real/dir");
    assert!(matches!(result, Err(MatchError::TemplateDirMissing { .. })));
}

#[test]
fn test_store_appends_extension() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("button", &block)]);
    let mut store = TemplateStore::open(&dir).unwrap();

    assert!(store.load("button").is_some());
    assert!(store.load("button.png").is_some());
    assert!(store.load("ghost").is_none());
}

#[test]
fn test_store_family_is_sorted_and_prefix_exact() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[
        ("tree1_c", &block),
        ("tree1_a", &block),
        ("tree1_b", &block),
        ("tree10_a", &block),
    ]);
    let mut store = TemplateStore::open(&dir).unwrap();

    let names: Vec<&str> = store
        .load_family("tree1")
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["tree1_a", "tree1_b", "tree1_c"]);
}

#[test]
fn test_store_empty_family_is_not_fatal() {
    let dir = temp_template_dir(&[]);
    let mut store = TemplateStore::open(&dir).unwrap();
    assert!(store.load_family("nope").is_empty());
}

#[test]
fn test_store_skips_undecodable_files() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("rock_b", &block)]);
    std::fs::write(dir.join("rock_a.png"), b"this is not a png").unwrap();

    let mut store = TemplateStore::open(&dir).unwrap();
    let family = store.load_family("rock");
    assert_eq!(family.len(), 1);
    assert_eq!(family[0].name, "rock_b");
}

// --- single-target locate ---

#[test]
fn test_locate_finds_template_center() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("target", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    let point = engine.locate("target", &LocateOptions::default()).unwrap();
    assert_eq!(point, Some((75, 105)));
}

#[test]
fn test_locate_applies_offset() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("target", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    let opts = LocateOptions {
        offset: (10, -5),
        ..LocateOptions::default()
    };
    assert_eq!(engine.locate("target", &opts).unwrap(), Some((85, 100)));
}

#[test]
fn test_locate_region_coordinates_stay_global() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("target", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    let opts = LocateOptions {
        region: Some(CaptureRegion::new(40, 70, 150, 150)),
        ..LocateOptions::default()
    };
    assert_eq!(engine.locate("target", &opts).unwrap(), Some((75, 105)));
}

#[test]
fn test_locate_absent_template_is_not_found() {
    let present = color_block(1);
    let absent = color_block(9);
    let dir = temp_template_dir(&[("absent", &absent)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&present)), store);

    assert_eq!(
        engine.locate("absent", &LocateOptions::default()).unwrap(),
        None
    );
}

#[test]
fn test_locate_missing_file_is_not_found() {
    let dir = temp_template_dir(&[]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(blank_screen(100, 100)), store);

    assert_eq!(
        engine.locate("ghost", &LocateOptions::default()).unwrap(),
        None
    );
}

#[test]
fn test_locate_oversized_template_is_not_found() {
    let big = RgbaImage::from_fn(60, 60, |x, y| {
        let v = speckle(x, y, 1);
        Rgba([v, v, v, 255])
    });
    let dir = temp_template_dir(&[("big", &big)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(blank_screen(40, 40)), store);

    assert_eq!(
        engine.locate("big", &LocateOptions::default()).unwrap(),
        None
    );
}

#[test]
fn test_locate_in_buffer_result_iff_score_meets_threshold() {
    // Degrade the on-screen copy so the peak score sits strictly inside
    // (0, 1), then bracket the threshold around the measured score.
    let block = gray_block(1);
    let mut degraded = block.clone();
    for (x, y, pixel) in degraded.enumerate_pixels_mut() {
        if (x + y * BLOCK) % 8 == 0 {
            *pixel = Rgba([BG, BG, BG, 255]);
        }
    }
    let screen = screen_with_block(&degraded);
    let template = template_from(&block, "worn");

    let probe = LocateOptions {
        threshold: 0.0,
        color: ColorMode::Grayscale,
        ..LocateOptions::default()
    };
    let candidate = locate_in_buffer(&screen, &template, &probe).unwrap();
    assert!(candidate.score > 0.5 && candidate.score < 1.0);

    let accept = LocateOptions {
        threshold: candidate.score - 0.001,
        color: ColorMode::Grayscale,
        ..LocateOptions::default()
    };
    assert!(locate_in_buffer(&screen, &template, &accept).is_some());

    let reject = LocateOptions {
        threshold: candidate.score + 0.001,
        color: ColorMode::Grayscale,
        ..LocateOptions::default()
    };
    assert!(locate_in_buffer(&screen, &template, &reject).is_none());
}

// --- color-spread rejection ---

#[test]
fn test_colorless_match_is_rejected_in_color_mode() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("decoy", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    // Shape correlates perfectly, but the area is grey.
    let opts = LocateOptions {
        gray_diff_threshold: 15.0,
        ..LocateOptions::default()
    };
    assert_eq!(engine.locate("decoy", &opts).unwrap(), None);

    // Disabling the spread floor accepts the same match.
    let lax = LocateOptions {
        gray_diff_threshold: 0.0,
        ..LocateOptions::default()
    };
    assert_eq!(engine.locate("decoy", &lax).unwrap(), Some((75, 105)));
}

#[test]
fn test_grayscale_mode_skips_color_rejection() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("decoy", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    let opts = LocateOptions {
        color: ColorMode::Grayscale,
        gray_diff_threshold: 15.0,
        ..LocateOptions::default()
    };
    assert_eq!(engine.locate("decoy", &opts).unwrap(), Some((75, 105)));
}

#[test]
fn test_color_spread_metric() {
    let grey = gray_block(1);
    assert!(color_spread(&grey, 0, 0, BLOCK, BLOCK) < 1.0);

    let colorful = color_block(1);
    assert!(color_spread(&colorful, 0, 0, BLOCK, BLOCK) > 15.0);
}

// --- multi-target locate ---

#[test]
fn test_locate_all_finds_single_instance() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("tree1_a", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    let result = engine
        .locate_all(
            &["tree1"],
            &thresholds(&[("tree1", 0.8)]),
            &MultiLocateOptions::default(),
        )
        .unwrap();

    let candidates = result.candidates("tree1");
    assert_eq!(candidates.len(), 1);
    assert_eq!((candidates[0].x, candidates[0].y), (75, 105));
    assert!(candidates[0].score > 0.99);

    let primary = result.primary.unwrap();
    assert_eq!(primary.name, "tree1");
    assert_eq!((primary.x, primary.y), (75, 105));
}

#[test]
fn test_locate_all_absent_family_yields_empty() {
    let present = gray_block(1);
    let absent = gray_block(9);
    let dir = temp_template_dir(&[("tree2_a", &absent)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&present)), store);

    let result = engine
        .locate_all(
            &["tree2"],
            &thresholds(&[("tree2", 0.8)]),
            &MultiLocateOptions::default(),
        )
        .unwrap();

    assert!(result.candidates("tree2").is_empty());
    assert!(result.primary.is_none());
    assert!(!result.found_any());
}

#[test]
fn test_locate_all_empty_thresholds_fails_before_capture() {
    let dir = temp_template_dir(&[]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(blank_screen(100, 100)), store);

    let result = engine.locate_all(&["tree1"], &HashMap::new(), &MultiLocateOptions::default());
    assert!(matches!(result, Err(MatchError::EmptyThresholds)));
    assert_eq!(engine.screen().captures, 0);
}

#[test]
fn test_locate_all_missing_threshold_skips_name() {
    let tree = gray_block(1);
    let rock = gray_block(2);
    let mut screen = blank_screen(250, 250);
    paste(&mut screen, &tree, 30, 30);
    paste(&mut screen, &rock, 150, 150);

    let dir = temp_template_dir(&[("tree1_a", &tree), ("rock1_a", &rock)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen), store);

    let result = engine
        .locate_all(
            &["tree1", "rock1"],
            &thresholds(&[("tree1", 0.8)]),
            &MultiLocateOptions::default(),
        )
        .unwrap();

    assert_eq!(result.candidates("tree1").len(), 1);
    // Skipped, not present-but-empty: the name never enters the result.
    assert!(!result.by_name.contains_key("rock1"));
}

/// 220x120 screen with three copies of the same block in one row: centers
/// at (55,55), (85,55) and (155,55).
fn three_block_screen(block: &RgbaImage) -> RgbaImage {
    let mut screen = blank_screen(220, 120);
    paste(&mut screen, block, 40, 40);
    paste(&mut screen, block, 70, 40);
    paste(&mut screen, block, 140, 40);
    screen
}

#[test]
fn test_locate_all_dedup_is_per_axis_first_found_wins() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("tree1_a", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(three_block_screen(&block)), store);

    let opts = MultiLocateOptions {
        min_dx: 50,
        min_dy: 50,
        ..MultiLocateOptions::default()
    };
    let result = engine
        .locate_all(&["tree1"], &thresholds(&[("tree1", 0.8)]), &opts)
        .unwrap();

    // The middle copy is within (50,50) of the first and gets dropped.
    let candidates = result.candidates("tree1");
    assert_eq!(candidates.len(), 2);
    assert_eq!((candidates[0].x, candidates[0].y), (55, 55));
    assert_eq!((candidates[1].x, candidates[1].y), (155, 55));

    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            assert!(
                (a.x - b.x).unsigned_abs() >= 50 || (a.y - b.y).unsigned_abs() >= 50,
                "candidates too close: ({}, {}) vs ({}, {})",
                a.x,
                a.y,
                b.x,
                b.y
            );
        }
    }
}

#[test]
fn test_locate_all_respects_exclusion_list() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("tree1_a", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(three_block_screen(&block)), store);

    let excluded = vec![(155, 55)];
    let opts = MultiLocateOptions {
        min_dx: 50,
        min_dy: 50,
        excluded: excluded.clone(),
        ..MultiLocateOptions::default()
    };
    let result = engine
        .locate_all(&["tree1"], &thresholds(&[("tree1", 0.8)]), &opts)
        .unwrap();

    let candidates = result.candidates("tree1");
    assert_eq!(candidates.len(), 1);
    assert_eq!((candidates[0].x, candidates[0].y), (55, 55));

    for c in candidates {
        for &(ex, ey) in &excluded {
            assert!((c.x - ex).unsigned_abs() >= 50 || (c.y - ey).unsigned_abs() >= 50);
        }
    }
}

#[test]
fn test_locate_all_is_deterministic() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("tree1_a", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(three_block_screen(&block)), store);

    let opts = MultiLocateOptions {
        excluded: vec![(10, 10)],
        ..MultiLocateOptions::default()
    };
    let first = engine
        .locate_all(&["tree1"], &thresholds(&[("tree1", 0.8)]), &opts)
        .unwrap();
    let second = engine
        .locate_all(&["tree1"], &thresholds(&[("tree1", 0.8)]), &opts)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_locate_all_primary_follows_request_order() {
    let tree = gray_block(1);
    let stone = gray_block(2);
    let mut screen = blank_screen(250, 250);
    // The tree sits earlier in raster order, but stones are requested first.
    paste(&mut screen, &tree, 30, 30);
    paste(&mut screen, &stone, 150, 150);

    let dir = temp_template_dir(&[("tree1_a", &tree), ("stone1_a", &stone)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen), store);

    let result = engine
        .locate_all(
            &["stone1", "tree1"],
            &thresholds(&[("stone1", 0.8), ("tree1", 0.8)]),
            &MultiLocateOptions::default(),
        )
        .unwrap();

    let primary = result.primary.unwrap();
    assert_eq!(primary.name, "stone1");
    assert_eq!((primary.x, primary.y), (165, 165));
}

// --- locate/act composition ---

#[test]
fn test_locate_and_click_clicks_resolved_point() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("target", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);
    let mut dispatcher = Dispatcher::new(CountingSink::new(), ActionDelays::none());

    let point = engine
        .locate_and_click("target", &LocateOptions::default(), 2, &mut dispatcher)
        .unwrap();

    assert_eq!(point, Some((75, 105)));
    assert_eq!(dispatcher.sink().clicks, vec![(75, 105), (75, 105)]);
}

#[test]
fn test_locate_and_click_zero_clicks_is_pure() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("target", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);
    let mut dispatcher = Dispatcher::new(CountingSink::new(), ActionDelays::none());

    let point = engine
        .locate_and_click("target", &LocateOptions::default(), 0, &mut dispatcher)
        .unwrap();

    assert_eq!(point, Some((75, 105)));
    assert!(dispatcher.sink().clicks.is_empty());
}

#[test]
fn test_locate_all_and_act_acts_on_primary_only() {
    let block = gray_block(1);
    let dir = temp_template_dir(&[("tree1_a", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(three_block_screen(&block)), store);
    let mut dispatcher = Dispatcher::new(CountingSink::new(), ActionDelays::none());

    let plan = ActPlan {
        click_times: 1,
        secondary_offset: Some((0, 25)),
        press_after: Some(enigo::Key::Space),
    };
    let result = engine
        .locate_all_and_act(
            &["tree1"],
            &thresholds(&[("tree1", 0.8)]),
            &MultiLocateOptions::default(),
            &plan,
            &mut dispatcher,
        )
        .unwrap();

    let primary = result.primary.unwrap();
    assert_eq!((primary.x, primary.y), (55, 55));

    // One repetition: primary click, compensating click below, then the key.
    assert_eq!(dispatcher.sink().clicks, vec![(55, 55), (55, 80)]);
    assert_eq!(dispatcher.sink().presses, vec!["Space"]);
}

// --- wait-for-appearance ---

#[test]
fn test_wait_returns_first_present_name() {
    let block = color_block(1);
    let dir = temp_template_dir(&[("tab", &block)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(screen_with_block(&block)), store);

    let opts = WaitOptions {
        poll_interval: Duration::ZERO,
        timeout: Some(Duration::from_secs(1)),
        ..WaitOptions::default()
    };
    let outcome = engine.wait_until_any(&["join", "tab"], &opts).unwrap();

    assert_eq!(
        outcome,
        WaitOutcome::Appeared {
            name: "tab".to_string(),
            point: (75, 105),
        }
    );
}

#[test]
fn test_wait_times_out_after_deadline() {
    let absent = color_block(9);
    let dir = temp_template_dir(&[("join", &absent)]);
    let store = TemplateStore::open(&dir).unwrap();
    let mut engine = MatchEngine::new(TestScreen::new(blank_screen(100, 100)), store);

    let opts = WaitOptions {
        poll_interval: Duration::from_millis(20),
        timeout: Some(Duration::from_millis(300)),
        ..WaitOptions::default()
    };

    let started = Instant::now();
    let outcome = engine.wait_until_any(&["join", "tab"], &opts).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(
        elapsed >= Duration::from_millis(300),
        "returned too early: {elapsed:?}"
    );
    assert!(elapsed < Duration::from_secs(5), "poll loop hung: {elapsed:?}");
    assert!(engine.screen().captures > 0);
}

// --- dedup predicate ---

#[test]
fn test_is_far_enough_is_per_axis() {
    let retained = [(100, 100)];

    // Close on both axes: too close.
    assert!(!is_far_enough(130, 120, &retained, &[], 40, 40));
    // Far on x alone is enough, even at identical y.
    assert!(is_far_enough(150, 100, &retained, &[], 40, 40));
    // Far on y alone is enough.
    assert!(is_far_enough(100, 150, &retained, &[], 40, 40));
    // Exactly at the limit counts as far.
    assert!(is_far_enough(140, 100, &retained, &[], 40, 40));

    // Exclusion list behaves like retained points.
    assert!(!is_far_enough(130, 120, &[], &[(100, 100)], 40, 40));
}
