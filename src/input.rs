//! Mouse and keyboard synthesis

use std::thread;
use std::time::Duration;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use log::debug;
use thiserror::Error;

/// The error type for input synthesis operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to initialize input backend: {source}")]
    Init { source: enigo::NewConError },

    #[error("input event failed: {source}")]
    Event {
        #[from]
        source: enigo::InputError,
    },
}

/// Sink for primitive input events.
///
/// Mirrors the host input surface one event at a time; pacing and composite
/// gestures live in [`Dispatcher`]. Tests substitute a recording sink.
pub trait InputSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), DispatchError>;
    /// Move to the point and click the left button once.
    fn click(&mut self, x: i32, y: i32) -> Result<(), DispatchError>;
    fn mouse_down(&mut self, button: Button) -> Result<(), DispatchError>;
    fn mouse_up(&mut self, button: Button) -> Result<(), DispatchError>;
    fn key_down(&mut self, key: Key) -> Result<(), DispatchError>;
    fn key_up(&mut self, key: Key) -> Result<(), DispatchError>;
    fn press(&mut self, key: Key) -> Result<(), DispatchError>;
    /// Positive amounts scroll up (content moves down).
    fn scroll(&mut self, amount: i32) -> Result<(), DispatchError>;
    fn cursor_position(&mut self) -> Result<(i32, i32), DispatchError>;
}

/// `enigo`-backed input sink for the local desktop.
pub struct EnigoSink {
    enigo: Enigo,
}

impl EnigoSink {
    pub fn open() -> Result<Self, DispatchError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|source| DispatchError::Init { source })?;
        Ok(Self { enigo })
    }
}

impl InputSink for EnigoSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), DispatchError> {
        self.enigo.move_mouse(x, y, Coordinate::Abs)?;
        Ok(())
    }

    fn click(&mut self, x: i32, y: i32) -> Result<(), DispatchError> {
        self.enigo.move_mouse(x, y, Coordinate::Abs)?;
        self.enigo.button(Button::Left, Direction::Click)?;
        Ok(())
    }

    fn mouse_down(&mut self, button: Button) -> Result<(), DispatchError> {
        self.enigo.button(button, Direction::Press)?;
        Ok(())
    }

    fn mouse_up(&mut self, button: Button) -> Result<(), DispatchError> {
        self.enigo.button(button, Direction::Release)?;
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> Result<(), DispatchError> {
        self.enigo.key(key, Direction::Press)?;
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), DispatchError> {
        self.enigo.key(key, Direction::Release)?;
        Ok(())
    }

    fn press(&mut self, key: Key) -> Result<(), DispatchError> {
        self.enigo.key(key, Direction::Click)?;
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> Result<(), DispatchError> {
        // enigo treats positive as scrolling down; flip to match the trait.
        self.enigo.scroll(-amount, Axis::Vertical)?;
        Ok(())
    }

    fn cursor_position(&mut self) -> Result<(i32, i32), DispatchError> {
        let position = self.enigo.location()?;
        Ok(position)
    }
}

/// Fixed pauses inserted between synthesized events.
///
/// Every delay the crate sleeps on comes from here, so tests zero them out
/// and real runs tune them in one place.
#[derive(Debug, Clone)]
pub struct ActionDelays {
    /// Pause after each click repetition.
    pub inter_click: Duration,
    /// Pause after a completed drag.
    pub post_drag: Duration,
    /// Pause between interpolation steps while dragging.
    pub drag_step: Duration,
}

impl Default for ActionDelays {
    fn default() -> Self {
        Self {
            inter_click: Duration::from_secs(1),
            post_drag: Duration::from_secs(1),
            drag_step: Duration::from_millis(50),
        }
    }
}

impl ActionDelays {
    /// All-zero delays, for tests.
    pub fn none() -> Self {
        Self {
            inter_click: Duration::ZERO,
            post_drag: Duration::ZERO,
            drag_step: Duration::ZERO,
        }
    }
}

pub(crate) fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Repetition plan for acting on a located target.
#[derive(Debug, Clone)]
pub struct ActPlan {
    /// Number of click repetitions; 0 means locate only.
    pub click_times: u32,
    /// Compensating second click, offset from the target, issued right after
    /// each primary click. Resource nodes register the second click.
    pub secondary_offset: Option<(i32, i32)>,
    /// Key pressed at the end of each repetition.
    pub press_after: Option<Key>,
}

impl Default for ActPlan {
    fn default() -> Self {
        Self {
            click_times: 1,
            secondary_offset: None,
            press_after: None,
        }
    }
}

/// Turns resolved screen coordinates into paced event sequences.
pub struct Dispatcher<I: InputSink> {
    sink: I,
    delays: ActionDelays,
}

impl<I: InputSink> Dispatcher<I> {
    pub fn new(sink: I, delays: ActionDelays) -> Self {
        Self { sink, delays }
    }

    pub fn delays(&self) -> &ActionDelays {
        &self.delays
    }

    pub fn sink(&self) -> &I {
        &self.sink
    }

    pub fn click_at(&mut self, x: i32, y: i32) -> Result<(), DispatchError> {
        self.sink.click(x, y)
    }

    /// Click `times` times at the point, pausing `inter_click` after each.
    pub fn click_times(&mut self, x: i32, y: i32, times: u32) -> Result<(), DispatchError> {
        for _ in 0..times {
            self.sink.click(x, y)?;
            pause(self.delays.inter_click);
        }
        Ok(())
    }

    /// Run one act plan against a target point.
    pub fn act_on(&mut self, x: i32, y: i32, plan: &ActPlan) -> Result<(), DispatchError> {
        for _ in 0..plan.click_times {
            self.sink.click(x, y)?;
            if let Some((dx, dy)) = plan.secondary_offset {
                self.sink.click(x + dx, y + dy)?;
            }
            pause(self.delays.inter_click);
            if let Some(key) = plan.press_after {
                self.sink.press(key)?;
            }
        }
        Ok(())
    }

    /// Press-and-hold drag with linear interpolation between the endpoints.
    pub fn drag(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        duration: Duration,
    ) -> Result<(), DispatchError> {
        const STEPS: i32 = 20;

        self.sink.move_to(from.0, from.1)?;
        self.sink.mouse_down(Button::Left)?;

        let step_pause = duration.checked_div(STEPS as u32).unwrap_or(Duration::ZERO);
        for step in 1..=STEPS {
            let x = from.0 + (to.0 - from.0) * step / STEPS;
            let y = from.1 + (to.1 - from.1) * step / STEPS;
            self.sink.move_to(x, y)?;
            pause(step_pause.max(self.delays.drag_step));
        }

        self.sink.mouse_up(Button::Left)?;
        pause(self.delays.post_drag);
        Ok(())
    }

    pub fn hold_keys(&mut self, keys: &[Key]) -> Result<(), DispatchError> {
        for &key in keys {
            self.sink.key_down(key)?;
        }
        Ok(())
    }

    /// Release in reverse order so modifier chords unwind cleanly.
    pub fn release_keys(&mut self, keys: &[Key]) -> Result<(), DispatchError> {
        for &key in keys.iter().rev() {
            self.sink.key_up(key)?;
        }
        Ok(())
    }

    pub fn press(&mut self, key: Key) -> Result<(), DispatchError> {
        self.sink.press(key)
    }

    /// Press `key` while holding the modifiers.
    pub fn hotkey(&mut self, modifiers: &[Key], key: Key) -> Result<(), DispatchError> {
        self.hold_keys(modifiers)?;
        let result = self.sink.press(key);
        self.release_keys(modifiers)?;
        result
    }

    pub fn scroll(&mut self, amount: i32) -> Result<(), DispatchError> {
        debug!("scroll {amount}");
        self.sink.scroll(amount)
    }

    pub fn cursor_position(&mut self) -> Result<(i32, i32), DispatchError> {
        self.sink.cursor_position()
    }
}
