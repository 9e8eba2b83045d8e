pub mod args;
pub mod bot;
pub mod capture;
pub mod input;
pub mod match_engine;
pub mod process_control;

pub use capture::{PrimaryScreen, ScreenSource};
pub use input::{ActPlan, ActionDelays, Dispatcher, EnigoSink, InputSink};
pub use match_engine::{MatchEngine, TemplateStore};
