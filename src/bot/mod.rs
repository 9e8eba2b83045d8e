// Scripted orchestration layer
// Drives the fixed in-game sequence (enter, switch plot, craft, harvest)
// through the match engine and input dispatcher.

pub mod profile;
pub mod script;

// Re-export the main types for easy access
pub use profile::{BotProfile, KitchenProfile, PlotProfile, ProfileError, ScriptDelays};
pub use script::{BotError, GameBot};
