//! Bot profile loaded from a TOML file

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse profile {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// One land plot the bot works through each cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct PlotProfile {
    /// Template naming the plot entry on the map, e.g. `105_128`.
    pub template: String,
    /// Offset from the coin anchor to the point that re-centers the map on
    /// this plot.
    pub map_anchor_offset: (i32, i32),
    /// Harvest attempts per cycle.
    pub trees: u32,
    pub stones: u32,
}

/// One kitchen station worked during the craft step.
#[derive(Debug, Clone, Deserialize)]
pub struct KitchenProfile {
    /// Template naming the station, e.g. `cuddle_kitchen1`.
    pub station: String,
    /// Template naming the recipe to queue.
    pub recipe: String,
    /// Clicks on the craft button, one per queued item.
    pub craft_clicks: u32,
    /// Station has a second recipe page reached via the arrow buttons.
    #[serde(default)]
    pub paged: bool,
}

/// Script-level waits, separate from input pacing in
/// [`crate::input::ActionDelays`]. All in seconds so profiles stay readable.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptDelays {
    /// After opening a station or menu.
    #[serde(default = "default_menu_settle")]
    pub menu_settle_secs: u64,
    /// Between small UI steps (claim, ok, page turns).
    #[serde(default = "default_step")]
    pub step_secs: u64,
    /// After clicking a plot on the map, while the camera travels.
    #[serde(default = "default_map_travel")]
    pub map_travel_secs: u64,
    /// After finishing a craft station.
    #[serde(default = "default_post_craft")]
    pub post_craft_secs: u64,
    /// After a disconnect dialog, before re-entering the game.
    #[serde(default = "default_reconnect")]
    pub reconnect_secs: u64,
    /// After killing the game process.
    #[serde(default = "default_post_kill")]
    pub post_kill_secs: u64,
}

fn default_menu_settle() -> u64 {
    2
}
fn default_step() -> u64 {
    1
}
fn default_map_travel() -> u64 {
    5
}
fn default_post_craft() -> u64 {
    3
}
fn default_reconnect() -> u64 {
    60
}
fn default_post_kill() -> u64 {
    10
}

impl Default for ScriptDelays {
    fn default() -> Self {
        Self {
            menu_settle_secs: default_menu_settle(),
            step_secs: default_step(),
            map_travel_secs: default_map_travel(),
            post_craft_secs: default_post_craft(),
            reconnect_secs: default_reconnect(),
            post_kill_secs: default_post_kill(),
        }
    }
}

impl ScriptDelays {
    pub fn menu_settle(&self) -> Duration {
        Duration::from_secs(self.menu_settle_secs)
    }
    pub fn step(&self) -> Duration {
        Duration::from_secs(self.step_secs)
    }
    pub fn map_travel(&self) -> Duration {
        Duration::from_secs(self.map_travel_secs)
    }
    pub fn post_craft(&self) -> Duration {
        Duration::from_secs(self.post_craft_secs)
    }
    pub fn reconnect(&self) -> Duration {
        Duration::from_secs(self.reconnect_secs)
    }
    pub fn post_kill(&self) -> Duration {
        Duration::from_secs(self.post_kill_secs)
    }
}

/// Everything the scripted loop needs to drive one game install.
#[derive(Debug, Clone, Deserialize)]
pub struct BotProfile {
    /// Path to the game executable to launch when not in game.
    pub game_executable: PathBuf,
    /// Process image name used to force-kill the game.
    pub process_name: String,
    /// Directory of template images.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
    /// Per-template-family correlation thresholds for harvesting.
    pub thresholds: HashMap<String, f32>,
    /// Template families matched when harvesting wood.
    pub tree_families: Vec<String>,
    /// Template families matched when harvesting stone.
    pub stone_families: Vec<String>,
    /// Plots visited in order each cycle.
    pub plots: Vec<PlotProfile>,
    /// Kitchen stations worked each cycle.
    #[serde(default)]
    pub kitchens: Vec<KitchenProfile>,
    /// Idle time between full cycles, seconds.
    #[serde(default = "default_cycle_cooldown")]
    pub cycle_cooldown_secs: u64,
    #[serde(default)]
    pub delays: ScriptDelays,
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("pic")
}

fn default_cycle_cooldown() -> u64 {
    1800
}

impl BotProfile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
