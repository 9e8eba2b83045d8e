//! The scripted game loop
//!
//! Plain sequential scripting over the match engine: no state machine, no
//! recovery beyond logging and trying again on the next cycle.

use std::io::Write;
use std::time::Duration;

use enigo::Key;
use log::{info, warn};
use thiserror::Error;

use crate::capture::ScreenSource;
use crate::input::{ActPlan, Dispatcher, InputSink, pause};
use crate::match_engine::{
    ColorMode, LocateOptions, MatchEngine, MatchError, MultiLocateOptions, WaitOptions,
    WaitOutcome,
};
use crate::process_control;

use super::profile::{BotProfile, KitchenProfile, PlotProfile};

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Engine(#[from] MatchError),

    #[error("failed to launch game executable: {source}")]
    Launch { source: std::io::Error },

    #[error("failed to kill game process: {source}")]
    Kill { source: std::io::Error },
}

impl From<crate::input::DispatchError> for BotError {
    fn from(source: crate::input::DispatchError) -> Self {
        BotError::Engine(MatchError::Input { source })
    }
}

/// Harvest hotkey held for the whole collect phase.
const HARVEST_CHORD: [Key; 2] = [Key::Shift, Key::Unicode('q')];

pub struct GameBot<S: ScreenSource, I: InputSink> {
    engine: MatchEngine<S>,
    dispatcher: Dispatcher<I>,
    profile: BotProfile,
}

impl<S: ScreenSource, I: InputSink> GameBot<S, I> {
    pub fn new(engine: MatchEngine<S>, dispatcher: Dispatcher<I>, profile: BotProfile) -> Self {
        Self {
            engine,
            dispatcher,
            profile,
        }
    }

    /// Run cycles forever. Errors are logged and the next cycle retries.
    pub fn run(&mut self) {
        loop {
            if let Err(e) = self.run_cycle() {
                warn!("cycle failed, retrying next round: {e}");
            }
            self.countdown("harvest", self.profile.cycle_cooldown_secs);
        }
    }

    /// One full pass: get into the game, then work every configured plot.
    pub fn run_cycle(&mut self) -> Result<(), BotError> {
        self.enter_game()?;

        // A visible exit button means the disconnect dialog is up.
        let exit_opts = LocateOptions {
            color: ColorMode::Grayscale,
            ..LocateOptions::default()
        };
        if self
            .engine
            .locate_and_click("exit", &exit_opts, 1, &mut self.dispatcher)?
            .is_some()
        {
            pause(self.profile.delays.reconnect());
            self.enter_game()?;
        }

        for plot in self.profile.plots.clone() {
            self.switch_plot(&plot)?;
            self.craft()?;
            self.collect(plot.trees, plot.stones)?;
        }
        Ok(())
    }

    /// The home screen anchor doubles as an in-game probe. A lowered
    /// spread threshold keeps the check working on dimmed loading frames.
    pub fn in_game(&mut self) -> Result<bool, BotError> {
        let opts = LocateOptions {
            gray_diff_threshold: 12.0,
            ..LocateOptions::default()
        };
        Ok(self.engine.locate("homeland", &opts)?.is_some())
    }

    /// Launch the game if needed and click through the loading screens.
    pub fn enter_game(&mut self) -> Result<(), BotError> {
        if self.in_game()? {
            return Ok(());
        }

        info!("not in game, launching {}", self.profile.game_executable.display());
        process_control::launch(&self.profile.game_executable)
            .map_err(|source| BotError::Launch { source })?;

        for screen in [&["join"][..], &["tab"][..], &["acoin"][..]] {
            match self.engine.wait_until_any(screen, &WaitOptions::default())? {
                WaitOutcome::Appeared { name, point } => {
                    self.dispatcher.click_at(point.0, point.1)?;
                    info!("[ACTION] clicked '{name}' while loading");
                }
                WaitOutcome::TimedOut => {
                    warn!("loading screen {screen:?} never appeared, pressing on");
                }
            }
        }

        // Dismiss the mailbox badge and the what's-new popup.
        self.engine
            .locate_and_click("M", &LocateOptions::default(), 1, &mut self.dispatcher)?;
        self.engine
            .locate_and_click("x", &LocateOptions::default(), 1, &mut self.dispatcher)?;
        Ok(())
    }

    pub fn close_game(&mut self) -> Result<(), BotError> {
        process_control::kill_by_name(&self.profile.process_name)
            .map_err(|source| BotError::Kill { source })?;
        pause(self.profile.delays.post_kill());
        Ok(())
    }

    /// Open the plot map and travel to the given plot.
    pub fn switch_plot(&mut self, plot: &PlotProfile) -> Result<(), BotError> {
        let delays = self.profile.delays.clone();

        self.engine
            .locate_and_click("plot", &LocateOptions::default(), 1, &mut self.dispatcher)?;

        // The coin readout is the one stable anchor on the map screen;
        // clicking at a fixed offset from it recenters on the plot row.
        let anchor_opts = LocateOptions {
            offset: plot.map_anchor_offset,
            ..LocateOptions::default()
        };
        self.engine
            .locate_and_click("acoin", &anchor_opts, 1, &mut self.dispatcher)?;

        // First click selects, second click (after travel) confirms entry.
        for _ in 0..2 {
            self.engine.locate_and_click(
                &plot.template,
                &LocateOptions::default(),
                1,
                &mut self.dispatcher,
            )?;
            pause(delays.map_travel());
        }

        // Zoom in and reset the camera before matching resources.
        for _ in 0..5 {
            self.dispatcher.scroll(30)?;
            pause(delays.step());
        }
        self.dispatcher.press(Key::Unicode('a'))?;
        self.dispatcher.hotkey(&[Key::Shift], Key::Unicode('b'))?;
        pause(delays.post_craft());
        Ok(())
    }

    /// Work every configured kitchen station.
    pub fn craft(&mut self) -> Result<(), BotError> {
        for kitchen in self.profile.kitchens.clone() {
            self.craft_station(&kitchen)?;
        }
        Ok(())
    }

    fn craft_station(&mut self, kitchen: &KitchenProfile) -> Result<(), BotError> {
        let delays = self.profile.delays.clone();

        let opened = self
            .engine
            .locate_and_click(&kitchen.station, &LocateOptions::default(), 2, &mut self.dispatcher)?
            .is_some();
        if !opened {
            warn!("[MISS] kitchen station '{}' not found", kitchen.station);
            return Ok(());
        }
        pause(delays.menu_settle());

        // Paged stations may reopen on page two; step back first.
        if kitchen.paged
            && self
                .engine
                .locate("#2", &LocateOptions::default())?
                .is_some()
        {
            self.engine.locate_and_click(
                "left_arrow",
                &LocateOptions::default(),
                1,
                &mut self.dispatcher,
            )?;
            pause(delays.step());
        }

        self.craft_current_page(kitchen)?;

        if kitchen.paged {
            self.engine.locate_and_click(
                "right_arrow",
                &LocateOptions::default(),
                1,
                &mut self.dispatcher,
            )?;
            pause(delays.step());
            self.craft_current_page(kitchen)?;
        }

        self.dispatcher.press(Key::Escape)?;

        // Clicking left of the coin readout deselects the station.
        let deselect = LocateOptions {
            offset: (-100, 0),
            ..LocateOptions::default()
        };
        self.engine
            .locate_and_click("acoin", &deselect, 1, &mut self.dispatcher)?;
        pause(delays.post_craft());
        Ok(())
    }

    /// Claim the finished batch and queue the next one.
    fn craft_current_page(&mut self, kitchen: &KitchenProfile) -> Result<(), BotError> {
        let delays = self.profile.delays.clone();

        self.engine
            .locate_and_click("claim", &LocateOptions::default(), 1, &mut self.dispatcher)?;
        pause(delays.step());

        // The confirmation dialog renders desaturated, so match it in gray.
        let gray = LocateOptions {
            color: ColorMode::Grayscale,
            ..LocateOptions::default()
        };
        self.engine
            .locate_and_click("ok", &gray, 1, &mut self.dispatcher)?;
        pause(delays.step());

        self.engine.locate_and_click(
            &kitchen.recipe,
            &LocateOptions::default(),
            1,
            &mut self.dispatcher,
        )?;
        self.engine.locate_and_click(
            "craft",
            &gray,
            kitchen.craft_clicks,
            &mut self.dispatcher,
        )?;
        Ok(())
    }

    /// Harvest trees then stones, holding the harvest chord throughout.
    pub fn collect(&mut self, trees: u32, stones: u32) -> Result<(), BotError> {
        self.dispatcher.hold_keys(&HARVEST_CHORD)?;
        let outcome = self.collect_targets(trees, stones);
        self.dispatcher.release_keys(&HARVEST_CHORD)?;
        outcome
    }

    fn collect_targets(&mut self, trees: u32, stones: u32) -> Result<(), BotError> {
        let tree_families = self.profile.tree_families.clone();
        let stone_families = self.profile.stone_families.clone();

        self.harvest_round(&tree_families, trees, None)?;
        info!("tree harvest finished");

        // Stones need one extra click below the node to register.
        self.harvest_round(&stone_families, stones, Some((0, 25)))?;
        info!("stone harvest finished");
        Ok(())
    }

    /// Repeatedly multi-match the families and act on the primary target,
    /// excluding everything already clicked this round.
    fn harvest_round(
        &mut self,
        families: &[String],
        rounds: u32,
        extra_click_offset: Option<(i32, i32)>,
    ) -> Result<(), BotError> {
        let names: Vec<&str> = families.iter().map(String::as_str).collect();
        let plan = ActPlan {
            click_times: 1,
            secondary_offset: Some((0, 25)),
            press_after: Some(Key::Space),
        };
        let mut clicked: Vec<(i32, i32)> = Vec::new();

        for _ in 0..rounds {
            let opts = MultiLocateOptions {
                excluded: clicked.clone(),
                ..MultiLocateOptions::default()
            };
            let result = self.engine.locate_all_and_act(
                &names,
                &self.profile.thresholds,
                &opts,
                &plan,
                &mut self.dispatcher,
            )?;

            let Some(primary) = result.primary else {
                info!("[MISS] nothing left to harvest in {names:?}");
                break;
            };

            if let Some((dx, dy)) = extra_click_offset {
                self.dispatcher.click_at(primary.x + dx, primary.y + dy)?;
            }
            clicked.push((primary.x, primary.y));
        }
        Ok(())
    }

    /// Blocking per-second countdown between cycles.
    pub fn countdown(&self, activity: &str, seconds: u64) {
        for remaining in (1..=seconds).rev() {
            print!("\r⏳ next {activity} cycle in {remaining}s ");
            let _ = std::io::stdout().flush();
            pause(Duration::from_secs(1));
        }
        println!("\r⏰ cooldown over, starting next cycle");
    }
}
