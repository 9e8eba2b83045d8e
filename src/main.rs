use std::time::Duration;

use screen_match_run::args::{Args, Mode};
use screen_match_run::bot::{BotProfile, GameBot};
use screen_match_run::match_engine::{CaptureRegion, LocateOptions, TemplateStore};
use screen_match_run::{
    ActionDelays, Dispatcher, EnigoSink, InputSink, MatchEngine, PrimaryScreen, ScreenSource,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(args) = Args::parse() else {
        return;
    };

    match args.mode {
        Mode::Screenshot => screenshot(),
        Mode::Cursor => cursor(),
        Mode::Probe { ref template } => probe(template, &args),
        Mode::Run => run(&args),
    }
}

fn screenshot() {
    println!("📸 Capturing primary monitor...");
    let mut screen = match PrimaryScreen::open() {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("❌ Failed to open screen: {e}");
            return;
        }
    };

    let (width, height) = screen.dimensions();
    match screen.capture(CaptureRegion::full_screen(width, height)) {
        Ok(frame) => {
            if let Err(e) = frame.save("cli-screenshot.png") {
                eprintln!("❌ Write failed: {e}");
            } else {
                println!("✅ Screenshot ({width}x{height}) saved to cli-screenshot.png");
            }
        }
        Err(e) => eprintln!("❌ Screenshot failed: {e}"),
    }
}

fn cursor() {
    println!("🖱️ Move the cursor to the target point, reading position in 3s...");
    let mut sink = match EnigoSink::open() {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("❌ Failed to open input backend: {e}");
            return;
        }
    };
    std::thread::sleep(Duration::from_secs(3));

    match sink.cursor_position() {
        Ok((x, y)) => println!("✅ Cursor at ({x}, {y})"),
        Err(e) => eprintln!("❌ Failed to read cursor position: {e}"),
    }
}

fn probe(template: &str, args: &Args) {
    println!("🔍 Probing for '{template}' (threshold {:.2})...", args.probe_threshold);

    let store = match TemplateStore::open(&args.template_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {e}");
            return;
        }
    };
    let screen = match PrimaryScreen::open() {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("❌ Failed to open screen: {e}");
            return;
        }
    };
    let sink = match EnigoSink::open() {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("❌ Failed to open input backend: {e}");
            return;
        }
    };

    let mut engine = MatchEngine::new(screen, store);
    let mut dispatcher = Dispatcher::new(sink, ActionDelays::default());
    let opts = LocateOptions {
        threshold: args.probe_threshold,
        ..LocateOptions::default()
    };

    match engine.locate_and_click(template, &opts, 1, &mut dispatcher) {
        Ok(Some((x, y))) => println!("✅ Found and clicked '{template}' at ({x}, {y})"),
        Ok(None) => println!("👀 '{template}' not found"),
        Err(e) => eprintln!("❌ Probe failed: {e}"),
    }
}

fn run(args: &Args) {
    let profile = match BotProfile::load(&args.profile) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("❌ {e}");
            return;
        }
    };

    let store = match TemplateStore::open(&profile.template_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {e}");
            return;
        }
    };
    let screen = match PrimaryScreen::open() {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("❌ Failed to open screen: {e}");
            return;
        }
    };
    let sink = match EnigoSink::open() {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("❌ Failed to open input backend: {e}");
            return;
        }
    };

    println!(
        "🚀 Starting game loop for {} ({} plot(s), {} kitchen(s))",
        profile.process_name,
        profile.plots.len(),
        profile.kitchens.len()
    );

    let engine = MatchEngine::new(screen, store);
    let dispatcher = Dispatcher::new(sink, ActionDelays::default());
    GameBot::new(engine, dispatcher, profile).run();
}
