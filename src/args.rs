use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Mode {
    /// Run the scripted game loop from a profile.
    Run,
    /// Capture the screen once and save it to a file.
    Screenshot,
    /// Locate (and click) a single template, for tuning thresholds.
    Probe { template: String },
    /// Print the cursor position after a short delay.
    Cursor,
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub profile: PathBuf,
    pub template_dir: PathBuf,
    pub probe_threshold: f32,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().collect();

        let mut mode: Option<Mode> = None;
        let mut profile = PathBuf::from("bot.toml");
        let mut template_dir = PathBuf::from("pic");
        let mut probe_threshold = 0.8f32;

        for arg in args.iter().skip(1) {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Screen Match Run v{}", env!("CARGO_PKG_VERSION"));
                return None;
            } else if arg == "--screenshot" || arg == "-s" {
                mode = Some(Mode::Screenshot);
            } else if arg == "--cursor" {
                mode = Some(Mode::Cursor);
            } else if let Some(name) = arg.strip_prefix("--probe=") {
                mode = Some(Mode::Probe {
                    template: name.to_string(),
                });
            } else if let Some(path) = arg.strip_prefix("--profile=") {
                profile = PathBuf::from(path);
            } else if let Some(dir) = arg.strip_prefix("--templates=") {
                template_dir = PathBuf::from(dir);
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) if (0.0..=1.0).contains(&t) => probe_threshold = t,
                    _ => {
                        eprintln!("❌ Invalid threshold value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(Args {
            mode: mode.unwrap_or(Mode::Run),
            profile,
            template_dir,
            probe_threshold,
        })
    }
}

fn print_help() {
    println!("🤖 Screen Match Automation Tool");
    println!();
    println!("USAGE:");
    println!("    screen-match-run [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)          Run the scripted game loop");
    println!("    --profile=PATH      Bot profile to load (default: bot.toml)");
    println!("    --screenshot, -s    Take a screenshot and save to file (cli-screenshot.png)");
    println!("    --probe=NAME        Locate a single template once and click it");
    println!("    --templates=DIR     Template directory for --probe (default: pic)");
    println!("    --threshold=N       Correlation threshold for --probe (default: 0.8)");
    println!("    --cursor            Print the cursor position after 3 seconds");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    screen-match-run --screenshot");
    println!("    screen-match-run --probe=tree1_a --threshold=0.9");
    println!("    screen-match-run --profile=homeland.toml");
}
