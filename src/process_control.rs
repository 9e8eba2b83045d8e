//! Launch and kill the external game process

use std::io;
use std::path::Path;
use std::process::{Child, Command};

use log::{info, warn};

/// Spawn the game executable and leave it running detached.
pub fn launch(executable: &Path) -> io::Result<Child> {
    info!("launching {}", executable.display());
    Command::new(executable).spawn()
}

/// Forcibly terminate every process with the given image name.
///
/// Best effort: a non-zero exit (no such process) is logged, not an error.
pub fn kill_by_name(process_name: &str) -> io::Result<()> {
    let status = if cfg!(target_os = "windows") {
        Command::new("taskkill")
            .args(["/f", "/im", process_name])
            .status()?
    } else {
        Command::new("pkill").args(["-f", process_name]).status()?
    };

    if status.success() {
        info!("killed process '{process_name}'");
    } else {
        warn!("no process named '{process_name}' to kill");
    }
    Ok(())
}
