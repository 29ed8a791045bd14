//! ChalanIO - command daemon for the pada-kine walker
//!
//! Polls the command file, composes each command into servo poses and drives
//! the servos through them one pose at a time.

use chalan_io::command::FileCommandSource;
use chalan_io::config::AppConfig;
use chalan_io::error::{Error, Result};
use chalan_io::{MockServoBus, Processor};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `chalan-io <path>` (positional)
/// - `chalan-io --config <path>` (flag-based)
/// - `chalan-io -c <path>` (short flag)
///
/// Defaults to `/etc/chalan.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "/etc/chalan.toml".to_string()
}

fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        log::info!("Using config: {}", path);
        AppConfig::from_file(path)
    } else {
        log::warn!("Config {} not found, using defaults", path);
        Ok(AppConfig::default())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("ChalanIO v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(&parse_config_path())?;
    log::info!("Commands from {}", config.command.file.display());

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // No hardware bus is wired in; the mock bus gives a dry run
    log::info!("Servo bus: mock");
    let bus = MockServoBus::default();
    let source = FileCommandSource::new(&config.command.file);

    let mut processor = Processor::new(&config, bus, source, Arc::clone(&running))?;
    processor.initialize()?;

    log::info!("ChalanIO running. Press Ctrl-C to stop.");
    processor.run()?;

    log::info!("ChalanIO stopped");
    Ok(())
}
