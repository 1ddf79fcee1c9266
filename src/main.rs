//! SenseLogger daemon
//!
//! ```bash
//! sense-logger                           # Sense HAT, ./sense-logger.toml if present
//! sense-logger --config /etc/sense-logger.toml
//! sense-logger --mock --output-dir /tmp/done   # joystick events on stdin
//! ```

use clap::Parser;
use sense_logger::config::Config;
use sense_logger::devices::create_device;
use sense_logger::error::{Error, Result};
use sense_logger::recorder::ensure_output_dir;
use sense_logger::{ExitReason, LoggerOptions, SenseLogger};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser)]
#[command(name = "sense-logger", version)]
#[command(about = "Log Sense HAT sensor data to CSV, driven by the joystick")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file name prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Completed-jobs directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Use the simulated device; joystick events are read from stdin
    #[arg(long)]
    mock: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Config::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(prefix) = args.prefix {
        config.recording.prefix = prefix;
    }
    if let Some(dir) = args.output_dir {
        config.recording.output_dir = dir;
    }
    if args.mock {
        config.device.device_type = "mock".to_string();
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    match run(&config) {
        Ok(reason) => {
            log::info!("Exiting ({:?})", reason);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<ExitReason> {
    log::info!("SenseLogger v{} starting", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Device: {}, prefix: {}, output: {}",
        config.device.device_type,
        config.recording.prefix,
        config.recording.output_dir.display()
    );

    ensure_output_dir(&config.recording.output_dir)?;
    let devices = create_device(config)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Signal(e.to_string()))?;

    // Dropping the logger clears the matrix, whichever way run() ends
    let mut logger = SenseLogger::new(devices, LoggerOptions::from_config(config), running);
    logger.splash();
    logger.run()
}
