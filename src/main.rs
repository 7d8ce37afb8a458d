//! Balloon Shooter entry point
//!
//! Usage: `balloon-shooter [settings.json]`

use std::path::PathBuf;
use std::process::ExitCode;

use balloon_shooter::Settings;
use balloon_shooter::platform;

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder
            .filter_level(log::LevelFilter::Info)
            // wgpu is chatty at info
            .filter_module("wgpu_core", log::LevelFilter::Warn)
            .filter_module("wgpu_hal", log::LevelFilter::Warn)
            .filter_module("naga", log::LevelFilter::Warn);
    }
    builder.init();
}

fn main() -> ExitCode {
    init_logging();
    log::info!("Balloon Shooter starting...");

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(settings_path.as_deref());

    match platform::run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
