//! Space Bowling entry point
//!
//! Loads settings, opens the window and runs the frame loop until close.

use space_bowling::Settings;
use space_bowling::platform;

fn main() {
    env_logger::init();
    log::info!("Space Bowling starting...");

    let settings = Settings::load();
    if let Err(e) = platform::run(settings) {
        log::error!("Startup failed: {e}");
        std::process::exit(1);
    }
}
