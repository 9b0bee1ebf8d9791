//! Logger setup for calc_monitor.
//!
//! Logs go to the terminal, and also to `log_file` when the config names one.

use log::LevelFilter;
use tracker_logging::LogDestination;

use super::config::MonitorConfig;

pub fn initialize(config: &MonitorConfig) {
    let level = config.log_level().unwrap_or(LevelFilter::Info);
    let destination = LogDestination::terminal_and(config.log_file.as_deref());
    tracker_logging::initialize(destination, level);
}
