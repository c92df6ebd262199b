//! Paths and logging helpers shared by the CLI and the TUI

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
