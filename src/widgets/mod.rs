//! Reusable pieces of the terminal UI

pub mod history_widget;
pub mod log_widget;
pub mod nav_bar_widget;
pub mod risk_badge;
