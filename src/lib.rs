pub mod api;
pub mod cli;
pub mod config;
pub mod location;
pub mod services;
pub mod session_store;
pub mod state;
pub mod table_display;
pub mod ui;
pub mod utils;
pub mod widgets;
