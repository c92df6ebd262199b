//! Configuration module
//!
//! Settings file handling: backend URL, location, display and behavior.

pub mod config;
