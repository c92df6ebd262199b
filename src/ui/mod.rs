//! Terminal UI: key mapping, rendering and the event loop

pub mod key_mapper;
pub mod renderer;
pub mod tui_app;
