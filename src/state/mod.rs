//! Application state
//!
//! `AppState` holds everything the views show. Input and request
//! completions arrive as `Action`s, `reduce` applies them and returns the
//! `Effect`s the request service should run.

pub mod app_state;
pub mod events;
pub mod reducer;

pub use app_state::{AppState, AuthMode, Field, RequestId, View};
pub use events::{Action, Effect, Outcome};
pub use reducer::reduce;
