//! Application module
//!
//! The TUI application state and logic, split by concern.

pub mod state;

mod core;
mod events;
mod rendering;

pub use self::core::*;
pub use events::{Intent, complete_namespace, key_intent, next_page_size};
pub use state::{InputMode, PendingAction};
