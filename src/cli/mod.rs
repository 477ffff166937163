//! CLI command handling module
//!
//! Handles all CLI subcommands that do not need the terminal UI.

mod commands;
mod logging;
mod version;
mod workload;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::{LogTarget, init_logging};
pub use version::{display_version, version_text};
pub use workload::{build_backend, initial_pagination, lifecycle_command, list_command};
