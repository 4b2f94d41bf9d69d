//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod version;

pub use commands::{
    generate_options, handle_config_command, handle_generate, ConfigSubcommand, GenerateArgs,
};
pub use logging::init_logging;
pub use version::display_version;
