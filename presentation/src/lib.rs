//! Presentation layer for role-quorum
//!
//! This crate contains CLI definitions and console output formatting.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{
    Cli, Command, EndChoice, ModeratorArgs, OutputFormat, VetoChoice, VoteChoice,
};
pub use output::console::ConsoleFormatter;
