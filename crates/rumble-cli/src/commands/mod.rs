//! Subcommand implementations. Each returns the process exit code.

pub mod check;
pub mod generate;
pub mod list;
