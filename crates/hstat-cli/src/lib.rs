//! Library side of the `hstat` command-line tool.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
