//! CLI components for the SAV to Excel converter.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
