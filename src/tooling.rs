//! Tooling & Integration Layer
//!
//! Command-line access to the navigation engine, against either a REST
//! backend or a local JSON seed.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, OutputFormat};
