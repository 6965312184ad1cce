//! Scratch Guide command-line front end
//!
//! The `sb3-guide` binary parses [`Cli`], installs logging, and dispatches
//! to [`commands`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, Commands};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
