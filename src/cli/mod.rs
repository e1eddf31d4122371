//! Command-line interface module.

mod args;
pub mod query;
pub mod render;
pub mod serve;
pub mod verify;

pub use args::{Cli, Commands, DataArgs, FilterArgs};
