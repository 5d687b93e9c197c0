//! Command-line interface module.

mod args;
pub mod common;
pub mod optimize;
pub mod select;
pub mod transform;

pub use args::{Cli, Commands, IoArgs, OptimizeArgs, SelectArgs, TransformArgs};
