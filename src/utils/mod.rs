//! Utility modules shared by the engine and the CLI.

mod fmt;
pub mod xml;

pub use fmt::{byte_size, plural_count};
