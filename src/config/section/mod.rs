//! Configuration section definitions.
//!
//! Each module corresponds to a section in `svgsel.toml`:
//!
//! | Module     | TOML Section   | Purpose                          |
//! |------------|----------------|----------------------------------|
//! | `log`      | `[log]`        | Verbose output                   |
//! | `optimize` | `[optimize]`   | Default level and precision      |
//! | `output`   | `[output]`     | JSON report formatting           |

mod log;
mod optimize;
mod output;

pub use log::LogConfig;
pub use optimize::OptimizeConfig;
pub use output::OutputConfig;
