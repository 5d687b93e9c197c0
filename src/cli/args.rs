//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::svg::OptimizeLevel;

/// Select SVG elements with compact queries and transform them
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: svgsel.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "svgsel.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the elements matching a selector as JSON
    #[command(visible_alias = "s")]
    Select {
        #[command(flatten)]
        args: SelectArgs,
    },

    /// Apply a transform request to every element matching a selector
    #[command(visible_alias = "t")]
    Transform {
        #[command(flatten)]
        args: TransformArgs,
    },

    /// Shrink documents with the size-reduction pipeline
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
}

/// Input and output arguments shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct IoArgs {
    /// Documents to read. Omit or use `-` to read from stdin.
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Write the resulting document here. With several inputs this is a
    /// directory and each output keeps its input file name.
    #[arg(short, long, value_hint = clap::ValueHint::AnyPath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Select command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct SelectArgs {
    /// Selector, e.g. `rect.icon[fill="red"]`
    pub selector: String,

    #[command(flatten)]
    pub io: IoArgs,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Transform command arguments.
#[derive(clap::Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("request_source").required(true).args(["request", "request_file"])))]
pub struct TransformArgs {
    /// Selector, e.g. `#logo` or `circle.dot`
    pub selector: String,

    #[command(flatten)]
    pub io: IoArgs,

    /// Transform request as JSON, e.g. `{"translate":{"x":10,"y":5}}`
    #[arg(short = 't', long)]
    pub request: Option<String>,

    /// Read the transform request from a JSON file
    #[arg(short = 'f', long, value_hint = clap::ValueHint::FilePath)]
    pub request_file: Option<PathBuf>,

    /// Print the full result record as JSON instead of the document
    #[arg(short, long)]
    pub report: bool,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Optimize command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Optimization level (default: from config, else standard)
    #[arg(short, long, value_enum)]
    pub level: Option<OptimizeLevel>,

    /// Decimal places kept when rounding numbers
    #[arg(short, long)]
    pub precision: Option<u8>,
}

impl Cli {
    /// Verbose flag of whichever subcommand was given.
    pub const fn verbose(&self) -> bool {
        match &self.command {
            Commands::Select { args } => args.io.verbose,
            Commands::Transform { args } => args.io.verbose,
            Commands::Optimize { args } => args.io.verbose,
        }
    }
}
