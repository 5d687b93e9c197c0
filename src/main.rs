//! svgsel - select and transform SVG elements from the command line.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use svgsel::cli::{self, Cli, Commands};
use svgsel::config::ToolConfig;
use svgsel::{debug, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = ToolConfig::load(&cli)?;
    logger::set_verbose(config.log.verbose);
    if let Some(path) = &config.config_path {
        debug!("config"; "loaded {}", path.display());
    }

    match &cli.command {
        Commands::Select { args } => cli::select::run_select(args, &config),
        Commands::Transform { args } => cli::transform::run_transform(args, &config),
        Commands::Optimize { args } => cli::optimize::run_optimize(args, &config),
    }
}
