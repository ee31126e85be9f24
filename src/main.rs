//! Tolk - multilingual content routing and reconciliation.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod generator;
mod logger;
mod registry;
mod resolve;
mod seo;
mod store;
mod translate;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::run(&config),
        Commands::Serve { .. } => cli::serve::run(&config),
        Commands::Query { args } => cli::query::run(args, &config),
    }
}
