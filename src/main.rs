//! mlg - resource catalog, page router and development server for the
//! medical learning guide.

#![allow(dead_code)]

mod app;
mod catalog;
mod cli;
mod config;
mod core;
mod embed;
mod events;
mod logger;
mod router;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, query};
use config::SiteConfig;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve_site(&config),
        Commands::Verify => cli::verify::verify_site(&config),
        Commands::Render { routes, back, .. } => {
            let html = runtime()?.block_on(cli::render::render_routes(config, routes, *back))?;
            println!("{html}");
            Ok(())
        }
        Commands::Search {
            query: terms,
            filter,
            data,
        } => {
            let catalog = query::open_catalog(&config)?;
            let found = runtime()?.block_on(query::search(&catalog, terms, &filter.to_filter()));
            query::print_records(&found, data.pretty)
        }
        Commands::List {
            category,
            filter,
            data,
        } => {
            let catalog = query::open_catalog(&config)?;
            let found =
                runtime()?.block_on(query::list(&catalog, category, &filter.to_filter()))?;
            query::print_records(&found, data.pretty)
        }
        Commands::Paths { audience, data } => {
            let catalog = query::open_catalog(&config)?;
            let found = runtime()?.block_on(query::paths(&catalog, audience))?;
            query::print_records(&found, data.pretty)
        }
        Commands::Categories { data } => {
            let catalog = query::open_catalog(&config)?;
            let found = runtime()?.block_on(query::categories(&catalog));
            query::print_json(&found, data.pretty)
        }
    }
}

/// Current-thread runtime for the data commands.
fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
