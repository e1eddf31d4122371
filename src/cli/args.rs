//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::catalog::ResourceFilter;

/// Medical learning guide: catalog queries, headless router and dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: mlg.toml)
    #[arg(short = 'C', long, default_value = "mlg.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the development file server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check that the static tree the server maps exists
    Verify,

    /// Navigate the router headlessly and print the resulting document
    #[command(visible_alias = "r")]
    Render {
        /// Routes to visit in order (default: the home route)
        #[arg(value_name = "ROUTE")]
        routes: Vec<String>,

        /// Go back this many history entries after the last route
        #[arg(long, default_value_t = 0)]
        back: usize,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Search resources (every term must match)
    Search {
        /// Search terms
        query: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        data: DataArgs,
    },

    /// List one category, featured first
    #[command(visible_alias = "ls")]
    List {
        /// Category name, e.g. basic_sciences
        category: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Recommended learning paths for an audience
    Paths {
        /// Audience tag, e.g. student
        audience: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Categories and their subcategories
    Categories {
        #[command(flatten)]
        data: DataArgs,
    },
}

/// Where datasets come from and how results are printed.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Fetch datasets from this site instead of the local data root
    #[arg(short = 'U', long = "base-url", value_hint = clap::ValueHint::Url)]
    pub base_url: Option<String>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Resource filters shared by `search` and `list`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(short, long)]
    pub difficulty: Option<String>,

    #[arg(short, long)]
    pub language: Option<String>,

    #[arg(short, long)]
    pub subcategory: Option<String>,

    /// Required tag
    #[arg(short, long)]
    pub tag: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ResourceFilter {
        let pairs = [
            ("difficulty", &self.difficulty),
            ("language", &self.language),
            ("subcategory", &self.subcategory),
            ("tags", &self.tag),
        ];
        ResourceFilter::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.as_deref().map(|v| (key, v))),
        )
    }
}

impl Cli {
    /// Dataset options of the current command, if it reads data.
    pub fn data_args(&self) -> Option<&DataArgs> {
        match &self.command {
            Commands::Render { data, .. }
            | Commands::Search { data, .. }
            | Commands::List { data, .. }
            | Commands::Paths { data, .. }
            | Commands::Categories { data } => Some(data),
            Commands::Serve { .. } | Commands::Verify => None,
        }
    }

    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
