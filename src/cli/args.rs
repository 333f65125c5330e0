//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of the default lookup
//! - `--database-url <url>`: Override the store URL
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Errors only on stderr
//!
//! Request values are taken as text and validated by the services, so a
//! malformed value yields the same structured error it would over any
//! other boundary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geoquery - spatial lookups over stadiums and states
#[derive(Parser, Debug)]
#[command(name = "geoquery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// PostGIS connection URL (overrides config and GEOQUERY_DATABASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Errors only on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count stadiums inside a state
    #[command(
        name = "count",
        long_about = "Count stadiums whose location lies inside the named state.\n\n\
            The name is matched exactly as stored (no case folding). An unknown \
            state counts 0.",
        after_help = "\
EXAMPLES:
    geoquery count Texas
    geoquery count \"New York\""
    )]
    Count {
        /// State name, as stored
        region: Option<String>,
    },

    /// Count stadiums for every state, zero counts included
    #[command(name = "counts")]
    Counts,

    /// Find the stadium nearest to a coordinate
    #[command(
        name = "nearest",
        long_about = "Find the single stadium nearest to a WGS84 coordinate and its \
            geodesic distance in kilometres.",
        after_help = "\
EXAMPLES:
    geoquery nearest --lat 32.7767 --lng -96.7970"
    )]
    Nearest {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<String>,
    },

    /// Search stadiums and states by name, city or code
    #[command(
        name = "search",
        long_about = "Case-insensitive substring search. Stadiums are matched on name, \
            city and state code; states on name and short code. Stadium hits are \
            listed first, then states at their centroid.",
        after_help = "\
EXAMPLES:
    geoquery search dallas
    geoquery search TX"
    )]
    Search {
        /// Text to look for
        query: Option<String>,
    },

    /// Create a stadium
    #[command(
        name = "create",
        after_help = "\
EXAMPLES:
    geoquery create --name \"Rice Stadium\" --city Houston --region TX \\
        --lat 29.7164 --lng -95.4093"
    )]
    Create {
        /// Stadium name
        #[arg(long)]
        name: Option<String>,

        /// City
        #[arg(long)]
        city: Option<String>,

        /// State code
        #[arg(long, alias = "state")]
        region: Option<String>,

        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<String>,
    },

    /// Update name, city and state code of a stadium
    #[command(name = "update")]
    Update {
        /// Stadium identifier
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New city
        #[arg(long)]
        city: Option<String>,

        /// New state code
        #[arg(long, alias = "state")]
        region: Option<String>,
    },

    /// Identify the feature under a map pixel (WMS GetFeatureInfo)
    #[command(
        name = "identify",
        long_about = "Forward a pixel identify request to the configured WMS service \
            and print its JSON answer unchanged.",
        after_help = "\
EXAMPLES:
    geoquery identify --bbox=-125,24,-66,50 --width 800 --height 600 -x 412 -y 300"
    )]
    Identify {
        /// Map extent as minx,miny,maxx,maxy
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<String>,

        /// Map width in pixels
        #[arg(long)]
        width: Option<String>,

        /// Map height in pixels
        #[arg(long)]
        height: Option<String>,

        /// Pixel column
        #[arg(short)]
        x: Option<String>,

        /// Pixel row
        #[arg(short)]
        y: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    geoquery completion bash >> ~/.bashrc
    geoquery completion zsh >> ~/.zshrc
    geoquery completion fish > ~/.config/fish/completions/geoquery.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
