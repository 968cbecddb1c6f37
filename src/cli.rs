use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "sitemap-catalog")]
#[command(
    about = "Harvest product names and images from a sitemap and curate them into a catalog",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long, global = true)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Visit every /product/ page of a sitemap and write <domain>.json
    Scrape {
        sitemap_url: String,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        #[arg(long)]
        user_agent: Option<String>,

        /// Number of records echoed to stdout
        #[arg(long, default_value = "5")]
        preview: usize,
    },

    /// Turn a catalog JSON into a standalone HTML page
    Render {
        input: PathBuf,

        /// Output file (default: <out-dir>/catalog.html)
        #[arg(long)]
        html: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        contact: Option<String>,
    },

    /// Delete products from a catalog JSON, interactively unless --delete is given
    Curate {
        input: PathBuf,

        /// Indices to delete in one batch, e.g. 0,2 or 1-3
        #[arg(long)]
        delete: Option<String>,

        /// Also write the catalog page here
        #[arg(long)]
        html: Option<PathBuf>,

        /// Write the curated JSON under the uploaded file name (implied by
        /// --delete when --html is not given)
        #[arg(long)]
        save: bool,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        contact: Option<String>,
    },
}

impl Cli {
    /// File config with the global flags applied on top.
    pub fn apply_globals(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.out_dir {
            config.output_dir = dir.clone();
        }
        config
    }
}
