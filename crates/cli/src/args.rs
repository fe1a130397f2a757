//! Command-line arguments for the watchlist client.
use clap::Parser;
use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON settings file. Defaults apply to every field it omits.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// JSON file to keep watchlists in. Overrides `store_path` from the config.
    #[clap(long)]
    pub store: Option<PathBuf>,

    /// Quote poll period in milliseconds. Overrides `poll_interval_ms`.
    #[clap(long)]
    pub interval_ms: Option<u64>,

    /// Create (or reuse) this watchlist and make it current.
    #[clap(long)]
    pub watchlist: Option<String>,

    /// Search the catalog; the first match is polled unless --symbol is given.
    #[clap(long)]
    pub search: Option<String>,

    /// Ticker to poll.
    #[clap(long)]
    pub symbol: Option<String>,

    /// Stop after this many quotes.
    #[clap(long, default_value_t = 5)]
    pub ticks: usize,
}
