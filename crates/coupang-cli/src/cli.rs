//! CLI argument definitions for `coupang`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Keyword product search |
//! | `best` | Best sellers of one category |
//! | `goldbox` | Today's time-limited deals |
//! | `deeplink` | Convert a product URL into a tracked short link |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | env or `30000` | Per-call deadline in ms |
//! | `--retries` | `0` | Retries for transport and 5xx failures |
//! | `--no-shorten` | `false` | Keep gateway product URLs |
//! | `--rules` | built-in | JSON file with variable-pricing rules |
//!
//! # Examples
//!
//! ```bash
//! coupang search 텀블러 --limit 5 --pretty
//! coupang best --category-id 1016 --limit 10
//! coupang goldbox --no-shorten
//! coupang deeplink "https://www.coupang.com/vp/products/7421956"
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use coupang_core::SortOrder;

/// Coupang Partners product lookup
///
/// Credentials come from COUPANG_ACCESS_KEY and COUPANG_SECRET_KEY, read from
/// the environment or a `.env` file in the working directory.
#[derive(Debug, Parser)]
#[command(
    name = "coupang",
    author,
    version,
    about = "Coupang Partners product lookup"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-call deadline in milliseconds; overrides COUPANG_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retry transport failures and 5xx responses this many times.
    #[arg(long, global = true, default_value_t = 0)]
    pub retries: u32,

    /// Return the product URLs from the gateway without shortening them.
    #[arg(long, global = true, default_value_t = false)]
    pub no_shorten: bool,

    /// JSON file replacing the variable-pricing keyword tables.
    #[arg(long, global = true, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search products by keyword.
    ///
    /// # Examples
    ///
    ///   coupang search "무선 이어폰"
    ///   coupang search tumbler --limit 5 --sort low
    Search(SearchArgs),

    /// Best sellers of one category.
    ///
    /// # Examples
    ///
    ///   coupang best
    ///   coupang best --category-id 1001 --limit 50
    Best(BestArgs),

    /// Today's time-limited deals.
    Goldbox(GoldboxArgs),

    /// Convert a product URL into a tracked short link.
    Deeplink(DeeplinkArgs),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search keyword.
    pub keyword: String,

    /// Maximum number of products (clamped to 1..=100).
    #[arg(long, default_value_t = 20)]
    pub limit: u32,

    /// Result ordering.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
}

#[derive(Debug, Args)]
pub struct BestArgs {
    /// Gateway category id.
    #[arg(long, default_value_t = 1016)]
    pub category_id: u32,

    /// Maximum number of products (clamped to 1..=100).
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(Debug, Args)]
pub struct GoldboxArgs {
    /// Maximum number of products (clamped to 1..=100).
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(Debug, Args)]
pub struct DeeplinkArgs {
    /// Product page URL to convert.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Relevance.
    Relevance,
    /// Best selling first.
    Sales,
    /// Lowest price first.
    Low,
    /// Highest price first.
    High,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Relevance => Self::Relevance,
            SortArg::Sales => Self::Sales,
            SortArg::Low => Self::LowestPrice,
            SortArg::High => Self::HighestPrice,
        }
    }
}
