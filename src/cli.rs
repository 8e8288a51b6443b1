//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Service the reference deployment exports from.
pub const DEFAULT_BASE_URL: &str = "https://cole.uconline.edu";

/// Export a user's content library into a browsable directory tree.
///
/// Every file, collection and link in the library is mirrored under
/// `<OUTPUT_DIR>/output-<timestamp>/<USER_ID>/`, with an `index.html` in
/// each directory.
#[derive(Parser, Debug)]
#[command(name = "library-export")]
#[command(author, version, about)]
pub struct Args {
    /// Library owner to export
    pub user_id: String,

    /// Password of the administrative account
    pub admin_password: String,

    /// Service root URL [default: https://cole.uconline.edu]
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory the dated export root is created in [default: .]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Account used for HTTP Basic authentication [default: admin]
    #[arg(long)]
    pub admin_user: Option<String>,

    /// Listing page size (1-100000) [default: 500]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub items: Option<u32>,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub insecure: bool,

    /// Maximum redirect hops per request (0-100) [default: 20]
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub max_redirects: Option<u8>,

    /// HTTP connect timeout in seconds (1-3600) [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP read timeout in seconds (1-3600) [default: 300]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Ignore the config file
    #[arg(long)]
    pub no_config: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
