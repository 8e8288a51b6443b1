//! CLI entry point for the library export tool.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use library_export_core::config::{FileConfig, load_default_file_config};
use library_export_core::export::{DEFAULT_LIBRARY_ITEMS, ExportOptions, Exporter};
use library_export_core::fetch::{
    AuthenticatedFetcher, CONNECT_TIMEOUT_SECS, DEFAULT_ADMIN_USER, DEFAULT_MAX_REDIRECTS,
    FetchOptions, READ_TIMEOUT_SECS,
};
use library_export_core::session::{Credentials, Session};
use tracing::{debug, info};

mod cli;

use cli::{Args, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let file_config = if args.no_config {
        None
    } else {
        load_default_file_config()?
    };
    let file_config = file_config.unwrap_or_default();

    init_tracing(&args, &file_config);
    debug!(
        user_id = %args.user_id,
        config_loaded = file_config != FileConfig::default(),
        "CLI arguments parsed"
    );

    let base_url = args
        .base_url
        .clone()
        .or_else(|| file_config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let admin_user = args
        .admin_user
        .clone()
        .or_else(|| file_config.admin_user.clone())
        .unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string());
    let items = args
        .items
        .and_then(|n| usize::try_from(n).ok())
        .or(file_config.items)
        .unwrap_or(DEFAULT_LIBRARY_ITEMS);

    let fetch_options = FetchOptions {
        connect_timeout_secs: args
            .connect_timeout
            .or(file_config.connect_timeout_secs)
            .unwrap_or(CONNECT_TIMEOUT_SECS),
        read_timeout_secs: args
            .read_timeout
            .or(file_config.read_timeout_secs)
            .unwrap_or(READ_TIMEOUT_SECS),
        accept_invalid_certs: args.insecure || file_config.accept_invalid_certs.unwrap_or(false),
        max_redirects: args
            .max_redirects
            .map(usize::from)
            .or(file_config.max_redirects)
            .unwrap_or(DEFAULT_MAX_REDIRECTS),
    };

    let session = Session::new(
        base_url,
        args.user_id.clone(),
        Credentials::new(admin_user, args.admin_password.clone()),
    );
    let fetcher = AuthenticatedFetcher::new(session.credentials().clone(), fetch_options)
        .context("Failed to initialize HTTP client")?;

    let output_root = dated_output_root(
        args.output_dir
            .clone()
            .or_else(|| file_config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
    );
    info!(
        base_url = %session.base_url(),
        user_id = %session.user_id(),
        output = %output_root.display(),
        "Library export starting"
    );

    let exporter = Exporter::new(
        session,
        fetcher,
        output_root,
        ExportOptions {
            library_items: items,
            collection_items: items,
        },
    );
    let user_root = exporter.user_root();
    let stats = exporter
        .process_library()
        .await
        .with_context(|| format!("Export aborted; partial output left in '{}'", user_root.display()))?;

    info!(
        files = stats.files(),
        collections = stats.collections(),
        links = stats.links(),
        documents_skipped = stats.documents_skipped(),
        output = %user_root.display(),
        "Library export complete"
    );
    Ok(())
}

/// Determine log level from flags.
/// Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > default (info)
fn init_tracing(args: &Args, file_config: &FileConfig) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config
                .verbosity
                .map_or("info", |verbosity| verbosity.filter_level()),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Each run gets its own `output-<unix timestamp>` directory.
fn dated_output_root(parent: PathBuf) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    parent.join(format!("output-{timestamp}"))
}
