//! Site-Scribe main entry point
//!
//! This is the command-line interface for the Site-Scribe Markdown exporter.

use anyhow::Context;
use clap::{Parser, Subcommand};
use site_scribe::config::{load_config_with_hash, Config};
use site_scribe::crawler::{run_blog, run_catalog};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Scribe: exports product catalogs and blogs to Markdown
///
/// Site-Scribe fetches a product listing or a WordPress REST API, extracts
/// each item's content, and writes one Markdown file per item.
#[derive(Parser, Debug)]
#[command(name = "site-scribe")]
#[command(version = "1.0.0")]
#[command(about = "Exports product catalogs and blogs to Markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Pipeline to run
    #[command(subcommand)]
    pipeline: Pipeline,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Pipeline {
    /// Crawl the product listing and export each product page
    Catalog,
    /// Export every published post from the WordPress REST API
    Blog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.pipeline);
        return Ok(());
    }

    let stats = match cli.pipeline {
        Pipeline::Catalog => run_catalog(&config).await.context("catalog run failed")?,
        Pipeline::Blog => run_blog(&config).await.context("blog run failed")?,
    };

    if stats.items_written > 0 {
        tracing::info!("Done: {} Markdown files written", stats.items_written);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_scribe=info,warn"),
            1 => EnvFilter::new("site_scribe=debug,info"),
            2 => EnvFilter::new("site_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration for the chosen pipeline
fn handle_dry_run(config: &Config, pipeline: Pipeline) {
    println!("=== Site-Scribe Dry Run ===\n");

    println!("Fetch Configuration:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Delay between items: {}ms", config.fetch.delay_ms);
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Extra headers: {}", config.fetch.headers.len());
    println!("  Cookies: {}", config.fetch.cookies.len());

    match (pipeline, &config.catalog, &config.blog) {
        (Pipeline::Catalog, Some(catalog), _) => {
            println!("\nCatalog:");
            println!("  Listing: {}", catalog.listing_url);
            println!("  Link selector: {}", catalog.link_selector);
            println!("  Path marker: {}", catalog.path_marker);
            println!("  Title selector: {}", catalog.title_selector);
            println!("  Content selector: {}", catalog.content_selector);
            println!("  Output: {}", catalog.output_dir);
            println!("\n✓ Would export products linked from {}", catalog.listing_url);
        }
        (Pipeline::Blog, _, Some(blog)) => {
            println!("\nBlog:");
            println!("  Posts API: {}", blog.posts_url());
            println!("  Per page: {}", blog.per_page);
            println!("  Output: {}", blog.output_dir);
            println!("  Images: {}", blog.image_dir);
            println!("\n✓ Would export every published post");
        }
        (pipeline, _, _) => {
            println!("\n✗ No configuration section for the {:?} pipeline", pipeline);
        }
    }
}
