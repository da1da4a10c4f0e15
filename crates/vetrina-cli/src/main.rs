//! Vetrina CLI - search, recommendations and catalog management
//!
//! Thin client over the Vetrina API for trying queries and triggering
//! syncs without crafting HTTP requests by hand.

mod api;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;

use api::{Filters, SearchRequest, SearchResponse, VetrinaClient};
use config::Config;

#[derive(Parser)]
#[command(name = "vetrina")]
#[command(about = "Vetrina CLI - semantic product search and recommendations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login and store the sync API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Search the catalog
    Search {
        /// Free-text query
        query: String,
        /// Result limit
        #[arg(short, long)]
        limit: Option<i64>,
        /// Session id (defaults to the stored session)
        #[arg(short, long)]
        session: Option<String>,
        /// Restrict to a category (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
        /// Maximum price
        #[arg(long)]
        max_price: Option<f64>,
        /// Only in-stock products
        #[arg(long)]
        in_stock: bool,
    },

    /// Products similar to a given product
    Recommend {
        /// Catalog product id
        product_id: i64,
        /// Result limit
        #[arg(short, long)]
        limit: Option<i64>,
        /// Session id (defaults to the stored session)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Most-interacted products over a rolling window
    Trending {
        /// Window spec like 30m, 24h or 7d
        #[arg(short, long)]
        window: Option<String>,
        /// Result limit
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Trigger a catalog sync
    Sync {
        /// Pull the full catalog instead of changes since the last sync
        #[arg(long)]
        full: bool,
    },

    /// Check service health
    Health,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login { key } => cmd_login(key),
        Commands::Search {
            query,
            limit,
            session,
            category,
            max_price,
            in_stock,
        } => cmd_search(query, limit, session, category, max_price, in_stock).await,
        Commands::Recommend {
            product_id,
            limit,
            session,
        } => cmd_recommend(product_id, limit, session).await,
        Commands::Trending { window, limit } => cmd_trending(window, limit).await,
        Commands::Sync { full } => cmd_sync(full).await,
        Commands::Health => cmd_health().await,
        Commands::Config => cmd_config(),
    }
}

fn client(config: &Config) -> VetrinaClient {
    VetrinaClient::new(&config.base_url, config.api_key.clone())
}

fn cmd_login(key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => Password::new().with_prompt("API key").interact()?,
    };

    let mut config = Config::load()?;
    config.api_key = Some(key);
    config.save()?;

    println!("{}", "API key saved".green());
    println!("Config: {:?}", Config::config_path()?);
    Ok(())
}

async fn cmd_search(
    query: String,
    limit: Option<i64>,
    session: Option<String>,
    categories: Vec<String>,
    max_price: Option<f64>,
    in_stock: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    let session_id = match session {
        Some(session) => session,
        None => config.session()?,
    };

    let filters = if categories.is_empty() && max_price.is_none() && !in_stock {
        None
    } else {
        Some(Filters {
            categories,
            price_max: max_price,
            in_stock_only: in_stock,
        })
    };

    let response = client(&config)
        .search(&SearchRequest {
            query,
            session_id: Some(session_id),
            limit,
            filters,
        })
        .await?;

    print_results(&response);
    Ok(())
}

async fn cmd_recommend(
    product_id: i64,
    limit: Option<i64>,
    session: Option<String>,
) -> Result<()> {
    let mut config = Config::load()?;
    let session_id = match session {
        Some(session) => session,
        None => config.session()?,
    };

    let response = client(&config)
        .recommend(product_id, Some(&session_id), limit)
        .await?;

    print_results(&response);
    Ok(())
}

async fn cmd_trending(window: Option<String>, limit: Option<i64>) -> Result<()> {
    let config = Config::load()?;
    let response = client(&config)
        .trending(window.as_deref(), limit)
        .await?;

    println!(
        "{} (window: {})",
        "Trending products".bold(),
        response.window.cyan()
    );
    for (i, product) in response.products.iter().enumerate() {
        println!(
            "{:>3}. {} {} {} {}",
            i + 1,
            product.name.bold(),
            format!("{} {:.2}", product.currency, product.price).yellow(),
            format!("[{} interactions]", product.interactions).dimmed(),
            format!("#{}", product.product_id).dimmed(),
        );
    }
    Ok(())
}

async fn cmd_sync(full: bool) -> Result<()> {
    let config = Config::load()?;
    println!(
        "Starting {} sync...",
        if full { "full" } else { "incremental" }
    );

    let report = client(&config).sync(full).await?;

    println!(
        "{}: {} created, {} updated, {} skipped, {} failed ({}ms)",
        "Sync complete".green(),
        report.created,
        report.updated,
        report.skipped,
        report.failed,
        report.duration_ms
    );
    for failure in &report.failures {
        println!("  {} {}", "!".red(), failure);
    }
    Ok(())
}

async fn cmd_health() -> Result<()> {
    let config = Config::load()?;
    let health = client(&config).health().await?;

    let status = if health.status == "ok" {
        health.status.green()
    } else {
        health.status.yellow()
    };
    println!("Status: {} (v{})", status, health.version);
    println!(
        "Vector store: {}",
        if health.store_reachable {
            "reachable".green()
        } else {
            "unreachable".red()
        }
    );
    println!(
        "Embedding provider: {}",
        if health.embedding_provider_reachable {
            "reachable".green()
        } else {
            "unreachable".red()
        }
    );
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;
    println!("Config file: {:?}", Config::config_path()?);
    println!("Base URL: {}", config.base_url);
    println!(
        "API key: {}",
        if config.api_key.is_some() {
            "set".green()
        } else {
            "not set".yellow()
        }
    );
    println!(
        "Session: {}",
        config.session_id.as_deref().unwrap_or("none yet")
    );
    Ok(())
}

fn print_results(response: &SearchResponse) {
    println!("{}", response.message.bold());
    if response.degraded {
        println!("{}", "(degraded: lexical matching in effect)".yellow());
    }
    println!();

    for product in &response.results {
        let stock = if product.in_stock {
            "in stock".green()
        } else {
            "out of stock".red()
        };
        println!(
            "{:>3}. {} {} ({}) {} {}",
            product.rank,
            product.name.bold(),
            format!("{} {:.2}", product.currency, product.price).yellow(),
            stock,
            format!("score {:.3}", product.score).dimmed(),
            product.permalink.dimmed(),
        );
    }

    if !response.suggestions.is_empty() {
        println!();
        for suggestion in &response.suggestions {
            println!("  {} {}", "→".cyan(), suggestion);
        }
    }
    println!();
    println!("{}", format!("session: {}", response.session_id).dimmed());
}
