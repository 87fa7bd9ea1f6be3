//! Command-line interface for symbol-search
//!
//! # Usage
//!
//! ```bash
//! # Offline, against the built-in sample market
//! cargo run -p symbol-cli -- --offline resolve starbucks
//!
//! # Live data: quotes from Yahoo Finance, profiles and directory from Alpha Vantage
//! export ALPHA_VANTAGE_API_KEY="your-key"
//! cargo run -p symbol-cli -- repl
//! ```

mod render;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use search_utils::{Config, LogFormat};
use std::sync::Arc;
use std::time::Duration;
use symbol_resolver::{
    AlphaVantageClient, InMemoryMarket, MemoizedProfiles, Providers, ResolveEvent,
    ResolverConfig, SearchSession, YahooQuoteProvider,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "symbol-search")]
#[command(about = "Resolve tickers and company names to priced candidates", long_about = None)]
struct Args {
    /// Use the built-in sample market instead of live providers
    #[arg(long, global = true)]
    offline: bool,

    /// Quiet window before typed input is resolved
    #[arg(long, global = true, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one query and print the candidates
    Resolve {
        /// Ticker or company name
        query: String,
    },
    /// Interactive search; every line is debounced like a keystroke
    Repl,
}

/// Production deployments always log JSON
fn log_format(app: &Config, json_logs: bool) -> LogFormat {
    if json_logs || app.is_production() {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    }
}

fn build_config(args: &Args) -> anyhow::Result<ResolverConfig> {
    let mut builder = ResolverConfig::builder().with_env_api_key();
    if let Some(ms) = args.debounce_ms {
        builder = builder.debounce_window(Duration::from_millis(ms));
    }
    Ok(builder.build()?)
}

fn build_providers(config: &ResolverConfig, offline: bool) -> anyhow::Result<Providers> {
    if offline {
        info!("Using the offline sample market");
        return Ok(Providers::in_memory(Arc::new(InMemoryMarket::sample())));
    }

    if config.alpha_vantage_api_key.is_none() {
        bail!("ALPHA_VANTAGE_API_KEY is not set; export it or pass --offline");
    }
    let alpha_vantage = AlphaVantageClient::from_config(config)
        .context("failed to create Alpha Vantage client")?;

    Ok(Providers::new(
        Arc::new(YahooQuoteProvider::new()),
        Arc::new(MemoizedProfiles::new(alpha_vantage.clone(), config.profile_ttl)),
        Arc::new(alpha_vantage),
    ))
}

async fn resolve_once(config: &ResolverConfig, providers: Providers, query: &str) -> anyhow::Result<()> {
    let (session, mut events) = SearchSession::new(config, providers);
    session.flush(query);

    let event = events
        .recv()
        .await
        .context("search session stopped before producing a result")?;
    println!("{}", render::render_event(&event));
    Ok(())
}

fn print_help() {
    println!("Type to search; input settles after the debounce window.");
    println!("  !<query>  resolve immediately");
    println!("  <empty>   clear results");
    println!("  :quit     exit");
    println!();
}

async fn repl(config: &ResolverConfig, providers: Providers) -> anyhow::Result<()> {
    let (session, mut events) = SearchSession::new(config, providers);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    print_help();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // EOF
                    println!("\nGoodbye!");
                    break;
                };

                let input = line.trim();
                if input == ":quit" {
                    println!("Goodbye!");
                    break;
                }
                match input.strip_prefix('!') {
                    Some(query) => session.flush(query),
                    None => session.observe(input),
                }
            }
            Some(event) = events.recv() => {
                let rendered = render::render_event(&event);
                stdout.write_all(format!("{rendered}\n").as_bytes()).await?;
                stdout.flush().await?;
            }
        }
    }

    session.cancel().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let app = Config::from_env();
    let format = log_format(&app, args.json_logs);
    search_utils::init_tracing_with_filter(&app.log_filter, format);

    info!(environment = %app.environment, "Starting {}", app.app_name);

    let config = build_config(&args)?;
    let providers = build_providers(&config, args.offline)?;

    match &args.command {
        Command::Resolve { query } => resolve_once(&config, providers, query).await,
        Command::Repl => repl(&config, providers).await,
    }
}
