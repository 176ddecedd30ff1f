use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use floodwatch_common::observability::{init_logging, LogConfig};
use floodwatch_config::{FloodwatchConfig, FloodwatchConfigLoader};
use floodwatch_social::directory::CityDirectory;
use floodwatch_social::twitter::search::{search_term, SearchOpts};
use floodwatch_social::TwitterApi;
use floodwatch_web::CityListSource;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

mod export;
mod pipeline;

use pipeline::RunKind;

/// Collect Houston-area traffic posts and labeled corpora from Twitter/X.
#[derive(Parser)]
#[command(name = "floodwatch", version)]
struct Cli {
    /// Configuration file; missing file falls back to defaults + env.
    #[arg(long, default_value = "floodwatch.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the collection pipeline and write the CSV corpora.
    Collect {
        /// Restrict to one run instead of all three.
        #[arg(long, value_enum)]
        only: Option<RunKind>,
    },
    /// Prompt for a street or term and print recent matching posts.
    Search {
        /// Account(s) to search; defaults to the Houston traffic feeds.
        #[arg(long = "account")]
        accounts: Vec<String>,
    },
    /// Print the traffic accounts for a flood-prone city, or scrape and
    /// print the whole table when no city is named.
    Cities { name: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins), 2) logging, 3) dispatch.
    let cfg: FloodwatchConfig = FloodwatchConfigLoader::new()
        .with_file(&cli.config, false)
        .load()?;

    init_logging(LogConfig::default())?;

    match cli.command {
        Command::Collect { only } => {
            let api = make_client(&cfg).await?;
            pipeline::run_collect(&api, &cfg, only).await?;
        }
        Command::Search { accounts } => {
            let api = make_client(&cfg).await?;
            run_search(&api, &cfg, accounts).await?;
        }
        Command::Cities { name } => {
            run_cities(&cfg, name).await?;
        }
    }

    Ok(())
}

/// Construct the one API client the whole run shares. A configured bearer
/// token wins; otherwise the consumer key/secret files are exchanged for an
/// app-only token. HTTP tuning (`http.timeout_secs`, `http.retries`) applies
/// either way.
async fn make_client(cfg: &FloodwatchConfig) -> Result<TwitterApi> {
    let api = if let Some(bearer) = cfg
        .credentials
        .bearer_token
        .as_deref()
        .filter(|t| !t.is_empty() && !t.contains("${"))
    {
        TwitterApi::new(bearer.to_string())?
    } else {
        let creds = cfg
            .credentials
            .load()
            .context("no bearer token configured and credential files unreadable")?;
        TwitterApi::from_consumer_keys(&creds.consumer_key, &creds.consumer_secret).await?
    };

    Ok(api
        .with_timeout(Duration::from_secs(cfg.http.timeout_secs))
        .with_retries(cfg.http.retries))
}

async fn run_search(api: &TwitterApi, cfg: &FloodwatchConfig, accounts: Vec<String>) -> Result<()> {
    let accounts = if accounts.is_empty() {
        println!("No accounts passed; searching the default Houston traffic feeds.");
        cfg.search.accounts.clone()
    } else {
        accounts
    };

    let term = prompt("What street you want to find? ")?;
    if term.is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }

    let opts = SearchOpts {
        per_account: cfg.search.per_account,
        max_results: cfg.search.max_results,
    };
    let matches = search_term(api, &accounts, &term, &opts).await?;

    if matches.is_empty() {
        println!("No recent posts mention {term:?}.");
    }
    for text in matches {
        println!("- {text}");
    }
    Ok(())
}

async fn run_cities(cfg: &FloodwatchConfig, name: Option<String>) -> Result<()> {
    match name {
        Some(name) => {
            let directory = CityDirectory::builtin();
            match directory.lookup(&name) {
                Some(handles) => {
                    for handle in handles {
                        println!("{handle}");
                    }
                }
                None => {
                    println!("No traffic accounts known for {name:?}. Try one of:");
                    for city in directory.city_names() {
                        println!("  {city}");
                    }
                }
            }
        }
        None => {
            let source = CityListSource::new(&cfg.cities.source_url)?;
            let cities = source.fetch_city_names().await?;
            let directory = CityDirectory::from_city_names(&cities)?;
            for (city, handles) in directory.iter() {
                println!("{city}: {}", handles.join(", "));
            }
        }
    }
    Ok(())
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
