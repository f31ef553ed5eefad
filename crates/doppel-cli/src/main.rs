use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use doppel_core::{normalize_batch, parse_batch, resolve, ImageCategory};
use doppel_view::KeyDirection;
use std::path::PathBuf;

mod config;
mod session;

use config::Config;

#[derive(Parser)]
#[command(name = "doppel", about = "Doppel match-card pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Category {
    Profile,
    Face,
}

impl From<Category> for ImageCategory {
    fn from(c: Category) -> Self {
        match c {
            Category::Profile => ImageCategory::Profile,
            Category::Face => ImageCategory::Face,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a batch of raw match records and print the cards as JSON
    Normalize {
        /// JSON file: an array of records, or a search response object
        #[arg(short, long)]
        input: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Resolve one image reference to a canonical URL
    Resolve {
        reference: String,
        #[arg(short, long, value_enum, default_value = "face")]
        category: Category,
    },
    /// Load a batch and replay a navigation script against a session
    Browse {
        #[arg(short, long)]
        input: PathBuf,
        /// Comma-separated steps: next, prev, goto:N, scroll:PX,
        /// key:left, key:right
        #[arg(short, long)]
        script: String,
    },
    /// Print the share payload for the card at the given index
    Share {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Normalize { input, pretty } => {
            let records = read_batch(&input)?;
            let cards = normalize_batch(&records, &config.resolver_config());
            let json = if pretty {
                serde_json::to_string_pretty(&cards)?
            } else {
                serde_json::to_string(&cards)?
            };
            println!("{json}");
        }
        Commands::Resolve {
            reference,
            category,
        } => {
            println!(
                "{}",
                resolve(Some(&reference), category.into(), &config.resolver_config())
            );
        }
        Commands::Browse { input, script } => {
            let records = read_batch(&input)?;
            let handle = session::spawn_session(config.resolver_config(), config.card_layout());
            let count = handle.load_batch(records).await?;
            println!("loaded {count} cards");

            for step in script.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let index = apply_step(&handle, step).await?;
                match handle.active_card().await? {
                    Some(card) => println!(
                        "{step:>12} -> [{}] {}",
                        index.map_or("-".to_string(), |i| i.to_string()),
                        serde_json::to_string(&card)?
                    ),
                    None => println!("{step:>12} -> no matches"),
                }
            }
        }
        Commands::Share { input, index } => {
            let records = read_batch(&input)?;
            let handle = session::spawn_session(config.resolver_config(), config.card_layout());
            handle.load_batch(records).await?;
            handle.go_to(index).await?;
            match handle.share().await? {
                Some(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
                None => anyhow::bail!("nothing to share: empty result set"),
            }
        }
    }

    Ok(())
}

fn read_batch(path: &PathBuf) -> Result<Vec<doppel_core::RawMatchRecord>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_batch(&body).with_context(|| format!("parsing {}", path.display()))
}

/// Apply one browse-script step, returning the active index afterwards.
async fn apply_step(
    handle: &session::SessionHandle,
    step: &str,
) -> Result<Option<usize>> {
    let index = match step {
        "next" => handle.next().await?,
        "prev" => handle.previous().await?,
        "key:left" => handle.key(KeyDirection::Left).await?,
        "key:right" => handle.key(KeyDirection::Right).await?,
        _ => {
            if let Some(n) = step.strip_prefix("goto:") {
                let n: usize = n.parse().with_context(|| format!("bad step `{step}`"))?;
                handle.go_to(n).await?
            } else if let Some(px) = step.strip_prefix("scroll:") {
                let px: f32 = px.parse().with_context(|| format!("bad step `{step}`"))?;
                handle.scroll_observed(px).await?
            } else {
                anyhow::bail!("unknown browse step `{step}`");
            }
        }
    };
    Ok(index)
}
