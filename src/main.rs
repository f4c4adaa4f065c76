//! # ScpBot
//!
//! Discord bot answering SCP wiki lookups with fuzzy title search.
//!
//! Usage:
//!   scpbot                       # Run the bot (requires a Discord token)
//!   scpbot debug                 # Interactive query loop, no Discord
//!   scpbot --config other.toml   # Custom config path

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use scpbot_agent::ScpAgent;
use scpbot_channels::DiscordChannel;
use scpbot_core::ScpBotConfig;
use scpbot_core::traits::Channel;
use scpbot_wiki::ScpWiki;

#[derive(Parser)]
#[command(name = "scpbot", version, about = "SCP wiki lookup bot")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "scpbot.toml")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Query the loaded wiki interactively instead of running the bot
    Debug,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = ScpBotConfig::load_or_default(&cli.config)?;

    tracing::info!("Loading SCP wiki...");
    let wiki = ScpWiki::load(&config.search).await?;
    tracing::info!("Done. {} entries loaded", wiki.entry_count());

    match cli.command {
        Some(Command::Debug) => debug_loop(&wiki),
        None => run_bot(config, wiki).await,
    }
}

/// Pump Discord messages through the agent until Ctrl-C.
async fn run_bot(config: ScpBotConfig, wiki: ScpWiki) -> Result<()> {
    if !config.discord.enabled {
        anyhow::bail!("Discord channel is disabled in config");
    }

    let agent = ScpAgent::new(wiki);
    let mut channel = DiscordChannel::new(config.discord);
    channel.connect().await?;

    let mut messages = channel.start_listening();
    tracing::info!("ScpBot is running; press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                channel.disconnect().await?;
                return Ok(());
            }
            msg = messages.next() => {
                let Some(msg) = msg else {
                    anyhow::bail!("Discord message stream ended unexpectedly");
                };
                if let Some(reply) = agent.handle(&msg)
                    && let Err(e) = channel.send(reply).await
                {
                    tracing::error!("Failed to send reply: {e}");
                }
            }
        }
    }
}

/// Interactive query loop: `#`-prefixed input prints only the match
/// count, `A..B` prints a number range, a bare number prints that entry,
/// anything else is a title search. Empty input exits.
fn debug_loop(wiki: &ScpWiki) -> Result<()> {
    use std::io::Write as _;

    let stdin = std::io::stdin();
    loop {
        print!("query> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let mut query = line.trim();
        if query.is_empty() {
            return Ok(());
        }

        let count_only = query.starts_with('#');
        if count_only {
            query = query[1..].trim();
        }

        let matches: Vec<&scpbot_wiki::Entry> = if let Some((a, b)) = parse_range(query) {
            let mut in_range: Vec<_> = wiki
                .all_entries()
                .filter(|e| e.number >= a && e.number <= b)
                .collect();
            in_range.sort_by_key(|e| e.number);
            in_range
        } else if let Ok(number) = query.parse::<u32>() {
            wiki.entry(number).into_iter().collect()
        } else {
            wiki.search_title(query)
        };

        println!("Found {} matches", matches.len());
        if !count_only {
            for entry in matches {
                println!("{}: '{}' @{}", entry.number, entry.title, entry.url());
            }
        }
    }
}

/// Parses an `A..B` inclusive number range.
fn parse_range(query: &str) -> Option<(u32, u32)> {
    let (a, b) = query.split_once("..")?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
