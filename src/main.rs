//! STW V-Bucks Tracker CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::time::Duration;
use stw_vbucks_tracker::{extract_offers, Config, DiscordClient, EpicClient, StateStore, Tracker};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "stw-vbucks-tracker")]
#[command(about = "Announces new Save the World V-Bucks mission alerts to Discord")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll continuously and announce new alerts
    Run {
        /// Poll interval in seconds (overrides POLL_INTERVAL_SECONDS)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Fetch once and print current V-Bucks alerts without announcing
    Scan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(log_filter(cli.verbose, env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run { interval } => run_tracker(&Config::from_env()?, interval).await?,
        Commands::Scan => {
            let (credentials, endpoints) = Config::epic_from_env()?;
            scan_alerts(EpicClient::new(credentials, &endpoints)?).await?
        }
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise info. `--verbose` raises the default to debug.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new("info"),
    };
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}

async fn run_tracker(config: &Config, interval: Option<u64>) -> Result<()> {
    let interval = match interval {
        Some(0) => anyhow::bail!("--interval must be greater than zero"),
        Some(secs) => Duration::from_secs(secs),
        None => config.poll_interval(),
    };

    let epic = EpicClient::new(config.epic.clone(), &config.endpoints)?;
    let discord = DiscordClient::connect(
        config.discord_token.clone(),
        &config.endpoints.discord_api,
        config.channel_id,
        config.role_id,
    )
    .await
    .with_context(|| format!("Could not open Discord channel {}", config.channel_id))?;

    let store = StateStore::new(config.state_file.clone());
    info!("Using state file {}", store.path().display());

    let tracker = Tracker::new(epic, discord, store).await;
    tracker.run(interval).await;
    Ok(())
}

async fn scan_alerts(epic: EpicClient) -> Result<()> {
    let doc = epic.world_info().await?;
    let offers = extract_offers(&doc);

    println!("\n{}", "=".repeat(70));
    println!("  CURRENT V-BUCKS MISSION ALERTS ({})", offers.len());
    println!("{}\n", "=".repeat(70));

    if offers.is_empty() {
        println!("No V-Bucks alerts right now.\n");
        return Ok(());
    }

    for (i, offer) in offers.iter().enumerate() {
        println!("{}. {} - {} V-Bucks", i + 1, offer.display_name, offer.quantity);
        println!("   {}", offer.description);
        println!("   Theater: {}\n", offer.theater_id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(verbose: bool, rust_log: Option<&str>) -> String {
        log_filter(verbose, rust_log).to_string().to_lowercase()
    }

    #[test]
    fn test_rust_log_level_is_kept_without_verbose() {
        let filter = rendered(false, Some("warn,stw_vbucks_tracker=trace"));
        assert!(filter.contains("warn"));
        assert!(filter.contains("stw_vbucks_tracker=trace"));
        assert!(!filter.contains("debug"));
    }

    #[test]
    fn test_default_and_verbose_levels() {
        assert!(rendered(false, None).contains("info"));
        assert!(rendered(false, Some("  ")).contains("info"));
        assert!(!rendered(false, None).contains("debug"));
        assert!(rendered(true, None).contains("debug"));
    }
}
