use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

mod config;
mod courier;
mod db;
mod error;
mod feed;
mod filter;
mod identity;
mod models;
mod services;

use config::Config;
use courier::Courier;
use db::Repository;
use error::Result;
use feed::FeedFetcher;
use services::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs are the only operator surface; default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    // Check for --once flag (single cycle, for external schedulers)
    let args: Vec<String> = std::env::args().collect();
    let run_once = args.len() >= 2 && args[1] == "--once";

    tracing::info!(
        "Boot: chat_id={} check_every_minutes={} db_path={} feeds={}",
        config.chat_id,
        config.check_every_minutes,
        config.db_path,
        config.feed_urls.len()
    );

    let repository = Repository::new(&config.db_path).await?;
    let fetcher = FeedFetcher::new();
    let sender = TelegramClient::new(&config.bot_token, config.chat_id);

    let check_every_minutes = config.check_every_minutes;
    let courier = Courier::new(config, repository, fetcher, sender);

    tracing::info!("Initial feed check...");
    courier.run_cycle().await;

    if run_once {
        return Ok(());
    }

    // A cycle that overruns the interval delays the next tick; cycles never
    // stack concurrently.
    let mut interval = time::interval(Duration::from_secs(check_every_minutes * 60));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // the first tick completes immediately

    tracing::info!("Bot active. Checking every {} minutes.", check_every_minutes);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                courier.run_cycle().await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    Ok(())
}
