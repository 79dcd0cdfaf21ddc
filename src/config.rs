use std::env;
use std::path::PathBuf;

use url::Url;

use crate::error::{AppError, Result};

/// Feeds watched out of the box. The first one can be overridden with the
/// FEED_URL environment variable.
const DEFAULT_FEED_URLS: [&str; 2] = [
    "https://feeds.feedburner.com/cyber-security-news",
    "https://www.ccn-cert.cni.es/es/component/obrss/rss-ultimas-vulnerabilidades?format=feed",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub chat_id: i64,
    pub check_every_minutes: u64,
    pub db_path: String,
    pub feed_urls: Vec<String>,
    pub keywords: Vec<String>,
}

impl Config {
    /// Build the runtime configuration from the environment.
    ///
    /// The bot credential and chat id are required; everything else has a
    /// default. Errors here are fatal and abort startup.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if bot_token.is_empty() {
            return Err(AppError::Config(
                "TELEGRAM_BOT_TOKEN is not set".to_string(),
            ));
        }

        let chat_id = match env::var("TELEGRAM_CHAT_ID") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::Config(format!("TELEGRAM_CHAT_ID is not an integer: {raw}"))
            })?,
            Err(_) => 0,
        };
        if chat_id == 0 {
            return Err(AppError::Config("TELEGRAM_CHAT_ID is not set".to_string()));
        }

        let check_every_minutes = match env::var("CHECK_EVERY_MINUTES") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("CHECK_EVERY_MINUTES is not an integer: {raw}"))
            })?,
            Err(_) => 15,
        };
        if check_every_minutes == 0 {
            return Err(AppError::Config(
                "CHECK_EVERY_MINUTES must be positive".to_string(),
            ));
        }

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| default_db_path());
        let feed_urls = resolve_feed_urls(env::var("FEED_URL").ok());
        let keywords = parse_keywords(&env::var("KEYWORDS").unwrap_or_default());

        for feed_url in &feed_urls {
            Url::parse(feed_url)
                .map_err(|e| AppError::Config(format!("invalid feed URL {feed_url}: {e}")))?;
        }

        Ok(Self {
            bot_token,
            chat_id,
            check_every_minutes,
            db_path,
            feed_urls,
            keywords,
        })
    }
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feed-courier");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("sent.db").to_string_lossy().to_string()
}

fn resolve_feed_urls(override_url: Option<String>) -> Vec<String> {
    let mut urls: Vec<String> = DEFAULT_FEED_URLS.iter().map(|u| u.to_string()).collect();
    if let Some(url) = override_url.filter(|u| !u.is_empty()) {
        urls[0] = url;
    }
    urls
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}
