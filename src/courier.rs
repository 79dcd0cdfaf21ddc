use std::time::Duration;

use async_trait::async_trait;
use htmlescape::encode_minimal;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::feed::FeedFetcher;
use crate::filter::matches_keywords;
use crate::identity::entry_identity;
use crate::models::Entry;
use crate::services::TelegramClient;

/// Pause after each successful send, to stay under Telegram's per-chat rate
/// limits.
const SEND_PACING: Duration = Duration::from_millis(600);

/// Capability to pull the latest entries of one feed.
#[async_trait]
pub trait FetchEntries {
    async fn fetch(&self, url: &str) -> Result<Vec<Entry>>;
}

/// Capability to push one message to the destination chat.
#[async_trait]
pub trait SendMessage {
    async fn send(&self, text: &str) -> Result<()>;
}

#[async_trait]
impl FetchEntries for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<Entry>> {
        self.fetch_feed(url).await
    }
}

#[async_trait]
impl SendMessage for TelegramClient {
    async fn send(&self, text: &str) -> Result<()> {
        self.send_message(text).await
    }
}

/// The delivery pipeline: polls every configured source, filters entries
/// against the ledger and the keyword set, and forwards what remains.
pub struct Courier<F, S> {
    config: Config,
    repository: Repository,
    fetcher: F,
    sender: S,
}

impl<F: FetchEntries, S: SendMessage> Courier<F, S> {
    pub fn new(config: Config, repository: Repository, fetcher: F, sender: S) -> Self {
        Self {
            config,
            repository,
            fetcher,
            sender,
        }
    }

    /// One full pass over all configured sources, in configured order.
    ///
    /// Failures stay scoped to the source or entry they occur in; the cycle
    /// always runs to completion and reports how many entries went out.
    pub async fn run_cycle(&self) -> usize {
        let mut delivered = 0;

        for feed_url in &self.config.feed_urls {
            let entries = match self.fetcher.fetch(feed_url).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", feed_url, e);
                    continue;
                }
            };

            tracing::info!("{} -> {} entries", feed_url, entries.len());

            for entry in &entries {
                if self.deliver_entry(feed_url, entry).await {
                    delivered += 1;
                }
            }
        }

        if delivered == 0 {
            tracing::info!("No new articles.");
        }

        delivered
    }

    /// Attempt one entry; true when it was sent.
    ///
    /// All skip conditions are evaluated so the log shows every applicable
    /// reason at once. A failed dedup check skips the entry for this cycle
    /// rather than risking a duplicate send.
    async fn deliver_entry(&self, feed_url: &str, entry: &Entry) -> bool {
        let identity = entry_identity(feed_url, entry);

        let mut skip_reasons: Vec<&str> = Vec::new();
        if entry.link.is_none() {
            skip_reasons.push("no link");
        }
        match self.repository.is_sent(&identity).await {
            Ok(true) => skip_reasons.push("already sent"),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Dedup check failed for {}: {}", identity, e);
                skip_reasons.push("dedup check failed");
            }
        }
        if !matches_keywords(&entry.title, &self.config.keywords) {
            skip_reasons.push("keywords not matched");
        }

        if !skip_reasons.is_empty() {
            tracing::info!("skip: {} [{}]", entry.title, skip_reasons.join(", "));
            return false;
        }

        let Some(link) = entry.link.as_deref() else {
            return false;
        };

        let text = format!("<b>{}</b>\n{}", encode_minimal(&entry.title), link);

        match self.sender.send(&text).await {
            Ok(()) => {
                if let Err(e) = self
                    .repository
                    .mark_sent(&identity, link, entry.published.timestamp())
                    .await
                {
                    // The message went out; it may be resent next cycle.
                    tracing::error!("Failed to record {}: {}", identity, e);
                }
                tracing::info!("Sent: {} ({})", entry.title, feed_url);
                tokio::time::sleep(SEND_PACING).await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send {}: {}", entry.title, e);
                false
            }
        }
    }
}
