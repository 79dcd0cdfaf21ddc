use std::time::Duration;

use chrono::Utc;
use feed_rs::model::Feed;
use feed_rs::parser;
use reqwest::Client;

use crate::error::Result;
use crate::models::Entry;

/// Entries considered per feed per cycle. Bounds the work and the log volume
/// on high-churn feeds regardless of how large the document is.
const MAX_ENTRIES_PER_CYCLE: usize = 10;

const DEFAULT_TITLE: &str = "Untitled";

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("feed-courier/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch one feed and return its newest entries, most recent first.
    ///
    /// Any network, HTTP or parse failure is returned to the caller, which
    /// skips the feed for the current cycle only.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<Entry>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        let feed = parser::parse(&bytes[..])?;

        Ok(normalize_entries(feed))
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize parsed entries, order them newest-first and keep the top window.
///
/// Entries without a published date fall back to the updated date, then to
/// the wall clock at fetch time, all in UTC.
fn normalize_entries(feed: Feed) -> Vec<Entry> {
    let now = Utc::now();

    let mut entries: Vec<Entry> = feed
        .entries
        .into_iter()
        .map(|entry| Entry {
            title: entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            link: entry.links.first().map(|l| l.href.clone()),
            guid: if entry.id.is_empty() {
                None
            } else {
                Some(entry.id)
            },
            published: entry.published.or(entry.updated).unwrap_or(now),
        })
        .collect();

    entries.sort_by(|a, b| b.published.cmp(&a.published));
    entries.truncate(MAX_ENTRIES_PER_CYCLE);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rss(items: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>http://example.com</link>
    {items}
  </channel>
</rss>"#
        )
    }

    fn parse(xml: &str) -> Vec<Entry> {
        normalize_entries(parser::parse(xml.as_bytes()).unwrap())
    }

    #[test]
    fn orders_entries_newest_first() {
        // published seconds since epoch: 100, 300, 200
        let xml = rss(
            r#"<item><title>a</title><guid>a</guid><pubDate>Thu, 01 Jan 1970 00:01:40 GMT</pubDate></item>
               <item><title>b</title><guid>b</guid><pubDate>Thu, 01 Jan 1970 00:05:00 GMT</pubDate></item>
               <item><title>c</title><guid>c</guid><pubDate>Thu, 01 Jan 1970 00:03:20 GMT</pubDate></item>"#,
        );

        let entries = parse(&xml);

        let timestamps: Vec<i64> = entries.iter().map(|e| e.published.timestamp()).collect();
        assert_eq!(timestamps, vec![300, 200, 100]);
    }

    #[test]
    fn truncates_to_the_top_window() {
        let items: String = (0..15)
            .map(|i| {
                format!(
                    "<item><title>entry {i}</title><guid>g{i}</guid><pubDate>Thu, 01 Jan 1970 00:{i:02}:00 GMT</pubDate></item>"
                )
            })
            .collect();

        let entries = parse(&rss(&items));

        assert_eq!(entries.len(), MAX_ENTRIES_PER_CYCLE);
        assert_eq!(entries[0].title, "entry 14");
    }

    #[test]
    fn missing_title_gets_the_placeholder() {
        let xml = rss(r#"<item><link>http://example.com/a</link></item>"#);

        let entries = parse(&xml);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, DEFAULT_TITLE);
        assert_eq!(entries[0].link.as_deref(), Some("http://example.com/a"));
    }

    #[test]
    fn missing_dates_fall_back_to_fetch_time() {
        let before = Utc::now();
        let xml = rss(r#"<item><title>undated</title><guid>g</guid></item>"#);

        let entries = parse(&xml);

        assert_eq!(entries.len(), 1);
        assert!(entries[0].published >= before);
    }

    #[test]
    fn unparseable_content_is_an_error() {
        assert!(parser::parse(&b"this is not a feed"[..]).is_err());
    }
}
