use chrono::{DateTime, Utc};

/// One syndication item normalized out of a fetched feed.
///
/// Transient: produced per poll, never persisted directly.
#[derive(Debug, Clone)]
pub struct Entry {
    pub title: String,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub published: DateTime<Utc>,
}

/// A delivered entry as persisted in the dedup ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub identity: String,
    pub url: String,
    pub published_ts: i64,
}
