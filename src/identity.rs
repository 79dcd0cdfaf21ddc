use crate::models::Entry;

/// Separator between the feed URL and the per-entry base key.
const SEPARATOR: &str = "::";

/// Derive the dedup key for an entry within its feed.
///
/// Prefers the guid, then the link, then the title, and scopes the result to
/// the feed URL so the same item syndicated by two feeds counts twice. Two
/// entries that agree on all three fields under the same feed URL are
/// indistinguishable and collapse to one key.
pub fn entry_identity(feed_url: &str, entry: &Entry) -> String {
    let base = entry
        .guid
        .as_deref()
        .filter(|guid| !guid.is_empty())
        .or(entry.link.as_deref())
        .unwrap_or(&entry.title);

    format!("{feed_url}{SEPARATOR}{base}")
}
