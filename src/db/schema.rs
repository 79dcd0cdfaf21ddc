pub const SCHEMA: &str = r#"
-- sent ledger: one row per delivered entry, keyed by identity.
-- Rows are never updated or deleted; unbounded growth is accepted.
CREATE TABLE IF NOT EXISTS sent (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity TEXT NOT NULL UNIQUE,
    url TEXT,
    published_ts INTEGER
);

CREATE INDEX IF NOT EXISTS idx_sent_identity ON sent(identity);
"#;
