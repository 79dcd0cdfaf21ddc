use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::SentRecord;

use super::schema::SCHEMA;

/// Durable ledger of entries that have already been delivered.
///
/// Opened once at startup; the schema is applied on every open so a fresh
/// database file works without a separate migration step.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// True iff an entry with this identity was delivered during this run or
    /// any earlier one.
    pub async fn is_sent(&self, identity: &str) -> Result<bool> {
        let identity = identity.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sent WHERE identity = ?1",
                    params![identity],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    /// Record a delivered entry. Inserting an identity that is already
    /// present is a no-op, which keeps retries idempotent.
    pub async fn mark_sent(&self, identity: &str, url: &str, published_ts: i64) -> Result<()> {
        let identity = identity.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO sent (identity, url, published_ts) VALUES (?1, ?2, ?3)",
                    params![identity, url, published_ts],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub async fn find(&self, identity: &str) -> Result<Option<SentRecord>> {
        let identity = identity.to_string();
        let record = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT identity, url, published_ts FROM sent WHERE identity = ?1",
                )?;
                let record = stmt
                    .query_row(params![identity], |row| Ok(sent_record_from_row(row)))
                    .optional()?;
                Ok(record)
            })
            .await?;
        Ok(record)
    }
}

fn sent_record_from_row(row: &Row) -> SentRecord {
    SentRecord {
        identity: row.get(0).unwrap(),
        url: row.get(1).unwrap(),
        published_ts: row.get(2).unwrap(),
    }
}
