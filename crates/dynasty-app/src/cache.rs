// SQLite cache of raw API responses, keyed by endpoint path.
//
// Finished seasons never change, so a rerun over the same lineage can be
// served almost entirely from disk.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{Endpoint, FetchError, FetchJson};

// ---------------------------------------------------------------------------
// ResponseCache
// ---------------------------------------------------------------------------

pub struct ResponseCache {
    conn: Mutex<Connection>,
}

impl ResponseCache {
    /// Open (or create) the cache at `path`. Pass `":memory:"` for an
    /// ephemeral cache.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open response cache at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set cache pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS responses (
                path       TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );
            ",
        )
        .context("failed to create cache schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached body for `path`, unless it is older than `max_age`.
    pub fn get(&self, path: &str, max_age: Option<Duration>) -> Result<Option<Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT body, fetched_at FROM responses WHERE path = ?1")
            .context("failed to prepare cache lookup")?;

        let mut rows = stmt
            .query_map(params![path], |row| {
                let body: String = row.get(0)?;
                let fetched_at: String = row.get(1)?;
                Ok((body, fetched_at))
            })
            .context("failed to query response cache")?;

        let Some(row) = rows.next() else {
            return Ok(None);
        };
        let (body, fetched_at) = row.context("failed to read cache row")?;

        if let Some(max_age) = max_age {
            let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
                .with_context(|| format!("bad fetched_at timestamp for {path}"))?
                .with_timezone(&Utc);
            if Utc::now() - fetched_at > max_age {
                debug!("cache entry for {path} expired (fetched {fetched_at})");
                return Ok(None);
            }
        }

        let value = serde_json::from_str(&body).context("failed to deserialize cached body")?;
        Ok(Some(value))
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<()> {
        self.put_at(path, body, Utc::now())
    }

    /// Store `body` as if it had been fetched at `fetched_at`.
    pub fn put_at(&self, path: &str, body: &Value, fetched_at: DateTime<Utc>) -> Result<()> {
        let json = serde_json::to_string(body).context("failed to serialize response body")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO responses (path, body, fetched_at) VALUES (?1, ?2, ?3)",
                params![path, json, fetched_at.to_rfc3339()],
            )
            .context("failed to store cached response")?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))
            .context("failed to count cached responses")?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every cached response. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self
            .conn()
            .execute("DELETE FROM responses", [])
            .context("failed to clear response cache")?;
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// CachedFetcher
// ---------------------------------------------------------------------------

/// Read-through cache in front of another fetcher. Cache failures are logged
/// and fall back to the network; fetch errors are never cached.
pub struct CachedFetcher<F> {
    inner: F,
    cache: ResponseCache,
    max_age: Option<Duration>,
}

impl<F: FetchJson> CachedFetcher<F> {
    /// `max_age_hours` of 0 (or too large to represent) keeps entries forever.
    pub fn new(inner: F, cache: ResponseCache, max_age_hours: u64) -> Self {
        let max_age = match max_age_hours {
            0 => None,
            hours => i64::try_from(hours).ok().and_then(Duration::try_hours),
        };
        Self {
            inner,
            cache,
            max_age,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

#[async_trait]
impl<F: FetchJson> FetchJson for CachedFetcher<F> {
    async fn fetch_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let path = endpoint.path();
        match self.cache.get(&path, self.max_age) {
            Ok(Some(value)) => {
                debug!("cache hit for {path}");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => warn!("cache lookup for {path} failed: {e:#}"),
        }

        let value = self.inner.fetch_json(endpoint).await?;
        if let Err(e) = self.cache.put(&path, &value) {
            warn!("failed to cache response for {path}: {e:#}");
        }
        Ok(value)
    }
}
