//! Time-bounded HTTP response cache.
//!
//! Multiple dashboard consumers ask for overlapping data within the same
//! refresh cycle (the latest-observation and series fetchers both resolve
//! the same Thing, for instance). This module deduplicates identical GET
//! requests issued within a short window so the FROST server is not hit
//! with redundant load.
//!
//! The fetch mechanism is injected through the `HttpFetch` trait rather than
//! hardcoded, so tests can count calls and script payloads without a network.
//!
//! # Clock injection
//! Expiry checks go through `get_or_fetch_at(url, now)` which takes the
//! current time as a parameter; `get_or_fetch` is the `Utc::now()` wrapper.
//! This keeps TTL behavior deterministic in tests without sleeping.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::FrostError;

/// Default cache time-to-live: 30 seconds.
pub const DEFAULT_TTL_SECS: i64 = 30;

// ---------------------------------------------------------------------------
// Fetch abstraction
// ---------------------------------------------------------------------------

/// A mechanism that performs an HTTP GET and returns the parsed JSON body.
///
/// Implementations must be shareable across the scoped worker threads used
/// by the batched per-channel fetches, hence the `Send + Sync` bound.
pub trait HttpFetch: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value, FrostError>;
}

/// Production fetcher backed by a blocking reqwest client.
pub struct ReqwestFetch {
    client: reqwest::blocking::Client,
}

impl ReqwestFetch {
    pub fn new(timeout: std::time::Duration) -> Result<Self, FrostError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FrostError::Transport(e.to_string()))?;
        Ok(ReqwestFetch { client })
    }
}

impl HttpFetch for ReqwestFetch {
    fn get_json(&self, url: &str) -> Result<Value, FrostError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| FrostError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FrostError::HttpStatus(status.as_u16()));
        }

        response
            .json::<Value>()
            .map_err(|e| FrostError::ParseError(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Cached fetch
// ---------------------------------------------------------------------------

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    payload: Value,
}

/// URL-keyed cache over an injected `HttpFetch`.
///
/// An entry is valid while `now - fetched_at < ttl`; an expired or absent
/// entry triggers a fresh request whose result overwrites any prior entry.
/// A failed fetch writes nothing, so the next call retries — there is no
/// automatic retry inside this component.
///
/// The key space is the small, short-lived set of query URLs the client
/// builds, so entries are never evicted except by overwrite.
pub struct CachedFetch {
    fetcher: Box<dyn HttpFetch>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CachedFetch {
    pub fn new(fetcher: Box<dyn HttpFetch>, ttl_secs: i64) -> Self {
        CachedFetch {
            fetcher,
            ttl: Duration::seconds(ttl_secs),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached payload for `url` if still fresh, otherwise
    /// performs the request and stores the result keyed by the exact URL.
    pub fn get_or_fetch(&self, url: &str) -> Result<Value, FrostError> {
        self.get_or_fetch_at(url, Utc::now())
    }

    /// Deterministic variant used by tests: freshness is judged against the
    /// supplied `now` and new entries are stamped with it.
    pub fn get_or_fetch_at(&self, url: &str, now: DateTime<Utc>) -> Result<Value, FrostError> {
        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(url) {
                if now - entry.fetched_at < self.ttl {
                    return Ok(entry.payload.clone());
                }
            }
        }

        // Lock is released during the network call; a concurrent fetch of
        // the same URL may race, and last-write-wins is acceptable here.
        let payload = self.fetcher.get_json(url)?;

        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            url.to_string(),
            CacheEntry {
                fetched_at: now,
                payload: payload.clone(),
            },
        );
        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
