//! Core data types for the marina sensor-monitoring service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic, no I/O, and no external dependencies — only types.
//!
//! The SensorThings entities (Thing, Datastream, Observation) are owned by
//! the remote FROST server; the tolerant wire shapes are normalized into
//! these strict types at the boundary (see `frost::client`), so the rest of
//! the crate never sees a `result` that is sometimes a number and sometimes
//! an object.

// ---------------------------------------------------------------------------
// SensorThings entities
// ---------------------------------------------------------------------------

/// A physical sensor box registered on the FROST server.
///
/// Looked up by its human-assigned `name` (the `twlbox`/`metbox` identifier
/// configured per station); the server-assigned numeric `id` is what all
/// follow-up queries key on.
#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub id: i64,
    pub name: String,
}

/// One measurement channel belonging to a Thing (e.g. "Wind Speed",
/// "Water Temperature"). Names are free text, not a controlled vocabulary —
/// see `analysis::channels` for the keyword matching that classifies them.
#[derive(Debug, Clone, PartialEq)]
pub struct Datastream {
    pub id: i64,
    pub name: String,
}

/// A single timestamped reading from one Datastream.
///
/// `phenomenon_time` is when the reading was taken, not when it was
/// ingested. `value` is already normalized: observations whose wire
/// `result` could not be coerced to a finite number never become an
/// `Observation` at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub phenomenon_time: String, // ISO 8601, e.g. "2025-06-01T12:00:00.000Z"
    pub value: f64,
}

/// One point of a charted time series, ascending by phenomenon time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time: String, // ISO 8601
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing FROST SensorThings data.
///
/// Malformed observation payloads are deliberately absent here: an
/// observation whose `result` cannot be parsed is expected sensor noise and
/// is silently excluded, not surfaced as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FrostError {
    /// Non-2xx HTTP response from the FROST server.
    HttpStatus(u16),
    /// The request could not be completed (network unreachable, timeout).
    Transport(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// No Thing with the requested name exists on the server.
    ThingNotFound(String),
}

impl std::fmt::Display for FrostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrostError::HttpStatus(code) => write!(f, "HTTP error: {}", code),
            FrostError::Transport(msg) => write!(f, "Request failed: {}", msg),
            FrostError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FrostError::ThingNotFound(name) => write!(f, "Thing not found: {}", name),
        }
    }
}

impl std::error::Error for FrostError {}
