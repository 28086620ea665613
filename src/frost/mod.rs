//! FROST SensorThings API client.
//!
//! The monitored marina stations publish their readings through a FROST
//! server implementing the OGC SensorThings API. This module owns every
//! outbound query against that server: resolving a station's configured box
//! name to its Thing, enumerating Datastreams, and fetching latest/windowed
//! Observations. All wire-shape tolerance (bare array vs `{value: [...]}`
//! envelopes, `result` as number vs string vs `{value: n}`) lives here;
//! the rest of the crate only sees the strict types from `crate::model`.

pub mod client;

pub use client::{FrostClient, DEFAULT_BASE_URL};
