//! Marina sensor-monitoring service for the Baltic coast stations.
//!
//! Fetches live and historical environmental readings (wind speed and
//! direction, water temperature, water level) for a fixed registry of
//! marina stations from a FROST server implementing the OGC SensorThings
//! API, and renders them as a textual dashboard.
//!
//! Module map:
//! - `model` — strict domain types and the error taxonomy.
//! - `cache` — time-bounded HTTP response cache over an injectable fetcher.
//! - `frost` — the SensorThings client (resolution, latest, series).
//! - `analysis` — keyword classification of free-text channel names.
//! - `stations` — the canonical station/box registry.
//! - `units` — display conversions (cardinal directions, wind speed).
//! - `config` — layered configuration (defaults, TOML file, environment).
//! - `logging` — leveled console/file logging with failure classification.
//! - `verify` — registry-vs-live-server configuration verification.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod frost;
pub mod logging;
pub mod model;
pub mod stations;
pub mod units;
pub mod verify;
