//! Data classification utilities for the marina monitoring service.
//!
//! The FROST server exposes free-text channel names with no controlled
//! vocabulary, so mapping a channel to a semantic measurement kind (wind,
//! water temperature, water level) is best-effort keyword matching. All of
//! that fragility is isolated here, in pure functions, so the fetch layer
//! and the dashboard never guess differently per call site.
//!
//! Submodules:
//! - `channels` — keyword-based channel selection and latest-value picking.

pub mod channels;
