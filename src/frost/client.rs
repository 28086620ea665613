//! FROST (OGC SensorThings) API client.
//!
//! Query surface, all HTTP GET with OData-style parameters:
//!   Things?$filter=name eq '<name>'
//!   Datastreams?$filter=Thing/@iot.id eq <id>
//!   Datastreams?$filter=name eq '<name>' and Thing/@iot.id eq <id>
//!   Datastreams(<id>)/Observations?$orderby=phenomenonTime desc&$top=1
//!   Datastreams(<id>)/Observations?$filter=phenomenonTime gt <ISO8601>&$orderby=phenomenonTime asc
//!
//! Requests are deduplicated by `crate::cache::CachedFetch`; per-channel
//! lookups of a batch run on scoped threads and degrade individually rather
//! than failing the batch.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::analysis::channels;
use crate::cache::{CachedFetch, ReqwestFetch};
use crate::config::ServiceConfig;
use crate::logging;
use crate::model::{Datastream, FrostError, Observation, SeriesPoint, Thing};

/// GEOMAR FROST server for the SOOP marina boxes.
pub const DEFAULT_BASE_URL: &str = "https://timeseries.geomar.de/soop/FROST-Server/v1.1";

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Percent-encodes a string for use inside a query component.
///
/// Unreserved characters (RFC 3986) pass through; everything else, spaces
/// and single quotes included, is encoded. Query URLs double as cache keys,
/// so encoding must be deterministic.
fn encode_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// `Things?$filter=name eq '<name>'`
pub fn build_things_url(base: &str, thing_name: &str) -> String {
    format!(
        "{}/Things?$filter={}",
        base,
        encode_query(&format!("name eq '{}'", thing_name))
    )
}

/// `Datastreams?$filter=Thing/@iot.id eq <id>`
pub fn build_datastreams_url(base: &str, thing_id: i64) -> String {
    format!(
        "{}/Datastreams?$filter={}",
        base,
        encode_query(&format!("Thing/@iot.id eq {}", thing_id))
    )
}

/// `Datastreams?$filter=name eq '<name>' and Thing/@iot.id eq <id>`
pub fn build_named_datastream_url(base: &str, datastream_name: &str, thing_id: i64) -> String {
    format!(
        "{}/Datastreams?$filter={}",
        base,
        encode_query(&format!(
            "name eq '{}' and Thing/@iot.id eq {}",
            datastream_name, thing_id
        ))
    )
}

/// `Datastreams(<id>)/Observations?$orderby=phenomenonTime desc&$top=1`
pub fn build_latest_observation_url(base: &str, datastream_id: i64) -> String {
    format!(
        "{}/Datastreams({})/Observations?$orderby=phenomenonTime%20desc&$top=1",
        base, datastream_id
    )
}

/// `Datastreams(<id>)/Observations?$filter=phenomenonTime gt <from>&$orderby=phenomenonTime asc`
pub fn build_series_url(base: &str, datastream_id: i64, from: &DateTime<Utc>) -> String {
    let iso = from.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "{}/Datastreams({})/Observations?$filter={}&$orderby=phenomenonTime%20asc",
        base,
        datastream_id,
        encode_query(&format!("phenomenonTime gt {}", iso))
    )
}

// ---------------------------------------------------------------------------
// Wire-shape normalization
// ---------------------------------------------------------------------------

/// Response entity as the server sends it, before normalization.
#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(rename = "@iot.id")]
    id: i64,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(rename = "phenomenonTime")]
    phenomenon_time: Option<String>,
    result: Option<Value>,
}

/// Accepts either a bare JSON array or the usual `{ "value": [...] }`
/// envelope; anything else yields an empty list.
pub fn extract_array(resp: &Value) -> Vec<Value> {
    if let Some(arr) = resp.as_array() {
        return arr.clone();
    }
    if let Some(arr) = resp.get("value").and_then(|v| v.as_array()) {
        return arr.clone();
    }
    Vec::new()
}

/// Coerces an Observation `result` to a finite number.
///
/// Tolerated shapes: a bare number, a numeric string, or an object wrapping
/// the reading in a `value` field. Anything else is sensor noise and maps
/// to `None` so the caller can drop the observation.
pub fn normalize_result(result: &Value) -> Option<f64> {
    let inner = match result {
        Value::Object(map) => map.get("value")?,
        other => other,
    };
    let num = match inner {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    num.is_finite().then_some(num)
}

/// Parses one wire observation into the strict internal shape. Observations
/// without a phenomenon time or without a usable numeric result are dropped.
fn parse_observation(raw: &Value) -> Option<Observation> {
    let obs: RawObservation = serde_json::from_value(raw.clone()).ok()?;
    let time = obs.phenomenon_time.filter(|t| !t.is_empty())?;
    let value = normalize_result(&obs.result?)?;
    Some(Observation {
        phenomenon_time: time,
        value,
    })
}

/// Ordering key for "most recent phenomenon time wins". Unparseable
/// timestamps sort lowest so they never beat a valid reading.
fn phenomenon_instant(obs: &Observation) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&obs.phenomenon_time)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Snapshot of the most recent reading per channel, keyed by channel name.
/// A key with `None` means that channel yielded no usable observation.
pub type LatestObservations = BTreeMap<String, Option<Observation>>;

pub struct FrostClient {
    base_url: String,
    fetch: CachedFetch,
}

impl FrostClient {
    pub fn new(base_url: impl Into<String>, fetch: CachedFetch) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        FrostClient { base_url, fetch }
    }

    /// Builds a production client (reqwest transport, cached) from config.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, FrostError> {
        let fetcher = ReqwestFetch::new(std::time::Duration::from_secs(config.http_timeout_secs))?;
        let fetch = CachedFetch::new(Box::new(fetcher), config.cache_ttl_secs);
        Ok(FrostClient::new(config.base_url.clone(), fetch))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> Result<Value, FrostError> {
        self.fetch.get_or_fetch(url)
    }

    /// Resolves a box name to its Thing.
    ///
    /// The server does not enforce name uniqueness; when several Things
    /// match, the first in server order is taken and a warning is logged,
    /// since duplicates usually indicate a configuration problem upstream.
    pub fn resolve_thing(&self, thing_name: &str) -> Result<Thing, FrostError> {
        let url = build_things_url(&self.base_url, thing_name);
        let resp = self.get(&url)?;
        let things = extract_array(&resp);

        if things.len() > 1 {
            logging::warn(
                logging::DataSource::Frost,
                Some(thing_name),
                &format!("{} Things match this name; using the first", things.len()),
            );
        }

        let first = things
            .first()
            .ok_or_else(|| FrostError::ThingNotFound(thing_name.to_string()))?;
        let raw: RawEntity = serde_json::from_value(first.clone())
            .map_err(|e| FrostError::ParseError(format!("Thing entity: {}", e)))?;

        Ok(Thing {
            id: raw.id,
            name: raw.name.unwrap_or_else(|| thing_name.to_string()),
        })
    }

    /// Lists all measurement channels of a Thing. An empty list is a valid
    /// result — a box may be registered before its channels are provisioned.
    pub fn list_datastreams(&self, thing_id: i64) -> Result<Vec<Datastream>, FrostError> {
        let url = build_datastreams_url(&self.base_url, thing_id);
        let resp = self.get(&url)?;

        let mut streams = Vec::new();
        for raw in extract_array(&resp) {
            let entity: RawEntity = serde_json::from_value(raw)
                .map_err(|e| FrostError::ParseError(format!("Datastream entity: {}", e)))?;
            streams.push(Datastream {
                name: entity.name.unwrap_or_else(|| entity.id.to_string()),
                id: entity.id,
            });
        }
        Ok(streams)
    }

    /// Looks up one channel of a Thing by exact name. `None` when the Thing
    /// has no channel of that name.
    pub fn find_datastream(
        &self,
        thing_id: i64,
        datastream_name: &str,
    ) -> Result<Option<Datastream>, FrostError> {
        let url = build_named_datastream_url(&self.base_url, datastream_name, thing_id);
        let resp = self.get(&url)?;

        match extract_array(&resp).first() {
            None => Ok(None),
            Some(raw) => {
                let entity: RawEntity = serde_json::from_value(raw.clone())
                    .map_err(|e| FrostError::ParseError(format!("Datastream entity: {}", e)))?;
                Ok(Some(Datastream {
                    name: entity.name.unwrap_or_else(|| datastream_name.to_string()),
                    id: entity.id,
                }))
            }
        }
    }

    /// Fetches the most recent observation of a channel, by phenomenon time
    /// (when the reading was taken, not when it was ingested).
    ///
    /// The query asks the server for the newest entry, but the winner is
    /// re-selected locally so an out-of-order response cannot change the
    /// result. `None` when the channel has no usable observations.
    pub fn latest_observation(&self, datastream_id: i64) -> Result<Option<Observation>, FrostError> {
        let url = build_latest_observation_url(&self.base_url, datastream_id);
        let resp = self.get(&url)?;

        let latest = extract_array(&resp)
            .iter()
            .filter_map(parse_observation)
            .max_by_key(phenomenon_instant);
        Ok(latest)
    }

    /// Produces a "most recent reading per channel" snapshot for a box.
    ///
    /// `thing_name = None` means the station has no box of this kind: the
    /// call short-circuits to an empty map without any request. With
    /// `channel_names` given, only those exact channels are queried; without
    /// it, all Datastreams of the Thing are enumerated. Per-channel lookups
    /// run concurrently; a failure in one channel degrades that entry to
    /// `None` (the key stays present) and is logged, never failing the batch.
    pub fn fetch_latest(
        &self,
        thing_name: Option<&str>,
        channel_names: Option<&[&str]>,
    ) -> Result<LatestObservations, FrostError> {
        let Some(name) = thing_name else {
            return Ok(BTreeMap::new());
        };
        let thing = self.resolve_thing(name)?;

        let channels: Vec<(String, Option<i64>)> = match channel_names {
            Some(names) => names.iter().map(|n| (n.to_string(), None)).collect(),
            None => self
                .list_datastreams(thing.id)?
                .into_iter()
                .map(|ds| (ds.name, Some(ds.id)))
                .collect(),
        };

        let mut out = BTreeMap::new();
        std::thread::scope(|scope| {
            let handles: Vec<_> = channels
                .iter()
                .map(|(channel, ds_id)| {
                    scope.spawn(move || match ds_id {
                        Some(id) => self.channel_latest(channel, *id),
                        None => self.named_channel_latest(thing.id, channel),
                    })
                })
                .collect();

            for ((channel, _), handle) in channels.iter().zip(handles) {
                // A panicked worker degrades its channel like any other failure.
                let obs = handle.join().unwrap_or(None);
                out.insert(channel.clone(), obs);
            }
        });
        Ok(out)
    }

    /// Latest observation for an already-resolved channel; failures degrade
    /// to `None` and are logged against the channel.
    fn channel_latest(&self, channel: &str, datastream_id: i64) -> Option<Observation> {
        match self.latest_observation(datastream_id) {
            Ok(obs) => obs,
            Err(e) => {
                logging::log_frost_failure(channel, "latest observation fetch", &e);
                None
            }
        }
    }

    /// Latest observation for a channel addressed by name: one Datastream
    /// lookup plus one Observation lookup. A missing Datastream is `None`,
    /// not an error.
    fn named_channel_latest(&self, thing_id: i64, channel: &str) -> Option<Observation> {
        match self.find_datastream(thing_id, channel) {
            Ok(Some(ds)) => self.channel_latest(channel, ds.id),
            Ok(None) => None,
            Err(e) => {
                logging::log_frost_failure(channel, "datastream lookup", &e);
                None
            }
        }
    }

    /// Time-ordered numeric series for one channel over a trailing window.
    pub fn fetch_series(
        &self,
        thing_name: Option<&str>,
        prefer_keywords: &[&str],
        window_hours: i64,
    ) -> Result<Vec<SeriesPoint>, FrostError> {
        self.fetch_series_at(thing_name, prefer_keywords, window_hours, Utc::now())
    }

    /// Deterministic variant: the window lower bound is `now - window_hours`.
    ///
    /// The preferred channel is the keyword-classified one (see
    /// `analysis::channels::select_preferred`), falling back to the Thing's
    /// first channel when no keyword matches. Returns `ThingNotFound` when
    /// the box does not exist, and an empty series — not an error — when the
    /// box has no channels or the window holds no observations. Observations
    /// with unusable results are silently dropped.
    pub fn fetch_series_at(
        &self,
        thing_name: Option<&str>,
        prefer_keywords: &[&str],
        window_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeriesPoint>, FrostError> {
        let Some(name) = thing_name else {
            return Ok(Vec::new());
        };
        let thing = self.resolve_thing(name)?;

        let streams = self.list_datastreams(thing.id)?;
        if streams.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<&str> = streams.iter().map(|ds| ds.name.as_str()).collect();
        let selected = channels::select_preferred(&names, prefer_keywords).unwrap_or(0);
        let stream = &streams[selected];

        let from = now - Duration::hours(window_hours);
        let url = build_series_url(&self.base_url, stream.id, &from);
        let resp = self.get(&url)?;

        let mut points: Vec<SeriesPoint> = extract_array(&resp)
            .iter()
            .filter_map(parse_observation)
            .map(|obs| SeriesPoint {
                time: obs.phenomenon_time,
                value: obs.value,
            })
            .collect();

        // The server is asked for ascending order; re-sorting locally keeps
        // the chart contract independent of server behavior. Ordering is by
        // parsed instant, not by string, so mixed UTC offsets compare
        // correctly; unparseable times fall back to string order.
        points.sort_by(|a, b| {
            let ka = DateTime::parse_from_rfc3339(&a.time).ok();
            let kb = DateTime::parse_from_rfc3339(&b.time).ok();
            match (ka, kb) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.time.cmp(&b.time),
            }
        });
        Ok(points)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const BASE: &str = "https://frost.example/v1.1";

    // --- URL builders ---------------------------------------------------------

    #[test]
    fn test_things_url_encodes_name_and_quotes() {
        assert_eq!(
            build_things_url(BASE, "FLENS MET 01"),
            "https://frost.example/v1.1/Things?$filter=name%20eq%20%27FLENS%20MET%2001%27"
        );
    }

    #[test]
    fn test_datastreams_url_uses_numeric_thing_id() {
        assert_eq!(
            build_datastreams_url(BASE, 42),
            "https://frost.example/v1.1/Datastreams?$filter=Thing%2F%40iot.id%20eq%2042"
        );
    }

    #[test]
    fn test_latest_observation_url_orders_desc_top_1() {
        let url = build_latest_observation_url(BASE, 7);
        assert!(url.contains("/Datastreams(7)/Observations?"));
        assert!(url.contains("$orderby=phenomenonTime%20desc"));
        assert!(url.contains("$top=1"));
    }

    #[test]
    fn test_series_url_embeds_window_lower_bound() {
        let from = Utc.with_ymd_and_hms(2025, 5, 31, 12, 0, 0).unwrap();
        let url = build_series_url(BASE, 7, &from);
        assert!(
            url.contains(&encode_query("phenomenonTime gt 2025-05-31T12:00:00.000Z")),
            "series URL should carry the ISO lower bound: {}",
            url
        );
        assert!(url.contains("$orderby=phenomenonTime%20asc"));
    }

    #[test]
    fn test_encode_query_round_trippable_characters() {
        assert_eq!(encode_query("abc-123_.~"), "abc-123_.~");
        assert_eq!(encode_query("a b"), "a%20b");
        assert_eq!(encode_query("'"), "%27");
        assert_eq!(encode_query("Lübeck"), "L%C3%BCbeck");
    }

    // --- Envelope tolerance ----------------------------------------------------

    #[test]
    fn test_extract_array_accepts_envelope_and_bare_array() {
        let envelope = json!({ "value": [1, 2] });
        let bare = json!([1, 2]);
        assert_eq!(extract_array(&envelope).len(), 2);
        assert_eq!(extract_array(&bare).len(), 2);
        assert!(extract_array(&json!({ "other": [] })).is_empty());
        assert!(extract_array(&json!(null)).is_empty());
    }

    // --- Result normalization ----------------------------------------------------

    #[test]
    fn test_normalize_result_tolerates_known_shapes() {
        assert_eq!(normalize_result(&json!(3)), Some(3.0));
        assert_eq!(normalize_result(&json!(4.5)), Some(4.5));
        assert_eq!(normalize_result(&json!("4.5")), Some(4.5));
        assert_eq!(normalize_result(&json!({ "value": 6 })), Some(6.0));
        assert_eq!(normalize_result(&json!({ "value": "6.5" })), Some(6.5));
    }

    #[test]
    fn test_normalize_result_rejects_noise() {
        assert_eq!(normalize_result(&json!("abc")), None);
        assert_eq!(normalize_result(&json!(null)), None);
        assert_eq!(normalize_result(&json!({ "other": 6 })), None);
        assert_eq!(normalize_result(&json!([1])), None);
        assert_eq!(normalize_result(&json!("NaN")), None, "non-finite values are unusable");
        assert_eq!(normalize_result(&json!("inf")), None);
    }

    #[test]
    fn test_parse_observation_requires_time_and_value() {
        let ok = json!({ "phenomenonTime": "2025-06-01T12:00:00.000Z", "result": 5 });
        assert!(parse_observation(&ok).is_some());

        let no_time = json!({ "result": 5 });
        assert!(parse_observation(&no_time).is_none());

        let empty_time = json!({ "phenomenonTime": "", "result": 5 });
        assert!(parse_observation(&empty_time).is_none());

        let bad_result = json!({ "phenomenonTime": "2025-06-01T12:00:00.000Z", "result": "n/a" });
        assert!(parse_observation(&bad_result).is_none());
    }

    #[test]
    fn test_phenomenon_instant_handles_offsets() {
        let obs = Observation {
            phenomenon_time: "2025-06-01T14:00:00.000+02:00".to_string(),
            value: 1.0,
        };
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(phenomenon_instant(&obs), Some(expected));

        let bad = Observation {
            phenomenon_time: "yesterday".to_string(),
            value: 1.0,
        };
        assert_eq!(phenomenon_instant(&bad), None);
    }
}
