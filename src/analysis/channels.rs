//! Keyword-based channel classification.
//!
//! Channel (Datastream) names on the FROST server are free text — "Wind
//! Speed", "windspeed_avg", "Water Temperature (surface)" all occur in the
//! wild. Selection is case-insensitive substring matching against an ordered
//! keyword list, with "first match wins" as the documented tie-break. When
//! several channels match the same keyword the earliest candidate is taken;
//! this is a known limitation of the upstream naming, not something this
//! module tries to disambiguate.

use std::collections::BTreeMap;

use crate::model::Observation;

// ---------------------------------------------------------------------------
// Canonical keyword lists
// ---------------------------------------------------------------------------

/// Keywords identifying a wind channel on a met box. Broad on purpose;
/// used for series preference where any wind channel is acceptable.
pub const WIND_KEYWORDS: &[&str] = &["wind", "wind speed", "windspeed"];

/// Keywords identifying specifically the wind-speed channel. The broad
/// "wind" keyword also matches "Wind Direction", so displays that must not
/// confuse the two use this narrower list.
pub const WIND_SPEED_KEYWORDS: &[&str] = &["wind speed", "windspeed"];

/// Keywords identifying the wind-direction channel.
pub const DIRECTION_KEYWORDS: &[&str] = &["direction", "wind dir"];

/// Keywords identifying a water-temperature channel on a twl box.
pub const TEMPERATURE_KEYWORDS: &[&str] =
    &["temperature", "water temperature", "watertemperature", "temp"];

/// Keywords identifying a water-level channel on a twl box.
pub const LEVEL_KEYWORDS: &[&str] = &["level", "water level", "waterlevel", "height"];

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Returns `true` if any keyword occurs in `name`, case-insensitively.
pub fn matches_any_keyword(name: &str, keywords: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    keywords.iter().any(|kw| lowered.contains(&kw.to_lowercase()))
}

/// Selects the index of the preferred channel among `names`.
///
/// Keywords are tried in order; the first keyword that matches any name
/// wins, and among names matching that keyword the earliest wins. Returns
/// `None` when no keyword matches any name — callers decide the fallback
/// (the series fetcher falls back to the first channel of the Thing).
pub fn select_preferred(names: &[&str], keywords: &[&str]) -> Option<usize> {
    for kw in keywords {
        let kw_lowered = kw.to_lowercase();
        for (i, name) in names.iter().enumerate() {
            if name.to_lowercase().contains(&kw_lowered) {
                return Some(i);
            }
        }
    }
    None
}

/// Picks the displayable latest value for a measurement kind from a
/// name→observation snapshot (the output of `FrostClient::fetch_latest`).
///
/// Scans for a keyword-matching channel with a non-null observation; if no
/// channel matches any keyword, falls back to the first channel in map
/// order that has a value. Returns `None` when no channel has a usable
/// value — "no data", which consumers render distinctly from "loading".
pub fn pick_latest_value<'a>(
    observations: &'a BTreeMap<String, Option<Observation>>,
    keywords: &[&str],
) -> Option<(&'a str, &'a Observation)> {
    for (name, obs) in observations {
        if matches_any_keyword(name, keywords) {
            if let Some(o) = obs {
                return Some((name.as_str(), o));
            }
        }
    }
    observations
        .iter()
        .find_map(|(name, obs)| obs.as_ref().map(|o| (name.as_str(), o)))
}

/// Like `pick_latest_value` but without the first-non-null fallback.
///
/// Used for auxiliary readings (wind direction) where falling back to an
/// unrelated channel would be actively misleading rather than merely
/// imprecise.
pub fn pick_keyword_value<'a>(
    observations: &'a BTreeMap<String, Option<Observation>>,
    keywords: &[&str],
) -> Option<(&'a str, &'a Observation)> {
    observations.iter().find_map(|(name, obs)| {
        if matches_any_keyword(name, keywords) {
            obs.as_ref().map(|o| (name.as_str(), o))
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(time: &str, value: f64) -> Option<Observation> {
        Some(Observation {
            phenomenon_time: time.to_string(),
            value,
        })
    }

    // --- matches_any_keyword -------------------------------------------------

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(matches_any_keyword("Wind Speed", &["wind"]));
        assert!(matches_any_keyword("WINDSPEED_AVG", &["windspeed"]));
        assert!(matches_any_keyword("wind speed", &["Wind"]));
    }

    #[test]
    fn test_match_is_substring_not_exact() {
        assert!(matches_any_keyword("Water Temperature (surface)", &["temperature"]));
        assert!(matches_any_keyword("sea_level_height_above_datum", &["height"]));
    }

    #[test]
    fn test_no_keyword_no_match() {
        assert!(!matches_any_keyword("Salinity", WIND_KEYWORDS));
        assert!(!matches_any_keyword("Salinity", TEMPERATURE_KEYWORDS));
        assert!(!matches_any_keyword("Salinity", LEVEL_KEYWORDS));
    }

    // --- select_preferred -----------------------------------------------------

    #[test]
    fn test_wind_selected_regardless_of_list_order() {
        let names = ["Water Temperature", "Wind Speed"];
        assert_eq!(select_preferred(&names, &["wind"]), Some(1));

        let reversed = ["Wind Speed", "Water Temperature"];
        assert_eq!(select_preferred(&reversed, &["wind"]), Some(0));
    }

    #[test]
    fn test_keyword_order_takes_priority_over_name_order() {
        // "level" is the first keyword, so the level channel wins even
        // though the temperature channel comes first in the list.
        let names = ["Water Temperature", "Water Level"];
        assert_eq!(select_preferred(&names, &["level", "temp"]), Some(1));
        assert_eq!(select_preferred(&names, &["temp", "level"]), Some(0));
    }

    #[test]
    fn test_first_of_multiple_matches_wins() {
        // Duplicate box naming upstream is a known data-quality hazard;
        // the documented behavior is first match wins.
        let names = ["Wind Gust", "Wind Speed"];
        assert_eq!(select_preferred(&names, &["wind"]), Some(0));
    }

    #[test]
    fn test_no_match_returns_none() {
        let names = ["Salinity", "Turbidity"];
        assert_eq!(select_preferred(&names, WIND_KEYWORDS), None);
        assert_eq!(select_preferred(&[], WIND_KEYWORDS), None);
    }

    #[test]
    fn test_known_naming_variants_all_classify() {
        for name in ["Wind Speed", "windspeed", "WIND_SPEED_10MIN", "Mean wind"] {
            assert!(
                select_preferred(&[name], WIND_KEYWORDS).is_some(),
                "wind variant '{}' should classify",
                name
            );
        }
        for name in [
            "Water Temperature",
            "watertemperature",
            "Temp (surface)",
            "SST temperature",
        ] {
            assert!(
                select_preferred(&[name], TEMPERATURE_KEYWORDS).is_some(),
                "temperature variant '{}' should classify",
                name
            );
        }
        for name in ["Water Level", "waterlevel", "Level above NHN", "Gauge height"] {
            assert!(
                select_preferred(&[name], LEVEL_KEYWORDS).is_some(),
                "level variant '{}' should classify",
                name
            );
        }
    }

    // --- pick_latest_value ----------------------------------------------------

    #[test]
    fn test_keyword_matching_channel_with_value_is_picked() {
        let mut map = BTreeMap::new();
        map.insert("Air Pressure".to_string(), obs("2025-06-01T11:00:00Z", 1013.0));
        map.insert("Wind Speed".to_string(), obs("2025-06-01T12:00:00Z", 7.2));

        let (name, o) = pick_latest_value(&map, WIND_KEYWORDS).expect("should pick wind");
        assert_eq!(name, "Wind Speed");
        assert_eq!(o.value, 7.2);
    }

    #[test]
    fn test_null_matching_channel_falls_back_to_first_non_null() {
        let mut map = BTreeMap::new();
        map.insert("Wind Speed".to_string(), None);
        map.insert("Air Pressure".to_string(), obs("2025-06-01T12:00:00Z", 1013.0));

        let (name, o) =
            pick_latest_value(&map, WIND_KEYWORDS).expect("should fall back to non-null channel");
        assert_eq!(name, "Air Pressure");
        assert_eq!(o.value, 1013.0);
    }

    #[test]
    fn test_narrow_wind_speed_keywords_skip_direction() {
        let mut map = BTreeMap::new();
        // BTreeMap order puts "Wind Direction" before "Wind Speed"; the
        // narrow list must still land on the speed channel.
        map.insert("Wind Direction".to_string(), obs("2025-06-01T12:00:00Z", 225.0));
        map.insert("Wind Speed".to_string(), obs("2025-06-01T12:00:00Z", 7.2));

        let (name, o) = pick_latest_value(&map, WIND_SPEED_KEYWORDS).expect("should pick speed");
        assert_eq!(name, "Wind Speed");
        assert_eq!(o.value, 7.2);

        let (name, o) = pick_keyword_value(&map, DIRECTION_KEYWORDS).expect("should pick direction");
        assert_eq!(name, "Wind Direction");
        assert_eq!(o.value, 225.0);
    }

    #[test]
    fn test_pick_keyword_value_has_no_fallback() {
        let mut map = BTreeMap::new();
        map.insert("Water Temperature".to_string(), obs("2025-06-01T12:00:00Z", 17.8));
        assert!(
            pick_keyword_value(&map, DIRECTION_KEYWORDS).is_none(),
            "strict pick must not fall back to an unrelated channel"
        );
    }

    #[test]
    fn test_all_channels_null_means_no_data() {
        let mut map = BTreeMap::new();
        map.insert("Wind Speed".to_string(), None);
        map.insert("Air Pressure".to_string(), None);
        assert!(pick_latest_value(&map, WIND_KEYWORDS).is_none());
        assert!(pick_latest_value(&BTreeMap::new(), WIND_KEYWORDS).is_none());
    }
}
