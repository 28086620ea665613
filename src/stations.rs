//! Station registry for the Baltic marina monitoring service.
//!
//! Defines the canonical list of marina stations monitored by this service,
//! along with their coordinates and the FROST Thing names of their sensor
//! boxes. This is the single source of truth for box names — all other
//! modules should reference stations from here rather than hardcoding
//! identifiers.
//!
//! Each station carries up to two boxes:
//!   - `twlbox_id` — water temperature / water level box
//!   - `metbox_id` — meteorological (wind) box
//! Either or both may be absent; consumers must tolerate that (a station
//! without a box of a kind simply shows no readings of that kind).

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single marina station.
pub struct Station {
    /// URL-safe identifier, derived from the name via `slugify`.
    pub slug: &'static str,
    /// Human-readable station name.
    pub name: &'static str,
    /// Short description of the station's setting.
    pub description: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// FROST Thing name of the water-level/temperature box, if installed.
    pub twlbox_id: Option<&'static str>,
    /// FROST Thing name of the meteorological box, if installed.
    pub metbox_id: Option<&'static str>,
}

/// All monitored marina stations, ordered north to south along the coast.
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        slug: "flensburg",
        name: "Flensburg",
        description: "Harbour at the head of the Flensburg Fjord, sheltered \
                      from westerly winds by the surrounding hills.",
        latitude: 54.7937,
        longitude: 9.4354,
        twlbox_id: Some("twlbox_flensburg"),
        metbox_id: Some("metbox_flensburg"),
    },
    Station {
        slug: "kiel-harbour",
        name: "Kiel Harbour",
        description: "Inner Kiel Fjord reference station near the ferry \
                      terminals; the busiest water of the monitored set.",
        latitude: 54.3233,
        longitude: 10.1228,
        twlbox_id: Some("twlbox_kiel_harbour"),
        metbox_id: Some("metbox_kiel_harbour"),
    },
    Station {
        slug: "schilksee",
        name: "Schilksee",
        description: "Olympic harbour at the mouth of the Kiel Fjord, \
                      exposed to open-water wind from the north and east.",
        latitude: 54.4241,
        longitude: 10.1725,
        twlbox_id: Some("twlbox_schilksee"),
        metbox_id: Some("metbox_schilksee"),
    },
    Station {
        slug: "strande",
        name: "Strande",
        description: "Sailing harbour just north of Schilksee. Only a met \
                      box is installed; water readings come from Schilksee.",
        latitude: 54.4351,
        longitude: 10.1706,
        twlbox_id: None,
        metbox_id: Some("metbox_strande"),
    },
    Station {
        slug: "heikendorf",
        name: "Heikendorf",
        description: "Eastern shore of the Kiel Fjord, sheltered marina \
                      with a water-level/temperature box on the mole.",
        latitude: 54.3744,
        longitude: 10.2045,
        twlbox_id: Some("twlbox_heikendorf"),
        metbox_id: None,
    },
    Station {
        slug: "wendtorf",
        name: "Wendtorf",
        description: "Marina at the entrance of the Kiel Fjord near the \
                      Bottsand nature reserve.",
        latitude: 54.4169,
        longitude: 10.2915,
        twlbox_id: Some("twlbox_wendtorf"),
        metbox_id: None,
    },
    Station {
        slug: "badesteg-reventlou",
        name: "Badesteg Reventlou",
        description: "Bathing jetty on the Kiel inner fjord; instrumentation \
                      is planned but no box is deployed yet.",
        latitude: 54.3337,
        longitude: 10.1502,
        twlbox_id: None,
        metbox_id: None,
    },
    Station {
        slug: "luebeck",
        name: "Lübeck",
        description: "River Trave station below the old town, upstream of \
                      the Travemünde estuary.",
        latitude: 53.8655,
        longitude: 10.6866,
        twlbox_id: Some("twlbox_luebeck"),
        metbox_id: Some("metbox_luebeck"),
    },
    Station {
        slug: "the-newport-marina-luebeck",
        name: "The Newport Marina Lübeck",
        description: "Private marina on the lower Trave between Lübeck and \
                      Travemünde.",
        latitude: 53.9169,
        longitude: 10.7644,
        twlbox_id: Some("twlbox_newport_luebeck"),
        metbox_id: None,
    },
    Station {
        slug: "marina-heiligenhafen",
        name: "Marina Heiligenhafen",
        description: "Large marina behind the Graswarder spit; the most \
                      weather-exposed station of the set.",
        latitude: 54.3744,
        longitude: 10.9797,
        twlbox_id: Some("twlbox_heiligenhafen"),
        metbox_id: Some("metbox_heiligenhafen"),
    },
];

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Derives the URL-safe slug for a station name: lowercase, German umlauts
/// folded (ä→ae, ö→oe, ü→ue, ß→ss), anything non-alphanumeric collapsed to
/// a single hyphen.
pub fn slugify(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            'ä' => folded.push_str("ae"),
            'ö' => folded.push_str("oe"),
            'ü' => folded.push_str("ue"),
            'ß' => folded.push_str("ss"),
            other => folded.push(other),
        }
    }

    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Looks up a station by slug. Returns `None` if not found.
pub fn find_station(slug: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.slug == slug)
}

/// Returns every configured box name across the registry, twl boxes first
/// per station, suitable for configuration verification.
pub fn all_box_names() -> Vec<&'static str> {
    STATION_REGISTRY
        .iter()
        .flat_map(|s| [s.twlbox_id, s.metbox_id])
        .flatten()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
