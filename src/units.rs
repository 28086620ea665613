//! Unit conversion and display helpers for sensor readings.
//!
//! Cardinal directions use the German 8-point rose (O for Ost, not E),
//! matching the signage at the monitored harbours.

/// Compass shorthands in 45° sectors, clockwise from north.
const DIRECTIONS: [&str; 8] = ["N", "NO", "O", "SO", "S", "SW", "W", "NW"];

/// Converts a wind direction in degrees to its 8-point cardinal shorthand.
/// Out-of-range inputs are normalized into 0..360 first.
pub fn deg_to_cardinal(deg: f64) -> &'static str {
    let normalized = ((deg % 360.0) + 360.0) % 360.0;
    let index = (normalized / 45.0).round() as usize % 8;
    DIRECTIONS[index]
}

/// Converts meters per second to kilometers per hour.
pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * 3.6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
}

/// Formats a wind speed reading (given in m/s) in the requested unit.
pub fn format_wind_speed(speed_ms: f64, unit: SpeedUnit) -> String {
    match unit {
        SpeedUnit::MetersPerSecond => format!("{:.1} m/s", speed_ms),
        SpeedUnit::KilometersPerHour => format!("{:.1} km/h", ms_to_kmh(speed_ms)),
    }
}
