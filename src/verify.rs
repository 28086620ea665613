//! Configuration Verification Module
//!
//! Framework for testing the station registry against the live FROST server
//! to determine which configured boxes are registered and returning data.
//!
//! Use this before adding new stations to validate the box names.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::frost::FrostClient;
use crate::model::FrostError;
use crate::stations::{Station, STATION_REGISTRY};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<BoxVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub boxes_total: usize,
    pub boxes_working: usize,
    pub boxes_failed: usize,
    /// Stations with no box configured at all (expected for planned sites).
    pub stations_unconfigured: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxVerification {
    pub station: String,
    /// "twl" or "met".
    pub box_kind: String,
    pub box_name: String,
    pub status: VerificationStatus,
    pub thing_found: bool,
    pub datastreams: Vec<String>,
    /// Channels that currently return a latest observation.
    pub channels_with_data: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Box Verification
// ============================================================================

/// Verifies one configured box against the live server: the Thing must
/// resolve, its Datastreams enumerate, and ideally each channel returns a
/// latest observation.
pub fn verify_box(
    client: &FrostClient,
    station: &str,
    box_kind: &str,
    box_name: &str,
) -> BoxVerification {
    let mut result = BoxVerification {
        station: station.to_string(),
        box_kind: box_kind.to_string(),
        box_name: box_name.to_string(),
        status: VerificationStatus::Failed,
        thing_found: false,
        datastreams: Vec::new(),
        channels_with_data: 0,
        error_message: None,
    };

    let thing = match client.resolve_thing(box_name) {
        Ok(thing) => thing,
        Err(FrostError::ThingNotFound(_)) => {
            result.error_message = Some("Thing not registered on server".to_string());
            return result;
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };
    result.thing_found = true;

    let streams = match client.list_datastreams(thing.id) {
        Ok(streams) => streams,
        Err(e) => {
            result.error_message = Some(format!("Datastream enumeration failed: {}", e));
            return result;
        }
    };
    result.datastreams = streams.iter().map(|ds| ds.name.clone()).collect();

    for stream in &streams {
        if let Ok(Some(_)) = client.latest_observation(stream.id) {
            result.channels_with_data += 1;
        }
    }

    // Determine status
    if result.channels_with_data > 0 {
        result.status = VerificationStatus::Success;
    } else if !streams.is_empty() {
        result.status = VerificationStatus::PartialSuccess;
    } else {
        // A registered Thing with no channels is valid but worth surfacing.
        result.status = VerificationStatus::PartialSuccess;
        result.error_message = Some("No datastreams provisioned".to_string());
    }

    result
}

fn configured_boxes(station: &Station) -> Vec<(&'static str, &'static str)> {
    let mut boxes = Vec::new();
    if let Some(twl) = station.twlbox_id {
        boxes.push(("twl", twl));
    }
    if let Some(met) = station.metbox_id {
        boxes.push(("met", met));
    }
    boxes
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(client: &FrostClient) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results: Vec::new(),
        summary: VerificationSummary {
            boxes_total: 0,
            boxes_working: 0,
            boxes_failed: 0,
            stations_unconfigured: 0,
        },
    };

    println!("🔍 Verifying station boxes against {} ...", client.base_url());
    for station in STATION_REGISTRY {
        let boxes = configured_boxes(station);
        if boxes.is_empty() {
            println!("  {} — no boxes configured, skipping", station.name);
            report.summary.stations_unconfigured += 1;
            continue;
        }

        for (kind, box_name) in boxes {
            print!("  {} [{}] {} ... ", station.name, kind, box_name);
            let result = verify_box(client, station.name, kind, box_name);
            report.summary.boxes_total += 1;

            match result.status {
                VerificationStatus::Success => {
                    println!(
                        "✓ OK ({} channels, {} with data)",
                        result.datastreams.len(),
                        result.channels_with_data
                    );
                    report.summary.boxes_working += 1;
                }
                VerificationStatus::PartialSuccess => {
                    println!(
                        "⚠ Registered but no data ({} channels)",
                        result.datastreams.len()
                    );
                    report.summary.boxes_working += 1;
                }
                VerificationStatus::Failed => {
                    println!(
                        "✗ FAILED: {}",
                        result.error_message.as_deref().unwrap_or("Unknown")
                    );
                    report.summary.boxes_failed += 1;
                }
            }

            report.results.push(result);
        }
    }

    report
}

pub fn print_summary(report: &VerificationReport) {
    println!();
    println!("═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!(
        "Boxes:                  {}/{} working  ({} failed)",
        report.summary.boxes_working, report.summary.boxes_total, report.summary.boxes_failed
    );
    println!(
        "Unconfigured stations:  {}",
        report.summary.stations_unconfigured
    );
    println!();

    let success_rate = if report.summary.boxes_total > 0 {
        (report.summary.boxes_working as f64 / report.summary.boxes_total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, report.summary.boxes_working, report.summary.boxes_total
    );
    println!("═══════════════════════════════════════════════════════════");
}
