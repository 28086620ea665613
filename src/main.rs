//! Marina monitoring CLI.
//!
//! Default mode renders a latest-readings dashboard for the registry
//! stations; `verify` checks every configured box against the live FROST
//! server. Remote failures are rendered as "n/a" per station, never as a
//! crash — a dashboard with gaps beats no dashboard during an outage.

use std::collections::BTreeMap;
use std::process;

use marimon_service::analysis::channels;
use marimon_service::config::ServiceConfig;
use marimon_service::frost::FrostClient;
use marimon_service::logging::{self, DataSource, LogLevel};
use marimon_service::model::Observation;
use marimon_service::stations::{self, Station, STATION_REGISTRY};
use marimon_service::units::{deg_to_cardinal, format_wind_speed, SpeedUnit};
use marimon_service::verify;

enum Mode {
    Dashboard,
    Verify,
}

struct CliArgs {
    mode: Mode,
    station: Option<String>,
    log_file: Option<String>,
    kmh: bool,
    debug: bool,
}

const USAGE: &str = "\
Usage: marimon_service [verify] [OPTIONS]

Modes:
  (default)          render the latest-readings dashboard
  verify             check configured boxes against the FROST server

Options:
  --station <slug>   restrict to one station (e.g. kiel-harbour)
  --kmh              show wind speeds in km/h instead of m/s
  --log-file <path>  append log entries to a file
  --debug            enable debug-level logging";

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        mode: Mode::Dashboard,
        station: None,
        log_file: None,
        kmh: false,
        debug: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "verify" => cli.mode = Mode::Verify,
            "--station" => {
                cli.station = Some(
                    iter.next()
                        .ok_or("--station requires a station slug")?
                        .clone(),
                )
            }
            "--log-file" => {
                cli.log_file = Some(iter.next().ok_or("--log-file requires a path")?.clone())
            }
            "--kmh" => cli.kmh = true,
            "--debug" => cli.debug = true,
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(cli)
}

fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            process::exit(2);
        }
    };

    let min_level = if cli.debug { LogLevel::Debug } else { LogLevel::Info };
    logging::init_logger(min_level, cli.log_file.as_deref(), cli.debug);

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(msg) => {
            logging::error(DataSource::Config, None, &msg);
            process::exit(2);
        }
    };

    let client = match FrostClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            logging::error(DataSource::System, None, &format!("HTTP client setup failed: {}", e));
            process::exit(2);
        }
    };

    match cli.mode {
        Mode::Verify => {
            let report = verify::run_full_verification(&client);
            verify::print_summary(&report);
            if report.summary.boxes_failed > 0 {
                process::exit(1);
            }
        }
        Mode::Dashboard => {
            let selected: Vec<&Station> = match &cli.station {
                Some(slug) => match stations::find_station(slug) {
                    Some(station) => vec![station],
                    None => {
                        eprintln!("unknown station '{}'; known stations:", slug);
                        for station in STATION_REGISTRY {
                            eprintln!("  {}", station.slug);
                        }
                        process::exit(2);
                    }
                },
                None => STATION_REGISTRY.iter().collect(),
            };

            let unit = if cli.kmh {
                SpeedUnit::KilometersPerHour
            } else {
                SpeedUnit::MetersPerSecond
            };
            for station in selected {
                render_station(&client, station, unit);
            }
        }
    }
}

/// Fetches the latest-observation snapshot for a box, degrading to an empty
/// map (logged) when the box itself cannot be fetched.
fn latest_for_box(
    client: &FrostClient,
    box_id: Option<&str>,
) -> BTreeMap<String, Option<Observation>> {
    match client.fetch_latest(box_id, None) {
        Ok(map) => {
            if box_id.is_some() {
                let with_data = map.values().filter(|obs| obs.is_some()).count();
                let degraded = map.len() - with_data;
                if degraded > 0 {
                    logging::log_fetch_summary(DataSource::Frost, map.len(), with_data, degraded);
                }
            }
            map
        }
        Err(e) => {
            if let Some(id) = box_id {
                logging::log_frost_failure(id, "box snapshot fetch", &e);
            }
            BTreeMap::new()
        }
    }
}

fn render_station(client: &FrostClient, station: &Station, unit: SpeedUnit) {
    println!();
    println!(
        "── {} ({:.4}, {:.4}) ──",
        station.name, station.latitude, station.longitude
    );

    if station.metbox_id.is_none() && station.twlbox_id.is_none() {
        println!("  no sensor boxes configured");
        return;
    }

    let met = latest_for_box(client, station.metbox_id);
    let twl = latest_for_box(client, station.twlbox_id);

    if station.metbox_id.is_some() {
        match channels::pick_latest_value(&met, channels::WIND_SPEED_KEYWORDS) {
            Some((_, obs)) => {
                let direction = channels::pick_keyword_value(&met, channels::DIRECTION_KEYWORDS)
                    .map(|(_, d)| format!(" ({})", deg_to_cardinal(d.value)))
                    .unwrap_or_default();
                println!(
                    "  wind speed         {}{}   at {}",
                    format_wind_speed(obs.value, unit),
                    direction,
                    obs.phenomenon_time
                );
            }
            None => println!("  wind speed         n/a"),
        }
    }

    if station.twlbox_id.is_some() {
        match channels::pick_latest_value(&twl, channels::TEMPERATURE_KEYWORDS) {
            Some((_, obs)) => println!(
                "  water temperature  {:.1} °C   at {}",
                obs.value, obs.phenomenon_time
            ),
            None => println!("  water temperature  n/a"),
        }
        match channels::pick_latest_value(&twl, channels::LEVEL_KEYWORDS) {
            Some((_, obs)) => println!(
                "  water level        {:.2} m   at {}",
                obs.value, obs.phenomenon_time
            ),
            None => println!("  water level        n/a"),
        }
    }

    // 24h wind trend; the Thing/Datastream lookups are served from the same
    // response cache as the snapshot above.
    if station.metbox_id.is_some() {
        match client.fetch_series(station.metbox_id, channels::WIND_KEYWORDS, 24) {
            Ok(series) if !series.is_empty() => {
                let max = series.iter().map(|p| p.value).fold(f64::MIN, f64::max);
                let avg = series.iter().map(|p| p.value).sum::<f64>() / series.len() as f64;
                println!(
                    "  wind last 24h      avg {}, max {} ({} readings)",
                    format_wind_speed(avg, unit),
                    format_wind_speed(max, unit),
                    series.len()
                );
            }
            Ok(_) => println!("  wind last 24h      no data"),
            Err(e) => {
                if let Some(id) = station.metbox_id {
                    logging::log_frost_failure(id, "series fetch", &e);
                }
                println!("  wind last 24h      n/a");
            }
        }
    }
}
