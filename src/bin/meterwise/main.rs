mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use jiff::civil::DateTime;
use jiff::Zoned;
use meterwise::cluster::cluster_meters;
use meterwise::load::load_meters;
use meterwise::locate::nearest;
use meterwise::{Availability, GeoPoint, Meter, Report};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "meterwise", about = "Parking meter schedule evaluation", version)]
struct Cli {
    /// TOML file with default search and cluster settings
    #[arg(long, global = true, env = "METERWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current status of every meter in a file
    Status {
        /// Meter file (JSON)
        file: PathBuf,

        /// Only this meter
        #[arg(long)]
        post_id: Option<String>,

        /// Evaluate at this local date and time instead of now (e.g. 2026-02-09T10:00)
        #[arg(long)]
        at: Option<DateTime>,
    },

    /// Find the closest meters to a destination
    Nearest {
        /// Meter file (JSON)
        file: PathBuf,

        /// Destination latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Destination longitude
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Evaluate at this local date and time instead of now
        #[arg(long)]
        at: Option<DateTime>,

        /// Number of meters to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Ignore meters farther than this many meters
        #[arg(long)]
        max_distance: Option<f64>,

        /// Which meters count: any, parkable or free
        #[arg(long)]
        availability: Option<Availability>,
    },

    /// Group neighbouring meters that share a schedule
    Cluster {
        /// Meter file (JSON)
        file: PathBuf,

        /// Linking radius in meters
        #[arg(long)]
        radius_m: Option<f64>,
    },

    /// Validate a meter file and report rules that cannot be used
    Check {
        /// Meter file (JSON)
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct MeterStatus<'a> {
    post_id: &'a str,
    #[serde(flatten)]
    report: Report,
}

#[derive(Serialize)]
struct NearbyMeter<'a> {
    post_id: &'a str,
    distance_m: f64,
    location: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    street_name: Option<&'a str>,
    #[serde(flatten)]
    report: Report,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    let code = match &cli.command {
        Command::Status { file, post_id, at } => {
            status(file, post_id.as_deref(), resolve_at(*at), cli.json)
        }
        Command::Nearest {
            file,
            lat,
            lon,
            at,
            limit,
            max_distance,
            availability,
        } => {
            let mut options = config.search_options();
            if let Some(limit) = limit {
                options.limit = *limit;
            }
            if max_distance.is_some() {
                options.max_distance_m = *max_distance;
            }
            if let Some(availability) = availability {
                options.availability = *availability;
            }
            let destination = GeoPoint::new(*lat, *lon);
            if !destination.is_finite() {
                eprintln!("error: destination must be finite coordinates");
                process::exit(2);
            }
            let meters = load_or_exit(file);
            let at = resolve_at(*at);
            let hits = nearest(&meters, destination, at, &options);
            if hits.is_empty() {
                eprintln!("no {} meters found", options.availability);
                0
            } else if cli.json {
                let rows: Vec<NearbyMeter> = hits
                    .iter()
                    .map(|hit| NearbyMeter {
                        post_id: &hit.meter.post_id,
                        distance_m: (hit.distance_m * 10.0).round() / 10.0,
                        location: hit.meter.location,
                        street_name: hit.meter.street_name.as_deref(),
                        report: hit.evaluation.to_report(),
                    })
                    .collect();
                print_json(&rows)
            } else {
                for hit in &hits {
                    println!(
                        "{:>6.0} m\t{}\t{}\t{}",
                        hit.distance_m,
                        hit.meter.post_id,
                        hit.evaluation.status,
                        hit.evaluation.message
                    );
                }
                0
            }
        }
        Command::Cluster { file, radius_m } => {
            let radius_m = radius_m.unwrap_or(config.cluster_radius_m);
            if !(radius_m.is_finite() && radius_m >= 0.0) {
                eprintln!("error: radius must be a non-negative number of meters");
                process::exit(2);
            }
            let meters = load_or_exit(file);
            let clusters = cluster_meters(&meters, radius_m);
            if cli.json {
                print_json(&clusters)
            } else {
                for cluster in &clusters {
                    println!(
                        "{}\t{} meters\t{}\t{}",
                        cluster.id,
                        cluster.len(),
                        cluster.centroid,
                        cluster.street_name.as_deref().unwrap_or("-")
                    );
                }
                0
            }
        }
        Command::Check { file } => check(file),
    };
    process::exit(code);
}

fn resolve_at(at: Option<DateTime>) -> DateTime {
    let at = at.unwrap_or_else(|| Zoned::now().datetime());
    debug!(%at, "reference instant");
    at
}

fn load_or_exit(file: &Path) -> Vec<Meter> {
    match load_meters(file) {
        Ok(meters) => meters,
        Err(e) => {
            eprintln!("{}", e.display_rich());
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("error: failed to serialize: {e}");
            1
        }
    }
}

fn status(file: &Path, post_id: Option<&str>, at: DateTime, json: bool) -> i32 {
    let meters = load_or_exit(file);
    let selected: Vec<&Meter> = match post_id {
        Some(id) => meters.iter().filter(|m| m.post_id == id).collect(),
        None => meters.iter().collect(),
    };
    if let (Some(id), true) = (post_id, selected.is_empty()) {
        eprintln!("error: no meter with post id '{id}'");
        return 1;
    }

    if json {
        let rows: Vec<MeterStatus> = selected
            .iter()
            .map(|meter| MeterStatus {
                post_id: &meter.post_id,
                report: meter.evaluate(at).to_report(),
            })
            .collect();
        return print_json(&rows);
    }

    for meter in selected {
        let evaluation = meter.evaluate(at);
        println!(
            "{}\t{}\t{}",
            meter.post_id, evaluation.status, evaluation.message
        );
    }
    0
}

fn check(file: &Path) -> i32 {
    let meters = load_or_exit(file);
    let rules: usize = meters.iter().map(|m| m.schedule.rule_count()).sum();
    let mut skipped = 0;
    for meter in &meters {
        if meter.schedule.skipped() > 0 {
            skipped += meter.schedule.skipped();
            eprintln!(
                "warning: {}: {} rule(s) with unusable times skipped",
                meter.post_id,
                meter.schedule.skipped()
            );
        }
    }
    println!(
        "\u{2713} {} meters, {} rules, {} skipped",
        meters.len(),
        rules,
        skipped
    );
    0
}
