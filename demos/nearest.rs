//! Load a meter file, then find where to park near a destination.
//!
//! ```sh
//! cargo run --example nearest -- tests/fixtures/meters.json 37.7749 -122.4194
//! ```

use meterwise::cluster::{cluster_meters, DEFAULT_RADIUS_M};
use meterwise::load::load_meters;
use meterwise::locate::nearest;
use meterwise::{GeoPoint, SearchOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: nearest <meters.json> <lat> <lon>")?;
    let lat: f64 = args.next().ok_or("missing latitude")?.parse()?;
    let lon: f64 = args.next().ok_or("missing longitude")?.parse()?;

    let meters = load_meters(&path)?;
    let destination = GeoPoint::new(lat, lon);
    let at = jiff::Zoned::now().datetime();

    println!("Nearest parkable meters to {destination} at {at}:");
    for hit in nearest(&meters, destination, at, &SearchOptions::default()) {
        println!(
            "  {:>6.0} m  {:<10} {}",
            hit.distance_m, hit.meter.post_id, hit.evaluation
        );
    }

    // Clusters behave like meters too.
    let clusters: Vec<_> = cluster_meters(&meters, DEFAULT_RADIUS_M)
        .iter()
        .map(|c| c.to_meter())
        .collect();
    println!("\nNearest clusters:");
    for hit in nearest(&clusters, destination, at, &SearchOptions::default()) {
        println!(
            "  {:>6.0} m  {:<10} {}",
            hit.distance_m, hit.meter.post_id, hit.evaluation
        );
    }

    Ok(())
}
