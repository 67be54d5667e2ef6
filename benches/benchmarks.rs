use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meterwise::locate::nearest;
use meterwise::{GeoPoint, Meter, RuleRecord, Schedule, SearchOptions};

// Monday 2026-02-09
fn fixed_at(hour: i8, minute: i8) -> jiff::civil::DateTime {
    jiff::civil::date(2026, 2, 9).at(hour, minute, 0, 0)
}

fn downtown_schedule() -> Schedule {
    Schedule::from_records(&[
        RuleRecord::new("Mo,Tu,We,Th,Fr", "07:00", "09:00", "Tow-away"),
        RuleRecord::new("Mo,Tu,We,Th,Fr", "09:00", "18:00", "General Metered").with_time_limit(120),
        RuleRecord::new("Sa", "09:00", "18:00", "Paid").with_time_limit(240),
        RuleRecord::new("Mo,Tu,We,Th,Fr", "16:00", "18:00", "Commercial Loading (metered)"),
    ])
}

// ---------------------------------------------------------------------------
// Schedule construction
// ---------------------------------------------------------------------------

fn bench_build(c: &mut Criterion) {
    let records = vec![
        RuleRecord::new("Mo,Tu,We,Th,Fr", "7:00 AM", "9:00 AM", "Tow-away"),
        RuleRecord::new("Mo,Tu,We,Th,Fr", "9:00 AM", "6:00 PM", "General Metered"),
        RuleRecord::new("Sa", "09:00", "18:00", "Paid"),
    ];
    c.bench_function("from_records", |b| {
        b.iter(|| Schedule::from_records(black_box(&records)));
    });
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let schedule = downtown_schedule();

    let active = fixed_at(10, 0);
    group.bench_function("active_rule", |b| {
        b.iter(|| schedule.evaluate(black_box(active)));
    });

    let later_today = fixed_at(6, 0);
    group.bench_function("later_today", |b| {
        b.iter(|| schedule.evaluate(black_box(later_today)));
    });

    // Saturday night: scans Sunday, then finds Monday.
    let wraparound = jiff::civil::date(2026, 2, 7).at(22, 0, 0, 0);
    group.bench_function("wraparound", |b| {
        b.iter(|| schedule.evaluate(black_box(wraparound)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Nearest search
// ---------------------------------------------------------------------------

fn bench_nearest(c: &mut Criterion) {
    let schedule = downtown_schedule();
    let meters: Vec<Meter> = (0..2_000)
        .map(|i| {
            let location = GeoPoint::new(37.77 + (i % 50) as f64 * 0.0002, -122.42 + (i / 50) as f64 * 0.0002);
            Meter::new(format!("{i:05}"), location, schedule.clone())
        })
        .collect();
    let destination = GeoPoint::new(37.775, -122.416);
    let at = fixed_at(8, 30);
    let options = SearchOptions::default();

    c.bench_function("nearest_2000", |b| {
        b.iter(|| nearest(black_box(&meters), destination, at, &options));
    });
}

criterion_group!(benches, bench_build, bench_evaluate, bench_nearest);
criterion_main!(benches);
