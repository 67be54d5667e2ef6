//! Basic meterwise walkthrough: build a schedule, evaluate, render a marker.

use meterwise::{RuleRecord, Schedule};

fn main() {
    let schedule = Schedule::from_records(&[
        RuleRecord::new("Mo,Tu,We,Th,Fr", "07:00", "09:00", "Tow-away"),
        RuleRecord::new("Mo,Tu,We,Th,Fr", "09:00", "18:00", "General Metered").with_time_limit(120),
        RuleRecord::new("Sa", "9:00 AM", "6:00 PM", "Paid"),
    ]);

    // A week's worth of check-ins, starting Monday 2026-02-09.
    let moments = [
        jiff::civil::date(2026, 2, 9).at(6, 30, 0, 0),
        jiff::civil::date(2026, 2, 9).at(8, 0, 0, 0),
        jiff::civil::date(2026, 2, 9).at(12, 0, 0, 0),
        jiff::civil::date(2026, 2, 13).at(19, 0, 0, 0),
        jiff::civil::date(2026, 2, 14).at(19, 0, 0, 0),
    ];

    for at in moments {
        let result = schedule.evaluate(at);
        let marker = result.status.marker();
        println!(
            "{at}  [{} {:<6}] {}",
            marker.glyph, marker.color, result.message
        );
    }

    // And right now, on this machine's clock.
    println!("\nnow: {}", schedule.evaluate_now());
}
