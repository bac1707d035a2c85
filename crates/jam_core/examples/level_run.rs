//! Autoplay the first bundled level and print its departures.
//!
//! Run with: cargo run -p jam_core --example level_run

use jam_core::clock::ONE_SEC_MS;
use jam_core::level::{LevelDefinition, SessionConfig};
use jam_core::{LevelResult, LevelSession};

fn main() -> LevelResult<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../levels/first_steps.json");
    let level = LevelDefinition::load(path)?;
    let passengers = level.passenger_count();
    let buses = level.buses.len();

    let mut session = LevelSession::new(level, SessionConfig::default())?;
    let steps = session.autoplay(100_000, LevelSession::greedy_pick);

    println!("--- Level run ({passengers} passengers, {buses} buses, greedy autoplay) ---");
    println!("Steps executed: {steps}");
    println!("Simulation time: {:.1} s", session.now() as f64 / ONE_SEC_MS as f64);
    println!("Outcome: {:?}, {} s left", session.outcome(), session.time_left());

    println!("\nDepartures:");
    for record in &session.telemetry().departures {
        println!(
            "  {}  {:?}  started={} ms  finished={}",
            record.order,
            record.color,
            record.started_at,
            record
                .finished_at
                .map(|at| format!("{at} ms"))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    println!("\nEvents by kind:");
    for (kind, count) in session.metrics().sorted_counts() {
        println!("  {kind:?}: {count}");
    }
    Ok(())
}
