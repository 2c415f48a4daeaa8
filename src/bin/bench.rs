//! Benchmark for full-pipeline run time across seeds.
//!
//! Run with: cargo run --release -p nurse-roster-scheduler --bin bench

use std::time::Instant;

use nurse_roster_scheduler::config::SchedulerConfig;
use nurse_roster_scheduler::demo_data::{self, DemoData};
use nurse_roster_scheduler::solver;

fn main() {
    let (base_config, requests) = demo_data::generate(DemoData::Sample);

    println!("Benchmark: full pipeline run time");
    println!("  Nurses: {}", base_config.nurses.len());
    println!("  Days: {}", base_config.days_in_month);
    println!("  Requests: {}", requests.len());
    println!();

    const SEEDS: u64 = 20;
    let mut total = std::time::Duration::ZERO;

    for seed in 0..SEEDS {
        let config = SchedulerConfig::clinic().with_seed(seed);
        let start = Instant::now();
        let outcome = solver::solve(&config, &requests).expect("feasible reference clinic data");
        let elapsed = start.elapsed();
        total += elapsed;
        println!(
            "  seed {seed:>3}: {elapsed:>8.2?} ({} warnings)",
            outcome.warnings.len()
        );
    }

    println!();
    println!("Average: {:.2?}", total / SEEDS as u32);
}
