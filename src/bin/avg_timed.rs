//! Distributed average with phase-level timing.
//!
//! Launches a fixed group of isolated workers, scatters a random dataset
//! from the root, has every worker average its own chunk, gathers the
//! per-worker means back and reports how the wall time split between
//! communication and computation. Each run appends one row to
//! `timings.csv` so successive runs can be compared.
//!
//! Run with: WORKERS=4 cargo run --bin avg_timed -- 1000000

use std::process;

use scatter_avg::config::{RunConfig, USAGE};
use scatter_avg::group::WorkerGroup;
use scatter_avg::timing::{TimingLog, TimingSample};
use scatter_avg::{dataset, pipeline, report};

const LOG_PATH: &str = "timings.csv";

fn main() {
    let config = match RunConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("avg_timed: {err}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let outcome = WorkerGroup::run(config.worker_count, |world| {
        pipeline::run_on_world(&world, config.elements_per_worker, dataset::random_dataset)
    });

    match outcome {
        Ok(Some(run_report)) => {
            report::print(&run_report);

            let sample = TimingSample::new(
                run_report.worker_count,
                run_report.elements_per_worker,
                &run_report.timings,
            );
            // Persistence failure is non-fatal: the report already went to
            // stdout, the sample is simply not recorded.
            let _ = TimingLog::new(LOG_PATH).append(&sample);
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("avg_timed: {err}");
            process::exit(1);
        }
    }
}
