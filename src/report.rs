//! Human-readable run report, printed by the root.

use colored::Colorize;

use crate::pipeline::RunReport;

/// Print results and timings to stdout in the layout the timing scripts
/// expect: counts and both means, then the four phase durations and the
/// communication/computation split.
pub fn print(report: &RunReport) {
    let t = &report.timings;

    println!();
    println!("{}", "========== RESULTS ==========".bold().cyan());
    println!("Workers:             {}", report.worker_count);
    println!("Elements per worker: {}", report.elements_per_worker);
    println!(
        "Total elements:      {}",
        report.worker_count * report.elements_per_worker
    );
    println!("Computed mean:       {:.6}", report.distributed_mean);
    println!("Verification mean:   {:.6}", report.verification_mean);

    println!();
    println!("{}", "========== TIMINGS ==========".bold().cyan());
    println!("Scatter: {:.6} s", t.scatter.as_secs_f64());
    println!("Compute: {:.6} s", t.compute.as_secs_f64());
    println!("Gather:  {:.6} s", t.gather.as_secs_f64());
    println!("Total:   {:.6} s", t.total.as_secs_f64());
    println!(
        "Communication: {:.6} s ({:.2}%)",
        t.communication().as_secs_f64(),
        t.communication_percent()
    );
    println!(
        "Computation:   {:.6} s ({:.2}%)",
        t.compute.as_secs_f64(),
        t.compute_percent()
    );
    println!();
}
