//! The scatter/compute/gather averaging pipeline.
//!
//! Every rank runs the same function. The root generates the dataset,
//! scatters it, and after the gather reduces the per-worker means and
//! double-checks the result against a direct mean over the full dataset.
//! Timestamps bracket each phase; both collectives double as group-wide
//! synchronization points, so a phase is finished everywhere before the
//! next one starts.

use std::time::Instant;

use crate::group::{CollectiveError, World};
use crate::stats;
use crate::timing::PhaseTimings;

/// Root-side outcome of one pipeline run.
///
/// `distributed_mean` is the mean of the gathered per-worker means;
/// `verification_mean` is computed directly over the full dataset. The two
/// differ only by floating-point accumulation order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub distributed_mean: f32,
    pub verification_mean: f32,
    pub worker_count: usize,
    pub elements_per_worker: usize,
    pub timings: PhaseTimings,
}

/// Run the pipeline on one rank. Returns `Some(report)` on the root and
/// `None` everywhere else.
///
/// `make_dataset` is only invoked on the root; injecting it keeps the
/// pipeline deterministic under test while the binary plugs in the random
/// generator.
pub fn run_on_world<F>(
    world: &World,
    elements_per_worker: usize,
    make_dataset: F,
) -> Result<Option<RunReport>, CollectiveError>
where
    F: FnOnce(usize) -> Vec<f32>,
{
    let total_start = Instant::now();

    let full_dataset = if world.is_root() {
        Some(make_dataset(elements_per_worker * world.size()))
    } else {
        None
    };

    let scatter_start = Instant::now();
    let chunk = world.scatter(full_dataset.as_deref(), elements_per_worker)?;
    let scatter = scatter_start.elapsed();

    let compute_start = Instant::now();
    let local_mean = stats::mean(&chunk);
    let compute = compute_start.elapsed();

    let gather_start = Instant::now();
    let collected = world.gather(local_mean)?;
    let gather = gather_start.elapsed();

    let total = total_start.elapsed();

    let Some(means) = collected else {
        return Ok(None);
    };
    let full = full_dataset.ok_or(CollectiveError::MissingRootData)?;

    Ok(Some(RunReport {
        distributed_mean: stats::mean(&means),
        verification_mean: stats::mean(&full),
        worker_count: world.size(),
        elements_per_worker,
        timings: PhaseTimings {
            scatter,
            compute,
            gather,
            total,
        },
    }))
}
