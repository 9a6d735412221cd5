//! Every worker announces itself.
//!
//! The parallel-programming "hello world": spawn the group, let each rank
//! print who it is, join. Output order is whatever the scheduler gives.
//!
//! Run with: WORKERS=8 cargo run --bin hello_workers

use std::thread;

use scatter_avg::config::worker_count_from_env;
use scatter_avg::group::WorkerGroup;

fn main() {
    let workers = worker_count_from_env();
    WorkerGroup::run(workers, |world| {
        let thread_name = thread::current()
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| "unnamed".to_owned());
        println!(
            "worker {:2} of {:2} active on {}",
            world.rank(),
            world.size(),
            thread_name
        );
    });
}
