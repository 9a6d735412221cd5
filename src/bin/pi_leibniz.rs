//! Leibniz-series estimate of pi with per-worker partial sums.
//!
//! Workers stride the alternating series by rank (terms rank, rank+N,
//! rank+2N, ...). Each worker accumulates into its own slot of a table
//! sized at runtime from the worker count, so there is exactly one writer
//! per slot and no locking. The main thread folds the slots in rank order
//! once the team has joined.
//!
//! Run with: WORKERS=4 cargo run --bin pi_leibniz -- 100000000

use std::process;
use std::thread;
use std::time::Instant;

use scatter_avg::config::worker_count_from_env;

fn main() {
    let iterations = match parse_args(std::env::args().skip(1)) {
        Ok(iterations) => iterations,
        Err(message) => {
            eprintln!("pi_leibniz: {message}");
            eprintln!("usage: pi_leibniz <iterations>");
            process::exit(1);
        }
    };
    let workers = worker_count_from_env();

    let start = Instant::now();
    let mut partials = vec![0.0f64; workers];
    thread::scope(|scope| {
        for (rank, slot) in partials.iter_mut().enumerate() {
            scope.spawn(move || {
                *slot = partial_sum(rank as u64, workers as u64, iterations);
            });
        }
    });
    let estimate: f64 = partials.iter().sum();
    let elapsed = start.elapsed();

    println!(
        "pi estimate after {} terms on {} workers: {:.8}",
        iterations, workers, estimate
    );
    println!(
        "absolute error: {:.3e}",
        (estimate - std::f64::consts::PI).abs()
    );
    println!("elapsed: {:.6} s", elapsed.as_secs_f64());
}

/// Sum of this rank's share of the series 4 - 4/3 + 4/5 - 4/7 + ...
fn partial_sum(rank: u64, stride: u64, iterations: u64) -> f64 {
    let mut sum = 0.0;
    let mut term = rank;
    while term < iterations {
        let value = 4.0 / (2.0 * term as f64 + 1.0);
        if term % 2 == 0 {
            sum += value;
        } else {
            sum -= value;
        }
        term += stride;
    }
    sum
}

fn parse_args<I>(mut args: I) -> Result<u64, String>
where
    I: Iterator<Item = String>,
{
    let raw = args.next().ok_or("expected exactly one argument")?;
    if args.next().is_some() {
        return Err("expected exactly one argument".to_owned());
    }
    let iterations: u64 = raw
        .parse()
        .map_err(|_| format!("iterations must be a positive integer (got '{raw}')"))?;
    if iterations == 0 {
        return Err(format!("iterations must be a positive integer (got '{raw}')"));
    }
    Ok(iterations)
}
