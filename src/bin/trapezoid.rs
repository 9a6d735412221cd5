//! Trapezoidal-rule integration with a rank-ordered reduction.
//!
//! Each worker integrates a contiguous sub-interval of [a, b], then folds
//! its local sum into the shared total strictly in ascending rank order: a
//! Mutex+Condvar pair hands the accumulator to rank 0, then rank 1, and so
//! on. The deterministic fold order makes the result bit-identical from
//! run to run for a fixed worker count.
//!
//! Run with: WORKERS=4 cargo run --bin trapezoid -- 0 3 1000000

use std::process;
use std::sync::{Condvar, Mutex};
use std::thread;

use scatter_avg::config::worker_count_from_env;

/// The integrand: x^3/3 + 4x.
fn f(x: f64) -> f64 {
    x * x * x / 3.0 + 4.0 * x
}

/// Accumulator that accepts contributions only in ascending rank order.
/// A worker arriving early blocks until every lower rank has folded.
struct OrderedAccumulator {
    // (next rank allowed to fold, running total)
    state: Mutex<(usize, f64)>,
    turn: Condvar,
}

impl OrderedAccumulator {
    fn new() -> Self {
        Self {
            state: Mutex::new((0, 0.0)),
            turn: Condvar::new(),
        }
    }

    fn fold(&self, rank: usize, value: f64) {
        let mut state = self.state.lock().unwrap();
        while state.0 != rank {
            state = self.turn.wait(state).unwrap();
        }
        state.1 += value;
        state.0 += 1;
        self.turn.notify_all();
    }

    fn total(&self) -> f64 {
        self.state.lock().unwrap().1
    }
}

fn main() {
    let (a, b, trapezoids) = match parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("trapezoid: {message}");
            eprintln!("usage: trapezoid <a> <b> <n_trapezoids>");
            process::exit(1);
        }
    };
    let workers = worker_count_from_env();
    let h = (b - a) / trapezoids as f64;

    let accumulator = OrderedAccumulator::new();
    thread::scope(|scope| {
        for rank in 0..workers {
            let accumulator = &accumulator;
            scope.spawn(move || {
                let local = local_sum(rank, workers, a, h, trapezoids);
                accumulator.fold(rank, local);
            });
        }
    });
    let estimate = accumulator.total() * h;

    println!(
        "integral of x^3/3 + 4x over [{}, {}] with {} trapezoids: {:.6}",
        a, b, trapezoids, estimate
    );
}

/// Trapezoid sum for this rank's contiguous block of sub-intervals, without
/// the final scaling by h. The last rank absorbs the division remainder.
fn local_sum(rank: usize, workers: usize, a: f64, h: f64, trapezoids: u64) -> f64 {
    let per_worker = trapezoids / workers as u64;
    let lo = rank as u64 * per_worker;
    let hi = if rank == workers - 1 {
        trapezoids
    } else {
        lo + per_worker
    };

    let mut sum = 0.0;
    for i in lo..hi {
        let x0 = a + i as f64 * h;
        let x1 = x0 + h;
        sum += (f(x0) + f(x1)) / 2.0;
    }
    sum
}

fn parse_args<I>(mut args: I) -> Result<(f64, f64, u64), String>
where
    I: Iterator<Item = String>,
{
    let raw: Vec<String> = args.by_ref().take(3).collect();
    if raw.len() != 3 || args.next().is_some() {
        return Err("expected exactly three arguments".to_owned());
    }

    let a: f64 = raw[0]
        .parse()
        .map_err(|_| format!("a must be a number (got '{}')", raw[0]))?;
    let b: f64 = raw[1]
        .parse()
        .map_err(|_| format!("b must be a number (got '{}')", raw[1]))?;
    let trapezoids: u64 = raw[2]
        .parse()
        .map_err(|_| format!("n_trapezoids must be a positive integer (got '{}')", raw[2]))?;
    if trapezoids == 0 {
        return Err("n_trapezoids must be at least 1".to_owned());
    }
    Ok((a, b, trapezoids))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_cover_every_trapezoid_exactly_once() {
        let (a, b, n) = (0.0, 3.0, 1_000);
        let h = (b - a) / n as f64;
        let workers = 4;
        let split: f64 = (0..workers).map(|rank| local_sum(rank, workers, a, h, n)).sum();
        let sequential = local_sum(0, 1, a, h, n);
        // Only the accumulation order differs between the two sums.
        assert!((split - sequential).abs() < 1e-6);
    }

    #[test]
    fn estimate_matches_the_antiderivative() {
        // Integral of x^3/3 + 4x over [0, 3] is x^4/12 + 2x^2 = 24.75.
        let (a, b, n) = (0.0, 3.0, 100_000);
        let h = (b - a) / n as f64;
        let estimate = local_sum(0, 1, a, h, n) * h;
        assert!((estimate - 24.75).abs() < 1e-4);
    }

    #[test]
    fn ordered_fold_visits_ranks_in_ascending_order() {
        let accumulator = OrderedAccumulator::new();
        thread::scope(|scope| {
            // Spawn in reverse so the accumulator has to impose the order.
            for rank in (0..8usize).rev() {
                let accumulator = &accumulator;
                scope.spawn(move || {
                    accumulator.fold(rank, 10f64.powi(rank as i32));
                });
            }
        });
        // Every contribution landed exactly once.
        assert_eq!(accumulator.total(), 11_111_111.0);
        assert_eq!(accumulator.state.lock().unwrap().0, 8);
    }

    #[test]
    fn rejects_zero_trapezoids() {
        let args = ["0".to_owned(), "1".to_owned(), "0".to_owned()];
        assert!(parse_args(args.into_iter()).is_err());
    }

    #[test]
    fn remainder_goes_to_the_last_rank() {
        let (a, n) = (0.0, 10u64);
        let h = 0.1;
        let workers = 3;
        let split: f64 = (0..workers).map(|rank| local_sum(rank, workers, a, h, n)).sum();
        let sequential = local_sum(0, 1, a, h, n);
        assert!((split - sequential).abs() < 1e-9);
    }
}
