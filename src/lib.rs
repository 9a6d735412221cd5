//! Pedagogical parallel-programming demos built around message passing.
//!
//! The centerpiece is a scatter/compute/gather pipeline that averages a
//! random dataset across a fixed group of isolated workers while timing how
//! much of the wall clock goes to communication vs computation (the
//! `avg_timed` binary). Workers share no data: every exchange goes through
//! the blocking collectives in [`group`].
//!
//! Smaller companion demos: `hello_workers` (worker enumeration),
//! `pi_leibniz` (per-worker partial sums) and `trapezoid` (rank-ordered
//! reduction).

pub mod config;
pub mod dataset;
pub mod group;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod timing;
