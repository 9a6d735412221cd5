//! CLI parsing and the launch contract.
//!
//! The program takes exactly one positional argument, the per-worker
//! element count. The group size is not a program argument: it comes from
//! the launch environment (`WORKERS`, falling back to the CPU count), the
//! same way an external launcher would fix the number of cooperating
//! processes.

use std::env;

pub const USAGE: &str = "usage: avg_timed <elements_per_worker>";

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("expected exactly one argument: <elements_per_worker>")]
    WrongArgumentCount,

    #[error("elements_per_worker must be a positive integer (got '{0}')")]
    InvalidElementCount(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub worker_count: usize,
    pub elements_per_worker: usize,
}

impl RunConfig {
    /// Parse the argument list (without the program name). Rejects a zero
    /// element count up front: an empty chunk would make the local mean a
    /// division by zero, and by then the group is already inside the
    /// protocol.
    pub fn from_args<I>(mut args: I) -> Result<Self, UsageError>
    where
        I: Iterator<Item = String>,
    {
        let raw = args.next().ok_or(UsageError::WrongArgumentCount)?;
        if args.next().is_some() {
            return Err(UsageError::WrongArgumentCount);
        }

        let elements_per_worker: usize = raw
            .parse()
            .map_err(|_| UsageError::InvalidElementCount(raw.clone()))?;
        if elements_per_worker == 0 {
            return Err(UsageError::InvalidElementCount(raw));
        }

        Ok(Self {
            worker_count: worker_count_from_env(),
            elements_per_worker,
        })
    }
}

/// Group size fixed by the launch mechanism: `WORKERS` when set to a
/// positive integer, the number of available CPUs otherwise.
pub fn worker_count_from_env() -> usize {
    env::var("WORKERS")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|&count| count >= 1)
        .unwrap_or_else(num_cpus::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn accepts_a_single_positive_count() {
        let config = RunConfig::from_args(args(&["1000"])).unwrap();
        assert_eq!(config.elements_per_worker, 1000);
        assert!(config.worker_count >= 1);
    }

    #[test]
    fn rejects_missing_argument() {
        let err = RunConfig::from_args(args(&[])).unwrap_err();
        assert!(matches!(err, UsageError::WrongArgumentCount));
    }

    #[test]
    fn rejects_extra_arguments() {
        let err = RunConfig::from_args(args(&["10", "20"])).unwrap_err();
        assert!(matches!(err, UsageError::WrongArgumentCount));
    }

    #[test]
    fn rejects_zero_elements() {
        let err = RunConfig::from_args(args(&["0"])).unwrap_err();
        assert!(matches!(err, UsageError::InvalidElementCount(_)));
    }

    #[test]
    fn rejects_negative_and_garbage_counts() {
        assert!(RunConfig::from_args(args(&["-5"])).is_err());
        assert!(RunConfig::from_args(args(&["many"])).is_err());
        assert!(RunConfig::from_args(args(&["3.5"])).is_err());
    }
}
