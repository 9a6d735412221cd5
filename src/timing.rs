//! Phase timing and the append-only CSV log.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

/// Wall-clock durations of the pipeline phases, taken from a monotonic
/// clock so each one is non-negative by construction.
///
/// `total` spans the whole pipeline, not just the three measured phases, so
/// it may exceed their sum (dataset generation and the final reduction are
/// unmeasured overhead inside it).
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimings {
    pub scatter: Duration,
    pub compute: Duration,
    pub gather: Duration,
    pub total: Duration,
}

impl PhaseTimings {
    /// Time spent in the two collectives.
    pub fn communication(&self) -> Duration {
        self.scatter + self.gather
    }

    /// Share of the total spent communicating, in percent.
    pub fn communication_percent(&self) -> f64 {
        percent_of(self.communication(), self.total)
    }

    /// Share of the total spent in the local reduction, in percent.
    pub fn compute_percent(&self) -> f64 {
        percent_of(self.compute, self.total)
    }
}

fn percent_of(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.as_secs_f64() / whole.as_secs_f64() * 100.0
}

/// One persisted row of the timing log: run parameters plus the four
/// measured durations in seconds.
#[derive(Debug, Clone)]
pub struct TimingSample {
    pub worker_count: usize,
    pub elements_per_worker: usize,
    pub total_elements: usize,
    pub scatter_secs: f64,
    pub compute_secs: f64,
    pub gather_secs: f64,
    pub total_secs: f64,
}

impl TimingSample {
    pub fn new(worker_count: usize, elements_per_worker: usize, timings: &PhaseTimings) -> Self {
        Self {
            worker_count,
            elements_per_worker,
            total_elements: worker_count * elements_per_worker,
            scatter_secs: timings.scatter.as_secs_f64(),
            compute_secs: timings.compute.as_secs_f64(),
            gather_secs: timings.gather.as_secs_f64(),
            total_secs: timings.total.as_secs_f64(),
        }
    }

    /// The seven CSV fields in their documented order, times fixed to six
    /// fractional digits.
    fn to_record(&self) -> [String; 7] {
        [
            self.worker_count.to_string(),
            self.elements_per_worker.to_string(),
            self.total_elements.to_string(),
            format!("{:.6}", self.scatter_secs),
            format!("{:.6}", self.compute_secs),
            format!("{:.6}", self.gather_secs),
            format!("{:.6}", self.total_secs),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("timing log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("timing log row could not be written: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only CSV log of timing samples. One row per run; rows from
/// earlier invocations are never touched.
pub struct TimingLog {
    path: PathBuf,
}

impl TimingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one sample. Creates the file if absent; never truncates.
    pub fn append(&self, sample: &TimingSample) -> Result<(), LogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(sample.to_record())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample() -> TimingSample {
        let timings = PhaseTimings {
            scatter: Duration::from_micros(1_500),
            compute: Duration::from_micros(250),
            gather: Duration::from_micros(750),
            total: Duration::from_micros(3_000),
        };
        TimingSample::new(4, 1_000, &timings)
    }

    #[test]
    fn record_has_seven_fields_with_six_decimal_times() {
        let record = sample().to_record();
        assert_eq!(record.len(), 7);
        assert_eq!(record[0], "4");
        assert_eq!(record[1], "1000");
        assert_eq!(record[2], "4000");
        assert_eq!(record[3], "0.001500");
        assert_eq!(record[4], "0.000250");
        assert_eq!(record[5], "0.000750");
        assert_eq!(record[6], "0.003000");
    }

    #[test]
    fn append_accumulates_one_row_per_call() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("timings.csv");
        let log = TimingLog::new(&path);

        log.append(&sample()).unwrap();
        log.append(&sample()).unwrap();
        log.append(&sample()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert_eq!(line.split(',').count(), 7);
        }
    }

    #[test]
    fn append_to_unwritable_path_reports_io_error() {
        let log = TimingLog::new("/definitely/not/a/real/dir/timings.csv");
        assert!(matches!(log.append(&sample()), Err(LogError::Io(_))));
    }

    #[test]
    fn communication_percent_splits_the_total() {
        let timings = PhaseTimings {
            scatter: Duration::from_millis(30),
            compute: Duration::from_millis(40),
            gather: Duration::from_millis(10),
            total: Duration::from_millis(100),
        };
        assert!((timings.communication_percent() - 40.0).abs() < 1e-9);
        assert!((timings.compute_percent() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_yields_zero_percent() {
        let timings = PhaseTimings {
            scatter: Duration::ZERO,
            compute: Duration::ZERO,
            gather: Duration::ZERO,
            total: Duration::ZERO,
        };
        assert_eq!(timings.communication_percent(), 0.0);
    }
}
