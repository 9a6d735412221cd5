//! A fixed-size group of rank-numbered workers and its two collectives.
//!
//! Each worker runs on its own OS thread and owns only its rank, the group
//! size and its channel endpoints. All data exchange happens through
//! `scatter` and `gather`; both are barrier-synchronized, so no rank returns
//! from a collective until the group-wide exchange has completed. There is
//! no timeout or cancellation path: a worker that never reaches a collective
//! stalls the whole group, which is the accepted contract for a fixed,
//! reliable group.

use std::panic;
use std::sync::{Arc, Barrier};
use std::thread;

use crossbeam::channel::{unbounded, Receiver, Sender};

/// Failure inside a collective call. All of these are fatal to the run:
/// there is no recovery protocol between workers.
#[derive(Debug, thiserror::Error)]
pub enum CollectiveError {
    #[error("scatter needs a chunk length of at least 1")]
    EmptyChunk,

    #[error("scatter called on the root without a dataset")]
    MissingRootData,

    #[error("dataset has {actual} elements, expected {expected} (chunk length x workers)")]
    DatasetSizeMismatch { expected: usize, actual: usize },

    #[error("received a chunk of {actual} elements, expected {expected}")]
    ChunkSizeMismatch { expected: usize, actual: usize },

    #[error("worker group broke during {phase}: a peer disconnected")]
    Disconnected { phase: &'static str },

    #[error("gather completed without a contribution from rank {rank}")]
    MissingContribution { rank: usize },
}

/// Channel endpoints, different for the root and for everyone else.
///
/// The root keeps one chunk sender per rank (its own included, so it is a
/// receiver of its own chunk like any other worker) and the single inbox
/// that all gathered values funnel into.
enum Role {
    Root {
        chunk_outboxes: Vec<Sender<Vec<f32>>>,
        chunk_inbox: Receiver<Vec<f32>>,
        value_inbox: Receiver<(usize, f32)>,
    },
    Member {
        chunk_inbox: Receiver<Vec<f32>>,
        value_outbox: Sender<(usize, f32)>,
    },
}

/// One worker's handle onto the group: its identity plus the collectives.
pub struct World {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
    role: Role,
}

impl World {
    /// Zero-based identity of this worker, unique within the group.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of workers in the group, fixed for the run's lifetime.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Rank 0 generates the dataset, aggregates the result and reports.
    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    /// Collective: split the root's dataset into contiguous chunks of
    /// `chunk_len` and deliver chunk `i` to rank `i`. Every rank (root
    /// included) receives exactly one chunk. The root passes
    /// `Some(dataset)`, everyone else `None`; the dataset must hold exactly
    /// `chunk_len * size` elements.
    ///
    /// Blocks until the whole group has its chunk.
    pub fn scatter(
        &self,
        root_data: Option<&[f32]>,
        chunk_len: usize,
    ) -> Result<Vec<f32>, CollectiveError> {
        if chunk_len == 0 {
            return Err(CollectiveError::EmptyChunk);
        }

        let chunk = match &self.role {
            Role::Root {
                chunk_outboxes,
                chunk_inbox,
                ..
            } => {
                let data = root_data.ok_or(CollectiveError::MissingRootData)?;
                let expected = chunk_len * self.size;
                if data.len() != expected {
                    return Err(CollectiveError::DatasetSizeMismatch {
                        expected,
                        actual: data.len(),
                    });
                }
                for (rank, piece) in data.chunks(chunk_len).enumerate() {
                    chunk_outboxes[rank]
                        .send(piece.to_vec())
                        .map_err(|_| CollectiveError::Disconnected { phase: "scatter" })?;
                }
                chunk_inbox
                    .recv()
                    .map_err(|_| CollectiveError::Disconnected { phase: "scatter" })?
            }
            Role::Member { chunk_inbox, .. } => chunk_inbox
                .recv()
                .map_err(|_| CollectiveError::Disconnected { phase: "scatter" })?,
        };

        if chunk.len() != chunk_len {
            return Err(CollectiveError::ChunkSizeMismatch {
                expected: chunk_len,
                actual: chunk.len(),
            });
        }

        // Nobody leaves the collective before the exchange is complete
        // group-wide.
        self.barrier.wait();
        Ok(chunk)
    }

    /// Collective: deliver every rank's value to the root. The root gets
    /// the values back ordered by ascending rank; everyone else gets
    /// `None`.
    ///
    /// Blocks until all contributions have arrived at the root.
    pub fn gather(&self, value: f32) -> Result<Option<Vec<f32>>, CollectiveError> {
        let gathered = match &self.role {
            Role::Root { value_inbox, .. } => {
                let mut slots: Vec<Option<f32>> = vec![None; self.size];
                slots[self.rank] = Some(value);
                for _ in 1..self.size {
                    let (rank, contribution) = value_inbox
                        .recv()
                        .map_err(|_| CollectiveError::Disconnected { phase: "gather" })?;
                    slots[rank] = Some(contribution);
                }
                let ordered = slots
                    .into_iter()
                    .enumerate()
                    .map(|(rank, slot)| slot.ok_or(CollectiveError::MissingContribution { rank }))
                    .collect::<Result<Vec<f32>, _>>()?;
                Some(ordered)
            }
            Role::Member { value_outbox, .. } => {
                value_outbox
                    .send((self.rank, value))
                    .map_err(|_| CollectiveError::Disconnected { phase: "gather" })?;
                None
            }
        };

        self.barrier.wait();
        Ok(gathered)
    }
}

/// Launcher for a fixed group of workers.
pub struct WorkerGroup;

impl WorkerGroup {
    /// Spawn `size` workers, run `f` once on every rank in parallel, join
    /// them all and return rank 0's output.
    ///
    /// A panic on any worker thread is re-raised on the caller.
    pub fn run<R, F>(size: usize, f: F) -> R
    where
        F: Fn(World) -> R + Sync,
        R: Send,
    {
        assert!(size >= 1, "a worker group needs at least one worker");

        let worlds = build_worlds(size);
        thread::scope(|scope| {
            let f = &f;
            let mut handles = Vec::with_capacity(size);
            for world in worlds {
                let name = format!("worker-{}", world.rank());
                let handle = thread::Builder::new()
                    .name(name)
                    .spawn_scoped(scope, move || f(world))
                    .expect("failed to spawn worker thread");
                handles.push(handle);
            }

            let mut handles = handles.into_iter();
            let root = handles.next().unwrap_or_else(|| unreachable!());
            let root_output = match root.join() {
                Ok(output) => output,
                Err(payload) => panic::resume_unwind(payload),
            };
            for handle in handles {
                if let Err(payload) = handle.join() {
                    panic::resume_unwind(payload);
                }
            }
            root_output
        })
    }
}

/// Wire up one `World` per rank. The root holds a sender to every rank's
/// chunk inbox (its own included); members hold a clone of the sender into
/// the root's value inbox.
fn build_worlds(size: usize) -> Vec<World> {
    let barrier = Arc::new(Barrier::new(size));
    let chunk_channels: Vec<_> = (0..size).map(|_| unbounded::<Vec<f32>>()).collect();
    let chunk_outboxes: Vec<Sender<Vec<f32>>> =
        chunk_channels.iter().map(|(tx, _)| tx.clone()).collect();
    let (value_outbox, value_inbox) = unbounded::<(usize, f32)>();

    chunk_channels
        .into_iter()
        .enumerate()
        .map(|(rank, (_, chunk_inbox))| {
            let role = if rank == 0 {
                Role::Root {
                    chunk_outboxes: chunk_outboxes.clone(),
                    chunk_inbox,
                    value_inbox: value_inbox.clone(),
                }
            } else {
                Role::Member {
                    chunk_inbox,
                    value_outbox: value_outbox.clone(),
                }
            };
            World {
                rank,
                size,
                barrier: Arc::clone(&barrier),
                role,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rank_gets_its_contiguous_chunk() {
        let chunk_len = 3;
        let workers = 4;
        WorkerGroup::run(workers, |world| {
            let full: Option<Vec<f32>> = world
                .is_root()
                .then(|| (0..12).map(|i| i as f32).collect());

            let chunk = world.scatter(full.as_deref(), chunk_len).unwrap();

            // Chunk i is exactly elements [i*K, (i+1)*K) of the dataset, so
            // concatenating the chunks in rank order rebuilds it with no
            // overlap and no gap.
            let start = world.rank() * chunk_len;
            let expected: Vec<f32> = (start..start + chunk_len).map(|i| i as f32).collect();
            assert_eq!(chunk, expected);
        });
    }

    #[test]
    fn gather_orders_values_by_rank() {
        let collected = WorkerGroup::run(5, |world| {
            world.gather(world.rank() as f32 * 10.0).unwrap()
        });
        assert_eq!(collected, Some(vec![0.0, 10.0, 20.0, 30.0, 40.0]));
    }

    #[test]
    fn non_root_gather_receives_nothing() {
        WorkerGroup::run(3, |world| {
            let collected = world.gather(1.0).unwrap();
            assert_eq!(collected.is_some(), world.is_root());
        });
    }

    #[test]
    fn single_worker_collectives_are_identity() {
        WorkerGroup::run(1, |world| {
            let data = vec![0.5, 0.25];
            let chunk = world.scatter(Some(&data), 2).unwrap();
            assert_eq!(chunk, data);

            let collected = world.gather(0.375).unwrap();
            assert_eq!(collected, Some(vec![0.375]));
        });
    }

    #[test]
    fn scatter_rejects_wrong_dataset_length() {
        WorkerGroup::run(1, |world| {
            let data = vec![1.0, 2.0, 3.0];
            let err = world.scatter(Some(&data), 2).unwrap_err();
            assert!(matches!(
                err,
                CollectiveError::DatasetSizeMismatch {
                    expected: 2,
                    actual: 3
                }
            ));
        });
    }

    #[test]
    fn scatter_rejects_empty_chunks() {
        WorkerGroup::run(1, |world| {
            let err = world.scatter(Some(&[]), 0).unwrap_err();
            assert!(matches!(err, CollectiveError::EmptyChunk));
        });
    }
}
