//! Dataset generation for the root worker.

use rand::Rng;

/// Draw `len` values independently and uniformly from `[0, 1)`.
///
/// Only the root calls this; the full dataset never exists anywhere else.
pub fn random_dataset(len: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen::<f32>()).collect()
}
