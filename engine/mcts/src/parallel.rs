//! Root-parallel search coordinator.
//!
//! Runs several fully independent searches from the same starting position,
//! one per OS thread. Each worker owns a private tree and a private RNG, so
//! no locking is needed anywhere; the coordinator only collects the finished
//! probability vectors, in worker order. Merging them (averaging, voting,
//! picking one) is deliberately left to the caller.

use std::thread;

use games_bohnenspiel::GameState;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::config::MctsConfig;
use crate::search::{MctsSearch, SearchError};

/// Fans one position out to `config.num_workers` independent searches.
pub struct ParallelSearchCoordinator {
    config: MctsConfig,
}

impl ParallelSearchCoordinator {
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }

    /// Search the position on every worker and return one probability vector
    /// per worker, in worker order.
    ///
    /// Worker RNGs are derived deterministically from `seed`, so a given
    /// seed reproduces the whole parallel run. All workers are joined before
    /// returning; if any worker fails, the first failure is surfaced and no
    /// partial results are handed out.
    pub fn search(&self, state: GameState, seed: u64) -> Result<Vec<Vec<f32>>, SearchError> {
        let results: Vec<Result<Vec<f32>, SearchError>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.config.num_workers)
                .map(|worker| {
                    let config = self.config.clone();
                    scope.spawn(move || {
                        let mut rng = ChaCha20Rng::seed_from_u64(seed.wrapping_add(worker as u64));
                        let mut search = MctsSearch::new(state, config);
                        search.run(&mut rng)?;
                        search.action_probabilities()
                    })
                })
                .collect();

            // Join every worker before looking at any result.
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(Err(SearchError::WorkerPanic)))
                .collect()
        });

        debug!(workers = results.len(), "parallel search joined");
        results.into_iter().collect()
    }
}
