//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: Traverse the tree using UCB to find a leaf
//! 2. Expansion: Add one child for a randomly chosen untried action
//! 3. Simulation: Play uniform-random moves to a terminal or depth-bounded
//!    state and score it with the position heuristic
//! 4. Backpropagation: Update statistics along the path back to the root

use std::time::Instant;

use games_bohnenspiel::{GameState, InvalidActionError, PITS_PER_SIDE};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Rules(#[from] InvalidActionError),

    /// Best-action extraction on a root without children: the search never
    /// ran, or ran zero iterations. Must not be treated as "no move".
    #[error("root has no expanded children")]
    NoExpandedChildren,

    /// Probability extraction with zero total visits.
    #[error("no visits to build a probability vector from")]
    NoVisits,

    /// Expansion requested on a node with no untried actions left.
    #[error("node has no untried actions to expand")]
    NothingToExpand,

    /// A parallel search worker panicked.
    #[error("parallel search worker panicked")]
    WorkerPanic,
}

/// One MCTS engine run: owns a tree and drives iterations over it.
pub struct MctsSearch {
    tree: MctsTree,
    config: MctsConfig,
}

impl MctsSearch {
    /// Create a search with a fresh tree rooted at the given position.
    pub fn new(state: GameState, config: MctsConfig) -> Self {
        Self {
            tree: MctsTree::new(state),
            config,
        }
    }

    /// Create a search over an existing tree, typically one carried forward
    /// across turns by [`crate::reuse::TreeReuse`].
    pub fn from_tree(tree: MctsTree, config: MctsConfig) -> Self {
        Self { tree, config }
    }

    /// Give the tree back, e.g. to stash it for the next turn.
    pub fn into_tree(self) -> MctsTree {
        self.tree
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    /// Run the configured number of iterations, or keep iterating until the
    /// wall-clock budget runs out when one is set.
    ///
    /// The budget is only checked between complete iterations; a running
    /// simulation is never aborted, which is fine because rollouts are
    /// depth-bounded.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let iterations = match self.config.time_budget {
            Some(budget) => {
                let start = Instant::now();
                let mut done = 0u32;
                while start.elapsed() < budget {
                    self.simulate_once(rng)?;
                    done += 1;
                }
                done
            }
            None => {
                for _ in 0..self.config.num_searches {
                    self.simulate_once(rng)?;
                }
                self.config.num_searches
            }
        };

        let stats = self.tree.stats();
        debug!(
            iterations,
            nodes = stats.total_nodes,
            root_visits = stats.root_visits,
            max_depth = stats.max_depth,
            "search finished"
        );
        Ok(())
    }

    /// Run a single iteration (select -> expand -> simulate -> backpropagate).
    fn simulate_once(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        // Selection: descend while fully expanded and not terminal.
        let mut current = self.tree.root();
        loop {
            let node = self.tree.get(current);
            if node.state.is_terminal() || !node.is_fully_expanded() {
                break;
            }
            match self.tree.select_child(current, self.config.exploration) {
                Some(child) => current = child,
                None => break,
            }
        }

        // Expansion: terminal nodes are simulated as they are.
        let leaf = if self.tree.get(current).state.is_terminal() {
            current
        } else {
            self.tree.expand(current, rng)?
        };

        // Simulation + backpropagation.
        let red_favored = rollout(
            self.tree.get(leaf).state,
            self.config.max_rollout_depth,
            rng,
        )?;
        self.tree.backpropagate(leaf, red_favored);

        trace!(leaf = leaf.0, red_favored, "simulation complete");
        Ok(())
    }

    /// The action of the most-visited root child. Visit count, not win rate,
    /// is the robust signal once the budget is spent.
    pub fn best_action(&self) -> Result<u8, SearchError> {
        self.tree
            .best_action()
            .map(|(action, _)| action)
            .ok_or(SearchError::NoExpandedChildren)
    }

    /// Normalized visit-count distribution over all twelve action slots.
    pub fn action_probabilities(&self) -> Result<Vec<f32>, SearchError> {
        let probs = self.tree.root_probabilities();
        if probs.iter().all(|&p| p == 0.0) {
            return Err(SearchError::NoVisits);
        }
        Ok(probs)
    }
}

/// Uniform-random playout from a position, bounded in depth.
///
/// Rollout positions are plain values threaded through the loop; nothing is
/// ever attached to the tree, so rollout depth cannot grow the arena.
fn rollout(
    mut state: GameState,
    max_depth: u32,
    rng: &mut ChaCha20Rng,
) -> Result<bool, SearchError> {
    for _ in 0..max_depth {
        if state.is_terminal() {
            break;
        }
        let legal = state.legal_actions();
        let action = legal[rng.gen_range(0..legal.len())];
        state = state.apply_action(action)?;
    }
    Ok(state.result())
}

/// Convenience entry point: search a position and return the chosen action.
pub fn choose_action(
    state: GameState,
    config: MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<u8, SearchError> {
    let mut search = MctsSearch::new(state, config);
    search.run(rng)?;
    search.best_action()
}

/// Arg-max over the six slots owned by one side of the board.
///
/// Game servers report and accept moves per player, so the caller restricts
/// the probability vector to its own slice before picking.
pub fn best_action_for_side(probs: &[f32], red: bool) -> Option<u8> {
    let offset = if red { 0 } else { PITS_PER_SIDE };
    let slice = probs.get(offset..offset + PITS_PER_SIDE)?;

    let mut best = None;
    let mut best_prob = f32::NEG_INFINITY;
    for (i, &p) in slice.iter().enumerate() {
        if p > best_prob {
            best = Some((offset + i) as u8);
            best_prob = p;
        }
    }
    best
}
