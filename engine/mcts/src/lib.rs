//! Monte Carlo Tree Search engine for Bohnenspiel.
//!
//! This crate chooses moves for an autonomous Bohnenspiel player. Each
//! search builds a tree over [`games_bohnenspiel::GameState`] positions by
//! running simulations, and each simulation consists of four phases:
//!
//! 1. **Selection**: Traverse the tree using UCB (Upper Confidence Bound)
//!    to balance exploration and exploitation
//! 2. **Expansion**: Add one child for a randomly chosen untried action
//! 3. **Simulation**: Play uniform-random moves to a terminal or
//!    depth-bounded position and score it with the game's heuristic
//! 4. **Backpropagation**: Update visit and win counts along the path from
//!    leaf to root
//!
//! # Usage
//!
//! ```
//! use games_bohnenspiel::GameState;
//! use mcts::{choose_action, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let action = choose_action(GameState::new(), MctsConfig::for_testing(), &mut rng).unwrap();
//! assert!(action < 6);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_searches`: iterations per search (default: 100)
//! - `time_budget`: optional wall-clock bound replacing the iteration count
//! - `exploration`: UCB exploration constant (default: sqrt 2)
//! - `max_rollout_depth`: rollout ply bound (default: 50)
//! - `num_workers`: threads used by the parallel coordinator (default: 4)
//!
//! # Beyond a single search
//!
//! [`ParallelSearchCoordinator`] runs several independent searches from the
//! same position on a fixed thread pool and collects their probability
//! vectors. [`TreeReuse`] carries the subtree behind the move actually
//! played forward to the next turn, so successive searches do not start
//! from scratch.

pub mod config;
pub mod node;
pub mod parallel;
pub mod reuse;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use node::{MctsNode, NodeId};
pub use parallel::ParallelSearchCoordinator;
pub use reuse::TreeReuse;
pub use search::{best_action_for_side, choose_action, MctsSearch, SearchError};
pub use tree::{MctsTree, TreeStats};
