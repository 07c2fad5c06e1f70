//! MCTS configuration parameters.

use std::time::Duration;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of select/expand/simulate/backpropagate iterations per search.
    /// Ignored when a wall-clock budget is set.
    pub num_searches: u32,

    /// Optional wall-clock budget per search. When set, iterations run until
    /// the deadline passes; the deadline is only checked between complete
    /// iterations so node statistics stay internally consistent.
    pub time_budget: Option<Duration>,

    /// Exploration constant for the UCB formula. Higher values favor
    /// under-visited children, lower values favor observed win rates.
    pub exploration: f64,

    /// Maximum rollout length in plies before the position heuristic is
    /// consulted instead of playing on to a terminal state.
    pub max_rollout_depth: u32,

    /// Number of independent workers used by the parallel coordinator.
    pub num_workers: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_searches: 100,
            time_budget: None,
            exploration: std::f64::consts::SQRT_2,
            max_rollout_depth: 50,
            num_workers: 4,
        }
    }
}

impl MctsConfig {
    /// Config for live play: budget-bounded rather than iteration-bounded.
    pub fn for_play() -> Self {
        Self {
            time_budget: Some(Duration::from_millis(1000)),
            ..Self::default()
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_searches: 50,
            ..Self::default()
        }
    }

    /// Builder pattern: set the number of search iterations.
    pub fn with_searches(mut self, n: u32) -> Self {
        self.num_searches = n;
        self
    }

    /// Builder pattern: set a wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the rollout depth bound.
    pub fn with_max_rollout_depth(mut self, plies: u32) -> Self {
        self.max_rollout_depth = plies;
        self
    }

    /// Builder pattern: set the parallel worker count.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }
}
