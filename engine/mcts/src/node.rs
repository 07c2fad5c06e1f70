//! MCTS tree node representation.
//!
//! Each node represents a game state reached by taking an action from the
//! parent. Nodes store visit counts and one win tally per player; which
//! tally the UCB formula reads is decided by the parent's mover.

use games_bohnenspiel::GameState;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Action that led to this node from the parent (`None` for the root)
    pub action: Option<u8>,

    /// Game state at this node
    pub state: GameState,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Backpropagated outcomes favoring red
    pub wins_red: u32,

    /// Backpropagated outcomes favoring blue
    pub wins_blue: u32,

    /// Children indices. Empty until the node is expanded.
    pub children: Vec<NodeId>,

    /// Legal actions not yet expanded into a child. Materialized from the
    /// state on first expansion.
    pub(crate) untried: Option<Vec<u8>>,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(state: GameState) -> Self {
        Self {
            parent: NodeId::NONE,
            action: None,
            state,
            visit_count: 0,
            wins_red: 0,
            wins_blue: 0,
            children: Vec::new(),
            untried: None,
        }
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, action: u8, state: GameState) -> Self {
        Self {
            parent,
            action: Some(action),
            state,
            ..Self::new_root(state)
        }
    }

    /// Record one backpropagated outcome at this node.
    pub fn update_stats(&mut self, red_favored: bool) {
        if red_favored {
            self.wins_red += 1;
        } else {
            self.wins_blue += 1;
        }
        self.visit_count += 1;
    }

    /// Calculate the UCB score of this node as a child of a given parent.
    ///
    /// The win tally read here belongs to the **parent's** mover, not this
    /// node's: the statistic measures how good it was for the player who just
    /// moved into this node. Outcomes are stored unflipped during
    /// backpropagation, so this per-mover read is what makes the formula
    /// zero-sum aware.
    ///
    /// Only evaluated on children of fully-expanded nodes, which guarantees
    /// `visit_count >= 1` and keeps the divisions well defined.
    #[inline]
    pub fn ucb_score(&self, parent_visits: u32, parent_red_to_move: bool, c: f64) -> f64 {
        let wins = if parent_red_to_move {
            self.wins_red
        } else {
            self.wins_blue
        };
        let win_rate = f64::from(wins) / f64::from(self.visit_count);
        let exploration = (f64::from(parent_visits).ln() / f64::from(self.visit_count)).sqrt();
        win_rate + c * exploration
    }

    /// A node is fully expanded once every legal action has a child.
    pub fn is_fully_expanded(&self) -> bool {
        match &self.untried {
            Some(untried) => untried.is_empty(),
            None => self.children.len() == self.state.legal_actions().len(),
        }
    }
}
