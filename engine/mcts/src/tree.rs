//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec and
//! referenced by NodeId indices, so parent back-references cost nothing to
//! follow during backpropagation and no ownership cycles exist.

use std::collections::VecDeque;

use games_bohnenspiel::GameState;
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::node::{MctsNode, NodeId};
use crate::search::SearchError;

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree rooted at the given position.
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select the best child of a node using UCB; ties go to the first
    /// maximal child in insertion order.
    ///
    /// Only called on fully-expanded, non-terminal nodes, so every child
    /// already carries at least one visit.
    pub fn select_child(&self, node_id: NodeId, c: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.visit_count;
        let parent_red_to_move = node.state.red_to_move();

        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &child_id in &node.children {
            let score = self
                .get(child_id)
                .ucb_score(parent_visits, parent_red_to_move, c);
            if score > best_score {
                best = Some(child_id);
                best_score = score;
            }
        }
        best
    }

    /// Expand a node by one child: remove an untried action uniformly at
    /// random, apply it, and allocate the resulting node.
    ///
    /// The untried-action list is materialized from the node's legal actions
    /// on the first call.
    pub fn expand(&mut self, node_id: NodeId, rng: &mut ChaCha20Rng) -> Result<NodeId, SearchError> {
        let node = self.get_mut(node_id);
        let mut untried = node
            .untried
            .take()
            .unwrap_or_else(|| node.state.legal_actions());

        if untried.is_empty() {
            node.untried = Some(untried);
            return Err(SearchError::NothingToExpand);
        }

        let action = untried.swap_remove(rng.gen_range(0..untried.len()));
        node.untried = Some(untried);
        let child_state = node.state.apply_action(action)?;

        let child_id = self.allocate(MctsNode::new_child(node_id, action, child_state));
        self.get_mut(node_id).children.push(child_id);
        Ok(child_id)
    }

    /// Backpropagate one simulation outcome from a leaf to the root,
    /// inclusive.
    ///
    /// The same outcome value is recorded at every level; no sign flipping
    /// happens here because selection reads the tally belonging to the
    /// parent's mover.
    pub fn backpropagate(&mut self, leaf_id: NodeId, red_favored: bool) {
        let mut current = leaf_id;
        while current.is_some() {
            let node = self.get_mut(current);
            node.update_stats(red_favored);
            current = node.parent;
        }
    }

    /// Re-root the tree on a child, keeping that child's entire subtree and
    /// accumulated statistics while discarding everything else.
    ///
    /// The subtree is copied into a fresh arena in breadth-first order; the
    /// promoted node loses its incoming action and parent link, becoming a
    /// proper root.
    pub fn promote(self, new_root: NodeId) -> MctsTree {
        let mut nodes: Vec<MctsNode> = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back((new_root, NodeId::NONE));

        while let Some((old_id, new_parent)) = queue.pop_front() {
            let old = &self.nodes[old_id.0 as usize];
            let new_id = NodeId(nodes.len() as u32);

            let mut node = old.clone();
            node.parent = new_parent;
            node.children = Vec::with_capacity(old.children.len());
            nodes.push(node);

            if new_parent.is_some() {
                nodes[new_parent.0 as usize].children.push(new_id);
            }
            for &child in &old.children {
                queue.push_back((child, new_id));
            }
        }

        if let Some(root) = nodes.first_mut() {
            root.action = None;
        }

        MctsTree {
            nodes,
            root: NodeId(0),
        }
    }

    /// Get the most visited root child as `(action, visit_count)`, or `None`
    /// if the root has no children.
    pub fn best_action(&self) -> Option<(u8, u32)> {
        let root = self.get(self.root);
        root.children
            .iter()
            .filter_map(|&id| {
                let child = self.get(id);
                child.action.map(|a| (a, child.visit_count))
            })
            .max_by_key(|&(_, visits)| visits)
    }

    /// Visit-count distribution over all twelve action slots, normalized to
    /// sum to 1. Slots without an expanded child stay at zero; an all-zero
    /// vector comes back when the root has no visits to distribute.
    pub fn root_probabilities(&self) -> Vec<f32> {
        let mut probs = vec![0.0f32; games_bohnenspiel::NUM_PITS];
        let root = self.get(self.root);

        let mut total = 0.0f32;
        for &id in &root.children {
            let child = self.get(id);
            if let Some(action) = child.action {
                probs[action as usize] = child.visit_count as f32;
                total += child.visit_count as f32;
            }
        }

        if total > 0.0 {
            for p in &mut probs {
                *p /= total;
            }
        }
        probs
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: self.get(self.root).visit_count,
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        node.children
            .iter()
            .map(|&id| self.compute_max_depth(id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(GameState::new());

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.state, GameState::new());
    }

    #[test]
    fn test_expand_adds_legal_children() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let child_id = tree.expand(tree.root(), &mut rng).unwrap();
        assert_eq!(tree.len(), 2);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert!(matches!(child.action, Some(a) if a < 6));
        assert!(!child.state.red_to_move());
        assert_eq!(tree.get(tree.root()).children, vec![child_id]);
    }

    #[test]
    fn test_expand_never_exceeds_legal_actions() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();
        let legal = GameState::new().legal_actions().len();

        for n in 1..=legal {
            tree.expand(tree.root(), &mut rng).unwrap();
            let root = tree.get(tree.root());
            assert_eq!(root.children.len(), n);
            assert_eq!(root.is_fully_expanded(), n == legal);
        }

        // Every legal action has a child; a further expansion is a logic
        // error and must be reported, not silently absorbed.
        assert!(matches!(
            tree.expand(tree.root(), &mut rng),
            Err(SearchError::NothingToExpand)
        ));
        assert_eq!(tree.get(tree.root()).children.len(), legal);

        // All six children carry distinct actions.
        let mut actions: Vec<_> = tree
            .get(tree.root())
            .children
            .iter()
            .filter_map(|&id| tree.get(id).action)
            .collect();
        actions.sort_unstable();
        assert_eq!(actions, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_backpropagate_walks_to_root() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let child = tree.expand(tree.root(), &mut rng).unwrap();
        let grandchild = tree.expand(child, &mut rng).unwrap();

        tree.backpropagate(grandchild, true);
        tree.backpropagate(grandchild, false);

        for id in [grandchild, child, tree.root()] {
            let node = tree.get(id);
            assert_eq!(node.visit_count, 2);
            assert_eq!(node.wins_red, 1);
            assert_eq!(node.wins_blue, 1);
        }
    }

    #[test]
    fn test_select_child_prefers_winning_tally() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let first = tree.expand(tree.root(), &mut rng).unwrap();
        let second = tree.expand(tree.root(), &mut rng).unwrap();

        // Equal visits, different red tallies; the root is red to move.
        tree.backpropagate(first, true);
        tree.backpropagate(second, false);

        // Exploration terms are equal, so the red win decides.
        assert_eq!(tree.select_child(tree.root(), 0.5), Some(first));
    }

    #[test]
    fn test_select_child_ties_break_to_first() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let first = tree.expand(tree.root(), &mut rng).unwrap();
        let second = tree.expand(tree.root(), &mut rng).unwrap();

        tree.backpropagate(first, true);
        tree.backpropagate(second, true);

        assert_eq!(
            tree.select_child(tree.root(), std::f64::consts::SQRT_2),
            Some(first)
        );
    }

    #[test]
    fn test_promote_keeps_subtree_statistics() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let child = tree.expand(tree.root(), &mut rng).unwrap();
        let grandchild = tree.expand(child, &mut rng).unwrap();
        let sibling = tree.expand(tree.root(), &mut rng).unwrap();

        tree.backpropagate(grandchild, true);
        tree.backpropagate(grandchild, true);
        tree.backpropagate(sibling, false);

        let kept_state = tree.get(child).state;
        let kept_visits = tree.get(child).visit_count;
        let grandchild_action = tree.get(grandchild).action;

        let promoted = tree.promote(child);

        // The sibling subtree is gone; child and grandchild survive.
        assert_eq!(promoted.len(), 2);

        let root = promoted.get(promoted.root());
        assert!(root.parent.is_none());
        assert_eq!(root.action, None);
        assert_eq!(root.state, kept_state);
        assert_eq!(root.visit_count, kept_visits);
        assert_eq!(root.wins_red, 2);

        assert_eq!(root.children.len(), 1);
        let carried = promoted.get(root.children[0]);
        assert_eq!(carried.action, grandchild_action);
        assert_eq!(carried.parent, promoted.root());
        assert_eq!(carried.visit_count, 2);
    }

    #[test]
    fn test_best_action_tracks_visits() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        assert_eq!(tree.best_action(), None);

        let first = tree.expand(tree.root(), &mut rng).unwrap();
        let second = tree.expand(tree.root(), &mut rng).unwrap();

        tree.backpropagate(first, true);
        tree.backpropagate(second, true);
        tree.backpropagate(second, false);

        let expected = tree.get(second).action.unwrap();
        assert_eq!(tree.best_action(), Some((expected, 2)));
    }

    #[test]
    fn test_root_probabilities_normalize() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let first = tree.expand(tree.root(), &mut rng).unwrap();
        let second = tree.expand(tree.root(), &mut rng).unwrap();
        for _ in 0..3 {
            tree.backpropagate(first, true);
        }
        tree.backpropagate(second, false);

        let probs = tree.root_probabilities();
        assert_eq!(probs.len(), 12);

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let first_action = tree.get(first).action.unwrap() as usize;
        assert!((probs[first_action] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_root_probabilities_zero_without_visits() {
        let tree = MctsTree::new(GameState::new());
        assert!(tree.root_probabilities().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MctsTree::new(GameState::new());
        let mut rng = rng();

        let child = tree.expand(tree.root(), &mut rng).unwrap();
        let grandchild = tree.expand(child, &mut rng).unwrap();
        tree.backpropagate(grandchild, true);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.root_visits, 1);
        assert_eq!(stats.max_depth, 2);
    }
}
