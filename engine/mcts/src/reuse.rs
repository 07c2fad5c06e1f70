//! Tree reuse across real-game turns.
//!
//! After the opponent plays, the subtree under the matching root child is
//! already partially explored. Carrying it forward as the next search root
//! amortizes search effort across turns, at the cost of biasing future
//! search toward previously favored lines.

use games_bohnenspiel::GameState;
use tracing::debug;

use crate::tree::MctsTree;

/// Holds the search tree between turns and re-roots it as moves are played.
#[derive(Debug, Default)]
pub struct TreeReuse {
    tree: Option<MctsTree>,
}

impl TreeReuse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the position reached by `played` and return the tree to
    /// search from.
    ///
    /// If a tree is held and its root has an expanded child for the played
    /// action, that child is promoted with its statistics intact. Otherwise
    /// (game start, or the opponent played a move the previous search never
    /// expanded) a fresh root is built from the board snapshot.
    pub fn advance(&mut self, snapshot: GameState, played: Option<u8>) -> &mut MctsTree {
        let next = match (self.tree.take(), played) {
            (Some(tree), Some(action)) => {
                let matching = tree
                    .get(tree.root())
                    .children
                    .iter()
                    .copied()
                    .find(|&child| tree.get(child).action == Some(action));

                match matching {
                    Some(child) => {
                        let promoted = tree.promote(child);
                        debug!(
                            action,
                            kept_nodes = promoted.len(),
                            root_visits = promoted.get(promoted.root()).visit_count,
                            "reusing subtree"
                        );
                        promoted
                    }
                    None => {
                        debug!(action, "played move was never expanded, starting fresh");
                        MctsTree::new(snapshot)
                    }
                }
            }
            _ => MctsTree::new(snapshot),
        };

        self.tree.insert(next)
    }

    /// Take the held tree, e.g. to hand it to a search via
    /// [`crate::search::MctsSearch::from_tree`].
    pub fn take(&mut self) -> Option<MctsTree> {
        self.tree.take()
    }

    /// Stash a tree back after searching.
    pub fn put(&mut self, tree: MctsTree) {
        self.tree = Some(tree);
    }

    pub fn tree(&self) -> Option<&MctsTree> {
        self.tree.as_ref()
    }
}
