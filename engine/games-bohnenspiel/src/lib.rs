//! Bohnenspiel game implementation
//!
//! Bohnenspiel is a Mancala-style sowing game played on twelve pits, six per
//! player, each starting with six beans. A move empties one of the mover's
//! pits and distributes its beans one-by-one around the board; captures are
//! taken backward from the last sown pit while it holds exactly 2, 4 or 6
//! beans. The first player to bank more than half of the 72 beans wins.
//!
//! # Usage
//!
//! ```
//! use games_bohnenspiel::GameState;
//!
//! let state = GameState::new();
//! assert!(!state.is_terminal());
//!
//! // Red opens with the third pit.
//! let next = state.apply_action(2).unwrap();
//! assert!(!next.red_to_move());
//! ```

use std::fmt;

use thiserror::Error;

/// Number of pits on the board.
pub const NUM_PITS: usize = 12;

/// Pits per player; red owns indices 0-5, blue owns 6-11.
pub const PITS_PER_SIDE: usize = 6;

/// Beans in every pit at the start of the game.
pub const INITIAL_BEANS: u8 = 6;

/// Total beans in the game. `sum(pits) + score_red + score_blue` equals this
/// for every reachable state.
pub const TOTAL_BEANS: u32 = NUM_PITS as u32 * INITIAL_BEANS as u32;

/// Rejected move. Validation happens before any board mutation, so a failed
/// action never leaves a partially sown board behind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidActionError {
    #[error("pit index {0} is outside 0..12")]
    OutOfRange(u8),

    #[error("pit {0} belongs to the opponent")]
    WrongSide(u8),

    #[error("pit {0} is empty")]
    EmptyPit(u8),
}

/// One Bohnenspiel position: board, banked scores and whose turn it is.
///
/// States are immutable values. [`GameState::apply_action`] returns a fresh
/// state and never mutates the receiver, so a state can be shared freely
/// between the real game and any number of search trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pits: [u8; NUM_PITS],
    score_red: u8,
    score_blue: u8,
    red_to_move: bool,
}

impl GameState {
    /// Initial position: every pit holds six beans, scores are zero, red
    /// moves first.
    pub fn new() -> Self {
        Self {
            pits: [INITIAL_BEANS; NUM_PITS],
            score_red: 0,
            score_blue: 0,
            red_to_move: true,
        }
    }

    /// Build a state from explicit parts. Used to resume a game from an
    /// external board snapshot and to set up test positions.
    pub fn from_parts(pits: [u8; NUM_PITS], score_red: u8, score_blue: u8, red_to_move: bool) -> Self {
        Self {
            pits,
            score_red,
            score_blue,
            red_to_move,
        }
    }

    pub fn pits(&self) -> &[u8; NUM_PITS] {
        &self.pits
    }

    pub fn score_red(&self) -> u8 {
        self.score_red
    }

    pub fn score_blue(&self) -> u8 {
        self.score_blue
    }

    pub fn red_to_move(&self) -> bool {
        self.red_to_move
    }

    /// Non-empty pits on the mover's side.
    ///
    /// An empty result means the position is terminal for the current mover
    /// only; the opponent's side may still hold beans.
    pub fn legal_actions(&self) -> Vec<u8> {
        let (start, end) = if self.red_to_move {
            (0, PITS_PER_SIDE)
        } else {
            (PITS_PER_SIDE, NUM_PITS)
        };

        (start..end)
            .filter(|&i| self.pits[i] > 0)
            .map(|i| i as u8)
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.legal_actions().is_empty()
    }

    /// Sow the chosen pit and resolve captures, returning the next position.
    ///
    /// The pit is emptied and its beans distributed one per pit going forward
    /// around the cycle (11 wraps to 0). Starting from the last sown pit and
    /// walking backward (0 wraps to 11), every pit holding exactly 2, 4 or 6
    /// beans is emptied into the mover's score; the walk stops at the first
    /// pit with any other count. The turn then passes to the opponent.
    pub fn apply_action(&self, action: u8) -> Result<GameState, InvalidActionError> {
        let pit = action as usize;
        if pit >= NUM_PITS {
            return Err(InvalidActionError::OutOfRange(action));
        }
        if (pit < PITS_PER_SIDE) != self.red_to_move {
            return Err(InvalidActionError::WrongSide(action));
        }
        if self.pits[pit] == 0 {
            return Err(InvalidActionError::EmptyPit(action));
        }

        let mut next = *self;
        let mut beans = next.pits[pit];
        next.pits[pit] = 0;

        let mut i = pit;
        while beans > 0 {
            i = (i + 1) % NUM_PITS;
            next.pits[i] += 1;
            beans -= 1;
        }

        while matches!(next.pits[i], 2 | 4 | 6) {
            if self.red_to_move {
                next.score_red += next.pits[i];
            } else {
                next.score_blue += next.pits[i];
            }
            next.pits[i] = 0;
            i = if i == 0 { NUM_PITS - 1 } else { i - 1 };
        }

        next.red_to_move = !self.red_to_move;
        Ok(next)
    }

    /// Whether the position favors red.
    ///
    /// A banked score above half the beans decides outright. Otherwise each
    /// player is credited the beans still sitting on their side and the
    /// totals are compared, with ties favoring red. Besides scoring terminal
    /// positions this doubles as the evaluator for depth-bounded rollouts.
    pub fn result(&self) -> bool {
        if u32::from(self.score_red) > TOTAL_BEANS / 2 {
            return true;
        }
        if u32::from(self.score_blue) > TOTAL_BEANS / 2 {
            return false;
        }

        let red = u32::from(self.score_red) + self.side_beans(true);
        let blue = u32::from(self.score_blue) + self.side_beans(false);
        red >= blue
    }

    /// Beans currently sitting in one player's six pits.
    pub fn side_beans(&self, red: bool) -> u32 {
        let (start, end) = if red {
            (0, PITS_PER_SIDE)
        } else {
            (PITS_PER_SIDE, NUM_PITS)
        };
        self.pits[start..end].iter().map(|&b| u32::from(b)).sum()
    }

    /// Beans not yet banked by either player.
    pub fn beans_in_play(&self) -> u32 {
        self.pits.iter().map(|&b| u32::from(b)).sum()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    /// Blue's row on top in reverse, red's row below, with banked scores.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "blue: {}", self.score_blue)?;
        for i in (PITS_PER_SIDE..NUM_PITS).rev() {
            if i == PITS_PER_SIDE {
                writeln!(f, "{}", self.pits[i])?;
            } else {
                write!(f, "{}; ", self.pits[i])?;
            }
        }
        for i in 0..PITS_PER_SIDE {
            if i == PITS_PER_SIDE - 1 {
                writeln!(f, "{}", self.pits[i])?;
            } else {
                write!(f, "{}; ", self.pits[i])?;
            }
        }
        write!(f, "red: {}", self.score_red)
    }
}

/// Translate a 1-based field number, as reported by game servers, into a
/// 0-based action index. Returns `None` for fields outside 1..=12.
pub fn action_from_field(field: u8) -> Option<u8> {
    if (1..=NUM_PITS as u8).contains(&field) {
        Some(field - 1)
    } else {
        None
    }
}

/// Translate a 0-based action index back into a 1-based field number.
pub fn field_from_action(action: u8) -> u8 {
    action + 1
}
