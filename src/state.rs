//! Game state and transition rules.
//!
//! The full state is `(p1_mine, p1_theirs, turn)`. Player 2's counters are
//! derived through the conservation invariant:
//!
//! ```text
//! p1.mine + p2.theirs == B
//! p2.mine + p1.theirs == B
//! ```
//!
//! A player wins by emptying their own `mine` counter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, DuelResult};

// ---------------------------------------------------------------------------
// Players and choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "P1",
            Player::P2 => "P2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which of the acting player's counters a successful shot decrements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Mine,
    Theirs,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Mine => "mine",
            Choice::Theirs => "theirs",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A player's local view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct View {
    pub mine: u8,
    pub theirs: u8,
    pub bound: u8,
}

impl View {
    /// Shots still needed to win.
    pub fn to_win(&self) -> u8 {
        self.mine
    }

    /// Opponent shots still needed before we lose.
    pub fn to_lose(&self) -> u8 {
        self.bound.saturating_sub(self.theirs)
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub p1_mine: u8,
    pub p1_theirs: u8,
    pub turn: Player,
}

impl GameState {
    pub fn new(p1_mine: u8, p1_theirs: u8, turn: Player) -> Self {
        GameState {
            p1_mine,
            p1_theirs,
            turn,
        }
    }

    /// `None` when `p1_theirs` exceeds `bound`.
    pub fn p2_mine(&self, bound: u8) -> Option<u8> {
        bound.checked_sub(self.p1_theirs)
    }

    pub fn p2_theirs(&self, bound: u8) -> Option<u8> {
        bound.checked_sub(self.p1_mine)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(mine {}, theirs {}, {} to act)",
            self.p1_mine, self.p1_theirs, self.turn
        )
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Transition rules for a fixed counter bound `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub bound: u8,
}

impl Rules {
    pub fn new(bound: u8) -> Self {
        Rules { bound }
    }

    /// `(B, 0, P1)`.
    pub fn initial(&self) -> GameState {
        GameState::new(self.bound, 0, Player::P1)
    }

    pub fn is_terminal(&self, state: &GameState) -> bool {
        self.winner(state).is_some()
    }

    pub fn winner(&self, state: &GameState) -> Option<Player> {
        if state.p1_mine == 0 {
            Some(Player::P1)
        } else if state.p1_theirs == self.bound {
            Some(Player::P2)
        } else {
            None
        }
    }

    /// Both counters within `[0, B]`.
    pub fn contains(&self, state: &GameState) -> bool {
        state.p1_mine <= self.bound && state.p1_theirs <= self.bound
    }

    /// Counters as seen by `player`. P2's counters are clamped at zero for a
    /// state outside the bound.
    pub fn view(&self, state: &GameState, player: Player) -> View {
        match player {
            Player::P1 => View {
                mine: state.p1_mine,
                theirs: state.p1_theirs,
                bound: self.bound,
            },
            Player::P2 => View {
                mine: state.p2_mine(self.bound).unwrap_or(0),
                theirs: state.p2_theirs(self.bound).unwrap_or(0),
                bound: self.bound,
            },
        }
    }

    /// Advance one turn. On success the acting player's `choice` counter
    /// loses a token and the opposite counter of the other player gains it.
    /// The turn always passes.
    pub fn apply(&self, state: &GameState, choice: Choice, success: bool) -> DuelResult<GameState> {
        if !self.contains(state) {
            return Err(DuelError::StateOutOfRange {
                state: *state,
                bound: self.bound,
            });
        }
        if !success {
            return Ok(self.pass(state));
        }
        let turn = state.turn.other();

        let acting = self.view(state, state.turn);
        let available = match choice {
            Choice::Mine => acting.mine,
            Choice::Theirs => acting.theirs,
        };
        if available == 0 {
            return Err(DuelError::CounterUnderflow {
                player: state.turn,
                choice,
            });
        }

        let (p1_mine, p1_theirs) = match (state.turn, choice) {
            (Player::P1, Choice::Mine) => (state.p1_mine - 1, state.p1_theirs),
            (Player::P1, Choice::Theirs) => (state.p1_mine, state.p1_theirs - 1),
            // P2's mine token lands in P1's theirs counter.
            (Player::P2, Choice::Mine) => (state.p1_mine, state.p1_theirs + 1),
            (Player::P2, Choice::Theirs) => (state.p1_mine + 1, state.p1_theirs),
        };
        Ok(GameState::new(p1_mine, p1_theirs, turn))
    }

    /// A missed shot: counters unchanged, turn passes.
    pub fn pass(&self, state: &GameState) -> GameState {
        GameState {
            turn: state.turn.other(),
            ..*state
        }
    }

    /// Every state with both counters in `[0, B]`, ordered by
    /// `(p1_mine, p1_theirs, turn)`.
    pub fn all_states(&self) -> Vec<GameState> {
        use itertools::iproduct;
        iproduct!(0..=self.bound, 0..=self.bound, [Player::P1, Player::P2])
            .map(|(mine, theirs, turn)| GameState::new(mine, theirs, turn))
            .collect()
    }

    /// Position of `state` in [`Rules::all_states`], `None` outside the bound.
    pub fn index_of(&self, state: &GameState) -> Option<usize> {
        self.contains(state).then(|| self.slot(state))
    }

    /// Unchecked [`Rules::index_of`] for states known to be in range.
    pub(crate) fn slot(&self, state: &GameState) -> usize {
        let side = self.bound as usize + 1;
        (state.p1_mine as usize * side + state.p1_theirs as usize) * 2 + state.turn.index()
    }

    pub fn num_states(&self) -> usize {
        let side = self.bound as usize + 1;
        side * side * 2
    }
}
