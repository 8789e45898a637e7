//! The Markov chain induced by a pair of memoryless strategies.

use crate::config::GameConfig;
use crate::error::DuelResult;
use crate::rational::Rational;
use crate::state::{Choice, GameState, Player, Rules};
use crate::strategy::Strategy;

/// One outgoing edge of a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub to: GameState,
    pub probability: Rational,
}

pub struct Chain<'a, S1: ?Sized, S2: ?Sized> {
    p1: &'a S1,
    p2: &'a S2,
    rules: Rules,
    success_rate: Rational,
}

impl<'a, S1, S2> Chain<'a, S1, S2>
where
    S1: Strategy + ?Sized,
    S2: Strategy + ?Sized,
{
    pub fn new(p1: &'a S1, p2: &'a S2, config: &GameConfig) -> Self {
        Chain {
            p1,
            p2,
            rules: config.rules(),
            success_rate: config.success_rate.clone(),
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Outgoing edges with positive probability. Terminal states have none.
    ///
    /// The acting strategy is queried at its own view of the counters and
    /// its move is validated before any edge is produced.
    pub fn transitions(&self, state: &GameState) -> DuelResult<Vec<Transition>> {
        if self.rules.is_terminal(state) {
            return Ok(Vec::new());
        }

        let mut edges = Vec::with_capacity(3);
        let miss = self.success_rate.complement();
        if miss.is_positive() {
            edges.push(Transition {
                to: self.rules.pass(state),
                probability: miss,
            });
        }

        let view = self.rules.view(state, state.turn);
        let mv = match state.turn {
            Player::P1 => self.p1.decide(view),
            Player::P2 => self.p2.decide(view),
        };
        mv.validate(&view)?;

        for choice in [Choice::Mine, Choice::Theirs] {
            let probability = &self.success_rate * mv.weight(choice);
            if probability.is_positive() {
                edges.push(Transition {
                    to: self.rules.apply(state, choice, true)?,
                    probability,
                });
            }
        }
        Ok(edges)
    }
}
