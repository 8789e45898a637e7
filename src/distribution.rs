//! Exact state distribution after a fixed number of turns.

use crate::chain::Chain;
use crate::config::GameConfig;
use crate::error::DuelResult;
use crate::rational::Rational;
use crate::state::{GameState, Player, Rules};
use crate::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub struct StateDistribution {
    rules: Rules,
    turns: usize,
    mass: Vec<Rational>,
}

impl StateDistribution {
    /// All mass on the initial state.
    pub fn initial(rules: Rules) -> Self {
        let mut mass = vec![Rational::zero(); rules.num_states()];
        mass[rules.slot(&rules.initial())] = Rational::one();
        StateDistribution {
            rules,
            turns: 0,
            mass,
        }
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// `None` for a state outside the bound.
    pub fn probability(&self, state: &GameState) -> Option<&Rational> {
        self.rules.index_of(state).map(|i| &self.mass[i])
    }

    pub fn total(&self) -> Rational {
        self.mass.iter().sum()
    }

    fn winner_mass(&self, player: Player) -> Rational {
        self.rules
            .all_states()
            .iter()
            .zip(&self.mass)
            .filter(|(s, _)| self.rules.winner(s) == Some(player))
            .map(|(_, m)| m)
            .sum()
    }

    /// Probability the game is already over with P1 the winner.
    pub fn p1_win_mass(&self) -> Rational {
        self.winner_mass(Player::P1)
    }

    pub fn p2_win_mass(&self) -> Rational {
        self.winner_mass(Player::P2)
    }

    /// `(B+1) x (B+1)` grid indexed `[p1_mine][p1_theirs]`, summed over turn.
    pub fn grid(&self) -> Vec<Vec<Rational>> {
        let side = self.rules.bound as usize + 1;
        let mut grid = vec![vec![Rational::zero(); side]; side];
        for (state, m) in self.rules.all_states().iter().zip(&self.mass) {
            let cell = &mut grid[state.p1_mine as usize][state.p1_theirs as usize];
            *cell = &*cell + m;
        }
        grid
    }

    fn step<S1, S2>(&self, chain: &Chain<'_, S1, S2>) -> DuelResult<StateDistribution>
    where
        S1: Strategy + ?Sized,
        S2: Strategy + ?Sized,
    {
        let mut next = vec![Rational::zero(); self.mass.len()];
        for (state, m) in self.rules.all_states().iter().zip(&self.mass) {
            if m.is_zero() {
                continue;
            }
            let i = self.rules.slot(state);
            if self.rules.is_terminal(state) {
                next[i] = &next[i] + m;
                continue;
            }
            for edge in chain.transitions(state)? {
                let j = self.rules.slot(&edge.to);
                next[j] = &next[j] + &(m * &edge.probability);
            }
        }
        Ok(StateDistribution {
            rules: self.rules,
            turns: self.turns + 1,
            mass: next,
        })
    }
}

/// Push the initial distribution forward `turns` turns. Finished games keep
/// their mass.
pub fn evolve<S1, S2>(
    p1: &S1,
    p2: &S2,
    config: &GameConfig,
    turns: usize,
) -> DuelResult<StateDistribution>
where
    S1: Strategy + ?Sized,
    S2: Strategy + ?Sized,
{
    config.validate()?;
    let chain = Chain::new(p1, p2, config);
    let mut dist = StateDistribution::initial(chain.rules());
    for _ in 0..turns {
        dist = dist.step(&chain)?;
    }
    log::debug!(
        "evolved {} turns, P1 {} / P2 {} finished",
        turns,
        dist.p1_win_mass(),
        dist.p2_win_mass(),
    );
    Ok(dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyId;

    #[test]
    fn test_first_turn_splits_on_coin() {
        let config = GameConfig::default();
        let dist = evolve(&StrategyId::MaxGreed, &StrategyId::MaxGreed, &config, 1).unwrap();
        let half = Some(&Rational::half());
        assert_eq!(dist.probability(&GameState::new(5, 0, Player::P2)), half);
        assert_eq!(dist.probability(&GameState::new(4, 0, Player::P2)), half);
        assert!(dist.total().is_one());
    }

    #[test]
    fn test_grid_marginalises_turn() {
        let config = GameConfig::default();
        let dist = evolve(&StrategyId::Random, &StrategyId::Random, &config, 3).unwrap();
        let grid_total: Rational = dist.grid().iter().flatten().sum();
        assert!(grid_total.is_one());
    }
}
