//! Monte Carlo play, used as a statistical cross-check on the exact solver.

use std::fmt;
use std::ops::Add;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{GameConfig, SimulationConfig};
use crate::error::{DuelError, DuelResult};
use crate::state::Player;
use crate::strategy::{HistoryStrategy, Shot};

/// Games per independently seeded chunk in a parallel batch.
const CHUNK_GAMES: usize = 4096;

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub p1: usize,
    pub p2: usize,
}

impl Tally {
    pub fn record(&mut self, winner: Player) {
        match winner {
            Player::P1 => self.p1 += 1,
            Player::P2 => self.p2 += 1,
        }
    }

    pub fn games(&self) -> usize {
        self.p1 + self.p2
    }

    pub fn p1_rate(&self) -> f64 {
        if self.games() == 0 {
            return 0.0;
        }
        self.p1 as f64 / self.games() as f64
    }

    /// Standard error of [`Tally::p1_rate`].
    pub fn standard_error(&self) -> f64 {
        if self.games() == 0 {
            return 0.0;
        }
        let p = self.p1_rate();
        (p * (1.0 - p) / self.games() as f64).sqrt()
    }
}

impl Add for Tally {
    type Output = Tally;
    fn add(self, rhs: Tally) -> Tally {
        Tally {
            p1: self.p1 + rhs.p1,
            p2: self.p2 + rhs.p2,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.games() == 0 {
            return write!(f, "no games");
        }
        write!(
            f,
            "P1 {:.2}% | P2 {:.2}% ({} games, ±{:.2}%)",
            self.p1_rate() * 100.0,
            (1.0 - self.p1_rate()) * 100.0,
            self.games(),
            self.standard_error() * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Single game
// ---------------------------------------------------------------------------

/// Play one game to completion. Each turn draws a coin flip; a hit draws a
/// second uniform value to sample the acting player's move.
pub fn simulate_one<S1, S2, R>(
    p1: &S1,
    p2: &S2,
    config: &GameConfig,
    max_turns: u64,
    rng: &mut R,
) -> DuelResult<Player>
where
    S1: HistoryStrategy + ?Sized,
    S2: HistoryStrategy + ?Sized,
    R: Rng + ?Sized,
{
    let rules = config.rules();
    let success = config.success_rate.to_f64();
    let mut state = rules.initial();
    let mut history: Vec<Shot> = Vec::new();

    for _ in 0..max_turns {
        if let Some(winner) = rules.winner(&state) {
            return Ok(winner);
        }
        if rng.gen::<f64>() >= success {
            state = rules.pass(&state);
            continue;
        }

        let player = state.turn;
        let view = rules.view(&state, player);
        let mv = match player {
            Player::P1 => p1.decide_with_history(view, player, &history),
            Player::P2 => p2.decide_with_history(view, player, &history),
        };
        mv.validate(&view)?;
        let choice = mv.sample(rng.gen::<f64>());
        state = rules.apply(&state, choice, true)?;
        history.push(Shot { player, choice });
    }

    rules
        .winner(&state)
        .ok_or(DuelError::TurnLimit { turns: max_turns })
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// Play `games` independent games on one thread with the given source.
pub fn simulate_many<S1, S2, R>(
    p1: &S1,
    p2: &S2,
    config: &GameConfig,
    games: usize,
    max_turns: u64,
    rng: &mut R,
) -> DuelResult<Tally>
where
    S1: HistoryStrategy + ?Sized,
    S2: HistoryStrategy + ?Sized,
    R: Rng + ?Sized,
{
    let mut tally = Tally::default();
    for _ in 0..games {
        tally.record(simulate_one(p1, p2, config, max_turns, rng)?);
    }
    Ok(tally)
}

fn chunk_seed(base: u64, chunk: usize) -> u64 {
    base.wrapping_add((chunk as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Parallel batch. Games are split into fixed-size chunks, each with its
/// own `StdRng` derived from the seed, so a seeded run gives the same tally
/// regardless of thread count.
pub fn simulate_batch<S1, S2>(
    p1: &S1,
    p2: &S2,
    config: &GameConfig,
    sim: &SimulationConfig,
) -> DuelResult<Tally>
where
    S1: HistoryStrategy + ?Sized,
    S2: HistoryStrategy + ?Sized,
{
    config.validate()?;
    let start = Instant::now();
    let base = sim.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let chunks = sim.games.div_ceil(CHUNK_GAMES);

    let tallies: Vec<Tally> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let games = CHUNK_GAMES.min(sim.games - chunk * CHUNK_GAMES);
            let mut rng = StdRng::seed_from_u64(chunk_seed(base, chunk));
            simulate_many(p1, p2, config, games, sim.max_turns, &mut rng)
        })
        .collect::<DuelResult<Vec<Tally>>>()?;

    let tally = tallies.into_iter().fold(Tally::default(), |acc, t| acc + t);
    log::debug!(
        "simulated {} games in {:.2}s: {}",
        tally.games(),
        start.elapsed().as_secs_f64(),
        tally,
    );
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyId;

    #[test]
    fn test_tally_rates() {
        let tally = Tally { p1: 3, p2: 1 };
        assert_eq!(tally.games(), 4);
        assert!((tally.p1_rate() - 0.75).abs() < 1e-12);
        assert!(tally.standard_error() > 0.0);
        assert_eq!(Tally::default().p1_rate(), 0.0);
    }

    #[test]
    fn test_tally_display() {
        assert_eq!(Tally::default().to_string(), "no games");
        let text = Tally { p1: 1, p2: 3 }.to_string();
        assert!(text.starts_with("P1 25.00% | P2 75.00% (4 games"), "{}", text);
    }

    #[test]
    fn test_chunk_seeds_differ() {
        assert_ne!(chunk_seed(7, 0), chunk_seed(7, 1));
    }

    #[test]
    fn test_certain_hits_greedy_p1_always_wins() {
        let config = GameConfig::new(3, crate::rational::Rational::one()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let tally = simulate_many(
            &StrategyId::MaxGreed,
            &StrategyId::MaxGreed,
            &config,
            50,
            100,
            &mut rng,
        )
        .unwrap();
        assert_eq!(tally, Tally { p1: 50, p2: 0 });
    }
}
