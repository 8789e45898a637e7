//! Monte Carlo tests, including cross-validation against the exact solver.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use duel_cli::config::{GameConfig, SimulationConfig};
use duel_cli::error::DuelError;
use duel_cli::rational::Rational;
use duel_cli::simulate::{simulate_batch, simulate_many, simulate_one};
use duel_cli::solver::exact_win_probability;
use duel_cli::state::{Player, View};
use duel_cli::strategy::{Copycat, Move, StrategyId};

fn cross_check(p1: StrategyId, p2: StrategyId) {
    let config = GameConfig::default();
    let exact = exact_win_probability(&p1, &p2, &config).unwrap().to_f64();
    let sim = SimulationConfig::new(200_000, Some(42));
    let tally = simulate_batch(&p1, &p2, &config, &sim).unwrap();
    assert_eq!(tally.games(), 200_000);
    assert_abs_diff_eq!(tally.p1_rate(), exact, epsilon = 0.01);
}

#[test]
fn max_greed_vs_defensive_matches_exact() {
    cross_check(StrategyId::MaxGreed, StrategyId::Defensive);
}

#[test]
fn balanced_vs_balanced_matches_exact() {
    cross_check(StrategyId::Balanced, StrategyId::Balanced);
}

#[test]
fn mixed_strategy_matches_exact() {
    cross_check(StrategyId::Random, StrategyId::RandomWithDefendAndAttack);
}

#[test]
fn seeded_batches_are_reproducible() {
    let config = GameConfig::default();
    let sim = SimulationConfig::new(10_000, Some(7));
    let a = simulate_batch(&StrategyId::Random, &StrategyId::Balanced, &config, &sim).unwrap();
    let b = simulate_batch(&StrategyId::Random, &StrategyId::Balanced, &config, &sim).unwrap();
    assert_eq!(a, b);
}

#[test]
fn single_game_reaches_a_winner() {
    let config = GameConfig::default();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let winner = simulate_one(
            &StrategyId::LowGreed,
            &StrategyId::MediumGreedier,
            &config,
            10_000,
            &mut rng,
        )
        .unwrap();
        assert!(winner == Player::P1 || winner == Player::P2);
    }
}

#[test]
fn bound_one_first_shooter_rate() {
    let config = GameConfig::with_bound(1).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let tally = simulate_many(
        &StrategyId::MaxGreed,
        &StrategyId::MaxGreed,
        &config,
        50_000,
        10_000,
        &mut rng,
    )
    .unwrap();
    assert_abs_diff_eq!(tally.p1_rate(), 2.0 / 3.0, epsilon = 0.01);
}

#[test]
fn illegal_move_aborts_simulation() {
    let config = GameConfig::default();
    let always_theirs = |_: View| Move::theirs();
    let mut rng = StdRng::seed_from_u64(5);
    let result = simulate_many(&always_theirs, &StrategyId::MaxGreed, &config, 100, 10_000, &mut rng);
    assert!(matches!(result, Err(DuelError::InvalidMove { .. })));
}

#[test]
fn non_absorbing_game_hits_turn_limit() {
    let config = GameConfig::new(2, Rational::one()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let result = simulate_one(
        &StrategyId::Defensive,
        &StrategyId::Defensive,
        &config,
        1_000,
        &mut rng,
    );
    assert!(matches!(result, Err(DuelError::TurnLimit { turns: 1_000 })));
}

#[test]
fn history_strategy_plays_on_simulation_path() {
    let config = GameConfig::default();
    let sim = SimulationConfig::new(5_000, Some(9));
    let tally = simulate_batch(&Copycat, &StrategyId::Defensive, &config, &sim).unwrap();
    assert_eq!(tally.games(), 5_000);
    assert!(tally.p1 > 0 && tally.p2 > 0);
}
