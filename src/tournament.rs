//! Round-robin tournament: P1 win probability for every ordered pair of
//! catalogue strategies. Pairings are independent, so they are solved or
//! simulated in parallel.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{GameConfig, SimulationConfig};
use crate::error::DuelResult;
use crate::rational::Rational;
use crate::simulate::simulate_batch;
use crate::solver::exact_win_probability;
use crate::strategy::StrategyId;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Exact,
    Simulated { games: usize, seed: u64 },
}

impl Mode {
    pub fn label(&self) -> String {
        match self {
            Mode::Exact => "exact".to_string(),
            Mode::Simulated { games, .. } => format!("simulated ({} games per pairing)", games),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pairing {
    pub p1: &'static str,
    pub p2: &'static str,
    /// P1 win probability in `[0, 1]`.
    pub p1_win: f64,
    /// Present in exact mode.
    pub exact: Option<Rational>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentTable {
    pub mode: String,
    pub bound: u8,
    pub success_rate: Rational,
    pub strategies: Vec<&'static str>,
    /// Row-major: `pairings[row * n + col]` has P1 = row, P2 = col.
    pub pairings: Vec<Pairing>,
}

impl TournamentTable {
    pub fn size(&self) -> usize {
        self.strategies.len()
    }

    pub fn get(&self, p1: usize, p2: usize) -> &Pairing {
        &self.pairings[p1 * self.size() + p2]
    }

    /// Average P1 win rate of each strategy across all P2 opponents.
    pub fn row_means(&self) -> Vec<f64> {
        let n = self.size();
        (0..n)
            .map(|i| (0..n).map(|j| self.get(i, j).p1_win).sum::<f64>() / n as f64)
            .collect()
    }

    pub fn write_csv<W: Write>(&self, mut out: W) -> DuelResult<()> {
        writeln!(out, "Player 1 Strategy,{}", self.strategies.join(","))?;
        for (i, name) in self.strategies.iter().enumerate() {
            let cells: Vec<String> = (0..self.size())
                .map(|j| format!("{:.2}", self.get(i, j).p1_win * 100.0))
                .collect();
            writeln!(out, "{},{}", name, cells.join(","))?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> DuelResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    pub fn save_json(&self, path: &Path) -> DuelResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn pairing_seed(seed: u64, row: usize, col: usize) -> u64 {
    seed ^ ((row as u64) << 32 | col as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93)
}

fn play_pairing(
    p1: StrategyId,
    p2: StrategyId,
    row: usize,
    col: usize,
    mode: &Mode,
    config: &GameConfig,
) -> DuelResult<Pairing> {
    let (p1_win, exact) = match mode {
        Mode::Exact => {
            let exact = exact_win_probability(&p1, &p2, config)?;
            (exact.to_f64(), Some(exact))
        }
        Mode::Simulated { games, seed } => {
            let sim = SimulationConfig::new(*games, Some(pairing_seed(*seed, row, col)));
            let tally = simulate_batch(&p1, &p2, config, &sim)?;
            (tally.p1_rate(), None)
        }
    };
    Ok(Pairing {
        p1: p1.as_str(),
        p2: p2.as_str(),
        p1_win,
        exact,
    })
}

pub fn tournament(
    strategies: &[StrategyId],
    mode: &Mode,
    config: &GameConfig,
) -> DuelResult<TournamentTable> {
    config.validate()?;
    let n = strategies.len();
    let start = Instant::now();
    log::info!(
        "tournament: {} strategies, {} pairings, {}",
        n,
        n * n,
        mode.label()
    );

    let pairings = (0..n * n)
        .into_par_iter()
        .map(|k| {
            let (row, col) = (k / n, k % n);
            play_pairing(strategies[row], strategies[col], row, col, mode, config)
        })
        .collect::<DuelResult<Vec<Pairing>>>()?;

    log::info!(
        "tournament finished in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    Ok(TournamentTable {
        mode: mode.label(),
        bound: config.bound,
        success_rate: config.success_rate.clone(),
        strategies: strategies.iter().map(|s| s.as_str()).collect(),
        pairings,
    })
}
