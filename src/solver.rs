//! Exact outcome solver.
//!
//! For every state `i` the P1 win probability satisfies the first-step
//! recursion `x_i = sum_j P(i -> j) * x_j`, with terminal states pinned to
//! their outcome. Rearranged as `(I - P) x = r` and solved by Gaussian
//! elimination over exact rationals:
//!
//! ```text
//! terminal row:      x_i                      = 1 (P1 won) or 0 (P2 won)
//! non-terminal row:  x_i - sum_j P(i->j) x_j  = 0
//! ```

use std::time::Instant;

use crate::chain::Chain;
use crate::config::GameConfig;
use crate::error::{DuelError, DuelResult};
use crate::rational::Rational;
use crate::state::{GameState, Player, Rules};
use crate::strategy::Strategy;

// ---------------------------------------------------------------------------
// Dense matrix
// ---------------------------------------------------------------------------

/// Square row-major matrix of rationals.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<Rational>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Matrix {
            n,
            data: vec![Rational::zero(); n * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n);
        for i in 0..n {
            m.data[i * n + i] = Rational::one();
        }
        m
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> &Rational {
        &self.data[row * self.n + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Rational) {
        self.data[row * self.n + col] = value;
    }

    /// `m[row][col] -= value`.
    pub fn subtract_at(&mut self, row: usize, col: usize, value: &Rational) {
        let cell = &mut self.data[row * self.n + col];
        *cell = &*cell - value;
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.n {
            self.data.swap(a * self.n + col, b * self.n + col);
        }
    }

    pub fn scale_row(&mut self, row: usize, factor: &Rational) {
        for cell in &mut self.data[row * self.n..(row + 1) * self.n] {
            if !cell.is_zero() {
                *cell = &*cell * factor;
            }
        }
    }

    /// `row[target] -= factor * row[source]`, for columns `from..n`.
    pub fn combine_rows(&mut self, target: usize, source: usize, factor: &Rational, from: usize) {
        for col in from..self.n {
            let s = &self.data[source * self.n + col];
            if s.is_zero() {
                continue;
            }
            let delta = factor * s;
            let cell = &mut self.data[target * self.n + col];
            *cell = &*cell - &delta;
        }
    }
}

// ---------------------------------------------------------------------------
// Linear system
// ---------------------------------------------------------------------------

/// `A x = b`. Owns both sides; solving consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    pub a: Matrix,
    pub b: Vec<Rational>,
}

impl LinearSystem {
    pub fn new(a: Matrix, b: Vec<Rational>) -> DuelResult<Self> {
        if a.size() != b.len() {
            return Err(DuelError::InvalidValue(format!(
                "Matrix is {0}x{0} but right-hand side has {1} entries",
                a.size(),
                b.len()
            )));
        }
        Ok(LinearSystem { a, b })
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        self.a.swap_rows(i, j);
        self.b.swap(i, j);
    }

    /// Gaussian elimination with row pivoting on the first nonzero entry.
    pub fn solve(mut self) -> DuelResult<Vec<Rational>> {
        let n = self.a.size();

        // Forward elimination to unit upper triangular form.
        for i in 0..n {
            if self.a.get(i, i).is_zero() {
                let pivot_row = (i + 1..n)
                    .find(|&j| !self.a.get(j, i).is_zero())
                    .ok_or(DuelError::SingularSystem { column: i })?;
                self.swap_rows(i, pivot_row);
            }

            let inverse = Rational::one().checked_div(self.a.get(i, i))?;
            self.a.scale_row(i, &inverse);
            self.b[i] = &self.b[i] * &inverse;

            for j in i + 1..n {
                let factor = self.a.get(j, i).clone();
                if factor.is_zero() {
                    continue;
                }
                self.a.combine_rows(j, i, &factor, i);
                let delta = &factor * &self.b[i];
                self.b[j] = &self.b[j] - &delta;
            }
        }

        // Back substitution.
        let mut x = vec![Rational::zero(); n];
        for i in (0..n).rev() {
            let mut value = self.b[i].clone();
            for j in i + 1..n {
                let coeff = self.a.get(i, j);
                if !coeff.is_zero() {
                    value = value - coeff * &x[j];
                }
            }
            x[i] = value;
        }
        Ok(x)
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Encode the absorption equations for every state of the chain.
pub fn build_system<S1, S2>(chain: &Chain<'_, S1, S2>) -> DuelResult<LinearSystem>
where
    S1: Strategy + ?Sized,
    S2: Strategy + ?Sized,
{
    let rules = chain.rules();
    let n = rules.num_states();
    let mut a = Matrix::identity(n);
    let mut b = vec![Rational::zero(); n];

    for (i, state) in rules.all_states().iter().enumerate() {
        if let Some(winner) = rules.winner(state) {
            if winner == Player::P1 {
                b[i] = Rational::one();
            }
            continue;
        }
        for edge in chain.transitions(state)? {
            a.subtract_at(i, rules.slot(&edge.to), &edge.probability);
        }
    }

    LinearSystem::new(a, b)
}

/// P1 win probability from every state.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactSolution {
    rules: Rules,
    values: Vec<Rational>,
}

impl ExactSolution {
    /// `None` for a state outside the bound.
    pub fn from_state(&self, state: &GameState) -> Option<&Rational> {
        self.rules.index_of(state).map(|i| &self.values[i])
    }

    /// Value at `(B, 0, P1)`.
    pub fn initial(&self) -> &Rational {
        &self.values[self.rules.slot(&self.rules.initial())]
    }

    pub fn values(&self) -> &[Rational] {
        &self.values
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }
}

pub fn solve_states<S1, S2>(p1: &S1, p2: &S2, config: &GameConfig) -> DuelResult<ExactSolution>
where
    S1: Strategy + ?Sized,
    S2: Strategy + ?Sized,
{
    config.validate()?;
    let start = Instant::now();
    let chain = Chain::new(p1, p2, config);
    let system = build_system(&chain)?;
    let values = system.solve()?;
    log::debug!(
        "solved {} states (bound {}) in {:.1}ms",
        values.len(),
        config.bound,
        start.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(ExactSolution {
        rules: chain.rules(),
        values,
    })
}

/// Exact probability that P1 wins from the initial state.
pub fn exact_win_probability<S1, S2>(p1: &S1, p2: &S2, config: &GameConfig) -> DuelResult<Rational>
where
    S1: Strategy + ?Sized,
    S2: Strategy + ?Sized,
{
    let solution = solve_states(p1, p2, config)?;
    Ok(solution.initial().clone())
}
