use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, DuelResult};
use crate::rational::Rational;
use crate::state::Rules;

pub const DEFAULT_BOUND: u8 = 5;
pub const DEFAULT_MAX_TURNS: u64 = 1_000_000;
/// Largest accepted bound. The exact solver holds a dense
/// `2(B+1)^2`-square matrix of rationals, 882 rows at this cap.
pub const MAX_BOUND: u8 = 20;

/// Parameters of the game itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tokens each player starts with.
    #[serde(default = "default_bound")]
    pub bound: u8,
    /// Probability that a shot succeeds.
    #[serde(default = "Rational::half")]
    pub success_rate: Rational,
}

fn default_bound() -> u8 {
    DEFAULT_BOUND
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            bound: DEFAULT_BOUND,
            success_rate: Rational::half(),
        }
    }
}

impl GameConfig {
    pub fn new(bound: u8, success_rate: Rational) -> DuelResult<Self> {
        let config = GameConfig {
            bound,
            success_rate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_bound(bound: u8) -> DuelResult<Self> {
        GameConfig::new(bound, Rational::half())
    }

    pub fn validate(&self) -> DuelResult<()> {
        if self.bound == 0 {
            return Err(DuelError::InvalidValue(
                "Bound must be at least 1".to_string(),
            ));
        }
        if self.bound > MAX_BOUND {
            return Err(DuelError::InvalidValue(format!(
                "Bound {} exceeds the maximum of {}",
                self.bound, MAX_BOUND
            )));
        }
        if self.success_rate.is_negative() || self.success_rate > Rational::one() {
            return Err(DuelError::InvalidValue(format!(
                "Success rate {} is not in [0, 1]",
                self.success_rate
            )));
        }
        Ok(())
    }

    pub fn rules(&self) -> Rules {
        Rules::new(self.bound)
    }

    pub fn load(path: &Path) -> DuelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Parameters of a Monte Carlo batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub games: usize,
    pub seed: Option<u64>,
    /// Turns after which a single game is abandoned as non-terminating.
    pub max_turns: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            games: 10_000,
            seed: None,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl SimulationConfig {
    pub fn new(games: usize, seed: Option<u64>) -> Self {
        SimulationConfig {
            games,
            seed,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_five_tokens_fair_coin() {
        let config = GameConfig::default();
        assert_eq!(config.bound, 5);
        assert_eq!(config.success_rate, Rational::half());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_bound() {
        assert!(GameConfig::with_bound(0).is_err());
    }

    #[test]
    fn test_bound_cap() {
        assert!(GameConfig::with_bound(MAX_BOUND).is_ok());
        assert!(GameConfig::with_bound(MAX_BOUND + 1).is_err());
        assert!(GameConfig::with_bound(255).is_err());
        let loaded: GameConfig = serde_json::from_str(r#"{"bound": 200}"#).unwrap();
        assert!(matches!(loaded.validate(), Err(DuelError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_rate_out_of_range() {
        assert!(GameConfig::new(5, Rational::new(3, 2).unwrap()).is_err());
        assert!(GameConfig::new(5, Rational::new(-1, 2).unwrap()).is_err());
        assert!(GameConfig::new(5, Rational::one()).is_ok());
    }

    #[test]
    fn test_json_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"bound": 3}"#).unwrap();
        assert_eq!(config.bound, 3);
        assert_eq!(config.success_rate, Rational::half());

        let config: GameConfig =
            serde_json::from_str(r#"{"bound": 4, "success_rate": "2/3"}"#).unwrap();
        assert_eq!(config.success_rate, Rational::new(2, 3).unwrap());
    }
}
