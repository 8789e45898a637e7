//! Strategies: pure policies mapping a player's view of the counters to a
//! move distribution, plus the built-in catalogue.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{DuelError, DuelResult};
use crate::rational::Rational;
use crate::state::{Choice, Player, View};

// ---------------------------------------------------------------------------
// Move distribution
// ---------------------------------------------------------------------------

/// Probability of decrementing each counter on a successful shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub mine: Rational,
    pub theirs: Rational,
}

impl Move {
    pub fn mine() -> Self {
        Move {
            mine: Rational::one(),
            theirs: Rational::zero(),
        }
    }

    pub fn theirs() -> Self {
        Move {
            mine: Rational::zero(),
            theirs: Rational::one(),
        }
    }

    /// `mine` with probability `p_mine`, `theirs` otherwise.
    pub fn split(p_mine: Rational) -> Self {
        let theirs = p_mine.complement();
        Move {
            mine: p_mine,
            theirs,
        }
    }

    pub fn even() -> Self {
        Move::split(Rational::half())
    }

    pub fn weight(&self, choice: Choice) -> &Rational {
        match choice {
            Choice::Mine => &self.mine,
            Choice::Theirs => &self.theirs,
        }
    }

    /// Reject distributions that are not probabilities or that put weight
    /// on an empty counter.
    pub fn validate(&self, view: &View) -> DuelResult<()> {
        let invalid = |reason: String| DuelError::InvalidMove {
            mine: view.mine,
            theirs: view.theirs,
            reason,
        };
        if self.mine.is_negative() || self.theirs.is_negative() {
            return Err(invalid(format!(
                "negative weight (mine {}, theirs {})",
                self.mine, self.theirs
            )));
        }
        if !(&self.mine + &self.theirs).is_one() {
            return Err(invalid(format!(
                "weights sum to {}",
                &self.mine + &self.theirs
            )));
        }
        if view.theirs == 0 && self.theirs.is_positive() {
            return Err(invalid("positive weight on an empty theirs counter".to_string()));
        }
        if view.mine == 0 && self.mine.is_positive() {
            return Err(invalid("positive weight on an empty mine counter".to_string()));
        }
        Ok(())
    }

    /// Pick a choice from a uniform draw in `[0, 1)`.
    pub fn sample(&self, draw: f64) -> Choice {
        if draw < self.mine.to_f64() {
            Choice::Mine
        } else {
            Choice::Theirs
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mine {} / theirs {}", self.mine, self.theirs)
    }
}

// ---------------------------------------------------------------------------
// Strategy traits
// ---------------------------------------------------------------------------

/// A memoryless policy. Takes `&self` and a copy of the view, so it has no
/// way to carry state between calls; the exact solver relies on that.
pub trait Strategy: Sync {
    fn decide(&self, view: View) -> Move;
}

impl<F> Strategy for F
where
    F: Fn(View) -> Move + Sync,
{
    fn decide(&self, view: View) -> Move {
        self(view)
    }
}

/// One successful shot, as recorded by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shot {
    pub player: Player,
    pub choice: Choice,
}

/// A policy that may also look at the past successful shots. Only the Monte
/// Carlo path can play these.
pub trait HistoryStrategy: Sync {
    fn decide_with_history(&self, view: View, me: Player, history: &[Shot]) -> Move;
}

impl<S: Strategy> HistoryStrategy for S {
    fn decide_with_history(&self, view: View, _me: Player, _history: &[Shot]) -> Move {
        self.decide(view)
    }
}

/// Repeats the opponent's last successful choice when it is legal for us.
#[derive(Debug, Clone, Copy, Default)]
pub struct Copycat;

impl HistoryStrategy for Copycat {
    fn decide_with_history(&self, view: View, me: Player, history: &[Shot]) -> Move {
        let last = history.iter().rev().find(|shot| shot.player != me);
        match last {
            Some(shot) if shot.choice == Choice::Theirs && view.theirs > 0 => Move::theirs(),
            _ => Move::mine(),
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in catalogue
// ---------------------------------------------------------------------------

pub type StrategyFn = fn(View) -> Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyId {
    MaxGreed,
    MediumGreed,
    MediumGreedier,
    LowGreed,
    LowGreedier,
    Defensive,
    Balanced,
    Random,
    RandomWithAttack,
    RandomWithDefend,
    RandomWithDefendAndAttack,
}

impl StrategyId {
    pub const ALL: [StrategyId; 11] = [
        StrategyId::MaxGreed,
        StrategyId::MediumGreed,
        StrategyId::MediumGreedier,
        StrategyId::LowGreed,
        StrategyId::LowGreedier,
        StrategyId::Defensive,
        StrategyId::Balanced,
        StrategyId::Random,
        StrategyId::RandomWithAttack,
        StrategyId::RandomWithDefend,
        StrategyId::RandomWithDefendAndAttack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::MaxGreed => "max_greed",
            StrategyId::MediumGreed => "medium_greed",
            StrategyId::MediumGreedier => "medium_greedier",
            StrategyId::LowGreed => "low_greed",
            StrategyId::LowGreedier => "low_greedier",
            StrategyId::Defensive => "defensive",
            StrategyId::Balanced => "balanced",
            StrategyId::Random => "random",
            StrategyId::RandomWithAttack => "random_with_attack",
            StrategyId::RandomWithDefend => "random_with_defend",
            StrategyId::RandomWithDefendAndAttack => "random_with_defend_and_attack",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyId::MaxGreed => "Always take from mine.",
            StrategyId::MediumGreed => "Take mine unless one step from losing.",
            StrategyId::MediumGreedier => {
                "Take mine unless one step from losing and not one step from winning."
            }
            StrategyId::LowGreed => "Take mine unless two or fewer steps from losing.",
            StrategyId::LowGreedier => {
                "Take mine unless two or fewer steps from losing and more than two from winning."
            }
            StrategyId::Defensive => "Take theirs whenever possible.",
            StrategyId::Balanced => "Take mine when no further from winning than from losing.",
            StrategyId::Random => "Coin flip between mine and theirs.",
            StrategyId::RandomWithAttack => "Coin flip, but take mine one step from winning.",
            StrategyId::RandomWithDefend => "Coin flip, but take theirs one step from losing.",
            StrategyId::RandomWithDefendAndAttack => {
                "Coin flip, attacking one step from winning and defending one step from losing."
            }
        }
    }

    /// Look up a strategy by its catalogue name. Accepts `gto` as an alias
    /// for `balanced`.
    pub fn from_name(name: &str) -> DuelResult<StrategyId> {
        let key = name.trim().to_lowercase();
        BY_NAME
            .get(key.as_str())
            .copied()
            .ok_or_else(|| DuelError::UnknownStrategy(name.to_string()))
    }

    pub fn function(&self) -> StrategyFn {
        match self {
            StrategyId::MaxGreed => max_greed,
            StrategyId::MediumGreed => medium_greed,
            StrategyId::MediumGreedier => medium_greedier,
            StrategyId::LowGreed => low_greed,
            StrategyId::LowGreedier => low_greedier,
            StrategyId::Defensive => defensive,
            StrategyId::Balanced => balanced,
            StrategyId::Random => random,
            StrategyId::RandomWithAttack => random_with_attack,
            StrategyId::RandomWithDefend => random_with_defend,
            StrategyId::RandomWithDefendAndAttack => random_with_defend_and_attack,
        }
    }

    /// Whether the strategy ever returns a non-degenerate distribution.
    pub fn is_mixed(&self) -> bool {
        matches!(
            self,
            StrategyId::Random
                | StrategyId::RandomWithAttack
                | StrategyId::RandomWithDefend
                | StrategyId::RandomWithDefendAndAttack
        )
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Strategy for StrategyId {
    fn decide(&self, view: View) -> Move {
        (self.function())(view)
    }
}

static BY_NAME: Lazy<HashMap<&'static str, StrategyId>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, StrategyId> =
        StrategyId::ALL.iter().map(|id| (id.as_str(), *id)).collect();
    map.insert("gto", StrategyId::Balanced);
    map
});

// One step from losing: the opponent needs a single more shot.
fn about_to_lose(v: &View) -> bool {
    v.theirs > 0 && v.theirs == v.bound.saturating_sub(1)
}

// Two or fewer opponent shots from losing.
fn close_to_losing(v: &View) -> bool {
    v.theirs > 0 && v.theirs >= v.bound.saturating_sub(2)
}

fn max_greed(_: View) -> Move {
    Move::mine()
}

fn medium_greed(v: View) -> Move {
    if about_to_lose(&v) {
        return Move::theirs();
    }
    Move::mine()
}

fn medium_greedier(v: View) -> Move {
    if about_to_lose(&v) && v.mine != 1 {
        return Move::theirs();
    }
    Move::mine()
}

fn low_greed(v: View) -> Move {
    if close_to_losing(&v) {
        return Move::theirs();
    }
    Move::mine()
}

fn low_greedier(v: View) -> Move {
    if close_to_losing(&v) && v.mine > 2 {
        return Move::theirs();
    }
    Move::mine()
}

fn defensive(v: View) -> Move {
    if v.theirs > 0 {
        return Move::theirs();
    }
    Move::mine()
}

fn balanced(v: View) -> Move {
    if v.to_win() <= v.to_lose() {
        return Move::mine();
    }
    Move::theirs()
}

fn random(v: View) -> Move {
    if v.theirs != 0 {
        return Move::even();
    }
    Move::mine()
}

fn random_with_attack(v: View) -> Move {
    if v.theirs != 0 && v.mine != 1 {
        return Move::even();
    }
    Move::mine()
}

fn random_with_defend(v: View) -> Move {
    if v.theirs != 0 {
        if about_to_lose(&v) {
            return Move::theirs();
        }
        return Move::even();
    }
    Move::mine()
}

fn random_with_defend_and_attack(v: View) -> Move {
    if v.theirs != 0 && v.mine != 1 {
        if about_to_lose(&v) {
            return Move::theirs();
        }
        return Move::even();
    }
    Move::mine()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(mine: u8, theirs: u8) -> View {
        View {
            mine,
            theirs,
            bound: 5,
        }
    }

    #[test]
    fn test_names_round_trip_through_lookup() {
        for id in StrategyId::ALL {
            assert_eq!(StrategyId::from_name(id.as_str()).unwrap(), id);
        }
        assert_eq!(StrategyId::from_name("GTO").unwrap(), StrategyId::Balanced);
        assert!(StrategyId::from_name("nope").is_err());
    }

    #[test]
    fn test_thresholds_at_five() {
        assert_eq!(StrategyId::MediumGreed.decide(view(3, 4)), Move::theirs());
        assert_eq!(StrategyId::MediumGreed.decide(view(3, 3)), Move::mine());
        assert_eq!(StrategyId::MediumGreedier.decide(view(1, 4)), Move::mine());
        assert_eq!(StrategyId::LowGreed.decide(view(2, 3)), Move::theirs());
        assert_eq!(StrategyId::LowGreedier.decide(view(2, 3)), Move::mine());
        assert_eq!(StrategyId::LowGreedier.decide(view(3, 3)), Move::theirs());
    }

    #[test]
    fn test_thresholds_at_the_top_of_the_u8_range() {
        let wide = |mine, theirs| View {
            mine,
            theirs,
            bound: 255,
        };
        assert_eq!(StrategyId::LowGreed.decide(wide(10, 254)), Move::theirs());
        assert_eq!(StrategyId::LowGreedier.decide(wide(10, 253)), Move::theirs());
        assert_eq!(StrategyId::LowGreed.decide(wide(10, 252)), Move::mine());
        assert_eq!(StrategyId::MediumGreed.decide(wide(10, 254)), Move::theirs());
        assert_eq!(StrategyId::MediumGreed.decide(wide(10, 255)), Move::mine());
        assert_eq!(StrategyId::Balanced.decide(wide(10, 255)), Move::theirs());
    }

    #[test]
    fn test_balanced_compares_distances() {
        // 3 to win, 5 - 2 = 3 to lose: not worse, so attack.
        assert_eq!(StrategyId::Balanced.decide(view(3, 2)), Move::mine());
        assert_eq!(StrategyId::Balanced.decide(view(4, 2)), Move::theirs());
    }

    #[test]
    fn test_random_guards() {
        assert_eq!(StrategyId::Random.decide(view(3, 0)), Move::mine());
        assert_eq!(StrategyId::Random.decide(view(3, 2)), Move::even());
        assert_eq!(StrategyId::RandomWithAttack.decide(view(1, 2)), Move::mine());
        assert_eq!(StrategyId::RandomWithDefend.decide(view(1, 4)), Move::theirs());
        assert_eq!(
            StrategyId::RandomWithDefendAndAttack.decide(view(1, 4)),
            Move::mine()
        );
    }

    #[test]
    fn test_every_builtin_is_legal_everywhere() {
        for bound in 1..=6u8 {
            for id in StrategyId::ALL {
                for mine in 1..=bound {
                    for theirs in 0..bound {
                        let v = View { mine, theirs, bound };
                        let mv = id.decide(v);
                        assert!(
                            mv.validate(&v).is_ok(),
                            "{} illegal at {:?}: {}",
                            id,
                            v,
                            mv
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_validate_rejects_bad_distributions() {
        let v = view(3, 0);
        assert!(Move::theirs().validate(&v).is_err());
        let lopsided = Move {
            mine: Rational::new(3, 4).unwrap(),
            theirs: Rational::new(1, 2).unwrap(),
        };
        assert!(lopsided.validate(&view(3, 2)).is_err());
        let negative = Move {
            mine: Rational::new(3, 2).unwrap(),
            theirs: Rational::new(-1, 2).unwrap(),
        };
        assert!(negative.validate(&view(3, 2)).is_err());
    }

    #[test]
    fn test_sample_follows_weights() {
        assert_eq!(Move::mine().sample(0.999), Choice::Mine);
        assert_eq!(Move::theirs().sample(0.0), Choice::Theirs);
        assert_eq!(Move::even().sample(0.25), Choice::Mine);
        assert_eq!(Move::even().sample(0.75), Choice::Theirs);
    }

    #[test]
    fn test_copycat_mirrors_opponent() {
        let history = [
            Shot { player: Player::P2, choice: Choice::Theirs },
            Shot { player: Player::P1, choice: Choice::Mine },
        ];
        let mv = Copycat.decide_with_history(view(4, 1), Player::P1, &history);
        assert_eq!(mv, Move::theirs());
        // Illegal to copy with nothing to take.
        let mv = Copycat.decide_with_history(view(4, 0), Player::P1, &history);
        assert_eq!(mv, Move::mine());
        let mv = Copycat.decide_with_history(view(4, 1), Player::P1, &[]);
        assert_eq!(mv, Move::mine());
    }
}
