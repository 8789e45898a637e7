//! Exact, always-reduced fractions backed by arbitrary-precision integers.
//!
//! Every coefficient in the exact solver is a `Rational`, so results are
//! bit-identical regardless of how many eliminations they went through.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DuelError, DuelResult};

const F64_SAFE_BITS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
    pub fn new(numer: i64, denom: i64) -> DuelResult<Self> {
        if denom == 0 {
            return Err(DuelError::DivisionByZero);
        }
        Ok(Rational(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        )))
    }

    pub fn from_integer(n: i64) -> Self {
        Rational(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn zero() -> Self {
        Rational(BigRational::zero())
    }

    pub fn one() -> Self {
        Rational(BigRational::one())
    }

    /// One half, the default coin-flip success rate.
    pub fn half() -> Self {
        Rational(BigRational::new(BigInt::from(1), BigInt::from(2)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Exact division. Dividing by zero is reported rather than panicking.
    pub fn checked_div(&self, rhs: &Rational) -> DuelResult<Rational> {
        if rhs.is_zero() {
            return Err(DuelError::DivisionByZero);
        }
        Ok(Rational(&self.0 / &rhs.0))
    }

    /// `1 - self`, the complementary probability.
    pub fn complement(&self) -> Rational {
        Rational(BigRational::one() - &self.0)
    }

    /// Nearest `f64`, for display and for sampling in the simulator.
    pub fn to_f64(&self) -> f64 {
        let mut n = self.0.numer().clone();
        let mut d = self.0.denom().clone();
        // Keep both sides inside f64 range.
        let bits = n.bits().max(d.bits());
        if bits > F64_SAFE_BITS {
            let shift = (bits - F64_SAFE_BITS) as usize;
            n >>= shift;
            d >>= shift;
        }
        match (n.to_f64(), d.to_f64()) {
            (Some(n), Some(d)) if d != 0.0 => n / d,
            (Some(n), _) => f64::INFINITY.copysign(n),
            _ => f64::NAN,
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::zero()
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from_integer(n)
    }
}

impl From<u8> for Rational {
    fn from(n: u8) -> Self {
        Rational::from_integer(n as i64)
    }
}

macro_rules! forward_binop {
    ($Trait:ident, $method:ident) => {
        impl $Trait for Rational {
            type Output = Rational;
            fn $method(self, rhs: Rational) -> Rational {
                Rational(self.0.$method(rhs.0))
            }
        }

        impl<'a> $Trait<&'a Rational> for Rational {
            type Output = Rational;
            fn $method(self, rhs: &'a Rational) -> Rational {
                Rational(self.0.$method(&rhs.0))
            }
        }

        impl<'a, 'b> $Trait<&'b Rational> for &'a Rational {
            type Output = Rational;
            fn $method(self, rhs: &'b Rational) -> Rational {
                Rational((&self.0).$method(&rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl<'a> Neg for &'a Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.denom().is_one() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl FromStr for Rational {
    type Err = DuelError;

    /// Parses `"n/d"` or a bare integer `"n"`.
    fn from_str(s: &str) -> DuelResult<Self> {
        let invalid = || DuelError::InvalidValue(format!("Invalid rational '{}'", s));
        let s = s.trim();
        let (numer, denom) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let numer = BigInt::from_str(numer).map_err(|_| invalid())?;
        let denom = BigInt::from_str(denom).map_err(|_| invalid())?;
        if denom.is_zero() {
            return Err(DuelError::DivisionByZero);
        }
        Ok(Rational(BigRational::new(numer, denom)))
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
