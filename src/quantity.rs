//! # Quantity Model
//!
//! This module defines the exact quantity representation used throughout the
//! crate. Quantities are stored as exact rational numbers so that repeated
//! scaling and merging never accumulate floating-point drift.
//!
//! ## Core Concepts
//!
//! - **Amount**: an exact rational (e.g. 5/2 for "2 1/2")
//! - **Range**: an optional upper bound (e.g. "1-2 cloves")
//!
//! ## Usage
//!
//! ```rust
//! use fraction::Fraction;
//! use groceries::quantity::Quantity;
//!
//! let half = Quantity::exact(Fraction::new(1u64, 2u64));
//! let cloves = Quantity::range(Fraction::new(1u64, 1u64), Fraction::new(2u64, 1u64));
//! assert!(!half.is_range());
//! assert!(cloves.is_range());
//! ```

use fraction::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An exact quantity with an optional range upper bound.
///
/// The lower bound (`amount`) is the effective value for scaling and
/// aggregation; when `upper` is present both bounds are carried through
/// every derived value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// The amount, or the lower bound when this quantity is a range
    pub amount: Fraction,
    /// The upper bound for range quantities ("1-2 cloves")
    pub upper: Option<Fraction>,
}

impl Quantity {
    /// Create an exact (non-range) quantity
    pub fn exact(amount: Fraction) -> Self {
        Self {
            amount,
            upper: None,
        }
    }

    /// Create a quantity from a whole number
    pub fn whole(amount: u64) -> Self {
        Self::exact(Fraction::new(amount, 1u64))
    }

    /// Create a range quantity from lower and upper bounds
    pub fn range(lower: Fraction, upper: Fraction) -> Self {
        Self {
            amount: lower,
            upper: Some(upper),
        }
    }

    /// Check whether this quantity carries a range upper bound
    pub fn is_range(&self) -> bool {
        self.upper.is_some()
    }

    /// Multiply both bounds by an exact ratio, producing a new quantity
    pub fn scaled(&self, ratio: &Fraction) -> Self {
        Self {
            amount: self.amount.clone() * ratio.clone(),
            upper: self.upper.as_ref().map(|u| u.clone() * ratio.clone()),
        }
    }

    /// Sum two quantities, producing a new quantity.
    ///
    /// When either operand is a range the result is a range; a missing upper
    /// bound contributes its amount, so "1-2" + "1" sums to "2-3".
    pub fn sum(&self, other: &Self) -> Self {
        let amount = self.amount.clone() + other.amount.clone();
        if self.upper.is_none() && other.upper.is_none() {
            return Self::exact(amount);
        }
        let self_upper = self.upper.clone().unwrap_or_else(|| self.amount.clone());
        let other_upper = other.upper.clone().unwrap_or_else(|| other.amount.clone());
        Self {
            amount,
            upper: Some(self_upper + other_upper),
        }
    }
}

/// Format an exact rational the way recipes write it: whole numbers plain,
/// proper fractions as "n/d", improper fractions as mixed numbers ("2 1/2").
pub fn format_fraction(value: &Fraction) -> String {
    match (value.numer(), value.denom()) {
        (Some(n), Some(d)) if *d == 1 => n.to_string(),
        (Some(n), Some(d)) => {
            let whole = n / d;
            let rem = n % d;
            if whole == 0 {
                format!("{}/{}", rem, d)
            } else {
                format!("{} {}/{}", whole, rem, d)
            }
        }
        // Infinity/NaN never arise from parsed input; fall back to the
        // crate's own rendering rather than panic.
        _ => value.to_string(),
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_fraction(&self.amount))?;
        if let Some(upper) = &self.upper {
            write!(f, "-{}", format_fraction(upper))?;
        }
        Ok(())
    }
}
