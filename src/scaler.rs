//! # Quantity Scaler
//!
//! Adjusts parsed quantities by a servings ratio using exact rational
//! arithmetic, so repeated scale-then-aggregate sequences are reproducible
//! with no cumulative rounding drift. Scaling derives new values; the source
//! line is never mutated.

use fraction::Fraction;
use std::fmt;

use crate::model::{ParsedIngredientLine, ParseStatus};
use crate::quantity::Quantity;

/// Errors that can occur while scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleError {
    /// A recipe cannot have a base of zero servings
    ZeroBaseServings,
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::ZeroBaseServings => write!(f, "Recipe base servings must be non-zero"),
        }
    }
}

impl std::error::Error for ScaleError {}

/// The exact ratio `target / base`
pub fn servings_ratio(base_servings: u32, target_servings: u32) -> Result<Fraction, ScaleError> {
    if base_servings == 0 {
        return Err(ScaleError::ZeroBaseServings);
    }
    Ok(Fraction::new(
        target_servings as u64,
        base_servings as u64,
    ))
}

/// Scale a quantity from a recipe's base servings to a target.
/// Ranges scale both bounds.
pub fn scale_quantity(
    quantity: &Quantity,
    base_servings: u32,
    target_servings: u32,
) -> Result<Quantity, ScaleError> {
    let ratio = servings_ratio(base_servings, target_servings)?;
    Ok(quantity.scaled(&ratio))
}

/// Derive a scaled copy of a parsed line.
///
/// The result is a new value with status `Normalized`; the input line is
/// untouched, so a shopping list can always be regenerated from its meals.
///
/// # Examples
///
/// ```rust
/// use groceries::line_parser::parse_ingredient_line;
/// use groceries::scaler::scale_line;
///
/// let line = parse_ingredient_line("2 cups flour").unwrap();
/// let doubled = scale_line(&line, 4, 8).unwrap();
/// assert_eq!(format!("{}", doubled.quantity), "4");
/// assert_eq!(format!("{}", line.quantity), "2");
/// ```
pub fn scale_line(
    line: &ParsedIngredientLine,
    base_servings: u32,
    target_servings: u32,
) -> Result<ParsedIngredientLine, ScaleError> {
    let ratio = servings_ratio(base_servings, target_servings)?;
    let mut scaled = line.clone();
    scaled.quantity = line.quantity.scaled(&ratio);
    scaled.status = ParseStatus::Normalized;
    Ok(scaled)
}
