//! # Unit Model
//!
//! Canonical unit vocabulary with dimension tags, an alias table for the
//! many ways recipes spell units, and exact conversion within a dimension.
//!
//! ## Features
//!
//! - Fixed unit vocabulary tagged `Volume`, `Weight`, `Count` or `Unitless`
//! - Alias resolution for plural, abbreviated and French forms
//!   (e.g. "tbsp", "Tbs", "tablespoons", "cuillère à soupe")
//! - Exact rational conversion factors to a per-dimension base unit
//!   (milliliter, gram, piece)
//! - Conversion across dimensions is refused: "1 onion" and "150 g onion"
//!   carry different information and are never merged

use fraction::Fraction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::quantity::Quantity;

/// A unit family. Conversion is only ever performed within one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Volume,
    Weight,
    Count,
    Unitless,
}

/// Measurement units with normalization support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    // Volume units
    Teaspoons,
    Tablespoons,
    FluidOunces,
    Cups,
    Pints,
    Quarts,
    Gallons,
    Milliliters,
    Centiliters,
    Deciliters,
    Liters,

    // Weight units
    Milligrams,
    Grams,
    Kilograms,
    Ounces,
    Pounds,

    // Count/piece units
    Pieces,
    Dozen,
    Cloves,
    Slices,
    Sticks,
    Cans,
    Packages,
    Bottles,

    // Unitless amounts (never convert into each other)
    Pinches,
    Dashes,
}

/// Common unit spellings and their canonical unit
static UNIT_ALIASES: LazyLock<HashMap<&'static str, Unit>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Volume units
    map.insert("tsp", Unit::Teaspoons);
    map.insert("teaspoon", Unit::Teaspoons);
    map.insert("teaspoons", Unit::Teaspoons);
    map.insert("tbsp", Unit::Tablespoons);
    map.insert("tbs", Unit::Tablespoons);
    map.insert("tablespoon", Unit::Tablespoons);
    map.insert("tablespoons", Unit::Tablespoons);
    map.insert("cup", Unit::Cups);
    map.insert("cups", Unit::Cups);
    map.insert("c", Unit::Cups);
    map.insert("fl oz", Unit::FluidOunces);
    map.insert("fluid ounce", Unit::FluidOunces);
    map.insert("fluid ounces", Unit::FluidOunces);
    map.insert("pint", Unit::Pints);
    map.insert("pints", Unit::Pints);
    map.insert("pt", Unit::Pints);
    map.insert("quart", Unit::Quarts);
    map.insert("quarts", Unit::Quarts);
    map.insert("qt", Unit::Quarts);
    map.insert("gallon", Unit::Gallons);
    map.insert("gallons", Unit::Gallons);
    map.insert("gal", Unit::Gallons);
    map.insert("ml", Unit::Milliliters);
    map.insert("milliliter", Unit::Milliliters);
    map.insert("milliliters", Unit::Milliliters);
    map.insert("millilitre", Unit::Milliliters);
    map.insert("millilitres", Unit::Milliliters);
    map.insert("cl", Unit::Centiliters);
    map.insert("centiliter", Unit::Centiliters);
    map.insert("centilitre", Unit::Centiliters);
    map.insert("dl", Unit::Deciliters);
    map.insert("deciliter", Unit::Deciliters);
    map.insert("decilitre", Unit::Deciliters);
    map.insert("l", Unit::Liters);
    map.insert("liter", Unit::Liters);
    map.insert("liters", Unit::Liters);
    map.insert("litre", Unit::Liters);
    map.insert("litres", Unit::Liters);

    // Weight units
    map.insert("mg", Unit::Milligrams);
    map.insert("milligram", Unit::Milligrams);
    map.insert("milligrams", Unit::Milligrams);
    map.insert("g", Unit::Grams);
    map.insert("gram", Unit::Grams);
    map.insert("grams", Unit::Grams);
    map.insert("kg", Unit::Kilograms);
    map.insert("kilogram", Unit::Kilograms);
    map.insert("kilograms", Unit::Kilograms);
    map.insert("oz", Unit::Ounces);
    map.insert("ounce", Unit::Ounces);
    map.insert("ounces", Unit::Ounces);
    map.insert("lb", Unit::Pounds);
    map.insert("lbs", Unit::Pounds);
    map.insert("pound", Unit::Pounds);
    map.insert("pounds", Unit::Pounds);

    // Count units
    map.insert("piece", Unit::Pieces);
    map.insert("pieces", Unit::Pieces);
    map.insert("item", Unit::Pieces);
    map.insert("items", Unit::Pieces);
    map.insert("whole", Unit::Pieces);
    map.insert("dozen", Unit::Dozen);
    map.insert("doz", Unit::Dozen);
    map.insert("clove", Unit::Cloves);
    map.insert("cloves", Unit::Cloves);
    map.insert("slice", Unit::Slices);
    map.insert("slices", Unit::Slices);
    map.insert("stick", Unit::Sticks);
    map.insert("sticks", Unit::Sticks);
    map.insert("can", Unit::Cans);
    map.insert("cans", Unit::Cans);
    map.insert("package", Unit::Packages);
    map.insert("packages", Unit::Packages);
    map.insert("pkg", Unit::Packages);
    map.insert("packet", Unit::Packages);
    map.insert("packets", Unit::Packages);
    map.insert("bottle", Unit::Bottles);
    map.insert("bottles", Unit::Bottles);

    // Unitless amounts
    map.insert("pinch", Unit::Pinches);
    map.insert("pinches", Unit::Pinches);
    map.insert("dash", Unit::Dashes);
    map.insert("dashes", Unit::Dashes);

    // French units
    map.insert("cuillère à café", Unit::Teaspoons);
    map.insert("cuillères à café", Unit::Teaspoons);
    map.insert("cac", Unit::Teaspoons);
    map.insert("cuillère à soupe", Unit::Tablespoons);
    map.insert("cuillères à soupe", Unit::Tablespoons);
    map.insert("cas", Unit::Tablespoons);
    map.insert("tasse", Unit::Cups);
    map.insert("tasses", Unit::Cups);
    map.insert("gramme", Unit::Grams);
    map.insert("grammes", Unit::Grams);
    map.insert("kilogramme", Unit::Kilograms);
    map.insert("kilogrammes", Unit::Kilograms);
    map.insert("pièce", Unit::Pieces);
    map.insert("pièces", Unit::Pieces);
    map.insert("gousse", Unit::Cloves);
    map.insert("gousses", Unit::Cloves);
    map.insert("tranche", Unit::Slices);
    map.insert("tranches", Unit::Slices);
    map.insert("sachet", Unit::Packages);
    map.insert("sachets", Unit::Packages);
    map.insert("boîte", Unit::Cans);
    map.insert("boîtes", Unit::Cans);
    map.insert("bouteille", Unit::Bottles);
    map.insert("bouteilles", Unit::Bottles);
    map.insert("pincée", Unit::Pinches);
    map.insert("pincées", Unit::Pinches);

    map
});

/// The longest alias in the table spans this many words ("cuillère à soupe");
/// tokenizers probing for multi-word units never need a longer window.
pub const MAX_ALIAS_WORDS: usize = 3;

impl Unit {
    /// The unit family this unit belongs to
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Teaspoons
            | Unit::Tablespoons
            | Unit::FluidOunces
            | Unit::Cups
            | Unit::Pints
            | Unit::Quarts
            | Unit::Gallons
            | Unit::Milliliters
            | Unit::Centiliters
            | Unit::Deciliters
            | Unit::Liters => Dimension::Volume,

            Unit::Milligrams | Unit::Grams | Unit::Kilograms | Unit::Ounces | Unit::Pounds => {
                Dimension::Weight
            }

            Unit::Pieces
            | Unit::Dozen
            | Unit::Cloves
            | Unit::Slices
            | Unit::Sticks
            | Unit::Cans
            | Unit::Packages
            | Unit::Bottles => Dimension::Count,

            Unit::Pinches | Unit::Dashes => Dimension::Unitless,
        }
    }

    /// Exact conversion factor to the dimension's base unit
    /// (milliliter for volume, gram for weight, piece for count).
    ///
    /// Volume factors follow the recipe-friendly chain (1 cup = 240 ml,
    /// 1 pint = 2 cups, and so on). Ounce and pound use the exact avoirdupois
    /// definition so that 16 oz = 1 lb holds exactly.
    pub fn base_factor(&self) -> Fraction {
        match self {
            Unit::Teaspoons => Fraction::new(5u64, 1u64),
            Unit::Tablespoons => Fraction::new(15u64, 1u64),
            Unit::FluidOunces => Fraction::new(30u64, 1u64),
            Unit::Cups => Fraction::new(240u64, 1u64),
            Unit::Pints => Fraction::new(480u64, 1u64),
            Unit::Quarts => Fraction::new(960u64, 1u64),
            Unit::Gallons => Fraction::new(3840u64, 1u64),
            Unit::Milliliters => Fraction::new(1u64, 1u64),
            Unit::Centiliters => Fraction::new(10u64, 1u64),
            Unit::Deciliters => Fraction::new(100u64, 1u64),
            Unit::Liters => Fraction::new(1000u64, 1u64),

            Unit::Milligrams => Fraction::new(1u64, 1000u64),
            Unit::Grams => Fraction::new(1u64, 1u64),
            Unit::Kilograms => Fraction::new(1000u64, 1u64),
            Unit::Ounces => Fraction::new(45_359_237u64, 1_600_000u64),
            Unit::Pounds => Fraction::new(45_359_237u64, 100_000u64),

            Unit::Dozen => Fraction::new(12u64, 1u64),
            Unit::Pieces
            | Unit::Cloves
            | Unit::Slices
            | Unit::Sticks
            | Unit::Cans
            | Unit::Packages
            | Unit::Bottles => Fraction::new(1u64, 1u64),

            Unit::Pinches | Unit::Dashes => Fraction::new(1u64, 1u64),
        }
    }

    /// Get a human-readable string representation of the unit.
    ///
    /// Every display name is itself a recognized alias, so rendered
    /// quantities re-parse to the same unit.
    pub fn display_name(&self) -> &'static str {
        match self {
            Unit::Teaspoons => "tsp",
            Unit::Tablespoons => "tbsp",
            Unit::FluidOunces => "fl oz",
            Unit::Cups => "cups",
            Unit::Pints => "pints",
            Unit::Quarts => "quarts",
            Unit::Gallons => "gallons",
            Unit::Milliliters => "ml",
            Unit::Centiliters => "cl",
            Unit::Deciliters => "dl",
            Unit::Liters => "l",
            Unit::Milligrams => "mg",
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Ounces => "oz",
            Unit::Pounds => "lbs",
            Unit::Pieces => "pieces",
            Unit::Dozen => "dozen",
            Unit::Cloves => "cloves",
            Unit::Slices => "slices",
            Unit::Sticks => "sticks",
            Unit::Cans => "cans",
            Unit::Packages => "packages",
            Unit::Bottles => "bottles",
            Unit::Pinches => "pinches",
            Unit::Dashes => "dashes",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Resolve an accepted alias to its canonical unit.
///
/// Matching is case-insensitive, tolerates a trailing period ("tbsp.") and
/// falls back to stripping a plural "s" before giving up.
///
/// # Examples
///
/// ```rust
/// use groceries::unit_model::{canonical_unit, Unit};
///
/// assert_eq!(canonical_unit("Tbs"), Some(Unit::Tablespoons));
/// assert_eq!(canonical_unit("tablespoons"), Some(Unit::Tablespoons));
/// assert_eq!(canonical_unit("onions"), None);
/// ```
pub fn canonical_unit(alias: &str) -> Option<Unit> {
    let normalized = alias.trim().trim_end_matches('.').to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(unit) = UNIT_ALIASES.get(normalized.as_str()) {
        return Some(*unit);
    }

    // Try without pluralization
    let singular = normalized.strip_suffix('s')?;
    if singular.is_empty() {
        return None;
    }
    UNIT_ALIASES.get(singular).copied()
}

/// Errors that can occur during unit conversion
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Attempted conversion between unit dimensions (or between distinct
    /// unitless amounts such as pinch and dash)
    IncompatibleDimension { from: Unit, to: Unit },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::IncompatibleDimension { from, to } => write!(
                f,
                "Cannot convert {} ({:?}) to {} ({:?})",
                from.display_name(),
                from.dimension(),
                to.display_name(),
                to.dimension()
            ),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Convert a quantity from one unit to another within the same dimension.
///
/// The conversion is exact: `quantity * from.base_factor() / to.base_factor()`.
/// Crossing dimensions fails with `IncompatibleDimension`, as does converting
/// between distinct unitless amounts (a pinch is not a dash).
pub fn convert(quantity: &Quantity, from: Unit, to: Unit) -> Result<Quantity, ConversionError> {
    if from.dimension() != to.dimension() {
        return Err(ConversionError::IncompatibleDimension { from, to });
    }
    if from.dimension() == Dimension::Unitless && from != to {
        return Err(ConversionError::IncompatibleDimension { from, to });
    }
    if from == to {
        return Ok(quantity.clone());
    }

    let ratio = from.base_factor() / to.base_factor();
    Ok(quantity.scaled(&ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolution() {
        assert_eq!(canonical_unit("cups"), Some(Unit::Cups));
        assert_eq!(canonical_unit("cup"), Some(Unit::Cups));
        assert_eq!(canonical_unit("c"), Some(Unit::Cups));
        assert_eq!(canonical_unit("tsp"), Some(Unit::Teaspoons));
        assert_eq!(canonical_unit("Tbsp."), Some(Unit::Tablespoons));
        assert_eq!(canonical_unit("Tbs"), Some(Unit::Tablespoons));
        assert_eq!(canonical_unit("tablespoons"), Some(Unit::Tablespoons));
        assert_eq!(canonical_unit("fluid ounces"), Some(Unit::FluidOunces));
        assert_eq!(canonical_unit("lb"), Some(Unit::Pounds));
        assert_eq!(canonical_unit("LBS"), Some(Unit::Pounds));
    }

    #[test]
    fn test_french_aliases() {
        assert_eq!(canonical_unit("cuillère à soupe"), Some(Unit::Tablespoons));
        assert_eq!(canonical_unit("grammes"), Some(Unit::Grams));
        assert_eq!(canonical_unit("gousses"), Some(Unit::Cloves));
        assert_eq!(canonical_unit("boîte"), Some(Unit::Cans));
    }

    #[test]
    fn test_unknown_alias() {
        assert_eq!(canonical_unit("onion"), None);
        assert_eq!(canonical_unit(""), None);
        assert_eq!(canonical_unit("cupboard"), None);
    }

    #[test]
    fn test_display_names_are_aliases() {
        // Rendered lines must re-parse to the same unit
        let all = [
            Unit::Teaspoons,
            Unit::Tablespoons,
            Unit::FluidOunces,
            Unit::Cups,
            Unit::Pints,
            Unit::Quarts,
            Unit::Gallons,
            Unit::Milliliters,
            Unit::Centiliters,
            Unit::Deciliters,
            Unit::Liters,
            Unit::Milligrams,
            Unit::Grams,
            Unit::Kilograms,
            Unit::Ounces,
            Unit::Pounds,
            Unit::Pieces,
            Unit::Dozen,
            Unit::Cloves,
            Unit::Slices,
            Unit::Sticks,
            Unit::Cans,
            Unit::Packages,
            Unit::Bottles,
            Unit::Pinches,
            Unit::Dashes,
        ];
        for unit in all {
            assert_eq!(
                canonical_unit(unit.display_name()),
                Some(unit),
                "display name '{}' must resolve to its own unit",
                unit.display_name()
            );
        }
    }

    #[test]
    fn test_convert_within_volume() {
        let qty = Quantity::whole(2);
        let ml = convert(&qty, Unit::Cups, Unit::Milliliters).unwrap();
        assert_eq!(ml.amount, fraction::Fraction::new(480u64, 1u64));

        let back = convert(&ml, Unit::Milliliters, Unit::Cups).unwrap();
        assert_eq!(back.amount, fraction::Fraction::new(2u64, 1u64));
    }

    #[test]
    fn test_convert_ounces_pounds_exact() {
        let qty = Quantity::whole(16);
        let lbs = convert(&qty, Unit::Ounces, Unit::Pounds).unwrap();
        assert_eq!(lbs.amount, fraction::Fraction::new(1u64, 1u64));
    }

    #[test]
    fn test_convert_across_dimensions_fails() {
        let qty = Quantity::whole(1);
        let err = convert(&qty, Unit::Cups, Unit::Grams).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::IncompatibleDimension {
                from: Unit::Cups,
                to: Unit::Grams
            }
        ));
    }

    #[test]
    fn test_count_never_converts_to_volume_or_weight() {
        let qty = Quantity::whole(1);
        assert!(convert(&qty, Unit::Pieces, Unit::Grams).is_err());
        assert!(convert(&qty, Unit::Pieces, Unit::Cups).is_err());
        assert!(convert(&qty, Unit::Dozen, Unit::Pieces).is_ok());
    }

    #[test]
    fn test_pinch_is_not_a_dash() {
        let qty = Quantity::whole(2);
        assert!(convert(&qty, Unit::Pinches, Unit::Dashes).is_err());
        assert!(convert(&qty, Unit::Pinches, Unit::Pinches).is_ok());
    }

    #[test]
    fn test_dozen_converts_to_pieces() {
        let qty = Quantity::whole(2);
        let pieces = convert(&qty, Unit::Dozen, Unit::Pieces).unwrap();
        assert_eq!(pieces.amount, fraction::Fraction::new(24u64, 1u64));
    }
}
