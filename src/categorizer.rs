//! # Grocery Categorizer
//!
//! Maps canonical ingredients to grocery store categories for display
//! ordering. Unmapped ingredients default to `Other` and are flagged for
//! review; categorization never blocks shopping-list generation.

use serde::{Deserialize, Serialize};

use crate::canonicalizer::IngredientRegistry;

/// Category for grocery store organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Produce,
    Dairy,
    MeatSeafood,
    Pantry,
    Spices,
    Frozen,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Dairy => "Dairy",
            Category::MeatSeafood => "Meat & Seafood",
            Category::Pantry => "Pantry",
            Category::Spices => "Spices",
            Category::Frozen => "Frozen",
            Category::Other => "Other",
        }
    }

    /// Position in the shopping-list display, roughly store aisle order
    pub fn display_order(&self) -> usize {
        match self {
            Category::Produce => 0,
            Category::MeatSeafood => 1,
            Category::Dairy => 2,
            Category::Pantry => 3,
            Category::Spices => 4,
            Category::Frozen => 5,
            Category::Other => 6,
        }
    }

    /// Parse the stored string form back into a category.
    /// Unknown strings map to `Other` so stale rows never fail a load.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "Produce" => Category::Produce,
            "Dairy" => Category::Dairy,
            "Meat & Seafood" => Category::MeatSeafood,
            "Pantry" => Category::Pantry,
            "Spices" => Category::Spices,
            "Frozen" => Category::Frozen,
            _ => Category::Other,
        }
    }
}

/// Look up the grocery category for a canonical ingredient.
///
/// Ingredients the registry does not know (or that were created by the
/// unknown-ingredient fallback) come back as `Other`; the caller flags the
/// line for review rather than failing.
pub fn categorize(registry: &IngredientRegistry, canonical_ingredient_id: &str) -> Category {
    registry
        .get(canonical_ingredient_id)
        .map(|entry| entry.category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_seeded_ingredients() {
        let registry = IngredientRegistry::with_seed_data();

        let onion = registry.canonicalize("onion");
        assert_eq!(categorize(&registry, &onion.id), Category::Produce);

        let milk = registry.canonicalize("milk");
        assert_eq!(categorize(&registry, &milk.id), Category::Dairy);

        let chicken = registry.canonicalize("chicken");
        assert_eq!(categorize(&registry, &chicken.id), Category::MeatSeafood);

        let flour = registry.canonicalize("flour");
        assert_eq!(categorize(&registry, &flour.id), Category::Pantry);

        let cumin = registry.canonicalize("cumin");
        assert_eq!(categorize(&registry, &cumin.id), Category::Spices);

        let peas = registry.canonicalize("frozen peas");
        assert_eq!(categorize(&registry, &peas.id), Category::Frozen);
    }

    #[test]
    fn test_unknown_ingredient_is_other() {
        let registry = IngredientRegistry::with_seed_data();
        let entry = registry.canonicalize("dragonfruit syrup");
        assert_eq!(categorize(&registry, &entry.id), Category::Other);
        assert!(entry.needs_review);
    }

    #[test]
    fn test_unknown_id_is_other() {
        let registry = IngredientRegistry::with_seed_data();
        assert_eq!(categorize(&registry, "no-such-id"), Category::Other);
    }

    #[test]
    fn test_display_order_covers_all_categories() {
        let mut orders: Vec<usize> = [
            Category::Produce,
            Category::Dairy,
            Category::MeatSeafood,
            Category::Pantry,
            Category::Spices,
            Category::Frozen,
            Category::Other,
        ]
        .iter()
        .map(|c| c.display_order())
        .collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_category_string_round_trip() {
        for category in [
            Category::Produce,
            Category::Dairy,
            Category::MeatSeafood,
            Category::Pantry,
            Category::Spices,
            Category::Frozen,
            Category::Other,
        ] {
            assert_eq!(Category::from_str_lossy(category.as_str()), category);
        }
        assert_eq!(Category::from_str_lossy("Bakery"), Category::Other);
    }
}
