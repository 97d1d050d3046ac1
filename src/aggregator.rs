//! # Shopping List Aggregator
//!
//! Merges scaled, canonicalized ingredient quantities from all planned meals
//! in a plan into consolidated, categorized shopping-list lines.
//!
//! ## Grouping
//!
//! Lines group by `(canonical ingredient, unit dimension)`. Within a group,
//! matching units sum directly and keep their unit; mixed units that share a
//! dimension are converted to the most granular unit present before summing.
//! Incompatible dimensions for the same ingredient stay separate lines:
//! "1 onion" and "200 g onion" are different pieces of information.
//!
//! The reduction is commutative and associative — exact rational sums over
//! order-insensitive groups, with deterministically sorted output — so the
//! result is independent of the order meals are supplied.
//!
//! ## Degradation
//!
//! Lines that failed to parse are carried through as quantity-1 manual-entry
//! lines flagged for review; they are never dropped. The only hard failure
//! is an entirely empty plan.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::canonicalizer::IngredientRegistry;
use crate::categorizer::Category;
use crate::model::{RecipeIngredients, DEFAULT_REVIEW_THRESHOLD};
use crate::quantity::Quantity;
use crate::scaler::scale_line;
use crate::unit_model::{convert, Dimension, Unit};

/// One meal in a plan: a recipe's parsed ingredients plus its scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub recipe_id: i64,
    pub base_servings: u32,
    pub target_servings: u32,
    pub ingredients: RecipeIngredients,
}

/// A consolidated shopping-list line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListLine {
    pub canonical_ingredient_id: String,
    pub display_name: String,
    pub unit: Unit,
    pub quantity: Quantity,
    /// Recipes that contributed to this line, for "why is this on my list"
    pub source_recipe_ids: BTreeSet<i64>,
    pub category: Category,
    pub needs_review: bool,
}

/// Errors that can occur while building a shopping list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// A plan with no meals has nothing to aggregate
    EmptyPlan,
    /// A meal referenced a recipe with zero base servings
    InvalidServings { recipe_id: i64 },
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationError::EmptyPlan => write!(f, "Meal plan contains no meals"),
            AggregationError::InvalidServings { recipe_id } => {
                write!(f, "Recipe {} has zero base servings", recipe_id)
            }
        }
    }
}

impl std::error::Error for AggregationError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    canonical_id: String,
    dimension: Dimension,
    /// Distinct unitless amounts (pinch vs dash) never merge, so they
    /// subgroup per unit
    unitless_unit: Option<Unit>,
}

struct Group {
    display_name: String,
    category: Category,
    contributions: Vec<(Unit, Quantity)>,
    sources: BTreeSet<i64>,
    needs_review: bool,
}

fn dimension_order(dimension: Dimension) -> usize {
    match dimension {
        Dimension::Volume => 0,
        Dimension::Weight => 1,
        Dimension::Count => 2,
        Dimension::Unitless => 3,
    }
}

/// Pick the most granular unit present in a group: the one with the
/// smallest base factor, ties broken by display name for determinism.
fn most_granular_unit(units: &[Unit]) -> Option<Unit> {
    let mut best: Option<Unit> = None;
    for &unit in units {
        best = match best {
            None => Some(unit),
            Some(current) => {
                let factor = unit.base_factor();
                let current_factor = current.base_factor();
                if factor < current_factor
                    || (factor == current_factor
                        && unit.display_name() < current.display_name())
                {
                    Some(unit)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

/// Build a deduplicated, categorized shopping list from the planned meals
/// of a meal plan.
///
/// The aggregation reads recipes and plans and produces a list; it never
/// mutates domain data, so regenerating after an input change is safe and
/// idempotent.
///
/// # Errors
///
/// `EmptyPlan` when `meals` is empty; `InvalidServings` when a meal's
/// recipe has zero base servings. Parse failures inside a meal are not
/// errors: they surface as flagged manual-entry lines.
pub fn build_shopping_list(
    registry: &IngredientRegistry,
    meals: &[PlannedMeal],
) -> Result<Vec<ShoppingListLine>, AggregationError> {
    if meals.is_empty() {
        return Err(AggregationError::EmptyPlan);
    }

    let mut groups: HashMap<GroupKey, Group> = HashMap::new();

    for meal in meals {
        for line in &meal.ingredients.ingredients {
            let scaled =
                scale_line(line, meal.base_servings, meal.target_servings).map_err(|_| {
                    AggregationError::InvalidServings {
                        recipe_id: meal.recipe_id,
                    }
                })?;
            let canonical = registry.canonicalize(&scaled.ingredient_text);
            let dimension = scaled.unit.dimension();
            let flagged = scaled.needs_review(DEFAULT_REVIEW_THRESHOLD) || canonical.needs_review;

            let key = GroupKey {
                canonical_id: canonical.id.clone(),
                dimension,
                unitless_unit: (dimension == Dimension::Unitless).then_some(scaled.unit),
            };
            let group = groups.entry(key).or_insert_with(|| Group {
                display_name: canonical.display_name.clone(),
                category: canonical.category,
                contributions: Vec::new(),
                sources: BTreeSet::new(),
                needs_review: false,
            });
            group.contributions.push((scaled.unit, scaled.quantity));
            group.sources.insert(meal.recipe_id);
            group.needs_review |= flagged;
        }

        // Failed lines surface as manual-entry items, never dropped
        for failure in &meal.ingredients.failed_lines {
            let canonical = registry.canonicalize(&failure.raw_text);
            debug!(
                "Carrying unparsed line '{}' into the list for manual entry",
                failure.raw_text
            );
            let key = GroupKey {
                canonical_id: canonical.id.clone(),
                dimension: Dimension::Count,
                unitless_unit: None,
            };
            let group = groups.entry(key).or_insert_with(|| Group {
                display_name: canonical.display_name.clone(),
                category: canonical.category,
                contributions: Vec::new(),
                sources: BTreeSet::new(),
                needs_review: false,
            });
            group
                .contributions
                .push((Unit::Pieces, Quantity::whole(1)));
            group.sources.insert(meal.recipe_id);
            group.needs_review = true;
        }
    }

    let mut lines = Vec::with_capacity(groups.len());
    for (key, group) in groups {
        lines.extend(finalize_group(key, group));
    }

    lines.sort_by(|a, b| {
        (
            a.category.display_order(),
            a.display_name.clone(),
            dimension_order(a.unit.dimension()),
            a.unit.display_name(),
        )
            .cmp(&(
                b.category.display_order(),
                b.display_name.clone(),
                dimension_order(b.unit.dimension()),
                b.unit.display_name(),
            ))
    });

    info!(
        "Built shopping list: {} lines from {} meals",
        lines.len(),
        meals.len()
    );
    Ok(lines)
}

/// Collapse one group into consolidated lines.
///
/// Normally a group becomes exactly one line. A conversion refusal inside a
/// group (which grouping by dimension should prevent) keeps the offending
/// quantity on its own line instead of forcing a merge.
fn finalize_group(key: GroupKey, group: Group) -> Vec<ShoppingListLine> {
    let mut units: Vec<Unit> = Vec::new();
    for (unit, _) in &group.contributions {
        if !units.contains(unit) {
            units.push(*unit);
        }
    }

    let make_line = |unit: Unit, quantity: Quantity| ShoppingListLine {
        canonical_ingredient_id: key.canonical_id.clone(),
        display_name: group.display_name.clone(),
        unit,
        quantity,
        source_recipe_ids: group.sources.clone(),
        category: group.category,
        needs_review: group.needs_review,
    };

    // All units match: sum directly and keep the unit
    if units.len() == 1 {
        let unit = units[0];
        let mut total: Option<Quantity> = None;
        for (_, quantity) in &group.contributions {
            total = Some(match total {
                None => quantity.clone(),
                Some(sum) => sum.sum(quantity),
            });
        }
        return match total {
            Some(total) => vec![make_line(unit, total)],
            None => Vec::new(),
        };
    }

    // Mixed units in one dimension: convert to the most granular present
    let Some(target) = most_granular_unit(&units) else {
        return Vec::new();
    };

    let mut total: Option<Quantity> = None;
    let mut separate = Vec::new();
    for (unit, quantity) in &group.contributions {
        match convert(quantity, *unit, target) {
            Ok(converted) => {
                total = Some(match total {
                    None => converted,
                    Some(sum) => sum.sum(&converted),
                });
            }
            Err(_) => separate.push(make_line(*unit, quantity.clone())),
        }
    }

    let mut lines = Vec::new();
    if let Some(total) = total {
        lines.push(make_line(target, total));
    }
    lines.extend(separate);
    lines
}
