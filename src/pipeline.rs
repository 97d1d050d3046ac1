//! # End-to-End Pipeline
//!
//! Convenience functions tying the stages together: raw recipe text through
//! parsing, canonicalization, scaling and aggregation to a displayable
//! shopping list.

use log::info;

use crate::aggregator::{build_shopping_list, AggregationError, PlannedMeal, ShoppingListLine};
use crate::canonicalizer::IngredientRegistry;
use crate::line_parser::parse_ingredient_line;
use crate::model::RecipeIngredients;
use crate::unit_model::Unit;

/// Parse a block of recipe text, one ingredient per line.
///
/// Lines that cannot be decomposed are kept as failures; a single malformed
/// line never aborts the rest of the block.
pub fn parse_recipe(text: &str) -> RecipeIngredients {
    let mut block = RecipeIngredients::new(text.to_string());

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_ingredient_line(line) {
            Ok(parsed) => block.add_ingredient(parsed),
            Err(failure) => block.add_failed_line(failure),
        }
    }

    info!(
        "Parsed recipe: {} ingredients, {} failed lines, {:.1}% confidence",
        block.parsed_count(),
        block.failed_count(),
        block.overall_confidence * 100.0
    );
    block
}

/// Build the shopping list for a meal plan.
///
/// Thin wrapper over the aggregator; exists so callers have one entry point
/// from planned meals to a finished list.
pub fn generate_shopping_list(
    registry: &IngredientRegistry,
    meals: &[PlannedMeal],
) -> Result<Vec<ShoppingListLine>, AggregationError> {
    let list = build_shopping_list(registry, meals)?;
    info!("Generated shopping list with {} lines", list.len());
    Ok(list)
}

/// Render a shopping list as plain text, grouped under category headers.
///
/// Lines produced by best-effort fallback are marked with `!` so the
/// surrounding application can draw attention to them; they are part of the
/// list, not errors.
pub fn format_shopping_list_for_display(lines: &[ShoppingListLine]) -> String {
    let mut output = String::new();
    let mut current_category = None;

    for line in lines {
        if current_category != Some(line.category) {
            if current_category.is_some() {
                output.push('\n');
            }
            output.push_str(line.category.as_str());
            output.push_str(":\n");
            current_category = Some(line.category);
        }

        let marker = if line.needs_review { '!' } else { '-' };
        output.push_str(&format!("  {} {}", marker, line.quantity));
        if line.unit != Unit::Pieces {
            output.push_str(&format!(" {}", line.unit.display_name()));
        }
        output.push_str(&format!(" {}", line.display_name));

        if !line.source_recipe_ids.is_empty() {
            let sources: Vec<String> = line
                .source_recipe_ids
                .iter()
                .map(|id| id.to_string())
                .collect();
            output.push_str(&format!(" [recipes {}]", sources.join(", ")));
        }
        output.push('\n');
    }

    output
}
