use anyhow::{Context, Result};
use log::info;
use rusqlite::Connection;
use std::env;
use std::io::Read;

use groceries::aggregator::PlannedMeal;
use groceries::canonicalizer::IngredientRegistry;
use groceries::db;
use groceries::pipeline::{format_shopping_list_for_display, generate_shopping_list, parse_recipe};

/// Build a shopping list from a file of ingredient lines (or stdin).
///
/// Usage: groceries [recipe-file] [base-servings] [target-servings]
///
/// Set REGISTRY_DB to a SQLite path to persist canonical ingredients
/// (including review-flagged entries for unknown ingredients) across runs.
fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let text = match args.get(1) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file '{}'", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read ingredient lines from stdin")?;
            buffer
        }
    };

    let base_servings: u32 = args
        .get(2)
        .map(|s| s.parse())
        .transpose()
        .context("Base servings must be a whole number")?
        .unwrap_or(1);
    let target_servings: u32 = args
        .get(3)
        .map(|s| s.parse())
        .transpose()
        .context("Target servings must be a whole number")?
        .unwrap_or(base_servings);

    // Optional persistent registry
    let conn = match env::var("REGISTRY_DB") {
        Ok(path) => {
            info!("Opening ingredient registry at: {}", path);
            Some(Connection::open(&path)?)
        }
        Err(_) => None,
    };

    let registry = match &conn {
        Some(conn) => {
            db::init_registry_schema(conn)?;
            db::load_registry(conn)?
        }
        None => IngredientRegistry::with_seed_data(),
    };

    let meal = PlannedMeal {
        recipe_id: 1,
        base_servings,
        target_servings,
        ingredients: parse_recipe(&text),
    };

    let list = generate_shopping_list(&registry, &[meal])?;
    print!("{}", format_shopping_list_for_display(&list));

    // Remember any newly discovered ingredients for next time
    if let Some(conn) = &conn {
        db::save_registry(conn, &registry)?;
    }

    Ok(())
}
