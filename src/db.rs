//! # Canonical Ingredient Registry Storage
//!
//! SQLite persistence for the canonical-ingredient registry. The core treats
//! storage as a key-value lookup plus insert-if-absent; rows created by the
//! unknown-ingredient fallback keep their `needs_review` flag until a human
//! curates them via [`set_ingredient_category`].

use anyhow::{Context, Result};
use log::info;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

use crate::canonicalizer::{CanonicalIngredient, IngredientRegistry};
use crate::categorizer::Category;

/// Initialize the registry schema
pub fn init_registry_schema(conn: &Connection) -> Result<()> {
    info!("Initializing ingredient registry schema...");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS canonical_ingredients (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            category TEXT NOT NULL,
            synonyms TEXT NOT NULL,
            needs_review INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create canonical_ingredients table")?;

    info!("Ingredient registry schema initialized");
    Ok(())
}

/// Persist every registry entry that is not already stored.
///
/// Uses `INSERT OR IGNORE`, so an id written by an earlier session (or a
/// concurrent writer) is left untouched: one canonical row per id.
///
/// # Returns
///
/// The number of newly inserted rows.
pub fn save_registry(conn: &Connection, registry: &IngredientRegistry) -> Result<usize> {
    let mut inserted = 0;

    for entry in registry.entries() {
        let synonyms = serde_json::to_string(&entry.synonyms)
            .context("Failed to serialize ingredient synonyms")?;
        let created_at = chrono::Utc::now().to_rfc3339();

        inserted += conn
            .execute(
                "INSERT OR IGNORE INTO canonical_ingredients
                 (id, display_name, category, synonyms, needs_review, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.id,
                    entry.display_name,
                    entry.category.as_str(),
                    synonyms,
                    entry.needs_review,
                    created_at
                ],
            )
            .context("Failed to insert canonical ingredient")?;
    }

    info!("Saved registry: {} new entries", inserted);
    Ok(inserted)
}

/// Load the registry: the curated seed table overlaid with every stored row.
///
/// Stored rows win, so curation done in the database (categories assigned,
/// review flags cleared) survives across sessions.
pub fn load_registry(conn: &Connection) -> Result<IngredientRegistry> {
    let registry = IngredientRegistry::with_seed_data();

    let mut stmt = conn
        .prepare(
            "SELECT id, display_name, category, synonyms, needs_review
             FROM canonical_ingredients",
        )
        .context("Failed to prepare registry load statement")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
            ))
        })
        .context("Failed to query canonical ingredients")?;

    let mut loaded = 0;
    for row in rows {
        let (id, display_name, category, synonyms, needs_review) =
            row.context("Failed to read canonical ingredient row")?;
        let synonyms: BTreeSet<String> = serde_json::from_str(&synonyms)
            .context("Failed to parse stored ingredient synonyms")?;

        registry.register(CanonicalIngredient {
            id,
            display_name,
            category: Category::from_str_lossy(&category),
            synonyms,
            needs_review,
        });
        loaded += 1;
    }

    info!("Loaded registry: {} stored entries", loaded);
    Ok(registry)
}

/// Assign a category to a stored ingredient and clear its review flag.
///
/// This is the curation hook for entries created by the unknown-ingredient
/// fallback. Merging two canonical ids is a manual operation outside the
/// core and is deliberately not offered here.
///
/// # Returns
///
/// `true` when a row was updated, `false` when the id is unknown.
pub fn set_ingredient_category(conn: &Connection, id: &str, category: Category) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE canonical_ingredients SET category = ?1, needs_review = 0 WHERE id = ?2",
            params![category.as_str(), id],
        )
        .context("Failed to update ingredient category")?;

    if rows_affected > 0 {
        info!("Categorized ingredient '{}' as {}", id, category.as_str());
        Ok(true)
    } else {
        info!("No ingredient found with id '{}'", id);
        Ok(false)
    }
}
