#[cfg(test)]
mod tests {
    use anyhow::Result;
    use groceries::canonicalizer::IngredientRegistry;
    use groceries::categorizer::Category;
    use groceries::db::{
        init_registry_schema, load_registry, save_registry, set_ingredient_category,
    };
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn setup_test_db() -> Result<(Connection, NamedTempFile)> {
        let temp_file = NamedTempFile::new()?;
        let conn = Connection::open(temp_file.path())?;
        init_registry_schema(&conn)?;
        Ok((conn, temp_file))
    }

    #[test]
    fn test_schema_init_is_idempotent() -> Result<()> {
        let (conn, _temp_file) = setup_test_db()?;
        init_registry_schema(&conn)?;
        init_registry_schema(&conn)?;
        Ok(())
    }

    #[test]
    fn test_discovered_ingredients_survive_sessions() -> Result<()> {
        let (conn, _temp_file) = setup_test_db()?;

        // Session one discovers an unknown ingredient and saves
        {
            let registry = IngredientRegistry::with_seed_data();
            let entry = registry.canonicalize("yuzu kosho");
            assert!(entry.needs_review);
            save_registry(&conn, &registry)?;
        }

        // Session two loads it back, still flagged for review
        let registry = load_registry(&conn)?;
        let entry = registry.canonicalize("yuzu kosho");
        assert!(entry.needs_review);
        assert_eq!(entry.category, Category::Other);

        Ok(())
    }

    #[test]
    fn test_curation_survives_sessions() -> Result<()> {
        let (conn, _temp_file) = setup_test_db()?;

        let registry = IngredientRegistry::with_seed_data();
        let entry = registry.canonicalize("yuzu kosho");
        save_registry(&conn, &registry)?;

        // A human assigns the category
        assert!(set_ingredient_category(&conn, &entry.id, Category::Pantry)?);

        let reloaded = load_registry(&conn)?;
        let curated = reloaded.canonicalize("yuzu kosho");
        assert_eq!(curated.category, Category::Pantry);
        assert!(!curated.needs_review);

        Ok(())
    }

    #[test]
    fn test_save_twice_inserts_nothing_new() -> Result<()> {
        let (conn, _temp_file) = setup_test_db()?;

        let registry = IngredientRegistry::with_seed_data();
        let inserted = save_registry(&conn, &registry)?;
        assert_eq!(inserted, registry.len());
        assert_eq!(save_registry(&conn, &registry)?, 0);

        // A new discovery adds exactly one row
        registry.canonicalize("yuzu kosho");
        assert_eq!(save_registry(&conn, &registry)?, 1);

        Ok(())
    }

    #[test]
    fn test_synonyms_round_trip_through_storage() -> Result<()> {
        let (conn, _temp_file) = setup_test_db()?;

        let registry = IngredientRegistry::with_seed_data();
        save_registry(&conn, &registry)?;

        let loaded = load_registry(&conn)?;
        let entry = loaded.canonicalize("green onions");
        assert_eq!(entry.id, "scallion");
        assert!(entry.synonyms.contains("green onion"));

        Ok(())
    }
}
