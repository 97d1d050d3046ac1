#[cfg(test)]
mod tests {
    use fraction::Fraction;
    use groceries::aggregator::PlannedMeal;
    use groceries::canonicalizer::IngredientRegistry;
    use groceries::categorizer::{categorize, Category};
    use groceries::model::ParseStatus;
    use groceries::pipeline::{
        format_shopping_list_for_display, generate_shopping_list, parse_recipe,
    };
    use groceries::scaler::scale_line;
    use groceries::unit_model::Unit;

    const PANCAKES: &str = "\
2 cups all-purpose flour
2 1/2 tsp baking powder
1/2 tsp salt
2 tbsp sugar
1 1/4 cups milk
1 egg
3 tbsp butter, melted";

    const OMELETTE: &str = "\
3 eggs
1 tbsp butter
1/4 cup milk
salt to taste
a pinch of love";

    #[test]
    fn test_parse_recipe_block() {
        let block = parse_recipe(PANCAKES);
        assert_eq!(block.parsed_count(), 7);
        assert_eq!(block.failed_count(), 0);
        assert!(block.overall_confidence > 0.9);

        let flour = &block.ingredients[0];
        assert_eq!(flour.ingredient_text, "all-purpose flour");
        assert_eq!(flour.unit, Unit::Cups);
        assert_eq!(flour.status, ParseStatus::Parsed);

        let butter = &block.ingredients[6];
        assert_eq!(butter.descriptors, vec!["melted".to_string()]);
    }

    #[test]
    fn test_scale_then_aggregate_two_recipes() {
        let registry = IngredientRegistry::with_seed_data();
        let meals = vec![
            PlannedMeal {
                recipe_id: 1,
                base_servings: 4,
                target_servings: 8,
                ingredients: parse_recipe(PANCAKES),
            },
            PlannedMeal {
                recipe_id: 2,
                base_servings: 2,
                target_servings: 2,
                ingredients: parse_recipe(OMELETTE),
            },
        ];

        let list = generate_shopping_list(&registry, &meals).unwrap();

        // Butter from both recipes: 6 tbsp (scaled) + 1 tbsp
        let butter = list
            .iter()
            .find(|l| l.canonical_ingredient_id == "butter")
            .unwrap();
        assert_eq!(butter.unit, Unit::Tablespoons);
        assert_eq!(butter.quantity.amount, Fraction::new(7u64, 1u64));
        assert_eq!(butter.source_recipe_ids.len(), 2);

        // Milk: 2 1/2 cups + 1/4 cup = 2 3/4 cups
        let milk = list
            .iter()
            .find(|l| l.canonical_ingredient_id == "milk")
            .unwrap();
        assert_eq!(milk.unit, Unit::Cups);
        assert_eq!(milk.quantity.amount, Fraction::new(11u64, 4u64));

        // Eggs: 2 (scaled) + 3 = 5 pieces
        let eggs = list
            .iter()
            .find(|l| l.canonical_ingredient_id == "egg")
            .unwrap();
        assert_eq!(eggs.unit, Unit::Pieces);
        assert_eq!(eggs.quantity.amount, Fraction::new(5u64, 1u64));

        // The joke ingredient surfaces flagged instead of failing the build
        let love = list
            .iter()
            .find(|l| l.canonical_ingredient_id == "love")
            .unwrap();
        assert!(love.needs_review);
        assert_eq!(categorize(&registry, "love"), Category::Other);
    }

    #[test]
    fn test_display_output_shape() {
        let registry = IngredientRegistry::with_seed_data();
        let meals = vec![PlannedMeal {
            recipe_id: 1,
            base_servings: 2,
            target_servings: 4,
            ingredients: parse_recipe(OMELETTE),
        }];

        let list = generate_shopping_list(&registry, &meals).unwrap();
        let display = format_shopping_list_for_display(&list);

        assert!(display.contains("Dairy:"));
        assert!(display.contains("Spices:"));
        assert!(display.contains("Other:"));
        // Display names are canonical (singular) forms
        assert!(display.contains("6 egg"));
        assert!(display.contains("! "));
        assert!(display.contains("[recipes 1]"));
    }

    #[test]
    fn test_scaled_lines_are_derived_not_mutated() {
        let block = parse_recipe(PANCAKES);
        let original = block.ingredients[0].clone();
        let scaled = scale_line(&original, 4, 12).unwrap();

        assert_eq!(scaled.quantity.amount, Fraction::new(6u64, 1u64));
        assert_eq!(scaled.status, ParseStatus::Normalized);
        assert_eq!(block.ingredients[0], original);
    }

    #[test]
    fn test_registry_growth_only_for_unknowns() {
        let registry = IngredientRegistry::with_seed_data();
        let before = registry.len();

        let meals = vec![PlannedMeal {
            recipe_id: 1,
            base_servings: 1,
            target_servings: 1,
            ingredients: parse_recipe(PANCAKES),
        }];
        generate_shopping_list(&registry, &meals).unwrap();
        // Every pancake ingredient is seeded; nothing new was created
        assert_eq!(registry.len(), before);

        let meals = vec![PlannedMeal {
            recipe_id: 2,
            base_servings: 1,
            target_servings: 1,
            ingredients: parse_recipe(OMELETTE),
        }];
        generate_shopping_list(&registry, &meals).unwrap();
        // Only "love" is new
        assert_eq!(registry.len(), before + 1);
    }
}
