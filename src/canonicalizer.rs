//! # Ingredient Canonicalizer
//!
//! Maps free-text ingredient names onto stable canonical identities so that
//! "diced yellow onions", "Yellow Onion" and "onion" all land on the same
//! shopping-list line.
//!
//! ## Matching order
//!
//! 1. Exact match on the synonym table
//! 2. Match after normalization (lowercase, trim, descriptor stripping,
//!    singularization with an irregular-plural exception list)
//! 3. Bounded edit-distance fuzzy match against known canonical names
//! 4. Create a new entry flagged `needs_review` with category `Other`
//!
//! Step 4 means canonicalization never fails: novel ingredients surface for
//! later curation instead of blocking list generation.
//!
//! ## Concurrency
//!
//! Parsing and scaling are pure and freely parallel; the registry is the one
//! piece of shared state. New-entry creation goes through the map's entry
//! API, which serializes writers per key while leaving unrelated names
//! concurrent — at most one canonical entry is ever created per distinct
//! normalized name, without a global lock.

use dashmap::DashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::categorizer::Category;
use crate::line_parser::is_descriptor_word;

/// The deduplicated identity an ingredient name resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIngredient {
    /// Stable unique id (slug of the normalized name)
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Grocery category for display ordering
    pub category: Category,
    /// Accepted spellings, many-to-one onto this id
    pub synonyms: BTreeSet<String>,
    /// Set when this entry was created by best-effort fallback and should be
    /// confirmed by a human
    pub needs_review: bool,
}

/// Plurals the suffix rules get wrong
const IRREGULAR_PLURALS: [(&str, &str); 4] = [
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("halves", "half"),
    ("knives", "knife"),
];

/// Words that end in "s" without being plural
const NOT_PLURAL: [&str; 6] = [
    "molasses",
    "couscous",
    "hummus",
    "asparagus",
    "citrus",
    "watercress",
];

/// Strip a plural suffix from one word
fn singularize(word: &str) -> String {
    if word.len() <= 3 || NOT_PLURAL.contains(&word) {
        return word.to_string();
    }
    for (plural, singular) in IRREGULAR_PLURALS {
        if word == plural {
            return singular.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
    }
    for suffix in ["oes", "xes", "ches", "shes", "sses"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with("ss") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }
    word.to_string()
}

/// Normalize an ingredient name for identity lookup: lowercase, trim,
/// drop descriptor words the parser would have separated, singularize the
/// head noun.
pub fn normalize_name(text: &str) -> String {
    let lower: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '\'' | '’'))
        .collect();
    let lower = lower
        .strip_prefix("d'")
        .or_else(|| lower.strip_prefix("l'"))
        .unwrap_or(&lower);

    let mut words: Vec<String> = lower
        .split_whitespace()
        .filter(|w| !is_descriptor_word(w))
        .map(|w| w.to_string())
        .collect();

    if let Some(last) = words.pop() {
        words.push(singularize(&last));
    }

    if words.is_empty() {
        // The whole text was descriptors; keep it rather than return nothing
        return lower.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    words.join(" ")
}

fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || c == '\'' || c == '’' {
                '-'
            } else {
                c
            }
        })
        .collect()
}

/// Levenshtein distance, abandoned early once it exceeds `max`
fn bounded_edit_distance(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            current[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(current[j] + 1);
            row_min = row_min.min(current[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut current);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

/// Maximum edit distance allowed for a name of the given length
fn fuzzy_threshold(len: usize) -> usize {
    match len {
        0..=3 => 0,
        4 => 1,
        _ => 2,
    }
}

/// Curated seed table: canonical name, category, synonyms.
/// Names and synonyms are pre-normalized (lowercase, singular).
static SEED_INGREDIENTS: &[(&str, Category, &[&str])] = &[
    // Produce
    ("onion", Category::Produce, &["yellow onion", "white onion", "red onion"]),
    ("garlic", Category::Produce, &[]),
    ("tomato", Category::Produce, &["roma tomato", "cherry tomato"]),
    ("potato", Category::Produce, &["russet potato"]),
    ("sweet potato", Category::Produce, &["yam"]),
    ("carrot", Category::Produce, &[]),
    ("celery", Category::Produce, &["celery stalk"]),
    ("bell pepper", Category::Produce, &["red bell pepper", "green bell pepper", "capsicum"]),
    ("cucumber", Category::Produce, &[]),
    ("zucchini", Category::Produce, &["courgette"]),
    ("broccoli", Category::Produce, &[]),
    ("cauliflower", Category::Produce, &[]),
    ("spinach", Category::Produce, &["baby spinach"]),
    ("kale", Category::Produce, &[]),
    ("lettuce", Category::Produce, &["romaine lettuce", "iceberg lettuce"]),
    ("cabbage", Category::Produce, &[]),
    ("mushroom", Category::Produce, &["button mushroom", "cremini mushroom"]),
    ("avocado", Category::Produce, &[]),
    ("ginger", Category::Produce, &["ginger root"]),
    ("scallion", Category::Produce, &["green onion", "spring onion"]),
    ("cilantro", Category::Produce, &["coriander leaf"]),
    ("parsley", Category::Produce, &["flat-leaf parsley"]),
    ("basil", Category::Produce, &[]),
    ("mint", Category::Produce, &[]),
    ("thyme", Category::Produce, &[]),
    ("rosemary", Category::Produce, &[]),
    ("lemon", Category::Produce, &[]),
    ("lime", Category::Produce, &[]),
    ("apple", Category::Produce, &[]),
    ("banana", Category::Produce, &[]),
    ("orange", Category::Produce, &[]),
    ("strawberry", Category::Produce, &[]),
    ("blueberry", Category::Produce, &[]),
    // Dairy
    ("milk", Category::Dairy, &["whole milk", "skim milk"]),
    ("butter", Category::Dairy, &["unsalted butter", "salted butter"]),
    ("egg", Category::Dairy, &[]),
    ("cheese", Category::Dairy, &[]),
    ("cheddar", Category::Dairy, &["cheddar cheese"]),
    ("mozzarella", Category::Dairy, &["mozzarella cheese"]),
    ("parmesan", Category::Dairy, &["parmesan cheese", "parmigiano reggiano"]),
    ("feta", Category::Dairy, &["feta cheese"]),
    ("yogurt", Category::Dairy, &["yoghurt", "greek yogurt"]),
    ("heavy cream", Category::Dairy, &["whipping cream", "double cream"]),
    ("sour cream", Category::Dairy, &["crème fraîche"]),
    ("cream cheese", Category::Dairy, &[]),
    // Meat & seafood
    ("chicken", Category::MeatSeafood, &[]),
    ("chicken breast", Category::MeatSeafood, &[]),
    ("chicken thigh", Category::MeatSeafood, &[]),
    ("ground beef", Category::MeatSeafood, &["minced beef", "beef mince"]),
    ("beef", Category::MeatSeafood, &[]),
    ("steak", Category::MeatSeafood, &[]),
    ("pork", Category::MeatSeafood, &[]),
    ("pork chop", Category::MeatSeafood, &[]),
    ("bacon", Category::MeatSeafood, &[]),
    ("ham", Category::MeatSeafood, &[]),
    ("sausage", Category::MeatSeafood, &[]),
    ("turkey", Category::MeatSeafood, &[]),
    ("lamb", Category::MeatSeafood, &[]),
    ("salmon", Category::MeatSeafood, &["salmon fillet"]),
    ("tuna", Category::MeatSeafood, &[]),
    ("cod", Category::MeatSeafood, &[]),
    ("shrimp", Category::MeatSeafood, &["prawn"]),
    // Pantry
    ("flour", Category::Pantry, &["all-purpose flour", "plain flour", "farine"]),
    ("bread flour", Category::Pantry, &[]),
    ("sugar", Category::Pantry, &["granulated sugar", "white sugar", "caster sugar"]),
    ("brown sugar", Category::Pantry, &[]),
    ("powdered sugar", Category::Pantry, &["icing sugar", "confectioner's sugar"]),
    ("rice", Category::Pantry, &["white rice", "long-grain rice"]),
    ("brown rice", Category::Pantry, &[]),
    ("pasta", Category::Pantry, &[]),
    ("spaghetti", Category::Pantry, &[]),
    ("oat", Category::Pantry, &["rolled oat"]),
    ("quinoa", Category::Pantry, &[]),
    ("olive oil", Category::Pantry, &["extra virgin olive oil", "huile d'olive"]),
    ("vegetable oil", Category::Pantry, &["canola oil"]),
    ("coconut oil", Category::Pantry, &[]),
    ("sesame oil", Category::Pantry, &[]),
    ("soy sauce", Category::Pantry, &[]),
    ("fish sauce", Category::Pantry, &[]),
    ("vinegar", Category::Pantry, &["white vinegar"]),
    ("balsamic vinegar", Category::Pantry, &[]),
    ("rice vinegar", Category::Pantry, &[]),
    ("honey", Category::Pantry, &[]),
    ("maple syrup", Category::Pantry, &[]),
    ("peanut butter", Category::Pantry, &[]),
    ("baking powder", Category::Pantry, &[]),
    ("baking soda", Category::Pantry, &["bicarbonate of soda"]),
    ("yeast", Category::Pantry, &["active dry yeast", "instant yeast", "levure"]),
    ("vanilla extract", Category::Pantry, &["vanilla"]),
    ("cocoa powder", Category::Pantry, &[]),
    ("chocolate chip", Category::Pantry, &[]),
    ("chicken broth", Category::Pantry, &["chicken stock"]),
    ("beef broth", Category::Pantry, &["beef stock"]),
    ("vegetable broth", Category::Pantry, &["vegetable stock"]),
    ("tomato paste", Category::Pantry, &[]),
    ("tomato sauce", Category::Pantry, &[]),
    ("canned tomato", Category::Pantry, &["diced tomato", "crushed tomato"]),
    ("black bean", Category::Pantry, &[]),
    ("kidney bean", Category::Pantry, &[]),
    ("chickpea", Category::Pantry, &["garbanzo bean"]),
    ("lentil", Category::Pantry, &[]),
    ("almond", Category::Pantry, &[]),
    ("walnut", Category::Pantry, &[]),
    ("peanut", Category::Pantry, &[]),
    ("cornstarch", Category::Pantry, &["corn starch", "cornflour"]),
    ("bread", Category::Pantry, &["pain"]),
    ("tortilla", Category::Pantry, &[]),
    // Spices
    ("salt", Category::Spices, &["kosher salt", "sea salt", "table salt", "sel"]),
    ("black pepper", Category::Spices, &["pepper", "ground black pepper", "poivre"]),
    ("paprika", Category::Spices, &["smoked paprika"]),
    ("cumin", Category::Spices, &["ground cumin"]),
    ("coriander", Category::Spices, &["ground coriander"]),
    ("cinnamon", Category::Spices, &["ground cinnamon"]),
    ("nutmeg", Category::Spices, &[]),
    ("turmeric", Category::Spices, &[]),
    ("oregano", Category::Spices, &[]),
    ("chili powder", Category::Spices, &[]),
    ("cayenne pepper", Category::Spices, &["cayenne"]),
    ("garlic powder", Category::Spices, &[]),
    ("onion powder", Category::Spices, &[]),
    ("red pepper flake", Category::Spices, &["chili flake"]),
    ("bay leaf", Category::Spices, &[]),
    ("curry powder", Category::Spices, &[]),
    ("ground clove", Category::Spices, &[]),
    // Frozen
    ("frozen pea", Category::Frozen, &[]),
    ("frozen corn", Category::Frozen, &[]),
    ("frozen spinach", Category::Frozen, &[]),
    ("frozen berry", Category::Frozen, &[]),
    ("ice cream", Category::Frozen, &[]),
    ("puff pastry", Category::Frozen, &[]),
];

/// Concurrent canonical-ingredient registry.
///
/// Lookups are lock-free reads; entry creation is serialized per key by the
/// map's sharded entry API, so concurrent canonicalization of different
/// names never contends and the same unseen name is only created once.
pub struct IngredientRegistry {
    /// Canonical entries keyed by id
    entries: DashMap<String, CanonicalIngredient>,
    /// Accepted spellings (normalized) to canonical id, many-to-one
    aliases: DashMap<String, String>,
}

impl IngredientRegistry {
    /// Create an empty registry with no seed data
    pub fn empty() -> Self {
        Self {
            entries: DashMap::new(),
            aliases: DashMap::new(),
        }
    }

    /// Create a registry pre-populated with the curated ingredient table
    pub fn with_seed_data() -> Self {
        let registry = Self::empty();
        for (name, category, synonyms) in SEED_INGREDIENTS {
            let mut synonym_set: BTreeSet<String> =
                synonyms.iter().map(|s| s.to_string()).collect();
            synonym_set.insert(name.to_string());
            registry.register(CanonicalIngredient {
                id: slugify(name),
                display_name: name.to_string(),
                category: *category,
                synonyms: synonym_set,
                needs_review: false,
            });
        }
        info!("Seeded ingredient registry with {} entries", registry.len());
        registry
    }

    /// Insert or replace a canonical entry and index all its synonyms
    pub fn register(&self, entry: CanonicalIngredient) {
        self.aliases
            .insert(normalize_name(&entry.display_name), entry.id.clone());
        for synonym in &entry.synonyms {
            self.aliases
                .insert(normalize_name(synonym), entry.id.clone());
        }
        self.entries.insert(entry.id.clone(), entry);
    }

    /// Fetch a canonical entry by id
    pub fn get(&self, id: &str) -> Option<CanonicalIngredient> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Number of canonical entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, ordered by id for deterministic output
    pub fn entries(&self) -> Vec<CanonicalIngredient> {
        let mut all: Vec<CanonicalIngredient> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Resolve a free-text ingredient name to its canonical identity.
    ///
    /// Never fails: unmatched names create a new entry flagged
    /// `needs_review` with category `Other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use groceries::canonicalizer::IngredientRegistry;
    ///
    /// let registry = IngredientRegistry::with_seed_data();
    /// let entry = registry.canonicalize("diced Yellow Onions");
    /// assert_eq!(entry.id, "onion");
    /// assert!(!entry.needs_review);
    /// ```
    pub fn canonicalize(&self, ingredient_text: &str) -> CanonicalIngredient {
        // (a) exact match on the synonym table
        let raw = ingredient_text.trim().to_lowercase();
        if let Some(id) = self.aliases.get(raw.as_str()) {
            if let Some(entry) = self.get(id.value()) {
                return entry;
            }
        }

        // (b) match after normalization
        let normalized = normalize_name(ingredient_text);
        if let Some(id) = self.aliases.get(normalized.as_str()) {
            if let Some(entry) = self.get(id.value()) {
                return entry;
            }
        }

        // (c) bounded edit-distance fuzzy match against canonical names
        let max_distance = fuzzy_threshold(normalized.chars().count());
        if max_distance > 0 {
            let mut best: Option<(usize, String)> = None;
            for entry in self.entries.iter() {
                let candidate = &entry.value().display_name;
                if let Some(distance) =
                    bounded_edit_distance(&normalized, candidate, max_distance)
                {
                    let better = match &best {
                        None => true,
                        Some((best_distance, best_id)) => {
                            distance < *best_distance
                                || (distance == *best_distance && entry.key() < best_id)
                        }
                    };
                    if better {
                        best = Some((distance, entry.key().clone()));
                    }
                }
            }
            if let Some((distance, id)) = best {
                if let Some(entry) = self.get(&id) {
                    debug!(
                        "Fuzzy-matched '{}' to '{}' (distance {})",
                        ingredient_text, entry.display_name, distance
                    );
                    // Remember the spelling so the next lookup is exact
                    self.aliases.entry(normalized).or_insert(id);
                    return entry;
                }
            }
        }

        // (d) create a new entry for review; at most one per normalized name
        let id = slugify(&normalized);
        let created = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| {
                info!(
                    "Creating canonical entry '{}' for unknown ingredient '{}'",
                    id, ingredient_text
                );
                let mut synonyms = BTreeSet::new();
                synonyms.insert(normalized.clone());
                CanonicalIngredient {
                    id: id.clone(),
                    display_name: normalized.clone(),
                    category: Category::Other,
                    synonyms,
                    needs_review: true,
                }
            })
            .value()
            .clone();
        self.aliases.entry(normalized).or_insert(id);
        created
    }
}

impl Default for IngredientRegistry {
    fn default() -> Self {
        Self::with_seed_data()
    }
}
