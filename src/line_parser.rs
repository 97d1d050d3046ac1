//! # Ingredient Line Parser
//!
//! This module consumes the lexer's token stream and produces a structured
//! [`ParsedIngredientLine`] or a [`ParseFailure`]. It handles the bounded
//! grammar recipes actually use, not arbitrary prose:
//!
//! `[Quantity] [Unit]? [Descriptors]* IngredientName [, Descriptors]*`
//!
//! ## Features
//!
//! - Fractions ("1/2", "2 1/4"), ranges ("2-3", "1 to 2"), decimals
//! - Quantity is optional and defaults to 1 piece ("salt to taste")
//! - Articles ("a", "an") read as a quantity of 1
//! - Adjectives from a descriptor stoplist are kept out of the name
//! - Ambiguous quantities ("to taste", "as needed") cap confidence at 0.6
//! - Failure is a value, never an exception: callers branch on the result
//!
//! ## Usage
//!
//! ```rust
//! use groceries::line_parser::parse_ingredient_line;
//!
//! let line = parse_ingredient_line("2 1/2 cups diced yellow onion, finely chopped").unwrap();
//! assert_eq!(line.ingredient_text, "yellow onion");
//! assert_eq!(line.descriptors, vec!["diced".to_string(), "finely chopped".to_string()]);
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use crate::lexer::{tokenize, Token};
use crate::model::{ParsedIngredientLine, ParseStatus};
use crate::quantity::{format_fraction, Quantity};
use crate::unit_model::Unit;

/// Adjectives and preparation words that belong in descriptors, not the name
static DESCRIPTOR_STOPLIST: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "diced", "chopped", "minced", "sliced", "grated", "shredded", "peeled", "crushed",
        "melted", "softened", "beaten", "sifted", "rinsed", "drained", "trimmed", "halved",
        "quartered", "cubed", "julienned", "zested", "juiced", "toasted", "packed", "divided",
        "fresh", "dried", "ripe", "raw", "cooked", "boneless", "skinless", "large",
        "small", "medium", "finely", "coarsely", "thinly", "roughly", "lightly",
    ]
    .into_iter()
    .collect()
});

/// Whether a word is a known descriptor adjective
pub(crate) fn is_descriptor_word(word: &str) -> bool {
    DESCRIPTOR_STOPLIST.contains(word.to_lowercase().as_str())
}

/// Prepositions and articles skipped between the measurement and the name
static FILLER_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "of", "the", // French
        "de", "du", "des", "la", "le", "les", "au", "aux",
    ]
    .into_iter()
    .collect()
});

/// Ambiguous quantity indicators
static AMBIGUOUS_INDICATORS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "to taste",
        "as needed",
        "optional",
        "some",
        "a little",
        "a bit",
        "several",
        "few",
        "enough",
        "au goût",
        "selon le goût",
        "facultatif",
    ]
});

/// Confidence cap for lines whose quantity is ambiguous
const AMBIGUOUS_CONFIDENCE: f32 = 0.6;

/// Configuration options for the line parser
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Maximum length for ingredient names (to prevent overly long extractions)
    pub max_name_length: usize,
    /// Lines below this confidence are flagged for manual review downstream
    pub review_threshold: f32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            review_threshold: crate::model::DEFAULT_REVIEW_THRESHOLD,
        }
    }
}

/// Why a line could not be decomposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The line was empty or whitespace
    EmptyLine,
    /// No ingredient-name span could be isolated
    NoIngredientName,
}

/// A line that could not be parsed. The raw text is preserved verbatim so
/// the line can surface for manual entry instead of being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub raw_text: String,
    pub reason: FailureReason,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            FailureReason::EmptyLine => write!(f, "Empty line"),
            FailureReason::NoIngredientName => {
                write!(f, "No ingredient name found in '{}'", self.raw_text)
            }
        }
    }
}

impl std::error::Error for ParseFailure {}

fn is_article(word: &str) -> bool {
    matches!(word.to_lowercase().as_str(), "a" | "an" | "un" | "une")
}

fn is_range_joiner(word: &str) -> bool {
    matches!(word.to_lowercase().as_str(), "to" | "or" | "à")
}

/// Render a token back to text for descriptor segments
fn token_text(token: &Token) -> String {
    match token {
        Token::Word(w) => w.clone(),
        Token::UnitWord { text, .. } => text.clone(),
        Token::Number(n) | Token::Fraction(n) => format_fraction(n),
        Token::Range(lo, hi) => format!("{}-{}", format_fraction(lo), format_fraction(hi)),
        Token::Punctuation(c) => c.to_string(),
    }
}

/// Parse a single ingredient line with default options
pub fn parse_ingredient_line(raw: &str) -> Result<ParsedIngredientLine, ParseFailure> {
    parse_ingredient_line_with(raw, &ParserOptions::default())
}

/// Parse a single ingredient line
///
/// # Arguments
///
/// * `raw` - The raw ingredient line text
/// * `options` - Parser configuration
///
/// # Returns
///
/// A [`ParsedIngredientLine`] on success, or a [`ParseFailure`] when no
/// ingredient-name span can be isolated. Callers must branch on the result;
/// failures are values, not panics.
pub fn parse_ingredient_line_with(
    raw: &str,
    options: &ParserOptions,
) -> Result<ParsedIngredientLine, ParseFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure {
            raw_text: raw.to_string(),
            reason: FailureReason::EmptyLine,
        });
    }

    let tokens = tokenize(trimmed);
    let mut idx = 0;
    let mut confidence = 1.0f32;

    // Quantity
    let mut quantity: Option<Quantity> = None;
    match tokens.get(idx) {
        Some(Token::Range(lo, hi)) => {
            quantity = Some(Quantity::range(lo.clone(), hi.clone()));
            idx += 1;
        }
        Some(Token::Number(n)) => {
            idx += 1;
            match (tokens.get(idx), tokens.get(idx + 1)) {
                // Mixed number: "2 1/2"
                (Some(Token::Fraction(f)), _) => {
                    quantity = Some(Quantity::exact(n.clone() + f.clone()));
                    idx += 1;
                }
                // Worded range: "1 to 2"
                (Some(Token::Word(w)), Some(Token::Number(m))) if is_range_joiner(w) => {
                    quantity = Some(Quantity::range(n.clone(), m.clone()));
                    idx += 2;
                }
                _ => {
                    quantity = Some(Quantity::exact(n.clone()));
                }
            }
        }
        Some(Token::Fraction(f)) => {
            quantity = Some(Quantity::exact(f.clone()));
            idx += 1;
        }
        Some(Token::Word(w)) if is_article(w) => {
            quantity = Some(Quantity::whole(1));
            idx += 1;
        }
        _ => {}
    }

    // Unit
    let mut unit: Option<Unit> = None;
    if let Some(Token::UnitWord { unit: u, .. }) = tokens.get(idx) {
        unit = Some(*u);
        idx += 1;
    }

    // Fillers and pre-name descriptors
    let mut descriptors: Vec<String> = Vec::new();
    while let Some(Token::Word(w)) = tokens.get(idx) {
        let lower = w.to_lowercase();
        if FILLER_WORDS.contains(lower.as_str()) {
            idx += 1;
        } else if DESCRIPTOR_STOPLIST.contains(lower.as_str()) {
            descriptors.push(w.clone());
            idx += 1;
        } else {
            break;
        }
    }

    // Name span: the first contiguous word run
    let mut name_words: Vec<String> = Vec::new();
    let mut ambiguous_boundary = false;
    while idx < tokens.len() {
        match &tokens[idx] {
            Token::Word(w) => {
                let mut word = w.clone();
                // "d'huile" at the start of the name reads as "huile"
                if name_words.is_empty() {
                    for prefix in ["d'", "l'", "d’", "l’"] {
                        if word.starts_with(prefix) && word.len() > prefix.len() {
                            word = word[prefix.len()..].to_string();
                            break;
                        }
                    }
                }
                name_words.push(word);
                idx += 1;
            }
            // A unit word inside the name span ("2 bread slices") is an
            // ambiguous unit/word boundary: keep the word, lower confidence
            Token::UnitWord { text, .. } => {
                name_words.push(text.clone());
                ambiguous_boundary = true;
                idx += 1;
            }
            Token::Number(_) | Token::Fraction(_) | Token::Range(_, _) => {
                ambiguous_boundary = true;
                idx += 1;
            }
            Token::Punctuation(_) => break,
        }
    }

    // Post-name descriptor segments: ", finely chopped" and "(all-purpose)"
    while idx < tokens.len() {
        match &tokens[idx] {
            Token::Punctuation('(') => {
                idx += 1;
                let mut segment: Vec<String> = Vec::new();
                while idx < tokens.len() && tokens[idx] != Token::Punctuation(')') {
                    segment.push(token_text(&tokens[idx]));
                    idx += 1;
                }
                idx += 1; // closing paren, if present
                if !segment.is_empty() {
                    descriptors.push(segment.join(" "));
                }
            }
            Token::Punctuation(_) => {
                idx += 1;
                let mut segment: Vec<String> = Vec::new();
                while idx < tokens.len() {
                    match &tokens[idx] {
                        Token::Punctuation(_) => break,
                        token => {
                            segment.push(token_text(token));
                            idx += 1;
                        }
                    }
                }
                if !segment.is_empty() {
                    descriptors.push(segment.join(" "));
                }
            }
            _ => {
                ambiguous_boundary = true;
                idx += 1;
            }
        }
    }

    // Ambiguous quantity indicators trailing the name move to descriptors
    let mut name_lower = name_words.join(" ").to_lowercase();
    for indicator in AMBIGUOUS_INDICATORS.iter() {
        if name_lower == *indicator {
            // The whole span is an indicator; no name remains
            name_words.clear();
            break;
        }
        let suffix = format!(" {}", indicator);
        if name_lower.ends_with(&suffix) {
            let keep = name_words.len() - indicator.split_whitespace().count();
            name_words.truncate(keep);
            descriptors.push(indicator.to_string());
            confidence = confidence.min(AMBIGUOUS_CONFIDENCE);
            name_lower = name_words.join(" ").to_lowercase();
            break;
        }
    }
    for descriptor in &descriptors {
        if AMBIGUOUS_INDICATORS.contains(&descriptor.to_lowercase().as_str()) {
            confidence = confidence.min(AMBIGUOUS_CONFIDENCE);
        }
    }

    if name_words.is_empty() {
        debug!("No ingredient name span in '{}'", trimmed);
        return Err(ParseFailure {
            raw_text: raw.to_string(),
            reason: FailureReason::NoIngredientName,
        });
    }

    let mut name = name_words.join(" ");
    if name.len() > options.max_name_length {
        let truncated: String = name.chars().take(options.max_name_length).collect();
        name = match truncated.rfind(' ') {
            Some(last_space) => truncated[..last_space].to_string(),
            None => truncated,
        };
        warn!(
            "Ingredient name truncated due to length limit ({}): '{}'",
            options.max_name_length, name
        );
    }

    // Confidence penalties for what the line was missing
    if quantity.is_some() && unit.is_none() {
        confidence *= 0.85;
    }
    if quantity.is_none() {
        confidence *= if unit.is_none() { 0.85 * 0.85 } else { 0.85 };
    }
    if ambiguous_boundary {
        confidence *= 0.9;
    }

    let quantity = quantity.unwrap_or_else(|| Quantity::whole(1));
    let unit = unit.unwrap_or(Unit::Pieces);

    let mut line = ParsedIngredientLine::new(quantity, unit, &name, raw);
    line.descriptors = descriptors;
    line.confidence = confidence.clamp(0.0, 1.0);
    line.status = ParseStatus::Parsed;

    debug!(
        "Parsed '{}' -> name='{}', unit={}, confidence={:.2}",
        trimmed, line.ingredient_text, line.unit, line.confidence
    );
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraction::Fraction;

    #[test]
    fn test_parse_simple_ingredient() {
        let line = parse_ingredient_line("2 cups flour").unwrap();
        assert_eq!(line.ingredient_text, "flour");
        assert_eq!(line.unit, Unit::Cups);
        assert_eq!(line.quantity.amount, Fraction::new(2u64, 1u64));
        assert_eq!(line.confidence, 1.0);
        assert_eq!(line.raw_text, "2 cups flour");
    }

    #[test]
    fn test_parse_fraction_ingredient() {
        let line = parse_ingredient_line("1/2 cup sugar").unwrap();
        assert_eq!(line.ingredient_text, "sugar");
        assert_eq!(line.quantity.amount, Fraction::new(1u64, 2u64));

        let line = parse_ingredient_line("2 1/4 cups butter").unwrap();
        assert_eq!(line.ingredient_text, "butter");
        assert_eq!(line.quantity.amount, Fraction::new(9u64, 4u64));
    }

    #[test]
    fn test_parse_range_ingredient() {
        let line = parse_ingredient_line("2-3 tbsp olive oil").unwrap();
        assert_eq!(line.ingredient_text, "olive oil");
        assert!(line.quantity.is_range());
        assert_eq!(line.quantity.amount, Fraction::new(2u64, 1u64));
        assert_eq!(line.quantity.upper, Some(Fraction::new(3u64, 1u64)));

        let line = parse_ingredient_line("1 to 2 cloves garlic").unwrap();
        assert_eq!(line.ingredient_text, "garlic");
        assert_eq!(line.unit, Unit::Cloves);
        assert!(line.quantity.is_range());
    }

    #[test]
    fn test_parse_descriptors_before_and_after_name() {
        let line =
            parse_ingredient_line("2 1/2 cups diced yellow onion, finely chopped").unwrap();
        assert_eq!(line.ingredient_text, "yellow onion");
        assert_eq!(line.quantity.amount, Fraction::new(5u64, 2u64));
        assert_eq!(line.unit, Unit::Cups);
        assert_eq!(
            line.descriptors,
            vec!["diced".to_string(), "finely chopped".to_string()]
        );
        assert_eq!(line.confidence, 1.0);
    }

    #[test]
    fn test_parse_parenthesized_modifier() {
        let line = parse_ingredient_line("2 cups flour (all-purpose)").unwrap();
        assert_eq!(line.ingredient_text, "flour");
        assert_eq!(line.descriptors, vec!["all-purpose".to_string()]);
    }

    #[test]
    fn test_parse_ambiguous_quantity() {
        let line = parse_ingredient_line("salt to taste").unwrap();
        assert_eq!(line.ingredient_text, "salt");
        assert_eq!(line.descriptors, vec!["to taste".to_string()]);
        assert_eq!(line.quantity.amount, Fraction::new(1u64, 1u64));
        assert_eq!(line.unit, Unit::Pieces);
        assert!(line.confidence <= AMBIGUOUS_CONFIDENCE);
    }

    #[test]
    fn test_parse_no_quantity_defaults_to_one_piece() {
        let line = parse_ingredient_line("eggs").unwrap();
        assert_eq!(line.ingredient_text, "eggs");
        assert_eq!(line.quantity.amount, Fraction::new(1u64, 1u64));
        assert_eq!(line.unit, Unit::Pieces);
        assert!(line.confidence < 1.0);
    }

    #[test]
    fn test_parse_article_as_quantity() {
        let line = parse_ingredient_line("a pinch of love").unwrap();
        assert_eq!(line.ingredient_text, "love");
        assert_eq!(line.unit, Unit::Pinches);
        assert_eq!(line.quantity.amount, Fraction::new(1u64, 1u64));
        assert_eq!(line.confidence, 1.0);
        assert_eq!(line.raw_text, "a pinch of love");
    }

    #[test]
    fn test_parse_missing_unit_reduces_confidence() {
        let line = parse_ingredient_line("3 eggs").unwrap();
        assert_eq!(line.ingredient_text, "eggs");
        assert_eq!(line.unit, Unit::Pieces);
        assert!(line.confidence < 1.0);
        assert!(!line.needs_review(crate::model::DEFAULT_REVIEW_THRESHOLD));
    }

    #[test]
    fn test_parse_no_name_fails() {
        let failure = parse_ingredient_line("2 cups").unwrap_err();
        assert_eq!(failure.reason, FailureReason::NoIngredientName);
        assert_eq!(failure.raw_text, "2 cups");

        let failure = parse_ingredient_line("").unwrap_err();
        assert_eq!(failure.reason, FailureReason::EmptyLine);
    }

    #[test]
    fn test_parse_indicator_only_fails() {
        let failure = parse_ingredient_line("to taste").unwrap_err();
        assert_eq!(failure.reason, FailureReason::NoIngredientName);
    }

    #[test]
    fn test_parse_french_line() {
        let line = parse_ingredient_line("250 g de farine").unwrap();
        assert_eq!(line.ingredient_text, "farine");
        assert_eq!(line.unit, Unit::Grams);
        assert_eq!(line.quantity.amount, Fraction::new(250u64, 1u64));

        let line = parse_ingredient_line("2 cas d'huile d'olive").unwrap();
        assert_eq!(line.ingredient_text, "huile d'olive");
        assert_eq!(line.unit, Unit::Tablespoons);
    }

    #[test]
    fn test_parse_unit_word_inside_name() {
        let line = parse_ingredient_line("2 bread slices").unwrap();
        assert_eq!(line.ingredient_text, "bread slices");
        assert!(line.confidence < 1.0);
    }

    #[test]
    fn test_parse_multi_word_name() {
        let line = parse_ingredient_line("1 tsp baking powder").unwrap();
        assert_eq!(line.ingredient_text, "baking powder");
        assert_eq!(line.unit, Unit::Teaspoons);

        let line = parse_ingredient_line("1 tbsp cream of tartar").unwrap();
        assert_eq!(line.ingredient_text, "cream of tartar");
    }

    #[test]
    fn test_name_length_limit() {
        let options = ParserOptions {
            max_name_length: 20,
            ..Default::default()
        };
        let line = parse_ingredient_line_with(
            "2 cups very-long-ingredient-name-that-should-be-truncated",
            &options,
        )
        .unwrap();
        assert!(line.ingredient_text.len() <= 20);
    }

    #[test]
    fn test_round_trip_render_and_reparse() {
        let original = parse_ingredient_line("2 1/2 cups diced yellow onion, finely chopped")
            .unwrap();
        let rendered = format!("{}", original);
        let reparsed = parse_ingredient_line(&rendered).unwrap();

        assert_eq!(reparsed.quantity, original.quantity);
        assert_eq!(reparsed.unit, original.unit);
        assert_eq!(reparsed.ingredient_text, original.ingredient_text);
    }
}
