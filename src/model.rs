//! # Parsed Ingredient Data Model
//!
//! This module defines the structured form of an ingredient line and the
//! container for a whole recipe's parsed ingredient block.
//!
//! ## Core Concepts
//!
//! - **ParsedIngredientLine**: quantity + unit + name + descriptors, with the
//!   raw text always preserved verbatim for audit and fallback
//! - **ParseStatus**: the lifecycle of a line (`Raw → Parsed → Normalized`,
//!   or `Raw → Failed`)
//! - **RecipeIngredients**: parsed lines plus the lines that could not be
//!   parsed; failures are kept, never dropped
//!
//! A parsed line is immutable once created: scaling and aggregation derive
//! new values instead of mutating sources, so downstream results can always
//! be regenerated deterministically.
//!
//! ## Usage
//!
//! ```rust
//! use groceries::line_parser::parse_ingredient_line;
//!
//! let line = parse_ingredient_line("2 cups flour").unwrap();
//! assert_eq!(line.ingredient_text, "flour");
//! assert_eq!(format!("{}", line), "2 cups flour");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::line_parser::ParseFailure;
use crate::quantity::Quantity;
use crate::unit_model::Unit;

/// Lines with confidence below this are flagged for manual review
pub const DEFAULT_REVIEW_THRESHOLD: f32 = 0.7;

/// Lifecycle of an ingredient line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseStatus {
    /// Raw text, not yet parsed
    Raw,
    /// Successfully decomposed into quantity/unit/name
    Parsed,
    /// Scaled and/or canonicalized; a derived value
    Normalized,
    /// Could not be decomposed; surfaced for manual entry
    Failed,
}

/// A structured ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredientLine {
    /// The parsed quantity (defaults to 1 piece when the line has none)
    pub quantity: Quantity,

    /// The parsed unit
    pub unit: Unit,

    /// The ingredient name span (e.g. "yellow onion")
    pub ingredient_text: String,

    /// Preparation/description modifiers in source order
    /// (e.g. "diced", "finely chopped")
    pub descriptors: Vec<String>,

    /// The original line, preserved verbatim
    pub raw_text: String,

    /// Confidence level in the parsing (0.0 to 1.0)
    pub confidence: f32,

    /// Where this line is in its lifecycle
    pub status: ParseStatus,
}

impl ParsedIngredientLine {
    /// Create a parsed line with full confidence
    pub fn new(quantity: Quantity, unit: Unit, ingredient_text: &str, raw_text: &str) -> Self {
        Self {
            quantity,
            unit,
            ingredient_text: ingredient_text.to_string(),
            descriptors: Vec::new(),
            raw_text: raw_text.to_string(),
            confidence: 1.0,
            status: ParseStatus::Parsed,
        }
    }

    /// Add a descriptor to this line
    pub fn with_descriptor(mut self, descriptor: &str) -> Self {
        self.descriptors.push(descriptor.to_string());
        self
    }

    /// Set the confidence level
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Whether this line should be flagged for manual review
    pub fn needs_review(&self, threshold: f32) -> bool {
        self.confidence < threshold
    }
}

impl fmt::Display for ParsedIngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.quantity)?;
        // A bare count reads as "3 eggs", not "3 pieces eggs"
        if self.unit != Unit::Pieces {
            write!(f, " {}", self.unit.display_name())?;
        }
        write!(f, " {}", self.ingredient_text)?;
        for descriptor in &self.descriptors {
            write!(f, ", {}", descriptor)?;
        }
        Ok(())
    }
}

/// A recipe's ingredient block: parsed lines plus preserved failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredients {
    /// Successfully parsed lines
    pub ingredients: Vec<ParsedIngredientLine>,

    /// Lines that could not be decomposed, kept for manual entry
    pub failed_lines: Vec<ParseFailure>,

    /// Original raw text that was parsed
    pub raw_text: String,

    /// Overall confidence in the parsing
    pub overall_confidence: f32,
}

impl RecipeIngredients {
    /// Create a new empty ingredient block
    pub fn new(raw_text: String) -> Self {
        Self {
            ingredients: Vec::new(),
            failed_lines: Vec::new(),
            raw_text,
            overall_confidence: 1.0,
        }
    }

    /// Add a parsed line
    pub fn add_ingredient(&mut self, line: ParsedIngredientLine) {
        self.ingredients.push(line);
        self.recalculate_confidence();
    }

    /// Add a failed line
    pub fn add_failed_line(&mut self, failure: ParseFailure) {
        self.failed_lines.push(failure);
        self.recalculate_confidence();
    }

    /// Number of successfully parsed lines
    pub fn parsed_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Number of lines that failed to parse
    pub fn failed_count(&self) -> usize {
        self.failed_lines.len()
    }

    /// Fraction of lines that parsed successfully
    pub fn success_rate(&self) -> f32 {
        let total = self.parsed_count() + self.failed_count();
        if total == 0 {
            return 1.0;
        }
        self.parsed_count() as f32 / total as f32
    }

    fn recalculate_confidence(&mut self) {
        if self.ingredients.is_empty() {
            self.overall_confidence = if self.failed_lines.is_empty() { 1.0 } else { 0.0 };
            return;
        }

        let avg_line_confidence: f32 = self
            .ingredients
            .iter()
            .map(|line| line.confidence)
            .sum::<f32>()
            / self.ingredients.len() as f32;

        self.overall_confidence = (avg_line_confidence + self.success_rate()) / 2.0;
    }
}

impl fmt::Display for RecipeIngredients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Ingredients ({} parsed, {} failed, {:.1}% confidence):",
            self.parsed_count(),
            self.failed_count(),
            self.overall_confidence * 100.0
        )?;

        for line in &self.ingredients {
            writeln!(f, "  - {}", line)?;
        }

        if !self.failed_lines.is_empty() {
            writeln!(f, "Needs manual entry:")?;
            for failure in &self.failed_lines {
                writeln!(f, "  ? {}", failure.raw_text)?;
            }
        }

        Ok(())
    }
}
