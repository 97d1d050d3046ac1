//! # Groceries
//!
//! Ingredient parsing, unit normalization and shopping-list aggregation for
//! meal planning: turns free-text ingredient lines ("2 1/2 cups diced yellow
//! onion, finely chopped") into structured, unit-consistent quantities, then
//! merges them across recipes and servings scalings into a deduplicated,
//! categorized shopping list.
//!
//! ## Pipeline
//!
//! raw lines → [`lexer`] → [`line_parser`] → ([`canonicalizer`],
//! [`unit_model`]) → [`scaler`] → [`aggregator`] → [`categorizer`]
//!
//! Quantities are exact rationals throughout, so aggregation is order
//! independent and scaling never drifts. Parsing failures and unknown
//! ingredients degrade into review-flagged lines instead of blocking the
//! list.

pub mod aggregator;
pub mod canonicalizer;
pub mod categorizer;
pub mod db;
pub mod lexer;
pub mod line_parser;
pub mod model;
pub mod pipeline;
pub mod quantity;
pub mod scaler;
pub mod unit_model;
